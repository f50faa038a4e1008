use ndarray::Array1;
use tracing::debug;

use super::samples::{PoseSample, SampleDatabase};
use super::scores::PoseClassification;
use crate::config::ClassifierConfig;
use crate::error::{PoseError, Result};
use crate::pose::{FullBodyEmbedder, PoseEmbedding, PoseLandmarks, EMBEDDING_DIMS};

/// 近傍候補
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate {
    /// サンプルDB内のインデックス
    pub index: usize,
    pub distance: f32,
    /// 左右反転した問い合わせの方が近かったか
    pub flipped: bool,
}

/// 2段階の近傍探索結果
#[derive(Debug, Clone)]
pub struct Neighbors {
    /// 第1段: 最大距離の小さい順
    pub by_max_distance: Vec<Candidate>,
    /// 第2段: 第1段の候補を平均距離で絞り込んだもの
    pub by_mean_distance: Vec<Candidate>,
}

/// サンプルDBに対する k-NN 姿勢分類器
///
/// 第1段は最大絶対差で大きく異なる姿勢を除外し、第2段は残った候補だけを
/// 平均絶対差で並べ直す。どちらも左右反転した問い合わせとの距離の小さい方を使う。
#[derive(Debug, Clone)]
pub struct PoseClassifier {
    database: SampleDatabase,
    embedder: FullBodyEmbedder,
    top_n_by_max_distance: usize,
    top_n_by_mean_distance: usize,
    axes_weights: Array1<f32>,
}

impl PoseClassifier {
    pub fn new(
        database: SampleDatabase,
        embedder: FullBodyEmbedder,
        top_n_by_max_distance: usize,
        top_n_by_mean_distance: usize,
    ) -> Result<Self> {
        if top_n_by_max_distance == 0 || top_n_by_mean_distance == 0 {
            return Err(PoseError::Configuration(
                "top_n_by_max_distance and top_n_by_mean_distance must be positive".to_string(),
            ));
        }
        if top_n_by_mean_distance > top_n_by_max_distance {
            return Err(PoseError::Configuration(format!(
                "top_n_by_mean_distance ({}) exceeds top_n_by_max_distance ({})",
                top_n_by_mean_distance, top_n_by_max_distance
            )));
        }
        if let Some((_, dims)) = database.embedding_shape() {
            if dims != EMBEDDING_DIMS {
                return Err(PoseError::Configuration(format!(
                    "sample embeddings have {} dimensions, expected {}",
                    dims, EMBEDDING_DIMS
                )));
            }
        }

        debug!(
            samples = database.len(),
            top_n_by_max_distance,
            top_n_by_mean_distance,
            "pose classifier ready"
        );

        Ok(Self {
            database,
            embedder,
            top_n_by_max_distance,
            top_n_by_mean_distance,
            axes_weights: Array1::ones(EMBEDDING_DIMS),
        })
    }

    pub fn from_config(
        database: SampleDatabase,
        embedder: FullBodyEmbedder,
        config: &ClassifierConfig,
    ) -> Result<Self> {
        Self::new(
            database,
            embedder,
            config.top_n_by_max_distance,
            config.top_n_by_mean_distance,
        )?
        .with_axes_weights(config.axes_weights)
    }

    /// x, y, z 成分ごとの距離の重み（デフォルトは全て 1）
    pub fn with_axes_weights(mut self, weights: [f32; 3]) -> Result<Self> {
        if weights.iter().any(|w| !w.is_finite() || *w < 0.0) {
            return Err(PoseError::Configuration(format!(
                "axes weights must be non-negative, got {:?}",
                weights
            )));
        }
        self.axes_weights = Array1::from(weights.to_vec());
        Ok(self)
    }

    pub fn database(&self) -> &SampleDatabase {
        &self.database
    }

    pub fn embedder(&self) -> &FullBodyEmbedder {
        &self.embedder
    }

    /// 姿勢を分類してクラスごとの投票数を返す
    pub fn classify(&self, pose: &PoseLandmarks) -> Result<PoseClassification> {
        let embedding = self.embedder.embed(pose)?;
        self.classify_embedding(&embedding)
    }

    /// 埋め込み済みの姿勢を分類
    ///
    /// 投票数の合計は min(top_n_by_mean_distance, サンプル数)。
    /// 最終候補に入らなかったクラスは結果に含まれない。
    pub fn classify_embedding(&self, embedding: &PoseEmbedding) -> Result<PoseClassification> {
        let neighbors = self.nearest_samples(embedding)?;
        let mut votes = PoseClassification::new();
        for candidate in &neighbors.by_mean_distance {
            votes.add(self.sample(candidate).class_name(), 1);
        }
        Ok(votes)
    }

    /// 2段階の近傍探索
    pub fn nearest_samples(&self, embedding: &PoseEmbedding) -> Result<Neighbors> {
        if let Some(shape) = self.database.embedding_shape() {
            if shape != embedding.shape() {
                return Err(PoseError::InvalidInput(format!(
                    "embedding shape {:?} does not match sample database {:?}",
                    embedding.shape(),
                    shape
                )));
            }
        }
        let mirrored = embedding.mirrored();

        let mut by_max_distance: Vec<Candidate> = self
            .database
            .iter()
            .enumerate()
            .map(|(index, sample)| {
                let (distance, flipped) = closer(
                    self.max_distance(embedding, sample),
                    self.max_distance(&mirrored, sample),
                );
                Candidate {
                    index,
                    distance,
                    flipped,
                }
            })
            .collect();
        // 安定ソートなので同距離はDB順
        by_max_distance.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        by_max_distance.truncate(self.top_n_by_max_distance);

        let mut by_mean_distance: Vec<Candidate> = by_max_distance
            .iter()
            .map(|c| {
                let sample = self.sample(c);
                let (distance, flipped) = closer(
                    self.mean_distance(embedding, sample),
                    self.mean_distance(&mirrored, sample),
                );
                Candidate {
                    index: c.index,
                    distance,
                    flipped,
                }
            })
            .collect();
        by_mean_distance.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        by_mean_distance.truncate(self.top_n_by_mean_distance);

        Ok(Neighbors {
            by_max_distance,
            by_mean_distance,
        })
    }

    fn sample(&self, candidate: &Candidate) -> &PoseSample {
        &self.database.samples()[candidate.index]
    }

    fn weighted_diff(&self, query: &PoseEmbedding, sample: &PoseSample) -> ndarray::Array2<f32> {
        (query.as_array() - sample.embedding().as_array()).mapv(f32::abs) * &self.axes_weights
    }

    fn max_distance(&self, query: &PoseEmbedding, sample: &PoseSample) -> f32 {
        self.weighted_diff(query, sample)
            .iter()
            .fold(0.0f32, |m, v| m.max(*v))
    }

    fn mean_distance(&self, query: &PoseEmbedding, sample: &PoseSample) -> f32 {
        self.weighted_diff(query, sample).mean().unwrap_or(0.0)
    }
}

/// (距離, 反転側が勝ったか)。同距離なら反転なしを採る
fn closer(plain: f32, flipped: f32) -> (f32, bool) {
    if flipped < plain {
        (flipped, true)
    } else {
        (plain, false)
    }
}
