use ndarray::{s, Array1, Array2, ArrayView2, Axis};

use self::Anchor::{Mid, Point};
use super::landmark::{LandmarkIndex as L, PoseLandmarks};
use crate::config::EmbedderConfig;
use crate::error::{PoseError, Result};

/// 埋め込みベクトルの本数
pub const EMBEDDING_SIZE: usize = 23;
/// 各ベクトルの次元 (x, y, z)
pub const EMBEDDING_DIMS: usize = 3;

/// 正規化後の座標に掛ける係数
const EMBEDDING_SCALE: f32 = 100.0;

/// ベクトルの始点・終点
#[derive(Debug, Clone, Copy)]
enum Anchor {
    Point(L),
    Mid(L, L),
}

impl Anchor {
    fn resolve(self, landmarks: ArrayView2<f32>) -> Array1<f32> {
        match self {
            Anchor::Point(i) => landmarks.row(i as usize).to_owned(),
            Anchor::Mid(a, b) => (&landmarks.row(a as usize) + &landmarks.row(b as usize)) * 0.5,
        }
    }
}

const HIPS: Anchor = Mid(L::LeftHip, L::RightHip);
const SHOULDERS: Anchor = Mid(L::LeftShoulder, L::RightShoulder);

/// 埋め込みを構成する (from, to) の組。順序はサンプルDBと共通で固定
const FEATURES: [(Anchor, Anchor); EMBEDDING_SIZE] = [
    // 1関節
    (HIPS, SHOULDERS),
    (Point(L::LeftShoulder), Point(L::LeftElbow)),
    (Point(L::RightShoulder), Point(L::RightElbow)),
    (Point(L::LeftElbow), Point(L::LeftWrist)),
    (Point(L::RightElbow), Point(L::RightWrist)),
    (Point(L::LeftHip), Point(L::LeftKnee)),
    (Point(L::RightHip), Point(L::RightKnee)),
    (Point(L::LeftKnee), Point(L::LeftAnkle)),
    (Point(L::RightKnee), Point(L::RightAnkle)),
    // 2関節
    (Point(L::LeftShoulder), Point(L::LeftWrist)),
    (Point(L::RightShoulder), Point(L::RightWrist)),
    (Point(L::LeftHip), Point(L::LeftAnkle)),
    (Point(L::RightHip), Point(L::RightAnkle)),
    // 4関節
    (Point(L::LeftHip), Point(L::LeftWrist)),
    (Point(L::RightHip), Point(L::RightWrist)),
    // 5関節。腰→手首は既存DBとの互換のため重複して残す
    (Point(L::LeftShoulder), Point(L::LeftAnkle)),
    (Point(L::RightShoulder), Point(L::RightAnkle)),
    (Point(L::LeftHip), Point(L::LeftWrist)),
    (Point(L::RightHip), Point(L::RightWrist)),
    // 左右間
    (Point(L::LeftElbow), Point(L::RightElbow)),
    (Point(L::LeftKnee), Point(L::RightKnee)),
    (Point(L::LeftWrist), Point(L::RightWrist)),
    (Point(L::LeftAnkle), Point(L::RightAnkle)),
];

/// 正規化済みランドマーク間のオフセットベクトル列 (EMBEDDING_SIZE x 3)
#[derive(Debug, Clone, PartialEq)]
pub struct PoseEmbedding(Array2<f32>);

impl PoseEmbedding {
    pub fn new(values: Array2<f32>) -> Self {
        Self(values)
    }

    pub fn as_array(&self) -> &Array2<f32> {
        &self.0
    }

    /// (ベクトル本数, 次元)
    pub fn shape(&self) -> (usize, usize) {
        self.0.dim()
    }

    /// 左右反転した姿勢の埋め込み（x 成分の符号反転）
    pub fn mirrored(&self) -> Self {
        let mut values = self.0.clone();
        values.column_mut(0).mapv_inplace(|x| -x);
        Self(values)
    }
}

/// 全身ランドマークを位置・スケール不変の埋め込みに変換する
#[derive(Debug, Clone)]
pub struct FullBodyEmbedder {
    torso_size_multiplier: f32,
}

impl Default for FullBodyEmbedder {
    fn default() -> Self {
        Self {
            torso_size_multiplier: 2.5,
        }
    }
}

impl FullBodyEmbedder {
    pub fn new(torso_size_multiplier: f32) -> Result<Self> {
        if !(torso_size_multiplier.is_finite() && torso_size_multiplier > 0.0) {
            return Err(PoseError::Configuration(format!(
                "torso_size_multiplier must be positive, got {}",
                torso_size_multiplier
            )));
        }
        Ok(Self {
            torso_size_multiplier,
        })
    }

    pub fn from_config(config: &EmbedderConfig) -> Result<Self> {
        Self::new(config.torso_size_multiplier)
    }

    pub fn torso_size_multiplier(&self) -> f32 {
        self.torso_size_multiplier
    }

    /// ランドマークを埋め込みに変換
    ///
    /// 全点が重なっているなど姿勢サイズが 0 の場合は InvalidInput
    pub fn embed(&self, pose: &PoseLandmarks) -> Result<PoseEmbedding> {
        let landmarks = self.normalize(pose)?;
        let mut embedding = Array2::<f32>::zeros((EMBEDDING_SIZE, EMBEDDING_DIMS));
        for (mut row, (from, to)) in embedding.axis_iter_mut(Axis(0)).zip(FEATURES.iter()) {
            let offset = to.resolve(landmarks.view()) - from.resolve(landmarks.view());
            row.assign(&offset);
        }
        Ok(PoseEmbedding(embedding))
    }

    /// 生の (x, y, z) 列を埋め込みに変換。33点以外は InvalidInput
    pub fn embed_points(&self, points: &[[f32; 3]]) -> Result<PoseEmbedding> {
        self.embed(&PoseLandmarks::from_points(points)?)
    }

    /// 腰中点を原点に移し、姿勢サイズで割って 100 倍する
    fn normalize(&self, pose: &PoseLandmarks) -> Result<Array2<f32>> {
        let mut landmarks = Array2::from_shape_fn(
            (L::COUNT, L::DIMS),
            |(i, j)| pose.points[i].to_array()[j],
        );

        let center = HIPS.resolve(landmarks.view());
        landmarks -= &center;

        let size = self.pose_size(landmarks.view());
        if !(size.is_finite() && size > f32::EPSILON) {
            return Err(PoseError::InvalidInput(format!(
                "degenerate pose, size {}",
                size
            )));
        }
        landmarks /= size;
        landmarks *= EMBEDDING_SCALE;
        Ok(landmarks)
    }

    /// 姿勢サイズ: 胴体長 x 係数 と 中心からの最大距離 の大きい方
    /// 奥行きはノイズが大きいので x, y のみ使う
    fn pose_size(&self, landmarks: ArrayView2<f32>) -> f32 {
        let planar = landmarks.slice(s![.., ..2]);

        let hips = HIPS.resolve(planar);
        let shoulders = SHOULDERS.resolve(planar);
        let torso_size = norm(&(&shoulders - &hips));

        let max_dist = planar
            .axis_iter(Axis(0))
            .map(|p| norm(&(&p - &hips)))
            .fold(0.0f32, f32::max);

        (torso_size * self.torso_size_multiplier).max(max_dist)
    }
}

fn norm(v: &Array1<f32>) -> f32 {
    v.dot(v).sqrt()
}
