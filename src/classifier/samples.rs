use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;

use super::outliers::SampleOutlier;
use crate::error::{PoseError, Result};
use crate::pose::{FullBodyEmbedder, LandmarkIndex, PoseEmbedding, PoseLandmarks};

/// ラベル付きの姿勢サンプル
#[derive(Debug, Clone)]
pub struct PoseSample {
    name: String,
    class_name: String,
    landmarks: PoseLandmarks,
    embedding: PoseEmbedding,
}

impl PoseSample {
    /// ランドマークから埋め込みを計算してサンプルを作る
    pub fn new(
        name: impl Into<String>,
        class_name: impl Into<String>,
        landmarks: PoseLandmarks,
        embedder: &FullBodyEmbedder,
    ) -> Result<Self> {
        let embedding = embedder.embed(&landmarks)?;
        Ok(Self {
            name: name.into(),
            class_name: class_name.into(),
            landmarks,
            embedding,
        })
    }

    /// 埋め込みを差し替えたコピー
    #[cfg(test)]
    pub(crate) fn with_embedding(mut self, embedding: PoseEmbedding) -> Self {
        self.embedding = embedding;
        self
    }

    /// 元画像などの識別子
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    pub fn landmarks(&self) -> &PoseLandmarks {
        &self.landmarks
    }

    pub fn embedding(&self) -> &PoseEmbedding {
        &self.embedding
    }
}

/// 分類の参照となるサンプル集合
///
/// 並び順（クラスのファイル名順、ファイル内は行順）は近傍探索の同点処理に使われる。
#[derive(Debug, Clone, Default)]
pub struct SampleDatabase {
    samples: Vec<PoseSample>,
}

impl SampleDatabase {
    /// 全サンプルの埋め込み形状が揃っていることを確認して構築
    pub fn new(samples: Vec<PoseSample>) -> Result<Self> {
        if let Some(first) = samples.first() {
            let shape = first.embedding.shape();
            if let Some(bad) = samples.iter().find(|s| s.embedding.shape() != shape) {
                return Err(PoseError::Load(format!(
                    "sample '{}' has embedding shape {:?}, expected {:?}",
                    bad.name,
                    bad.embedding.shape(),
                    shape
                )));
            }
        }
        Ok(Self { samples })
    }

    /// `<class>.<extension>` 形式のファイルを全て読み込む
    ///
    /// 各行: サンプル名, x0, y0, z0, ..., x32, y32, z32
    pub fn load_folder<P: AsRef<Path>>(
        dir: P,
        extension: &str,
        embedder: &FullBodyEmbedder,
    ) -> Result<Self> {
        let dir = dir.as_ref();
        let entries = fs::read_dir(dir)
            .map_err(|e| PoseError::Load(format!("{}: {}", dir.display(), e)))?;

        let mut files: Vec<PathBuf> = Vec::new();
        for entry in entries {
            let path = entry?.path();
            if path.is_file() && path.extension().is_some_and(|ext| ext == extension) {
                files.push(path);
            }
        }
        files.sort();

        if files.is_empty() {
            return Err(PoseError::Load(format!(
                "no *.{} files in {}",
                extension,
                dir.display()
            )));
        }

        let mut samples = Vec::new();
        for path in &files {
            let class_name = path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .ok_or_else(|| PoseError::Load(format!("bad file name {}", path.display())))?;
            let loaded = Self::load_class_file(path, &class_name, embedder)?;
            info!(class = %class_name, samples = loaded.len(), "loaded pose samples");
            samples.extend(loaded);
        }

        Self::new(samples)
    }

    fn load_class_file(
        path: &Path,
        class_name: &str,
        embedder: &FullBodyEmbedder,
    ) -> Result<Vec<PoseSample>> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_path(path)?;

        let expected = 1 + LandmarkIndex::COUNT * LandmarkIndex::DIMS;
        let mut samples = Vec::new();
        for (row, record) in reader.records().enumerate() {
            let record = record?;
            let load_err = |msg: String| {
                PoseError::Load(format!("{} row {}: {}", path.display(), row, msg))
            };

            if record.len() != expected {
                return Err(load_err(format!(
                    "expected {} fields, got {}",
                    expected,
                    record.len()
                )));
            }

            let values = record
                .iter()
                .skip(1)
                .map(|v| v.parse::<f32>())
                .collect::<std::result::Result<Vec<_>, _>>()
                .map_err(|e| load_err(e.to_string()))?;
            let landmarks = PoseLandmarks::from_flat(&values).map_err(|e| load_err(e.to_string()))?;
            let sample = PoseSample::new(&record[0], class_name, landmarks, embedder)
                .map_err(|e| load_err(e.to_string()))?;
            samples.push(sample);
        }
        Ok(samples)
    }

    /// `load_folder` と同じ形式で書き出す
    pub fn write_folder<P: AsRef<Path>>(&self, dir: P, extension: &str) -> Result<()> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;

        for class_name in self.classes() {
            let path = dir.join(format!("{}.{}", class_name, extension));
            let mut writer = csv::Writer::from_path(&path)?;
            for sample in self.samples_of(class_name) {
                let row = std::iter::once(sample.name.clone())
                    .chain(sample.landmarks.to_flat().into_iter().map(|v| v.to_string()));
                writer.write_record(row)?;
            }
            writer.flush()?;
            info!(class = %class_name, path = %path.display(), "wrote pose samples");
        }
        Ok(())
    }

    /// 外れ値を除いたコピーを返す
    pub fn without_outliers(&self, outliers: &[SampleOutlier]) -> Self {
        let drop: HashSet<usize> = outliers.iter().map(|o| o.index).collect();
        let samples = self
            .samples
            .iter()
            .enumerate()
            .filter(|(i, _)| !drop.contains(i))
            .map(|(_, s)| s.clone())
            .collect();
        Self { samples }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn samples(&self) -> &[PoseSample] {
        &self.samples
    }

    pub fn iter(&self) -> impl Iterator<Item = &PoseSample> {
        self.samples.iter()
    }

    pub fn get(&self, index: usize) -> Option<&PoseSample> {
        self.samples.get(index)
    }

    /// クラス名（昇順、重複なし）
    pub fn classes(&self) -> Vec<&str> {
        self.samples
            .iter()
            .map(|s| s.class_name.as_str())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    pub fn samples_of<'a>(&'a self, class_name: &'a str) -> impl Iterator<Item = &'a PoseSample> {
        self.samples.iter().filter(move |s| s.class_name == class_name)
    }

    pub fn class_counts(&self) -> BTreeMap<&str, usize> {
        let mut counts = BTreeMap::new();
        for s in &self.samples {
            *counts.entry(s.class_name.as_str()).or_insert(0) += 1;
        }
        counts
    }

    /// 埋め込みの形状（空なら None）
    pub fn embedding_shape(&self) -> Option<(usize, usize)> {
        self.samples.first().map(|s| s.embedding.shape())
    }
}
