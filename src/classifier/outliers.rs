use tracing::{debug, info};

use super::knn::PoseClassifier;
use super::scores::PoseClassification;
use crate::error::Result;

/// 自身のラベルと近傍の多数決が一致しないサンプル
#[derive(Debug, Clone, PartialEq)]
pub struct SampleOutlier {
    /// サンプルDB内のインデックス
    pub index: usize,
    pub name: String,
    pub class_name: String,
    /// 最多票を得たクラス（同点なら複数）
    pub detected_classes: Vec<String>,
    pub classification: PoseClassification,
}

impl PoseClassifier {
    /// 各サンプルをDB全体（自身を含む）に対して分類し、外れ値を列挙する
    ///
    /// 最多票のクラスが自身のラベルと異なるか、最多票が複数クラスで同点なら外れ値。
    /// DB は変更しない。
    pub fn find_sample_outliers(&self) -> Result<Vec<SampleOutlier>> {
        let mut outliers = Vec::new();
        for (index, sample) in self.database().iter().enumerate() {
            let classification = self.classify_embedding(sample.embedding())?;
            let detected_classes: Vec<String> = classification
                .top_classes()
                .into_iter()
                .map(String::from)
                .collect();

            if detected_classes.len() != 1 || detected_classes[0] != sample.class_name() {
                debug!(
                    sample = sample.name(),
                    class = sample.class_name(),
                    detected = ?detected_classes,
                    "pose sample outlier"
                );
                outliers.push(SampleOutlier {
                    index,
                    name: sample.name().to_string(),
                    class_name: sample.class_name().to_string(),
                    detected_classes,
                    classification,
                });
            }
        }
        info!(
            outliers = outliers.len(),
            samples = self.database().len(),
            "outlier scan finished"
        );
        Ok(outliers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::{PoseSample, SampleDatabase};
    use crate::pose::fixtures::{pose, sample, Stance};
    use crate::pose::FullBodyEmbedder;

    const JITTERS: [f32; 5] = [0.0, 3.0, 6.0, 9.0, 12.0];

    fn samples() -> Vec<PoseSample> {
        let mut samples = Vec::new();
        for (i, j) in JITTERS.iter().enumerate() {
            samples.push(sample(format!("up_{}", i), "arms_up", Stance::ArmsUp, *j));
            samples.push(sample(format!("squat_{}", i), "squat", Stance::Squat, *j));
        }
        samples
    }

    fn classifier(samples: Vec<PoseSample>, top_max: usize, top_mean: usize) -> PoseClassifier {
        PoseClassifier::new(
            SampleDatabase::new(samples).unwrap(),
            FullBodyEmbedder::default(),
            top_max,
            top_mean,
        )
        .unwrap()
    }

    fn with_mislabeled() -> Vec<PoseSample> {
        let mut all = samples();
        // しゃがみ姿勢に誤って arms_up ラベルが付いたサンプル
        all.push(sample("bad", "arms_up", Stance::Squat, 6.0));
        all
    }

    #[test]
    fn test_clean_database_has_no_outliers() {
        let c = classifier(samples(), 6, 3);
        assert!(c.find_sample_outliers().unwrap().is_empty());
    }

    #[test]
    fn test_mislabeled_sample_is_outlier() {
        let c = classifier(with_mislabeled(), 6, 3);
        let outliers = c.find_sample_outliers().unwrap();
        assert_eq!(outliers.len(), 1);
        let outlier = &outliers[0];
        assert_eq!(outlier.name, "bad");
        assert_eq!(outlier.index, 10);
        assert_eq!(outlier.class_name, "arms_up");
        assert_eq!(outlier.detected_classes, vec!["squat".to_string()]);
        assert_eq!(outlier.classification.total(), 3);
    }

    #[test]
    fn test_tied_vote_is_outlier() {
        let embedder = FullBodyEmbedder::default();
        let p = pose(Stance::ArmsUp, 0.0);
        let samples = vec![
            PoseSample::new("a", "arms_up", p.clone(), &embedder).unwrap(),
            PoseSample::new("b", "other", p, &embedder).unwrap(),
        ];
        let c = classifier(samples, 2, 2);
        let outliers = c.find_sample_outliers().unwrap();
        assert_eq!(outliers.len(), 2);
        for o in &outliers {
            assert_eq!(o.detected_classes, vec!["arms_up".to_string(), "other".to_string()]);
        }
    }

    #[test]
    fn test_outliers_deterministic() {
        let c = classifier(with_mislabeled(), 6, 3);
        let first = c.find_sample_outliers().unwrap();
        for _ in 0..3 {
            assert_eq!(c.find_sample_outliers().unwrap(), first);
        }
    }

    #[test]
    fn test_removing_outliers() {
        let c = classifier(with_mislabeled(), 6, 3);
        let outliers = c.find_sample_outliers().unwrap();
        let cleaned = c.database().without_outliers(&outliers);
        assert_eq!(cleaned.len(), c.database().len() - 1);
        assert!(cleaned.iter().all(|s| s.name() != "bad"));
        // 元のDBは変更されない
        assert_eq!(c.database().len(), 11);

        let c2 = PoseClassifier::new(cleaned, FullBodyEmbedder::default(), 6, 3).unwrap();
        assert!(c2.find_sample_outliers().unwrap().is_empty());
    }
}
