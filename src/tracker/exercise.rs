use tracing::trace;

use super::counter::RepetitionCounter;
use super::smooth::EmaSmoother;
use crate::classifier::{PoseClassification, PoseClassifier, SmoothedClassification};
use crate::config::Config;
use crate::error::Result;
use crate::pose::PoseLandmarks;

/// 1フレーム分の処理結果（描画側に渡す）
#[derive(Debug, Clone, PartialEq)]
pub struct FrameResult {
    /// 生の投票数。姿勢なしなら None
    pub classification: Option<PoseClassification>,
    /// 平滑化後のスコア。姿勢なしなら None
    pub smoothed: Option<SmoothedClassification>,
    pub repetitions: usize,
}

/// 1種目分の時系列状態（平滑化の窓とカウンタ）
///
/// 分類器は共有し、種目ごとにこの構造体を持つ。フレームは時刻順に渡すこと。
pub struct ExerciseTracker {
    smoother: EmaSmoother,
    counter: RepetitionCounter,
}

impl ExerciseTracker {
    pub fn new(smoother: EmaSmoother, counter: RepetitionCounter) -> Self {
        Self { smoother, counter }
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self::new(
            EmaSmoother::from_config(&config.smoothing)?,
            RepetitionCounter::from_config(&config.counter)?,
        ))
    }

    /// 1フレームを処理する
    ///
    /// 姿勢なしのフレームは空の分類を平滑化フィルタに通して時間軸を保ち、
    /// カウンタは更新せず直前の回数を返す。分類に失敗した場合は状態を変えずにエラーを返す。
    pub fn process(
        &mut self,
        classifier: &PoseClassifier,
        pose: Option<&PoseLandmarks>,
    ) -> Result<FrameResult> {
        let Some(pose) = pose else {
            self.smoother.update(&PoseClassification::new());
            trace!(repetitions = self.counter.repetitions(), "no pose");
            return Ok(FrameResult {
                classification: None,
                smoothed: None,
                repetitions: self.counter.repetitions(),
            });
        };

        let classification = classifier.classify(pose)?;
        let smoothed = self.smoother.update(&classification);
        let repetitions = self.counter.update(&smoothed);
        trace!(
            confidence = smoothed.get(self.counter.class_name()),
            repetitions,
            "frame classified"
        );

        Ok(FrameResult {
            classification: Some(classification),
            smoothed: Some(smoothed),
            repetitions,
        })
    }

    pub fn repetitions(&self) -> usize {
        self.counter.repetitions()
    }

    pub fn counter(&self) -> &RepetitionCounter {
        &self.counter
    }

    pub fn smoother(&self) -> &EmaSmoother {
        &self.smoother
    }

    pub fn reset(&mut self) {
        self.smoother.reset();
        self.counter.reset();
    }
}
