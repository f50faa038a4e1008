use crate::classifier::SmoothedClassification;
use crate::config::CounterConfig;
use crate::error::{PoseError, Result};

/// 2閾値のヒステリシスで反復回数を数えるカウンタ
///
/// 対象クラスのスコアが `enter_threshold` を超えた時点で 1 回と数え、
/// `exit_threshold` を下回るまでは再カウントしない。
#[derive(Debug, Clone)]
pub struct RepetitionCounter {
    class_name: String,
    enter_threshold: f32,
    exit_threshold: f32,
    pose_entered: bool,
    repetitions: usize,
}

impl RepetitionCounter {
    pub fn new(
        class_name: impl Into<String>,
        enter_threshold: f32,
        exit_threshold: f32,
    ) -> Result<Self> {
        if !(exit_threshold >= 0.0 && enter_threshold > exit_threshold) {
            return Err(PoseError::Configuration(format!(
                "thresholds must satisfy enter > exit >= 0, got enter={} exit={}",
                enter_threshold, exit_threshold
            )));
        }
        Ok(Self {
            class_name: class_name.into(),
            enter_threshold,
            exit_threshold,
            pose_entered: false,
            repetitions: 0,
        })
    }

    pub fn from_config(config: &CounterConfig) -> Result<Self> {
        Self::new(
            config.class_name.clone(),
            config.enter_threshold,
            config.exit_threshold,
        )
    }

    /// 平滑化済みスコアで状態を更新し、現在の回数を返す
    pub fn update(&mut self, classification: &SmoothedClassification) -> usize {
        let confidence = classification.get(&self.class_name);

        if !self.pose_entered {
            if confidence > self.enter_threshold {
                self.pose_entered = true;
                self.repetitions += 1;
            }
        } else if confidence < self.exit_threshold {
            self.pose_entered = false;
        }

        self.repetitions
    }

    pub fn repetitions(&self) -> usize {
        self.repetitions
    }

    pub fn is_in_pose(&self) -> bool {
        self.pose_entered
    }

    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    pub fn reset(&mut self) {
        self.pose_entered = false;
        self.repetitions = 0;
    }
}
