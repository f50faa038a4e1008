use std::collections::{BTreeSet, VecDeque};

use crate::classifier::{PoseClassification, SmoothedClassification};
use crate::config::SmoothingConfig;
use crate::error::{PoseError, Result};

/// クラス別投票数の EMA 平滑化フィルタ
///
/// 直近 `window_size` フレームを保持し、年齢 i のフレームに重み (1 - alpha)^i を掛けた
/// 加重平均を返す。あるフレームに無いクラスはそのフレームで 0 とみなすので、
/// 候補から外れたクラスのスコアは徐々に減衰する。
pub struct EmaSmoother {
    window_size: usize,
    alpha: f32,
    /// 先頭が最新
    window: VecDeque<PoseClassification>,
}

impl EmaSmoother {
    pub fn new(window_size: usize, alpha: f32) -> Result<Self> {
        if window_size == 0 {
            return Err(PoseError::Configuration(
                "smoothing window_size must be at least 1".to_string(),
            ));
        }
        if !(alpha > 0.0 && alpha <= 1.0) {
            return Err(PoseError::Configuration(format!(
                "smoothing alpha must be in (0, 1], got {}",
                alpha
            )));
        }
        Ok(Self {
            window_size,
            alpha,
            window: VecDeque::with_capacity(window_size),
        })
    }

    pub fn from_config(config: &SmoothingConfig) -> Result<Self> {
        Self::new(config.window_size, config.alpha)
    }

    /// 新しいフレームを追加して平滑化結果を返す
    ///
    /// 空の分類（姿勢未検出）も 1 フレームとして窓を進める
    pub fn update(&mut self, classification: &PoseClassification) -> SmoothedClassification {
        self.window.push_front(classification.clone());
        self.window.truncate(self.window_size);

        let classes: BTreeSet<&str> = self.window.iter().flat_map(|c| c.classes()).collect();

        let mut smoothed = SmoothedClassification::new();
        for class_name in classes {
            let mut factor = 1.0f32;
            let mut top_sum = 0.0f32;
            let mut bottom_sum = 0.0f32;
            for frame in &self.window {
                top_sum += factor * frame.get(class_name) as f32;
                bottom_sum += factor;
                factor *= 1.0 - self.alpha;
            }
            smoothed.insert(class_name, top_sum / bottom_sum);
        }
        smoothed
    }

    pub fn reset(&mut self) {
        self.window.clear();
    }

    /// 保持中のフレーム数
    pub fn len(&self) -> usize {
        self.window.len()
    }

    pub fn is_empty(&self) -> bool {
        self.window.is_empty()
    }
}
