use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;

#[derive(Debug, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub samples: SamplesConfig,
    #[serde(default)]
    pub embedder: EmbedderConfig,
    #[serde(default)]
    pub classifier: ClassifierConfig,
    #[serde(default)]
    pub smoothing: SmoothingConfig,
    #[serde(default)]
    pub counter: CounterConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SamplesConfig {
    /// クラスごとのサンプルCSVを置くフォルダ
    #[serde(default = "default_samples_folder")]
    pub folder: String,
    /// サンプルファイルの拡張子
    #[serde(default = "default_samples_extension")]
    pub extension: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct EmbedderConfig {
    /// 胴体長に掛けて姿勢サイズとする係数
    #[serde(default = "default_torso_size_multiplier")]
    pub torso_size_multiplier: f32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ClassifierConfig {
    /// 第1段（最大距離）で残す候補数
    #[serde(default = "default_top_n_by_max_distance")]
    pub top_n_by_max_distance: usize,
    /// 第2段（平均距離）で残す候補数。投票数の合計になる
    #[serde(default = "default_top_n_by_mean_distance")]
    pub top_n_by_mean_distance: usize,
    /// 距離計算時の x, y, z の重み
    #[serde(default = "default_axes_weights")]
    pub axes_weights: [f32; 3],
}

#[derive(Debug, Deserialize, Clone)]
pub struct SmoothingConfig {
    /// 保持するフレーム数
    #[serde(default = "default_window_size")]
    pub window_size: usize,
    /// EMA係数 (0, 1]。大きいほど直近フレームを重視
    #[serde(default = "default_alpha")]
    pub alpha: f32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CounterConfig {
    /// 回数を数える姿勢クラス
    #[serde(default = "default_class_name")]
    pub class_name: String,
    /// この値を超えたら姿勢に入ったとみなす
    #[serde(default = "default_enter_threshold")]
    pub enter_threshold: f32,
    /// この値を下回ったら姿勢から出たとみなす
    #[serde(default = "default_exit_threshold")]
    pub exit_threshold: f32,
}

fn default_samples_folder() -> String { "dataset/csvs".to_string() }
fn default_samples_extension() -> String { "csv".to_string() }
fn default_torso_size_multiplier() -> f32 { 2.5 }
fn default_top_n_by_max_distance() -> usize { 30 }
fn default_top_n_by_mean_distance() -> usize { 10 }
fn default_axes_weights() -> [f32; 3] { [1.0, 1.0, 0.2] }
fn default_window_size() -> usize { 10 }
fn default_alpha() -> f32 { 0.2 }
fn default_class_name() -> String { "pushups_down".to_string() }
fn default_enter_threshold() -> f32 { 6.0 }
fn default_exit_threshold() -> f32 { 4.0 }

impl Default for SamplesConfig {
    fn default() -> Self {
        Self {
            folder: default_samples_folder(),
            extension: default_samples_extension(),
        }
    }
}

impl Default for EmbedderConfig {
    fn default() -> Self {
        Self {
            torso_size_multiplier: default_torso_size_multiplier(),
        }
    }
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            top_n_by_max_distance: default_top_n_by_max_distance(),
            top_n_by_mean_distance: default_top_n_by_mean_distance(),
            axes_weights: default_axes_weights(),
        }
    }
}

impl Default for SmoothingConfig {
    fn default() -> Self {
        Self {
            window_size: default_window_size(),
            alpha: default_alpha(),
        }
    }
}

impl Default for CounterConfig {
    fn default() -> Self {
        Self {
            class_name: default_class_name(),
            enter_threshold: default_enter_threshold(),
            exit_threshold: default_exit_threshold(),
        }
    }
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        Ok(config)
    }

    /// 読み込みに失敗したらデフォルト設定を使う
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        match Self::load(path.as_ref()) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!(path = %path.as_ref().display(), "using default config: {:#}", e);
                Self::default()
            }
        }
    }
}
