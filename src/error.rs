use thiserror::Error;

/// 分類・カウントパイプライン共通のエラー
#[derive(Debug, Error)]
pub enum PoseError {
    /// 1回の呼び出しだけが失敗する入力エラー（ランドマーク数不一致など）
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// 構築時に検出される設定ミス
    #[error("configuration error: {0}")]
    Configuration(String),

    /// サンプルデータベースの読み込み失敗
    #[error("failed to load pose samples: {0}")]
    Load(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),
}

pub type Result<T> = std::result::Result<T, PoseError>;
