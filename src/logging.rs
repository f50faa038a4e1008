//! ツール共通のログ出力設定

use tracing_subscriber::filter::LevelFilter;

/// ログレベルを指定する環境変数 (error, warn, info, debug, trace, off)
pub const LOG_LEVEL_ENV: &str = "POSE_REPS_LOG";

/// 標準エラーへのログ出力を初期化する。2回目以降の呼び出しは無視される
pub fn init() {
    let level = level_from(std::env::var(LOG_LEVEL_ENV).ok().as_deref());
    let _ = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

/// 未指定・解釈できない値は INFO
fn level_from(value: Option<&str>) -> LevelFilter {
    value
        .and_then(|v| v.trim().parse::<LevelFilter>().ok())
        .unwrap_or(LevelFilter::INFO)
}
