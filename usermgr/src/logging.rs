//! ロギング初期化
//!
//! 標準出力へのfmt出力に加え、`USERMGR_LOG_DIR`が設定されていれば
//! 日次ローテーションのJSONログファイルにも書き出す。

use crate::config::get_env_with_fallback;
use std::path::PathBuf;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// ログファイル名の接頭辞
pub const LOG_FILE_PREFIX: &str = "usermgr.log";

const DEFAULT_FILTER: &str = "info";

/// ログレベルのフィルタ文字列を取得
///
/// `USERMGR_LOG_LEVEL`（旧: `RUST_LOG`）、未設定なら`info`。
pub fn filter_directive() -> String {
    get_env_with_fallback("USERMGR_LOG_LEVEL", "RUST_LOG")
        .filter(|value| !value.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_FILTER.to_string())
}

/// ログファイルの出力ディレクトリ（未設定ならファイル出力なし）
pub fn log_dir() -> Option<PathBuf> {
    std::env::var("USERMGR_LOG_DIR")
        .ok()
        .filter(|value| !value.trim().is_empty())
        .map(PathBuf::from)
}

/// tracingサブスクライバーを初期化する
pub fn init() -> anyhow::Result<()> {
    let filter = EnvFilter::try_new(filter_directive())
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let stdout_layer = fmt::layer().with_target(true);

    let file_layer = match log_dir() {
        Some(dir) => {
            std::fs::create_dir_all(&dir)?;
            let appender = tracing_appender::rolling::daily(&dir, LOG_FILE_PREFIX);
            Some(fmt::layer().json().with_ansi(false).with_writer(appender))
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stdout_layer)
        .with(file_layer)
        .try_init()?;

    Ok(())
}
