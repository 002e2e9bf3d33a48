//! Logging setup utilities for the realtime chat server.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize the tracing subscriber with the specified default log level.
///
/// Sets up logging for both the library crate and the binary. The log level
/// can be overridden through the `RUST_LOG` environment variable.
///
/// # Arguments
///
/// * `binary_name` - The name of the binary (e.g., "server")
/// * `default_log_level` - The default log level (e.g., "debug", "info", "warn", "error")
///
/// # Examples
///
/// ```no_run
/// use tsubame_shared::logger::setup_logger;
///
/// setup_logger("server", "info");
/// ```
pub fn setup_logger(binary_name: &str, default_log_level: &str) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_env_filter(binary_name, default_log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// `RUST_LOG` 未設定時のデフォルトフィルタを組み立てる
///
/// tracing のターゲット名はクレート名のハイフンをアンダースコアに
/// 置き換えたものになるため、ここで正規化する。バイナリとそのライブラリ
/// クレートは同名ターゲットになるので、1 つのディレクティブで両方を覆う。
fn default_env_filter(binary_name: &str, default_log_level: &str) -> String {
    format!(
        "{}={},{}={}",
        binary_name.replace("-", "_"),
        default_log_level,
        env!("CARGO_PKG_NAME").replace("-", "_"),
        default_log_level
    )
}
