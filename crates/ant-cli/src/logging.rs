//! 構造化ログの初期化。
//! ログは標準エラー出力に書き、リンターの出力と混ざらないようにする。

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// ログレベルを上書きする環境変数。
pub const LOG_ENV: &str = "ANT_LOG";

/// `ANT_LOG` が設定されていればそれを、なければ `level` をフィルタに使う。
pub fn build_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("warn"))
}

/// tracing-subscriber を初期化する。`format` が "json" なら JSON、それ以外はテキスト。
pub fn init_logger(level: &str, format: &str) {
    let registry = tracing_subscriber::registry().with(build_filter(level));

    let result = if format == "json" {
        registry
            .with(fmt::layer().json().with_target(true).with_writer(std::io::stderr))
            .try_init()
    } else {
        registry
            .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
            .try_init()
    };
    if let Err(e) = result {
        eprintln!("failed to initialize logger: {e}");
    }
}
