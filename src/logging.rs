//! 日誌系統初始化

use tracing_subscriber::{fmt, EnvFilter};

/// 初始化日誌系統
///
/// 日誌級別由 `RUST_LOG` 環境變數控制，預設為 info。
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_line_number(true)
        .init();
}

/// 初始化測試環境的日誌系統（可重複呼叫）
pub fn init_test() {
    let _ = fmt()
        .with_env_filter(EnvFilter::new("debug"))
        .with_test_writer()
        .try_init();
}
