use tracing_subscriber::{EnvFilter, fmt};

/// 初始化日志系统
///
/// 日志级别通过 RUST_LOG 环境变量控制，默认级别: info
/// 重复调用是安全的，只有第一次会生效
pub fn init_logger() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init()
        .ok();
}
