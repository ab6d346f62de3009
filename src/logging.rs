// ==========================================
// 需求预测系统 - 日志初始化
// ==========================================
// 基于 tracing / tracing-subscriber
// 级别由 RUST_LOG 控制,未设置时默认 info
// ==========================================

use tracing_subscriber::{fmt, EnvFilter};

/// 初始化全局日志订阅者 (二进制入口调用一次)
///
/// # 环境变量
/// - RUST_LOG: 过滤器表达式
///   例如: RUST_LOG=debug 或 RUST_LOG=demand_planner::engine=trace
///
/// # 示例
/// ```no_run
/// use demand_planner::logging;
///
/// logging::init();
/// tracing::info!("管道启动");
/// ```
pub fn init() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_line_number(true)
        .init();
}

/// 测试用日志初始化
///
/// 固定 debug 级别并接管测试输出;重复调用安全 (try_init)
pub fn init_test() {
    let _ = fmt()
        .with_env_filter(EnvFilter::new("debug"))
        .with_test_writer()
        .try_init();
}
