//! # 日志初始化
//!
//! 使用 `tracing-subscriber` 输出到 stderr，保持 stdout 只有结果数据。
//! `RUST_LOG` 优先；未设置时按 `-v` 次数决定 qccodec 的日志级别。
//!
//! ## 依赖关系
//! - 被 `main.rs` 调用

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// `-v` 次数对应的默认过滤指令
pub fn default_directive(verbosity: u8) -> String {
    let level = match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    format!("qccodec={}", level)
}

/// 初始化全局日志；重复调用无效果
pub fn init_logging(verbosity: u8) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbosity)));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .try_init();
}
