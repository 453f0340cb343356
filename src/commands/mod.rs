//! # 命令执行模块
//!
//! 实现各子命令的业务逻辑。
//!
//! ## 依赖关系
//! - 被 `main.rs` 调用
//! - 使用 `cli/` 以及 qccodec 库
//! - 子模块: decode, encode, collect, programs

pub mod collect;
pub mod decode;
pub mod encode;
pub mod programs;

use crate::cli::Commands;
use qccodec::Result;

/// 执行命令
pub fn run(cmd: Commands) -> Result<()> {
    match cmd {
        Commands::Decode(args) => decode::execute(args),
        Commands::Encode(args) => encode::execute(args),
        Commands::Collect(args) => collect::execute(args),
        Commands::Programs(args) => programs::execute(args),
    }
}
