//! # qccodec 命令行工具
//!
//! 量子化学程序输出解码与输入编码的命令行入口。
//!
//! ## 子命令
//! - `decode`   - 解码单个计算的 stdout 与输出目录
//! - `encode`   - 把 JSON 输入编码为程序原生输入文件
//! - `collect`  - 批量解码目录树下的计算并汇总能量
//! - `programs` - 列出已注册程序及其解析单元
//!
//! ## 依赖关系
//! ```text
//! main.rs
//!   ├── cli/        (命令行参数定义)
//!   └── commands/   (命令执行逻辑)
//!         └── qccodec (库：注册表、解码引擎、编码器)
//! ```

mod cli;
mod commands;

use clap::Parser;
use cli::Cli;
use qccodec::{logging, utils};

fn main() {
    // Initialize colored output for Windows compatibility
    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    let cli = Cli::parse();
    logging::init_logging(cli.verbose);

    if let Err(e) = commands::run(cli.command) {
        utils::output::print_error(&format!("{}", e));
        std::process::exit(1);
    }
}
