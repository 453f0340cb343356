//! # CLI 模块
//!
//! 使用 `clap` 定义命令行参数和子命令。
//!
//! ## 命令结构
//! - `decode`: 解码单个计算
//! - `encode`: 编码原生输入文件
//! - `collect`: 批量解码
//! - `programs`: 列出支持的程序
//!
//! ## 依赖关系
//! - 被 `main.rs` 使用
//! - 子模块: decode, encode, collect, programs

pub mod collect;
pub mod decode;
pub mod encode;
pub mod programs;

use clap::{ArgAction, Parser, Subcommand};

/// qccodec - 量子化学程序输入输出编解码工具
#[derive(Parser)]
#[command(name = "qccodec")]
#[command(version)]
#[command(
    about = "Decode quantum chemistry program output into structured results and encode native inputs",
    long_about = None
)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug); RUST_LOG overrides
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

/// 可用的子命令
#[derive(Subcommand)]
pub enum Commands {
    /// Decode one calculation's stdout and output directory into a JSON result
    Decode(decode::DecodeArgs),

    /// Encode a JSON program input into native input files
    Encode(encode::EncodeArgs),

    /// Decode every calculation under a directory tree and rank energies
    Collect(collect::CollectArgs),

    /// List supported programs and their parsing units
    Programs(programs::ProgramsArgs),
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_decode_args() {
        let cli = Cli::try_parse_from([
            "qccodec",
            "-vv",
            "decode",
            "terachem",
            "--stdout",
            "tc.out",
            "--calctype",
            "gradient",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Commands::Decode(args) => {
                assert_eq!(args.program, "terachem");
                assert_eq!(args.calctype, Some(qccodec::CalcType::Gradient));
                assert!(args.dir.is_none());
            }
            _ => panic!("expected decode"),
        }
    }

    #[test]
    fn test_unknown_calctype_rejected() {
        assert!(Cli::try_parse_from([
            "qccodec",
            "decode",
            "terachem",
            "--stdout",
            "tc.out",
            "--calctype",
            "md",
        ])
        .is_err());
    }
}
