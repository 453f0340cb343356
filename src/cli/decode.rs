//! # decode 子命令 CLI 定义
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/decode.rs`

use clap::Args;
use qccodec::CalcType;
use std::path::PathBuf;

/// decode 子命令参数
#[derive(Args, Debug)]
pub struct DecodeArgs {
    /// Program that produced the output (e.g. terachem, crest)
    pub program: String,

    /// Calculation type; detected from stdout when omitted
    #[arg(long)]
    pub calctype: Option<CalcType>,

    /// Path to the program's captured stdout
    #[arg(long)]
    pub stdout: Option<PathBuf>,

    /// Path to the calculation's output directory
    #[arg(long)]
    pub dir: Option<PathBuf>,

    /// JSON program input used for the calculation
    #[arg(long)]
    pub input: Option<PathBuf>,

    /// Print the collected raw data instead of a validated result
    #[arg(long, default_value_t = false)]
    pub raw: bool,

    /// Write the JSON result to a file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}
