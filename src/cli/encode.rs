//! # encode 子命令 CLI 定义
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/encode.rs`

use clap::Args;
use std::path::PathBuf;

/// encode 子命令参数
#[derive(Args, Debug)]
pub struct EncodeArgs {
    /// Target program (e.g. terachem, crest)
    pub program: String,

    /// JSON file holding the program input
    pub input: PathBuf,

    /// Directory to write the native input files into; prints them when omitted
    #[arg(long)]
    pub out_dir: Option<PathBuf>,
}
