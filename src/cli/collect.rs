//! # collect 子命令 CLI 定义
//!
//! 批量解码目录树下的计算结果
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/collect.rs`

use clap::Args;
use qccodec::CalcType;
use std::path::PathBuf;

/// collect 子命令参数
#[derive(Args, Debug)]
pub struct CollectArgs {
    /// Root directory containing calculation folders
    pub root: PathBuf,

    /// Program that produced the outputs
    #[arg(long)]
    pub program: String,

    /// Calculation type; detected per job when omitted
    #[arg(long)]
    pub calctype: Option<CalcType>,

    /// Glob pattern(s) for stdout files, comma-separated
    #[arg(long, default_value = "*.out")]
    pub pattern: String,

    /// Search all subdirectories instead of only the first level
    #[arg(long, default_value_t = false)]
    pub recursive: bool,

    /// Number of parallel jobs (0 = all logical cores)
    #[arg(short, long, default_value_t = 0, env = "QCCODEC_JOBS")]
    pub jobs: usize,

    /// JSON file receiving every decoded result
    #[arg(long, default_value = "results.json")]
    pub output: PathBuf,

    /// Optional CSV energy summary
    #[arg(long)]
    pub csv: Option<PathBuf>,

    /// Number of lowest-energy jobs to print
    #[arg(long, default_value_t = 10)]
    pub top_n: usize,
}
