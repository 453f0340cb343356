//! # 批量解码模块
//!
//! 在一个根目录下收集多个计算任务并并行解码。
//!
//! ## 功能
//! - 按 glob 模式收集 stdout 文件及其输出目录
//! - 并行解码，共享只读注册表
//! - 进度反馈与失败汇总
//!
//! ## 依赖关系
//! - 被 `commands/collect.rs` 使用
//! - 使用 `rayon` 进行并行处理
//! - 使用 `indicatif` 显示进度

pub mod collector;
pub mod runner;

pub use collector::{DecodeJob, JobCollector};
pub use runner::{decode_job, BatchResult, BatchRunner, DecodedJob, JobOutcome};
