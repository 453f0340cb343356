//! # qccodec - 量子化学程序输入输出编解码库
//!
//! 把量子化学程序的 stdout 和输出目录解码为结构化结果，
//! 并把结构化输入编码为程序原生输入文件。
//!
//! ## 依赖关系
//! ```text
//! lib.rs
//!   ├── registry.rs  (解析单元注册表)
//!   ├── codec.rs     (解码引擎)
//!   │     ├── collector.rs (单次写入数据收集器)
//!   │     └── walker.rs    (输出目录遍历)
//!   ├── parsers/     (各程序解析单元)
//!   ├── encoders/    (各程序输入编码器)
//!   ├── models/      (数据模型)
//!   ├── batch/       (批量并行解码)
//!   ├── logging.rs   (日志初始化)
//!   ├── utils/       (输出与进度条工具)
//!   └── error.rs     (错误处理)
//! ```

pub mod batch;
pub mod codec;
pub mod collector;
pub mod encoders;
pub mod error;
pub mod logging;
pub mod models;
pub mod parsers;
pub mod registry;
pub mod utils;
pub mod walker;

pub use codec::DecodeRequest;
pub use collector::DataCollector;
pub use encoders::{encode, EncoderRegistry};
pub use error::{CodecError, Result};
pub use models::{CalcType, FileKind, NativeInput, ProgramInput, ResultRecord, Structure};
pub use registry::{FieldPath, ParserSpec, ProgramSpec, Registry};
pub use walker::DirectoryWalker;
