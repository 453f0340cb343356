//! # 数据模型模块
//!
//! 定义计算类型、分子结构、计算输入以及解码结果的数据模型。
//!
//! ## 依赖关系
//! - 被 `registry.rs`, `codec.rs`, `parsers/`, `encoders/`, `commands/` 使用
//! - 子模块: calculation, structure, input, results

pub mod calculation;
pub mod input;
pub mod results;
pub mod structure;

pub use calculation::{CalcType, FileKind};
pub use input::{Model, NativeInput, ProgramInput};
pub use results::{
    ConformerSearchResults, EchoedInput, OptimizationResults, OptimizationStep, ResultRecord,
    ResultVariant, SinglePointResults,
};
pub use structure::{Structure, XyzFrame, ANGSTROM_TO_BOHR, BOHR_TO_ANGSTROM};
