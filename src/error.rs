//! # 统一错误处理模块
//!
//! 定义 qccodec 的所有错误类型，使用 `thiserror` 派生。
//!
//! 解码流程中只有一种错误会被就地恢复：可选解析单元返回的
//! [`CodecError::MatchNotFound`]。其余错误一律原样向上传播。
//!
//! ## 依赖关系
//! - 被所有其他模块使用
//! - 使用 `models/calculation.rs` 中的 `CalcType`

use crate::models::CalcType;
use thiserror::Error;

/// qccodec 统一错误类型
#[derive(Error, Debug)]
pub enum CodecError {
    // ─────────────────────────────────────────────────────────────
    // I/O 错误
    // ─────────────────────────────────────────────────────────────
    #[error("Failed to read file: {path}")]
    FileReadError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write file: {path}")]
    FileWriteError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Directory not found: {path}")]
    DirectoryNotFound { path: String },

    // ─────────────────────────────────────────────────────────────
    // 注册表错误
    // ─────────────────────────────────────────────────────────────
    #[error(
        "Parser '{unit}' conflicts with '{existing}': target '{target}' is already registered for program '{program}'"
    )]
    RegistrationConflict {
        program: String,
        target: String,
        unit: String,
        existing: String,
    },

    #[error("Invalid parser spec '{unit}' for program '{program}': {reason}")]
    InvalidSpec {
        program: String,
        unit: String,
        reason: String,
    },

    #[error("No parsers registered for program '{program}'")]
    UnknownProgram { program: String },

    // ─────────────────────────────────────────────────────────────
    // 解析错误
    // ─────────────────────────────────────────────────────────────
    #[error("Unrecognized {program} output: no calculation type marker found")]
    UnrecognizedOutput { program: String },

    #[error("No match found for pattern: {pattern}")]
    MatchNotFound { pattern: String },

    #[error("Failed to parse {format}: {reason}")]
    ParseError { format: String, reason: String },

    // ─────────────────────────────────────────────────────────────
    // 解码错误
    // ─────────────────────────────────────────────────────────────
    #[error(
        "Required data missing: parser '{unit}' found no '{target}' in {program} {calctype} output"
    )]
    MissingRequiredData {
        program: String,
        calctype: CalcType,
        unit: String,
        target: String,
    },

    #[error("Field '{path}' has already been set and cannot be set again")]
    DuplicateAssignment { path: String },

    #[error("{program} calculation failed: {message}")]
    CalculationFailed { program: String, message: String },

    #[error("Parser '{unit}' wrote '{path}' which was already set ({program} {calctype})")]
    DuplicateTarget {
        program: String,
        calctype: CalcType,
        unit: String,
        path: String,
    },

    #[error("Cannot build {variant} results, missing fields: {}", missing.join(", "))]
    IncompleteResult {
        variant: String,
        missing: Vec<String>,
    },

    #[error("Cannot build {variant} results: {source}")]
    MalformedResult {
        variant: String,
        #[source]
        source: serde_json::Error,
    },

    // ─────────────────────────────────────────────────────────────
    // 编码错误
    // ─────────────────────────────────────────────────────────────
    #[error("No input renderer registered for program '{program}'")]
    UnsupportedProgram { program: String },

    #[error("Cannot encode {program} input: {reason}")]
    EncoderError { program: String, reason: String },

    // ─────────────────────────────────────────────────────────────
    // 参数错误
    // ─────────────────────────────────────────────────────────────
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    // ─────────────────────────────────────────────────────────────
    // 序列化错误
    // ─────────────────────────────────────────────────────────────
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    TomlError(#[from] toml::ser::Error),

    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    // ─────────────────────────────────────────────────────────────
    // 其他
    // ─────────────────────────────────────────────────────────────
    #[error("{0}")]
    Other(String),
}

impl CodecError {
    /// 构造 "未找到匹配" 错误
    pub fn not_found(pattern: impl Into<String>) -> Self {
        CodecError::MatchNotFound {
            pattern: pattern.into(),
        }
    }

    /// 构造格式解析错误
    pub fn parse(format: impl Into<String>, reason: impl Into<String>) -> Self {
        CodecError::ParseError {
            format: format.into(),
            reason: reason.into(),
        }
    }

    /// 是否为 "未找到匹配" 错误
    pub fn is_not_found(&self) -> bool {
        matches!(self, CodecError::MatchNotFound { .. })
    }
}

/// Result 类型别名
pub type Result<T> = std::result::Result<T, CodecError>;
