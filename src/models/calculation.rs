//! # 计算类型与文件类型
//!
//! 定义决定解析单元适用性的计算类型 `CalcType`，以及解析单元读取的
//! 文件类型 `FileKind`。
//!
//! ## 依赖关系
//! - 被 `registry.rs`, `codec.rs`, `walker.rs` 使用
//! - 被 `parsers/`, `encoders/` 使用

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// 计算类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CalcType {
    Energy,
    Gradient,
    Hessian,
    Optimization,
    TransitionState,
    ConformerSearch,
}

impl CalcType {
    /// 所有计算类型
    pub const ALL: [CalcType; 6] = [
        CalcType::Energy,
        CalcType::Gradient,
        CalcType::Hessian,
        CalcType::Optimization,
        CalcType::TransitionState,
        CalcType::ConformerSearch,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CalcType::Energy => "energy",
            CalcType::Gradient => "gradient",
            CalcType::Hessian => "hessian",
            CalcType::Optimization => "optimization",
            CalcType::TransitionState => "transition_state",
            CalcType::ConformerSearch => "conformer_search",
        }
    }
}

impl std::fmt::Display for CalcType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for CalcType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace('-', "_");
        CalcType::ALL
            .iter()
            .copied()
            .find(|c| c.as_str() == normalized)
            .ok_or_else(|| {
                format!(
                    "Unknown calculation type '{}'. Expected one of: {}",
                    s,
                    CalcType::ALL
                        .iter()
                        .map(|c| c.as_str())
                        .collect::<Vec<_>>()
                        .join(", ")
                )
            })
    }
}

/// 解析单元读取的文件类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileKind {
    /// 程序主日志（标准输出）
    Stdout,
    /// 整个输出目录
    Directory,
    /// 程序原生输入文件
    Input,
    /// 数值 Hessian 文件
    Hessian,
    /// g98 格式频率文件
    Frequencies,
    /// 能量/梯度文件
    EnergyGradient,
}

impl FileKind {
    /// 是否为按文本内容解析的文件类型
    pub fn is_text(&self) -> bool {
        !matches!(self, FileKind::Directory)
    }
}

impl std::fmt::Display for FileKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FileKind::Stdout => write!(f, "stdout"),
            FileKind::Directory => write!(f, "directory"),
            FileKind::Input => write!(f, "input"),
            FileKind::Hessian => write!(f, "hessian"),
            FileKind::Frequencies => write!(f, "frequencies"),
            FileKind::EnergyGradient => write!(f, "energy_gradient"),
        }
    }
}
