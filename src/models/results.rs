//! # 解码结果数据模型
//!
//! 每个计算族对应一个结果变体：
//! - 单点 (energy / gradient / hessian) -> `SinglePointResults`
//! - 优化 (optimization / transition_state) -> `OptimizationResults`
//! - 构象搜索 (conformer_search) -> `ConformerSearchResults`
//!
//! 结果对象只能通过 [`ResultRecord::build`] 从收集器冻结后的数据构造，
//! 构造前先按变体检查必需字段。
//!
//! ## 依赖关系
//! - 被 `codec.rs` 使用
//! - 被 `commands/`, `batch/` 使用
//! - 使用 `models/structure.rs`, `models/input.rs`

use super::{CalcType, Model, Structure};
use crate::error::{CodecError, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// 解析得到的输入回显（方法、基组、结构等）
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EchoedInput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calctype: Option<CalcType>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<Model>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub structure: Option<Structure>,
}

/// 单点计算结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SinglePointResults {
    /// 能量 (Hartree)
    pub energy: f64,

    /// 梯度 (Hartree/Bohr)，N x 3
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gradient: Option<Vec<[f64; 3]>>,

    /// Hessian 矩阵，3N x 3N
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hessian: Option<Vec<Vec<f64>>>,

    /// 振动频率 (cm^-1)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub freqs_wavenumber: Vec<f64>,

    /// 简正模位移 (Bohr)，n_modes x N x 3
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub normal_modes_cartesian: Vec<Vec<[f64; 3]>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calcinfo_natoms: Option<usize>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calcinfo_nmo: Option<usize>,

    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub extras: Map<String, Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_data: Option<EchoedInput>,
}

/// 优化轨迹中的一步
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OptimizationStep {
    pub structure: Structure,
    pub energy: f64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gradient: Option<Vec<[f64; 3]>>,

    pub success: bool,
}

/// 几何优化结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OptimizationResults {
    pub trajectory: Vec<OptimizationStep>,

    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub extras: Map<String, Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_data: Option<EchoedInput>,
}

impl OptimizationResults {
    /// 最终结构
    pub fn final_structure(&self) -> Option<&Structure> {
        self.trajectory.last().map(|step| &step.structure)
    }

    /// 每一步的能量
    pub fn energies(&self) -> Vec<f64> {
        self.trajectory.iter().map(|step| step.energy).collect()
    }
}

/// 构象搜索结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConformerSearchResults {
    pub conformers: Vec<Structure>,
    pub conformer_energies: Vec<f64>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rotamers: Vec<Structure>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rotamer_energies: Vec<f64>,

    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub extras: Map<String, Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_data: Option<EchoedInput>,
}

/// 结果变体
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultVariant {
    SinglePoint,
    Optimization,
    ConformerSearch,
}

impl ResultVariant {
    pub fn for_calctype(calctype: CalcType) -> Self {
        match calctype {
            CalcType::Energy | CalcType::Gradient | CalcType::Hessian => ResultVariant::SinglePoint,
            CalcType::Optimization | CalcType::TransitionState => ResultVariant::Optimization,
            CalcType::ConformerSearch => ResultVariant::ConformerSearch,
        }
    }

    /// 构造该变体必须存在的顶层字段
    pub fn required_fields(&self) -> &'static [&'static str] {
        match self {
            ResultVariant::SinglePoint => &["energy"],
            ResultVariant::Optimization => &["trajectory"],
            ResultVariant::ConformerSearch => &["conformers", "conformer_energies"],
        }
    }
}

impl std::fmt::Display for ResultVariant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResultVariant::SinglePoint => write!(f, "SinglePointResults"),
            ResultVariant::Optimization => write!(f, "OptimizationResults"),
            ResultVariant::ConformerSearch => write!(f, "ConformerSearchResults"),
        }
    }
}

/// 最终解码结果
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ResultRecord {
    SinglePoint(SinglePointResults),
    Optimization(OptimizationResults),
    ConformerSearch(ConformerSearchResults),
}

impl ResultRecord {
    /// 由收集到的数据构造结果对象
    pub fn build(calctype: CalcType, data: Value) -> Result<ResultRecord> {
        let variant = ResultVariant::for_calctype(calctype);

        let missing: Vec<String> = variant
            .required_fields()
            .iter()
            .filter(|field| data.get(**field).is_none())
            .map(|field| field.to_string())
            .collect();

        if !missing.is_empty() {
            return Err(CodecError::IncompleteResult {
                variant: variant.to_string(),
                missing,
            });
        }

        let record = match variant {
            ResultVariant::SinglePoint => ResultRecord::SinglePoint(construct(variant, data)?),
            ResultVariant::Optimization => ResultRecord::Optimization(construct(variant, data)?),
            ResultVariant::ConformerSearch => {
                ResultRecord::ConformerSearch(construct(variant, data)?)
            }
        };

        Ok(record)
    }

    pub fn variant(&self) -> ResultVariant {
        match self {
            ResultRecord::SinglePoint(_) => ResultVariant::SinglePoint,
            ResultRecord::Optimization(_) => ResultVariant::Optimization,
            ResultRecord::ConformerSearch(_) => ResultVariant::ConformerSearch,
        }
    }

    /// 代表性能量：单点能量、优化末步能量或最低构象能量
    pub fn energy(&self) -> Option<f64> {
        match self {
            ResultRecord::SinglePoint(r) => Some(r.energy),
            ResultRecord::Optimization(r) => r.trajectory.last().map(|step| step.energy),
            ResultRecord::ConformerSearch(r) => {
                r.conformer_energies.iter().copied().reduce(f64::min)
            }
        }
    }

    pub fn extras(&self) -> &Map<String, Value> {
        match self {
            ResultRecord::SinglePoint(r) => &r.extras,
            ResultRecord::Optimization(r) => &r.extras,
            ResultRecord::ConformerSearch(r) => &r.extras,
        }
    }

    pub fn input_data(&self) -> Option<&EchoedInput> {
        match self {
            ResultRecord::SinglePoint(r) => r.input_data.as_ref(),
            ResultRecord::Optimization(r) => r.input_data.as_ref(),
            ResultRecord::ConformerSearch(r) => r.input_data.as_ref(),
        }
    }

    pub fn as_single_point(&self) -> Option<&SinglePointResults> {
        match self {
            ResultRecord::SinglePoint(r) => Some(r),
            _ => None,
        }
    }

    pub fn as_optimization(&self) -> Option<&OptimizationResults> {
        match self {
            ResultRecord::Optimization(r) => Some(r),
            _ => None,
        }
    }

    pub fn as_conformer_search(&self) -> Option<&ConformerSearchResults> {
        match self {
            ResultRecord::ConformerSearch(r) => Some(r),
            _ => None,
        }
    }
}

fn construct<T: DeserializeOwned>(variant: ResultVariant, data: Value) -> Result<T> {
    serde_json::from_value(data).map_err(|source| CodecError::MalformedResult {
        variant: variant.to_string(),
        source,
    })
}
