//! # 计算输入数据模型
//!
//! `ProgramInput` 描述一次计算请求（结构、方法、基组、关键字），
//! 由编码器渲染为程序原生输入文件 `NativeInput`。
//!
//! ## 依赖关系
//! - 被 `encoders/` 使用
//! - 被 `codec.rs` 作为解析上下文传给目录解析单元
//! - 使用 `models/structure.rs`

use super::{CalcType, Structure};
use crate::error::{CodecError, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// 计算方法与基组
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Model {
    pub method: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub basis: Option<String>,
}

/// 结构化计算输入
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgramInput {
    pub calctype: CalcType,
    pub structure: Structure,
    pub model: Model,

    /// 程序特定关键字（保持插入顺序）
    #[serde(default)]
    pub keywords: Map<String, Value>,
}

impl ProgramInput {
    pub fn new(calctype: CalcType, structure: Structure, model: Model) -> Self {
        ProgramInput {
            calctype,
            structure,
            model,
            keywords: Map::new(),
        }
    }

    pub fn with_keyword(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.keywords.insert(key.into(), value.into());
        self
    }

    /// 从 JSON 文件读取
    pub fn from_json_file(path: &Path) -> Result<ProgramInput> {
        let content = fs::read_to_string(path).map_err(|e| CodecError::FileReadError {
            path: path.display().to_string(),
            source: e,
        })?;
        Ok(serde_json::from_str(&content)?)
    }
}

/// 程序原生输入文件集合：文件名 -> 文件内容
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NativeInput {
    pub files: BTreeMap<String, String>,
}

impl NativeInput {
    pub fn get(&self, filename: &str) -> Option<&str> {
        self.files.get(filename).map(String::as_str)
    }

    /// 将所有文件写入目录
    pub fn write_to(&self, directory: &Path) -> Result<Vec<PathBuf>> {
        fs::create_dir_all(directory).map_err(|e| CodecError::FileWriteError {
            path: directory.display().to_string(),
            source: e,
        })?;

        let mut written = Vec::with_capacity(self.files.len());
        for (name, content) in &self.files {
            let path = directory.join(name);
            fs::write(&path, content).map_err(|e| CodecError::FileWriteError {
                path: path.display().to_string(),
                source: e,
            })?;
            written.push(path);
        }

        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_program_input_from_json() {
        let json = r#"{
            "calctype": "energy",
            "structure": {"symbols": ["H", "H"], "geometry": [[0.0, 0.0, 0.0], [0.0, 0.0, 1.4]]},
            "model": {"method": "b3lyp", "basis": "6-31g"},
            "keywords": {"purify": "no", "maxit": 100}
        }"#;
        let input: ProgramInput = serde_json::from_str(json).unwrap();

        assert_eq!(input.calctype, CalcType::Energy);
        assert_eq!(input.structure.multiplicity, 1);
        assert_eq!(input.model.basis.as_deref(), Some("6-31g"));

        let keys: Vec<&String> = input.keywords.keys().collect();
        assert_eq!(keys, vec!["purify", "maxit"]);
    }

    #[test]
    fn test_native_input_write_to() {
        let dir = tempfile::tempdir().unwrap();
        let mut native = NativeInput::default();
        native.files.insert("a.in".to_string(), "run energy\n".to_string());

        let written = native.write_to(dir.path()).unwrap();

        assert_eq!(written.len(), 1);
        assert_eq!(fs::read_to_string(&written[0]).unwrap(), "run energy\n");
    }
}
