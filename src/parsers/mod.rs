//! # 解析器模块
//!
//! 提供各量子化学程序的解析单元与程序描述 (`ProgramSpec`)。
//! 解析单元是无状态函数：找不到数据时返回 `MatchNotFound`，
//! 数据格式错误时返回 `ParseError`。
//!
//! ## 依赖关系
//! - 被 `registry.rs` 使用（内置程序）
//! - 使用 `models/` 数据模型
//! - 子模块: terachem, crest

pub mod crest;
pub mod terachem;

use crate::error::{CodecError, Result};
use crate::registry::ProgramSpec;

use regex::Regex;
use serde::Serialize;
use serde_json::Value;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

/// 所有内置程序
pub fn builtin_programs() -> Vec<ProgramSpec> {
    vec![terachem::program(), crest::program()]
}

/// 返回第一个捕获组，未匹配时返回 `MatchNotFound`
pub(crate) fn re_search<'t>(re: &Regex, text: &'t str) -> Result<&'t str> {
    re.captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
        .ok_or_else(|| CodecError::not_found(re.as_str()))
}

/// 解析浮点数
pub(crate) fn parse_f64(value: &str, format: &str) -> Result<f64> {
    value
        .trim()
        .parse()
        .map_err(|_| CodecError::parse(format, format!("Invalid number '{}'", value.trim())))
}

/// 解析以空白分隔的浮点数序列
pub(crate) fn parse_floats(text: &str, format: &str) -> Result<Vec<f64>> {
    text.split_whitespace().map(|v| parse_f64(v, format)).collect()
}

/// 按 (x, y, z) 分组
pub(crate) fn chunk3(values: &[f64], format: &str) -> Result<Vec<[f64; 3]>> {
    if values.len() % 3 != 0 {
        return Err(CodecError::parse(
            format,
            format!("Expected a multiple of 3 values, found {}", values.len()),
        ));
    }
    Ok(values.chunks_exact(3).map(|c| [c[0], c[1], c[2]]).collect())
}

pub(crate) fn to_value<T: Serialize>(value: &T) -> Result<Value> {
    Ok(serde_json::to_value(value)?)
}

/// 读取输出目录中的文件；文件不存在视为 "未找到"
pub(crate) fn read_output_file(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => CodecError::not_found(path.display().to_string()),
        _ => CodecError::FileReadError {
            path: path.display().to_string(),
            source: e,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_re_search() {
        let re = Regex::new(r"Total atoms:\s*(\d+)").unwrap();
        assert_eq!(re_search(&re, "Total atoms:   12").unwrap(), "12");
        assert!(re_search(&re, "nothing").unwrap_err().is_not_found());
    }

    #[test]
    fn test_chunk3() {
        let grouped = chunk3(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0], "test").unwrap();
        assert_eq!(grouped, vec![[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]]);
        assert!(chunk3(&[1.0, 2.0], "test").is_err());
    }

    #[test]
    fn test_read_missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_output_file(&dir.path().join("missing.xyz")).unwrap_err();
        assert!(err.is_not_found());
    }
}
