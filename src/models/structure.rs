//! # 分子结构数据模型
//!
//! 定义统一的分子结构表示，可以从 xyz 格式（单帧或多帧）读取并写回 xyz。
//!
//! ## 单位约定
//! - 内存中的坐标单位为 Bohr
//! - xyz 文件中的坐标单位为 Å
//!
//! ## 依赖关系
//! - 被 `parsers/`, `encoders/` 和 `models/results.rs` 使用
//! - 无外部模块依赖

use crate::error::{CodecError, Result};
use serde::{Deserialize, Serialize};

/// Bohr -> Å
pub const BOHR_TO_ANGSTROM: f64 = 0.52917721092;

/// Å -> Bohr
pub const ANGSTROM_TO_BOHR: f64 = 1.0 / BOHR_TO_ANGSTROM;

/// 分子结构
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Structure {
    /// 元素符号
    pub symbols: Vec<String>,

    /// 笛卡尔坐标 (Bohr)，每个原子一行
    pub geometry: Vec<[f64; 3]>,

    /// 总电荷
    #[serde(default)]
    pub charge: i32,

    /// 自旋多重度
    #[serde(default = "default_multiplicity")]
    pub multiplicity: u32,
}

fn default_multiplicity() -> u32 {
    1
}

/// xyz 文件中的一帧：结构及其注释行
#[derive(Debug, Clone)]
pub struct XyzFrame {
    pub structure: Structure,
    pub comment: String,
}

impl Structure {
    pub fn new(symbols: Vec<String>, geometry: Vec<[f64; 3]>) -> Self {
        Structure {
            symbols,
            geometry,
            charge: 0,
            multiplicity: 1,
        }
    }

    pub fn with_charge(mut self, charge: i32) -> Self {
        self.charge = charge;
        self
    }

    pub fn with_multiplicity(mut self, multiplicity: u32) -> Self {
        self.multiplicity = multiplicity;
        self
    }

    /// 原子数
    pub fn natoms(&self) -> usize {
        self.symbols.len()
    }

    /// 计算化学式
    pub fn formula(&self) -> String {
        use std::collections::BTreeMap;
        let mut counts: BTreeMap<&str, usize> = BTreeMap::new();

        for symbol in &self.symbols {
            *counts.entry(symbol.as_str()).or_insert(0) += 1;
        }

        counts
            .into_iter()
            .map(|(el, count)| {
                if count == 1 {
                    el.to_string()
                } else {
                    format!("{}{}", el, count)
                }
            })
            .collect::<Vec<_>>()
            .join("")
    }

    /// 以 Å 为单位的坐标
    pub fn geometry_angstrom(&self) -> Vec<[f64; 3]> {
        self.geometry
            .iter()
            .map(|p| {
                [
                    p[0] * BOHR_TO_ANGSTROM,
                    p[1] * BOHR_TO_ANGSTROM,
                    p[2] * BOHR_TO_ANGSTROM,
                ]
            })
            .collect()
    }

    /// 解析单帧 xyz 文本
    pub fn from_xyz(text: &str, charge: i32, multiplicity: u32) -> Result<Structure> {
        let mut frames = Structure::from_xyz_multi(text, charge, multiplicity)?;
        if frames.len() != 1 {
            return Err(CodecError::parse(
                "xyz",
                format!("Expected a single structure, found {}", frames.len()),
            ));
        }
        Ok(frames.remove(0).structure)
    }

    /// 解析多帧 xyz 文本（构象系综、优化轨迹）
    pub fn from_xyz_multi(text: &str, charge: i32, multiplicity: u32) -> Result<Vec<XyzFrame>> {
        let mut frames = Vec::new();
        let mut lines = text.lines().peekable();

        loop {
            // 帧之间允许空行
            while matches!(lines.peek(), Some(l) if l.trim().is_empty()) {
                lines.next();
            }
            let Some(count_line) = lines.next() else {
                break;
            };

            let natoms: usize = count_line.trim().parse().map_err(|_| {
                CodecError::parse(
                    "xyz",
                    format!("Expected atom count, found '{}'", count_line.trim()),
                )
            })?;

            let comment = lines
                .next()
                .ok_or_else(|| {
                    CodecError::parse(
                        "xyz",
                        format!("Frame {} has no comment line", frames.len() + 1),
                    )
                })?
                .to_string();

            // 原子数来自文件本身，不据此预分配
            let mut symbols = Vec::new();
            let mut geometry = Vec::new();

            for i in 0..natoms {
                let line = lines.next().ok_or_else(|| {
                    CodecError::parse(
                        "xyz",
                        format!(
                            "Frame {} ends after {} of {} atoms",
                            frames.len() + 1,
                            i,
                            natoms
                        ),
                    )
                })?;

                let parts: Vec<&str> = line.split_whitespace().collect();
                if parts.len() < 4 {
                    return Err(CodecError::parse(
                        "xyz",
                        format!("Malformed atom line: '{}'", line.trim()),
                    ));
                }

                let mut position = [0.0; 3];
                for (k, value) in parts[1..4].iter().enumerate() {
                    let coord: f64 = value.parse().map_err(|_| {
                        CodecError::parse("xyz", format!("Invalid coordinate '{}'", value))
                    })?;
                    position[k] = coord * ANGSTROM_TO_BOHR;
                }

                symbols.push(parts[0].to_string());
                geometry.push(position);
            }

            let structure = Structure::new(symbols, geometry)
                .with_charge(charge)
                .with_multiplicity(multiplicity);
            frames.push(XyzFrame { structure, comment });
        }

        if frames.is_empty() {
            return Err(CodecError::parse("xyz", "No structures found"));
        }

        Ok(frames)
    }

    /// 转换为 xyz 格式字符串
    pub fn to_xyz(&self, comment: &str) -> String {
        let mut result = format!("{}\n{}\n", self.natoms(), comment);

        for (symbol, p) in self.symbols.iter().zip(self.geometry_angstrom()) {
            result.push_str(&format!(
                "{:<2} {:>18.12} {:>18.12} {:>18.12}\n",
                symbol, p[0], p[1], p[2]
            ));
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WATER_XYZ: &str = "3
water
O    0.000000000000    0.000000000000    0.117300000000
H    0.000000000000    0.757200000000   -0.469200000000
H    0.000000000000   -0.757200000000   -0.469200000000
";

    #[test]
    fn test_from_xyz_converts_to_bohr() {
        let water = Structure::from_xyz(WATER_XYZ, 0, 1).unwrap();

        assert_eq!(water.natoms(), 3);
        assert_eq!(water.symbols, vec!["O", "H", "H"]);
        assert!((water.geometry[1][1] - 0.7572 * ANGSTROM_TO_BOHR).abs() < 1e-10);
    }

    #[test]
    fn test_xyz_round_trip() {
        let water = Structure::from_xyz(WATER_XYZ, -1, 2).unwrap();

        let text = water.to_xyz("round trip");
        let parsed = Structure::from_xyz(&text, -1, 2).unwrap();

        assert_eq!(parsed.symbols, water.symbols);
        assert_eq!(parsed.charge, -1);
        assert_eq!(parsed.multiplicity, 2);
        for (a, b) in parsed.geometry.iter().zip(&water.geometry) {
            for k in 0..3 {
                assert!((a[k] - b[k]).abs() < 1e-8);
            }
        }
    }

    #[test]
    fn test_from_xyz_multi_keeps_comments() {
        let text = format!("{}\n{}", WATER_XYZ, WATER_XYZ.replace("water", "-76.02"));
        let frames = Structure::from_xyz_multi(&text, 0, 1).unwrap();

        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0].comment, "water");
        assert_eq!(frames[1].comment, "-76.02");
    }

    #[test]
    fn test_from_xyz_truncated_frame() {
        let text = "3\ncomment\nO 0.0 0.0 0.0\n";
        assert!(Structure::from_xyz_multi(text, 0, 1).is_err());
    }

    #[test]
    fn test_from_xyz_huge_atom_count() {
        let text = "18446744073709551615\ncomment\nH 0.0 0.0 0.0\n";
        assert!(matches!(
            Structure::from_xyz_multi(text, 0, 1),
            Err(CodecError::ParseError { .. })
        ));
    }

    #[test]
    fn test_from_xyz_rejects_multiple_frames() {
        let text = format!("{}{}", WATER_XYZ, WATER_XYZ);
        assert!(Structure::from_xyz(&text, 0, 1).is_err());
    }

    #[test]
    fn test_formula() {
        let water = Structure::from_xyz(WATER_XYZ, 0, 1).unwrap();
        assert_eq!(water.formula(), "H2O");
    }
}
