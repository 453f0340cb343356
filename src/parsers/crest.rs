//! # CREST 解析器
//!
//! CREST 的结果分散在输出目录的多个文件中：
//! - `crest_conformers.xyz` / `crest_rotamers.xyz`: 构象系综，注释行第一个字段为能量
//! - `crestopt.log`: 优化轨迹，注释行第二个字段为能量
//! - `crest.engrad`: 单点能量与梯度
//! - `numhess1`: 数值 Hessian
//! - `g98.out`: g98 格式的频率与简正模
//!
//! CREST 没有计算类型分类器，解码时必须显式指定计算类型。
//!
//! ## 依赖关系
//! - 被 `parsers/mod.rs` 汇总为内置程序
//! - 使用 `models/structure.rs`, `models/results.rs`

use super::{chunk3, parse_f64, parse_floats, re_search, read_output_file, to_value};
use crate::error::{CodecError, Result};
use crate::models::{
    CalcType, FileKind, OptimizationStep, ProgramInput, Structure, ANGSTROM_TO_BOHR,
};
use crate::registry::{ParserSpec, ProgramSpec};

use regex::Regex;
use serde_json::{json, Map, Value};
use std::path::Path;
use std::sync::LazyLock;

pub const PROGRAM: &str = "crest";

pub const CONFORMERS_FILENAME: &str = "crest_conformers.xyz";
pub const ROTAMERS_FILENAME: &str = "crest_rotamers.xyz";
pub const OPTLOG_FILENAME: &str = "crestopt.log";
pub const ENGRAD_FILENAME: &str = "crest.engrad";

/// 输出目录中按内容解析的文件
pub const FILES: &[(&str, FileKind)] = &[
    ("numhess1", FileKind::Hessian),
    ("g98.out", FileKind::Frequencies),
    (ENGRAD_FILENAME, FileKind::EnergyGradient),
];

static VERSION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Version (\d+\.\d+\.\d+),").unwrap());
static ENERGY_NUMHESS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Energy\s=\s*([-+]?\d+\.\d+)\s*Eh").unwrap());
static ENGRAD_ENERGY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"# Energy \( Eh \)\r?\n#*\r?\n\s*([-\d.]+)").unwrap());
static ENGRAD_GRADIENT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"# Gradient \( Eh/a0 \)\r?\n#\s*\n((?:\s*[-\d.]+\r?\n)+)").unwrap()
});
static NUMHESS_FLOAT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[-]?\d*\.\d+|\d+").unwrap());
static G98_FREQS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"Frequencies\s+--\s+(?P<floats>(?:-?\d+\.\d+\s*)+)").unwrap()
});
static G98_BLOCK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Frequencies\s+--").unwrap());
static G98_FLOAT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[-+]?\d*\.\d+").unwrap());

/// CREST 程序描述
pub fn program() -> ProgramSpec {
    ProgramSpec {
        name: PROGRAM,
        classifier: None,
        files: FILES,
        parsers: vec![
            ParserSpec::text(
                "parse_version",
                FileKind::Stdout,
                "extras.program_version",
                parse_version,
            ),
            ParserSpec::text(
                "parse_energy_numhess",
                FileKind::Stdout,
                "energy",
                parse_energy_numhess,
            )
            .only(&[CalcType::Hessian]),
            ParserSpec::directory_mapping("parse_conformers", parse_conformers)
                .only(&[CalcType::ConformerSearch]),
            ParserSpec::directory_mapping("parse_rotamers", parse_rotamers)
                .only(&[CalcType::ConformerSearch])
                .optional(),
            ParserSpec::directory("parse_trajectory", "trajectory", parse_trajectory)
                .only(&[CalcType::Optimization]),
            ParserSpec::text("parse_energy", FileKind::EnergyGradient, "energy", parse_energy)
                .only(&[CalcType::Energy, CalcType::Gradient]),
            ParserSpec::text(
                "parse_gradient",
                FileKind::EnergyGradient,
                "gradient",
                parse_gradient,
            )
            .only(&[CalcType::Energy, CalcType::Gradient]),
            ParserSpec::text("parse_numhess", FileKind::Hessian, "hessian", parse_numhess)
                .only(&[CalcType::Hessian]),
            ParserSpec::text(
                "parse_g98_freqs",
                FileKind::Frequencies,
                "freqs_wavenumber",
                parse_g98_freqs,
            )
            .only(&[CalcType::Hessian]),
            ParserSpec::text(
                "parse_g98_normal_modes",
                FileKind::Frequencies,
                "normal_modes_cartesian",
                parse_g98_normal_modes,
            )
            .only(&[CalcType::Hessian]),
        ],
    }
}

/// 与 `crest --version` 输出格式一致的版本号
pub fn parse_version(content: &str) -> Result<Value> {
    Ok(json!(re_search(&VERSION_RE, content)?))
}

/// 数值 Hessian 计算前的单点能量
pub fn parse_energy_numhess(content: &str) -> Result<Value> {
    let energy = parse_f64(re_search(&ENERGY_NUMHESS_RE, content)?, "CREST stdout")?;
    Ok(json!(energy))
}

pub fn parse_energy(content: &str) -> Result<Value> {
    let energy = parse_f64(re_search(&ENGRAD_ENERGY_RE, content)?, "crest.engrad")?;
    Ok(json!(energy))
}

pub fn parse_gradient(content: &str) -> Result<Value> {
    to_value(&engrad_gradient(content)?)
}

fn engrad_gradient(content: &str) -> Result<Vec<[f64; 3]>> {
    let block = re_search(&ENGRAD_GRADIENT_RE, content)?;
    chunk3(&parse_floats(block, "crest.engrad")?, "crest.engrad")
}

pub fn parse_numhess(content: &str) -> Result<Value> {
    let numbers = NUMHESS_FLOAT_RE
        .find_iter(content)
        .map(|m| parse_f64(m.as_str(), "numhess1"))
        .collect::<Result<Vec<f64>>>()?;

    if numbers.is_empty() {
        return Err(CodecError::not_found(NUMHESS_FLOAT_RE.as_str()));
    }

    let n = (numbers.len() as f64).sqrt().round() as usize;
    if n * n != numbers.len() {
        return Err(CodecError::parse(
            "numhess1",
            format!("Expected a square matrix, found {} elements", numbers.len()),
        ));
    }

    to_value(&numbers.chunks_exact(n).map(<[f64]>::to_vec).collect::<Vec<_>>())
}

/// 所有振动频率 (cm^-1)
pub fn parse_g98_freqs(content: &str) -> Result<Value> {
    let mut freqs = Vec::new();
    for caps in G98_FREQS_RE.captures_iter(content) {
        freqs.extend(parse_floats(&caps["floats"], "g98.out")?);
    }

    if freqs.is_empty() {
        return Err(CodecError::not_found(G98_FREQS_RE.as_str()));
    }
    to_value(&freqs)
}

/// 简正模位移 (n_modes x n_atoms x 3)，单位转换为 Bohr
pub fn parse_g98_normal_modes(content: &str) -> Result<Value> {
    let starts: Vec<usize> = G98_BLOCK_RE.find_iter(content).map(|m| m.start()).collect();
    if starts.is_empty() {
        return Err(CodecError::not_found(G98_BLOCK_RE.as_str()));
    }

    let mut modes: Vec<Vec<[f64; 3]>> = Vec::new();

    for (i, &start) in starts.iter().enumerate() {
        let end = starts.get(i + 1).copied().unwrap_or(content.len());
        let block = &content[start..end];

        // "Frequencies -- f1 f2 f3"
        let n_freqs = block
            .lines()
            .next()
            .map(|line| line.split_whitespace().skip(2).count())
            .unwrap_or(0);

        let Some((_, table)) = block.split_once("Atom AN") else {
            return Err(CodecError::parse(
                "g98.out",
                "Frequency block has no displacement table",
            ));
        };

        let values = G98_FLOAT_RE
            .find_iter(table)
            .map(|m| parse_f64(m.as_str(), "g98.out"))
            .collect::<Result<Vec<f64>>>()?;

        let row_len = 3 * n_freqs;
        if row_len == 0 || values.len() % row_len != 0 {
            return Err(CodecError::parse(
                "g98.out",
                format!(
                    "Found {} displacements for {} frequencies",
                    values.len(),
                    n_freqs
                ),
            ));
        }

        let mut block_modes = vec![Vec::new(); n_freqs];
        for atom in values.chunks_exact(row_len) {
            for (j, mode) in block_modes.iter_mut().enumerate() {
                let d = &atom[3 * j..3 * j + 3];
                mode.push([
                    d[0] * ANGSTROM_TO_BOHR,
                    d[1] * ANGSTROM_TO_BOHR,
                    d[2] * ANGSTROM_TO_BOHR,
                ]);
            }
        }
        modes.extend(block_modes);
    }

    to_value(&modes)
}

pub fn parse_conformers(
    directory: &Path,
    _stdout: Option<&str>,
    input: Option<&ProgramInput>,
) -> Result<Value> {
    parse_ensemble(
        &directory.join(CONFORMERS_FILENAME),
        input,
        "conformers",
        "conformer_energies",
    )
}

pub fn parse_rotamers(
    directory: &Path,
    _stdout: Option<&str>,
    input: Option<&ProgramInput>,
) -> Result<Value> {
    parse_ensemble(
        &directory.join(ROTAMERS_FILENAME),
        input,
        "rotamers",
        "rotamer_energies",
    )
}

/// 优化轨迹；存在 `crest.engrad` 时补上最后一步的梯度，否则末步标记为失败
pub fn parse_trajectory(
    directory: &Path,
    _stdout: Option<&str>,
    input: Option<&ProgramInput>,
) -> Result<Value> {
    let (charge, multiplicity) = charge_and_multiplicity(input);
    let log = read_output_file(&directory.join(OPTLOG_FILENAME))?;

    let mut trajectory = Structure::from_xyz_multi(&log, charge, multiplicity)?
        .into_iter()
        .map(|frame| {
            Ok(OptimizationStep {
                energy: comment_energy(&frame.comment, 1)?,
                structure: frame.structure,
                gradient: None,
                success: true,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let engrad = directory.join(ENGRAD_FILENAME);
    if let Some(last) = trajectory.last_mut() {
        if engrad.is_file() {
            last.gradient = Some(engrad_gradient(&read_output_file(&engrad)?)?);
        } else {
            last.success = false;
        }
    }

    to_value(&trajectory)
}

fn parse_ensemble(
    path: &Path,
    input: Option<&ProgramInput>,
    structures_key: &str,
    energies_key: &str,
) -> Result<Value> {
    let (charge, multiplicity) = charge_and_multiplicity(input);
    let frames = Structure::from_xyz_multi(&read_output_file(path)?, charge, multiplicity)?;

    let energies = frames
        .iter()
        .map(|frame| comment_energy(&frame.comment, 0))
        .collect::<Result<Vec<f64>>>()?;
    let structures: Vec<Structure> = frames.into_iter().map(|frame| frame.structure).collect();

    let mut values = Map::new();
    values.insert(structures_key.to_string(), to_value(&structures)?);
    values.insert(energies_key.to_string(), to_value(&energies)?);
    Ok(Value::Object(values))
}

/// 从 xyz 注释行的第 `index` 个字段读取能量
fn comment_energy(comment: &str, index: usize) -> Result<f64> {
    let token = comment.split_whitespace().nth(index).ok_or_else(|| {
        CodecError::parse("xyz", format!("No energy in comment line '{}'", comment))
    })?;
    parse_f64(token, "xyz comment")
}

fn charge_and_multiplicity(input: Option<&ProgramInput>) -> (i32, u32) {
    input
        .map(|i| (i.structure.charge, i.structure.multiplicity))
        .unwrap_or((0, 1))
}
