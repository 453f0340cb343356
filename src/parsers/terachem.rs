//! # TeraChem 解析器
//!
//! 从 TeraChem 标准输出中提取能量、梯度、Hessian 与计算信息，
//! 并从 stdout 或输出目录中的 `tc.in` 回读计算输入。
//!
//! ## 文件
//! - stdout: 主日志，同时决定计算类型；含程序报告的失败信息
//! - `tc.in`: 原生输入文件（关键字 + 坐标文件名）
//!
//! 方法与基组优先取自 stdout，stdout 中没有时才读 `tc.in`，
//! 同一字段不会由两个来源同时写入。
//!
//! ## 依赖关系
//! - 被 `parsers/mod.rs` 汇总为内置程序
//! - 被 `encoders/terachem.rs` 使用（`RUN_TYPES`）
//! - 使用 `models/structure.rs`

use super::{chunk3, parse_f64, parse_floats, re_search, read_output_file, to_value};
use crate::error::{CodecError, Result};
use crate::models::{CalcType, FileKind, ProgramInput, Structure};
use crate::registry::{ParserSpec, ProgramSpec};

use regex::Regex;
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::LazyLock;

pub const PROGRAM: &str = "terachem";

/// 原生输入文件名
pub const INPUT_FILENAME: &str = "tc.in";

/// 输出目录中可识别的文件
pub const FILES: &[(&str, FileKind)] = &[(INPUT_FILENAME, FileKind::Input)];

/// 计算类型 <-> `run` 关键字
pub const RUN_TYPES: &[(CalcType, &str)] = &[
    (CalcType::Energy, "energy"),
    (CalcType::Gradient, "gradient"),
    (CalcType::Hessian, "frequencies"),
    (CalcType::Optimization, "minimize"),
    (CalcType::TransitionState, "ts"),
];

const SINGLE_POINT: &[CalcType] = &[CalcType::Energy, CalcType::Gradient, CalcType::Hessian];

/// stdout 中标识计算类型的标记，按顺序匹配
const CALCTYPE_MARKERS: &[(&str, CalcType)] = &[
    ("SINGLE POINT ENERGY CALCULATIONS", CalcType::Energy),
    ("SINGLE POINT GRADIENT CALCULATIONS", CalcType::Gradient),
    (" FREQUENCY ANALYSIS ", CalcType::Hessian),
];

static ENERGY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"FINAL ENERGY: (-?\d+(?:\.\d+)?)").unwrap());

// 表头之后连续的 "x y z" 行，直到分隔线
static GRADIENT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"dE/dX\s+dE/dY\s+dE/dZ[ \t]*\r?\n((?:[ \t]*-?\d+\.\d+[ \t]+-?\d+\.\d+[ \t]+-?\d+\.\d+[ \t]*\r?\n)+)",
    )
    .unwrap()
});

// 行号 + 若干科学计数法数值；表头只有列号，不会匹配
static HESSIAN_ROW_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^[ \t]*(\d+)((?:[ \t]+-?\d\.\d{15}e[+-]\d{2})+)[ \t]*\r?$").unwrap()
});

static NATOMS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Total atoms:\s*(\d+)").unwrap());
static NMO_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Total orbitals:\s*(\d+)").unwrap());
static VERSION_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"TeraChem (v\S*)").unwrap());

static FAILURE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"DIE called at line number .*|CUDA error:.*").unwrap());

static STDOUT_METHOD_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"Method: (\S+)").unwrap());
static STDOUT_BASIS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Using basis set: (\S+)").unwrap());
static STDOUT_XYZ_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"XYZ coordinates[ \t]+(\S+)").unwrap());
static STDOUT_CHARGE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Total charge:\s*(-?\d+)").unwrap());
static STDOUT_SPINMULT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Spin multiplicity:\s*(\d+)").unwrap());

static METHOD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?mi)^[ \t]*method[ \t]+(\S+)").unwrap());
static BASIS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?mi)^[ \t]*basis[ \t]+(\S+)").unwrap());
static RUN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?mi)^[ \t]*run[ \t]+(\S+)").unwrap());
static COORDINATES_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?mi)^[ \t]*coordinates[ \t]+(\S+)").unwrap());
static CHARGE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?mi)^[ \t]*charge[ \t]+(-?\d+)").unwrap());
static SPINMULT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?mi)^[ \t]*spinmult[ \t]+(\d+)").unwrap());

/// TeraChem 程序描述
pub fn program() -> ProgramSpec {
    ProgramSpec {
        name: PROGRAM,
        classifier: Some(classify),
        files: FILES,
        parsers: vec![
            ParserSpec::text("parse_failure", FileKind::Stdout, "extras.failure", parse_failure)
                .optional(),
            ParserSpec::text("parse_energy", FileKind::Stdout, "energy", parse_energy),
            ParserSpec::text("parse_gradient", FileKind::Stdout, "gradient", parse_gradient)
                .only(&[CalcType::Gradient, CalcType::Hessian]),
            ParserSpec::text("parse_hessian", FileKind::Stdout, "hessian", parse_hessian)
                .only(&[CalcType::Hessian]),
            ParserSpec::text("parse_natoms", FileKind::Stdout, "calcinfo_natoms", parse_natoms)
                .optional(),
            ParserSpec::text("parse_nmo", FileKind::Stdout, "calcinfo_nmo", parse_nmo).optional(),
            ParserSpec::text(
                "parse_version",
                FileKind::Stdout,
                "extras.program_version",
                parse_version,
            )
            .optional(),
            ParserSpec::text(
                "parse_method",
                FileKind::Stdout,
                "input_data.model.method",
                parse_method,
            )
            .only(SINGLE_POINT)
            .optional(),
            ParserSpec::text(
                "parse_basis",
                FileKind::Stdout,
                "input_data.model.basis",
                parse_basis,
            )
            .only(SINGLE_POINT)
            .optional(),
            ParserSpec::text(
                "parse_input_calctype",
                FileKind::Input,
                "input_data.calctype",
                parse_input_calctype,
            )
            .only(SINGLE_POINT)
            .optional(),
            ParserSpec::directory_mapping("parse_input_model", parse_input_model)
                .only(SINGLE_POINT)
                .optional(),
            ParserSpec::directory(
                "parse_input_structure",
                "input_data.structure",
                parse_input_structure,
            )
            .only(SINGLE_POINT)
            .optional(),
        ],
    }
}

/// 根据 stdout 中的标记判断计算类型
pub fn classify(content: &str) -> Result<CalcType> {
    CALCTYPE_MARKERS
        .iter()
        .find(|(marker, _)| content.contains(marker))
        .map(|(_, calctype)| *calctype)
        .ok_or_else(|| CodecError::not_found("TeraChem calculation type marker"))
}

/// `run` 关键字对应的计算类型
pub fn calctype_from_run(run: &str) -> Result<CalcType> {
    let run = run.to_lowercase();
    RUN_TYPES
        .iter()
        .find(|(_, name)| *name == run)
        .map(|(calctype, _)| *calctype)
        .ok_or_else(|| CodecError::parse("tc.in", format!("Unknown run type '{}'", run)))
}

/// 程序自身报告的失败；找到时中止解码并带出原始信息
pub fn parse_failure(content: &str) -> Result<Value> {
    match FAILURE_RE.find(content) {
        Some(m) => Err(CodecError::CalculationFailed {
            program: PROGRAM.to_string(),
            message: m.as_str().trim().to_string(),
        }),
        None => Err(CodecError::not_found(FAILURE_RE.as_str())),
    }
}

/// 最终能量；频率计算中有多个能量时取第一个
pub fn parse_energy(content: &str) -> Result<Value> {
    let energy = parse_f64(re_search(&ENERGY_RE, content)?, "TeraChem energy")?;
    Ok(json!(energy))
}

pub fn parse_gradient(content: &str) -> Result<Value> {
    let block = re_search(&GRADIENT_RE, content)?;
    let values = parse_floats(block, "TeraChem gradient")?;
    to_value(&chunk3(&values, "TeraChem gradient")?)
}

/// Hessian 按每块若干列打印，同一行号的数值按块顺序拼接
pub fn parse_hessian(content: &str) -> Result<Value> {
    let mut rows: BTreeMap<usize, Vec<f64>> = BTreeMap::new();

    for caps in HESSIAN_ROW_RE.captures_iter(content) {
        let index: usize = caps[1]
            .parse()
            .map_err(|_| CodecError::parse("TeraChem hessian", "Invalid row index"))?;
        rows.entry(index)
            .or_default()
            .extend(parse_floats(&caps[2], "TeraChem hessian")?);
    }

    if rows.is_empty() {
        return Err(CodecError::not_found(HESSIAN_ROW_RE.as_str()));
    }

    let n = rows.len();
    for (expected, (index, row)) in (1..=n).zip(&rows) {
        if *index != expected || row.len() != n {
            return Err(CodecError::parse(
                "TeraChem hessian",
                format!(
                    "Hessian should be a square matrix; row {} has {} of {} values",
                    index,
                    row.len(),
                    n
                ),
            ));
        }
    }

    to_value(&rows.into_values().collect::<Vec<_>>())
}

pub fn parse_natoms(content: &str) -> Result<Value> {
    let natoms: usize = re_search(&NATOMS_RE, content)?
        .parse()
        .map_err(|_| CodecError::parse("TeraChem stdout", "Invalid atom count"))?;
    Ok(json!(natoms))
}

pub fn parse_nmo(content: &str) -> Result<Value> {
    let nmo: usize = re_search(&NMO_RE, content)?
        .parse()
        .map_err(|_| CodecError::parse("TeraChem stdout", "Invalid orbital count"))?;
    Ok(json!(nmo))
}

pub fn parse_version(content: &str) -> Result<Value> {
    Ok(json!(re_search(&VERSION_RE, content)?))
}

pub fn parse_method(content: &str) -> Result<Value> {
    Ok(json!(re_search(&STDOUT_METHOD_RE, content)?))
}

pub fn parse_basis(content: &str) -> Result<Value> {
    Ok(json!(re_search(&STDOUT_BASIS_RE, content)?))
}

pub fn parse_input_calctype(content: &str) -> Result<Value> {
    to_value(&calctype_from_run(re_search(&RUN_RE, content)?)?)
}

/// `tc.in` 中的方法与基组，跳过 stdout 已经给出的字段
pub fn parse_input_model(
    directory: &Path,
    stdout: Option<&str>,
    _input: Option<&ProgramInput>,
) -> Result<Value> {
    let tcin = read_output_file(&directory.join(INPUT_FILENAME))?;
    let in_stdout = |re: &Regex| stdout.is_some_and(|text| re.is_match(text));

    let mut values = Map::new();
    if !in_stdout(&STDOUT_METHOD_RE) {
        let method = re_search(&METHOD_RE, &tcin)
            .map_err(|_| CodecError::parse(INPUT_FILENAME, "No method keyword"))?;
        values.insert("input_data.model.method".to_string(), json!(method));
    }
    if !in_stdout(&STDOUT_BASIS_RE) {
        if let Ok(basis) = re_search(&BASIS_RE, &tcin) {
            values.insert("input_data.model.basis".to_string(), json!(basis));
        }
    }

    Ok(Value::Object(values))
}

/// 回读分子结构：优先 `tc.in` 的坐标文件，没有 `tc.in` 时使用 stdout 中的
/// `XYZ coordinates`、`Total charge` 与 `Spin multiplicity`
pub fn parse_input_structure(
    directory: &Path,
    stdout: Option<&str>,
    _input: Option<&ProgramInput>,
) -> Result<Value> {
    let (source, xyz, charge_re, spinmult_re) =
        match read_output_file(&directory.join(INPUT_FILENAME)) {
            Ok(tcin) => {
                let xyz = re_search(&COORDINATES_RE, &tcin)?.to_string();
                (tcin, xyz, &*CHARGE_RE, &*SPINMULT_RE)
            }
            Err(e) if e.is_not_found() => {
                let text = stdout.ok_or_else(|| CodecError::not_found(STDOUT_XYZ_RE.as_str()))?;
                let xyz = re_search(&STDOUT_XYZ_RE, text)?.to_string();
                (text.to_string(), xyz, &*STDOUT_CHARGE_RE, &*STDOUT_SPINMULT_RE)
            }
            Err(e) => return Err(e),
        };

    let charge = int_or(charge_re, &source, 0, "charge")?;
    let multiplicity = int_or(spinmult_re, &source, 1, "spin multiplicity")?;

    let structure =
        Structure::from_xyz(&read_output_file(&directory.join(xyz))?, charge, multiplicity)?;
    to_value(&structure)
}

/// 整数字段，缺省时取默认值
fn int_or<T: std::str::FromStr>(re: &Regex, text: &str, default: T, what: &str) -> Result<T> {
    match re_search(re, text) {
        Ok(v) => v
            .parse()
            .map_err(|_| CodecError::parse("TeraChem input", format!("Invalid {} '{}'", what, v))),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    const GRADIENT_OUT: &str = r"
       *********************************************************
       *                 TeraChem v1.9-2022.03-dev             *
       *********************************************************
XYZ coordinates geometry.xyz
Using basis set: 6-31gs
Method: b3lyp
Total atoms:    3
Total charge:    0
Spin multiplicity: 1
Total orbitals: 13
         *** SINGLE POINT GRADIENT CALCULATIONS ***
FINAL ENERGY: -74.9629193365 a.u.
                dE/dX            dE/dY            dE/dZ
   -0.0000000000     0.0000000000    -0.0432327823
   -0.0000000000    -0.0173226474     0.0216163912
    0.0000000000     0.0173226474     0.0216163912
---------------------------------------------------
Job finished
";

    const HESSIAN_OUT: &str = r"
 *** FREQUENCY ANALYSIS ***
FINAL ENERGY: -0.4998098326 a.u.
FINAL ENERGY: -0.4998098330 a.u.
                dE/dX            dE/dY            dE/dZ
    0.0000000000     0.0000000000     0.0000000001
---------------------------------------------------
*** Hessian Matrix (Hartree/Bohr^2) ***
               1                   2
     1     0.123456789012345e+00    0.000000000000000e+00
     2     0.000000000000000e+00    0.223456789012345e+00
     3    -0.100000000000000e-01    0.000000000000000e+00

               3
     1    -0.100000000000000e-01
     2     0.000000000000000e+00
     3     0.323456789012345e+00
";

    #[test]
    fn test_classify() {
        assert_eq!(classify(GRADIENT_OUT).unwrap(), CalcType::Gradient);
        assert_eq!(classify(HESSIAN_OUT).unwrap(), CalcType::Hessian);
        assert_eq!(
            classify("SINGLE POINT ENERGY CALCULATIONS").unwrap(),
            CalcType::Energy
        );
        assert!(classify("no markers").unwrap_err().is_not_found());
    }

    #[test]
    fn test_parse_energy_takes_first() {
        assert_eq!(parse_energy(GRADIENT_OUT).unwrap(), json!(-74.9629193365));
        assert_eq!(parse_energy(HESSIAN_OUT).unwrap(), json!(-0.4998098326));
        assert_eq!(
            parse_energy("FINAL ENERGY: -5.0734025156 a.u.").unwrap(),
            json!(-5.0734025156)
        );
    }

    #[test]
    fn test_parse_gradient() {
        let gradient = parse_gradient(GRADIENT_OUT).unwrap();
        assert_eq!(
            gradient,
            json!([
                [-0.0, 0.0, -0.0432327823],
                [-0.0, -0.0173226474, 0.0216163912],
                [0.0, 0.0173226474, 0.0216163912]
            ])
        );
        assert!(parse_gradient("FINAL ENERGY: -1.0").unwrap_err().is_not_found());
    }

    #[test]
    fn test_parse_hessian_joins_column_blocks() {
        let hessian = parse_hessian(HESSIAN_OUT).unwrap();
        assert_eq!(
            hessian,
            json!([
                [0.123456789012345, 0.0, -0.01],
                [0.0, 0.223456789012345, 0.0],
                [-0.01, 0.0, 0.323456789012345]
            ])
        );
    }

    #[test]
    fn test_parse_hessian_not_square() {
        let text = "     1     0.100000000000000e+00    0.000000000000000e+00\n";
        assert!(matches!(
            parse_hessian(text),
            Err(CodecError::ParseError { .. })
        ));
        assert!(parse_hessian(GRADIENT_OUT).unwrap_err().is_not_found());
    }

    #[test]
    fn test_parse_calcinfo() {
        assert_eq!(parse_natoms(GRADIENT_OUT).unwrap(), json!(3));
        assert_eq!(parse_nmo(GRADIENT_OUT).unwrap(), json!(13));
        assert_eq!(parse_version(GRADIENT_OUT).unwrap(), json!("v1.9-2022.03-dev"));
    }

    #[test]
    fn test_parse_stdout_model() {
        assert_eq!(parse_method(GRADIENT_OUT).unwrap(), json!("b3lyp"));
        assert_eq!(parse_basis(GRADIENT_OUT).unwrap(), json!("6-31gs"));
        assert!(parse_method(HESSIAN_OUT).unwrap_err().is_not_found());
    }

    #[test]
    fn test_parse_failure() {
        let die = "FINAL ENERGY: -1.0\nDIE called at line number 3862 in file terachem/basis.cpp\n";
        match parse_failure(die).unwrap_err() {
            CodecError::CalculationFailed { program, message } => {
                assert_eq!(program, "terachem");
                assert_eq!(message, "DIE called at line number 3862 in file terachem/basis.cpp");
            }
            other => panic!("unexpected error: {other}"),
        }

        let cuda = "CUDA error: out of memory\n";
        assert!(parse_failure(cuda)
            .unwrap_err()
            .to_string()
            .contains("CUDA error: out of memory"));
        assert!(parse_failure(GRADIENT_OUT).unwrap_err().is_not_found());
    }

    #[test]
    fn test_parse_input_calctype() {
        let tcin = "run                  frequencies\nmethod               ub3lyp\n";
        assert_eq!(parse_input_calctype(tcin).unwrap(), json!("hessian"));
        assert!(matches!(
            parse_input_calctype("run md\n"),
            Err(CodecError::ParseError { .. })
        ));
    }

    #[test]
    fn test_parse_input_model() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("tc.in"),
            "run                  frequencies\nmethod               ub3lyp\nbasis                6-31g*\n",
        )
        .unwrap();

        assert_eq!(
            parse_input_model(dir.path(), None, None).unwrap(),
            json!({"input_data.model.method": "ub3lyp", "input_data.model.basis": "6-31g*"})
        );
        assert_eq!(
            parse_input_model(dir.path(), Some("Method: b3lyp\n"), None).unwrap(),
            json!({"input_data.model.basis": "6-31g*"})
        );
        assert_eq!(
            parse_input_model(dir.path(), Some(GRADIENT_OUT), None).unwrap(),
            json!({})
        );

        fs::write(dir.path().join("tc.in"), "run energy\nbasis sto-3g\n").unwrap();
        assert!(matches!(
            parse_input_model(dir.path(), None, None),
            Err(CodecError::ParseError { .. })
        ));
    }

    #[test]
    fn test_parse_input_model_without_tcin() {
        let dir = tempfile::tempdir().unwrap();
        assert!(parse_input_model(dir.path(), Some(GRADIENT_OUT), None)
            .unwrap_err()
            .is_not_found());
    }

    #[test]
    fn test_parse_input_structure() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("tc.in"),
            "run energy\ncoordinates mol.xyz\ncharge -1\nspinmult 2\nmethod hf\n",
        )
        .unwrap();
        fs::write(dir.path().join("mol.xyz"), "1\n\nO 0.0 0.0 0.0\n").unwrap();

        let value = parse_input_structure(dir.path(), None, None).unwrap();
        let structure: Structure = serde_json::from_value(value).unwrap();
        assert_eq!(structure.symbols, vec!["O"]);
        assert_eq!(structure.charge, -1);
        assert_eq!(structure.multiplicity, 2);
    }

    #[test]
    fn test_parse_input_structure_without_tcin() {
        let dir = tempfile::tempdir().unwrap();
        assert!(parse_input_structure(dir.path(), None, None)
            .unwrap_err()
            .is_not_found());
        assert!(parse_input_structure(dir.path(), Some(GRADIENT_OUT), None)
            .unwrap_err()
            .is_not_found());
    }

    #[test]
    fn test_parse_input_structure_from_stdout() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("geometry.xyz"),
            "3\n\nO 0.0 0.0 0.1173\nH 0.0 0.7572 -0.4692\nH 0.0 -0.7572 -0.4692\n",
        )
        .unwrap();
        let stdout = GRADIENT_OUT.replace("Total charge:    0", "Total charge:    -1");

        let value = parse_input_structure(dir.path(), Some(&stdout), None).unwrap();
        let structure: Structure = serde_json::from_value(value).unwrap();
        assert_eq!(structure.symbols, vec!["O", "H", "H"]);
        assert_eq!(structure.charge, -1);
        assert_eq!(structure.multiplicity, 1);
    }

    #[test]
    fn test_decode_gradient_output() {
        let registry = crate::registry::Registry::builtin().unwrap();
        let record = crate::codec::DecodeRequest::new(PROGRAM)
            .stdout(GRADIENT_OUT)
            .decode(&registry)
            .unwrap();

        let sp = record.as_single_point().unwrap();
        assert_eq!(sp.energy, -74.9629193365);
        assert_eq!(sp.gradient.as_ref().unwrap().len(), 3);
        assert_eq!(sp.calcinfo_natoms, Some(3));
        assert_eq!(sp.calcinfo_nmo, Some(13));
        assert_eq!(sp.hessian, None);
        assert_eq!(record.extras()["program_version"], "v1.9-2022.03-dev");

        let model = record.input_data().unwrap().model.as_ref().unwrap();
        assert_eq!(model.method, "b3lyp");
        assert_eq!(model.basis.as_deref(), Some("6-31gs"));
    }

    #[test]
    fn test_decode_hessian_output() {
        let registry = crate::registry::Registry::builtin().unwrap();
        let record = crate::codec::DecodeRequest::new(PROGRAM)
            .stdout(HESSIAN_OUT)
            .decode(&registry)
            .unwrap();

        let sp = record.as_single_point().unwrap();
        assert_eq!(sp.energy, -0.4998098326);
        assert_eq!(sp.gradient, Some(vec![[0.0, 0.0, 0.0000000001]]));
        let hessian = sp.hessian.as_ref().unwrap();
        assert_eq!(hessian.len(), 3);
        assert_eq!(hessian[0], vec![0.123456789012345, 0.0, -0.01]);
        assert_eq!(hessian[2][2], 0.323456789012345);
        assert_eq!(record.input_data(), None);
    }

    #[test]
    fn test_decode_reports_program_failure() {
        let registry = crate::registry::Registry::builtin().unwrap();
        let stdout = "*** SINGLE POINT ENERGY CALCULATIONS ***\nCUDA error: an illegal memory access was encountered\n";

        let err = crate::codec::DecodeRequest::new(PROGRAM)
            .stdout(stdout)
            .decode(&registry)
            .unwrap_err();

        match err {
            CodecError::CalculationFailed { message, .. } => {
                assert_eq!(message, "CUDA error: an illegal memory access was encountered");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_decode_stdout_and_tcin_share_model() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("tc.in"),
            "run gradient\ncoordinates geometry.xyz\nmethod b3lyp\nbasis 6-31gs\n",
        )
        .unwrap();
        fs::write(dir.path().join("geometry.xyz"), "1\n\nO 0.0 0.0 0.0\n").unwrap();

        let registry = crate::registry::Registry::builtin().unwrap();
        let record = crate::codec::DecodeRequest::new(PROGRAM)
            .stdout(GRADIENT_OUT)
            .directory(dir.path())
            .decode(&registry)
            .unwrap();

        let echoed = record.input_data().unwrap();
        assert_eq!(echoed.model.as_ref().unwrap().method, "b3lyp");
        assert_eq!(echoed.calctype, Some(CalcType::Gradient));
        assert_eq!(echoed.structure.as_ref().unwrap().symbols, vec!["O"]);
    }
}
