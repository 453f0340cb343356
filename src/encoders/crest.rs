//! # CREST 输入编码器
//!
//! 生成 CREST 的 TOML 输入文件与 xyz 结构文件。
//! 关键字原样写入 TOML；`threads`, `input`, `runtype` 自动补全，
//! 每个 `[[calculation.level]]` 写入方法、电荷与未成对电子数。
//!
//! ## 依赖关系
//! - 被 `encoders/mod.rs` 登记
//! - 使用 `toml` 序列化，`num_cpus` 确定默认线程数

use super::{encoder_error, EncoderSpec, RendererSpec};
use crate::error::Result;
use crate::models::{CalcType, ProgramInput};
use crate::parsers::crest::PROGRAM;

use toml::{Table, Value};

pub const INPUT_FILENAME: &str = "input.toml";
pub const STRUCTURE_FILENAME: &str = "structure.xyz";

/// 由结构化字段给出的关键字
const STRUCTURED_KEYWORDS: &[&str] = &["charge", "uhf"];

pub fn encoder() -> EncoderSpec {
    EncoderSpec {
        program: PROGRAM,
        calctypes: &[
            CalcType::ConformerSearch,
            CalcType::Optimization,
            CalcType::Energy,
            CalcType::Gradient,
            CalcType::Hessian,
        ],
        validate: Some(validate),
        renderers: vec![
            RendererSpec {
                name: "toml",
                filename: INPUT_FILENAME,
                render: render_toml,
            },
            RendererSpec {
                name: "structure",
                filename: STRUCTURE_FILENAME,
                render: render_structure,
            },
        ],
    }
}

/// 计算类型允许的 runtype，第一个为默认值
fn runtypes(calctype: CalcType) -> &'static [&'static str] {
    match calctype {
        CalcType::ConformerSearch => &["imtd-gc", "imtd-smtd", "entropy", "nci", "nci-mtd"],
        CalcType::Optimization => &["optimize", "ancopt"],
        CalcType::Energy | CalcType::Gradient => &["singlepoint"],
        CalcType::Hessian => &["numhess"],
        CalcType::TransitionState => &[],
    }
}

fn validate(input: &ProgramInput) -> Result<()> {
    for key in STRUCTURED_KEYWORDS {
        if input.keywords.contains_key(*key) {
            return Err(encoder_error(
                PROGRAM,
                format!(
                    "'{}' should not be set in keywords. It is already set on the structure",
                    key
                ),
            ));
        }
    }

    if let Some(runtype) = input.keywords.get("runtype") {
        let valid = runtypes(input.calctype);
        if !runtype.as_str().is_some_and(|r| valid.contains(&r)) {
            return Err(encoder_error(
                PROGRAM,
                format!(
                    "Unsupported runtype {} for calctype {}. Valid runtypes are: {}",
                    runtype,
                    input.calctype,
                    valid.join(", ")
                ),
            ));
        }
    }

    Ok(())
}

/// 构造 TOML 文档
pub fn to_toml_table(input: &ProgramInput) -> Result<Table> {
    let mut doc = Table::new();
    for (key, value) in &input.keywords {
        let value = Value::try_from(value).map_err(|e| {
            encoder_error(PROGRAM, format!("Keyword '{}' cannot be written as TOML: {}", key, e))
        })?;
        doc.insert(key.clone(), value);
    }

    if !doc.contains_key("threads") {
        doc.insert("threads".to_string(), Value::Integer(num_cpus::get() as i64));
    }
    doc.insert(
        "input".to_string(),
        Value::String(STRUCTURE_FILENAME.to_string()),
    );
    if !doc.contains_key("runtype") {
        let runtype = runtypes(input.calctype).first().ok_or_else(|| {
            encoder_error(
                PROGRAM,
                format!("No default runtype for calctype {}", input.calctype),
            )
        })?;
        doc.insert("runtype".to_string(), Value::String(runtype.to_string()));
    }

    let mut calculation = match doc.remove("calculation") {
        None => Table::new(),
        Some(Value::Table(table)) => table,
        Some(_) => return Err(encoder_error(PROGRAM, "'calculation' must be a table")),
    };
    let mut levels = match calculation.remove("level") {
        None => Vec::new(),
        Some(Value::Array(levels)) => levels,
        Some(_) => {
            return Err(encoder_error(
                PROGRAM,
                "'calculation.level' must be an array of tables",
            ))
        }
    };
    if levels.is_empty() {
        levels.push(Value::Table(Table::new()));
    }

    for level in &mut levels {
        let Value::Table(level) = level else {
            return Err(encoder_error(
                PROGRAM,
                "'calculation.level' must be an array of tables",
            ));
        };
        level.insert(
            "method".to_string(),
            Value::String(input.model.method.clone()),
        );
        level.insert(
            "charge".to_string(),
            Value::Integer(i64::from(input.structure.charge)),
        );
        level.insert(
            "uhf".to_string(),
            Value::Integer(i64::from(input.structure.multiplicity) - 1),
        );
    }

    calculation.insert("level".to_string(), Value::Array(levels));
    doc.insert("calculation".to_string(), Value::Table(calculation));

    Ok(doc)
}

fn render_toml(input: &ProgramInput) -> Result<String> {
    Ok(toml::to_string(&to_toml_table(input)?)?)
}

fn render_structure(input: &ProgramInput) -> Result<String> {
    Ok(input.structure.to_xyz(&input.structure.formula()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoders::EncoderRegistry;
    use crate::error::CodecError;
    use crate::models::{Model, Structure};
    use serde_json::json;

    fn methane_cation(calctype: CalcType) -> ProgramInput {
        let structure = Structure::new(
            vec!["C".to_string(), "H".to_string()],
            vec![[0.0; 3], [0.0, 0.0, 2.0]],
        )
        .with_charge(1)
        .with_multiplicity(2);
        ProgramInput::new(
            calctype,
            structure,
            Model {
                method: "gfn2".to_string(),
                basis: None,
            },
        )
    }

    #[test]
    fn test_toml_defaults() {
        let doc = to_toml_table(&methane_cation(CalcType::ConformerSearch)).unwrap();

        assert_eq!(doc["runtype"].as_str(), Some("imtd-gc"));
        assert_eq!(doc["input"].as_str(), Some(STRUCTURE_FILENAME));
        assert_eq!(doc["threads"].as_integer(), Some(num_cpus::get() as i64));

        let levels = doc["calculation"]["level"].as_array().unwrap();
        assert_eq!(levels.len(), 1);
        assert_eq!(levels[0]["method"].as_str(), Some("gfn2"));
        assert_eq!(levels[0]["charge"].as_integer(), Some(1));
        assert_eq!(levels[0]["uhf"].as_integer(), Some(1));
    }

    #[test]
    fn test_keywords_kept_and_levels_filled() {
        let input = methane_cation(CalcType::Optimization)
            .with_keyword("threads", 4)
            .with_keyword("runtype", "ancopt")
            .with_keyword(
                "calculation",
                json!({"level": [{"alpb": "water"}, {"method": "gfnff"}], "hess_update": "bfgs"}),
            );

        let doc = to_toml_table(&input).unwrap();
        assert_eq!(doc["threads"].as_integer(), Some(4));
        assert_eq!(doc["runtype"].as_str(), Some("ancopt"));
        assert_eq!(doc["calculation"]["hess_update"].as_str(), Some("bfgs"));

        let levels = doc["calculation"]["level"].as_array().unwrap();
        assert_eq!(levels.len(), 2);
        assert_eq!(levels[0]["alpb"].as_str(), Some("water"));
        for level in levels {
            assert_eq!(level["method"].as_str(), Some("gfn2"));
        }
    }

    #[test]
    fn test_encode_writes_parseable_toml() {
        let native = EncoderRegistry::builtin()
            .encode(PROGRAM, &methane_cation(CalcType::Hessian))
            .unwrap();

        let parsed: Table = toml::from_str(native.get(INPUT_FILENAME).unwrap()).unwrap();
        assert_eq!(parsed["runtype"].as_str(), Some("numhess"));
        assert!(native.get(STRUCTURE_FILENAME).unwrap().starts_with("2\n"));
    }

    #[test]
    fn test_invalid_keywords() {
        let registry = EncoderRegistry::builtin();

        let input = methane_cation(CalcType::Energy).with_keyword("uhf", 1);
        assert!(matches!(
            registry.encode(PROGRAM, &input),
            Err(CodecError::EncoderError { .. })
        ));

        let input = methane_cation(CalcType::Energy).with_keyword("runtype", "numhess");
        assert!(matches!(
            registry.encode(PROGRAM, &input),
            Err(CodecError::EncoderError { .. })
        ));

        assert!(matches!(
            registry.encode(PROGRAM, &methane_cation(CalcType::TransitionState)),
            Err(CodecError::EncoderError { .. })
        ));
    }
}
