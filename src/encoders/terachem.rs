//! # TeraChem 输入编码器
//!
//! 生成 `tc.in`（每行 `关键字 值`，关键字左对齐到固定宽度）
//! 以及其引用的 xyz 坐标文件。
//!
//! ## 依赖关系
//! - 被 `encoders/mod.rs` 登记
//! - 使用 `parsers/terachem.rs` 中的文件名与 `run` 关键字对照

use super::{encoder_error, EncoderSpec, RendererSpec};
use crate::error::Result;
use crate::models::{CalcType, ProgramInput};
use crate::parsers::terachem::{INPUT_FILENAME, PROGRAM, RUN_TYPES};

use serde_json::Value;

/// 坐标文件名
pub const XYZ_FILENAME: &str = "geometry.xyz";

/// 关键字与值之间的对齐宽度
const PADDING: usize = 20;

/// 由结构化字段给出、不能作为关键字传入的项
const STRUCTURED_KEYWORDS: &[(&str, &str)] = &[
    ("charge", "structure.charge"),
    ("spinmult", "structure.multiplicity"),
    ("run", "calctype"),
    ("basis", "model.basis"),
    ("method", "model.method"),
];

pub fn encoder() -> EncoderSpec {
    EncoderSpec {
        program: PROGRAM,
        calctypes: &[
            CalcType::Energy,
            CalcType::Gradient,
            CalcType::Hessian,
            CalcType::Optimization,
            CalcType::TransitionState,
        ],
        validate: Some(validate),
        renderers: vec![
            RendererSpec {
                name: "run",
                filename: INPUT_FILENAME,
                render: render_run,
            },
            RendererSpec {
                name: "structure",
                filename: INPUT_FILENAME,
                render: render_structure,
            },
            RendererSpec {
                name: "model",
                filename: INPUT_FILENAME,
                render: render_model,
            },
            RendererSpec {
                name: "keywords",
                filename: INPUT_FILENAME,
                render: render_keywords,
            },
            RendererSpec {
                name: "geometry",
                filename: XYZ_FILENAME,
                render: render_geometry,
            },
        ],
    }
}

fn line(key: &str, value: impl std::fmt::Display) -> String {
    format!("{:<width$} {}\n", key, value, width = PADDING)
}

fn validate(input: &ProgramInput) -> Result<()> {
    for (key, field) in STRUCTURED_KEYWORDS {
        if input.keywords.contains_key(*key) {
            return Err(encoder_error(
                PROGRAM,
                format!(
                    "Keyword '{}' should not be set as a keyword. It should be set at '{}'",
                    key, field
                ),
            ));
        }
    }
    Ok(())
}

fn render_run(input: &ProgramInput) -> Result<String> {
    let run = RUN_TYPES
        .iter()
        .find(|(calctype, _)| *calctype == input.calctype)
        .map(|(_, run)| *run)
        .ok_or_else(|| {
            encoder_error(
                PROGRAM,
                format!("No run type for calctype '{}'", input.calctype),
            )
        })?;
    Ok(line("run", run))
}

fn render_structure(input: &ProgramInput) -> Result<String> {
    Ok([
        line("coordinates", XYZ_FILENAME),
        line("charge", input.structure.charge),
        line("spinmult", input.structure.multiplicity),
    ]
    .concat())
}

fn render_model(input: &ProgramInput) -> Result<String> {
    let mut text = line("method", &input.model.method);
    if let Some(basis) = &input.model.basis {
        text.push_str(&line("basis", basis));
    }
    Ok(text)
}

/// 关键字值一律小写（布尔值写作 true/false）
fn render_keywords(input: &ProgramInput) -> Result<String> {
    Ok(input
        .keywords
        .iter()
        .map(|(key, value)| {
            let value = match value {
                Value::String(s) => s.to_lowercase(),
                other => other.to_string().to_lowercase(),
            };
            line(key, value)
        })
        .collect())
}

fn render_geometry(input: &ProgramInput) -> Result<String> {
    Ok(input.structure.to_xyz(&input.structure.formula()))
}
