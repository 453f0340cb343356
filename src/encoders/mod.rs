//! # 编码器模块
//!
//! 将结构化计算输入 (`ProgramInput`) 渲染为程序原生输入文件。
//! 编码器注册表只以程序名为键；每个程序由若干渲染单元组成，
//! 同名文件的渲染结果按登记顺序拼接。
//!
//! ## 依赖关系
//! - 被 `commands/encode.rs` 使用
//! - 使用 `models/input.rs`
//! - 子模块: terachem, crest

pub mod crest;
pub mod terachem;

use crate::error::{CodecError, Result};
use crate::models::{CalcType, NativeInput, ProgramInput};

use std::collections::BTreeMap;
use tracing::{debug, info};

/// 渲染函数：返回文件内容片段
pub type Renderer = fn(&ProgramInput) -> Result<String>;

/// 输入校验函数
pub type Validator = fn(&ProgramInput) -> Result<()>;

/// 渲染单元
pub struct RendererSpec {
    pub name: &'static str,
    /// 输出文件名
    pub filename: &'static str,
    pub render: Renderer,
}

/// 一个程序的编码器描述
pub struct EncoderSpec {
    pub program: &'static str,
    /// 支持的计算类型
    pub calctypes: &'static [CalcType],
    pub validate: Option<Validator>,
    pub renderers: Vec<RendererSpec>,
}

/// 编码器注册表
#[derive(Default)]
pub struct EncoderRegistry {
    encoders: BTreeMap<&'static str, EncoderSpec>,
}

impl EncoderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 包含所有内置程序编码器的注册表
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        registry.register(terachem::encoder());
        registry.register(crest::encoder());
        registry
    }

    /// 登记编码器；同名程序的旧编码器被替换
    pub fn register(&mut self, spec: EncoderSpec) {
        debug!(
            program = spec.program,
            renderers = spec.renderers.len(),
            "Registered encoder"
        );
        self.encoders.insert(spec.program, spec);
    }

    pub fn supported_programs(&self) -> Vec<&'static str> {
        self.encoders.keys().copied().collect()
    }

    pub fn get(&self, program: &str) -> Option<&EncoderSpec> {
        self.encoders.get(program)
    }

    /// 渲染原生输入文件
    pub fn encode(&self, program: &str, input: &ProgramInput) -> Result<NativeInput> {
        let spec = self
            .encoders
            .get(program)
            .ok_or_else(|| CodecError::UnsupportedProgram {
                program: program.to_string(),
            })?;

        if !spec.calctypes.contains(&input.calctype) {
            return Err(encoder_error(
                program,
                format!(
                    "Unsupported calctype '{}'. Supported calctypes: {}",
                    input.calctype,
                    spec.calctypes
                        .iter()
                        .map(|c| c.as_str())
                        .collect::<Vec<_>>()
                        .join(", ")
                ),
            ));
        }

        if let Some(validate) = spec.validate {
            validate(input)?;
        }

        let mut native = NativeInput::default();
        for renderer in &spec.renderers {
            let body = (renderer.render)(input)?;
            native
                .files
                .entry(renderer.filename.to_string())
                .or_default()
                .push_str(&body);
        }

        info!(
            program,
            calctype = %input.calctype,
            files = native.files.len(),
            "Encoded input"
        );
        Ok(native)
    }
}

/// 使用内置编码器渲染
pub fn encode(program: &str, input: &ProgramInput) -> Result<NativeInput> {
    EncoderRegistry::builtin().encode(program, input)
}

pub(crate) fn encoder_error(program: &str, reason: impl Into<String>) -> CodecError {
    CodecError::EncoderError {
        program: program.to_string(),
        reason: reason.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Model, Structure};

    fn render_header(_: &ProgramInput) -> Result<String> {
        Ok("# header\n".to_string())
    }

    fn render_body(input: &ProgramInput) -> Result<String> {
        Ok(format!("method {}\n", input.model.method))
    }

    fn mock_input(calctype: CalcType) -> ProgramInput {
        ProgramInput::new(
            calctype,
            Structure::new(vec!["He".to_string()], vec![[0.0; 3]]),
            Model {
                method: "hf".to_string(),
                basis: None,
            },
        )
    }

    fn mock_registry() -> EncoderRegistry {
        let mut registry = EncoderRegistry::new();
        registry.register(EncoderSpec {
            program: "mock",
            calctypes: &[CalcType::Energy],
            validate: None,
            renderers: vec![
                RendererSpec {
                    name: "header",
                    filename: "mock.in",
                    render: render_header,
                },
                RendererSpec {
                    name: "body",
                    filename: "mock.in",
                    render: render_body,
                },
            ],
        });
        registry
    }

    #[test]
    fn test_renderers_concatenate_per_file() {
        let native = mock_registry()
            .encode("mock", &mock_input(CalcType::Energy))
            .unwrap();

        assert_eq!(native.files.len(), 1);
        assert_eq!(native.get("mock.in"), Some("# header\nmethod hf\n"));
    }

    #[test]
    fn test_unsupported_program_and_calctype() {
        let registry = mock_registry();

        assert!(matches!(
            registry.encode("nope", &mock_input(CalcType::Energy)),
            Err(CodecError::UnsupportedProgram { .. })
        ));
        assert!(matches!(
            registry.encode("mock", &mock_input(CalcType::Hessian)),
            Err(CodecError::EncoderError { .. })
        ));
    }

    #[test]
    fn test_builtin_programs() {
        assert_eq!(
            EncoderRegistry::builtin().supported_programs(),
            vec!["crest", "terachem"]
        );
    }
}
