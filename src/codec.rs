//! # 解码引擎
//!
//! 将一次计算的输出（stdout 文本、输出目录）解码为结构化结果：
//!
//! 1. 确定计算类型（显式指定优先，否则由 stdout 分类）
//! 2. 依次运行 stdout 单元、目录单元、目录中各辅助文件的单元
//! 3. 单元输出写入 `DataCollector`，字段冲突立即中止
//! 4. 冻结收集器并构造 `ResultRecord`
//!
//! 必需单元未找到数据时中止并报告目标字段；可选单元未找到数据时跳过。
//!
//! ## 依赖关系
//! - 被 `commands/`, `batch/` 使用
//! - 使用 `registry.rs`, `collector.rs`, `walker.rs`

use crate::collector::DataCollector;
use crate::error::{CodecError, Result};
use crate::models::{CalcType, FileKind, ProgramInput, ResultRecord};
use crate::registry::{ParserFn, ParserSpec, Registry, UnitOutput};
use crate::walker::DirectoryWalker;

use serde_json::Value;
use std::fs;
use std::path::Path;
use tracing::{debug, info};

/// 单元的输入来源
#[derive(Clone, Copy)]
enum UnitSource<'s> {
    Text(&'s str),
    Directory(&'s Path),
}

/// 一次解码请求
#[derive(Debug, Clone, Copy)]
pub struct DecodeRequest<'a> {
    program: &'a str,
    calctype: Option<CalcType>,
    stdout: Option<&'a str>,
    directory: Option<&'a Path>,
    input: Option<&'a ProgramInput>,
}

impl<'a> DecodeRequest<'a> {
    pub fn new(program: &'a str) -> Self {
        DecodeRequest {
            program,
            calctype: None,
            stdout: None,
            directory: None,
            input: None,
        }
    }

    /// 显式指定计算类型；未指定时由 stdout 内容分类
    pub fn calctype(mut self, calctype: impl Into<Option<CalcType>>) -> Self {
        self.calctype = calctype.into();
        self
    }

    pub fn stdout(mut self, stdout: impl Into<Option<&'a str>>) -> Self {
        self.stdout = stdout.into();
        self
    }

    pub fn directory(mut self, directory: impl Into<Option<&'a Path>>) -> Self {
        self.directory = directory.into();
        self
    }

    /// 计算输入，传给目录单元作为上下文
    pub fn input(mut self, input: impl Into<Option<&'a ProgramInput>>) -> Self {
        self.input = input.into();
        self
    }

    /// 解码为结构化结果
    pub fn decode(&self, registry: &Registry) -> Result<ResultRecord> {
        let (calctype, data) = self.collect(registry)?;
        let record = ResultRecord::build(calctype, data)?;
        info!(
            program = self.program,
            calctype = %calctype,
            variant = %record.variant(),
            "Decoded output"
        );
        Ok(record)
    }

    /// 只运行解析单元，返回计算类型与收集到的原始数据
    pub fn collect(&self, registry: &Registry) -> Result<(CalcType, Value)> {
        if self.stdout.is_none() && self.directory.is_none() {
            return Err(CodecError::InvalidArgument(
                "Either stdout or a directory must be provided".to_string(),
            ));
        }

        let calctype = self.resolve_calctype(registry)?;
        let walker = match self.directory {
            Some(dir) => Some(DirectoryWalker::new(dir, registry.files(self.program)?)?),
            None => None,
        };

        let mut collector = DataCollector::new();

        if let Some(stdout) = self.stdout {
            for spec in registry.lookup(self.program, FileKind::Stdout, calctype)? {
                self.run_unit(spec, calctype, UnitSource::Text(stdout), &mut collector)?;
            }
        }

        if let Some(walker) = walker {
            for spec in registry.lookup(self.program, FileKind::Directory, calctype)? {
                self.run_unit(
                    spec,
                    calctype,
                    UnitSource::Directory(walker.root()),
                    &mut collector,
                )?;
            }

            for (kind, path) in walker.iter() {
                let specs = registry.lookup(self.program, kind, calctype)?;
                if specs.is_empty() {
                    debug!(file = %path.display(), "No parsers apply to file; skipping");
                    continue;
                }

                let content = fs::read_to_string(&path).map_err(|e| CodecError::FileReadError {
                    path: path.display().to_string(),
                    source: e,
                })?;

                for spec in specs {
                    self.run_unit(spec, calctype, UnitSource::Text(&content), &mut collector)?;
                }
            }
        }

        debug!(
            program = self.program,
            calctype = %calctype,
            fields = collector.len(),
            "Collected data"
        );

        Ok((calctype, collector.freeze()))
    }

    fn resolve_calctype(&self, registry: &Registry) -> Result<CalcType> {
        match (self.calctype, self.stdout) {
            (Some(calctype), _) => Ok(calctype),
            (None, Some(stdout)) => registry.classify(self.program, stdout),
            (None, None) => Err(CodecError::UnrecognizedOutput {
                program: self.program.to_string(),
            }),
        }
    }

    fn run_unit(
        &self,
        spec: &ParserSpec,
        calctype: CalcType,
        source: UnitSource<'_>,
        collector: &mut DataCollector,
    ) -> Result<()> {
        let output = match (spec.parser, source) {
            (ParserFn::Text(parse), UnitSource::Text(text)) => parse(text),
            (ParserFn::Directory(parse), UnitSource::Directory(dir)) => {
                parse(dir, self.stdout, self.input)
            }
            _ => {
                return Err(CodecError::InvalidSpec {
                    program: self.program.to_string(),
                    unit: spec.name.to_string(),
                    reason: format!("parser does not accept {} input", spec.file_kind),
                })
            }
        };

        let value = match output {
            Ok(value) => value,
            Err(e) if e.is_not_found() => {
                if spec.required {
                    return Err(CodecError::MissingRequiredData {
                        program: self.program.to_string(),
                        calctype,
                        unit: spec.name.to_string(),
                        target: spec.output.to_string(),
                    });
                }
                debug!(parser = spec.name, "Optional data not found; skipping");
                return Ok(());
            }
            Err(e) => return Err(e),
        };

        let duplicate = |e: CodecError| match e {
            CodecError::DuplicateAssignment { path } => CodecError::DuplicateTarget {
                program: self.program.to_string(),
                calctype,
                unit: spec.name.to_string(),
                path,
            },
            other => other,
        };

        match &spec.output {
            UnitOutput::Single(path) => collector.set(path.clone(), value).map_err(duplicate)?,
            UnitOutput::Mapping => {
                let Value::Object(values) = value else {
                    return Err(CodecError::parse(
                        spec.name,
                        "directory parser must return a mapping of fields",
                    ));
                };
                collector.merge(values).map_err(duplicate)?;
            }
        }

        debug!(parser = spec.name, target = %spec.output, "Collected parser output");
        Ok(())
    }
}
