//! # 解析单元注册表
//!
//! 以 (程序, 文件类型, 计算类型) 为键，登记所有解析单元 (`ParserSpec`)。
//! 每个程序还登记一个可选的计算类型分类器以及 "文件名 -> 文件类型" 对照表，
//! 供目录遍历使用。
//!
//! ## 约定
//! - 注册表在启动时一次性构建，之后只读，可在多线程解码间共享
//! - 同一程序内，单值单元的目标字段在适用计算类型重叠时必须唯一
//! - 重复登记完全相同的描述符是无操作，程序模块可以被安装多次
//!
//! ## 依赖关系
//! - 被 `codec.rs`, `commands/` 使用
//! - 使用 `parsers/` 提供的内置程序描述
//! - 使用 `models/calculation.rs`

use crate::error::{CodecError, Result};
use crate::models::{CalcType, FileKind, ProgramInput};
use crate::parsers;

use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use tracing::debug;

// ─────────────────────────────────────────────────────────────
// 字段路径
// ─────────────────────────────────────────────────────────────

/// 结果对象中的字段路径，如 `extras.program_version`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldPath(Vec<String>);

impl FieldPath {
    pub fn new(path: &str) -> Self {
        FieldPath(
            path.split('.')
                .map(|s| s.trim())
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect(),
        )
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// 两条路径是否互相覆盖（相同，或一方是另一方的前缀）
    pub fn overlaps(&self, other: &FieldPath) -> bool {
        let n = self.0.len().min(other.0.len());
        self.0[..n] == other.0[..n]
    }
}

impl From<&str> for FieldPath {
    fn from(path: &str) -> Self {
        FieldPath::new(path)
    }
}

impl From<String> for FieldPath {
    fn from(path: String) -> Self {
        FieldPath::new(&path)
    }
}

impl std::fmt::Display for FieldPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.join("."))
    }
}

// ─────────────────────────────────────────────────────────────
// 解析单元描述
// ─────────────────────────────────────────────────────────────

/// 解析单元适用的计算类型
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Applicability {
    All,
    Only(Vec<CalcType>),
}

impl Applicability {
    pub fn applies_to(&self, calctype: CalcType) -> bool {
        match self {
            Applicability::All => true,
            Applicability::Only(types) => types.contains(&calctype),
        }
    }

    pub fn overlaps(&self, other: &Applicability) -> bool {
        match (self, other) {
            (Applicability::All, _) | (_, Applicability::All) => true,
            (Applicability::Only(a), Applicability::Only(b)) => a.iter().any(|c| b.contains(c)),
        }
    }
}

impl std::fmt::Display for Applicability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Applicability::All => write!(f, "all"),
            Applicability::Only(types) => write!(
                f,
                "{}",
                types
                    .iter()
                    .map(|c| c.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
        }
    }
}

/// 解析单元的输出形态
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnitOutput {
    /// 单个值，写入指定字段
    Single(FieldPath),
    /// 字段路径 -> 值 的映射，逐键写入
    Mapping,
}

impl std::fmt::Display for UnitOutput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UnitOutput::Single(path) => write!(f, "{}", path),
            UnitOutput::Mapping => write!(f, "<mapping>"),
        }
    }
}

/// 文本解析函数：接收文件内容
pub type TextParser = fn(&str) -> Result<Value>;

/// 目录解析函数：接收目录、stdout 内容与计算输入
pub type DirectoryParser = fn(&Path, Option<&str>, Option<&ProgramInput>) -> Result<Value>;

/// 计算类型分类器
pub type Classifier = fn(&str) -> Result<CalcType>;

/// 解析函数
#[derive(Clone, Copy)]
pub enum ParserFn {
    Text(TextParser),
    Directory(DirectoryParser),
}

impl ParserFn {
    /// 是否指向同一个函数
    fn same_fn(&self, other: &ParserFn) -> bool {
        match (self, other) {
            (ParserFn::Text(a), ParserFn::Text(b)) => *a as usize == *b as usize,
            (ParserFn::Directory(a), ParserFn::Directory(b)) => *a as usize == *b as usize,
            _ => false,
        }
    }
}

impl std::fmt::Debug for ParserFn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParserFn::Text(_) => write!(f, "ParserFn::Text"),
            ParserFn::Directory(_) => write!(f, "ParserFn::Directory"),
        }
    }
}

/// 解析单元描述符
#[derive(Debug, Clone)]
pub struct ParserSpec {
    /// 单元标识
    pub name: &'static str,
    /// 读取的文件类型
    pub file_kind: FileKind,
    /// 适用的计算类型
    pub applicability: Applicability,
    /// 输出形态与目标字段
    pub output: UnitOutput,
    /// 未找到数据时是否中止解码
    pub required: bool,
    pub parser: ParserFn,
}

impl ParserSpec {
    pub fn new(name: &'static str, file_kind: FileKind, output: UnitOutput, parser: ParserFn) -> Self {
        ParserSpec {
            name,
            file_kind,
            applicability: Applicability::All,
            output,
            required: true,
            parser,
        }
    }

    /// 文本单元，输出写入 `target`
    pub fn text(name: &'static str, file_kind: FileKind, target: &str, parser: TextParser) -> Self {
        Self::new(
            name,
            file_kind,
            UnitOutput::Single(FieldPath::new(target)),
            ParserFn::Text(parser),
        )
    }

    /// 目录单元，输出写入 `target`
    pub fn directory(name: &'static str, target: &str, parser: DirectoryParser) -> Self {
        Self::new(
            name,
            FileKind::Directory,
            UnitOutput::Single(FieldPath::new(target)),
            ParserFn::Directory(parser),
        )
    }

    /// 目录单元，返回多个字段的映射
    pub fn directory_mapping(name: &'static str, parser: DirectoryParser) -> Self {
        Self::new(
            name,
            FileKind::Directory,
            UnitOutput::Mapping,
            ParserFn::Directory(parser),
        )
    }

    /// 限定适用的计算类型
    pub fn only(mut self, calctypes: &[CalcType]) -> Self {
        self.applicability = Applicability::Only(calctypes.to_vec());
        self
    }

    /// 标记为可选单元
    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    /// 描述符与解析函数是否完全相同
    fn same_descriptor(&self, other: &ParserSpec) -> bool {
        self.name == other.name
            && self.file_kind == other.file_kind
            && self.output == other.output
            && self.applicability == other.applicability
            && self.required == other.required
            && self.parser.same_fn(&other.parser)
    }

    fn validate(&self, program: &str) -> Result<()> {
        let invalid = |reason: &str| CodecError::InvalidSpec {
            program: program.to_string(),
            unit: self.name.to_string(),
            reason: reason.to_string(),
        };

        if self.name.is_empty() {
            return Err(invalid("parser name is empty"));
        }

        match (&self.parser, self.file_kind) {
            (ParserFn::Text(_), FileKind::Directory) => {
                return Err(invalid("directory units need a directory parser"))
            }
            (ParserFn::Directory(_), kind) if kind.is_text() => {
                return Err(invalid("text units need a text parser"))
            }
            _ => {}
        }

        match &self.output {
            UnitOutput::Single(path) if path.is_empty() => Err(invalid("target path is empty")),
            UnitOutput::Mapping if self.file_kind != FileKind::Directory => {
                Err(invalid("only directory units may return a mapping"))
            }
            _ => Ok(()),
        }
    }
}

/// 程序模块的声明式描述
pub struct ProgramSpec {
    pub name: &'static str,
    pub classifier: Option<Classifier>,
    /// 输出目录中可识别的文件名及其类型
    pub files: &'static [(&'static str, FileKind)],
    pub parsers: Vec<ParserSpec>,
}

// ─────────────────────────────────────────────────────────────
// 注册表
// ─────────────────────────────────────────────────────────────

#[derive(Default)]
struct ProgramEntry {
    classifier: Option<Classifier>,
    files: &'static [(&'static str, FileKind)],
    parsers: Vec<ParserSpec>,
}

/// 解析单元注册表
#[derive(Default)]
pub struct Registry {
    programs: BTreeMap<String, ProgramEntry>,
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_map()
            .entries(
                self.programs
                    .iter()
                    .map(|(name, entry)| (name, entry.parsers.len())),
            )
            .finish()
    }
}

impl Registry {
    /// 创建空注册表
    pub fn new() -> Self {
        Self::default()
    }

    /// 创建包含所有内置程序的注册表
    pub fn builtin() -> Result<Self> {
        let mut registry = Self::new();
        for program in parsers::builtin_programs() {
            registry.install(program)?;
        }
        Ok(registry)
    }

    /// 安装一个程序模块
    pub fn install(&mut self, program: ProgramSpec) -> Result<()> {
        {
            let entry = self.programs.entry(program.name.to_string()).or_default();
            if program.classifier.is_some() {
                entry.classifier = program.classifier;
            }
            if !program.files.is_empty() {
                entry.files = program.files;
            }
        }

        for spec in program.parsers {
            self.register(program.name, spec)?;
        }

        Ok(())
    }

    /// 登记一个解析单元
    pub fn register(&mut self, program: &str, spec: ParserSpec) -> Result<()> {
        spec.validate(program)?;

        let entry = self.programs.entry(program.to_string()).or_default();

        for existing in &entry.parsers {
            if existing.same_descriptor(&spec) {
                debug!(program, parser = spec.name, "Parser already registered; skipping");
                return Ok(());
            }

            if existing.name == spec.name {
                return Err(CodecError::InvalidSpec {
                    program: program.to_string(),
                    unit: spec.name.to_string(),
                    reason: "a different parser is already registered under this name"
                        .to_string(),
                });
            }

            if let (UnitOutput::Single(a), UnitOutput::Single(b)) = (&existing.output, &spec.output) {
                if a == b && existing.applicability.overlaps(&spec.applicability) {
                    return Err(CodecError::RegistrationConflict {
                        program: program.to_string(),
                        target: a.to_string(),
                        unit: spec.name.to_string(),
                        existing: existing.name.to_string(),
                    });
                }
            }
        }

        debug!(
            program,
            parser = spec.name,
            file_kind = %spec.file_kind,
            target = %spec.output,
            "Registered parser"
        );
        entry.parsers.push(spec);
        Ok(())
    }

    fn entry(&self, program: &str) -> Result<&ProgramEntry> {
        self.programs
            .get(program)
            .ok_or_else(|| CodecError::UnknownProgram {
                program: program.to_string(),
            })
    }

    /// 查询适用的解析单元，按登记顺序返回
    pub fn lookup(
        &self,
        program: &str,
        file_kind: FileKind,
        calctype: CalcType,
    ) -> Result<Vec<&ParserSpec>> {
        Ok(self
            .entry(program)?
            .parsers
            .iter()
            .filter(|spec| spec.file_kind == file_kind && spec.applicability.applies_to(calctype))
            .collect())
    }

    /// 根据 stdout 内容判断计算类型
    pub fn classify(&self, program: &str, content: &str) -> Result<CalcType> {
        let unrecognized = || CodecError::UnrecognizedOutput {
            program: program.to_string(),
        };

        let classifier = self.entry(program)?.classifier.ok_or_else(unrecognized)?;
        classifier(content).map_err(|e| if e.is_not_found() { unrecognized() } else { e })
    }

    /// 是否登记了计算类型分类器
    pub fn has_classifier(&self, program: &str) -> Result<bool> {
        Ok(self.entry(program)?.classifier.is_some())
    }

    pub fn contains(&self, program: &str) -> bool {
        self.programs.contains_key(program)
    }

    /// 输出目录中可识别的文件
    pub fn files(&self, program: &str) -> Result<&'static [(&'static str, FileKind)]> {
        Ok(self.entry(program)?.files)
    }

    /// 某程序的全部解析单元
    pub fn parsers(&self, program: &str) -> Result<&[ParserSpec]> {
        Ok(&self.entry(program)?.parsers)
    }

    pub fn get_spec(&self, program: &str, name: &str) -> Option<&ParserSpec> {
        self.programs
            .get(program)?
            .parsers
            .iter()
            .find(|spec| spec.name == name)
    }

    pub fn supported_programs(&self) -> Vec<&str> {
        self.programs.keys().map(String::as_str).collect()
    }

    pub fn supported_file_kinds(&self, program: &str) -> Result<Vec<FileKind>> {
        let kinds: BTreeSet<FileKind> = self
            .entry(program)?
            .parsers
            .iter()
            .map(|spec| spec.file_kind)
            .collect();
        Ok(kinds.into_iter().collect())
    }
}
