//! # 计算任务收集器
//!
//! 在根目录下查找与模式匹配的 stdout 文件，每个匹配文件构成一个解码任务，
//! 其所在目录作为该任务的输出目录。
//!
//! ## 功能
//! - 逗号分隔的多个 glob 模式
//! - 默认只搜索根目录及其直接子目录，可选递归
//!
//! ## 依赖关系
//! - 被 `commands/collect.rs` 调用
//! - 使用 `walkdir` 遍历目录，`glob` 匹配文件名

use crate::error::{CodecError, Result};

use glob::Pattern;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// 一个解码任务
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeJob {
    /// 任务名：输出目录相对根目录的路径
    pub name: String,
    pub stdout: PathBuf,
    pub directory: PathBuf,
}

/// 任务收集器
pub struct JobCollector {
    root: PathBuf,
    patterns: Vec<String>,
    recursive: bool,
}

impl JobCollector {
    pub fn new(root: PathBuf) -> Self {
        Self {
            root,
            patterns: vec!["*.out".to_string()],
            recursive: false,
        }
    }

    /// 设置匹配模式（逗号分隔的多模式）
    pub fn with_pattern(mut self, pattern: &str) -> Self {
        self.patterns = pattern
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        if self.patterns.is_empty() {
            self.patterns = vec!["*.out".to_string()];
        }
        self
    }

    /// 设置是否递归搜索
    pub fn recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    /// 收集所有任务，按路径排序
    pub fn collect(&self) -> Result<Vec<DecodeJob>> {
        if !self.root.is_dir() {
            return Err(CodecError::DirectoryNotFound {
                path: self.root.display().to_string(),
            });
        }

        let patterns = self
            .patterns
            .iter()
            .map(|p| {
                Pattern::new(p).map_err(|e| {
                    CodecError::InvalidArgument(format!("Invalid pattern '{}': {}", p, e))
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let max_depth = if self.recursive { usize::MAX } else { 2 };

        let mut jobs: Vec<DecodeJob> = WalkDir::new(&self.root)
            .max_depth(max_depth)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .filter(|e| {
                e.file_name()
                    .to_str()
                    .is_some_and(|name| patterns.iter().any(|p| p.matches(name)))
            })
            .map(|e| self.job_for(e.path()))
            .collect();

        jobs.sort_by(|a, b| a.stdout.cmp(&b.stdout));
        Ok(jobs)
    }

    fn job_for(&self, stdout: &Path) -> DecodeJob {
        let directory = stdout.parent().unwrap_or(&self.root).to_path_buf();
        let relative = directory.strip_prefix(&self.root).unwrap_or(&directory);

        let name = if relative.as_os_str().is_empty() {
            stdout
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default()
        } else {
            relative.display().to_string()
        };

        DecodeJob {
            name,
            stdout: stdout.to_path_buf(),
            directory,
        }
    }
}
