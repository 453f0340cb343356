//! # 输出目录遍历器
//!
//! 列出一次计算输出目录顶层中程序可识别的文件，并给出其文件类型。
//! 未登记在程序文件表中的文件直接跳过。
//!
//! ## 依赖关系
//! - 被 `codec.rs` 使用
//! - 使用 `walkdir` 遍历目录

use crate::error::{CodecError, Result};
use crate::models::FileKind;

use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// 输出目录遍历器
#[derive(Debug, Clone)]
pub struct DirectoryWalker {
    root: PathBuf,
    /// 文件名 -> 文件类型
    files: &'static [(&'static str, FileKind)],
}

impl DirectoryWalker {
    pub fn new(directory: &Path, files: &'static [(&'static str, FileKind)]) -> Result<Self> {
        if !directory.is_dir() {
            return Err(CodecError::DirectoryNotFound {
                path: directory.display().to_string(),
            });
        }

        Ok(Self {
            root: directory.to_path_buf(),
            files,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// 文件名对应的文件类型
    pub fn kind_of(&self, filename: &str) -> Option<FileKind> {
        self.files
            .iter()
            .find(|(name, _)| *name == filename)
            .map(|(_, kind)| *kind)
    }

    /// 按文件名顺序惰性遍历可识别文件；每次调用都会重新扫描目录
    pub fn iter(&self) -> impl Iterator<Item = (FileKind, PathBuf)> + '_ {
        WalkDir::new(&self.root)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .filter_map(move |entry| {
                let kind = self.kind_of(entry.file_name().to_str()?)?;
                Some((kind, entry.into_path()))
            })
    }
}
