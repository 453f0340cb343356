//! # 结果收集器
//!
//! 每次解码创建一个收集器，按字段路径累积各解析单元的输出。
//! 每条路径只能写入一次；已写入路径的前缀或延伸同样视为冲突，
//! 这样冻结后的嵌套对象不会出现互相覆盖的字段。
//!
//! ## 依赖关系
//! - 被 `codec.rs` 使用
//! - 使用 `registry.rs` 中的 `FieldPath`

use crate::error::{CodecError, Result};
use crate::registry::FieldPath;

use serde_json::{Map, Value};

/// 一次性写入的结果累积器
#[derive(Debug, Default)]
pub struct DataCollector {
    entries: Vec<(FieldPath, Value)>,
}

impl DataCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// 写入单个字段
    pub fn set(&mut self, path: impl Into<FieldPath>, value: Value) -> Result<()> {
        let path = path.into();
        if path.is_empty() {
            return Err(CodecError::InvalidArgument(
                "Cannot set an empty field path".to_string(),
            ));
        }

        if self.entries.iter().any(|(existing, _)| existing.overlaps(&path)) {
            return Err(CodecError::DuplicateAssignment {
                path: path.to_string(),
            });
        }

        self.entries.push((path, value));
        Ok(())
    }

    /// 按映射顺序逐键写入
    ///
    /// 某个键冲突时立即返回错误，之前已写入的键不会回滚。
    pub fn merge(&mut self, values: Map<String, Value>) -> Result<()> {
        for (key, value) in values {
            self.set(key, value)?;
        }
        Ok(())
    }

    pub fn contains(&self, path: impl Into<FieldPath>) -> bool {
        let path = path.into();
        self.entries.iter().any(|(existing, _)| *existing == path)
    }

    pub fn get(&self, path: impl Into<FieldPath>) -> Option<&Value> {
        let path = path.into();
        self.entries
            .iter()
            .find(|(existing, _)| *existing == path)
            .map(|(_, value)| value)
    }

    /// 已写入的字段路径，按写入顺序
    pub fn fields(&self) -> impl Iterator<Item = &FieldPath> {
        self.entries.iter().map(|(path, _)| path)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 冻结为嵌套 JSON 对象
    pub fn freeze(self) -> Value {
        let mut root = Map::new();

        for (path, value) in self.entries {
            let Some((last, parents)) = path.segments().split_last() else {
                continue;
            };

            let mut node = &mut root;
            for segment in parents {
                let child = node
                    .entry(segment.clone())
                    .or_insert_with(|| Value::Object(Map::new()));
                if !child.is_object() {
                    *child = Value::Object(Map::new());
                }
                node = match child {
                    Value::Object(map) => map,
                    _ => unreachable!(),
                };
            }
            node.insert(last.clone(), value);
        }

        Value::Object(root)
    }
}
