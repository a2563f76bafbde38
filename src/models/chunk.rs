use std::fmt::Display;

use serde::{Deserialize, Serialize};

/// 文本块
///
/// 一次 LLM 提示的基本单位。`text` 即最终写入 `QaRecord::source_chunk` 的内容。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    /// 在整个运行中的序号（从 0 开始）
    pub index: usize,
    /// 来源文件名
    pub source: String,
    /// 文本内容，非空
    pub text: String,
}

impl Chunk {
    pub fn new(index: usize, source: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            index,
            source: source.into(),
            text: text.into(),
        }
    }

    pub fn char_count(&self) -> usize {
        self.text.chars().count()
    }
}

impl Display for Chunk {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[文本段 #{} 来源 {} 长度 {}]",
            self.index,
            self.source,
            self.char_count()
        )
    }
}
