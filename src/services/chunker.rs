//! 文本分块服务 - 业务能力层
//!
//! 只负责"把一段文本切成有重叠的文本块"，不关心 LLM 和流程

use tracing::debug;

use crate::error::ConfigError;
use crate::models::{Chunk, SourceDocument};

/// 切分位置的优先级：段落 > 换行 > 句末 > 空白
///
/// 切分点放在分隔符之后，分隔符留在前一个文本块里
const BOUNDARY_TIERS: &[&[&str]] = &[
    &["\n\n"],
    &["\n"],
    &["。", "！", "？", ". ", "! ", "? "],
    &[" ", "\t", "\u{3000}"],
];

/// 文本分块器
///
/// 长度按字符（而不是字节）计算。每个文本块长度不超过 `chunk_size`，
/// 除第一个外，每个文本块的开头都与前一块的最后 `chunk_overlap` 个字符相同。
#[derive(Debug, Clone, Copy)]
pub struct TextChunker {
    chunk_size: usize,
    chunk_overlap: usize,
}

impl TextChunker {
    /// 要求 `chunk_overlap < chunk_size`
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Result<Self, ConfigError> {
        if chunk_size == 0 || chunk_overlap >= chunk_size {
            return Err(ConfigError::InvalidChunking {
                size: chunk_size,
                overlap: chunk_overlap,
            });
        }
        Ok(Self {
            chunk_size,
            chunk_overlap,
        })
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn chunk_overlap(&self) -> usize {
        self.chunk_overlap
    }

    /// 切分一段文本
    ///
    /// 空白文本不产生任何文本块；不超过 `chunk_size` 的文本原样作为一个文本块
    pub fn split(&self, text: &str) -> Vec<String> {
        if text.trim().is_empty() {
            return Vec::new();
        }

        let chars: Vec<char> = text.chars().collect();
        let mut pieces = Vec::new();
        let mut start = 0;

        loop {
            if chars.len() - start <= self.chunk_size {
                pieces.push(chars[start..].iter().collect());
                break;
            }

            let window_end = start + self.chunk_size;
            // 切分点必须越过重叠区，否则下一块不会前进
            let min_cut = start + (self.chunk_overlap + 1).max(self.chunk_size / 2);
            let cut = find_boundary(&chars, min_cut, window_end).unwrap_or(window_end);

            pieces.push(chars[start..cut].iter().collect());
            start = cut - self.chunk_overlap;
        }

        pieces
    }

    /// 逐个文档切分，文本块序号在整个运行中全局递增
    pub fn chunk_documents(&self, documents: &[SourceDocument]) -> Vec<Chunk> {
        let mut chunks = Vec::new();

        for document in documents {
            let before = chunks.len();
            for text in self.split(&document.text) {
                chunks.push(Chunk::new(chunks.len(), document.filename.as_str(), text));
            }
            debug!(
                "{} 切分为 {} 个文本块 ({} 字符)",
                document.filename,
                chunks.len() - before,
                document.char_count()
            );
        }

        chunks
    }
}

/// 在 `[min_cut, window_end]` 内从后往前找优先级最高的切分点
fn find_boundary(chars: &[char], min_cut: usize, window_end: usize) -> Option<usize> {
    BOUNDARY_TIERS.iter().find_map(|separators| {
        (min_cut..=window_end)
            .rev()
            .find(|&pos| separators.iter().any(|sep| ends_with_at(chars, pos, sep)))
    })
}

fn ends_with_at(chars: &[char], pos: usize, separator: &str) -> bool {
    let len = separator.chars().count();
    pos >= len && chars[pos - len..pos].iter().copied().eq(separator.chars())
}
