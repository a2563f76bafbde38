use serde::Serialize;

/// 第一阶段的原始输出
///
/// 与产生它的文本块一一对应，只被第二阶段消费一次
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawQaResponse {
    /// 来源文本块序号
    pub chunk_index: usize,
    /// LLM 返回的 `Q:` / `A:` 文本
    pub raw_response: String,
    /// 来源文本块内容
    pub source_chunk: String,
}

/// 一条经过校验的问答对
///
/// `question` 与 `answer` 均非空；`source_chunk` 是产生它的文本块原文。
/// 只能由抽取器创建，字段只读。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QaRecord {
    question: String,
    answer: String,
    source_chunk: String,
}

impl QaRecord {
    /// 问题或答案为空时返回 `None`
    pub(crate) fn new(
        question: impl Into<String>,
        answer: impl Into<String>,
        source_chunk: impl Into<String>,
    ) -> Option<Self> {
        let question = question.into().trim().to_string();
        let answer = answer.into().trim().to_string();
        if question.is_empty() || answer.is_empty() {
            return None;
        }
        Some(Self {
            question,
            answer,
            source_chunk: source_chunk.into(),
        })
    }

    pub fn question(&self) -> &str {
        &self.question
    }

    pub fn answer(&self) -> &str {
        &self.answer
    }

    pub fn source_chunk(&self) -> &str {
        &self.source_chunk
    }
}
