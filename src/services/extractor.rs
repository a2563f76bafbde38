//! 结构化输出抽取 - 业务能力层
//!
//! 从第二阶段的响应中找出 JSON 数组、解析并校验每一条记录。
//! 不信任模型"只输出 JSON"，响应按普通文本处理。

use serde_json::Value;
use tracing::debug;

use crate::error::StructuredOutputError;
use crate::models::QaRecord;
use crate::utils::logging::truncate_text;

/// 错误信息中响应预览的最大长度
const PREVIEW_CHARS: usize = 200;

/// 一个条目的抽取结果
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Extraction {
    /// 通过校验的记录
    pub records: Vec<QaRecord>,
    /// 缺少 `question`/`answer` 或内容为空而被丢弃的元素数
    pub dropped: usize,
}

/// 取第一个 `[` 到最后一个 `]`（含）之间的内容
///
/// 任一方括号缺失，或 `]` 在 `[` 之前时返回 `None`
pub fn locate_json_array(text: &str) -> Option<&str> {
    let start = text.find('[')?;
    let end = text.rfind(']')?;
    (start < end).then(|| &text[start..=end])
}

/// 从第二阶段响应中抽取问答记录
///
/// 每条记录的 `source_chunk` 都是产生该响应的文本块原文
pub fn extract_records(
    response: &str,
    source_chunk: &str,
) -> Result<Extraction, StructuredOutputError> {
    let response = response.trim();

    let json_text =
        locate_json_array(response).ok_or_else(|| StructuredOutputError::NoJsonArray {
            preview: truncate_text(response, PREVIEW_CHARS),
        })?;

    let items: Vec<Value> =
        serde_json::from_str(json_text).map_err(|e| StructuredOutputError::ParseFailed {
            message: e.to_string(),
        })?;

    let mut extraction = Extraction::default();
    for item in &items {
        let question = item.get("question").and_then(Value::as_str);
        let answer = item.get("answer").and_then(Value::as_str);

        match question
            .zip(answer)
            .and_then(|(q, a)| QaRecord::new(q, a, source_chunk))
        {
            Some(record) => extraction.records.push(record),
            None => {
                debug!("丢弃不完整的记录: {}", truncate_text(&item.to_string(), 80));
                extraction.dropped += 1;
            }
        }
    }

    Ok(extraction)
}
