//! QA 生成服务（第一阶段）- 业务能力层
//!
//! 只负责"一个文本块 → 一段原始问答文本"，不关心有多少文本块

use std::sync::Arc;

use tracing::debug;

use crate::clients::{ChatMessage, CompletionClient, CompletionRequest};
use crate::error::LlmCallError;
use crate::models::{Chunk, RawQaResponse, StageSettings};
use crate::prompts::render_qa_prompt;

/// 第一阶段生成器
///
/// 把文本块内容代入模板，以一条 user 消息发送。
/// 返回的文本约定为若干 `Q:` / `A:` 块，由第二阶段负责结构化。
pub struct QaGenerator {
    client: Arc<dyn CompletionClient>,
    settings: StageSettings,
    template: String,
}

impl QaGenerator {
    pub fn new(
        client: Arc<dyn CompletionClient>,
        settings: StageSettings,
        template: impl Into<String>,
    ) -> Self {
        Self {
            client,
            settings,
            template: template.into(),
        }
    }

    pub fn settings(&self) -> &StageSettings {
        &self.settings
    }

    /// 构造发给模型的请求
    pub fn build_request(&self, chunk: &Chunk) -> CompletionRequest {
        CompletionRequest {
            model: self.settings.model.clone(),
            messages: vec![ChatMessage::user(render_qa_prompt(
                &self.template,
                &chunk.text,
            ))],
            temperature: self.settings.temperature,
            max_tokens: self.settings.max_tokens,
            top_p: None,
        }
    }

    /// 为一个文本块生成原始问答文本
    ///
    /// 失败时不产生 `RawQaResponse`，由调用方决定如何记录
    pub async fn generate(&self, chunk: &Chunk) -> Result<RawQaResponse, LlmCallError> {
        let request = self.build_request(chunk);
        let raw_response = self.client.complete(&request).await?;

        debug!("{} 第一阶段返回 {} 字符", chunk, raw_response.chars().count());

        Ok(RawQaResponse {
            chunk_index: chunk.index,
            raw_response,
            source_chunk: chunk.text.clone(),
        })
    }
}
