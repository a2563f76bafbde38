//! QA 结构化服务（第二阶段）- 业务能力层
//!
//! 只负责"一段原始问答文本 → 若干条问答记录"。
//! 合并问题的拆分由系统提示词要求模型完成，这里只做抽取与校验。

use std::sync::Arc;

use tracing::debug;

use crate::clients::{ChatMessage, CompletionClient, CompletionRequest};
use crate::error::PipelineError;
use crate::models::{RawQaResponse, StageSettings};
use crate::prompts::render_structuring_input;
use crate::services::extractor::{extract_records, Extraction};

/// 第二阶段结构化器
pub struct QaStructurer {
    client: Arc<dyn CompletionClient>,
    settings: StageSettings,
    system_prompt: String,
}

impl QaStructurer {
    pub fn new(
        client: Arc<dyn CompletionClient>,
        settings: StageSettings,
        system_prompt: impl Into<String>,
    ) -> Self {
        Self {
            client,
            settings,
            system_prompt: system_prompt.into(),
        }
    }

    pub fn settings(&self) -> &StageSettings {
        &self.settings
    }

    /// 系统消息原样发送，原始文本放在 user 消息中
    pub fn build_request(&self, raw: &RawQaResponse) -> CompletionRequest {
        CompletionRequest {
            model: self.settings.model.clone(),
            messages: vec![
                ChatMessage::system(self.system_prompt.as_str()),
                ChatMessage::user(render_structuring_input(&raw.raw_response)),
            ],
            temperature: self.settings.temperature,
            max_tokens: self.settings.max_tokens,
            top_p: Some(1.0),
        }
    }

    /// 结构化一段原始问答文本
    ///
    /// 调用失败返回 `LlmCall`，响应中找不到或解析不了 JSON 数组返回 `StructuredOutput`
    pub async fn structure(&self, raw: &RawQaResponse) -> Result<Extraction, PipelineError> {
        let request = self.build_request(raw);
        let response = self.client.complete(&request).await?;

        let extraction = extract_records(&response, &raw.source_chunk)?;
        debug!(
            "[文本段 #{}] 第二阶段得到 {} 条记录，丢弃 {} 条",
            raw.chunk_index,
            extraction.records.len(),
            extraction.dropped
        );

        Ok(extraction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::scripted::ScriptedClient;
    use crate::clients::ChatRole;
    use crate::error::{ErrorKind, StructuredOutputError};

    fn raw(text: &str) -> RawQaResponse {
        RawQaResponse {
            chunk_index: 0,
            raw_response: text.to_string(),
            source_chunk: "C".to_string(),
        }
    }

    fn structurer(client: Arc<ScriptedClient>) -> QaStructurer {
        QaStructurer::new(client, StageSettings::new("json-model", 0.0, 2048), "ONLY JSON")
    }

    #[test]
    fn test_request_shape() {
        let client = Arc::new(ScriptedClient::new().reply("[]"));
        let structurer = structurer(client.clone());

        tokio_test::block_on(structurer.structure(&raw("Q: a?\n\nA: b."))).unwrap();

        let request = &client.requests()[0];
        assert_eq!(request.model, "json-model");
        assert_eq!(request.temperature, 0.0);
        assert_eq!(request.top_p, Some(1.0));
        assert_eq!(request.messages[0].role, ChatRole::System);
        assert_eq!(request.messages[0].content, "ONLY JSON");
        assert_eq!(request.messages[1].role, ChatRole::User);
        assert_eq!(
            request.messages[1].content,
            "INPUT TEXT:\nQ: a?\n\nA: b.\n\nJSON OUTPUT:"
        );
    }

    #[test]
    fn test_compound_question_becomes_two_records() {
        let client = Arc::new(ScriptedClient::new().reply(
            r#"[{"question": "What is X?", "answer": "Explanation."},
                {"question": "What is Y?", "answer": "Explanation."}]"#,
        ));
        let structurer = structurer(client);

        let extraction = tokio_test::block_on(
            structurer.structure(&raw("Q: What is X? What is Y?\n\nA: Explanation.")),
        )
        .unwrap();

        let questions: Vec<&str> = extraction.records.iter().map(|r| r.question()).collect();
        assert_eq!(questions, vec!["What is X?", "What is Y?"]);
        assert!(extraction
            .records
            .iter()
            .all(|r| r.answer() == "Explanation." && r.source_chunk() == "C"));
    }

    #[test]
    fn test_malformed_output_is_structured_output_error() {
        let client = Arc::new(ScriptedClient::new().reply("Sorry, here are the pairs: none"));
        let structurer = structurer(client);

        let err = tokio_test::block_on(structurer.structure(&raw("Q: a?\n\nA: b."))).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::StructuredOutput);
        assert!(matches!(
            err,
            PipelineError::StructuredOutput(StructuredOutputError::NoJsonArray { .. })
        ));
    }

    #[test]
    fn test_call_failure_is_llm_call_error() {
        let client = Arc::new(ScriptedClient::new().fail());
        let structurer = structurer(client);

        let err = tokio_test::block_on(structurer.structure(&raw("Q: a?\n\nA: b."))).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::LlmCall);
    }
}
