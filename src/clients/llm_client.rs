//! LLM 客户端 - 基础设施层
//!
//! 持有唯一的 API 连接，只暴露"补全"能力
//!
//! ## 技术栈
//! - 使用 `async-openai` crate 进行 API 调用
//! - 支持自定义 API 端点和模型
//! - 兼容 OpenAI API 的服务

use async_openai::{
    config::OpenAIConfig,
    types::chat::{
        ChatCompletionRequestAssistantMessageArgs, ChatCompletionRequestMessage,
        ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequestArgs,
    },
    Client,
};
use async_trait::async_trait;
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::{ConfigError, LlmCallError};

/// 消息角色
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

/// 一条对话消息
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
        }
    }
}

/// 一次补全请求
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
    pub max_tokens: u32,
    /// 未设置时按 1.0 发送
    pub top_p: Option<f32>,
}

/// 补全能力
///
/// 所有失败（鉴权、网络、限流、模型不存在）都归为 `LlmCallError`。
/// 实现只读，一次运行中共享同一个实例。
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// 发送请求并返回去掉首尾空白的文本
    async fn complete(&self, request: &CompletionRequest) -> Result<String, LlmCallError>;
}

/// OpenAI 兼容接口的客户端
///
/// 设置变更时整体重建，不做字段级修改
pub struct OpenAiClient {
    client: Client<OpenAIConfig>,
    api_base_url: String,
}

impl OpenAiClient {
    /// 创建新的客户端
    ///
    /// 没有 API Key 时直接失败，不会发出任何请求
    pub fn new(config: &Config) -> Result<Self, ConfigError> {
        if config.api_key.trim().is_empty() {
            return Err(ConfigError::MissingApiKey);
        }

        // 配置 OpenAI 客户端（兼容 OpenAI API 的服务）
        let openai_config = OpenAIConfig::new()
            .with_api_key(config.api_key.trim())
            .with_api_base(&config.base_url);

        Ok(Self {
            client: Client::with_config(openai_config),
            api_base_url: config.base_url.clone(),
        })
    }

    pub fn api_base_url(&self) -> &str {
        &self.api_base_url
    }

    fn build_messages(
        messages: &[ChatMessage],
    ) -> Result<Vec<ChatCompletionRequestMessage>, LlmCallError> {
        let invalid = |e: async_openai::error::OpenAIError| LlmCallError::InvalidRequest {
            message: e.to_string(),
        };

        messages
            .iter()
            .map(|message| {
                let built = match message.role {
                    ChatRole::System => ChatCompletionRequestMessage::System(
                        ChatCompletionRequestSystemMessageArgs::default()
                            .content(message.content.as_str())
                            .build()
                            .map_err(invalid)?,
                    ),
                    ChatRole::User => ChatCompletionRequestMessage::User(
                        ChatCompletionRequestUserMessageArgs::default()
                            .content(message.content.as_str())
                            .build()
                            .map_err(invalid)?,
                    ),
                    ChatRole::Assistant => ChatCompletionRequestMessage::Assistant(
                        ChatCompletionRequestAssistantMessageArgs::default()
                            .content(message.content.as_str())
                            .build()
                            .map_err(invalid)?,
                    ),
                };
                Ok(built)
            })
            .collect()
    }
}

#[async_trait]
impl CompletionClient for OpenAiClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, LlmCallError> {
        debug!("调用 LLM API，模型: {}", request.model);
        debug!(
            "消息数量: {}, 总长度: {} 字符",
            request.messages.len(),
            request
                .messages
                .iter()
                .map(|m| m.content.chars().count())
                .sum::<usize>()
        );

        let messages = Self::build_messages(&request.messages)?;

        // 构建请求
        let api_request = CreateChatCompletionRequestArgs::default()
            .model(&request.model)
            .messages(messages)
            .temperature(request.temperature)
            .max_tokens(request.max_tokens)
            .top_p(request.top_p.unwrap_or(1.0))
            .build()
            .map_err(|e| LlmCallError::InvalidRequest {
                message: e.to_string(),
            })?;

        // 调用 API
        let response = self.client.chat().create(api_request).await.map_err(|e| {
            warn!("LLM API 调用失败: {}", e);
            LlmCallError::RequestFailed {
                model: request.model.clone(),
                message: e.to_string(),
            }
        })?;

        debug!("LLM API 调用成功");

        // 提取响应内容
        let content = response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .map(|content| content.trim().to_string())
            .filter(|content| !content.is_empty())
            .ok_or_else(|| LlmCallError::EmptyContent {
                model: request.model.clone(),
            })?;

        Ok(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_requires_api_key() {
        let config = Config {
            api_key: "   ".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            OpenAiClient::new(&config),
            Err(ConfigError::MissingApiKey)
        ));
    }

    #[test]
    fn test_build_messages_keeps_order_and_roles() {
        let messages = OpenAiClient::build_messages(&[
            ChatMessage::system("sys"),
            ChatMessage::user("hi"),
            ChatMessage::assistant("hello"),
        ])
        .unwrap();

        assert_eq!(messages.len(), 3);
        assert!(matches!(messages[0], ChatCompletionRequestMessage::System(_)));
        assert!(matches!(messages[1], ChatCompletionRequestMessage::User(_)));
        assert!(matches!(
            messages[2],
            ChatCompletionRequestMessage::Assistant(_)
        ));
    }

    /// 测试 LLM API 连接性
    ///
    /// 运行方式：
    /// ```bash
    /// OPENAI_API_KEY=... cargo test test_live_completion -- --ignored --nocapture
    /// ```
    #[test]
    #[ignore]
    fn test_live_completion() {
        let _ = tracing_subscriber::fmt::try_init();

        let config = Config::default().with_env_overrides();
        let client = OpenAiClient::new(&config).expect("需要设置 OPENAI_API_KEY");
        let request = CompletionRequest {
            model: config.qa_model_name.clone(),
            messages: vec![ChatMessage::user("Hello")],
            temperature: 0.1,
            max_tokens: 10,
            top_p: None,
        };

        let response = tokio_test::block_on(client.complete(&request));
        match response {
            Ok(text) => {
                println!("LLM 响应: {}", text);
                assert!(!text.is_empty());
            }
            Err(e) => panic!("LLM 调用失败: {}", e),
        }
    }
}
