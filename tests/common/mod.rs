#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use qa_dataset_builder::error::LlmCallError;
use qa_dataset_builder::{CompletionClient, CompletionRequest};

type Responder = Box<dyn Fn(&CompletionRequest) -> Result<String, LlmCallError> + Send + Sync>;

/// 不访问网络的补全客户端：由闭包决定回复，并记录收到的每个请求
pub struct ScriptedClient {
    responder: Responder,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedClient {
    pub fn new(
        responder: impl Fn(&CompletionRequest) -> Result<String, LlmCallError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            responder: Box::new(responder),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// 按调用顺序依次返回
    pub fn queue(replies: Vec<Result<String, LlmCallError>>) -> Self {
        let replies = Mutex::new(VecDeque::from(replies));
        Self::new(move |request| {
            replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(failure(&request.model)))
        })
    }

    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl CompletionClient for ScriptedClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, LlmCallError> {
        self.requests.lock().unwrap().push(request.clone());
        (self.responder)(request)
    }
}

pub fn ok(text: &str) -> Result<String, LlmCallError> {
    Ok(text.to_string())
}

pub fn failure(model: &str) -> LlmCallError {
    LlmCallError::RequestFailed {
        model: model.to_string(),
        message: "429 Too Many Requests".to_string(),
    }
}

/// 第二阶段的请求带有 system 消息
pub fn is_structuring(request: &CompletionRequest) -> bool {
    request.messages.len() == 2
}

pub fn user_content(request: &CompletionRequest) -> &str {
    request
        .messages
        .last()
        .map(|message| message.content.as_str())
        .unwrap_or_default()
}
