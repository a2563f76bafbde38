//! 单元测试用的补全客户端：按顺序返回预设的结果，并记录收到的请求

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::clients::{CompletionClient, CompletionRequest};
use crate::error::LlmCallError;

#[derive(Default)]
pub(crate) struct ScriptedClient {
    replies: Mutex<VecDeque<Result<String, LlmCallError>>>,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedClient {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn reply(self, text: &str) -> Self {
        self.replies.lock().unwrap().push_back(Ok(text.to_string()));
        self
    }

    pub(crate) fn fail(self) -> Self {
        self.replies
            .lock()
            .unwrap()
            .push_back(Err(LlmCallError::RequestFailed {
                model: "scripted".to_string(),
                message: "rate limited".to_string(),
            }));
        self
    }

    pub(crate) fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl CompletionClient for ScriptedClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, LlmCallError> {
        self.requests.lock().unwrap().push(request.clone());
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| {
                Err(LlmCallError::RequestFailed {
                    model: request.model.clone(),
                    message: "no scripted reply left".to_string(),
                })
            })
    }
}
