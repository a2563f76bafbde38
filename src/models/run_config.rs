//! 单次运行的参数
//!
//! 运行开始时构造一次，之后只读。修改设置意味着构造新的值。

use crate::error::ConfigError;
use crate::prompts::{DEFAULT_JSON_SYSTEM_PROMPT, DEFAULT_QA_PROMPT, TEXT_PLACEHOLDER};

/// 某一阶段的模型参数
#[derive(Debug, Clone, PartialEq)]
pub struct StageSettings {
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl StageSettings {
    pub fn new(model: impl Into<String>, temperature: f32, max_tokens: u32) -> Self {
        Self {
            model: model.into(),
            temperature,
            max_tokens,
        }
    }

    fn validate(&self, stage: &'static str) -> Result<(), ConfigError> {
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(ConfigError::InvalidTemperature {
                stage,
                value: self.temperature,
            });
        }
        if self.max_tokens == 0 {
            return Err(ConfigError::InvalidMaxTokens);
        }
        Ok(())
    }
}

/// 两个阶段的提示词
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplates {
    /// 第一阶段模板，必须包含 `{text_content}`
    pub qa_generation: String,
    /// 第二阶段系统消息，原样发送
    pub json_system: String,
}

impl Default for PromptTemplates {
    fn default() -> Self {
        Self {
            qa_generation: DEFAULT_QA_PROMPT.to_string(),
            json_system: DEFAULT_JSON_SYSTEM_PROMPT.to_string(),
        }
    }
}

/// 一次运行的全部参数
#[derive(Debug, Clone, PartialEq)]
pub struct RunConfiguration {
    /// 第一阶段（QA 生成）
    pub generation: StageSettings,
    /// 第二阶段（JSON 结构化）
    pub structuring: StageSettings,
    pub prompts: PromptTemplates,
    /// 文本块目标长度（字符）
    pub chunk_size: usize,
    /// 相邻文本块的重叠长度（字符）
    pub chunk_overlap: usize,
}

impl Default for RunConfiguration {
    fn default() -> Self {
        Self {
            generation: StageSettings::new("gpt-4.1-nano", 0.1, 4096),
            structuring: StageSettings::new("gpt-4.1-nano", 0.1, 4096),
            prompts: PromptTemplates::default(),
            chunk_size: 2000,
            chunk_overlap: 500,
        }
    }
}

impl RunConfiguration {
    /// 检查参数，任何一项不合法都不允许开始运行
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.chunk_size == 0 || self.chunk_overlap >= self.chunk_size {
            return Err(ConfigError::InvalidChunking {
                size: self.chunk_size,
                overlap: self.chunk_overlap,
            });
        }
        if !self.prompts.qa_generation.contains(TEXT_PLACEHOLDER) {
            return Err(ConfigError::MissingPlaceholder {
                placeholder: TEXT_PLACEHOLDER,
            });
        }
        self.generation.validate("QA生成")?;
        self.structuring.validate("JSON转换")?;
        Ok(())
    }
}
