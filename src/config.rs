use std::path::Path;
use std::str::FromStr;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::models::run_config::{PromptTemplates, RunConfiguration, StageSettings};
use crate::prompts::{DEFAULT_JSON_SYSTEM_PROMPT, DEFAULT_QA_PROMPT, DEFAULT_SFT_SYSTEM_PROMPT};

/// 程序配置
///
/// 优先级：默认值 < TOML 文件 < 环境变量 < 命令行参数
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    // --- LLM 配置 ---
    pub api_key: String,
    pub base_url: String,
    /// QA 生成模型
    pub qa_model_name: String,
    /// JSON 转换模型，留空则使用 QA 生成模型
    pub json_model_name: String,
    pub qa_temperature: f32,
    pub json_temperature: f32,
    /// 每次 API 调用的最大 token 数
    pub max_tokens: u32,
    /// JSON 转换阶段单独的 max_tokens，未设置时与 `max_tokens` 相同
    pub json_max_tokens: Option<u32>,
    // --- 分块配置 ---
    pub chunk_size: usize,
    pub chunk_overlap: usize,
    // --- 提示词 ---
    /// 覆盖默认的 QA 生成提示词
    pub qa_generation_prompt: Option<String>,
    /// 覆盖默认的 JSON 转换系统提示词
    pub json_system_prompt: Option<String>,
    /// SFT 导出使用的系统提示词
    pub sft_system_prompt: String,
    // --- 输出 ---
    /// 诊断信息文件
    pub diagnostics_file: String,
    /// 是否显示详细日志
    pub verbose_logging: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: "https://api.openai.com/v1".to_string(),
            qa_model_name: "gpt-4.1-nano".to_string(),
            json_model_name: String::new(),
            qa_temperature: 0.1,
            json_temperature: 0.1,
            max_tokens: 4096,
            json_max_tokens: None,
            chunk_size: 2000,
            chunk_overlap: 500,
            qa_generation_prompt: None,
            json_system_prompt: None,
            sft_system_prompt: DEFAULT_SFT_SYSTEM_PROMPT.to_string(),
            diagnostics_file: "diagnostics.txt".to_string(),
            verbose_logging: false,
        }
    }
}

impl Config {
    /// 默认值 + 环境变量
    pub fn from_env() -> Self {
        Self::default().with_env_overrides()
    }

    /// 从 TOML 文件加载，文件中未出现的字段使用默认值
    pub fn from_toml_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("无法读取配置文件: {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("无法解析配置文件: {}", path.display()))?;
        Ok(config)
    }

    /// 用环境变量覆盖已有的值
    pub fn with_env_overrides(self) -> Self {
        Self {
            api_key: env_string("OPENAI_API_KEY").unwrap_or(self.api_key),
            base_url: env_string("OPENAI_BASE_URL").unwrap_or(self.base_url),
            qa_model_name: env_string("QA_MODEL_NAME").unwrap_or(self.qa_model_name),
            json_model_name: env_string("JSON_MODEL_NAME").unwrap_or(self.json_model_name),
            qa_temperature: env_parse("QA_TEMPERATURE").unwrap_or(self.qa_temperature),
            json_temperature: env_parse("JSON_TEMPERATURE").unwrap_or(self.json_temperature),
            max_tokens: env_parse("MAX_TOKENS").unwrap_or(self.max_tokens),
            json_max_tokens: env_parse("JSON_MAX_TOKENS").or(self.json_max_tokens),
            chunk_size: env_parse("CHUNK_SIZE").unwrap_or(self.chunk_size),
            chunk_overlap: env_parse("CHUNK_OVERLAP").unwrap_or(self.chunk_overlap),
            qa_generation_prompt: self.qa_generation_prompt,
            json_system_prompt: self.json_system_prompt,
            sft_system_prompt: env_string("SFT_SYSTEM_PROMPT").unwrap_or(self.sft_system_prompt),
            diagnostics_file: env_string("DIAGNOSTICS_FILE").unwrap_or(self.diagnostics_file),
            verbose_logging: env_parse("VERBOSE_LOGGING").unwrap_or(self.verbose_logging),
        }
    }

    /// 实际使用的 JSON 转换模型
    pub fn json_model(&self) -> &str {
        if self.json_model_name.trim().is_empty() {
            &self.qa_model_name
        } else {
            &self.json_model_name
        }
    }

    /// 构造本次运行的只读参数
    pub fn run_configuration(&self) -> RunConfiguration {
        RunConfiguration {
            generation: StageSettings::new(
                self.qa_model_name.clone(),
                self.qa_temperature,
                self.max_tokens,
            ),
            structuring: StageSettings::new(
                self.json_model(),
                self.json_temperature,
                self.json_max_tokens.unwrap_or(self.max_tokens),
            ),
            prompts: PromptTemplates {
                qa_generation: self
                    .qa_generation_prompt
                    .clone()
                    .unwrap_or_else(|| DEFAULT_QA_PROMPT.to_string()),
                json_system: self
                    .json_system_prompt
                    .clone()
                    .unwrap_or_else(|| DEFAULT_JSON_SYSTEM_PROMPT.to_string()),
            },
            chunk_size: self.chunk_size,
            chunk_overlap: self.chunk_overlap,
        }
    }
}

fn env_string(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

fn env_parse<T: FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok().and_then(|v| v.trim().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_model_falls_back_to_qa_model() {
        let config = Config {
            qa_model_name: "qa-model".to_string(),
            json_model_name: " ".to_string(),
            ..Default::default()
        };
        assert_eq!(config.json_model(), "qa-model");

        let config = Config {
            json_model_name: "json-model".to_string(),
            ..config
        };
        assert_eq!(config.json_model(), "json-model");
    }

    #[test]
    fn test_run_configuration_uses_defaults() {
        let run = Config::default().run_configuration();
        assert_eq!(run.generation.model, "gpt-4.1-nano");
        assert_eq!(run.structuring.model, "gpt-4.1-nano");
        assert_eq!(run.structuring.max_tokens, 4096);
        assert_eq!(run.prompts.qa_generation, DEFAULT_QA_PROMPT);
        assert_eq!(run.prompts.json_system, DEFAULT_JSON_SYSTEM_PROMPT);
        assert_eq!((run.chunk_size, run.chunk_overlap), (2000, 500));
    }

    #[test]
    fn test_from_toml_file_partial() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("qa.toml");
        std::fs::write(
            &path,
            "qa_model_name = \"gpt-4.1-mini\"\njson_temperature = 0.0\nchunk_size = 800\nchunk_overlap = 100\n",
        )
        .unwrap();

        let config = Config::from_toml_file(&path).unwrap();
        assert_eq!(config.qa_model_name, "gpt-4.1-mini");
        assert_eq!(config.json_temperature, 0.0);
        assert_eq!(config.chunk_size, 800);
        assert_eq!(config.max_tokens, 4096);
        assert_eq!(config.json_model(), "gpt-4.1-mini");
    }

    #[test]
    fn test_from_toml_file_reports_bad_syntax() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "chunk_size = [").unwrap();

        let err = Config::from_toml_file(&path).unwrap_err();
        assert!(err.to_string().contains("无法解析配置文件"));
    }
}
