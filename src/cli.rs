//! 命令行参数

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::config::Config;
use crate::orchestrator::ExportOptions;
use crate::prompts::{DEFAULT_JSON_SYSTEM_PROMPT, DEFAULT_QA_PROMPT};

#[derive(Debug, Parser)]
#[command(
    name = "qa-dataset-builder",
    version,
    about = "把文档转换为用于监督微调的问答数据集"
)]
pub struct Cli {
    /// TOML 配置文件
    #[arg(short, long, global = true, env = "QA_CONFIG_FILE")]
    pub config: Option<PathBuf>,

    /// 显示详细日志
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// 从文档生成问答对
    Generate(GenerateArgs),
    /// 测试 API 连接
    Check,
    /// 输出默认提示词
    Prompts {
        #[arg(value_enum, default_value_t = PromptKind::Qa)]
        kind: PromptKind,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PromptKind {
    /// QA 生成提示词
    Qa,
    /// JSON 转换系统提示词
    Json,
}

impl PromptKind {
    pub fn default_text(self) -> &'static str {
        match self {
            PromptKind::Qa => DEFAULT_QA_PROMPT,
            PromptKind::Json => DEFAULT_JSON_SYSTEM_PROMPT,
        }
    }
}

#[derive(Debug, Args)]
pub struct GenerateArgs {
    /// 输入文件或文件夹
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,

    /// 数据集 JSON 输出路径
    #[arg(short, long, default_value = "qa_pairs.json")]
    pub output: PathBuf,

    /// 同时导出 SFT 格式
    #[arg(long)]
    pub sft_output: Option<PathBuf>,

    /// SFT 样本的系统提示词
    #[arg(long)]
    pub sft_system_prompt: Option<String>,

    #[arg(long)]
    pub qa_model: Option<String>,

    #[arg(long)]
    pub json_model: Option<String>,

    #[arg(long)]
    pub qa_temperature: Option<f32>,

    #[arg(long)]
    pub json_temperature: Option<f32>,

    #[arg(long)]
    pub max_tokens: Option<u32>,

    /// JSON 转换阶段的 max_tokens，默认与 --max-tokens 相同
    #[arg(long)]
    pub json_max_tokens: Option<u32>,

    #[arg(long)]
    pub chunk_size: Option<usize>,

    #[arg(long)]
    pub chunk_overlap: Option<usize>,

    /// 从文件读取 QA 生成提示词（需包含 {text_content}）
    #[arg(long)]
    pub qa_prompt_file: Option<PathBuf>,

    /// 从文件读取 JSON 转换系统提示词
    #[arg(long)]
    pub json_prompt_file: Option<PathBuf>,
}

impl Cli {
    /// 默认值 → TOML 文件 → 环境变量
    pub fn load_config(&self) -> Result<Config> {
        let config = match &self.config {
            Some(path) => Config::from_toml_file(path)?,
            None => Config::default(),
        };
        Ok(config.with_env_overrides())
    }
}

impl GenerateArgs {
    /// 命令行参数覆盖配置
    pub fn apply(&self, mut config: Config) -> Result<Config> {
        if let Some(model) = &self.qa_model {
            config.qa_model_name = model.clone();
        }
        if let Some(model) = &self.json_model {
            config.json_model_name = model.clone();
        }
        if let Some(value) = self.qa_temperature {
            config.qa_temperature = value;
        }
        if let Some(value) = self.json_temperature {
            config.json_temperature = value;
        }
        if let Some(value) = self.max_tokens {
            config.max_tokens = value;
        }
        if let Some(value) = self.json_max_tokens {
            config.json_max_tokens = Some(value);
        }
        if let Some(value) = self.chunk_size {
            config.chunk_size = value;
        }
        if let Some(value) = self.chunk_overlap {
            config.chunk_overlap = value;
        }
        if let Some(prompt) = &self.sft_system_prompt {
            config.sft_system_prompt = prompt.clone();
        }
        if let Some(path) = &self.qa_prompt_file {
            config.qa_generation_prompt = Some(read_prompt(path)?);
        }
        if let Some(path) = &self.json_prompt_file {
            config.json_system_prompt = Some(read_prompt(path)?);
        }
        Ok(config)
    }

    pub fn export_options(&self, config: &Config) -> ExportOptions {
        ExportOptions {
            dataset_path: Some(self.output.clone()),
            sft_path: self.sft_output.clone(),
            sft_system_prompt: config.sft_system_prompt.clone(),
        }
    }
}

fn read_prompt(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("无法读取提示词文件: {}", path.display()))
}
