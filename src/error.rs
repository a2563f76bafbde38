//! 错误类型
//!
//! 按失败来源划分：文档加载、LLM 调用、结构化输出、配置、导出。
//! 除配置错误外，所有单项失败都只会让该项被跳过，不会中止整个运行。

use std::fmt;

use thiserror::Error;

/// 文档加载错误
#[derive(Debug, Error)]
pub enum LoadError {
    /// 没有对应扩展名的加载器
    #[error("不支持的文件扩展名 '{extension}': {path}")]
    UnsupportedExtension { path: String, extension: String },

    /// 读取文件失败
    #[error("读取文件失败 ({path}): {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// 文件内容无法解析
    #[error("文件格式错误 ({path}): {message}")]
    Malformed { path: String, message: String },

    /// 未提取到任何文本
    #[error("文件中没有可提取的文本: {path}")]
    Empty { path: String },
}

/// LLM 调用错误
///
/// 鉴权、网络、限流、模型不存在等情况统一归入此类
#[derive(Debug, Error)]
pub enum LlmCallError {
    /// API 调用失败
    #[error("LLM API调用失败 (模型: {model}): {message}")]
    RequestFailed { model: String, message: String },

    /// 返回内容为空
    #[error("LLM返回内容为空 (模型: {model})")]
    EmptyContent { model: String },

    /// 请求构建失败
    #[error("LLM请求构建失败: {message}")]
    InvalidRequest { message: String },
}

/// 结构化输出错误
#[derive(Debug, Error)]
pub enum StructuredOutputError {
    /// 响应中找不到 `[` ... `]`
    #[error("LLM未返回有效的JSON格式: {preview}")]
    NoJsonArray { preview: String },

    /// 找到了方括号但内容不是合法 JSON
    #[error("JSON解析失败: {message}")]
    ParseFailed { message: String },
}

/// 单项处理失败的原因，作为诊断信息汇总给调用方
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    LlmCall(#[from] LlmCallError),

    #[error(transparent)]
    StructuredOutput(#[from] StructuredOutputError),
}

impl PipelineError {
    /// 错误类别名称，用于统计与日志
    pub fn kind(&self) -> ErrorKind {
        match self {
            PipelineError::Load(_) => ErrorKind::Load,
            PipelineError::LlmCall(_) => ErrorKind::LlmCall,
            PipelineError::StructuredOutput(_) => ErrorKind::StructuredOutput,
        }
    }
}

/// 诊断信息的类别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Load,
    LlmCall,
    StructuredOutput,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::Load => "LoadError",
            ErrorKind::LlmCall => "LLMCallError",
            ErrorKind::StructuredOutput => "StructuredOutputError",
        };
        f.write_str(name)
    }
}

/// 配置错误，在处理任何文档之前报告
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 未设置 API Key
    #[error("未设置API Key，请先配置 OPENAI_API_KEY")]
    MissingApiKey,

    /// QA 提示词缺少占位符
    #[error("QA生成提示词缺少占位符 {placeholder}")]
    MissingPlaceholder { placeholder: &'static str },

    /// 分块参数不合法
    #[error("分块参数不合法: chunk_size={size}, chunk_overlap={overlap} (要求 0 <= overlap < size)")]
    InvalidChunking { size: usize, overlap: usize },

    /// 温度超出范围
    #[error("{stage} temperature {value} 超出范围 [0.0, 2.0]")]
    InvalidTemperature { stage: &'static str, value: f32 },

    /// max_tokens 为 0
    #[error("max_tokens 必须大于 0")]
    InvalidMaxTokens,
}

/// 导出错误
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("JSON序列化失败: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("写入文件失败 ({path}): {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// 流水线状态错误
#[derive(Debug, Error)]
pub enum PipelineStateError {
    /// 一条流水线只能运行一次
    #[error("流水线已经运行过 (当前状态: {state})，请创建新的流水线")]
    AlreadyStarted { state: String },
}

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),

    #[error("导出错误: {0}")]
    Export(#[from] ExportError),

    #[error("流水线错误: {0}")]
    State(#[from] PipelineStateError),
}

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pipeline_error_kind() {
        let err: PipelineError = StructuredOutputError::ParseFailed {
            message: "EOF".to_string(),
        }
        .into();
        assert_eq!(err.kind(), ErrorKind::StructuredOutput);
        assert_eq!(err.kind().to_string(), "StructuredOutputError");

        let err: PipelineError = LlmCallError::EmptyContent {
            model: "gpt-4.1-nano".to_string(),
        }
        .into();
        assert_eq!(err.kind(), ErrorKind::LlmCall);
        assert!(err.to_string().contains("gpt-4.1-nano"));
    }

    #[test]
    fn test_config_error_message() {
        let err = ConfigError::InvalidChunking {
            size: 100,
            overlap: 100,
        };
        assert!(err.to_string().contains("chunk_overlap=100"));
    }
}
