//! 诊断写入服务 - 业务能力层
//!
//! 只负责"把跳过的条目写进诊断文件"，不关心流程

use std::fmt::Display;

use anyhow::Result;
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tracing::debug;

use crate::error::PipelineError;

/// 诊断写入服务
///
/// 每次运行先写一行表头，之后每个被跳过的条目追加一行：
/// `[阶段 #序号] 来源 | 错误类别 | 错误信息`
pub struct DiagnosticsWriter {
    file_path: String,
}

impl DiagnosticsWriter {
    pub fn new() -> Self {
        Self {
            file_path: "diagnostics.txt".to_string(),
        }
    }

    /// 使用自定义文件路径创建
    pub fn with_path(path: impl Into<String>) -> Self {
        Self {
            file_path: path.into(),
        }
    }

    pub fn path(&self) -> &str {
        &self.file_path
    }

    /// 以运行时间开始新的一节
    pub async fn write_header(&self, timestamp: &str) -> Result<()> {
        let header = format!("{}\n运行时间 - {}\n", "=".repeat(60), timestamp);
        self.append(&header).await
    }

    /// 追加一条诊断
    ///
    /// - `ctx`: 条目位置，例如 `[阶段2 #7]`
    /// - `source`: 来源文件
    pub async fn write(
        &self,
        ctx: impl Display,
        source: &str,
        error: &PipelineError,
    ) -> Result<()> {
        debug!("写入诊断: {} {} | {}", ctx, source, error.kind());

        let line = format!(
            "{} {} | {} | {}\n",
            ctx,
            source,
            error.kind(),
            error.to_string().replace('\n', " ")
        );
        self.append(&line).await
    }

    async fn append(&self, text: &str) -> Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.file_path)
            .await?;
        file.write_all(text.as_bytes()).await?;
        file.flush().await?;
        Ok(())
    }
}

impl Default for DiagnosticsWriter {
    fn default() -> Self {
        Self::new()
    }
}
