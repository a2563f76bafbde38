//! 应用入口 - 编排层
//!
//! ## 核心功能
//!
//! 1. **应用初始化**：检查凭据与参数，创建唯一的 LLM 客户端
//! 2. **加载文档**：按扩展名选择加载器，加载失败的文件记入诊断
//! 3. **运行流水线**：委托 `QaPipeline` 完成分块与两个阶段
//! 4. **导出与统计**：写出数据集、诊断文件并打印统计信息
//!
//! 没有 API Key 时在读取任何文档之前失败。

use std::path::PathBuf;
use std::sync::Arc;

use tracing::{debug, error, info, warn};

use crate::clients::{ChatMessage, CompletionClient, CompletionRequest, OpenAiClient};
use crate::config::Config;
use crate::error::{AppResult, LlmCallError};
use crate::models::{LoaderRegistry, QaRecord, RunConfiguration, SourceDocument};
use crate::orchestrator::pipeline::{Diagnostic, ProgressUpdate, QaPipeline, RunOutcome};
use crate::services::{exporter, DiagnosticsWriter, RunStats};
use crate::utils::logging::{log_documents_loaded, log_stage_start, log_startup, print_final_stats};
use crate::workflow::{ItemCtx, Stage};

/// 导出选项
#[derive(Debug, Clone)]
pub struct ExportOptions {
    /// 数据集 JSON 路径
    pub dataset_path: Option<PathBuf>,
    /// SFT JSON 路径
    pub sft_path: Option<PathBuf>,
    /// SFT 样本的系统提示词
    pub sft_system_prompt: String,
}

impl ExportOptions {
    /// 只导出数据集 JSON
    pub fn dataset(path: impl Into<PathBuf>, config: &Config) -> Self {
        Self {
            dataset_path: Some(path.into()),
            sft_path: None,
            sft_system_prompt: config.sft_system_prompt.clone(),
        }
    }

    /// 不写任何文件
    pub fn none(config: &Config) -> Self {
        Self {
            dataset_path: None,
            sft_path: None,
            sft_system_prompt: config.sft_system_prompt.clone(),
        }
    }
}

/// 一次运行的报告
#[derive(Debug)]
pub struct RunReport {
    pub outcome: RunOutcome,
    pub stats: RunStats,
    /// 运行开始时间，写入数据集的 `generated_timestamp`
    pub generated_timestamp: String,
    /// 实际写出的文件
    pub written: Vec<PathBuf>,
}

impl RunReport {
    pub fn records(&self) -> &[QaRecord] {
        &self.outcome.records
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.outcome.diagnostics
    }
}

/// 单个模型的连接测试结果
#[derive(Debug)]
pub struct ConnectionCheck {
    pub model: String,
    pub result: Result<String, LlmCallError>,
}

/// 应用主结构
pub struct App {
    config: Config,
    run_config: RunConfiguration,
    client: Arc<dyn CompletionClient>,
    registry: LoaderRegistry,
}

impl App {
    /// 初始化应用
    ///
    /// 先检查凭据，再检查运行参数
    pub fn initialize(config: Config) -> AppResult<Self> {
        let client = OpenAiClient::new(&config).map_err(|e| {
            error!("❌ {}", e);
            e
        })?;
        debug!("LLM 客户端已创建: {}", client.api_base_url());

        let app = Self::with_client(config, Arc::new(client))?;
        log_startup(&app.config);
        Ok(app)
    }

    /// 使用指定的补全客户端创建应用
    pub fn with_client(config: Config, client: Arc<dyn CompletionClient>) -> AppResult<Self> {
        let run_config = config.run_configuration();
        run_config.validate()?;

        Ok(Self {
            config,
            run_config,
            client,
            registry: LoaderRegistry::default(),
        })
    }

    /// 替换加载器注册表
    pub fn with_registry(mut self, registry: LoaderRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// 加载所有文件，失败的文件记入诊断后跳过
    pub fn load_documents(&self, paths: &[PathBuf]) -> (Vec<SourceDocument>, Vec<Diagnostic>) {
        log_stage_start(Stage::Loading, paths.len());

        let mut documents = Vec::with_capacity(paths.len());
        let mut diagnostics = Vec::new();

        for (index, path) in paths.iter().enumerate() {
            let ctx = ItemCtx::new(
                Stage::Loading,
                index + 1,
                paths.len(),
                index,
                path.display().to_string(),
            );

            match self.registry.load(path) {
                Ok(document) => {
                    info!("{} ✓ {} 字符", ctx, document.char_count());
                    documents.push(document);
                }
                Err(e) => {
                    warn!("{} ⚠️ 已跳过: {}", ctx, e);
                    diagnostics.push(Diagnostic::new(&ctx, e.into()));
                }
            }
        }

        log_documents_loaded(documents.len(), paths.len());
        (documents, diagnostics)
    }

    /// 运行应用主逻辑
    pub async fn run(&self, paths: &[PathBuf], export: &ExportOptions) -> AppResult<RunReport> {
        let generated_timestamp = exporter::generation_timestamp();

        let (documents, load_diagnostics) = self.load_documents(paths);

        let mut pipeline = QaPipeline::new(self.client.clone(), &self.run_config)?;
        let mut outcome = pipeline.run(&documents, &mut log_progress).await?;
        outcome.diagnostics.splice(0..0, load_diagnostics);

        if outcome.dropped_records > 0 {
            debug!("共丢弃 {} 条不完整的记录", outcome.dropped_records);
        }

        self.write_diagnostics(&outcome.diagnostics, &generated_timestamp)
            .await;

        let written = if outcome.records.is_empty() {
            warn!("⚠️ 没有生成任何问答对，不写出文件");
            Vec::new()
        } else {
            export_records(&outcome.records, export, &generated_timestamp).await?
        };

        let stats = RunStats::from_records(&outcome.records);
        print_final_stats(&stats, outcome.diagnostics.len(), &self.config);

        Ok(RunReport {
            outcome,
            stats,
            generated_timestamp,
            written,
        })
    }

    /// 测试 API 连接
    ///
    /// 对 QA 生成模型发送一次 `Hello`；JSON 转换模型不同时，QA 模型连接成功后再测试它
    pub async fn check_connection(&self) -> Vec<ConnectionCheck> {
        let mut models = vec![self.run_config.generation.model.clone()];
        if self.run_config.structuring.model != self.run_config.generation.model {
            models.push(self.run_config.structuring.model.clone());
        }

        let mut checks = Vec::with_capacity(models.len());
        for model in models {
            let request = CompletionRequest {
                model: model.clone(),
                messages: vec![ChatMessage::user("Hello")],
                temperature: 0.1,
                max_tokens: 10,
                top_p: None,
            };

            let result = self.client.complete(&request).await;
            let failed = result.is_err();
            match &result {
                Ok(_) => info!("✅ 模型 {} 连接成功", model),
                Err(e) => error!("❌ 模型 {} 连接失败: {}", model, e),
            }
            checks.push(ConnectionCheck { model, result });
            if failed {
                break;
            }
        }
        checks
    }

    async fn write_diagnostics(&self, diagnostics: &[Diagnostic], timestamp: &str) {
        if diagnostics.is_empty() {
            return;
        }

        let writer = DiagnosticsWriter::with_path(self.config.diagnostics_file.as_str());
        let result = async {
            writer.write_header(timestamp).await?;
            for diagnostic in diagnostics {
                writer
                    .write(diagnostic.label(), &diagnostic.source, &diagnostic.error)
                    .await?;
            }
            anyhow::Ok(())
        }
        .await;

        match result {
            Ok(()) => info!(
                "📝 {} 条诊断信息已写入: {}",
                diagnostics.len(),
                writer.path()
            ),
            Err(e) => warn!("写入诊断文件失败 ({}): {}", writer.path(), e),
        }
    }
}

async fn export_records(
    records: &[QaRecord],
    export: &ExportOptions,
    timestamp: &str,
) -> AppResult<Vec<PathBuf>> {
    let mut written = Vec::new();

    if let Some(path) = &export.dataset_path {
        exporter::write_dataset(path, records, timestamp).await?;
        written.push(path.clone());
    }
    if let Some(path) = &export.sft_path {
        exporter::write_sft(path, records, &export.sft_system_prompt).await?;
        written.push(path.clone());
    }

    Ok(written)
}

fn log_progress(update: &ProgressUpdate) {
    debug!(
        "进度 {:.1}% [{}] {}/{}",
        update.progress * 100.0,
        update.state,
        update.completed,
        update.total
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::scripted::ScriptedClient;
    use crate::error::{AppError, ConfigError};

    #[test]
    fn test_initialize_fails_fast_without_api_key() {
        let config = Config::default();
        assert!(matches!(
            App::initialize(config),
            Err(AppError::Config(ConfigError::MissingApiKey))
        ));
    }

    #[test]
    fn test_initialize_rejects_bad_chunking() {
        let config = Config {
            api_key: "sk-test".to_string(),
            chunk_size: 100,
            chunk_overlap: 200,
            ..Default::default()
        };
        assert!(matches!(
            App::initialize(config),
            Err(AppError::Config(ConfigError::InvalidChunking { .. }))
        ));
    }

    #[test]
    fn test_check_connection_tests_both_models() {
        let client = Arc::new(ScriptedClient::new().reply("Hi").fail());
        let config = Config {
            qa_model_name: "qa-model".to_string(),
            json_model_name: "json-model".to_string(),
            ..Default::default()
        };
        let app = App::with_client(config, client.clone()).unwrap();

        let checks = tokio_test::block_on(app.check_connection());
        assert_eq!(checks.len(), 2);
        assert!(checks[0].result.is_ok());
        assert!(checks[1].result.is_err());

        let requests = client.requests();
        assert_eq!(requests[0].model, "qa-model");
        assert_eq!(requests[1].model, "json-model");
        assert_eq!(requests[0].max_tokens, 10);
        assert_eq!(requests[0].messages, vec![ChatMessage::user("Hello")]);
    }

    #[test]
    fn test_check_connection_stops_after_qa_failure() {
        let client = Arc::new(ScriptedClient::new().fail().reply("Hi"));
        let config = Config {
            qa_model_name: "qa-model".to_string(),
            json_model_name: "json-model".to_string(),
            ..Default::default()
        };
        let app = App::with_client(config, client.clone()).unwrap();

        let checks = tokio_test::block_on(app.check_connection());
        assert_eq!(checks.len(), 1);
        assert_eq!(checks[0].model, "qa-model");
        assert!(checks[0].result.is_err());
        assert_eq!(client.requests().len(), 1);
    }

    #[test]
    fn test_check_connection_same_model_once() {
        let client = Arc::new(ScriptedClient::new().reply("Hi"));
        let app = App::with_client(Config::default(), client.clone()).unwrap();

        let checks = tokio_test::block_on(app.check_connection());
        assert_eq!(checks.len(), 1);
        assert_eq!(client.requests().len(), 1);
    }
}
