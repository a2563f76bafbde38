//! 两阶段流水线 - 编排层
//!
//! ## 职责
//!
//! 1. **分块**：把文档切成文本块
//! 2. **第一阶段**：逐个文本块调用 `QaGenerator`
//! 3. **第二阶段**：逐条原始响应调用 `QaStructurer`
//! 4. **汇总**：收集所有问答记录与诊断信息，维护进度与状态
//!
//! 所有调用顺序执行。单个条目失败只会让该条目被跳过并记入诊断，
//! 不会影响其他条目。

use std::fmt::Display;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::clients::CompletionClient;
use crate::error::{ConfigError, ErrorKind, PipelineError, PipelineStateError};
use crate::models::{Chunk, QaRecord, RawQaResponse, RunConfiguration, SourceDocument};
use crate::services::{QaGenerator, QaStructurer, TextChunker};
use crate::utils::logging::log_stage_start;
use crate::workflow::{ItemCtx, PipelineProgress, PipelineState, Stage};

/// 进度通知
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressUpdate {
    pub state: PipelineState,
    /// [0.0, 1.0]，单调不减
    pub progress: f64,
    /// 当前阶段已完成的条目数
    pub completed: usize,
    /// 当前阶段的条目总数
    pub total: usize,
}

/// 一个被跳过的条目
#[derive(Debug)]
pub struct Diagnostic {
    pub stage: Stage,
    /// 文本块序号（加载阶段为文件序号）
    pub item_index: usize,
    /// 来源文件
    pub source: String,
    pub error: PipelineError,
}

impl Diagnostic {
    pub fn new(ctx: &ItemCtx, error: PipelineError) -> Self {
        Self {
            stage: ctx.stage,
            item_index: ctx.item_index,
            source: ctx.source.clone(),
            error,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.error.kind()
    }

    /// 诊断文件中使用的短标签
    pub fn label(&self) -> String {
        format!("[{} #{}]", self.stage, self.item_index)
    }
}

impl Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} {} | {}: {}",
            self.label(),
            self.source,
            self.kind(),
            self.error
        )
    }
}

/// 一次运行的结果
#[derive(Debug, Default)]
pub struct RunOutcome {
    /// 所有通过校验的问答记录，按文本块顺序
    pub records: Vec<QaRecord>,
    /// 被跳过的条目
    pub diagnostics: Vec<Diagnostic>,
    pub chunk_count: usize,
    /// 第一阶段成功的文本块数
    pub raw_response_count: usize,
    /// 因缺少字段而被丢弃的记录数（不算作错误）
    pub dropped_records: usize,
}

/// 两阶段流水线
///
/// 状态：`Idle → ChunkingComplete → Stage1Running → Stage1Complete → Stage2Running → Done`。
/// 每条流水线只能运行一次，再次运行需要新建。
pub struct QaPipeline {
    chunker: TextChunker,
    generator: QaGenerator,
    structurer: QaStructurer,
    state: PipelineState,
    progress: PipelineProgress,
}

impl QaPipeline {
    /// 创建流水线
    ///
    /// 参数不合法时直接失败，不会发出任何请求
    pub fn new(
        client: Arc<dyn CompletionClient>,
        config: &RunConfiguration,
    ) -> Result<Self, ConfigError> {
        config.validate()?;

        Ok(Self {
            chunker: TextChunker::new(config.chunk_size, config.chunk_overlap)?,
            generator: QaGenerator::new(
                client.clone(),
                config.generation.clone(),
                config.prompts.qa_generation.as_str(),
            ),
            structurer: QaStructurer::new(
                client,
                config.structuring.clone(),
                config.prompts.json_system.as_str(),
            ),
            state: PipelineState::Idle,
            progress: PipelineProgress::new(),
        })
    }

    pub fn state(&self) -> PipelineState {
        self.state
    }

    pub fn progress(&self) -> f64 {
        self.progress.value()
    }

    /// 分块后运行两个阶段
    pub async fn run(
        &mut self,
        documents: &[SourceDocument],
        observer: &mut dyn FnMut(&ProgressUpdate),
    ) -> Result<RunOutcome, PipelineStateError> {
        self.ensure_idle()?;
        let chunks = self.chunker.chunk_documents(documents);
        self.execute(chunks, observer).await
    }

    /// 对已经切好的文本块运行两个阶段
    pub async fn run_chunks(
        &mut self,
        chunks: Vec<Chunk>,
        observer: &mut dyn FnMut(&ProgressUpdate),
    ) -> Result<RunOutcome, PipelineStateError> {
        self.ensure_idle()?;
        self.execute(chunks, observer).await
    }

    fn ensure_idle(&self) -> Result<(), PipelineStateError> {
        if self.state != PipelineState::Idle {
            return Err(PipelineStateError::AlreadyStarted {
                state: self.state.to_string(),
            });
        }
        Ok(())
    }

    async fn execute(
        &mut self,
        chunks: Vec<Chunk>,
        observer: &mut dyn FnMut(&ProgressUpdate),
    ) -> Result<RunOutcome, PipelineStateError> {
        let mut outcome = RunOutcome {
            chunk_count: chunks.len(),
            ..Default::default()
        };
        info!("✂️ 共 {} 个文本块", chunks.len());
        self.advance(0, chunks.len(), observer)?;

        let raw_responses = self
            .run_generation(&chunks, &mut outcome, observer)
            .await?;
        outcome.raw_response_count = raw_responses.len();

        self.run_structuring(&raw_responses, &mut outcome, observer)
            .await?;

        info!(
            "✅ 流水线完成: {} 条问答记录, {} 个条目被跳过",
            outcome.records.len(),
            outcome.diagnostics.len()
        );
        Ok(outcome)
    }

    /// 第一阶段：每个文本块一次调用
    async fn run_generation<'c>(
        &mut self,
        chunks: &'c [Chunk],
        outcome: &mut RunOutcome,
        observer: &mut dyn FnMut(&ProgressUpdate),
    ) -> Result<Vec<(&'c Chunk, RawQaResponse)>, PipelineStateError> {
        let total = chunks.len();
        log_stage_start(Stage::Generation, total);
        self.progress.start_generation(total);
        self.advance(0, total, observer)?;

        let mut raw_responses = Vec::with_capacity(total);
        for (position, chunk) in chunks.iter().enumerate() {
            let ctx = ItemCtx::new(
                Stage::Generation,
                position + 1,
                total,
                chunk.index,
                chunk.source.as_str(),
            );
            info!("{} 生成问答中...", ctx);

            match self.generator.generate(chunk).await {
                Ok(raw) => raw_responses.push((chunk, raw)),
                Err(e) => {
                    warn!("{} ⚠️ 已跳过: {}", ctx, e);
                    outcome.diagnostics.push(Diagnostic::new(&ctx, e.into()));
                }
            }

            self.progress.complete_generation_item();
            self.notify(position + 1, total, observer);
        }

        self.progress.finish_generation();
        self.advance(total, total, observer)?;
        info!(
            "✓ 第一阶段完成: {}/{} 个文本块成功",
            raw_responses.len(),
            total
        );

        Ok(raw_responses)
    }

    /// 第二阶段：每条原始响应一次调用
    async fn run_structuring(
        &mut self,
        raw_responses: &[(&Chunk, RawQaResponse)],
        outcome: &mut RunOutcome,
        observer: &mut dyn FnMut(&ProgressUpdate),
    ) -> Result<(), PipelineStateError> {
        let total = raw_responses.len();
        log_stage_start(Stage::Structuring, total);
        self.progress.start_structuring(total);
        self.advance(0, total, observer)?;

        for (position, (chunk, raw)) in raw_responses.iter().enumerate() {
            let ctx = ItemCtx::new(
                Stage::Structuring,
                position + 1,
                total,
                chunk.index,
                chunk.source.as_str(),
            );
            info!("{} 转换为JSON中...", ctx);

            match self.structurer.structure(raw).await {
                Ok(extraction) => {
                    debug!(
                        "{} 得到 {} 条记录",
                        ctx,
                        extraction.records.len()
                    );
                    outcome.dropped_records += extraction.dropped;
                    outcome.records.extend(extraction.records);
                }
                Err(e) => {
                    warn!("{} ⚠️ 已跳过 ({}): {}", ctx, e.kind(), e);
                    outcome.diagnostics.push(Diagnostic::new(&ctx, e));
                }
            }

            self.progress.complete_structuring_item();
            self.notify(position + 1, total, observer);
        }

        self.progress.finish();
        self.advance(total, total, observer)
    }

    /// 前进到下一个状态；`Done` 之后不能再前进
    fn advance(
        &mut self,
        completed: usize,
        total: usize,
        observer: &mut dyn FnMut(&ProgressUpdate),
    ) -> Result<(), PipelineStateError> {
        let next = self
            .state
            .next()
            .ok_or_else(|| PipelineStateError::AlreadyStarted {
                state: self.state.to_string(),
            })?;
        debug!("流水线状态: {} → {}", self.state, next);
        self.state = next;
        self.notify(completed, total, observer);
        Ok(())
    }

    fn notify(
        &self,
        completed: usize,
        total: usize,
        observer: &mut dyn FnMut(&ProgressUpdate),
    ) {
        observer(&ProgressUpdate {
            state: self.state,
            progress: self.progress.value(),
            completed,
            total,
        });
    }
}
