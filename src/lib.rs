//! # QA Dataset Builder
//!
//! 把文档转换为监督微调（SFT）用的问答数据集
//!
//! ## 架构设计
//!
//! 本系统采用分层架构：
//!
//! ### ① 基础设施层（Clients）
//! - `clients/` - 持有唯一的 LLM 连接，只暴露"补全"能力
//! - `CompletionClient` - 补全能力接口
//! - `OpenAiClient` - 基于 async-openai 的实现
//!
//! ### ② 数据层（Models）
//! - `models/` - `SourceDocument` / `Chunk` / `RawQaResponse` / `QaRecord` / `RunConfiguration`
//! - `models/loaders` - 每种文档格式一个 `DocumentLoader`，由 `LoaderRegistry` 按扩展名选择
//!
//! ### ③ 业务能力层（Services）
//! - `services/` - 描述"我能做什么"，每次只处理一个条目
//! - `TextChunker` - 分块
//! - `QaGenerator` - 第一阶段：生成原始问答
//! - `QaStructurer` - 第二阶段：转换为 JSON 并拆分合并问题
//! - `extractor` - 从响应中抽取并校验记录
//! - `exporter` / `DiagnosticsWriter` / `RunStats` - 导出、诊断与统计
//!
//! ### ④ 流程层（Workflow）
//! - `workflow/` - `ItemCtx`（正在处理哪一项）、`PipelineProgress`、`PipelineState`
//!
//! ### ⑤ 编排层（Orchestration）
//! - `orchestrator/pipeline` - 两阶段流水线，汇总记录与诊断
//! - `orchestrator/app` - 加载 → 流水线 → 导出
//!
//! ## 模块结构

pub mod cli;
pub mod clients;
pub mod config;
pub mod error;
pub mod models;
pub mod orchestrator;
pub mod prompts;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use clients::{CompletionClient, CompletionRequest, OpenAiClient};
pub use config::Config;
pub use error::{AppError, AppResult, PipelineError};
pub use models::{Chunk, QaRecord, RawQaResponse, RunConfiguration, SourceDocument};
pub use orchestrator::{App, Diagnostic, ExportOptions, QaPipeline, RunOutcome, RunReport};
pub use workflow::{PipelineState, Stage};
