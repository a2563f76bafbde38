//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层负责整次运行的流程调度与统计，是整个系统的"指挥中心"。
//!
//! ## 模块划分
//!
//! ### `app` - 应用入口
//! - 检查凭据，创建唯一的 LLM 客户端
//! - 通过加载器注册表加载文档（Vec<SourceDocument>）
//! - 导出数据集、写诊断文件、输出统计信息
//!
//! ### `pipeline` - 两阶段流水线
//! - 分块（Vec<Chunk>）
//! - 第一阶段：逐个文本块生成原始问答
//! - 第二阶段：逐条原始响应转换为 JSON 并拆分合并问题
//! - 维护状态机与进度，汇总记录与诊断
//!
//! ## 层次关系
//!
//! ```text
//! app (处理 Vec<Path>)
//!     ↓
//! pipeline (处理 Vec<Chunk>)
//!     ↓
//! services (能力层：chunker / generator / structurer / extractor)
//!     ↓
//! clients (基础设施：CompletionClient)
//! ```

pub mod app;
pub mod pipeline;

// 重新导出主要类型
pub use app::{App, ConnectionCheck, ExportOptions, RunReport};
pub use pipeline::{Diagnostic, ProgressUpdate, QaPipeline, RunOutcome};
