//! 日志工具模块
//!
//! 提供日志初始化、格式化和输出的辅助函数

use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::services::RunStats;
use crate::workflow::Stage;

/// 初始化 tracing
///
/// `RUST_LOG` 优先；否则默认 `info`，`verbose` 时为 `debug`。重复调用无副作用。
pub fn init(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

/// 记录程序启动信息
pub fn log_startup(config: &Config) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - 两阶段问答数据集生成");
    info!("🌐 API 地址: {}", config.base_url);
    info!(
        "🤖 QA生成模型: {} | JSON转换模型: {}",
        config.qa_model_name,
        config.json_model()
    );
    info!(
        "✂️ 分块: {} 字符, 重叠 {} 字符",
        config.chunk_size, config.chunk_overlap
    );
    info!("{}", "=".repeat(60));
}

/// 记录文档加载信息
///
/// # 参数
/// - `loaded`: 成功加载的文档数
/// - `requested`: 输入的文件数
pub fn log_documents_loaded(loaded: usize, requested: usize) {
    info!("✓ 成功加载 {}/{} 个文件", loaded, requested);
    if loaded < requested {
        info!("💡 未能加载的文件已记录到诊断信息中\n");
    }
}

/// 记录阶段开始信息
pub fn log_stage_start(stage: Stage, total: usize) {
    let title = match stage {
        Stage::Loading => "加载文档",
        Stage::Generation => "生成原始问答",
        Stage::Structuring => "转换为JSON并拆分问题",
    };
    info!("\n{}", "=".repeat(60));
    info!("📦 {}: {} ({} 项)", stage, title, total);
    info!("{}", "=".repeat(60));
}

/// 打印最终统计信息
///
/// # 参数
/// - `stats`: 问答记录统计
/// - `diagnostics`: 被跳过的条目数
/// - `config`: 本次运行的配置
pub fn print_final_stats(stats: &RunStats, diagnostics: usize, config: &Config) {
    info!("\n{}", "=".repeat(60));
    info!("📊 生成统计");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    info!("📝 QA对总数: {}", stats.total_records);
    info!(
        "📄 文本段数量: {} (平均每段 {:.1} 个)",
        stats.unique_sources, stats.average_per_source
    );
    if !stats.question_types.is_empty() {
        info!("❓ 问题类型分布:");
        for (kind, count) in &stats.question_types {
            info!("  - {}: {}", kind, count);
        }
    }
    info!("⚠️ 跳过的条目: {}", diagnostics);
    info!("⚙️ 当前设定:");
    info!(
        "  - QA生成模型: {} (temperature {})",
        config.qa_model_name, config.qa_temperature
    );
    info!(
        "  - JSON转换模型: {} (temperature {})",
        config.json_model(),
        config.json_temperature
    );
    info!("  - Max Tokens: {}", config.max_tokens);
    info!("{}", "=".repeat(60));
}

/// 截断长文本用于日志显示
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最大长度（字符）
///
/// # 返回
/// 返回截断后的文本
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_text_counts_chars() {
        assert_eq!(truncate_text("問答對資料集", 2), "問答...");
        assert_eq!(truncate_text("short", 10), "short");
    }

    #[test]
    fn test_init_is_idempotent() {
        init(false);
        init(true);
    }
}
