//! 条目处理上下文
//!
//! 封装"我正在处理哪个阶段的第几项"这一信息

use std::fmt::Display;

/// 条目所在的阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// 文档加载
    Loading,
    /// 第一阶段：QA 生成
    Generation,
    /// 第二阶段：JSON 结构化
    Structuring,
}

impl Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Stage::Loading => "加载",
            Stage::Generation => "阶段1",
            Stage::Structuring => "阶段2",
        };
        f.write_str(name)
    }
}

/// 条目处理上下文
#[derive(Debug, Clone)]
pub struct ItemCtx {
    pub stage: Stage,

    /// 本阶段内的位置（从1开始，仅用于日志显示）
    pub position: usize,

    /// 本阶段条目总数
    pub total: usize,

    /// 文本块序号（加载阶段为文件序号）
    pub item_index: usize,

    /// 来源文件
    pub source: String,
}

impl ItemCtx {
    pub fn new(
        stage: Stage,
        position: usize,
        total: usize,
        item_index: usize,
        source: impl Into<String>,
    ) -> Self {
        Self {
            stage,
            position,
            total,
            item_index,
            source: source.into(),
        }
    }
}

impl Display for ItemCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[{} {}/{} 文本段#{} 来源 {}]",
            self.stage, self.position, self.total, self.item_index, self.source
        )
    }
}
