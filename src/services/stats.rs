//! 运行统计
//!
//! 只读问答记录，计算数量、来源文本段数与问题类型分布

use std::collections::HashSet;
use std::fmt::Display;

use crate::models::QaRecord;

/// 判断"来源文本段"是否相同时比较的前缀长度
const SOURCE_KEY_CHARS: usize = 100;

/// 问题类型（按问题开头判断）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QuestionType {
    What,
    How,
    Why,
    OtherQuestion,
    Statement,
}

impl QuestionType {
    pub const ALL: [QuestionType; 5] = [
        QuestionType::What,
        QuestionType::How,
        QuestionType::Why,
        QuestionType::OtherQuestion,
        QuestionType::Statement,
    ];

    pub fn classify(question: &str) -> Self {
        let question = question.trim();
        if question.starts_with("什麼") {
            QuestionType::What
        } else if question.starts_with("如何") || question.starts_with("怎樣") {
            QuestionType::How
        } else if question.starts_with("為什麼") {
            QuestionType::Why
        } else if question.contains('？') {
            QuestionType::OtherQuestion
        } else {
            QuestionType::Statement
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            QuestionType::What => "什麼",
            QuestionType::How => "如何/怎樣",
            QuestionType::Why => "為什麼",
            QuestionType::OtherQuestion => "其他問句",
            QuestionType::Statement => "陳述式",
        }
    }
}

impl Display for QuestionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// 一次运行的结果统计
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunStats {
    pub total_records: usize,
    /// 不同来源文本段的数量
    pub unique_sources: usize,
    /// 平均每个来源文本段的问答对数
    pub average_per_source: f64,
    /// 只包含出现过的类型，顺序固定
    pub question_types: Vec<(QuestionType, usize)>,
}

impl RunStats {
    pub fn from_records(records: &[QaRecord]) -> Self {
        let unique_sources = records
            .iter()
            .map(|record| {
                record
                    .source_chunk()
                    .chars()
                    .take(SOURCE_KEY_CHARS)
                    .collect::<String>()
            })
            .collect::<HashSet<_>>()
            .len();

        let question_types = QuestionType::ALL
            .iter()
            .map(|&kind| {
                let count = records
                    .iter()
                    .filter(|record| QuestionType::classify(record.question()) == kind)
                    .count();
                (kind, count)
            })
            .filter(|&(_, count)| count > 0)
            .collect();

        let average_per_source = if unique_sources == 0 {
            0.0
        } else {
            records.len() as f64 / unique_sources as f64
        };

        Self {
            total_records: records.len(),
            unique_sources,
            average_per_source,
            question_types,
        }
    }
}
