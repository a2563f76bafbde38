//! 导出服务 - 业务能力层
//!
//! 把问答记录写成数据集 JSON 或 SFT 微调格式，只读记录，不修改

use std::path::Path;

use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use tracing::info;

use crate::error::ExportError;
use crate::models::QaRecord;

/// 生成时间的格式
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Serialize)]
struct DatasetDocument<'a> {
    qa_pairs: &'a [QaRecord],
    total_count: usize,
    generated_timestamp: &'a str,
}

#[derive(Serialize)]
struct SftEntry<'a> {
    messages: [SftMessage<'a>; 3],
}

#[derive(Serialize)]
struct SftMessage<'a> {
    role: &'static str,
    content: &'a str,
}

/// 当前本地时间，作为 `generated_timestamp`
pub fn generation_timestamp() -> String {
    chrono::Local::now().format(TIMESTAMP_FORMAT).to_string()
}

/// 数据集格式：`{qa_pairs, total_count, generated_timestamp}`，4 空格缩进
pub fn to_dataset_json(records: &[QaRecord], timestamp: &str) -> Result<String, ExportError> {
    let document = DatasetDocument {
        qa_pairs: records,
        total_count: records.len(),
        generated_timestamp: timestamp,
    };

    let mut buffer = Vec::new();
    let formatter = PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buffer, formatter);
    document.serialize(&mut serializer)?;

    // serde_json 只输出合法 UTF-8
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}

/// SFT 格式：每条记录一个 `{messages: [system, user, assistant]}`，2 空格缩进
pub fn to_sft_json(records: &[QaRecord], system_prompt: &str) -> Result<String, ExportError> {
    let entries: Vec<SftEntry<'_>> = records
        .iter()
        .map(|record| SftEntry {
            messages: [
                SftMessage {
                    role: "system",
                    content: system_prompt,
                },
                SftMessage {
                    role: "user",
                    content: record.question(),
                },
                SftMessage {
                    role: "assistant",
                    content: record.answer(),
                },
            ],
        })
        .collect();

    Ok(serde_json::to_string_pretty(&entries)?)
}

/// 写出数据集文件
pub async fn write_dataset(
    path: &Path,
    records: &[QaRecord],
    timestamp: &str,
) -> Result<(), ExportError> {
    let json = to_dataset_json(records, timestamp)?;
    write_file(path, json).await?;
    info!("💾 已导出 {} 条问答对: {}", records.len(), path.display());
    Ok(())
}

/// 写出 SFT 文件
pub async fn write_sft(
    path: &Path,
    records: &[QaRecord],
    system_prompt: &str,
) -> Result<(), ExportError> {
    let json = to_sft_json(records, system_prompt)?;
    write_file(path, json).await?;
    info!("💾 已导出 {} 条 SFT 样本: {}", records.len(), path.display());
    Ok(())
}

async fn write_file(path: &Path, content: String) -> Result<(), ExportError> {
    tokio::fs::write(path, content)
        .await
        .map_err(|source| ExportError::Write {
            path: path.display().to_string(),
            source,
        })
}
