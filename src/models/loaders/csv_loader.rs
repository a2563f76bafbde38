use std::path::Path;

use super::{file_name_of, kind_of, normalize_text, DocumentLoader, LoaderKind};
use crate::error::LoadError;
use crate::models::document::SourceDocument;

/// CSV 加载器
///
/// 每行转成 `列名: 值` 的多行文本，行与行之间空一行
pub struct CsvLoader;

impl DocumentLoader for CsvLoader {
    fn name(&self) -> &'static str {
        "CsvLoader"
    }

    fn can_handle(&self, extension: &str) -> bool {
        kind_of(extension) == Some(LoaderKind::Csv)
    }

    fn load(&self, path: &Path) -> Result<SourceDocument, LoadError> {
        let malformed = |err: csv::Error| LoadError::Malformed {
            path: path.display().to_string(),
            message: err.to_string(),
        };

        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_path(path)
            .map_err(|err| match err.into_kind() {
                csv::ErrorKind::Io(source) => LoadError::Io {
                    path: path.display().to_string(),
                    source,
                },
                other => LoadError::Malformed {
                    path: path.display().to_string(),
                    message: format!("{:?}", other),
                },
            })?;

        let headers = reader.headers().map_err(malformed)?.clone();

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record.map_err(malformed)?;
            let lines: Vec<String> = record
                .iter()
                .enumerate()
                .map(|(i, value)| match headers.get(i) {
                    Some(header) => format!("{}: {}", header.trim(), value.trim()),
                    None => value.trim().to_string(),
                })
                .collect();
            rows.push(lines.join("\n"));
        }

        Ok(SourceDocument::new(
            file_name_of(path),
            normalize_text(&rows.join("\n\n")),
        ))
    }
}
