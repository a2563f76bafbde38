use std::panic;
use std::path::Path;

use super::{file_name_of, kind_of, normalize_text, DocumentLoader, LoaderKind};
use crate::error::LoadError;
use crate::models::document::SourceDocument;

/// PDF 加载器（基于 `pdf-extract`）
pub struct PdfLoader;

impl DocumentLoader for PdfLoader {
    fn name(&self) -> &'static str {
        "PdfLoader"
    }

    fn can_handle(&self, extension: &str) -> bool {
        kind_of(extension) == Some(LoaderKind::Pdf)
    }

    fn load(&self, path: &Path) -> Result<SourceDocument, LoadError> {
        if !path.exists() {
            return Err(LoadError::Io {
                path: path.display().to_string(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "文件不存在"),
            });
        }

        // pdf-extract 遇到不支持的编码或字体会直接 panic
        let text = panic::catch_unwind(|| pdf_extract::extract_text(path))
            .map_err(|_| LoadError::Malformed {
                path: path.display().to_string(),
                message: "PDF 解析器崩溃".to_string(),
            })?
            .map_err(|err| LoadError::Malformed {
                path: path.display().to_string(),
                message: err.to_string(),
            })?;

        Ok(SourceDocument::new(file_name_of(path), normalize_text(&text)))
    }
}
