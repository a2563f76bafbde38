use std::path::Path;

use super::{file_name_of, kind_of, normalize_text, read_bytes, DocumentLoader, LoaderKind};
use crate::error::LoadError;
use crate::models::document::SourceDocument;

/// 纯文本 / Markdown 加载器
///
/// 按 UTF-8 读取，非法字节以替换字符保留
pub struct TextLoader;

impl DocumentLoader for TextLoader {
    fn name(&self) -> &'static str {
        "TextLoader"
    }

    fn can_handle(&self, extension: &str) -> bool {
        kind_of(extension) == Some(LoaderKind::Text)
    }

    fn load(&self, path: &Path) -> Result<SourceDocument, LoadError> {
        let bytes = read_bytes(path)?;
        let text = String::from_utf8(bytes)
            .unwrap_or_else(|err| String::from_utf8_lossy(err.as_bytes()).into_owned());

        Ok(SourceDocument::new(file_name_of(path), normalize_text(&text)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_utf8_is_replaced() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.txt");
        std::fs::write(&path, [b'o', b'k', 0xFF, b'!']).unwrap();

        let document = TextLoader.load(&path).unwrap();
        assert_eq!(document.text, "ok\u{FFFD}!");
    }

    #[test]
    fn test_markdown_kept_verbatim() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("readme.md");
        std::fs::write(&path, "# 標題\n\n正文。").unwrap();

        let document = TextLoader.load(&path).unwrap();
        assert_eq!(document.text, "# 標題\n\n正文。");
        assert_eq!(document.filename, "readme.md");
    }
}
