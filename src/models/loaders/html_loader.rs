use std::path::Path;

use scraper::{Html, Node, Selector};

use super::{file_name_of, kind_of, normalize_text, read_bytes, DocumentLoader, LoaderKind};
use crate::error::LoadError;
use crate::models::document::SourceDocument;

/// HTML 加载器
///
/// 提取 `<body>` 中的可见文本，跳过 script / style
pub struct HtmlLoader;

const SKIPPED_ELEMENTS: [&str; 3] = ["script", "style", "noscript"];

impl DocumentLoader for HtmlLoader {
    fn name(&self) -> &'static str {
        "HtmlLoader"
    }

    fn can_handle(&self, extension: &str) -> bool {
        kind_of(extension) == Some(LoaderKind::Html)
    }

    fn load(&self, path: &Path) -> Result<SourceDocument, LoadError> {
        let bytes = read_bytes(path)?;
        let html = String::from_utf8_lossy(&bytes);
        let document = Html::parse_document(&html);

        let body_selector = Selector::parse("body").map_err(|err| LoadError::Malformed {
            path: path.display().to_string(),
            message: err.to_string(),
        })?;

        let root = document
            .select(&body_selector)
            .next()
            .unwrap_or_else(|| document.root_element());

        let mut lines = Vec::new();
        for node in root.descendants() {
            let Node::Text(text) = node.value() else {
                continue;
            };
            let skipped = node
                .parent()
                .and_then(|parent| parent.value().as_element().map(|el| el.name().to_string()))
                .is_some_and(|name| SKIPPED_ELEMENTS.contains(&name.as_str()));
            if skipped {
                continue;
            }
            let trimmed = text.trim();
            if !trimmed.is_empty() {
                lines.push(trimmed.to_string());
            }
        }

        Ok(SourceDocument::new(
            file_name_of(path),
            normalize_text(&lines.join("\n")),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extracts_body_text_without_scripts() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("page.html");
        std::fs::write(
            &path,
            "<html><head><title>T</title><style>p{}</style></head>\
             <body><h1>標題</h1><script>var x = 1;</script><p>第一段</p><p> 第二段 </p></body></html>",
        )
        .unwrap();

        let document = HtmlLoader.load(&path).unwrap();
        assert_eq!(document.text, "標題\n第一段\n第二段");
    }
}
