//! 文档加载器
//!
//! 每种格式一个实现，通过 `LoaderRegistry` 按扩展名选择。
//! 核心流程只看到 `SourceDocument`，不关心原始格式。

mod csv_loader;
mod html_loader;
mod pdf_loader;
mod text_loader;

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use anyhow::{Context, Result};
use phf::phf_map;
use regex::Regex;
use tracing::debug;

use crate::error::LoadError;
use crate::models::document::SourceDocument;

pub use csv_loader::CsvLoader;
pub use html_loader::HtmlLoader;
pub use pdf_loader::PdfLoader;
pub use text_loader::TextLoader;

/// 内置加载器的种类
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoaderKind {
    Text,
    Csv,
    Html,
    Pdf,
}

/// 扩展名（小写、不含点）到加载器种类
static EXTENSION_KINDS: phf::Map<&'static str, LoaderKind> = phf_map! {
    "txt" => LoaderKind::Text,
    "text" => LoaderKind::Text,
    "md" => LoaderKind::Text,
    "markdown" => LoaderKind::Text,
    "csv" => LoaderKind::Csv,
    "html" => LoaderKind::Html,
    "htm" => LoaderKind::Html,
    "pdf" => LoaderKind::Pdf,
};

/// 查询扩展名对应的内置加载器种类
pub fn kind_of(extension: &str) -> Option<LoaderKind> {
    EXTENSION_KINDS
        .get(extension.trim_start_matches('.').to_lowercase().as_str())
        .copied()
}

/// 路径的扩展名是否有内置加载器
pub fn is_supported(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .and_then(kind_of)
        .is_some()
}

/// 展开输入路径
///
/// 文件原样保留（不支持的扩展名留给加载阶段报告）；
/// 文件夹只取第一层中有内置加载器的文件，按文件名排序
pub async fn expand_inputs(paths: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for path in paths {
        if !path.is_dir() {
            files.push(path.clone());
            continue;
        }

        let mut found = Vec::new();
        let mut entries = tokio::fs::read_dir(path)
            .await
            .with_context(|| format!("无法读取文件夹: {}", path.display()))?;
        while let Some(entry) = entries.next_entry().await? {
            let entry_path = entry.path();
            if entry_path.is_file() && is_supported(&entry_path) {
                found.push(entry_path);
            }
        }

        if found.is_empty() {
            tracing::warn!("在文件夹 {} 中没有找到可处理的文件", path.display());
        }
        found.sort();
        files.extend(found);
    }

    Ok(files)
}

/// 文档加载能力
pub trait DocumentLoader: Send + Sync {
    /// 加载器名称（用于日志）
    fn name(&self) -> &'static str;

    /// 是否能处理该扩展名（小写、不含点）
    fn can_handle(&self, extension: &str) -> bool;

    /// 读取文件并提取文本
    fn load(&self, path: &Path) -> Result<SourceDocument, LoadError>;
}

/// 加载器注册表
///
/// 按注册顺序查找第一个能处理该扩展名的加载器
pub struct LoaderRegistry {
    loaders: Vec<Box<dyn DocumentLoader>>,
}

impl LoaderRegistry {
    /// 空注册表
    pub fn empty() -> Self {
        Self {
            loaders: Vec::new(),
        }
    }

    /// 注册一个加载器
    pub fn register(&mut self, loader: impl DocumentLoader + 'static) -> &mut Self {
        self.loaders.push(Box::new(loader));
        self
    }

    /// 查找能处理该扩展名的加载器
    pub fn for_extension(&self, extension: &str) -> Option<&dyn DocumentLoader> {
        let extension = extension.trim_start_matches('.').to_lowercase();
        self.loaders
            .iter()
            .find(|loader| loader.can_handle(&extension))
            .map(|loader| loader.as_ref())
    }

    /// 加载单个文件
    ///
    /// 扩展名不受支持、读取失败或文本为空时返回 `LoadError`
    pub fn load(&self, path: &Path) -> Result<SourceDocument, LoadError> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or("")
            .to_lowercase();

        let loader =
            self.for_extension(&extension)
                .ok_or_else(|| LoadError::UnsupportedExtension {
                    path: path.display().to_string(),
                    extension: format!(".{}", extension),
                })?;

        debug!("使用 {} 加载: {}", loader.name(), path.display());

        let document = loader.load(path)?;
        if document.is_blank() {
            return Err(LoadError::Empty {
                path: path.display().to_string(),
            });
        }
        Ok(document)
    }
}

impl Default for LoaderRegistry {
    /// 包含所有内置加载器
    fn default() -> Self {
        let mut registry = Self::empty();
        registry
            .register(TextLoader)
            .register(CsvLoader)
            .register(HtmlLoader)
            .register(PdfLoader);
        registry
    }
}

// ========== 加载器共用的辅助函数 ==========

/// 取文件名（不含目录）
pub(crate) fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}

/// 统一换行、去掉空字符、把三个以上的连续换行压成段落分隔
pub(crate) fn normalize_text(text: &str) -> String {
    static BLANK_RUNS: OnceLock<Regex> = OnceLock::new();
    let blank_runs = BLANK_RUNS.get_or_init(|| Regex::new(r"\n[ \t]*(\n[ \t]*){2,}").unwrap());

    let text = text.replace("\r\n", "\n").replace(['\r', '\0'], "");
    blank_runs.replace_all(&text, "\n\n").trim().to_string()
}

pub(crate) fn read_bytes(path: &Path) -> Result<Vec<u8>, LoadError> {
    std::fs::read(path).map_err(|source| LoadError::Io {
        path: path.display().to_string(),
        source,
    })
}
