//! File-backed [`ArticleStore`].
//!
//! Reads the whole file on every snapshot, so edits show up on the next
//! turn. Two layouts are accepted, chosen by extension:
//!
//! - `.json`: an array of article records.
//! - `.toml`: an `[[articles]]` array of tables.
//!
//! Each element is read on its own. An element that does not fit the record
//! shape becomes an [`ArticleRecord::malformed`] placeholder and is skipped
//! at validation; the document as a whole must still parse.
//!
//! ```toml
//! [[articles]]
//! id = 1
//! title = "Incident Response Runbook"
//! category = "Incident Management"
//! description = "Step-by-step guide for P1/P2 incident response."
//! source_type = "internal"
//! tags = ["incident", "runbook", "P1"]
//! ```

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::Deserialize;

use crate::models::ArticleRecord;

use super::ArticleStore;

#[derive(Debug, Deserialize)]
struct TomlArticles {
    #[serde(default)]
    articles: Vec<toml::Value>,
}

/// On-disk layout of an article file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Json,
    Toml,
}

impl FileFormat {
    pub fn from_path(path: &Path) -> Result<Self> {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .as_deref()
        {
            Some("json") => Ok(FileFormat::Json),
            Some("toml") => Ok(FileFormat::Toml),
            _ => bail!(
                "Unsupported knowledge-base file: {}. Use a .json or .toml file.",
                path.display()
            ),
        }
    }
}

/// Parse article records from file contents.
///
/// Fails only when the document itself is unreadable. Elements with the
/// wrong shape come back as malformed records.
pub fn parse_records(content: &str, format: FileFormat) -> Result<Vec<ArticleRecord>> {
    match format {
        FileFormat::Json => {
            let elements: Vec<serde_json::Value> =
                serde_json::from_str(content).context("Failed to parse knowledge-base JSON")?;
            Ok(elements.into_iter().map(json_record).collect())
        }
        FileFormat::Toml => {
            let parsed: TomlArticles =
                toml::from_str(content).context("Failed to parse knowledge-base TOML")?;
            Ok(parsed.articles.into_iter().map(toml_record).collect())
        }
    }
}

fn json_record(value: serde_json::Value) -> ArticleRecord {
    let id = value.get("id").and_then(serde_json::Value::as_u64);
    serde_json::from_value(value).unwrap_or_else(|e| ArticleRecord::malformed(id, e.to_string()))
}

fn toml_record(value: toml::Value) -> ArticleRecord {
    let id = value
        .get("id")
        .and_then(toml::Value::as_integer)
        .and_then(|id| u64::try_from(id).ok());
    value
        .try_into()
        .unwrap_or_else(|e: toml::de::Error| ArticleRecord::malformed(id, e.to_string()))
}

pub struct FileArticleStore {
    path: PathBuf,
    format: FileFormat,
}

impl FileArticleStore {
    /// Fails only on an unsupported extension; the file is read lazily.
    pub fn new(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let format = FileFormat::from_path(&path)?;
        Ok(Self { path, format })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ArticleStore for FileArticleStore {
    fn snapshot(&self) -> Result<Vec<ArticleRecord>> {
        let content = std::fs::read_to_string(&self.path).with_context(|| {
            format!(
                "Failed to read knowledge-base file: {}",
                self.path.display()
            )
        })?;
        parse_records(&content, self.format)
    }
}
