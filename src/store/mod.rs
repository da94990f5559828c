//! Article store abstraction.
//!
//! The [`ArticleStore`] trait is the engine's only inbound boundary: it hands
//! over the current knowledge base as raw [`ArticleRecord`]s. The engine
//! validates them into a [`KnowledgeBase`] snapshot, which is immutable and
//! cheap to share.
//!
//! Implementations must be `Send + Sync` so one store can back many sessions.

pub mod file;
pub mod memory;

use std::collections::HashSet;
use std::sync::Arc;

use anyhow::Result;
use tracing::warn;

use crate::config::KnowledgeBaseConfig;
use crate::models::{Article, ArticleError, ArticleRecord};

pub use file::FileArticleStore;
pub use memory::InMemoryArticleStore;

/// Source of knowledge-base articles.
///
/// `snapshot` is synchronous and returns fully materialized records.
pub trait ArticleStore: Send + Sync {
    /// All articles, in insertion order.
    fn snapshot(&self) -> Result<Vec<ArticleRecord>>;
}

/// Open the configured store: the article file when a path is set, the
/// built-in seed set otherwise.
pub fn open(config: &KnowledgeBaseConfig) -> Result<Arc<dyn ArticleStore>> {
    match &config.path {
        Some(path) => Ok(Arc::new(FileArticleStore::new(path.clone())?)),
        None => Ok(Arc::new(InMemoryArticleStore::seeded())),
    }
}

/// A record that failed validation.
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedRecord {
    /// Position in the snapshot.
    pub index: usize,
    pub id: Option<u64>,
    pub error: ArticleError,
}

/// Validated, read-only set of articles.
#[derive(Debug, Clone, Default)]
pub struct KnowledgeBase {
    articles: Vec<Arc<Article>>,
    skipped: Vec<SkippedRecord>,
}

impl KnowledgeBase {
    /// Validate a snapshot.
    ///
    /// Malformed records and repeated ids are skipped with a warning so one
    /// bad row never hides the rest. Input order is preserved.
    pub fn from_records(records: Vec<ArticleRecord>) -> Self {
        let mut articles: Vec<Arc<Article>> = Vec::with_capacity(records.len());
        let mut skipped = Vec::new();
        let mut seen: HashSet<u64> = HashSet::new();

        for (index, record) in records.into_iter().enumerate() {
            let id = record.id;
            let result = Article::try_from(record).and_then(|a| {
                if seen.insert(a.id) {
                    Ok(a)
                } else {
                    Err(ArticleError::DuplicateId(a.id))
                }
            });
            match result {
                Ok(article) => articles.push(Arc::new(article)),
                Err(error) => {
                    warn!(index, ?id, %error, "skipping knowledge-base record");
                    skipped.push(SkippedRecord { index, id, error });
                }
            }
        }

        Self { articles, skipped }
    }

    /// Build directly from validated articles.
    pub fn from_articles(articles: Vec<Article>) -> Self {
        Self {
            articles: articles.into_iter().map(Arc::new).collect(),
            skipped: Vec::new(),
        }
    }

    /// Take and validate a snapshot from a store.
    pub fn load(store: &dyn ArticleStore) -> Result<Self> {
        Ok(Self::from_records(store.snapshot()?))
    }

    pub fn articles(&self) -> &[Arc<Article>] {
        &self.articles
    }

    pub fn skipped(&self) -> &[SkippedRecord] {
        &self.skipped
    }

    pub fn len(&self) -> usize {
        self.articles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.articles.is_empty()
    }

    pub fn get(&self, id: u64) -> Option<&Arc<Article>> {
        self.articles.iter().find(|a| a.id == id)
    }
}
