//! In-memory [`ArticleStore`] for tests, demos, and embedding hosts.
//!
//! Records live behind a `std::sync::RwLock`; a host can swap the whole set
//! with [`InMemoryArticleStore::replace`] and the next snapshot sees it.

use std::sync::{PoisonError, RwLock};

use anyhow::Result;

use crate::models::ArticleRecord;
use crate::seed::seed_records;

use super::ArticleStore;

pub struct InMemoryArticleStore {
    records: RwLock<Vec<ArticleRecord>>,
}

impl InMemoryArticleStore {
    pub fn new(records: Vec<ArticleRecord>) -> Self {
        Self {
            records: RwLock::new(records),
        }
    }

    /// A store pre-populated with the built-in seed articles.
    pub fn seeded() -> Self {
        Self::new(seed_records())
    }

    /// Replace every record at once.
    pub fn replace(&self, records: Vec<ArticleRecord>) {
        let mut guard = self.records.write().unwrap_or_else(PoisonError::into_inner);
        *guard = records;
    }

    pub fn len(&self) -> usize {
        self.records
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for InMemoryArticleStore {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl ArticleStore for InMemoryArticleStore {
    fn snapshot(&self) -> Result<Vec<ArticleRecord>> {
        Ok(self
            .records
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone())
    }
}
