//! Core data models used throughout the engine.
//!
//! [`ArticleRecord`] is what the persistence layer hands over; [`Article`] is
//! the validated, immutable form the ranker works with. [`ScoredArticle`] and
//! [`ConversationTurn`] are produced per query.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::intent::Intent;

/// Knowledge-base article category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    IncidentManagement,
    ReliabilityTesting,
    Observability,
    Deployment,
    Infrastructure,
    BusinessContinuity,
    ExternalResources,
}

impl Category {
    pub const ALL: [Category; 7] = [
        Category::IncidentManagement,
        Category::ReliabilityTesting,
        Category::Observability,
        Category::Deployment,
        Category::Infrastructure,
        Category::BusinessContinuity,
        Category::ExternalResources,
    ];

    /// Human-readable label; this is the text the ranker scores against.
    pub fn label(self) -> &'static str {
        match self {
            Category::IncidentManagement => "Incident Management",
            Category::ReliabilityTesting => "Reliability Testing",
            Category::Observability => "Observability",
            Category::Deployment => "Deployment",
            Category::Infrastructure => "Infrastructure",
            Category::BusinessContinuity => "Business Continuity",
            Category::ExternalResources => "External Resources",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Category {
    type Err = ArticleError;

    /// Accepts the label in any case, with spaces, `-` or `_` between words.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = crate::text::phrase(s);
        Category::ALL
            .into_iter()
            .find(|c| crate::text::phrase(c.label()) == wanted)
            .ok_or_else(|| ArticleError::UnknownCategory(s.to_string()))
    }
}

/// Where an article lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceType {
    /// Team-owned pages (the wiki).
    #[default]
    Internal,
    /// Public resources maintained elsewhere.
    External,
}

impl FromStr for SourceType {
    type Err = ArticleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match crate::text::normalize(s).as_str() {
            "internal" | "confluence" => Ok(SourceType::Internal),
            "external" => Ok(SourceType::External),
            _ => Err(ArticleError::UnknownSourceType(s.to_string())),
        }
    }
}

/// Tags as the persistence layer may store them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TagList {
    /// `"incident,runbook,P1"`
    Joined(String),
    List(Vec<String>),
}

impl TagList {
    fn into_tags(self) -> Vec<String> {
        let raw: Vec<String> = match self {
            TagList::Joined(s) => s.split(',').map(str::to_string).collect(),
            TagList::List(v) => v,
        };
        let mut tags: Vec<String> = Vec::new();
        for tag in raw {
            let tag = tag.trim();
            if tag.is_empty() {
                continue;
            }
            let key = crate::text::normalize(tag);
            if tags.iter().any(|t| crate::text::normalize(t) == key) {
                continue;
            }
            tags.push(tag.to_string());
        }
        tags
    }
}

/// Unvalidated article as supplied by an [`ArticleStore`](crate::store::ArticleStore).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ArticleRecord {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub source_type: Option<String>,
    #[serde(default)]
    pub tags: Option<TagList>,
    /// Set when the stored element did not have the record shape at all.
    #[serde(skip)]
    pub malformed: Option<String>,
}

impl ArticleRecord {
    /// Placeholder for a stored element that could not be read as a record.
    /// Validation rejects it with [`ArticleError::Malformed`].
    pub fn malformed(id: Option<u64>, reason: impl Into<String>) -> Self {
        Self {
            id,
            malformed: Some(reason.into()),
            ..Self::default()
        }
    }
}

/// Why a record could not become an [`Article`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ArticleError {
    #[error("missing required field `{0}`")]
    MissingField(&'static str),
    #[error("unknown category: {0:?}")]
    UnknownCategory(String),
    #[error("unknown source type: {0:?}")]
    UnknownSourceType(String),
    #[error("duplicate article id {0}")]
    DuplicateId(u64),
    #[error("malformed record: {0}")]
    Malformed(String),
}

/// A validated knowledge-base article. Never mutated by the engine.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Article {
    pub id: u64,
    pub title: String,
    pub description: String,
    pub category: Category,
    pub tags: Vec<String>,
    pub source_type: SourceType,
    pub url: Option<String>,
}

impl TryFrom<ArticleRecord> for Article {
    type Error = ArticleError;

    fn try_from(record: ArticleRecord) -> Result<Self, Self::Error> {
        if let Some(reason) = record.malformed {
            return Err(ArticleError::Malformed(reason));
        }
        let id = record.id.ok_or(ArticleError::MissingField("id"))?;
        let title = record
            .title
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .ok_or(ArticleError::MissingField("title"))?;
        let category = record
            .category
            .filter(|c| !c.trim().is_empty())
            .ok_or(ArticleError::MissingField("category"))?
            .parse()?;
        let source_type = match record.source_type {
            Some(s) if !s.trim().is_empty() => s.parse()?,
            _ => SourceType::default(),
        };

        Ok(Article {
            id,
            title,
            description: record.description.unwrap_or_default().trim().to_string(),
            category,
            tags: record.tags.map(TagList::into_tags).unwrap_or_default(),
            source_type,
            url: record.url.filter(|u| !u.trim().is_empty()),
        })
    }
}

/// An article field that the ranker scores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Field {
    Title,
    Tags,
    Description,
    Category,
}

impl Field {
    pub const ALL: [Field; 4] = [Field::Title, Field::Tags, Field::Description, Field::Category];

    pub fn as_str(self) -> &'static str {
        match self {
            Field::Title => "title",
            Field::Tags => "tags",
            Field::Description => "description",
            Field::Category => "category",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unweighted per-field signals in `[0.0, 1.0]`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct FieldSignals {
    pub title: f64,
    pub tags: f64,
    pub description: f64,
    pub category: f64,
}

impl FieldSignals {
    pub fn get(&self, field: Field) -> f64 {
        match field {
            Field::Title => self.title,
            Field::Tags => self.tags,
            Field::Description => self.description,
            Field::Category => self.category,
        }
    }
}

/// An article with its relevance to one query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredArticle {
    pub article: Arc<Article>,
    /// Weighted sum of the field signals; always positive in ranked output.
    pub score: f64,
    /// Fields whose weighted signal is non-zero, in [`Field::ALL`] order.
    pub matched_fields: Vec<Field>,
    pub signals: FieldSignals,
}

/// What kind of response a turn produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnKind {
    Answer,
    NoMatches,
    EmptyQuery,
    Greeting,
    Help,
    EmptyKnowledgeBase,
    KnowledgeBaseUnavailable,
}

/// One query and the engine's response to it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConversationTurn {
    pub id: Uuid,
    pub query: String,
    pub kind: TurnKind,
    /// `None` when no intent keyword matched.
    pub intent: Option<Intent>,
    pub message: String,
    /// Highest score first.
    pub results: Vec<ScoredArticle>,
    pub suggestions: Vec<String>,
    pub timestamp: DateTime<Utc>,
}
