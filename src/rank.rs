//! Multi-signal article ranking.
//!
//! Every article is scored field by field against the query, each field
//! signal is multiplied by its weight, and the weighted signals are summed.
//!
//! # Field signal
//!
//! For one field value (each tag is scored on its own and the best tag wins):
//!
//! 1. Blank field: `0.0`.
//! 2. The normalized field contains the whole normalized query: `1.0`.
//! 3. Otherwise `min(1, fuzzy + term_bonus × hits)`:
//!    - `fuzzy` is [`similarity`] of query and field, or `0.0` when it falls
//!      below `min_fuzzy_score`;
//!    - `hits` counts query terms found in the field, either as a substring
//!      (terms of three or more characters) or as a field token with
//!      `similarity ≥ term_similarity`.
//!
//! Articles whose total is `0.0` are left out. The rest are sorted by
//! descending score with a stable sort, so equal scores keep input order.

use std::sync::Arc;

use tracing::debug;

use crate::fuzzy::similarity;
use crate::models::{Article, Field, FieldSignals, ScoredArticle};
use crate::text::{normalize, query_terms, tokenize};

/// Shorter terms only count when they match a whole field token.
const MIN_SUBSTRING_TERM: usize = 3;

/// Multiplier applied to each field's signal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldWeights {
    pub title: f64,
    pub tags: f64,
    pub description: f64,
    pub category: f64,
}

impl FieldWeights {
    pub fn get(&self, field: Field) -> f64 {
        match field {
            Field::Title => self.title,
            Field::Tags => self.tags,
            Field::Description => self.description,
            Field::Category => self.category,
        }
    }
}

impl Default for FieldWeights {
    fn default() -> Self {
        Self {
            title: 2.0,
            tags: 1.8,
            description: 1.5,
            category: 1.2,
        }
    }
}

/// Ranking tuning parameters, decoupled from application config.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RankingParams {
    pub weights: FieldWeights,
    /// Whole-string similarity below this counts as no match.
    pub min_fuzzy_score: f64,
    /// Added per query term found in a field.
    pub term_bonus: f64,
    /// Minimum token similarity for a misspelled term to count as found.
    pub term_similarity: f64,
}

impl Default for RankingParams {
    fn default() -> Self {
        Self {
            weights: FieldWeights::default(),
            min_fuzzy_score: 0.6,
            term_bonus: 0.3,
            term_similarity: 0.8,
        }
    }
}

/// A query prepared once and scored against many fields.
#[derive(Debug, Clone)]
pub struct PreparedQuery {
    normalized: String,
    terms: Vec<String>,
}

impl PreparedQuery {
    pub fn new(query: &str) -> Self {
        Self {
            normalized: normalize(query),
            terms: query_terms(query),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.normalized.is_empty()
    }
}

/// Signal in `[0.0, 1.0]` for one field value.
pub fn field_signal(query: &PreparedQuery, value: &str, params: &RankingParams) -> f64 {
    let field = normalize(value);
    if field.is_empty() || query.is_empty() {
        return 0.0;
    }
    if field.contains(&query.normalized) {
        return 1.0;
    }

    let fuzzy = similarity(&query.normalized, &field);
    let fuzzy = if fuzzy >= params.min_fuzzy_score {
        fuzzy
    } else {
        0.0
    };

    let field_tokens = tokenize(&field);
    let hits = query
        .terms
        .iter()
        .filter(|term| {
            (term.chars().count() >= MIN_SUBSTRING_TERM && field.contains(term.as_str()))
                || field_tokens
                    .iter()
                    .any(|t| similarity(term, t) >= params.term_similarity)
        })
        .count();

    (fuzzy + params.term_bonus * hits as f64).min(1.0)
}

/// Score one article against a prepared query.
pub fn score_article(
    query: &PreparedQuery,
    article: &Arc<Article>,
    params: &RankingParams,
) -> ScoredArticle {
    let signals = FieldSignals {
        title: field_signal(query, &article.title, params),
        tags: article
            .tags
            .iter()
            .map(|tag| field_signal(query, tag, params))
            .fold(0.0, f64::max),
        description: field_signal(query, &article.description, params),
        category: field_signal(query, article.category.label(), params),
    };

    let mut score = 0.0;
    let mut matched_fields = Vec::new();
    for field in Field::ALL {
        let contribution = signals.get(field) * params.weights.get(field);
        if contribution > 0.0 {
            score += contribution;
            matched_fields.push(field);
        }
    }

    ScoredArticle {
        article: Arc::clone(article),
        score,
        matched_fields,
        signals,
    }
}

/// Rank `articles` against `query`, best first.
///
/// Pure: identical inputs always produce identical output. Articles with a
/// total score of zero are excluded; nothing is returned for a blank query.
pub fn rank(query: &str, articles: &[Arc<Article>], params: &RankingParams) -> Vec<ScoredArticle> {
    let prepared = PreparedQuery::new(query);
    if prepared.is_empty() {
        return Vec::new();
    }

    let mut results: Vec<ScoredArticle> = articles
        .iter()
        .map(|a| score_article(&prepared, a, params))
        .filter(|s| s.score > 0.0)
        .collect();

    // `sort_by` is stable: equal scores keep insertion order.
    results.sort_by(|a, b| b.score.total_cmp(&a.score));

    debug!(
        query,
        candidates = articles.len(),
        matched = results.len(),
        "ranked articles"
    );
    results
}
