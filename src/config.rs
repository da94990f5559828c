use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::intent::{Intent, IntentTable};
use crate::rank::{FieldWeights, RankingParams};
use crate::suggest::SuggestionTable;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub knowledge_base: KnowledgeBaseConfig,
    #[serde(default)]
    pub ranking: RankingConfig,
    #[serde(default)]
    pub chat: ChatConfig,
    /// Keyed by intent name (`incident`, `business-continuity`, ...).
    #[serde(default)]
    pub intents: BTreeMap<String, IntentConfig>,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct KnowledgeBaseConfig {
    /// `.json` or `.toml` article file. The built-in seed set when absent.
    #[serde(default)]
    pub path: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RankingConfig {
    #[serde(default)]
    pub weights: WeightsConfig,
    #[serde(default = "default_min_fuzzy_score")]
    pub min_fuzzy_score: f64,
    #[serde(default = "default_term_bonus")]
    pub term_bonus: f64,
    #[serde(default = "default_term_similarity")]
    pub term_similarity: f64,
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            weights: WeightsConfig::default(),
            min_fuzzy_score: default_min_fuzzy_score(),
            term_bonus: default_term_bonus(),
            term_similarity: default_term_similarity(),
        }
    }
}

fn default_min_fuzzy_score() -> f64 {
    0.6
}
fn default_term_bonus() -> f64 {
    0.3
}
fn default_term_similarity() -> f64 {
    0.8
}

#[derive(Debug, Deserialize, Clone)]
pub struct WeightsConfig {
    #[serde(default = "default_title_weight")]
    pub title: f64,
    #[serde(default = "default_tags_weight")]
    pub tags: f64,
    #[serde(default = "default_description_weight")]
    pub description: f64,
    #[serde(default = "default_category_weight")]
    pub category: f64,
}

impl Default for WeightsConfig {
    fn default() -> Self {
        Self {
            title: default_title_weight(),
            tags: default_tags_weight(),
            description: default_description_weight(),
            category: default_category_weight(),
        }
    }
}

fn default_title_weight() -> f64 {
    2.0
}
fn default_tags_weight() -> f64 {
    1.8
}
fn default_description_weight() -> f64 {
    1.5
}
fn default_category_weight() -> f64 {
    1.2
}

#[derive(Debug, Deserialize, Clone)]
pub struct ChatConfig {
    #[serde(default = "default_max_results")]
    pub max_results: usize,
    #[serde(default = "default_max_suggestions")]
    pub max_suggestions: usize,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            max_results: default_max_results(),
            max_suggestions: default_max_suggestions(),
        }
    }
}

fn default_max_results() -> usize {
    5
}
fn default_max_suggestions() -> usize {
    3
}

/// Per-intent overrides; a missing list keeps the built-in one.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct IntentConfig {
    #[serde(default)]
    pub keywords: Option<Vec<String>>,
    #[serde(default)]
    pub suggestions: Option<Vec<String>>,
}

impl RankingConfig {
    pub fn params(&self) -> RankingParams {
        RankingParams {
            weights: FieldWeights {
                title: self.weights.title,
                tags: self.weights.tags,
                description: self.weights.description,
                category: self.weights.category,
            },
            min_fuzzy_score: self.min_fuzzy_score,
            term_bonus: self.term_bonus,
            term_similarity: self.term_similarity,
        }
    }
}

impl Config {
    /// Per-intent overrides with their names resolved.
    pub fn intent_overrides(&self) -> Result<Vec<(Intent, &IntentConfig)>> {
        let mut overrides = Vec::with_capacity(self.intents.len());
        for (name, cfg) in &self.intents {
            let intent: Intent = name
                .parse()
                .with_context(|| format!("Invalid [intents.{}] section", name))?;
            overrides.push((intent, cfg));
        }
        Ok(overrides)
    }

    /// The built-in intent table with configured overrides applied.
    pub fn intent_table(&self) -> Result<IntentTable> {
        Ok(self
            .intent_overrides()?
            .into_iter()
            .fold(IntentTable::default(), |table, (intent, cfg)| {
                match &cfg.keywords {
                    Some(keywords) => table.with_keywords(intent, keywords.as_slice()),
                    None => table,
                }
            }))
    }

    /// The built-in suggestion table with configured overrides applied.
    pub fn suggestion_table(&self) -> Result<SuggestionTable> {
        Ok(self
            .intent_overrides()?
            .into_iter()
            .fold(SuggestionTable::default(), |table, (intent, cfg)| {
                match &cfg.suggestions {
                    Some(suggestions) => table.with_suggestions(intent, suggestions.as_slice()),
                    None => table,
                }
            }))
    }
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let mut config: Config =
        toml::from_str(&content).with_context(|| "Failed to parse config file")?;

    // Relative article paths are resolved against the config file's directory.
    if let Some(kb_path) = config.knowledge_base.path.take() {
        config.knowledge_base.path = Some(match path.parent() {
            Some(dir) if kb_path.is_relative() => dir.join(kb_path),
            _ => kb_path,
        });
    }

    validate(&config)?;
    Ok(config)
}

pub fn validate(config: &Config) -> Result<()> {
    let w = &config.ranking.weights;
    for (name, value) in [
        ("title", w.title),
        ("tags", w.tags),
        ("description", w.description),
        ("category", w.category),
    ] {
        if !value.is_finite() || value < 0.0 {
            bail!("ranking.weights.{} must be a finite number >= 0", name);
        }
    }

    for (name, value) in [
        ("min_fuzzy_score", config.ranking.min_fuzzy_score),
        ("term_bonus", config.ranking.term_bonus),
        ("term_similarity", config.ranking.term_similarity),
    ] {
        if !(0.0..=1.0).contains(&value) {
            bail!("ranking.{} must be in [0.0, 1.0]", name);
        }
    }

    if config.chat.max_results < 1 {
        bail!("chat.max_results must be >= 1");
    }
    if config.chat.max_suggestions < 1 {
        bail!("chat.max_suggestions must be >= 1");
    }

    config.intent_overrides()?;

    Ok(())
}
