//! Keyword-based intent classification.
//!
//! An [`IntentTable`] maps each [`Intent`] to trigger keywords. Classification
//! counts how many distinct keywords of each intent occur in the query and
//! picks the intent with the highest count; ties go to the intent declared
//! first in [`Intent::ALL`]. No keyword match means no intent.
//!
//! # Keyword syntax
//!
//! Keywords are tokenized the same way as queries, so `"on-call"` and
//! `"on call"` are the same keyword. A keyword matches when its tokens occur
//! consecutively in the query. A trailing `*` marks a stem: the last token
//! then matches any query token that starts with it (`"escalat*"` matches
//! "escalate" and "escalation").

use std::fmt;
use std::str::FromStr;

use anyhow::bail;
use serde::Serialize;

use crate::text::tokenize;

/// Operational domain a question is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Intent {
    Incident,
    Monitoring,
    Deployment,
    Infrastructure,
    Reliability,
    BusinessContinuity,
    Postmortem,
}

impl Intent {
    /// Every intent, in tie-break priority order.
    pub const ALL: [Intent; 7] = [
        Intent::Incident,
        Intent::Monitoring,
        Intent::Deployment,
        Intent::Infrastructure,
        Intent::Reliability,
        Intent::BusinessContinuity,
        Intent::Postmortem,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Intent::Incident => "incident",
            Intent::Monitoring => "monitoring",
            Intent::Deployment => "deployment",
            Intent::Infrastructure => "infrastructure",
            Intent::Reliability => "reliability",
            Intent::BusinessContinuity => "business-continuity",
            Intent::Postmortem => "postmortem",
        }
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Intent {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase().replace('_', "-");
        match Intent::ALL.into_iter().find(|i| i.as_str() == wanted) {
            Some(intent) => Ok(intent),
            None => bail!("Unknown intent: '{}'", s),
        }
    }
}

/// A compiled trigger keyword.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Keyword {
    source: String,
    tokens: Vec<String>,
    stem: bool,
}

impl Keyword {
    /// Compile a keyword; `None` if it contains no alphanumeric text.
    pub fn parse(source: &str) -> Option<Self> {
        let trimmed = source.trim();
        let (body, stem) = match trimmed.strip_suffix('*') {
            Some(body) => (body, true),
            None => (trimmed, false),
        };
        let tokens = tokenize(body);
        if tokens.is_empty() {
            return None;
        }
        Some(Self {
            source: trimmed.to_string(),
            tokens,
            stem,
        })
    }

    /// The keyword as written.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Whether the keyword occurs in an already tokenized query.
    pub fn matches(&self, query_tokens: &[String]) -> bool {
        let n = self.tokens.len();
        if n > query_tokens.len() {
            return false;
        }
        query_tokens.windows(n).any(|window| {
            window.iter().zip(&self.tokens).enumerate().all(|(k, (q, kw))| {
                if self.stem && k + 1 == n {
                    q.starts_with(kw.as_str())
                } else {
                    q == kw
                }
            })
        })
    }
}

/// Trigger keywords per intent. Built once, then only read.
#[derive(Debug, Clone)]
pub struct IntentTable {
    entries: Vec<(Intent, Vec<Keyword>)>,
}

impl IntentTable {
    /// A table with no keywords; classifies everything as `None`.
    pub fn empty() -> Self {
        Self {
            entries: Intent::ALL.iter().map(|i| (*i, Vec::new())).collect(),
        }
    }

    /// Replace the keywords of one intent. Uncompilable keywords are dropped.
    pub fn with_keywords<S: AsRef<str>>(mut self, intent: Intent, keywords: &[S]) -> Self {
        let compiled: Vec<Keyword> = keywords
            .iter()
            .filter_map(|k| Keyword::parse(k.as_ref()))
            .collect();
        if let Some(entry) = self.entries.iter_mut().find(|(i, _)| *i == intent) {
            entry.1 = compiled;
        }
        self
    }

    pub fn keywords(&self, intent: Intent) -> &[Keyword] {
        self.entries
            .iter()
            .find(|(i, _)| *i == intent)
            .map(|(_, k)| k.as_slice())
            .unwrap_or(&[])
    }

    /// Number of distinct keywords of `intent` found in the query.
    pub fn hits(&self, intent: Intent, query: &str) -> usize {
        let tokens = tokenize(query);
        self.count(intent, &tokens)
    }

    fn count(&self, intent: Intent, tokens: &[String]) -> usize {
        self.keywords(intent)
            .iter()
            .filter(|k| k.matches(tokens))
            .count()
    }

    /// Classify a query. Pure: the same query always yields the same intent.
    pub fn classify(&self, query: &str) -> Option<Intent> {
        let tokens = tokenize(query);
        if tokens.is_empty() {
            return None;
        }

        let mut best: Option<(Intent, usize)> = None;
        for (intent, _) in &self.entries {
            let hits = self.count(*intent, &tokens);
            if hits == 0 {
                continue;
            }
            // Strictly greater: earlier intents win ties.
            if best.map_or(true, |(_, n)| hits > n) {
                best = Some((*intent, hits));
            }
        }
        best.map(|(intent, _)| intent)
    }
}

impl Default for IntentTable {
    fn default() -> Self {
        Self::empty()
            .with_keywords(
                Intent::Incident,
                &[
                    "incident*", "outage*", "p1", "p2", "sev1", "sev2", "alert*", "page",
                    "paged", "paging", "pager*", "escalat*", "on-call", "oncall", "respond*",
                    "triage*",
                ],
            )
            .with_keywords(
                Intent::Monitoring,
                &[
                    "monitor*", "observ*", "metric*", "dashboard*", "grafana", "dynatrace",
                    "prometheus", "alert*", "slo", "slos", "sli", "slis", "sla", "error budget",
                    "apm", "rum", "synthetic*", "trace*", "tracing", "log", "logs", "logging",
                ],
            )
            .with_keywords(
                Intent::Deployment,
                &[
                    "deploy*", "pipeline*", "ci/cd", "cicd", "harness", "canary", "rollback*",
                    "roll back", "release*", "build*", "artifact*", "helm", "docker*",
                ],
            )
            .with_keywords(
                Intent::Infrastructure,
                &[
                    "kubernetes", "k8s", "terraform", "pod", "pods", "container*", "node",
                    "nodes", "cluster*", "aws", "cloud", "iac", "infra*", "scaling",
                    "autoscal*", "load balanc*",
                ],
            )
            .with_keywords(
                Intent::Reliability,
                &[
                    "chaos", "fault*", "resilien*", "redundan*", "availability", "sre",
                    "toil", "reliab*",
                ],
            )
            .with_keywords(
                Intent::BusinessContinuity,
                &[
                    "dr", "disaster*", "recovery", "recover", "failover*", "fail over",
                    "rto", "rpo", "backup*", "business continuity", "continuity",
                ],
            )
            .with_keywords(
                Intent::Postmortem,
                &[
                    "postmortem*", "post-mortem*", "rca", "root cause", "blameless",
                    "retrospect*", "lessons learned", "action item*",
                ],
            )
    }
}
