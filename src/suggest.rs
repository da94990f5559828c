//! Follow-up suggestions shown under each answer.

use crate::intent::Intent;
use crate::models::ScoredArticle;
use crate::text::normalize;

/// Curated follow-ups per intent, plus generic fallbacks.
#[derive(Debug, Clone)]
pub struct SuggestionTable {
    by_intent: Vec<(Intent, Vec<String>)>,
    generic: Vec<String>,
}

impl SuggestionTable {
    pub fn new(generic: Vec<String>) -> Self {
        Self {
            by_intent: Intent::ALL.iter().map(|i| (*i, Vec::new())).collect(),
            generic,
        }
    }

    pub fn with_suggestions<S: AsRef<str>>(mut self, intent: Intent, suggestions: &[S]) -> Self {
        let owned: Vec<String> = suggestions.iter().map(|s| s.as_ref().to_string()).collect();
        if let Some(entry) = self.by_intent.iter_mut().find(|(i, _)| *i == intent) {
            entry.1 = owned;
        }
        self
    }

    pub fn for_intent(&self, intent: Intent) -> &[String] {
        self.by_intent
            .iter()
            .find(|(i, _)| *i == intent)
            .map(|(_, s)| s.as_slice())
            .unwrap_or(&[])
    }

    pub fn generic(&self) -> &[String] {
        &self.generic
    }

    /// Build the follow-up list for a turn.
    ///
    /// A recognized intent yields its curated list. Without one, the titles
    /// of `top_results` serve as refinements, topped up from the generic
    /// list. Entries that merely restate `query` and duplicates are dropped;
    /// at most `limit` entries are returned.
    pub fn suggest(
        &self,
        query: &str,
        intent: Option<Intent>,
        top_results: &[ScoredArticle],
        limit: usize,
    ) -> Vec<String> {
        let curated = intent.map(|i| self.for_intent(i)).unwrap_or(&[]);
        let candidates: Vec<&str> = if curated.is_empty() {
            top_results
                .iter()
                .map(|r| r.article.title.as_str())
                .chain(self.generic.iter().map(String::as_str))
                .collect()
        } else {
            curated.iter().map(String::as_str).collect()
        };

        let query = normalize(query);
        let mut out: Vec<String> = Vec::new();
        for candidate in candidates {
            if out.len() >= limit {
                break;
            }
            let normalized = normalize(candidate);
            if normalized.is_empty() {
                continue;
            }
            if !query.is_empty() && normalized.contains(&query) {
                continue;
            }
            if out.iter().any(|s| normalize(s) == normalized) {
                continue;
            }
            out.push(candidate.to_string());
        }
        out
    }
}

impl Default for SuggestionTable {
    fn default() -> Self {
        Self::new(vec![
            "incident management".to_string(),
            "observability tools".to_string(),
            "infrastructure automation".to_string(),
            "reliability testing".to_string(),
        ])
        .with_suggestions(
            Intent::Incident,
            &[
                "postmortem template",
                "on-call escalation policy",
                "PagerDuty operations guide",
            ],
        )
        .with_suggestions(
            Intent::Monitoring,
            &["SLO/SLI definitions", "Grafana dashboards", "Dynatrace RUM setup"],
        )
        .with_suggestions(
            Intent::Deployment,
            &[
                "canary deployment strategy",
                "rollback procedures",
                "Harness pipeline guide",
            ],
        )
        .with_suggestions(
            Intent::Infrastructure,
            &[
                "Kubernetes troubleshooting",
                "Terraform IaC standards",
                "AWS reliability pillar",
            ],
        )
        .with_suggestions(
            Intent::Reliability,
            &[
                "chaos engineering playbook",
                "error budget policy",
                "Google SRE book",
            ],
        )
        .with_suggestions(
            Intent::BusinessContinuity,
            &[
                "disaster recovery plan",
                "RTO/RPO targets",
                "failover automation",
            ],
        )
        .with_suggestions(
            Intent::Postmortem,
            &[
                "blameless postmortem guide",
                "incident response runbook",
                "action item tracking",
            ],
        )
    }
}
