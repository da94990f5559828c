//! Conversation orchestration.
//!
//! An [`Engine`] bundles the immutable tuning data (ranking parameters,
//! intent and suggestion tables, result limits) and turns one query plus one
//! [`KnowledgeBase`] snapshot into a [`ConversationTurn`]. A [`ChatSession`]
//! pairs a shared engine with an article store and owns the session's
//! [`ConversationHistory`].
//!
//! # Turn flow
//!
//! 1. Blank query, greeting, or help request: answered directly, no ranking.
//! 2. Empty (or unavailable) knowledge base: reported, never an error.
//! 3. Otherwise classify the intent, rank the snapshot, keep the top
//!    `max_results`, derive suggestions, and describe what was found.
//!
//! Every turn is appended to the session history.

use std::sync::Arc;

use anyhow::Result;
use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::Config;
use crate::intent::{Intent, IntentTable};
use crate::models::{ConversationTurn, ScoredArticle, SourceType, TurnKind};
use crate::rank::{rank, RankingParams};
use crate::store::{ArticleStore, KnowledgeBase};
use crate::suggest::SuggestionTable;
use crate::text::phrase;

const GREETINGS: &[&str] = &[
    "hello",
    "hello there",
    "hi",
    "hi there",
    "hey",
    "hey there",
    "howdy",
    "good morning",
    "good afternoon",
    "good evening",
    "sup",
    "whats up",
    "what s up",
];

const HELP_REQUESTS: &[&str] = &[
    "help",
    "help me",
    "what can you do",
    "how does this work",
    "commands",
    "guide me",
];

const STARTER_QUESTIONS: &[&str] = &[
    "How do I respond to a P1 incident?",
    "Show me chaos engineering resources",
    "Where's the Dynatrace setup guide?",
    "What are our SLO standards?",
    "Kubernetes troubleshooting help",
];

const EXAMPLE_QUERIES: &[&str] = &[
    "incident runbook",
    "Grafana dashboard setup",
    "disaster recovery plan",
    "terraform standards",
    "on-call rotation policy",
];

/// Per-turn limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChatParams {
    pub max_results: usize,
    pub max_suggestions: usize,
}

impl Default for ChatParams {
    fn default() -> Self {
        Self {
            max_results: 5,
            max_suggestions: 3,
        }
    }
}

/// Immutable answering logic, shareable across sessions.
#[derive(Debug, Clone, Default)]
pub struct Engine {
    pub ranking: RankingParams,
    pub intents: IntentTable,
    pub suggestions: SuggestionTable,
    pub chat: ChatParams,
}

impl Engine {
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self {
            ranking: config.ranking.params(),
            intents: config.intent_table()?,
            suggestions: config.suggestion_table()?,
            chat: ChatParams {
                max_results: config.chat.max_results,
                max_suggestions: config.chat.max_suggestions,
            },
        })
    }

    /// Turns that need no knowledge base: blank queries, greetings, help.
    pub fn direct_reply(&self, query: &str) -> Option<ConversationTurn> {
        if query.trim().is_empty() {
            return Some(self.turn(
                query,
                TurnKind::EmptyQuery,
                None,
                "Please type a question or topic and I'll find the most relevant \
                 knowledge-base articles for you."
                    .to_string(),
                Vec::new(),
                self.capped(STARTER_QUESTIONS),
            ));
        }

        let spoken = phrase(query);
        if GREETINGS.contains(&spoken.as_str()) {
            return Some(self.turn(
                query,
                TurnKind::Greeting,
                None,
                "Hi! I'm the knowledge-base assistant. Ask me about any SRE topic and \
                 I'll point you to the right internal page or external resource."
                    .to_string(),
                Vec::new(),
                self.capped(STARTER_QUESTIONS),
            ));
        }
        if HELP_REQUESTS.contains(&spoken.as_str()) {
            return Some(self.turn(
                query,
                TurnKind::Help,
                None,
                "Describe what you need in plain language. I search article titles, \
                 tags, descriptions, and categories across internal pages and external \
                 resources."
                    .to_string(),
                Vec::new(),
                self.capped(EXAMPLE_QUERIES),
            ));
        }
        None
    }

    /// Answer one query against a snapshot.
    pub fn answer(&self, query: &str, kb: &KnowledgeBase) -> ConversationTurn {
        if let Some(turn) = self.direct_reply(query) {
            return turn;
        }

        let intent = self.intents.classify(query);
        if kb.is_empty() {
            return self.turn(
                query,
                TurnKind::EmptyKnowledgeBase,
                intent,
                "The knowledge base is empty, so there is nothing to search yet.".to_string(),
                Vec::new(),
                self.capped(&["Add articles to the knowledge base"]),
            );
        }

        let mut results = rank(query, kb.articles(), &self.ranking);
        results.truncate(self.chat.max_results);

        let suggestions =
            self.suggestions
                .suggest(query, intent, &results, self.chat.max_suggestions);
        let shown = query.trim();
        let (kind, message) = if results.is_empty() {
            (
                TurnKind::NoMatches,
                format!(
                    "I couldn't find articles matching \"{}\". Try different keywords or \
                     pick one of the suggestions below.",
                    shown
                ),
            )
        } else {
            (
                TurnKind::Answer,
                format!(
                    "Found {} relevant {} for \"{}\".",
                    results.len(),
                    source_label(&results),
                    shown
                ),
            )
        };

        self.turn(query, kind, intent, message, results, suggestions)
    }

    /// Turn reported when the store could not produce a snapshot.
    pub fn unavailable(&self, query: &str) -> ConversationTurn {
        self.turn(
            query,
            TurnKind::KnowledgeBaseUnavailable,
            self.intents.classify(query),
            "The knowledge base is unavailable right now, so I couldn't search it."
                .to_string(),
            Vec::new(),
            self.capped(&["Try again in a moment"]),
        )
    }

    fn capped(&self, suggestions: &[&str]) -> Vec<String> {
        suggestions
            .iter()
            .take(self.chat.max_suggestions)
            .map(|s| s.to_string())
            .collect()
    }

    fn turn(
        &self,
        query: &str,
        kind: TurnKind,
        intent: Option<Intent>,
        message: String,
        results: Vec<ScoredArticle>,
        suggestions: Vec<String>,
    ) -> ConversationTurn {
        ConversationTurn {
            id: Uuid::new_v4(),
            query: query.to_string(),
            kind,
            intent,
            message,
            results,
            suggestions,
            timestamp: Utc::now(),
        }
    }
}

/// Describe where the results come from.
fn source_label(results: &[ScoredArticle]) -> &'static str {
    let internal = results
        .iter()
        .any(|r| r.article.source_type == SourceType::Internal);
    let external = results
        .iter()
        .any(|r| r.article.source_type == SourceType::External);
    let single = results.len() == 1;
    match (internal, external) {
        (true, true) => "internal pages and external resources",
        (true, false) if single => "internal page",
        (true, false) => "internal pages",
        (false, _) if single => "external resource",
        (false, _) => "external resources",
    }
}

/// Turns of one session, oldest first. Append-only apart from [`clear`](Self::clear).
#[derive(Debug, Clone, Default)]
pub struct ConversationHistory {
    turns: Vec<ConversationTurn>,
}

impl ConversationHistory {
    pub fn turns(&self) -> &[ConversationTurn] {
        &self.turns
    }

    pub fn last(&self) -> Option<&ConversationTurn> {
        self.turns.last()
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    fn push(&mut self, turn: ConversationTurn) {
        self.turns.push(turn);
    }

    fn clear(&mut self) {
        self.turns.clear();
    }
}

/// One user's conversation with the knowledge base.
///
/// Sessions never share history. The engine and store are shared through
/// `Arc`; the store is only read.
pub struct ChatSession {
    id: Uuid,
    engine: Arc<Engine>,
    store: Arc<dyn ArticleStore>,
    history: ConversationHistory,
}

impl ChatSession {
    pub fn new(engine: Arc<Engine>, store: Arc<dyn ArticleStore>) -> Self {
        Self {
            id: Uuid::new_v4(),
            engine,
            store,
            history: ConversationHistory::default(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    pub fn history(&self) -> &ConversationHistory {
        &self.history
    }

    /// Answer a query and record it. Never fails: store errors become a
    /// [`TurnKind::KnowledgeBaseUnavailable`] turn.
    pub fn handle_turn(&mut self, query: &str) -> ConversationTurn {
        let turn = match self.engine.direct_reply(query) {
            Some(turn) => turn,
            None => match KnowledgeBase::load(self.store.as_ref()) {
                Ok(kb) => self.engine.answer(query, &kb),
                Err(e) => {
                    warn!(
                        session = %self.id,
                        error = %format!("{:#}", e),
                        "knowledge base unavailable"
                    );
                    self.engine.unavailable(query)
                }
            },
        };

        info!(
            session = %self.id,
            kind = ?turn.kind,
            intent = turn.intent.map(Intent::as_str).unwrap_or("none"),
            results = turn.results.len(),
            "handled turn"
        );
        self.history.push(turn.clone());
        turn
    }

    /// Forget every turn of this session.
    pub fn reset(&mut self) {
        self.history.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Field;
    use crate::seed::seed_records;
    use crate::store::InMemoryArticleStore;

    struct BrokenStore;

    impl ArticleStore for BrokenStore {
        fn snapshot(&self) -> anyhow::Result<Vec<crate::models::ArticleRecord>> {
            anyhow::bail!("connection refused")
        }
    }

    fn seeded_session() -> ChatSession {
        ChatSession::new(
            Arc::new(Engine::default()),
            Arc::new(InMemoryArticleStore::seeded()),
        )
    }

    #[test]
    fn blank_queries_prompt_without_results() {
        let mut session = seeded_session();
        for q in ["", "   ", "\n\t"] {
            let turn = session.handle_turn(q);
            assert_eq!(turn.kind, TurnKind::EmptyQuery);
            assert_eq!(turn.intent, None);
            assert!(turn.results.is_empty());
            assert!(!turn.suggestions.is_empty());
        }
        assert_eq!(session.history().len(), 3);
    }

    #[test]
    fn greeting_and_help_are_answered_directly() {
        let engine = Engine::default();
        let kb = KnowledgeBase::default();
        assert_eq!(engine.answer("Hi there!", &kb).kind, TurnKind::Greeting);
        assert_eq!(engine.answer("What can you do?", &kb).kind, TurnKind::Help);
        // A greeting word inside a real question is not small talk.
        assert_ne!(
            engine.answer("hi, where is the runbook", &kb).kind,
            TurnKind::Greeting
        );
    }

    #[test]
    fn p1_question_finds_runbook_first() {
        let mut session = seeded_session();
        let turn = session.handle_turn("How do I respond to a P1 incident?");
        assert_eq!(turn.kind, TurnKind::Answer);
        assert_eq!(turn.intent, Some(Intent::Incident));
        let top = &turn.results[0];
        assert_eq!(top.article.title, "Incident Response Runbook");
        assert!(top.matched_fields.contains(&Field::Title));
        assert!(top.matched_fields.contains(&Field::Tags));
        assert_eq!(turn.suggestions.len(), 3);
    }

    #[test]
    fn unrelated_question_has_no_results() {
        let mut session = seeded_session();
        let turn = session.handle_turn("weather forecast");
        assert_eq!(turn.kind, TurnKind::NoMatches);
        assert_eq!(turn.intent, None);
        assert!(turn.results.is_empty());
        assert!(!turn.suggestions.is_empty());
    }

    #[test]
    fn results_are_capped() {
        let engine = Engine {
            chat: ChatParams {
                max_results: 2,
                max_suggestions: 3,
            },
            ..Engine::default()
        };
        let kb = KnowledgeBase::from_records(seed_records());
        let turn = engine.answer("incident", &kb);
        assert_eq!(turn.results.len(), 2);
        assert!(turn.results[0].score >= turn.results[1].score);
    }

    #[test]
    fn empty_knowledge_base_is_reported() {
        let mut session = ChatSession::new(
            Arc::new(Engine::default()),
            Arc::new(InMemoryArticleStore::default()),
        );
        let turn = session.handle_turn("kubernetes");
        assert_eq!(turn.kind, TurnKind::EmptyKnowledgeBase);
        assert!(turn.results.is_empty());
        assert_eq!(turn.suggestions, vec!["Add articles to the knowledge base"]);
    }

    #[test]
    fn store_failure_is_not_fatal() {
        let mut session = ChatSession::new(Arc::new(Engine::default()), Arc::new(BrokenStore));
        let turn = session.handle_turn("kubernetes");
        assert_eq!(turn.kind, TurnKind::KnowledgeBaseUnavailable);
        assert!(turn.results.is_empty());
        assert_eq!(session.history().len(), 1);
    }

    #[test]
    fn reset_clears_history() {
        let mut session = seeded_session();
        session.handle_turn("chaos");
        session.handle_turn("terraform");
        assert_eq!(session.history().len(), 2);
        assert_eq!(session.history().last().unwrap().query, "terraform");
        session.reset();
        assert!(session.history().is_empty());
    }

    #[test]
    fn sessions_do_not_share_history() {
        let engine = Arc::new(Engine::default());
        let store: Arc<dyn ArticleStore> = Arc::new(InMemoryArticleStore::seeded());
        let mut a = ChatSession::new(Arc::clone(&engine), Arc::clone(&store));
        let b = ChatSession::new(engine, store);
        a.handle_turn("chaos");
        assert_eq!(a.history().len(), 1);
        assert!(b.history().is_empty());
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn message_names_source_kinds() {
        let engine = Engine::default();
        let kb = KnowledgeBase::from_records(seed_records());
        let turn = engine.answer("prometheus", &kb);
        assert_eq!(turn.kind, TurnKind::Answer);
        assert!(turn.message.contains("external resource"), "{}", turn.message);
    }

    #[test]
    fn no_intent_with_results_suggests_titles() {
        let engine = Engine::default();
        let kb = KnowledgeBase::from_records(seed_records());
        let turn = engine.answer("best practices", &kb);
        assert_eq!(turn.intent, None);
        assert_eq!(turn.results[0].article.title, "Grafana Dashboard Best Practices");
        // The top title restates the query, so the next ones are offered.
        assert_eq!(
            turn.suggestions,
            vec![
                "Harness CI/CD Pipeline Guide",
                "Terraform IaC Standards",
                "PagerDuty Incident Ops Guide"
            ]
        );
    }

    #[test]
    fn lone_result_is_topped_up_with_generic_suggestions() {
        let engine = Engine::default();
        let kb = KnowledgeBase::from_records(seed_records());
        let turn = engine.answer("playbook", &kb);
        assert_eq!(turn.intent, None);
        assert_eq!(turn.results.len(), 1);
        assert_eq!(turn.results[0].article.title, "Chaos Engineering Playbook");
        assert_eq!(
            turn.suggestions,
            vec![
                "incident management",
                "observability tools",
                "infrastructure automation"
            ]
        );
    }
}
