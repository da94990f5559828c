//! # kb-chat
//!
//! A conversational front end for a team knowledge base.
//!
//! Users ask questions in plain language; the engine fuzzy-matches them
//! against article titles, tags, descriptions, and categories, ranks the
//! articles by a weighted sum of those signals, classifies the question into
//! an operational intent, and proposes follow-up questions.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐   ┌───────────────┐   ┌──────────────────────┐
//! │ ArticleStore │──▶│ KnowledgeBase │──▶│ Engine               │
//! │ memory/file  │   │  (validated)  │   │ rank+intent+suggest  │
//! └──────────────┘   └───────────────┘   └──────────┬───────────┘
//!                                                   │
//!                                      ┌────────────┴──────┐
//!                                      ▼                   ▼
//!                                ┌───────────┐      ┌────────────┐
//!                                │ChatSession│      │ CLI kbchat │
//!                                │ + history │      │ ask / chat │
//!                                └───────────┘      └────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! kbchat ask "How do I respond to a P1 incident?"
//! kbchat ask "grafana dashbaord" --explain
//! kbchat --config ./config/kbchat.toml chat
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing and validation |
//! | [`models`] | Articles, scored results, conversation turns |
//! | [`text`] | Normalization and tokenization |
//! | [`fuzzy`] | String similarity ratio |
//! | [`rank`] | Multi-field weighted ranking |
//! | [`intent`] | Keyword intent classification |
//! | [`suggest`] | Follow-up suggestions |
//! | [`chat`] | Turn handling and session history |
//! | [`store`] | Article store trait and adapters |
//! | [`seed`] | Built-in SRE articles |

pub mod chat;
pub mod config;
pub mod fuzzy;
pub mod intent;
pub mod models;
pub mod rank;
pub mod seed;
pub mod store;
pub mod suggest;
pub mod text;

pub use chat::{ChatSession, Engine};
pub use intent::Intent;
pub use models::{Article, ConversationTurn, ScoredArticle, TurnKind};
pub use store::{ArticleStore, KnowledgeBase};
