//! # kb-chat CLI (`kbchat`)
//!
//! Ask the knowledge base questions from the terminal, one-shot or as an
//! interactive conversation.
//!
//! ## Usage
//!
//! ```bash
//! kbchat [--config ./config/kbchat.toml] [--verbose] <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `kbchat ask "<query>"` | Answer one question and print the ranked articles |
//! | `kbchat chat` | Interactive conversation over stdin |
//! | `kbchat intent "<query>"` | Print the intent a question is classified as |
//! | `kbchat articles` | List the validated knowledge base |
//!
//! Without `--config` the built-in defaults and seed articles are used.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use kb_chat::config::{self, Config};
use kb_chat::models::{ConversationTurn, SourceType};
use kb_chat::store::{self, ArticleStore, KnowledgeBase};
use kb_chat::{ChatSession, Engine, Intent};

/// kb-chat: ask your team's knowledge base in plain language.
#[derive(Parser)]
#[command(
    name = "kbchat",
    about = "kb-chat: ask your team's knowledge base in plain language",
    version,
    long_about = "kb-chat ranks knowledge-base articles against a free-form question using fuzzy \
    matching over titles, tags, descriptions, and categories, classifies the question into an \
    operational intent, and suggests follow-up questions."
)]
struct Cli {
    /// Path to configuration file (TOML).
    ///
    /// Optional. Ranking weights, chat limits, the article file, and intent
    /// overrides are read from it; built-in defaults apply otherwise.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log ranking and turn details to stderr. `RUST_LOG` takes precedence.
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand)]
enum Commands {
    /// Answer a single question.
    ///
    /// Prints the response message, the ranked articles, the detected intent,
    /// and follow-up suggestions.
    Ask {
        /// The question or topic.
        query: String,

        /// Print the turn as JSON instead of text.
        #[arg(long)]
        json: bool,

        /// Show the per-field signal breakdown for each result.
        #[arg(long)]
        explain: bool,
    },

    /// Start an interactive conversation.
    ///
    /// Reads one question per line. `/help` lists the commands, `/history`
    /// lists the session's turns, `/reset` clears them, `/quit` exits, and a
    /// bare number asks the matching suggestion from the previous answer.
    Chat,

    /// Print the intent a question is classified as.
    Intent {
        /// The question or topic.
        query: String,
    },

    /// List the articles in the knowledge base.
    ///
    /// Records that fail validation are reported, not listed.
    Articles,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let cfg = match &cli.config {
        Some(path) => config::load_config(path)?,
        None => Config::default(),
    };
    let engine = Arc::new(Engine::from_config(&cfg)?);
    let store = store::open(&cfg.knowledge_base)?;

    match cli.command {
        Commands::Ask {
            query,
            json,
            explain,
        } => {
            let mut session = ChatSession::new(engine, store);
            let turn = session.handle_turn(&query);
            if json {
                println!("{}", serde_json::to_string_pretty(&turn)?);
            } else {
                print_turn(&turn, explain);
            }
        }
        Commands::Chat => {
            run_chat(ChatSession::new(engine, store))?;
        }
        Commands::Intent { query } => {
            let intent = engine.intents.classify(&query);
            println!("{}", intent.map(Intent::as_str).unwrap_or("none"));
        }
        Commands::Articles => {
            list_articles(store.as_ref())?;
        }
    }

    Ok(())
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "kb_chat=debug,warn" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

fn print_turn(turn: &ConversationTurn, explain: bool) {
    println!("{}", turn.message);

    if !turn.results.is_empty() {
        println!();
    }
    for (i, result) in turn.results.iter().enumerate() {
        let article = &result.article;
        println!(
            "{}. [{:.2}] {} / {}",
            i + 1,
            result.score,
            article.category,
            article.title
        );
        println!("    source: {}", source_name(article.source_type));
        if let Some(ref url) = article.url {
            println!("    url: {}", url);
        }
        if !article.tags.is_empty() {
            println!("    tags: {}", article.tags.join(", "));
        }
        let matched: Vec<&str> = result.matched_fields.iter().map(|f| f.as_str()).collect();
        println!("    matched: {}", matched.join(", "));
        if explain {
            let s = &result.signals;
            println!(
                "    signals: title={:.2} tags={:.2} description={:.2} category={:.2}",
                s.title, s.tags, s.description, s.category
            );
        }
    }

    if let Some(intent) = turn.intent {
        println!();
        println!("intent: {}", intent);
    }
    if !turn.suggestions.is_empty() {
        println!();
        println!("You could also ask:");
        for (i, suggestion) in turn.suggestions.iter().enumerate() {
            println!("  {}) {}", i + 1, suggestion);
        }
    }
}

fn source_name(source: SourceType) -> &'static str {
    match source {
        SourceType::Internal => "internal",
        SourceType::External => "external",
    }
}

fn run_chat(mut session: ChatSession) -> Result<()> {
    println!("Ask about any topic in the knowledge base. /help for commands, /quit to leave.");

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        print!("> ");
        io::stdout().flush()?;

        let Some(line) = lines.next() else {
            println!();
            break;
        };
        let line = line?;
        let input = line.trim();

        match input {
            "/quit" | "/exit" => break,
            "/help" => {
                print_commands();
                continue;
            }
            "/reset" => {
                session.reset();
                println!("History cleared.");
                continue;
            }
            "/history" => {
                if session.history().is_empty() {
                    println!("No turns yet.");
                }
                for (i, turn) in session.history().turns().iter().enumerate() {
                    println!(
                        "{}. [{}] {:?} -> {} result(s)",
                        i + 1,
                        turn.timestamp.format("%H:%M:%S"),
                        turn.query,
                        turn.results.len()
                    );
                }
                continue;
            }
            _ => {}
        }

        // A bare number asks the corresponding suggestion from the last turn.
        let query = match input.parse::<usize>() {
            Ok(n) => match picked_suggestion(&session, n) {
                Some(suggestion) => {
                    println!("> {}", suggestion);
                    suggestion
                }
                None => {
                    println!("No suggestion {} to pick.", n);
                    continue;
                }
            },
            Err(_) => input.to_string(),
        };

        let turn = session.handle_turn(&query);
        print_turn(&turn, false);
        println!();
    }

    Ok(())
}

fn print_commands() {
    println!("Commands:");
    println!("  /history   list this session's questions");
    println!("  /reset     clear the session history");
    println!("  /quit      leave (also /exit)");
    println!("  <number>   ask that suggestion from the last answer");
    println!("Anything else is sent as a question.");
}

fn picked_suggestion(session: &ChatSession, n: usize) -> Option<String> {
    let turn = session.history().last()?;
    turn.suggestions.get(n.checked_sub(1)?).cloned()
}

fn list_articles(store: &dyn ArticleStore) -> Result<()> {
    let kb = KnowledgeBase::load(store)?;

    if kb.is_empty() {
        println!("No articles.");
    }
    for article in kb.articles() {
        println!(
            "{}. {} / {} ({})",
            article.id,
            article.category,
            article.title,
            source_name(article.source_type)
        );
    }
    for skipped in kb.skipped() {
        println!("skipped record #{}: {}", skipped.index, skipped.error);
    }

    println!();
    println!("articles: {}", kb.len());
    println!("skipped: {}", kb.skipped().len());
    Ok(())
}
