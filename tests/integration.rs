use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tempfile::TempDir;

fn kbchat_binary() -> PathBuf {
    let mut path = std::env::current_exe().unwrap();
    path.pop(); // remove test binary name
    path.pop(); // remove deps/
    path.push("kbchat");
    path
}

fn setup_test_env() -> (TempDir, PathBuf) {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().to_path_buf();

    let config_dir = root.join("config");
    fs::create_dir_all(&config_dir).unwrap();

    fs::write(
        config_dir.join("articles.json"),
        r#"[
  {
    "id": 1,
    "title": "Incident Response Runbook",
    "category": "Incident Management",
    "description": "Steps for P1 handling",
    "source_type": "internal",
    "url": "https://wiki.example/runbook",
    "tags": ["incident", "P1"]
  },
  {
    "id": 2,
    "title": "Prometheus Monitoring Guide",
    "category": "External Resources",
    "description": "Metrics collection and alerting.",
    "source_type": "external",
    "tags": "prometheus,metrics"
  },
  {
    "id": 3,
    "category": "Deployment",
    "description": "A record without a title"
  }
]"#,
    )
    .unwrap();

    // The article path is relative to the config file.
    let config_content = r#"[knowledge_base]
path = "articles.json"

[chat]
max_results = 5
max_suggestions = 2
"#;

    let config_path = config_dir.join("kbchat.toml");
    fs::write(&config_path, config_content).unwrap();

    (tmp, config_path)
}

fn run_kbchat(config_path: Option<&Path>, args: &[&str]) -> (String, String, bool) {
    let binary = kbchat_binary();
    let mut cmd = Command::new(&binary);
    if let Some(path) = config_path {
        cmd.arg("--config").arg(path.to_str().unwrap());
    }
    let output = cmd
        .args(args)
        .output()
        .unwrap_or_else(|e| panic!("Failed to run kbchat binary at {:?}: {}", binary, e));

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let success = output.status.success();
    (stdout, stderr, success)
}

fn run_chat(config_path: Option<&Path>, input: &str) -> (String, bool) {
    let binary = kbchat_binary();
    let mut cmd = Command::new(&binary);
    if let Some(path) = config_path {
        cmd.arg("--config").arg(path.to_str().unwrap());
    }
    let mut child = cmd
        .arg("chat")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .unwrap_or_else(|e| panic!("Failed to run kbchat binary at {:?}: {}", binary, e));

    child
        .stdin
        .take()
        .unwrap()
        .write_all(input.as_bytes())
        .unwrap();
    let output = child.wait_with_output().unwrap();
    (
        String::from_utf8_lossy(&output.stdout).to_string(),
        output.status.success(),
    )
}

#[test]
fn test_ask_with_seed_articles() {
    let (stdout, stderr, success) =
        run_kbchat(None, &["ask", "How do I respond to a P1 incident?"]);
    assert!(success, "ask failed: stdout={}, stderr={}", stdout, stderr);

    let first = stdout
        .lines()
        .find(|l| l.starts_with("1. ["))
        .expect("no ranked results printed");
    assert!(first.contains("Incident Response Runbook"), "{}", first);
    assert!(stdout.contains("intent: incident"));
    assert!(stdout.contains("You could also ask:"));
}

#[test]
fn test_ask_json_output() {
    let (stdout, stderr, success) =
        run_kbchat(None, &["ask", "How do I respond to a P1 incident?", "--json"]);
    assert!(success, "ask failed: stdout={}, stderr={}", stdout, stderr);

    let turn: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(turn["kind"], "answer");
    assert_eq!(turn["intent"], "incident");
    assert_eq!(
        turn["results"][0]["article"]["title"],
        "Incident Response Runbook"
    );
    let matched = turn["results"][0]["matched_fields"].as_array().unwrap();
    assert!(matched.contains(&serde_json::json!("title")));
    assert!(matched.contains(&serde_json::json!("tags")));
}

#[test]
fn test_ask_unrelated_has_no_results() {
    let (stdout, _, success) = run_kbchat(None, &["ask", "weather forecast", "--json"]);
    assert!(success);

    let turn: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(turn["kind"], "no_matches");
    assert!(turn["intent"].is_null());
    assert!(turn["results"].as_array().unwrap().is_empty());
    assert!(!turn["suggestions"].as_array().unwrap().is_empty());
}

#[test]
fn test_ask_blank_query() {
    let (stdout, _, success) = run_kbchat(None, &["ask", "   ", "--json"]);
    assert!(success);

    let turn: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(turn["kind"], "empty_query");
    assert!(turn["results"].as_array().unwrap().is_empty());
}

#[test]
fn test_ask_explain_shows_signals() {
    let (stdout, _, success) = run_kbchat(None, &["ask", "chaos", "--explain"]);
    assert!(success);
    assert!(stdout.contains("Chaos Engineering Playbook"));
    assert!(stdout.contains("signals: title=1.00"));
}

#[test]
fn test_ask_uses_configured_article_file() {
    let (_tmp, config_path) = setup_test_env();

    let (stdout, stderr, success) = run_kbchat(Some(config_path.as_path()), &["ask", "prometheus"]);
    assert!(success, "ask failed: stdout={}, stderr={}", stdout, stderr);
    assert!(stdout.contains("Prometheus Monitoring Guide"));
    assert!(stdout.contains("external resource"));
    assert!(!stdout.contains("2. ["));
}

#[test]
fn test_suggestions_capped_by_config() {
    let (_tmp, config_path) = setup_test_env();

    let (stdout, _, success) =
        run_kbchat(Some(config_path.as_path()), &["ask", "p1 incident", "--json"]);
    assert!(success);
    let turn: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(turn["suggestions"].as_array().unwrap().len(), 2);
}

#[test]
fn test_articles_reports_skipped_records() {
    let (_tmp, config_path) = setup_test_env();

    let (stdout, stderr, success) = run_kbchat(Some(config_path.as_path()), &["articles"]);
    assert!(success, "articles failed: stdout={}, stderr={}", stdout, stderr);
    assert!(stdout.contains("Incident Response Runbook"));
    assert!(stdout.contains("articles: 2"));
    assert!(stdout.contains("skipped: 1"));
    assert!(stdout.contains("missing required field `title`"));
}

#[test]
fn test_articles_seed_set() {
    let (stdout, _, success) = run_kbchat(None, &["articles"]);
    assert!(success);
    assert!(stdout.contains("articles: 15"));
    assert!(stdout.contains("skipped: 0"));
}

#[test]
fn test_intent_command() {
    let (stdout, _, success) = run_kbchat(None, &["intent", "our canary deploy failed"]);
    assert!(success);
    assert_eq!(stdout.trim(), "deployment");

    let (stdout, _, success) = run_kbchat(None, &["intent", "weather forecast"]);
    assert!(success);
    assert_eq!(stdout.trim(), "none");
}

#[test]
fn test_missing_article_file_is_reported_not_fatal() {
    let tmp = TempDir::new().unwrap();
    let config_path = tmp.path().join("kbchat.toml");
    fs::write(&config_path, "[knowledge_base]\npath = \"gone.json\"\n").unwrap();

    let (stdout, stderr, success) =
        run_kbchat(Some(config_path.as_path()), &["ask", "runbook", "--json"]);
    assert!(success, "ask failed: stdout={}, stderr={}", stdout, stderr);
    let turn: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(turn["kind"], "knowledge_base_unavailable");
}

#[test]
fn test_invalid_config_fails() {
    let tmp = TempDir::new().unwrap();
    let config_path = tmp.path().join("kbchat.toml");
    fs::write(&config_path, "[ranking]\nmin_fuzzy_score = 2.0\n").unwrap();

    let (_, stderr, success) = run_kbchat(Some(config_path.as_path()), &["ask", "runbook"]);
    assert!(!success);
    assert!(stderr.contains("min_fuzzy_score"), "stderr: {}", stderr);
}

#[test]
fn test_missing_config_fails() {
    let config_path = Path::new("/nonexistent/kbchat.toml");
    let (_, stderr, success) = run_kbchat(Some(config_path), &["articles"]);
    assert!(!success);
    assert!(stderr.contains("Failed to read config file"));
}

#[test]
fn test_chat_session_flow() {
    let (stdout, success) = run_chat(
        None,
        "How do I respond to a P1 incident?\n1\n/history\n/reset\n/history\n/quit\n",
    );
    assert!(success);
    assert!(stdout.contains("Incident Response Runbook"));
    // Picking suggestion 1 of the incident answer.
    assert!(stdout.contains("> postmortem template"));
    assert!(stdout.contains("2. ["));
    assert!(stdout.contains("History cleared."));
    assert!(stdout.contains("No turns yet."));
}

#[test]
fn test_chat_help_lists_commands() {
    let (stdout, success) = run_chat(None, "/help\n/quit\n");
    assert!(success);
    assert!(stdout.contains("/history"), "stdout: {}", stdout);
    assert!(stdout.contains("/reset"));
    assert!(stdout.contains("/quit"));
    assert!(stdout.contains("number"));
    // Handled by the REPL, not sent to the engine as a help question.
    assert!(!stdout.contains("Describe what you need"));
    assert!(!stdout.contains("You could also ask:"));
}

#[test]
fn test_chat_greeting_and_eof() {
    let (stdout, success) = run_chat(None, "hello\n9\n");
    assert!(success);
    assert!(stdout.contains("knowledge-base assistant"));
    assert!(stdout.contains("No suggestion 9 to pick."));
}
