use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

fn kb_binary() -> PathBuf {
    let mut path = std::env::current_exe().unwrap();
    path.pop(); // remove test binary name
    path.pop(); // remove deps/
    path.push("kb");
    path
}

fn setup_test_env(backend: &str) -> (TempDir, PathBuf) {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().to_path_buf();

    let config_dir = root.join("config");
    fs::create_dir_all(&config_dir).unwrap();

    let db_file = if backend == "json" { "kb.json" } else { "kb.sqlite" };
    let config_content = format!(
        r#"[db]
backend = "{}"
path = "{}/data/{}"

[ai]
base_url = "http://127.0.0.1:9/v1"
api_key_env = "TECH_KB_TEST_UNSET_KEY"
timeout_secs = 2

[server]
bind = "127.0.0.1:0"
"#,
        backend,
        root.display(),
        db_file
    );

    let config_path = config_dir.join("kb.toml");
    fs::write(&config_path, config_content).unwrap();

    (tmp, config_path)
}

fn run_kb(config_path: &Path, args: &[&str]) -> (String, String, bool) {
    let binary = kb_binary();
    let output = Command::new(&binary)
        .arg("--config")
        .arg(config_path.to_str().unwrap())
        .args(args)
        .output()
        .unwrap_or_else(|e| panic!("Failed to run kb binary at {:?}: {}", binary, e));

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let success = output.status.success();
    (stdout, stderr, success)
}

const SAMPLE_JSON: &str = r#"[
  {"id": 1, "name": "Postgres", "summary": "Relational database", "categories": ["Database"],
   "useCases": ["OLTP"], "relevantLinks": ["https://postgresql.org"], "imageUrl": ""},
  {"id": 2, "name": "React", "summary": "UI library", "categories": ["Frontend"]},
  {"id": 3, "name": "Redis", "summary": "In-memory store", "categories": ["Database", "Cache"]}
]"#;

fn write_sample(tmp: &TempDir) -> PathBuf {
    let path = tmp.path().join("technologies.json");
    fs::write(&path, SAMPLE_JSON).unwrap();
    path
}

#[test]
fn test_help_lists_every_command() {
    let output = Command::new(kb_binary()).arg("--help").output().unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    for cmd in ["init", "import", "serve", "list", "add", "search", "delete", "categories"] {
        assert!(stdout.contains(cmd), "missing {} in help: {}", cmd, stdout);
    }
}

#[test]
fn test_init_creates_database() {
    let (_tmp, config_path) = setup_test_env("sqlite");

    let (stdout, stderr, success) = run_kb(&config_path, &["init"]);
    assert!(success, "init failed: stdout={}, stderr={}", stdout, stderr);
    assert!(stdout.contains("initialized"));
}

#[test]
fn test_init_idempotent() {
    let (_tmp, config_path) = setup_test_env("sqlite");

    let (_, _, success1) = run_kb(&config_path, &["init"]);
    assert!(success1, "First init failed");

    let (_, _, success2) = run_kb(&config_path, &["init"]);
    assert!(success2, "Second init failed (not idempotent)");
}

#[test]
fn test_list_empty() {
    let (_tmp, config_path) = setup_test_env("sqlite");
    run_kb(&config_path, &["init"]);

    let (stdout, stderr, success) = run_kb(&config_path, &["list"]);
    assert!(success, "list failed: {}", stderr);
    assert!(stdout.contains("technologies: 0"));
}

#[test]
fn test_list_without_init_reports_generic_error() {
    let (_tmp, config_path) = setup_test_env("sqlite");

    let (_, stderr, success) = run_kb(&config_path, &["list"]);
    assert!(!success);
    assert!(stderr.contains("Error: Failed to read technologies."));
    assert!(!stderr.contains("Error: no such table"));
}

#[test]
fn test_import_then_list_and_filter() {
    let (tmp, config_path) = setup_test_env("sqlite");
    let json = write_sample(&tmp);

    let (stdout, stderr, success) = run_kb(&config_path, &["import", json.to_str().unwrap()]);
    assert!(success, "import failed: {}", stderr);
    assert!(stdout.contains("imported technologies: 3"));

    let (stdout, _, success) = run_kb(&config_path, &["list"]);
    assert!(success);
    assert!(stdout.contains("technologies: 3"));
    let redis = stdout.find("Redis").unwrap();
    let postgres = stdout.find("Postgres").unwrap();
    assert!(redis < postgres, "newest record should be listed first");

    let (stdout, _, success) = run_kb(&config_path, &["list", "--category", "Database"]);
    assert!(success);
    assert!(stdout.contains("technologies: 2"));
    assert!(!stdout.contains("React"));
}

#[test]
fn test_list_json_output_round_trips_arrays() {
    let (tmp, config_path) = setup_test_env("sqlite");
    let json = write_sample(&tmp);
    run_kb(&config_path, &["import", json.to_str().unwrap()]);

    let (stdout, _, success) = run_kb(&config_path, &["list", "--json"]);
    assert!(success);
    let records: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    let postgres = &records[2];
    assert_eq!(postgres["name"], "Postgres");
    assert_eq!(postgres["useCases"], serde_json::json!(["OLTP"]));
    assert_eq!(postgres["relevantLinks"], serde_json::json!(["https://postgresql.org"]));
    assert_eq!(records[1]["useCases"], serde_json::json!([]));
}

#[test]
fn test_categories() {
    let (tmp, config_path) = setup_test_env("sqlite");
    let json = write_sample(&tmp);
    run_kb(&config_path, &["import", json.to_str().unwrap()]);

    let (stdout, _, success) = run_kb(&config_path, &["categories"]);
    assert!(success);
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines, vec!["Database", "Cache", "Frontend"]);
}

#[test]
fn test_delete_present_and_missing() {
    let (tmp, config_path) = setup_test_env("sqlite");
    let json = write_sample(&tmp);
    run_kb(&config_path, &["import", json.to_str().unwrap()]);

    let (stdout, stderr, success) = run_kb(&config_path, &["delete", "1"]);
    assert!(success, "delete failed: {}", stderr);
    assert!(stdout.contains("deleted: 1"));

    let (_, stderr, success) = run_kb(&config_path, &["delete", "1"]);
    assert!(!success);
    assert!(stderr.contains("not found"));

    let (stdout, _, _) = run_kb(&config_path, &["list"]);
    assert!(stdout.contains("technologies: 2"));
}

#[test]
fn test_delete_rejects_bad_id() {
    let (_tmp, config_path) = setup_test_env("sqlite");
    run_kb(&config_path, &["init"]);

    let (_, stderr, success) = run_kb(&config_path, &["delete", "abc"]);
    assert!(!success);
    assert!(stderr.contains("positive integer"));
}

#[test]
fn test_add_short_input_fails_validation() {
    let (_tmp, config_path) = setup_test_env("sqlite");
    run_kb(&config_path, &["init"]);

    let (_, stderr, success) = run_kb(&config_path, &["add", "ab"]);
    assert!(!success);
    assert!(stderr.contains("at least 3 characters"));
}

#[test]
fn test_add_with_unreachable_ai_fails_without_storing() {
    let (_tmp, config_path) = setup_test_env("sqlite");
    run_kb(&config_path, &["init"]);

    let (_, stderr, success) = run_kb(&config_path, &["add", "LangChain"]);
    assert!(!success);
    assert!(stderr.contains("AI summarization failed"));

    let (stdout, _, _) = run_kb(&config_path, &["list"]);
    assert!(stdout.contains("technologies: 0"));
}

#[test]
fn test_search_empty_store_needs_no_ai() {
    let (_tmp, config_path) = setup_test_env("sqlite");
    run_kb(&config_path, &["init"]);

    let (stdout, stderr, success) = run_kb(&config_path, &["search", "caching"]);
    assert!(success, "search failed: {}", stderr);
    assert!(stdout.contains("relevant: "));
}

#[test]
fn test_json_backend_init_and_list() {
    let (tmp, config_path) = setup_test_env("json");

    let (_, stderr, success) = run_kb(&config_path, &["init"]);
    assert!(success, "init failed: {}", stderr);
    let raw = fs::read_to_string(tmp.path().join("data").join("kb.json")).unwrap();
    assert_eq!(raw, "[]");

    let (stdout, _, success) = run_kb(&config_path, &["list"]);
    assert!(success);
    assert!(stdout.contains("technologies: 0"));
}
