//! CLI Integration Tests
//!
//! Tests the command-line interface end-to-end against a temporary root.

use assert_cmd::Command;
use assert_fs::prelude::*;
use assert_fs::TempDir;
use predicates::prelude::*;

const WORKFLOW: &str = r#"{
  "name": "Demo",
  "active": false,
  "nodes": [
    {"id": "1", "name": "Webhook", "type": "n8n-nodes-base.webhook", "position": [0, 0]},
    {"id": "2", "name": "Set", "type": "n8n-nodes-base.set", "position": [200, 0]},
    {"id": "3", "name": "Slack", "type": "n8n-nodes-base.slack", "position": [400, 0]}
  ],
  "connections": {
    "Webhook": {"main": [[{"node": "Set", "type": "main", "index": 0}]]},
    "Set": {"main": [[{"node": "Slack", "type": "main", "index": 0}]]}
  }
}"#;

/// Get the binary to test, isolated from user configuration.
fn flowdeck(temp: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("flowdeck").unwrap();
    cmd.current_dir(temp.path())
        .env("XDG_CONFIG_HOME", temp.path().join("config"))
        .env("FLOWDECK_AUTHOR", "tester")
        .env_remove("FLOWDECK_ROOT")
        .env_remove("SUPABASE_URL")
        .env_remove("SUPABASE_ANON_KEY")
        .arg("--root")
        .arg(temp.path().join("root"));
    cmd
}

fn workflow_file(temp: &TempDir) -> std::path::PathBuf {
    let file = temp.child("workflow.json");
    file.write_str(WORKFLOW).unwrap();
    file.path().to_path_buf()
}

// ============================================================================
// Help & Version Tests
// ============================================================================

#[test]
fn test_help_flag() {
    Command::cargo_bin("flowdeck")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Workflow project records"));
}

#[test]
fn test_version_flag() {
    Command::cargo_bin("flowdeck")
        .unwrap()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

// ============================================================================
// Create / Update Tests
// ============================================================================

#[test]
fn test_create_writes_record_export_and_readme() {
    let temp = TempDir::new().unwrap();
    let payload = workflow_file(&temp);

    flowdeck(&temp)
        .args(["create", "demo"])
        .arg(&payload)
        .assert()
        .success()
        .stdout(predicate::str::contains("Created project 'demo'"))
        .stdout(predicate::str::contains("3 nodes, 2 connections"));

    let root = temp.child("root");
    root.child("projects/demo.json").assert(predicate::str::contains("\"status\": \"draft\""));
    root.child("projects/demo.json").assert(predicate::str::contains("\"author\": \"tester\""));
    root.child("projects/demo.md").assert(predicate::str::contains("## Version History"));
    root.child("workflows/demo.json").assert(predicate::path::exists());
}

#[test]
fn test_create_twice_requires_force() {
    let temp = TempDir::new().unwrap();

    flowdeck(&temp).args(["create", "demo"]).assert().success();
    flowdeck(&temp)
        .args(["create", "demo"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
    flowdeck(&temp).args(["create", "demo", "--force"]).assert().success();
}

#[test]
fn test_create_rejects_path_like_name() {
    let temp = TempDir::new().unwrap();

    flowdeck(&temp).args(["create", "../escape"]).assert().failure();
    temp.child("escape.json").assert(predicate::path::missing());
}

#[test]
fn test_update_missing_project_fails() {
    let temp = TempDir::new().unwrap();
    let payload = workflow_file(&temp);

    flowdeck(&temp)
        .args(["update", "ghost"])
        .arg(&payload)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Not found"));
}

#[test]
fn test_update_bumps_version_and_history() {
    let temp = TempDir::new().unwrap();
    let payload = workflow_file(&temp);

    flowdeck(&temp).args(["create", "demo"]).assert().success();
    flowdeck(&temp)
        .args(["update", "demo"])
        .arg(&payload)
        .assert()
        .success()
        .stdout(predicate::str::contains("v1.0.1"));

    let root = temp.child("root");
    root.child("projects/demo.json").assert(predicate::str::contains("\"status\": \"synced\""));
    root.child("projects/demo.md").assert(predicate::str::contains("**v1.0.1**: Workflow updated"));
}

// ============================================================================
// Show / List Tests
// ============================================================================

#[test]
fn test_show_prints_record() {
    let temp = TempDir::new().unwrap();

    flowdeck(&temp).args(["create", "demo"]).assert().success();
    flowdeck(&temp)
        .args(["show", "demo"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"id\": \"proj_"));
}

#[test]
fn test_list_empty_root() {
    let temp = TempDir::new().unwrap();

    flowdeck(&temp)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("No projects found"));
}

#[test]
fn test_list_text_and_json() {
    let temp = TempDir::new().unwrap();
    let payload = workflow_file(&temp);

    flowdeck(&temp).args(["create", "demo"]).arg(&payload).assert().success();

    flowdeck(&temp)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("NAME"))
        .stdout(predicate::str::contains("Total: 1 projects"));

    flowdeck(&temp)
        .args(["list", "--format", "json"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("["))
        .stdout(predicate::str::contains("\"nodeCount\": 3"))
        .stdout(predicate::str::contains("\"githubSynced\": false"));
}

#[test]
fn test_list_malformed_strict_and_lenient() {
    let temp = TempDir::new().unwrap();

    flowdeck(&temp).args(["create", "demo"]).assert().success();
    temp.child("root/projects/broken.json").write_str("{ not json").unwrap();

    flowdeck(&temp).arg("list").assert().failure().stderr(predicate::str::contains("Malformed"));

    flowdeck(&temp)
        .args(["list", "--lenient"])
        .assert()
        .success()
        .stdout(predicate::str::contains("demo"))
        .stderr(predicate::str::contains("Skipped"));
}

// ============================================================================
// Export / Validate Tests
// ============================================================================

#[test]
fn test_export_yaml() {
    let temp = TempDir::new().unwrap();
    let payload = workflow_file(&temp);

    flowdeck(&temp).args(["create", "demo"]).arg(&payload).assert().success();
    flowdeck(&temp).args(["export", "demo", "yaml"]).assert().success();

    temp.child("root/workflows/demo.yaml").assert(predicate::str::contains("nodes:"));
}

#[test]
fn test_export_without_workflow_fails() {
    let temp = TempDir::new().unwrap();

    flowdeck(&temp).args(["create", "demo"]).assert().success();
    flowdeck(&temp)
        .args(["export", "demo"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("workflow data"));
}

#[test]
fn test_export_unsupported_format() {
    let temp = TempDir::new().unwrap();

    flowdeck(&temp)
        .args(["export", "demo", "xml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unsupported format"));
}

#[test]
fn test_validate_valid_workflow() {
    let temp = TempDir::new().unwrap();
    let payload = workflow_file(&temp);

    flowdeck(&temp)
        .arg("validate")
        .arg(&payload)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"valid\": true"));
}

#[test]
fn test_validate_reports_every_error() {
    let temp = TempDir::new().unwrap();
    let file = temp.child("bad.json");
    file.write_str(r#"{"nodes": [{"name": "x", "type": "t"}]}"#).unwrap();

    flowdeck(&temp)
        .arg("validate")
        .arg(file.path())
        .assert()
        .failure()
        .stdout(predicate::str::contains("Missing or invalid connections object"))
        .stdout(predicate::str::contains("Node 0 missing ID"))
        .stdout(predicate::str::contains("Node 0 missing or invalid position"));
}

// ============================================================================
// Publishing Tests
// ============================================================================

#[cfg(feature = "git")]
fn bare_remote(temp: &TempDir) -> (git2::Repository, String) {
    let path = temp.path().join("remote.git");
    let repo = git2::Repository::init_bare(&path).unwrap();
    (repo, path.to_string_lossy().into_owned())
}

#[cfg(feature = "git")]
#[test]
fn test_sync_with_workflow_pushes_and_marks_synced() {
    let temp = TempDir::new().unwrap();
    let payload = workflow_file(&temp);
    let (remote, remote_url) = bare_remote(&temp);

    flowdeck(&temp).args(["create", "demo"]).assert().success();
    flowdeck(&temp)
        .args(["sync", "demo", remote_url.as_str(), "--workflow"])
        .arg(&payload)
        .assert()
        .success()
        .stdout(predicate::str::contains("Committed"))
        .stdout(predicate::str::contains("Published 'demo' v1.0.1"));

    let pushed = remote.find_reference("refs/heads/main").unwrap().peel_to_commit().unwrap();
    assert!(pushed.message().unwrap().starts_with("feat: Update demo workflow"));
    let tree = pushed.tree().unwrap();
    assert!(tree.get_path(std::path::Path::new("workflows/demo.json")).is_ok());

    flowdeck(&temp)
        .args(["list", "--format", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"githubSynced\": true"))
        .stdout(predicate::str::contains("\"version\": \"1.0.1\""));
}

#[cfg(feature = "git")]
#[test]
fn test_sync_missing_project_fails() {
    let temp = TempDir::new().unwrap();
    let (_remote, remote_url) = bare_remote(&temp);

    flowdeck(&temp)
        .args(["sync", "ghost", remote_url.as_str()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Not found"));
}

#[cfg(feature = "git")]
#[test]
fn test_setup_remote_initializes_once() {
    let temp = TempDir::new().unwrap();
    let (_remote, remote_url) = bare_remote(&temp);

    flowdeck(&temp).args(["create", "demo"]).assert().success();
    flowdeck(&temp)
        .args(["setup-remote", remote_url.as_str()])
        .assert()
        .success()
        .stdout(predicate::str::contains("Initialized repository"))
        .stdout(predicate::str::contains("Wrote .gitignore"))
        .stdout(predicate::str::contains("Added"));

    let root = temp.child("root");
    root.child(".gitignore").assert(predicate::path::exists());
    let repo = git2::Repository::open(root.path()).unwrap();
    assert_eq!(repo.find_remote("origin").unwrap().url(), Some(remote_url.as_str()));
    assert!(repo.head().unwrap().peel_to_commit().is_ok());

    flowdeck(&temp)
        .args(["setup-remote", remote_url.as_str()])
        .assert()
        .success()
        .stdout(predicate::str::contains("Initialized").not())
        .stdout(predicate::str::contains("Unchanged"));
}

// ============================================================================
// Rules / Templates / Config Tests
// ============================================================================

#[test]
fn test_rules_written_once() {
    let temp = TempDir::new().unwrap();
    let dir = temp.path().join("rules");

    flowdeck(&temp)
        .arg("rules")
        .arg("--dir")
        .arg(&dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("Wrote"));
    flowdeck(&temp)
        .arg("rules")
        .arg("--dir")
        .arg(&dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("already exist"));
}

#[test]
fn test_templates_offline_discover() {
    let temp = TempDir::new().unwrap();

    flowdeck(&temp)
        .args(["templates", "--offline", "discover", "--search", "slack automation"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Slack Notification Workflow"))
        .stdout(predicate::str::contains("Total: 1 matches"));
}

#[test]
fn test_templates_offline_populate_inserts_once() {
    let temp = TempDir::new().unwrap();

    flowdeck(&temp)
        .args(["templates", "--offline", "populate"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Inserted 5 rows"))
        .stdout(predicate::str::contains("Total: 3 templates, 2 analyses"));
}

#[test]
fn test_templates_offline_stats() {
    let temp = TempDir::new().unwrap();

    flowdeck(&temp)
        .args(["templates", "--offline", "stats"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Complexity:"))
        .stdout(predicate::str::contains("slack: 3"));
}

#[test]
fn test_templates_without_configuration() {
    let temp = TempDir::new().unwrap();

    flowdeck(&temp)
        .args(["templates", "stats"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not configured"));
}

#[test]
fn test_config_reads_local_file() {
    let temp = TempDir::new().unwrap();
    temp.child(".flowdeck.toml").write_str("[git]\nbranch = \"trunk\"\n").unwrap();

    flowdeck(&temp)
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("branch = \"trunk\""));
}

// ============================================================================
// Completions Tests
// ============================================================================

#[test]
fn test_completions_bash() {
    let temp = TempDir::new().unwrap();

    flowdeck(&temp)
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("flowdeck"));
}
