use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::fs;
use std::path::Path;
use tempfile::{tempdir, TempDir};

struct Sandbox {
    dir: TempDir,
}

impl Sandbox {
    fn new() -> Self {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("config.toml"), "").unwrap();
        Self { dir }
    }

    fn data_dir(&self) -> &Path {
        self.dir.path()
    }

    /// `dashboard` scoped to this sandbox's data dir and config, signed in as `u1`.
    fn dashboard(&self) -> Command {
        let mut cmd = self.anonymous();
        cmd.args(["--user", "u1"]);
        cmd
    }

    fn anonymous(&self) -> Command {
        let mut cmd = Command::cargo_bin("dashboard").unwrap();
        cmd.env_remove("DASHBOARD_USER")
            .env_remove("DASHBOARD_DEBUG_LOG")
            .env_remove("RUST_LOG")
            .env_remove("GEMINI_API_KEY")
            .env_remove("APP_SEARCH_API_KEY")
            .args([
                "--data-dir",
                self.dir.path().to_str().unwrap(),
                "--config",
                self.dir.path().join("config.toml").to_str().unwrap(),
            ]);
        cmd
    }
}

fn run_json(cmd: &mut Command) -> Value {
    let output = cmd.assert().success().get_output().stdout.clone();
    parse_json_output(&String::from_utf8_lossy(&output))
}

fn parse_json_output(output: &str) -> Value {
    serde_json::from_str(output.trim()).expect("Failed to parse JSON output")
}

fn add_task(sandbox: &Sandbox, content: &str, days: &str) -> String {
    let json = run_json(sandbox.dashboard().args([
        "board", "add", "--content", content, "--days", days,
    ]));
    json["data"]["id"].as_str().unwrap().to_string()
}

fn column_task_ids(board: &Value, column: usize) -> Vec<String> {
    board["data"]["columns"][column]["tasks"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["id"].as_str().unwrap().to_string())
        .collect()
}

mod board_tests {
    use super::*;

    #[test]
    fn test_add_then_show() {
        let sandbox = Sandbox::new();
        let id = add_task(&sandbox, "Buy milk", "1");
        assert!(id.starts_with("task-"));

        let board = run_json(sandbox.dashboard().args(["board", "show"]));
        assert!(board["success"].as_bool().unwrap());
        assert_eq!(board["data"]["user_id"], "u1");
        assert_eq!(column_task_ids(&board, 0), vec![id]);
        assert_eq!(board["data"]["columns"][0]["tasks"][0]["content"], "Buy milk");
        assert!(column_task_ids(&board, 1).is_empty());
        assert!(column_task_ids(&board, 2).is_empty());

        let stored = sandbox.data_dir().join("boards").join("u1.json");
        assert!(stored.exists());
    }

    #[test]
    fn test_move_into_progress_shows_countdown() {
        let sandbox = Sandbox::new();
        let id = add_task(&sandbox, "Report", "2");

        let board = run_json(sandbox.dashboard().args([
            "board", "move", "--id", &id, "--from", "todo", "--to", "inProgress",
        ]));

        assert_eq!(column_task_ids(&board, 1), vec![id]);
        let remaining = board["data"]["columns"][1]["tasks"][0]["remaining"]
            .as_str()
            .unwrap();
        assert!(remaining.starts_with("1 days 23 hours"), "{remaining}");
        assert!(remaining.ends_with("left"));
        assert_eq!(board["data"]["active_timers"], 1);
    }

    #[test]
    fn test_advance_and_toggle() {
        let sandbox = Sandbox::new();
        let id = add_task(&sandbox, "Walk", "1");

        let json = run_json(sandbox.dashboard().args(["board", "advance", "--id", &id]));
        assert_eq!(json["data"]["column"], "inProgress");

        let json = run_json(sandbox.dashboard().args(["board", "toggle", "--id", &id]));
        assert_eq!(json["data"]["column"], "done");

        let json = run_json(sandbox.dashboard().args(["board", "advance", "--id", &id]));
        assert_eq!(json["data"]["moved"], false);
        assert_eq!(json["data"]["column"], "done");

        let json = run_json(sandbox.dashboard().args(["board", "toggle", "--id", &id]));
        assert_eq!(json["data"]["column"], "todo");
    }

    #[test]
    fn test_delete_with_yes() {
        let sandbox = Sandbox::new();
        let id = add_task(&sandbox, "Temporary", "1");

        let json = run_json(sandbox.dashboard().args(["board", "delete", "--id", &id, "--yes"]));
        assert_eq!(json["data"]["deleted"], true);

        let board = run_json(sandbox.dashboard().args(["board", "show"]));
        assert!(column_task_ids(&board, 0).is_empty());
    }

    #[test]
    fn test_declined_delete_keeps_task() {
        let sandbox = Sandbox::new();
        let id = add_task(&sandbox, "Keep", "1");

        let json = run_json(
            sandbox
                .dashboard()
                .args(["board", "delete", "--id", &id])
                .write_stdin("n\n"),
        );
        assert_eq!(json["data"]["deleted"], false);

        let board = run_json(sandbox.dashboard().args(["board", "show"]));
        assert_eq!(column_task_ids(&board, 0), vec![id]);
    }

    #[test]
    fn test_days_out_of_range_fails() {
        let sandbox = Sandbox::new();
        sandbox
            .dashboard()
            .args(["board", "add", "--content", "x", "--days", "31"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("between 1 and 30"));
    }

    #[test]
    fn test_unknown_task_fails() {
        let sandbox = Sandbox::new();
        sandbox
            .dashboard()
            .args(["board", "advance", "--id", "task-404"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Task not found"));
    }

    #[test]
    fn test_requires_user() {
        let sandbox = Sandbox::new();
        sandbox
            .anonymous()
            .args(["board", "show"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Not signed in"));
    }

    #[test]
    fn test_repairs_malformed_board_file() {
        let sandbox = Sandbox::new();
        let boards = sandbox.data_dir().join("boards");
        fs::create_dir_all(&boards).unwrap();
        fs::write(
            boards.join("u1.json"),
            r#"{"userId":"u1","columns":{"todo":{"id":"todo","title":"To Do","tasks":[{"id":"t1","content":"old"}]}}}"#,
        )
        .unwrap();

        let board = run_json(sandbox.dashboard().args(["board", "show"]));
        assert_eq!(column_task_ids(&board, 0), vec!["t1".to_string()]);
        assert!(column_task_ids(&board, 1).is_empty());
        assert!(column_task_ids(&board, 2).is_empty());
    }
}

mod note_tests {
    use super::*;

    #[test]
    fn test_note_lifecycle() {
        let sandbox = Sandbox::new();
        let json = run_json(sandbox.dashboard().args([
            "note",
            "add",
            "--content",
            "docs at https://example.com/guide",
            "--category",
            "link",
        ]));
        let id = json["data"]["id"].as_str().unwrap().to_string();

        let list = run_json(sandbox.dashboard().args(["note", "list"]));
        assert_eq!(list["data"]["count"], 1);
        assert_eq!(list["data"]["items"][0]["links"][0], "https://example.com/guide");

        run_json(sandbox.dashboard().args([
            "note", "edit", "--id", &id, "--content", "moved",
        ]));
        let list = run_json(sandbox.dashboard().args(["note", "list", "--category", "link"]));
        assert_eq!(list["data"]["items"][0]["content"], "moved");

        let json = run_json(sandbox.dashboard().args(["note", "delete", "--id", &id, "-y"]));
        assert_eq!(json["data"]["deleted"], true);
        let list = run_json(sandbox.dashboard().args(["note", "list"]));
        assert_eq!(list["data"]["count"], 0);
    }

    #[test]
    fn test_blank_note_fails() {
        let sandbox = Sandbox::new();
        sandbox
            .dashboard()
            .args(["note", "add", "--content", "   "])
            .assert()
            .failure()
            .stderr(predicate::str::contains("must not be empty"));
    }
}

mod keyword_tests {
    use super::*;

    #[test]
    fn test_keyword_list_sorted_with_trends() {
        let sandbox = Sandbox::new();
        for (text, category) in [("zombie", "Mods"), ("Aqua", "World")] {
            run_json(sandbox.dashboard().args([
                "keyword", "add", "--text", text, "--category", category,
            ]));
        }

        let list = run_json(sandbox.dashboard().args(["keyword", "list", "--sort", "alphabetical"]));
        assert_eq!(list["data"]["items"][0]["text"], "Aqua");
        assert_eq!(list["data"]["items"][1]["text"], "zombie");
        assert!(list["data"]["items"][0]["trends_url"]
            .as_str()
            .unwrap()
            .ends_with("q=Aqua"));
    }

    #[test]
    fn test_trends_needs_no_user() {
        let sandbox = Sandbox::new();
        let json = run_json(sandbox.anonymous().args(["keyword", "trends", "mods & maps"]));
        assert_eq!(
            json["data"]["url"],
            "https://trends.google.com/trends/explore?date=today%203-m&q=mods%20%26%20maps"
        );
    }
}

mod assist_tests {
    use super::*;

    #[test]
    fn test_background_prompt_defaults() {
        let sandbox = Sandbox::new();
        let json = run_json(sandbox.anonymous().args(["prompt", "background"]));
        let prompt = json["data"]["prompt"].as_str().unwrap();
        assert!(prompt.contains("a generic theme"));
        assert!(prompt.contains("standard lighting"));
    }

    #[test]
    fn test_describe_requires_inputs_before_key() {
        let sandbox = Sandbox::new();
        sandbox
            .anonymous()
            .args(["describe", "--app-name", " ", "--details", "x"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("required"));
    }

    #[test]
    fn test_describe_without_key_fails() {
        let sandbox = Sandbox::new();
        sandbox
            .anonymous()
            .args(["describe", "--app-name", "Sky", "--details", "islands"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("GEMINI_API_KEY"));
    }

    #[test]
    fn test_rust_log_raises_stderr_verbosity() {
        let sandbox = Sandbox::new();
        let assert = sandbox
            .anonymous()
            .env("RUST_LOG", "debug")
            .args(["keyword", "trends", "maps"])
            .assert()
            .success()
            .stderr(predicate::str::contains("Using data dir"));
        let stdout = String::from_utf8_lossy(&assert.get_output().stdout).to_string();
        assert_eq!(parse_json_output(&stdout)["success"], true);

        sandbox
            .anonymous()
            .args(["keyword", "trends", "maps"])
            .assert()
            .success()
            .stderr(predicate::str::contains("Using data dir").not());
    }

    #[test]
    fn test_completions() {
        let sandbox = Sandbox::new();
        sandbox
            .anonymous()
            .args(["completions", "bash"])
            .assert()
            .success()
            .stdout(predicate::str::contains("dashboard"));
    }
}
