#![allow(clippy::unwrap_used, clippy::expect_used)]

//! CLI smoke tests for the tenantdash binary.
//!
//! Each test runs against its own state file inside a temporary directory, so
//! separate invocations share state the same way an operator's shell session does.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};

use tempfile::TempDir;

const LEGACY_VARS: &[&str] = &[
    "COMPANY_ID",
    "SUPERADMIN_UID",
    "ADMIN_UID",
    "VENDOR_UID",
    "FIREBASE_PROJECT_ID",
    "FIREBASE_STORAGE_BUCKET",
];

struct Workspace {
    dir: TempDir,
}

impl Workspace {
    fn new() -> Self {
        Self {
            dir: tempfile::tempdir().unwrap(),
        }
    }

    fn state_path(&self) -> PathBuf {
        self.dir.path().join("state.json")
    }

    fn command(&self, args: &[&str]) -> Command {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_tenantdash"));
        cmd.args(args)
            .current_dir(self.dir.path())
            .env("TENANTDASH__PLATFORM__STATE_PATH", self.state_path())
            .env_remove("RUST_LOG")
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        for var in LEGACY_VARS {
            cmd.env_remove(var);
        }
        cmd
    }

    fn run(&self, args: &[&str]) -> Output {
        self.command(args)
            .output()
            .expect("failed to execute tenantdash")
    }

    fn run_with_input(&self, args: &[&str], input: impl AsRef<[u8]>) -> Output {
        let mut child = self
            .command(args)
            .stdin(Stdio::piped())
            .spawn()
            .expect("failed to spawn tenantdash");
        child
            .stdin
            .take()
            .unwrap()
            .write_all(input.as_ref())
            .unwrap();
        child.wait_with_output().unwrap()
    }
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn read_state(path: &Path) -> String {
    std::fs::read_to_string(path).unwrap()
}

#[test]
fn test_cli_help_lists_commands() {
    let ws = Workspace::new();
    let output = ws.run(&["--help"]);
    assert!(output.status.success());

    let text = stdout(&output);
    for command in ["seed", "nuke-store", "nuke-users", "set-claims", "check-rules", "reset", "dashboard", "whoami"] {
        assert!(text.contains(command), "help should mention {command}");
    }
    assert!(text.contains("--config"));
}

#[test]
fn test_print_config_applies_env_overrides() {
    let ws = Workspace::new();
    let output = ws
        .command(&["--print-config"])
        .env("TENANTDASH__FIXTURES__COMPANY_ID", "globex")
        .env("VENDOR_UID", "legacy-vendor")
        .output()
        .unwrap();
    assert!(output.status.success());

    let config: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(config["fixtures"]["company_id"], "globex");
    assert_eq!(config["fixtures"]["roles"]["vendor"], "legacy-vendor");
    assert_eq!(config["access"]["vendor_job_visibility"], "company_wide");
    assert!(config["platform"].get("token_secret").is_none());
}

#[test]
fn test_print_config_reads_yaml_file() {
    let ws = Workspace::new();
    let path = ws.dir.path().join("tenantdash.yaml");
    std::fs::write(&path, "access:\n  vendor_job_visibility: vendor_filtered\n").unwrap();

    let output = ws.run(&["--config", path.to_str().unwrap(), "--print-config"]);
    assert!(output.status.success());
    let config: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(config["access"]["vendor_job_visibility"], "vendor_filtered");
}

#[test]
fn test_missing_config_file_fails() {
    let ws = Workspace::new();
    let output = ws.run(&["--config", "does-not-exist.yaml", "seed"]);
    assert!(!output.status.success());
}

#[test]
fn test_seed_then_check_rules() {
    let ws = Workspace::new();

    let seed = ws.run(&["seed"]);
    assert!(seed.status.success(), "{}", String::from_utf8_lossy(&seed.stderr));
    assert!(stdout(&seed).contains("3 users created"));
    assert!(ws.state_path().is_file());

    let again = ws.run(&["seed"]);
    assert!(again.status.success());
    assert!(stdout(&again).contains("3 already existed"));

    let check = ws.run(&["check-rules"]);
    assert!(check.status.success());
    let report = stdout(&check);
    assert!(report.contains(" 0 failed"), "{report}");
    assert!(report.contains("vendor (vendor-fixed)"));
}

#[test]
fn test_check_rules_without_accounts_fails() {
    let ws = Workspace::new();
    let output = ws.run(&["check-rules"]);
    assert!(!output.status.success());
}

#[test]
fn test_nuke_store_declined_leaves_state_untouched() {
    let ws = Workspace::new();
    assert!(ws.run(&["seed"]).status.success());
    let before = read_state(&ws.state_path());

    for answer in ["no\n", "y\n", "\n", ""] {
        let output = ws.run_with_input(&["nuke-store"], answer);
        assert!(output.status.success());
        assert!(stdout(&output).contains("Aborted."));
    }
    let output = ws.run_with_input(&["nuke-users"], "nope\n");
    assert!(output.status.success());
    let output = ws.run_with_input(&["nuke-store"], b"\xff\xfe\n");
    assert!(output.status.success());
    assert!(stdout(&output).contains("Aborted."));

    assert_eq!(read_state(&ws.state_path()), before);
}

#[test]
fn test_confirmed_wipe_removes_accounts() {
    let ws = Workspace::new();
    assert!(ws.run(&["reset"]).status.success());

    let store = ws.run_with_input(&["nuke-store"], "YES\n");
    assert!(store.status.success());
    assert!(stdout(&store).contains("objects"));

    let users = ws.run_with_input(&["nuke-users"], " yes \n");
    assert!(users.status.success());
    assert!(stdout(&users).contains("Deleted 3 users"));

    assert!(!ws.run(&["check-rules"]).status.success());
}

#[test]
fn test_dashboard_for_vendor() {
    let ws = Workspace::new();
    assert!(ws.run(&["seed"]).status.success());

    let own = ws.run(&["dashboard", "--email", "vendor@example.com", "--password", "vendor123"]);
    assert!(own.status.success());
    let view = stdout(&own);
    assert!(view.contains("Vendor Dashboard - acme-company"), "{view}");
    assert!(view.contains("task-fixed"));
    assert!(!view.contains("other-vendor-task"));

    let foreign = ws.run(&[
        "dashboard",
        "--email",
        "vendor@example.com",
        "--password",
        "vendor123",
        "--route",
        "/acme-company/admin/dashboard",
    ]);
    assert!(foreign.status.success());
    assert!(stdout(&foreign).contains("Redirect: /unauthorized"));
}

#[test]
fn test_dashboard_wrong_password_fails() {
    let ws = Workspace::new();
    assert!(ws.run(&["seed"]).status.success());
    let output = ws.run(&["dashboard", "--email", "vendor@example.com", "--password", "wrong"]);
    assert!(!output.status.success());
}

#[test]
fn test_whoami_prints_verified_claims() {
    let ws = Workspace::new();
    assert!(ws.run(&["seed"]).status.success());

    let output = ws.run(&["whoami", "--email", "vendor@example.com", "--password", "vendor123"]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let text = stdout(&output);
    assert!(text.contains("UID: vendor-fixed"), "{text}");
    assert!(text.contains("Email: vendor@example.com"));
    assert!(text.contains("Role: vendor"));
    assert!(text.contains("Company: acme-company"));

    let wrong = ws.run(&["whoami", "--email", "vendor@example.com", "--password", "wrong"]);
    assert!(!wrong.status.success());
}
