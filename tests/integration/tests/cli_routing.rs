//! CLI binary integration tests.
//!
//! These tests run the compiled `driveward` binary against a temporary
//! application directory; build it first with `cargo build -p driveward-cli`.
//! There is no verifier configured, so every consent check goes to the
//! console fallback, which reads its answer from stdin.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};

use tempfile::TempDir;

const MASTER_KEY: &str = "000102030405060708090a0b0c0d0e0f101112131415161718191a1b1c1d1e1f";

/// Locate the compiled `driveward` binary in the workspace target directory.
///
/// Cargo sets `CARGO_MANIFEST_DIR` to this test crate's directory; the
/// workspace root is two levels up. `CARGO_TARGET_DIR` is honoured.
fn driveward_bin() -> PathBuf {
    let manifest_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    // tests/integration -> workspace root
    let workspace_root = manifest_dir
        .parent()
        .expect("tests/ parent")
        .parent()
        .expect("workspace root");
    let target = std::env::var_os("CARGO_TARGET_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|| workspace_root.join("target"));
    let bin = target
        .join("debug")
        .join(format!("driveward{}", std::env::consts::EXE_SUFFIX));
    assert!(
        bin.exists(),
        "driveward binary not found at {}; run `cargo build -p driveward-cli` first",
        bin.display()
    );
    bin
}

/// A throwaway application directory with its own config file.
struct Sandbox {
    dir: TempDir,
    bin: PathBuf,
}

impl Sandbox {
    fn new() -> Self {
        Self {
            dir: TempDir::new().unwrap(),
            bin: driveward_bin(),
        }
    }

    fn config_path(&self) -> PathBuf {
        self.dir.path().join("driveward.json5")
    }

    fn store_path(&self) -> PathBuf {
        self.dir.path().join("BitLockerPasswords.dat")
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new(&self.bin);
        cmd.arg("--config")
            .arg(self.config_path())
            .env("DRIVEWARD_HOME", self.dir.path())
            .env("DRIVEWARD_MASTER_KEY", MASTER_KEY)
            .env("USERNAME", "alice")
            .env_remove("DRIVEWARD_CONFIG")
            .env_remove("DRIVEWARD_LOG")
            .env_remove("RUST_LOG");
        cmd
    }

    /// Run with `stdin_text` as the console answer.
    fn run(&self, args: &[&str], stdin_text: &str) -> Output {
        let mut child = self
            .command()
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .expect("failed to run driveward");
        child
            .stdin
            .take()
            .unwrap()
            .write_all(stdin_text.as_bytes())
            .unwrap();
        child.wait_with_output().unwrap()
    }
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

fn write_config(path: &Path, content: &str) {
    std::fs::write(path, content).unwrap();
}

#[test]
fn test_cli_help() {
    let sandbox = Sandbox::new();
    let output = sandbox.run(&["--help"], "");
    assert!(output.status.success(), "--help should succeed");
    let text = stdout(&output);
    for command in ["save", "get", "remove", "has", "list", "status", "config"] {
        assert!(text.contains(command), "help should mention '{command}', got: {text}");
    }
}

#[test]
fn test_cli_unknown_command() {
    let sandbox = Sandbox::new();
    let output = sandbox.run(&["nonexistent-command"], "");
    assert!(!output.status.success(), "unknown command should fail");
}

#[test]
fn test_cli_password_lifecycle_with_console_fallback() {
    let sandbox = Sandbox::new();

    let output = sandbox.run(&["save", "D:", "--password", "hunter2"], "y\n");
    assert!(output.status.success(), "save failed: {}", String::from_utf8_lossy(&output.stderr));
    assert!(!std::fs::read_to_string(sandbox.store_path()).unwrap().contains("hunter2"));

    let output = sandbox.run(&["has", "D:"], "");
    assert_eq!(stdout(&output).trim(), "yes");

    let output = sandbox.run(&["list"], "");
    assert_eq!(stdout(&output).trim(), "D:");

    let output = sandbox.run(&["get", "D:"], "y\n");
    assert!(output.status.success());
    assert_eq!(stdout(&output).trim(), "hunter2");

    let output = sandbox.run(&["remove", "D:"], "y\n");
    assert!(output.status.success());

    let output = sandbox.run(&["get", "D:"], "y\n");
    assert!(!output.status.success());
    assert!(stdout(&output).is_empty());
}

#[test]
fn test_cli_declined_fallback_fails() {
    let sandbox = Sandbox::new();

    let output = sandbox.run(&["save", "D:", "--password", "hunter2"], "n\n");
    assert!(!output.status.success());
    assert!(!sandbox.store_path().exists());

    let output = sandbox.run(&["has", "D:"], "");
    assert_eq!(stdout(&output).trim(), "no");
}

#[test]
fn test_cli_deny_policy_never_asks() {
    let sandbox = Sandbox::new();
    write_config(&sandbox.config_path(), r#"{ consent: { fallback: "deny" } }"#);

    let output = sandbox.run(&["save", "D:", "--password", "hunter2"], "y\n");
    assert!(!output.status.success());
    assert!(!sandbox.store_path().exists());
}

#[cfg(unix)]
#[test]
fn test_cli_verifier_command() {
    let sandbox = Sandbox::new();
    write_config(
        &sandbox.config_path(),
        r#"{ consent: { fallback: "deny", verifier_command: ["/bin/sh", "-c", "exit 0"] } }"#,
    );

    let output = sandbox.run(&["save", "E:", "--password", "swordfish"], "");
    assert!(output.status.success(), "save failed: {}", String::from_utf8_lossy(&output.stderr));

    let output = sandbox.run(&["get", "E:"], "");
    assert_eq!(stdout(&output).trim(), "swordfish");
}

#[test]
fn test_cli_status() {
    let sandbox = Sandbox::new();
    let output = sandbox.run(&["status"], "");
    assert!(output.status.success());
    let text = stdout(&output);
    assert!(text.contains("no_device"), "got: {text}");
    assert!(text.contains("alice"), "got: {text}");
    assert!(text.contains("BitLockerPasswords.dat"), "got: {text}");
}

#[test]
fn test_cli_config_path_and_init() {
    let sandbox = Sandbox::new();

    let output = sandbox.run(&["config", "path"], "");
    assert_eq!(
        stdout(&output).trim(),
        sandbox.config_path().display().to_string()
    );

    let output = sandbox.run(&["config", "init"], "");
    assert!(output.status.success());
    assert!(sandbox.config_path().exists());

    let output = sandbox.run(&["config", "init"], "");
    assert!(!output.status.success(), "second init without --force should fail");

    let output = sandbox.run(&["config", "init", "--force"], "");
    assert!(output.status.success());
}

#[test]
fn test_cli_rejects_invalid_config() {
    let sandbox = Sandbox::new();
    write_config(&sandbox.config_path(), r#"{ storage: { file_name: "" } }"#);

    let output = sandbox.run(&["list"], "");
    assert!(!output.status.success());
}
