// tests/common/mod.rs
// Shared test utilities for integration tests
#![allow(dead_code)]

use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use tempfile::TempDir;

/// Path of the built binary; tests run it directly instead of via cargo run
pub fn fieldjoin_binary() -> &'static str {
    if cfg!(debug_assertions) {
        "./target/debug/fieldjoin"
    } else {
        "./target/release/fieldjoin"
    }
}

/// A temporary directory holding the two input files of a join
pub struct JoinFiles {
    pub dir: TempDir,
    pub left: PathBuf,
    pub right: PathBuf,
}

impl JoinFiles {
    pub fn new(left: &str, right: &str) -> Self {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let left_path = dir.path().join("left.txt");
        let right_path = dir.path().join("right.txt");
        std::fs::write(&left_path, left).expect("Failed to write left input");
        std::fs::write(&right_path, right).expect("Failed to write right input");
        Self {
            dir,
            left: left_path,
            right: right_path,
        }
    }

    pub fn left_str(&self) -> &str {
        self.left.to_str().unwrap()
    }

    pub fn right_str(&self) -> &str {
        self.right.to_str().unwrap()
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }
}

/// Like `run_fieldjoin`, but returns stdout as raw bytes
pub fn run_fieldjoin_bytes(args: &[&str]) -> (Vec<u8>, i32) {
    let output = Command::new(fieldjoin_binary())
        .arg("--ignore-config")
        .args(args)
        .output()
        .expect("Failed to execute fieldjoin");
    (output.stdout, output.status.code().unwrap_or(-1))
}

/// Run fieldjoin with the config file layer disabled, so a developer's own
/// ~/.fieldjoinrc cannot change test results
pub fn run_fieldjoin(args: &[&str]) -> (String, String, i32) {
    let mut full_args = vec!["--ignore-config"];
    full_args.extend_from_slice(args);
    run_fieldjoin_raw(&full_args)
}

/// Run fieldjoin with exactly `args`
pub fn run_fieldjoin_raw(args: &[&str]) -> (String, String, i32) {
    let output = Command::new(fieldjoin_binary())
        .args(args)
        .stdin(Stdio::null())
        .output()
        .expect("Failed to execute fieldjoin");

    (
        String::from_utf8_lossy(&output.stdout).to_string(),
        String::from_utf8_lossy(&output.stderr).to_string(),
        output.status.code().unwrap_or(-1),
    )
}

/// Join the two given texts as files, appending them after `args`
pub fn run_join_texts(args: &[&str], left: &str, right: &str) -> (String, String, i32) {
    let files = JoinFiles::new(left, right);
    let mut full_args = args.to_vec();
    full_args.push(files.left_str());
    full_args.push(files.right_str());
    run_fieldjoin(&full_args)
}

/// Run fieldjoin feeding `input` on stdin
pub fn run_fieldjoin_with_input(args: &[&str], input: &[u8]) -> (String, String, i32) {
    let mut cmd = Command::new(fieldjoin_binary())
        .arg("--ignore-config")
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("Failed to start fieldjoin");

    if let Some(mut stdin) = cmd.stdin.take() {
        stdin.write_all(input).expect("Failed to write to stdin");
    }

    let output = cmd.wait_with_output().expect("Failed to read output");

    (
        String::from_utf8_lossy(&output.stdout).to_string(),
        String::from_utf8_lossy(&output.stderr).to_string(),
        output.status.code().unwrap_or(-1),
    )
}

pub const NAMES: &str = "1 Alice\n2 Bob\n3 Carol\n4 David\n";
pub const SCORES: &str = "1 90\n2 85\n3 95\n";
