//! Common test utilities for CLI integration tests.
//!
//! This module provides shared helpers for CLI testing, including:
//! - Test environment setup with temporary directories
//! - Command builder helpers with an isolated configuration
//! - Fixture helpers for writing build descriptions

use assert_cmd::Command;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Every environment variable the CLI reads.
const MKINCLUDE_ENV_VARS: [&str; 8] = [
    "MKINCLUDE_CONFIG",
    "MKINCLUDE_LOG_MODE",
    "MKINCLUDE_FOLLOW_SYMLINKS",
    "MKINCLUDE_EXPAND_TILDE",
    "MKINCLUDE_LOCATION",
    "MKINCLUDE_HERE_VAR",
    "MKINCLUDE_HERE_STACK_VAR",
    "MKINCLUDE_PAST_INCLUDES_VAR",
];

/// Test environment with an isolated home directory.
///
/// This struct provides an isolated test environment with:
/// - A temporary directory for build descriptions
/// - A separate home directory, so no user configuration leaks in
pub struct TestEnv {
    /// Temporary directory (kept alive for the duration of the test)
    #[allow(dead_code)]
    temp_dir: TempDir,
    /// Path to the temporary directory
    pub temp_path: PathBuf,
    /// Home directory seen by the binary
    pub home: PathBuf,
}

#[allow(dead_code)]
impl TestEnv {
    /// Create a new test environment.
    pub fn new() -> Self {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let temp_path = temp_dir.path().to_path_buf();
        let home = temp_path.join("home");
        std::fs::create_dir_all(&home).expect("Failed to create home directory");

        Self {
            temp_dir,
            temp_path,
            home,
        }
    }

    /// Get a command builder running in the temp directory with a clean
    /// environment.
    pub fn command(&self) -> Command {
        let mut cmd = Command::cargo_bin("mkinclude").expect("Failed to find mkinclude binary");
        for var in MKINCLUDE_ENV_VARS {
            cmd.env_remove(var);
        }
        cmd.env("HOME", &self.home).current_dir(&self.temp_path);
        cmd
    }

    /// Get the temp path.
    pub fn path(&self) -> &Path {
        &self.temp_path
    }

    /// Absolute path of `name` inside the temp directory, as a string.
    pub fn abs(&self, name: &str) -> String {
        self.temp_path.join(name).to_string_lossy().into_owned()
    }

    /// Write a file under the temp directory, creating parent directories.
    pub fn write(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.temp_path.join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent directory");
        }
        std::fs::write(&path, contents).expect("Failed to write test file");
        path
    }

    /// Write the per-user configuration file.
    pub fn write_user_config(&self, contents: &str) -> PathBuf {
        let path = self.home.join(".mkinclude").join("config.yaml");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, contents).expect("Failed to write user config");
        path
    }
}
