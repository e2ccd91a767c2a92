//! Shared helpers for `monconf` integration tests

#![allow(dead_code)]

use assert_cmd::Command;
use std::path::{Path, PathBuf};
pub use tempfile::TempDir;

/// Isolated config directory and settings file for one test
pub struct TestEnv {
    pub config_dir: TempDir,
    pub home_dir: TempDir,
}

impl TestEnv {
    pub fn new() -> Self {
        Self {
            config_dir: TempDir::new().unwrap(),
            home_dir: TempDir::new().unwrap(),
        }
    }

    /// `monconf` pointed at this environment
    pub fn monconf(&self) -> Command {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_monconf"));
        cmd.env("MONCONF_CONFIG_DIR", self.config_dir.path());
        cmd.env("MONCONF_SETTINGS", self.settings_path());
        cmd.env_remove("RUST_LOG");
        cmd
    }

    pub fn settings_path(&self) -> PathBuf {
        self.home_dir.path().join("settings.toml")
    }

    pub fn file(&self, name: &str) -> PathBuf {
        self.config_dir.path().join(name)
    }

    pub fn write(&self, name: &str, content: &str) -> PathBuf {
        let path = self.file(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    pub fn read(&self, name: &str) -> String {
        read(&self.file(name))
    }
}

impl Default for TestEnv {
    fn default() -> Self {
        Self::new()
    }
}

pub fn read(path: &Path) -> String {
    std::fs::read_to_string(path).unwrap()
}
