#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use serde_json::Value;
use tempfile::TempDir;

/// A throwaway store and config location for one test.
pub struct TestStore {
    dir: TempDir,
}

impl TestStore {
    pub fn new() -> Result<Self, std::io::Error> {
        Ok(Self {
            dir: tempfile::tempdir()?,
        })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn store_path(&self) -> PathBuf {
        self.dir.path().join("todo.json")
    }

    pub fn config_path(&self) -> PathBuf {
        self.dir.path().join("config.toml")
    }

    pub fn write_config(&self, contents: &str) -> std::io::Result<PathBuf> {
        let path = self.config_path();
        fs::write(&path, contents)?;
        Ok(path)
    }

    pub fn write_store(&self, contents: &str) -> std::io::Result<()> {
        fs::write(self.store_path(), contents)
    }

    pub fn read_store_raw(&self) -> std::io::Result<String> {
        fs::read_to_string(self.store_path())
    }

    /// Raw string value of a store key.
    pub fn key(&self, key: &str) -> Result<Option<String>, Box<dyn std::error::Error>> {
        if !self.store_path().exists() {
            return Ok(None);
        }
        let map: Value = serde_json::from_str(&self.read_store_raw()?)?;
        Ok(map.get(key).and_then(Value::as_str).map(str::to_string))
    }

    /// The persisted task list, decoded.
    pub fn tasks(&self) -> Result<Vec<Value>, Box<dyn std::error::Error>> {
        match self.key("tasks")? {
            Some(raw) => Ok(serde_json::from_str(&raw)?),
            None => Ok(Vec::new()),
        }
    }

    pub fn cmd(&self) -> Command {
        let mut cmd = todohub_cmd();
        cmd.env("TODOHUB_STORE", self.store_path())
            .env("TODOHUB_CONFIG", self.config_path())
            .current_dir(self.path());
        cmd
    }
}

pub fn todohub_cmd() -> Command {
    let mut cmd = Command::cargo_bin("todohub").expect("binary");
    cmd.env_remove("RUST_LOG")
        .env_remove("TODOHUB_STORE")
        .env_remove("TODOHUB_CONFIG");
    cmd
}

pub fn parse_json(output: &[u8]) -> Result<Value, Box<dyn std::error::Error>> {
    Ok(serde_json::from_slice(output)?)
}
