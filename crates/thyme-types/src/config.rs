//! Runtime configuration loaded from TOML.
//!
//! Every field has a default so an empty file (or no file at all) yields a
//! working setup: in-memory history, in-memory word store, and the stock
//! prompts.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{Result, ThymeError};

/// Top-level configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ThymeConfig {
    pub terminal: TerminalConfig,
    pub history: HistoryConfig,
    pub words: WordsConfig,
}

/// Settings for the default top-level terminal.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TerminalConfig {
    pub prompt: String,
    /// Line returned by the `status` command.
    pub welcome: String,
}

impl Default for TerminalConfig {
    fn default() -> Self {
        Self {
            prompt: "user@terminal:~$ ".to_string(),
            welcome: "Terminal access is available".to_string(),
        }
    }
}

/// Command history storage.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// JSON-lines file; history stays in memory when unset.
    pub path: Option<PathBuf>,
    /// Maximum in-memory entries (0 = unbounded). The file keeps every line.
    pub capacity: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            path: None,
            capacity: 1000,
        }
    }
}

/// The vocabulary sub-terminal and its word store.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WordsConfig {
    pub prompt: String,
    pub store_path: Option<PathBuf>,
    pub switch_command: String,
    pub switch_description: String,
    pub welcome: String,
}

impl Default for WordsConfig {
    fn default() -> Self {
        Self {
            prompt: "words> ".to_string(),
            store_path: None,
            switch_command: "words".to_string(),
            switch_description: "Words study service.".to_string(),
            welcome: "Welcome to the words terminal. Type 'help' for assistance.".to_string(),
        }
    }
}

impl ThymeConfig {
    /// Parse a configuration from TOML text.
    pub fn from_toml_str(toml_str: &str) -> Result<Self> {
        toml::from_str(toml_str).map_err(|e| ThymeError::Config(format!("thyme.toml: {e}")))
    }

    /// Read and parse a configuration file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&text)?;
        log::debug!("loaded config from {}", path.display());
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_gives_defaults() {
        let cfg = ThymeConfig::from_toml_str("").unwrap();
        assert_eq!(cfg.terminal.prompt, "user@terminal:~$ ");
        assert_eq!(cfg.words.prompt, "words> ");
        assert_eq!(cfg.words.switch_command, "words");
        assert_eq!(cfg.history.capacity, 1000);
        assert!(cfg.history.path.is_none());
        assert!(cfg.words.store_path.is_none());
    }

    #[test]
    fn partial_section_keeps_other_defaults() {
        let cfg = ThymeConfig::from_toml_str(
            r#"
            [words]
            prompt = "vocab> "
            store_path = "/tmp/words.json"
            "#,
        )
        .unwrap();
        assert_eq!(cfg.words.prompt, "vocab> ");
        assert_eq!(
            cfg.words.store_path.as_deref(),
            Some(Path::new("/tmp/words.json"))
        );
        assert_eq!(cfg.words.switch_command, "words");
        assert_eq!(cfg.terminal.welcome, "Terminal access is available");
    }

    #[test]
    fn history_section() {
        let cfg = ThymeConfig::from_toml_str(
            r#"
            [history]
            path = "history.jsonl"
            capacity = 0
            "#,
        )
        .unwrap();
        assert_eq!(cfg.history.capacity, 0);
        assert_eq!(cfg.history.path.as_deref(), Some(Path::new("history.jsonl")));
    }

    #[test]
    fn invalid_toml_is_config_error() {
        let err = ThymeConfig::from_toml_str("[terminal\nprompt = 1").unwrap_err();
        assert!(matches!(err, ThymeError::Config(_)));
        assert!(format!("{err}").contains("thyme.toml"));
    }

    #[test]
    fn wrong_type_is_config_error() {
        let err = ThymeConfig::from_toml_str("[history]\ncapacity = \"many\"").unwrap_err();
        assert!(matches!(err, ThymeError::Config(_)));
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("thyme.toml");
        std::fs::write(&path, "[terminal]\nprompt = \"$ \"\n").unwrap();
        let cfg = ThymeConfig::load(&path).unwrap();
        assert_eq!(cfg.terminal.prompt, "$ ");
    }

    #[test]
    fn load_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = ThymeConfig::load(&dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, ThymeError::Io(_)));
    }
}
