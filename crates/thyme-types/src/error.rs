//! Error types for thyme.

use std::io;

/// Errors produced by the thyme terminal and vocabulary services.
#[derive(Debug, thiserror::Error)]
pub enum ThymeError {
    /// A command or configuration file was declared incorrectly.
    #[error("config error: {0}")]
    Config(String),

    #[error("missing required parameter `{0}`")]
    MissingParameter(String),

    #[error("invalid value for parameter `{name}`: expected {expected}, got {value}")]
    InvalidValue {
        name: String,
        expected: String,
        value: String,
    },

    /// Misuse of the terminal context stack (e.g. popping the root terminal).
    #[error("context error: {0}")]
    Context(String),

    /// A command handler failed while running.
    #[error("{0}")]
    Command(String),

    #[error("{0}")]
    Words(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ThymeError {
    /// True for errors caused by caller-supplied arguments not matching a
    /// command's declared parameters.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            ThymeError::MissingParameter(_) | ThymeError::InvalidValue { .. }
        )
    }
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, ThymeError>;

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;
    use crate::config::{HistoryConfig, ThymeConfig};

    #[test]
    fn config_error_display() {
        let e = ThymeError::Config("duplicate parameter".into());
        assert_eq!(format!("{e}"), "config error: duplicate parameter");
    }

    #[test]
    fn missing_parameter_display() {
        let e = ThymeError::MissingParameter("word".into());
        assert_eq!(format!("{e}"), "missing required parameter `word`");
    }

    #[test]
    fn invalid_value_display_names_everything() {
        let e = ThymeError::InvalidValue {
            name: "max".into(),
            expected: "integer".into(),
            value: "ten".into(),
        };
        let msg = format!("{e}");
        assert!(msg.contains("`max`"));
        assert!(msg.contains("integer"));
        assert!(msg.contains("ten"));
    }

    #[test]
    fn context_error_display() {
        let e = ThymeError::Context("nothing to pop".into());
        assert_eq!(format!("{e}"), "context error: nothing to pop");
    }

    #[test]
    fn command_error_is_bare_message() {
        let e = ThymeError::Command("Word 'gato' not found.".into());
        assert_eq!(format!("{e}"), "Word 'gato' not found.");
    }

    #[test]
    fn validation_classification() {
        assert!(ThymeError::MissingParameter("a".into()).is_validation());
        assert!(
            ThymeError::InvalidValue {
                name: "a".into(),
                expected: "float".into(),
                value: "x".into(),
            }
            .is_validation()
        );
        assert!(!ThymeError::Config("x".into()).is_validation());
        assert!(!ThymeError::Context("x".into()).is_validation());
    }

    #[test]
    fn missing_config_file_is_io_error() {
        let err = ThymeConfig::load(Path::new("/nonexistent/thyme.toml")).unwrap_err();
        assert!(matches!(err, ThymeError::Io(ref e) if e.kind() == io::ErrorKind::NotFound));
        assert!(err.to_string().starts_with("I/O error: "));
    }

    #[test]
    fn toml_section_errors_convert() {
        fn history(text: &str) -> Result<HistoryConfig> {
            Ok(toml::from_str(text)?)
        }
        let err = history("capacity = \"lots\"").unwrap_err();
        assert!(matches!(err, ThymeError::TomlParse(_)));
        assert!(err.to_string().contains("TOML parse error"));
        assert_eq!(history("capacity = 5").unwrap().capacity, 5);
    }

    #[test]
    fn json_section_errors_convert() {
        fn history(text: &str) -> Result<HistoryConfig> {
            Ok(serde_json::from_str(text)?)
        }
        let err = history(r#"{"path": 7}"#).unwrap_err();
        assert!(matches!(err, ThymeError::Json(_)));
        assert!(err.to_string().starts_with("JSON error: "));
        assert!(history(r#"{"path": "h.jsonl"}"#).unwrap().path.is_some());
    }

    #[test]
    fn result_alias_err() {
        let r: Result<i32> = Err(ThymeError::Words("oops".into()));
        assert!(r.is_err());
    }
}
