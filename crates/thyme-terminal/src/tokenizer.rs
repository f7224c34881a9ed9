//! Command-line tokenizer.
//!
//! Splits on whitespace (no quoting). The first token names the command; the
//! rest become keyword arguments (`--name=value`, `--name value`, `--name`,
//! and the single-dash short forms) or positional arguments.

use std::collections::HashMap;
use std::fmt;

/// A keyword value as typed: either text or a bare flag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawValue {
    Text(String),
    /// `--name` with no value.
    Present,
}

impl fmt::Display for RawValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawValue::Text(s) => f.write_str(s),
            RawValue::Present => f.write_str("true"),
        }
    }
}

/// Result of tokenizing one input line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedLine {
    pub command: String,
    pub positional: Vec<String>,
    pub keywords: HashMap<String, RawValue>,
}

impl ParsedLine {
    /// Whether the implicit help flag (`-h` / `--help`) was given.
    pub fn wants_help(&self) -> bool {
        self.keywords.contains_key("h") || self.keywords.contains_key("help")
    }
}

/// Tokenize a line. Returns `None` when the line has no tokens.
///
/// A later occurrence of the same keyword overwrites an earlier one.
pub fn tokenize(input: &str) -> Option<ParsedLine> {
    let tokens: Vec<&str> = input.split_whitespace().collect();
    let (command, rest) = tokens.split_first()?;

    let mut parsed = ParsedLine {
        command: (*command).to_string(),
        ..ParsedLine::default()
    };

    let mut i = 0;
    while i < rest.len() {
        let token = rest[i];
        let key_part = token
            .strip_prefix("--")
            .or_else(|| token.strip_prefix('-'));

        match key_part {
            Some(body) => {
                if let Some((key, value)) = body.split_once('=') {
                    parsed
                        .keywords
                        .insert(key.to_string(), RawValue::Text(value.to_string()));
                } else {
                    match rest.get(i + 1) {
                        Some(next) if !next.starts_with('-') => {
                            parsed
                                .keywords
                                .insert(body.to_string(), RawValue::Text((*next).to_string()));
                            // The value token is consumed.
                            i += 1;
                        },
                        _ => {
                            parsed.keywords.insert(body.to_string(), RawValue::Present);
                        },
                    }
                }
            },
            None => parsed.positional.push(token.to_string()),
        }
        i += 1;
    }

    Some(parsed)
}
