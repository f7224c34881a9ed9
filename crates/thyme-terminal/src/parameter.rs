//! Command parameters and value coercion.

use std::fmt;

use thyme_types::error::{Result, ThymeError};

use crate::tokenizer::RawValue;

/// Declared type of a parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataType {
    String,
    Integer,
    Float,
    /// Boolean switch; `--name` alone sets it.
    Flag,
}

impl DataType {
    /// Name used in help text and error messages.
    pub fn name(self) -> &'static str {
        match self {
            DataType::String => "string",
            DataType::Integer => "integer",
            DataType::Float => "float",
            DataType::Flag => "flag",
        }
    }

    /// Parse a declared type name (`str`, `int`, `bool`, ...).
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "string" | "str" => Some(DataType::String),
            "integer" | "int" => Some(DataType::Integer),
            "float" => Some(DataType::Float),
            "flag" | "bool" => Some(DataType::Flag),
            _ => None,
        }
    }

    /// Convert a raw token into a typed value, or `None` if it does not fit.
    pub fn coerce(self, raw: &RawValue) -> Option<Value> {
        match (self, raw) {
            (DataType::String, RawValue::Text(s)) => Some(Value::String(s.clone())),
            (DataType::String, RawValue::Present) => Some(Value::String("true".to_string())),
            (DataType::Integer, RawValue::Text(s)) => s.trim().parse().ok().map(Value::Integer),
            (DataType::Float, RawValue::Text(s)) => s.trim().parse().ok().map(Value::Float),
            (DataType::Integer | DataType::Float, RawValue::Present) => None,
            (DataType::Flag, RawValue::Present) => Some(Value::Flag(true)),
            (DataType::Flag, RawValue::Text(s)) => match s.to_ascii_lowercase().as_str() {
                "true" | "yes" | "on" | "1" => Some(Value::Flag(true)),
                "false" | "no" | "off" | "0" => Some(Value::Flag(false)),
                _ => None,
            },
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A typed argument value handed to a command handler.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    String(String),
    Integer(i64),
    Float(f64),
    Flag(bool),
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::String(s) => f.write_str(s),
            Value::Integer(n) => write!(f, "{n}"),
            Value::Float(x) => write!(f, "{x}"),
            Value::Flag(b) => write!(f, "{b}"),
        }
    }
}

/// One declared argument of a command.
///
/// Built once when the owning command is built and never mutated after.
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    pub name: String,
    pub data_type: DataType,
    pub description: String,
    /// Only meaningful for non-positional parameters.
    pub required: bool,
    pub alias: Option<char>,
    pub positional: bool,
    /// Supplied to the handler when a keyword parameter is absent.
    pub default: Option<Value>,
}

impl Parameter {
    /// A positional parameter, consumed in declaration order.
    pub fn positional(name: &str, data_type: DataType, description: &str) -> Self {
        Self {
            name: name.to_string(),
            data_type,
            description: description.to_string(),
            required: false,
            alias: None,
            positional: true,
            default: None,
        }
    }

    /// An optional keyword parameter (`--name value`).
    pub fn keyword(name: &str, data_type: DataType, description: &str) -> Self {
        Self {
            positional: false,
            ..Self::positional(name, data_type, description)
        }
    }

    /// A keyword flag (`--name`).
    pub fn flag(name: &str, description: &str) -> Self {
        Self::keyword(name, DataType::Flag, description)
    }

    /// Set the single-character short form (`-x`).
    pub fn alias(mut self, alias: char) -> Self {
        self.alias = Some(alias);
        self
    }

    /// Mark a keyword parameter as required.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn default_value(mut self, value: Value) -> Self {
        self.default = Some(value);
        self
    }

    /// Whether `key` (a keyword name from the tokenizer) addresses this parameter.
    pub fn matches_key(&self, key: &str) -> bool {
        key == self.name || self.alias_matches(key)
    }

    fn alias_matches(&self, key: &str) -> bool {
        let mut chars = key.chars();
        match (self.alias, chars.next(), chars.next()) {
            (Some(a), Some(c), None) => a == c,
            _ => false,
        }
    }

    /// Coerce a raw value, naming this parameter in the error.
    pub fn coerce(&self, raw: &RawValue) -> Result<Value> {
        self.data_type
            .coerce(raw)
            .ok_or_else(|| ThymeError::InvalidValue {
                name: self.name.clone(),
                expected: self.data_type.name().to_string(),
                value: raw.to_string(),
            })
    }

    /// One-line help entry, e.g. `--language (alias: -l, type: string): ...`.
    pub fn help_line(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.positional {
            write!(f, "{} (", self.name)?;
        } else {
            write!(f, "--{} (", self.name)?;
        }
        if let Some(alias) = self.alias {
            write!(f, "alias: -{alias}, ")?;
        }
        write!(f, "type: {}", self.data_type)?;
        if self.required && !self.positional {
            f.write_str(", required")?;
        }
        write!(f, "): {}", self.description)
    }
}
