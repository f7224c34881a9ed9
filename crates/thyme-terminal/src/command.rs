//! Commands: a handler bound to a declared, validated argument surface.
//!
//! The declared `Parameter` list is the authoritative contract. For brevity a
//! command can also be derived from a signature string such as
//! `"word: string, language: string = en"`, see [`Command::from_signature`].

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

use thyme_types::error::{Result, ThymeError};

use crate::parameter::{DataType, Parameter, Value};
use crate::terminal::InputHandler;
use crate::tokenizer::RawValue;

/// Output produced by a command.
pub enum CommandOutput {
    /// Text shown to the caller.
    Text(String),
    /// Command produced no visible output.
    None,
    /// Signal to the context stack: make `handler` the innermost terminal.
    Push {
        handler: Arc<dyn InputHandler>,
        message: String,
    },
    /// Signal to the context stack: return to the enclosing terminal.
    Pop { message: String },
}

impl fmt::Debug for CommandOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandOutput::Text(s) => f.debug_tuple("Text").field(s).finish(),
            CommandOutput::None => f.write_str("None"),
            CommandOutput::Push { handler, message } => f
                .debug_struct("Push")
                .field("prompt", &handler.prompt())
                .field("message", message)
                .finish(),
            CommandOutput::Pop { message } => {
                f.debug_struct("Pop").field("message", message).finish()
            },
        }
    }
}

/// Validated, typed arguments passed to a handler.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Arguments {
    values: HashMap<String, Value>,
}

impl Arguments {
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    pub fn get_str(&self, name: &str) -> Option<&str> {
        match self.values.get(name) {
            Some(Value::String(s)) => Some(s),
            _ => None,
        }
    }

    pub fn get_int(&self, name: &str) -> Option<i64> {
        match self.values.get(name) {
            Some(Value::Integer(n)) => Some(*n),
            _ => None,
        }
    }

    pub fn get_float(&self, name: &str) -> Option<f64> {
        match self.values.get(name) {
            Some(Value::Float(x)) => Some(*x),
            Some(Value::Integer(n)) => Some(*n as f64),
            _ => None,
        }
    }

    /// `true` only if the flag was given (or defaulted) as set.
    pub fn flag(&self, name: &str) -> bool {
        matches!(self.values.get(name), Some(Value::Flag(true)))
    }

    /// A string argument the handler cannot work without.
    pub fn required_str(&self, name: &str) -> Result<&str> {
        self.get_str(name)
            .ok_or_else(|| ThymeError::MissingParameter(name.to_string()))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Callable bound by a command.
pub type Handler = Arc<dyn Fn(&Arguments) -> Result<CommandOutput> + Send + Sync>;

/// A named, typed-argument-validated command.
#[derive(Clone)]
pub struct Command {
    name: String,
    description: String,
    params: Vec<Parameter>,
    handler: Handler,
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

impl Command {
    /// Build a command from an explicit parameter list.
    ///
    /// Fails with a config error on duplicate names or aliases, or if a
    /// parameter shadows the implicit `help`/`h` flag.
    pub fn new<F>(
        name: &str,
        description: &str,
        params: Vec<Parameter>,
        handler: F,
    ) -> Result<Self>
    where
        F: Fn(&Arguments) -> Result<CommandOutput> + Send + Sync + 'static,
    {
        Self::builder(name)
            .description(description)
            .params(params)
            .handler(handler)
            .build()
    }

    /// Start a builder for a command called `name`.
    pub fn builder(name: &str) -> CommandBuilder {
        CommandBuilder {
            name: name.to_string(),
            description: String::new(),
            params: Vec::new(),
            handler: None,
        }
    }

    /// Derive the parameter list from a declared argument signature.
    ///
    /// Arguments without a default are positional. Arguments with a default
    /// become optional keywords whose default is handed to the handler when
    /// absent (`none` means optional with no default). Every argument must
    /// declare its type.
    pub fn from_signature<F>(
        name: &str,
        description: &str,
        signature: &str,
        handler: F,
    ) -> Result<Self>
    where
        F: Fn(&Arguments) -> Result<CommandOutput> + Send + Sync + 'static,
    {
        let params = parse_signature(signature)?;
        Self::new(name, description, params, handler)
    }

    /// Parameterless built-in whose name is known to be valid.
    pub(crate) fn unchecked<F>(name: &str, description: &str, handler: F) -> Self
    where
        F: Fn(&Arguments) -> Result<CommandOutput> + Send + Sync + 'static,
    {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            params: Vec::new(),
            handler: Arc::new(handler),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn params(&self) -> &[Parameter] {
        &self.params
    }

    /// Validate and coerce the caller's arguments, then run the handler.
    ///
    /// A `-h`/`--help` keyword short-circuits to the help text.
    pub fn invoke(
        &self,
        positional: &[String],
        keywords: &HashMap<String, RawValue>,
    ) -> Result<CommandOutput> {
        if keywords.contains_key("h") || keywords.contains_key("help") {
            return Ok(CommandOutput::Text(self.help_statement()));
        }

        let keyword_params = || self.params.iter().filter(|p| !p.positional);

        for param in keyword_params() {
            if param.required && find_keyword(param, keywords).is_none() {
                return Err(ThymeError::MissingParameter(param.name.clone()));
            }
        }

        let mut values = HashMap::new();
        for param in keyword_params() {
            match find_keyword(param, keywords) {
                Some(raw) => {
                    values.insert(param.name.clone(), param.coerce(raw)?);
                },
                None => {
                    if let Some(default) = &param.default {
                        values.insert(param.name.clone(), default.clone());
                    }
                },
            }
        }

        let mut supplied = positional.iter();
        for param in self.params.iter().filter(|p| p.positional) {
            let raw = supplied
                .next()
                .ok_or_else(|| ThymeError::MissingParameter(param.name.clone()))?;
            values.insert(param.name.clone(), param.coerce(&RawValue::Text(raw.clone()))?);
        }

        let surplus = supplied.count();
        if surplus > 0 {
            log::debug!("{}: ignoring {surplus} extra positional argument(s)", self.name);
        }
        for key in keywords.keys() {
            if !self.params.iter().any(|p| !p.positional && p.matches_key(key)) {
                log::debug!("{}: ignoring unknown keyword '{key}'", self.name);
            }
        }

        (self.handler)(&Arguments { values })
    }

    /// `name - description` followed by one tab-indented line per parameter.
    pub fn help_statement(&self) -> String {
        let mut out = format!("{} - {}", self.name, self.description);
        for param in &self.params {
            out.push_str("\n\t");
            out.push_str(&param.help_line());
        }
        out
    }
}

/// The alias spelling takes precedence when both forms are given.
fn find_keyword<'a>(
    param: &Parameter,
    keywords: &'a HashMap<String, RawValue>,
) -> Option<&'a RawValue> {
    param
        .alias
        .and_then(|a| keywords.get(a.to_string().as_str()))
        .or_else(|| keywords.get(&param.name))
}

/// Builder for [`Command`].
pub struct CommandBuilder {
    name: String,
    description: String,
    params: Vec<Parameter>,
    handler: Option<Handler>,
}

impl CommandBuilder {
    pub fn description(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self
    }

    pub fn param(mut self, param: Parameter) -> Self {
        self.params.push(param);
        self
    }

    pub fn params(mut self, params: Vec<Parameter>) -> Self {
        self.params.extend(params);
        self
    }

    pub fn handler<F>(mut self, handler: F) -> Self
    where
        F: Fn(&Arguments) -> Result<CommandOutput> + Send + Sync + 'static,
    {
        self.handler = Some(Arc::new(handler));
        self
    }

    pub fn build(self) -> Result<Command> {
        let name = self.name.trim();
        if name.is_empty() || name.contains(char::is_whitespace) {
            return Err(ThymeError::Config(format!(
                "invalid command name '{}'",
                self.name
            )));
        }
        let handler = self
            .handler
            .ok_or_else(|| ThymeError::Config(format!("command '{name}' has no handler")))?;
        validate_params(name, &self.params)?;
        Ok(Command {
            name: name.to_string(),
            description: self.description,
            params: self.params,
            handler,
        })
    }
}

fn validate_params(command: &str, params: &[Parameter]) -> Result<()> {
    let mut names = HashSet::new();
    let mut aliases = HashSet::new();
    for param in params {
        if param.name.is_empty() {
            return Err(ThymeError::Config(format!(
                "{command}: parameter with empty name"
            )));
        }
        if param.name == "help" || param.name == "h" || param.alias == Some('h') {
            return Err(ThymeError::Config(format!(
                "{command}: `help`/`-h` is reserved for the help flag"
            )));
        }
        if !names.insert(param.name.as_str()) {
            return Err(ThymeError::Config(format!(
                "{command}: duplicate parameter name `{}`",
                param.name
            )));
        }
        if let Some(alias) = param.alias
            && !aliases.insert(alias)
        {
            return Err(ThymeError::Config(format!(
                "{command}: duplicate parameter alias `-{alias}`"
            )));
        }
    }
    Ok(())
}

/// Parse `name: type [= default], ...` into parameters.
fn parse_signature(signature: &str) -> Result<Vec<Parameter>> {
    let mut params = Vec::new();
    for item in signature.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        let (decl, default) = match item.split_once('=') {
            Some((decl, default)) => (decl.trim(), Some(default.trim())),
            None => (item, None),
        };
        let (name, type_name) = match decl.split_once(':') {
            Some((name, type_name)) => (name.trim(), type_name.trim()),
            None => {
                return Err(ThymeError::Config(format!(
                    "parameter `{}` has no declared type",
                    decl.trim()
                )));
            },
        };
        if name.is_empty() || !name.chars().all(|c| c.is_alphanumeric() || c == '_') {
            return Err(ThymeError::Config(format!("invalid parameter name `{name}`")));
        }
        let data_type = DataType::from_name(type_name).ok_or_else(|| {
            ThymeError::Config(format!("parameter `{name}`: unknown type `{type_name}`"))
        })?;

        let param = match default {
            None => Parameter::positional(name, data_type, ""),
            Some("none") => Parameter::keyword(name, data_type, ""),
            Some(literal) => {
                let value = data_type
                    .coerce(&RawValue::Text(literal.to_string()))
                    .ok_or_else(|| {
                        ThymeError::Config(format!(
                            "parameter `{name}`: default `{literal}` is not a {data_type}"
                        ))
                    })?;
                Parameter::keyword(name, data_type, "").default_value(value)
            },
        };
        params.push(param);
    }
    Ok(params)
}
