//! Terminals: command namespaces that turn one input line into text.
//!
//! A terminal never fails towards its caller. Unknown commands, validation
//! failures and handler errors all resolve to an [`Outcome`] with text.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock, Weak};

use chrono::Utc;
use thyme_types::error::{Result, ThymeError};

use crate::command::{Arguments, Command, CommandOutput};
use crate::history::HistoryStore;
use crate::tokenizer::tokenize;

/// Text returned when no attached command matches the input.
pub const NOT_FOUND: &str = "Command not found.\n";

/// Something that can handle a line of input.
pub trait InputHandler: Send + Sync {
    /// Prompt shown after this handler's output while it is innermost.
    fn prompt(&self) -> &str;

    fn handle_input(&self, input: &str) -> Outcome;
}

/// A request for the context stack, raised by a command.
pub enum ContextAction {
    Push(Arc<dyn InputHandler>),
    Pop,
}

impl fmt::Debug for ContextAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContextAction::Push(handler) => f.debug_tuple("Push").field(&handler.prompt()).finish(),
            ContextAction::Pop => f.write_str("Pop"),
        }
    }
}

/// Result of handling one line.
#[derive(Debug)]
pub struct Outcome {
    pub output: String,
    pub handled: bool,
    pub action: Option<ContextAction>,
}

impl Outcome {
    pub fn handled(output: impl Into<String>) -> Self {
        Self {
            output: output.into(),
            handled: true,
            action: None,
        }
    }

    pub fn unhandled() -> Self {
        Self {
            output: String::new(),
            handled: false,
            action: None,
        }
    }
}

/// An addressable command namespace with a prompt.
///
/// Command-table mutation goes through a lock, so a terminal can be shared
/// between threads. Lookup is by exact, case-sensitive name.
pub struct Terminal {
    prompt: String,
    commands: RwLock<BTreeMap<String, Arc<Command>>>,
    history: Arc<dyn HistoryStore>,
}

impl fmt::Debug for Terminal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Terminal")
            .field("prompt", &self.prompt)
            .field("commands", &self.command_names())
            .finish_non_exhaustive()
    }
}

impl Terminal {
    /// Create a terminal holding only the built-in `help` command.
    pub fn new(prompt: &str, history: Arc<dyn HistoryStore>) -> Arc<Self> {
        Arc::new_cyclic(|weak: &Weak<Terminal>| {
            let weak = Weak::clone(weak);
            let help = Command::unchecked(
                "help",
                "List all available commands.",
                move |_: &Arguments| match weak.upgrade() {
                    Some(terminal) => Ok(CommandOutput::Text(terminal.help_statement())),
                    None => Err(ThymeError::Command("terminal has been dropped".to_string())),
                },
            );
            let mut commands = BTreeMap::new();
            commands.insert(help.name().to_string(), Arc::new(help));
            Terminal {
                prompt: prompt.to_string(),
                commands: RwLock::new(commands),
                history,
            }
        })
    }

    /// Create a terminal and attach `commands` in order (last one wins on a
    /// name clash).
    pub fn with_commands(
        prompt: &str,
        history: Arc<dyn HistoryStore>,
        commands: Vec<Command>,
    ) -> Arc<Self> {
        let terminal = Self::new(prompt, history);
        for command in commands {
            terminal.attach(command);
        }
        terminal
    }

    /// Attach a command. An existing binding under the same name is replaced.
    pub fn attach(&self, command: Command) {
        let mut commands = self.commands.write().unwrap_or_else(PoisonError::into_inner);
        if commands.contains_key(command.name()) {
            log::warn!(
                "command '{}' is already attached to '{}'; overwriting",
                command.name(),
                self.prompt
            );
        }
        commands.insert(command.name().to_string(), Arc::new(command));
    }

    /// Detach a command by name. Unknown names are ignored and the built-in
    /// `help` command stays attached.
    pub fn detach(&self, name: &str) {
        if name == "help" {
            log::warn!("refusing to detach the built-in help command");
            return;
        }
        let mut commands = self.commands.write().unwrap_or_else(PoisonError::into_inner);
        if commands.remove(name).is_some() {
            log::debug!("detached '{name}' from '{}'", self.prompt);
        }
    }

    pub fn command(&self, name: &str) -> Option<Arc<Command>> {
        self.commands
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .map(Arc::clone)
    }

    /// Attached command names, sorted.
    pub fn command_names(&self) -> Vec<String> {
        self.commands
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect()
    }

    /// Help text of every attached command, one block per command.
    pub fn help_statement(&self) -> String {
        let commands = self.commands.read().unwrap_or_else(PoisonError::into_inner);
        commands
            .values()
            .map(|cmd| cmd.help_statement())
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn history(&self) -> &Arc<dyn HistoryStore> {
        &self.history
    }

    /// Wire `child` as a sub-terminal of `self`.
    ///
    /// `self` gains `switch_name`, which enters `child` and answers with
    /// `welcome`; `child` gains `exit`, which returns to the enclosing
    /// terminal. Repeating the call re-binds both commands.
    pub fn create_relation(
        &self,
        child: &Arc<Terminal>,
        switch_name: &str,
        switch_description: &str,
        welcome: &str,
    ) -> Result<()> {
        let target: Arc<dyn InputHandler> = Arc::<Terminal>::clone(child);
        let welcome = welcome.to_string();
        let switch = Command::new(switch_name, switch_description, Vec::new(), move |_| {
            Ok(CommandOutput::Push {
                handler: Arc::clone(&target),
                message: welcome.clone(),
            })
        })?;
        let exit = Command::new("exit", "Exit the current terminal.", Vec::new(), |_| {
            Ok(CommandOutput::Pop {
                message: "Bye!".to_string(),
            })
        })?;

        self.attach(switch);
        child.attach(exit);
        Ok(())
    }
}

/// Terminate non-empty output with a newline.
fn line(text: String) -> String {
    if text.is_empty() { text } else { format!("{text}\n") }
}

impl InputHandler for Terminal {
    fn prompt(&self) -> &str {
        &self.prompt
    }

    fn handle_input(&self, input: &str) -> Outcome {
        let Some(parsed) = tokenize(input) else {
            return Outcome::handled("");
        };

        if let Err(e) = self.history.record(input, Utc::now()) {
            log::warn!("failed to record command history: {e}");
        }

        let Some(command) = self.command(&parsed.command) else {
            log::debug!("'{}': command not found", parsed.command);
            return Outcome::handled(NOT_FOUND);
        };

        match command.invoke(&parsed.positional, &parsed.keywords) {
            Ok(CommandOutput::Text(text)) => Outcome::handled(line(text)),
            Ok(CommandOutput::None) => Outcome::handled(""),
            Ok(CommandOutput::Push { handler, message }) => Outcome {
                output: line(message),
                handled: true,
                action: Some(ContextAction::Push(handler)),
            },
            Ok(CommandOutput::Pop { message }) => Outcome {
                output: line(message),
                handled: true,
                action: Some(ContextAction::Pop),
            },
            Err(e) => {
                log::debug!("'{}' failed: {e}", parsed.command);
                Outcome::handled(format!(
                    "Error executing command '{}': {e}\n",
                    parsed.command
                ))
            },
        }
    }
}
