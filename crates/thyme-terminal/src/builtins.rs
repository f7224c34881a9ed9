//! Commands of the default top-level terminal.

use std::sync::Arc;

use thyme_types::config::TerminalConfig;
use thyme_types::error::Result;

use crate::command::{Command, CommandOutput};
use crate::history::HistoryStore;
use crate::parameter::{DataType, Parameter, Value};
use crate::terminal::Terminal;

/// Entries listed by `history` when no count is given.
pub const DEFAULT_HISTORY_COUNT: i64 = 10;

/// Build the top-level terminal: `clear`, `status`, `history` and `help`.
pub fn default_terminal(
    config: &TerminalConfig,
    history: Arc<dyn HistoryStore>,
) -> Result<Arc<Terminal>> {
    let terminal = Terminal::new(&config.prompt, Arc::clone(&history));
    register_builtins(&terminal, config, history)?;
    Ok(terminal)
}

/// Attach the built-in commands to `terminal`.
pub fn register_builtins(
    terminal: &Terminal,
    config: &TerminalConfig,
    history: Arc<dyn HistoryStore>,
) -> Result<()> {
    terminal.attach(clear_command()?);
    terminal.attach(status_command(&config.welcome)?);
    terminal.attach(history_command(history)?);
    Ok(())
}

// ---------------------------------------------------------------------------
// clear
// ---------------------------------------------------------------------------

fn clear_command() -> Result<Command> {
    Command::new("clear", "Clear the terminal screen.", Vec::new(), |_| {
        Ok(CommandOutput::None)
    })
}

// ---------------------------------------------------------------------------
// status
// ---------------------------------------------------------------------------

fn status_command(welcome: &str) -> Result<Command> {
    let welcome = welcome.to_string();
    Command::new("status", "Get the terminal status.", Vec::new(), move |_| {
        Ok(CommandOutput::Text(welcome.clone()))
    })
}

// ---------------------------------------------------------------------------
// history
// ---------------------------------------------------------------------------

fn history_command(history: Arc<dyn HistoryStore>) -> Result<Command> {
    Command::builder("history")
        .description("Show the most recent commands, newest first.")
        .param(
            Parameter::keyword("count", DataType::Integer, "Number of entries to show.")
                .alias('n')
                .default_value(Value::Integer(DEFAULT_HISTORY_COUNT)),
        )
        .handler(move |args| {
            let count = args.get_int("count").unwrap_or(DEFAULT_HISTORY_COUNT).max(0) as usize;
            let entries = history.recent(count);
            if entries.is_empty() {
                return Ok(CommandOutput::Text("(no history)".to_string()));
            }
            let lines: Vec<String> = entries
                .iter()
                .enumerate()
                .map(|(i, entry)| {
                    format!(
                        "  {:4}  {}  {}",
                        i,
                        entry.timestamp.format("%Y-%m-%d %H:%M:%S"),
                        entry.command
                    )
                })
                .collect();
            Ok(CommandOutput::Text(lines.join("\n")))
        })
        .build()
}
