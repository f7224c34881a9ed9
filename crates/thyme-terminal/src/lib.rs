//! Command terminal subsystem.
//!
//! A terminal is a named-command dispatcher. Commands declare typed
//! parameters and are attached to a terminal by name. Input lines are
//! tokenized, validated against the declared parameters and dispatched to
//! the bound handler. Terminals nest: an [`InputContextHandler`] keeps the
//! stack of active terminals and routes each line from the innermost one
//! outwards.

mod builtins;
mod command;
mod context;
mod history;
mod parameter;
mod terminal;
mod tokenizer;

/// Build the default top-level terminal (clear, status, history, help).
pub use builtins::default_terminal;
/// Attach the built-in commands to an existing terminal.
pub use builtins::register_builtins;
/// Validated typed arguments handed to a command handler.
pub use command::Arguments;
/// A named command bound to a handler and a parameter list.
pub use command::Command;
/// Step-by-step command construction.
pub use command::CommandBuilder;
/// Output produced by a command (text, nothing, context-stack signals).
pub use command::CommandOutput;
/// Callable type stored by a command.
pub use command::Handler;
/// Stack of active terminals.
pub use context::InputContextHandler;
/// Final text and handled flag for one input line.
pub use context::Reply;
/// File-backed history (JSON lines).
pub use history::FileHistory;
/// One recorded input line.
pub use history::HistoryEntry;
/// Storage for recorded input lines.
pub use history::HistoryStore;
/// In-memory history.
pub use history::MemoryHistory;
/// Build the history store selected by configuration.
pub use history::open_history;
pub use parameter::{DataType, Parameter, Value};
/// Request from a command to change the context stack.
pub use terminal::ContextAction;
/// Anything that can handle an input line.
pub use terminal::InputHandler;
/// Text returned when no command matches.
pub use terminal::NOT_FOUND;
/// Result of one terminal handling a line.
pub use terminal::Outcome;
/// A command namespace with a prompt.
pub use terminal::Terminal;
pub use tokenizer::{ParsedLine, RawValue, tokenize};
