//! The stack of active terminals.
//!
//! Input goes to the innermost handler first. Commands enter and leave
//! nested terminals by raising a [`ContextAction`], which the stack applies
//! once the handler has returned.
//!
//! The stack is an ordinary value owned by the host. Hosts serving
//! concurrent requests share it behind a `Mutex`, which also serializes the
//! push/pop steps of a single dispatch.

use std::sync::Arc;

use thyme_types::error::{Result, ThymeError};

use crate::terminal::{ContextAction, InputHandler};

/// Final answer for one input line: text with the active prompt appended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub output: String,
    pub handled: bool,
}

/// Routes input lines through a stack of terminals.
pub struct InputContextHandler {
    stack: Vec<Arc<dyn InputHandler>>,
}

impl std::fmt::Debug for InputContextHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let prompts: Vec<&str> = self.stack.iter().map(|h| h.prompt()).collect();
        f.debug_struct("InputContextHandler")
            .field("stack", &prompts)
            .finish()
    }
}

impl InputContextHandler {
    /// Start a stack whose bottom entry is `root`.
    pub fn new(root: Arc<dyn InputHandler>) -> Self {
        Self { stack: vec![root] }
    }

    /// Make `handler` the innermost terminal.
    pub fn push(&mut self, handler: Arc<dyn InputHandler>) {
        log::debug!("entering '{}' (depth {})", handler.prompt(), self.stack.len() + 1);
        self.stack.push(handler);
    }

    /// Remove and return the innermost terminal.
    ///
    /// The root terminal is never removed: popping it is a usage error.
    pub fn pop(&mut self) -> Result<Arc<dyn InputHandler>> {
        if self.stack.len() <= 1 {
            return Err(ThymeError::Context(
                "no terminal to exit to; already at the top level".to_string(),
            ));
        }
        let handler = self
            .stack
            .pop()
            .ok_or_else(|| ThymeError::Context("no input handlers available".to_string()))?;
        log::debug!("left '{}' (depth {})", handler.prompt(), self.stack.len());
        Ok(handler)
    }

    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Handlers from outermost to innermost.
    pub fn handlers(&self) -> &[Arc<dyn InputHandler>] {
        &self.stack
    }

    /// Prompt of the innermost terminal.
    pub fn prompt(&self) -> &str {
        self.stack.last().map_or("", |h| h.prompt())
    }

    /// Route `input` from the innermost terminal outwards until one handles it.
    ///
    /// The handled output is followed by the prompt of whichever terminal is
    /// innermost afterwards. A failed stack request answers with its error
    /// text and `handled = false`.
    pub fn handle_input(&mut self, input: &str) -> Result<Reply> {
        if self.stack.is_empty() {
            return Err(ThymeError::Context("no input handlers available".to_string()));
        }

        for index in (0..self.stack.len()).rev() {
            let handler = Arc::clone(&self.stack[index]);
            let outcome = handler.handle_input(input);
            if !outcome.handled {
                continue;
            }
            if let Some(action) = outcome.action
                && let Err(e) = self.apply(action)
            {
                log::debug!("context request failed: {e}");
                return Ok(Reply {
                    output: e.to_string(),
                    handled: false,
                });
            }
            return Ok(Reply {
                output: format!("{}{}", outcome.output, self.prompt()),
                handled: true,
            });
        }

        Ok(Reply {
            output: String::new(),
            handled: false,
        })
    }

    fn apply(&mut self, action: ContextAction) -> Result<()> {
        match action {
            ContextAction::Push(handler) => {
                self.push(handler);
                Ok(())
            },
            ContextAction::Pop => self.pop().map(|_| ()),
        }
    }
}
