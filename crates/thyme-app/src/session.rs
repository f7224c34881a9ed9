//! Wiring of the terminal tree for one process.

use std::sync::Arc;

use thyme_terminal::{InputContextHandler, InputHandler, Terminal, default_terminal, open_history};
use thyme_types::config::ThymeConfig;
use thyme_types::error::Result;
use thyme_words::{WordStore, words_terminal};

/// The terminals of a running session and the stack that routes input.
#[derive(Debug)]
pub struct Session {
    pub root: Arc<Terminal>,
    pub words: Arc<Terminal>,
    pub store: Arc<WordStore>,
    pub context: InputContextHandler,
}

impl Session {
    /// Build the default terminal, the words terminal and their relation.
    pub fn build(config: &ThymeConfig) -> Result<Self> {
        let history = open_history(&config.history)?;
        let store = Arc::new(WordStore::from_path(config.words.store_path.as_deref())?);

        let root = default_terminal(&config.terminal, Arc::clone(&history))?;
        let words = words_terminal(&config.words, Arc::clone(&store), history)?;
        root.create_relation(
            &words,
            &config.words.switch_command,
            &config.words.switch_description,
            &config.words.welcome,
        )?;
        log::debug!(
            "session ready: {} top-level commands, {} words loaded",
            root.command_names().len(),
            store.len()
        );

        let top: Arc<dyn InputHandler> = Arc::<Terminal>::clone(&root);
        let context = InputContextHandler::new(top);
        Ok(Self {
            root,
            words,
            store,
            context,
        })
    }
}
