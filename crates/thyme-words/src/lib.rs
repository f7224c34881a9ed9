//! Vocabulary study service.
//!
//! A [`WordStore`] keeps words, their study strength and synonym links. The
//! words terminal exposes it as commands and is entered from the top-level
//! terminal through a relation.

mod commands;
mod store;

/// Build the words terminal over a store.
pub use commands::words_terminal;
/// The words commands, unattached.
pub use commands::words_commands;
pub use store::{Language, MAX_STRENGTH, Word, WordPage, WordStore, strength_weight};
