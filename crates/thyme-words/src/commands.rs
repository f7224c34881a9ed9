//! Commands of the words study terminal.

use std::sync::Arc;

use thyme_terminal::{
    Arguments, Command, CommandOutput, DataType, HistoryStore, Parameter, Terminal, Value,
};
use thyme_types::config::WordsConfig;
use thyme_types::error::{Result, ThymeError};

use crate::store::{Language, WordStore};

/// Build the words terminal over `store`.
pub fn words_terminal(
    config: &WordsConfig,
    store: Arc<WordStore>,
    history: Arc<dyn HistoryStore>,
) -> Result<Arc<Terminal>> {
    Ok(Terminal::with_commands(
        &config.prompt,
        history,
        words_commands(&store)?,
    ))
}

/// Every words command bound to `store`.
pub fn words_commands(store: &Arc<WordStore>) -> Result<Vec<Command>> {
    Ok(vec![
        add_command(Arc::clone(store))?,
        remove_command(Arc::clone(store))?,
        update_command(Arc::clone(store))?,
        find_command(Arc::clone(store))?,
        list_command(Arc::clone(store))?,
        random_command(Arc::clone(store))?,
        synonyms_command(Arc::clone(store))?,
        list_synonyms_command(Arc::clone(store))?,
        train_command(Arc::clone(store))?,
    ])
}

fn word_param(description: &str) -> Parameter {
    Parameter::positional("word", DataType::String, description)
}

fn language_param(description: &str) -> Parameter {
    Parameter::keyword("language", DataType::String, description).alias('l')
}

fn optional_language(args: &Arguments) -> Result<Option<Language>> {
    args.get_str("language").map(str::parse).transpose()
}

fn required_language(args: &Arguments, name: &str) -> Result<Language> {
    args.required_str(name)?.parse()
}

fn count(args: &Arguments, name: &str) -> Result<usize> {
    let n = args
        .get_int(name)
        .ok_or_else(|| ThymeError::MissingParameter(name.to_string()))?;
    usize::try_from(n).map_err(|_| ThymeError::InvalidValue {
        name: name.to_string(),
        expected: "non-negative integer".to_string(),
        value: n.to_string(),
    })
}

// ---------------------------------------------------------------------------
// add
// ---------------------------------------------------------------------------

fn add_command(store: Arc<WordStore>) -> Result<Command> {
    Command::builder("add")
        .description("Add or update a word in the database.")
        .param(word_param("The word to add or update."))
        .param(
            language_param("The language of the word.")
                .default_value(Value::String(Language::English.code().to_string())),
        )
        .handler(move |args| {
            let text = args.required_str("word")?;
            let language = required_language(args, "language")?;
            let (word, created) = store.upsert(text, language, 0, None)?;
            let verb = if created { "added" } else { "updated" };
            Ok(CommandOutput::Text(format!(
                "Word '{}' {verb} in language '{}'.",
                word.text, word.language
            )))
        })
        .build()
}

// ---------------------------------------------------------------------------
// remove
// ---------------------------------------------------------------------------

fn remove_command(store: Arc<WordStore>) -> Result<Command> {
    Command::builder("remove")
        .description("Remove a word from the database.")
        .param(word_param("The word to remove."))
        .param(language_param("The language of the word to remove."))
        .handler(move |args| {
            let text = args.required_str("word")?;
            store.remove(text, optional_language(args)?)?;
            Ok(CommandOutput::Text(format!("Word '{text}' removed successfully.")))
        })
        .build()
}

// ---------------------------------------------------------------------------
// update
// ---------------------------------------------------------------------------

fn update_command(store: Arc<WordStore>) -> Result<Command> {
    Command::builder("update")
        .description("Update a word in the database.")
        .param(word_param("The word to update."))
        .param(Parameter::positional(
            "new_word",
            DataType::String,
            "The new spelling.",
        ))
        .param(
            language_param("The language of the word.")
                .default_value(Value::String(Language::English.code().to_string())),
        )
        .handler(move |args| {
            let text = args.required_str("word")?;
            let new_text = args.required_str("new_word")?;
            let language = required_language(args, "language")?;
            store.rename(text, language, new_text)?;
            Ok(CommandOutput::Text(format!(
                "Word '{text}' updated to '{new_text}' in language '{language}'."
            )))
        })
        .build()
}

// ---------------------------------------------------------------------------
// find
// ---------------------------------------------------------------------------

fn find_command(store: Arc<WordStore>) -> Result<Command> {
    Command::builder("find")
        .description("Show a word with its strength and synonyms.")
        .param(word_param("The word to look up."))
        .param(language_param("The language of the word."))
        .handler(move |args| {
            let word = store.get(args.required_str("word")?, optional_language(args)?)?;
            let synonyms = store.synonyms_of(&word, None);
            let mut out = format!(
                "{} ({})\n  strength: {}\n  last seen: {}",
                word.text,
                word.language.display_name(),
                word.strength,
                word.last_seen.format("%Y-%m-%d %H:%M:%S")
            );
            if !synonyms.is_empty() {
                let list: Vec<String> = synonyms
                    .iter()
                    .map(|s| format!("{} ({})", s.text, s.language))
                    .collect();
                out.push_str(&format!("\n  synonyms: {}", list.join(", ")));
            }
            Ok(CommandOutput::Text(out))
        })
        .build()
}

// ---------------------------------------------------------------------------
// list
// ---------------------------------------------------------------------------

fn list_command(store: Arc<WordStore>) -> Result<Command> {
    Command::builder("list")
        .description("List the words in the database, one page at a time.")
        .param(language_param("Only list words in this language."))
        .param(
            Parameter::keyword("page", DataType::Integer, "Page to show.")
                .alias('p')
                .default_value(Value::Integer(1)),
        )
        .param(
            Parameter::keyword("per_page", DataType::Integer, "Words per page.")
                .alias('n')
                .default_value(Value::Integer(10)),
        )
        .handler(move |args| {
            let language = optional_language(args)?;
            let page = store.page(language, count(args, "page")?, count(args, "per_page")?)?;
            if page.total == 0 {
                return Ok(CommandOutput::Text(match language {
                    Some(l) => format!("No words found for language '{l}'."),
                    None => "No words found.".to_string(),
                }));
            }
            let mut lines: Vec<String> = page.words.iter().map(ToString::to_string).collect();
            lines.push(format!(
                "Page {} of {} ({} words)",
                page.page, page.num_pages, page.total
            ));
            Ok(CommandOutput::Text(lines.join("\n")))
        })
        .build()
}

// ---------------------------------------------------------------------------
// random
// ---------------------------------------------------------------------------

fn random_command(store: Arc<WordStore>) -> Result<Command> {
    Command::builder("random")
        .description("Pick a word to study, favouring weak and stale words.")
        .param(language_param("Only pick words in this language."))
        .handler(move |args| {
            let word = store.weighted_random(optional_language(args)?, &mut rand::thread_rng())?;
            Ok(CommandOutput::Text(word.to_string()))
        })
        .build()
}

// ---------------------------------------------------------------------------
// synonyms
// ---------------------------------------------------------------------------

fn synonyms_command(store: Arc<WordStore>) -> Result<Command> {
    Command::builder("synonyms")
        .description("Replace the synonyms of a word in one language.")
        .param(word_param("The word whose synonyms to set."))
        .param(Parameter::positional(
            "language",
            DataType::String,
            "The language of the word.",
        ))
        .param(Parameter::positional(
            "synonyms",
            DataType::String,
            "Comma-separated synonyms.",
        ))
        .param(Parameter::positional(
            "synonym_language",
            DataType::String,
            "The language of the synonyms.",
        ))
        .handler(move |args| {
            let text = args.required_str("word")?;
            let language = required_language(args, "language")?;
            let synonym_language = required_language(args, "synonym_language")?;
            let list: Vec<&str> = args.required_str("synonyms")?.split(',').collect();
            let (word, linked) = store.set_synonyms(text, language, &list, synonym_language)?;
            let names: Vec<&str> = linked.iter().map(|w| w.text.as_str()).collect();
            Ok(CommandOutput::Text(format!(
                "Synonyms of '{}' in '{synonym_language}': {}",
                word.text,
                if names.is_empty() { "(none)".to_string() } else { names.join(", ") }
            )))
        })
        .build()
}

// ---------------------------------------------------------------------------
// list_synonyms
// ---------------------------------------------------------------------------

fn list_synonyms_command(store: Arc<WordStore>) -> Result<Command> {
    Command::builder("list_synonyms")
        .description("List words of one language with their synonyms in another.")
        .param(Parameter::positional(
            "language",
            DataType::String,
            "The language of the words.",
        ))
        .param(Parameter::positional(
            "translation_language",
            DataType::String,
            "The language of the synonyms.",
        ))
        .param(
            Parameter::keyword("max", DataType::Integer, "Maximum number of pairs.")
                .default_value(Value::Integer(10)),
        )
        .handler(move |args| {
            let language = required_language(args, "language")?;
            let translation = required_language(args, "translation_language")?;
            let pairs = store.synonym_pairs(language, translation, count(args, "max")?);
            if pairs.is_empty() {
                return Ok(CommandOutput::Text(format!(
                    "No synonyms found for language '{language}' and translation language \
                     '{translation}'."
                )));
            }
            let lines: Vec<String> = pairs
                .into_iter()
                .map(|(word, synonym)| format!("{word} -> {synonym}"))
                .collect();
            Ok(CommandOutput::Text(lines.join("\n")))
        })
        .build()
}

// ---------------------------------------------------------------------------
// train
// ---------------------------------------------------------------------------

fn train_command(store: Arc<WordStore>) -> Result<Command> {
    Command::builder("train")
        .description("Record a study answer for a word.")
        .param(word_param("The word that was studied."))
        .param(language_param("The language of the word."))
        .param(Parameter::flag("correct", "The word was recalled."))
        .param(Parameter::flag("wrong", "The word was missed."))
        .handler(move |args| {
            let text = args.required_str("word")?;
            let language = optional_language(args)?;
            let word = match (args.flag("correct"), args.flag("wrong")) {
                (true, true) => {
                    return Err(ThymeError::Command(
                        "Use either --correct or --wrong, not both.".to_string(),
                    ));
                },
                (true, false) => store.increase_strength(text, language)?,
                (false, true) => store.decrease_strength(text, language)?,
                (false, false) => store.get(text, language)?,
            };
            Ok(CommandOutput::Text(format!(
                "'{}' ({}) strength: {}",
                word.text, word.language, word.strength
            )))
        })
        .build()
}
