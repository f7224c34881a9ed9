//! Vocabulary store.
//!
//! Words are unique per `(text, language)` and carry a study strength in
//! `0..=5` plus the time they were last seen. Synonym links are symmetric
//! and may cross languages. The store is safe to share between the command
//! handlers of a terminal; when opened from a path it rewrites its JSON file
//! after every mutation. A mutation whose save fails is not applied.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use rand::Rng;
use rand::distributions::{Distribution, WeightedIndex};
use serde::{Deserialize, Serialize};
use thyme_types::error::{Result, ThymeError};

/// Highest study strength a word can reach.
pub const MAX_STRENGTH: u8 = 5;

/// Supported languages, addressed by their two-letter code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Language {
    #[serde(rename = "en")]
    English,
    #[serde(rename = "es")]
    Spanish,
    #[serde(rename = "fr")]
    French,
    #[serde(rename = "de")]
    German,
    #[serde(rename = "it")]
    Italian,
    #[serde(rename = "pt")]
    Portuguese,
    #[serde(rename = "ru")]
    Russian,
    #[serde(rename = "zh")]
    Chinese,
    #[serde(rename = "ja")]
    Japanese,
    #[serde(rename = "ko")]
    Korean,
}

impl Language {
    pub const ALL: [Language; 10] = [
        Language::English,
        Language::Spanish,
        Language::French,
        Language::German,
        Language::Italian,
        Language::Portuguese,
        Language::Russian,
        Language::Chinese,
        Language::Japanese,
        Language::Korean,
    ];

    pub fn code(self) -> &'static str {
        match self {
            Language::English => "en",
            Language::Spanish => "es",
            Language::French => "fr",
            Language::German => "de",
            Language::Italian => "it",
            Language::Portuguese => "pt",
            Language::Russian => "ru",
            Language::Chinese => "zh",
            Language::Japanese => "ja",
            Language::Korean => "ko",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Language::English => "English",
            Language::Spanish => "Spanish",
            Language::French => "French",
            Language::German => "German",
            Language::Italian => "Italian",
            Language::Portuguese => "Portuguese",
            Language::Russian => "Russian",
            Language::Chinese => "Chinese",
            Language::Japanese => "Japanese",
            Language::Korean => "Korean",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Language {
    type Err = ThymeError;

    fn from_str(s: &str) -> Result<Self> {
        Language::ALL
            .into_iter()
            .find(|lang| lang.code() == s)
            .ok_or_else(|| {
                let codes: Vec<&str> = Language::ALL.iter().map(|l| l.code()).collect();
                ThymeError::Words(format!(
                    "Invalid language '{s}'. Must be one of {}.",
                    codes.join(", ")
                ))
            })
    }
}

/// A vocabulary entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Word {
    pub id: u64,
    pub text: String,
    pub language: Language,
    #[serde(default)]
    pub difficulty: i64,
    pub strength: u8,
    pub last_seen: DateTime<Utc>,
    /// Ids of linked words, in any language.
    #[serde(default)]
    pub synonyms: BTreeSet<u64>,
}

impl fmt::Display for Word {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}, {})", self.text, self.language, self.strength)
    }
}

/// One page of a word listing.
#[derive(Debug, Clone, PartialEq)]
pub struct WordPage {
    pub words: Vec<Word>,
    /// 1-based page actually returned.
    pub page: usize,
    pub num_pages: usize,
    pub total: usize,
}

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
struct StoreState {
    next_id: u64,
    words: BTreeMap<u64, Word>,
}

impl StoreState {
    fn find(&self, text: &str, language: Option<Language>) -> Result<u64> {
        let matches: Vec<u64> = self
            .words
            .values()
            .filter(|w| w.text == text && language.is_none_or(|l| w.language == l))
            .map(|w| w.id)
            .collect();
        match (matches.as_slice(), language) {
            ([id], _) => Ok(*id),
            ([], None) => Err(ThymeError::Words(format!("Word '{text}' does not exist."))),
            ([], Some(l)) => Err(ThymeError::Words(format!(
                "Word '{text}' in language '{l}' does not exist."
            ))),
            _ => Err(ThymeError::Words(
                "Multiple words found, please specify a language.".to_string(),
            )),
        }
    }

    fn word_mut(&mut self, id: u64) -> Result<&mut Word> {
        self.words
            .get_mut(&id)
            .ok_or_else(|| ThymeError::Words(format!("No word with id {id}.")))
    }

    fn get_or_insert(&mut self, text: &str, language: Language, now: DateTime<Utc>) -> u64 {
        if let Ok(id) = self.find(text, Some(language)) {
            return id;
        }
        self.insert(text, language, 0, now)
    }

    fn insert(&mut self, text: &str, language: Language, strength: u8, now: DateTime<Utc>) -> u64 {
        self.next_id += 1;
        let id = self.next_id;
        self.words.insert(
            id,
            Word {
                id,
                text: text.to_string(),
                language,
                difficulty: 0,
                strength: strength.min(MAX_STRENGTH),
                last_seen: now,
                synonyms: BTreeSet::new(),
            },
        );
        id
    }

    fn link(&mut self, a: u64, b: u64) -> Result<()> {
        if a == b {
            return Err(ThymeError::Words(
                "A word cannot be a synonym of itself.".to_string(),
            ));
        }
        self.word_mut(b)?;
        self.word_mut(a)?.synonyms.insert(b);
        self.word_mut(b)?.synonyms.insert(a);
        Ok(())
    }

    fn unlink(&mut self, a: u64, b: u64) {
        if let Some(w) = self.words.get_mut(&a) {
            w.synonyms.remove(&b);
        }
        if let Some(w) = self.words.get_mut(&b) {
            w.synonyms.remove(&a);
        }
    }

    /// Words sorted by `(language, text)`, optionally limited to one language.
    fn sorted(&self, language: Option<Language>) -> Vec<&Word> {
        let mut words: Vec<&Word> = self
            .words
            .values()
            .filter(|w| language.is_none_or(|l| w.language == l))
            .collect();
        words.sort_by(|a, b| (a.language, &a.text).cmp(&(b.language, &b.text)));
        words
    }
}

/// Seconds since `last_seen`, never negative.
fn elapsed_secs(last_seen: DateTime<Utc>, now: DateTime<Utc>) -> f64 {
    ((now - last_seen).num_milliseconds() as f64 / 1000.0).max(0.0)
}

/// Logistic falloff that favours weak words: ~0.97 at strength 0, ~3e-8 at 3.
pub fn strength_weight(strength: u8) -> f64 {
    1.0 / (1.0 + 1000f64.powf(f64::from(strength) - 0.5))
}

/// Thread-safe vocabulary store with optional JSON persistence.
#[derive(Debug)]
pub struct WordStore {
    state: Mutex<StoreState>,
    path: Option<PathBuf>,
}

impl Default for WordStore {
    fn default() -> Self {
        Self::in_memory()
    }
}

impl WordStore {
    pub fn in_memory() -> Self {
        Self {
            state: Mutex::new(StoreState::default()),
            path: None,
        }
    }

    /// Open a store backed by `path`. A missing file starts an empty store.
    pub fn open(path: &Path) -> Result<Self> {
        let state = if path.exists() {
            let text = std::fs::read_to_string(path)?;
            serde_json::from_str(&text).map_err(|e| {
                ThymeError::Words(format!("{}: corrupt word store: {e}", path.display()))
            })?
        } else {
            StoreState::default()
        };
        log::debug!("opened word store {} ({} words)", path.display(), state.words.len());
        Ok(Self {
            state: Mutex::new(state),
            path: Some(path.to_path_buf()),
        })
    }

    /// Open from `path` when given, otherwise in memory.
    pub fn from_path(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::open(path),
            None => Ok(Self::in_memory()),
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn lock(&self) -> MutexGuard<'_, StoreState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn persist(&self, state: &StoreState) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, serde_json::to_string_pretty(state)?)?;
        log::trace!("saved {} words to {}", state.words.len(), path.display());
        Ok(())
    }

    /// Apply `change` to a copy of the state and keep it only once saved.
    fn commit<T>(&self, change: impl FnOnce(&mut StoreState) -> Result<T>) -> Result<T> {
        let mut state = self.lock();
        let mut next = state.clone();
        let out = change(&mut next)?;
        self.persist(&next)?;
        *state = next;
        Ok(out)
    }

    pub fn len(&self) -> usize {
        self.lock().words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Create the word or overwrite its strength and last-seen time.
    /// Returns the stored word and whether it was newly created.
    pub fn upsert(
        &self,
        text: &str,
        language: Language,
        strength: u8,
        last_seen: Option<DateTime<Utc>>,
    ) -> Result<(Word, bool)> {
        if text.trim().is_empty() {
            return Err(ThymeError::Words("A word cannot be empty.".to_string()));
        }
        let last_seen = last_seen.unwrap_or_else(Utc::now);
        let (word, created) = self.commit(|state| {
            let (id, created) = match state.find(text, Some(language)) {
                Ok(id) => {
                    let word = state.word_mut(id)?;
                    word.strength = strength.min(MAX_STRENGTH);
                    word.last_seen = last_seen;
                    (id, false)
                },
                Err(_) => (state.insert(text, language, strength, last_seen), true),
            };
            Ok((state.word_mut(id)?.clone(), created))
        })?;
        log::debug!("{} word {word}", if created { "created" } else { "updated" });
        Ok((word, created))
    }

    /// Look a word up. Without a language the text must be unambiguous.
    pub fn get(&self, text: &str, language: Option<Language>) -> Result<Word> {
        let mut state = self.lock();
        let id = state.find(text, language)?;
        Ok(state.word_mut(id)?.clone())
    }

    pub fn get_by_id(&self, id: u64) -> Option<Word> {
        self.lock().words.get(&id).cloned()
    }

    /// Delete a word and every synonym link to it.
    pub fn remove(&self, text: &str, language: Option<Language>) -> Result<Word> {
        self.commit(|state| {
            let id = state.find(text, language)?;
            let word = state
                .words
                .remove(&id)
                .ok_or_else(|| ThymeError::Words(format!("No word with id {id}.")))?;
            for other in &word.synonyms {
                state.unlink(id, *other);
            }
            Ok(word)
        })
    }

    /// Change the text of a word, keeping its links and statistics.
    pub fn rename(&self, text: &str, language: Language, new_text: &str) -> Result<Word> {
        if new_text.trim().is_empty() {
            return Err(ThymeError::Words("A word cannot be empty.".to_string()));
        }
        self.commit(|state| {
            let id = state.find(text, Some(language))?;
            if text != new_text && state.find(new_text, Some(language)).is_ok() {
                return Err(ThymeError::Words(format!(
                    "Word '{new_text}' already exists in language '{language}'."
                )));
            }
            let word = state.word_mut(id)?;
            word.text = new_text.to_string();
            Ok(word.clone())
        })
    }

    /// Link two words as synonyms of each other.
    pub fn add_synonym(&self, word: u64, synonym: u64) -> Result<()> {
        self.commit(|state| state.link(word, synonym))
    }

    /// Replace the synonyms of `text` in `synonym_language` with
    /// `synonyms`, creating missing words. Links to other languages are
    /// kept. Returns the word and its new synonyms in that language.
    pub fn set_synonyms(
        &self,
        text: &str,
        language: Language,
        synonyms: &[&str],
        synonym_language: Language,
    ) -> Result<(Word, Vec<Word>)> {
        let now = Utc::now();
        self.commit(|state| {
            let id = state.find(text, Some(language))?;

            let stale: Vec<u64> = state.word_mut(id)?.synonyms.iter().copied().collect();
            for other in stale {
                if state.words.get(&other).is_some_and(|w| w.language == synonym_language) {
                    state.unlink(id, other);
                }
            }

            let mut linked = Vec::new();
            for synonym in synonyms.iter().map(|s| s.trim()).filter(|s| !s.is_empty()) {
                let other = state.get_or_insert(synonym, synonym_language, now);
                match state.link(id, other) {
                    Ok(()) => linked.push(other),
                    Err(e) => log::debug!("skipping synonym '{synonym}': {e}"),
                }
            }

            let word = state.word_mut(id)?.clone();
            let linked = linked
                .into_iter()
                .filter_map(|other| state.words.get(&other).cloned())
                .collect();
            Ok((word, linked))
        })
    }

    /// Linked words of `word`, optionally limited to one language, sorted by text.
    pub fn synonyms_of(&self, word: &Word, language: Option<Language>) -> Vec<Word> {
        let state = self.lock();
        let mut out: Vec<Word> = word
            .synonyms
            .iter()
            .filter_map(|id| state.words.get(id))
            .filter(|w| language.is_none_or(|l| w.language == l))
            .cloned()
            .collect();
        out.sort_by(|a, b| a.text.cmp(&b.text));
        out
    }

    /// Raise a word's strength by one (capped) and mark it as seen.
    pub fn increase_strength(&self, text: &str, language: Option<Language>) -> Result<Word> {
        self.train(text, language, |s| (s + 1).min(MAX_STRENGTH))
    }

    /// Lower a word's strength by one (floored at zero) and mark it as seen.
    pub fn decrease_strength(&self, text: &str, language: Option<Language>) -> Result<Word> {
        self.train(text, language, |s| s.saturating_sub(1))
    }

    fn train(&self, text: &str, language: Option<Language>, step: fn(u8) -> u8) -> Result<Word> {
        self.commit(|state| {
            let id = state.find(text, language)?;
            let word = state.word_mut(id)?;
            word.strength = step(word.strength);
            word.last_seen = Utc::now();
            Ok(word.clone())
        })
    }

    /// Page through words sorted by `(language, text)`.
    ///
    /// Pages are 1-based; page 0 is treated as 1 and a page past the end as
    /// the last page. An empty listing still has one (empty) page.
    pub fn page(
        &self,
        language: Option<Language>,
        page: usize,
        per_page: usize,
    ) -> Result<WordPage> {
        if per_page == 0 {
            return Err(ThymeError::Words("Words per page must be at least 1.".to_string()));
        }
        let state = self.lock();
        let words = state.sorted(language);
        let total = words.len();
        let num_pages = total.div_ceil(per_page).max(1);
        let page = page.clamp(1, num_pages);
        let words = words
            .into_iter()
            .skip((page - 1) * per_page)
            .take(per_page)
            .cloned()
            .collect();
        Ok(WordPage {
            words,
            page,
            num_pages,
            total,
        })
    }

    /// `(word, synonym)` text pairs from `language` into
    /// `translation_language`, at most `max` of them.
    pub fn synonym_pairs(
        &self,
        language: Language,
        translation_language: Language,
        max: usize,
    ) -> Vec<(String, String)> {
        let state = self.lock();
        let mut pairs = Vec::new();
        for word in state.sorted(Some(language)) {
            let mut synonyms: Vec<&Word> = word
                .synonyms
                .iter()
                .filter_map(|id| state.words.get(id))
                .filter(|w| w.language == translation_language)
                .collect();
            synonyms.sort_by(|a, b| a.text.cmp(&b.text));
            for synonym in synonyms {
                if pairs.len() >= max {
                    return pairs;
                }
                pairs.push((word.text.clone(), synonym.text.clone()));
            }
        }
        pairs
    }

    /// Selection weight of every word in `language` (or all words) at `now`.
    pub fn weights(&self, language: Option<Language>, now: DateTime<Utc>) -> Vec<(Word, f64)> {
        let state = self.lock();
        let words = state.sorted(language);

        let mut max_elapsed: BTreeMap<Language, f64> = BTreeMap::new();
        for word in state.words.values() {
            let elapsed = elapsed_secs(word.last_seen, now);
            let entry = max_elapsed.entry(word.language).or_insert(0.0);
            *entry = entry.max(elapsed);
        }

        words
            .into_iter()
            .map(|word| {
                let mut elapsed = elapsed_secs(word.last_seen, now);
                let max = max_elapsed.get(&word.language).copied().unwrap_or(0.0);
                if max > 0.0 {
                    elapsed /= max;
                }
                (word.clone(), strength_weight(word.strength) * elapsed)
            })
            .collect()
    }

    /// Pick a word at random, favouring weak words that have not been seen
    /// for a long time. Falls back to a uniform pick when every weight is
    /// zero.
    pub fn weighted_random<R: Rng + ?Sized>(
        &self,
        language: Option<Language>,
        rng: &mut R,
    ) -> Result<Word> {
        let mut weighted = self.weights(language, Utc::now());
        if weighted.is_empty() {
            return Err(ThymeError::Words("No words found.".to_string()));
        }
        let index = match WeightedIndex::new(weighted.iter().map(|(_, w)| *w)) {
            Ok(dist) => dist.sample(rng),
            Err(e) => {
                log::debug!("falling back to uniform pick: {e}");
                rng.gen_range(0..weighted.len())
            },
        };
        Ok(weighted.swap_remove(index).0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
    }

    fn seeded() -> WordStore {
        let store = WordStore::in_memory();
        store.upsert("cat", Language::English, 0, None).unwrap();
        store.upsert("gato", Language::Spanish, 0, None).unwrap();
        store.upsert("chat", Language::French, 0, None).unwrap();
        store.upsert("dog", Language::English, 0, None).unwrap();
        store
    }

    #[test]
    fn language_codes_parse() {
        assert_eq!("es".parse::<Language>().unwrap(), Language::Spanish);
        assert_eq!(Language::Korean.to_string(), "ko");
        assert_eq!(Language::German.display_name(), "German");
        let err = "xx".parse::<Language>().unwrap_err().to_string();
        assert!(err.starts_with("Invalid language 'xx'. Must be one of en, es, fr"));
    }

    #[test]
    fn upsert_creates_then_updates() {
        let store = WordStore::in_memory();
        let (word, created) = store.upsert("cat", Language::English, 2, None).unwrap();
        assert!(created);
        assert_eq!(word.strength, 2);
        let (again, created) = store.upsert("cat", Language::English, 9, None).unwrap();
        assert!(!created);
        assert_eq!(again.id, word.id);
        assert_eq!(again.strength, MAX_STRENGTH);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn same_text_in_two_languages() {
        let store = WordStore::in_memory();
        store.upsert("chat", Language::English, 0, None).unwrap();
        store.upsert("chat", Language::French, 0, None).unwrap();
        assert_eq!(store.len(), 2);
        let err = store.get("chat", None).unwrap_err().to_string();
        assert_eq!(err, "Multiple words found, please specify a language.");
        assert_eq!(
            store.get("chat", Some(Language::French)).unwrap().language,
            Language::French
        );
    }

    #[test]
    fn missing_word_messages() {
        let store = seeded();
        assert_eq!(
            store.get("bird", None).unwrap_err().to_string(),
            "Word 'bird' does not exist."
        );
        assert_eq!(
            store.get("cat", Some(Language::Spanish)).unwrap_err().to_string(),
            "Word 'cat' in language 'es' does not exist."
        );
    }

    #[test]
    fn empty_word_rejected() {
        let store = WordStore::in_memory();
        assert!(store.upsert("  ", Language::English, 0, None).is_err());
    }

    #[test]
    fn remove_drops_links() {
        let store = seeded();
        let cat = store.get("cat", None).unwrap();
        let gato = store.get("gato", None).unwrap();
        store.add_synonym(cat.id, gato.id).unwrap();
        store.remove("gato", Some(Language::Spanish)).unwrap();
        let cat = store.get("cat", None).unwrap();
        assert!(cat.synonyms.is_empty());
        assert!(store.get("gato", None).is_err());
    }

    #[test]
    fn rename_keeps_identity() {
        let store = seeded();
        let cat = store.get("cat", None).unwrap();
        let renamed = store.rename("cat", Language::English, "kitty").unwrap();
        assert_eq!(renamed.id, cat.id);
        assert!(store.get("cat", None).is_err());
        let err = store.rename("kitty", Language::English, "dog").unwrap_err();
        assert!(err.to_string().contains("already exists"));
    }

    #[test]
    fn synonyms_are_symmetric_and_not_reflexive() {
        let store = seeded();
        let cat = store.get("cat", None).unwrap();
        let gato = store.get("gato", None).unwrap();
        store.add_synonym(cat.id, gato.id).unwrap();
        assert!(store.get_by_id(gato.id).unwrap().synonyms.contains(&cat.id));
        let err = store.add_synonym(cat.id, cat.id).unwrap_err();
        assert_eq!(err.to_string(), "A word cannot be a synonym of itself.");
    }

    #[test]
    fn set_synonyms_replaces_one_language() {
        let store = seeded();
        store
            .set_synonyms("cat", Language::English, &["gato", "minino"], Language::Spanish)
            .unwrap();
        store
            .set_synonyms("cat", Language::English, &["chat"], Language::French)
            .unwrap();
        let (cat, linked) = store
            .set_synonyms("cat", Language::English, &["michi"], Language::Spanish)
            .unwrap();
        assert_eq!(linked.len(), 1);
        assert_eq!(linked[0].text, "michi");

        let spanish: Vec<String> = store
            .synonyms_of(&cat, Some(Language::Spanish))
            .into_iter()
            .map(|w| w.text)
            .collect();
        assert_eq!(spanish, vec!["michi"]);
        assert_eq!(store.synonyms_of(&cat, Some(Language::French)).len(), 1);
        // Replaced words stay in the store.
        assert!(store.get("minino", Some(Language::Spanish)).is_ok());
    }

    #[test]
    fn set_synonyms_skips_self() {
        let store = seeded();
        let (_, linked) = store
            .set_synonyms("cat", Language::English, &["cat", "kitty"], Language::English)
            .unwrap();
        let texts: Vec<&str> = linked.iter().map(|w| w.text.as_str()).collect();
        assert_eq!(texts, vec!["kitty"]);
    }

    #[test]
    fn strength_is_clamped() {
        let store = seeded();
        for _ in 0..8 {
            store.increase_strength("cat", None).unwrap();
        }
        assert_eq!(store.get("cat", None).unwrap().strength, MAX_STRENGTH);
        for _ in 0..8 {
            store.decrease_strength("cat", None).unwrap();
        }
        assert_eq!(store.get("cat", None).unwrap().strength, 0);
    }

    #[test]
    fn training_marks_word_seen() {
        let store = WordStore::in_memory();
        store.upsert("cat", Language::English, 0, Some(at(0))).unwrap();
        let word = store.increase_strength("cat", None).unwrap();
        assert!(word.last_seen > at(0));
    }

    #[test]
    fn paging_clamps() {
        let store = seeded();
        let page = store.page(None, 1, 3).unwrap();
        assert_eq!(page.num_pages, 2);
        assert_eq!(page.total, 4);
        let texts: Vec<&str> = page.words.iter().map(|w| w.text.as_str()).collect();
        assert_eq!(texts, vec!["cat", "dog", "gato"]);

        let last = store.page(None, 99, 3).unwrap();
        assert_eq!(last.page, 2);
        assert_eq!(last.words.len(), 1);
        assert_eq!(store.page(None, 0, 3).unwrap().page, 1);

        let english = store.page(Some(Language::English), 1, 10).unwrap();
        assert_eq!(english.total, 2);
        assert!(store.page(None, 1, 0).is_err());
    }

    #[test]
    fn empty_listing_has_one_page() {
        let page = WordStore::in_memory().page(None, 3, 10).unwrap();
        assert_eq!((page.page, page.num_pages, page.total), (1, 1, 0));
    }

    #[test]
    fn synonym_pairs_respect_max() {
        let store = seeded();
        store
            .set_synonyms("cat", Language::English, &["gato", "minino"], Language::Spanish)
            .unwrap();
        store
            .set_synonyms("dog", Language::English, &["perro"], Language::Spanish)
            .unwrap();
        let pairs = store.synonym_pairs(Language::English, Language::Spanish, 10);
        assert_eq!(
            pairs,
            vec![
                ("cat".to_string(), "gato".to_string()),
                ("cat".to_string(), "minino".to_string()),
                ("dog".to_string(), "perro".to_string()),
            ]
        );
        assert_eq!(store.synonym_pairs(Language::English, Language::Spanish, 2).len(), 2);
        assert!(store.synonym_pairs(Language::English, Language::French, 10).is_empty());
    }

    #[test]
    fn weights_favour_weak_and_stale() {
        let store = WordStore::in_memory();
        let now = Utc::now();
        store
            .upsert("old", Language::English, 0, Some(now - Duration::days(10)))
            .unwrap();
        store
            .upsert("fresh", Language::English, 0, Some(now - Duration::days(1)))
            .unwrap();
        store
            .upsert("strong", Language::English, 5, Some(now - Duration::days(10)))
            .unwrap();
        let weights: BTreeMap<String, f64> = store
            .weights(Some(Language::English), now)
            .into_iter()
            .map(|(w, p)| (w.text, p))
            .collect();
        assert!(weights["old"] > weights["fresh"]);
        assert!(weights["old"] > weights["strong"]);
        assert!((weights["old"] - strength_weight(0)).abs() < 1e-9);
    }

    #[test]
    fn random_pick_from_empty_selection_fails() {
        let store = seeded();
        let mut rng = StdRng::seed_from_u64(7);
        let err = store
            .weighted_random(Some(Language::Korean), &mut rng)
            .unwrap_err();
        assert_eq!(err.to_string(), "No words found.");
    }

    #[test]
    fn random_pick_stays_in_language() {
        let store = seeded();
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..20 {
            let word = store.weighted_random(Some(Language::English), &mut rng).unwrap();
            assert_eq!(word.language, Language::English);
        }
    }

    #[test]
    fn zero_weights_fall_back_to_uniform() {
        let store = WordStore::in_memory();
        let future = Utc::now() + Duration::days(1);
        store.upsert("a", Language::English, 0, Some(future)).unwrap();
        store.upsert("b", Language::English, 0, Some(future)).unwrap();
        let mut rng = StdRng::seed_from_u64(1);
        let word = store.weighted_random(None, &mut rng).unwrap();
        assert!(word.text == "a" || word.text == "b");
    }

    #[test]
    fn persists_to_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("words").join("store.json");
        {
            let store = WordStore::open(&path).unwrap();
            store.upsert("cat", Language::English, 3, None).unwrap();
            store
                .set_synonyms("cat", Language::English, &["gato"], Language::Spanish)
                .unwrap();
        }
        let store = WordStore::open(&path).unwrap();
        assert_eq!(store.len(), 2);
        let cat = store.get("cat", None).unwrap();
        assert_eq!(cat.strength, 3);
        assert_eq!(store.synonyms_of(&cat, None)[0].text, "gato");
        let (dog, _) = store.upsert("dog", Language::English, 0, None).unwrap();
        assert!(dog.id > cat.id);
    }

    #[test]
    fn failed_save_leaves_store_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let sub = dir.path().join("sub");
        let store = WordStore::open(&sub.join("store.json")).unwrap();
        store.upsert("cat", Language::English, 2, Some(at(0))).unwrap();

        // The store directory turns into a plain file, so every save fails.
        std::fs::remove_dir_all(&sub).unwrap();
        std::fs::write(&sub, "in the way").unwrap();

        assert!(store.upsert("dog", Language::English, 0, None).is_err());
        assert!(store.increase_strength("cat", None).is_err());
        assert!(store.rename("cat", Language::English, "kitten").is_err());
        assert!(
            store
                .set_synonyms("cat", Language::English, &["gato"], Language::Spanish)
                .is_err()
        );
        assert!(store.remove("cat", None).is_err());

        assert_eq!(store.len(), 1);
        let cat = store.get("cat", None).unwrap();
        assert_eq!(cat.strength, 2);
        assert_eq!(cat.last_seen, at(0));
        assert!(cat.synonyms.is_empty());
        assert!(store.get("dog", None).is_err());
    }

    #[test]
    fn corrupt_store_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        std::fs::write(&path, "{ nope").unwrap();
        let err = WordStore::open(&path).unwrap_err().to_string();
        assert!(err.contains("corrupt word store"));
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn strength_weight_decreases(s in 0u8..MAX_STRENGTH) {
                prop_assert!(strength_weight(s) > strength_weight(s + 1));
                prop_assert!(strength_weight(s) > 0.0);
            }

            #[test]
            fn pages_cover_every_word_once(n in 0usize..30, per_page in 1usize..8) {
                let store = WordStore::in_memory();
                for i in 0..n {
                    store.upsert(&format!("w{i:02}"), Language::English, 0, None).unwrap();
                }
                let first = store.page(None, 1, per_page).unwrap();
                let mut seen = Vec::new();
                for page in 1..=first.num_pages {
                    let words = store.page(None, page, per_page).unwrap().words;
                    seen.extend(words.into_iter().map(|w| w.id));
                }
                prop_assert_eq!(seen.len(), n);
                seen.dedup();
                prop_assert_eq!(seen.len(), n);
            }
        }
    }
}
