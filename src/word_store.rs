//! Registry of known words and their sentence templates.
//!
//! The registry is one JSON array rewritten on every mutation. Lookups treat
//! the word key case-insensitively after NFC normalization; `remove` is the
//! exception and matches the stored key exactly.

use rand::seq::SliceRandom;
use rand::Rng;
use std::sync::Arc;
use tracing::{debug, info};
use unicode_normalization::UnicodeNormalization;

use crate::error::{BoardError, Result};
use crate::events::{BoardEvent, EventBus};
use crate::models::{Sentiment, WordEntry};
use crate::sentiment::extract_from_template;
use crate::storage::{keys, load_json, save_json, KeyValueStore};
use crate::validation::InputValidator;

/// Fallback words when the registry is empty
pub const DEFAULT_WORDS: [&str; 25] = [
    "กำลังใจ", "ความหวัง", "ความฝัน", "ความสุข", "ความรัก",
    "พลัง", "ศรัทธา", "ความเชื่อ", "ความเพียร", "ความอดทน",
    "ความสำเร็จ", "ความดี", "ความจริง", "ความกล้า", "มิตรภาพ",
    "ครอบครัว", "ความสามัคคี", "สติปัญญา", "สุขภาพ", "การเรียนรู้",
    "การเติบโต", "ความเข้มแข็ง", "ความมุ่งมั่น", "ความตั้งใจ", "การให้อภัย",
];

/// Seed entries written into an empty registry
fn seed_entries() -> Vec<WordEntry> {
    let seed = [
        (
            "ความพยายาม",
            [
                "${บวก}${ความพยายาม}คือกุญแจสู่ความสำเร็จ",
                "${บวก}อย่าละทิ้ง${ความพยายาม}แม้จะเจออุปสรรค",
            ],
        ),
        (
            "กำลังใจ",
            [
                "${บวก}${กำลังใจ}คือสิ่งสำคัญในยามท้อแท้",
                "${กลาง}${กำลังใจ}จากคนรอบข้างมีค่ามากเพียงใด",
            ],
        ),
        (
            "อดทน",
            [
                "${บวก}${อดทน}ไว้ ผลลัพธ์จะคุ้มค่าเสมอ",
                "${กลาง}การ${อดทน}คือคุณสมบัติของคนเก่ง",
            ],
        ),
    ];

    seed.into_iter()
        .map(|(word, templates)| {
            let mut entry = WordEntry::new(word, templates.iter().map(ToString::to_string).collect());
            refresh_cached_sentiment(&mut entry);
            entry
        })
        .collect()
}

/// Template shown for a word contributed without templates
#[must_use]
pub fn default_template(word: &str) -> String {
    format!("{word} เป็นสิ่งที่สำคัญในชีวิต")
}

/// One template or a list of them
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateInput {
    /// A single template
    One(String),
    /// Several templates in order
    Many(Vec<String>),
}

impl TemplateInput {
    /// Flatten into a list
    #[must_use]
    pub fn into_vec(self) -> Vec<String> {
        match self {
            Self::One(template) => vec![template],
            Self::Many(templates) => templates,
        }
    }
}

impl From<&str> for TemplateInput {
    fn from(template: &str) -> Self {
        Self::One(template.to_string())
    }
}

impl From<String> for TemplateInput {
    fn from(template: String) -> Self {
        Self::One(template)
    }
}

impl From<Vec<String>> for TemplateInput {
    fn from(templates: Vec<String>) -> Self {
        Self::Many(templates)
    }
}

impl From<&[&str]> for TemplateInput {
    fn from(templates: &[&str]) -> Self {
        Self::Many(templates.iter().map(ToString::to_string).collect())
    }
}

impl<const N: usize> From<[&str; N]> for TemplateInput {
    fn from(templates: [&str; N]) -> Self {
        Self::Many(templates.iter().map(ToString::to_string).collect())
    }
}

/// Lookup key for a word
pub(crate) fn word_key(word: &str) -> String {
    word.trim().nfc().collect::<String>().to_lowercase()
}

fn refresh_cached_sentiment(entry: &mut WordEntry) {
    if let Some(first) = entry.templates.first() {
        let extracted = extract_from_template(first);
        entry.sentiment = Some(extracted.sentiment);
        #[allow(clippy::cast_precision_loss)]
        let score = extracted.score as f32;
        entry.score = Some(score);
    }
}

/// Durable word registry
pub struct WordStore {
    store: Arc<dyn KeyValueStore>,
    events: EventBus,
    validator: InputValidator,
}

impl WordStore {
    /// Create a registry over the shared store with default validation
    pub fn new(store: Arc<dyn KeyValueStore>, events: EventBus) -> Self {
        Self::with_validator(store, events, InputValidator::default())
    }

    /// Create a registry with explicit validation bounds
    pub fn with_validator(
        store: Arc<dyn KeyValueStore>,
        events: EventBus,
        validator: InputValidator,
    ) -> Self {
        Self {
            store,
            events,
            validator,
        }
    }

    /// All entries in storage order; empty when uninitialized or unreadable
    #[must_use]
    pub fn get_all(&self) -> Vec<WordEntry> {
        load_json(self.store.as_ref(), keys::WORD_REGISTRY).unwrap_or_default()
    }

    /// Overwrite the whole registry
    pub fn replace_all(&self, entries: &[WordEntry]) -> Result<()> {
        save_json(self.store.as_ref(), keys::WORD_REGISTRY, entries)?;
        self.events.publish(BoardEvent::WordDatabaseUpdated);
        debug!(words = entries.len(), "Word registry written");
        Ok(())
    }

    /// Entry for `word`, matched case-insensitively
    #[must_use]
    pub fn find(&self, word: &str) -> Option<WordEntry> {
        let key = word_key(word);
        self.get_all().into_iter().find(|e| word_key(&e.word) == key)
    }

    /// True if the registry knows `word`
    #[must_use]
    pub fn exists(&self, word: &str, case_insensitive: bool) -> bool {
        let entries = self.get_all();
        if case_insensitive {
            let key = word_key(word);
            entries.iter().any(|e| word_key(&e.word) == key)
        } else {
            entries.iter().any(|e| e.word == word)
        }
    }

    /// Replace the templates of `word`, creating a custom entry if unknown
    pub fn upsert_templates(&self, word: &str, templates: impl Into<TemplateInput>) -> Result<WordEntry> {
        let templates = templates.into().into_vec();
        let mut entries = self.get_all();
        let key = word_key(word);

        let entry = match entries.iter().position(|e| word_key(&e.word) == key) {
            Some(index) => {
                let existing = &mut entries[index];
                existing.templates = templates;
                refresh_cached_sentiment(existing);
                existing.clone()
            },
            None => {
                let mut created = WordEntry::new(word.trim(), templates).custom();
                refresh_cached_sentiment(&mut created);
                entries.push(created.clone());
                created
            },
        };

        self.replace_all(&entries)?;
        info!(word = %entry.word, templates = entry.templates.len(), "Upserted word templates");
        Ok(entry)
    }

    /// Update the cached score of an existing word; `Ok(false)` if absent
    pub fn set_sentiment(&self, word: &str, score: f32) -> Result<bool> {
        let mut entries = self.get_all();
        let key = word_key(word);
        let Some(entry) = entries.iter_mut().find(|e| word_key(&e.word) == key) else {
            return Ok(false);
        };
        entry.score = Some(score);
        self.replace_all(&entries)?;
        Ok(true)
    }

    /// Delete the entry whose stored key equals `word` exactly
    pub fn remove(&self, word: &str) -> Result<bool> {
        let mut entries = self.get_all();
        let before = entries.len();
        entries.retain(|e| e.word != word);
        if entries.len() == before {
            return Ok(false);
        }
        self.replace_all(&entries)?;
        info!(word, "Removed word");
        Ok(true)
    }

    /// Validated create of a new custom word
    pub fn add_word(&self, word: &str, templates: impl Into<TemplateInput>) -> Result<WordEntry> {
        let templates = trimmed(templates.into().into_vec());
        self.validator.validate_word_input(word, &templates)?;
        if self.exists(word, true) {
            return Err(BoardError::WordExists(word.trim().to_string()));
        }
        self.upsert_templates(word, templates)
    }

    /// Validated replacement of an existing word's templates
    pub fn edit_templates(&self, word: &str, templates: impl Into<TemplateInput>) -> Result<WordEntry> {
        let templates = trimmed(templates.into().into_vec());
        self.validator.validate_templates(&templates)?;
        if !self.exists(word, true) {
            return Err(BoardError::WordNotFound(word.to_string()));
        }
        self.upsert_templates(word, templates)
    }

    /// Known entry for `word`, creating one with the default template if needed.
    ///
    /// Returns the entry and whether it was created.
    pub fn ensure_word(&self, word: &str) -> Result<(WordEntry, bool)> {
        self.validator.validate_word(word)?;
        if let Some(entry) = self.find(word) {
            return Ok((entry, false));
        }

        let word = word.trim();
        let mut entry = WordEntry::new(word, vec![default_template(word)]).custom();
        entry.sentiment = Some(Sentiment::Neutral);
        entry.score = Some(0.0);

        let mut entries = self.get_all();
        entries.push(entry.clone());
        self.replace_all(&entries)?;
        info!(word, "Created word from contribution");
        Ok((entry, true))
    }

    /// Write the seed list into an empty registry; `Ok(false)` if not empty
    pub fn seed_defaults(&self) -> Result<bool> {
        if !self.get_all().is_empty() {
            return Ok(false);
        }
        let entries = seed_entries();
        self.replace_all(&entries)?;
        info!(words = entries.len(), "Seeded default words");
        Ok(true)
    }

    /// Registry words, or the default word list when the registry is empty
    #[must_use]
    pub fn words_or_defaults(&self) -> Vec<String> {
        let entries = self.get_all();
        if entries.is_empty() {
            DEFAULT_WORDS.iter().map(ToString::to_string).collect()
        } else {
            entries.into_iter().map(|e| e.word).collect()
        }
    }

    /// A uniformly random word from [`Self::words_or_defaults`]
    pub fn random_word<R: Rng + ?Sized>(&self, rng: &mut R) -> String {
        self.words_or_defaults()
            .choose(rng)
            .cloned()
            .unwrap_or_else(|| DEFAULT_WORDS[0].to_string())
    }

    /// True when every known word appears in `selected`
    #[must_use]
    pub fn all_words_used<S: AsRef<str>>(&self, selected: &[S]) -> bool {
        let selected: std::collections::HashSet<&str> = selected.iter().map(AsRef::as_ref).collect();
        self.words_or_defaults()
            .iter()
            .all(|w| selected.contains(w.as_str()))
    }
}

fn trimmed(templates: Vec<String>) -> Vec<String> {
    templates.into_iter().map(|t| t.trim().to_string()).collect()
}
