//! Orchestration of the board's user actions.
//!
//! A selection runs word lookup, template rotation, classification and
//! recording in that order; each store persists and notifies on its own.

use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, info};

use crate::clock::{Clock, SystemClock};
use crate::contributors::ContributorRegistry;
use crate::error::{BoardError, Result};
use crate::events::{BoardEvent, EventBus, SentenceGenerated};
use crate::logging::OperationTimer;
use crate::metrics::MetricsCollector;
use crate::models::{ContributorStat, RankedSentence, SentenceRecord, Statistics, WordEntry};
use crate::sentence_store::{compute_statistics, deduplicate, SentenceStore};
use crate::sentiment::{extract_from_template, SentimentClassifier};
use crate::storage::{KeyValueStore, MemoryStore};
use crate::template_tracker::{TemplateTracker, UsageMap};
use crate::validation::InputValidator;
use crate::word_store::{default_template, TemplateInput, WordStore};

/// Outcome of a word selection
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedSentence {
    /// The appended record
    pub record: SentenceRecord,
    /// The word was unknown and has been created
    pub created_word: bool,
    /// The word's templates were exhausted and recycled
    pub recycled: bool,
    /// Contributor's total after this contribution
    pub contributor_total: u64,
}

pub struct MotivationService {
    store: Arc<dyn KeyValueStore>,
    events: EventBus,
    words: WordStore,
    tracker: TemplateTracker,
    sentences: SentenceStore,
    contributors: ContributorRegistry,
    classifier: SentimentClassifier,
    validator: InputValidator,
    metrics: MetricsCollector,
    rng: StdRng,
}

impl MotivationService {
    pub fn new(store: Arc<dyn KeyValueStore>, events: EventBus, clock: Arc<dyn Clock>) -> Result<Self> {
        let validator = InputValidator::default();
        Ok(Self {
            words: WordStore::with_validator(store.clone(), events.clone(), validator),
            tracker: TemplateTracker::new(store.clone(), events.clone()),
            sentences: SentenceStore::new(store.clone(), events.clone(), clock),
            contributors: ContributorRegistry::new(store.clone(), events.clone()),
            classifier: SentimentClassifier::new()?,
            validator,
            metrics: MetricsCollector::default(),
            rng: StdRng::from_entropy(),
            store,
            events,
        })
    }

    /// Service over a fresh in-memory store and the system clock
    pub fn in_memory() -> Result<Self> {
        Self::new(
            Arc::new(MemoryStore::new()),
            EventBus::default(),
            Arc::new(SystemClock::new()),
        )
    }

    /// Use explicit length bounds for words and templates
    #[must_use]
    pub fn with_validator(mut self, validator: InputValidator) -> Self {
        self.words = WordStore::with_validator(self.store.clone(), self.events.clone(), validator);
        self.validator = validator;
        self
    }

    /// Attribute anonymous contributions to `name`
    #[must_use]
    pub fn with_fallback_contributor(mut self, name: &str) -> Self {
        self.contributors = ContributorRegistry::with_fallback(self.store.clone(), self.events.clone(), name);
        self
    }

    /// Deterministic template and word choice
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.reseed(seed);
        self
    }

    pub fn reseed(&mut self, seed: u64) {
        self.rng = StdRng::seed_from_u64(seed);
    }

    pub fn words(&self) -> &WordStore {
        &self.words
    }

    pub fn tracker(&self) -> &TemplateTracker {
        &self.tracker
    }

    pub fn sentences(&self) -> &SentenceStore {
        &self.sentences
    }

    pub fn contributors(&self) -> &ContributorRegistry {
        &self.contributors
    }

    pub fn classifier(&self) -> &SentimentClassifier {
        &self.classifier
    }

    pub fn metrics(&self) -> &MetricsCollector {
        &self.metrics
    }

    pub fn subscribe(&self) -> broadcast::Receiver<BoardEvent> {
        self.events.subscribe()
    }

    fn checked<T>(&mut self, action: &'static str, result: Result<T>) -> Result<T> {
        if let Err(e) = &result {
            if e.is_rejection() {
                debug!(action, error = %e, "Action rejected");
                self.metrics.record_rejection(action);
            }
        }
        result
    }

    /// Record a contribution of `word`, creating it if unknown.
    ///
    /// Returns the entry and whether it was created.
    pub fn contribute(&mut self, word: &str, contributor: Option<&str>) -> Result<(WordEntry, bool)> {
        let ensured = self.words.ensure_word(word);
        let (entry, created) = self.checked("contribute", ensured)?;
        let name = self.contributors.resolve(contributor);
        self.contributors.increment(&name)?;
        Ok((entry, created))
    }

    /// Generate and record a sentence for `word`
    pub fn select_word(&mut self, word: &str, contributor: Option<&str>) -> Result<GeneratedSentence> {
        let timer = OperationTimer::new("select_word");

        let validated = self.validator.validate_word(word);
        self.checked("select_word", validated)?;

        let ensured = self.words.ensure_word(word);
        let (entry, created_word) = self.checked("select_word", ensured)?;

        let mut candidates = entry.templates.clone();
        if candidates.is_empty() {
            candidates.push(default_template(&entry.word));
        }

        let (template, recycled) = self
            .tracker
            .choose(&entry.word, &candidates, &mut self.rng)
            .ok_or(BoardError::NoTemplates)?;

        let extracted = extract_from_template(&template);
        let sentence = self.classifier.render(&template, &entry.word);
        let contributor = self.contributors.resolve(contributor);

        let record = SentenceRecord::new(entry.word.clone(), sentence)
            .with_contributor(contributor.clone())
            .with_template(template.clone())
            .with_sentiment(extracted.sentiment);
        let record = self.sentences.append(record)?;

        self.tracker.mark_used(&entry.word, &template)?;
        let contributor_total = self.contributors.increment(&contributor)?;

        self.events.publish(BoardEvent::SentenceGenerated(SentenceGenerated {
            word: record.word.clone(),
            sentence: record.sentence.clone(),
            contributor,
            template: record.template.clone(),
            sentiment: extracted.sentiment,
        }));

        self.metrics.record_sentence_generated(extracted.sentiment);
        if recycled {
            self.metrics.record_templates_recycled();
        }

        info!(
            word = %record.word,
            sentiment = %extracted.sentiment,
            created_word,
            recycled,
            "Generated sentence"
        );
        timer.finish();

        Ok(GeneratedSentence {
            record,
            created_word,
            recycled,
            contributor_total,
        })
    }

    /// Select a random known word and generate a sentence for it
    pub fn select_random(&mut self, contributor: Option<&str>) -> Result<GeneratedSentence> {
        let word = self.random_word();
        self.select_word(&word, contributor)
    }

    pub fn random_word(&mut self) -> String {
        self.words.random_word(&mut self.rng)
    }

    pub fn add_word(&mut self, word: &str, templates: impl Into<TemplateInput>) -> Result<WordEntry> {
        let added = self.words.add_word(word, templates);
        self.checked("add_word", added)
    }

    pub fn edit_word(&mut self, word: &str, templates: impl Into<TemplateInput>) -> Result<WordEntry> {
        let edited = self.words.edit_templates(word, templates);
        self.checked("edit_word", edited)
    }

    /// Remove a word and forget its template usage
    pub fn remove_word(&mut self, word: &str) -> Result<bool> {
        let removed = self.words.remove(word)?;
        if removed {
            self.tracker.reset_word(word)?;
        }
        Ok(removed)
    }

    pub fn set_contributor_name(&mut self, name: &str) -> Result<()> {
        let set = self.contributors.set_name(name);
        self.checked("set_contributor_name", set)
    }

    pub fn seed_defaults(&self) -> Result<bool> {
        self.words.seed_defaults()
    }

    /// Aggregates over the history, optionally deduplicated first
    #[must_use]
    pub fn statistics(&self, deduplicated: bool) -> Statistics {
        let records = self.sentences.get_all();
        if deduplicated {
            compute_statistics(&deduplicate(&records))
        } else {
            compute_statistics(&records)
        }
    }

    #[must_use]
    pub fn history(&self, limit: usize) -> Vec<SentenceRecord> {
        self.sentences.recent(limit)
    }

    #[must_use]
    pub fn ranked(&self) -> Vec<RankedSentence> {
        self.sentences.ranked(&self.classifier)
    }

    #[must_use]
    pub fn leaderboard(&self) -> Vec<ContributorStat> {
        self.contributors.leaderboard()
    }

    #[must_use]
    pub fn template_usage(&self) -> UsageMap {
        self.tracker.all_used()
    }

    /// Reset usage for one word, or for all words
    pub fn reset_templates(&self, word: Option<&str>) -> Result<()> {
        match word {
            Some(word) => self.tracker.reset_word(word),
            None => self.tracker.reset_all(),
        }
    }

    pub fn clear_sentences(&self) -> Result<()> {
        self.sentences.clear()
    }

    /// Wipe every persisted key
    pub fn clear_all(&self) -> Result<()> {
        self.store.clear()?;
        self.events.publish(BoardEvent::WordDatabaseUpdated);
        self.events.publish(BoardEvent::BillboardUpdated);
        self.events.publish(BoardEvent::TemplateUsageUpdated);
        self.events.publish(BoardEvent::ContributorStatsUpdated);
        info!("Cleared all board data");
        Ok(())
    }
}
