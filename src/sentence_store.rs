//! Append-only history of generated sentences.
//!
//! Statistics and rankings are recomputed from the stored list on demand;
//! nothing is maintained incrementally.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, info};

use crate::clock::Clock;
use crate::error::Result;
use crate::events::{BoardEvent, EventBus};
use crate::models::{RankedSentence, Sentiment, SentenceRecord, Statistics};
use crate::sentiment::{extract_from_template, strip_markers, SentimentClassifier};
use crate::storage::{keys, load_json, save_json, KeyValueStore};

/// Durable sentence history
pub struct SentenceStore {
    store: Arc<dyn KeyValueStore>,
    events: EventBus,
    clock: Arc<dyn Clock>,
}

impl SentenceStore {
    /// Create a history over the shared store
    pub fn new(store: Arc<dyn KeyValueStore>, events: EventBus, clock: Arc<dyn Clock>) -> Self {
        Self { store, events, clock }
    }

    /// Append a record, assigning timestamp and id when absent
    pub fn append(&self, mut record: SentenceRecord) -> Result<SentenceRecord> {
        let timestamp = *record.timestamp.get_or_insert_with(|| self.clock.now());
        if record.id.is_none() {
            record.id = Some(format!("{}-{}", record.word, timestamp.timestamp_millis()));
        }

        let mut records = self.get_all();
        records.push(record.clone());
        save_json(self.store.as_ref(), keys::SENTENCE_RECORDS, &records)?;
        self.events.publish(BoardEvent::BillboardUpdated);
        debug!(word = %record.word, total = records.len(), "Appended sentence record");
        Ok(record)
    }

    /// Stored records; empty on missing or corrupt storage
    #[must_use]
    pub fn get_all(&self) -> Vec<SentenceRecord> {
        load_json(self.store.as_ref(), keys::SENTENCE_RECORDS).unwrap_or_default()
    }

    /// Newest `limit` records of the deduplicated history
    #[must_use]
    pub fn recent(&self, limit: usize) -> Vec<SentenceRecord> {
        let mut records = deduplicate(&self.get_all());
        records.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        records.truncate(limit);
        records
    }

    /// Deduplicated history ranked for the leaderboard
    #[must_use]
    pub fn ranked(&self, classifier: &SentimentClassifier) -> Vec<RankedSentence> {
        rank(&deduplicate(&self.get_all()), classifier)
    }

    /// Remove every record
    pub fn clear(&self) -> Result<()> {
        self.store.remove(keys::SENTENCE_RECORDS)?;
        self.events.publish(BoardEvent::BillboardUpdated);
        info!("Cleared sentence history");
        Ok(())
    }
}

/// Collapse records sharing word, sentence and contributor, keeping the newest.
///
/// Groups appear in order of their first occurrence. On equal timestamps the
/// earlier record in the input wins.
#[must_use]
pub fn deduplicate(records: &[SentenceRecord]) -> Vec<SentenceRecord> {
    let mut positions: HashMap<(&str, &str, &str), usize> = HashMap::new();
    let mut unique: Vec<SentenceRecord> = Vec::new();

    for record in records {
        let key = record.uniqueness_key();
        match positions.get(&key) {
            Some(&index) => {
                if record.timestamp > unique[index].timestamp {
                    unique[index] = record.clone();
                }
            },
            None => {
                positions.insert(key, unique.len());
                unique.push(record.clone());
            },
        }
    }

    unique
}

/// Single-pass aggregates over `records` as given
#[must_use]
pub fn compute_statistics(records: &[SentenceRecord]) -> Statistics {
    let mut stats = Statistics {
        total: records.len(),
        ..Statistics::default()
    };
    let mut contributors = HashSet::new();
    let mut longest_len = 0;

    for record in records {
        contributors.insert(record.contributor_or_default());

        match record.sentiment_or_default() {
            Sentiment::Positive => stats.positive_count += 1,
            Sentiment::Neutral => stats.neutral_count += 1,
            Sentiment::Negative => stats.negative_count += 1,
        }

        let len = strip_markers(&record.sentence).chars().count();
        if stats.longest_record.is_none() || len > longest_len {
            longest_len = len;
            stats.longest_record = Some(record.clone());
        }
    }

    stats.unique_contributors = contributors.len();
    stats
}

/// Annotate records for the leaderboard and sort them best first.
///
/// Polarity comes from the template marker when a template is present and
/// from the text otherwise. Ties on score go to the newer record.
#[must_use]
pub fn rank(records: &[SentenceRecord], classifier: &SentimentClassifier) -> Vec<RankedSentence> {
    let mut ranked: Vec<RankedSentence> = records
        .iter()
        .map(|record| {
            let polarity = record.template.as_deref().map_or_else(
                || classifier.infer_from_text(&record.sentence).sentiment,
                |template| extract_from_template(template).sentiment,
            );
            RankedSentence {
                record: record.clone(),
                polarity,
                ranking_score: polarity.ranking_score(),
            }
        })
        .collect();

    ranked.sort_by(|a, b| {
        b.ranking_score
            .cmp(&a.ranking_score)
            .then_with(|| b.record.timestamp.cmp(&a.record.timestamp))
    });
    ranked
}
