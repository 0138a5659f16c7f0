use anyhow::Result;
use ::metrics::counter;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::models::Sentiment;

/// Sentences generated, labelled by sentiment
pub const SENTENCES_GENERATED_TOTAL: &str = "motivation_board_sentences_generated_total";
/// Words whose template set was recycled after exhaustion
pub const TEMPLATES_RECYCLED_TOTAL: &str = "motivation_board_templates_recycled_total";
/// Persisted blobs replaced by defaults after a failed decode
pub const CORRUPT_STATE_RECOVERED_TOTAL: &str = "motivation_board_corrupt_state_recovered_total";
/// User actions rejected by validation
pub const VALIDATION_REJECTIONS_TOTAL: &str = "motivation_board_validation_rejections_total";

/// Recoveries happen inside storage decoding, outside any collector
static CORRUPT_STATES_RECOVERED: AtomicU64 = AtomicU64::new(0);

/// Local totals mirrored to the `metrics` facade
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetricsCollector {
    pub sentences_generated_total: u64,
    pub templates_recycled_total: u64,
    pub validation_rejections_total: u64,
}

impl MetricsCollector {
    /// Initialize metrics collection with a no-op recorder
    pub fn init() -> Result<()> {
        ::metrics::set_global_recorder(::metrics::NoopRecorder)
            .map_err(|e| anyhow::anyhow!("Failed to initialize metrics recorder: {}", e))?;

        Ok(())
    }

    /// Record a generated sentence
    pub fn record_sentence_generated(&mut self, sentiment: Sentiment) {
        self.sentences_generated_total += 1;
        counter!(SENTENCES_GENERATED_TOTAL, "sentiment" => sentiment.as_str()).increment(1);
    }

    /// Record an exhaustion reset for a word
    pub fn record_templates_recycled(&mut self) {
        self.templates_recycled_total += 1;
        counter!(TEMPLATES_RECYCLED_TOTAL).increment(1);
    }

    /// Record a rejected action
    pub fn record_rejection(&mut self, action: &'static str) {
        self.validation_rejections_total += 1;
        counter!(VALIDATION_REJECTIONS_TOTAL, "action" => action).increment(1);
    }

    /// Corrupt or unreadable blobs replaced by defaults in this process
    #[must_use]
    pub fn corrupt_states_recovered_total(&self) -> u64 {
        CORRUPT_STATES_RECOVERED.load(Ordering::Relaxed)
    }
}

/// Record a corrupt or unreadable storage key
pub fn record_corrupt_state(key: &str) {
    CORRUPT_STATES_RECOVERED.fetch_add(1, Ordering::Relaxed);
    counter!(CORRUPT_STATE_RECOVERED_TOTAL, "key" => key.to_string()).increment(1);
}
