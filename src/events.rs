//! Change notifications between the stores and their views.
//!
//! Stores publish after a successful write; views subscribe and re-fetch.
//! Payloads are informational only, the stores stay authoritative.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::trace;

use crate::models::Sentiment;

/// Default buffer size for the broadcast channel
pub const DEFAULT_EVENT_CAPACITY: usize = 64;

/// Details of a freshly generated sentence, for immediate display
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentenceGenerated {
    /// Focus word
    pub word: String,
    /// Rendered sentence
    pub sentence: String,
    /// Contributor display name
    pub contributor: String,
    /// Raw template used, if any
    pub template: Option<String>,
    /// Sentiment of the sentence
    pub sentiment: Sentiment,
}

/// Named change notifications
#[derive(Debug, Clone, PartialEq)]
pub enum BoardEvent {
    /// The word registry was rewritten
    WordDatabaseUpdated,
    /// A sentence was generated for a word
    SentenceGenerated(SentenceGenerated),
    /// Sentence history was rewritten
    BillboardUpdated,
    /// Template usage was marked or reset
    TemplateUsageUpdated,
    /// Contributor statistics changed
    ContributorStatsUpdated,
}

impl BoardEvent {
    /// Stable event name
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::WordDatabaseUpdated => "word-database-updated",
            Self::SentenceGenerated(_) => "motivational-sentence-generated",
            Self::BillboardUpdated => "motivation-billboard-updated",
            Self::TemplateUsageUpdated => "template-usage-updated",
            Self::ContributorStatsUpdated => "contributor-stats-updated",
        }
    }
}

/// In-process publish/subscribe bus. Clones share the same channel.
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<BoardEvent>,
}

impl EventBus {
    /// Create a bus buffering up to `capacity` events per subscriber
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Register a new subscriber; it sees events published from now on
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<BoardEvent> {
        self.sender.subscribe()
    }

    /// Publish an event; having no subscribers is fine
    pub fn publish(&self, event: BoardEvent) {
        let name = event.name();
        match self.sender.send(event) {
            Ok(receivers) => trace!(event = name, receivers, "Published event"),
            Err(_) => trace!(event = name, "Published event with no subscribers"),
        }
    }

    /// Number of live subscribers
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_CAPACITY)
    }
}

/// Drain whatever a subscriber has buffered without waiting.
///
/// A lagged receiver skips the dropped events and keeps draining.
pub fn drain(receiver: &mut broadcast::Receiver<BoardEvent>) -> Vec<BoardEvent> {
    let mut events = Vec::new();
    loop {
        match receiver.try_recv() {
            Ok(event) => events.push(event),
            Err(broadcast::error::TryRecvError::Lagged(_)) => continue,
            Err(_) => break,
        }
    }
    events
}
