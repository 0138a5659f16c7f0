//! Per-word template rotation.
//!
//! A word does not repeat a template until every one of its templates has
//! been used. Once all are used the word's used-set is cleared as a unit and
//! the full list becomes available again.

use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::events::{BoardEvent, EventBus};
use crate::storage::{keys, load_json, save_json, KeyValueStore};

/// Word to the templates already used for it
pub type UsageMap = BTreeMap<String, Vec<String>>;

/// Templates on offer for a word
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Availability {
    /// Candidates not yet used, or all candidates after a reset
    pub templates: Vec<String>,
    /// True when this query cleared an exhausted used-set
    pub recycled: bool,
}

/// Tracks which templates each word has used
pub struct TemplateTracker {
    store: Arc<dyn KeyValueStore>,
    events: EventBus,
}

impl TemplateTracker {
    /// Create a tracker over the shared store
    pub fn new(store: Arc<dyn KeyValueStore>, events: EventBus) -> Self {
        Self { store, events }
    }

    fn load(&self) -> UsageMap {
        load_json(self.store.as_ref(), keys::TEMPLATE_USAGE).unwrap_or_default()
    }

    fn save(&self, usage: &UsageMap) -> Result<()> {
        save_json(self.store.as_ref(), keys::TEMPLATE_USAGE, usage)?;
        self.events.publish(BoardEvent::TemplateUsageUpdated);
        Ok(())
    }

    /// True if `template` was already used for `word`
    #[must_use]
    pub fn is_used(&self, word: &str, template: &str) -> bool {
        self.load()
            .get(word)
            .is_some_and(|used| used.iter().any(|t| t == template))
    }

    /// Templates used for `word`, in the order they were used
    #[must_use]
    pub fn used_for(&self, word: &str) -> Vec<String> {
        self.load().remove(word).unwrap_or_default()
    }

    /// The whole usage map
    #[must_use]
    pub fn all_used(&self) -> UsageMap {
        self.load()
    }

    /// Record that `template` was used for `word`; repeated calls are no-ops
    pub fn mark_used(&self, word: &str, template: &str) -> Result<()> {
        let mut usage = self.load();
        let used = usage.entry(word.to_string()).or_default();
        if used.iter().any(|t| t == template) {
            return Ok(());
        }
        used.push(template.to_string());
        self.save(&usage)?;
        debug!(word, used = usage.get(word).map_or(0, Vec::len), "Marked template used");
        Ok(())
    }

    /// Forget every template used for `word`
    pub fn reset_word(&self, word: &str) -> Result<()> {
        let mut usage = self.load();
        if usage.remove(word).is_none() {
            return Ok(());
        }
        self.save(&usage)?;
        info!(word, "Reset template usage for word");
        Ok(())
    }

    /// Forget all template usage
    pub fn reset_all(&self) -> Result<()> {
        self.store.remove(keys::TEMPLATE_USAGE)?;
        self.events.publish(BoardEvent::TemplateUsageUpdated);
        info!("Reset all template usage");
        Ok(())
    }

    /// Candidates not yet used for `word`, recycling on exhaustion
    #[must_use]
    pub fn available_templates(&self, word: &str, candidates: &[String]) -> Vec<String> {
        self.availability(word, candidates).templates
    }

    /// Like [`Self::available_templates`], also reporting whether a reset happened.
    ///
    /// Empty candidates give an empty result with no state change. If every
    /// candidate is used the word's used-set is cleared and all candidates
    /// are returned. A failed reset write still returns all candidates.
    #[must_use]
    pub fn availability(&self, word: &str, candidates: &[String]) -> Availability {
        if candidates.is_empty() {
            return Availability {
                templates: Vec::new(),
                recycled: false,
            };
        }

        let usage = self.load();
        let used = usage.get(word).map_or(&[][..], Vec::as_slice);
        let unused: Vec<String> = candidates
            .iter()
            .filter(|c| !used.contains(*c))
            .cloned()
            .collect();

        if !unused.is_empty() {
            return Availability {
                templates: unused,
                recycled: false,
            };
        }

        if let Err(e) = self.reset_word(word) {
            warn!(word, error = %e, "Failed to persist exhaustion reset");
        }
        info!(word, templates = candidates.len(), "All templates used, recycling");
        Availability {
            templates: candidates.to_vec(),
            recycled: true,
        }
    }

    /// Pick one available template uniformly at random
    pub fn choose<R: Rng + ?Sized>(
        &self,
        word: &str,
        candidates: &[String],
        rng: &mut R,
    ) -> Option<(String, bool)> {
        let availability = self.availability(word, candidates);
        availability
            .templates
            .choose(rng)
            .cloned()
            .map(|template| (template, availability.recycled))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BoardError;
    use crate::storage::{MemoryStore, MockKeyValueStore};

    fn tracker() -> TemplateTracker {
        TemplateTracker::new(Arc::new(MemoryStore::new()), EventBus::default())
    }

    fn templates(items: &[&str]) -> Vec<String> {
        items.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_nothing_used_initially() {
        let tracker = tracker();
        assert!(!tracker.is_used("คำ", "a"));
        assert!(tracker.all_used().is_empty());
    }

    #[test]
    fn test_mark_used_is_idempotent() {
        let tracker = tracker();
        tracker.mark_used("คำ", "a").expect("mark");
        tracker.mark_used("คำ", "a").expect("mark again");
        assert_eq!(tracker.used_for("คำ"), vec!["a".to_string()]);
    }

    #[test]
    fn test_empty_candidates_change_nothing() {
        let tracker = tracker();
        tracker.mark_used("คำ", "a").expect("mark");
        let availability = tracker.availability("คำ", &[]);
        assert!(availability.templates.is_empty());
        assert!(!availability.recycled);
        assert!(tracker.is_used("คำ", "a"));
    }

    #[test]
    fn test_exhaustion_recycles_full_list() {
        let tracker = tracker();
        let candidates = templates(&["a", "b"]);
        tracker.mark_used("คำ", "a").expect("mark");
        tracker.mark_used("คำ", "b").expect("mark");

        let availability = tracker.availability("คำ", &candidates);
        assert!(availability.recycled);
        assert_eq!(availability.templates, candidates);
        assert!(tracker.used_for("คำ").is_empty());
    }

    #[test]
    fn test_corrupt_usage_is_permissive() {
        let store = MemoryStore::with_entries([(keys::TEMPLATE_USAGE, "\"oops\"")]);
        let tracker = TemplateTracker::new(Arc::new(store), EventBus::default());
        assert!(!tracker.is_used("คำ", "a"));
        assert_eq!(
            tracker.available_templates("คำ", &templates(&["a", "b"])),
            templates(&["a", "b"])
        );
    }

    #[test]
    fn test_failed_write_is_reported() {
        let mut mock = MockKeyValueStore::new();
        mock.expect_get().returning(|_| Ok(None));
        mock.expect_set()
            .returning(|_, _| Err(BoardError::Storage("quota exceeded".to_string())));

        let tracker = TemplateTracker::new(Arc::new(mock), EventBus::default());
        assert!(matches!(
            tracker.mark_used("คำ", "a"),
            Err(BoardError::Storage(_))
        ));
    }

    #[test]
    fn test_mark_used_publishes_event() {
        let events = EventBus::default();
        let mut rx = events.subscribe();
        let tracker = TemplateTracker::new(Arc::new(MemoryStore::new()), events);
        tracker.mark_used("คำ", "a").expect("mark");
        assert_eq!(
            crate::events::drain(&mut rx),
            vec![BoardEvent::TemplateUsageUpdated]
        );
    }
}
