//! Contributor identity and per-contributor word counts.

use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::events::{BoardEvent, EventBus};
use crate::models::{ContributorStat, UNSPECIFIED_CONTRIBUTOR};
use crate::storage::{keys, load_json, save_json, KeyValueStore};
use crate::validation::InputValidator;

/// Provides the current contributor's display name
pub trait DisplayNameProvider: Send + Sync {
    /// Chosen name, or the unspecified sentinel
    fn display_name(&self) -> String;
}

/// Contributor name and statistics, persisted in the shared store
pub struct ContributorRegistry {
    store: Arc<dyn KeyValueStore>,
    events: EventBus,
    fallback_name: String,
}

impl ContributorRegistry {
    /// Create a registry over the shared store
    pub fn new(store: Arc<dyn KeyValueStore>, events: EventBus) -> Self {
        Self::with_fallback(store, events, UNSPECIFIED_CONTRIBUTOR)
    }

    /// Create a registry with a custom name for anonymous contributors
    pub fn with_fallback(store: Arc<dyn KeyValueStore>, events: EventBus, fallback_name: &str) -> Self {
        Self {
            store,
            events,
            fallback_name: fallback_name.to_string(),
        }
    }

    /// Last used display name, or the fallback
    #[must_use]
    pub fn current_name(&self) -> String {
        match self.store.get(keys::CONTRIBUTOR_NAME) {
            Ok(Some(name)) if !name.trim().is_empty() => name,
            Ok(_) => self.fallback_name.clone(),
            Err(e) => {
                warn!(error = %e, "Failed to read contributor name");
                self.fallback_name.clone()
            },
        }
    }

    /// Remember the display name for later contributions
    pub fn set_name(&self, name: &str) -> Result<()> {
        InputValidator::validate_contributor_name(name)?;
        self.store.set(keys::CONTRIBUTOR_NAME, name.trim())?;
        debug!(name = name.trim(), "Contributor name set");
        Ok(())
    }

    /// Name to attribute a contribution to
    #[must_use]
    pub fn resolve(&self, explicit: Option<&str>) -> String {
        explicit
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map_or_else(|| self.current_name(), ToString::to_string)
    }

    /// Contributor name to word count
    #[must_use]
    pub fn stats(&self) -> BTreeMap<String, u64> {
        load_json(self.store.as_ref(), keys::CONTRIBUTOR_STATS).unwrap_or_default()
    }

    /// Add one contribution for `name`; blank names are ignored
    pub fn increment(&self, name: &str) -> Result<u64> {
        if name.trim().is_empty() {
            return Ok(0);
        }
        let mut stats = self.stats();
        let count = stats.entry(name.to_string()).or_insert(0);
        *count += 1;
        let count = *count;
        save_json(self.store.as_ref(), keys::CONTRIBUTOR_STATS, &stats)?;
        self.events.publish(BoardEvent::ContributorStatsUpdated);
        Ok(count)
    }

    /// Forget every count
    pub fn reset(&self) -> Result<()> {
        self.store.remove(keys::CONTRIBUTOR_STATS)?;
        self.events.publish(BoardEvent::ContributorStatsUpdated);
        info!("Reset contributor statistics");
        Ok(())
    }

    /// Contributors by count descending, then name
    #[must_use]
    pub fn leaderboard(&self) -> Vec<ContributorStat> {
        let mut rows: Vec<ContributorStat> = self
            .stats()
            .into_iter()
            .map(|(name, count)| ContributorStat { name, count })
            .collect();
        rows.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.name.cmp(&b.name)));
        rows
    }
}

impl DisplayNameProvider for ContributorRegistry {
    fn display_name(&self) -> String {
        self.current_name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    fn registry() -> ContributorRegistry {
        ContributorRegistry::new(Arc::new(MemoryStore::new()), EventBus::default())
    }

    #[test]
    fn test_name_falls_back_to_sentinel() {
        let registry = registry();
        assert_eq!(registry.current_name(), UNSPECIFIED_CONTRIBUTOR);
        registry.set_name("  ฝน ").expect("set");
        assert_eq!(registry.current_name(), "ฝน");
        assert_eq!(registry.resolve(Some("ลม")), "ลม");
        assert_eq!(registry.resolve(Some("  ")), "ฝน");
    }

    #[test]
    fn test_leaderboard_order() {
        let registry = registry();
        for name in ["b", "a", "b", "c", "a", "b"] {
            registry.increment(name).expect("increment");
        }
        let rows: Vec<(String, u64)> = registry
            .leaderboard()
            .into_iter()
            .map(|r| (r.name, r.count))
            .collect();
        assert_eq!(
            rows,
            vec![("b".to_string(), 3), ("a".to_string(), 2), ("c".to_string(), 1)]
        );
    }

    #[test]
    fn test_corrupt_stats_read_empty() {
        let backend = MemoryStore::with_entries([(keys::CONTRIBUTOR_STATS, "[\"x\"]")]);
        let registry = ContributorRegistry::new(Arc::new(backend), EventBus::default());
        assert!(registry.stats().is_empty());
        assert_eq!(registry.increment("x").expect("increment"), 1);
    }

    #[test]
    fn test_reset_clears_counts_but_keeps_name() {
        let registry = registry();
        registry.set_name("ฝน").expect("set");
        registry.increment("ฝน").expect("increment");
        registry.reset().expect("reset");
        assert!(registry.leaderboard().is_empty());
        assert_eq!(registry.display_name(), "ฝน");
    }
}
