//! Sentence history, deduplication and statistics

use chrono::{DateTime, TimeZone, Utc};
use proptest::prelude::*;
use std::sync::Arc;

use motivation_board::clock::ManualClock;
use motivation_board::events::{drain, BoardEvent, EventBus};
use motivation_board::models::{SentenceRecord, Sentiment, UNSPECIFIED_CONTRIBUTOR};
use motivation_board::sentence_store::{compute_statistics, deduplicate, SentenceStore};
use motivation_board::storage::{keys, KeyValueStore, MemoryStore, SledStore};

fn at(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(1_700_000_000 + secs, 0)
        .single()
        .expect("valid timestamp")
}

fn store_over(backend: Arc<dyn KeyValueStore>) -> SentenceStore {
    SentenceStore::new(backend, EventBus::default(), Arc::new(ManualClock::starting_at(at(0))))
}

#[test]
fn test_duplicate_keeps_later_timestamp() {
    let records = vec![
        SentenceRecord::new("X", "Y").with_contributor("Z").with_timestamp(at(1)),
        SentenceRecord::new("X", "Y").with_contributor("Z").with_timestamp(at(2)),
    ];
    let unique = deduplicate(&records);
    assert_eq!(unique.len(), 1);
    assert_eq!(unique[0].timestamp, Some(at(2)));
}

#[test]
fn test_missing_contributor_matches_sentinel() {
    let records = vec![
        SentenceRecord::new("X", "Y").with_timestamp(at(1)),
        SentenceRecord::new("X", "Y")
            .with_contributor(UNSPECIFIED_CONTRIBUTOR)
            .with_timestamp(at(2)),
    ];
    assert_eq!(deduplicate(&records).len(), 1);
}

#[test]
fn test_separator_characters_do_not_merge_records() {
    let records = vec![
        SentenceRecord::new("a|b", "c").with_contributor("Z").with_timestamp(at(1)),
        SentenceRecord::new("a", "b|c").with_contributor("Z").with_timestamp(at(2)),
        SentenceRecord::new("a", "b").with_contributor("c|Z").with_timestamp(at(3)),
    ];
    let unique = deduplicate(&records);
    assert_eq!(unique.len(), 3);
    assert_eq!(unique[0].word, "a|b");
}

#[test]
fn test_statistics_counts() {
    let records = vec![
        SentenceRecord::new("a", "หนึ่ง").with_contributor("ฝน").with_sentiment(Sentiment::Positive),
        SentenceRecord::new("b", "สองสอง").with_contributor("ลม").with_sentiment(Sentiment::Negative),
        SentenceRecord::new("c", "สาม"),
    ];
    let stats = compute_statistics(&records);
    assert_eq!(stats.total, 3);
    assert_eq!(stats.unique_contributors, 3);
    assert_eq!(stats.positive_count, 1);
    assert_eq!(stats.negative_count, 1);
    assert_eq!(stats.neutral_count, 1);
    assert_eq!(stats.longest_record.map(|r| r.word), Some("b".to_string()));
}

#[test]
fn test_empty_statistics() {
    let stats = compute_statistics(&[]);
    assert_eq!(stats.total, 0);
    assert!(stats.longest_record.is_none());
    assert!(stats.percentage(Sentiment::Positive).abs() < f64::EPSILON);
}

#[test]
fn test_recent_is_newest_first_and_deduplicated() {
    let store = store_over(Arc::new(MemoryStore::new()));
    store
        .append(SentenceRecord::new("a", "1").with_timestamp(at(1)))
        .expect("append");
    store
        .append(SentenceRecord::new("b", "2").with_timestamp(at(3)))
        .expect("append");
    store
        .append(SentenceRecord::new("a", "1").with_timestamp(at(5)))
        .expect("append");

    let recent = store.recent(10);
    let words: Vec<&str> = recent.iter().map(|r| r.word.as_str()).collect();
    assert_eq!(words, vec!["a", "b"]);
    assert_eq!(store.recent(1).len(), 1);
}

#[test]
fn test_append_and_clear_publish() {
    let events = EventBus::default();
    let mut rx = events.subscribe();
    let store = SentenceStore::new(
        Arc::new(MemoryStore::new()),
        events,
        Arc::new(ManualClock::starting_at(at(0))),
    );

    store.append(SentenceRecord::new("a", "1")).expect("append");
    store.clear().expect("clear");
    assert!(store.get_all().is_empty());
    assert_eq!(
        drain(&mut rx),
        vec![BoardEvent::BillboardUpdated, BoardEvent::BillboardUpdated]
    );
}

#[test]
fn test_corrupt_history_reads_empty() {
    let backend = MemoryStore::with_entries([(keys::SENTENCE_RECORDS, "not json")]);
    let store = store_over(Arc::new(backend));
    assert!(store.get_all().is_empty());

    store.append(SentenceRecord::new("a", "1")).expect("append");
    assert_eq!(store.get_all().len(), 1);
}

#[test]
fn test_sled_history_survives_reopen() {
    let dir = tempfile::tempdir().expect("temp dir");
    {
        let backend = SledStore::open(dir.path()).expect("open");
        let store = store_over(Arc::new(backend));
        store.append(SentenceRecord::new("คำ", "ประโยค")).expect("append");
    }

    let backend = SledStore::open(dir.path()).expect("reopen");
    let store = store_over(Arc::new(backend));
    let records = store.get_all();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].sentence, "ประโยค");
}

fn record_strategy() -> impl Strategy<Value = SentenceRecord> {
    (
        prop::sample::select(vec!["a", "b"]),
        prop::sample::select(vec!["x", "y"]),
        prop::option::of(prop::sample::select(vec!["z", "w"])),
        prop::option::of(prop::sample::select(vec![
            Sentiment::Positive,
            Sentiment::Neutral,
            Sentiment::Negative,
        ])),
        0i64..5,
    )
        .prop_map(|(word, sentence, contributor, sentiment, secs)| {
            let mut record = SentenceRecord::new(word, sentence).with_timestamp(at(secs));
            record.contributor = contributor.map(ToString::to_string);
            if let Some(sentiment) = sentiment {
                record = record.with_sentiment(sentiment);
            }
            record
        })
}

proptest! {
    #[test]
    fn prop_dedup_is_idempotent(records in prop::collection::vec(record_strategy(), 0..20)) {
        let once = deduplicate(&records);
        prop_assert_eq!(deduplicate(&once), once);
    }

    #[test]
    fn prop_dedup_keeps_newest(records in prop::collection::vec(record_strategy(), 0..20)) {
        let unique = deduplicate(&records);
        for record in &records {
            let survivor = unique
                .iter()
                .find(|u| u.uniqueness_key() == record.uniqueness_key())
                .expect("every key survives");
            prop_assert!(survivor.timestamp >= record.timestamp);
        }
    }

    #[test]
    fn prop_sentiment_counts_sum_to_len(records in prop::collection::vec(record_strategy(), 0..20)) {
        let stats = compute_statistics(&records);
        prop_assert_eq!(
            stats.positive_count + stats.neutral_count + stats.negative_count,
            records.len()
        );
        prop_assert_eq!(stats.total, records.len());
    }
}
