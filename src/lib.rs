//! Motivation Board - Thai motivational sentence word board
//!
//! A Rust library for collecting words, rotating their sentence templates,
//! and keeping a classified history of the sentences generated from them.
//!
//! # Features
//!
//! - Word registry with custom templates and sentiment markers
//! - Per-word template rotation with automatic recycling
//! - Marker and keyword based sentiment classification
//! - Sentence history with deduplication, statistics and rankings
//! - Contributor leaderboard

/// Time source for timestamps
pub mod clock;
/// Configuration management
pub mod config;
/// Contributor identity and statistics
pub mod contributors;
/// Error types
pub mod error;
/// Change notifications
pub mod events;
/// Logging setup and utilities
pub mod logging;
/// Metrics collection
pub mod metrics;
/// Data models and structures
pub mod models;
/// Sentence history
pub mod sentence_store;
/// Sentiment classification
pub mod sentiment;
/// Board operations
pub mod service;
/// Key-value persistence
pub mod storage;
/// Template rotation
pub mod template_tracker;
/// Input validation and template parsing
pub mod validation;
/// Word registry
pub mod word_store;

// Re-export key components for easier access
pub use error::{BoardError, Result};
pub use events::{BoardEvent, EventBus};
pub use models::{SentenceRecord, Sentiment, Statistics, WordEntry};
pub use service::{GeneratedSentence, MotivationService};
pub use sentiment::SentimentClassifier;
pub use storage::{KeyValueStore, MemoryStore, SledStore};
