//! Data models for words, templates and generated sentences
//!
//! This module contains the persisted shapes (stored as JSON blobs under the
//! storage keys) and the derived views computed from them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Display name used when a contributor did not give one.
pub const UNSPECIFIED_CONTRIBUTOR: &str = "ไม่ระบุชื่อ";

/// Ternary emotional polarity of a word, template or sentence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    /// Encouraging or uplifting
    Positive,
    /// Neither; also the fallback for anything unclassified
    #[default]
    Neutral,
    /// Sad, discouraging or painful
    Negative,
}

impl Sentiment {
    /// All three variants in display order
    pub const ALL: [Self; 3] = [Self::Positive, Self::Neutral, Self::Negative];

    /// Score on the lexical scale: positive 1, neutral 0, negative -1
    #[must_use]
    pub const fn lexical_score(self) -> i32 {
        match self {
            Self::Positive => 1,
            Self::Neutral => 0,
            Self::Negative => -1,
        }
    }

    /// Score on the leaderboard scale: positive 2, neutral 1, negative -1
    ///
    /// This is not the lexical scale shifted by one; negative stays at -1.
    #[must_use]
    pub const fn ranking_score(self) -> i32 {
        match self {
            Self::Positive => 2,
            Self::Neutral => 1,
            Self::Negative => -1,
        }
    }

    /// Visual category used by every display surface
    #[must_use]
    pub const fn badge(self) -> BadgeVariant {
        match self {
            Self::Positive => BadgeVariant::Emphasis,
            Self::Neutral => BadgeVariant::Muted,
            Self::Negative => BadgeVariant::Caution,
        }
    }

    /// Localized long label
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Positive => "เชิงบวก",
            Self::Neutral => "เป็นกลาง",
            Self::Negative => "เชิงลบ",
        }
    }

    /// Localized short label used in polarity logs
    #[must_use]
    pub const fn polarity_label(self) -> &'static str {
        match self {
            Self::Positive => "เชิงบวก",
            Self::Neutral => "กลาง",
            Self::Negative => "เชิงลบ",
        }
    }

    /// Lowercase identifier, matching the serialized form
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Positive => "positive",
            Self::Neutral => "neutral",
            Self::Negative => "negative",
        }
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Presentation category for a sentiment badge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BadgeVariant {
    /// Highlighted, used for positive
    Emphasis,
    /// Warning tone, used for negative
    Caution,
    /// Subdued, used for neutral and unknown
    Muted,
}

/// A known word and the sentence templates it can produce
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WordEntry {
    /// Display string; also the registry key
    pub word: String,
    /// Raw templates in insertion order
    #[serde(default)]
    pub templates: Vec<String>,
    /// True when added by a contributor rather than seeded
    #[serde(default)]
    pub is_custom: bool,
    /// Cached sentiment of the first template
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sentiment: Option<Sentiment>,
    /// Cached score
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f32>,
}

impl WordEntry {
    /// Create a seeded (non-custom) entry
    #[must_use]
    pub fn new(word: impl Into<String>, templates: Vec<String>) -> Self {
        Self {
            word: word.into(),
            templates,
            is_custom: false,
            sentiment: None,
            score: None,
        }
    }

    /// Mark the entry as contributor-added
    #[must_use]
    pub const fn custom(mut self) -> Self {
        self.is_custom = true;
        self
    }
}

/// A template split into its marker-free text and its sentiment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Template {
    /// Text without the sentiment marker
    pub text: String,
    /// Sentiment the marker denoted
    pub sentiment: Sentiment,
}

/// A generated sentence and its metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentenceRecord {
    /// Unique identifier, assigned on append when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Focus word highlighted in the sentence
    pub word: String,
    /// Rendered sentence text
    pub sentence: String,
    /// Contributor display name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contributor: Option<String>,
    /// Raw template the sentence was produced from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<String>,
    /// Polarity of the sentence
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sentiment: Option<Sentiment>,
    /// Numeric weight of the sentiment
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<i32>,
    /// Creation time, assigned on append when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
}

impl SentenceRecord {
    /// Create a record with only word and sentence set
    #[must_use]
    pub fn new(word: impl Into<String>, sentence: impl Into<String>) -> Self {
        Self {
            id: None,
            word: word.into(),
            sentence: sentence.into(),
            contributor: None,
            template: None,
            sentiment: None,
            score: None,
            timestamp: None,
        }
    }

    /// Set the contributor
    #[must_use]
    pub fn with_contributor(mut self, contributor: impl Into<String>) -> Self {
        self.contributor = Some(contributor.into());
        self
    }

    /// Set the source template
    #[must_use]
    pub fn with_template(mut self, template: impl Into<String>) -> Self {
        self.template = Some(template.into());
        self
    }

    /// Set sentiment and its lexical score
    #[must_use]
    pub const fn with_sentiment(mut self, sentiment: Sentiment) -> Self {
        self.sentiment = Some(sentiment);
        self.score = Some(sentiment.lexical_score());
        self
    }

    /// Set the creation time
    #[must_use]
    pub const fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    /// Contributor name, or the unspecified sentinel
    #[must_use]
    pub fn contributor_or_default(&self) -> &str {
        self.contributor
            .as_deref()
            .filter(|name| !name.trim().is_empty())
            .unwrap_or(UNSPECIFIED_CONTRIBUTOR)
    }

    /// Sentiment, treating absent as neutral
    #[must_use]
    pub fn sentiment_or_default(&self) -> Sentiment {
        self.sentiment.unwrap_or_default()
    }

    /// Word, sentence and contributor; records collapse during deduplication
    /// only when all three are equal
    #[must_use]
    pub fn uniqueness_key(&self) -> (&str, &str, &str) {
        (&self.word, &self.sentence, self.contributor_or_default())
    }
}

/// Aggregates over a sequence of sentence records
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Statistics {
    /// Number of records considered
    pub total: usize,
    /// Distinct contributor names (sentinel included)
    pub unique_contributors: usize,
    /// Records classified positive
    pub positive_count: usize,
    /// Records classified neutral or unclassified
    pub neutral_count: usize,
    /// Records classified negative
    pub negative_count: usize,
    /// Record with the longest marker-free sentence
    pub longest_record: Option<SentenceRecord>,
}

impl Statistics {
    /// Count for one sentiment
    #[must_use]
    pub const fn count_for(&self, sentiment: Sentiment) -> usize {
        match sentiment {
            Sentiment::Positive => self.positive_count,
            Sentiment::Neutral => self.neutral_count,
            Sentiment::Negative => self.negative_count,
        }
    }

    /// Share of records with the given sentiment, as a percentage
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn percentage(&self, sentiment: Sentiment) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.count_for(sentiment) as f64 * 100.0 / self.total as f64
    }
}

/// One leaderboard row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContributorStat {
    /// Contributor display name
    pub name: String,
    /// Number of words contributed
    pub count: u64,
}

/// A sentence annotated for leaderboard ranking
#[derive(Debug, Clone, PartialEq)]
pub struct RankedSentence {
    /// The underlying record
    pub record: SentenceRecord,
    /// Polarity recomputed from the template or the text
    pub polarity: Sentiment,
    /// Score on the ranking scale
    pub ranking_score: i32,
}
