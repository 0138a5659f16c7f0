//! Sentiment classification for templates, sentences and words.
//!
//! Templates carry their sentiment as an embedded marker (`${บวก}`, `${กลาง}`,
//! `${ลบ}`). Free text without a marker is classified lexically by counting
//! which keywords of two fixed lexicons occur in it.

use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use unicode_normalization::UnicodeNormalization;

use crate::error::Result;
use crate::models::{BadgeVariant, Sentiment, Template};

/// Marker for a positive template
pub const POSITIVE_MARKER: &str = "${บวก}";
/// Marker for a neutral template
pub const NEUTRAL_MARKER: &str = "${กลาง}";
/// Marker for a negative template
pub const NEGATIVE_MARKER: &str = "${ลบ}";

/// Markers in detection priority order
const MARKERS: [(&str, Sentiment); 3] = [
    (POSITIVE_MARKER, Sentiment::Positive),
    (NEGATIVE_MARKER, Sentiment::Negative),
    (NEUTRAL_MARKER, Sentiment::Neutral),
];

const POSITIVE_PATTERNS: [&str; 24] = [
    "ดี", "สุข", "สบาย", "รัก", "ชื่นชม", "ยินดี", "สำเร็จ", "เก่ง", "เยี่ยม",
    "น่ารัก", "สนุก", "สดใส", "มีความสุข", "สุดยอด", "ชอบ", "กำลังใจ",
    "หวัง", "พยายาม", "เติบโต", "ขอบคุณ", "มั่นใจ", "แข็งแรง", "ฝัน", "ส่งเสริม",
];

const NEGATIVE_PATTERNS: [&str; 22] = [
    "เศร้า", "เสียใจ", "ผิดหวัง", "กลัว", "กังวล", "ท้อ", "แย่", "ล้มเหลว",
    "หมดหวัง", "เหนื่อย", "โกรธ", "เจ็บปวด", "ร้องไห้", "หนัก", "ยาก",
    "ลำบาก", "ทุกข์", "สงสาร", "อ่อนแอ", "อันตราย", "อิจฉา", "หึง",
];

const POSITIVE_WORDS: [&str; 10] = [
    "สุข", "รัก", "หวัง", "ยิ้ม", "กล้า", "ฝัน", "ชนะ", "ศรัทธา", "ขอบคุณ", "เมตตา",
];
const NEUTRAL_WORDS: [&str; 9] = [
    "คิด", "เวลา", "เริ่ม", "ยอมรับ", "เข้าใจ", "เรียนรู้", "ปรับตัว", "สมดุล", "ทางออก",
];
const NEGATIVE_WORDS: [&str; 8] = [
    "เศร้า", "เหนื่อย", "ยาก", "กลัว", "สับสน", "ผิดหวัง", "เจ็บปวด", "ล้มเหลว",
];

/// Known words with their polarity weight in [-1, 1]
const WORD_POLARITY: [(&str, f32); 35] = [
    ("กำลังใจ", 0.8),
    ("ความหวัง", 0.7),
    ("ความฝัน", 0.6),
    ("ความสุข", 0.9),
    ("ความรัก", 0.8),
    ("พลัง", 0.7),
    ("ศรัทธา", 0.6),
    ("ความเชื่อ", 0.5),
    ("ความเพียร", 0.7),
    ("ความอดทน", 0.6),
    ("ความสำเร็จ", 0.8),
    ("ความดี", 0.7),
    ("ความจริง", 0.0),
    ("ความกล้า", 0.6),
    ("มิตรภาพ", 0.7),
    ("ครอบครัว", 0.8),
    ("ความสามัคคี", 0.7),
    ("สติปัญญา", 0.6),
    ("สุขภาพ", 0.7),
    ("การเรียนรู้", 0.6),
    ("การเติบโต", 0.6),
    ("ความเข้มแข็ง", 0.7),
    ("ความมุ่งมั่น", 0.7),
    ("ความตั้งใจ", 0.6),
    ("การให้อภัย", 0.7),
    ("ความเศร้า", -0.7),
    ("ความผิดหวัง", -0.6),
    ("ความเจ็บปวด", -0.8),
    ("ความกลัว", -0.7),
    ("ความโกรธ", -0.8),
    ("ความเหงา", -0.6),
    ("ความเหนื่อย", -0.5),
    ("ความท้อแท้", -0.7),
    ("ความสิ้นหวัง", -0.9),
    ("ความล้มเหลว", -0.8),
];

/// Average-score threshold above which a word list counts as positive
const WORD_ANALYSIS_THRESHOLD: f32 = 0.1;

/// Sentiment read from a template marker
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateSentiment {
    /// Sentiment the marker denoted, neutral when there was none
    pub sentiment: Sentiment,
    /// Template with every marker removed
    pub cleaned_text: String,
    /// Lexical score of the sentiment
    pub score: i32,
}

/// Sentiment inferred from free text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextSentiment {
    /// Inferred polarity
    pub sentiment: Sentiment,
    /// Lexical score of the polarity
    pub score: i32,
}

impl From<Sentiment> for TextSentiment {
    fn from(sentiment: Sentiment) -> Self {
        Self {
            sentiment,
            score: sentiment.lexical_score(),
        }
    }
}

/// Template counts per sentiment
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentimentBreakdown {
    /// Positive templates
    pub positive: usize,
    /// Neutral or unmarked templates
    pub neutral: usize,
    /// Negative templates
    pub negative: usize,
}

/// Polarity of a single word in a word-level analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WordPolarity {
    /// The word as given
    pub word: String,
    /// Polarity from the database, neutral when unknown
    pub sentiment: Sentiment,
    /// Weight from the database, 0 when unknown
    pub score: f32,
}

/// Word-level analysis of a list of words
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WordAnalysis {
    /// Overall polarity from the average score
    pub overall_sentiment: Sentiment,
    /// Average weight across all words
    pub score: f32,
    /// Per-word results in input order
    pub word_breakdown: Vec<WordPolarity>,
}

/// Read the marker of a template and strip every marker from its text.
///
/// Markers are checked positive, negative, neutral. All three are stripped
/// regardless of which one decided the sentiment. A template without a
/// marker is neutral and comes back unchanged.
#[must_use]
pub fn extract_from_template(template: &str) -> TemplateSentiment {
    let sentiment = MARKERS
        .iter()
        .find(|(marker, _)| template.contains(marker))
        .map_or(Sentiment::Neutral, |(_, sentiment)| *sentiment);

    TemplateSentiment {
        sentiment,
        cleaned_text: strip_markers(template),
        score: sentiment.lexical_score(),
    }
}

/// Remove all three marker forms from `text`
#[must_use]
pub fn strip_markers(text: &str) -> String {
    MARKERS
        .iter()
        .fold(text.to_string(), |acc, (marker, _)| acc.replace(marker, ""))
}

/// True if `text` carries any marker
#[must_use]
pub fn has_marker(text: &str) -> bool {
    MARKERS.iter().any(|(marker, _)| text.contains(marker))
}

/// Marker string for a sentiment
#[must_use]
pub const fn marker_for(sentiment: Sentiment) -> &'static str {
    match sentiment {
        Sentiment::Positive => POSITIVE_MARKER,
        Sentiment::Neutral => NEUTRAL_MARKER,
        Sentiment::Negative => NEGATIVE_MARKER,
    }
}

/// Lexical score; absent sentiment counts as neutral
#[must_use]
pub fn score_for(sentiment: Option<Sentiment>) -> i32 {
    sentiment.unwrap_or_default().lexical_score()
}

/// Leaderboard score; absent sentiment counts as neutral
#[must_use]
pub fn ranking_score_for(sentiment: Option<Sentiment>) -> i32 {
    sentiment.unwrap_or_default().ranking_score()
}

/// Badge category; absent sentiment counts as neutral
#[must_use]
pub fn badge_for(sentiment: Option<Sentiment>) -> BadgeVariant {
    sentiment.unwrap_or_default().badge()
}

/// Localized label; absent sentiment counts as neutral
#[must_use]
pub fn label_for(sentiment: Option<Sentiment>) -> &'static str {
    sentiment.unwrap_or_default().label()
}

/// Prefix each template's text with the marker of its sentiment
#[must_use]
pub fn to_template_strings(templates: &[Template]) -> Vec<String> {
    templates
        .iter()
        .map(|t| format!("{}{}", marker_for(t.sentiment), t.text))
        .collect()
}

/// Split marker-prefixed strings back into structured templates
#[must_use]
pub fn from_template_strings<S: AsRef<str>>(templates: &[S]) -> Vec<Template> {
    templates
        .iter()
        .map(|raw| {
            let extracted = extract_from_template(raw.as_ref());
            Template {
                text: extracted.cleaned_text,
                sentiment: extracted.sentiment,
            }
        })
        .collect()
}

/// Count templates per sentiment; unmarked templates count as neutral
#[must_use]
pub fn template_breakdown<S: AsRef<str>>(templates: &[S]) -> SentimentBreakdown {
    templates
        .iter()
        .fold(SentimentBreakdown::default(), |mut acc, template| {
            match extract_from_template(template.as_ref()).sentiment {
                Sentiment::Positive => acc.positive += 1,
                Sentiment::Neutral => acc.neutral += 1,
                Sentiment::Negative => acc.negative += 1,
            }
            acc
        })
}

/// Classify a single word against the short fixed word lists
#[must_use]
pub fn word_sentiment(word: &str) -> TextSentiment {
    if POSITIVE_WORDS.contains(&word) {
        Sentiment::Positive.into()
    } else if NEGATIVE_WORDS.contains(&word) {
        Sentiment::Negative.into()
    } else {
        Sentiment::Neutral.into()
    }
}

/// Keep the words that belong to the given category's word list
#[must_use]
pub fn filter_words_by_category<'a>(words: &[&'a str], category: Sentiment) -> Vec<&'a str> {
    let list: &[&str] = match category {
        Sentiment::Positive => &POSITIVE_WORDS,
        Sentiment::Neutral => &NEUTRAL_WORDS,
        Sentiment::Negative => &NEGATIVE_WORDS,
    };
    words.iter().copied().filter(|w| list.contains(w)).collect()
}

/// Polarity of a word from the polarity database
#[must_use]
pub fn word_polarity(word: &str) -> Option<(Sentiment, f32)> {
    WORD_POLARITY
        .iter()
        .find(|(known, _)| *known == word)
        .map(|(_, score)| (polarity_of_weight(*score), *score))
}

fn polarity_of_weight(score: f32) -> Sentiment {
    if score > 0.0 {
        Sentiment::Positive
    } else if score < 0.0 {
        Sentiment::Negative
    } else {
        Sentiment::Neutral
    }
}

/// Look every word up in the polarity database and average the weights.
///
/// Empty strings stay in the list as neutral zero weights and count
/// toward the average.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn analyze_words<S: AsRef<str>>(words: &[S]) -> WordAnalysis {
    let word_breakdown: Vec<WordPolarity> = words
        .iter()
        .map(AsRef::as_ref)
        .map(|word| {
            let (sentiment, score) = word_polarity(word).unwrap_or((Sentiment::Neutral, 0.0));
            WordPolarity {
                word: word.to_string(),
                sentiment,
                score,
            }
        })
        .collect();

    if word_breakdown.is_empty() {
        return WordAnalysis {
            overall_sentiment: Sentiment::Neutral,
            score: 0.0,
            word_breakdown,
        };
    }

    let total: f32 = word_breakdown.iter().map(|w| w.score).sum();
    let score = total / word_breakdown.len() as f32;
    let overall_sentiment = if score > WORD_ANALYSIS_THRESHOLD {
        Sentiment::Positive
    } else if score < -WORD_ANALYSIS_THRESHOLD {
        Sentiment::Negative
    } else {
        Sentiment::Neutral
    };

    WordAnalysis {
        overall_sentiment,
        score,
        word_breakdown,
    }
}

/// Sentiment classifier holding the normalized lexicons and compiled patterns
pub struct SentimentClassifier {
    placeholder_regex: Regex,
    positive_patterns: Vec<String>,
    negative_patterns: Vec<String>,
}

impl SentimentClassifier {
    /// Create a classifier with the built-in lexicons
    pub fn new() -> Result<Self> {
        let placeholder_regex = Regex::new(r"\$\{([^{}]*)\}")?;

        Ok(Self {
            placeholder_regex,
            positive_patterns: POSITIVE_PATTERNS.iter().map(|p| normalize(p)).collect(),
            negative_patterns: NEGATIVE_PATTERNS.iter().map(|p| normalize(p)).collect(),
        })
    }

    /// Classify text by keyword containment.
    ///
    /// Each lexicon keyword counts once if it occurs anywhere in the text.
    /// More positive hits than negative is positive, the reverse is negative,
    /// a tie is neutral.
    #[must_use]
    pub fn infer_from_text(&self, sentence: &str) -> TextSentiment {
        let text = normalize(sentence);
        let positive = self
            .positive_patterns
            .iter()
            .filter(|p| text.contains(p.as_str()))
            .count();
        let negative = self
            .negative_patterns
            .iter()
            .filter(|p| text.contains(p.as_str()))
            .count();

        let sentiment = match positive.cmp(&negative) {
            std::cmp::Ordering::Greater => Sentiment::Positive,
            std::cmp::Ordering::Less => Sentiment::Negative,
            std::cmp::Ordering::Equal => Sentiment::Neutral,
        };
        sentiment.into()
    }

    /// Classify a sentence, preferring the marker of its template when given
    #[must_use]
    pub fn analyze(&self, sentence: &str, template: Option<&str>) -> TemplateSentiment {
        if let Some(template) = template {
            return extract_from_template(template);
        }
        let inferred = self.infer_from_text(sentence);
        TemplateSentiment {
            sentiment: inferred.sentiment,
            cleaned_text: sentence.to_string(),
            score: inferred.score,
        }
    }

    /// Strip markers and resolve placeholders for display.
    ///
    /// `${word}` and `${<focus word>}` become the focus word; any other
    /// `${token}` is unwrapped to `token`.
    #[must_use]
    pub fn render(&self, template: &str, word: &str) -> String {
        let cleaned = strip_markers(template);
        self.placeholder_regex
            .replace_all(&cleaned, |caps: &Captures<'_>| {
                let token = caps.get(1).map_or("", |m| m.as_str());
                if token == "word" || token == word {
                    word.to_string()
                } else {
                    token.to_string()
                }
            })
            .into_owned()
    }
}

fn normalize(text: &str) -> String {
    text.nfc().collect::<String>().to_lowercase()
}
