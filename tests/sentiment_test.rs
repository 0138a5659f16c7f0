//! Sentiment classifier behavior and properties

use proptest::prelude::*;

use motivation_board::models::{BadgeVariant, Sentiment, Template};
use motivation_board::sentiment::{
    analyze_words, badge_for, extract_from_template, filter_words_by_category, from_template_strings,
    has_marker, label_for, ranking_score_for, score_for, strip_markers, template_breakdown,
    to_template_strings, word_sentiment, SentimentClassifier, NEGATIVE_MARKER, NEUTRAL_MARKER,
    POSITIVE_MARKER,
};

fn classifier() -> SentimentClassifier {
    SentimentClassifier::new().expect("classifier")
}

#[test]
fn test_extract_positive_marker() {
    let extracted = extract_from_template("${บวก}ความพยายามคือกุญแจ");
    assert_eq!(extracted.sentiment, Sentiment::Positive);
    assert_eq!(extracted.cleaned_text, "ความพยายามคือกุญแจ");
    assert_eq!(extracted.score, 1);
}

#[test]
fn test_extract_marker_priority() {
    let extracted = extract_from_template("${กลาง}a${ลบ}b${บวก}c");
    assert_eq!(extracted.sentiment, Sentiment::Positive);
    assert_eq!(extracted.cleaned_text, "abc");

    let extracted = extract_from_template("${กลาง}a${ลบ}b");
    assert_eq!(extracted.sentiment, Sentiment::Negative);
    assert_eq!(extracted.score, -1);
}

#[test]
fn test_marker_in_middle_is_found() {
    let extracted = extract_from_template("เริ่ม${ลบ}จบ");
    assert_eq!(extracted.sentiment, Sentiment::Negative);
    assert_eq!(extracted.cleaned_text, "เริ่มจบ");
}

#[test]
fn test_two_positive_keywords_are_positive() {
    let inferred = classifier().infer_from_text("วันนี้มีความสุขและขอบคุณทุกคน");
    assert_eq!(inferred.sentiment, Sentiment::Positive);
    assert_eq!(inferred.score, 1);
}

#[test]
fn test_tie_is_neutral() {
    let inferred = classifier().infer_from_text("เหนื่อยแต่มีกำลังใจ");
    assert_eq!(inferred.sentiment, Sentiment::Neutral);
}

#[test]
fn test_negative_majority() {
    let inferred = classifier().infer_from_text("เศร้าและผิดหวัง");
    assert_eq!(inferred.sentiment, Sentiment::Negative);
}

#[test]
fn test_keyword_counts_once() {
    let inferred = classifier().infer_from_text("เศร้า เศร้า เศร้า แต่รัก และเก่ง");
    assert_eq!(inferred.sentiment, Sentiment::Positive);
}

#[test]
fn test_analyze_prefers_template() {
    let analyzed = classifier().analyze("เศร้ามาก", Some("${บวก}x"));
    assert_eq!(analyzed.sentiment, Sentiment::Positive);

    let analyzed = classifier().analyze("เศร้ามาก", None);
    assert_eq!(analyzed.sentiment, Sentiment::Negative);
    assert_eq!(analyzed.cleaned_text, "เศร้ามาก");
}

#[test]
fn test_render_resolves_placeholders() {
    let classifier = classifier();
    assert_eq!(
        classifier.render("${บวก}${กำลังใจ}คือสิ่งสำคัญ", "กำลังใจ"),
        "กำลังใจคือสิ่งสำคัญ"
    );
    assert_eq!(classifier.render("${word} ช่วยได้", "พลัง"), "พลัง ช่วยได้");
    assert_eq!(classifier.render("มี${อื่น}อยู่", "พลัง"), "มีอื่นอยู่");
}

#[test]
fn test_presentation_mappings() {
    assert_eq!(score_for(Some(Sentiment::Positive)), 1);
    assert_eq!(score_for(None), 0);
    assert_eq!(ranking_score_for(Some(Sentiment::Positive)), 2);
    assert_eq!(ranking_score_for(None), 1);
    assert_eq!(ranking_score_for(Some(Sentiment::Negative)), -1);
    assert_eq!(badge_for(Some(Sentiment::Positive)), BadgeVariant::Emphasis);
    assert_eq!(badge_for(Some(Sentiment::Negative)), BadgeVariant::Caution);
    assert_eq!(badge_for(None), BadgeVariant::Muted);
    assert_eq!(label_for(None), "เป็นกลาง");
    assert_eq!(Sentiment::Neutral.polarity_label(), "กลาง");
}

#[test]
fn test_template_string_conversions() {
    let templates = vec![
        Template {
            text: "หนึ่ง".to_string(),
            sentiment: Sentiment::Positive,
        },
        Template {
            text: "สอง".to_string(),
            sentiment: Sentiment::Negative,
        },
    ];
    let strings = to_template_strings(&templates);
    assert_eq!(strings, vec!["${บวก}หนึ่ง", "${ลบ}สอง"]);
    assert_eq!(from_template_strings(strings.as_slice()), templates);
}

#[test]
fn test_template_breakdown_counts_unmarked_as_neutral() {
    let breakdown = template_breakdown(&["${บวก}a", "${ลบ}b", "c", "${กลาง}d"]);
    assert_eq!(breakdown.positive, 1);
    assert_eq!(breakdown.negative, 1);
    assert_eq!(breakdown.neutral, 2);
}

#[test]
fn test_word_lists() {
    assert_eq!(word_sentiment("ยิ้ม").sentiment, Sentiment::Positive);
    assert_eq!(word_sentiment("สับสน").sentiment, Sentiment::Negative);
    assert_eq!(word_sentiment("โต๊ะ").sentiment, Sentiment::Neutral);
    assert_eq!(
        filter_words_by_category(&["ยิ้ม", "เวลา", "กลัว"], Sentiment::Neutral),
        vec!["เวลา"]
    );
}

#[test]
fn test_analyze_words_threshold() {
    let analysis = analyze_words(&["ความจริง", "โต๊ะ"]);
    assert_eq!(analysis.overall_sentiment, Sentiment::Neutral);
    assert_eq!(analysis.word_breakdown.len(), 2);

    let analysis = analyze_words(&["กำลังใจ", "โต๊ะ"]);
    assert_eq!(analysis.overall_sentiment, Sentiment::Positive);
    assert_eq!(analysis.word_breakdown[1].sentiment, Sentiment::Neutral);

    let empty: [&str; 0] = [];
    assert_eq!(analyze_words(&empty).overall_sentiment, Sentiment::Neutral);
}

#[test]
fn test_analyze_words_counts_empty_words() {
    let analysis = analyze_words(&["กำลังใจ", "", ""]);
    assert_eq!(analysis.overall_sentiment, Sentiment::Positive);
    assert_eq!(analysis.word_breakdown.len(), 3);
    assert_eq!(analysis.word_breakdown[2].sentiment, Sentiment::Neutral);

    let mut diluted = vec!["ความหวัง"];
    diluted.extend([""; 7]);
    let analysis = analyze_words(&diluted);
    assert_eq!(analysis.word_breakdown.len(), 8);
    assert_eq!(analysis.overall_sentiment, Sentiment::Neutral);
}

fn marker_strategy() -> impl Strategy<Value = (&'static str, Sentiment)> {
    prop::sample::select(vec![
        (POSITIVE_MARKER, Sentiment::Positive),
        (NEUTRAL_MARKER, Sentiment::Neutral),
        (NEGATIVE_MARKER, Sentiment::Negative),
    ])
}

proptest! {
    #[test]
    fn prop_single_marker_decides_sentiment(
        (marker, sentiment) in marker_strategy(),
        before in "[a-zก-ฮ ]{0,12}",
        after in "[a-zก-ฮ ]{0,12}",
    ) {
        let template = format!("{before}{marker}{after}");
        let extracted = extract_from_template(&template);
        prop_assert_eq!(extracted.sentiment, sentiment);
        prop_assert!(!has_marker(&extracted.cleaned_text));
        prop_assert_eq!(extracted.cleaned_text, format!("{before}{after}"));
    }

    #[test]
    fn prop_unmarked_template_is_identity(template in "[^$]{0,30}") {
        let extracted = extract_from_template(&template);
        prop_assert_eq!(extracted.sentiment, Sentiment::Neutral);
        prop_assert_eq!(&extracted.cleaned_text, &template);
        prop_assert_eq!(strip_markers(&template), template);
    }
}
