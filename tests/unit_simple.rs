// Unit tests for the literal keyword comparator.
//
// Scores here are computed by hand from the saturating curve
// 0.5 + 0.5 / 225 * count^2, with one title hit worth three body hits
// under the default weights.

use biznews::comparator::{Comparator, SimpleComparator, SimpleOptions};
use biznews::keywords::KeywordSet;
use biznews::models::{Category, DebugSegment};
use biznews::BizNewsError;

fn fraud_comparator() -> SimpleComparator {
    let keywords = KeywordSet::from_keywords(Category::NegativeNews, ["詐欺", "詐騙"]).unwrap();
    SimpleComparator::new(keywords, SimpleOptions::default())
}

// ============================================================
// classify: title and body weighting
// ============================================================

#[test]
fn title_and_body_hit_is_negative_news() {
    let result = fraud_comparator()
        .classify("詐欺案", "警方調查詐騙集團。")
        .unwrap();
    // 3 * 1 title hit + 1 body hit = 4 -> 0.5356
    assert_eq!(result.score, 0.54);
    assert_eq!(result.category, Category::NegativeNews);
    assert_eq!(result.matched_keywords, vec!["詐欺", "詐騙"]);
    assert!(result.debug.is_none());
}

#[test]
fn single_body_hit_does_not_exceed_threshold() {
    let result = fraud_comparator().classify("市場消息", "傳出詐騙。").unwrap();
    assert_eq!(result.score, 0.5);
    assert_eq!(result.category, Category::Other);
    assert_eq!(result.matched_keywords, vec!["詐騙"]);
}

#[test]
fn no_hits_is_other_with_zero_score() {
    let result = fraud_comparator()
        .classify("央行維持利率不變", "市場反應平穩。")
        .unwrap();
    assert_eq!(result.score, 0.0);
    assert_eq!(result.category, Category::Other);
    assert!(result.matched_keywords.is_empty());
}

#[test]
fn empty_keyword_set_never_matches() {
    let keywords = KeywordSet::from_keywords(Category::EsgNews, Vec::<String>::new()).unwrap();
    let comparator = SimpleComparator::new(keywords, SimpleOptions::default());
    let result = comparator.classify("減碳目標", "公司宣布減碳。").unwrap();
    assert_eq!(result.score, 0.0);
    assert_eq!(result.category, Category::Other);
}

#[test]
fn five_title_hits_saturate() {
    let result = fraud_comparator()
        .classify("詐騙詐騙詐騙詐騙詐騙", "")
        .unwrap();
    assert_eq!(result.score, 1.0);
    assert_eq!(result.category, Category::NegativeNews);
}

#[test]
fn matches_do_not_overlap() {
    let keywords = KeywordSet::from_keywords(Category::NegativeNews, ["詐詐"]).unwrap();
    let comparator = SimpleComparator::new(keywords, SimpleOptions::default());
    let result = comparator.classify("", "詐詐詐。").unwrap();
    assert_eq!(result.score, 0.5);
}

#[test]
fn custom_weights_change_title_ratio() {
    let options = SimpleOptions {
        title_weight: 0.2,
        body_weight: 0.1,
        ..SimpleOptions::default()
    };
    assert_eq!(options.title_ratio().unwrap(), 2.0);

    // 2 * 1 title hit = 2 -> 0.5089
    let result = fraud_comparator()
        .classify_with("詐欺案", "", &options)
        .unwrap();
    assert_eq!(result.score, 0.51);
}

#[test]
fn zero_body_weight_is_rejected() {
    let options = SimpleOptions {
        body_weight: 0.0,
        ..SimpleOptions::default()
    };
    let err = fraud_comparator()
        .classify_with("詐欺案", "", &options)
        .unwrap_err();
    assert!(matches!(err, BizNewsError::InvalidArgument(_)));
}

// ============================================================
// classify: debug segments and keyword order
// ============================================================

#[test]
fn debug_lists_title_then_matching_sentences() {
    let options = SimpleOptions {
        debug: true,
        ..SimpleOptions::default()
    };
    let result = fraud_comparator()
        .classify_with("詐欺案", "警方調查詐騙集團。天氣晴。詐騙再起！", &options)
        .unwrap();

    // 3 + 2 = 5 -> 0.5556
    assert_eq!(result.score, 0.56);
    assert_eq!(result.matched_keywords, vec!["詐騙", "詐欺"]);
    assert_eq!(
        result.debug.unwrap(),
        vec![
            DebugSegment {
                keywords: vec!["詐欺".into()],
                text: "詐欺案".into(),
            },
            DebugSegment {
                keywords: vec!["詐騙".into()],
                text: "警方調查詐騙集團。".into(),
            },
            DebugSegment {
                keywords: vec!["詐騙".into()],
                text: "詐騙再起！".into(),
            },
        ]
    );
}

#[test]
fn higher_threshold_keeps_score_but_drops_category() {
    let options = SimpleOptions {
        threshold: 0.6,
        ..SimpleOptions::default()
    };
    let result = fraud_comparator()
        .classify_with("詐欺案", "警方調查詐騙集團。", &options)
        .unwrap();
    assert_eq!(result.score, 0.54);
    assert_eq!(result.category, Category::Other);
}
