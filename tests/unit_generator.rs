// Unit tests for the word2vec Key Generator.
//
// The model is a tiny text-format table: 詐欺 and 詐財 sit close to 詐騙,
// 騙取 is at cosine 0.6, 碳排 is orthogonal to all of them.

mod common;

use std::collections::BTreeMap;
use std::fs;

use biznews::generator::{
    GeneratorReport, InferParams, KeyGenerator, LoadMode, Word2VecKeyGenerator, WordVectorStore,
    WordVectors,
};
use biznews::BizNewsError;

use common::scratch_dir;

const MODEL: &str = "5 3\n詐騙 1 0 0\n詐欺 0.95 0.05 0\n詐財 0.9 0.2 0\n騙取 0.6 0.8 0\n碳排 0 0 1\n";

fn generator() -> Word2VecKeyGenerator {
    let vectors = WordVectors::read_text(MODEL.as_bytes()).unwrap();
    Word2VecKeyGenerator::with_vectors(vectors, "test", false)
}

// ============================================================
// infer: single words
// ============================================================

#[test]
fn related_words_above_threshold_best_first() {
    let mut generator = generator();
    generator
        .infer("詐騙", InferParams::default(), None, true)
        .unwrap();

    let result = generator.related_words("詐騙").unwrap();
    assert_eq!(
        result.related,
        vec![("詐欺".to_string(), 1.0), ("詐財".to_string(), 0.98)]
    );
    assert_eq!(result.debug.as_deref(), Some("related_word_cnt: 2 < topn: 10"));
}

#[test]
fn unknown_word_is_noted() {
    let mut generator = generator();
    generator
        .infer("洗錢", InferParams::default(), None, true)
        .unwrap();
    let result = generator.related_words("洗錢").unwrap();
    assert!(result.related.is_empty());
    assert_eq!(result.debug.as_deref(), Some("洗錢 never appeared before."));
}

#[test]
fn nothing_above_threshold_is_not_found() {
    let mut generator = generator();
    generator
        .infer("碳排", InferParams::default(), None, true)
        .unwrap();
    assert_eq!(
        generator.related_words("碳排").unwrap().debug.as_deref(),
        Some("Not found.")
    );
}

#[test]
fn results_accumulate_unless_reset() {
    let mut generator = generator();
    generator
        .infer("詐騙", InferParams::default(), None, true)
        .unwrap();
    let report = generator
        .infer("碳排", InferParams::default(), None, false)
        .unwrap();
    assert_eq!(report.results.len(), 2);
    assert_eq!(report.base, vec!["詐騙", "碳排"]);

    let report = generator
        .infer("碳排", InferParams::default(), None, true)
        .unwrap();
    assert_eq!(report.results.len(), 1);
}

// ============================================================
// infer: word lists and force_info
// ============================================================

#[test]
fn word_list_skips_duplicates_and_honours_force_info() {
    let dir = scratch_dir("generator-list");
    let list = dir.join("words.txt");
    fs::write(&list, "詐騙\n碳排\n詐騙\n").unwrap();

    let force = BTreeMap::from([(
        "碳排".to_string(),
        InferParams {
            topn: 1,
            threshold: 0.0,
        },
    )]);

    let mut generator = generator();
    let report = generator
        .infer(list.to_str().unwrap(), InferParams::default(), Some(force), true)
        .unwrap();

    assert_eq!(report.results.len(), 2);
    assert_eq!(report.results["碳排"].related.len(), 1);
    assert_eq!(report.results["碳排"].topn, 1);
    assert_eq!(report.results["詐騙"].topn, 10);
    assert!(report.force_info.is_some());

    let _ = fs::remove_dir_all(&dir);
}

// ============================================================
// save / load
// ============================================================

#[test]
fn json_report_survives_save_and_load() {
    let dir = scratch_dir("generator-json");
    let path = dir.join("nested").join("report.json");

    let mut generator = generator();
    generator
        .infer("詐騙", InferParams::default(), None, true)
        .unwrap();
    generator.save(&path).unwrap();

    let loaded = GeneratorReport::load_json(&path).unwrap();
    assert_eq!(&loaded, generator.report());

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn txt_report_lists_related_words_once() {
    let dir = scratch_dir("generator-txt");
    let path = dir.join("related.txt");

    let mut generator = generator();
    generator
        .infer("詐騙", InferParams::default(), None, true)
        .unwrap();
    generator
        .infer("詐欺", InferParams::default(), None, false)
        .unwrap();
    generator.save(&path).unwrap();

    let content = fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    let mut deduped = lines.clone();
    deduped.sort();
    deduped.dedup();
    assert_eq!(lines, deduped);
    assert!(lines.contains(&"詐財"));

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn unsupported_extension_is_rejected() {
    let err = generator()
        .save(&std::env::temp_dir().join("biznews-report.csv"))
        .unwrap_err();
    assert!(matches!(err, BizNewsError::UnsupportedFormat(_)));
}

// ============================================================
// WordVectorStore
// ============================================================

#[test]
fn store_opens_text_model_by_key() {
    let dir = scratch_dir("generator-store");
    fs::write(
        WordVectorStore::model_path(&dir, "news", LoadMode::Normal),
        MODEL,
    )
    .unwrap();

    let generator = Word2VecKeyGenerator::open(&dir, "news", LoadMode::Normal).unwrap();
    assert_eq!(generator.vectors().len(), 5);
    assert_eq!(generator.vectors().dim(), 3);
    assert!(!generator.report().use_fast);

    let err = Word2VecKeyGenerator::open(&dir, "news", LoadMode::Fast).err().unwrap();
    assert!(matches!(err, BizNewsError::MissingResource(_)));

    let _ = fs::remove_dir_all(&dir);
}
