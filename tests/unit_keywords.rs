// Unit tests for keyword sets and the keyword embedding cache.
//
// Filesystem tests work in per-test directories under the system temp dir
// and remove them when done.

mod common;

use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};

use biznews::embeddings::cache::{category_dir, load_cache_dir};
use biznews::embeddings::{CacheOptions, Embedding, EmbeddingProvider, KeywordEmbeddings};
use biznews::keywords::{KeywordSet, KeywordSource};
use biznews::models::Category;
use biznews::BizNewsError;

use common::scratch_dir;

/// Embeds every word as [len, 1, 0] and counts how many words it saw.
#[derive(Default)]
struct CountingEmbedder {
    calls: AtomicUsize,
}

impl EmbeddingProvider for CountingEmbedder {
    fn name(&self) -> &str {
        "counting"
    }

    fn embed_tokens(&self, tokens: &[String]) -> biznews::Result<Vec<Embedding>> {
        self.calls.fetch_add(tokens.len(), Ordering::SeqCst);
        Ok(tokens
            .iter()
            .map(|t| vec![t.chars().count() as f64, 1.0, 0.0])
            .collect())
    }
}

fn shipped_keywords() -> &'static Path {
    Path::new(concat!(env!("CARGO_MANIFEST_DIR"), "/keywords"))
}

// ============================================================
// KeywordSet
// ============================================================

#[test]
fn shipped_lists_load_for_both_categories() {
    for category in Category::KEYWORD_CATEGORIES {
        let set = KeywordSet::load(category, None, true, shipped_keywords()).unwrap();
        assert!(!set.is_empty(), "{category} has no default keywords");
        assert_eq!(set.category(), category);
    }
    let nn = KeywordSet::load(Category::NegativeNews, None, true, shipped_keywords()).unwrap();
    assert!(nn.contains("詐騙"));
}

#[test]
fn source_literals_and_files_are_merged_and_deduplicated() {
    let dir = scratch_dir("keywords-merge");
    let category_dir = dir.join("esg");
    fs::create_dir_all(&category_dir).unwrap();
    fs::write(category_dir.join("a.txt"), "減碳\n永續\n").unwrap();
    fs::write(category_dir.join("ignored.csv"), "不讀\n").unwrap();
    let extra = dir.join("extra.txt");
    fs::write(&extra, "\u{feff}綠電\n減碳\n\n").unwrap();

    let source = KeywordSource::new(["碳權".to_string(), extra.to_str().unwrap().to_string()]);
    let set = KeywordSet::load(Category::EsgNews, Some(&source), true, &dir).unwrap();

    let words: Vec<&str> = set.iter().collect();
    assert_eq!(words.len(), 4);
    for word in ["減碳", "永續", "綠電", "碳權"] {
        assert!(set.contains(word), "missing {word}");
    }
    assert!(!set.contains("不讀"));

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn source_only_skips_default_lists() {
    let source = KeywordSource::from("詐騙");
    let set = KeywordSet::load(
        Category::NegativeNews,
        Some(&source),
        false,
        Path::new("/nonexistent/biznews"),
    )
    .unwrap();
    assert_eq!(set.iter().collect::<Vec<_>>(), vec!["詐騙"]);
}

#[test]
fn missing_default_directory_is_missing_resource() {
    let err = KeywordSet::load(Category::EsgNews, None, true, Path::new("/nonexistent/biznews"))
        .unwrap_err();
    assert!(matches!(err, BizNewsError::MissingResource(_)));
}

#[test]
fn other_category_has_no_keyword_set() {
    let err = KeywordSet::load(Category::Other, None, false, shipped_keywords()).unwrap_err();
    assert!(matches!(err, BizNewsError::InvalidCategory(_)));
}

#[test]
fn category_names_parse_case_insensitively() {
    let set = KeywordSet::load_named("Negative_News", None, true, shipped_keywords()).unwrap();
    assert_eq!(set.category(), Category::NegativeNews);
    let err = KeywordSet::load_named("Sports", None, true, shipped_keywords()).unwrap_err();
    assert!(matches!(err, BizNewsError::InvalidCategory(_)));
}

// ============================================================
// KeywordEmbeddings cache
// ============================================================

fn options(dir: &Path, load: bool, save: bool, merge: bool) -> CacheOptions {
    CacheOptions {
        dir: dir.to_path_buf(),
        load_cache: load,
        save_cache: save,
        merge_cached_keywords: merge,
    }
}

#[test]
fn saved_vectors_are_reused_on_load() {
    let dir = scratch_dir("cache-reuse");
    let keywords = KeywordSet::from_keywords(Category::NegativeNews, ["詐騙", "掏空"]).unwrap();

    let embedder = CountingEmbedder::default();
    let built = KeywordEmbeddings::build(keywords.clone(), &embedder, &options(&dir, false, true, true))
        .unwrap();
    assert_eq!(embedder.calls.load(Ordering::SeqCst), 2);
    assert!(dir.join("counting").join("negative_news").join("詐騙.json").is_file());

    let reloaded_embedder = CountingEmbedder::default();
    let reloaded =
        KeywordEmbeddings::build(keywords, &reloaded_embedder, &options(&dir, true, false, true))
            .unwrap();
    assert_eq!(reloaded_embedder.calls.load(Ordering::SeqCst), 0);
    assert_eq!(reloaded.get("掏空"), built.get("掏空"));

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn cached_only_keywords_merge_into_set() {
    let dir = scratch_dir("cache-merge");
    let wide = KeywordSet::from_keywords(Category::NegativeNews, ["詐騙", "背信"]).unwrap();
    KeywordEmbeddings::build(wide, &CountingEmbedder::default(), &options(&dir, false, true, true))
        .unwrap();

    let narrow = KeywordSet::from_keywords(Category::NegativeNews, ["詐騙"]).unwrap();
    let merged = KeywordEmbeddings::build(
        narrow.clone(),
        &CountingEmbedder::default(),
        &options(&dir, true, false, true),
    )
    .unwrap();
    assert_eq!(merged.len(), 2);
    assert!(merged.keywords().contains("背信"));

    let unmerged = KeywordEmbeddings::build(
        narrow,
        &CountingEmbedder::default(),
        &options(&dir, true, false, false),
    )
    .unwrap();
    assert_eq!(unmerged.len(), 1);
    assert!(unmerged.get("背信").is_none());

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn loading_absent_cache_is_missing_resource() {
    let dir = scratch_dir("cache-absent");
    let keywords = KeywordSet::from_keywords(Category::EsgNews, ["減碳"]).unwrap();
    let err = KeywordEmbeddings::build(keywords, &CountingEmbedder::default(), &options(&dir, true, false, true))
        .unwrap_err();
    assert!(matches!(err, BizNewsError::MissingResource(_)));
    assert!(load_cache_dir(&category_dir(&dir, "counting", Category::EsgNews)).is_err());

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn keyword_with_path_separator_cannot_be_saved() {
    let dir = scratch_dir("cache-separator");
    let keywords = KeywordSet::from_keywords(Category::EsgNews, ["碳/排放"]).unwrap();
    let err = KeywordEmbeddings::build(keywords, &CountingEmbedder::default(), &options(&dir, false, true, true))
        .unwrap_err();
    assert!(matches!(err, BizNewsError::InvalidArgument(_)));
    assert!(!dir.exists());

    let _ = fs::remove_dir_all(&dir);
}
