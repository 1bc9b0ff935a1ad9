// Keyword embedding cache: one vector per keyword of a category.
//
// Built once when a comparator is constructed and read-only afterwards.
// Vectors can be loaded from a flat on-disk store
// (`<dir>/<provider>/<slug>/<keyword>.json`, one JSON float array per file),
// computed through the embedding provider, or both; the result can be written
// back for the next run. Vectors from different providers never share a
// directory since their dimensions differ.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use super::traits::{Embedding, EmbeddingProvider};
use crate::error::{BizNewsError, Result};
use crate::keywords::KeywordSet;
use crate::models::Category;

/// File extension of persisted keyword vectors.
pub const CACHE_EXTENSION: &str = "json";

/// Where the keyword cache lives and how it is used.
#[derive(Debug, Clone)]
pub struct CacheOptions {
    /// Cache root; each provider and category pair uses its own subdirectory.
    pub dir: PathBuf,
    /// Read previously saved vectors. The category directory must exist.
    pub load_cache: bool,
    /// Write every vector back after construction.
    pub save_cache: bool,
    /// Add keywords found only in the cache to the effective keyword set.
    pub merge_cached_keywords: bool,
}

impl Default for CacheOptions {
    fn default() -> Self {
        Self {
            dir: default_cache_dir(),
            load_cache: false,
            save_cache: false,
            merge_cached_keywords: true,
        }
    }
}

/// Default cache root: ~/.local/share/biznews/keywords on Linux.
pub fn default_cache_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("biznews")
        .join("keywords")
}

/// Directory holding the vectors `provider` computed for `category`.
pub fn category_dir(root: &Path, provider: &str, category: Category) -> PathBuf {
    root.join(provider).join(category.slug())
}

/// Keyword vectors for one category. Every keyword in `keywords()` has
/// exactly one vector.
#[derive(Debug, Clone)]
pub struct KeywordEmbeddings {
    keywords: KeywordSet,
    vectors: BTreeMap<String, Embedding>,
}

impl KeywordEmbeddings {
    /// Load and/or compute the vector of every keyword.
    ///
    /// Fails as a whole if any keyword cannot be embedded; no partially
    /// populated cache is ever returned or saved.
    pub fn build(
        keywords: KeywordSet,
        embedder: &dyn EmbeddingProvider,
        options: &CacheOptions,
    ) -> Result<Self> {
        let dir = category_dir(&options.dir, embedder.name(), keywords.category());

        let cached = if options.load_cache {
            load_cache_dir(&dir)?
        } else {
            BTreeMap::new()
        };

        let keywords = if options.merge_cached_keywords {
            let extra: Vec<String> = cached
                .keys()
                .filter(|k| !keywords.contains(k))
                .cloned()
                .collect();
            if !extra.is_empty() {
                info!(
                    category = keywords.category().as_str(),
                    added = extra.len(),
                    "Cache contributed keywords not in the configured set"
                );
            }
            keywords.extended(extra)
        } else {
            keywords
        };

        let mut vectors = BTreeMap::new();
        let mut computed = 0usize;
        for keyword in keywords.iter() {
            let vector = match cached.get(keyword) {
                Some(v) => v.clone(),
                None => {
                    computed += 1;
                    embedder.embed_word(keyword)?
                }
            };
            vectors.insert(keyword.to_string(), vector);
        }
        check_dimensions(&vectors)?;

        info!(
            category = keywords.category().as_str(),
            keywords = vectors.len(),
            from_cache = vectors.len() - computed,
            computed,
            backend = embedder.name(),
            "Keyword embeddings ready"
        );

        let built = Self { keywords, vectors };
        if options.save_cache {
            built.save(&dir)?;
        }
        Ok(built)
    }

    /// Wrap vectors that are already in memory. The keyword set is the key
    /// set of `vectors`.
    pub fn from_vectors(category: Category, vectors: BTreeMap<String, Embedding>) -> Result<Self> {
        let keywords = KeywordSet::from_keywords(category, vectors.keys().cloned())?;
        Ok(Self { keywords, vectors })
    }

    /// Write every vector to `dir/<keyword>.json`, creating `dir` if needed.
    pub fn save(&self, dir: &Path) -> Result<()> {
        if let Some(keyword) = self.vectors.keys().find(|k| k.contains(['/', '\\'])) {
            return Err(BizNewsError::InvalidArgument(format!(
                "keyword {keyword:?} cannot be used as a cache file name"
            )));
        }
        fs::create_dir_all(dir).map_err(|e| BizNewsError::io(dir, e))?;

        for (keyword, vector) in &self.vectors {
            let path = dir.join(format!("{keyword}.{CACHE_EXTENSION}"));
            let json = serde_json::to_string(vector)?;
            fs::write(&path, json).map_err(|e| BizNewsError::io(&path, e))?;
        }

        info!(
            count = self.vectors.len(),
            dir = %dir.display(),
            "Saved keyword embeddings"
        );
        Ok(())
    }

    pub fn category(&self) -> Category {
        self.keywords.category()
    }

    /// The effective keyword set (configured keywords plus any merged from
    /// the cache).
    pub fn keywords(&self) -> &KeywordSet {
        &self.keywords
    }

    pub fn get(&self, keyword: &str) -> Option<&Embedding> {
        self.vectors.get(keyword)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Embedding)> {
        self.vectors.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }
}

/// All vectors of one cache must have the same length.
fn check_dimensions(vectors: &BTreeMap<String, Embedding>) -> Result<()> {
    let mut iter = vectors.iter();
    let Some((first, expected)) = iter.next() else {
        return Ok(());
    };
    match iter.find(|(_, v)| v.len() != expected.len()) {
        Some((keyword, vector)) => Err(BizNewsError::InvalidArgument(format!(
            "keyword {keyword:?} has a {}-dimensional vector but {first:?} has {}",
            vector.len(),
            expected.len()
        ))),
        None => Ok(()),
    }
}

/// Read every `<keyword>.json` vector in `dir`.
pub fn load_cache_dir(dir: &Path) -> Result<BTreeMap<String, Embedding>> {
    if !dir.is_dir() {
        return Err(BizNewsError::MissingResource(dir.to_path_buf()));
    }

    let mut vectors = BTreeMap::new();
    for entry in fs::read_dir(dir).map_err(|e| BizNewsError::io(dir, e))? {
        let path = entry.map_err(|e| BizNewsError::io(dir, e))?.path();
        if path.extension().and_then(|e| e.to_str()) != Some(CACHE_EXTENSION) {
            continue;
        }
        let Some(keyword) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };

        let json = fs::read_to_string(&path).map_err(|e| BizNewsError::io(&path, e))?;
        let vector: Embedding = serde_json::from_str(&json)?;
        vectors.insert(keyword.to_string(), vector);
    }

    debug!(count = vectors.len(), dir = %dir.display(), "Loaded cached keyword embeddings");
    Ok(vectors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embeddings::lexical::LexicalEmbedder;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("biznews-cache-{name}-{}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        dir
    }

    fn nn_set(words: &[&str]) -> KeywordSet {
        KeywordSet::from_keywords(Category::NegativeNews, words.iter().copied()).unwrap()
    }

    #[test]
    fn test_build_computes_every_keyword() {
        let embedder = LexicalEmbedder::new(16);
        let options = CacheOptions {
            dir: scratch_dir("compute"),
            ..CacheOptions::default()
        };
        let cache = KeywordEmbeddings::build(nn_set(&["詐欺", "詐騙"]), &embedder, &options).unwrap();
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get("詐欺").unwrap().len(), 16);
    }

    #[test]
    fn test_load_cache_missing_dir_fails() {
        let embedder = LexicalEmbedder::new(16);
        let options = CacheOptions {
            dir: scratch_dir("missing"),
            load_cache: true,
            ..CacheOptions::default()
        };
        let err = KeywordEmbeddings::build(nn_set(&["詐欺"]), &embedder, &options).unwrap_err();
        assert!(matches!(err, BizNewsError::MissingResource(_)));
    }

    #[test]
    fn test_save_then_load_merges_cached_keywords() {
        let root = scratch_dir("merge");
        let embedder = LexicalEmbedder::new(16);

        let save = CacheOptions {
            dir: root.clone(),
            save_cache: true,
            ..CacheOptions::default()
        };
        KeywordEmbeddings::build(nn_set(&["詐欺", "洗錢"]), &embedder, &save).unwrap();
        assert!(root.join("lexical").join("negative_news").join("洗錢.json").exists());

        let load = CacheOptions {
            dir: root.clone(),
            load_cache: true,
            ..CacheOptions::default()
        };
        let cache = KeywordEmbeddings::build(nn_set(&["詐欺"]), &embedder, &load).unwrap();
        assert!(cache.keywords().contains("洗錢"));
        assert_eq!(cache.len(), 2);

        let strict = CacheOptions {
            merge_cached_keywords: false,
            ..load
        };
        let cache = KeywordEmbeddings::build(nn_set(&["詐欺"]), &embedder, &strict).unwrap();
        assert!(!cache.keywords().contains("洗錢"));
        assert_eq!(cache.len(), 1);

        fs::remove_dir_all(&root).unwrap();
    }

    #[test]
    fn test_cached_vector_wins_over_recompute() {
        let root = scratch_dir("prefer");
        let dir = category_dir(&root, "lexical", Category::NegativeNews);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("詐欺.json"), "[1.0, 0.0]").unwrap();

        let options = CacheOptions {
            dir: root.clone(),
            load_cache: true,
            ..CacheOptions::default()
        };
        let cache =
            KeywordEmbeddings::build(nn_set(&["詐欺"]), &LexicalEmbedder::new(16), &options).unwrap();
        assert_eq!(cache.get("詐欺").unwrap(), &vec![1.0, 0.0]);

        fs::remove_dir_all(&root).unwrap();
    }

    #[test]
    fn test_cache_dir_is_keyed_by_provider() {
        let root = scratch_dir("provider");
        let save = CacheOptions {
            dir: root.clone(),
            save_cache: true,
            ..CacheOptions::default()
        };
        KeywordEmbeddings::build(nn_set(&["詐欺"]), &LexicalEmbedder::new(16), &save).unwrap();

        let load = CacheOptions {
            dir: root.clone(),
            load_cache: true,
            ..CacheOptions::default()
        };
        let err = KeywordEmbeddings::build(nn_set(&["詐欺"]), &OtherEmbedder, &load).unwrap_err();
        assert!(matches!(err, BizNewsError::MissingResource(_)));

        let cache = KeywordEmbeddings::build(nn_set(&["詐欺"]), &LexicalEmbedder::new(16), &load).unwrap();
        assert_eq!(cache.get("詐欺").unwrap().len(), 16);

        fs::remove_dir_all(&root).unwrap();
    }

    #[test]
    fn test_mixed_dimensions_are_rejected() {
        let root = scratch_dir("dims");
        let dir = category_dir(&root, "lexical", Category::NegativeNews);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("詐欺.json"), "[1.0, 0.0]").unwrap();

        let options = CacheOptions {
            dir: root.clone(),
            load_cache: true,
            ..CacheOptions::default()
        };
        let err = KeywordEmbeddings::build(nn_set(&["詐欺", "洗錢"]), &LexicalEmbedder::new(16), &options)
            .unwrap_err();
        assert!(matches!(err, BizNewsError::InvalidArgument(_)));

        fs::remove_dir_all(&root).unwrap();
    }

    #[test]
    fn test_save_writes_nothing_when_a_keyword_is_unusable() {
        let root = scratch_dir("unusable");
        let vectors = BTreeMap::from([
            ("一".to_string(), vec![1.0, 0.0]),
            ("碳/排放".to_string(), vec![0.0, 1.0]),
        ]);
        let cache = KeywordEmbeddings::from_vectors(Category::EsgNews, vectors).unwrap();

        let err = cache.save(&root).unwrap_err();
        assert!(matches!(err, BizNewsError::InvalidArgument(_)));
        assert!(!root.exists());
    }

    struct OtherEmbedder;

    impl EmbeddingProvider for OtherEmbedder {
        fn name(&self) -> &str {
            "other"
        }

        fn embed_tokens(&self, tokens: &[String]) -> Result<Vec<Embedding>> {
            Ok(tokens.iter().map(|_| vec![1.0; 4]).collect())
        }
    }
}
