use std::env;
use std::path::PathBuf;

use anyhow::Result;

use crate::embeddings::cache::default_cache_dir;
use crate::embeddings::download::{default_model_dir, embedding_files_present};
use crate::models::Category;

/// Central configuration loaded from environment variables.
///
/// The .env file is loaded automatically at startup via dotenvy. Every
/// setting has a default, so an empty environment is a valid one.
#[derive(Debug, Clone)]
pub struct Config {
    /// Root of the default keyword lists (`negative_news/`, `esg/`)
    pub keywords_dir: PathBuf,
    /// Root of the keyword embedding cache
    pub cache_dir: PathBuf,
    /// Directory containing the ONNX model files
    pub model_dir: PathBuf,
    /// Directory containing `word2vec_<key>.{bin,txt}` models
    pub word2vec_dir: PathBuf,
    /// Segmenter registry key (default: jieba)
    pub segmenter: String,
    /// Embedder registry key (default: onnx)
    pub embedder: String,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self> {
        Ok(Self {
            keywords_dir: env::var("BIZNEWS_KEYWORDS_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("./keywords")),
            cache_dir: env::var("BIZNEWS_CACHE_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| default_cache_dir()),
            model_dir: env::var("BIZNEWS_MODEL_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| default_model_dir()),
            word2vec_dir: env::var("BIZNEWS_WORD2VEC_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("./model/word2vec")),
            segmenter: env::var("BIZNEWS_SEGMENTER").unwrap_or_else(|_| "jieba".to_string()),
            embedder: env::var("BIZNEWS_EMBEDDER").unwrap_or_else(|_| "onnx".to_string()),
        })
    }

    /// Check that the default keyword lists of `category` are present.
    /// Call this before building a comparator with default keywords.
    pub fn require_keywords(&self, category: Category) -> Result<()> {
        let dir = self.keywords_dir.join(category.slug());
        if !dir.is_dir() {
            anyhow::bail!(
                "Default keyword directory not found: {}\n\
                 Set BIZNEWS_KEYWORDS_DIR to the directory holding negative_news/ and esg/,\n\
                 or pass --no-default-keywords with explicit --nn-keyword-source/--esg-keyword-source values.",
                dir.display()
            );
        }
        Ok(())
    }

    /// Validate that the chosen embedder has what it needs.
    /// For ONNX: model files must exist (or user should run download-model).
    pub fn require_embedder(&self) -> Result<()> {
        if self.embedder == "onnx" && !embedding_files_present(&self.model_dir) {
            anyhow::bail!(
                "ONNX model files not found in {}\n\
                 Run `biznews download-model` to download them.\n\
                 Or set BIZNEWS_EMBEDDER=lexical to use the offline lexical embedder instead.",
                self.model_dir.display()
            );
        }
        Ok(())
    }

    /// Check that the word2vec model directory exists.
    pub fn require_word2vec(&self) -> Result<()> {
        if !self.word2vec_dir.is_dir() {
            anyhow::bail!(
                "Word2vec model directory not found: {}\n\
                 Set BIZNEWS_WORD2VEC_DIR to the directory holding word2vec_<key>.bin/.txt.",
                self.word2vec_dir.display()
            );
        }
        Ok(())
    }
}
