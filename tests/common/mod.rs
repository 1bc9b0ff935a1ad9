// Shared fixtures for the integration tests.
//
// TableEmbedder maps known tokens to fixed vectors so similarity scores can
// be worked out by hand. SplitSegmenter cuts on whitespace and sentence
// marks, which keeps token boundaries explicit in test text.

#![allow(dead_code)]

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use biznews::embeddings::{Embedding, EmbeddingProvider};
use biznews::text::Segmenter;

pub struct TableEmbedder {
    table: HashMap<String, Embedding>,
    dim: usize,
}

impl TableEmbedder {
    pub fn new(entries: &[(&str, [f64; 3])]) -> Self {
        Self {
            table: entries
                .iter()
                .map(|(word, v)| (word.to_string(), v.to_vec()))
                .collect(),
            dim: 3,
        }
    }

    pub fn shared(entries: &[(&str, [f64; 3])]) -> Arc<dyn EmbeddingProvider> {
        Arc::new(Self::new(entries))
    }
}

impl EmbeddingProvider for TableEmbedder {
    fn name(&self) -> &str {
        "table"
    }

    /// Unknown tokens get the zero vector.
    fn embed_tokens(&self, tokens: &[String]) -> biznews::Result<Vec<Embedding>> {
        Ok(tokens
            .iter()
            .map(|t| self.table.get(t).cloned().unwrap_or_else(|| vec![0.0; self.dim]))
            .collect())
    }
}

#[derive(Debug, Default)]
pub struct SplitSegmenter;

impl Segmenter for SplitSegmenter {
    fn name(&self) -> &str {
        "split"
    }

    fn segment(&self, text: &str) -> Vec<String> {
        text.split(|c: char| c.is_whitespace() || c == '。' || c == '，')
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect()
    }
}

pub fn segmenter() -> Arc<dyn Segmenter> {
    Arc::new(SplitSegmenter)
}

/// Fresh per-test scratch directory under the system temp dir.
pub fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("biznews-it-{name}-{}", std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    dir
}
