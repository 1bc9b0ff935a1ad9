// Extraction: salient n-grams of a document and near-synonyms of known
// keywords, both driven by per-token embeddings.
//
// Both extractors share the same front half: normalise the input shape,
// segment, drop stopwords while remembering where every surviving token sat
// in the full document, and embed the full document once.

pub mod keywords;
pub mod synonyms;

pub use keywords::{ExtractOptions, KeywordExtractor};
pub use synonyms::{SynonymExtensor, SynonymMatches, SynonymOptions};

use tracing::debug;

use crate::embeddings::{Embedding, EmbeddingProvider};
use crate::error::Result;
use crate::keywords::StopWords;

/// One segmented document with its per-token vectors.
pub(crate) struct PreparedDocument {
    /// Every token, stopwords included
    pub tokens: Vec<String>,
    /// One vector per entry of `tokens`, from a single contextual pass
    pub vectors: Vec<Embedding>,
    /// Indices into `tokens` of the non-stopword tokens, in order
    pub content: Vec<usize>,
}

impl PreparedDocument {
    pub fn prepare(
        tokens: Vec<String>,
        stopwords: &StopWords,
        embedder: &dyn EmbeddingProvider,
    ) -> Result<Self> {
        let content: Vec<usize> = tokens
            .iter()
            .enumerate()
            .filter(|(_, token)| !stopwords.contains(token))
            .map(|(i, _)| i)
            .collect();

        // Nothing to score means nothing to embed
        let vectors = if content.is_empty() {
            Vec::new()
        } else {
            embedder.embed_tokens(&tokens)?
        };

        debug!(
            tokens = tokens.len(),
            content = content.len(),
            "Prepared document"
        );

        Ok(Self {
            tokens,
            vectors,
            content,
        })
    }

    /// Embedding of the token at `index` in the full document.
    pub fn vector(&self, index: usize) -> Option<&Embedding> {
        self.vectors.get(index)
    }
}
