// Synonym extension: find document tokens that mean roughly the same as a
// known category keyword.
//
// Each non-stopword token's contextual vector is compared against the
// keyword's cached vector. Useful for growing a keyword list from real
// articles: tokens that keep showing up close to "詐騙" are candidates.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::debug;

use super::PreparedDocument;
use crate::embeddings::{cosine_similarity, Embedding, EmbeddingProvider, KeywordEmbeddings};
use crate::error::Result;
use crate::keywords::{KeywordSet, KeywordSource, StopWords};
use crate::models::{Category, ExtractedKeyword};
use crate::text::{Segmenter, TextInput};

/// Matches of one document, grouped by category keyword. Keywords with no
/// match are absent.
pub type SynonymMatches = BTreeMap<String, Vec<ExtractedKeyword>>;

#[derive(Debug, Clone)]
pub struct SynonymOptions {
    /// Compare against this keyword only; every cached keyword when unset
    pub keyword: Option<String>,
    /// Minimum cosine similarity (default 0.78)
    pub threshold: f64,
    /// Accepted for symmetry with the extractor; match lists are not
    /// truncated
    pub top_n: usize,
    pub stopwords: Option<KeywordSource>,
    pub load_default_stopwords: bool,
    pub is_split_into_words: bool,
}

impl Default for SynonymOptions {
    fn default() -> Self {
        Self {
            keyword: None,
            threshold: 0.78,
            top_n: 5,
            stopwords: None,
            load_default_stopwords: true,
            is_split_into_words: false,
        }
    }
}

pub struct SynonymExtensor {
    embeddings: Arc<KeywordEmbeddings>,
    segmenter: Arc<dyn Segmenter>,
    embedder: Arc<dyn EmbeddingProvider>,
}

impl SynonymExtensor {
    pub fn new(
        embeddings: Arc<KeywordEmbeddings>,
        segmenter: Arc<dyn Segmenter>,
        embedder: Arc<dyn EmbeddingProvider>,
    ) -> Self {
        Self {
            embeddings,
            segmenter,
            embedder,
        }
    }

    pub fn category(&self) -> Category {
        self.embeddings.category()
    }

    pub fn keywords(&self) -> &KeywordSet {
        self.embeddings.keywords()
    }

    /// Vector of `keyword`: the cached one, or a freshly computed one for
    /// keywords outside the cache. The cache itself is never modified.
    pub fn keyword_embedding(&self, keyword: &str) -> Result<Embedding> {
        match self.embeddings.get(keyword) {
            Some(vector) => Ok(vector.clone()),
            None => {
                debug!(keyword, "Keyword not cached, embedding on the fly");
                self.embedder.embed_word(keyword)
            }
        }
    }

    /// Near-synonym tokens of every document, in input order.
    pub fn extract(
        &self,
        input: impl Into<TextInput>,
        options: &SynonymOptions,
    ) -> Result<Vec<SynonymMatches>> {
        let docs = input
            .into()
            .into_tokenized(options.is_split_into_words, self.segmenter.as_ref())?;
        let stopwords = StopWords::build(options.stopwords.as_ref(), options.load_default_stopwords)?;

        let targets: Vec<(String, Embedding)> = match &options.keyword {
            Some(keyword) => vec![(keyword.clone(), self.keyword_embedding(keyword)?)],
            None => self
                .embeddings
                .iter()
                .map(|(k, v)| (k.to_string(), v.clone()))
                .collect(),
        };

        debug!(
            documents = docs.len(),
            keywords = targets.len(),
            threshold = options.threshold,
            "Extracting synonyms"
        );

        docs.into_iter()
            .map(|tokens| {
                let doc = PreparedDocument::prepare(tokens, &stopwords, self.embedder.as_ref())?;
                Ok(match_document(&doc, &targets, options.threshold))
            })
            .collect()
    }
}

fn match_document(
    doc: &PreparedDocument,
    targets: &[(String, Embedding)],
    threshold: f64,
) -> SynonymMatches {
    let mut matches = SynonymMatches::new();

    for (keyword, keyword_vector) in targets {
        for &position in &doc.content {
            let Some(vector) = doc.vector(position) else {
                continue;
            };
            let score = cosine_similarity(keyword_vector, vector);
            if score >= threshold {
                debug!(keyword = keyword.as_str(), token = doc.tokens[position].as_str(), score, "Synonym match");
                matches
                    .entry(keyword.clone())
                    .or_default()
                    .push(ExtractedKeyword {
                        position,
                        tokens: vec![doc.tokens[position].clone()],
                        score,
                        embedding: vector.clone(),
                    });
            }
        }
    }
    matches
}
