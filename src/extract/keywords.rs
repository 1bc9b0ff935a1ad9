// Keyword extraction by self-similarity.
//
// An n-gram is salient when its vector points the same way as the whole
// document's. The document vector is the mean of every token vector
// (stopwords included); an n-gram vector is the mean of its tokens' vectors
// from that same pass. N-grams are formed over the non-stopword tokens only,
// so two content words separated by a stopword still form a bigram.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::debug;

use super::PreparedDocument;
use crate::embeddings::similarity::mean_at;
use crate::embeddings::{cosine_similarity, mean_embedding, EmbeddingProvider};
use crate::error::{BizNewsError, Result};
use crate::keywords::{KeywordSource, StopWords};
use crate::models::ExtractedKeyword;
use crate::text::{Segmenter, TextInput};

#[derive(Debug, Clone)]
pub struct ExtractOptions {
    /// Window width in tokens (default 1)
    pub n_gram: usize,
    /// Keywords kept per document (default 5)
    pub top_n: usize,
    /// Extra stopwords: literals or `.txt` lists
    pub stopwords: Option<KeywordSource>,
    /// Also use the built-in stopword list (default true)
    pub load_default_stopwords: bool,
    /// Input is already tokenized
    pub is_split_into_words: bool,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            n_gram: 1,
            top_n: 5,
            stopwords: None,
            load_default_stopwords: true,
            is_split_into_words: false,
        }
    }
}

pub struct KeywordExtractor {
    segmenter: Arc<dyn Segmenter>,
    embedder: Arc<dyn EmbeddingProvider>,
}

impl KeywordExtractor {
    pub fn new(segmenter: Arc<dyn Segmenter>, embedder: Arc<dyn EmbeddingProvider>) -> Self {
        Self {
            segmenter,
            embedder,
        }
    }

    /// Extract the top n-grams of every document, in input order.
    pub fn extract_keywords(
        &self,
        input: impl Into<TextInput>,
        options: &ExtractOptions,
    ) -> Result<Vec<Vec<ExtractedKeyword>>> {
        check_n_gram(options.n_gram)?;

        let docs = input
            .into()
            .into_tokenized(options.is_split_into_words, self.segmenter.as_ref())?;
        let stopwords = StopWords::build(options.stopwords.as_ref(), options.load_default_stopwords)?;
        debug!(
            documents = docs.len(),
            stopwords = stopwords.len(),
            n_gram = options.n_gram,
            "Extracting keywords"
        );

        docs.into_iter()
            .map(|tokens| self.extract_from_tokens(tokens, options.n_gram, options.top_n, &stopwords))
            .collect()
    }

    /// Extract from one already-segmented document.
    pub fn extract_from_tokens(
        &self,
        tokens: Vec<String>,
        n_gram: usize,
        top_n: usize,
        stopwords: &StopWords,
    ) -> Result<Vec<ExtractedKeyword>> {
        check_n_gram(n_gram)?;

        let doc = PreparedDocument::prepare(tokens, stopwords, self.embedder.as_ref())?;
        if doc.content.len() < n_gram {
            return Ok(Vec::new());
        }

        let doc_vector = mean_embedding(&doc.vectors);

        let mut candidates: Vec<ExtractedKeyword> = doc
            .content
            .windows(n_gram)
            .map(|window| {
                let embedding = mean_at(&doc.vectors, window.iter().copied());
                ExtractedKeyword {
                    position: window[0],
                    tokens: window.iter().map(|&i| doc.tokens[i].clone()).collect(),
                    score: cosine_similarity(&embedding, &doc_vector),
                    embedding,
                }
            })
            .collect();
        let windows = candidates.len();

        candidates.sort_by(|a, b| b.score.total_cmp(&a.score));

        let mut seen = HashSet::new();
        candidates.retain(|k| seen.insert(k.tokens.clone()));
        candidates.truncate(top_n);

        debug!(
            windows,
            kept = candidates.len(),
            "Scored n-grams"
        );
        Ok(candidates)
    }
}

fn check_n_gram(n_gram: usize) -> Result<()> {
    if n_gram == 0 {
        return Err(BizNewsError::InvalidArgument("n_gram must be at least 1".into()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embeddings::lexical::LexicalEmbedder;
    use crate::text::WhitespaceSegmenter;

    fn extractor() -> KeywordExtractor {
        KeywordExtractor::new(Arc::new(WhitespaceSegmenter), Arc::new(LexicalEmbedder::new(64)))
    }

    fn no_stopwords() -> ExtractOptions {
        ExtractOptions {
            load_default_stopwords: false,
            ..ExtractOptions::default()
        }
    }

    #[test]
    fn test_zero_n_gram_rejected() {
        let options = ExtractOptions {
            n_gram: 0,
            ..no_stopwords()
        };
        let err = extractor().extract_keywords("a b", &options).unwrap_err();
        assert!(matches!(err, BizNewsError::InvalidArgument(_)));
    }

    #[test]
    fn test_duplicates_collapse() {
        let result = extractor()
            .extract_keywords("詐騙 詐騙 詐騙 洗錢", &no_stopwords())
            .unwrap();
        let texts: Vec<String> = result[0].iter().map(|k| k.text()).collect();
        assert_eq!(texts.len(), 2);
        assert!(texts.contains(&"詐騙".to_string()));
    }

    #[test]
    fn test_bigrams_bridge_removed_stopwords() {
        let options = ExtractOptions {
            n_gram: 2,
            stopwords: Some(KeywordSource::from("的")),
            ..no_stopwords()
        };
        let result = extractor().extract_keywords("公司 的 掏空", &options).unwrap();
        assert_eq!(result[0].len(), 1);
        assert_eq!(result[0][0].tokens, vec!["公司", "掏空"]);
        assert_eq!(result[0][0].position, 0);
    }

    #[test]
    fn test_position_refers_to_full_document() {
        let options = ExtractOptions {
            stopwords: Some(KeywordSource::from("的")),
            ..no_stopwords()
        };
        let result = extractor().extract_keywords("的 的 掏空", &options).unwrap();
        assert_eq!(result[0][0].position, 2);
    }

    #[test]
    fn test_short_document_yields_nothing() {
        let options = ExtractOptions {
            n_gram: 3,
            ..no_stopwords()
        };
        let result = extractor().extract_keywords("一 二", &options).unwrap();
        assert_eq!(result, vec![Vec::new()]);
    }
}
