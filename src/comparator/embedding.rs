// Embedding-based comparator.
//
// Two ways to compare an article with a category's keyword vectors:
//
// - doc_based: pool the whole title (or title and body) into one vector and
//   score it against every keyword vector.
// - key_based: extract the article's own salient bigrams first, then score
//   every (bigram, keyword) pair.
//
// Either way the qualifying similarities are averaged, and the category is
// assigned when that average exceeds 0.5.

use std::collections::HashSet;
use std::str::FromStr;
use std::sync::Arc;

use serde::Serialize;
use tracing::debug;

use super::{round2, Comparator};
use crate::embeddings::{cosine_similarity, mean_embedding, Embedding, EmbeddingProvider, KeywordEmbeddings};
use crate::error::{BizNewsError, Result};
use crate::extract::KeywordExtractor;
use crate::keywords::{KeywordSet, StopWords};
use crate::models::{Category, ClassificationResult, ExtractedKeyword};
use crate::text::Segmenter;

/// Average similarity the article must exceed to be assigned the category.
pub const DECISION_SCORE: f64 = 0.5;

/// Separator placed between title and body when both are embedded.
const TITLE_BODY_SEPARATOR: &str = "。";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvaluationMethod {
    DocBased,
    KeyBased,
}

impl EvaluationMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            EvaluationMethod::DocBased => "doc_based",
            EvaluationMethod::KeyBased => "key_based",
        }
    }
}

impl std::fmt::Display for EvaluationMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for EvaluationMethod {
    type Err = BizNewsError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "doc_based" | "doc-based" => Ok(EvaluationMethod::DocBased),
            "key_based" | "key-based" => Ok(EvaluationMethod::KeyBased),
            _ => Err(BizNewsError::InvalidArgument(format!(
                "unknown evaluation method {s:?} (expected doc_based or key_based)"
            ))),
        }
    }
}

/// Which text doc_based evaluation embeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DocumentScope {
    #[default]
    Title,
    TitleAndBody,
}

#[derive(Debug, Clone)]
pub struct EmbeddingOptions {
    /// Minimum cosine similarity for a keyword to count (default 0.6)
    pub threshold: f64,
    /// Matched keywords reported (default 5)
    pub top_n: usize,
    pub method: EvaluationMethod,
    pub document_scope: DocumentScope,
    /// Window width of the key_based extraction (default 2)
    pub extract_n_gram: usize,
    /// N-grams extracted per article in key_based mode (default 5)
    pub extract_top_n: usize,
}

impl Default for EmbeddingOptions {
    fn default() -> Self {
        Self {
            threshold: 0.6,
            top_n: 5,
            method: EvaluationMethod::DocBased,
            document_scope: DocumentScope::Title,
            extract_n_gram: 2,
            extract_top_n: 5,
        }
    }
}

/// A category keyword close to an extracted n-gram.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KeywordMatch {
    pub keyword: String,
    pub score: f64,
}

/// One extracted n-gram and the category keywords it resembles.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KeywordEvaluation {
    pub position: usize,
    pub keyword: String,
    pub score: f64,
    pub matches: Vec<KeywordMatch>,
}

pub struct EmbeddingComparator {
    embeddings: Arc<KeywordEmbeddings>,
    segmenter: Arc<dyn Segmenter>,
    embedder: Arc<dyn EmbeddingProvider>,
    extractor: KeywordExtractor,
    stopwords: StopWords,
    options: EmbeddingOptions,
}

impl EmbeddingComparator {
    pub fn new(
        embeddings: Arc<KeywordEmbeddings>,
        segmenter: Arc<dyn Segmenter>,
        embedder: Arc<dyn EmbeddingProvider>,
        options: EmbeddingOptions,
    ) -> Result<Self> {
        let extractor = KeywordExtractor::new(Arc::clone(&segmenter), Arc::clone(&embedder));
        let stopwords = StopWords::build(None, true)?;
        Ok(Self {
            embeddings,
            segmenter,
            embedder,
            extractor,
            stopwords,
            options,
        })
    }

    pub fn options(&self) -> &EmbeddingOptions {
        &self.options
    }

    /// The keyword vectors this comparator scores against.
    pub fn embeddings(&self) -> &Arc<KeywordEmbeddings> {
        &self.embeddings
    }

    pub fn classify_with(
        &self,
        title: &str,
        body: &str,
        options: &EmbeddingOptions,
    ) -> Result<ClassificationResult> {
        let result = match options.method {
            EvaluationMethod::DocBased => self.doc_based(title, body, options)?,
            EvaluationMethod::KeyBased => self.key_based(title, body, options)?,
        };
        debug!(
            category = self.category().as_str(),
            method = options.method.as_str(),
            score = result.score,
            matched = result.matched_keywords.len(),
            "Embedding comparison"
        );
        Ok(result)
    }

    fn doc_based(
        &self,
        title: &str,
        body: &str,
        options: &EmbeddingOptions,
    ) -> Result<ClassificationResult> {
        let text = match options.document_scope {
            DocumentScope::Title => title.to_string(),
            DocumentScope::TitleAndBody => format!("{title}{TITLE_BODY_SEPARATOR}{body}"),
        };
        let tokens = self.segmenter.segment(&text);
        if tokens.is_empty() {
            return Ok(ClassificationResult::other());
        }
        let doc_vector = mean_embedding(&self.embedder.embed_tokens(&tokens)?);

        let mut scored = self.keywords_above(&doc_vector, options.threshold);
        scored.sort_by(|a, b| b.1.total_cmp(&a.1));
        scored.truncate(options.top_n);

        let average = average(scored.iter().map(|(_, s)| *s));
        Ok(self.decide(average, scored.into_iter().map(|(k, _)| k.to_string()).collect()))
    }

    fn key_based(
        &self,
        title: &str,
        body: &str,
        options: &EmbeddingOptions,
    ) -> Result<ClassificationResult> {
        let text = format!("{title}{TITLE_BODY_SEPARATOR}{body}");
        let extracted = self.extractor.extract_from_tokens(
            self.segmenter.segment(&text),
            options.extract_n_gram,
            options.extract_top_n,
            &self.stopwords,
        )?;

        let mut pairs: Vec<(&str, f64)> = extracted
            .iter()
            .flat_map(|k| self.keywords_above(&k.embedding, options.threshold))
            .collect();
        pairs.sort_by(|a, b| b.1.total_cmp(&a.1));

        // Averaged over every qualifying pair, before deduplication
        let average = average(pairs.iter().map(|(_, s)| *s));

        let mut seen = HashSet::new();
        let matched: Vec<String> = pairs
            .into_iter()
            .filter(|(k, _)| seen.insert(*k))
            .take(options.top_n)
            .map(|(k, _)| k.to_string())
            .collect();

        Ok(self.decide(average, matched))
    }

    /// For every extracted n-gram, the category keywords with similarity
    /// at or above `threshold`, best first, at most `top_n` each.
    pub fn evaluate_keywords(
        &self,
        extracted: &[ExtractedKeyword],
        threshold: f64,
        top_n: usize,
    ) -> Vec<KeywordEvaluation> {
        extracted
            .iter()
            .map(|k| {
                let mut matches = self.keywords_above(&k.embedding, threshold);
                matches.sort_by(|a, b| b.1.total_cmp(&a.1));
                matches.truncate(top_n);
                KeywordEvaluation {
                    position: k.position,
                    keyword: k.text(),
                    score: k.score,
                    matches: matches
                        .into_iter()
                        .map(|(keyword, score)| KeywordMatch {
                            keyword: keyword.to_string(),
                            score,
                        })
                        .collect(),
                }
            })
            .collect()
    }

    fn keywords_above(&self, vector: &Embedding, threshold: f64) -> Vec<(&str, f64)> {
        self.embeddings
            .iter()
            .map(|(keyword, kv)| (keyword, cosine_similarity(vector, kv)))
            .filter(|(_, score)| *score >= threshold)
            .collect()
    }

    fn decide(&self, average: f64, matched_keywords: Vec<String>) -> ClassificationResult {
        let score = round2(average);
        let category = if average > DECISION_SCORE {
            self.category()
        } else {
            Category::Other
        };
        ClassificationResult {
            category,
            score,
            matched_keywords,
            debug: None,
        }
    }
}

fn average(scores: impl Iterator<Item = f64>) -> f64 {
    let (sum, n) = scores.fold((0.0, 0usize), |(sum, n), s| (sum + s, n + 1));
    if n == 0 {
        0.0
    } else {
        sum / n as f64
    }
}

impl Comparator for EmbeddingComparator {
    fn category(&self) -> Category {
        self.embeddings.category()
    }

    fn keywords(&self) -> &KeywordSet {
        self.embeddings.keywords()
    }

    fn classify(&self, title: &str, body: &str) -> Result<ClassificationResult> {
        self.classify_with(title, body, &self.options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_parse() {
        assert_eq!("doc_based".parse::<EvaluationMethod>().unwrap(), EvaluationMethod::DocBased);
        assert_eq!("key-based".parse::<EvaluationMethod>().unwrap(), EvaluationMethod::KeyBased);
    }

    #[test]
    fn test_method_parse_rejects_unknown() {
        let err = "hybrid".parse::<EvaluationMethod>().unwrap_err();
        assert!(matches!(err, BizNewsError::InvalidArgument(_)));
    }

    #[test]
    fn test_average_of_nothing_is_zero() {
        assert_eq!(average(std::iter::empty()), 0.0);
        assert_eq!(average([0.5, 1.0].into_iter()), 0.75);
    }

    #[test]
    fn test_default_options() {
        let options = EmbeddingOptions::default();
        assert_eq!(options.threshold, 0.6);
        assert_eq!(options.top_n, 5);
        assert_eq!(options.method, EvaluationMethod::DocBased);
        assert_eq!(options.document_scope, DocumentScope::Title);
    }
}
