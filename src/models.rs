// Data models: the types that flow between comparators, extractors and
// the report layer.
//
// Everything here is produced fresh per call and never mutated afterwards.

use std::fs;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::embeddings::Embedding;
use crate::error::BizNewsError;

/// The closed set of news categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "Negative_News")]
    NegativeNews,
    #[serde(rename = "ESG_News")]
    EsgNews,
    #[serde(rename = "Other")]
    Other,
}

impl Category {
    /// The two categories that carry keyword sets.
    pub const KEYWORD_CATEGORIES: [Category; 2] = [Category::NegativeNews, Category::EsgNews];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::NegativeNews => "Negative_News",
            Category::EsgNews => "ESG_News",
            Category::Other => "Other",
        }
    }

    /// Directory name used for default keyword lists and embedding caches.
    pub fn slug(&self) -> &'static str {
        match self {
            Category::NegativeNews => "negative_news",
            Category::EsgNews => "esg",
            Category::Other => "other",
        }
    }

    /// Short label used in reports ("NN", "ESG").
    pub fn short(&self) -> &'static str {
        match self {
            Category::NegativeNews => "NN",
            Category::EsgNews => "ESG",
            Category::Other => "OTHER",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Category {
    type Err = BizNewsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "negative_news" | "nn" => Ok(Category::NegativeNews),
            "esg_news" | "esg" => Ok(Category::EsgNews),
            "other" => Ok(Category::Other),
            _ => Err(BizNewsError::InvalidCategory(s.to_string())),
        }
    }
}

/// One body segment (or the title) that matched at least one keyword.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DebugSegment {
    /// Keywords found in this segment, most frequent first
    pub keywords: Vec<String>,
    pub text: String,
}

/// Outcome of a single classify call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub category: Category,
    /// 0.0 to 1.0
    pub score: f64,
    /// Matched keywords, most relevant first
    pub matched_keywords: Vec<String>,
    /// Per-segment trace, only populated in debug mode
    #[serde(skip_serializing_if = "Option::is_none")]
    pub debug: Option<Vec<DebugSegment>>,
}

impl ClassificationResult {
    /// The "nothing matched" result.
    pub fn other() -> Self {
        Self {
            category: Category::Other,
            score: 0.0,
            matched_keywords: Vec::new(),
            debug: None,
        }
    }

    /// True when the comparator assigned its own category.
    pub fn is_match(&self) -> bool {
        self.category != Category::Other
    }
}

/// A salient n-gram (or single token) pulled out of a document.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedKeyword {
    /// Position of the first token in the full tokenized document
    pub position: usize,
    pub tokens: Vec<String>,
    pub score: f64,
    pub embedding: Embedding,
}

impl ExtractedKeyword {
    /// The n-gram as one string (tokens concatenated, as written in Chinese).
    pub fn text(&self) -> String {
        self.tokens.concat()
    }
}

/// One news article as it arrives from a feed export.
///
/// Accepts both `{"title", "body"}` and the Dow Jones `{"Headline",
/// "BodyHtml"}` layout. A missing body is an empty body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewsArticle {
    #[serde(alias = "Headline")]
    pub title: String,
    #[serde(alias = "BodyHtml", default)]
    pub body: String,
}

impl NewsArticle {
    pub fn load(path: &Path) -> Result<Self, BizNewsError> {
        let json = fs::read_to_string(path).map_err(|e| BizNewsError::io(path, e))?;
        Ok(serde_json::from_str(&json)?)
    }
}
