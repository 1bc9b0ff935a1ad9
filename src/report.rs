// Combined news report: one Negative News and one ESG verdict per article.
//
// Serialises with the upper-case keys downstream consumers already read
// (`NN`, `NN_SCORE`, `NN_KEYWORDS`, `NN_DEBUG_LIST`, `ESG`, ...).

use serde::{Deserialize, Serialize};

use crate::comparator::Comparator;
use crate::error::Result;
use crate::models::{Category, ClassificationResult, DebugSegment};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsReport {
    #[serde(rename = "NN")]
    pub nn: bool,
    #[serde(rename = "NN_SCORE")]
    pub nn_score: f64,
    #[serde(rename = "NN_KEYWORDS")]
    pub nn_keywords: Vec<String>,
    #[serde(rename = "NN_DEBUG_LIST", skip_serializing_if = "Option::is_none", default)]
    pub nn_debug: Option<Vec<DebugSegment>>,
    #[serde(rename = "ESG")]
    pub esg: bool,
    #[serde(rename = "ESG_SCORE")]
    pub esg_score: f64,
    #[serde(rename = "ESG_KEYWORDS")]
    pub esg_keywords: Vec<String>,
    #[serde(rename = "ESG_DEBUG_LIST", skip_serializing_if = "Option::is_none", default)]
    pub esg_debug: Option<Vec<DebugSegment>>,
}

impl NewsReport {
    /// Combine the two per-category results. Scores are reported as
    /// computed, whether or not the category was assigned.
    pub fn new(nn: ClassificationResult, esg: ClassificationResult) -> Self {
        Self {
            nn: nn.category == Category::NegativeNews,
            nn_score: nn.score,
            nn_keywords: nn.matched_keywords,
            nn_debug: nn.debug,
            esg: esg.category == Category::EsgNews,
            esg_score: esg.score,
            esg_keywords: esg.matched_keywords,
            esg_debug: esg.debug,
        }
    }

    /// Run both comparators over one article.
    pub fn classify(
        nn: &dyn Comparator,
        esg: &dyn Comparator,
        title: &str,
        body: &str,
    ) -> Result<Self> {
        Ok(Self::new(nn.classify(title, body)?, esg.classify(title, body)?))
    }

    /// The categories this article was assigned; `Other` when neither.
    pub fn categories(&self) -> Vec<Category> {
        let mut categories = Vec::new();
        if self.nn {
            categories.push(Category::NegativeNews);
        }
        if self.esg {
            categories.push(Category::EsgNews);
        }
        if categories.is_empty() {
            categories.push(Category::Other);
        }
        categories
    }
}
