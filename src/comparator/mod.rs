// Comparator trait: the swap-ready abstraction over classification
// strategies.
//
// Each comparator is bound to one category at construction and answers a
// yes/no question for it: does this article belong to my category, and how
// strongly. The literal keyword matcher and the embedding matcher are
// interchangeable behind this trait; a full report runs one per category.

pub mod embedding;
pub mod simple;

pub use embedding::{DocumentScope, EmbeddingComparator, EmbeddingOptions, EvaluationMethod};
pub use simple::{SimpleComparator, SimpleOptions};

use crate::error::Result;
use crate::keywords::KeywordSet;
use crate::models::{Category, ClassificationResult};

pub trait Comparator: Send + Sync {
    /// The category this comparator assigns on a match.
    fn category(&self) -> Category;

    /// The effective keyword set.
    fn keywords(&self) -> &KeywordSet;

    /// Classify one article with the options given at construction.
    fn classify(&self, title: &str, body: &str) -> Result<ClassificationResult>;
}

/// Round to two decimals, the precision every reported score uses.
pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
