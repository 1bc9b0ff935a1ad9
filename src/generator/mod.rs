// Key Generator: offline discovery of candidate keywords from a
// pre-trained word-vector model.
//
// Not part of runtime classification: its `.txt` output is meant to be
// reviewed and added to a category's keyword directory.

pub mod report;
pub mod word2vec;
pub mod word_vectors;

pub use report::{GeneratorReport, InferParams, WordResult};
pub use word2vec::Word2VecKeyGenerator;
pub use word_vectors::{LoadMode, WordVectorStore, WordVectors};

use std::collections::BTreeMap;
use std::path::Path;

use crate::error::Result;

/// Trait for related-word generators, so other vector sources can stand in
/// for word2vec.
pub trait KeyGenerator {
    /// Find related words of a single word, or of every word in a `.txt`
    /// list. `force_info` overrides `params` for specific words of a list.
    /// With `init_results` false, results add to the previous calls'.
    fn infer(
        &mut self,
        input: &str,
        params: InferParams,
        force_info: Option<BTreeMap<String, InferParams>>,
        init_results: bool,
    ) -> Result<&GeneratorReport>;

    /// Write the accumulated results as `.json` or `.txt`.
    fn save(&self, path: &Path) -> Result<()>;

    /// Results for one queried word, if it was queried.
    fn related_words(&self, word: &str) -> Option<&WordResult>;
}
