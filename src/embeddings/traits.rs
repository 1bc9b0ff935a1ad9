// Embedding provider trait: swap-ready abstraction over text-to-vector
// backends.
//
// The classification core never talks to a model directly. It hands a
// tokenized document to `embed_tokens` and gets one vector per token back,
// computed in a single contextual pass. Document and n-gram vectors are
// pooled from those.

use crate::error::{BizNewsError, Result};

/// A dense embedding vector.
pub type Embedding = Vec<f64>;

/// Backends are not assumed to be re-entrant; implementations serialise
/// access internally (e.g. behind a Mutex) so one instance can be shared.
pub trait EmbeddingProvider: Send + Sync {
    /// Registry key of this backend.
    fn name(&self) -> &str;

    /// Embed every token of one tokenized document. Returns exactly one
    /// vector per input token, in order.
    fn embed_tokens(&self, tokens: &[String]) -> Result<Vec<Embedding>>;

    /// Embed a standalone word (a one-token sentence).
    fn embed_word(&self, word: &str) -> Result<Embedding> {
        let mut vectors = self.embed_tokens(&[word.to_string()])?;
        vectors
            .pop()
            .ok_or_else(|| BizNewsError::embedding(format!("no embedding returned for {word:?}")))
    }
}
