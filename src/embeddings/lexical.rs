// Deterministic lexical embedding.
//
// Feature hashing over the characters and character bigrams of each token.
// This is not a neural model: tokens that share characters (詐欺 / 詐騙)
// land near each other, unrelated tokens are near-orthogonal. It needs no
// download, which makes it the offline fallback backend and a stable
// baseline for comparisons.

use blake3::Hasher;

use super::traits::{Embedding, EmbeddingProvider};
use crate::error::Result;

/// Default dimensionality for lexical embeddings.
pub const DEFAULT_LEXICAL_DIM: usize = 256;

pub struct LexicalEmbedder {
    dim: usize,
}

impl LexicalEmbedder {
    pub fn new(dim: usize) -> Self {
        Self { dim: dim.max(1) }
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    fn embed_one(&self, token: &str) -> Embedding {
        let mut vec = vec![0.0_f64; self.dim];
        let chars: Vec<char> = token.chars().filter(|c| !c.is_whitespace()).collect();

        for c in &chars {
            let mut buf = [0u8; 4];
            self.add_feature(&mut vec, c.encode_utf8(&mut buf).as_bytes(), 1.0);
        }
        for pair in chars.windows(2) {
            let feature: String = pair.iter().collect();
            self.add_feature(&mut vec, feature.as_bytes(), 0.5);
        }

        let norm = vec.iter().map(|x| x * x).sum::<f64>().sqrt();
        if norm > 0.0 {
            for x in &mut vec {
                *x /= norm;
            }
        }
        vec
    }

    fn add_feature(&self, vec: &mut [f64], feature: &[u8], weight: f64) {
        let mut h = Hasher::new();
        h.update(feature);
        let hash = h.finalize();
        let bytes = hash.as_bytes();

        let mut bucket = [0u8; 8];
        bucket.copy_from_slice(&bytes[..8]);
        let idx = (u64::from_le_bytes(bucket) % self.dim as u64) as usize;
        let sign = if bytes[8] & 1 == 0 { 1.0 } else { -1.0 };
        vec[idx] += sign * weight;
    }
}

impl Default for LexicalEmbedder {
    fn default() -> Self {
        Self::new(DEFAULT_LEXICAL_DIM)
    }
}

impl EmbeddingProvider for LexicalEmbedder {
    fn name(&self) -> &str {
        "lexical"
    }

    fn embed_tokens(&self, tokens: &[String]) -> Result<Vec<Embedding>> {
        Ok(tokens.iter().map(|t| self.embed_one(t)).collect())
    }
}
