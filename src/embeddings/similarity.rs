// Vector primitives shared by every embedding-based component.
//
// Cosine similarity is the single scoring primitive: keyword-to-document,
// n-gram-to-document and token-to-keyword comparisons all go through it.

use super::traits::Embedding;

/// Cosine similarity between two embedding vectors, in [-1.0, 1.0].
///
/// Returns 0.0 when either vector is empty or all zeros, or when the
/// dimensions differ.
pub fn cosine_similarity(a: &[f64], b: &[f64]) -> f64 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot: f64 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let mag_a: f64 = a.iter().map(|x| x * x).sum::<f64>().sqrt();
    let mag_b: f64 = b.iter().map(|x| x * x).sum::<f64>().sqrt();

    let denom = mag_a * mag_b;
    if denom < f64::EPSILON {
        0.0
    } else {
        (dot / denom).clamp(-1.0, 1.0)
    }
}

/// Element-wise mean of a set of vectors.
///
/// The output has the length of the longest input; an empty input gives
/// an empty vector.
pub fn mean_embedding(embeddings: &[Embedding]) -> Embedding {
    mean_of(embeddings.iter())
}

/// Mean of the vectors at `indices` within `embeddings`. Out-of-range
/// indices are skipped.
pub fn mean_at(embeddings: &[Embedding], indices: impl IntoIterator<Item = usize>) -> Embedding {
    mean_of(indices.into_iter().filter_map(|i| embeddings.get(i)))
}

fn mean_of<'a>(vectors: impl Iterator<Item = &'a Embedding>) -> Embedding {
    let mut mean: Embedding = Vec::new();
    let mut n = 0usize;

    for v in vectors {
        if v.len() > mean.len() {
            mean.resize(v.len(), 0.0);
        }
        for (acc, val) in mean.iter_mut().zip(v.iter()) {
            *acc += val;
        }
        n += 1;
    }

    if n > 0 {
        for val in &mut mean {
            *val /= n as f64;
        }
    }
    mean
}
