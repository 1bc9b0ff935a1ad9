// Embeddings: the provider trait, its backends, cosine similarity and the
// per-category keyword embedding cache.

pub mod cache;
pub mod download;
pub mod lexical;
pub mod onnx;
pub mod similarity;
pub mod traits;

pub use cache::{CacheOptions, KeywordEmbeddings};
pub use similarity::{cosine_similarity, mean_embedding};
pub use traits::{Embedding, EmbeddingProvider};
