// Backend registries: map a string key to a factory for segmenters and
// embedding providers.
//
// Config and CLI only ever name a backend; the registry turns that name
// into an instance. Adding a backend means registering one more factory,
// never touching the callers.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::debug;

use crate::embeddings::download::embedding_model_dir;
use crate::embeddings::lexical::LexicalEmbedder;
use crate::embeddings::onnx::OnnxEmbedder;
use crate::embeddings::EmbeddingProvider;
use crate::error::{BizNewsError, Result};
use crate::text::{CharSegmenter, JiebaSegmenter, Segmenter, WhitespaceSegmenter};

type SegmenterFactory = Box<dyn Fn() -> Arc<dyn Segmenter> + Send + Sync>;
type EmbedderFactory = Box<dyn Fn(&EmbedderContext) -> Result<Arc<dyn EmbeddingProvider>> + Send + Sync>;

/// What an embedder factory may need to build its backend.
#[derive(Debug, Clone)]
pub struct EmbedderContext {
    /// Model root (the directory `download-model` writes into)
    pub model_dir: PathBuf,
}

impl EmbedderContext {
    pub fn new(model_dir: impl Into<PathBuf>) -> Self {
        Self {
            model_dir: model_dir.into(),
        }
    }
}

pub struct SegmenterRegistry {
    factories: BTreeMap<String, SegmenterFactory>,
}

impl SegmenterRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self {
            factories: BTreeMap::new(),
        }
    }

    /// Registry with every built-in backend.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register("jieba", || Arc::new(JiebaSegmenter::new()));
        registry.register("jieba-search", || Arc::new(JiebaSegmenter::search()));
        registry.register("char", || Arc::new(CharSegmenter));
        registry.register("whitespace", || Arc::new(WhitespaceSegmenter));
        registry
    }

    /// Add or replace a backend.
    pub fn register<F>(&mut self, key: &str, factory: F)
    where
        F: Fn() -> Arc<dyn Segmenter> + Send + Sync + 'static,
    {
        self.factories.insert(key.to_string(), Box::new(factory));
    }

    pub fn create(&self, key: &str) -> Result<Arc<dyn Segmenter>> {
        let factory = self.factories.get(key).ok_or_else(|| {
            BizNewsError::InvalidArgument(format!(
                "unknown segmenter {key:?} (available: {})",
                self.keys().join(", ")
            ))
        })?;
        debug!(segmenter = key, "Creating segmenter");
        Ok(factory())
    }

    pub fn keys(&self) -> Vec<&str> {
        self.factories.keys().map(String::as_str).collect()
    }
}

impl Default for SegmenterRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

pub struct EmbedderRegistry {
    factories: BTreeMap<String, EmbedderFactory>,
}

impl EmbedderRegistry {
    pub fn new() -> Self {
        Self {
            factories: BTreeMap::new(),
        }
    }

    /// Registry with the ONNX and lexical backends.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register("onnx", |ctx| {
            let dir = embedding_model_dir(&ctx.model_dir);
            Ok(Arc::new(OnnxEmbedder::load(&dir)?) as Arc<dyn EmbeddingProvider>)
        });
        registry.register("lexical", |_| {
            Ok(Arc::new(LexicalEmbedder::default()) as Arc<dyn EmbeddingProvider>)
        });
        registry
    }

    pub fn register<F>(&mut self, key: &str, factory: F)
    where
        F: Fn(&EmbedderContext) -> Result<Arc<dyn EmbeddingProvider>> + Send + Sync + 'static,
    {
        self.factories.insert(key.to_string(), Box::new(factory));
    }

    /// Build the backend registered under `key`. Model loading errors
    /// surface unchanged (e.g. `MissingResource` when the model is absent).
    pub fn create(&self, key: &str, ctx: &EmbedderContext) -> Result<Arc<dyn EmbeddingProvider>> {
        let factory = self.factories.get(key).ok_or_else(|| {
            BizNewsError::InvalidArgument(format!(
                "unknown embedder {key:?} (available: {})",
                self.keys().join(", ")
            ))
        })?;
        debug!(embedder = key, model_dir = %ctx.model_dir.display(), "Creating embedder");
        factory(ctx)
    }

    pub fn keys(&self) -> Vec<&str> {
        self.factories.keys().map(String::as_str).collect()
    }
}

impl Default for EmbedderRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

/// Convenience for the common case: default registries, one key each.
pub fn create_backends(
    segmenter: &str,
    embedder: &str,
    model_dir: &Path,
) -> Result<(Arc<dyn Segmenter>, Arc<dyn EmbeddingProvider>)> {
    let segmenter = SegmenterRegistry::with_defaults().create(segmenter)?;
    let embedder = EmbedderRegistry::with_defaults().create(embedder, &EmbedderContext::new(model_dir))?;
    Ok((segmenter, embedder))
}
