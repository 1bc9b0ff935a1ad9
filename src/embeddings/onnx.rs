// Contextual word embeddings from a local transformer model via ONNX.
//
// A tokenized document is fed to the model as pre-split words, so the
// tokenizer keeps a word index for every sub-word piece. The last hidden
// state is then mean-pooled per word: each input token gets the average of
// its sub-word vectors. Document-level vectors are pooled from these by the
// callers.
//
// The model runs locally; no API calls.

use std::path::Path;
use std::sync::Mutex;

use ort::session::Session;
use ort::value::Tensor;
use tokenizers::{Tokenizer, TruncationParams};
use tracing::debug;

use super::traits::{Embedding, EmbeddingProvider};
use crate::error::{BizNewsError, Result};

/// Longest sequence the encoder accepts, special tokens included.
pub const MAX_SEQUENCE_LEN: usize = 512;

/// Word embedder backed by an ONNX BERT-style encoder.
pub struct OnnxEmbedder {
    // ort::Session::run takes &mut self and the backend is not re-entrant,
    // so every inference goes through this lock.
    session: Mutex<Session>,
    tokenizer: Tokenizer,
}

impl OnnxEmbedder {
    /// Load the model and tokenizer from the given directory.
    ///
    /// Expects `model.onnx` and `tokenizer.json` in the directory.
    /// Call `download::download_model()` first if they don't exist.
    pub fn load(model_dir: &Path) -> Result<Self> {
        let model_path = model_dir.join("model.onnx");
        let tokenizer_path = model_dir.join("tokenizer.json");

        if !model_path.exists() {
            return Err(BizNewsError::MissingResource(model_path));
        }
        if !tokenizer_path.exists() {
            return Err(BizNewsError::MissingResource(tokenizer_path));
        }

        let session = Session::builder()
            .map_err(|e| BizNewsError::embedding(format!("failed to create ONNX session builder: {e}")))?
            .commit_from_file(&model_path)
            .map_err(|e| {
                BizNewsError::embedding(format!(
                    "failed to load embedding model from {}: {e}",
                    model_path.display()
                ))
            })?;

        let mut tokenizer = Tokenizer::from_file(&tokenizer_path)
            .map_err(|e| BizNewsError::embedding(format!("failed to load tokenizer: {e}")))?;
        tokenizer
            .with_truncation(Some(TruncationParams {
                max_length: MAX_SEQUENCE_LEN,
                ..Default::default()
            }))
            .map_err(|e| BizNewsError::embedding(format!("failed to configure truncation: {e}")))?;

        debug!("Loaded word embedding model from {}", model_dir.display());

        Ok(Self {
            session: Mutex::new(session),
            tokenizer,
        })
    }
}

impl EmbeddingProvider for OnnxEmbedder {
    fn name(&self) -> &str {
        "onnx"
    }

    fn embed_tokens(&self, tokens: &[String]) -> Result<Vec<Embedding>> {
        if tokens.is_empty() {
            return Ok(Vec::new());
        }

        let words: Vec<&str> = tokens.iter().map(String::as_str).collect();
        let encoding = self
            .tokenizer
            .encode(words, true)
            .map_err(|e| BizNewsError::embedding(format!("tokenization failed: {e}")))?;

        let seq_len = encoding.get_ids().len();
        let input_ids: Vec<i64> = encoding.get_ids().iter().map(|&id| id as i64).collect();
        let attention_mask: Vec<i64> = encoding
            .get_attention_mask()
            .iter()
            .map(|&m| m as i64)
            .collect();
        let token_type_ids = vec![0i64; seq_len];

        let shape = [1i64, seq_len as i64];
        let input_ids_tensor = Tensor::from_array((shape, input_ids))
            .map_err(|e| BizNewsError::embedding(format!("input_ids tensor: {e}")))?;
        let attention_mask_tensor = Tensor::from_array((shape, attention_mask))
            .map_err(|e| BizNewsError::embedding(format!("attention_mask tensor: {e}")))?;
        let token_type_ids_tensor = Tensor::from_array((shape, token_type_ids))
            .map_err(|e| BizNewsError::embedding(format!("token_type_ids tensor: {e}")))?;

        // last_hidden_state: [1, seq_len, dim]
        let (dim, hidden_states) = {
            let mut session = self
                .session
                .lock()
                .map_err(|e| BizNewsError::embedding(format!("session lock poisoned: {e}")))?;

            let outputs = session
                .run(ort::inputs! {
                    "input_ids" => input_ids_tensor,
                    "attention_mask" => attention_mask_tensor,
                    "token_type_ids" => token_type_ids_tensor
                })
                .map_err(|e| BizNewsError::embedding(format!("ONNX inference failed: {e}")))?;

            let (out_shape, data) = outputs[0]
                .try_extract_tensor::<f32>()
                .map_err(|e| BizNewsError::embedding(format!("failed to extract output: {e}")))?;

            let dim = out_shape.last().copied().unwrap_or(0) as usize;
            (dim, data.to_vec())
        };

        if dim == 0 || hidden_states.len() < seq_len * dim {
            return Err(BizNewsError::embedding(format!(
                "unexpected output size {} for {seq_len} tokens",
                hidden_states.len()
            )));
        }

        let vectors = pool_by_word(encoding.get_word_ids(), &hidden_states, dim, tokens.len());

        debug!(
            words = tokens.len(),
            pieces = seq_len,
            dim,
            "Computed word embeddings"
        );

        Ok(vectors)
    }
}

/// Average the sub-word vectors belonging to each input word.
///
/// Special tokens carry no word id and are ignored. Words that lost all of
/// their pieces to truncation keep a zero vector.
fn pool_by_word(
    word_ids: &[Option<u32>],
    hidden_states: &[f32],
    dim: usize,
    word_count: usize,
) -> Vec<Embedding> {
    let mut sums = vec![vec![0.0_f64; dim]; word_count];
    let mut counts = vec![0usize; word_count];

    for (piece, word) in word_ids.iter().enumerate() {
        let Some(word) = word.map(|w| w as usize) else {
            continue;
        };
        if word >= word_count {
            continue;
        }
        let offset = piece * dim;
        for (acc, &val) in sums[word].iter_mut().zip(&hidden_states[offset..offset + dim]) {
            *acc += val as f64;
        }
        counts[word] += 1;
    }

    for (sum, &count) in sums.iter_mut().zip(&counts) {
        if count > 0 {
            for val in sum.iter_mut() {
                *val /= count as f64;
            }
        }
    }
    sums
}
