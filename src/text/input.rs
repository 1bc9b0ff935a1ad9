// Input normalisation for the extraction entry points.
//
// Callers may pass one text, many texts, or documents they have already
// tokenized. A flat list of strings is ambiguous (a batch of documents or
// the tokens of one document), so `is_split_into_words` decides.

use crate::error::{BizNewsError, Result};
use crate::text::segmenter::Segmenter;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextInput {
    /// One raw document.
    Single(String),
    /// A batch of raw documents, or the tokens of one document when the
    /// input is flagged as pre-split.
    Many(Vec<String>),
    /// A batch of pre-tokenized documents.
    Nested(Vec<Vec<String>>),
}

/// Documents after normalisation, before segmentation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Documents {
    Raw(Vec<String>),
    Tokenized(Vec<Vec<String>>),
}

impl TextInput {
    /// Resolve the input shape into a batch of documents.
    pub fn normalize(self, is_split_into_words: bool) -> Result<Documents> {
        match (self, is_split_into_words) {
            (TextInput::Single(_), true) => Err(BizNewsError::InvalidArgument(
                "a single string cannot be pre-split into words; pass a list of tokens".into(),
            )),
            (TextInput::Single(text), false) => Ok(Documents::Raw(vec![text])),
            (TextInput::Many(tokens), true) => Ok(Documents::Tokenized(vec![tokens])),
            (TextInput::Many(texts), false) => Ok(Documents::Raw(texts)),
            (TextInput::Nested(_), false) => Err(BizNewsError::InvalidArgument(
                "nested token lists require is_split_into_words".into(),
            )),
            (TextInput::Nested(docs), true) => Ok(Documents::Tokenized(docs)),
        }
    }

    /// Normalise and segment in one step.
    pub fn into_tokenized(
        self,
        is_split_into_words: bool,
        segmenter: &dyn Segmenter,
    ) -> Result<Vec<Vec<String>>> {
        Ok(match self.normalize(is_split_into_words)? {
            Documents::Raw(texts) => segmenter.segment_batch(&texts),
            Documents::Tokenized(docs) => docs,
        })
    }
}

impl From<&str> for TextInput {
    fn from(text: &str) -> Self {
        TextInput::Single(text.to_string())
    }
}

impl From<String> for TextInput {
    fn from(text: String) -> Self {
        TextInput::Single(text)
    }
}

impl From<Vec<String>> for TextInput {
    fn from(texts: Vec<String>) -> Self {
        TextInput::Many(texts)
    }
}

impl From<Vec<Vec<String>>> for TextInput {
    fn from(docs: Vec<Vec<String>>) -> Self {
        TextInput::Nested(docs)
    }
}
