// Stopword set used by the keyword extractor and synonym extensor.
//
// The default list is the stop-words crate's Chinese list plus the
// punctuation the segmenters emit as standalone tokens.

use std::collections::HashSet;

use stop_words::{get, LANGUAGE};

use crate::error::Result;
use crate::keywords::store::KeywordSource;

/// Punctuation and whitespace tokens that segmenters return on their own.
const PUNCTUATION: &[&str] = &[
    "，", "。", "、", "；", "：", "？", "！", "「", "」", "『", "』", "（", "）", "《", "》",
    "〈", "〉", "【", "】", "—", "…", "．", "～", ",", ".", ";", ":", "?", "!", "(", ")", "[",
    "]", "\"", "'", "-", "/", " ", "\t", "\n", "\r", "\u{3000}",
];

#[derive(Debug, Clone, Default)]
pub struct StopWords {
    words: HashSet<String>,
}

impl StopWords {
    /// Build the effective stopword set: caller words (literals or `.txt`
    /// lists) plus, unless disabled, the built-in default list.
    pub fn build(custom: Option<&KeywordSource>, load_default: bool) -> Result<Self> {
        let mut words = HashSet::new();

        if let Some(custom) = custom {
            words.extend(custom.resolve()?);
        }

        if load_default {
            words.extend(get(LANGUAGE::Chinese));
            words.extend(PUNCTUATION.iter().map(|p| p.to_string()));
        }

        Ok(Self { words })
    }

    pub fn contains(&self, token: &str) -> bool {
        self.words.contains(token)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}
