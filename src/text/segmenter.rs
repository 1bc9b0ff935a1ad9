// Word segmentation trait: the swap-ready abstraction over tokenizers.
//
// The extractor and comparators only see `Segmenter`; which backend sits
// behind it is chosen by key through the registry.

use jieba_rs::Jieba;

/// Splits raw text into word tokens.
pub trait Segmenter: Send + Sync {
    /// Registry key of this backend.
    fn name(&self) -> &str;

    /// Cut one document into tokens, in reading order.
    fn segment(&self, text: &str) -> Vec<String>;

    /// Cut a batch of documents, preserving order.
    fn segment_batch(&self, texts: &[String]) -> Vec<Vec<String>> {
        texts.iter().map(|t| self.segment(t)).collect()
    }
}

/// Jieba dictionary segmentation. Precise mode by default; search mode
/// additionally emits the shorter words inside long compounds.
pub struct JiebaSegmenter {
    jieba: Jieba,
    search_mode: bool,
}

impl JiebaSegmenter {
    pub fn new() -> Self {
        Self {
            jieba: Jieba::new(),
            search_mode: false,
        }
    }

    pub fn search() -> Self {
        Self {
            jieba: Jieba::new(),
            search_mode: true,
        }
    }
}

impl Default for JiebaSegmenter {
    fn default() -> Self {
        Self::new()
    }
}

impl Segmenter for JiebaSegmenter {
    fn name(&self) -> &str {
        if self.search_mode {
            "jieba-search"
        } else {
            "jieba"
        }
    }

    fn segment(&self, text: &str) -> Vec<String> {
        let words = if self.search_mode {
            self.jieba.cut_for_search(text, true)
        } else {
            self.jieba.cut(text, true)
        };
        words.into_iter().map(str::to_string).collect()
    }
}

/// One token per non-whitespace character.
#[derive(Debug, Default)]
pub struct CharSegmenter;

impl Segmenter for CharSegmenter {
    fn name(&self) -> &str {
        "char"
    }

    fn segment(&self, text: &str) -> Vec<String> {
        text.chars()
            .filter(|c| !c.is_whitespace())
            .map(String::from)
            .collect()
    }
}

/// Splits on whitespace. Useful for text that was segmented upstream and
/// joined with spaces.
#[derive(Debug, Default)]
pub struct WhitespaceSegmenter;

impl Segmenter for WhitespaceSegmenter {
    fn name(&self) -> &str {
        "whitespace"
    }

    fn segment(&self, text: &str) -> Vec<String> {
        text.split_whitespace().map(str::to_string).collect()
    }
}
