// Keyword lists: per-category trigger terms and the stopword set.

pub mod stopwords;
pub mod store;

pub use stopwords::StopWords;
pub use store::{read_word_list, KeywordSet, KeywordSource};
