// Text handling: word segmentation backends, input normalisation and
// sentence splitting.

pub mod input;
pub mod segmenter;
pub mod sentences;

pub use input::TextInput;
pub use segmenter::{CharSegmenter, JiebaSegmenter, Segmenter, WhitespaceSegmenter};
pub use sentences::split_sentences;
