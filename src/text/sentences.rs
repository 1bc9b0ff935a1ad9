// Sentence splitting for keyword counting.
//
// A segment is a run of non-terminal characters optionally followed by one
// terminal mark (ASCII `.!?` or the full-width `。！？`).

use std::sync::OnceLock;

use regex_lite::Regex;

fn sentence_regex() -> &'static Regex {
    static SENTENCE: OnceLock<Regex> = OnceLock::new();
    SENTENCE.get_or_init(|| {
        Regex::new(r"[^.!?。！？]+[.!?。！？]?").expect("sentence pattern is valid")
    })
}

/// Split `text` into sentence-like segments, in order.
///
/// Terminal marks that do not follow any content (e.g. "!!" after a
/// sentence) are dropped; an empty body yields no segments.
pub fn split_sentences(text: &str) -> Vec<&str> {
    sentence_regex().find_iter(text).map(|m| m.as_str()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_chinese_sentences() {
        let segments = split_sentences("警方調查詐騙集團。嫌犯已到案！是否起訴？");
        assert_eq!(
            segments,
            vec!["警方調查詐騙集團。", "嫌犯已到案！", "是否起訴？"]
        );
    }

    #[test]
    fn test_split_keeps_trailing_fragment() {
        let segments = split_sentences("First. Second without end");
        assert_eq!(segments, vec!["First.", " Second without end"]);
    }

    #[test]
    fn test_split_empty() {
        assert!(split_sentences("").is_empty());
    }

    #[test]
    fn test_split_repeated_marks() {
        let segments = split_sentences("真的嗎??");
        assert_eq!(segments, vec!["真的嗎?"]);
    }
}
