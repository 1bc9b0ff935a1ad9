// Output formatting: terminal display of reports and extraction results.

pub mod terminal;

pub use terminal::{
    display_evaluations, display_extracted, display_generator_report, display_keywords,
    display_report, display_synonyms,
};

/// Truncate a string to at most `max_chars` characters, appending "..." if truncated.
///
/// Unlike byte slicing (`&text[..120]`), this respects UTF-8 character boundaries
/// and will never panic on multi-byte characters like CJK text.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    let char_count = text.chars().count();
    if char_count <= max_chars {
        text.to_string()
    } else {
        let truncated: String = text.chars().take(max_chars).collect();
        format!("{truncated}...")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_chars_cjk() {
        assert_eq!(truncate_chars("警方調查詐騙集團", 4), "警方調查...");
        assert_eq!(truncate_chars("詐騙", 4), "詐騙");
    }
}
