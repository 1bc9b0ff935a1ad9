// Key Generator results and their on-disk forms.
//
// `.json` keeps everything (run metadata plus every queried word with its
// related words and scores). `.txt` is the flat, deduplicated list of every
// related word found, ready to be dropped into a keyword directory.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;

use chrono::Local;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{BizNewsError, Result};

/// Timestamp layout of `createtime`.
pub const CREATETIME_FORMAT: &str = "%Y/%m/%d %H:%M:%S";

/// How many neighbours to ask for and how close they must be.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InferParams {
    pub topn: usize,
    pub threshold: f64,
}

impl Default for InferParams {
    fn default() -> Self {
        Self {
            topn: 10,
            threshold: 0.70,
        }
    }
}

/// Related words found for one queried word.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WordResult {
    pub topn: usize,
    pub threshold: f64,
    /// (word, similarity rounded to 2 decimals), best first
    pub related: Vec<(String, f64)>,
    /// Why the list is short or empty, if it is
    pub debug: Option<String>,
}

impl WordResult {
    pub fn new(params: InferParams) -> Self {
        Self {
            topn: params.topn,
            threshold: params.threshold,
            related: Vec::new(),
            debug: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratorReport {
    pub createtime: String,
    pub modelkey: String,
    pub use_fast: bool,
    /// Every input passed to `infer` since the last reset
    pub base: Vec<String>,
    pub default_info: Option<InferParams>,
    pub force_info: Option<BTreeMap<String, InferParams>>,
    pub results: BTreeMap<String, WordResult>,
}

impl GeneratorReport {
    /// Empty report stamped with the current local time.
    pub fn new(modelkey: &str, use_fast: bool) -> Self {
        Self {
            createtime: Local::now().format(CREATETIME_FORMAT).to_string(),
            modelkey: modelkey.to_string(),
            use_fast,
            base: Vec::new(),
            default_info: None,
            force_info: None,
            results: BTreeMap::new(),
        }
    }

    /// Every related word across all queried words, sorted and deduplicated.
    pub fn related_words(&self) -> BTreeSet<&str> {
        self.results
            .values()
            .flat_map(|r| r.related.iter().map(|(w, _)| w.as_str()))
            .collect()
    }

    /// Write to `path` as `.json` or `.txt`, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<()> {
        let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        if extension != "json" && extension != "txt" {
            return Err(BizNewsError::UnsupportedFormat(path.display().to_string()));
        }

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            if !parent.exists() {
                debug!("Creating directory {}", parent.display());
                fs::create_dir_all(parent).map_err(|e| BizNewsError::io(parent, e))?;
            }
        }

        let content = if extension == "json" {
            serde_json::to_string_pretty(self)?
        } else {
            let mut out = String::new();
            for word in self.related_words() {
                out.push_str(word);
                out.push('\n');
            }
            out
        };

        fs::write(path, content).map_err(|e| BizNewsError::io(path, e))?;
        debug!(path = %path.display(), "Saved generator report");
        Ok(())
    }

    pub fn load_json(path: &Path) -> Result<Self> {
        let json = fs::read_to_string(path).map_err(|e| BizNewsError::io(path, e))?;
        Ok(serde_json::from_str(&json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> GeneratorReport {
        let mut report = GeneratorReport::new("test", true);
        let mut a = WordResult::new(InferParams::default());
        a.related = vec![("詐財".into(), 0.81), ("詐欺".into(), 0.77)];
        let mut b = WordResult::new(InferParams::default());
        b.related = vec![("詐欺".into(), 0.74)];
        report.results.insert("詐騙".into(), a);
        report.results.insert("騙取".into(), b);
        report
    }

    #[test]
    fn test_createtime_format() {
        let report = GeneratorReport::new("k", false);
        assert!(chrono::NaiveDateTime::parse_from_str(&report.createtime, CREATETIME_FORMAT).is_ok());
    }

    #[test]
    fn test_related_words_deduplicated() {
        let report = sample();
        assert_eq!(report.related_words().into_iter().collect::<Vec<_>>(), vec!["詐欺", "詐財"]);
    }

    #[test]
    fn test_unsupported_extension() {
        let path = std::env::temp_dir().join("biznews-report.csv");
        let err = sample().save(&path).unwrap_err();
        assert!(matches!(err, BizNewsError::UnsupportedFormat(_)));
        assert!(!path.exists());
    }

    #[test]
    fn test_txt_output_one_word_per_line() {
        let dir = std::env::temp_dir().join(format!("biznews-report-txt-{}", std::process::id()));
        let path = dir.join("nested").join("related.txt");
        sample().save(&path).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "詐欺\n詐財\n");
        fs::remove_dir_all(&dir).unwrap();
    }
}
