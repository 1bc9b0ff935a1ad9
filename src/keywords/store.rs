// Keyword store: builds the deduplicated keyword set for one category.
//
// Keywords come from two places: whatever the caller passes in (literal
// keywords and/or paths to word-list files) and, optionally, every `.txt`
// list under `<keywords_root>/<category slug>/`. The union is frozen into a
// read-only set at construction.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{BizNewsError, Result};
use crate::models::Category;

/// Extension that marks a keyword source entry as a word-list file.
pub const WORD_LIST_EXTENSION: &str = ".txt";

/// Caller-supplied keywords. Each entry is either a literal keyword or,
/// when it ends in `.txt`, a path to a one-keyword-per-line file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeywordSource {
    entries: Vec<String>,
}

impl KeywordSource {
    pub fn new<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            entries: entries.into_iter().map(Into::into).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Expand file entries and return every keyword (may contain duplicates).
    /// Literal entries lose trailing whitespace the same way word-list lines do.
    pub fn resolve(&self) -> Result<Vec<String>> {
        let mut keywords = Vec::new();
        for entry in &self.entries {
            let entry = entry.trim_end();
            if entry.ends_with(WORD_LIST_EXTENSION) {
                keywords.extend(read_word_list(Path::new(entry))?);
            } else if !entry.is_empty() {
                keywords.push(entry.to_string());
            }
        }
        Ok(keywords)
    }
}

impl From<&str> for KeywordSource {
    fn from(entry: &str) -> Self {
        Self::new([entry])
    }
}

impl From<Vec<String>> for KeywordSource {
    fn from(entries: Vec<String>) -> Self {
        Self { entries }
    }
}

impl From<&[&str]> for KeywordSource {
    fn from(entries: &[&str]) -> Self {
        Self::new(entries.iter().copied())
    }
}

/// Read a UTF-8 word list: one entry per line, BOM stripped, trailing
/// whitespace removed, blank lines skipped.
pub fn read_word_list(path: &Path) -> Result<Vec<String>> {
    let content = fs::read_to_string(path).map_err(|e| BizNewsError::io(path, e))?;
    let content = content.strip_prefix('\u{feff}').unwrap_or(&content);

    Ok(content
        .lines()
        .map(str::trim_end)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect())
}

/// The frozen keyword set of one category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordSet {
    category: Category,
    keywords: BTreeSet<String>,
}

impl KeywordSet {
    /// Build the keyword set for `category`.
    ///
    /// `Other` has no keywords and is rejected with `InvalidCategory`. When
    /// `load_default` is set, `<keywords_root>/<slug>/` must exist.
    pub fn load(
        category: Category,
        source: Option<&KeywordSource>,
        load_default: bool,
        keywords_root: &Path,
    ) -> Result<Self> {
        ensure_keyword_category(category)?;

        let mut keywords = BTreeSet::new();
        if let Some(source) = source {
            keywords.extend(source.resolve()?);
        }

        if load_default {
            let dir = keywords_root.join(category.slug());
            for file in default_word_lists(&dir)? {
                keywords.extend(read_word_list(&file)?);
            }
        }

        debug!(
            category = category.as_str(),
            count = keywords.len(),
            load_default,
            "Loaded keyword set"
        );

        Ok(Self { category, keywords })
    }

    /// Same as [`KeywordSet::load`] but takes the category by name.
    pub fn load_named(
        name: &str,
        source: Option<&KeywordSource>,
        load_default: bool,
        keywords_root: &Path,
    ) -> Result<Self> {
        Self::load(name.parse()?, source, load_default, keywords_root)
    }

    /// Build a set directly from keywords already in memory.
    pub fn from_keywords<I, S>(category: Category, keywords: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ensure_keyword_category(category)?;
        Ok(Self {
            category,
            keywords: keywords
                .into_iter()
                .map(Into::into)
                .filter(|k: &String| !k.is_empty())
                .collect(),
        })
    }

    /// A new set with `extra` keywords added. The original stays untouched.
    pub fn extended<I>(&self, extra: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        let mut keywords = self.keywords.clone();
        keywords.extend(extra);
        Self {
            category: self.category,
            keywords,
        }
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.keywords.iter().map(String::as_str)
    }

    pub fn contains(&self, keyword: &str) -> bool {
        self.keywords.contains(keyword)
    }

    pub fn len(&self) -> usize {
        self.keywords.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keywords.is_empty()
    }
}

fn ensure_keyword_category(category: Category) -> Result<()> {
    if category == Category::Other {
        return Err(BizNewsError::InvalidCategory(category.as_str().to_string()));
    }
    Ok(())
}

/// All `.txt` files in `dir`, sorted by name for a stable load order.
fn default_word_lists(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(BizNewsError::MissingResource(dir.to_path_buf()));
    }

    let mut files: Vec<PathBuf> = fs::read_dir(dir)
        .map_err(|e| BizNewsError::io(dir, e))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| {
            path.is_file()
                && path
                    .to_str()
                    .is_some_and(|p| p.ends_with(WORD_LIST_EXTENSION))
        })
        .collect();
    files.sort();
    Ok(files)
}
