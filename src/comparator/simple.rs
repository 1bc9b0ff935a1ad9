// Literal keyword comparator.
//
// Counts how often each keyword occurs in the title and in every sentence
// of the body, weights title hits more heavily, and maps the weighted count
// onto a saturating curve:
//
//   score = 0                                   if count == 0
//   score = min(1, 0.5 + 0.5 / 15² · count²)    otherwise
//
// Any hit at all lands at 0.5 or above; fifteen weighted hits saturate at
// 1.0. With the default 0.3 / 0.1 weights one title hit counts as three
// body hits.

use std::collections::BTreeMap;

use tracing::debug;

use super::{round2, Comparator};
use crate::error::{BizNewsError, Result};
use crate::keywords::KeywordSet;
use crate::models::{Category, ClassificationResult, DebugSegment};
use crate::text::split_sentences;

/// Weighted count at which the score reaches 1.0.
const SATURATION_COUNT: f64 = 15.0;

#[derive(Debug, Clone)]
pub struct SimpleOptions {
    /// Score must exceed this for the category to be assigned (default 0.50)
    pub threshold: f64,
    /// Relative weight of a title hit (default 0.3)
    pub title_weight: f64,
    /// Relative weight of a body hit (default 0.1)
    pub body_weight: f64,
    /// Return the matching segments alongside the result
    pub debug: bool,
}

impl Default for SimpleOptions {
    fn default() -> Self {
        Self {
            threshold: 0.50,
            title_weight: 0.3,
            body_weight: 0.1,
            debug: false,
        }
    }
}

impl SimpleOptions {
    /// How many body hits one title hit is worth, rounded to 2 decimals.
    pub fn title_ratio(&self) -> Result<f64> {
        if self.body_weight <= 0.0 {
            return Err(BizNewsError::InvalidArgument(format!(
                "body_weight must be positive, got {}",
                self.body_weight
            )));
        }
        Ok(round2(self.title_weight / self.body_weight))
    }
}

pub struct SimpleComparator {
    keywords: KeywordSet,
    options: SimpleOptions,
}

/// Per-keyword hit counts of one segment, plus the segment total.
struct SegmentHits {
    counts: Vec<(String, usize)>,
    total: usize,
}

impl SimpleComparator {
    pub fn new(keywords: KeywordSet, options: SimpleOptions) -> Self {
        Self { keywords, options }
    }

    pub fn options(&self) -> &SimpleOptions {
        &self.options
    }

    /// Classify with per-call options instead of the construction defaults.
    pub fn classify_with(
        &self,
        title: &str,
        body: &str,
        options: &SimpleOptions,
    ) -> Result<ClassificationResult> {
        let ratio = options.title_ratio()?;

        let mut per_keyword: BTreeMap<String, usize> = BTreeMap::new();
        let mut segments = Vec::new();

        let title_hits = self.count_hits(title);
        let title_total = title_hits.total;
        record(&mut per_keyword, &mut segments, title_hits, title);

        let mut body_total = 0usize;
        for sentence in split_sentences(body) {
            let hits = self.count_hits(sentence);
            body_total += hits.total;
            record(&mut per_keyword, &mut segments, hits, sentence);
        }

        let weighted = ratio * title_total as f64 + body_total as f64;
        let score = score_from_count(weighted);

        let category = if score > options.threshold {
            self.keywords.category()
        } else {
            Category::Other
        };

        let mut matched: Vec<(String, usize)> = per_keyword.into_iter().collect();
        matched.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

        debug!(
            category = self.keywords.category().as_str(),
            title_hits = title_total,
            body_hits = body_total,
            weighted,
            score,
            "Simple comparison"
        );

        Ok(ClassificationResult {
            category,
            score,
            matched_keywords: matched.into_iter().map(|(k, _)| k).collect(),
            debug: options.debug.then_some(segments),
        })
    }

    fn count_hits(&self, text: &str) -> SegmentHits {
        let mut counts: Vec<(String, usize)> = self
            .keywords
            .iter()
            .filter_map(|keyword| {
                let n = text.matches(keyword).count();
                (n > 0).then(|| (keyword.to_string(), n))
            })
            .collect();
        // Stable sort keeps alphabetical order among equal counts
        counts.sort_by(|a, b| b.1.cmp(&a.1));
        let total = counts.iter().map(|(_, n)| n).sum();
        SegmentHits { counts, total }
    }
}

fn record(
    per_keyword: &mut BTreeMap<String, usize>,
    segments: &mut Vec<DebugSegment>,
    hits: SegmentHits,
    text: &str,
) {
    if hits.total == 0 {
        return;
    }
    for (keyword, n) in &hits.counts {
        *per_keyword.entry(keyword.clone()).or_default() += n;
    }
    segments.push(DebugSegment {
        keywords: hits.counts.into_iter().map(|(k, _)| k).collect(),
        text: text.to_string(),
    });
}

/// Map a weighted hit count onto [0.5, 1.0], or 0.0 for no hits.
pub fn score_from_count(weighted_count: f64) -> f64 {
    if weighted_count <= 0.0 {
        return 0.0;
    }
    let raw = 0.5 + 0.5 / (SATURATION_COUNT * SATURATION_COUNT) * weighted_count.powi(2);
    round2(raw).min(1.0)
}

impl Comparator for SimpleComparator {
    fn category(&self) -> Category {
        self.keywords.category()
    }

    fn keywords(&self) -> &KeywordSet {
        &self.keywords
    }

    fn classify(&self, title: &str, body: &str) -> Result<ClassificationResult> {
        self.classify_with(title, body, &self.options)
    }
}
