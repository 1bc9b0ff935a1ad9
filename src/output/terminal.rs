// Colored terminal output for reports, extraction results and keyword lists.
//
// This module handles all terminal-specific formatting. The main.rs
// commands delegate here.

use colored::Colorize;

use super::truncate_chars;
use crate::comparator::embedding::KeywordEvaluation;
use crate::extract::SynonymMatches;
use crate::generator::GeneratorReport;
use crate::keywords::KeywordSet;
use crate::models::{DebugSegment, ExtractedKeyword};
use crate::report::NewsReport;

/// Longest segment text shown in debug listings.
const SEGMENT_PREVIEW_CHARS: usize = 60;

/// Display the combined NN/ESG verdict for one article.
pub fn display_report(label: &str, title: &str, report: &NewsReport) {
    println!("\n{}", format!("=== {label} ===").bold());
    println!("  {}", truncate_chars(title, 80));
    println!();

    display_verdict("NN", report.nn, report.nn_score, &report.nn_keywords);
    display_verdict("ESG", report.esg, report.esg_score, &report.esg_keywords);

    if let Some(segments) = &report.nn_debug {
        display_segments("NN", segments);
    }
    if let Some(segments) = &report.esg_debug {
        display_segments("ESG", segments);
    }
}

fn display_verdict(label: &str, matched: bool, score: f64, keywords: &[String]) {
    let flag = if matched {
        "yes".red().bold().to_string()
    } else {
        "no".green().to_string()
    };
    let score_str = colorize_score(score);
    println!("  {:<4} {:<4} score {}", label.dimmed(), flag, score_str);
    if !keywords.is_empty() {
        println!("       keywords: {}", keywords.join(", "));
    }
}

fn display_segments(label: &str, segments: &[DebugSegment]) {
    println!("\n  {} matching segments:", label.bold());
    for segment in segments {
        println!(
            "    [{}] {}",
            segment.keywords.join(", ").yellow(),
            truncate_chars(segment.text.trim(), SEGMENT_PREVIEW_CHARS)
        );
    }
}

/// Color a 0.0-1.0 score: red above 0.7, yellow above 0.5.
fn colorize_score(score: f64) -> String {
    let s = format!("{score:.2}");
    if score > 0.7 {
        s.red().bold().to_string()
    } else if score > 0.5 {
        s.yellow().to_string()
    } else {
        s.normal().to_string()
    }
}

/// Display extracted n-grams, one block per document.
pub fn display_extracted(docs: &[Vec<ExtractedKeyword>]) {
    for (i, keywords) in docs.iter().enumerate() {
        println!("\n{}", format!("=== Document {} ===", i + 1).bold());
        if keywords.is_empty() {
            println!("  No keywords extracted.");
            continue;
        }
        for (rank, keyword) in keywords.iter().enumerate() {
            println!(
                "  {:>2}. {:<16} {:>5.3}  {}",
                rank + 1,
                keyword.text(),
                keyword.score,
                format!("@{}", keyword.position).dimmed()
            );
        }
    }
}

/// Display extracted n-grams with the category keywords they resemble.
pub fn display_evaluations(docs: &[Vec<KeywordEvaluation>]) {
    for (i, evaluations) in docs.iter().enumerate() {
        println!("\n{}", format!("=== Document {} ===", i + 1).bold());
        for evaluation in evaluations {
            println!(
                "  {} {:.3} {}",
                evaluation.keyword.bold(),
                evaluation.score,
                format!("@{}", evaluation.position).dimmed()
            );
            if evaluation.matches.is_empty() {
                println!("      {}", "no category keyword above threshold".dimmed());
            }
            for m in &evaluation.matches {
                println!("      -> {:<12} {}", m.keyword, colorize_score(m.score));
            }
        }
    }
}

/// Display synonym matches grouped by category keyword.
pub fn display_synonyms(docs: &[SynonymMatches]) {
    for (i, matches) in docs.iter().enumerate() {
        println!("\n{}", format!("=== Document {} ===", i + 1).bold());
        if matches.is_empty() {
            println!("  No tokens above threshold.");
            continue;
        }
        for (keyword, hits) in matches {
            let tokens: Vec<String> = hits
                .iter()
                .map(|h| format!("{} ({:.2})", h.text(), h.score))
                .collect();
            println!("  {} -> {}", keyword.yellow(), tokens.join(", "));
        }
    }
}

/// Display a category's effective keyword set.
pub fn display_keywords(keywords: &KeywordSet) {
    println!(
        "\n{}",
        format!("=== {} ({} keywords) ===", keywords.category(), keywords.len()).bold()
    );
    for keyword in keywords.iter() {
        println!("  {keyword}");
    }
}

/// Display Key Generator results.
pub fn display_generator_report(report: &GeneratorReport) {
    println!(
        "\n{}",
        format!("=== Related words (model {}) ===", report.modelkey).bold()
    );
    println!(
        "  {} {}  {} {}",
        "created".dimmed(),
        report.createtime,
        "fast".dimmed(),
        report.use_fast
    );

    for (word, result) in &report.results {
        let related: Vec<String> = result
            .related
            .iter()
            .map(|(w, s)| format!("{w} ({s:.2})"))
            .collect();
        println!("\n  {} (topn {}, threshold {:.2})", word.bold(), result.topn, result.threshold);
        if !related.is_empty() {
            println!("    {}", related.join(", "));
        }
        if let Some(note) = &result.debug {
            println!("    {}", note.dimmed());
        }
    }
}
