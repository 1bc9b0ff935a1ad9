// BizNews: Chinese business news classification
//
// This is the library root. Articles are sorted into Negative News, ESG
// News or Other by literal keyword matching and by embedding similarity
// against per-category keyword lists.

pub mod comparator;
pub mod config;
pub mod embeddings;
pub mod error;
pub mod extract;
pub mod generator;
pub mod keywords;
pub mod models;
pub mod output;
pub mod registry;
pub mod report;
pub mod text;

pub use error::{BizNewsError, Result};
