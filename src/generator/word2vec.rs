// Related-word discovery over a word2vec model.
//
// Given a seed word (or a `.txt` list of seed words), ask the model for its
// nearest neighbours and keep the ones above a similarity threshold. The
// results accumulate across `infer` calls until reset.

use std::collections::BTreeMap;
use std::path::Path;

use indicatif::{ProgressBar, ProgressStyle};
use tracing::debug;

use super::report::{GeneratorReport, InferParams, WordResult};
use super::word_vectors::{LoadMode, WordVectorStore, WordVectors};
use super::KeyGenerator;
use crate::comparator::round2;
use crate::error::Result;
use crate::keywords::read_word_list;
use crate::keywords::store::WORD_LIST_EXTENSION;

pub struct Word2VecKeyGenerator {
    vectors: WordVectors,
    report: GeneratorReport,
}

impl Word2VecKeyGenerator {
    /// Load `word2vec_<model_key>.{bin,txt}` from `dir`.
    pub fn open(dir: &Path, model_key: &str, mode: LoadMode) -> Result<Self> {
        let vectors = WordVectorStore::open(dir, model_key, mode)?;
        Ok(Self::with_vectors(vectors, model_key, mode.is_fast()))
    }

    /// Wrap vectors already in memory.
    pub fn with_vectors(vectors: WordVectors, model_key: &str, use_fast: bool) -> Self {
        Self {
            vectors,
            report: GeneratorReport::new(model_key, use_fast),
        }
    }

    pub fn vectors(&self) -> &WordVectors {
        &self.vectors
    }

    pub fn report(&self) -> &GeneratorReport {
        &self.report
    }

    /// Start a fresh report, keeping the model.
    pub fn reset(&mut self) {
        self.report = GeneratorReport::new(&self.report.modelkey, self.report.use_fast);
    }

    /// Related words of one word.
    pub fn infer_word(&self, word: &str, params: InferParams) -> WordResult {
        let mut result = WordResult::new(params);

        let Some(similar) = self.vectors.most_similar(word, params.topn) else {
            result.debug = Some(format!("{word} never appeared before."));
            return result;
        };

        result.related = similar
            .into_iter()
            .filter(|(_, score)| *score >= params.threshold)
            .map(|(w, score)| (w, round2(score)))
            .collect();

        let found = result.related.len();
        if found == 0 {
            result.debug = Some("Not found.".to_string());
        } else if found < params.topn {
            result.debug = Some(format!("related_word_cnt: {found} < topn: {}", params.topn));
        }
        result
    }

    fn infer_file(
        &self,
        path: &Path,
        params: InferParams,
        force_info: Option<&BTreeMap<String, InferParams>>,
    ) -> Result<BTreeMap<String, WordResult>> {
        let words = read_word_list(path)?;
        let pb = ProgressBar::new(words.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("  Inference [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .expect("valid template")
                .progress_chars("=> "),
        );

        let mut results = BTreeMap::new();
        for word in words {
            pb.inc(1);
            let word = word.trim().to_string();
            if results.contains_key(&word) {
                continue;
            }
            pb.set_message(word.clone());
            let word_params = force_info
                .and_then(|f| f.get(&word))
                .copied()
                .unwrap_or(params);
            let result = self.infer_word(&word, word_params);
            results.insert(word, result);
        }
        pb.finish_and_clear();

        debug!(path = %path.display(), words = results.len(), "Inferred word list");
        Ok(results)
    }
}

impl KeyGenerator for Word2VecKeyGenerator {
    fn infer(
        &mut self,
        input: &str,
        params: InferParams,
        force_info: Option<BTreeMap<String, InferParams>>,
        init_results: bool,
    ) -> Result<&GeneratorReport> {
        if init_results {
            self.reset();
        }

        let results = if input.ends_with(WORD_LIST_EXTENSION) {
            debug!(input, "Processing input as a word list");
            self.infer_file(Path::new(input), params, force_info.as_ref())?
        } else {
            debug!(input, "Processing input as a single word");
            BTreeMap::from([(input.to_string(), self.infer_word(input, params))])
        };

        self.report.default_info = Some(params);
        self.report.base.push(input.to_string());
        self.report.force_info = force_info;
        self.report.results.extend(results);
        Ok(&self.report)
    }

    fn save(&self, path: &Path) -> Result<()> {
        self.report.save(path)
    }

    fn related_words(&self, word: &str) -> Option<&WordResult> {
        self.report.results.get(word)
    }
}
