// Pre-trained word vectors for related-word discovery.
//
// Two on-disk formats, both the standard word2vec ones:
//
//   word2vec_<key>.bin  binary: "<count> <dim>\n", then per word
//                       "<word> " followed by <dim> little-endian f32s
//   word2vec_<key>.txt  text:   optional "<count> <dim>" header, then
//                       "<word> <v1> ... <vdim>" per line
//
// Fast mode reads the binary file straight into one contiguous matrix.
// Normal mode parses the text export. Either way the vectors are
// unit-normalised at load time and never modified afterwards, so
// `most_similar` is a dot product per row.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use tracing::info;

use crate::error::{BizNewsError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadMode {
    /// word2vec binary format
    Fast,
    /// word2vec text format
    Normal,
}

impl LoadMode {
    pub fn is_fast(&self) -> bool {
        matches!(self, LoadMode::Fast)
    }

    fn extension(&self) -> &'static str {
        match self {
            LoadMode::Fast => "bin",
            LoadMode::Normal => "txt",
        }
    }
}

/// Resolves model keys to files under a model directory.
pub struct WordVectorStore;

impl WordVectorStore {
    /// Path of the model file for `model_key` in the given mode.
    pub fn model_path(dir: &Path, model_key: &str, mode: LoadMode) -> PathBuf {
        dir.join(format!("word2vec_{model_key}.{}", mode.extension()))
    }

    pub fn open(dir: &Path, model_key: &str, mode: LoadMode) -> Result<WordVectors> {
        let path = Self::model_path(dir, model_key, mode);
        if !path.is_file() {
            return Err(BizNewsError::MissingResource(path));
        }

        let file = File::open(&path).map_err(|e| BizNewsError::io(&path, e))?;
        let reader = BufReader::new(file);
        let vectors = match mode {
            LoadMode::Fast => WordVectors::read_binary(reader),
            LoadMode::Normal => WordVectors::read_text(reader),
        }
        .map_err(|e| match e {
            BizNewsError::InvalidArgument(msg) => {
                BizNewsError::InvalidArgument(format!("{}: {msg}", path.display()))
            }
            other => other,
        })?;

        info!(
            model_key,
            words = vectors.len(),
            dim = vectors.dim(),
            fast = mode.is_fast(),
            "Loaded word vectors"
        );
        Ok(vectors)
    }
}

/// An immutable vocabulary with one unit-length vector per word.
#[derive(Debug, Clone)]
pub struct WordVectors {
    words: Vec<String>,
    index: HashMap<String, usize>,
    dim: usize,
    // Row-major, `words.len() * dim` values
    matrix: Vec<f32>,
}

impl WordVectors {
    /// Build from in-memory (word, vector) pairs. Later duplicates are
    /// ignored; every vector must have the same length.
    pub fn from_pairs<I>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (String, Vec<f32>)>,
    {
        let mut builder = Builder::default();
        for (word, vector) in pairs {
            builder.push(word, &vector)?;
        }
        Ok(builder.finish())
    }

    pub fn read_text<R: BufRead>(reader: R) -> Result<Self> {
        let mut builder = Builder::default();

        for (line_no, line) in reader.lines().enumerate() {
            let line = line.map_err(|e| BizNewsError::io("<word vectors>", e))?;
            let parts: Vec<&str> = line.split_whitespace().collect();
            if parts.is_empty() {
                continue;
            }
            if line_no == 0 && parts.len() == 2 && parts.iter().all(|p| p.parse::<usize>().is_ok()) {
                continue;
            }

            let vector = parts[1..]
                .iter()
                .map(|v| v.parse::<f32>())
                .collect::<std::result::Result<Vec<f32>, _>>()
                .map_err(|e| {
                    BizNewsError::InvalidArgument(format!("line {}: bad vector value: {e}", line_no + 1))
                })?;
            builder.push(parts[0].to_string(), &vector)?;
        }

        Ok(builder.finish())
    }

    pub fn read_binary<R: BufRead>(mut reader: R) -> Result<Self> {
        let mut header = String::new();
        reader
            .read_line(&mut header)
            .map_err(|e| BizNewsError::io("<word vectors>", e))?;
        let (count, dim) = parse_header(&header)?;
        if dim > MAX_BINARY_DIM || count.checked_mul(dim).is_none() {
            return Err(BizNewsError::InvalidArgument(format!(
                "word2vec header {:?} describes an impossible model",
                header.trim_end()
            )));
        }

        // The header is untrusted; rows past the first few are allocated as read.
        let rows = count.min(PREALLOCATED_FLOATS / dim);
        let mut matrix = Vec::with_capacity(rows * dim);
        let mut words = Vec::with_capacity(rows);
        let mut index = HashMap::with_capacity(rows);
        let mut raw = vec![0u8; dim * 4];

        for _ in 0..count {
            let word = read_word(&mut reader)?;
            reader.read_exact(&mut raw).map_err(|e| BizNewsError::io("<word vectors>", e))?;

            let row: Vec<f32> = raw
                .chunks_exact(4)
                .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
                .collect();
            if index.contains_key(&word) {
                continue;
            }
            index.insert(word.clone(), words.len());
            words.push(word);
            matrix.extend(normalized(&row));
        }

        Ok(Self {
            words,
            index,
            dim,
            matrix,
        })
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn contains(&self, word: &str) -> bool {
        self.index.contains_key(word)
    }

    /// Unit-length vector of `word`.
    pub fn get(&self, word: &str) -> Option<&[f32]> {
        self.index.get(word).map(|&i| self.row(i))
    }

    /// The `topn` words closest to `word` by cosine similarity, best first,
    /// excluding `word` itself. `None` when `word` is out of vocabulary.
    pub fn most_similar(&self, word: &str, topn: usize) -> Option<Vec<(String, f64)>> {
        let &target = self.index.get(word)?;
        let query = self.row(target);

        let mut scored: Vec<(usize, f64)> = (0..self.words.len())
            .filter(|&i| i != target)
            .map(|i| {
                let dot: f32 = self.row(i).iter().zip(query).map(|(a, b)| a * b).sum();
                (i, dot as f64)
            })
            .collect();

        scored.sort_by(|a, b| b.1.total_cmp(&a.1));
        scored.truncate(topn);

        Some(
            scored
                .into_iter()
                .map(|(i, score)| (self.words[i].clone(), score))
                .collect(),
        )
    }

    fn row(&self, i: usize) -> &[f32] {
        &self.matrix[i * self.dim..(i + 1) * self.dim]
    }
}

#[derive(Default)]
struct Builder {
    words: Vec<String>,
    index: HashMap<String, usize>,
    dim: Option<usize>,
    matrix: Vec<f32>,
}

impl Builder {
    fn push(&mut self, word: String, vector: &[f32]) -> Result<()> {
        let dim = *self.dim.get_or_insert(vector.len());
        if vector.len() != dim || dim == 0 {
            return Err(BizNewsError::InvalidArgument(format!(
                "vector for {word:?} has {} values, expected {dim}",
                vector.len()
            )));
        }
        if self.index.contains_key(&word) {
            return Ok(());
        }
        self.index.insert(word.clone(), self.words.len());
        self.words.push(word);
        self.matrix.extend(normalized(vector));
        Ok(())
    }

    fn finish(self) -> WordVectors {
        WordVectors {
            words: self.words,
            index: self.index,
            dim: self.dim.unwrap_or(0),
            matrix: self.matrix,
        }
    }
}

fn normalized(vector: &[f32]) -> Vec<f32> {
    let norm = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        vector.iter().map(|x| x / norm).collect()
    } else {
        vector.to_vec()
    }
}

/// Largest vector width accepted from a binary header.
const MAX_BINARY_DIM: usize = 1 << 16;

/// Matrix cells reserved up front when reading a binary model.
const PREALLOCATED_FLOATS: usize = 1 << 22;

fn parse_header(header: &str) -> Result<(usize, usize)> {
    let mut parts = header.split_whitespace().map(str::parse::<usize>);
    match (parts.next(), parts.next()) {
        (Some(Ok(count)), Some(Ok(dim))) if dim > 0 => Ok((count, dim)),
        _ => Err(BizNewsError::InvalidArgument(format!(
            "bad word2vec header {:?}",
            header.trim_end()
        ))),
    }
}

/// Read one space-terminated word, skipping the newline that some writers
/// put after each vector.
fn read_word<R: BufRead>(reader: &mut R) -> Result<String> {
    let mut bytes = Vec::new();
    reader
        .read_until(b' ', &mut bytes)
        .map_err(|e| BizNewsError::io("<word vectors>", e))?;
    if bytes.last() != Some(&b' ') {
        return Err(BizNewsError::InvalidArgument("truncated word2vec binary".into()));
    }
    bytes.pop();
    let start = bytes.iter().position(|&b| b != b'\n').unwrap_or(bytes.len());
    String::from_utf8(bytes[start..].to_vec())
        .map_err(|e| BizNewsError::InvalidArgument(format!("word is not UTF-8: {e}")))
}
