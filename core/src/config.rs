use crate::IndexMode;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const DEFAULT_CHUNK_SIZE: usize = 1000;
pub const DEFAULT_TOP_K: usize = 10;

#[derive(Debug, Clone)]
pub struct IndexConfig {
    pub mode: IndexMode,
    /// Documents per level-0 block.
    pub chunk_size: usize,
    /// Directory for block and intermediate merge files. Must not hold other
    /// `level*_chunk*.txt` files.
    pub scratch_dir: PathBuf,
}

impl IndexConfig {
    pub fn new<P: Into<PathBuf>>(mode: IndexMode, scratch_dir: P) -> Self {
        Self { mode, chunk_size: DEFAULT_CHUNK_SIZE, scratch_dir: scratch_dir.into() }
    }
}

/// Ranked-search knobs. Every field is optional in the JSON config file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Query terms whose `log10(N / df)` falls below this are ignored.
    pub idf_cutoff: f64,
    /// Stop reading a term's weight-ordered postings once one contribution
    /// drops below this. `None` reads every posting.
    pub score_cutoff: Option<f64>,
    pub top_k: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self { idf_cutoff: 0.0, score_cutoff: None, top_k: DEFAULT_TOP_K }
    }
}
