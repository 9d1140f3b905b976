//! Block sort-based inverted index with skip-pointer boolean search and
//! cosine-ranked free-text search over a seekable postings file.

use serde::{Deserialize, Serialize};

pub mod block;
pub mod boolean;
pub mod codec;
pub mod config;
pub mod dictionary;
pub mod error;
pub mod index;
pub mod literal;
pub mod merge;
pub mod persist;
pub mod postings;
pub mod query;
pub mod ranked;
pub mod term_table;
pub mod tokenizer;

pub use error::{IndexError, IndexResult};

pub type TermId = u32;
pub type DocId = u32;

/// Reserved key of the posting list holding every DocID in the collection.
pub const ALL_KEY: &str = "_ALL_";
/// Reserved key of the `(docid, token count)` list written for ranked indexes.
pub const LENGTH_KEY: &str = "_LENGTH_";

/// Which query family an index was built for. Decides the block payload,
/// the on-disk posting order and the evaluator used at search time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum IndexMode {
    #[default]
    Boolean,
    Ranked,
}

impl std::fmt::Display for IndexMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IndexMode::Boolean => f.write_str("boolean"),
            IndexMode::Ranked => f.write_str("ranked"),
        }
    }
}

impl std::str::FromStr for IndexMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "boolean" => Ok(IndexMode::Boolean),
            "ranked" => Ok(IndexMode::Ranked),
            other => Err(format!("unknown index mode `{other}` (expected boolean or ranked)")),
        }
    }
}
