//! Character trie mapping each term to its document frequency and the byte
//! offset of its postings line. Built once after the merge, read-only at
//! query time.

use crate::IndexMode;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use time::format_description::well_known::Rfc3339;

pub const DICTIONARY_VERSION: u32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TermEntry {
    pub doc_freq: u32,
    pub offset: u64,
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrieNode {
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub children: BTreeMap<char, TrieNode>,
    /// Present only on nodes that end a term.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entry: Option<TermEntry>,
}

impl TrieNode {
    pub fn insert(&mut self, term: &str, entry: TermEntry) {
        let mut node = self;
        for ch in term.chars() {
            node = node.children.entry(ch).or_default();
        }
        node.entry = Some(entry);
    }

    /// Fails as soon as a character has no child, or when the walk ends on
    /// a node that only prefixes other terms.
    pub fn lookup(&self, term: &str) -> Option<TermEntry> {
        let mut node = self;
        for ch in term.chars() {
            node = node.children.get(&ch)?;
        }
        node.entry
    }

    pub fn term_count(&self) -> usize {
        usize::from(self.entry.is_some()) + self.children.values().map(TrieNode::term_count).sum::<usize>()
    }
}

/// The persisted dictionary: the term trie plus the reserved `_ALL_` and
/// `_LENGTH_` offsets, which live outside the trie's character namespace.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dictionary {
    pub version: u32,
    pub created_at: String,
    pub mode: IndexMode,
    pub num_docs: u32,
    #[serde(rename = "_ALL_", default)]
    pub all_offset: Option<u64>,
    #[serde(rename = "_LENGTH_", default)]
    pub length_offset: Option<u64>,
    pub root: TrieNode,
}

impl Dictionary {
    pub fn new(mode: IndexMode) -> Self {
        Self {
            version: DICTIONARY_VERSION,
            created_at: time::OffsetDateTime::now_utc().format(&Rfc3339).unwrap_or_else(|_| "".into()),
            mode,
            num_docs: 0,
            all_offset: None,
            length_offset: None,
            root: TrieNode::default(),
        }
    }

    pub fn insert(&mut self, term: &str, doc_freq: u32, offset: u64) {
        self.root.insert(term, TermEntry { doc_freq, offset });
    }

    pub fn lookup(&self, term: &str) -> Option<TermEntry> {
        self.root.lookup(term)
    }

    pub fn num_terms(&self) -> usize {
        self.root.term_count()
    }
}
