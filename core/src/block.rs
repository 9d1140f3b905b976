//! Level-0 block construction: one sorted, deduplicated block file per chunk.

use crate::codec::{encode_line, DocLength, PostingField, WeightedPosting};
use crate::term_table::TermIdTable;
use crate::{DocId, IndexMode, TermId};
use std::collections::HashMap;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

/// Name of a scratch posting file at a merge level; level 0 holds the blocks.
pub fn block_file_name(level: u32, index: usize) -> String {
    format!("level{level}_chunk{index}.txt")
}

/// Splits DocIDs into consecutive chunks of at most `chunk_size`.
pub fn generate_chunks(doc_ids: &[DocId], chunk_size: usize) -> Vec<&[DocId]> {
    doc_ids.chunks(chunk_size.max(1)).collect()
}

#[derive(Debug, Clone)]
pub struct TokenizedDoc {
    pub doc_id: DocId,
    pub terms: Vec<String>,
}

#[derive(Debug)]
pub struct BlockOutput {
    pub path: PathBuf,
    pub num_terms: usize,
    pub lengths: Vec<DocLength>,
}

pub struct BlockBuilder<'a> {
    scratch_dir: &'a Path,
    mode: IndexMode,
}

impl<'a> BlockBuilder<'a> {
    pub fn new(scratch_dir: &'a Path, mode: IndexMode) -> Self {
        Self { scratch_dir, mode }
    }

    /// Writes `level0_chunk{chunk_index}.txt` with lines `term|p1|p2|...`,
    /// terms ascending, postings ascending by DocID.
    pub fn write_block(&self, chunk_index: usize, docs: &[TokenizedDoc], table: &mut TermIdTable) -> io::Result<BlockOutput> {
        let path = self.scratch_dir.join(block_file_name(0, chunk_index));
        let lengths = docs
            .iter()
            .map(|d| DocLength { doc_id: d.doc_id, length: d.terms.len() as u32 })
            .collect();
        let num_terms = match self.mode {
            IndexMode::Boolean => {
                let mut pairs: Vec<(TermId, DocId)> = Vec::new();
                for doc in docs {
                    for term in &doc.terms {
                        pairs.push((table.intern(term), doc.doc_id));
                    }
                }
                write_groups(&path, table, pairs)?
            }
            IndexMode::Ranked => {
                let mut pairs: Vec<(TermId, WeightedPosting)> = Vec::new();
                for doc in docs {
                    pairs.extend(document_weights(doc, table));
                }
                write_groups(&path, table, pairs)?
            }
        };
        tracing::debug!(chunk = chunk_index, docs = docs.len(), terms = num_terms, "block written");
        Ok(BlockOutput { path, num_terms, lengths })
    }
}

/// lnc weights for one document: `1 + log10(tf)`, cosine-normalized over the
/// document's own terms. A document never spans chunks, so these are final.
fn document_weights(doc: &TokenizedDoc, table: &mut TermIdTable) -> Vec<(TermId, WeightedPosting)> {
    let mut tf: HashMap<TermId, u32> = HashMap::new();
    for term in &doc.terms {
        *tf.entry(table.intern(term)).or_insert(0) += 1;
    }
    let raw: Vec<(TermId, f64)> = tf.into_iter().map(|(id, count)| (id, 1.0 + f64::from(count).log10())).collect();
    let norm = raw.iter().map(|(_, w)| w * w).sum::<f64>().sqrt();
    if norm == 0.0 {
        return Vec::new();
    }
    raw.into_iter()
        .map(|(id, w)| (id, WeightedPosting { doc_id: doc.doc_id, weight: w / norm }))
        .collect()
}

fn write_groups<P: PostingField>(path: &Path, table: &TermIdTable, mut pairs: Vec<(TermId, P)>) -> io::Result<usize> {
    pairs.sort_by_key(|(id, p)| (*id, p.doc_id()));
    pairs.dedup_by_key(|(id, p)| (*id, p.doc_id()));

    let mut groups: Vec<(&str, Vec<P>)> = Vec::new();
    let mut current: Option<TermId> = None;
    for (id, posting) in pairs {
        if current != Some(id) {
            let term = table.term(id).ok_or_else(|| io::Error::new(io::ErrorKind::InvalidData, format!("unknown term id {id}")))?;
            groups.push((term, Vec::new()));
            current = Some(id);
        }
        if let Some((_, postings)) = groups.last_mut() {
            postings.push(posting);
        }
    }
    groups.sort_unstable_by(|a, b| a.0.cmp(b.0));

    let mut out = BufWriter::new(File::create(path)?);
    for (term, postings) in &groups {
        out.write_all(encode_line(term, postings).as_bytes())?;
        out.write_all(b"\n")?;
    }
    out.flush()?;
    Ok(groups.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn doc(doc_id: DocId, terms: &[&str]) -> TokenizedDoc {
        TokenizedDoc { doc_id, terms: terms.iter().map(|t| t.to_string()).collect() }
    }

    #[test]
    fn chunks_keep_a_short_tail() {
        let ids: Vec<DocId> = (1..=7).collect();
        let chunks = generate_chunks(&ids, 3);
        assert_eq!(chunks, vec![&[1, 2, 3][..], &[4, 5, 6][..], &[7][..]]);
    }

    #[test]
    fn boolean_block_is_sorted_and_deduplicated() {
        let dir = tempdir().unwrap();
        let mut table = TermIdTable::new();
        let builder = BlockBuilder::new(dir.path(), IndexMode::Boolean);
        let docs = vec![doc(3, &["zebra", "cat", "cat"]), doc(1, &["cat", "ant"])];
        let out = builder.write_block(0, &docs, &mut table).unwrap();
        assert_eq!(out.num_terms, 3);
        assert_eq!(out.path.file_name().unwrap(), "level0_chunk0.txt");
        let text = std::fs::read_to_string(&out.path).unwrap();
        assert_eq!(text, "ant|1\ncat|1|3\nzebra|3\n");
        assert_eq!(out.lengths[0], DocLength { doc_id: 3, length: 3 });
    }

    #[test]
    fn ranked_weights_are_unit_length_per_document() {
        let d = doc(9, &["cat", "cat", "dog"]);
        let mut table = TermIdTable::new();
        let weights = document_weights(&d, &mut table);
        let norm: f64 = weights.iter().map(|(_, p)| p.weight * p.weight).sum();
        assert!((norm - 1.0).abs() < 1e-9);
        let cat = weights.iter().find(|(id, _)| table.term(*id) == Some("cat")).unwrap().1;
        let dog = weights.iter().find(|(id, _)| table.term(*id) == Some("dog")).unwrap().1;
        assert!(cat.weight > dog.weight);
    }
}
