//! The indexing pipeline: blocks, external merge, then the final pass that
//! annotates postings, records line offsets and builds the dictionary.

use crate::block::{generate_chunks, BlockBuilder, TokenizedDoc};
use crate::codec::{create_skip_pointers, decode_line, sort_by_weight, DocLength, WeightedPosting};
use crate::config::IndexConfig;
use crate::dictionary::Dictionary;
use crate::merge::merge_all;
use crate::persist::{save_dictionary, IndexPaths};
use crate::postings::PostingsWriter;
use crate::term_table::TermIdTable;
use crate::{DocId, IndexMode, ALL_KEY, LENGTH_KEY};
use anyhow::{Context, Result};
use std::fs::{self, File};
use std::io::{BufRead, BufReader};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildSummary {
    pub num_docs: u32,
    pub num_terms: usize,
    pub num_blocks: usize,
    pub postings_bytes: u64,
}

/// Builds the postings and dictionary files for `doc_ids`. `load_terms`
/// supplies the normalized terms of one document.
pub fn build_index<F>(doc_ids: &[DocId], mut load_terms: F, paths: &IndexPaths, config: &IndexConfig) -> Result<BuildSummary>
where
    F: FnMut(DocId) -> Result<Vec<String>>,
{
    let mut ids = doc_ids.to_vec();
    ids.sort_unstable();
    ids.dedup();

    fs::create_dir_all(&config.scratch_dir)
        .with_context(|| format!("creating scratch directory {}", config.scratch_dir.display()))?;

    let mut table = TermIdTable::new();
    let builder = BlockBuilder::new(&config.scratch_dir, config.mode);
    let mut blocks = Vec::new();
    let mut lengths: Vec<DocLength> = Vec::with_capacity(ids.len());
    for (i, chunk) in generate_chunks(&ids, config.chunk_size).into_iter().enumerate() {
        let mut docs = Vec::with_capacity(chunk.len());
        for &doc_id in chunk {
            let terms = load_terms(doc_id).with_context(|| format!("loading document {doc_id}"))?;
            docs.push(TokenizedDoc { doc_id, terms });
        }
        let out = builder.write_block(i, &docs, &mut table).with_context(|| format!("writing block {i}"))?;
        tracing::info!(chunk = i, docs = docs.len(), terms = out.num_terms, "chunk written");
        lengths.extend(out.lengths);
        blocks.push(out.path);
    }
    let num_blocks = blocks.len();
    tracing::info!(blocks = num_blocks, vocabulary = table.len(), "blocks complete");

    let merged = match config.mode {
        IndexMode::Boolean => merge_all::<DocId>(&config.scratch_dir, blocks)?,
        IndexMode::Ranked => merge_all::<WeightedPosting>(&config.scratch_dir, blocks)?,
    };

    let mut dictionary = Dictionary::new(config.mode);
    dictionary.num_docs = ids.len() as u32;
    let postings_bytes = write_final_postings(&merged, &paths.postings, &ids, &mut lengths, &mut dictionary)?;
    fs::remove_file(&merged)?;
    save_dictionary(&paths.dictionary, &dictionary)?;

    let summary = BuildSummary {
        num_docs: dictionary.num_docs,
        num_terms: dictionary.num_terms(),
        num_blocks,
        postings_bytes,
    };
    tracing::info!(docs = summary.num_docs, terms = summary.num_terms, bytes = postings_bytes, "index finalized");
    Ok(summary)
}

/// Rewrites the merged file into the searchable postings file. Boolean lists
/// gain skip pointers; ranked lists are re-sorted by descending weight. The
/// offset of every line goes into the dictionary, followed by the reserved
/// `_ALL_` line and, for ranked indexes, the `_LENGTH_` line.
fn write_final_postings(
    merged: &Path,
    postings: &Path,
    ids: &[DocId],
    lengths: &mut [DocLength],
    dictionary: &mut Dictionary,
) -> Result<u64> {
    if let Some(dir) = postings.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir)?;
    }
    let reader = BufReader::new(File::open(merged)?);
    let mut writer = PostingsWriter::create(postings).with_context(|| format!("creating {}", postings.display()))?;
    for line in reader.lines() {
        let line = line?;
        if line.is_empty() {
            continue;
        }
        match dictionary.mode {
            IndexMode::Boolean => {
                let (term, docs) = decode_line::<DocId>(&line)?;
                let list = create_skip_pointers(&docs);
                let offset = writer.write_line(term, &list)?;
                dictionary.insert(term, list.len() as u32, offset);
            }
            IndexMode::Ranked => {
                let (term, mut list) = decode_line::<WeightedPosting>(&line)?;
                sort_by_weight(&mut list);
                let offset = writer.write_line(term, &list)?;
                dictionary.insert(term, list.len() as u32, offset);
            }
        }
    }

    dictionary.all_offset = Some(writer.write_line(ALL_KEY, &create_skip_pointers(ids))?);
    if dictionary.mode == IndexMode::Ranked {
        lengths.sort_unstable_by_key(|l| l.doc_id);
        dictionary.length_offset = Some(writer.write_line(LENGTH_KEY, &*lengths)?);
    }
    Ok(writer.finish()?)
}
