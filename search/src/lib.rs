//! Batch query evaluation: one query per input line, one result line out.

use anyhow::{Context, Result};
use index_core::boolean::BooleanEvaluator;
use index_core::config::SearchConfig;
use index_core::dictionary::Dictionary;
use index_core::persist::{load_dictionary, IndexPaths};
use index_core::postings::PostingsReader;
use index_core::query::{parse_boolean, parse_free_text};
use index_core::ranked::RankedEvaluator;
use index_core::{DocId, IndexError, IndexMode, IndexResult};
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchSummary {
    pub queries: usize,
    pub empty_results: usize,
    pub invalid_queries: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Hits(Vec<DocId>),
    /// The line was rejected by the parser or did not reduce to one operand.
    Invalid(String),
}

pub enum Engine<'a> {
    Boolean(BooleanEvaluator<'a>),
    Ranked(RankedEvaluator<'a>),
}

impl<'a> Engine<'a> {
    /// Picks the evaluator matching the mode the index was built for.
    pub fn open(dictionary: &'a Dictionary, postings: &Path, config: &SearchConfig) -> IndexResult<Self> {
        let reader = PostingsReader::open(postings)?;
        Ok(match dictionary.mode {
            IndexMode::Boolean => Engine::Boolean(BooleanEvaluator::new(dictionary, reader)),
            IndexMode::Ranked => Engine::Ranked(RankedEvaluator::new(dictionary, reader, config.clone())),
        })
    }

    /// Errors other than a malformed query are fatal for the batch.
    pub fn answer(&mut self, line: &str) -> IndexResult<Outcome> {
        match self {
            Engine::Boolean(eval) => {
                let postfix = match parse_boolean(line) {
                    Ok(postfix) => postfix,
                    Err(e) => return Ok(Outcome::Invalid(e.to_string())),
                };
                match eval.evaluate(&postfix) {
                    Ok(ids) => Ok(Outcome::Hits(ids)),
                    Err(IndexError::MalformedQuery(reason)) => Ok(Outcome::Invalid(reason)),
                    Err(e) => Err(e),
                }
            }
            Engine::Ranked(eval) => {
                let ranked = eval.evaluate(&parse_free_text(line))?;
                Ok(Outcome::Hits(ranked.into_iter().map(|d| d.doc_id).collect()))
            }
        }
    }
}

pub fn format_hits(ids: &[DocId]) -> String {
    ids.iter().map(|id| id.to_string()).collect::<Vec<_>>().join(" ")
}

pub fn run_search(paths: &IndexPaths, queries: &Path, output: &Path, config: &SearchConfig) -> Result<SearchSummary> {
    let dictionary = load_dictionary(&paths.dictionary)?;
    let mut engine = Engine::open(&dictionary, &paths.postings, config)
        .with_context(|| format!("opening postings {}", paths.postings.display()))?;
    tracing::info!(mode = %dictionary.mode, docs = dictionary.num_docs, "running search on the queries");

    let input = BufReader::new(File::open(queries).with_context(|| format!("opening queries {}", queries.display()))?);
    let mut out = BufWriter::new(File::create(output).with_context(|| format!("creating {}", output.display()))?);
    let mut summary = SearchSummary::default();
    for (lineno, line) in input.lines().enumerate() {
        let line = line?;
        summary.queries += 1;
        let hits = match engine.answer(&line).with_context(|| format!("query on line {}", lineno + 1))? {
            Outcome::Hits(ids) => ids,
            Outcome::Invalid(reason) => {
                tracing::warn!(line = lineno + 1, query = %line, %reason, "invalid query");
                summary.invalid_queries += 1;
                Vec::new()
            }
        };
        if hits.is_empty() {
            summary.empty_results += 1;
        }
        writeln!(out, "{}", format_hits(&hits))?;
    }
    out.flush()?;
    tracing::info!(
        queries = summary.queries,
        empty = summary.empty_results,
        invalid = summary.invalid_queries,
        "search complete"
    );
    Ok(summary)
}
