use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use index_core::config::{IndexConfig, DEFAULT_CHUNK_SIZE};
use index_core::index::build_index;
use index_core::persist::IndexPaths;
use index_core::tokenizer::tokenize;
use index_core::{DocId, IndexMode};
use tracing_subscriber::{fmt, EnvFilter};
use walkdir::WalkDir;

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "indexer")]
#[command(about = "Build a block sort-based inverted index", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Index every file in a directory; file names are the numeric DocIDs
    Build {
        /// Directory of documents
        #[arg(long, short = 'i')]
        input: String,
        /// Output dictionary file
        #[arg(long, short = 'd')]
        dictionary: String,
        /// Output postings file
        #[arg(long, short = 'p')]
        postings: String,
        /// Index for boolean or ranked search
        #[arg(long, default_value_t = IndexMode::Boolean)]
        mode: IndexMode,
        /// Documents per block
        #[arg(long, default_value_t = DEFAULT_CHUNK_SIZE)]
        chunk_size: usize,
        /// Scratch directory for blocks; defaults to `<postings>.blocks`, removed afterwards
        #[arg(long)]
        scratch: Option<String>,
    },
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Build { input, dictionary, postings, mode, chunk_size, scratch } => {
            run_build(&input, &dictionary, &postings, mode, chunk_size, scratch)
        }
    }
}

fn run_build(input: &str, dictionary: &str, postings: &str, mode: IndexMode, chunk_size: usize, scratch: Option<String>) -> Result<()> {
    if chunk_size == 0 {
        bail!("--chunk-size must be at least 1");
    }
    let documents = list_documents(Path::new(input))?;
    tracing::info!(input, docs = documents.len(), %mode, "indexing");

    let owned_scratch = scratch.is_none();
    let scratch_dir = match scratch {
        Some(dir) => PathBuf::from(dir),
        None => PathBuf::from(format!("{postings}.blocks")),
    };
    let mut config = IndexConfig::new(mode, &scratch_dir);
    config.chunk_size = chunk_size;
    let paths = IndexPaths::new(dictionary, postings);

    let ids: Vec<DocId> = documents.keys().copied().collect();
    let summary = build_index(&ids, |doc_id| load_terms(&documents, doc_id), &paths, &config)?;

    if owned_scratch {
        remove_scratch(&scratch_dir);
    }
    tracing::info!(
        docs = summary.num_docs,
        terms = summary.num_terms,
        blocks = summary.num_blocks,
        bytes = summary.postings_bytes,
        "index build complete"
    );
    Ok(())
}

/// A leftover scratch directory does not fail the build.
fn remove_scratch(dir: &Path) -> bool {
    match fs::remove_dir_all(dir) {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(dir = %dir.display(), error = %e, "could not remove scratch directory");
            false
        }
    }
}

/// Maps each numerically named file directly inside `dir` to its DocID.
fn list_documents(dir: &Path) -> Result<HashMap<DocId, PathBuf>> {
    if !dir.is_dir() {
        bail!("input {} is not a directory", dir.display());
    }
    let mut documents = HashMap::new();
    for entry in WalkDir::new(dir).min_depth(1).max_depth(1) {
        let entry = entry.with_context(|| format!("listing {}", dir.display()))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy();
        match name.parse::<DocId>() {
            Ok(doc_id) if doc_id > 0 => {
                documents.insert(doc_id, entry.path().to_path_buf());
            }
            _ => tracing::warn!(file = %name, "skipping file without a positive numeric name"),
        }
    }
    Ok(documents)
}

fn load_terms(documents: &HashMap<DocId, PathBuf>, doc_id: DocId) -> Result<Vec<String>> {
    let path = documents.get(&doc_id).with_context(|| format!("no file for document {doc_id}"))?;
    let bytes = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    Ok(tokenize(&String::from_utf8_lossy(&bytes)))
}
