use anyhow::Result;
use clap::Parser;
use index_core::config::SearchConfig;
use index_core::persist::{load_search_config, IndexPaths};
use search::run_search;
use std::path::Path;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "search")]
#[command(about = "Answer a file of boolean or free-text queries against a built index")]
struct Args {
    /// Dictionary file written by the indexer
    #[arg(long, short = 'd')]
    dictionary: String,
    /// Postings file written by the indexer
    #[arg(long, short = 'p')]
    postings: String,
    /// File with one query per line
    #[arg(long, short = 'q')]
    queries: String,
    /// Output file, one result line per query
    #[arg(long, short = 'o')]
    output: String,
    /// JSON file with ranked-search settings
    #[arg(long)]
    config: Option<String>,
    /// Skip query terms whose idf is below this
    #[arg(long)]
    idf_cutoff: Option<f64>,
    /// Stop reading a term's postings once a contribution drops below this
    #[arg(long)]
    score_cutoff: Option<f64>,
    /// Number of ranked results per query
    #[arg(long)]
    top_k: Option<usize>,
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => load_search_config(Path::new(path))?,
        None => SearchConfig::default(),
    };
    if let Some(v) = args.idf_cutoff {
        config.idf_cutoff = v;
    }
    if args.score_cutoff.is_some() {
        config.score_cutoff = args.score_cutoff;
    }
    if let Some(k) = args.top_k {
        config.top_k = k;
    }

    let paths = IndexPaths::new(&args.dictionary, &args.postings);
    run_search(&paths, Path::new(&args.queries), Path::new(&args.output), &config)?;
    Ok(())
}
