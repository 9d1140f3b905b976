use index_core::config::{IndexConfig, SearchConfig};
use index_core::index::build_index;
use index_core::persist::IndexPaths;
use index_core::tokenizer::tokenize;
use index_core::{DocId, IndexMode};
use search::{run_search, SearchSummary};
use std::collections::HashMap;
use std::fs;
use tempfile::tempdir;

fn build_tiny_index(dir: &std::path::Path, mode: IndexMode) -> IndexPaths {
    let paths = IndexPaths::new(dir.join("dictionary.json"), dir.join("postings.txt"));
    let mut config = IndexConfig::new(mode, dir.join("scratch"));
    config.chunk_size = 2;
    let docs: HashMap<DocId, &str> = [
        (1, "The cat sat with a dog."),
        (2, "A dog chased fish."),
        (3, "Cats eat fish."),
    ]
    .into_iter()
    .collect();
    let ids: Vec<DocId> = docs.keys().copied().collect();
    build_index(&ids, |id| Ok(tokenize(docs[&id])), &paths, &config).unwrap();
    paths
}

#[test]
fn boolean_batch_keeps_going_past_invalid_lines() {
    let dir = tempdir().unwrap();
    let paths = build_tiny_index(dir.path(), IndexMode::Boolean);
    let queries = dir.path().join("queries.txt");
    let output = dir.path().join("results.txt");
    fs::write(&queries, "cat AND dog\ncat OR fish\nNOT cat\nAND cat\ncat dog\nunicorn\n").unwrap();

    let summary = run_search(&paths, &queries, &output, &SearchConfig::default()).unwrap();
    assert_eq!(summary, SearchSummary { queries: 6, empty_results: 3, invalid_queries: 2 });
    let lines: Vec<String> = fs::read_to_string(&output).unwrap().lines().map(String::from).collect();
    assert_eq!(lines, vec!["1", "1 2 3", "2", "", "", ""]);
}

#[test]
fn ranked_batch_orders_by_score() {
    let dir = tempdir().unwrap();
    let paths = build_tiny_index(dir.path(), IndexMode::Ranked);
    let queries = dir.path().join("queries.txt");
    let output = dir.path().join("results.txt");
    fs::write(&queries, "dog fish\nunicorn\n").unwrap();

    let config = SearchConfig { top_k: 2, ..SearchConfig::default() };
    let summary = run_search(&paths, &queries, &output, &config).unwrap();
    assert_eq!(summary.queries, 2);
    let text = fs::read_to_string(&output).unwrap();
    let mut lines = text.lines();
    assert_eq!(lines.next().unwrap().split(' ').next(), Some("2"));
    assert_eq!(text.lines().next().unwrap().split(' ').count(), 2);
    assert_eq!(lines.next(), Some(""));
}

#[test]
fn missing_postings_fail_the_batch() {
    let dir = tempdir().unwrap();
    let mut paths = build_tiny_index(dir.path(), IndexMode::Boolean);
    paths.postings = dir.path().join("nope.txt");
    let queries = dir.path().join("queries.txt");
    fs::write(&queries, "cat\n").unwrap();
    assert!(run_search(&paths, &queries, &dir.path().join("out.txt"), &SearchConfig::default()).is_err());
}
