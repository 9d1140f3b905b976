use index_core::boolean::BooleanEvaluator;
use index_core::config::{IndexConfig, SearchConfig};
use index_core::index::build_index;
use index_core::persist::{load_dictionary, IndexPaths};
use index_core::postings::PostingsReader;
use index_core::query::{parse_boolean, parse_free_text};
use index_core::ranked::RankedEvaluator;
use index_core::{DocId, IndexError, IndexMode};
use std::collections::HashMap;
use tempfile::{tempdir, TempDir};

fn build_corpus(mode: IndexMode, chunk_size: usize, corpus: &[(DocId, &str)]) -> (TempDir, IndexPaths) {
    let dir = tempdir().unwrap();
    let paths = IndexPaths::new(dir.path().join("dictionary.json"), dir.path().join("postings.txt"));
    let mut config = IndexConfig::new(mode, dir.path().join("scratch"));
    config.chunk_size = chunk_size;
    let docs: HashMap<DocId, &str> = corpus.iter().copied().collect();
    let ids: Vec<DocId> = docs.keys().copied().collect();
    build_index(&ids, |id| Ok(parse_free_text(docs[&id])), &paths, &config).unwrap();
    (dir, paths)
}

fn build(mode: IndexMode, chunk_size: usize) -> (TempDir, IndexPaths) {
    build_corpus(mode, chunk_size, &[(1, "cat dog"), (2, "dog fish"), (3, "cat fish")])
}

fn boolean(paths: &IndexPaths, query: &str) -> Vec<DocId> {
    let dict = load_dictionary(&paths.dictionary).unwrap();
    let mut eval = BooleanEvaluator::new(&dict, PostingsReader::open(&paths.postings).unwrap());
    match parse_boolean(query) {
        Ok(postfix) => eval.evaluate(&postfix).unwrap(),
        Err(_) => Vec::new(),
    }
}

#[test]
fn boolean_queries_on_the_small_corpus() {
    for chunk_size in [1, 2, 1000] {
        let (_dir, paths) = build(IndexMode::Boolean, chunk_size);
        assert_eq!(boolean(&paths, "cat AND dog"), vec![1]);
        assert_eq!(boolean(&paths, "cat OR fish"), vec![1, 2, 3]);
        assert_eq!(boolean(&paths, "NOT cat"), vec![2]);
        assert_eq!(boolean(&paths, "NOT (cat OR dog)"), Vec::<DocId>::new());
        assert_eq!(boolean(&paths, "fish AND NOT cat"), vec![2]);
        assert_eq!(boolean(&paths, "dog"), vec![1, 2]);
        assert_eq!(boolean(&paths, "unicorn OR dog"), vec![1, 2]);
        assert_eq!(boolean(&paths, "NOT unicorn"), vec![1, 2, 3]);
    }
}

#[test]
fn overlong_query_words_are_absent_terms() {
    let (_dir, paths) = build_corpus(IndexMode::Boolean, 1, &[(1, "cat"), (2, "dog")]);
    let long = "z".repeat(49);
    assert_eq!(parse_boolean(&format!("cat OR {long}")).map(|p| p.len()), Ok(3));
    assert_eq!(boolean(&paths, &format!("cat OR {long}")), vec![1]);
    assert_eq!(boolean(&paths, &format!("NOT {long}")), vec![1, 2]);
    assert_eq!(boolean(&paths, &format!("dog AND {long}")), Vec::<DocId>::new());
}

#[test]
fn invalid_queries_yield_nothing() {
    let (_dir, paths) = build(IndexMode::Boolean, 2);
    assert!(boolean(&paths, "AND cat").is_empty());
    assert!(boolean(&paths, "(cat OR dog").is_empty());
    assert!(boolean(&paths, "cat AND OR dog").is_empty());
}

#[test]
fn malformed_postfix_is_reported_not_panicking() {
    let (_dir, paths) = build(IndexMode::Boolean, 2);
    let dict = load_dictionary(&paths.dictionary).unwrap();
    let mut eval = BooleanEvaluator::new(&dict, PostingsReader::open(&paths.postings).unwrap());
    // two adjacent operands: parses, but leaves two items on the stack
    let postfix = parse_boolean("cat dog").unwrap();
    assert!(matches!(eval.evaluate(&postfix), Err(IndexError::MalformedQuery(_))));
    assert!(matches!(eval.evaluate(&[]), Err(IndexError::MalformedQuery(_))));
    // the evaluator stays usable afterwards
    assert_eq!(eval.evaluate(&parse_boolean("fish").unwrap()).unwrap(), vec![2, 3]);
}

#[test]
fn ranked_query_prefers_documents_with_both_terms() {
    let (_dir, paths) = build(IndexMode::Ranked, 2);
    let dict = load_dictionary(&paths.dictionary).unwrap();
    let mut eval = RankedEvaluator::new(&dict, PostingsReader::open(&paths.postings).unwrap(), SearchConfig::default());
    let ranked = eval.evaluate(&parse_free_text("dog fish")).unwrap();
    let ids: Vec<DocId> = ranked.iter().map(|d| d.doc_id).collect();
    assert_eq!(ids, vec![2, 1, 3]);
    assert!(ranked[0].score > ranked[1].score);
    assert!((ranked[1].score - ranked[2].score).abs() < 1e-12);
    assert!(eval.evaluate(&parse_free_text("unicorn")).unwrap().is_empty());
}

#[test]
fn score_cutoff_ends_a_term_early() {
    // cat weights: doc 1 = 1, doc 2 = 1/sqrt(2), doc 3 = 1/2
    let corpus = [(1, "cat"), (2, "cat dog"), (3, "cat dog fish emu"), (4, "dog")];
    let (_dir, paths) = build_corpus(IndexMode::Ranked, 2, &corpus);
    let dict = load_dictionary(&paths.dictionary).unwrap();
    let query = parse_free_text("cat");

    let mut full = RankedEvaluator::new(&dict, PostingsReader::open(&paths.postings).unwrap(), SearchConfig::default());
    let ids: Vec<DocId> = full.evaluate(&query).unwrap().iter().map(|d| d.doc_id).collect();
    assert_eq!(ids, vec![1, 2, 3]);

    let config = SearchConfig { score_cutoff: Some(0.8), ..SearchConfig::default() };
    let mut cut = RankedEvaluator::new(&dict, PostingsReader::open(&paths.postings).unwrap(), config);
    let ranked = cut.evaluate(&query).unwrap();
    let ids: Vec<DocId> = ranked.iter().map(|d| d.doc_id).collect();
    // doc 2 falls under the cutoff and is the last posting read
    assert_eq!(ids, vec![1, 2]);
    assert!((ranked[0].score - 1.0).abs() < 1e-12);
}

#[test]
fn corrupt_postings_surface_as_errors() {
    let (_dir, paths) = build(IndexMode::Boolean, 2);
    std::fs::write(&paths.postings, "garbage\n").unwrap();
    let dict = load_dictionary(&paths.dictionary).unwrap();
    let mut eval = BooleanEvaluator::new(&dict, PostingsReader::open(&paths.postings).unwrap());
    let err = eval.evaluate(&parse_boolean("fish").unwrap()).unwrap_err();
    assert!(matches!(err, IndexError::Corrupt { .. }));
}
