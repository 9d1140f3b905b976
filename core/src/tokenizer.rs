use lazy_static::lazy_static;
use regex::Regex;
use rust_stemmers::{Algorithm, Stemmer};
use unicode_normalization::UnicodeNormalization;

/// Longer tokens are dropped; the dictionary trie nests one level per character.
pub const MAX_TERM_CHARS: usize = 48;

lazy_static! {
    static ref RE: Regex = Regex::new(r"[\p{L}\p{N}]+").expect("valid regex");
    static ref STEMMER: Stemmer = Stemmer::create(Algorithm::English);
}

fn normalize(text: &str) -> String {
    text.nfkc().collect::<String>().to_lowercase()
}

fn stem_token(token: &str) -> Option<String> {
    if token.chars().count() > MAX_TERM_CHARS {
        return None;
    }
    Some(STEMMER.stem(token).into_owned())
}

/// Tokenize text into stemmed terms using NFKC normalization, lowercase and
/// alphanumeric runs. Repeated terms are kept; callers dedupe when needed.
pub fn tokenize(text: &str) -> Vec<String> {
    let normalized = normalize(text);
    RE.find_iter(&normalized).filter_map(|m| stem_token(m.as_str())).collect()
}

/// Normalizes a single query word the same way indexing does.
pub fn normalize_term(word: &str) -> Option<String> {
    let normalized = normalize(word);
    let token = RE.find(&normalized)?;
    stem_token(token.as_str())
}
