//! lnc.ltc cosine ranking.
//!
//! Document weights are already log-tf and cosine-normalized on disk, and
//! each term's postings are stored by descending weight. The query side
//! gets `(1 + log10 tf) * log10(N / df)`, L2-normalized over the kept terms.

use crate::codec::{DocLength, WeightedPosting};
use crate::config::SearchConfig;
use crate::dictionary::{Dictionary, TermEntry};
use crate::error::{IndexError, IndexResult};
use crate::postings::PostingsReader;
use crate::{DocId, LENGTH_KEY};
use std::cmp::Ordering;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoredDoc {
    pub doc_id: DocId,
    pub score: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct QueryTerm {
    pub term: String,
    pub entry: TermEntry,
    pub weight: f64,
}

/// ltc query weights in order of first appearance. Terms missing from the
/// dictionary or under `idf_cutoff` are dropped before normalization.
pub fn query_weights(terms: &[String], dictionary: &Dictionary, num_docs: usize, idf_cutoff: f64) -> Vec<QueryTerm> {
    let mut counts: Vec<(&str, TermEntry, u32)> = Vec::new();
    let mut seen: HashMap<&str, usize> = HashMap::new();
    for term in terms {
        if let Some(&i) = seen.get(term.as_str()) {
            counts[i].2 += 1;
            continue;
        }
        let Some(entry) = dictionary.lookup(term) else { continue };
        if entry.doc_freq == 0 {
            continue;
        }
        seen.insert(term.as_str(), counts.len());
        counts.push((term.as_str(), entry, 1));
    }

    let mut weighted: Vec<QueryTerm> = counts
        .into_iter()
        .filter_map(|(term, entry, count)| {
            let idf = (num_docs as f64 / f64::from(entry.doc_freq)).log10();
            if idf < idf_cutoff {
                return None;
            }
            let weight = (1.0 + f64::from(count).log10()) * idf;
            Some(QueryTerm { term: term.to_string(), entry, weight })
        })
        .collect();

    let norm = weighted.iter().map(|q| q.weight * q.weight).sum::<f64>().sqrt();
    if norm > 0.0 {
        for q in weighted.iter_mut() {
            q.weight /= norm;
        }
    }
    weighted
}

/// Highest scores first, ties by ascending DocID, zero scores dropped.
pub fn top_k(scores: HashMap<DocId, f64>, k: usize) -> Vec<ScoredDoc> {
    let mut ranked: Vec<ScoredDoc> = scores
        .into_iter()
        .filter(|(_, score)| *score > 0.0)
        .map(|(doc_id, score)| ScoredDoc { doc_id, score })
        .collect();
    ranked.sort_by(|a, b| match b.score.total_cmp(&a.score) {
        Ordering::Equal => a.doc_id.cmp(&b.doc_id),
        other => other,
    });
    ranked.truncate(k);
    ranked
}

/// Adds one query term's contributions to `scores`. With a `score_cutoff`,
/// the first contribution below it is the last one added for this term;
/// `postings` must then be in descending weight order.
pub fn accumulate(scores: &mut HashMap<DocId, f64>, query_weight: f64, postings: &[WeightedPosting], score_cutoff: Option<f64>) {
    for p in postings {
        let contribution = query_weight * p.weight;
        *scores.entry(p.doc_id).or_insert(0.0) += contribution;
        if score_cutoff.is_some_and(|cutoff| contribution < cutoff) {
            break;
        }
    }
}

pub struct RankedEvaluator<'a> {
    dictionary: &'a Dictionary,
    reader: PostingsReader,
    config: SearchConfig,
    lengths: Option<Vec<DocLength>>,
}

impl<'a> RankedEvaluator<'a> {
    pub fn new(dictionary: &'a Dictionary, reader: PostingsReader, config: SearchConfig) -> Self {
        Self { dictionary, reader, config, lengths: None }
    }

    /// The `(docid, token count)` list; it enumerates every candidate document.
    pub fn doc_lengths(&mut self) -> IndexResult<&[DocLength]> {
        if self.lengths.is_none() {
            let offset = self
                .dictionary
                .length_offset
                .ok_or_else(|| IndexError::corrupt(0, "dictionary has no _LENGTH_ entry"))?;
            self.lengths = Some(self.reader.read_at(offset, LENGTH_KEY)?);
        }
        Ok(self.lengths.as_deref().unwrap_or_default())
    }

    pub fn evaluate(&mut self, terms: &[String]) -> IndexResult<Vec<ScoredDoc>> {
        let mut scores: HashMap<DocId, f64> = {
            let lengths = self.doc_lengths()?;
            lengths.iter().map(|l| (l.doc_id, 0.0)).collect()
        };
        if scores.is_empty() {
            return Ok(Vec::new());
        }
        let query = query_weights(terms, self.dictionary, scores.len(), self.config.idf_cutoff);
        for q in query.iter().filter(|q| q.weight > 0.0) {
            let postings: Vec<WeightedPosting> = self.reader.read_at(q.entry.offset, &q.term)?;
            accumulate(&mut scores, q.weight, &postings, self.config.score_cutoff);
        }
        Ok(top_k(scores, self.config.top_k))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::IndexMode;

    #[test]
    fn query_weights_are_normalized_and_filtered() {
        let mut dict = Dictionary::new(IndexMode::Ranked);
        dict.insert("rare", 1, 0);
        dict.insert("common", 10, 20);
        let terms: Vec<String> = ["rare", "rare", "common", "missing"].iter().map(|s| s.to_string()).collect();

        let all = query_weights(&terms, &dict, 10, 0.0);
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].term, "rare");
        // common has idf 0, so rare carries the whole unit vector
        assert!((all[0].weight - 1.0).abs() < 1e-12);
        assert_eq!(all[1].weight, 0.0);

        let cut = query_weights(&terms, &dict, 10, 0.5);
        assert_eq!(cut.len(), 1);
    }

    #[test]
    fn accumulate_stops_after_first_contribution_under_cutoff() {
        let postings = [
            WeightedPosting { doc_id: 7, weight: 0.9 },
            WeightedPosting { doc_id: 3, weight: 0.4 },
            WeightedPosting { doc_id: 5, weight: 0.1 },
        ];
        let mut scores = HashMap::new();
        accumulate(&mut scores, 1.0, &postings, Some(0.5));
        assert_eq!(scores.get(&7), Some(&0.9));
        assert_eq!(scores.get(&3), Some(&0.4));
        assert_eq!(scores.get(&5), None);

        let mut scores = HashMap::new();
        accumulate(&mut scores, 1.0, &postings, None);
        assert_eq!(scores.len(), 3);
    }

    #[test]
    fn top_k_orders_by_score_then_doc() {
        let scores: HashMap<DocId, f64> = [(5, 0.5), (2, 0.5), (9, 0.9), (1, 0.0)].into_iter().collect();
        let ranked = top_k(scores, 10);
        let ids: Vec<DocId> = ranked.iter().map(|d| d.doc_id).collect();
        assert_eq!(ids, vec![9, 2, 5]);
        let scores: HashMap<DocId, f64> = (1..=20).map(|d| (d, f64::from(d))).collect();
        assert_eq!(top_k(scores, 10).len(), 10);
    }
}
