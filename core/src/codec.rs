//! Posting values and the `key|v1|v2|...` line format.
//!
//! Boolean lists carry skip pointers placed every `floor(sqrt(len))`
//! positions; a posting without a pointer is written as a bare DocID and
//! one with a pointer as `(docid, target_docid, target_index)`.

use crate::error::{IndexError, IndexResult};
use crate::literal::Literal;
use crate::DocId;
use std::cmp::Ordering;

pub const FIELD_SEPARATOR: char = '|';

/// A value that can sit in a pipe-delimited postings line.
pub trait PostingField: Sized {
    fn doc_id(&self) -> DocId;
    fn to_literal(&self) -> Literal;
    fn from_literal(lit: &Literal) -> Option<Self>;
}

impl PostingField for DocId {
    fn doc_id(&self) -> DocId {
        *self
    }

    fn to_literal(&self) -> Literal {
        Literal::Int(i64::from(*self))
    }

    fn from_literal(lit: &Literal) -> Option<Self> {
        lit.as_u32()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SkipPointer {
    /// DocID stored at `index`.
    pub doc_id: DocId,
    pub index: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SkipPosting {
    pub doc_id: DocId,
    pub skip: Option<SkipPointer>,
}

impl PostingField for SkipPosting {
    fn doc_id(&self) -> DocId {
        self.doc_id
    }

    fn to_literal(&self) -> Literal {
        match self.skip {
            None => Literal::Int(i64::from(self.doc_id)),
            Some(skip) => Literal::Tuple(vec![
                Literal::Int(i64::from(self.doc_id)),
                Literal::Int(i64::from(skip.doc_id)),
                Literal::Int(skip.index as i64),
            ]),
        }
    }

    fn from_literal(lit: &Literal) -> Option<Self> {
        match lit {
            Literal::Int(_) => Some(SkipPosting { doc_id: lit.as_u32()?, skip: None }),
            Literal::Tuple(items) if items.len() == 3 => {
                let doc_id = items[0].as_u32()?;
                if items[1].is_none() && items[2].is_none() {
                    return Some(SkipPosting { doc_id, skip: None });
                }
                let target = items[1].as_u32()?;
                let index = usize::try_from(match &items[2] {
                    Literal::Int(v) => *v,
                    _ => return None,
                })
                .ok()?;
                Some(SkipPosting { doc_id, skip: Some(SkipPointer { doc_id: target, index }) })
            }
            _ => None,
        }
    }
}

/// Ranked-mode posting: a cosine-normalized log-tf document weight.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeightedPosting {
    pub doc_id: DocId,
    pub weight: f64,
}

impl PostingField for WeightedPosting {
    fn doc_id(&self) -> DocId {
        self.doc_id
    }

    fn to_literal(&self) -> Literal {
        Literal::Tuple(vec![Literal::Int(i64::from(self.doc_id)), Literal::Float(self.weight)])
    }

    fn from_literal(lit: &Literal) -> Option<Self> {
        match lit {
            Literal::Tuple(items) if items.len() == 2 => Some(WeightedPosting {
                doc_id: items[0].as_u32()?,
                weight: items[1].as_f64()?,
            }),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DocLength {
    pub doc_id: DocId,
    /// Token count of the document.
    pub length: u32,
}

impl PostingField for DocLength {
    fn doc_id(&self) -> DocId {
        self.doc_id
    }

    fn to_literal(&self) -> Literal {
        Literal::Tuple(vec![Literal::Int(i64::from(self.doc_id)), Literal::Int(i64::from(self.length))])
    }

    fn from_literal(lit: &Literal) -> Option<Self> {
        match lit {
            Literal::Tuple(items) if items.len() == 2 => Some(DocLength {
                doc_id: items[0].as_u32()?,
                length: items[1].as_u32()?,
            }),
            _ => None,
        }
    }
}

/// Attaches forward pointers to a DocID-sorted list.
pub fn create_skip_pointers(doc_ids: &[DocId]) -> Vec<SkipPosting> {
    let len = doc_ids.len();
    let stride = ((len as f64).sqrt() as usize).max(1);
    doc_ids
        .iter()
        .enumerate()
        .map(|(i, &doc_id)| {
            let skip = (i % stride == 0 && i + stride < len)
                .then(|| SkipPointer { doc_id: doc_ids[i + stride], index: i + stride });
            SkipPosting { doc_id, skip }
        })
        .collect()
}

pub fn doc_ids<P: PostingField>(postings: &[P]) -> Vec<DocId> {
    postings.iter().map(PostingField::doc_id).collect()
}

/// Ranked on-disk order: descending weight, ties by ascending DocID.
pub fn sort_by_weight(postings: &mut [WeightedPosting]) {
    postings.sort_by(|a, b| match b.weight.total_cmp(&a.weight) {
        Ordering::Equal => a.doc_id.cmp(&b.doc_id),
        other => other,
    });
}

/// Serializes one line without its terminating newline.
pub fn encode_line<P: PostingField>(key: &str, postings: &[P]) -> String {
    let mut line = String::with_capacity(key.len() + postings.len() * 8);
    line.push_str(key);
    for posting in postings {
        line.push(FIELD_SEPARATOR);
        line.push_str(&posting.to_literal().to_string());
    }
    line
}

/// Splits `key|rest` into the key and the untouched remainder.
pub fn split_key(line: &str) -> (&str, &str) {
    match line.split_once(FIELD_SEPARATOR) {
        Some((key, rest)) => (key, rest),
        None => (line, ""),
    }
}

pub fn decode_line<P: PostingField>(line: &str) -> IndexResult<(&str, Vec<P>)> {
    let line = line.trim_end_matches(['\n', '\r']);
    let (key, rest) = split_key(line);
    if key.is_empty() {
        return Err(IndexError::Literal { input: line.to_string(), reason: "missing key" });
    }
    if rest.is_empty() {
        return Ok((key, Vec::new()));
    }
    let mut postings = Vec::new();
    for field in rest.split(FIELD_SEPARATOR) {
        let lit = Literal::parse(field)?;
        let posting = P::from_literal(&lit)
            .ok_or_else(|| IndexError::Literal { input: field.to_string(), reason: "unexpected posting shape" })?;
        postings.push(posting);
    }
    Ok((key, postings))
}
