//! Stack machine over postfix boolean queries.
//!
//! Operands stay as raw terms until an operator needs them, so a single-term
//! query costs one seek. Every intermediate list carries fresh skip pointers.

use crate::codec::{create_skip_pointers, doc_ids, SkipPosting};
use crate::dictionary::Dictionary;
use crate::error::{IndexError, IndexResult};
use crate::postings::PostingsReader;
use crate::query::Token;
use crate::{DocId, ALL_KEY};
use std::cmp::Ordering;

#[derive(Debug, Clone, PartialEq)]
pub enum StackItem {
    Unresolved(String),
    Resolved(Vec<SkipPosting>),
}

/// Skip-accelerated intersection. On a mismatch a cursor jumps along its
/// skip pointer when the target does not pass the other cursor's DocID.
pub fn intersect(a: &[SkipPosting], b: &[SkipPosting]) -> Vec<SkipPosting> {
    let (mut i, mut j) = (0, 0);
    let mut out = Vec::new();
    while i < a.len() && j < b.len() {
        let (x, y) = (&a[i], &b[j]);
        if x.doc_id == y.doc_id {
            out.push(x.doc_id);
            i += 1;
            j += 1;
        } else if let Some(skip) = y.skip.filter(|s| s.doc_id <= x.doc_id && s.index > j) {
            j = skip.index;
        } else if let Some(skip) = x.skip.filter(|s| s.doc_id <= y.doc_id && s.index > i) {
            i = skip.index;
        } else if x.doc_id > y.doc_id {
            j += 1;
        } else {
            i += 1;
        }
    }
    create_skip_pointers(&out)
}

pub fn union(a: &[SkipPosting], b: &[SkipPosting]) -> Vec<SkipPosting> {
    let (mut i, mut j) = (0, 0);
    let mut out = Vec::with_capacity(a.len() + b.len());
    while i < a.len() && j < b.len() {
        match a[i].doc_id.cmp(&b[j].doc_id) {
            Ordering::Equal => {
                out.push(a[i].doc_id);
                i += 1;
                j += 1;
            }
            Ordering::Less => {
                out.push(a[i].doc_id);
                i += 1;
            }
            Ordering::Greater => {
                out.push(b[j].doc_id);
                j += 1;
            }
        }
    }
    out.extend(a[i..].iter().map(|p| p.doc_id));
    out.extend(b[j..].iter().map(|p| p.doc_id));
    create_skip_pointers(&out)
}

/// `all` minus `excluded`, both DocID-sorted.
pub fn complement(all: &[SkipPosting], excluded: &[SkipPosting]) -> Vec<SkipPosting> {
    let mut j = 0;
    let mut out = Vec::with_capacity(all.len().saturating_sub(excluded.len()));
    for p in all {
        while j < excluded.len() && excluded[j].doc_id < p.doc_id {
            j += 1;
        }
        if j < excluded.len() && excluded[j].doc_id == p.doc_id {
            continue;
        }
        out.push(p.doc_id);
    }
    create_skip_pointers(&out)
}

pub struct BooleanEvaluator<'a> {
    dictionary: &'a Dictionary,
    reader: PostingsReader,
    all: Option<Vec<SkipPosting>>,
}

impl<'a> BooleanEvaluator<'a> {
    pub fn new(dictionary: &'a Dictionary, reader: PostingsReader) -> Self {
        Self { dictionary, reader, all: None }
    }

    /// An absent term is an empty list, not an error.
    pub fn postings(&mut self, term: &str) -> IndexResult<Vec<SkipPosting>> {
        match self.dictionary.lookup(term) {
            Some(entry) => self.reader.read_at(entry.offset, term),
            None => Ok(Vec::new()),
        }
    }

    fn all_docs(&mut self) -> IndexResult<&[SkipPosting]> {
        if self.all.is_none() {
            let offset = self
                .dictionary
                .all_offset
                .ok_or_else(|| IndexError::corrupt(0, "dictionary has no _ALL_ entry"))?;
            self.all = Some(self.reader.read_at(offset, ALL_KEY)?);
        }
        Ok(self.all.as_deref().unwrap_or_default())
    }

    fn resolve(&mut self, item: StackItem) -> IndexResult<Vec<SkipPosting>> {
        match item {
            StackItem::Unresolved(term) => self.postings(&term),
            StackItem::Resolved(list) => Ok(list),
        }
    }

    fn pop(stack: &mut Vec<StackItem>, op: &Token) -> IndexResult<StackItem> {
        stack
            .pop()
            .ok_or_else(|| IndexError::MalformedQuery(format!("`{op}` has no operand on the stack")))
    }

    /// Evaluates a postfix stream to a sorted DocID list. A stream that does
    /// not reduce to exactly one operand is `MalformedQuery`.
    pub fn evaluate(&mut self, postfix: &[Token]) -> IndexResult<Vec<DocId>> {
        let mut stack: Vec<StackItem> = Vec::new();
        for token in postfix {
            match token {
                Token::Term(term) => stack.push(StackItem::Unresolved(term.clone())),
                Token::Not => {
                    let operand = Self::pop(&mut stack, token)?;
                    let list = self.resolve(operand)?;
                    let all = self.all_docs()?;
                    stack.push(StackItem::Resolved(complement(all, &list)));
                }
                Token::And | Token::Or => {
                    let right = Self::pop(&mut stack, token)?;
                    let left = Self::pop(&mut stack, token)?;
                    let left = self.resolve(left)?;
                    let right = self.resolve(right)?;
                    let merged = if *token == Token::And { intersect(&left, &right) } else { union(&left, &right) };
                    stack.push(StackItem::Resolved(merged));
                }
                Token::LParen | Token::RParen => {
                    return Err(IndexError::MalformedQuery("parenthesis in postfix stream".into()));
                }
            }
        }
        if stack.len() != 1 {
            return Err(IndexError::MalformedQuery(format!("{} operands left on the stack", stack.len())));
        }
        let result = match stack.pop() {
            Some(item) => self.resolve(item)?,
            None => Vec::new(),
        };
        Ok(doc_ids(&result))
    }
}
