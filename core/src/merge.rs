//! External 2-way merge of sorted block files.
//!
//! Each level pairs the live files in order, merge-joins every pair on the
//! term column and deletes the inputs. An odd file out is renamed into the
//! next level untouched. Every live file is sorted by term at every level.

use crate::block::block_file_name;
use crate::codec::{decode_line, encode_line, split_key, PostingField};
use crate::error::IndexResult;
use std::cmp::Ordering;
use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

/// Reduces `files` to a single merged file inside `scratch_dir`.
pub fn merge_all<P: PostingField>(scratch_dir: &Path, mut files: Vec<PathBuf>) -> IndexResult<PathBuf> {
    if files.is_empty() {
        let path = scratch_dir.join(block_file_name(0, 0));
        File::create(&path)?;
        return Ok(path);
    }
    let mut level = 1;
    while files.len() > 1 {
        tracing::info!(level, live_files = files.len(), "merge level");
        let mut next = Vec::with_capacity(files.len().div_ceil(2));
        for (i, pair) in files.chunks(2).enumerate() {
            let target = scratch_dir.join(block_file_name(level, i));
            match pair {
                [left, right] => {
                    merge_pair::<P>(left, right, &target)?;
                    fs::remove_file(left)?;
                    fs::remove_file(right)?;
                }
                [single] => {
                    tracing::debug!(level, file = %single.display(), "carrying unpaired file");
                    fs::rename(single, &target)?;
                }
                _ => unreachable!("chunks(2) yields one or two files"),
            }
            next.push(target);
        }
        files = next;
        level += 1;
    }
    Ok(files.remove(0))
}

/// Merge-joins two term-sorted files. Lines with distinct terms are copied
/// verbatim; lines with equal terms get their postings unioned by DocID.
/// Holds one line per input in memory.
pub fn merge_pair<P: PostingField>(left: &Path, right: &Path, target: &Path) -> IndexResult<()> {
    let mut left = BufReader::new(File::open(left)?);
    let mut right = BufReader::new(File::open(right)?);
    let mut out = BufWriter::new(File::create(target)?);

    let mut l = next_line(&mut left)?;
    let mut r = next_line(&mut right)?;
    loop {
        let order = match (&l, &r) {
            (Some(a), Some(b)) => split_key(a).0.cmp(split_key(b).0),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => break,
        };
        match order {
            Ordering::Less => {
                if let Some(a) = &l {
                    writeln!(out, "{a}")?;
                }
                l = next_line(&mut left)?;
            }
            Ordering::Greater => {
                if let Some(b) = &r {
                    writeln!(out, "{b}")?;
                }
                r = next_line(&mut right)?;
            }
            Ordering::Equal => {
                if let (Some(a), Some(b)) = (&l, &r) {
                    let (key, a_postings) = decode_line::<P>(a)?;
                    let (_, b_postings) = decode_line::<P>(b)?;
                    writeln!(out, "{}", encode_line(key, &union_by_doc(a_postings, b_postings)))?;
                }
                l = next_line(&mut left)?;
                r = next_line(&mut right)?;
            }
        }
    }
    out.flush()?;
    Ok(())
}

/// Linear union of two DocID-sorted lists. A DocID present in both (or
/// repeated within one) is kept once, preferring the left copy.
pub fn union_by_doc<P: PostingField>(left: Vec<P>, right: Vec<P>) -> Vec<P> {
    let mut out: Vec<P> = Vec::with_capacity(left.len() + right.len());
    let mut a = left.into_iter().peekable();
    let mut b = right.into_iter().peekable();
    loop {
        let next = match (a.peek(), b.peek()) {
            (Some(x), Some(y)) => match x.doc_id().cmp(&y.doc_id()) {
                Ordering::Less => a.next(),
                Ordering::Greater => b.next(),
                Ordering::Equal => {
                    b.next();
                    a.next()
                }
            },
            (Some(_), None) => a.next(),
            (None, Some(_)) => b.next(),
            (None, None) => break,
        };
        if let Some(p) = next {
            if out.last().map_or(true, |last| last.doc_id() < p.doc_id()) {
                out.push(p);
            }
        }
    }
    out
}

fn next_line<R: BufRead>(reader: &mut R) -> IndexResult<Option<String>> {
    let mut line = String::new();
    loop {
        line.clear();
        if reader.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        let trimmed = line.trim_end_matches(['\n', '\r']);
        if !trimmed.is_empty() {
            return Ok(Some(trimmed.to_string()));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::WeightedPosting;
    use crate::DocId;
    use tempfile::tempdir;

    #[test]
    fn equal_terms_union_and_others_pass_through() {
        let dir = tempdir().unwrap();
        let a = dir.path().join("a.txt");
        let b = dir.path().join("b.txt");
        let out = dir.path().join("out.txt");
        fs::write(&a, "ant|1\ncat|1|4\nzebra|2\n").unwrap();
        fs::write(&b, "bee|7\ncat|2|4|9\n").unwrap();
        merge_pair::<DocId>(&a, &b, &out).unwrap();
        assert_eq!(fs::read_to_string(&out).unwrap(), "ant|1\nbee|7\ncat|1|2|4|9\nzebra|2\n");
    }

    #[test]
    fn odd_file_is_carried_not_dropped() {
        let dir = tempdir().unwrap();
        let mut files = Vec::new();
        for (i, body) in ["cat|1\n", "cat|2\ndog|2\n", "emu|3\n"].iter().enumerate() {
            let p = dir.path().join(block_file_name(0, i));
            fs::write(&p, body).unwrap();
            files.push(p);
        }
        let merged = merge_all::<DocId>(dir.path(), files).unwrap();
        assert_eq!(fs::read_to_string(&merged).unwrap(), "cat|1|2\ndog|2\nemu|3\n");
        let live: Vec<_> = fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(live.len(), 1);
    }

    #[test]
    fn ranked_tuples_merge_by_doc() {
        let dir = tempdir().unwrap();
        let a = dir.path().join("a.txt");
        let b = dir.path().join("b.txt");
        let out = dir.path().join("out.txt");
        fs::write(&a, "cat|(1, 0.5)|(6, 1)\n").unwrap();
        fs::write(&b, "cat|(3, 0.25)\n").unwrap();
        merge_pair::<WeightedPosting>(&a, &b, &out).unwrap();
        assert_eq!(fs::read_to_string(&out).unwrap(), "cat|(1, 0.5)|(3, 0.25)|(6, 1)\n");
    }

    #[test]
    fn no_blocks_yield_an_empty_file() {
        let dir = tempdir().unwrap();
        let merged = merge_all::<DocId>(dir.path(), Vec::new()).unwrap();
        assert_eq!(fs::read_to_string(merged).unwrap(), "");
    }
}
