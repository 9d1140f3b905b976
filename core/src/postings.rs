//! Sequential writer and seeking reader for the postings file.

use crate::codec::{decode_line, encode_line, PostingField};
use crate::error::{IndexError, IndexResult};
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Seek, SeekFrom, Write};
use std::path::Path;

/// Writes lines in order and reports the byte offset each one starts at.
pub struct PostingsWriter {
    out: BufWriter<File>,
    offset: u64,
}

impl PostingsWriter {
    pub fn create<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let f = File::create(path)?;
        Ok(Self { out: BufWriter::new(f), offset: 0 })
    }

    /// Appends `key|...\n` and returns the offset of its first byte.
    pub fn write_line<P: PostingField>(&mut self, key: &str, postings: &[P]) -> io::Result<u64> {
        let line = encode_line(key, postings);
        let start = self.offset;
        self.out.write_all(line.as_bytes())?;
        self.out.write_all(b"\n")?;
        self.offset += line.len() as u64 + 1;
        Ok(start)
    }

    pub fn bytes_written(&self) -> u64 {
        self.offset
    }

    pub fn finish(mut self) -> io::Result<u64> {
        self.out.flush()?;
        Ok(self.offset)
    }
}

/// Owns one handle and one cursor. Concurrent searches need one reader each.
pub struct PostingsReader {
    file: BufReader<File>,
    buf: String,
}

impl PostingsReader {
    pub fn open<P: AsRef<Path>>(path: P) -> IndexResult<Self> {
        let f = File::open(path)?;
        Ok(Self { file: BufReader::new(f), buf: String::new() })
    }

    /// Reads the line starting at `offset` and checks that it belongs to `expected_key`.
    pub fn read_at<P: PostingField>(&mut self, offset: u64, expected_key: &str) -> IndexResult<Vec<P>> {
        self.file.seek(SeekFrom::Start(offset))?;
        self.buf.clear();
        let n = match self.file.read_line(&mut self.buf) {
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::InvalidData => {
                return Err(IndexError::corrupt(offset, "line is not valid UTF-8"))
            }
            Err(e) => return Err(e.into()),
        };
        if n == 0 {
            return Err(IndexError::corrupt(offset, "unexpected end of file"));
        }
        if !self.buf.ends_with('\n') {
            return Err(IndexError::corrupt(offset, "truncated line"));
        }
        let (key, postings) = decode_line::<P>(&self.buf).map_err(|e| IndexError::corrupt(offset, e.to_string()))?;
        if key != expected_key {
            return Err(IndexError::corrupt(offset, format!("expected key `{expected_key}`, found `{key}`")));
        }
        Ok(postings)
    }
}
