//! Restrictive reader for the values stored between `|` separators.
//!
//! Accepted grammar (ASCII whitespace allowed between items):
//!
//! ```text
//! value := int | float | "None" | tuple
//! tuple := "(" value ("," value)* [","] ")"
//! ```
//!
//! Anything else is rejected. Tuples may nest, but only a few levels deep.

use crate::error::{IndexError, IndexResult};
use std::fmt;

const MAX_DEPTH: usize = 4;

#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Int(i64),
    Float(f64),
    None,
    Tuple(Vec<Literal>),
}

impl Literal {
    pub fn parse(input: &str) -> IndexResult<Literal> {
        let mut p = Parser { input, bytes: input.as_bytes(), pos: 0 };
        let value = p.value(0)?;
        p.skip_ws();
        if p.pos != p.bytes.len() {
            return Err(p.error("trailing characters"));
        }
        Ok(value)
    }

    pub fn as_u32(&self) -> Option<u32> {
        match self {
            Literal::Int(v) => u32::try_from(*v).ok(),
            _ => None,
        }
    }

    /// Integers widen to floats: `1.0` is written as `1`.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Literal::Int(v) => Some(*v as f64),
            Literal::Float(v) => Some(*v),
            _ => None,
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Literal::None)
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Int(v) => write!(f, "{v}"),
            Literal::Float(v) => write!(f, "{v}"),
            Literal::None => f.write_str("None"),
            Literal::Tuple(items) => {
                f.write_str("(")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str(")")
            }
        }
    }
}

struct Parser<'a> {
    input: &'a str,
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Parser<'a> {
    fn error(&self, reason: &'static str) -> IndexError {
        IndexError::Literal { input: self.input.to_string(), reason }
    }

    fn skip_ws(&mut self) {
        while self.pos < self.bytes.len() && self.bytes[self.pos].is_ascii_whitespace() {
            self.pos += 1;
        }
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn value(&mut self, depth: usize) -> IndexResult<Literal> {
        self.skip_ws();
        match self.peek() {
            Some(b'(') => self.tuple(depth),
            Some(b'N') => self.none(),
            Some(b) if b.is_ascii_digit() || b == b'-' || b == b'+' || b == b'.' => self.number(),
            Some(_) => Err(self.error("unexpected character")),
            None => Err(self.error("unexpected end of input")),
        }
    }

    fn none(&mut self) -> IndexResult<Literal> {
        if self.bytes[self.pos..].starts_with(b"None") {
            self.pos += 4;
            Ok(Literal::None)
        } else {
            Err(self.error("unexpected character"))
        }
    }

    fn number(&mut self) -> IndexResult<Literal> {
        let start = self.pos;
        while let Some(b) = self.peek() {
            if b.is_ascii_digit() || matches!(b, b'-' | b'+' | b'.' | b'e' | b'E') {
                self.pos += 1;
            } else {
                break;
            }
        }
        let text = &self.input[start..self.pos];
        if text.contains(['.', 'e', 'E']) {
            match text.parse::<f64>() {
                Ok(v) if v.is_finite() => Ok(Literal::Float(v)),
                _ => Err(self.error("invalid float")),
            }
        } else {
            text.parse::<i64>().map(Literal::Int).map_err(|_| self.error("invalid integer"))
        }
    }

    fn tuple(&mut self, depth: usize) -> IndexResult<Literal> {
        if depth >= MAX_DEPTH {
            return Err(self.error("tuples nested too deeply"));
        }
        self.pos += 1; // '('
        self.skip_ws();
        if self.peek() == Some(b')') {
            return Err(self.error("empty tuple"));
        }
        let mut items = Vec::new();
        loop {
            items.push(self.value(depth + 1)?);
            self.skip_ws();
            match self.peek() {
                Some(b',') => {
                    self.pos += 1;
                    self.skip_ws();
                    if self.peek() == Some(b')') {
                        self.pos += 1;
                        break;
                    }
                }
                Some(b')') => {
                    self.pos += 1;
                    break;
                }
                Some(_) => return Err(self.error("expected `,` or `)`")),
                None => return Err(self.error("unclosed tuple")),
            }
        }
        Ok(Literal::Tuple(items))
    }
}
