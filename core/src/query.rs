//! Query front end. Boolean lines become postfix token streams via
//! shunting-yard (NOT > AND > OR, left associative, parentheses); free-text
//! lines become the same stemmed terms the indexer produced.

use crate::tokenizer::{normalize_term, tokenize};
use lazy_static::lazy_static;
use regex::Regex;
use std::fmt;
use unicode_normalization::UnicodeNormalization;

lazy_static! {
    static ref QUERY_RE: Regex = Regex::new(r"[()]|[\p{L}\p{N}]+").expect("valid regex");
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Term(String),
    And,
    Or,
    Not,
    LParen,
    RParen,
}

impl Token {
    fn precedence(&self) -> u8 {
        match self {
            Token::Not => 3,
            Token::And => 2,
            Token::Or => 1,
            _ => 0,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Term(t) => f.write_str(t),
            Token::And => f.write_str("AND"),
            Token::Or => f.write_str("OR"),
            Token::Not => f.write_str("NOT"),
            Token::LParen => f.write_str("("),
            Token::RParen => f.write_str(")"),
        }
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    #[error("empty query")]
    EmptyQuery,
    #[error("`{0}` is missing an operand")]
    MissingOperand(String),
    #[error("`{0}` directly follows another operator")]
    DuplicateOperator(String),
    #[error("unmatched parenthesis")]
    UnmatchedParen,
}

/// Splits a boolean query into operators, parentheses and normalized terms.
/// Only upper-case `AND`, `OR`, `NOT` are operators. The line is NFKC
/// normalized before splitting, as document text is. A word too long to be
/// indexed stays an operand that matches nothing.
pub fn lex(query: &str) -> Vec<Token> {
    let query: String = query.nfkc().collect();
    QUERY_RE
        .find_iter(&query)
        .map(|m| match m.as_str() {
            "(" => Token::LParen,
            ")" => Token::RParen,
            "AND" => Token::And,
            "OR" => Token::Or,
            "NOT" => Token::Not,
            word => Token::Term(normalize_term(word).unwrap_or_else(|| word.to_lowercase())),
        })
        .collect()
}

pub fn parse_boolean(query: &str) -> Result<Vec<Token>, QueryError> {
    to_postfix(lex(query))
}

pub fn to_postfix(tokens: Vec<Token>) -> Result<Vec<Token>, QueryError> {
    if tokens.is_empty() {
        return Err(QueryError::EmptyQuery);
    }
    let mut output = Vec::with_capacity(tokens.len());
    let mut ops: Vec<Token> = Vec::new();
    let mut expect_operand = true;
    let mut prev_binary = false;
    let mut last_op = String::new();

    for token in tokens {
        match token {
            Token::Term(_) => {
                output.push(token);
                expect_operand = false;
                prev_binary = false;
            }
            Token::Not => {
                last_op = token.to_string();
                ops.push(token);
                expect_operand = true;
                prev_binary = false;
            }
            Token::And | Token::Or => {
                if prev_binary {
                    return Err(QueryError::DuplicateOperator(token.to_string()));
                }
                if expect_operand {
                    return Err(QueryError::MissingOperand(token.to_string()));
                }
                while ops.last().is_some_and(|top| top.precedence() >= token.precedence()) {
                    if let Some(top) = ops.pop() {
                        output.push(top);
                    }
                }
                last_op = token.to_string();
                ops.push(token);
                expect_operand = true;
                prev_binary = true;
            }
            Token::LParen => {
                ops.push(token);
                expect_operand = true;
                prev_binary = false;
            }
            Token::RParen => {
                if ops.is_empty() {
                    return Err(QueryError::UnmatchedParen);
                }
                if expect_operand {
                    return Err(QueryError::MissingOperand(")".into()));
                }
                loop {
                    match ops.pop() {
                        Some(Token::LParen) => break,
                        Some(op) => output.push(op),
                        None => return Err(QueryError::UnmatchedParen),
                    }
                }
                expect_operand = false;
                prev_binary = false;
            }
        }
    }
    if expect_operand {
        return Err(QueryError::MissingOperand(last_op));
    }
    while let Some(op) = ops.pop() {
        if op == Token::LParen {
            return Err(QueryError::UnmatchedParen);
        }
        output.push(op);
    }
    Ok(output)
}

/// Free-text queries carry no operators: just the normalized terms.
pub fn parse_free_text(query: &str) -> Vec<String> {
    tokenize(query)
}
