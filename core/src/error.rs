use std::io;

pub type IndexResult<T> = Result<T, IndexError>;

#[derive(thiserror::Error, Debug)]
pub enum IndexError {
    #[error("i/o error: {0}")]
    Io(#[from] io::Error),

    /// A postings line read at a dictionary offset is short, truncated or
    /// does not decode. Never used for a term that is simply absent.
    #[error("corrupt postings line at offset {offset}: {reason}")]
    Corrupt { offset: u64, reason: String },

    #[error("malformed literal `{input}`: {reason}")]
    Literal { input: String, reason: &'static str },

    /// The postfix stream could not be reduced to a single operand.
    #[error("malformed query: {0}")]
    MalformedQuery(String),
}

impl IndexError {
    pub fn corrupt(offset: u64, reason: impl Into<String>) -> Self {
        IndexError::Corrupt { offset, reason: reason.into() }
    }
}
