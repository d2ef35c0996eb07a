//! PDF Lexical Layer
//!
//! This module turns a seekable byte source into the primitive tokens defined by
//! ISO 32000-1 Section 7.2 and reads the fixed-width entries of classic
//! cross-reference tables (Section 7.5.4).

pub mod buffer;
pub mod chars;
pub mod lexer;
pub mod xref;

pub use self::buffer::ByteCursor;
pub use self::lexer::{Delimiter, Lexer, Token};
pub use self::xref::{read_xref_table, XRefEntry, XRefSubsection};

/// Result type for parser operations
pub type ParseResult<T> = Result<T, ParseError>;

/// PDF lexer errors
///
/// Every variant raised by the lexer itself carries the byte offset at which
/// the problem was detected.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed token at position {position}: {message}")]
    MalformedToken { position: u64, message: String },

    #[error("Unterminated literal string starting at position {position}")]
    UnterminatedLiteral { position: u64 },

    #[error("Unterminated hex string starting at position {position}")]
    UnterminatedHexString { position: u64 },

    #[error("Malformed xref entry at position {position}: {message}")]
    MalformedXrefEntry { position: u64, message: String },

    #[error("Syntax error at position {position}: {message}")]
    SyntaxError { position: u64, message: String },

    #[error("Unexpected token: expected {expected}, found {found}")]
    UnexpectedToken { expected: String, found: String },
}

impl ParseError {
    /// Byte offset the error refers to, if any
    pub fn position(&self) -> Option<u64> {
        match self {
            ParseError::MalformedToken { position, .. }
            | ParseError::UnterminatedLiteral { position }
            | ParseError::UnterminatedHexString { position }
            | ParseError::MalformedXrefEntry { position, .. }
            | ParseError::SyntaxError { position, .. } => Some(*position),
            ParseError::Io(_) | ParseError::UnexpectedToken { .. } => None,
        }
    }
}

/// Configuration for the lexer's sliding read buffer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexerOptions {
    /// Number of bytes requested from the input on each refill
    pub chunk_size: usize,
    /// Buffer size, in chunks, above which the consumed prefix is dropped
    pub high_water_chunks: usize,
}

impl Default for LexerOptions {
    fn default() -> Self {
        Self {
            chunk_size: 1024,
            high_water_chunks: 20,
        }
    }
}

impl LexerOptions {
    /// Create options optimized for small inputs
    pub fn small_file() -> Self {
        Self {
            chunk_size: 256,
            high_water_chunks: 20,
        }
    }

    /// Create options optimized for large files
    pub fn large_file() -> Self {
        Self {
            chunk_size: 64 * 1024,
            high_water_chunks: 16,
        }
    }

    /// Set the refill chunk size
    pub fn with_chunk_size(mut self, size: usize) -> Self {
        self.chunk_size = size;
        self
    }

    /// Set the compaction threshold, in chunks
    pub fn with_high_water_chunks(mut self, chunks: usize) -> Self {
        self.high_water_chunks = chunks;
        self
    }

    /// Effective chunk size (never zero)
    pub(crate) fn effective_chunk_size(&self) -> usize {
        self.chunk_size.max(1)
    }

    /// Effective high-water mark in bytes (never below one chunk)
    pub(crate) fn high_water_bytes(&self) -> usize {
        self.effective_chunk_size()
            .saturating_mul(self.high_water_chunks.max(1))
    }
}
