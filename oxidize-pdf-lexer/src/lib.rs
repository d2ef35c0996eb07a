//! # oxidize-pdf-lexer
//!
//! The lexical layer of a PDF reader: a streaming tokenizer that can start at any
//! byte offset of an arbitrarily large file and reads through a bounded sliding
//! buffer.
//!
//! ## Features
//!
//! - **Tokens**: Booleans, integers, reals, names, literal and hex strings, keywords,
//!   delimiters, null and indirect references (`12 0 R`)
//! - **Random access**: Reposition the lexer at any byte offset and resume tokenizing
//! - **Bounded memory**: The read buffer drops its consumed prefix once it grows past a
//!   configurable high-water mark
//! - **Xref tables**: Read the fixed-width entries of classic cross-reference tables
//! - **Raw access**: Read stream payloads and other binary regions byte by byte
//!
//! ## Quick Start
//!
//! ```rust
//! use oxidize_pdf_lexer::{Delimiter, Lexer, Token};
//! use std::io::Cursor;
//!
//! # fn main() -> oxidize_pdf_lexer::ParseResult<()> {
//! let mut lexer = Lexer::new(Cursor::new(b"<< /Parent 3 0 R /Count 2 >>".to_vec()));
//!
//! assert_eq!(lexer.next_token()?, Token::Delimiter(Delimiter::DictStart));
//! assert_eq!(lexer.next_token()?, Token::Name("Parent".to_string()));
//! assert_eq!(lexer.next_token()?, Token::Reference(3, 0));
//! assert_eq!(lexer.next_token()?, Token::Name("Count".to_string()));
//! assert_eq!(lexer.next_token()?, Token::Integer(2));
//! assert_eq!(lexer.next_token()?, Token::Delimiter(Delimiter::DictEnd));
//! assert_eq!(lexer.next_token()?, Token::Eof);
//! # Ok(())
//! # }
//! ```
//!
//! ## Reading an xref table
//!
//! ```rust,no_run
//! use oxidize_pdf_lexer::{read_xref_table, Lexer, LexerOptions};
//! use std::fs::File;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let file = File::open("document.pdf")?;
//! let mut lexer = Lexer::with_options(file, LexerOptions::large_file());
//!
//! // Offset taken from the startxref line
//! lexer.set_position(116_392);
//! for subsection in read_xref_table(&mut lexer)? {
//!     for (object_number, entry) in subsection.iter() {
//!         println!("{object_number}: {} {} {}", entry.offset, entry.generation, entry.kind());
//!     }
//! }
//! lexer.expect_keyword("trailer")?;
//! # Ok(())
//! # }
//! ```

pub mod parser;

pub use parser::{
    read_xref_table, ByteCursor, Delimiter, Lexer, LexerOptions, ParseError, ParseResult, Token,
    XRefEntry, XRefSubsection,
};

/// Current version of oxidize-pdf-lexer
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
