//! PDF Cross-Reference Table Entries
//!
//! Reads classic xref tables according to ISO 32000-1 Section 7.5.4

use super::chars::is_digit;
use super::lexer::{Lexer, Token};
use super::{ParseError, ParseResult};
use std::io::{Read, Seek};
use tracing::debug;

/// Cross-reference entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct XRefEntry {
    /// Byte offset in the file (for in-use entries), or next free object number
    pub offset: u64,
    /// Generation number
    pub generation: u16,
    /// Whether this entry is in use
    pub in_use: bool,
}

impl XRefEntry {
    /// Width in bytes of one table entry, line ending included
    pub const WIDTH: usize = 20;

    /// Entry type marker as written in the table: 'n' or 'f'
    pub fn kind(&self) -> char {
        if self.in_use {
            'n'
        } else {
            'f'
        }
    }

    /// Whether this entry is on the free list
    pub fn is_free(&self) -> bool {
        !self.in_use
    }

    /// Decode one `nnnnnnnnnn ggggg n<eol>` entry
    pub(crate) fn from_fixed_width(raw: &[u8]) -> Result<Self, String> {
        if raw.len() != Self::WIDTH {
            return Err(format!(
                "expected {} bytes, found {}",
                Self::WIDTH,
                raw.len()
            ));
        }

        let offset = parse_digits(&raw[0..10])
            .ok_or_else(|| "offset must be 10 decimal digits".to_string())?;
        if raw[10] != b' ' {
            return Err("expected space after offset".to_string());
        }
        let generation = parse_digits(&raw[11..16])
            .ok_or_else(|| "generation must be 5 decimal digits".to_string())?;
        let generation = u16::try_from(generation)
            .map_err(|_| format!("generation {generation} out of range"))?;
        if raw[16] != b' ' {
            return Err("expected space after generation".to_string());
        }

        let in_use = match raw[17] {
            b'n' => true,
            b'f' => false,
            other => return Err(format!("invalid entry type {:?}", other as char)),
        };

        match &raw[18..20] {
            b" \r" | b" \n" | b"\r\n" => {}
            other => return Err(format!("invalid entry terminator {other:?}")),
        }

        Ok(Self {
            offset,
            generation,
            in_use,
        })
    }
}

fn parse_digits(digits: &[u8]) -> Option<u64> {
    if !digits.iter().all(|&b| is_digit(b)) {
        return None;
    }
    Some(
        digits
            .iter()
            .fold(0u64, |acc, &b| acc * 10 + u64::from(b - b'0')),
    )
}

/// A run of consecutive entries introduced by a `first count` header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XRefSubsection {
    /// Object number of the first entry
    pub first_object: u32,
    /// Entries, in object number order
    pub entries: Vec<XRefEntry>,
}

impl XRefSubsection {
    /// Iterate over (object number, entry) pairs
    pub fn iter(&self) -> impl Iterator<Item = (u32, &XRefEntry)> {
        (self.first_object..).zip(self.entries.iter())
    }
}

/// Read a classic xref table starting at the `xref` keyword
///
/// Stops before the `trailer` keyword (or at end of input), which is left
/// unconsumed for the caller.
pub fn read_xref_table<R: Read + Seek>(lexer: &mut Lexer<R>) -> ParseResult<Vec<XRefSubsection>> {
    lexer.expect_keyword("xref")?;
    let mut subsections = Vec::new();

    loop {
        let header_start = lexer.position();
        let first = match lexer.peek_token()? {
            Token::Eof => break,
            Token::Keyword(k) if k == "trailer" => break,
            Token::Integer(_) => lexer.next_token()?,
            other => {
                return Err(ParseError::MalformedXrefEntry {
                    position: header_start,
                    message: format!("expected subsection header, found {other:?}"),
                })
            }
        };
        let count = lexer.next_token()?;

        let (first_object, count) = match (first, count) {
            (Token::Integer(first), Token::Integer(count)) => {
                match (u32::try_from(first), u32::try_from(count)) {
                    (Ok(first), Ok(count)) => (first, count),
                    _ => {
                        return Err(ParseError::MalformedXrefEntry {
                            position: header_start,
                            message: format!("invalid subsection header {first} {count}"),
                        })
                    }
                }
            }
            (_, other) => {
                return Err(ParseError::MalformedXrefEntry {
                    position: header_start,
                    message: format!("expected entry count, found {other:?}"),
                })
            }
        };

        lexer.skip_whitespace()?;
        debug!(first_object, count, "reading xref subsection");

        let mut entries = Vec::with_capacity((count as usize).min(4096));
        for _ in 0..count {
            entries.push(lexer.next_xref_entry()?);
        }
        subsections.push(XRefSubsection {
            first_object,
            entries,
        });
    }

    Ok(subsections)
}
