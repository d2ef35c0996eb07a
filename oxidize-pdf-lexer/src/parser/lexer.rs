//! PDF Lexer
//!
//! Tokenizes PDF syntax according to ISO 32000-1 Section 7.2
//!
//! The lexer reads through a [`ByteCursor`], so it can be positioned at any byte
//! offset of an arbitrarily large input and resume tokenizing there. Indirect
//! references (`12 0 R`) are recognized by a three-token lookahead in
//! [`Lexer::next_token`]; a failed lookahead rewinds to where it started.

use super::buffer::ByteCursor;
use super::chars::{hex_value, is_digit, is_octal, is_token_boundary, is_whitespace};
use super::xref::XRefEntry;
use super::{LexerOptions, ParseError, ParseResult};
use std::io::{Read, Seek};
use tracing::{debug, trace, warn};

/// Structural delimiters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Delimiter {
    /// `<<`
    DictStart,
    /// `>>`
    DictEnd,
    /// `[`
    ArrayStart,
    /// `]`
    ArrayEnd,
    /// `{` (PostScript calculator functions)
    ProcStart,
    /// `}`
    ProcEnd,
}

impl Delimiter {
    /// Source text of the delimiter
    pub fn as_str(&self) -> &'static str {
        match self {
            Delimiter::DictStart => "<<",
            Delimiter::DictEnd => ">>",
            Delimiter::ArrayStart => "[",
            Delimiter::ArrayEnd => "]",
            Delimiter::ProcStart => "{",
            Delimiter::ProcEnd => "}",
        }
    }
}

/// PDF Token types
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// Boolean: true or false
    Boolean(bool),

    /// Integer number
    Integer(i64),

    /// Real number
    Real(f64),

    /// Name object with `#xx` escapes decoded (e.g., /Type)
    Name(String),

    /// String (literal or hexadecimal), as raw bytes
    String(Vec<u8>),

    /// Any other bare word: obj, endobj, stream, xref, trailer, R, ...
    Keyword(String),

    /// Structural delimiter
    Delimiter(Delimiter),

    /// Null object
    Null,

    /// Indirect reference (e.g., 1 0 R)
    Reference(u64, u16),

    /// No token at or after the current position
    Eof,
}

impl Token {
    /// Check whether this is the end-of-input marker
    pub fn is_eof(&self) -> bool {
        matches!(self, Token::Eof)
    }

    /// Check whether this is the given keyword
    pub fn is_keyword(&self, keyword: &str) -> bool {
        matches!(self, Token::Keyword(k) if k == keyword)
    }

    /// Get the value of an integer token
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Token::Integer(n) => Some(*n),
            _ => None,
        }
    }
}

/// PDF Lexer for tokenizing PDF content
///
/// A lexer is stateful and owns its read buffer: use one lexer per input (or
/// per independent input handle), never share one across threads.
pub struct Lexer<R> {
    cursor: ByteCursor<R>,
}

impl<R: Read + Seek> Lexer<R> {
    /// Create a new lexer from a reader
    pub fn new(reader: R) -> Self {
        Self::with_options(reader, LexerOptions::default())
    }

    /// Create a new lexer with custom buffering options
    pub fn with_options(reader: R, options: LexerOptions) -> Self {
        Self {
            cursor: ByteCursor::with_options(reader, &options),
        }
    }

    /// Get the next token, collapsing `<int> <int> R` into a reference
    pub fn next_token(&mut self) -> ParseResult<Token> {
        let token = self.parse_token()?;
        let object_number = match token {
            Token::Integer(n) if n >= 0 => n as u64,
            _ => return Ok(token),
        };

        let saved = self.position();
        if let Some(generation) = self.reference_tail() {
            return Ok(Token::Reference(object_number, generation));
        }

        trace!(position = saved, "no reference after integer, rewinding");
        self.cursor.rewind_to(saved);
        Ok(token)
    }

    /// Try to read `<generation> R`; any failure, including errors and end of
    /// input, means "not a reference"
    fn reference_tail(&mut self) -> Option<u16> {
        let generation = match self.parse_token() {
            Ok(Token::Integer(g)) => u16::try_from(g).ok()?,
            _ => return None,
        };
        match self.parse_token() {
            Ok(Token::Keyword(k)) if k == "R" => Some(generation),
            _ => None,
        }
    }

    /// Peek the next token without consuming it
    pub fn peek_token(&mut self) -> ParseResult<Token> {
        let saved = self.position();
        let token = self.next_token();
        self.cursor.rewind_to(saved);
        token
    }

    /// Read a single token; never produces [`Token::Reference`]
    fn parse_token(&mut self) -> ParseResult<Token> {
        loop {
            let start = self.position();
            let ch = match self.cursor.next_byte()? {
                Some(ch) => ch,
                None => return Ok(Token::Eof),
            };

            match ch {
                _ if is_whitespace(ch) => {
                    self.skip_whitespace()?;
                }
                b'/' => return self.read_name(),
                b'(' => return self.read_literal_string(start),
                b'<' => {
                    if self.consume_if(b'<')? {
                        return Ok(Token::Delimiter(Delimiter::DictStart));
                    }
                    return self.read_hex_string(start);
                }
                b'>' => {
                    if self.consume_if(b'>')? {
                        return Ok(Token::Delimiter(Delimiter::DictEnd));
                    }
                    return Err(ParseError::MalformedToken {
                        position: start,
                        message: "delimiter '>' at invalid position".to_string(),
                    });
                }
                b')' => {
                    return Err(ParseError::MalformedToken {
                        position: start,
                        message: "delimiter ')' outside a string".to_string(),
                    });
                }
                b'[' => return Ok(Token::Delimiter(Delimiter::ArrayStart)),
                b']' => return Ok(Token::Delimiter(Delimiter::ArrayEnd)),
                b'{' => return Ok(Token::Delimiter(Delimiter::ProcStart)),
                b'}' => return Ok(Token::Delimiter(Delimiter::ProcEnd)),
                b'%' => {
                    if !self.skip_comment()? {
                        return Ok(Token::Eof);
                    }
                }
                _ => return self.read_word(ch),
            }
        }
    }

    /// Consume the next byte if it equals `expected`
    fn consume_if(&mut self, expected: u8) -> ParseResult<bool> {
        if self.cursor.peek_byte()? == Some(expected) {
            self.cursor.next_byte()?;
            return Ok(true);
        }
        Ok(false)
    }

    /// Skip the rest of a comment line, leaving the line ending in place.
    /// Returns `false` if the input ends inside the comment.
    fn skip_comment(&mut self) -> ParseResult<bool> {
        self.cursor.skip_while(|b| b != b'\r' && b != b'\n')?;
        Ok(self.cursor.peek_byte()?.is_some())
    }

    /// Skip whitespace and return the number of bytes skipped
    pub fn skip_whitespace(&mut self) -> ParseResult<usize> {
        self.cursor.skip_while(is_whitespace)
    }

    /// Read a name object (the leading '/' is already consumed)
    fn read_name(&mut self) -> ParseResult<Token> {
        let mut raw = Vec::new();
        self.cursor.scan_until(&mut raw, is_token_boundary)?;
        Ok(Token::Name(decode_name(&raw)))
    }

    /// Read a literal string (the opening '(' is already consumed)
    fn read_literal_string(&mut self, start: u64) -> ParseResult<Token> {
        let mut string = Vec::new();
        let mut paren_depth = 1usize;

        loop {
            let stop = self
                .cursor
                .scan_until(&mut string, |b| matches!(b, b'(' | b')' | b'\\' | b'\r'))?;
            let ch = match stop {
                Some(ch) => ch,
                None => return Err(ParseError::UnterminatedLiteral { position: start }),
            };
            self.cursor.next_byte()?;

            match ch {
                b'(' => {
                    paren_depth += 1;
                    string.push(ch);
                }
                b')' => {
                    paren_depth -= 1;
                    if paren_depth == 0 {
                        return Ok(Token::String(string));
                    }
                    string.push(ch);
                }
                b'\r' => {
                    // CR and CRLF both become a single LF
                    self.consume_if(b'\n')?;
                    string.push(b'\n');
                }
                _ => self.read_escape(&mut string, start)?,
            }
        }
    }

    /// Decode the escape sequence following a backslash in a literal string
    fn read_escape(&mut self, string: &mut Vec<u8>, start: u64) -> ParseResult<()> {
        let ch = match self.cursor.next_byte()? {
            Some(ch) => ch,
            None => return Err(ParseError::UnterminatedLiteral { position: start }),
        };

        match ch {
            // Line continuation
            b'\r' => {
                self.consume_if(b'\n')?;
            }
            b'\n' => {}
            b'n' => string.push(b'\n'),
            b'r' => string.push(b'\r'),
            b't' => string.push(b'\t'),
            b'b' => string.push(0x08),
            b'f' => string.push(0x0C),
            b'0'..=b'7' => {
                let mut value = u16::from(ch - b'0');
                for _ in 0..2 {
                    match self.cursor.peek_byte()? {
                        Some(digit) if is_octal(digit) => {
                            self.cursor.next_byte()?;
                            value = value * 8 + u16::from(digit - b'0');
                        }
                        _ => break,
                    }
                }
                // \777 overflows a byte; keep the low eight bits
                string.push((value & 0xFF) as u8);
            }
            // '(', ')', '\\' and unknown escapes: the backslash is dropped
            _ => string.push(ch),
        }
        Ok(())
    }

    /// Read a hex string (the opening '<' is already consumed)
    fn read_hex_string(&mut self, start: u64) -> ParseResult<Token> {
        let mut raw = Vec::new();
        if self.cursor.scan_until(&mut raw, |b| b == b'>')?.is_none() {
            return Err(ParseError::UnterminatedHexString { position: start });
        }
        self.cursor.next_byte()?;

        let mut bytes = Vec::with_capacity(raw.len() / 2 + 1);
        let mut high = None;
        for (i, &ch) in raw.iter().enumerate() {
            if is_whitespace(ch) {
                continue;
            }
            let value = hex_value(ch).ok_or_else(|| ParseError::MalformedToken {
                position: start + 1 + i as u64,
                message: format!("invalid character {:?} in hex string", ch as char),
            })?;
            match high.take() {
                Some(h) => bytes.push((h << 4) | value),
                None => high = Some(value),
            }
        }
        // Odd digit count: the last digit is followed by an implicit 0
        if let Some(h) = high {
            bytes.push(h << 4);
        }

        Ok(Token::String(bytes))
    }

    /// Read a bare word starting with `first` and classify it
    fn read_word(&mut self, first: u8) -> ParseResult<Token> {
        let mut word = vec![first];
        self.cursor.scan_until(&mut word, is_token_boundary)?;
        Ok(classify_word(word))
    }

    /// Read the next raw byte
    pub fn next_byte(&mut self) -> ParseResult<Option<u8>> {
        self.cursor.next_byte()
    }

    /// Peek at the next raw byte without consuming it
    pub fn peek_byte(&mut self) -> ParseResult<Option<u8>> {
        self.cursor.peek_byte()
    }

    /// Read one fixed-width cross-reference entry (`nnnnnnnnnn ggggg n\r\n`)
    ///
    /// On failure the position is left at the start of the entry.
    pub fn next_xref_entry(&mut self) -> ParseResult<XRefEntry> {
        let start = self.position();
        let mut raw = Vec::with_capacity(XRefEntry::WIDTH);
        let read = self.cursor.read_up_to(XRefEntry::WIDTH, &mut raw)?;

        let parsed = if read < XRefEntry::WIDTH {
            Err(format!(
                "expected {} bytes, found {read}",
                XRefEntry::WIDTH
            ))
        } else {
            XRefEntry::from_fixed_width(&raw)
        };

        parsed.map_err(|message| {
            self.cursor.rewind_to(start);
            ParseError::MalformedXrefEntry {
                position: start,
                message,
            }
        })
    }

    /// Read a newline sequence (CR, LF, or CRLF)
    pub fn read_newline(&mut self) -> ParseResult<()> {
        match self.cursor.peek_byte()? {
            Some(b'\r') => {
                self.cursor.next_byte()?;
                self.consume_if(b'\n')?;
                Ok(())
            }
            Some(b'\n') => {
                self.cursor.next_byte()?;
                Ok(())
            }
            _ => Err(ParseError::SyntaxError {
                position: self.position(),
                message: "Expected newline".to_string(),
            }),
        }
    }

    /// Read exactly n bytes
    pub fn read_bytes(&mut self, n: usize) -> ParseResult<Vec<u8>> {
        let start = self.position();
        let mut bytes = Vec::with_capacity(n);
        let read = self.cursor.read_up_to(n, &mut bytes)?;
        if read < n {
            return Err(ParseError::SyntaxError {
                position: start,
                message: format!("Expected {n} bytes, only {read} available"),
            });
        }
        Ok(bytes)
    }

    /// Read until a specific byte sequence is found, consuming the sequence
    /// and returning the bytes before it
    pub fn read_until_sequence(&mut self, sequence: &[u8]) -> ParseResult<Vec<u8>> {
        let start = self.position();
        let mut result = Vec::new();
        if sequence.is_empty() {
            return Ok(result);
        }

        while let Some(ch) = self.cursor.next_byte()? {
            result.push(ch);
            if result.ends_with(sequence) {
                result.truncate(result.len() - sequence.len());
                return Ok(result);
            }
        }

        Err(ParseError::SyntaxError {
            position: start,
            message: format!(
                "Sequence {:?} not found",
                String::from_utf8_lossy(sequence)
            ),
        })
    }

    /// Find a keyword ahead in the stream without consuming bytes
    ///
    /// Returns the number of bytes until the keyword, if the whole keyword
    /// lies within the next `max_bytes` bytes.
    pub fn find_keyword_ahead(
        &mut self,
        keyword: &str,
        max_bytes: usize,
    ) -> ParseResult<Option<usize>> {
        let needle = keyword.as_bytes();
        if needle.is_empty() {
            return Ok(Some(0));
        }

        let saved = self.position();
        let mut window = Vec::with_capacity(max_bytes.min(64 * 1024));
        let read = self.cursor.read_up_to(max_bytes, &mut window);
        self.cursor.rewind_to(saved);
        read?;

        Ok(window
            .windows(needle.len())
            .position(|candidate| candidate == needle))
    }

    /// Expect a specific keyword token
    pub fn expect_keyword(&mut self, keyword: &str) -> ParseResult<()> {
        let token = self.next_token()?;
        if token.is_keyword(keyword) {
            return Ok(());
        }
        Err(ParseError::UnexpectedToken {
            expected: format!("keyword '{keyword}'"),
            found: format!("{token:?}"),
        })
    }

    /// Get current position
    pub fn position(&self) -> u64 {
        self.cursor.position()
    }

    /// Jump to an arbitrary byte offset, discarding buffered data
    pub fn set_position(&mut self, position: u64) {
        debug!(from = self.position(), to = position, "repositioning lexer");
        self.cursor.set_position(position);
    }

    /// Save the current position for later restoration
    pub fn save_position(&self) -> u64 {
        self.position()
    }

    /// Restore a previously saved position
    pub fn restore_position(&mut self, saved: u64) {
        self.cursor.rewind_to(saved);
    }

    /// Get a reference to the underlying reader
    pub fn get_ref(&self) -> &R {
        self.cursor.get_ref()
    }

    /// Get a mutable reference to the underlying reader
    pub fn get_mut(&mut self) -> &mut R {
        self.cursor.get_mut()
    }

    /// Unwrap the underlying reader
    pub fn into_inner(self) -> R {
        self.cursor.into_inner()
    }
}

/// Decode `#xx` escapes; a '#' without two hex digits is kept as is
fn decode_name(raw: &[u8]) -> String {
    let mut bytes = Vec::with_capacity(raw.len());
    let mut i = 0;
    while i < raw.len() {
        if raw[i] == b'#' && i + 2 < raw.len() {
            if let (Some(high), Some(low)) = (hex_value(raw[i + 1]), hex_value(raw[i + 2])) {
                bytes.push((high << 4) | low);
                i += 3;
                continue;
            }
        }
        bytes.push(raw[i]);
        i += 1;
    }
    bytes_to_string(bytes)
}

/// One char per byte (Latin-1), so distinct byte sequences stay distinct
fn bytes_to_string(bytes: Vec<u8>) -> String {
    bytes.into_iter().map(char::from).collect()
}

/// Classify a bare word as boolean, null, number or keyword
fn classify_word(word: Vec<u8>) -> Token {
    match word.as_slice() {
        b"true" => return Token::Boolean(true),
        b"false" => return Token::Boolean(false),
        b"null" => return Token::Null,
        _ => {}
    }

    if is_integer_literal(&word) {
        return Token::Integer(parse_integer(&word));
    }
    if is_real_literal(&word) {
        if let Some(value) = parse_real(&word) {
            return Token::Real(value);
        }
    }

    Token::Keyword(bytes_to_string(word))
}

fn split_sign(word: &[u8]) -> (bool, &[u8]) {
    match word.split_first() {
        Some((b'-', rest)) => (true, rest),
        Some((b'+', rest)) => (false, rest),
        _ => (false, word),
    }
}

/// `[+-]?[0-9]+`
fn is_integer_literal(word: &[u8]) -> bool {
    let (_, digits) = split_sign(word);
    !digits.is_empty() && digits.iter().all(|&b| is_digit(b))
}

/// `[+-]?([0-9]+\.?[0-9]*|\.[0-9]+)`
fn is_real_literal(word: &[u8]) -> bool {
    let (_, body) = split_sign(word);
    let (int_part, frac_part) = match body.iter().position(|&b| b == b'.') {
        Some(dot) => (&body[..dot], &body[dot + 1..]),
        None => (body, &[][..]),
    };
    (!int_part.is_empty() || !frac_part.is_empty())
        && int_part.iter().all(|&b| is_digit(b))
        && frac_part.iter().all(|&b| is_digit(b))
}

/// Parse a validated integer literal, saturating at the i64 bounds
fn parse_integer(word: &[u8]) -> i64 {
    let (negative, digits) = split_sign(word);
    let mut value: i64 = 0;
    for &b in digits {
        let digit = i64::from(b - b'0');
        let next = value.checked_mul(10).and_then(|v| {
            if negative {
                v.checked_sub(digit)
            } else {
                v.checked_add(digit)
            }
        });
        match next {
            Some(v) => value = v,
            None => {
                warn!(
                    literal = %String::from_utf8_lossy(word),
                    "integer literal out of range, saturating"
                );
                return if negative { i64::MIN } else { i64::MAX };
            }
        }
    }
    value
}

/// Parse a validated real literal; `12.` reads as `12.0`
fn parse_real(word: &[u8]) -> Option<f64> {
    let mut text = std::str::from_utf8(word).ok()?.to_string();
    if text.ends_with('.') {
        text.push('0');
    }
    text.parse::<f64>().ok()
}
