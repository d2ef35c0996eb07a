//! Sliding read buffer over a seekable input
//!
//! [`ByteCursor`] presents an arbitrarily positionable byte stream backed by a
//! bounded window of the underlying input. The window is refilled lazily in
//! fixed-size chunks and the consumed prefix is dropped once the window grows
//! past a high-water mark, so scanning a huge lexeme never holds the whole file.
//!
//! The input is always re-seeked before a refill: callers may move the
//! underlying reader between calls.

use super::{LexerOptions, ParseResult};
use std::io::{self, BufRead, Read, Seek, SeekFrom};
use tracing::{debug, trace};

/// Positionable byte stream over a `Read + Seek` input
pub struct ByteCursor<R> {
    reader: R,
    /// Bytes currently held
    buffer: Vec<u8>,
    /// Offset of the next unread byte within `buffer`
    cursor: usize,
    /// Input offset of `buffer[0]`
    logical_start: u64,
    /// Input offset the next refill reads from
    next_read_offset: u64,
    chunk_size: usize,
    high_water: usize,
}

impl<R: Read + Seek> ByteCursor<R> {
    /// Create a cursor positioned at offset 0 with default options
    pub fn new(reader: R) -> Self {
        Self::with_options(reader, &LexerOptions::default())
    }

    /// Create a cursor positioned at offset 0
    pub fn with_options(reader: R, options: &LexerOptions) -> Self {
        let chunk_size = options.effective_chunk_size();
        Self {
            reader,
            buffer: Vec::with_capacity(chunk_size),
            cursor: 0,
            logical_start: 0,
            next_read_offset: 0,
            chunk_size,
            high_water: options.high_water_bytes(),
        }
    }

    /// Logical offset of the next byte
    pub fn position(&self) -> u64 {
        self.logical_start + self.cursor as u64
    }

    /// Discard the buffer and continue reading at `position`
    ///
    /// The input itself is not touched until the next refill.
    pub fn set_position(&mut self, position: u64) {
        self.buffer.clear();
        self.cursor = 0;
        self.logical_start = position;
        self.next_read_offset = position;
    }

    /// Move back (or forward) to `position`, keeping the buffered window when
    /// the position lies inside it
    pub(crate) fn rewind_to(&mut self, position: u64) {
        let window_end = self.logical_start + self.buffer.len() as u64;
        if position >= self.logical_start && position <= window_end {
            self.cursor = (position - self.logical_start) as usize;
        } else {
            self.set_position(position);
        }
    }

    /// Read the next chunk of input into the buffer
    ///
    /// Returns `false` when the input is exhausted at `next_read_offset`; the
    /// cursor state is left untouched in that case.
    pub fn fill(&mut self) -> io::Result<bool> {
        self.reader.seek(SeekFrom::Start(self.next_read_offset))?;

        let start = self.buffer.len();
        self.buffer.resize(start + self.chunk_size, 0);
        let read = loop {
            match self.reader.read(&mut self.buffer[start..]) {
                Ok(n) => break n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    self.buffer.truncate(start);
                    return Err(e);
                }
            }
        };
        self.buffer.truncate(start + read);

        if read == 0 {
            trace!(offset = self.next_read_offset, "input exhausted");
            return Ok(false);
        }

        self.next_read_offset += read as u64;
        trace!(
            offset = self.next_read_offset - read as u64,
            read,
            buffered = self.buffer.len(),
            "refilled lexer buffer"
        );
        self.compact();
        Ok(true)
    }

    fn compact(&mut self) {
        if self.buffer.len() > self.high_water && self.cursor > self.chunk_size {
            let dropped = self.cursor;
            self.buffer.drain(..dropped);
            self.logical_start += dropped as u64;
            self.cursor = 0;
            debug!(
                dropped,
                logical_start = self.logical_start,
                "compacted lexer buffer"
            );
        }
    }

    /// Make sure at least one unread byte is buffered
    fn ensure_available(&mut self) -> io::Result<bool> {
        if self.cursor < self.buffer.len() {
            return Ok(true);
        }
        self.fill()
    }

    /// Peek at the next byte without consuming it
    pub fn peek_byte(&mut self) -> ParseResult<Option<u8>> {
        if !self.ensure_available()? {
            return Ok(None);
        }
        Ok(Some(self.buffer[self.cursor]))
    }

    /// Consume the next byte
    pub fn next_byte(&mut self) -> ParseResult<Option<u8>> {
        let byte = self.peek_byte()?;
        if byte.is_some() {
            self.cursor += 1;
        }
        Ok(byte)
    }

    /// Append bytes to `out` until one satisfies `matches`
    ///
    /// The matching byte is returned but not consumed. `None` means the input
    /// ran out first; everything up to the end has then been appended.
    pub fn scan_until<F>(&mut self, out: &mut Vec<u8>, matches: F) -> ParseResult<Option<u8>>
    where
        F: Fn(u8) -> bool,
    {
        loop {
            let window = &self.buffer[self.cursor..];
            if let Some(index) = window.iter().position(|&b| matches(b)) {
                out.extend_from_slice(&window[..index]);
                self.cursor += index;
                return Ok(Some(self.buffer[self.cursor]));
            }
            out.extend_from_slice(window);
            self.cursor = self.buffer.len();
            if !self.fill()? {
                return Ok(None);
            }
        }
    }

    /// Skip bytes while `matches` holds, returning how many were skipped
    pub fn skip_while<F>(&mut self, matches: F) -> ParseResult<usize>
    where
        F: Fn(u8) -> bool,
    {
        let mut skipped = 0;
        loop {
            let run = self.buffer[self.cursor..]
                .iter()
                .take_while(|&&b| matches(b))
                .count();
            self.cursor += run;
            skipped += run;
            if self.cursor < self.buffer.len() || !self.fill()? {
                return Ok(skipped);
            }
        }
    }

    /// Append up to `count` bytes to `out`, returning how many were available
    pub fn read_up_to(&mut self, count: usize, out: &mut Vec<u8>) -> ParseResult<usize> {
        let mut remaining = count;
        while remaining > 0 && self.ensure_available()? {
            let available = (self.buffer.len() - self.cursor).min(remaining);
            out.extend_from_slice(&self.buffer[self.cursor..self.cursor + available]);
            self.cursor += available;
            remaining -= available;
        }
        Ok(count - remaining)
    }

    /// Get a reference to the underlying input
    pub fn get_ref(&self) -> &R {
        &self.reader
    }

    /// Get a mutable reference to the underlying input
    ///
    /// Moving the input's position is allowed; the cursor re-seeks before
    /// every refill.
    pub fn get_mut(&mut self) -> &mut R {
        &mut self.reader
    }

    /// Unwrap the underlying input
    pub fn into_inner(self) -> R {
        self.reader
    }
}

impl<R: Read + Seek> Read for ByteCursor<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let available = self.fill_buf()?;
        let n = available.len().min(buf.len());
        buf[..n].copy_from_slice(&available[..n]);
        self.consume(n);
        Ok(n)
    }
}

impl<R: Read + Seek> BufRead for ByteCursor<R> {
    fn fill_buf(&mut self) -> io::Result<&[u8]> {
        self.ensure_available()?;
        Ok(&self.buffer[self.cursor..])
    }

    fn consume(&mut self, amt: usize) {
        self.cursor = (self.cursor + amt).min(self.buffer.len());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn cursor_over(data: &[u8], chunk_size: usize) -> ByteCursor<Cursor<Vec<u8>>> {
        let options = LexerOptions::default()
            .with_chunk_size(chunk_size)
            .with_high_water_chunks(4);
        ByteCursor::with_options(Cursor::new(data.to_vec()), &options)
    }

    #[test]
    fn test_next_byte_across_chunks() {
        let mut cursor = cursor_over(b"abcdefg", 3);
        let mut seen = Vec::new();
        while let Some(byte) = cursor.next_byte().unwrap() {
            seen.push(byte);
        }
        assert_eq!(seen, b"abcdefg");
        assert_eq!(cursor.position(), 7);
        assert_eq!(cursor.next_byte().unwrap(), None);
        assert_eq!(cursor.position(), 7);
    }

    #[test]
    fn test_peek_does_not_advance() {
        let mut cursor = cursor_over(b"xy", 1);
        assert_eq!(cursor.peek_byte().unwrap(), Some(b'x'));
        assert_eq!(cursor.peek_byte().unwrap(), Some(b'x'));
        assert_eq!(cursor.position(), 0);
        assert_eq!(cursor.next_byte().unwrap(), Some(b'x'));
        assert_eq!(cursor.peek_byte().unwrap(), Some(b'y'));
    }

    #[test]
    fn test_empty_input() {
        let mut cursor = cursor_over(b"", 8);
        assert_eq!(cursor.peek_byte().unwrap(), None);
        assert_eq!(cursor.next_byte().unwrap(), None);
        assert_eq!(cursor.position(), 0);
    }

    #[test]
    fn test_set_position_is_lazy_and_discards_buffer() {
        let mut cursor = cursor_over(b"0123456789", 4);
        assert_eq!(cursor.next_byte().unwrap(), Some(b'0'));

        cursor.set_position(7);
        assert_eq!(cursor.position(), 7);
        assert!(cursor.buffer.is_empty());
        assert_eq!(cursor.next_byte().unwrap(), Some(b'7'));

        // Positions past the end are accepted and simply yield nothing
        cursor.set_position(100);
        assert_eq!(cursor.position(), 100);
        assert_eq!(cursor.next_byte().unwrap(), None);
    }

    #[test]
    fn test_rewind_inside_window_keeps_buffer() {
        let mut cursor = cursor_over(b"0123456789", 16);
        for _ in 0..5 {
            cursor.next_byte().unwrap();
        }
        let buffered = cursor.buffer.len();
        cursor.rewind_to(2);
        assert_eq!(cursor.buffer.len(), buffered);
        assert_eq!(cursor.next_byte().unwrap(), Some(b'2'));
    }

    #[test]
    fn test_scan_until_spans_refills() {
        let mut cursor = cursor_over(b"hello world)rest", 2);
        let mut out = Vec::new();
        let found = cursor.scan_until(&mut out, |b| b == b')').unwrap();
        assert_eq!(found, Some(b')'));
        assert_eq!(out, b"hello world");
        // The match is left unconsumed
        assert_eq!(cursor.position(), 11);
        assert_eq!(cursor.next_byte().unwrap(), Some(b')'));
    }

    #[test]
    fn test_scan_until_exhaustion() {
        let mut cursor = cursor_over(b"no terminator", 4);
        let mut out = Vec::new();
        assert_eq!(cursor.scan_until(&mut out, |b| b == b'>').unwrap(), None);
        assert_eq!(out, b"no terminator");
        assert_eq!(cursor.position(), 13);
    }

    #[test]
    fn test_skip_while() {
        let mut cursor = cursor_over(b"     x", 2);
        assert_eq!(cursor.skip_while(|b| b == b' ').unwrap(), 5);
        assert_eq!(cursor.next_byte().unwrap(), Some(b'x'));
        assert_eq!(cursor.skip_while(|b| b == b' ').unwrap(), 0);
    }

    #[test]
    fn test_read_up_to_partial() {
        let mut cursor = cursor_over(b"abcdef", 4);
        let mut out = Vec::new();
        assert_eq!(cursor.read_up_to(4, &mut out).unwrap(), 4);
        assert_eq!(out, b"abcd");
        out.clear();
        assert_eq!(cursor.read_up_to(10, &mut out).unwrap(), 2);
        assert_eq!(out, b"ef");
    }

    #[test]
    fn test_compaction_bounds_memory() {
        let data = vec![b'a'; 10_000];
        let mut cursor = cursor_over(&data, 16);
        let mut out = Vec::new();
        assert_eq!(cursor.scan_until(&mut out, |b| b == b')').unwrap(), None);
        assert_eq!(out.len(), 10_000);
        assert_eq!(cursor.position(), 10_000);
        // High-water mark of 4 chunks plus the chunk being appended
        assert!(cursor.buffer.len() <= 16 * 5, "buffer grew to {}", cursor.buffer.len());
        assert!(cursor.logical_start > 0);
        assert_eq!(cursor.logical_start + cursor.buffer.len() as u64, cursor.next_read_offset);
    }

    #[test]
    fn test_reseeks_after_external_move() {
        let mut cursor = cursor_over(b"0123456789", 2);
        assert_eq!(cursor.next_byte().unwrap(), Some(b'0'));
        assert_eq!(cursor.next_byte().unwrap(), Some(b'1'));

        // Someone else moves the input behind our back
        cursor.get_mut().seek(SeekFrom::Start(8)).unwrap();

        assert_eq!(cursor.next_byte().unwrap(), Some(b'2'));
        assert_eq!(cursor.next_byte().unwrap(), Some(b'3'));
    }

    #[test]
    fn test_read_and_bufread_impls() {
        let mut cursor = cursor_over(b"stream data", 4);
        cursor.set_position(7);
        let mut rest = String::new();
        cursor.read_to_string(&mut rest).unwrap();
        assert_eq!(rest, "data");
        assert_eq!(cursor.position(), 11);

        cursor.set_position(0);
        let mut word = Vec::new();
        cursor.read_until(b' ', &mut word).unwrap();
        assert_eq!(word, b"stream ");
    }
}
