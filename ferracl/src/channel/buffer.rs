//! Pattern buffer with tail-only prompt search.
//!
//! Prompts are always at the end of what the device has sent so far, so
//! only the last `search_depth` bytes are handed to the regex. This keeps
//! long `show` outputs from being rescanned on every read.

use bytes::BytesMut;
use memchr::{memchr, memrchr};
use regex::bytes::Regex;
use vte::{Parser, Perform};

/// Default number of trailing bytes searched for a prompt.
pub const DEFAULT_SEARCH_DEPTH: usize = 1000;

/// Accumulates device output and locates prompts in its tail.
pub struct PatternBuffer {
    buffer: BytesMut,
    search_depth: usize,
    parser: Parser,
}

impl PatternBuffer {
    /// Create a buffer that searches the last `search_depth` bytes.
    pub fn new(search_depth: usize) -> Self {
        Self {
            buffer: BytesMut::with_capacity(4096),
            search_depth,
            parser: Parser::new(),
        }
    }

    /// Append raw device output, dropping escape sequences and carriage returns.
    ///
    /// The parser keeps state across calls, so an escape sequence split
    /// between two SSH packets is still removed.
    pub fn extend(&mut self, data: &[u8]) {
        let mut sink = PrintableSink {
            out: &mut self.buffer,
        };
        self.parser.advance(&mut sink, data);
    }

    /// Start offset of the searchable tail.
    ///
    /// The cut is moved to a line start (forward if a later line exists,
    /// otherwise back to the start of the last line) so a line-anchored
    /// prompt regex never sees a truncated line.
    fn tail_start(&self) -> usize {
        if self.buffer.len() <= self.search_depth {
            return 0;
        }
        let cut = self.buffer.len() - self.search_depth;
        if let Some(pos) = memchr(b'\n', &self.buffer[cut..]) {
            return cut + pos + 1;
        }
        memrchr(b'\n', &self.buffer[..cut]).map_or(0, |pos| pos + 1)
    }

    /// Find `pattern` in the tail, returning the absolute (start, end) of the match.
    pub fn find_in_tail(&self, pattern: &Regex) -> Option<(usize, usize)> {
        let start = self.tail_start();
        pattern
            .find(&self.buffer[start..])
            .map(|m| (start + m.start(), start + m.end()))
    }

    /// Take everything up to `end`, leaving the rest buffered.
    pub fn take_until(&mut self, end: usize) -> Vec<u8> {
        self.buffer.split_to(end).to_vec()
    }

    #[cfg(test)]
    fn as_bytes(&self) -> &[u8] {
        &self.buffer
    }
}

impl Default for PatternBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_SEARCH_DEPTH)
    }
}

impl std::fmt::Debug for PatternBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PatternBuffer")
            .field("len", &self.buffer.len())
            .field("search_depth", &self.search_depth)
            .finish()
    }
}

/// vte performer that keeps printable text, newlines and tabs.
struct PrintableSink<'a> {
    out: &'a mut BytesMut,
}

impl Perform for PrintableSink<'_> {
    fn print(&mut self, c: char) {
        let mut utf8 = [0u8; 4];
        self.out.extend_from_slice(c.encode_utf8(&mut utf8).as_bytes());
    }

    fn execute(&mut self, byte: u8) {
        if matches!(byte, b'\n' | b'\t') {
            self.out.extend_from_slice(&[byte]);
        }
    }
}
