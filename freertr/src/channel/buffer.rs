//! Output buffer with tail-only prompt search.
//!
//! Prompts always sit at the end of a reply, so only the last `search_depth`
//! bytes are matched. Large replies such as a full `show running-config`
//! stay cheap to scan.

use regex::bytes::Regex;

/// Accumulates device output and searches its tail for prompt patterns.
#[derive(Debug)]
pub struct PatternBuffer {
    buffer: Vec<u8>,
    search_depth: usize,
}

impl PatternBuffer {
    /// Create a buffer that searches the last `search_depth` bytes.
    pub fn new(search_depth: usize) -> Self {
        Self {
            buffer: Vec::with_capacity(4096),
            search_depth,
        }
    }

    /// Append output, stripping ANSI escape sequences.
    pub fn extend(&mut self, data: &[u8]) {
        let cleaned = strip_ansi_escapes::strip(data);
        self.buffer.extend_from_slice(&cleaned);
    }

    /// Search only the tail of the buffer.
    ///
    /// Returns the `(start, end)` of the match as offsets into the whole
    /// buffer.
    pub fn search_tail(&self, pattern: &Regex) -> Option<(usize, usize)> {
        let start = self.buffer.len().saturating_sub(self.search_depth);
        pattern
            .find(&self.buffer[start..])
            .map(|m| (start + m.start(), start + m.end()))
    }

    /// Check if the tail contains a pattern match.
    pub fn tail_contains(&self, pattern: &Regex) -> bool {
        self.search_tail(pattern).is_some()
    }

    /// Take ownership of the buffer contents and reset.
    pub fn take(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.buffer)
    }

    /// Get a reference to the buffer contents.
    pub fn as_slice(&self) -> &[u8] {
        &self.buffer
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
    }
}

impl Default for PatternBuffer {
    fn default() -> Self {
        Self::new(1000)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ansi_stripping() {
        let mut buffer = PatternBuffer::new(100);
        buffer.extend(b"\x1b[32mrtr1#\x1b[0m");
        assert_eq!(buffer.as_slice(), b"rtr1#");
    }

    #[test]
    fn test_tail_search_offsets() {
        let mut buffer = PatternBuffer::new(20);
        buffer.extend(&[b'x'; 100]);
        buffer.extend(b"\nrtr1#");

        let pattern = Regex::new(r"rtr1#").unwrap();
        assert_eq!(buffer.search_tail(&pattern), Some((101, 106)));
    }

    #[test]
    fn test_prompt_outside_tail_is_ignored() {
        let mut buffer = PatternBuffer::new(10);
        buffer.extend(b"rtr1#");
        buffer.extend(&[b'x'; 100]);

        let pattern = Regex::new(r"rtr1#").unwrap();
        assert!(!buffer.tail_contains(&pattern));
    }

    #[test]
    fn test_take_clears_buffer() {
        let mut buffer = PatternBuffer::default();
        buffer.extend(b"show platform");
        assert_eq!(buffer.take(), b"show platform");
        assert!(buffer.is_empty());
    }
}
