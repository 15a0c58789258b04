//! Newline framing for incoming serial data
//!
//! Bytes arrive in arbitrary chunks; the framer keeps partial records
//! between reads and yields one string per complete line.

/// Record delimiter (ASCII newline)
pub const LINE_DELIMITER: u8 = b'\n';

/// Longest record kept; longer records are dropped up to the next delimiter
pub const MAX_RECORD_LEN: usize = 1024;

/// Splits a byte stream into newline-delimited ASCII records
#[derive(Debug, Default)]
pub struct LineFramer {
    buffer: Vec<u8>,
    overflowed: bool,
}

impl LineFramer {
    /// Create an empty framer
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed bytes, returning every record completed by them in order.
    ///
    /// A trailing `\r` is stripped from each record. Non-ASCII bytes decode
    /// to U+FFFD.
    pub fn push(&mut self, bytes: &[u8]) -> Vec<String> {
        let mut records = Vec::new();

        for &b in bytes {
            if b == LINE_DELIMITER {
                if self.overflowed {
                    tracing::warn!("Dropped serial record longer than {} bytes", MAX_RECORD_LEN);
                    self.overflowed = false;
                    continue;
                }
                let mut record = std::mem::take(&mut self.buffer);
                if record.last() == Some(&b'\r') {
                    record.pop();
                }
                records.push(decode_ascii(&record));
            } else if self.overflowed {
                continue;
            } else if self.buffer.len() >= MAX_RECORD_LEN {
                self.overflowed = true;
                self.buffer.clear();
            } else {
                self.buffer.push(b);
            }
        }

        records
    }

    /// Number of bytes waiting for a delimiter
    pub fn pending(&self) -> usize {
        self.buffer.len()
    }

    /// Discard any partial record
    pub fn clear(&mut self) {
        self.buffer.clear();
        self.overflowed = false;
    }
}

fn decode_ascii(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|&b| {
            if b.is_ascii() {
                b as char
            } else {
                char::REPLACEMENT_CHARACTER
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_across_reads() {
        let mut framer = LineFramer::new();
        assert_eq!(framer.push(b"ok\nrea"), vec!["ok"]);
        assert_eq!(framer.pending(), 3);
        assert_eq!(framer.push(b"dy\n\n"), vec!["ready", ""]);
        assert_eq!(framer.pending(), 0);
    }

    #[test]
    fn test_strips_carriage_return() {
        let mut framer = LineFramer::new();
        assert_eq!(framer.push(b"done\r\n"), vec!["done"]);
    }

    #[test]
    fn test_non_ascii_replaced() {
        let mut framer = LineFramer::new();
        assert_eq!(framer.push(&[b'a', 0xC3, b'\n']), vec!["a\u{FFFD}"]);
    }

    #[test]
    fn test_oversized_record_dropped() {
        let mut framer = LineFramer::new();
        let long = vec![b'x'; MAX_RECORD_LEN + 10];
        assert!(framer.push(&long).is_empty());
        assert_eq!(framer.push(b"tail\nnext\n"), vec!["next"]);
    }

    #[test]
    fn test_record_at_limit_kept() {
        let mut framer = LineFramer::new();
        let mut exact = vec![b'y'; MAX_RECORD_LEN];
        exact.push(b'\n');
        let records = framer.push(&exact);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].len(), MAX_RECORD_LEN);
    }

    #[test]
    fn test_clear() {
        let mut framer = LineFramer::new();
        framer.push(b"partial");
        framer.clear();
        assert_eq!(framer.push(b"fresh\n"), vec!["fresh"]);
    }
}
