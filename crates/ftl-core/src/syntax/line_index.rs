//! Precomputed line-start offsets for O(log n) line/column lookups

use serde::{Deserialize, Serialize};

/// 1-based line and column (column counted in characters).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineCol {
    pub line: usize,
    pub column: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineIndex {
    line_starts: Vec<usize>,
    len: usize,
}

impl LineIndex {
    /// Build the index once; LF, CRLF and bare CR all start a new line.
    pub fn new(source: &str) -> Self {
        let bytes = source.as_bytes();
        let mut line_starts = vec![0];
        let mut i = 0;
        while i < bytes.len() {
            match bytes[i] {
                b'\n' => line_starts.push(i + 1),
                b'\r' if bytes.get(i + 1) != Some(&b'\n') => line_starts.push(i + 1),
                _ => {}
            }
            i += 1;
        }
        Self {
            line_starts,
            len: source.len(),
        }
    }

    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// Byte offset where `line` (1-based) begins.
    pub fn line_start(&self, line: usize) -> Option<usize> {
        line.checked_sub(1)
            .and_then(|idx| self.line_starts.get(idx).copied())
    }

    /// Resolve a byte offset against the source the index was built from.
    pub fn line_col(&self, source: &str, offset: usize) -> LineCol {
        let offset = offset.min(self.len);
        let line_idx = match self.line_starts.binary_search(&offset) {
            Ok(idx) => idx,
            Err(idx) => idx - 1,
        };
        let start = self.line_starts[line_idx];
        let column = source
            .get(start..offset)
            .map(|prefix| prefix.chars().count())
            .unwrap_or(offset - start);
        LineCol {
            line: line_idx + 1,
            column: column + 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_col_lookup() {
        let source = "key = value\nother = ünïcode\r\nlast";
        let index = LineIndex::new(source);
        assert_eq!(index.line_count(), 3);
        assert_eq!(index.line_col(source, 0), LineCol { line: 1, column: 1 });
        assert_eq!(index.line_col(source, 12), LineCol { line: 2, column: 1 });
        let last = source.find("last").unwrap();
        assert_eq!(index.line_col(source, last), LineCol { line: 3, column: 1 });
        let u = source.find("code").unwrap();
        assert_eq!(index.line_col(source, u), LineCol { line: 2, column: 12 });
    }

    #[test]
    fn test_bare_cr_starts_line() {
        let source = "a\rb";
        let index = LineIndex::new(source);
        assert_eq!(index.line_col(source, 2), LineCol { line: 2, column: 1 });
    }

    #[test]
    fn test_offset_past_end_is_clamped() {
        let source = "ab";
        let index = LineIndex::new(source);
        assert_eq!(index.line_col(source, 99), LineCol { line: 1, column: 3 });
    }
}
