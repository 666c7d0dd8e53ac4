//! Line index over a document snapshot

use crate::error::{LanguageConfigError, LanguageConfigResult};
use crate::indentation::leading_whitespace;

/// Caret position in the document (byte column within the line)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Position {
    pub row: usize,
    pub col: usize,
}

impl Position {
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

/// Line span, `end` excludes the delimiter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct LineSpan {
    start: usize,
    end: usize,
}

/// Read-only view of a document with `\n`, `\r\n` and `\r` line delimiters
#[derive(Debug, Clone)]
pub struct Document<'a> {
    text: &'a str,
    lines: Vec<LineSpan>,
}

impl<'a> Document<'a> {
    pub fn new(text: &'a str) -> Self {
        let bytes = text.as_bytes();
        let mut lines = Vec::new();
        let mut start = 0;
        let mut i = 0;
        while i < bytes.len() {
            match bytes[i] {
                b'\n' => {
                    lines.push(LineSpan { start, end: i });
                    start = i + 1;
                }
                b'\r' => {
                    lines.push(LineSpan { start, end: i });
                    if bytes.get(i + 1) == Some(&b'\n') {
                        i += 1;
                    }
                    start = i + 1;
                }
                _ => {}
            }
            i += 1;
        }
        lines.push(LineSpan {
            start,
            end: text.len(),
        });
        Self { text, lines }
    }

    pub fn text(&self) -> &'a str {
        self.text
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Validates a host-supplied offset
    pub fn check_offset(&self, offset: usize) -> LanguageConfigResult<()> {
        check_offset(self.text, offset)
    }

    /// Row containing `offset`; an offset on a delimiter belongs to the line it ends
    pub fn line_of_offset(&self, offset: usize) -> LanguageConfigResult<usize> {
        self.check_offset(offset)?;
        Ok(self
            .lines
            .partition_point(|line| line.start <= offset)
            .saturating_sub(1))
    }

    pub fn line_start(&self, row: usize) -> Option<usize> {
        self.lines.get(row).map(|line| line.start)
    }

    /// Text of `row` without its delimiter
    pub fn line_text(&self, row: usize) -> Option<&'a str> {
        self.lines.get(row).map(|line| &self.text[line.start..line.end])
    }

    pub fn position_of(&self, offset: usize) -> LanguageConfigResult<Position> {
        let row = self.line_of_offset(offset)?;
        Ok(Position::new(row, offset - self.lines[row].start))
    }

    /// Text of the caret's line before and after the caret
    pub fn split_line_at(&self, offset: usize) -> LanguageConfigResult<(&'a str, &'a str)> {
        let row = self.line_of_offset(offset)?;
        let line = self.lines[row];
        let caret = offset.min(line.end);
        Ok((&self.text[line.start..caret], &self.text[caret..line.end]))
    }

    /// Leading indentation of the caret's line, never past the caret
    pub fn leading_whitespace_at(&self, offset: usize) -> LanguageConfigResult<&'a str> {
        let (before, _) = self.split_line_at(offset)?;
        Ok(leading_whitespace(before))
    }
}

pub(crate) fn check_offset(text: &str, offset: usize) -> LanguageConfigResult<()> {
    if offset > text.len() {
        return Err(LanguageConfigError::OffsetOutOfBounds {
            offset,
            len: text.len(),
        });
    }
    if !text.is_char_boundary(offset) {
        return Err(LanguageConfigError::NotCharBoundary(offset));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_line() {
        let doc = Document::new("hello");
        assert_eq!(doc.line_count(), 1);
        assert_eq!(doc.line_text(0), Some("hello"));
        assert_eq!(doc.line_text(1), None);
    }

    #[test]
    fn test_mixed_delimiters() {
        let doc = Document::new("a\r\nb\rc\nd");
        assert_eq!(doc.line_count(), 4);
        assert_eq!(doc.line_text(0), Some("a"));
        assert_eq!(doc.line_text(1), Some("b"));
        assert_eq!(doc.line_text(2), Some("c"));
        assert_eq!(doc.line_text(3), Some("d"));
        assert_eq!(doc.line_start(3), Some(7));
    }

    #[test]
    fn test_trailing_newline_opens_empty_line() {
        let doc = Document::new("a\n");
        assert_eq!(doc.line_count(), 2);
        assert_eq!(doc.line_text(1), Some(""));
        assert_eq!(doc.line_of_offset(2).unwrap(), 1);
    }

    #[test]
    fn test_position_of() {
        let doc = Document::new("line1\nline2");
        assert_eq!(doc.position_of(0).unwrap(), Position::new(0, 0));
        assert_eq!(doc.position_of(5).unwrap(), Position::new(0, 5));
        assert_eq!(doc.position_of(8).unwrap(), Position::new(1, 2));
    }

    #[test]
    fn test_split_line_at() {
        let doc = Document::new("first\n  foo(bar)\nlast");
        assert_eq!(doc.split_line_at(12).unwrap(), ("  foo(", "bar)"));
        assert_eq!(doc.leading_whitespace_at(12).unwrap(), "  ");
        assert_eq!(doc.leading_whitespace_at(7).unwrap(), " ");
    }

    #[test]
    fn test_offset_contract() {
        let doc = Document::new("héllo");
        assert!(matches!(
            doc.line_of_offset(10),
            Err(LanguageConfigError::OffsetOutOfBounds { offset: 10, len: 6 })
        ));
        assert!(matches!(
            doc.line_of_offset(2),
            Err(LanguageConfigError::NotCharBoundary(2))
        ));
        assert!(doc.check_offset(6).is_ok());
    }
}
