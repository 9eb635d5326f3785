//! Position and range utilities.
//!
//! LSIF uses 0-based line/character positions with UTF-16 character counts,
//! while checker adapters often hold byte offsets. This module provides the
//! shared types and the conversion between the two.

/// A position in a source file (0-indexed line and column).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
pub struct Position {
    /// 0-indexed line number
    pub line: u32,
    /// 0-indexed column (UTF-16 code units)
    pub character: u32,
}

impl Position {
    pub fn new(line: u32, character: u32) -> Self {
        Position { line, character }
    }
}

/// A range in a source file.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
pub struct Range {
    pub start: Position,
    pub end: Position,
}

impl Range {
    pub fn new(start: Position, end: Position) -> Self {
        Range { start, end }
    }

    /// Whether `position` lies inside this range (end exclusive, except for
    /// empty ranges which contain their start).
    pub fn contains(&self, position: Position) -> bool {
        if self.start == self.end {
            return position == self.start;
        }
        self.start <= position && position < self.end
    }
}

/// Line map for offset <-> position conversion.
/// Stores the starting offset of each line.
#[derive(Debug, Clone)]
pub struct LineMap {
    /// Starting offset of each line (line_starts[0] is always 0)
    line_starts: Vec<u32>,
}

impl LineMap {
    /// Build a line map from source text.
    pub fn build(source: &str) -> Self {
        let mut line_starts = vec![0u32];

        for (i, ch) in source.char_indices() {
            if ch == '\n' {
                line_starts.push((i + 1) as u32);
            } else if ch == '\r' {
                // \r\n is handled by the \n
                let next_idx = i + 1;
                if source.as_bytes().get(next_idx) != Some(&b'\n') {
                    line_starts.push(next_idx as u32);
                }
            }
        }

        LineMap { line_starts }
    }

    /// Convert a byte offset to a Position (line, character).
    /// Character is counted in UTF-16 code units.
    pub fn offset_to_position(&self, offset: u32, source: &str) -> Position {
        let line = match self.line_starts.binary_search(&offset) {
            Ok(exact) => exact,
            Err(insert_point) => insert_point.saturating_sub(1),
        };

        let line_start = self.line_starts.get(line).copied().unwrap_or(0);
        let clamped_end = (offset as usize).min(source.len());
        let start = (line_start as usize).min(clamped_end);
        let slice = source.get(start..clamped_end).unwrap_or("");
        let character = slice.chars().map(|ch| ch.len_utf16() as u32).sum();

        Position {
            line: line as u32,
            character,
        }
    }

    /// Convert a byte span to a Range.
    pub fn span_to_range(&self, start: u32, end: u32, source: &str) -> Range {
        Range::new(
            self.offset_to_position(start, source),
            self.offset_to_position(end, source),
        )
    }

    /// Get the number of lines.
    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// Get the starting offset of a line.
    pub fn line_start(&self, line: usize) -> Option<u32> {
        self.line_starts.get(line).copied()
    }

    /// Byte offset just past the last non-newline character of `line`.
    pub fn line_end(&self, line: usize, source: &str) -> Option<u32> {
        let start = self.line_start(line)? as usize;
        let limit = self
            .line_start(line + 1)
            .map(|next| next as usize)
            .unwrap_or(source.len());
        let text = source.get(start..limit)?;
        let trimmed = text.trim_end_matches(['\n', '\r']);
        Some((start + trimmed.len()) as u32)
    }
}

#[cfg(test)]
mod position_tests {
    use super::*;

    #[test]
    fn test_line_map_simple() {
        let source = "line1\nline2\nline3";
        let map = LineMap::build(source);

        assert_eq!(map.line_count(), 3);
        assert_eq!(map.offset_to_position(0, source), Position::new(0, 0));
        assert_eq!(map.offset_to_position(4, source), Position::new(0, 4));
        assert_eq!(map.offset_to_position(6, source), Position::new(1, 0));
        assert_eq!(map.offset_to_position(12, source), Position::new(2, 0));
    }

    #[test]
    fn test_line_map_windows_line_endings() {
        let source = "line1\r\nline2\r\nline3";
        let map = LineMap::build(source);

        assert_eq!(map.line_count(), 3);
        assert_eq!(map.offset_to_position(7, source), Position::new(1, 0));
        assert_eq!(map.line_end(0, source), Some(5));
    }

    #[test]
    fn test_utf16_columns() {
        // '€' is 3 bytes in UTF-8 and 1 code unit in UTF-16
        let source = "let €x = 1;";
        let map = LineMap::build(source);
        let x_offset = source.find('x').unwrap() as u32;

        assert_eq!(map.offset_to_position(x_offset, source), Position::new(0, 5));
    }

    #[test]
    fn test_range_contains() {
        let range = Range::new(Position::new(1, 4), Position::new(1, 7));

        assert!(range.contains(Position::new(1, 4)));
        assert!(range.contains(Position::new(1, 6)));
        assert!(!range.contains(Position::new(1, 7)));
        assert!(!range.contains(Position::new(0, 5)));
    }

    #[test]
    fn test_range_serializes_as_lsp_shape() {
        let range = Range::new(Position::new(0, 16), Position::new(0, 19));
        let json = serde_json::to_string(&range).unwrap();

        assert_eq!(
            json,
            r#"{"start":{"line":0,"character":16},"end":{"line":0,"character":19}}"#
        );
    }
}
