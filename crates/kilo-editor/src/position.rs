//! Cursor position type.
//!
//! All coordinates are **0-indexed**. `line` is the row index (`cy`) and may
//! equal the row count: the virtual empty line after the last row, where
//! typing appends a new row. `col` is a **raw** byte column (`cx`), not a
//! screen column; convert with [`Row::cx_to_rx`](crate::row::Row::cx_to_rx)
//! before drawing.

use std::fmt;

/// A position in a document: (line, column), both 0-indexed.
///
/// Positions are ordered lexicographically: line first, then column.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct Position {
    pub line: usize,
    pub col: usize,
}

impl Position {
    /// Line 0, column 0.
    pub const ZERO: Self = Self { line: 0, col: 0 };

    /// Create a new position.
    #[inline]
    #[must_use]
    pub const fn new(line: usize, col: usize) -> Self {
        Self { line, col }
    }
}

impl fmt::Debug for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Pos({}:{})", self.line, self.col)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // 1-indexed for human display.
        write!(f, "{}:{}", self.line + 1, self.col + 1)
    }
}
