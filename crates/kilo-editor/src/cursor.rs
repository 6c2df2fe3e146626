//! Cursor: the insertion point and its movement rules.
//!
//! The cursor is a [`Position`] in raw-column space. It may sit one past the
//! last byte of a row and on the virtual line one past the last row, where
//! typing appends. After every move the column is clamped to the length of
//! the row it landed on; there is no remembered column for vertical motion.
//!
//! The cursor does not own or reference the document. The document is passed
//! to each movement method.

use crate::document::Document;
use crate::position::Position;

/// The insertion point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Cursor {
    pos: Position,
}

impl Cursor {
    /// A cursor at the origin.
    #[must_use]
    pub const fn new() -> Self {
        Self { pos: Position::ZERO }
    }

    // -- Accessors ----------------------------------------------------------

    #[inline]
    #[must_use]
    pub const fn position(&self) -> Position {
        self.pos
    }

    /// Current row (`cy`).
    #[inline]
    #[must_use]
    pub const fn line(&self) -> usize {
        self.pos.line
    }

    /// Current raw column (`cx`).
    #[inline]
    #[must_use]
    pub const fn col(&self) -> usize {
        self.pos.col
    }

    /// Current rendered column (`rx`).
    #[must_use]
    pub fn rx(&self, doc: &Document) -> usize {
        doc.cx_to_rx(self.pos)
    }

    // -- Direct positioning -------------------------------------------------

    /// Jump to `pos`, clamped to the document.
    pub fn set_position(&mut self, pos: Position, doc: &Document) {
        self.pos = pos;
        self.clamp(doc);
    }

    /// Pull the cursor back inside the document after an edit or a jump.
    pub fn clamp(&mut self, doc: &Document) {
        self.pos.line = self.pos.line.min(doc.len());
        self.pos.col = self.pos.col.min(doc.row_len(self.pos.line));
    }

    // -- Horizontal movement ------------------------------------------------

    /// One byte left, wrapping to the end of the previous row.
    pub fn move_left(&mut self, doc: &Document) {
        if self.pos.col > 0 {
            self.pos.col -= 1;
        } else if self.pos.line > 0 {
            self.pos.line -= 1;
            self.pos.col = doc.row_len(self.pos.line);
        }
        self.clamp(doc);
    }

    /// One byte right, wrapping to the start of the next row.
    ///
    /// Does nothing on the virtual line past the end.
    pub fn move_right(&mut self, doc: &Document) {
        if let Some(row) = doc.row(self.pos.line) {
            if self.pos.col < row.len() {
                self.pos.col += 1;
            } else {
                self.pos.line += 1;
                self.pos.col = 0;
            }
        }
        self.clamp(doc);
    }

    /// Column 0.
    pub const fn move_to_line_start(&mut self) {
        self.pos.col = 0;
    }

    /// One past the last byte of the row. No-op on the virtual line.
    pub fn move_to_line_end(&mut self, doc: &Document) {
        if self.pos.line < doc.len() {
            self.pos.col = doc.row_len(self.pos.line);
        }
    }

    // -- Vertical movement --------------------------------------------------

    pub fn move_up(&mut self, doc: &Document) {
        self.pos.line = self.pos.line.saturating_sub(1);
        self.clamp(doc);
    }

    /// One row down, at most onto the virtual line past the end.
    pub fn move_down(&mut self, doc: &Document) {
        if self.pos.line < doc.len() {
            self.pos.line += 1;
        }
        self.clamp(doc);
    }

    /// To the top of the window, then up one screenful.
    pub fn page_up(&mut self, doc: &Document, row_offset: usize, text_rows: usize) {
        self.pos.line = row_offset;
        for _ in 0..text_rows {
            self.move_up(doc);
        }
        self.clamp(doc);
    }

    /// To the bottom of the window, then down one screenful.
    pub fn page_down(&mut self, doc: &Document, row_offset: usize, text_rows: usize) {
        self.pos.line = (row_offset + text_rows.saturating_sub(1)).min(doc.len());
        for _ in 0..text_rows {
            self.move_down(doc);
        }
        self.clamp(doc);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
