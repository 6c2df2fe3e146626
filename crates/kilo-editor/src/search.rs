//! Search: incremental literal search with a transient match highlight.
//!
//! A [`SearchSession`] lives while the search prompt is open. Each keystroke
//! calls [`SearchSession::step`] with the current query:
//!
//! 1. Editing the query restarts the scan at the cursor, forward.
//! 2. Arrow keys move to the next (Right/Down) or previous (Left/Up) match.
//! 3. Enter or Escape ends the session.
//!
//! The scan works on rendered text, row by row, wrapping around the end of
//! the document and visiting each row at most once per step.
//!
//! # Match highlighting
//!
//! The current match is painted [`Highlight::SearchMatch`] through
//! [`Document::overlay_highlight`]. The row's previous tags are kept and put
//! back before the next step and when the session ends, so the persistent
//! highlighting is untouched once the prompt closes.
//!
//! # Direction switches
//!
//! After a forward match the anchor sits just past it; after a backward
//! match it sits one query length before it. Reversing direction shifts the
//! anchor by twice the query length so the match under the cursor is
//! skipped rather than found again.

use log::debug;

use crate::document::Document;
use crate::highlight::Highlight;
use crate::position::Position;
use crate::view::Viewport;

// ---------------------------------------------------------------------------
// Direction
// ---------------------------------------------------------------------------

/// Search direction.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum SearchDirection {
    #[default]
    Forward,
    Backward,
}

impl SearchDirection {
    /// The opposite direction.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::Forward => Self::Backward,
            Self::Backward => Self::Forward,
        }
    }
}

// ---------------------------------------------------------------------------
// Match
// ---------------------------------------------------------------------------

/// A match: row and start column in rendered space, and its length.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Match {
    pub line: usize,
    pub rx: usize,
    pub len: usize,
}

/// First occurrence of `needle` in `hay` starting at or after `from`.
#[must_use]
pub fn find_forward(hay: &[u8], needle: &[u8], from: usize) -> Option<usize> {
    if needle.is_empty() || from >= hay.len() || needle.len() > hay.len() - from {
        return None;
    }
    hay[from..]
        .windows(needle.len())
        .position(|w| w == needle)
        .map(|i| i + from)
}

/// Last occurrence of `needle` in `hay` starting at or before `from`.
#[must_use]
pub fn find_backward(hay: &[u8], needle: &[u8], from: usize) -> Option<usize> {
    if needle.is_empty() || needle.len() > hay.len() {
        return None;
    }
    let last = from.min(hay.len() - needle.len());
    (0..=last).rev().find(|&i| hay[i..].starts_with(needle))
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// What a keystroke means to an open search.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum SearchKey {
    /// Right or Down arrow.
    Next,
    /// Left or Up arrow.
    Previous,
    /// The query changed (or any other key).
    Edit,
    /// Enter or Escape.
    Finish,
}

/// State of one open search prompt.
#[derive(Debug, Clone)]
pub struct SearchSession {
    anchor_line: usize,
    /// Rendered column the next scan starts from. Negative after a backward
    /// match at the start of a row.
    anchor_col: isize,
    direction: SearchDirection,
    saved: Option<(usize, Vec<Highlight>)>,
    origin: (Position, Viewport),
}

impl SearchSession {
    /// Open a session with the cursor at `cursor` (rendered column `rx`)
    /// and the window at `viewport`.
    #[must_use]
    pub fn start(cursor: Position, rx: usize, viewport: Viewport) -> Self {
        Self {
            anchor_line: cursor.line,
            anchor_col: to_signed(rx),
            direction: SearchDirection::Forward,
            saved: None,
            origin: (cursor, viewport),
        }
    }

    /// Cursor and window at the time the session opened.
    #[must_use]
    pub const fn origin(&self) -> (Position, Viewport) {
        self.origin
    }

    #[must_use]
    pub const fn direction(&self) -> SearchDirection {
        self.direction
    }

    /// Process one keystroke.
    ///
    /// `cursor` and `rx` are the current cursor position and its rendered
    /// column. Returns where the cursor should go, or `None` if it stays.
    pub fn step(
        &mut self,
        doc: &mut Document,
        query: &[u8],
        key: SearchKey,
        cursor: Position,
        rx: usize,
    ) -> Option<Position> {
        if key == SearchKey::Finish || query.is_empty() {
            self.restore(doc);
            self.reset_anchor(cursor, rx);
            return None;
        }

        let mut switched = false;
        match key {
            SearchKey::Next | SearchKey::Previous => {
                let wanted = if key == SearchKey::Next {
                    SearchDirection::Forward
                } else {
                    SearchDirection::Backward
                };
                switched = wanted == self.direction.opposite();
                self.direction = wanted;
            }
            SearchKey::Edit | SearchKey::Finish => self.reset_anchor(cursor, rx),
        }

        self.restore(doc);

        let Some(found) = self.scan(doc, query, switched) else {
            debug!("search: no match for {:?}", String::from_utf8_lossy(query));
            return None;
        };

        self.anchor_line = found.line;
        self.anchor_col = match self.direction {
            SearchDirection::Forward => to_signed(found.rx + found.len),
            SearchDirection::Backward => to_signed(found.rx) - to_signed(found.len),
        };
        self.saved = doc
            .overlay_highlight(found.line, found.rx, found.len, Highlight::SearchMatch)
            .map(|tags| (found.line, tags));

        Some(Position::new(found.line, doc.rx_to_cx(found.line, found.rx)))
    }

    /// Put back the tags under the current match, if any.
    pub fn restore(&mut self, doc: &mut Document) {
        if let Some((line, tags)) = self.saved.take() {
            doc.restore_highlight(line, tags);
        }
    }

    fn reset_anchor(&mut self, cursor: Position, rx: usize) {
        self.anchor_line = cursor.line;
        self.anchor_col = to_signed(rx);
        self.direction = SearchDirection::Forward;
    }

    /// Visit at most every row once, starting at the anchor.
    fn scan(&self, doc: &Document, query: &[u8], switched: bool) -> Option<Match> {
        let rows = doc.len();
        if rows == 0 {
            return None;
        }
        let len = query.len();
        let mut line = if self.anchor_line < rows { self.anchor_line } else { 0 };
        let mut col = self.anchor_col;
        if switched {
            let skip = to_signed(len) * 2;
            col += match self.direction {
                SearchDirection::Forward => skip,
                SearchDirection::Backward => -skip,
            };
        }

        for _ in 0..rows {
            let rendered = doc.row(line).map_or(&[][..], |r| r.rendered());
            let hit = match self.direction {
                SearchDirection::Forward => {
                    find_forward(rendered, query, usize::try_from(col).unwrap_or(0))
                }
                SearchDirection::Backward => usize::try_from(col)
                    .ok()
                    .and_then(|from| find_backward(rendered, query, from)),
            };
            if let Some(rx) = hit {
                return Some(Match { line, rx, len });
            }

            match self.direction {
                SearchDirection::Forward => {
                    line = (line + 1) % rows;
                    col = 0;
                }
                SearchDirection::Backward => {
                    line = (line + rows - 1) % rows;
                    col = to_signed(doc.row(line).map_or(0, |r| r.rendered().len()))
                        - to_signed(len);
                }
            }
        }
        None
    }
}

fn to_signed(n: usize) -> isize {
    isize::try_from(n).unwrap_or(isize::MAX)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
