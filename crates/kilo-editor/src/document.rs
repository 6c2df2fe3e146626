//! Document: the ordered rows of one file.
//!
//! The `Document` owns every [`Row`] and is the only thing that mutates
//! them. Each edit touches the affected row's raw bytes, re-derives that
//! row's rendered text and tags, and then walks forward re-highlighting
//! following rows for as long as the "ends inside a block comment" flag keeps
//! changing. Typing inside a function body re-highlights one row; typing `/*`
//! re-highlights down to the next `*/`.
//!
//! # Bounds
//!
//! Every operation that takes an index tolerates a bad one: out-of-range rows
//! are ignored, columns past the end are clamped. Callers never need to
//! pre-check, and a stale cursor can never corrupt the row vector.
//!
//! # Persisted layout
//!
//! On disk a document is its raw rows, each followed by `\n`. Loading strips
//! the newline and any `\r` before it, so a file saved with no edits is
//! byte-for-byte the file that was opened, provided it used LF endings and
//! ended with a newline.

use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info};

use crate::error::{Error, Result};
use crate::highlight::Highlight;
use crate::position::Position;
use crate::row::Row;
use crate::syntax::{self, Syntax};

/// Tab stop used when none is configured.
pub const DEFAULT_TAB_STOP: usize = 8;

// ---------------------------------------------------------------------------
// Document
// ---------------------------------------------------------------------------

/// An in-memory file: rows, the active syntax and the unsaved-change count.
#[derive(Debug, Clone)]
pub struct Document {
    rows: Vec<Row>,
    syntax: Option<&'static Syntax>,
    dirty: usize,
    tab_stop: usize,
    path: Option<PathBuf>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new(DEFAULT_TAB_STOP)
    }
}

impl Document {
    /// An empty, unnamed document with no rows.
    #[must_use]
    pub fn new(tab_stop: usize) -> Self {
        Self {
            rows: Vec::new(),
            syntax: None,
            dirty: 0,
            tab_stop: tab_stop.max(1),
            path: None,
        }
    }

    /// A clean document holding `lines`, one row each.
    #[must_use]
    pub fn from_lines<I>(lines: I, tab_stop: usize) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Vec<u8>>,
    {
        let tab_stop = tab_stop.max(1);
        let rows = lines
            .into_iter()
            .enumerate()
            .map(|(i, line)| Row::new(i, line.into(), tab_stop))
            .collect();
        let mut doc = Self {
            rows,
            syntax: None,
            dirty: 0,
            tab_stop,
            path: None,
        };
        doc.rehighlight_all();
        doc
    }

    /// A clean document parsed from file content.
    #[must_use]
    pub fn from_bytes(content: &[u8], tab_stop: usize) -> Self {
        Self::from_lines(split_lines(content), tab_stop)
    }

    /// Load `path` and pick a syntax from its name.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the file cannot be read.
    pub fn open(path: &Path, tab_stop: usize) -> Result<Self> {
        let content = fs::read(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut doc = Self::from_bytes(&content, tab_stop);
        doc.path = Some(path.to_path_buf());
        doc.select_syntax_for_path();
        info!("opened {} ({} rows)", path.display(), doc.len());
        Ok(doc)
    }

    // -- Accessors ----------------------------------------------------------

    /// Number of rows.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Row `at`, if it exists.
    #[inline]
    #[must_use]
    pub fn row(&self, at: usize) -> Option<&Row> {
        self.rows.get(at)
    }

    /// All rows in order.
    #[inline]
    #[must_use]
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Raw length of row `at`, 0 when it does not exist.
    #[must_use]
    pub fn row_len(&self, at: usize) -> usize {
        self.rows.get(at).map_or(0, Row::len)
    }

    /// Mutations since load or the last save.
    #[inline]
    #[must_use]
    pub const fn dirty(&self) -> usize {
        self.dirty
    }

    #[inline]
    #[must_use]
    pub const fn is_dirty(&self) -> bool {
        self.dirty > 0
    }

    #[inline]
    #[must_use]
    pub const fn tab_stop(&self) -> usize {
        self.tab_stop
    }

    #[inline]
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Bind the document to a file name without touching the disk.
    pub fn set_path(&mut self, path: PathBuf) {
        self.path = Some(path);
        self.select_syntax_for_path();
    }

    #[inline]
    #[must_use]
    pub const fn syntax(&self) -> Option<&'static Syntax> {
        self.syntax
    }

    /// Name of the active syntax, if any.
    #[must_use]
    pub fn filetype(&self) -> Option<&'static str> {
        self.syntax.map(|s| s.filetype)
    }

    // -- Syntax -------------------------------------------------------------

    /// Choose the rule set for `filename` and re-highlight every row.
    pub fn select_syntax(&mut self, filename: &str) {
        self.set_syntax(syntax::select(filename));
    }

    /// Replace the rule set and re-highlight every row.
    pub fn set_syntax(&mut self, syntax: Option<&'static Syntax>) {
        debug!("syntax: {}", syntax.map_or("none", |s| s.filetype));
        self.syntax = syntax;
        self.rehighlight_all();
    }

    fn select_syntax_for_path(&mut self) {
        let name = self
            .path
            .as_deref()
            .map(|p| p.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.select_syntax(&name);
    }

    // -- Coordinates --------------------------------------------------------

    /// Rendered column of `pos`. Positions past the last row map to 0.
    #[must_use]
    pub fn cx_to_rx(&self, pos: Position) -> usize {
        self.rows
            .get(pos.line)
            .map_or(0, |row| row.cx_to_rx(pos.col, self.tab_stop))
    }

    /// Raw column for rendered column `rx` on `line`.
    #[must_use]
    pub fn rx_to_cx(&self, line: usize, rx: usize) -> usize {
        self.rows
            .get(line)
            .map_or(0, |row| row.rx_to_cx(rx, self.tab_stop))
    }

    // -- Row lifecycle ------------------------------------------------------

    /// Insert a row at `at` holding `leading_padding` spaces then `content`.
    ///
    /// `at == len()` appends. Anything larger is ignored.
    pub fn insert_row(&mut self, at: usize, content: &[u8], leading_padding: usize) {
        if at > self.rows.len() {
            return;
        }
        let mut raw = Vec::with_capacity(leading_padding + content.len());
        raw.resize(leading_padding, b' ');
        raw.extend_from_slice(content);

        // Seed with the state the displaced row inherited.
        let mut row = Row::new(at, raw, self.tab_stop);
        row.set_open_comment(at > 0 && self.rows[at - 1].open_comment());
        self.rows.insert(at, row);
        self.renumber_from(at + 1);
        self.rehighlight_from(at);
        self.dirty += 1;
    }

    /// Remove row `at`. Out-of-range indices are ignored.
    pub fn delete_row(&mut self, at: usize) {
        if at >= self.rows.len() {
            return;
        }
        self.rows.remove(at);
        self.renumber_from(at);
        // The row that moved up now inherits from a different predecessor.
        self.rehighlight_from(at);
        self.dirty += 1;
    }

    /// Insert `byte` at `pos` and return the cursor just after it.
    ///
    /// On the virtual line past the end an empty row is appended first.
    /// Columns past the end of the row insert at the end.
    pub fn insert_char_at(&mut self, pos: Position, byte: u8) -> Position {
        if pos.line > self.rows.len() {
            return pos;
        }
        if pos.line == self.rows.len() {
            self.insert_row(pos.line, b"", 0);
        }
        let row = &mut self.rows[pos.line];
        let at = pos.col.min(row.len());
        row.raw_mut().insert(at, byte);
        self.update_row(pos.line);
        self.dirty += 1;
        Position::new(pos.line, at + 1)
    }

    /// Backspace at `pos` and return the new cursor.
    ///
    /// Deletes the byte before the cursor, or at column 0 joins the row onto
    /// the end of the previous one. Returns `None` when there is nothing to
    /// delete: the start of the document or the virtual line past the end.
    pub fn delete_char_before(&mut self, pos: Position) -> Option<Position> {
        if pos.line >= self.rows.len() {
            return None;
        }
        let col = pos.col.min(self.rows[pos.line].len());
        if col == 0 && pos.line == 0 {
            return None;
        }

        if col > 0 {
            self.rows[pos.line].raw_mut().remove(col - 1);
            self.update_row(pos.line);
            self.dirty += 1;
            return Some(Position::new(pos.line, col - 1));
        }

        // Merge into the previous row. The row that moves up used to inherit
        // from `removed` and now inherits from the survivor.
        let removed = self.rows.remove(pos.line);
        self.renumber_from(pos.line);
        let prev = pos.line - 1;
        let join_col = self.rows[prev].len();
        self.rows[prev].raw_mut().extend_from_slice(removed.raw());
        self.update_row(prev);
        if removed.open_comment() != self.rows[prev].open_comment() {
            self.rehighlight_from(pos.line);
        }
        self.dirty += 1;
        Some(Position::new(prev, join_col))
    }

    /// Break the row at `pos` and return the cursor on the new line.
    ///
    /// With `auto_indent` the new line starts with as many spaces as the
    /// current row's rendered indentation. At column 0 the padded blank row
    /// goes above and the current row moves down untouched; otherwise the
    /// tail from `pos.col` moves to a new row below.
    pub fn split_at(&mut self, pos: Position, auto_indent: bool) -> Position {
        if pos.line > self.rows.len() {
            return pos;
        }
        if pos.line == self.rows.len() {
            self.insert_row(pos.line, b"", 0);
            return Position::new(pos.line + 1, 0);
        }

        let row = &self.rows[pos.line];
        let padding = if auto_indent { row.leading_spaces() } else { 0 };
        let col = pos.col.min(row.len());

        if col == 0 {
            self.insert_row(pos.line, b"", padding);
        } else {
            let tail = row.raw()[col..].to_vec();
            self.insert_row(pos.line + 1, &tail, padding);
            self.rows[pos.line].raw_mut().truncate(col);
            self.update_row(pos.line);
        }
        Position::new(pos.line + 1, padding)
    }

    // -- Highlight overlay --------------------------------------------------

    /// Paint `tag` over `len` rendered bytes of row `line` from `start`.
    ///
    /// Returns the row's previous tags for [`restore_highlight`]
    /// (`None` if the row does not exist).
    ///
    /// [`restore_highlight`]: Self::restore_highlight
    pub fn overlay_highlight(
        &mut self,
        line: usize,
        start: usize,
        len: usize,
        tag: Highlight,
    ) -> Option<Vec<Highlight>> {
        self.rows
            .get_mut(line)
            .map(|row| row.overlay(start, len, tag))
    }

    /// Put back tags saved by [`overlay_highlight`](Self::overlay_highlight).
    ///
    /// Ignored if the row is gone or its length changed.
    pub fn restore_highlight(&mut self, line: usize, saved: Vec<Highlight>) {
        if let Some(row) = self.rows.get_mut(line) {
            if !row.restore(saved) {
                debug!("stale highlight snapshot for row {line} dropped");
            }
        }
    }

    // -- Persistence --------------------------------------------------------

    /// Every row's raw bytes followed by `\n`.
    #[must_use]
    pub fn to_flat_text(&self) -> Vec<u8> {
        let total = self.rows.iter().map(|r| r.len() + 1).sum();
        let mut out = Vec::with_capacity(total);
        for row in &self.rows {
            out.extend_from_slice(row.raw());
            out.push(b'\n');
        }
        out
    }

    /// Write to the bound path. Returns the number of bytes written.
    ///
    /// # Errors
    ///
    /// [`Error::NoPath`] if the document has no file name, [`Error::Io`] if
    /// the write fails. The dirty count is kept on failure.
    pub fn save(&mut self) -> Result<usize> {
        let path = self.path.clone().ok_or(Error::NoPath)?;
        self.write_to(&path)
    }

    /// Bind to `path`, pick a syntax for it, and write.
    ///
    /// # Errors
    ///
    /// [`Error::Io`] if the write fails.
    pub fn save_as(&mut self, path: &Path) -> Result<usize> {
        self.set_path(path.to_path_buf());
        self.write_to(path)
    }

    fn write_to(&mut self, path: &Path) -> Result<usize> {
        let content = self.to_flat_text();
        fs::write(path, &content).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        self.dirty = 0;
        info!("wrote {} bytes to {}", content.len(), path.display());
        Ok(content.len())
    }

    // -- Derivation ---------------------------------------------------------

    /// Re-render row `at` after its raw bytes changed, then re-highlight it
    /// and whatever follows it.
    fn update_row(&mut self, at: usize) {
        if let Some(row) = self.rows.get_mut(at) {
            row.rerender(self.tab_stop);
            self.rehighlight_from(at);
        }
    }

    /// Re-highlight from `start`, continuing while the open-comment flag
    /// keeps flipping.
    fn rehighlight_from(&mut self, start: usize) {
        let mut at = start;
        while at < self.rows.len() {
            let inherited = at > 0 && self.rows[at - 1].open_comment();
            let flipped = self.rows[at].rehighlight(self.syntax, inherited);
            if !flipped {
                break;
            }
            at += 1;
        }
    }

    fn rehighlight_all(&mut self) {
        let mut inherited = false;
        for row in &mut self.rows {
            row.rehighlight(self.syntax, inherited);
            inherited = row.open_comment();
        }
    }

    fn renumber_from(&mut self, start: usize) {
        for (i, row) in self.rows.iter_mut().enumerate().skip(start) {
            row.set_index(i);
        }
    }
}

// ---------------------------------------------------------------------------
// Line splitting
// ---------------------------------------------------------------------------

/// Split file content into raw rows.
///
/// Splits on `\n` and strips trailing `\r`s from each line. A final newline
/// does not start an extra empty row.
#[must_use]
pub fn split_lines(content: &[u8]) -> Vec<Vec<u8>> {
    if content.is_empty() {
        return Vec::new();
    }
    let body = content.strip_suffix(b"\n").unwrap_or(content);
    body.split(|&b| b == b'\n')
        .map(|line| {
            let end = line.iter().rposition(|&b| b != b'\r').map_or(0, |i| i + 1);
            line[..end].to_vec()
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    use crate::highlight::Highlight::{BlockComment as B, Keyword1 as K1, Normal as N};

    fn doc(lines: &[&str]) -> Document {
        Document::from_lines(lines.iter().map(|l| l.as_bytes().to_vec()), 8)
    }

    fn c_doc(lines: &[&str]) -> Document {
        let mut d = doc(lines);
        d.select_syntax("test.c");
        d
    }

    fn texts(d: &Document) -> Vec<String> {
        d.rows()
            .iter()
            .map(|r| String::from_utf8_lossy(r.raw()).into_owned())
            .collect()
    }

    fn assert_indices(d: &Document) {
        for (i, row) in d.rows().iter().enumerate() {
            assert_eq!(row.index(), i);
            assert_eq!(row.highlight().len(), row.rendered().len());
        }
    }

    // ── split_lines ───────────────────────────────────────────────────────

    #[test]
    fn split_lines_basic() {
        assert_eq!(split_lines(b"a\nb\n"), vec![b"a".to_vec(), b"b".to_vec()]);
    }

    #[test]
    fn split_lines_no_trailing_newline() {
        assert_eq!(split_lines(b"a\nb"), vec![b"a".to_vec(), b"b".to_vec()]);
    }

    #[test]
    fn split_lines_strips_carriage_returns() {
        assert_eq!(split_lines(b"a\r\nb\r\r\n"), vec![b"a".to_vec(), b"b".to_vec()]);
    }

    #[test]
    fn split_lines_keeps_blank_rows() {
        assert_eq!(
            split_lines(b"\n\nx\n"),
            vec![Vec::new(), Vec::new(), b"x".to_vec()]
        );
    }

    #[test]
    fn split_lines_empty_file() {
        assert!(split_lines(b"").is_empty());
    }

    // ── construction ──────────────────────────────────────────────────────

    #[test]
    fn from_lines_is_clean() {
        let d = doc(&["a", "b"]);
        assert_eq!(d.len(), 2);
        assert!(!d.is_dirty());
        assert_indices(&d);
    }

    #[test]
    fn new_document_is_empty() {
        let d = Document::default();
        assert!(d.is_empty());
        assert_eq!(d.tab_stop(), DEFAULT_TAB_STOP);
        assert!(d.path().is_none());
        assert!(d.filetype().is_none());
    }

    // ── insert_row / delete_row ───────────────────────────────────────────

    #[test]
    fn insert_row_renumbers_and_dirties() {
        let mut d = doc(&["a", "c"]);
        d.insert_row(1, b"b", 0);
        assert_eq!(texts(&d), vec!["a", "b", "c"]);
        assert_eq!(d.dirty(), 1);
        assert_indices(&d);
    }

    #[test]
    fn insert_row_with_padding() {
        let mut d = doc(&[]);
        d.insert_row(0, b"x", 3);
        assert_eq!(texts(&d), vec!["   x"]);
    }

    #[test]
    fn insert_row_past_end_is_ignored() {
        let mut d = doc(&["a"]);
        d.insert_row(5, b"x", 0);
        assert_eq!(texts(&d), vec!["a"]);
        assert!(!d.is_dirty());
    }

    #[test]
    fn delete_row_renumbers() {
        let mut d = doc(&["a", "b", "c"]);
        d.delete_row(0);
        assert_eq!(texts(&d), vec!["b", "c"]);
        assert_indices(&d);
        assert_eq!(d.dirty(), 1);
    }

    #[test]
    fn delete_row_out_of_range_is_ignored() {
        let mut d = doc(&["a"]);
        d.delete_row(1);
        assert_eq!(d.len(), 1);
        assert!(!d.is_dirty());
    }

    // ── insert_char_at ────────────────────────────────────────────────────

    #[test]
    fn insert_char_in_middle() {
        let mut d = doc(&["ac"]);
        let cur = d.insert_char_at(Position::new(0, 1), b'b');
        assert_eq!(texts(&d), vec!["abc"]);
        assert_eq!(cur, Position::new(0, 2));
    }

    #[test]
    fn insert_char_on_virtual_line_appends_row() {
        let mut d = doc(&["a"]);
        let cur = d.insert_char_at(Position::new(1, 0), b'z');
        assert_eq!(texts(&d), vec!["a", "z"]);
        assert_eq!(cur, Position::new(1, 1));
        assert_indices(&d);
    }

    #[test]
    fn insert_char_clamps_column() {
        let mut d = doc(&["ab"]);
        let cur = d.insert_char_at(Position::new(0, 10), b'c');
        assert_eq!(texts(&d), vec!["abc"]);
        assert_eq!(cur, Position::new(0, 3));
    }

    #[test]
    fn insert_char_beyond_virtual_line_is_ignored() {
        let mut d = doc(&["a"]);
        let cur = d.insert_char_at(Position::new(3, 0), b'z');
        assert_eq!(texts(&d), vec!["a"]);
        assert_eq!(cur, Position::new(3, 0));
    }

    #[test]
    fn insert_tab_updates_rendered() {
        let mut d = doc(&["ab"]);
        d.insert_char_at(Position::new(0, 1), b'\t');
        assert_eq!(d.row(0).unwrap().rendered(), b"a       b");
        assert_eq!(d.cx_to_rx(Position::new(0, 2)), 8);
        assert_eq!(d.rx_to_cx(0, 8), 2);
    }

    // ── delete_char_before ────────────────────────────────────────────────

    #[test]
    fn backspace_in_row() {
        let mut d = doc(&["abc"]);
        let cur = d.delete_char_before(Position::new(0, 2));
        assert_eq!(cur, Some(Position::new(0, 1)));
        assert_eq!(texts(&d), vec!["ac"]);
    }

    #[test]
    fn backspace_at_start_merges() {
        let mut d = doc(&["ab", "cd"]);
        let cur = d.delete_char_before(Position::new(1, 0));
        assert_eq!(cur, Some(Position::new(0, 2)));
        assert_eq!(texts(&d), vec!["abcd"]);
        assert_indices(&d);
    }

    #[test]
    fn backspace_at_origin_is_noop() {
        let mut d = doc(&["ab"]);
        assert_eq!(d.delete_char_before(Position::ZERO), None);
        assert!(!d.is_dirty());
    }

    #[test]
    fn backspace_on_virtual_line_is_noop() {
        let mut d = doc(&["ab"]);
        assert_eq!(d.delete_char_before(Position::new(1, 0)), None);
        assert_eq!(texts(&d), vec!["ab"]);
    }

    #[test]
    fn backspace_with_column_past_end_deletes_last_byte() {
        let mut d = doc(&["ab"]);
        let cur = d.delete_char_before(Position::new(0, 9));
        assert_eq!(cur, Some(Position::new(0, 1)));
        assert_eq!(texts(&d), vec!["a"]);
    }

    // ── split_at ──────────────────────────────────────────────────────────

    #[test]
    fn split_in_middle() {
        let mut d = doc(&["hello world"]);
        let cur = d.split_at(Position::new(0, 5), false);
        assert_eq!(texts(&d), vec!["hello", " world"]);
        assert_eq!(cur, Position::new(1, 0));
        assert_indices(&d);
    }

    #[test]
    fn split_at_end_makes_empty_row() {
        let mut d = doc(&["ab"]);
        let cur = d.split_at(Position::new(0, 2), false);
        assert_eq!(texts(&d), vec!["ab", ""]);
        assert_eq!(cur, Position::new(1, 0));
    }

    #[test]
    fn split_with_auto_indent() {
        let mut d = doc(&["  xy"]);
        let cur = d.split_at(Position::new(0, 4), true);
        assert_eq!(texts(&d), vec!["  xy", "  "]);
        assert_eq!(cur, Position::new(1, 2));
    }

    #[test]
    fn split_at_column_zero_pads_the_row_above() {
        let mut d = doc(&["  xy"]);
        let cur = d.split_at(Position::new(0, 0), true);
        assert_eq!(texts(&d), vec!["  ", "  xy"]);
        assert_eq!(cur, Position::new(1, 2));
    }

    #[test]
    fn split_auto_indent_counts_tabs_as_spaces() {
        let mut d = Document::from_lines([b"\tx".to_vec()], 4);
        let cur = d.split_at(Position::new(0, 2), true);
        assert_eq!(d.row(1).unwrap().raw(), b"    ");
        assert_eq!(cur, Position::new(1, 4));
    }

    #[test]
    fn split_on_virtual_line_appends() {
        let mut d = doc(&["a"]);
        let cur = d.split_at(Position::new(1, 0), true);
        assert_eq!(texts(&d), vec!["a", ""]);
        assert_eq!(cur, Position::new(2, 0));
    }

    // ── comment cascade ───────────────────────────────────────────────────

    #[test]
    fn opening_comment_cascades_down() {
        let mut d = c_doc(&["x", "if", "y */ if", "if"]);
        assert_eq!(d.row(1).unwrap().highlight(), &[K1, K1]);

        d.insert_char_at(Position::new(0, 1), b'/');
        d.insert_char_at(Position::new(0, 2), b'*');

        assert!(d.row(0).unwrap().open_comment());
        assert_eq!(d.row(1).unwrap().highlight(), &[B, B]);
        assert_eq!(d.row(2).unwrap().highlight()[..4].to_vec(), vec![B; 4]);
        assert_eq!(d.row(2).unwrap().highlight()[5..].to_vec(), vec![K1, K1]);
        assert!(!d.row(2).unwrap().open_comment());
        assert_eq!(d.row(3).unwrap().highlight(), &[K1, K1]);
    }

    #[test]
    fn removing_comment_opener_restores_rows() {
        let mut d = c_doc(&["x/*", "if", "if"]);
        assert_eq!(d.row(2).unwrap().highlight(), &[B, B]);

        d.delete_char_before(Position::new(0, 3));
        assert_eq!(d.row(1).unwrap().highlight(), &[K1, K1]);
        assert_eq!(d.row(2).unwrap().highlight(), &[K1, K1]);
    }

    #[test]
    fn deleting_closing_row_reopens_following_rows() {
        let mut d = c_doc(&["/*", "*/", "if"]);
        assert_eq!(d.row(2).unwrap().highlight(), &[K1, K1]);
        d.delete_row(1);
        assert_eq!(d.row(1).unwrap().highlight(), &[B, B]);
        assert!(d.row(1).unwrap().open_comment());
    }

    #[test]
    fn inserting_row_inside_comment_highlights_it() {
        let mut d = c_doc(&["/*", "*/"]);
        d.insert_row(1, b"if", 0);
        assert_eq!(d.row(1).unwrap().highlight(), &[B, B]);
        assert_eq!(d.row(2).unwrap().highlight(), &[B, B]);
        assert!(!d.row(2).unwrap().open_comment());
    }

    #[test]
    fn inserting_closing_row_ends_comment() {
        let mut d = c_doc(&["/*", "if"]);
        assert_eq!(d.row(1).unwrap().highlight(), &[B, B]);
        d.insert_row(1, b"*/", 0);
        assert_eq!(d.row(2).unwrap().highlight(), &[K1, K1]);
    }

    #[test]
    fn split_inside_comment_keeps_tail_commented() {
        let mut d = c_doc(&["/* x */ if"]);
        d.split_at(Position::new(0, 3), false);
        assert_eq!(d.row(1).unwrap().highlight()[..4].to_vec(), vec![B; 4]);
        assert_eq!(d.row(1).unwrap().highlight()[5..].to_vec(), vec![K1, K1]);
        assert!(d.row(0).unwrap().open_comment());
        assert!(!d.row(1).unwrap().open_comment());
    }

    #[test]
    fn merge_carries_comment_state() {
        let mut d = c_doc(&["a /*", "b", "c"]);
        d.delete_char_before(Position::new(1, 0));
        assert_eq!(texts(&d), vec!["a /*b", "c"]);
        assert_eq!(d.row(1).unwrap().highlight(), &[B]);
    }

    #[test]
    fn merge_into_line_comment_closes_following_rows() {
        let mut d = c_doc(&["a //", "/*", "if"]);
        assert!(d.row(1).unwrap().open_comment());
        assert_eq!(d.row(2).unwrap().highlight(), &[B, B]);

        d.delete_char_before(Position::new(1, 0));
        let fresh = c_doc(&["a ///*", "if"]);
        assert_eq!(texts(&d), texts(&fresh));
        assert_eq!(d.row(1).unwrap().highlight(), &[K1, K1]);
        assert!(!d.row(0).unwrap().open_comment());
        assert!(!d.row(1).unwrap().open_comment());
        assert_eq!(d.row(1).unwrap().highlight(), fresh.row(1).unwrap().highlight());
    }

    #[test]
    fn merge_into_open_string_closes_following_rows() {
        let mut d = c_doc(&["\"abc", "/*", "if"]);
        d.delete_char_before(Position::new(1, 0));
        let fresh = c_doc(&["\"abc/*", "if"]);
        assert_eq!(d.row(1).unwrap().highlight(), &[K1, K1]);
        assert!(!d.row(1).unwrap().open_comment());
        assert_eq!(d.row(0).unwrap().highlight(), fresh.row(0).unwrap().highlight());
        assert_indices(&d);
    }

    #[test]
    fn select_syntax_rehighlights_everything() {
        let mut d = doc(&["if"]);
        assert_eq!(d.row(0).unwrap().highlight(), &[N, N]);
        d.select_syntax("a.c");
        assert_eq!(d.filetype(), Some("c"));
        assert_eq!(d.row(0).unwrap().highlight(), &[K1, K1]);
        d.select_syntax("notes.txt");
        assert_eq!(d.row(0).unwrap().highlight(), &[N, N]);
    }

    // ── overlay ───────────────────────────────────────────────────────────

    #[test]
    fn overlay_round_trip() {
        let mut d = c_doc(&["if x"]);
        let before = d.row(0).unwrap().highlight().to_vec();
        let saved = d.overlay_highlight(0, 0, 2, Highlight::SearchMatch).unwrap();
        assert_eq!(d.row(0).unwrap().highlight()[0], Highlight::SearchMatch);
        d.restore_highlight(0, saved);
        assert_eq!(d.row(0).unwrap().highlight(), before.as_slice());
    }

    #[test]
    fn overlay_missing_row_is_none() {
        let mut d = doc(&["a"]);
        assert!(d.overlay_highlight(4, 0, 1, Highlight::SearchMatch).is_none());
    }

    // ── persistence ───────────────────────────────────────────────────────

    #[test]
    fn flat_text_terminates_every_row() {
        assert_eq!(doc(&["a", "", "b"]).to_flat_text(), b"a\n\nb\n");
        assert_eq!(doc(&[]).to_flat_text(), b"");
    }

    #[test]
    fn save_without_path_is_no_path_error() {
        let mut d = doc(&["a"]);
        assert!(matches!(d.save(), Err(Error::NoPath)));
    }

    #[test]
    fn save_and_open_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("main.c");

        let mut d = doc(&["int main() {", "\treturn 0;", "}"]);
        d.insert_row(0, b"/* hi */", 0);
        assert!(d.is_dirty());

        let written = d.save_as(&path).unwrap();
        assert_eq!(written, fs::metadata(&path).unwrap().len() as usize);
        assert!(!d.is_dirty());
        assert_eq!(d.filetype(), Some("c"));

        let loaded = Document::open(&path, 8).unwrap();
        assert_eq!(texts(&loaded), texts(&d));
        assert_eq!(loaded.filetype(), Some("c"));
        assert!(!loaded.is_dirty());
    }

    #[test]
    fn open_then_save_is_byte_identical() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        let original = b"first\n\n\tindented\nlast\n";
        fs::write(&path, original).unwrap();

        let mut d = Document::open(&path, 8).unwrap();
        d.save().unwrap();
        assert_eq!(fs::read(&path).unwrap(), original);
    }

    #[test]
    fn open_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = Document::open(&dir.path().join("nope"), 8).unwrap_err();
        assert_eq!(
            err.io_source().map(std::io::Error::kind),
            Some(std::io::ErrorKind::NotFound)
        );
    }

    #[test]
    fn failed_save_keeps_dirty_count() {
        let dir = tempfile::tempdir().unwrap();
        let mut d = doc(&["a"]);
        d.insert_row(1, b"b", 0);
        let bad = dir.path().join("missing").join("x.txt");
        assert!(matches!(d.save_as(&bad), Err(Error::Io { .. })));
        assert_eq!(d.dirty(), 1);
    }
}
