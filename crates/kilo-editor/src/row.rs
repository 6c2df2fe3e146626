//! Rows: one logical line and everything derived from it.
//!
//! A [`Row`] owns its raw bytes (the file content, no newline) and two
//! derived views of them:
//!
//! - **rendered**: the raw bytes with every tab expanded to spaces up to the
//!   next tab stop. This is what the screen shows and what search scans.
//! - **highlight**: one [`Highlight`] tag per rendered byte.
//!
//! Both are pure functions of the raw bytes, the tab stop, the active
//! [`Syntax`] and one bit of context from the row above: whether that row
//! ended inside an unterminated multi-line comment. [`render`] and
//! [`highlight`] compute them; the [`Document`](crate::document::Document)
//! decides when to call them and handles the cascade to following rows.
//!
//! # Column spaces
//!
//! `cx` indexes raw bytes, `rx` indexes rendered bytes. They differ only
//! after a tab. [`Row::cx_to_rx`] and [`Row::rx_to_cx`] convert between
//! them using exactly the width rule [`render`] uses.

use crate::highlight::Highlight;
use crate::syntax::{Syntax, SyntaxFlags, is_separator};

// ---------------------------------------------------------------------------
// Derivation
// ---------------------------------------------------------------------------

/// Expand tabs in `raw` to spaces, aligning to multiples of `tab_stop`.
///
/// A tab always emits at least one space.
#[must_use]
pub fn render(raw: &[u8], tab_stop: usize) -> Vec<u8> {
    let tab_stop = tab_stop.max(1);
    let tabs = raw.iter().filter(|&&b| b == b'\t').count();
    let mut out = Vec::with_capacity(raw.len() + tabs * (tab_stop - 1));

    for &b in raw {
        if b == b'\t' {
            out.push(b' ');
            while out.len() % tab_stop != 0 {
                out.push(b' ');
            }
        } else {
            out.push(b);
        }
    }
    out
}

/// Classify every byte of `rendered` under `syntax`.
///
/// `in_comment` says whether the previous row ended inside a multi-line
/// comment. Returns the tags (same length as `rendered`) and whether this
/// row in turn ends inside one.
///
/// With no syntax every byte is [`Highlight::Normal`] and the row never
/// ends inside a comment.
#[must_use]
pub fn highlight(
    rendered: &[u8],
    syntax: Option<&Syntax>,
    in_comment: bool,
) -> (Vec<Highlight>, bool) {
    let mut hl = vec![Highlight::Normal; rendered.len()];
    let Some(syntax) = syntax else {
        return (hl, false);
    };

    let scs = syntax.singleline_comment.map(str::as_bytes);
    let mcs = syntax.multiline_comment.map(|(s, e)| (s.as_bytes(), e.as_bytes()));
    let numbers = syntax.flags.contains(SyntaxFlags::NUMBERS);
    let strings = syntax.flags.contains(SyntaxFlags::STRINGS);

    let mut prev_sep = true;
    let mut in_string: Option<u8> = None;
    let mut in_comment = in_comment;
    let mut i = 0;

    while i < rendered.len() {
        let c = rendered[i];
        let prev_hl = if i > 0 { hl[i - 1] } else { Highlight::Normal };
        let rest = &rendered[i..];

        if let Some(scs) = scs {
            if in_string.is_none() && !in_comment && !scs.is_empty() && rest.starts_with(scs) {
                hl[i..].fill(Highlight::Comment);
                break;
            }
        }

        if let Some((mcs, mce)) = mcs {
            if in_string.is_none() && !mcs.is_empty() && !mce.is_empty() {
                if in_comment {
                    hl[i] = Highlight::BlockComment;
                    if rest.starts_with(mce) {
                        hl[i..i + mce.len()].fill(Highlight::BlockComment);
                        i += mce.len();
                        in_comment = false;
                        prev_sep = true;
                    } else {
                        i += 1;
                    }
                    continue;
                } else if rest.starts_with(mcs) {
                    hl[i..i + mcs.len()].fill(Highlight::BlockComment);
                    i += mcs.len();
                    in_comment = true;
                    continue;
                }
            }
        }

        if strings {
            if let Some(quote) = in_string {
                hl[i] = Highlight::String;
                if c == b'\\' && i + 1 < rendered.len() {
                    hl[i + 1] = Highlight::String;
                    i += 2;
                    continue;
                }
                if c == quote {
                    in_string = None;
                }
                i += 1;
                prev_sep = true;
                continue;
            } else if c == b'"' || c == b'\'' {
                in_string = Some(c);
                hl[i] = Highlight::String;
                i += 1;
                continue;
            }
        }

        if numbers
            && ((c.is_ascii_digit() && (prev_sep || prev_hl == Highlight::Number))
                || (c == b'.' && prev_hl == Highlight::Number))
        {
            hl[i] = Highlight::Number;
            i += 1;
            prev_sep = false;
            continue;
        }

        if prev_sep {
            if let Some((len, tag)) = keyword_at(rendered, i, syntax) {
                hl[i..i + len].fill(tag);
                i += len;
                prev_sep = false;
                continue;
            }
        }

        prev_sep = is_separator(c);
        i += 1;
    }

    (hl, in_comment)
}

/// Longest keyword starting at `at` and followed by a separator or the end
/// of the row.
fn keyword_at(rendered: &[u8], at: usize, syntax: &Syntax) -> Option<(usize, Highlight)> {
    let rest = &rendered[at..];
    syntax
        .keyword_classes()
        .filter(|(word, _)| {
            !word.is_empty()
                && rest.starts_with(word)
                && rest.get(word.len()).is_none_or(|&b| is_separator(b))
        })
        .max_by_key(|(word, _)| word.len())
        .map(|(word, is_type)| {
            let tag = if is_type {
                Highlight::Keyword2
            } else {
                Highlight::Keyword1
            };
            (word.len(), tag)
        })
}

// ---------------------------------------------------------------------------
// Row
// ---------------------------------------------------------------------------

/// One logical line of a document.
///
/// Invariant: `highlight.len() == rendered.len()`. Only the owning
/// document mutates a row, and it re-derives both views after every change
/// to `raw`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    index: usize,
    raw: Vec<u8>,
    rendered: Vec<u8>,
    highlight: Vec<Highlight>,
    open_comment: bool,
}

impl Row {
    /// A row at `index` holding `raw`, rendered with `tab_stop` but not yet
    /// highlighted (all tags Normal).
    #[must_use]
    pub fn new(index: usize, raw: Vec<u8>, tab_stop: usize) -> Self {
        let rendered = render(&raw, tab_stop);
        let highlight = vec![Highlight::Normal; rendered.len()];
        Self {
            index,
            raw,
            rendered,
            highlight,
            open_comment: false,
        }
    }

    /// Position of this row in its document.
    #[inline]
    #[must_use]
    pub const fn index(&self) -> usize {
        self.index
    }

    /// Raw bytes (file content, no newline).
    #[inline]
    #[must_use]
    pub fn raw(&self) -> &[u8] {
        &self.raw
    }

    /// Length of the raw bytes: the largest valid `cx`.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.raw.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    /// Tab-expanded bytes.
    #[inline]
    #[must_use]
    pub fn rendered(&self) -> &[u8] {
        &self.rendered
    }

    /// One tag per rendered byte.
    #[inline]
    #[must_use]
    pub fn highlight(&self) -> &[Highlight] {
        &self.highlight
    }

    /// Whether this row ends inside an unterminated multi-line comment.
    #[inline]
    #[must_use]
    pub const fn open_comment(&self) -> bool {
        self.open_comment
    }

    /// Number of leading spaces in the rendered text (tabs count as the
    /// spaces they expand to).
    #[must_use]
    pub fn leading_spaces(&self) -> usize {
        self.rendered.iter().take_while(|&&b| b == b' ').count()
    }

    /// Convert a raw column to a rendered column.
    ///
    /// `cx` past the end is treated as the end.
    #[must_use]
    pub fn cx_to_rx(&self, cx: usize, tab_stop: usize) -> usize {
        let tab_stop = tab_stop.max(1);
        self.raw[..cx.min(self.raw.len())]
            .iter()
            .fold(0, |rx, &b| {
                if b == b'\t' {
                    rx + tab_stop - rx % tab_stop
                } else {
                    rx + 1
                }
            })
    }

    /// Convert a rendered column to a raw column.
    ///
    /// Returns the first raw index whose rendered width runs past `rx`, so a
    /// column inside a tab's expansion maps to the tab itself. Columns past
    /// the end map to the row length.
    #[must_use]
    pub fn rx_to_cx(&self, rx: usize, tab_stop: usize) -> usize {
        let tab_stop = tab_stop.max(1);
        let mut cur_rx = 0;
        for (cx, &b) in self.raw.iter().enumerate() {
            if b == b'\t' {
                cur_rx += tab_stop - 1 - cur_rx % tab_stop;
            }
            cur_rx += 1;
            if cur_rx > rx {
                return cx;
            }
        }
        self.raw.len()
    }

    // -- Crate-internal mutation ------------------------------------------

    pub(crate) const fn set_index(&mut self, index: usize) {
        self.index = index;
    }

    pub(crate) const fn set_open_comment(&mut self, open: bool) {
        self.open_comment = open;
    }

    pub(crate) const fn raw_mut(&mut self) -> &mut Vec<u8> {
        &mut self.raw
    }

    /// Recompute the rendered bytes from `raw`. Tags are reset to Normal
    /// until the next [`rehighlight`](Self::rehighlight).
    pub(crate) fn rerender(&mut self, tab_stop: usize) {
        self.rendered = render(&self.raw, tab_stop);
        self.highlight = vec![Highlight::Normal; self.rendered.len()];
    }

    /// Recompute the tags. Returns `true` if the open-comment flag flipped,
    /// meaning the next row must be re-highlighted too.
    pub(crate) fn rehighlight(&mut self, syntax: Option<&Syntax>, in_comment: bool) -> bool {
        let (hl, open) = highlight(&self.rendered, syntax, in_comment);
        self.highlight = hl;
        let changed = self.open_comment != open;
        self.open_comment = open;
        changed
    }

    /// Paint `tag` over `len` rendered bytes from `start`, returning the
    /// tags that were there. The span is clipped to the row.
    pub(crate) fn overlay(&mut self, start: usize, len: usize, tag: Highlight) -> Vec<Highlight> {
        let saved = self.highlight.clone();
        let start = start.min(self.highlight.len());
        let end = start.saturating_add(len).min(self.highlight.len());
        self.highlight[start..end].fill(tag);
        saved
    }

    /// Put back tags saved by [`overlay`](Self::overlay). Ignored if the row
    /// has changed length since.
    pub(crate) fn restore(&mut self, saved: Vec<Highlight>) -> bool {
        if saved.len() == self.highlight.len() {
            self.highlight = saved;
            true
        } else {
            false
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
