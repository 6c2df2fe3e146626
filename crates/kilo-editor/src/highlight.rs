//! Highlight tags: the per-byte classification of rendered text.
//!
//! Every byte of a row's rendered text carries exactly one [`Highlight`].
//! The render pass turns tags into terminal colors with [`Highlight::color`];
//! nothing else about presentation lives in the document model.

use kilo_term::color::Color;

/// Syntax class of one rendered byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Highlight {
    #[default]
    Normal,
    /// Single-line comment, through end of row.
    Comment,
    /// Inside (or delimiting) a multi-line comment.
    BlockComment,
    /// Control-flow and declaration keywords.
    Keyword1,
    /// Type-like keywords (marked with a trailing `|` in the rule set).
    Keyword2,
    String,
    Number,
    /// Transient overlay painted by the search session.
    SearchMatch,
}

impl Highlight {
    /// Display color for this tag.
    #[must_use]
    pub const fn color(self) -> Color {
        match self {
            Self::Comment | Self::BlockComment => Color::Cyan,
            Self::Keyword1 => Color::Yellow,
            Self::Keyword2 => Color::Green,
            Self::String => Color::Magenta,
            Self::Number => Color::Red,
            Self::SearchMatch => Color::Blue,
            Self::Normal => Color::Default,
        }
    }
}
