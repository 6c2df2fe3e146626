//! Prompt: a one-line input on the message bar.
//!
//! Used for "Save as" and for search. The prompt only edits its own text;
//! the owner decides what each [`PromptEvent`] means. Every key is reported,
//! including ones the prompt ignores, so search can react to arrows.

use kilo_term::input::{KeyCode, KeyEvent, Modifiers};

/// What the prompt is asking for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptKind {
    SaveAs,
    Search,
}

impl PromptKind {
    /// Message-bar text around the current input.
    fn format(self, input: &str) -> String {
        match self {
            Self::SaveAs => format!("Save as: {input} (ESC to cancel)"),
            Self::Search => format!("Search: {input} (ESC/Arrows/Enter)"),
        }
    }
}

/// Result of feeding one key to a [`Prompt`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptEvent {
    /// The input text changed.
    Edited,
    /// The key did not change the input.
    Unchanged,
    /// Escape: the prompt is over and its input is discarded.
    Cancelled,
    /// Enter on non-empty input: the prompt is over.
    Submitted(String),
}

/// An open prompt and its input so far.
#[derive(Debug, Clone)]
pub struct Prompt {
    kind: PromptKind,
    input: String,
}

impl Prompt {
    #[must_use]
    pub const fn new(kind: PromptKind) -> Self {
        Self {
            kind,
            input: String::new(),
        }
    }

    #[inline]
    #[must_use]
    pub const fn kind(&self) -> PromptKind {
        self.kind
    }

    #[inline]
    #[must_use]
    pub fn input(&self) -> &str {
        &self.input
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.input.is_empty()
    }

    /// The line to show on the message bar.
    #[must_use]
    pub fn message(&self) -> String {
        self.kind.format(&self.input)
    }

    /// Apply one key.
    ///
    /// Backspace, Delete and Ctrl-H drop the last byte. Printable ASCII
    /// appends. Enter on empty input is ignored.
    pub fn handle(&mut self, key: &KeyEvent) -> PromptEvent {
        match key.code {
            KeyCode::Backspace | KeyCode::Delete => self.backspace(),
            _ if key.is_ctrl(b'h') => self.backspace(),
            KeyCode::Escape => PromptEvent::Cancelled,
            KeyCode::Enter if self.input.is_empty() => PromptEvent::Unchanged,
            KeyCode::Enter => PromptEvent::Submitted(self.input.clone()),
            KeyCode::Char(b)
                if key.modifiers.difference(Modifiers::SHIFT).is_empty()
                    && (b' '..=b'~').contains(&b) =>
            {
                self.input.push(char::from(b));
                PromptEvent::Edited
            }
            _ => PromptEvent::Unchanged,
        }
    }

    fn backspace(&mut self) -> PromptEvent {
        // Counts as an edit even on empty input.
        self.input.pop();
        PromptEvent::Edited
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
