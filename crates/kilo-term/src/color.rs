// SPDX-License-Identifier: MIT
//
// The eight classic ANSI foreground colors plus the terminal default.
//
// kilo paints syntax with SGR 30–37 so it looks right in any terminal
// theme, including the 16-color consoles where TrueColor is unavailable.

use std::fmt;

/// A foreground color expressible with a single SGR parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Color {
    Black,
    Red,
    Green,
    Yellow,
    Blue,
    Magenta,
    Cyan,
    White,
    /// Terminal default foreground (SGR 39).
    #[default]
    Default,
}

impl Color {
    /// SGR parameter selecting this color as the foreground.
    #[must_use]
    pub const fn fg_code(self) -> u8 {
        match self {
            Self::Black => 30,
            Self::Red => 31,
            Self::Green => 32,
            Self::Yellow => 33,
            Self::Blue => 34,
            Self::Magenta => 35,
            Self::Cyan => 36,
            Self::White => 37,
            Self::Default => 39,
        }
    }

    /// Whether this is the terminal default rather than an explicit color.
    #[inline]
    #[must_use]
    pub const fn is_default(self) -> bool {
        matches!(self, Self::Default)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Black => "black",
            Self::Red => "red",
            Self::Green => "green",
            Self::Yellow => "yellow",
            Self::Blue => "blue",
            Self::Magenta => "magenta",
            Self::Cyan => "cyan",
            Self::White => "white",
            Self::Default => "default",
        };
        f.write_str(name)
    }
}
