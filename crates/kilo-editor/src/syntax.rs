//! Syntax rule sets: declarative language descriptions.
//!
//! A [`Syntax`] says what a language's comments, strings, numbers and
//! keywords look like. It is plain `'static` data; the scanner that applies
//! it lives in [`crate::row`]. Languages are picked by file name from the
//! built-in [`DATABASE`].

use bitflags::bitflags;

// ---------------------------------------------------------------------------
// Rule set
// ---------------------------------------------------------------------------

bitflags! {
    /// Optional highlight passes.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
    pub struct SyntaxFlags: u8 {
        const NUMBERS = 0b01;
        const STRINGS = 0b10;
    }
}

/// A language's highlight rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Syntax {
    /// Name shown in the status bar.
    pub filetype: &'static str,
    /// File name patterns. `.ext` matches a file name ending in `.ext`;
    /// anything else matches as a substring.
    pub filematch: &'static [&'static str],
    /// Keywords in priority order. A trailing `|` marks a type-like keyword.
    pub keywords: &'static [&'static str],
    /// Marker that comments out the rest of the row.
    pub singleline_comment: Option<&'static str>,
    /// Open and close markers of a comment that may span rows.
    pub multiline_comment: Option<(&'static str, &'static str)>,
    pub flags: SyntaxFlags,
}

impl Syntax {
    /// Whether this rule set claims `filename`.
    #[must_use]
    pub fn matches(&self, filename: &str) -> bool {
        self.filematch.iter().any(|pattern| {
            if pattern.starts_with('.') {
                filename.ends_with(pattern)
            } else {
                filename.contains(pattern)
            }
        })
    }

    /// Keyword list split into `(word, is_type_keyword)`.
    pub fn keyword_classes(&self) -> impl Iterator<Item = (&'static [u8], bool)> + '_ {
        self.keywords.iter().map(|kw| match kw.strip_suffix('|') {
            Some(word) => (word.as_bytes(), true),
            None => (kw.as_bytes(), false),
        })
    }
}

// ---------------------------------------------------------------------------
// Separators
// ---------------------------------------------------------------------------

/// Bytes that end a word for number and keyword recognition.
const SEPARATORS: &[u8] = b",.()+-/*=~%<>[];";

/// Whitespace, NUL, or one of `,.()+-/*=~%<>[];`.
#[inline]
#[must_use]
pub fn is_separator(byte: u8) -> bool {
    byte.is_ascii_whitespace() || byte == 0 || byte == 0x0b || SEPARATORS.contains(&byte)
}

// ---------------------------------------------------------------------------
// Database
// ---------------------------------------------------------------------------

const C_KEYWORDS: &[&str] = &[
    "switch", "if", "while", "for", "break", "continue", "return", "else", "struct", "union",
    "typedef", "static", "enum", "class", "case", "int|", "long|", "double|", "float|", "char|",
    "unsigned|", "signed|", "void|",
];

const PYTHON_KEYWORDS: &[&str] = &[
    "and", "as", "assert", "break", "class", "continue", "def", "del", "elif", "else", "except",
    "finally", "for", "from", "global", "if", "import", "in", "is", "lambda", "nonlocal", "not",
    "or", "pass", "raise", "return", "try", "while", "with", "yield", "None|", "True|", "False|",
    "int|", "float|", "str|", "bytes|", "list|", "dict|", "set|", "tuple|", "bool|",
];

/// Built-in rule sets, searched in order.
pub static DATABASE: &[Syntax] = &[
    Syntax {
        filetype: "c",
        filematch: &[".c", ".h", ".cpp"],
        keywords: C_KEYWORDS,
        singleline_comment: Some("//"),
        multiline_comment: Some(("/*", "*/")),
        flags: SyntaxFlags::NUMBERS.union(SyntaxFlags::STRINGS),
    },
    Syntax {
        filetype: "python",
        filematch: &[".py"],
        keywords: PYTHON_KEYWORDS,
        singleline_comment: Some("#"),
        multiline_comment: None,
        flags: SyntaxFlags::NUMBERS.union(SyntaxFlags::STRINGS),
    },
];

/// First rule set in [`DATABASE`] that claims `filename`.
#[must_use]
pub fn select(filename: &str) -> Option<&'static Syntax> {
    DATABASE.iter().find(|syntax| syntax.matches(filename))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    // ── select ────────────────────────────────────────────────────────────

    #[test]
    fn select_by_extension() {
        assert_eq!(select("main.c").map(|s| s.filetype), Some("c"));
        assert_eq!(select("include/kilo.h").map(|s| s.filetype), Some("c"));
        assert_eq!(select("a.cpp").map(|s| s.filetype), Some("c"));
        assert_eq!(select("tool.py").map(|s| s.filetype), Some("python"));
    }

    #[test]
    fn extension_must_be_a_suffix() {
        assert!(select("notes.c.txt").is_none());
        assert!(select("archive.cppx").is_none());
    }

    #[test]
    fn unknown_files_have_no_syntax() {
        assert!(select("README").is_none());
        assert!(select("Makefile").is_none());
        assert!(select("").is_none());
    }

    #[test]
    fn substring_patterns_match_anywhere() {
        let syntax = Syntax {
            filetype: "make",
            filematch: &["Makefile"],
            keywords: &[],
            singleline_comment: Some("#"),
            multiline_comment: None,
            flags: SyntaxFlags::empty(),
        };
        assert!(syntax.matches("src/Makefile.am"));
        assert!(!syntax.matches("makefile"));
    }

    // ── keywords ──────────────────────────────────────────────────────────

    #[test]
    fn keyword_classes_strip_type_marker() {
        let c = select("x.c").unwrap();
        let classes: Vec<_> = c.keyword_classes().collect();
        assert!(classes.contains(&(b"while".as_slice(), false)));
        assert!(classes.contains(&(b"int".as_slice(), true)));
        assert!(!classes.iter().any(|(w, _)| w.ends_with(b"|")));
    }

    // ── separators ────────────────────────────────────────────────────────

    #[test]
    fn separator_set() {
        for &b in b" \t\n,.()+-/*=~%<>[];\0" {
            assert!(is_separator(b), "{:?} should separate", b as char);
        }
        for &b in b"az_09\"'{}#" {
            assert!(!is_separator(b), "{:?} should not separate", b as char);
        }
    }
}
