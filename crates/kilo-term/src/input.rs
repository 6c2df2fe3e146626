// SPDX-License-Identifier: MIT
//
// Terminal input parser.
//
// Turns raw stdin bytes into key events. kilo only needs the legacy key
// encodings every VT100-descended terminal speaks:
//
// - Control bytes (Ctrl+letter, Enter, Tab, Backspace)
// - CSI sequences for arrows and the editing keypad (`ESC [ 3 ~`, `ESC [ A`)
// - SS3 sequences some terminals send in application mode (`ESC O H`)
// - Alt+key (ESC followed by a printable byte)
//
// Everything else is a plain byte. The editor is byte oriented, so bytes
// above 0x7F are passed through untouched instead of being decoded as UTF-8.
//
// # Design
//
// The parser keeps a small byte buffer because an escape sequence can span
// multiple `read()` calls. Feed bytes with [`Parser::advance`]. After a
// timeout with no new bytes, call [`Parser::flush`] to turn a pending lone
// ESC into a real Escape keypress.

use bitflags::bitflags;

// ─── Key Types ──────────────────────────────────────────────────────────────

/// A decoded keypress.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    /// Which key was pressed.
    pub code: KeyCode,
    /// Active modifier keys.
    pub modifiers: Modifiers,
}

impl KeyEvent {
    /// A key with no modifiers.
    #[must_use]
    pub const fn plain(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: Modifiers::empty(),
        }
    }

    /// Ctrl + `letter`. The letter is stored lowercase.
    #[must_use]
    pub const fn ctrl(letter: u8) -> Self {
        Self {
            code: KeyCode::Char(letter.to_ascii_lowercase()),
            modifiers: Modifiers::CTRL,
        }
    }

    /// Is this exactly Ctrl + `letter`?
    #[must_use]
    pub fn is_ctrl(&self, letter: u8) -> bool {
        self.modifiers == Modifiers::CTRL && self.code == KeyCode::Char(letter)
    }

    /// The byte this key would produce with the terminal in raw mode.
    ///
    /// Ctrl+letter folds back to its control code (`Ctrl+A` → 0x01).
    /// Named keys other than Tab have no byte.
    #[must_use]
    pub const fn as_byte(&self) -> Option<u8> {
        match self.code {
            KeyCode::Char(b) if self.modifiers.contains(Modifiers::CTRL) => Some(b & 0x1f),
            KeyCode::Char(b) => Some(b),
            KeyCode::Tab => Some(b'\t'),
            _ => None,
        }
    }
}

/// Identity of a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyCode {
    /// A raw byte: printable ASCII, a letter under Ctrl, or a high byte.
    Char(u8),
    // ── Named keys ──────────────────────────────────────────────
    Enter,
    Tab,
    Backspace,
    Escape,
    Delete,
    // ── Navigation ──────────────────────────────────────────────
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
    PageUp,
    PageDown,
}

bitflags! {
    /// Keyboard modifier flags.
    ///
    /// Matches the xterm CSI modifier encoding where `param = 1 + bitmask`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
    pub struct Modifiers: u8 {
        const SHIFT = 0b0000_0001;
        const ALT   = 0b0000_0010;
        const CTRL  = 0b0000_0100;
    }
}

// ─── Parser ─────────────────────────────────────────────────────────────────

/// Incremental stdin byte parser.
///
/// # Escape vs escape-sequence ambiguity
///
/// A bare `ESC` byte could be either the Escape key or the start of a
/// multi-byte sequence. The parser returns nothing for a lone ESC and
/// waits. The caller should wait a short timeout and then call
/// [`flush`](Parser::flush) to emit the pending ESC as a real keypress.
pub struct Parser {
    /// Accumulated raw bytes waiting to be parsed.
    buf: Vec<u8>,
}

impl Parser {
    /// Create a new parser with an empty buffer.
    #[must_use]
    pub fn new() -> Self {
        Self {
            buf: Vec::with_capacity(64),
        }
    }

    /// Feed raw bytes from stdin and return all keys that can be parsed.
    ///
    /// Bytes that form an incomplete sequence are kept and combined with
    /// future calls.
    pub fn advance(&mut self, data: &[u8]) -> Vec<KeyEvent> {
        self.buf.extend_from_slice(data);
        let mut keys = Vec::new();
        let mut pos = 0;

        while pos < self.buf.len() {
            match try_parse(&self.buf[pos..]) {
                Parsed::Key(key, consumed) => {
                    keys.push(key);
                    pos += consumed;
                }
                Parsed::Incomplete => break,
                Parsed::Skip(n) => pos += n,
            }
        }

        if pos > 0 {
            self.buf.drain(..pos);
        }

        keys
    }

    /// Are there unconsumed bytes that might complete with more data?
    #[must_use]
    pub fn has_pending(&self) -> bool {
        !self.buf.is_empty()
    }

    /// Flush pending bytes as literal keys.
    ///
    /// A lone ESC becomes Escape. A truncated sequence like `ESC [` becomes
    /// Escape followed by the remaining bytes as ordinary keys.
    pub fn flush(&mut self) -> Vec<KeyEvent> {
        let keys = self.buf.iter().map(|&b| single_byte(b)).collect();
        self.buf.clear();
        keys
    }
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}

// ─── Stateless Parsing Functions ────────────────────────────────────────────

/// Result of trying to parse one key from the buffer.
enum Parsed {
    /// Parsed a key, consuming `usize` bytes.
    Key(KeyEvent, usize),
    /// Sequence is incomplete; need more bytes.
    Incomplete,
    /// Unrecognized sequence, skip `usize` bytes.
    Skip(usize),
}

/// Try to parse a single key from the start of `buf`.
fn try_parse(buf: &[u8]) -> Parsed {
    match buf.first() {
        None => Parsed::Skip(0),
        Some(0x1B) => parse_escape(buf),
        Some(&b) => Parsed::Key(single_byte(b), 1),
    }
}

/// Decode one byte outside any escape sequence.
const fn single_byte(byte: u8) -> KeyEvent {
    match byte {
        0x1B => KeyEvent::plain(KeyCode::Escape),
        0x08 | 0x7F => KeyEvent::plain(KeyCode::Backspace),
        0x09 => KeyEvent::plain(KeyCode::Tab),
        0x0A | 0x0D => KeyEvent::plain(KeyCode::Enter),
        0x00 => KeyEvent {
            code: KeyCode::Char(b'@'),
            modifiers: Modifiers::CTRL,
        },
        b @ 0x01..=0x1A => KeyEvent::ctrl(b + b'a' - 1),
        b => KeyEvent::plain(KeyCode::Char(b)),
    }
}

// ── Escape sequences ────────────────────────────────────────────────────────

fn parse_escape(buf: &[u8]) -> Parsed {
    debug_assert_eq!(buf[0], 0x1B);

    if buf.len() < 2 {
        return Parsed::Incomplete;
    }

    match buf[1] {
        b'[' => parse_csi(buf),
        b'O' => parse_ss3(buf),
        // Alt+printable.
        b @ 0x20..=0x7E => Parsed::Key(
            KeyEvent {
                code: KeyCode::Char(b),
                modifiers: Modifiers::ALT,
            },
            2,
        ),
        // Anything else: the ESC stands alone, the next byte is parsed fresh.
        _ => Parsed::Key(KeyEvent::plain(KeyCode::Escape), 1),
    }
}

// ── CSI (Control Sequence Introducer) ───────────────────────────────────────

fn parse_csi(buf: &[u8]) -> Parsed {
    debug_assert!(buf.len() >= 2 && buf[0] == 0x1B && buf[1] == b'[');

    // Scan for the final byte (0x40..=0x7E).
    // Parameter bytes are in 0x30..=0x3F, intermediates in 0x20..=0x2F.
    let mut end = 2;
    while end < buf.len() {
        let b = buf[end];
        if (0x40..=0x7E).contains(&b) {
            break;
        }
        if !(0x20..=0x3F).contains(&b) {
            return Parsed::Skip(end + 1);
        }
        end += 1;
    }

    if end >= buf.len() {
        return Parsed::Incomplete;
    }

    let final_byte = buf[end];
    let params = parse_csi_params(&buf[2..end]);
    let consumed = end + 1;
    let modifiers = params
        .get(1)
        .map_or(Modifiers::empty(), |&p| decode_modifiers(p));

    let code = if final_byte == b'~' {
        match params.first().copied().unwrap_or(0) {
            1 | 7 => KeyCode::Home,
            3 => KeyCode::Delete,
            4 | 8 => KeyCode::End,
            5 => KeyCode::PageUp,
            6 => KeyCode::PageDown,
            _ => return Parsed::Skip(consumed),
        }
    } else {
        match final_byte {
            b'A' => KeyCode::Up,
            b'B' => KeyCode::Down,
            b'C' => KeyCode::Right,
            b'D' => KeyCode::Left,
            b'H' => KeyCode::Home,
            b'F' => KeyCode::End,
            _ => return Parsed::Skip(consumed),
        }
    };

    Parsed::Key(KeyEvent { code, modifiers }, consumed)
}

// ── SS3 (Single Shift 3) ───────────────────────────────────────────────────

fn parse_ss3(buf: &[u8]) -> Parsed {
    debug_assert!(buf.len() >= 2 && buf[0] == 0x1B && buf[1] == b'O');

    if buf.len() < 3 {
        return Parsed::Incomplete;
    }

    let code = match buf[2] {
        b'A' => KeyCode::Up,
        b'B' => KeyCode::Down,
        b'C' => KeyCode::Right,
        b'D' => KeyCode::Left,
        b'H' => KeyCode::Home,
        b'F' => KeyCode::End,
        _ => return Parsed::Skip(3),
    };

    Parsed::Key(KeyEvent::plain(code), 3)
}

// ── Helpers ─────────────────────────────────────────────────────────────────

/// Parse semicolon-separated CSI parameters.
///
/// - `1;5` → `[1, 5]`
/// - `3` → `[3]`
/// - (empty) → `[]`
fn parse_csi_params(raw: &[u8]) -> Vec<u16> {
    if raw.is_empty() {
        return Vec::new();
    }
    raw.split(|&b| b == b';')
        .map(|field| {
            field
                .iter()
                .take_while(|b| b.is_ascii_digit())
                .fold(0u16, |acc, &d| {
                    acc.saturating_mul(10).saturating_add(u16::from(d - b'0'))
                })
        })
        .collect()
}

/// Decode a CSI modifier parameter into `Modifiers` bitflags.
///
/// The encoding is `1 + bitmask`. A parameter of 0 or 1 means no modifiers.
#[allow(clippy::cast_possible_truncation)]
const fn decode_modifiers(param: u16) -> Modifiers {
    let val = if param > 0 { param - 1 } else { 0 };
    Modifiers::from_bits_truncate(val as u8)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    /// Helper: parse bytes and return all keys.
    fn parse(data: &[u8]) -> Vec<KeyEvent> {
        Parser::new().advance(data)
    }

    /// Helper: parse bytes, return exactly one key.
    fn parse_one(data: &[u8]) -> KeyEvent {
        let keys = parse(data);
        assert_eq!(keys.len(), 1, "expected 1 key, got {keys:?}");
        keys[0]
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::plain(code)
    }

    // ── Plain bytes ─────────────────────────────────────────────────────

    #[test]
    fn ascii_chars() {
        assert_eq!(
            parse(b"ab~"),
            vec![
                key(KeyCode::Char(b'a')),
                key(KeyCode::Char(b'b')),
                key(KeyCode::Char(b'~')),
            ]
        );
    }

    #[test]
    fn high_bytes_pass_through() {
        assert_eq!(parse(b"\xc3\xa9"), vec![
            key(KeyCode::Char(0xC3)),
            key(KeyCode::Char(0xA9)),
        ]);
    }

    // ── Control bytes ───────────────────────────────────────────────────

    #[test]
    fn ctrl_letters() {
        assert_eq!(parse_one(b"\x11"), KeyEvent::ctrl(b'q'));
        assert_eq!(parse_one(b"\x13"), KeyEvent::ctrl(b's'));
        assert_eq!(parse_one(b"\x06"), KeyEvent::ctrl(b'f'));
        assert!(parse_one(b"\x0c").is_ctrl(b'l'));
    }

    #[test]
    fn ctrl_at() {
        assert_eq!(
            parse_one(b"\x00"),
            KeyEvent {
                code: KeyCode::Char(b'@'),
                modifiers: Modifiers::CTRL,
            }
        );
    }

    #[test]
    fn enter_tab_backspace() {
        assert_eq!(parse_one(b"\r"), key(KeyCode::Enter));
        assert_eq!(parse_one(b"\n"), key(KeyCode::Enter));
        assert_eq!(parse_one(b"\t"), key(KeyCode::Tab));
        assert_eq!(parse_one(b"\x7f"), key(KeyCode::Backspace));
        assert_eq!(parse_one(b"\x08"), key(KeyCode::Backspace));
    }

    // ── CSI ─────────────────────────────────────────────────────────────

    #[test]
    fn arrows() {
        assert_eq!(parse_one(b"\x1b[A"), key(KeyCode::Up));
        assert_eq!(parse_one(b"\x1b[B"), key(KeyCode::Down));
        assert_eq!(parse_one(b"\x1b[C"), key(KeyCode::Right));
        assert_eq!(parse_one(b"\x1b[D"), key(KeyCode::Left));
    }

    #[test]
    fn tilde_keys() {
        assert_eq!(parse_one(b"\x1b[1~"), key(KeyCode::Home));
        assert_eq!(parse_one(b"\x1b[7~"), key(KeyCode::Home));
        assert_eq!(parse_one(b"\x1b[3~"), key(KeyCode::Delete));
        assert_eq!(parse_one(b"\x1b[4~"), key(KeyCode::End));
        assert_eq!(parse_one(b"\x1b[8~"), key(KeyCode::End));
        assert_eq!(parse_one(b"\x1b[5~"), key(KeyCode::PageUp));
        assert_eq!(parse_one(b"\x1b[6~"), key(KeyCode::PageDown));
    }

    #[test]
    fn letter_home_end() {
        assert_eq!(parse_one(b"\x1b[H"), key(KeyCode::Home));
        assert_eq!(parse_one(b"\x1b[F"), key(KeyCode::End));
    }

    #[test]
    fn modified_arrow() {
        assert_eq!(
            parse_one(b"\x1b[1;5C"),
            KeyEvent {
                code: KeyCode::Right,
                modifiers: Modifiers::CTRL,
            }
        );
    }

    #[test]
    fn unknown_tilde_is_skipped() {
        assert!(parse(b"\x1b[2~").is_empty());
        assert_eq!(parse(b"\x1b[15~x"), vec![key(KeyCode::Char(b'x'))]);
    }

    // ── SS3 ─────────────────────────────────────────────────────────────

    #[test]
    fn ss3_home_end() {
        assert_eq!(parse_one(b"\x1bOH"), key(KeyCode::Home));
        assert_eq!(parse_one(b"\x1bOF"), key(KeyCode::End));
        assert_eq!(parse_one(b"\x1bOA"), key(KeyCode::Up));
    }

    // ── Alt ─────────────────────────────────────────────────────────────

    #[test]
    fn alt_letter() {
        assert_eq!(
            parse_one(b"\x1bx"),
            KeyEvent {
                code: KeyCode::Char(b'x'),
                modifiers: Modifiers::ALT,
            }
        );
    }

    // ── Incomplete sequences and flush ──────────────────────────────────

    #[test]
    fn lone_escape_waits_for_flush() {
        let mut p = Parser::new();
        assert!(p.advance(b"\x1b").is_empty());
        assert!(p.has_pending());
        assert_eq!(p.flush(), vec![key(KeyCode::Escape)]);
        assert!(!p.has_pending());
    }

    #[test]
    fn sequence_split_across_reads() {
        let mut p = Parser::new();
        assert!(p.advance(b"\x1b[").is_empty());
        assert!(p.advance(b"3").is_empty());
        assert_eq!(p.advance(b"~"), vec![key(KeyCode::Delete)]);
        assert!(!p.has_pending());
    }

    #[test]
    fn truncated_csi_flushes_as_escape_then_bytes() {
        let mut p = Parser::new();
        assert!(p.advance(b"\x1b[").is_empty());
        assert_eq!(
            p.flush(),
            vec![key(KeyCode::Escape), key(KeyCode::Char(b'['))]
        );
    }

    #[test]
    fn escape_then_control_byte() {
        assert_eq!(
            parse(b"\x1b\r"),
            vec![key(KeyCode::Escape), key(KeyCode::Enter)]
        );
    }

    // ── as_byte ─────────────────────────────────────────────────────────

    #[test]
    fn as_byte_folds_ctrl() {
        assert_eq!(KeyEvent::ctrl(b'a').as_byte(), Some(0x01));
        assert_eq!(key(KeyCode::Char(b'z')).as_byte(), Some(b'z'));
        assert_eq!(key(KeyCode::Tab).as_byte(), Some(b'\t'));
        assert_eq!(key(KeyCode::Up).as_byte(), None);
    }

    #[test]
    fn decode_modifiers_param() {
        assert_eq!(decode_modifiers(0), Modifiers::empty());
        assert_eq!(decode_modifiers(1), Modifiers::empty());
        assert_eq!(decode_modifiers(2), Modifiers::SHIFT);
        assert_eq!(decode_modifiers(3), Modifiers::ALT);
        assert_eq!(decode_modifiers(5), Modifiers::CTRL);
    }
}
