// SPDX-License-Identifier: MIT
//
// Frame assembly.
//
// `OutputBuffer` collects one frame: every escape sequence and every visible
// byte. The event loop writes it with a single `write_all`, so the terminal
// never shows a half-painted screen.
//
// `ColorWriter` remembers the foreground last emitted and only writes an
// SGR sequence when a byte's colour differs from the previous byte's.

use std::io::{self, Write};

use crate::ansi;
use crate::color::Color;

// ─── OutputBuffer ────────────────────────────────────────────────────────────

/// Bytes of one frame, written to the terminal in one call.
#[derive(Debug, Default)]
pub struct OutputBuffer {
    bytes: Vec<u8>,
}

/// A full 80x24 frame with colour changes fits without growing.
const FRAME_CAPACITY: usize = 16 * 1024;

impl OutputBuffer {
    #[must_use]
    pub fn new() -> Self {
        Self {
            bytes: Vec::with_capacity(FRAME_CAPACITY),
        }
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    #[inline]
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    #[inline]
    pub fn push(&mut self, byte: u8) {
        self.bytes.push(byte);
    }

    /// Append `byte` `count` times, e.g. padding for the status bar.
    pub fn fill(&mut self, byte: u8, count: usize) {
        self.bytes.resize(self.bytes.len() + count, byte);
    }

    /// Empty the buffer, keeping its allocation for the next frame.
    #[inline]
    pub fn clear(&mut self) {
        self.bytes.clear();
    }

    /// Write the frame to `w`, flush `w`, and empty the buffer.
    ///
    /// # Errors
    ///
    /// Returns the error from `w`. The frame is kept on failure.
    pub fn write_frame(&mut self, w: &mut impl Write) -> io::Result<()> {
        if self.bytes.is_empty() {
            return Ok(());
        }
        w.write_all(&self.bytes)?;
        w.flush()?;
        self.bytes.clear();
        Ok(())
    }
}

impl Write for OutputBuffer {
    #[inline]
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        self.bytes.extend_from_slice(data);
        Ok(data.len())
    }

    /// Nothing to do; see [`OutputBuffer::write_frame`].
    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

// ─── ColorWriter ─────────────────────────────────────────────────────────────

/// Tracks the terminal's foreground colour within one frame.
///
/// An SGR 0 puts the terminal back at the default colour; start a fresh
/// writer after emitting one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorWriter {
    last: Color,
}

impl ColorWriter {
    /// Assumes the terminal is at its default foreground.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            last: Color::Default,
        }
    }

    /// Switch the foreground to `color` unless it is already active.
    ///
    /// # Errors
    ///
    /// Returns the error from `out`.
    pub fn set(&mut self, out: &mut impl Write, color: Color) -> io::Result<()> {
        if self.last == color {
            return Ok(());
        }
        ansi::fg(out, color)?;
        self.last = color;
        Ok(())
    }
}

impl Default for ColorWriter {
    fn default() -> Self {
        Self::new()
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
