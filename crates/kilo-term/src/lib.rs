// SPDX-License-Identifier: MIT
//
// kilo-term: terminal plumbing for the kilo editor.
//
// Everything the editor core needs from the terminal and nothing more:
// raw mode with guaranteed restore, decoding of the handful of escape
// sequences an editor cares about, the eight classic SGR colors, and a
// single-buffer frame writer. No diffing, no cell grid. The editor builds
// each frame as a byte string and this crate writes it in one go.
//
// Terminal control goes straight through termios and ANSI sequences.

pub mod ansi;
pub mod color;
pub mod event_loop;
pub mod input;
pub mod output;
pub mod reader;
pub mod terminal;
