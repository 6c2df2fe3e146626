// SPDX-License-Identifier: MIT
#![allow(unsafe_code)]
//
// The editor's main loop. Single threaded:
//
//   resize?  → App::on_resize
//   tick     → App::on_tick (status message expiry)
//   dirty?   → App::paint, one write to stdout
//   wait     → poll stdin for at most one tick
//   keys     → App::on_key for each decoded key, in order
//
// Keys are applied to completion before the next paint.
//
// A lone ESC stays in the parser until a read comes back empty, then it is
// delivered as the Escape key. The tick interval is therefore also the
// Escape latency.
//
// SIGWINCH only raises a flag. The signal also interrupts poll(), so the
// new size is picked up on the next pass through the loop.

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use log::{debug, info, trace};

use crate::input::{KeyEvent, Parser};
use crate::output::OutputBuffer;
use crate::reader::{ReadOutcome, StdinReader};
use crate::terminal::{Size, Terminal};

// ─── Resize signal ───────────────────────────────────────────────────────────

static RESIZED: AtomicBool = AtomicBool::new(false);

#[cfg(unix)]
extern "C" fn on_sigwinch(_signal: libc::c_int) {
    RESIZED.store(true, Ordering::Relaxed);
}

#[cfg(unix)]
fn watch_resize() {
    // No SA_RESTART: poll() must return EINTR so the loop sees the flag.
    unsafe {
        let mut action: libc::sigaction = std::mem::zeroed();
        action.sa_sigaction = on_sigwinch as *const () as usize;
        libc::sigemptyset(&raw mut action.sa_mask);
        if libc::sigaction(libc::SIGWINCH, &raw const action, std::ptr::null_mut()) != 0 {
            debug!("SIGWINCH handler not installed: {}", io::Error::last_os_error());
        }
    }
}

#[cfg(not(unix))]
fn watch_resize() {}

// ─── App ─────────────────────────────────────────────────────────────────────

/// Returned from [`App::on_key`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Continue,
    /// Leave the loop and restore the terminal.
    Quit,
}

/// What the loop drives.
pub trait App {
    /// One decoded key.
    fn on_key(&mut self, key: &KeyEvent) -> Action;

    /// The window changed size. A repaint follows.
    fn on_resize(&mut self, _size: Size) {}

    /// Once per pass, input or not. `true` requests a repaint.
    fn on_tick(&mut self) -> bool {
        false
    }

    /// Append a whole frame, cursor placement included, to the empty `out`.
    ///
    /// # Errors
    ///
    /// An error here ends the loop.
    fn paint(&mut self, out: &mut OutputBuffer) -> io::Result<()>;
}

// ─── EventLoop ───────────────────────────────────────────────────────────────

/// Loop timing.
#[derive(Debug, Clone, Copy)]
pub struct LoopConfig {
    /// Longest wait for input before the loop ticks and flushes a pending
    /// Escape.
    pub tick_interval: Duration,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_millis(50),
        }
    }
}

/// Owns the terminal, stdin and the key decoder for the editor's lifetime.
pub struct EventLoop {
    terminal: Terminal,
    reader: StdinReader,
    parser: Parser,
    config: LoopConfig,
}

impl EventLoop {
    /// # Errors
    ///
    /// Returns an error if the terminal handle cannot be created.
    pub fn new() -> io::Result<Self> {
        Self::with_config(LoopConfig::default())
    }

    /// # Errors
    ///
    /// Returns an error if the terminal handle cannot be created.
    pub fn with_config(config: LoopConfig) -> io::Result<Self> {
        Ok(Self {
            terminal: Terminal::new()?,
            reader: StdinReader::new(),
            parser: Parser::new(),
            config,
        })
    }

    /// Window size as last queried.
    #[inline]
    #[must_use]
    pub const fn size(&self) -> Size {
        self.terminal.size()
    }

    /// Take over the terminal and run `app` until it quits or stdin closes.
    /// The terminal is restored on every exit path.
    ///
    /// # Errors
    ///
    /// Returns the first I/O error from entering the terminal, reading
    /// stdin, writing a frame, or restoring the terminal.
    pub fn run(&mut self, app: &mut impl App) -> io::Result<()> {
        self.terminal.enter()?;
        watch_resize();

        // Raw mode may have refined the size.
        app.on_resize(self.terminal.size());

        let result = self.pump(app);
        let restored = self.terminal.leave();
        result.and(restored)
    }

    fn pump(&mut self, app: &mut impl App) -> io::Result<()> {
        let mut frame = OutputBuffer::new();
        let mut dirty = true;

        loop {
            if RESIZED.swap(false, Ordering::Relaxed) {
                let size = self.terminal.refresh_size();
                debug!("resized to {}x{}", size.cols, size.rows);
                app.on_resize(size);
                dirty = true;
            }

            dirty |= app.on_tick();

            if dirty {
                frame.clear();
                app.paint(&mut frame)?;
                trace!("frame of {} bytes", frame.len());
                frame.write_frame(&mut io::stdout().lock())?;
                dirty = false;
            }

            let keys = match self.reader.read_timeout(self.config.tick_interval)? {
                ReadOutcome::Bytes(bytes) => self.parser.advance(bytes),
                ReadOutcome::Timeout if self.parser.has_pending() => self.parser.flush(),
                ReadOutcome::Timeout => continue,
                ReadOutcome::Eof => {
                    info!("stdin closed");
                    return Ok(());
                }
            };

            for key in &keys {
                trace!("key {key:?}");
                if app.on_key(key) == Action::Quit {
                    return Ok(());
                }
            }
            dirty |= !keys.is_empty();
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
