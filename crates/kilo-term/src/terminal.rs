// SPDX-License-Identifier: MIT
//
// Terminal setup: raw mode, window size, and restoring the shell on exit.
//
// Raw mode is a guard value. Dropping a `RawMode` puts the saved termios
// back, and `Terminal` holds one only while the editor screen is up. A copy
// of the saved termios also lives in a process-wide slot so the panic hook
// can restore cooked mode when the guard is out of reach.
//
// The window size comes from `ioctl(TIOCGWINSZ)`. Some terminals answer
// that with zeros; for those the cursor is pushed to the bottom-right corner
// and its position is read back with a Device Status Report.
#![allow(unsafe_code)]

use std::io::{self, Write};
use std::sync::{Mutex, Once};
use std::time::Duration;

use log::{debug, info, warn};

use crate::ansi;
use crate::reader::{ReadOutcome, StdinReader};

/// How long to wait for the terminal to answer a cursor position query.
const REPORT_TIMEOUT: Duration = Duration::from_millis(100);

// ─── Size ───────────────────────────────────────────────────────────────────

/// Window dimensions in character cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Size {
    pub cols: u16,
    pub rows: u16,
}

impl Size {
    /// Used when neither the ioctl nor the cursor report gives an answer.
    pub const FALLBACK: Self = Self { cols: 80, rows: 24 };
}

/// Window size from `ioctl(TIOCGWINSZ)` on stdout.
#[cfg(unix)]
#[must_use]
pub fn ioctl_size() -> Option<Size> {
    let mut ws: libc::winsize = unsafe { std::mem::zeroed() };
    let rc = unsafe { libc::ioctl(libc::STDOUT_FILENO, libc::TIOCGWINSZ, &raw mut ws) };
    (rc == 0 && ws.ws_col > 0 && ws.ws_row > 0).then_some(Size {
        cols: ws.ws_col,
        rows: ws.ws_row,
    })
}

#[cfg(not(unix))]
#[must_use]
pub fn ioctl_size() -> Option<Size> {
    None
}

/// Parse a cursor position report (`ESC [ rows ; cols R`) as a size.
///
/// Trailing bytes after the `R` are ignored.
#[must_use]
pub fn parse_cursor_report(reply: &[u8]) -> Option<Size> {
    let body = reply.strip_prefix(b"\x1b[")?;
    let end = body.iter().position(|&b| b == b'R')?;
    let text = std::str::from_utf8(&body[..end]).ok()?;
    let (rows, cols) = text.split_once(';')?;
    let size = Size {
        cols: cols.parse().ok()?,
        rows: rows.parse().ok()?,
    };
    (size.cols > 0 && size.rows > 0).then_some(size)
}

/// Ask the terminal where the cursor ends up after moving it as far
/// down-right as it goes. Needs raw mode, or the reply is line-buffered.
fn size_from_cursor_report() -> Option<Size> {
    let mut stdout = io::stdout().lock();
    ansi::cursor_to_far_corner(&mut stdout).ok()?;
    ansi::cursor_position_query(&mut stdout).ok()?;
    stdout.flush().ok()?;
    drop(stdout);

    let mut reader = StdinReader::new();
    let mut reply = Vec::new();
    while !reply.contains(&b'R') && reply.len() < 32 {
        match reader.read_timeout(REPORT_TIMEOUT).ok()? {
            ReadOutcome::Bytes(bytes) => reply.extend_from_slice(bytes),
            ReadOutcome::Timeout | ReadOutcome::Eof => break,
        }
    }
    let size = parse_cursor_report(&reply);
    debug!("cursor report {reply:?} -> {size:?}");
    size
}

/// Is stdin a terminal?
#[cfg(unix)]
#[must_use]
pub fn is_tty() -> bool {
    unsafe { libc::isatty(libc::STDIN_FILENO) != 0 }
}

#[cfg(not(unix))]
#[must_use]
pub fn is_tty() -> bool {
    false
}

// ─── Raw mode ───────────────────────────────────────────────────────────────

#[cfg(unix)]
static SAVED_TERMIOS: Mutex<Option<libc::termios>> = Mutex::new(None);

/// Written straight to fd 1 by the panic hook: reset attributes, show the
/// cursor, leave the alternate screen.
const PANIC_RESTORE: &[u8] = b"\x1b[0m\x1b[?25h\x1b[?1049l";

static PANIC_HOOK: Once = Once::new();

fn install_panic_hook() {
    PANIC_HOOK.call_once(|| {
        let previous = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            // The stdout lock may be held by a frame flush.
            #[cfg(unix)]
            unsafe {
                let _ = libc::write(
                    libc::STDOUT_FILENO,
                    PANIC_RESTORE.as_ptr().cast::<libc::c_void>(),
                    PANIC_RESTORE.len(),
                );
            }
            #[cfg(unix)]
            if let Ok(saved) = SAVED_TERMIOS.lock() {
                if let Some(termios) = saved.as_ref() {
                    unsafe {
                        let _ = libc::tcsetattr(libc::STDIN_FILENO, libc::TCSAFLUSH, termios);
                    }
                }
            }
            previous(info);
        }));
    });
}

/// Raw mode on stdin for as long as this value lives.
pub struct RawMode {
    #[cfg(unix)]
    original: libc::termios,
}

impl RawMode {
    /// Switch stdin to raw mode. Returns `None` when stdin is not a
    /// terminal (tests, pipes).
    ///
    /// # Errors
    ///
    /// Returns the OS error if the terminal attributes cannot be read or set.
    #[cfg(unix)]
    pub fn enable() -> io::Result<Option<Self>> {
        if !is_tty() {
            return Ok(None);
        }
        let fd = libc::STDIN_FILENO;
        let mut termios: libc::termios = unsafe { std::mem::zeroed() };
        if unsafe { libc::tcgetattr(fd, &raw mut termios) } != 0 {
            return Err(io::Error::last_os_error());
        }
        let original = termios;

        termios.c_iflag &= !(libc::BRKINT | libc::ICRNL | libc::INPCK | libc::ISTRIP | libc::IXON);
        termios.c_oflag &= !libc::OPOST;
        termios.c_cflag |= libc::CS8;
        termios.c_lflag &= !(libc::ECHO | libc::ICANON | libc::IEXTEN | libc::ISIG);
        // Reads are gated by poll().
        termios.c_cc[libc::VMIN] = 1;
        termios.c_cc[libc::VTIME] = 0;

        if unsafe { libc::tcsetattr(fd, libc::TCSAFLUSH, &raw const termios) } != 0 {
            return Err(io::Error::last_os_error());
        }
        if let Ok(mut saved) = SAVED_TERMIOS.lock() {
            *saved = Some(original);
        }
        Ok(Some(Self { original }))
    }

    /// # Errors
    ///
    /// Never fails off unix.
    #[cfg(not(unix))]
    pub const fn enable() -> io::Result<Option<Self>> {
        Ok(None)
    }
}

impl Drop for RawMode {
    fn drop(&mut self) {
        #[cfg(unix)]
        {
            let rc = unsafe {
                libc::tcsetattr(libc::STDIN_FILENO, libc::TCSAFLUSH, &raw const self.original)
            };
            if rc != 0 {
                warn!("restoring termios failed: {}", io::Error::last_os_error());
            }
            if let Ok(mut saved) = SAVED_TERMIOS.lock() {
                *saved = None;
            }
        }
    }
}

// ─── Terminal ───────────────────────────────────────────────────────────────

/// The editor's hold on the terminal.
///
/// [`enter`](Self::enter) takes over the screen; [`leave`](Self::leave) or
/// dropping the value gives it back.
pub struct Terminal {
    raw: Option<RawMode>,
    size: Size,
    active: bool,
}

impl Terminal {
    /// Query the window size. Does not touch the terminal mode.
    ///
    /// # Errors
    ///
    /// Infallible today; kept as `Result` for platform setup.
    pub fn new() -> io::Result<Self> {
        Ok(Self {
            raw: None,
            size: ioctl_size().unwrap_or(Size::FALLBACK),
            active: false,
        })
    }

    #[inline]
    #[must_use]
    pub const fn size(&self) -> Size {
        self.size
    }

    #[inline]
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active
    }

    /// Re-read the window size after SIGWINCH.
    pub fn refresh_size(&mut self) -> Size {
        if let Some(size) = ioctl_size() {
            self.size = size;
        }
        self.size
    }

    /// Raw mode, alternate screen, cleared. No-op if already entered.
    ///
    /// # Errors
    ///
    /// Returns an error if raw mode cannot be set or the screen cannot be
    /// written.
    pub fn enter(&mut self) -> io::Result<()> {
        if self.active {
            return Ok(());
        }
        install_panic_hook();
        self.raw = RawMode::enable()?;

        if ioctl_size().is_none() && self.raw.is_some() {
            match size_from_cursor_report() {
                Some(size) => self.size = size,
                None => warn!("window size unknown, using {:?}", Size::FALLBACK),
            }
        }

        let mut out = io::stdout().lock();
        ansi::enter_alt_screen(&mut out)?;
        ansi::clear_screen(&mut out)?;
        ansi::cursor_home(&mut out)?;
        out.flush()?;

        self.active = true;
        info!("terminal entered, {}x{}", self.size.cols, self.size.rows);
        Ok(())
    }

    /// Clear the screen, restore the shell's screen and cooked mode.
    /// No-op if not entered.
    ///
    /// # Errors
    ///
    /// Returns an error if the restore sequence cannot be written.
    pub fn leave(&mut self) -> io::Result<()> {
        if !self.active {
            return Ok(());
        }
        self.active = false;

        let mut out = io::stdout().lock();
        let written = ansi::reset(&mut out)
            .and_then(|()| ansi::clear_screen(&mut out))
            .and_then(|()| ansi::cursor_home(&mut out))
            .and_then(|()| ansi::cursor_show(&mut out))
            .and_then(|()| ansi::exit_alt_screen(&mut out))
            .and_then(|()| out.flush());
        drop(out);

        // Cooked mode comes back even if the screen could not be written.
        self.raw = None;
        info!("terminal left");
        written
    }
}

impl Drop for Terminal {
    fn drop(&mut self) {
        let _ = self.leave();
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
