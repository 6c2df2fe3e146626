// SPDX-License-Identifier: MIT
#![allow(unsafe_code)]
//
// Synchronous stdin reader with a timeout.
//
// The editor is single threaded: it waits for input, handles every key it
// got, repaints, and waits again. The only reason to wake up without input
// is to resolve a lone ESC (Escape key vs. start of a sequence) or to pick
// up a window resize, so the reader polls stdin with a timeout instead of
// blocking forever.
//
// A signal (SIGWINCH) interrupting poll() is reported as a timeout so the
// caller gets a chance to look at its resize flag.

use std::io;
use std::time::Duration;

/// Byte chunk read from stdin.
///
/// A single keypress is 1-6 bytes, a paste can be kilobytes.
const READ_BUF_SIZE: usize = 4096;

/// What a single [`StdinReader::read_timeout`] call produced.
#[derive(Debug, PartialEq, Eq)]
pub enum ReadOutcome<'a> {
    /// One non-empty chunk of raw bytes.
    Bytes(&'a [u8]),
    /// Nothing arrived before the timeout (or a signal interrupted the wait).
    Timeout,
    /// Stdin is closed.
    Eof,
}

/// Polling reader over a raw file descriptor (stdin by default).
pub struct StdinReader {
    #[cfg(unix)]
    fd: libc::c_int,
    buf: Box<[u8; READ_BUF_SIZE]>,
}

impl StdinReader {
    /// A reader over the process's stdin.
    #[must_use]
    pub fn new() -> Self {
        Self {
            #[cfg(unix)]
            fd: libc::STDIN_FILENO,
            buf: Box::new([0; READ_BUF_SIZE]),
        }
    }

    /// A reader over an arbitrary descriptor. The caller keeps ownership.
    #[cfg(unix)]
    #[must_use]
    pub fn from_raw_fd(fd: libc::c_int) -> Self {
        Self {
            fd,
            buf: Box::new([0; READ_BUF_SIZE]),
        }
    }

    /// Wait up to `timeout` for input and read whatever is available.
    ///
    /// # Errors
    ///
    /// Returns the OS error if `poll()` or `read()` fails for any reason
    /// other than a signal interruption.
    #[cfg(unix)]
    pub fn read_timeout(&mut self, timeout: Duration) -> io::Result<ReadOutcome<'_>> {
        let millis = libc::c_int::try_from(timeout.as_millis()).unwrap_or(libc::c_int::MAX);

        let ready = unsafe {
            let mut pfd = libc::pollfd {
                fd: self.fd,
                events: libc::POLLIN,
                revents: 0,
            };
            libc::poll(&raw mut pfd, 1, millis)
        };

        if ready < 0 {
            let err = io::Error::last_os_error();
            return if err.kind() == io::ErrorKind::Interrupted {
                Ok(ReadOutcome::Timeout)
            } else {
                Err(err)
            };
        }
        if ready == 0 {
            return Ok(ReadOutcome::Timeout);
        }

        let n = unsafe { libc::read(self.fd, self.buf.as_mut_ptr().cast(), self.buf.len()) };

        if n < 0 {
            let err = io::Error::last_os_error();
            return if err.kind() == io::ErrorKind::Interrupted {
                Ok(ReadOutcome::Timeout)
            } else {
                Err(err)
            };
        }
        if n == 0 {
            return Ok(ReadOutcome::Eof);
        }

        #[allow(clippy::cast_sign_loss)] // n > 0 checked above.
        Ok(ReadOutcome::Bytes(&self.buf[..n as usize]))
    }

    /// Non-unix fallback: a blocking read that ignores the timeout.
    ///
    /// # Errors
    ///
    /// Returns the error from the underlying read.
    #[cfg(not(unix))]
    pub fn read_timeout(&mut self, _timeout: Duration) -> io::Result<ReadOutcome<'_>> {
        use std::io::Read;

        match io::stdin().lock().read(&mut self.buf[..])? {
            0 => Ok(ReadOutcome::Eof),
            n => Ok(ReadOutcome::Bytes(&self.buf[..n])),
        }
    }
}

impl Default for StdinReader {
    fn default() -> Self {
        Self::new()
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    /// A pipe whose ends are closed on drop.
    struct Pipe {
        read: libc::c_int,
        write: libc::c_int,
    }

    impl Pipe {
        fn new() -> Self {
            let mut fds = [0; 2];
            let rc = unsafe { libc::pipe(fds.as_mut_ptr()) };
            assert_eq!(rc, 0, "pipe() failed");
            Self {
                read: fds[0],
                write: fds[1],
            }
        }

        fn send(&self, bytes: &[u8]) {
            let n = unsafe { libc::write(self.write, bytes.as_ptr().cast(), bytes.len()) };
            assert_eq!(n, isize::try_from(bytes.len()).unwrap());
        }

        fn close_write(&mut self) {
            unsafe { libc::close(self.write) };
            self.write = -1;
        }
    }

    impl Drop for Pipe {
        fn drop(&mut self) {
            unsafe {
                libc::close(self.read);
                if self.write >= 0 {
                    libc::close(self.write);
                }
            }
        }
    }

    #[test]
    fn read_buf_size_reasonable() {
        assert!(READ_BUF_SIZE >= 1024);
        assert!(READ_BUF_SIZE <= 65536);
    }

    #[test]
    fn times_out_without_input() {
        let pipe = Pipe::new();
        let mut reader = StdinReader::from_raw_fd(pipe.read);
        let outcome = reader.read_timeout(Duration::from_millis(10)).unwrap();
        assert_eq!(outcome, ReadOutcome::Timeout);
    }

    #[test]
    fn reads_available_bytes() {
        let pipe = Pipe::new();
        pipe.send(b"\x1b[A");
        let mut reader = StdinReader::from_raw_fd(pipe.read);
        let outcome = reader.read_timeout(Duration::from_millis(100)).unwrap();
        assert_eq!(outcome, ReadOutcome::Bytes(b"\x1b[A"));
    }

    #[test]
    fn reports_eof_when_writer_closes() {
        let mut pipe = Pipe::new();
        pipe.close_write();
        let mut reader = StdinReader::from_raw_fd(pipe.read);
        let outcome = reader.read_timeout(Duration::from_millis(100)).unwrap();
        assert_eq!(outcome, ReadOutcome::Eof);
    }
}
