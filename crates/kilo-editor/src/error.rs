//! Error type for the editor core.
//!
//! Only file and configuration I/O can fail. Out-of-range edits are not
//! errors: document operations clamp or ignore bad indices, and a search
//! that finds nothing is a normal outcome.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Editor core error.
#[derive(Debug, Error)]
pub enum Error {
    /// Reading or writing a file failed.
    #[error("{}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A TOML configuration file did not parse.
    #[error("{}: {source}", .path.display())]
    Config {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// Save was requested for a document that has no file name yet.
    #[error("no file name")]
    NoPath,
}

impl Error {
    /// The underlying OS error, for messages that show only the cause.
    #[must_use]
    pub const fn io_source(&self) -> Option<&io::Error> {
        match self {
            Self::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Editor core result.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_error_names_the_path() {
        let err = Error::Io {
            path: PathBuf::from("notes.txt"),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        };
        assert_eq!(err.to_string(), "notes.txt: denied");
        assert_eq!(
            err.io_source().map(io::Error::kind),
            Some(io::ErrorKind::PermissionDenied)
        );
    }

    #[test]
    fn no_path_has_no_io_source() {
        assert!(Error::NoPath.io_source().is_none());
        assert_eq!(Error::NoPath.to_string(), "no file name");
    }
}
