//! Editor core for kilo.
//!
//! The document model and everything derived from it: rows with their
//! rendered text and highlight tags, the syntax rule database, cursor
//! movement, viewport scrolling and frame assembly, incremental search,
//! the prompt line and configuration. Terminal I/O lives in `kilo-term`;
//! this crate only writes bytes into an `OutputBuffer`.

pub mod config;
pub mod cursor;
pub mod document;
pub mod error;
pub mod highlight;
pub mod position;
pub mod prompt;
pub mod row;
pub mod search;
pub mod syntax;
pub mod view;

pub use error::{Error, Result};
