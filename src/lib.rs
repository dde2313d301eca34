//! Embedded, append-only, copy-on-write B+ tree key-value storage in a
//! single file.
//!
//! A [`Tree`] maps opaque byte-string keys to opaque byte-string values and
//! offers point lookups, insertion, deletion, and ordered range scans. The
//! file is append-only: every mutation writes new page images and finishes
//! by committing a small head record identifying the new root, so live data
//! is never overwritten and an interrupted write is discarded on the next
//! open. Obsolete bytes accumulate until [`Tree::compact`] rewrites the
//! reachable tree into a fresh file.
//!
//! Keys are ordered by a host-supplied [`Comparator`]; page images and
//! values are compressed with a pluggable [`Codec`]. Both default to
//! sensible implementations ([`Lexicographic`], [`Snappy`]).
//!
//! ```rust
//! use burl::Tree;
//!
//! # fn main() -> Result<(), burl::Error> {
//! # let dir = tempfile::tempdir().unwrap();
//! # let path = dir.path().join("example.burl");
//! let mut tree = Tree::open(&path)?;
//! tree.set(b"hello", b"world")?;
//! assert_eq!(tree.get(b"hello")?.as_deref(), Some(&b"world"[..]));
//!
//! let mut keys = Vec::new();
//! tree.range(b"a", b"z", |key, _value| {
//!     keys.push(key);
//!     Ok(())
//! })
//! .map_err(burl::AbortError::infallible)?;
//! assert_eq!(keys.len(), 1);
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(
    clippy::cargo,
    missing_docs,
    clippy::pedantic,
    future_incompatible,
    rust_2018_idioms
)]
#![allow(
    clippy::missing_errors_doc,
    clippy::option_if_let_else,
    clippy::module_name_repetitions
)]

mod buffer;
mod codec;
mod comparator;
mod error;
mod tree;
mod writer;

pub use self::{
    buffer::Bytes,
    codec::{Codec, Snappy},
    comparator::{Comparator, Lexicographic},
    error::{AbortError, Error, ErrorKind},
    tree::{Config, Cursor, Tree, DEFAULT_ORDER, MIN_ORDER},
    writer::RECORD_PADDING,
};
