use std::{
    convert::Infallible,
    fmt::{Debug, Display},
    io,
    path::PathBuf,
};

/// An error from a tree file operation.
#[derive(thiserror::Error, Debug)]
#[error("{kind}")]
pub struct Error {
    /// The kind of error that occurred.
    #[source]
    pub kind: ErrorKind,
}

impl Error {
    pub(crate) fn message(message: impl Display) -> Self {
        Self::from(ErrorKind::Message(message.to_string()))
    }

    pub(crate) fn data_integrity(message: impl Display) -> Self {
        Self::from(ErrorKind::DataIntegrity(message.to_string()))
    }

    pub(crate) fn codec(message: impl Display) -> Self {
        Self::from(ErrorKind::Codec(message.to_string()))
    }
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Self {
        Self { kind }
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Self::from(ErrorKind::Io(err))
    }
}

/// The types of errors that can occur.
#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
pub enum ErrorKind {
    /// An error from the underlying file.
    #[error("io error: {0}")]
    Io(#[from] io::Error),

    /// A read extended past the end of the file. The file is likely
    /// truncated or corrupt.
    #[error("read of {length} bytes at {position} extends past the end of the file")]
    OutOfBounds {
        /// The file position the read started at.
        position: u64,
        /// The number of bytes requested.
        length: u64,
    },

    /// The compression codec rejected a payload.
    #[error("codec error: {0}")]
    Codec(String),

    /// Stored data failed validation while being decoded.
    #[error("data integrity error: {0}")]
    DataIntegrity(String),

    /// A key longer than the per-slot key budget was supplied.
    #[error("key too large")]
    KeyTooLarge,

    /// Another instance holds the exclusive lock on the file.
    #[error("{path:?} is locked by another instance")]
    Locked {
        /// The path of the locked file.
        path: PathBuf,
    },

    /// A compaction scratch file already exists.
    #[error("compaction scratch file {path:?} already exists")]
    CompactionInProgress {
        /// The path of the existing scratch file.
        path: PathBuf,
    },

    /// A general error.
    #[error("{0}")]
    Message(String),
}

/// An error that could come from user code or from the tree.
#[derive(thiserror::Error, Debug)]
pub enum AbortError<E: Display + Debug> {
    /// An error unrelated to the tree occurred.
    #[error("other error: {0}")]
    Other(E),
    /// An error from the tree occurred.
    #[error("tree error: {0}")]
    Tree(#[from] Error),
}

impl AbortError<Infallible> {
    /// Unwraps the error contained within an infallible abort error.
    #[must_use]
    pub fn infallible(self) -> Error {
        match self {
            AbortError::Other(_) => unreachable!(),
            AbortError::Tree(error) => error,
        }
    }
}
