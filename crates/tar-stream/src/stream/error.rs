//! Error types for tar stream reading.

use std::io;

use thiserror::Error;

use crate::header::HeaderError;
use crate::pax::PaxError;

/// Errors that can occur while reading a tar stream.
#[derive(Debug, Error)]
pub enum StreamError {
    /// I/O error from the underlying reader.
    #[error("I/O error: {0}")]
    Io(#[source] io::Error),

    /// A record could not be decoded as a header; the archive is corrupt.
    #[error("error detected parsing the header: {0}")]
    Header(#[from] HeaderError),

    /// A PAX extended header payload is malformed.
    #[error("PAX error: {0}")]
    Pax(#[from] PaxError),

    /// The record source ran dry while a payload read still owed bytes.
    #[error("unexpected EOF with {missing} bytes unread, at byte {pos}")]
    UnexpectedEof {
        /// Bytes consumed from the record source when the stream ended.
        pos: u64,
        /// Bytes the read still needed.
        missing: u64,
    },

    /// Draining an entry's payload made no progress although bytes remain.
    ///
    /// This points at an inconsistent record source, not at a malformed
    /// archive.
    #[error("failed to skip current tar entry: {remaining} bytes left")]
    SkipStalled {
        /// Payload bytes that could not be skipped.
        remaining: u64,
    },

    /// Path or link target exceeds the configured maximum length.
    #[error("path exceeds limit: {len} bytes > {limit} bytes")]
    PathTooLong {
        /// Actual length.
        len: usize,
        /// Configured limit.
        limit: usize,
    },

    /// PAX extended header exceeds the configured maximum size.
    #[error("PAX header exceeds limit: {size} bytes > {limit} bytes")]
    PaxTooLarge {
        /// Declared PAX payload size.
        size: u64,
        /// Configured limit.
        limit: u64,
    },

    /// GNU long name/link exceeds the configured maximum size.
    #[error("GNU long name/link exceeds limit: {size} bytes > {limit} bytes")]
    GnuLongTooLarge {
        /// Declared payload size.
        size: u64,
        /// Configured limit.
        limit: u64,
    },

    /// Meta-entries were read but the archive ended before the entry they
    /// decorate. Only raised under [`OrphanPolicy::Error`].
    ///
    /// [`OrphanPolicy::Error`]: super::OrphanPolicy::Error
    #[error("metadata entries without a following actual entry")]
    OrphanedMetadata,

    /// Too many meta-entries in a row.
    #[error("too many pending metadata entries: {count} > {limit}")]
    TooManyPendingEntries {
        /// Meta-entries read so far.
        count: usize,
        /// Configured limit.
        limit: usize,
    },

    /// Block and record sizes that cannot describe a tar stream.
    #[error("invalid blocking: block size {block_size}, record size {record_size}")]
    InvalidBlocking {
        /// Requested block size.
        block_size: usize,
        /// Requested record size.
        record_size: usize,
    },
}

/// Result type for stream reading operations.
pub type Result<T> = std::result::Result<T, StreamError>;

impl From<io::Error> for StreamError {
    fn from(err: io::Error) -> Self {
        // The entry reader's `Read` impl tunnels stream errors through
        // io::Error; unwrap them again so callers see the original variant.
        if err.get_ref().is_some_and(|inner| inner.is::<StreamError>()) {
            let kind = err.kind();
            if let Some(inner) = err.into_inner() {
                return match inner.downcast::<StreamError>() {
                    Ok(stream) => *stream,
                    Err(other) => StreamError::Io(io::Error::new(kind, other)),
                };
            }
            return StreamError::Io(kind.into());
        }
        StreamError::Io(err)
    }
}

impl From<StreamError> for io::Error {
    fn from(err: StreamError) -> Self {
        match err {
            StreamError::Io(err) => err,
            StreamError::UnexpectedEof { .. } => io::Error::new(io::ErrorKind::UnexpectedEof, err),
            other => io::Error::new(io::ErrorKind::InvalidData, other),
        }
    }
}
