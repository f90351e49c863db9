//! Reader configuration.

use crate::encoding::NameEncoding;
use crate::record::{DEFAULT_BLOCK_SIZE, DEFAULT_RECORD_SIZE};

use super::Limits;

/// What to do when the archive ends right after meta-entries, before the
/// entry they decorate.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum OrphanPolicy {
    /// Treat it as the end of the archive: `next_entry` returns `None` and
    /// a warning is logged. No bytes remain that could be misread.
    #[default]
    EndOfArchive,
    /// Fail with [`StreamError::OrphanedMetadata`](super::StreamError::OrphanedMetadata).
    Error,
}

/// Options for [`TarStreamReader`](super::TarStreamReader).
///
/// ```
/// use tar_stream::stream::{OrphanPolicy, ReaderOptions};
///
/// let options = ReaderOptions {
///     orphaned_metadata: OrphanPolicy::Error,
///     ..Default::default()
/// };
/// assert_eq!(options.record_size, 512);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReaderOptions {
    /// Bytes read from the underlying stream at a time.
    pub block_size: usize,
    /// Size of one physical record.
    pub record_size: usize,
    /// Decoding for header names and GNU long names.
    pub encoding: NameEncoding,
    /// Resource limits.
    pub limits: Limits,
    /// Handling of meta-entries cut off by the end of the archive.
    pub orphaned_metadata: OrphanPolicy,
}

impl Default for ReaderOptions {
    fn default() -> Self {
        Self {
            block_size: DEFAULT_BLOCK_SIZE,
            record_size: DEFAULT_RECORD_SIZE,
            encoding: NameEncoding::default(),
            limits: Limits::default(),
            orphaned_metadata: OrphanPolicy::default(),
        }
    }
}
