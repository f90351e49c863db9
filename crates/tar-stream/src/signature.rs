//! Tar dialect detection from the magic and version fields of a header.
//!
//! Every dialect this crate reads stores a 6-byte magic at offset 257 and a
//! 2-byte version right after it. Old (v7) archives carry neither and are
//! not recognised here; the header decoder still reads them.

/// Offset of the magic field in a header record.
pub const MAGIC_OFFSET: usize = 257;

/// Length of the magic field.
pub const MAGIC_LEN: usize = 6;

/// Offset of the version field in a header record.
pub const VERSION_OFFSET: usize = MAGIC_OFFSET + MAGIC_LEN;

/// Length of the version field.
pub const VERSION_LEN: usize = 2;

/// Minimum number of bytes [`matches`] needs to look at.
pub const SIGNATURE_LEN: usize = VERSION_OFFSET + VERSION_LEN;

/// Magic for POSIX ustar headers.
pub const MAGIC_POSIX: &[u8; MAGIC_LEN] = b"ustar\0";
/// Version for POSIX ustar headers.
pub const VERSION_POSIX: &[u8; VERSION_LEN] = b"00";

/// Magic for GNU tar headers.
pub const MAGIC_GNU: &[u8; MAGIC_LEN] = b"ustar ";
/// Version written by GNU tar.
pub const VERSION_GNU_SPACE: &[u8; VERSION_LEN] = b" \0";
/// Version written by some older GNU tar releases.
pub const VERSION_GNU_ZERO: &[u8; VERSION_LEN] = b"0\0";

/// Magic for headers written by Apache Ant's tar task.
pub const MAGIC_ANT: &[u8; MAGIC_LEN] = b"ustar\0";
/// Version for headers written by Apache Ant's tar task.
pub const VERSION_ANT: &[u8; VERSION_LEN] = b"\0\0";

/// A recognised tar dialect.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TarFormat {
    /// POSIX.1-1988 ustar (also the base of pax archives).
    Ustar,
    /// GNU tar.
    Gnu,
    /// Apache Ant's ustar variant with an all-NUL version.
    Ant,
}

impl TarFormat {
    /// Short lowercase name, as printed by tools.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            TarFormat::Ustar => "ustar",
            TarFormat::Gnu => "gnu",
            TarFormat::Ant => "ant",
        }
    }
}

/// Identify the dialect of a header from its signature bytes.
///
/// Returns `None` when `signature` is shorter than [`SIGNATURE_LEN`] or
/// carries no known magic/version pair.
#[must_use]
pub fn detect(signature: &[u8]) -> Option<TarFormat> {
    if signature.len() < SIGNATURE_LEN {
        return None;
    }
    let magic = &signature[MAGIC_OFFSET..VERSION_OFFSET];
    let version = &signature[VERSION_OFFSET..SIGNATURE_LEN];

    if magic == MAGIC_POSIX && version == VERSION_POSIX {
        Some(TarFormat::Ustar)
    } else if magic == MAGIC_GNU && (version == VERSION_GNU_SPACE || version == VERSION_GNU_ZERO) {
        Some(TarFormat::Gnu)
    } else if magic == MAGIC_ANT && version == VERSION_ANT {
        Some(TarFormat::Ant)
    } else {
        None
    }
}

/// Check whether `signature` starts with a tar header of a known dialect.
///
/// This is a pure lookup meant for format auto-detection; it performs no
/// I/O and does not validate the checksum.
///
/// # Example
///
/// ```
/// let mut record = [0u8; 512];
/// record[257..265].copy_from_slice(b"ustar\000");
/// assert!(tar_stream::matches(&record));
/// assert!(!tar_stream::matches(&record[..200]));
/// ```
#[must_use]
pub fn matches(signature: &[u8]) -> bool {
    detect(signature).is_some()
}
