//! Zerocopy views of the 512-byte tar header record.
//!
//! A header is always exactly [`HEADER_SIZE`] bytes. The first 257 bytes are
//! shared by every dialect; what follows the `linkname` field depends on the
//! magic (see [`TarFormat`]):
//!
//! | Offset | Size | ustar / Ant  | GNU                         |
//! |--------|------|--------------|-----------------------------|
//! | 257    | 6    | magic        | magic                       |
//! | 263    | 2    | version      | version                     |
//! | 265    | 32   | uname        | uname                       |
//! | 297    | 32   | gname        | gname                       |
//! | 329    | 8    | devmajor     | devmajor                    |
//! | 337    | 8    | devminor     | devminor                    |
//! | 345    | 155  | prefix       | atime, ctime, offset, ...   |
//! | 386    | 96   |              | 4 sparse descriptors        |
//! | 482    | 1    |              | isextended                  |
//! | 483    | 12   |              | realsize                    |
//!
//! Decoding a header into an entry descriptor lives in
//! [`TarEntry::from_header`](crate::stream::TarEntry::from_header).

use std::fmt;

use thiserror::Error;
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

use crate::signature::{self, TarFormat};

/// Size of a tar header record in bytes.
pub const HEADER_SIZE: usize = 512;

const CHECKSUM_RANGE: std::ops::Range<usize> = 148..156;

/// Errors from decoding a single header record.
#[derive(Debug, Error)]
pub enum HeaderError {
    /// The record is shorter than a header.
    #[error("insufficient data: expected {HEADER_SIZE} bytes, got {0}")]
    InsufficientData(usize),

    /// A numeric field is neither octal ASCII nor base-256.
    #[error("invalid numeric field: {:?}", String::from_utf8_lossy(.0))]
    InvalidNumeric(Vec<u8>),

    /// The stored checksum matches neither the unsigned nor the signed sum.
    #[error("checksum mismatch: expected {expected}, computed {computed}")]
    ChecksumMismatch {
        /// The checksum stored in the header.
        expected: u64,
        /// The unsigned checksum computed over the record.
        computed: u64,
    },
}

/// Result type for header decoding.
pub type Result<T> = std::result::Result<T, HeaderError>;

/// POSIX ustar layout, also used for Ant-tar headers.
#[derive(Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(C)]
#[allow(missing_docs)]
pub struct UstarHeader {
    pub name: [u8; 100],
    pub mode: [u8; 8],
    pub uid: [u8; 8],
    pub gid: [u8; 8],
    pub size: [u8; 12],
    pub mtime: [u8; 12],
    pub checksum: [u8; 8],
    pub typeflag: u8,
    pub linkname: [u8; 100],
    pub magic: [u8; 6],
    pub version: [u8; 2],
    pub uname: [u8; 32],
    pub gname: [u8; 32],
    pub devmajor: [u8; 8],
    pub devminor: [u8; 8],
    pub prefix: [u8; 155],
    pub pad: [u8; 12],
}

/// One GNU sparse region descriptor (offset and length, both octal).
#[derive(Clone, Copy, Default, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(C)]
pub struct GnuSparseHeader {
    /// Offset of the region within the reconstructed file.
    pub offset: [u8; 12],
    /// Length of the region.
    pub numbytes: [u8; 12],
}

impl fmt::Debug for GnuSparseHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GnuSparseHeader")
            .field("offset", &parse_octal(&self.offset).ok())
            .field("numbytes", &parse_octal(&self.numbytes).ok())
            .finish()
    }
}

/// GNU tar layout.
#[derive(Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(C)]
#[allow(missing_docs)]
pub struct GnuHeader {
    pub name: [u8; 100],
    pub mode: [u8; 8],
    pub uid: [u8; 8],
    pub gid: [u8; 8],
    pub size: [u8; 12],
    pub mtime: [u8; 12],
    pub checksum: [u8; 8],
    pub typeflag: u8,
    pub linkname: [u8; 100],
    pub magic: [u8; 6],
    pub version: [u8; 2],
    pub uname: [u8; 32],
    pub gname: [u8; 32],
    pub devmajor: [u8; 8],
    pub devminor: [u8; 8],
    pub atime: [u8; 12],
    pub ctime: [u8; 12],
    pub offset: [u8; 12],
    pub longnames: [u8; 4],
    pub unused: u8,
    pub sparse: [GnuSparseHeader; 4],
    pub isextended: u8,
    pub realsize: [u8; 12],
    pub pad: [u8; 17],
}

/// A sparse continuation record following a GNU sparse header whose
/// `isextended` flag is set.
///
/// The region descriptors are never used to rebuild file holes; only the
/// flag matters, because it says whether another continuation follows.
#[derive(Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(C)]
pub struct GnuExtSparseHeader {
    /// Further region descriptors.
    pub sparse: [GnuSparseHeader; 21],
    /// Non-zero when yet another continuation record follows.
    pub isextended: u8,
    /// Padding to the record size.
    pub pad: [u8; 7],
}

impl GnuExtSparseHeader {
    /// View the first [`HEADER_SIZE`] bytes of `record` as a continuation.
    ///
    /// # Errors
    ///
    /// Returns [`HeaderError::InsufficientData`] if `record` is too short.
    pub fn from_bytes(record: &[u8]) -> Result<&GnuExtSparseHeader> {
        let bytes = record
            .get(..HEADER_SIZE)
            .ok_or(HeaderError::InsufficientData(record.len()))?;
        GnuExtSparseHeader::ref_from_bytes(bytes)
            .map_err(|_| HeaderError::InsufficientData(record.len()))
    }

    /// Whether another continuation record follows this one.
    #[must_use]
    pub fn is_extended(&self) -> bool {
        self.isextended != 0
    }
}

impl fmt::Debug for GnuExtSparseHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GnuExtSparseHeader")
            .field("isextended", &self.isextended)
            .finish_non_exhaustive()
    }
}

/// Classification of an entry by its type flag.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EntryType {
    /// Regular file (`'0'`, or NUL in old archives).
    Regular,
    /// Hard link to an earlier member (`'1'`).
    Link,
    /// Symbolic link (`'2'`).
    Symlink,
    /// Character device (`'3'`).
    Char,
    /// Block device (`'4'`).
    Block,
    /// Directory (`'5'`).
    Directory,
    /// Named pipe (`'6'`).
    Fifo,
    /// Contiguous file (`'7'`), read like a regular file.
    Continuous,
    /// GNU long name meta-entry (`'L'`).
    GnuLongName,
    /// GNU long link meta-entry (`'K'`).
    GnuLongLink,
    /// GNU sparse file (`'S'`).
    GnuSparse,
    /// PAX extended header for the next entry (`'x'`, or Solaris `'X'`).
    XHeader,
    /// PAX global extended header (`'g'`).
    XGlobalHeader,
    /// Any other type flag.
    Other(u8),
}

impl EntryType {
    /// Classify a raw type flag.
    #[must_use]
    pub fn from_byte(byte: u8) -> Self {
        match byte {
            b'0' | b'\0' => EntryType::Regular,
            b'1' => EntryType::Link,
            b'2' => EntryType::Symlink,
            b'3' => EntryType::Char,
            b'4' => EntryType::Block,
            b'5' => EntryType::Directory,
            b'6' => EntryType::Fifo,
            b'7' => EntryType::Continuous,
            b'L' => EntryType::GnuLongName,
            b'K' => EntryType::GnuLongLink,
            b'S' => EntryType::GnuSparse,
            b'x' | b'X' => EntryType::XHeader,
            b'g' => EntryType::XGlobalHeader,
            other => EntryType::Other(other),
        }
    }

    /// The canonical type flag. `Regular` encodes as `'0'`, `XHeader` as `'x'`.
    #[must_use]
    pub fn to_byte(self) -> u8 {
        match self {
            EntryType::Regular => b'0',
            EntryType::Link => b'1',
            EntryType::Symlink => b'2',
            EntryType::Char => b'3',
            EntryType::Block => b'4',
            EntryType::Directory => b'5',
            EntryType::Fifo => b'6',
            EntryType::Continuous => b'7',
            EntryType::GnuLongName => b'L',
            EntryType::GnuLongLink => b'K',
            EntryType::GnuSparse => b'S',
            EntryType::XHeader => b'x',
            EntryType::XGlobalHeader => b'g',
            EntryType::Other(b) => b,
        }
    }

    /// Whether entries of this type decorate the entry that follows them
    /// instead of describing an archive member.
    #[must_use]
    pub fn is_meta(self) -> bool {
        matches!(
            self,
            EntryType::GnuLongName
                | EntryType::GnuLongLink
                | EntryType::XHeader
                | EntryType::XGlobalHeader
        )
    }
}

impl From<u8> for EntryType {
    fn from(byte: u8) -> Self {
        Self::from_byte(byte)
    }
}

/// One raw header record.
#[derive(Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(C)]
pub struct Header {
    bytes: [u8; HEADER_SIZE],
}

impl Header {
    /// View the first [`HEADER_SIZE`] bytes of `record` as a header.
    ///
    /// # Errors
    ///
    /// Returns [`HeaderError::InsufficientData`] if `record` is too short.
    pub fn from_bytes(record: &[u8]) -> Result<&Header> {
        let bytes = record
            .get(..HEADER_SIZE)
            .ok_or(HeaderError::InsufficientData(record.len()))?;
        Header::ref_from_bytes(bytes).map_err(|_| HeaderError::InsufficientData(record.len()))
    }

    /// The raw record.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8; HEADER_SIZE] {
        &self.bytes
    }

    /// View as a ustar header.
    #[must_use]
    pub fn as_ustar(&self) -> &UstarHeader {
        zerocopy::transmute_ref!(&self.bytes)
    }

    /// View as a GNU header.
    #[must_use]
    pub fn as_gnu(&self) -> &GnuHeader {
        zerocopy::transmute_ref!(&self.bytes)
    }

    /// The dialect, or `None` for old (v7) headers.
    #[must_use]
    pub fn format(&self) -> Option<TarFormat> {
        signature::detect(&self.bytes)
    }

    /// The entry type.
    #[must_use]
    pub fn entry_type(&self) -> EntryType {
        EntryType::from_byte(self.as_ustar().typeflag)
    }

    /// Declared payload size.
    ///
    /// # Errors
    ///
    /// Returns [`HeaderError::InvalidNumeric`] if the field does not parse.
    pub fn entry_size(&self) -> Result<u64> {
        parse_numeric(&self.as_ustar().size)
    }

    /// Permission and mode bits.
    ///
    /// # Errors
    ///
    /// Returns [`HeaderError::InvalidNumeric`] if the field does not parse
    /// or does not fit in 32 bits.
    pub fn mode(&self) -> Result<u32> {
        parse_u32(&self.as_ustar().mode)
    }

    /// Owner user id.
    ///
    /// # Errors
    ///
    /// Returns [`HeaderError::InvalidNumeric`] if the field does not parse.
    pub fn uid(&self) -> Result<u64> {
        parse_numeric(&self.as_ustar().uid)
    }

    /// Owner group id.
    ///
    /// # Errors
    ///
    /// Returns [`HeaderError::InvalidNumeric`] if the field does not parse.
    pub fn gid(&self) -> Result<u64> {
        parse_numeric(&self.as_ustar().gid)
    }

    /// Modification time in seconds since the epoch.
    ///
    /// # Errors
    ///
    /// Returns [`HeaderError::InvalidNumeric`] if the field does not parse.
    pub fn mtime(&self) -> Result<u64> {
        parse_numeric(&self.as_ustar().mtime)
    }

    /// The `name` field up to its first NUL.
    #[must_use]
    pub fn name_bytes(&self) -> &[u8] {
        truncate_null(&self.as_ustar().name)
    }

    /// The ustar `prefix` field. `None` unless the header has the ustar
    /// layout (POSIX or Ant), since GNU reuses those bytes for other fields.
    #[must_use]
    pub fn prefix(&self) -> Option<&[u8]> {
        match self.format() {
            Some(TarFormat::Ustar | TarFormat::Ant) => Some(truncate_null(&self.as_ustar().prefix)),
            _ => None,
        }
    }

    /// The `linkname` field up to its first NUL.
    #[must_use]
    pub fn link_name_bytes(&self) -> &[u8] {
        truncate_null(&self.as_ustar().linkname)
    }

    /// Owner user name; `None` for old headers.
    #[must_use]
    pub fn user_name(&self) -> Option<&[u8]> {
        self.format().map(|_| truncate_null(&self.as_ustar().uname))
    }

    /// Owner group name; `None` for old headers.
    #[must_use]
    pub fn group_name(&self) -> Option<&[u8]> {
        self.format().map(|_| truncate_null(&self.as_ustar().gname))
    }

    /// Device major number; `None` for old headers.
    ///
    /// # Errors
    ///
    /// Returns [`HeaderError::InvalidNumeric`] if the field does not parse
    /// or does not fit in 32 bits.
    pub fn device_major(&self) -> Result<Option<u32>> {
        if self.format().is_none() {
            return Ok(None);
        }
        parse_u32(&self.as_ustar().devmajor).map(Some)
    }

    /// Device minor number; `None` for old headers.
    ///
    /// # Errors
    ///
    /// Returns [`HeaderError::InvalidNumeric`] if the field does not parse
    /// or does not fit in 32 bits.
    pub fn device_minor(&self) -> Result<Option<u32>> {
        if self.format().is_none() {
            return Ok(None);
        }
        parse_u32(&self.as_ustar().devminor).map(Some)
    }

    /// GNU `isextended` flag: sparse continuation records follow.
    #[must_use]
    pub fn is_extended(&self) -> bool {
        self.format() == Some(TarFormat::Gnu) && self.as_gnu().isextended != 0
    }

    /// Check the stored checksum against the record contents.
    ///
    /// Both the standard unsigned sum and the signed sum written by some
    /// historical implementations are accepted.
    ///
    /// # Errors
    ///
    /// Returns [`HeaderError::ChecksumMismatch`] if neither sum matches, or
    /// [`HeaderError::InvalidNumeric`] if the stored value does not parse.
    pub fn verify_checksum(&self) -> Result<()> {
        let expected = parse_octal(&self.as_ustar().checksum)?;
        let computed = self.unsigned_checksum();
        if expected == computed || expected as i64 == self.signed_checksum() {
            Ok(())
        } else {
            Err(HeaderError::ChecksumMismatch { expected, computed })
        }
    }

    /// Sum of all bytes as unsigned values, the checksum field counted as spaces.
    #[must_use]
    pub fn unsigned_checksum(&self) -> u64 {
        self.bytes
            .iter()
            .enumerate()
            .map(|(i, &b)| if CHECKSUM_RANGE.contains(&i) { b' ' } else { b })
            .map(u64::from)
            .sum()
    }

    /// Sum of all bytes as signed values, the checksum field counted as spaces.
    #[must_use]
    pub fn signed_checksum(&self) -> i64 {
        self.bytes
            .iter()
            .enumerate()
            .map(|(i, &b)| if CHECKSUM_RANGE.contains(&i) { b' ' } else { b })
            .map(|b| i64::from(b as i8))
            .sum()
    }

    /// Whether every byte of the record is zero (an end-of-archive marker).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.iter().all(|&b| b == 0)
    }
}

impl fmt::Debug for Header {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Header")
            .field("name", &String::from_utf8_lossy(self.name_bytes()))
            .field("entry_type", &self.entry_type())
            .field("size", &self.entry_size().ok())
            .field("format", &self.format())
            .finish()
    }
}

/// Parse an octal ASCII field.
///
/// Leading spaces are skipped and the digits end at the first space or NUL.
/// An empty field is zero.
///
/// # Errors
///
/// Returns [`HeaderError::InvalidNumeric`] for any other character, or on
/// overflow.
pub fn parse_octal(field: &[u8]) -> Result<u64> {
    let digits = field
        .iter()
        .skip_while(|&&b| b == b' ')
        .take_while(|&&b| b != b' ' && b != b'\0');

    let mut value: u64 = 0;
    for &b in digits {
        if !(b'0'..=b'7').contains(&b) {
            return Err(HeaderError::InvalidNumeric(field.to_vec()));
        }
        value = value
            .checked_mul(8)
            .and_then(|v| v.checked_add(u64::from(b - b'0')))
            .ok_or_else(|| HeaderError::InvalidNumeric(field.to_vec()))?;
    }
    Ok(value)
}

/// Parse a numeric field stored either as octal ASCII or, when the high bit
/// of the first byte is set, as GNU big-endian base-256.
///
/// # Errors
///
/// Returns [`HeaderError::InvalidNumeric`] if the value does not parse or
/// does not fit in 64 bits.
pub fn parse_numeric(field: &[u8]) -> Result<u64> {
    match field.split_first() {
        Some((&first, rest)) if first & 0x80 != 0 => {
            std::iter::once(first & 0x7f)
                .chain(rest.iter().copied())
                .try_fold(0u64, |acc, b| {
                    acc.checked_mul(256).map(|v| v | u64::from(b))
                })
                .ok_or_else(|| HeaderError::InvalidNumeric(field.to_vec()))
        }
        _ => parse_octal(field),
    }
}

/// [`parse_numeric`] for fields held in 32 bits.
fn parse_u32(field: &[u8]) -> Result<u32> {
    u32::try_from(parse_numeric(field)?).map_err(|_| HeaderError::InvalidNumeric(field.to_vec()))
}

/// The part of `bytes` before the first NUL, or all of it.
#[must_use]
pub fn truncate_null(bytes: &[u8]) -> &[u8] {
    match bytes.iter().position(|&b| b == 0) {
        Some(pos) => &bytes[..pos],
        None => bytes,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gnu_header(name: &str, size: u64) -> tar::Header {
        let mut header = tar::Header::new_gnu();
        header.set_path(name).unwrap();
        header.set_size(size);
        header.set_mode(0o644);
        header.set_entry_type(tar::EntryType::Regular);
        header.set_cksum();
        header
    }

    #[test]
    fn test_layout_sizes() {
        assert_eq!(size_of::<UstarHeader>(), HEADER_SIZE);
        assert_eq!(size_of::<GnuHeader>(), HEADER_SIZE);
        assert_eq!(size_of::<GnuExtSparseHeader>(), HEADER_SIZE);
        assert_eq!(size_of::<GnuSparseHeader>(), 24);
        assert_eq!(size_of::<Header>(), HEADER_SIZE);
    }

    #[test]
    fn test_from_bytes_too_short() {
        let err = Header::from_bytes(&[0u8; 100]).unwrap_err();
        assert!(matches!(err, HeaderError::InsufficientData(100)));
    }

    #[test]
    fn test_fields_from_tar_crate() {
        let mut header = tar::Header::new_ustar();
        header.set_path("dir/file.txt").unwrap();
        header.set_size(1234);
        header.set_mode(0o755);
        header.set_uid(1000);
        header.set_gid(100);
        header.set_mtime(1_234_567_890);
        header.set_username("alice").unwrap();
        header.set_groupname("staff").unwrap();
        header.set_entry_type(tar::EntryType::Regular);
        header.set_cksum();

        let parsed = Header::from_bytes(header.as_bytes()).unwrap();
        parsed.verify_checksum().unwrap();
        assert_eq!(parsed.format(), Some(TarFormat::Ustar));
        assert_eq!(parsed.entry_type(), EntryType::Regular);
        // short paths fit the name field without using the prefix
        assert_eq!(parsed.name_bytes(), b"dir/file.txt");
        assert_eq!(parsed.prefix(), Some(&b""[..]));
        assert_eq!(parsed.entry_size().unwrap(), 1234);
        assert_eq!(parsed.mode().unwrap(), 0o755);
        assert_eq!(parsed.uid().unwrap(), 1000);
        assert_eq!(parsed.gid().unwrap(), 100);
        assert_eq!(parsed.mtime().unwrap(), 1_234_567_890);
        assert_eq!(parsed.user_name(), Some(&b"alice"[..]));
        assert_eq!(parsed.group_name(), Some(&b"staff"[..]));
    }

    #[test]
    fn test_gnu_has_no_prefix() {
        let header = gnu_header("a.txt", 3);
        let parsed = Header::from_bytes(header.as_bytes()).unwrap();
        assert_eq!(parsed.format(), Some(TarFormat::Gnu));
        assert_eq!(parsed.prefix(), None);
        assert!(!parsed.is_extended());
    }

    #[test]
    fn test_ant_header_prefix_joined() {
        let path = format!("{}/{}", "a".repeat(60), "b".repeat(60));
        let mut header = tar::Header::new_ustar();
        header.set_path(&path).unwrap();
        header.set_size(0);
        header.as_mut_bytes()[263..265].copy_from_slice(b"\0\0");
        header.set_cksum();

        let parsed = Header::from_bytes(header.as_bytes()).unwrap();
        assert_eq!(parsed.format(), Some(TarFormat::Ant));
        assert_eq!(parsed.prefix(), Some(&path.as_bytes()[..60]));
        assert_eq!(parsed.name_bytes(), &path.as_bytes()[61..]);
    }

    #[test]
    fn test_oversized_32_bit_fields_rejected() {
        let mut header = gnu_header("dev", 0);
        header.set_entry_type(tar::EntryType::Char);
        let mut field = [0u8; 8];
        field[0] = 0x80;
        field[3] = 0x01;
        header.as_mut_bytes()[329..337].copy_from_slice(&field);
        header.as_mut_bytes()[100..108].copy_from_slice(&field);
        header.set_cksum();

        let parsed = Header::from_bytes(header.as_bytes()).unwrap();
        assert_eq!(parse_numeric(&field).unwrap(), 1 << 32);
        assert!(matches!(parsed.mode(), Err(HeaderError::InvalidNumeric(_))));
        assert!(matches!(parsed.device_major(), Err(HeaderError::InvalidNumeric(_))));
        assert_eq!(parsed.device_minor().unwrap(), Some(0));
    }

    #[test]
    fn test_checksum_mismatch() {
        let header = gnu_header("a.txt", 3);
        let mut bytes = *header.as_bytes();
        bytes[0] = b'b';
        let parsed = Header::from_bytes(&bytes).unwrap();
        assert!(matches!(
            parsed.verify_checksum(),
            Err(HeaderError::ChecksumMismatch { .. })
        ));
    }

    #[test]
    fn test_signed_checksum_accepted() {
        let header = gnu_header("a.txt", 3);
        let mut bytes = *header.as_bytes();
        // a high byte in the name makes the signed and unsigned sums differ
        bytes[10] = 0xe9;
        let parsed = Header::from_bytes(&bytes).unwrap();
        let signed = parsed.signed_checksum();
        assert_ne!(signed as u64, parsed.unsigned_checksum());
        let field = format!("{signed:06o}\0 ");
        bytes[148..156].copy_from_slice(field.as_bytes());
        Header::from_bytes(&bytes).unwrap().verify_checksum().unwrap();
    }

    #[test]
    fn test_old_header_has_no_names() {
        let mut header = tar::Header::new_old();
        header.set_path("old.txt").unwrap();
        header.set_size(0);
        header.set_cksum();
        let parsed = Header::from_bytes(header.as_bytes()).unwrap();
        assert_eq!(parsed.format(), None);
        assert_eq!(parsed.user_name(), None);
        assert_eq!(parsed.device_major().unwrap(), None);
        assert_eq!(parsed.prefix(), None);
    }

    #[test]
    fn test_parse_octal() {
        assert_eq!(parse_octal(b"0000644\0").unwrap(), 0o644);
        assert_eq!(parse_octal(b"     123 ").unwrap(), 0o123);
        assert_eq!(parse_octal(b"").unwrap(), 0);
        assert_eq!(parse_octal(b"\0\0\0\0").unwrap(), 0);
        assert_eq!(parse_octal(b"77777777777").unwrap(), 0o77777777777);
        assert!(parse_octal(b"128").is_err());
        assert!(parse_octal(b"abc").is_err());
    }

    #[test]
    fn test_parse_numeric_base256() {
        let mut field = [0u8; 12];
        field[0] = 0x80;
        field[8..].copy_from_slice(&u32::MAX.to_be_bytes());
        assert_eq!(parse_numeric(&field).unwrap(), 0xffff_ffff);

        let mut big = [0xffu8; 12];
        big[0] = 0x80 | 0x01;
        assert!(parse_numeric(&big).is_err());
    }

    #[test]
    fn test_entry_type_flags() {
        assert_eq!(EntryType::from_byte(b'\0'), EntryType::Regular);
        assert_eq!(EntryType::from_byte(b'X'), EntryType::XHeader);
        assert_eq!(EntryType::from_byte(b'x').to_byte(), b'x');
        assert_eq!(EntryType::from_byte(b'Z'), EntryType::Other(b'Z'));
        assert!(EntryType::GnuLongName.is_meta());
        assert!(!EntryType::GnuSparse.is_meta());
        assert!(!EntryType::Regular.is_meta());
    }

    #[test]
    fn test_truncate_null() {
        assert_eq!(truncate_null(b"hello\0world"), b"hello");
        assert_eq!(truncate_null(b"no null"), b"no null");
        assert_eq!(truncate_null(b""), b"");
    }

    #[test]
    fn test_ext_sparse_flag() {
        let mut record = [0u8; HEADER_SIZE];
        assert!(!GnuExtSparseHeader::from_bytes(&record).unwrap().is_extended());
        record[504] = 1;
        assert!(GnuExtSparseHeader::from_bytes(&record).unwrap().is_extended());
        assert!(GnuExtSparseHeader::from_bytes(&record[..10]).is_err());
    }
}
