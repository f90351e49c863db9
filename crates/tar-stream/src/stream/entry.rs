//! Entry descriptors and the overlays that extension data applies to them.

use std::str::FromStr;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use crate::encoding::NameEncoding;
use crate::header::{EntryType, Header, HeaderError};
use crate::pax::{
    PaxError, PaxHeaders, PAX_GID, PAX_GNAME, PAX_LINKPATH, PAX_MTIME, PAX_PATH,
    PAX_SCHILY_DEVMAJOR, PAX_SCHILY_DEVMINOR, PAX_SIZE, PAX_UID, PAX_UNAME,
};
use crate::signature::TarFormat;

/// Metadata of one archive member.
///
/// A descriptor is first decoded from its own header with
/// [`from_header`](Self::from_header) and then passed through the
/// [`Overlay`]s collected from the meta-entries in front of it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TarEntry {
    /// Member path.
    pub name: String,
    /// Link target; empty unless this is a link.
    pub link_name: String,
    /// Type classification.
    pub entry_type: EntryType,
    /// Dialect of the member's own header; `None` for old (v7) headers.
    pub format: Option<TarFormat>,
    /// Permission and mode bits.
    pub mode: u32,
    /// Owner user id.
    pub uid: u64,
    /// Owner group id.
    pub gid: u64,
    /// Owner user name; empty if unknown.
    pub user_name: String,
    /// Owner group name; empty if unknown.
    pub group_name: String,
    /// Payload size in bytes.
    pub size: u64,
    /// Modification time in milliseconds since the epoch.
    pub mtime_ms: i64,
    /// Device major number, for headers that carry one.
    pub dev_major: Option<u32>,
    /// Device minor number, for headers that carry one.
    pub dev_minor: Option<u32>,
    /// GNU sparse continuation records follow the header. Always false
    /// for entries other than [`EntryType::GnuSparse`].
    pub is_extended: bool,
}

/// Replacement of descriptor fields by data from a meta-entry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Overlay {
    /// A GNU long name.
    Name(String),
    /// A GNU long link.
    LinkName(String),
    /// The records of a PAX extended header.
    Pax(PaxHeaders),
}

impl TarEntry {
    /// Decode a descriptor from a header record.
    ///
    /// # Errors
    ///
    /// Returns [`HeaderError`] on a checksum mismatch or an unparsable
    /// numeric field.
    pub fn from_header(header: &Header, encoding: NameEncoding) -> Result<TarEntry, HeaderError> {
        header.verify_checksum()?;

        let name = match header.prefix() {
            Some(prefix) if !prefix.is_empty() => {
                let mut full = Vec::with_capacity(prefix.len() + 1 + header.name_bytes().len());
                full.extend_from_slice(prefix);
                full.push(b'/');
                full.extend_from_slice(header.name_bytes());
                encoding.decode(&full)
            }
            _ => encoding.decode(header.name_bytes()),
        };

        let mtime_secs = i64::try_from(header.mtime()?).unwrap_or(i64::MAX);

        Ok(TarEntry {
            name,
            link_name: encoding.decode(header.link_name_bytes()),
            entry_type: header.entry_type(),
            format: header.format(),
            mode: header.mode()?,
            uid: header.uid()?,
            gid: header.gid()?,
            user_name: header
                .user_name()
                .map(|n| encoding.decode(n))
                .unwrap_or_default(),
            group_name: header
                .group_name()
                .map(|n| encoding.decode(n))
                .unwrap_or_default(),
            size: header.entry_size()?,
            mtime_ms: mtime_secs.saturating_mul(1000),
            dev_major: header.device_major()?,
            dev_minor: header.device_minor()?,
            is_extended: header.entry_type() == EntryType::GnuSparse && header.is_extended(),
        })
    }

    /// Return this descriptor with `overlay` applied.
    ///
    /// # Errors
    ///
    /// Returns [`PaxError::InvalidValue`] when a recognised PAX key carries
    /// a value that does not parse.
    pub fn with_overlay(self, overlay: &Overlay) -> Result<TarEntry, PaxError> {
        match overlay {
            Overlay::Name(name) => Ok(TarEntry {
                name: name.clone(),
                ..self
            }),
            Overlay::LinkName(link_name) => Ok(TarEntry {
                link_name: link_name.clone(),
                ..self
            }),
            Overlay::Pax(headers) => self.with_pax(headers),
        }
    }

    pub(crate) fn with_pax(self, headers: &PaxHeaders) -> Result<TarEntry, PaxError> {
        headers.iter().try_fold(self, |entry, (key, value)| {
            Ok(match key.as_str() {
                PAX_PATH => TarEntry {
                    name: value.clone(),
                    ..entry
                },
                PAX_LINKPATH => TarEntry {
                    link_name: value.clone(),
                    ..entry
                },
                PAX_GID => TarEntry {
                    gid: parse_value(key, value)?,
                    ..entry
                },
                PAX_GNAME => TarEntry {
                    group_name: value.clone(),
                    ..entry
                },
                PAX_UID => TarEntry {
                    uid: parse_value(key, value)?,
                    ..entry
                },
                PAX_UNAME => TarEntry {
                    user_name: value.clone(),
                    ..entry
                },
                PAX_SIZE => TarEntry {
                    size: parse_value(key, value)?,
                    ..entry
                },
                PAX_MTIME => TarEntry {
                    mtime_ms: parse_mtime_ms(key, value)?,
                    ..entry
                },
                PAX_SCHILY_DEVMINOR => TarEntry {
                    dev_minor: Some(parse_value(key, value)?),
                    ..entry
                },
                PAX_SCHILY_DEVMAJOR => TarEntry {
                    dev_major: Some(parse_value(key, value)?),
                    ..entry
                },
                _ => entry,
            })
        })
    }

    /// Whether this is a regular file.
    #[must_use]
    pub fn is_file(&self) -> bool {
        matches!(self.entry_type, EntryType::Regular | EntryType::Continuous) && !self.is_dir()
    }

    /// Whether this is a directory. Old archives mark directories only by a
    /// trailing `/` on a regular entry.
    #[must_use]
    pub fn is_dir(&self) -> bool {
        self.entry_type == EntryType::Directory
            || (self.entry_type == EntryType::Regular && self.name.ends_with('/'))
    }

    /// Whether this is a symbolic link.
    #[must_use]
    pub fn is_symlink(&self) -> bool {
        self.entry_type == EntryType::Symlink
    }

    /// Whether this is a hard link.
    #[must_use]
    pub fn is_hard_link(&self) -> bool {
        self.entry_type == EntryType::Link
    }

    /// Whether this is a GNU sparse file.
    #[must_use]
    pub fn is_sparse(&self) -> bool {
        self.entry_type == EntryType::GnuSparse
    }

    /// Modification time.
    #[must_use]
    pub fn modified(&self) -> SystemTime {
        let offset = Duration::from_millis(self.mtime_ms.unsigned_abs());
        if self.mtime_ms >= 0 {
            UNIX_EPOCH + offset
        } else {
            UNIX_EPOCH.checked_sub(offset).unwrap_or(UNIX_EPOCH)
        }
    }
}

fn parse_value<T: FromStr>(key: &str, value: &str) -> Result<T, PaxError> {
    value.parse().map_err(|_| invalid_value(key, value))
}

/// PAX times are decimal seconds with an optional fraction.
fn parse_mtime_ms(key: &str, value: &str) -> Result<i64, PaxError> {
    let secs: f64 = parse_value(key, value)?;
    if !secs.is_finite() {
        return Err(invalid_value(key, value));
    }
    Ok((secs * 1000.0) as i64)
}

fn invalid_value(key: &str, value: &str) -> PaxError {
    PaxError::InvalidValue {
        key: key.to_owned(),
        value: value.to_owned(),
    }
}
