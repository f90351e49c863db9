//! Streaming tokenizer for PAX extended header payloads.
//!
//! A payload is a sequence of records of the form `"<len> <key>=<value>\n"`,
//! where `<len>` is the decimal length of the whole record including the
//! length digits themselves and the trailing newline. Records are parsed
//! straight off a byte stream, so the payload never has to be buffered as a
//! whole.

use std::collections::{hash_map, HashMap};
use std::io::{BufRead, Read};

use thiserror::Error;

use crate::stream::Result;

/// PAX key for the entry path.
pub const PAX_PATH: &str = "path";
/// PAX key for the link target.
pub const PAX_LINKPATH: &str = "linkpath";
/// PAX key for the payload size.
pub const PAX_SIZE: &str = "size";
/// PAX key for the owner user id.
pub const PAX_UID: &str = "uid";
/// PAX key for the owner group id.
pub const PAX_GID: &str = "gid";
/// PAX key for the owner user name.
pub const PAX_UNAME: &str = "uname";
/// PAX key for the owner group name.
pub const PAX_GNAME: &str = "gname";
/// PAX key for the modification time, in possibly fractional seconds.
pub const PAX_MTIME: &str = "mtime";
/// Star/Schily key for the device major number.
pub const PAX_SCHILY_DEVMAJOR: &str = "SCHILY.devmajor";
/// Star/Schily key for the device minor number.
pub const PAX_SCHILY_DEVMINOR: &str = "SCHILY.devminor";

/// Errors in a PAX payload.
#[derive(Debug, Error)]
pub enum PaxError {
    /// The length prefix is not a decimal number or is too small to hold
    /// the record it introduces.
    #[error("invalid PAX record length {:?}", String::from_utf8_lossy(.0))]
    InvalidLength(Vec<u8>),

    /// The payload ended before the declared record length.
    #[error("failed to read PAX header: expected {expected} bytes, read {actual}")]
    Truncated {
        /// Bytes still owed by the record after the `=`.
        expected: u64,
        /// Bytes actually available.
        actual: u64,
    },

    /// The record value does not end with a newline.
    #[error("PAX record for {key:?} does not end with a newline")]
    MissingNewline {
        /// The key of the offending record.
        key: String,
    },

    /// A recognised key carries a value of the wrong shape.
    #[error("invalid value {value:?} for PAX key {key:?}")]
    InvalidValue {
        /// The PAX key.
        key: String,
        /// The value as found in the payload.
        value: String,
    },
}

/// Key/value pairs from one PAX extended header. Later records for the same
/// key replace earlier ones.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PaxHeaders {
    map: HashMap<String, String>,
}

impl PaxHeaders {
    /// An empty set of headers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.map.get(key).map(String::as_str)
    }

    /// Insert a pair, returning the value it replaced.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.map.insert(key.into(), value.into())
    }

    /// Number of distinct keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Whether no keys are present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Iterate over the pairs in arbitrary order.
    pub fn iter(&self) -> hash_map::Iter<'_, String, String> {
        self.map.iter()
    }
}

impl Extend<(String, String)> for PaxHeaders {
    fn extend<I: IntoIterator<Item = (String, String)>>(&mut self, iter: I) {
        self.map.extend(iter);
    }
}

impl FromIterator<(String, String)> for PaxHeaders {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            map: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for PaxHeaders {
    type Item = (String, String);
    type IntoIter = hash_map::IntoIter<String, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.map.into_iter()
    }
}

impl<'a> IntoIterator for &'a PaxHeaders {
    type Item = (&'a String, &'a String);
    type IntoIter = hash_map::Iter<'a, String, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.map.iter()
    }
}

/// Parse PAX records from `reader` until it is exhausted.
///
/// Running out of input while reading a length or a key ends parsing
/// normally, so trailing garbage without a complete prefix is ignored. Once
/// the `=` of a record has been read, the rest of the record must be
/// present in full.
///
/// # Errors
///
/// Returns [`PaxError`] for a malformed record, and
/// [`StreamError::Io`](crate::stream::StreamError::Io) (or
/// whatever error the underlying entry reader raised) for read failures.
///
/// # Example
///
/// ```
/// use tar_stream::pax::parse_pax_headers;
///
/// let headers = parse_pax_headers(&b"20 path=renamed.txt\n"[..]).unwrap();
/// assert_eq!(headers.get("path"), Some("renamed.txt"));
/// ```
pub fn parse_pax_headers<R: BufRead>(mut reader: R) -> Result<PaxHeaders> {
    let mut headers = PaxHeaders::new();
    let mut digits = Vec::new();
    let mut key = Vec::new();

    loop {
        digits.clear();
        reader.read_until(b' ', &mut digits)?;
        if digits.pop() != Some(b' ') {
            break;
        }
        let len = parse_length(&digits)?;

        key.clear();
        reader.read_until(b'=', &mut key)?;
        if key.pop() != Some(b'=') {
            break;
        }

        let consumed = digits.len() + 1 + key.len() + 1;
        let rest = match len.checked_sub(consumed) {
            Some(rest) if rest > 0 => rest,
            _ => return Err(PaxError::InvalidLength(digits.clone()).into()),
        };

        let mut value = Vec::new();
        let got = reader.by_ref().take(rest as u64).read_to_end(&mut value)?;
        if got != rest {
            return Err(PaxError::Truncated {
                expected: rest as u64,
                actual: got as u64,
            }
            .into());
        }

        let key = String::from_utf8_lossy(&key).into_owned();
        if value.pop() != Some(b'\n') {
            return Err(PaxError::MissingNewline { key }.into());
        }
        headers.insert(key, String::from_utf8_lossy(&value).into_owned());
    }

    Ok(headers)
}

fn parse_length(digits: &[u8]) -> std::result::Result<usize, PaxError> {
    if digits.is_empty() || !digits.iter().all(u8::is_ascii_digit) {
        return Err(PaxError::InvalidLength(digits.to_vec()));
    }
    digits
        .iter()
        .try_fold(0usize, |acc, &d| {
            acc.checked_mul(10)?.checked_add(usize::from(d - b'0'))
        })
        .ok_or_else(|| PaxError::InvalidLength(digits.to_vec()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stream::StreamError;

    fn parse(data: &[u8]) -> Result<PaxHeaders> {
        parse_pax_headers(data)
    }

    /// Build a well-formed record for `key` and `value`.
    fn record(key: &str, value: &str) -> String {
        let body = format!(" {key}={value}\n");
        let mut len = body.len() + 1;
        // the length field counts its own digits
        while len.to_string().len() + body.len() != len {
            len += 1;
        }
        format!("{len}{body}")
    }

    #[test]
    fn test_single_record() {
        let headers = parse(b"20 path=renamed.txt\n").unwrap();
        assert_eq!(headers.len(), 1);
        assert_eq!(headers.get(PAX_PATH), Some("renamed.txt"));
    }

    #[test]
    fn test_multiple_records() {
        let data = format!(
            "{}{}{}",
            record("path", "a/b/c"),
            record("uid", "1000"),
            record("mtime", "1234567890.5")
        );
        let headers = parse(data.as_bytes()).unwrap();
        assert_eq!(headers.get(PAX_PATH), Some("a/b/c"));
        assert_eq!(headers.get(PAX_UID), Some("1000"));
        assert_eq!(headers.get(PAX_MTIME), Some("1234567890.5"));
    }

    #[test]
    fn test_last_write_wins() {
        let data = format!("{}{}", record("path", "first"), record("path", "second"));
        let headers = parse(data.as_bytes()).unwrap();
        assert_eq!(headers.len(), 1);
        assert_eq!(headers.get(PAX_PATH), Some("second"));
    }

    #[test]
    fn test_value_is_length_delimited() {
        // '=' and '\n' inside the value are plain bytes
        let data = record("comment", "a=b\nc");
        let headers = parse(data.as_bytes()).unwrap();
        assert_eq!(headers.get("comment"), Some("a=b\nc"));
    }

    #[test]
    fn test_unicode_value() {
        let data = record("path", "caf\u{e9}/\u{65e5}\u{672c}");
        let headers = parse(data.as_bytes()).unwrap();
        assert_eq!(headers.get(PAX_PATH), Some("caf\u{e9}/\u{65e5}\u{672c}"));
    }

    #[test]
    fn test_empty_payload() {
        assert!(parse(b"").unwrap().is_empty());
    }

    #[test]
    fn test_trailing_garbage_tolerated() {
        let mut data = record("path", "x").into_bytes();
        data.extend_from_slice(b"12");
        let headers = parse(&data).unwrap();
        assert_eq!(headers.get(PAX_PATH), Some("x"));

        let mut data = record("path", "x").into_bytes();
        data.extend_from_slice(b"30 incomplete-key");
        assert_eq!(parse(&data).unwrap().len(), 1);
    }

    #[test]
    fn test_truncated_value() {
        let err = parse(b"30 path=short\n").unwrap_err();
        assert!(matches!(
            err,
            StreamError::Pax(PaxError::Truncated {
                expected: 22,
                actual: 6
            })
        ));
    }

    #[test]
    fn test_invalid_length() {
        let err = parse(b"1x path=a\n").unwrap_err();
        assert!(matches!(err, StreamError::Pax(PaxError::InvalidLength(_))));

        // too short to even hold the key
        let err = parse(b"5 path=a\n").unwrap_err();
        assert!(matches!(err, StreamError::Pax(PaxError::InvalidLength(_))));

        let err = parse(b" path=a\n").unwrap_err();
        assert!(matches!(err, StreamError::Pax(PaxError::InvalidLength(_))));
    }

    #[test]
    fn test_missing_newline() {
        let err = parse(b"9 path=ab").unwrap_err();
        assert!(matches!(
            err,
            StreamError::Pax(PaxError::MissingNewline { ref key }) if key == "path"
        ));
    }

    #[test]
    fn test_record_helper_lengths() {
        assert_eq!(record("path", "renamed.txt"), "20 path=renamed.txt\n");
        // crossing from one to two length digits
        let r = record("k", "v");
        assert_eq!(r.len().to_string(), r.split(' ').next().unwrap());
    }
}
