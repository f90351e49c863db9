//! Text decoding for names stored in headers and GNU long name payloads.

/// How raw name bytes become strings.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum NameEncoding {
    /// UTF-8; invalid sequences become U+FFFD.
    #[default]
    Utf8,
    /// ISO-8859-1, where every byte maps to the code point of the same value.
    Latin1,
}

impl NameEncoding {
    /// Decode `bytes` into an owned string.
    #[must_use]
    pub fn decode(self, bytes: &[u8]) -> String {
        match self {
            NameEncoding::Utf8 => String::from_utf8_lossy(bytes).into_owned(),
            NameEncoding::Latin1 => bytes.iter().map(|&b| char::from(b)).collect(),
        }
    }
}
