//! Streaming reader for tar archives.
//!
//! The crate reads POSIX ustar, GNU and old (v7) archives from any
//! [`std::io::Read`], one entry at a time, without buffering more than one
//! block of the stream. GNU long names and links, PAX extended and global
//! headers and GNU sparse continuation records are resolved internally.
//!
//! The layers, bottom up:
//!
//! - [`record`]: fixed-size records out of a blocked byte stream
//! - [`header`]: zerocopy views and field decoding of 512-byte headers
//! - [`pax`]: the PAX extended header tokenizer
//! - [`stream`]: the entry iterator and payload reader
//! - [`signature`]: stateless detection of the tar dialect of a header
//!
//! # Example
//!
//! ```
//! use tar_stream::stream::TarStreamReader;
//!
//! let mut builder = tar::Builder::new(Vec::new());
//! let mut header = tar::Header::new_ustar();
//! header.set_size(0);
//! header.set_entry_type(tar::EntryType::Directory);
//! builder.append_data(&mut header, "etc/", std::io::empty()).unwrap();
//! let archive = builder.into_inner().unwrap();
//!
//! assert!(tar_stream::matches(&archive));
//! let mut reader = TarStreamReader::new(&archive[..]);
//! let entry = reader.next_entry().unwrap().unwrap();
//! assert!(entry.is_dir());
//! assert!(reader.next_entry().unwrap().is_none());
//! ```

pub mod encoding;
pub mod header;
pub mod pax;
pub mod record;
pub mod signature;
pub mod stream;

pub use encoding::NameEncoding;
pub use header::{EntryType, Header, HeaderError, HEADER_SIZE};
pub use pax::{PaxError, PaxHeaders};
pub use record::{BlockReader, RecordSource, DEFAULT_BLOCK_SIZE, DEFAULT_RECORD_SIZE};
pub use signature::{detect, matches, TarFormat};
pub use stream::{StreamError, TarEntry, TarStreamReader};
