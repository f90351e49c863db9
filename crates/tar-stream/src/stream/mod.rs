//! Streaming entry iteration with transparent meta-entry resolution.
//!
//! # Overview
//!
//! A tar archive is a sequence of fixed-size records. Each member starts
//! with a header record followed by its payload, padded to a whole record.
//! Several kinds of member carry no file data but describe the member that
//! follows them:
//!
//! - **GNU long name (type 'L')** and **long link (type 'K')**: paths that
//!   do not fit in the 100-byte header fields
//! - **PAX extended headers (type 'x')**: key/value pairs overriding header
//!   fields of the next entry
//! - **PAX global headers (type 'g')**: defaults for every later entry
//! - **GNU sparse continuations**: extra sparse map records after an `'S'`
//!   header
//!
//! [`TarStreamReader`] consumes all of these and returns only real members,
//! as [`TarEntry`] values with every override applied. When several
//! meta-entries precede one member, the earliest one wins.
//!
//! # Limits
//!
//! Meta-entry payloads are read into memory, so [`Limits`] bounds their size,
//! the length of resolved paths and the number of meta-entries in a row.
//!
//! # Example
//!
//! ```no_run
//! use std::fs::File;
//! use std::io;
//! use tar_stream::stream::{ReaderOptions, TarStreamReader};
//!
//! let file = File::open("archive.tar").unwrap();
//! let mut reader = TarStreamReader::with_options(file, ReaderOptions::default()).unwrap();
//!
//! while let Some(entry) = reader.next_entry().unwrap() {
//!     println!("{} ({} bytes)", entry.name, entry.size);
//!     if entry.name.ends_with(".txt") {
//!         io::copy(&mut reader, &mut io::stdout()).unwrap();
//!     }
//! }
//! ```

mod entry;
mod error;
mod limits;
mod options;
mod payload;
mod reader;

pub use entry::{Overlay, TarEntry};
pub use error::{Result, StreamError};
pub use limits::Limits;
pub use options::{OrphanPolicy, ReaderOptions};
pub use reader::TarStreamReader;
