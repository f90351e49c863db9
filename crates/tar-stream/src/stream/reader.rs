//! The entry iterator.

use std::io::{self, BufReader, Read};

use log::{debug, trace, warn};

use crate::header::{EntryType, GnuExtSparseHeader, Header};
use crate::pax::{parse_pax_headers, PaxHeaders};
use crate::record::{BlockReader, RecordSource};

use super::entry::{Overlay, TarEntry};
use super::error::{Result, StreamError};
use super::options::{OrphanPolicy, ReaderOptions};
use super::payload::PayloadCursor;

#[derive(Debug)]
enum ReaderState {
    /// No entry is current: before the first entry, or while meta-entries
    /// are being resolved.
    Idle,
    /// An entry has been returned and its payload may be read.
    Entry(TarEntry),
    /// The end of the archive was reached; sticky.
    Ended,
}

/// Streaming reader that yields fully resolved entries of a tar archive.
///
/// Meta-entries (GNU long names and links, PAX headers, GNU sparse
/// continuation records) are consumed internally and applied to the entry
/// they decorate, so [`next_entry`](Self::next_entry) only ever returns
/// real archive members.
///
/// After `next_entry` returns an entry its payload can be read with
/// [`read_payload`](Self::read_payload), [`skip`](Self::skip) or the
/// [`Read`] impl. Whatever is left unread is discarded by the next call to
/// `next_entry`.
///
/// # Example
///
/// ```
/// use std::io::Read;
/// use tar_stream::stream::TarStreamReader;
///
/// let mut builder = tar::Builder::new(Vec::new());
/// let mut header = tar::Header::new_gnu();
/// header.set_size(5);
/// header.set_cksum();
/// builder.append_data(&mut header, "hello.txt", &b"hello"[..]).unwrap();
/// let archive = builder.into_inner().unwrap();
///
/// let mut reader = TarStreamReader::new(&archive[..]);
/// while let Some(entry) = reader.next_entry().unwrap() {
///     let mut content = String::new();
///     reader.read_to_string(&mut content).unwrap();
///     assert_eq!((entry.name.as_str(), content.as_str()), ("hello.txt", "hello"));
/// }
/// ```
#[derive(Debug)]
pub struct TarStreamReader<S> {
    source: S,
    options: ReaderOptions,
    state: ReaderState,
    cursor: PayloadCursor,
    /// Defaults from PAX global headers seen so far.
    globals: PaxHeaders,
}

impl<R: Read> TarStreamReader<BlockReader<R>> {
    /// Read an archive from `reader` with default options.
    pub fn new(reader: R) -> Self {
        Self::from_source(BlockReader::new(reader), ReaderOptions::default())
    }

    /// Read an archive from `reader` with custom options.
    ///
    /// # Errors
    ///
    /// Returns [`StreamError::InvalidBlocking`] if the block and record
    /// sizes in `options` are unusable.
    pub fn with_options(reader: R, options: ReaderOptions) -> Result<Self> {
        let source =
            BlockReader::with_blocking(reader, options.block_size, options.record_size)?;
        Ok(Self::from_source(source, options))
    }
}

impl<S: RecordSource> TarStreamReader<S> {
    /// Read an archive from an existing record source.
    ///
    /// The block and record sizes in `options` are ignored; the source
    /// already has its own.
    pub fn from_source(source: S, options: ReaderOptions) -> Self {
        Self {
            source,
            options,
            state: ReaderState::Idle,
            cursor: PayloadCursor::default(),
            globals: PaxHeaders::new(),
        }
    }

    /// Advance to the next real entry.
    ///
    /// Any unread payload of the current entry is discarded first. Returns
    /// `Ok(None)` at the end of the archive, and keeps doing so on every
    /// later call.
    ///
    /// # Errors
    ///
    /// Fails on a malformed header or PAX record, on a configured limit
    /// being exceeded, on I/O errors, and when the archive ends in the
    /// middle of a meta-entry's payload.
    pub fn next_entry(&mut self) -> Result<Option<TarEntry>> {
        if matches!(self.state, ReaderState::Ended) {
            return Ok(None);
        }
        self.state = ReaderState::Idle;

        let mut overlays: Vec<Overlay> = Vec::new();
        let mut meta_count = 0usize;

        loop {
            self.drain_entry()?;

            let Some(record) = self.source.read_record()? else {
                return self.end_of_archive(&overlays);
            };
            if self.source.is_eof_record(&record) {
                self.source.try_consume_second_eof_record()?;
                return self.end_of_archive(&overlays);
            }

            let header = Header::from_bytes(&record)?;
            let entry = TarEntry::from_header(header, self.options.encoding)?;
            self.cursor.start(entry.size);

            if entry.entry_type.is_meta() {
                meta_count += 1;
                if meta_count > self.options.limits.max_pending_entries {
                    return Err(StreamError::TooManyPendingEntries {
                        count: meta_count,
                        limit: self.options.limits.max_pending_entries,
                    });
                }
            }

            match entry.entry_type {
                EntryType::GnuLongName => {
                    let name = self.read_long_name(entry.size)?;
                    debug!("GNU long name: {name}");
                    overlays.push(Overlay::Name(name));
                }
                EntryType::GnuLongLink => {
                    let link_name = self.read_long_name(entry.size)?;
                    debug!("GNU long link: {link_name}");
                    overlays.push(Overlay::LinkName(link_name));
                }
                EntryType::XHeader => {
                    let headers = self.read_pax(entry.size)?;
                    debug!("PAX header with {} records", headers.len());
                    overlays.push(Overlay::Pax(headers));
                }
                EntryType::XGlobalHeader => {
                    let headers = self.read_pax(entry.size)?;
                    debug!("PAX global header with {} records", headers.len());
                    self.globals.extend(headers);
                }
                _ => {
                    if entry.entry_type == EntryType::GnuSparse
                        && entry.is_extended
                        && !self.skip_sparse_continuations()?
                    {
                        return self.end_of_archive(&overlays);
                    }
                    let entry = self.resolve(entry, &overlays)?;
                    self.cursor.start(entry.size);
                    debug!(
                        "entry {:?} ({:?}, {} bytes) at byte {}",
                        entry.name,
                        entry.entry_type,
                        entry.size,
                        self.source.bytes_read()
                    );
                    self.state = ReaderState::Entry(entry.clone());
                    return Ok(Some(entry));
                }
            }
        }
    }

    /// The entry most recently returned by [`next_entry`](Self::next_entry),
    /// if its payload is still current.
    #[must_use]
    pub fn current_entry(&self) -> Option<&TarEntry> {
        match &self.state {
            ReaderState::Entry(entry) => Some(entry),
            _ => None,
        }
    }

    /// Whether this reader can return the payload of `entry` as file data.
    ///
    /// GNU sparse entries are not reconstructed; their payload holds only
    /// the stored regions.
    #[must_use]
    pub fn can_read_entry_data(&self, entry: &TarEntry) -> bool {
        !entry.is_sparse()
    }

    /// Read payload bytes of the current entry into `buf`.
    ///
    /// Returns 0 once the payload is exhausted.
    ///
    /// # Errors
    ///
    /// Returns [`StreamError::UnexpectedEof`] if the archive ends before the
    /// declared payload size, or an I/O error from the source.
    pub fn read_payload(&mut self, buf: &mut [u8]) -> Result<usize> {
        self.cursor.read(&mut self.source, buf)
    }

    /// Discard up to `n` payload bytes of the current entry, returning how
    /// many were discarded. Fewer than `n` means the payload ended.
    ///
    /// # Errors
    ///
    /// As for [`read_payload`](Self::read_payload).
    pub fn skip(&mut self, n: u64) -> Result<u64> {
        self.cursor.skip(&mut self.source, n)
    }

    /// Unread payload bytes of the current entry, saturated at `i32::MAX`.
    #[must_use]
    pub fn available(&self) -> usize {
        self.cursor.remaining().min(i32::MAX as u64) as usize
    }

    /// Unread payload bytes of the current entry.
    #[must_use]
    pub fn remaining(&self) -> u64 {
        self.cursor.remaining()
    }

    /// Bytes consumed from the record source so far.
    #[must_use]
    pub fn position(&self) -> u64 {
        self.source.bytes_read()
    }

    /// Size of the records this reader consumes.
    #[must_use]
    pub fn record_size(&self) -> usize {
        self.source.record_size()
    }

    /// The options this reader was created with.
    #[must_use]
    pub fn options(&self) -> &ReaderOptions {
        &self.options
    }

    /// Consume the reader, returning the record source.
    pub fn into_inner(self) -> S {
        self.source
    }

    /// Discard the rest of the current payload.
    fn drain_entry(&mut self) -> Result<()> {
        while self.cursor.remaining() > 0 {
            let remaining = self.cursor.remaining();
            if self.cursor.skip(&mut self.source, remaining)? == 0 {
                return Err(StreamError::SkipStalled { remaining });
            }
        }
        Ok(())
    }

    fn end_of_archive(&mut self, overlays: &[Overlay]) -> Result<Option<TarEntry>> {
        self.state = ReaderState::Ended;
        self.cursor.start(0);
        debug!("end of archive at byte {}", self.source.bytes_read());

        if overlays.is_empty() {
            return Ok(None);
        }
        match self.options.orphaned_metadata {
            OrphanPolicy::EndOfArchive => {
                warn!(
                    "archive ends after {} metadata entries without the entry they describe",
                    overlays.len()
                );
                Ok(None)
            }
            OrphanPolicy::Error => Err(StreamError::OrphanedMetadata),
        }
    }

    /// Read a GNU long name or long link payload.
    fn read_long_name(&mut self, size: u64) -> Result<String> {
        let limit = self.options.limits.max_gnu_long_size;
        if size > limit {
            return Err(StreamError::GnuLongTooLarge { size, limit });
        }

        let mut data = Vec::new();
        self.read_to_end(&mut data)?;
        while data.last() == Some(&0) {
            data.pop();
        }
        Ok(self.options.encoding.decode(&data))
    }

    fn read_pax(&mut self, size: u64) -> Result<PaxHeaders> {
        let limit = self.options.limits.max_pax_size;
        if size > limit {
            return Err(StreamError::PaxTooLarge { size, limit });
        }
        parse_pax_headers(BufReader::new(&mut *self))
    }

    /// Skip the continuation records of a GNU sparse header. Returns false
    /// if the archive ends, by running out of data or at an end-of-archive
    /// marker, before the last one.
    fn skip_sparse_continuations(&mut self) -> Result<bool> {
        loop {
            let Some(record) = self.source.read_record()? else {
                warn!("archive ends inside GNU sparse continuation records");
                return Ok(false);
            };
            if self.source.is_eof_record(&record) {
                self.source.try_consume_second_eof_record()?;
                warn!("end-of-archive marker inside GNU sparse continuation records");
                return Ok(false);
            }
            let ext = GnuExtSparseHeader::from_bytes(&record)?;
            trace!("skipped GNU sparse continuation record");
            if !ext.is_extended() {
                return Ok(true);
            }
        }
    }

    /// Apply global PAX defaults, then the collected overlays innermost
    /// first, and check the resulting paths against the limits.
    fn resolve(&self, entry: TarEntry, overlays: &[Overlay]) -> Result<TarEntry> {
        let mut entry = entry.with_pax(&self.globals)?;
        for overlay in overlays.iter().rev() {
            entry = entry.with_overlay(overlay)?;
        }

        let limit = self.options.limits.max_path_len;
        for path in [&entry.name, &entry.link_name] {
            if path.len() > limit {
                return Err(StreamError::PathTooLong {
                    len: path.len(),
                    limit,
                });
            }
        }
        Ok(entry)
    }
}

impl<S: RecordSource> Read for TarStreamReader<S> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        Ok(self.read_payload(buf)?)
    }
}
