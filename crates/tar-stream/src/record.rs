//! Fixed-size physical records over a blocked byte stream.
//!
//! Tar writers emit data in blocks (traditionally 20 records of 512 bytes).
//! [`BlockReader`] reads a whole block at a time from any [`Read`] and hands
//! it out one record at a time; [`RecordSource`] is the seam the entry
//! reader consumes, so other record providers can be plugged in.

use std::io::{self, Read};

use log::{trace, warn};

use crate::header::HEADER_SIZE;
use crate::stream::StreamError;

/// Default record size in bytes.
pub const DEFAULT_RECORD_SIZE: usize = HEADER_SIZE;

/// Default block size in bytes (a blocking factor of 20).
pub const DEFAULT_BLOCK_SIZE: usize = DEFAULT_RECORD_SIZE * 20;

/// A forward-only supplier of fixed-size records.
pub trait RecordSource {
    /// Size of every record this source returns.
    fn record_size(&self) -> usize;

    /// Read the next record, or `None` once the byte stream is exhausted.
    fn read_record(&mut self) -> io::Result<Option<Vec<u8>>>;

    /// Whether `record` is a logical end-of-archive marker.
    fn is_eof_record(&self, record: &[u8]) -> bool {
        record.iter().all(|&b| b == 0)
    }

    /// Consume the second end-of-archive marker if one follows.
    ///
    /// When the next record is not a marker it must stay unread, so that the
    /// next [`read_record`](RecordSource::read_record) returns it.
    fn try_consume_second_eof_record(&mut self) -> io::Result<()>;

    /// Number of bytes handed out as records so far.
    fn bytes_read(&self) -> u64;
}

/// Reads records out of fixed-size blocks of an underlying reader.
///
/// A final block that ends early is accepted: the last partial record is
/// padded with zeros and the stream ends after it.
#[derive(Debug)]
pub struct BlockReader<R> {
    inner: R,
    block: Box<[u8]>,
    /// Valid bytes in `block`, always a multiple of the record size.
    len: usize,
    /// Offset of the next record to hand out.
    next: usize,
    record_size: usize,
    pushed_back: Option<Vec<u8>>,
    bytes_read: u64,
    exhausted: bool,
}

impl<R: Read> BlockReader<R> {
    /// Read `inner` with the default 10240-byte blocks of 512-byte records.
    pub fn new(inner: R) -> Self {
        Self::with_layout(inner, DEFAULT_BLOCK_SIZE, DEFAULT_RECORD_SIZE)
    }

    /// Read `inner` with a custom blocking.
    ///
    /// # Errors
    ///
    /// Returns [`StreamError::InvalidBlocking`] unless `record_size` is at
    /// least one header and `block_size` is a positive multiple of it.
    pub fn with_blocking(
        inner: R,
        block_size: usize,
        record_size: usize,
    ) -> Result<Self, StreamError> {
        if record_size < HEADER_SIZE || block_size == 0 || block_size % record_size != 0 {
            return Err(StreamError::InvalidBlocking {
                block_size,
                record_size,
            });
        }
        Ok(Self::with_layout(inner, block_size, record_size))
    }

    fn with_layout(inner: R, block_size: usize, record_size: usize) -> Self {
        Self {
            inner,
            block: vec![0u8; block_size].into_boxed_slice(),
            len: 0,
            next: 0,
            record_size,
            pushed_back: None,
            bytes_read: 0,
            exhausted: false,
        }
    }

    /// The configured block size.
    #[must_use]
    pub fn block_size(&self) -> usize {
        self.block.len()
    }

    /// Get a reference to the underlying reader.
    pub fn get_ref(&self) -> &R {
        &self.inner
    }

    /// Consume the block reader, returning the underlying reader.
    ///
    /// Bytes already buffered from the current block are lost.
    pub fn into_inner(self) -> R {
        self.inner
    }

    /// Load the next block. Returns false at end of stream.
    fn fill_block(&mut self) -> io::Result<bool> {
        if self.exhausted {
            return Ok(false);
        }

        let mut filled = 0;
        while filled < self.block.len() {
            match self.inner.read(&mut self.block[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }

        if filled < self.block.len() {
            self.exhausted = true;
            if filled == 0 {
                return Ok(false);
            }
            let padded = filled.next_multiple_of(self.record_size);
            if padded != filled {
                warn!(
                    "stream ends inside a record at offset {}, padding {} bytes with zeros",
                    self.bytes_read + filled as u64,
                    padded - filled
                );
                self.block[filled..padded].fill(0);
            }
            self.len = padded;
        } else {
            self.len = filled;
        }

        trace!("loaded block of {} bytes", self.len);
        self.next = 0;
        Ok(true)
    }
}

impl<R: Read> RecordSource for BlockReader<R> {
    fn record_size(&self) -> usize {
        self.record_size
    }

    fn read_record(&mut self) -> io::Result<Option<Vec<u8>>> {
        if let Some(record) = self.pushed_back.take() {
            self.bytes_read += record.len() as u64;
            return Ok(Some(record));
        }

        if self.next >= self.len && !self.fill_block()? {
            return Ok(None);
        }

        let record = self.block[self.next..self.next + self.record_size].to_vec();
        self.next += self.record_size;
        self.bytes_read += self.record_size as u64;
        Ok(Some(record))
    }

    fn try_consume_second_eof_record(&mut self) -> io::Result<()> {
        match self.read_record()? {
            Some(record) if !self.is_eof_record(&record) => {
                self.bytes_read -= record.len() as u64;
                self.pushed_back = Some(record);
            }
            _ => {}
        }
        Ok(())
    }

    fn bytes_read(&self) -> u64 {
        self.bytes_read
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    /// A reader that returns at most `chunk` bytes per call.
    struct Trickle<R> {
        inner: R,
        chunk: usize,
    }

    impl<R: Read> Read for Trickle<R> {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            let len = buf.len().min(self.chunk);
            self.inner.read(&mut buf[..len])
        }
    }

    fn numbered_records(count: usize) -> Vec<u8> {
        (0..count)
            .flat_map(|i| std::iter::repeat_n(i as u8 + 1, 512))
            .collect()
    }

    #[test]
    fn test_records_across_blocks() {
        let data = numbered_records(5);
        let mut reader = BlockReader::with_blocking(Cursor::new(data), 1024, 512).unwrap();
        for i in 0..5u8 {
            let record = reader.read_record().unwrap().expect("record");
            assert_eq!(record.len(), 512);
            assert!(record.iter().all(|&b| b == i + 1));
        }
        assert!(reader.read_record().unwrap().is_none());
        assert!(reader.read_record().unwrap().is_none());
        assert_eq!(reader.bytes_read(), 5 * 512);
    }

    #[test]
    fn test_short_reads_fill_whole_blocks() {
        let data = numbered_records(4);
        let trickle = Trickle {
            inner: Cursor::new(data),
            chunk: 7,
        };
        let mut reader = BlockReader::with_blocking(trickle, 2048, 512).unwrap();
        for i in 0..4u8 {
            let record = reader.read_record().unwrap().expect("record");
            assert!(record.iter().all(|&b| b == i + 1));
        }
        assert!(reader.read_record().unwrap().is_none());
    }

    #[test]
    fn test_partial_record_is_zero_padded() {
        let mut data = numbered_records(1);
        data.extend_from_slice(&[9u8; 100]);
        let mut reader = BlockReader::new(Cursor::new(data));
        reader.read_record().unwrap().expect("first record");
        let tail = reader.read_record().unwrap().expect("padded record");
        assert_eq!(&tail[..100], &[9u8; 100][..]);
        assert!(tail[100..].iter().all(|&b| b == 0));
        assert!(reader.read_record().unwrap().is_none());
    }

    #[test]
    fn test_second_eof_record_consumed() {
        let mut data = vec![0u8; 1024];
        data.extend_from_slice(&numbered_records(1));
        let mut reader = BlockReader::new(Cursor::new(data));
        let first = reader.read_record().unwrap().unwrap();
        assert!(reader.is_eof_record(&first));
        reader.try_consume_second_eof_record().unwrap();
        assert_eq!(reader.bytes_read(), 1024);
        let next = reader.read_record().unwrap().unwrap();
        assert!(next.iter().all(|&b| b == 1));
    }

    #[test]
    fn test_non_eof_record_is_pushed_back() {
        let mut data = vec![0u8; 512];
        data.extend_from_slice(&numbered_records(1));
        let mut reader = BlockReader::new(Cursor::new(data));
        reader.read_record().unwrap().unwrap();
        reader.try_consume_second_eof_record().unwrap();
        assert_eq!(reader.bytes_read(), 512);
        let next = reader.read_record().unwrap().unwrap();
        assert!(next.iter().all(|&b| b == 1));
        assert_eq!(reader.bytes_read(), 1024);
    }

    #[test]
    fn test_invalid_blocking() {
        let inner = Cursor::new(Vec::new());
        let err = BlockReader::with_blocking(inner, 1000, 512).unwrap_err();
        assert!(matches!(
            err,
            StreamError::InvalidBlocking {
                block_size: 1000,
                record_size: 512
            }
        ));
        assert!(BlockReader::with_blocking(io::empty(), 256, 256).is_err());
        assert!(BlockReader::with_blocking(io::empty(), 0, 512).is_err());
    }
}
