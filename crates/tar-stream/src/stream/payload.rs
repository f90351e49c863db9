//! Byte-level reads of the current entry's payload.

use std::mem;

use log::trace;

use crate::record::RecordSource;

use super::error::{Result, StreamError};

/// Size of the scratch buffer used to discard payload bytes.
const SKIP_BUFFER_SIZE: usize = 8 * 1024;

/// Unread tail of the last record pulled from the source.
#[derive(Debug)]
struct Carry {
    record: Vec<u8>,
    pos: usize,
}

/// Position inside the current entry's payload.
///
/// Payloads start on a record boundary, and a record is never shared by two
/// entries, so the carry is dropped whenever a new payload starts.
#[derive(Debug, Default)]
pub(super) struct PayloadCursor {
    size: u64,
    offset: u64,
    carry: Option<Carry>,
    scratch: Vec<u8>,
}

impl PayloadCursor {
    /// Begin a payload of `size` bytes.
    pub(super) fn start(&mut self, size: u64) {
        self.size = size;
        self.offset = 0;
        self.carry = None;
    }

    pub(super) fn remaining(&self) -> u64 {
        self.size.saturating_sub(self.offset)
    }

    /// Copy up to `buf.len()` payload bytes into `buf`.
    ///
    /// Returns 0 only at the end of the payload (or for an empty `buf`).
    pub(super) fn read<S: RecordSource>(
        &mut self,
        source: &mut S,
        buf: &mut [u8],
    ) -> Result<usize> {
        let remaining = self.remaining();
        if remaining == 0 || buf.is_empty() {
            return Ok(0);
        }
        let limit = usize::try_from(remaining).unwrap_or(usize::MAX);
        let want = buf.len().min(limit);
        let mut filled = 0;

        if let Some(carry) = self.carry.as_mut() {
            let tail = &carry.record[carry.pos..];
            let n = tail.len().min(want);
            buf[..n].copy_from_slice(&tail[..n]);
            carry.pos += n;
            filled = n;
            if carry.pos == carry.record.len() {
                self.carry = None;
            }
        }

        while filled < want {
            let Some(record) = source.read_record()? else {
                return Err(StreamError::UnexpectedEof {
                    pos: source.bytes_read(),
                    missing: (want - filled) as u64,
                });
            };
            let n = record.len().min(want - filled);
            buf[filled..filled + n].copy_from_slice(&record[..n]);
            filled += n;
            if n < record.len() {
                self.carry = Some(Carry { record, pos: n });
            }
        }

        self.offset += filled as u64;
        trace!("read {filled} payload bytes, {} left", self.remaining());
        Ok(filled)
    }

    /// Discard up to `n` payload bytes, returning how many were discarded.
    pub(super) fn skip<S: RecordSource>(&mut self, source: &mut S, n: u64) -> Result<u64> {
        let mut scratch = mem::take(&mut self.scratch);
        if scratch.is_empty() {
            scratch.resize(SKIP_BUFFER_SIZE, 0);
        }

        let mut skipped = 0u64;
        let result = loop {
            if skipped >= n {
                break Ok(skipped);
            }
            let chunk = (n - skipped).min(scratch.len() as u64) as usize;
            match self.read(source, &mut scratch[..chunk]) {
                Ok(0) => break Ok(skipped),
                Ok(k) => skipped += k as u64,
                Err(e) => break Err(e),
            }
        };

        self.scratch = scratch;
        result
    }
}
