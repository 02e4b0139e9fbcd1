//! Translation between global byte offsets and record positions.

use super::store::RingStore;

/// A position inside a live record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Location {
    /// Live ordinal of the record (0 = oldest).
    pub ordinal: usize,
    /// Physical slot holding the record.
    pub slot: usize,
    /// Byte offset within the record.
    pub offset: usize,
}

impl RingStore {
    /// Locates the record holding the given global byte offset.
    ///
    /// Returns `None` iff `offset >= total_bytes()`. An offset equal to the
    /// cumulative size of the first `m` records resolves to offset 0 of
    /// record `m`.
    #[must_use]
    pub fn find(&self, offset: u64) -> Option<Location> {
        if offset >= self.total_bytes() {
            return None;
        }

        let mut remaining = offset;
        for (ordinal, record) in self.iter().enumerate() {
            let size = record.len() as u64;
            if remaining < size {
                return Some(Location {
                    ordinal,
                    slot: self.slot_of(ordinal),
                    offset: remaining as usize,
                });
            }
            remaining -= size;
        }

        None
    }

    /// Converts a record ordinal and intra-record offset to a global offset.
    ///
    /// Returns `None` if `ordinal` does not name a live record or `offset`
    /// is larger than that record.
    #[must_use]
    pub fn ordinal_to_offset(&self, ordinal: usize, offset: usize) -> Option<u64> {
        let record = self.get(ordinal)?;
        if offset > record.len() {
            return None;
        }

        let preceding: u64 = self.iter().take(ordinal).map(|r| r.len() as u64).sum();
        Some(preceding + offset as u64)
    }

    /// Copies live bytes starting at `start` into `buf`.
    ///
    /// Copying walks the slots forward, wrapping from the last physical slot
    /// to slot 0, and stops before record `end_ordinal` or when `buf` is
    /// full. Returns the number of bytes copied.
    pub fn read_range(&self, start: Location, end_ordinal: usize, buf: &mut [u8]) -> usize {
        let end_ordinal = end_ordinal.min(self.len());
        let mut copied = 0;
        let mut slot = start.slot;
        let mut skip = start.offset;

        for _ in start.ordinal..end_ordinal {
            if copied == buf.len() {
                break;
            }
            let Some(record) = self.slot(slot) else {
                break;
            };

            let src = record.as_bytes().get(skip..).unwrap_or_default();
            let n = src.len().min(buf.len() - copied);
            buf[copied..copied + n].copy_from_slice(&src[..n]);
            copied += n;

            slot = (slot + 1) % self.capacity();
            skip = 0;
        }

        copied
    }

    /// Copies bytes from global `offset` to the end of the live stream into `buf`.
    ///
    /// Returns 0 when `offset` is at or past the end.
    pub fn read_at(&self, offset: u64, buf: &mut [u8]) -> usize {
        match self.find(offset) {
            Some(start) => self.read_range(start, self.len(), buf),
            None => 0,
        }
    }
}
