//! Assembly of partial writes into records.
//!
//! Bytes from consecutive write calls accumulate until a terminator arrives.
//! Every terminator closes one record, so a single write carrying
//! `"a\nb\nc"` commits `a\n` and `b\n` and keeps `c` pending for the next
//! call. Partial data is never visible to readers.

use crate::config::LogConfig;
use crate::error::{LogError, LogResult};
use crate::record::Record;

/// Accumulates written bytes until they form complete records.
#[derive(Debug)]
pub struct WriteAssembler {
    pending: Vec<u8>,
    terminator: u8,
    max_pending: usize,
}

impl WriteAssembler {
    /// Creates an assembler with the given terminator and pending cap.
    #[must_use]
    pub fn new(terminator: u8, max_pending: usize) -> Self {
        Self {
            pending: Vec::new(),
            terminator,
            max_pending,
        }
    }

    /// Creates an assembler from a log configuration.
    #[must_use]
    pub fn from_config(config: &LogConfig) -> Self {
        Self::new(config.terminator, config.max_pending_bytes)
    }

    /// Returns the number of unterminated bytes held.
    #[must_use]
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Returns true if no partial write is held.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Drops any partial write, returning how many bytes were discarded.
    pub fn clear(&mut self) -> usize {
        let dropped = self.pending.len();
        self.pending = Vec::new();
        dropped
    }

    /// Appends `bytes` and returns every record they complete, in order.
    ///
    /// # Errors
    ///
    /// Returns `ResourceExhausted` if the bytes left unterminated would exceed
    /// the pending cap, or if memory for a record cannot be reserved. The
    /// assembler is unchanged when an error is returned.
    pub fn feed(&mut self, bytes: &[u8]) -> LogResult<Vec<Record>> {
        if bytes.is_empty() {
            return Ok(Vec::new());
        }

        let leftover = match bytes.iter().rposition(|&b| b == self.terminator) {
            Some(last) => bytes.len() - last - 1,
            None => self.pending.len() + bytes.len(),
        };
        if leftover > self.max_pending {
            return Err(LogError::resource_exhausted(leftover, self.max_pending));
        }

        let mut records = Vec::new();
        let mut carried: &[u8] = &self.pending;
        let mut rest = bytes;
        while let Some(pos) = rest.iter().position(|&b| b == self.terminator) {
            let (line, tail) = rest.split_at(pos + 1);
            let mut data = Vec::new();
            reserve(&mut data, carried.len() + line.len(), self.max_pending)?;
            data.extend_from_slice(carried);
            data.extend_from_slice(line);
            records.push(Record::new(data)?);
            carried = &[];
            rest = tail;
        }

        if records.is_empty() {
            reserve(&mut self.pending, rest.len(), self.max_pending)?;
            self.pending.extend_from_slice(rest);
        } else {
            let mut next = Vec::new();
            reserve(&mut next, rest.len(), self.max_pending)?;
            next.extend_from_slice(rest);
            self.pending = next;
        }

        Ok(records)
    }
}

fn reserve(buf: &mut Vec<u8>, additional: usize, limit: usize) -> LogResult<()> {
    buf.try_reserve_exact(additional)
        .map_err(|_| LogError::resource_exhausted(buf.len() + additional, limit))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assembler() -> WriteAssembler {
        WriteAssembler::new(b'\n', 64)
    }

    fn bytes_of(records: &[Record]) -> Vec<&[u8]> {
        records.iter().map(Record::as_bytes).collect()
    }

    #[test]
    fn terminated_write_commits_one_record() {
        let mut asm = assembler();
        let records = asm.feed(b"hello\n").unwrap();
        assert_eq!(bytes_of(&records), vec![&b"hello\n"[..]]);
        assert!(asm.is_empty());
    }

    #[test]
    fn partial_writes_accumulate() {
        let mut asm = assembler();
        assert!(asm.feed(b"hel").unwrap().is_empty());
        assert!(asm.feed(b"lo ").unwrap().is_empty());
        assert_eq!(asm.pending_len(), 6);

        let records = asm.feed(b"world\n").unwrap();
        assert_eq!(bytes_of(&records), vec![&b"hello world\n"[..]]);
        assert_eq!(asm.pending_len(), 0);
    }

    #[test]
    fn several_terminators_split_into_records() {
        let mut asm = assembler();
        let records = asm.feed(b"a\nb\nc").unwrap();
        assert_eq!(bytes_of(&records), vec![&b"a\n"[..], &b"b\n"[..]]);
        assert_eq!(asm.pending_len(), 1);

        let records = asm.feed(b"\n").unwrap();
        assert_eq!(bytes_of(&records), vec![&b"c\n"[..]]);
    }

    #[test]
    fn pending_prefix_joins_first_record_only() {
        let mut asm = assembler();
        asm.feed(b"x").unwrap();
        let records = asm.feed(b"1\n2\n").unwrap();
        assert_eq!(bytes_of(&records), vec![&b"x1\n"[..], &b"2\n"[..]]);
    }

    #[test]
    fn bare_terminator_is_a_record() {
        let mut asm = assembler();
        let records = asm.feed(b"\n").unwrap();
        assert_eq!(bytes_of(&records), vec![&b"\n"[..]]);
    }

    #[test]
    fn empty_feed_is_noop() {
        let mut asm = assembler();
        asm.feed(b"abc").unwrap();
        assert!(asm.feed(b"").unwrap().is_empty());
        assert_eq!(asm.pending_len(), 3);
    }

    #[test]
    fn pending_cap_rejects_without_mutation() {
        let mut asm = WriteAssembler::new(b'\n', 8);
        asm.feed(b"12345").unwrap();

        let err = asm.feed(b"6789").unwrap_err();
        assert!(matches!(
            err,
            LogError::ResourceExhausted {
                requested: 9,
                limit: 8
            }
        ));
        assert_eq!(asm.pending_len(), 5);

        let records = asm.feed(b"\n").unwrap();
        assert_eq!(bytes_of(&records), vec![&b"12345\n"[..]]);
    }

    #[test]
    fn cap_applies_to_leftover_not_committed_bytes() {
        let mut asm = WriteAssembler::new(b'\n', 4);
        let records = asm.feed(b"a long committed line\nxy").unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(asm.pending_len(), 2);
    }

    #[test]
    fn custom_terminator() {
        let mut asm = WriteAssembler::new(b';', 64);
        let records = asm.feed(b"a\nb;c").unwrap();
        assert_eq!(bytes_of(&records), vec![&b"a\nb;"[..]]);
        assert_eq!(asm.pending_len(), 1);
    }

    #[test]
    fn clear_drops_partial() {
        let mut asm = assembler();
        asm.feed(b"abc").unwrap();
        assert_eq!(asm.clear(), 3);
        assert!(asm.is_empty());
    }

    mod props {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn feeding_in_chunks_commits_every_terminated_line(
                data in prop::collection::vec(prop_oneof![3 => b'a'..=b'c', 1 => Just(b'\n')], 0..200),
                cut in 0usize..200,
            ) {
                let cut = cut.min(data.len());
                let mut asm = WriteAssembler::new(b'\n', 1024);
                let mut records = asm.feed(&data[..cut]).unwrap();
                records.extend(asm.feed(&data[cut..]).unwrap());

                let expected: Vec<&[u8]> = data.split_inclusive(|&b| b == b'\n')
                    .filter(|line| line.ends_with(b"\n"))
                    .collect();
                prop_assert_eq!(bytes_of(&records), expected);

                let tail = data.len() - data.iter().rposition(|&b| b == b'\n').map_or(0, |p| p + 1);
                prop_assert_eq!(asm.pending_len(), tail);
            }
        }
    }
}
