//! Property-based test generators using proptest.
//!
//! Provides strategies for records, line sequences and write chunkings
//! that respect the ring log's framing rules.

use proptest::prelude::*;
use ringlog_core::Record;

/// Strategy for one terminated record body with no inner newline.
pub fn line_strategy(max_len: usize) -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>().prop_filter("no newline", |b| *b != b'\n'), 0..max_len).prop_map(
        |mut body| {
            body.push(b'\n');
            body
        },
    )
}

/// Strategy for a valid record.
pub fn record_strategy() -> impl Strategy<Value = Record> {
    line_strategy(64).prop_map(|line| Record::new(line).expect("line is never empty"))
}

/// Strategy for a sequence of terminated lines.
pub fn line_sequence_strategy(min: usize, max: usize) -> impl Strategy<Value = Vec<Vec<u8>>> {
    prop::collection::vec(line_strategy(32), min..max)
}

/// Strategy for a byte stream and the cut points that split it into writes.
///
/// Cut points are sorted and lie within the stream.
pub fn chunked_stream_strategy(max_lines: usize) -> impl Strategy<Value = (Vec<u8>, Vec<usize>)> {
    line_sequence_strategy(0, max_lines).prop_flat_map(|lines| {
        let stream: Vec<u8> = lines.concat();
        let len = stream.len();
        prop::collection::vec(0..=len, 0..8).prop_map(move |mut cuts| {
            cuts.sort_unstable();
            (stream.clone(), cuts)
        })
    })
}

/// Splits `stream` at the given sorted cut points.
pub fn split_at_cuts<'a>(stream: &'a [u8], cuts: &[usize]) -> Vec<&'a [u8]> {
    let mut chunks = Vec::with_capacity(cuts.len() + 1);
    let mut start = 0;
    for &cut in cuts {
        chunks.push(&stream[start..cut]);
        start = cut;
    }
    chunks.push(&stream[start..]);
    chunks
}

/// An operation against a session.
#[derive(Debug, Clone)]
pub enum LogOperation {
    /// Write bytes
    Write {
        /// Bytes to write
        data: Vec<u8>,
    },
    /// Read up to `len` bytes
    Read {
        /// Buffer size
        len: usize,
    },
    /// Record seek
    SeekTo {
        /// Record ordinal
        ordinal: u64,
        /// Byte within the record
        offset: u64,
    },
}

/// Strategy for session operations.
pub fn log_operation_strategy() -> impl Strategy<Value = LogOperation> {
    prop_oneof![
        3 => prop::collection::vec(prop_oneof![4 => b'a'..=b'z', 1 => Just(b'\n')], 1..16)
            .prop_map(|data| LogOperation::Write { data }),
        2 => (1usize..32).prop_map(|len| LogOperation::Read { len }),
        1 => (0u64..12, 0u64..8).prop_map(|(ordinal, offset)| LogOperation::SeekTo { ordinal, offset }),
    ]
}

/// Strategy for a sequence of session operations.
pub fn operation_sequence_strategy(
    min_ops: usize,
    max_ops: usize,
) -> impl Strategy<Value = Vec<LogOperation>> {
    prop::collection::vec(log_operation_strategy(), min_ops..max_ops)
}

/// Configuration for property tests.
#[derive(Debug, Clone)]
pub struct PropTestConfig {
    /// Number of test cases to run.
    pub cases: u32,
    /// Maximum shrink iterations.
    pub max_shrink_iters: u32,
}

impl Default for PropTestConfig {
    fn default() -> Self {
        Self {
            cases: 256,
            max_shrink_iters: 1000,
        }
    }
}

impl PropTestConfig {
    /// Creates a configuration for quick tests.
    #[must_use]
    pub fn quick() -> Self {
        Self {
            cases: 32,
            max_shrink_iters: 100,
        }
    }

    /// Creates a configuration for thorough tests.
    #[must_use]
    pub fn thorough() -> Self {
        Self {
            cases: 1024,
            max_shrink_iters: 10000,
        }
    }

    /// Converts to proptest config.
    #[must_use]
    pub fn to_proptest_config(&self) -> ProptestConfig {
        ProptestConfig {
            cases: self.cases,
            max_shrink_iters: self.max_shrink_iters,
            ..ProptestConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ringlog_core::{Device, LogConfig, LogError, RingStore};
    use std::io::SeekFrom;

    fn store_with(capacity: usize, records: &[Record]) -> RingStore {
        let mut store = RingStore::with_capacity(capacity).unwrap();
        for record in records {
            store.insert(record.clone());
        }
        store
    }

    proptest! {
        #![proptest_config(PropTestConfig::default().to_proptest_config())]

        #[test]
        fn ring_keeps_newest_records(
            records in prop::collection::vec(record_strategy(), 0..40),
            capacity in 1usize..12,
        ) {
            let store = store_with(capacity, &records);
            let keep = records.len().min(capacity);
            let newest = &records[records.len() - keep..];

            prop_assert_eq!(store.len(), keep);
            prop_assert!(store.len() <= store.capacity());
            prop_assert_eq!(
                store.total_bytes(),
                newest.iter().map(|r| r.len() as u64).sum::<u64>()
            );
            let expected: Vec<u8> = newest.iter().flat_map(|r| r.as_bytes().to_vec()).collect();
            prop_assert_eq!(store.to_vec(), expected);
        }

        #[test]
        fn find_inverts_ordinal_to_offset(
            records in prop::collection::vec(record_strategy(), 1..30),
            capacity in 1usize..10,
        ) {
            let store = store_with(capacity, &records);
            for offset in 0..store.total_bytes() {
                let loc = store.find(offset).unwrap();
                prop_assert!(loc.offset < store.get(loc.ordinal).unwrap().len());
                prop_assert_eq!(store.ordinal_to_offset(loc.ordinal, loc.offset), Some(offset));
            }
            prop_assert!(store.find(store.total_bytes()).is_none());
        }

        #[test]
        fn record_boundary_belongs_to_next_record(
            records in prop::collection::vec(record_strategy(), 2..20),
            capacity in 2usize..10,
        ) {
            let store = store_with(capacity, &records);
            let mut start = 0u64;
            for ordinal in 0..store.len() {
                let loc = store.find(start).unwrap();
                prop_assert_eq!(loc.ordinal, ordinal);
                prop_assert_eq!(loc.offset, 0);
                start += store.get(ordinal).unwrap().len() as u64;
            }
        }

        #[test]
        fn chunking_does_not_change_records((stream, cuts) in chunked_stream_strategy(20)) {
            let whole = Device::new(LogConfig::new().capacity(64)).unwrap();
            whole.write(&stream, None).unwrap();

            let chunked = Device::new(LogConfig::new().capacity(64)).unwrap();
            for chunk in split_at_cuts(&stream, &cuts) {
                chunked.write(chunk, None).unwrap();
            }

            prop_assert_eq!(chunked.records().unwrap(), whole.records().unwrap());
            prop_assert_eq!(chunked.pending_bytes().unwrap(), 0);
        }

        #[test]
        fn reads_reproduce_stream(
            lines in line_sequence_strategy(0, 30),
            capacity in 1usize..10,
            buf_len in 1usize..40,
        ) {
            let device = Device::new(LogConfig::new().capacity(capacity)).unwrap();
            for line in &lines {
                device.write(line, None).unwrap();
            }

            let mut session = device.open();
            let mut out = Vec::new();
            let mut buf = vec![0u8; buf_len];
            loop {
                let n = session.read(&mut buf).unwrap();
                if n == 0 {
                    break;
                }
                out.extend_from_slice(&buf[..n]);
            }
            prop_assert_eq!(out, device.contents().unwrap());
            prop_assert_eq!(session.position(), device.total_bytes().unwrap());
        }

        #[test]
        fn session_operations_keep_invariants(ops in operation_sequence_strategy(1, 40)) {
            let device = Device::new(LogConfig::new().capacity(5)).unwrap();
            let mut session = device.open();

            for op in ops {
                match op {
                    LogOperation::Write { data } => {
                        prop_assert_eq!(session.write(&data).unwrap(), data.len());
                    }
                    LogOperation::Read { len } => {
                        let mut buf = vec![0u8; len];
                        let n = session.read(&mut buf).unwrap();
                        prop_assert!(n <= len);
                        prop_assert!(!session.has_pending_seek());
                    }
                    LogOperation::SeekTo { ordinal, offset } => {
                        let before = session.position();
                        match session.seek_to(ordinal, offset) {
                            Ok(pos) => prop_assert!(pos <= device.total_bytes().unwrap()),
                            Err(LogError::OutOfRange { .. }) => {
                                prop_assert_eq!(session.position(), before);
                            }
                            Err(other) => {
                                return Err(TestCaseError::fail(format!("unexpected error: {other}")));
                            }
                        }
                    }
                }
                prop_assert!(device.live_records().unwrap() <= 5);
            }

            let end = session.seek(SeekFrom::End(0)).unwrap();
            prop_assert_eq!(end, device.total_bytes().unwrap());
        }
    }

    #[test]
    fn split_at_cuts_covers_stream() {
        let chunks = split_at_cuts(b"abcdef", &[0, 2, 2, 6]);
        assert_eq!(chunks, vec![&b""[..], b"ab", b"", b"cdef", b""]);
    }
}
