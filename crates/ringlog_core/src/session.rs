//! Per-handle cursor and seek state.

use crate::device::{Device, Interrupt};
use crate::error::{LogError, LogResult};
use std::io::{self, SeekFrom};
use std::sync::Arc;
use tracing::debug;

/// Seek state of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeekState {
    /// The cursor is an explicit byte offset.
    Normal,
    /// A record seek resolved to `offset` and will be applied by the next read.
    SeekPending {
        /// Global offset the next read starts from.
        offset: u64,
    },
}

/// An open handle on a [`Device`].
///
/// Each session keeps its own byte cursor. Writes are always appended to
/// the end of the log regardless of the cursor.
///
/// `Session` also implements [`std::io::Read`], [`std::io::Write`] and
/// [`std::io::Seek`], mapping [`LogError`] onto [`io::ErrorKind`].
#[derive(Debug)]
pub struct Session {
    device: Arc<Device>,
    position: u64,
    state: SeekState,
    interrupt: Option<Interrupt>,
}

impl Session {
    pub(crate) fn new(device: Arc<Device>) -> Self {
        Self {
            device,
            position: 0,
            state: SeekState::Normal,
            interrupt: None,
        }
    }

    /// Makes lock acquisition for this session interruptible.
    #[must_use]
    pub fn with_interrupt(mut self, interrupt: Interrupt) -> Self {
        self.interrupt = Some(interrupt);
        self
    }

    /// Returns the device this session reads from.
    #[must_use]
    pub fn device(&self) -> &Arc<Device> {
        &self.device
    }

    /// Returns the current byte cursor.
    ///
    /// A pending record seek is not reflected until the next read.
    #[must_use]
    pub fn position(&self) -> u64 {
        self.position
    }

    /// Returns the seek state.
    #[must_use]
    pub fn seek_state(&self) -> SeekState {
        self.state
    }

    /// Returns true if a record seek waits for the next read.
    #[must_use]
    pub fn has_pending_seek(&self) -> bool {
        matches!(self.state, SeekState::SeekPending { .. })
    }

    /// Reads from the cursor into `buf`, crossing record boundaries.
    ///
    /// A pending record seek is applied first. Returns 0 at or past the end
    /// of the stream. The cursor advances by the bytes copied.
    ///
    /// # Errors
    ///
    /// Returns `Interrupted` or `Closed`; the session is unchanged in both cases.
    pub fn read(&mut self, buf: &mut [u8]) -> LogResult<usize> {
        let state = self.device.lock(self.interrupt.as_ref())?;

        if let SeekState::SeekPending { offset } = self.state {
            self.position = offset;
            self.state = SeekState::Normal;
        }

        let copied = state.store.read_at(self.position, buf);
        self.position += copied as u64;
        drop(state);

        self.device.record_read(copied);
        Ok(copied)
    }

    /// Appends `bytes` to the log. Returns `bytes.len()` on success.
    ///
    /// # Errors
    ///
    /// See [`Device::write`].
    pub fn write(&mut self, bytes: &[u8]) -> LogResult<usize> {
        self.device.write(bytes, self.interrupt.as_ref())
    }

    /// Requests that the next read start at byte `offset` of live record `ordinal`.
    ///
    /// The target is resolved against the records live now and returned.
    ///
    /// # Errors
    ///
    /// Returns `OutOfRange` if `ordinal` is not a live record or `offset` is
    /// larger than that record; the session is unchanged.
    pub fn seek_to(&mut self, ordinal: u64, offset: u64) -> LogResult<u64> {
        let state = self.device.lock(self.interrupt.as_ref())?;

        let resolved = usize::try_from(ordinal)
            .ok()
            .zip(usize::try_from(offset).ok())
            .and_then(|(n, k)| state.store.ordinal_to_offset(n, k));

        match resolved {
            Some(target) => {
                self.state = SeekState::SeekPending { offset: target };
                debug!(ordinal, offset, target, "record seek pending");
                Ok(target)
            }
            None => Err(LogError::out_of_range(ordinal, offset)),
        }
    }

    /// Moves the cursor to an absolute, relative or end-relative position.
    ///
    /// The end of the stream is the current live byte count. Any pending
    /// record seek is discarded.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` if the result would be negative or overflow;
    /// the cursor is unchanged.
    pub fn seek(&mut self, pos: SeekFrom) -> LogResult<u64> {
        let state = self.device.lock(self.interrupt.as_ref())?;

        let target = match pos {
            SeekFrom::Start(offset) => Some(offset),
            SeekFrom::Current(delta) => self.position.checked_add_signed(delta),
            SeekFrom::End(delta) => state.store.total_bytes().checked_add_signed(delta),
        };
        let target = target
            .ok_or_else(|| LogError::invalid_argument(format!("invalid seek to {pos:?}")))?;

        self.position = target;
        self.state = SeekState::Normal;
        Ok(target)
    }
}

impl io::Read for Session {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        Session::read(self, buf).map_err(io::Error::from)
    }
}

impl io::Write for Session {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        Session::write(self, buf).map_err(io::Error::from)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl io::Seek for Session {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        Session::seek(self, pos).map_err(io::Error::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LogConfig;
    use std::io::Read;

    fn device(capacity: usize) -> Arc<Device> {
        Device::new(LogConfig::new().capacity(capacity)).unwrap()
    }

    fn read_all(session: &mut Session) -> Vec<u8> {
        let mut out = Vec::new();
        session.read_to_end(&mut out).unwrap();
        out
    }

    #[test]
    fn capacity_two_keeps_last_two() {
        let dev = device(2);
        let mut session = dev.open();
        session.write(b"ab\n").unwrap();
        session.write(b"cd\n").unwrap();
        session.write(b"ef\n").unwrap();

        let mut buf = [0u8; 32];
        assert_eq!(session.read(&mut buf).unwrap(), 6);
        assert_eq!(&buf[..6], b"cd\nef\n");
        assert_eq!(session.position(), 6);
        assert_eq!(session.read(&mut buf).unwrap(), 0);
    }

    #[test]
    fn seek_to_record_then_read() {
        let dev = device(3);
        let mut session = dev.open();
        session.write(b"aa\n").unwrap();
        session.write(b"bbbb\n").unwrap();

        assert_eq!(session.seek_to(1, 2).unwrap(), 5);
        assert!(session.has_pending_seek());
        assert_eq!(session.position(), 0);

        let mut buf = [0u8; 10];
        let n = session.read(&mut buf).unwrap();
        assert_eq!(&buf[..n], b"bb\n");
        assert!(!session.has_pending_seek());
        assert_eq!(session.position(), 8);
    }

    #[test]
    fn seek_to_out_of_range_leaves_session_unchanged() {
        let dev = device(3);
        let mut session = dev.open();
        session.write(b"aa\nbbbb\n").unwrap();
        session.seek(SeekFrom::Start(1)).unwrap();

        assert_eq!(session.seek_to(2, 0), Err(LogError::out_of_range(2, 0)));
        assert_eq!(session.seek_to(0, 4), Err(LogError::out_of_range(0, 4)));
        assert_eq!(session.seek_to(u64::MAX, 0), Err(LogError::out_of_range(u64::MAX, 0)));
        assert_eq!(session.seek_state(), SeekState::Normal);
        assert_eq!(session.position(), 1);
    }

    #[test]
    fn seek_to_replaces_earlier_pending_seek() {
        let dev = device(3);
        let mut session = dev.open();
        session.write(b"aa\nbbbb\nc\n").unwrap();

        session.seek_to(1, 0).unwrap();
        session.seek_to(2, 0).unwrap();
        assert_eq!(read_all(&mut session), b"c\n".to_vec());
    }

    #[test]
    fn seek_to_resolves_against_live_records_after_eviction() {
        let dev = device(2);
        let mut session = dev.open();
        session.write(b"old\nmid\nnew\n").unwrap();

        session.seek_to(1, 0).unwrap();
        assert_eq!(read_all(&mut session), b"new\n".to_vec());
    }

    #[test]
    fn generic_seek_modes() {
        let dev = device(3);
        let mut session = dev.open();
        session.write(b"hello\nworld\n").unwrap();

        assert_eq!(session.seek(SeekFrom::Start(6)).unwrap(), 6);
        assert_eq!(session.seek(SeekFrom::Current(-2)).unwrap(), 4);
        assert_eq!(session.seek(SeekFrom::End(-3)).unwrap(), 9);
        assert_eq!(read_all(&mut session), b"ld\n".to_vec());

        assert_eq!(session.seek(SeekFrom::End(5)).unwrap(), 17);
        let mut buf = [0u8; 4];
        assert_eq!(session.read(&mut buf).unwrap(), 0);
    }

    #[test]
    fn negative_seek_rejected() {
        let dev = device(3);
        let mut session = dev.open();
        session.write(b"abc\n").unwrap();
        session.seek(SeekFrom::Start(2)).unwrap();

        let err = session.seek(SeekFrom::Current(-3)).unwrap_err();
        assert!(matches!(err, LogError::InvalidArgument { .. }));
        assert!(session.seek(SeekFrom::End(-5)).is_err());
        assert_eq!(session.position(), 2);
    }

    #[test]
    fn generic_seek_discards_pending_record_seek() {
        let dev = device(3);
        let mut session = dev.open();
        session.write(b"aa\nbbbb\n").unwrap();

        session.seek_to(1, 0).unwrap();
        session.seek(SeekFrom::Start(0)).unwrap();
        assert_eq!(read_all(&mut session), b"aa\nbbbb\n".to_vec());
    }

    #[test]
    fn sessions_have_independent_cursors() {
        let dev = device(3);
        let mut a = dev.open();
        let mut b = dev.open();
        a.write(b"one\ntwo\n").unwrap();

        let mut buf = [0u8; 4];
        a.read(&mut buf).unwrap();
        assert_eq!(a.position(), 4);
        assert_eq!(b.position(), 0);
        assert_eq!(read_all(&mut b), b"one\ntwo\n".to_vec());
    }

    #[test]
    fn small_reads_walk_the_stream() {
        let dev = device(3);
        let mut session = dev.open();
        session.write(b"ab\ncd\n").unwrap();

        let mut out = Vec::new();
        let mut buf = [0u8; 4];
        loop {
            let n = session.read(&mut buf).unwrap();
            if n == 0 {
                break;
            }
            out.extend_from_slice(&buf[..n]);
        }
        assert_eq!(out, b"ab\ncd\n".to_vec());
    }

    #[test]
    fn io_traits_map_errors() {
        use std::io::Seek;

        let dev = device(3);
        let mut session = dev.open();
        let err = Seek::seek(&mut session, SeekFrom::Current(-1)).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);

        dev.close().unwrap();
        let mut buf = [0u8; 1];
        let err = Read::read(&mut session, &mut buf).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotConnected);
    }
}
