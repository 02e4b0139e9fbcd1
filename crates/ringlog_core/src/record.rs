//! Committed log records.

use crate::error::{LogError, LogResult};
use std::fmt;

/// One committed, terminator-delimited unit of stored data.
///
/// A record is never empty: [`Record::new`] rejects zero-length data, so
/// every record held by a [`crate::RingStore`] counts as live.
#[derive(Clone, PartialEq, Eq)]
pub struct Record {
    data: Vec<u8>,
}

impl Record {
    /// Creates a record from owned bytes.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` if `data` is empty.
    pub fn new(data: Vec<u8>) -> LogResult<Self> {
        if data.is_empty() {
            return Err(LogError::invalid_argument("record must not be empty"));
        }
        Ok(Self { data })
    }

    /// Returns the record size in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns true if the record holds no bytes.
    ///
    /// Never true for a record built through [`Record::new`].
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns the stored bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Consumes the record and returns its storage.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }
}

impl AsRef<[u8]> for Record {
    fn as_ref(&self) -> &[u8] {
        &self.data
    }
}

impl TryFrom<&[u8]> for Record {
    type Error = LogError;

    fn try_from(value: &[u8]) -> LogResult<Self> {
        Self::new(value.to_vec())
    }
}

impl fmt::Debug for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Record")
            .field("len", &self.data.len())
            .field("data", &String::from_utf8_lossy(&self.data))
            .finish()
    }
}
