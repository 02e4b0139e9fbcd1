//! Record slots, insertion and eviction.

use crate::error::{LogError, LogResult};
use crate::record::Record;

/// A fixed-capacity circular store of records.
///
/// # Invariants
///
/// - When not full, exactly the slots `[tail, head)` (wrapping) are live
/// - When full, every slot is live and `head == tail`
/// - A slot holds `Some` iff it is live
/// - `total_bytes` is the sum of the sizes of all live records
///
/// Records are owned by the store once inserted. The only ways out are
/// eviction (returned from [`RingStore::insert`]) and [`RingStore::drain`].
#[derive(Debug)]
pub struct RingStore {
    slots: Vec<Option<Record>>,
    head: usize,
    tail: usize,
    full: bool,
    total_bytes: u64,
}

impl RingStore {
    /// Creates an empty store with `capacity` record slots.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` if `capacity` is zero.
    pub fn with_capacity(capacity: usize) -> LogResult<Self> {
        if capacity == 0 {
            return Err(LogError::invalid_argument(
                "ring capacity must be at least one record",
            ));
        }
        let mut slots = Vec::new();
        slots.resize_with(capacity, || None);
        Ok(Self {
            slots,
            head: 0,
            tail: 0,
            full: false,
            total_bytes: 0,
        })
    }

    /// Returns the number of record slots.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Returns the number of live records.
    #[must_use]
    pub fn len(&self) -> usize {
        if self.full {
            self.capacity()
        } else {
            (self.head + self.capacity() - self.tail) % self.capacity()
        }
    }

    /// Returns true if no record is live.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        !self.full && self.head == self.tail
    }

    /// Returns true if the next insert will evict.
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.full
    }

    /// Returns the sum of the sizes of all live records.
    #[must_use]
    pub fn total_bytes(&self) -> u64 {
        self.total_bytes
    }

    /// Index of the next slot to write.
    #[must_use]
    pub fn head(&self) -> usize {
        self.head
    }

    /// Index of the oldest live slot.
    #[must_use]
    pub fn tail(&self) -> usize {
        self.tail
    }

    /// Inserts a record as the newest live record.
    ///
    /// If the store is full, the oldest record is evicted first and handed
    /// back to the caller, which becomes its sole owner.
    pub fn insert(&mut self, record: Record) -> Option<Record> {
        let capacity = self.capacity();
        let evicted = if self.full {
            let oldest = self.slots[self.tail].take();
            self.tail = (self.tail + 1) % capacity;
            oldest
        } else {
            None
        };

        if let Some(old) = &evicted {
            self.total_bytes -= old.len() as u64;
        }

        self.total_bytes += record.len() as u64;
        self.slots[self.head] = Some(record);
        self.head = (self.head + 1) % capacity;

        if !self.full && self.head == self.tail {
            self.full = true;
        }

        evicted
    }

    /// Returns the live record with the given ordinal (0 = oldest).
    #[must_use]
    pub fn get(&self, ordinal: usize) -> Option<&Record> {
        if ordinal >= self.len() {
            return None;
        }
        self.slots[self.slot_of(ordinal)].as_ref()
    }

    /// Iterates over live records, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &Record> + '_ {
        (0..self.len()).filter_map(move |ordinal| self.slots[self.slot_of(ordinal)].as_ref())
    }

    /// Copies the whole logical stream into a new buffer.
    #[must_use]
    pub fn to_vec(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.total_bytes as usize);
        for record in self.iter() {
            out.extend_from_slice(record.as_bytes());
        }
        out
    }

    /// Moves every live record out of the store, oldest first.
    ///
    /// The store is empty afterwards.
    pub fn drain(&mut self) -> Vec<Record> {
        let mut records = Vec::with_capacity(self.len());
        for ordinal in 0..self.len() {
            let slot = self.slot_of(ordinal);
            if let Some(record) = self.slots[slot].take() {
                records.push(record);
            }
        }
        self.head = 0;
        self.tail = 0;
        self.full = false;
        self.total_bytes = 0;
        records
    }

    /// Physical slot of a live ordinal.
    pub(crate) fn slot_of(&self, ordinal: usize) -> usize {
        (self.tail + ordinal) % self.capacity()
    }

    /// Raw slot access used by range reads.
    pub(crate) fn slot(&self, index: usize) -> Option<&Record> {
        self.slots.get(index).and_then(Option::as_ref)
    }
}
