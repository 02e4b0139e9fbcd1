//! Fixed-capacity ring of variable-length records.
//!
//! The ring keeps `N` record slots addressed by index arithmetic modulo `N`:
//!
//! ```text
//!   slot:   0     1     2     3     4
//!         [ e ] [ - ] [ a ] [ b ] [ d ]
//!                 ^head  ^tail
//! ```
//!
//! `tail` is the oldest live slot and `head` the next slot to write. When
//! `head == tail` the `full` flag tells "empty" from "completely full".
//!
//! Readers see the live records as one byte stream, oldest first. Two
//! translations are provided over that stream:
//!
//! - [`RingStore::find`] maps a global byte offset to a record position
//! - [`RingStore::ordinal_to_offset`] maps (record ordinal, byte) to a global offset
//!
//! A global offset that lands exactly on a record boundary belongs to the
//! following record.

mod store;
mod translate;

pub use store::RingStore;
pub use translate::Location;
