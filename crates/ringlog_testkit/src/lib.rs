//! # Ringlog Testkit
//!
//! Test utilities for ringlog.
//!
//! This crate provides:
//! - Test fixtures for devices and data files
//! - Property-based test generators using proptest
//! - Concurrent stress harnesses
//!
//! ## Usage
//!
//! ```rust
//! use ringlog_testkit::prelude::*;
//!
//! let device = TestDevice::with_lines(2, &["a", "b", "c"]);
//! assert_eq!(device.contents().unwrap(), b"b\nc\n".to_vec());
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod fixtures;
pub mod generators;
pub mod stress;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::fixtures::*;
    pub use crate::generators::*;
    pub use crate::stress::*;
}

pub use fixtures::*;
pub use generators::*;
pub use stress::*;
