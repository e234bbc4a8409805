//! Low-level building blocks for the storage layer.

/// Byte-level encoding helpers.
pub mod bytes;

/// The key-value store interface and its in-memory implementation.
pub mod kv;
