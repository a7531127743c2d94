//! Durable key-value store abstractions.
//!
//! # Responsibility
//! - Define the string key/value contract the persistence adapter writes to.
//! - Keep SQLite details out of the persistence and store layers.
//!
//! # Invariants
//! - `set` overwrites the whole value for a key; there are no partial writes.

pub mod kv_repo;
