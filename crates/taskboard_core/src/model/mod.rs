//! Domain model for the task board.
//!
//! # Responsibility
//! - Define the persisted task record and its wire shape.
//! - Own the category configuration table and its fallback rule.
//! - Hold the in-memory notification list.
//!
//! # Invariants
//! - Every task is identified by a stable `TaskId`, never by position.
//! - Category lookups never fail; unknown ids resolve to the fallback entry.

pub mod category;
pub mod notification;
pub mod task;
