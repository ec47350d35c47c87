//! Domain model for captured contact cards.
//!
//! # Responsibility
//! - Define canonical data structures used by core business logic.
//!
//! # Invariants
//! - Every card is identified by a stable caller-assigned `CardId`.
//! - Deletion is a hard delete; there are no tombstones.

pub mod card;
