//! Repository layer over the card collection.
//!
//! # Responsibility
//! - Own the canonical card collection and its mutation contracts.
//! - Isolate storage details from service/business orchestration.
//!
//! # Invariants
//! - Repository writes validate inputs before mutating the collection.
//! - Update/remove of an absent id is a silent no-op, not an error.

pub mod card_repo;
