//! Duplicate detection for captured cards.
//!
//! # Responsibility
//! - Canonicalize signal fields before comparison.
//! - Decide whether a candidate duplicates a stored card.

pub mod matcher;
pub mod normalize;
