//! Flutter-facing bindings for CardVault core.

pub mod api;
