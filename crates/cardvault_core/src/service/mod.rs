//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into capture/import/edit use cases.
//! - Keep UI/FFI layers decoupled from storage details.

pub mod card_service;
