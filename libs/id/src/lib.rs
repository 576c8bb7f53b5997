//! # lbsync-id
//!
//! Typed resource identifiers for the lbsync agent.
//!
//! ## Design Principles
//!
//! - Identifiers are assigned by the control plane; this crate never invents
//!   semantics for them beyond "a UUID owned by one resource type"
//! - All identifiers have a canonical string representation with strict parsing
//! - Identifiers support roundtrip serialization (parse → format → parse)
//! - Identifiers are typed to prevent mixing different resource types
//!
//! ## Format
//!
//! Every identifier is a hyphenated lowercase UUID, e.g.
//! `3c8f6b1e-9d2a-4c3b-8f5e-1a2b3c4d5e6f`. The control plane generates them;
//! `new()` exists for tests and local tooling.

mod error;
mod macros;
mod types;

pub use error::IdError;
pub use types::*;

/// Re-export uuid for consumers that need raw UUID operations
pub use uuid::Uuid;
