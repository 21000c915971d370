//! Domain model for catalog records and ideas.
//!
//! # Responsibility
//! - Define canonical data structures used by core business logic.
//! - Keep enrichment attributes separate from user-owned record fields.
//!
//! # Invariants
//! - Every domain object is identified by a stable UUID assigned at creation.
//! - A record is classified iff its description is present and non-empty.

pub mod idea;
pub mod record;
