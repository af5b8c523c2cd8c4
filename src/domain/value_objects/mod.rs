//! # Value Objects
//!
//! Small immutable types shared by every record.
//!
//! - [`EntityKind`]: which collection a record belongs to
//! - [`Timestamp`]: UTC instant with exact RFC 3339 round-trip
//! - [`AuditStamps`]: `created_at` / `updated_at` pair

pub mod audit;
pub mod entity_kind;
pub mod timestamp;

pub use audit::AuditStamps;
pub use entity_kind::{EntityKind, InvalidEntityKindError};
pub use timestamp::Timestamp;
