//! # Record Trait
//!
//! Identity and merge contract shared by every stored entity.
//!
//! A record kind declares three shapes:
//!
//! - the record itself, as stored (surrogate id, fields, audit stamps)
//! - a `Draft`, the create payload, which carries the business key
//! - a `Patch`, the update payload, in which every field is optional
//!
//! Backends never touch individual fields. They assign ids, stamp audits,
//! and call [`Record::apply_update`], so merge semantics are identical
//! whichever durable medium sits underneath.

use crate::domain::value_objects::{AuditStamps, EntityKind, Timestamp};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// A stored entity with a surrogate id, an optional business key, and
/// merge-on-update semantics.
pub trait Record:
    Clone + fmt::Debug + PartialEq + Serialize + DeserializeOwned + Send + Sync + 'static
{
    /// Lookup key: the business key, or the surrogate id for kinds without one.
    type Key: Clone + PartialEq + fmt::Debug + fmt::Display + DeserializeOwned + Send + Sync + 'static;

    /// Create payload.
    type Draft: fmt::Debug + DeserializeOwned + Send + 'static;

    /// Update payload. Absent fields leave the record untouched.
    type Patch: fmt::Debug + Default + DeserializeOwned + Send + 'static;

    /// Collection this record belongs to.
    const KIND: EntityKind;

    /// Returns the surrogate id.
    fn id(&self) -> i64;

    /// Returns the lookup key.
    fn key(&self) -> Self::Key;

    /// Returns the business key a draft would occupy, or `None` for kinds
    /// without uniqueness constraints.
    fn draft_key(draft: &Self::Draft) -> Option<Self::Key>;

    /// Builds a stored record from a draft.
    fn from_draft(id: i64, draft: Self::Draft, audit: AuditStamps) -> Self;

    /// Overlays the fields present in `patch`. Identity fields are not part
    /// of any patch and so cannot change.
    fn merge(&mut self, patch: Self::Patch);

    /// Returns the audit stamps.
    fn audit(&self) -> &AuditStamps;

    /// Returns the audit stamps mutably.
    fn audit_mut(&mut self) -> &mut AuditStamps;

    /// Returns true if this record is addressed by `key`.
    fn has_key(&self, key: &Self::Key) -> bool {
        &self.key() == key
    }

    /// Creates a record stamped with `now`.
    fn create(id: i64, draft: Self::Draft, now: Timestamp) -> Self {
        Self::from_draft(id, draft, AuditStamps::new(now))
    }

    /// Merges `patch` and refreshes `updated_at`; `created_at` is kept.
    fn apply_update(&mut self, patch: Self::Patch) {
        self.merge(patch);
        self.audit_mut().touch();
    }
}

/// Overwrites `slot` when the patch carries a value.
///
/// For nullable fields `T` is itself an `Option`, so an explicit `null`
/// clears the field while an absent one leaves it alone.
pub fn overlay<T>(slot: &mut T, patch: Option<T>) {
    if let Some(value) = patch {
        *slot = value;
    }
}

/// Deserializes a field that is present in the payload, even as `null`.
///
/// Paired with `#[serde(default)]`: absent becomes `None`, `null` becomes
/// `Some(None)`, a value becomes `Some(Some(v))`.
///
/// # Errors
///
/// Returns the deserializer error if the value has the wrong type.
pub fn present<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}
