//! # Audit Stamps
//!
//! Creation and last-update instants carried by every record.

use super::timestamp::Timestamp;
use serde::{Deserialize, Serialize};

/// Audit stamps for a stored record.
///
/// # Invariants
///
/// - `created_at` is set once, at creation, and never changes
/// - `updated_at` strictly increases on every [`touch`](Self::touch)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditStamps {
    /// When the record was created.
    pub created_at: Timestamp,
    /// When the record was last updated.
    pub updated_at: Timestamp,
}

impl AuditStamps {
    /// Stamps a freshly created record.
    #[must_use]
    pub fn new(now: Timestamp) -> Self {
        Self {
            created_at: now,
            updated_at: now,
        }
    }

    /// Refreshes `updated_at`, keeping it strictly after its previous value.
    pub fn touch(&mut self) {
        self.updated_at = Timestamp::refreshed_after(&self.updated_at);
    }
}
