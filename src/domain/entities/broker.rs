//! # Broker Entity
//!
//! An executing broker, keyed by its caller-assigned `broker_id`.

use super::record::{Record, overlay, present};
use crate::domain::value_objects::{AuditStamps, EntityKind};
use serde::{Deserialize, Serialize};

/// A stored broker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Broker {
    /// Surrogate id.
    pub id: i64,
    /// Business key, unique among brokers.
    pub broker_id: String,
    /// Display name.
    pub broker_name: String,
    /// Active or Inactive.
    pub status: Option<String>,
    /// Audit stamps.
    #[serde(flatten)]
    pub audit: AuditStamps,
}

/// Create payload for a broker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrokerDraft {
    /// Business key.
    pub broker_id: String,
    /// Display name.
    pub broker_name: String,
    /// Active or Inactive.
    #[serde(default)]
    pub status: Option<String>,
}

impl BrokerDraft {
    /// Creates a draft.
    #[must_use]
    pub fn new(
        broker_id: impl Into<String>,
        broker_name: impl Into<String>,
        status: Option<&str>,
    ) -> Self {
        Self {
            broker_id: broker_id.into(),
            broker_name: broker_name.into(),
            status: status.map(str::to_string),
        }
    }
}

/// Update payload for a broker.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct BrokerPatch {
    /// New display name.
    #[serde(default)]
    pub broker_name: Option<String>,
    /// New status; `null` clears it.
    #[serde(default, deserialize_with = "present")]
    pub status: Option<Option<String>>,
}

impl Record for Broker {
    type Key = String;
    type Draft = BrokerDraft;
    type Patch = BrokerPatch;

    const KIND: EntityKind = EntityKind::Broker;

    fn id(&self) -> i64 {
        self.id
    }

    fn key(&self) -> String {
        self.broker_id.clone()
    }

    fn has_key(&self, key: &Self::Key) -> bool {
        &self.broker_id == key
    }

    fn draft_key(draft: &BrokerDraft) -> Option<String> {
        Some(draft.broker_id.clone())
    }

    fn from_draft(id: i64, draft: BrokerDraft, audit: AuditStamps) -> Self {
        Self {
            id,
            broker_id: draft.broker_id,
            broker_name: draft.broker_name,
            status: draft.status,
            audit,
        }
    }

    fn merge(&mut self, patch: BrokerPatch) {
        overlay(&mut self.broker_name, patch.broker_name);
        overlay(&mut self.status, patch.status);
    }

    fn audit(&self) -> &AuditStamps {
        &self.audit
    }

    fn audit_mut(&mut self) -> &mut AuditStamps {
        &mut self.audit
    }
}
