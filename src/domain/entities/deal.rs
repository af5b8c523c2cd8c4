//! # Deal Entity
//!
//! A client deal on the blotter, keyed by its caller-assigned `deal_id`.
//!
//! # Examples
//!
//! ```
//! use eblotter::domain::entities::{Deal, DealDraft, DealPatch, Record};
//! use eblotter::domain::value_objects::Timestamp;
//!
//! let draft = DealDraft::new("DD100", "Test").with_amount(100.0);
//! let mut deal = Deal::create(1, draft, Timestamp::now());
//!
//! deal.apply_update(DealPatch {
//!     status: Some(Some("Active".to_string())),
//!     ..DealPatch::default()
//! });
//!
//! assert_eq!(deal.deal_name, "Test");
//! assert_eq!(deal.status.as_deref(), Some("Active"));
//! ```

use super::record::{Record, overlay, present};
use crate::domain::value_objects::{AuditStamps, EntityKind};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A stored deal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Deal {
    /// Surrogate id.
    pub id: i64,
    /// Business key, unique among deals.
    pub deal_id: String,
    /// Display name.
    pub deal_name: String,
    /// Client name.
    pub client: Option<String>,
    /// Deal amount.
    pub amount: Option<f64>,
    /// Lifecycle status (Active, Pending, Completed).
    pub status: Option<String>,
    /// Start date.
    pub start_date: Option<NaiveDate>,
    /// End date.
    pub end_date: Option<NaiveDate>,
    /// Deal owner.
    pub owner: Option<String>,
    /// Audit stamps.
    #[serde(flatten)]
    pub audit: AuditStamps,
}

/// Create payload for a deal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DealDraft {
    /// Business key.
    pub deal_id: String,
    /// Display name.
    pub deal_name: String,
    /// Client name.
    #[serde(default)]
    pub client: Option<String>,
    /// Deal amount.
    #[serde(default)]
    pub amount: Option<f64>,
    /// Lifecycle status.
    #[serde(default)]
    pub status: Option<String>,
    /// Start date.
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    /// End date.
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    /// Deal owner.
    #[serde(default)]
    pub owner: Option<String>,
}

impl DealDraft {
    /// Creates a draft with only the required fields set.
    #[must_use]
    pub fn new(deal_id: impl Into<String>, deal_name: impl Into<String>) -> Self {
        Self {
            deal_id: deal_id.into(),
            deal_name: deal_name.into(),
            client: None,
            amount: None,
            status: None,
            start_date: None,
            end_date: None,
            owner: None,
        }
    }

    /// Sets the client.
    #[must_use]
    pub fn with_client(mut self, client: impl Into<String>) -> Self {
        self.client = Some(client.into());
        self
    }

    /// Sets the amount.
    #[must_use]
    pub fn with_amount(mut self, amount: f64) -> Self {
        self.amount = Some(amount);
        self
    }

    /// Sets the status.
    #[must_use]
    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    /// Sets the start and end dates.
    #[must_use]
    pub fn with_dates(mut self, start: NaiveDate, end: NaiveDate) -> Self {
        self.start_date = Some(start);
        self.end_date = Some(end);
        self
    }

    /// Sets the owner.
    #[must_use]
    pub fn with_owner(mut self, owner: impl Into<String>) -> Self {
        self.owner = Some(owner.into());
        self
    }
}

/// Update payload for a deal.
///
/// `deal_name` cannot be cleared; the nullable fields are cleared by an
/// explicit `null`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct DealPatch {
    /// New display name.
    #[serde(default)]
    pub deal_name: Option<String>,
    /// New client.
    #[serde(default, deserialize_with = "present")]
    pub client: Option<Option<String>>,
    /// New amount.
    #[serde(default, deserialize_with = "present")]
    pub amount: Option<Option<f64>>,
    /// New status.
    #[serde(default, deserialize_with = "present")]
    pub status: Option<Option<String>>,
    /// New start date.
    #[serde(default, deserialize_with = "present")]
    pub start_date: Option<Option<NaiveDate>>,
    /// New end date.
    #[serde(default, deserialize_with = "present")]
    pub end_date: Option<Option<NaiveDate>>,
    /// New owner.
    #[serde(default, deserialize_with = "present")]
    pub owner: Option<Option<String>>,
}

impl Record for Deal {
    type Key = String;
    type Draft = DealDraft;
    type Patch = DealPatch;

    const KIND: EntityKind = EntityKind::Deal;

    fn id(&self) -> i64 {
        self.id
    }

    fn key(&self) -> String {
        self.deal_id.clone()
    }

    fn has_key(&self, key: &Self::Key) -> bool {
        &self.deal_id == key
    }

    fn draft_key(draft: &DealDraft) -> Option<String> {
        Some(draft.deal_id.clone())
    }

    fn from_draft(id: i64, draft: DealDraft, audit: AuditStamps) -> Self {
        Self {
            id,
            deal_id: draft.deal_id,
            deal_name: draft.deal_name,
            client: draft.client,
            amount: draft.amount,
            status: draft.status,
            start_date: draft.start_date,
            end_date: draft.end_date,
            owner: draft.owner,
            audit,
        }
    }

    fn merge(&mut self, patch: DealPatch) {
        overlay(&mut self.deal_name, patch.deal_name);
        overlay(&mut self.client, patch.client);
        overlay(&mut self.amount, patch.amount);
        overlay(&mut self.status, patch.status);
        overlay(&mut self.start_date, patch.start_date);
        overlay(&mut self.end_date, patch.end_date);
        overlay(&mut self.owner, patch.owner);
    }

    fn audit(&self) -> &AuditStamps {
        &self.audit
    }

    fn audit_mut(&mut self) -> &mut AuditStamps {
        &mut self.audit
    }
}
