//! # Allocation Entity
//!
//! A deal allocation, addressed by surrogate id only.
//!
//! An allocation has two logical sections: the circle (what is being
//! allocated and how) and the execution (amount, instrument, who executed it
//! and when). Allocations carry no business key, so creation never fails on
//! uniqueness.

use super::record::{Record, overlay, present};
use crate::domain::value_objects::{AuditStamps, EntityKind};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A stored allocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Allocation {
    /// Surrogate id, also the lookup key.
    pub id: i64,

    /// Circle the allocation belongs to.
    pub deal_circle: Option<String>,
    /// Description of the security.
    pub desc_of_security: Option<String>,
    /// Pro Rata, Tiered, Priority, Equal or Custom.
    pub allocation_type: Option<String>,
    /// Circle date.
    pub circle_date: Option<NaiveDate>,
    /// Whether this is an add-on to an existing circle.
    #[serde(default)]
    pub is_add_on: bool,
    /// Free-form circle notes.
    pub circle_notes: Option<String>,

    /// Allocated amount.
    pub deal_allocation: Option<f64>,
    /// Allocation date.
    pub allocation_date: Option<NaiveDate>,
    /// Rounding applied to the allocation.
    pub allocation_rounding: Option<f64>,
    /// Instrument CUSIP.
    pub cusip: Option<String>,
    /// Executing trader.
    pub trader: Option<String>,
    /// Executing broker.
    pub broker: Option<String>,
    /// Execution date.
    pub execution_date: Option<NaiveDate>,
    /// Execution reason.
    pub execution_reason: Option<String>,
    /// Free-form execution notes.
    pub execution_notes: Option<String>,

    /// Audit stamps.
    #[serde(flatten)]
    pub audit: AuditStamps,
}

/// Create payload for an allocation. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AllocationDraft {
    /// Circle the allocation belongs to.
    pub deal_circle: Option<String>,
    /// Description of the security.
    pub desc_of_security: Option<String>,
    /// Allocation type.
    pub allocation_type: Option<String>,
    /// Circle date.
    pub circle_date: Option<NaiveDate>,
    /// Add-on flag.
    pub is_add_on: bool,
    /// Circle notes.
    pub circle_notes: Option<String>,
    /// Allocated amount.
    pub deal_allocation: Option<f64>,
    /// Allocation date.
    pub allocation_date: Option<NaiveDate>,
    /// Rounding.
    pub allocation_rounding: Option<f64>,
    /// Instrument CUSIP.
    pub cusip: Option<String>,
    /// Executing trader.
    pub trader: Option<String>,
    /// Executing broker.
    pub broker: Option<String>,
    /// Execution date.
    pub execution_date: Option<NaiveDate>,
    /// Execution reason.
    pub execution_reason: Option<String>,
    /// Execution notes.
    pub execution_notes: Option<String>,
}

/// Update payload for an allocation.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct AllocationPatch {
    /// New `deal_circle`.
    #[serde(default, deserialize_with = "present")]
    pub deal_circle: Option<Option<String>>,
    /// New `desc_of_security`.
    #[serde(default, deserialize_with = "present")]
    pub desc_of_security: Option<Option<String>>,
    /// New `allocation_type`.
    #[serde(default, deserialize_with = "present")]
    pub allocation_type: Option<Option<String>>,
    /// New `circle_date`.
    #[serde(default, deserialize_with = "present")]
    pub circle_date: Option<Option<NaiveDate>>,
    /// Add-on flag; `null` leaves it unchanged.
    #[serde(default)]
    pub is_add_on: Option<bool>,
    /// New `circle_notes`.
    #[serde(default, deserialize_with = "present")]
    pub circle_notes: Option<Option<String>>,
    /// New `deal_allocation`.
    #[serde(default, deserialize_with = "present")]
    pub deal_allocation: Option<Option<f64>>,
    /// New `allocation_date`.
    #[serde(default, deserialize_with = "present")]
    pub allocation_date: Option<Option<NaiveDate>>,
    /// New `allocation_rounding`.
    #[serde(default, deserialize_with = "present")]
    pub allocation_rounding: Option<Option<f64>>,
    /// New `cusip`.
    #[serde(default, deserialize_with = "present")]
    pub cusip: Option<Option<String>>,
    /// New `trader`.
    #[serde(default, deserialize_with = "present")]
    pub trader: Option<Option<String>>,
    /// New `broker`.
    #[serde(default, deserialize_with = "present")]
    pub broker: Option<Option<String>>,
    /// New `execution_date`.
    #[serde(default, deserialize_with = "present")]
    pub execution_date: Option<Option<NaiveDate>>,
    /// New `execution_reason`.
    #[serde(default, deserialize_with = "present")]
    pub execution_reason: Option<Option<String>>,
    /// New `execution_notes`.
    #[serde(default, deserialize_with = "present")]
    pub execution_notes: Option<Option<String>>,
}

impl Record for Allocation {
    type Key = i64;
    type Draft = AllocationDraft;
    type Patch = AllocationPatch;

    const KIND: EntityKind = EntityKind::Allocation;

    fn id(&self) -> i64 {
        self.id
    }

    fn key(&self) -> i64 {
        self.id
    }

    fn draft_key(_draft: &AllocationDraft) -> Option<i64> {
        None
    }

    fn from_draft(id: i64, draft: AllocationDraft, audit: AuditStamps) -> Self {
        Self {
            id,
            deal_circle: draft.deal_circle,
            desc_of_security: draft.desc_of_security,
            allocation_type: draft.allocation_type,
            circle_date: draft.circle_date,
            is_add_on: draft.is_add_on,
            circle_notes: draft.circle_notes,
            deal_allocation: draft.deal_allocation,
            allocation_date: draft.allocation_date,
            allocation_rounding: draft.allocation_rounding,
            cusip: draft.cusip,
            trader: draft.trader,
            broker: draft.broker,
            execution_date: draft.execution_date,
            execution_reason: draft.execution_reason,
            execution_notes: draft.execution_notes,
            audit,
        }
    }

    fn merge(&mut self, patch: AllocationPatch) {
        overlay(&mut self.deal_circle, patch.deal_circle);
        overlay(&mut self.desc_of_security, patch.desc_of_security);
        overlay(&mut self.allocation_type, patch.allocation_type);
        overlay(&mut self.circle_date, patch.circle_date);
        overlay(&mut self.is_add_on, patch.is_add_on);
        overlay(&mut self.circle_notes, patch.circle_notes);
        overlay(&mut self.deal_allocation, patch.deal_allocation);
        overlay(&mut self.allocation_date, patch.allocation_date);
        overlay(&mut self.allocation_rounding, patch.allocation_rounding);
        overlay(&mut self.cusip, patch.cusip);
        overlay(&mut self.trader, patch.trader);
        overlay(&mut self.broker, patch.broker);
        overlay(&mut self.execution_date, patch.execution_date);
        overlay(&mut self.execution_reason, patch.execution_reason);
        overlay(&mut self.execution_notes, patch.execution_notes);
    }

    fn audit(&self) -> &AuditStamps {
        &self.audit
    }

    fn audit_mut(&mut self) -> &mut AuditStamps {
        &mut self.audit
    }
}
