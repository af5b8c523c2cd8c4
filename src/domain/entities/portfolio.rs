//! # Portfolio Entity
//!
//! A managed portfolio, keyed by its caller-assigned `portfolio_id`.

use super::record::{Record, overlay, present};
use crate::domain::value_objects::{AuditStamps, EntityKind};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A stored portfolio.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Portfolio {
    /// Surrogate id.
    pub id: i64,
    /// Business key, unique among portfolios.
    pub portfolio_id: String,
    /// Display name.
    pub portfolio_name: String,
    /// Portfolio manager.
    pub manager: Option<String>,
    /// Investment strategy.
    pub strategy: Option<String>,
    /// Inception date.
    pub inception_date: Option<NaiveDate>,
    /// Assets under management.
    pub aum: Option<f64>,
    /// Benchmark index.
    pub benchmark: Option<String>,
    /// Low, Medium, High or Very High.
    pub risk_profile: Option<String>,
    /// Performance, in percent.
    pub performance: Option<f64>,
    /// Audit stamps.
    #[serde(flatten)]
    pub audit: AuditStamps,
}

/// Create payload for a portfolio.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioDraft {
    /// Business key.
    pub portfolio_id: String,
    /// Display name.
    pub portfolio_name: String,
    /// Portfolio manager.
    #[serde(default)]
    pub manager: Option<String>,
    /// Investment strategy.
    #[serde(default)]
    pub strategy: Option<String>,
    /// Inception date.
    #[serde(default)]
    pub inception_date: Option<NaiveDate>,
    /// Assets under management.
    #[serde(default)]
    pub aum: Option<f64>,
    /// Benchmark index.
    #[serde(default)]
    pub benchmark: Option<String>,
    /// Risk profile.
    #[serde(default)]
    pub risk_profile: Option<String>,
    /// Performance, in percent.
    #[serde(default)]
    pub performance: Option<f64>,
}

impl PortfolioDraft {
    /// Creates a draft with only the required fields set.
    #[must_use]
    pub fn new(portfolio_id: impl Into<String>, portfolio_name: impl Into<String>) -> Self {
        Self {
            portfolio_id: portfolio_id.into(),
            portfolio_name: portfolio_name.into(),
            manager: None,
            strategy: None,
            inception_date: None,
            aum: None,
            benchmark: None,
            risk_profile: None,
            performance: None,
        }
    }
}

/// Update payload for a portfolio.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct PortfolioPatch {
    /// New display name.
    #[serde(default)]
    pub portfolio_name: Option<String>,
    /// New manager.
    #[serde(default, deserialize_with = "present")]
    pub manager: Option<Option<String>>,
    /// New strategy.
    #[serde(default, deserialize_with = "present")]
    pub strategy: Option<Option<String>>,
    /// New inception date.
    #[serde(default, deserialize_with = "present")]
    pub inception_date: Option<Option<NaiveDate>>,
    /// New AUM.
    #[serde(default, deserialize_with = "present")]
    pub aum: Option<Option<f64>>,
    /// New benchmark.
    #[serde(default, deserialize_with = "present")]
    pub benchmark: Option<Option<String>>,
    /// New risk profile.
    #[serde(default, deserialize_with = "present")]
    pub risk_profile: Option<Option<String>>,
    /// New performance.
    #[serde(default, deserialize_with = "present")]
    pub performance: Option<Option<f64>>,
}

impl Record for Portfolio {
    type Key = String;
    type Draft = PortfolioDraft;
    type Patch = PortfolioPatch;

    const KIND: EntityKind = EntityKind::Portfolio;

    fn id(&self) -> i64 {
        self.id
    }

    fn key(&self) -> String {
        self.portfolio_id.clone()
    }

    fn has_key(&self, key: &Self::Key) -> bool {
        &self.portfolio_id == key
    }

    fn draft_key(draft: &PortfolioDraft) -> Option<String> {
        Some(draft.portfolio_id.clone())
    }

    fn from_draft(id: i64, draft: PortfolioDraft, audit: AuditStamps) -> Self {
        Self {
            id,
            portfolio_id: draft.portfolio_id,
            portfolio_name: draft.portfolio_name,
            manager: draft.manager,
            strategy: draft.strategy,
            inception_date: draft.inception_date,
            aum: draft.aum,
            benchmark: draft.benchmark,
            risk_profile: draft.risk_profile,
            performance: draft.performance,
            audit,
        }
    }

    fn merge(&mut self, patch: PortfolioPatch) {
        overlay(&mut self.portfolio_name, patch.portfolio_name);
        overlay(&mut self.manager, patch.manager);
        overlay(&mut self.strategy, patch.strategy);
        overlay(&mut self.inception_date, patch.inception_date);
        overlay(&mut self.aum, patch.aum);
        overlay(&mut self.benchmark, patch.benchmark);
        overlay(&mut self.risk_profile, patch.risk_profile);
        overlay(&mut self.performance, patch.performance);
    }

    fn audit(&self) -> &AuditStamps {
        &self.audit
    }

    fn audit_mut(&mut self) -> &mut AuditStamps {
        &mut self.audit
    }
}
