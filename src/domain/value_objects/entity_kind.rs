//! # Entity Kinds
//!
//! The four record collections held by the store.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Kind of record held by the store.
///
/// Each kind is an independent collection; no foreign keys are enforced
/// between them.
///
/// # Examples
///
/// ```
/// use eblotter::domain::value_objects::EntityKind;
///
/// assert_eq!(EntityKind::Deal.collection(), "deals");
/// assert_eq!(EntityKind::Deal.label(), "Deal");
/// assert_eq!("brokers".parse::<EntityKind>().unwrap(), EntityKind::Broker);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    /// Client deals, keyed by `deal_id`.
    Deal,
    /// Executing brokers, keyed by `broker_id`.
    Broker,
    /// Managed portfolios, keyed by `portfolio_id`.
    Portfolio,
    /// Deal allocations, keyed by surrogate id only.
    Allocation,
}

impl EntityKind {
    /// All kinds, in load order.
    pub const ALL: [Self; 4] = [Self::Deal, Self::Broker, Self::Portfolio, Self::Allocation];

    /// Human-readable singular name, used in error details.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Deal => "Deal",
            Self::Broker => "Broker",
            Self::Portfolio => "Portfolio",
            Self::Allocation => "Allocation",
        }
    }

    /// Collection name: JSON file stem and SQL table name.
    #[must_use]
    pub const fn collection(self) -> &'static str {
        match self {
            Self::Deal => "deals",
            Self::Broker => "brokers",
            Self::Portfolio => "portfolios",
            Self::Allocation => "allocations",
        }
    }

    /// Returns true if records of this kind carry a caller-assigned
    /// business key.
    #[must_use]
    pub const fn has_business_key(self) -> bool {
        !matches!(self, Self::Allocation)
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.collection())
    }
}

/// Error returned when parsing an unknown entity kind.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown entity kind: {0}")]
pub struct InvalidEntityKindError(pub String);

impl FromStr for EntityKind {
    type Err = InvalidEntityKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "deal" | "deals" => Ok(Self::Deal),
            "broker" | "brokers" => Ok(Self::Broker),
            "portfolio" | "portfolios" => Ok(Self::Portfolio),
            "allocation" | "allocations" => Ok(Self::Allocation),
            _ => Err(InvalidEntityKindError(s.to_string())),
        }
    }
}
