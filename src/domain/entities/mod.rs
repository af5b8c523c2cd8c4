//! # Domain Entities
//!
//! Flat records held by the store.
//!
//! ## Records
//!
//! - [`Deal`]: client deal, keyed by `deal_id`
//! - [`Broker`]: executing broker, keyed by `broker_id`
//! - [`Portfolio`]: managed portfolio, keyed by `portfolio_id`
//! - [`Allocation`]: deal allocation, keyed by surrogate id
//!
//! Each record comes with a `*Draft` (create payload) and a `*Patch`
//! (merge-on-update payload). The shared contract lives in [`Record`].

pub mod allocation;
pub mod broker;
pub mod deal;
pub mod portfolio;
pub mod record;

pub use allocation::{Allocation, AllocationDraft, AllocationPatch};
pub use broker::{Broker, BrokerDraft, BrokerPatch};
pub use deal::{Deal, DealDraft, DealPatch};
pub use portfolio::{Portfolio, PortfolioDraft, PortfolioPatch};
pub use record::Record;
