//! # eBlotter
//!
//! Deal blotter backend: deals, brokers, portfolios and allocations kept in a
//! record store and served over HTTP.
//!
//! # Architecture
//!
//! ```text
//! api::rest            axum router, handlers, wire shapes
//!      |
//! infrastructure       Repository / RecordStore ports
//!      |                 json_file  one JSON array per kind
//!      |                 sqlite     one table per kind (sqlx)
//! domain               records, drafts, patches, merge rules
//! ```
//!
//! The store owns identity (surrogate ids, business-key uniqueness) and
//! merge-on-update; every mutation is durable before it returns.

pub mod api;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod telemetry;

pub use crate::api::rest::{AppState, create_router};
pub use crate::config::Settings;
pub use crate::infrastructure::persistence::{RecordStore, Repository, RepositoryError};
