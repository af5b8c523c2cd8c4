//! # REST API
//!
//! REST endpoints using axum over the record store.
//!
//! # Endpoints
//!
//! Each collection is served under the configured prefix (default
//! `/api/v1`); the collection path also accepts a trailing slash.
//!
//! ## Deals
//! - `GET /api/v1/deals?skip=&limit=` - List deals
//! - `GET /api/v1/deals/{deal_id}` - Get deal
//! - `POST /api/v1/deals` - Create deal
//! - `PUT /api/v1/deals/{deal_id}` - Merge fields into a deal
//! - `DELETE /api/v1/deals/{deal_id}` - Delete deal
//!
//! ## Brokers, Portfolios, Allocations
//! Same shape at `/brokers/{broker_id}`, `/portfolios/{portfolio_id}` and
//! `/allocations/{id}`.
//!
//! ## Service
//! - `GET /` - Welcome message
//! - `GET /health` - Health check
//!
//! # Usage
//!
//! ```ignore
//! use eblotter::api::rest::{create_router, AppState};
//! use std::sync::Arc;
//!
//! let state = AppState::new(Arc::new(store), settings);
//! let router = create_router(state);
//!
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:8000").await?;
//! axum::serve(listener, router).await?;
//! ```

pub mod auth;
pub mod dto;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod routes;

pub use auth::CurrentUser;
pub use dto::{DealResponse, HealthResponse, Pagination, Resource, WelcomeResponse};
pub use error::{ApiError, ErrorResponse};
pub use extract::{ApiJson, ApiPath, ApiQuery};
pub use handlers::{ApiResult, AppState};
pub use routes::create_router;
