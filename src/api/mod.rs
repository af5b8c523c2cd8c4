//! # API Layer
//!
//! External interfaces.
//!
//! - [`rest`]: HTTP/JSON endpoints using axum

pub mod rest;
