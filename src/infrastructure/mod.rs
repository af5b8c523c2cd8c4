//! # Infrastructure Layer
//!
//! Adapters to durable storage.

pub mod persistence;
