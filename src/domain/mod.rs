//! # Domain Layer
//!
//! Records, their create/update payloads, and the value objects they use.
//! Nothing here knows about storage or HTTP.

pub mod entities;
pub mod value_objects;
