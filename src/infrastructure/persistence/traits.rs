//! # Repository Traits
//!
//! Port definitions for persistence abstraction.
//!
//! [`Repository`] is the per-kind call contract every backend honours;
//! [`RecordStore`] bundles the four kinds into the single handle the HTTP
//! layer receives. Backends differ only in their durable medium: identity,
//! uniqueness and merge rules are the same everywhere.
//!
//! # Examples
//!
//! ```ignore
//! use eblotter::domain::entities::{Deal, DealDraft};
//! use eblotter::infrastructure::persistence::{RecordStore, Repository};
//!
//! async fn example(store: &dyn RecordStore) {
//!     let deal = Repository::<Deal>::create(store, DealDraft::new("DD100", "Test")).await?;
//!     let found = Repository::<Deal>::get(store, &deal.deal_id).await?;
//! }
//! ```

use crate::domain::entities::{Allocation, Broker, Deal, Portfolio, Record};
use async_trait::async_trait;
use std::fmt;
use thiserror::Error;

/// Error type for repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Entity not found.
    #[error("Entity not found: {entity_type} with id {id}")]
    NotFound {
        /// Type of entity.
        entity_type: &'static str,
        /// Entity identifier.
        id: String,
    },

    /// Duplicate entity.
    #[error("Duplicate entity: {entity_type} with id {id} already exists")]
    Duplicate {
        /// Type of entity.
        entity_type: &'static str,
        /// Entity identifier.
        id: String,
    },

    /// Connection error.
    #[error("Connection error: {0}")]
    Connection(String),

    /// Query error.
    #[error("Query error: {0}")]
    Query(String),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// File I/O error.
    #[error("I/O error: {0}")]
    Io(String),

    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl RepositoryError {
    /// Creates a not found error.
    #[must_use]
    pub fn not_found(entity_type: &'static str, id: impl fmt::Display) -> Self {
        Self::NotFound {
            entity_type,
            id: id.to_string(),
        }
    }

    /// Creates a duplicate error.
    #[must_use]
    pub fn duplicate(entity_type: &'static str, id: impl fmt::Display) -> Self {
        Self::Duplicate {
            entity_type,
            id: id.to_string(),
        }
    }

    /// Creates a connection error.
    #[must_use]
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::Connection(msg.into())
    }

    /// Creates a query error.
    #[must_use]
    pub fn query(msg: impl Into<String>) -> Self {
        Self::Query(msg.into())
    }

    /// Creates a serialization error.
    #[must_use]
    pub fn serialization(msg: impl Into<String>) -> Self {
        Self::Serialization(msg.into())
    }

    /// Creates an I/O error.
    #[must_use]
    pub fn io(msg: impl Into<String>) -> Self {
        Self::Io(msg.into())
    }

    /// Creates an internal error.
    #[must_use]
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Returns true if this is a not found error.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Returns true if this is a duplicate error.
    #[must_use]
    pub fn is_duplicate(&self) -> bool {
        matches!(self, Self::Duplicate { .. })
    }
}

/// Result type for repository operations.
pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Repository for one record kind.
///
/// Every mutating call is durable before it returns: a caller that sees
/// `Ok` can crash immediately and the change survives a reload.
#[async_trait]
pub trait Repository<R: Record>: Send + Sync + fmt::Debug {
    /// Returns every record in insertion order.
    ///
    /// The store does not paginate; callers slice the result.
    async fn list_all(&self) -> RepositoryResult<Vec<R>>;

    /// Gets a record by key.
    ///
    /// Returns `None` if no record has that key.
    async fn get(&self, key: &R::Key) -> RepositoryResult<Option<R>>;

    /// Creates a record, assigning the next surrogate id and stamping
    /// `created_at` / `updated_at`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Duplicate` if the draft's business key is
    /// already taken. The collection is left unchanged.
    async fn create(&self, draft: R::Draft) -> RepositoryResult<R>;

    /// Merges `patch` into the record addressed by `key`.
    ///
    /// Only fields present in the patch change. Surrogate id, business key
    /// and `created_at` are preserved; `updated_at` is refreshed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no record has that key.
    async fn update(&self, key: &R::Key, patch: R::Patch) -> RepositoryResult<R>;

    /// Deletes a record by key.
    ///
    /// Returns `Ok(true)` if the record was deleted, `Ok(false)` if it didn't
    /// exist, in which case nothing is written.
    async fn delete(&self, key: &R::Key) -> RepositoryResult<bool>;

    /// Counts all records.
    async fn count(&self) -> RepositoryResult<u64>;
}

/// The full record store: one repository per entity kind.
///
/// Implemented automatically for any backend that implements all four
/// repositories.
pub trait RecordStore:
    Repository<Deal> + Repository<Broker> + Repository<Portfolio> + Repository<Allocation>
{
    /// Short backend name for logs.
    fn backend_name(&self) -> &'static str;
}

/// Backend identification, split out so [`RecordStore`] can be blanket
/// implemented.
pub trait NamedBackend {
    /// Short backend name for logs.
    const NAME: &'static str;
}

impl<T> RecordStore for T
where
    T: NamedBackend
        + Repository<Deal>
        + Repository<Broker>
        + Repository<Portfolio>
        + Repository<Allocation>,
{
    fn backend_name(&self) -> &'static str {
        T::NAME
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod repository_error {
        use super::*;

        #[test]
        fn not_found_error() {
            let err = RepositoryError::not_found("Deal", "DD100");
            assert!(err.is_not_found());
            assert!(!err.is_duplicate());
            assert!(err.to_string().contains("not found"));
            assert!(err.to_string().contains("Deal"));
            assert!(err.to_string().contains("DD100"));
        }

        #[test]
        fn not_found_accepts_numeric_ids() {
            let err = RepositoryError::not_found("Allocation", 42);
            assert!(err.to_string().contains("42"));
        }

        #[test]
        fn duplicate_error() {
            let err = RepositoryError::duplicate("Broker", "BRK001");
            assert!(!err.is_not_found());
            assert!(err.is_duplicate());
            assert!(err.to_string().contains("Duplicate"));
            assert!(err.to_string().contains("Broker"));
        }

        #[test]
        fn connection_error() {
            let err = RepositoryError::connection("unable to open database file");
            assert!(err.to_string().contains("Connection"));
            assert!(err.to_string().contains("unable to open"));
        }

        #[test]
        fn query_error() {
            let err = RepositoryError::query("no such table: deals");
            assert!(err.to_string().contains("Query"));
            assert!(err.to_string().contains("no such table"));
        }

        #[test]
        fn serialization_error() {
            let err = RepositoryError::serialization("expected value at line 1");
            assert!(err.to_string().contains("Serialization"));
        }

        #[test]
        fn io_error() {
            let err = RepositoryError::io("permission denied");
            assert!(err.to_string().contains("I/O"));
        }

        #[test]
        fn internal_error() {
            let err = RepositoryError::internal("Unexpected state");
            assert!(err.to_string().contains("Internal"));
        }
    }
}
