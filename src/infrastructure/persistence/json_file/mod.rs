//! # JSON File Store
//!
//! Record store backed by one JSON array file per entity kind.
//!
//! All four collections are loaded once at [`JsonFileStore::open`] and held
//! in memory as the source of truth. Every mutation rewrites the affected
//! collection's file before returning.
//!
//! ## Layout
//!
//! ```text
//! <data_dir>/deals.json
//! <data_dir>/brokers.json
//! <data_dir>/portfolios.json
//! <data_dir>/allocations.json
//! ```
//!
//! ## Thread Safety
//!
//! Each collection sits behind its own `tokio::sync::RwLock`; mutations on
//! different kinds never block each other.

pub mod collection;

pub use collection::Collection;

use crate::domain::entities::{Allocation, Broker, Deal, Portfolio, Record};
use crate::infrastructure::persistence::traits::{
    NamedBackend, Repository, RepositoryError, RepositoryResult,
};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::info;

/// File-backed implementation of [`RecordStore`](super::RecordStore).
#[derive(Debug)]
pub struct JsonFileStore {
    data_dir: PathBuf,
    deals: Collection<Deal>,
    brokers: Collection<Broker>,
    portfolios: Collection<Portfolio>,
    allocations: Collection<Allocation>,
}

impl JsonFileStore {
    /// Opens the store rooted at `data_dir`, creating the directory if
    /// needed and loading every collection.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Io` if the directory cannot be created or
    /// a file cannot be read, and `RepositoryError::Serialization` if a file
    /// holds malformed records.
    pub async fn open(data_dir: impl Into<PathBuf>) -> RepositoryResult<Self> {
        let data_dir = data_dir.into();
        tokio::fs::create_dir_all(&data_dir).await.map_err(|e| {
            RepositoryError::io(format!(
                "failed to prepare data directory {}: {e}",
                data_dir.display()
            ))
        })?;

        let store = Self {
            deals: Collection::load(&data_dir).await?,
            brokers: Collection::load(&data_dir).await?,
            portfolios: Collection::load(&data_dir).await?,
            allocations: Collection::load(&data_dir).await?,
            data_dir,
        };

        info!(
            data_dir = %store.data_dir.display(),
            deals = store.deals.len().await,
            brokers = store.brokers.len().await,
            portfolios = store.portfolios.len().await,
            allocations = store.allocations.len().await,
            "json store loaded"
        );

        Ok(store)
    }

    /// Returns the data directory.
    #[must_use]
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}

/// Selects the collection holding a record kind.
pub trait Holds<R> {
    /// Returns the collection for `R`.
    fn collection(&self) -> &Collection<R>;
}

impl Holds<Deal> for JsonFileStore {
    fn collection(&self) -> &Collection<Deal> {
        &self.deals
    }
}

impl Holds<Broker> for JsonFileStore {
    fn collection(&self) -> &Collection<Broker> {
        &self.brokers
    }
}

impl Holds<Portfolio> for JsonFileStore {
    fn collection(&self) -> &Collection<Portfolio> {
        &self.portfolios
    }
}

impl Holds<Allocation> for JsonFileStore {
    fn collection(&self) -> &Collection<Allocation> {
        &self.allocations
    }
}

impl NamedBackend for JsonFileStore {
    const NAME: &'static str = "json";
}

#[async_trait]
impl<R> Repository<R> for JsonFileStore
where
    R: Record,
    Self: Holds<R>,
{
    async fn list_all(&self) -> RepositoryResult<Vec<R>> {
        Ok(self.collection().list().await)
    }

    async fn get(&self, key: &R::Key) -> RepositoryResult<Option<R>> {
        Ok(self.collection().get(key).await)
    }

    async fn create(&self, draft: R::Draft) -> RepositoryResult<R> {
        self.collection().create(draft).await
    }

    async fn update(&self, key: &R::Key, patch: R::Patch) -> RepositoryResult<R> {
        self.collection().update(key, patch).await
    }

    async fn delete(&self, key: &R::Key) -> RepositoryResult<bool> {
        self.collection().delete(key).await
    }

    async fn count(&self) -> RepositoryResult<u64> {
        Ok(self.collection().len().await as u64)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::domain::entities::{AllocationDraft, AllocationPatch, DealDraft, DealPatch};
    use crate::infrastructure::persistence::RecordStore;
    use std::sync::Arc;
    use tempfile::tempdir;

    #[tokio::test]
    async fn open_creates_data_dir() {
        let dir = tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        let store = JsonFileStore::open(&nested).await.unwrap();
        assert!(nested.is_dir());
        assert_eq!(store.data_dir(), nested);
        assert_eq!(store.backend_name(), "json");
    }

    #[tokio::test]
    async fn deal_scenario() {
        let dir = tempdir().unwrap();
        let store = JsonFileStore::open(dir.path()).await.unwrap();
        let key = "DD100".to_string();

        let created =
            Repository::<Deal>::create(&store, DealDraft::new("DD100", "Test").with_amount(100.0))
                .await
                .unwrap();
        assert_eq!(created.id, 1);
        assert_eq!(created.status, None);

        let patch = DealPatch {
            status: Some(Some("Active".to_string())),
            ..DealPatch::default()
        };
        let updated = Repository::<Deal>::update(&store, &key, patch)
            .await
            .unwrap();
        assert_eq!(updated.id, created.id);
        assert_eq!(updated.deal_name, "Test");
        assert_eq!(updated.status.as_deref(), Some("Active"));
        assert!(updated.audit.updated_at.is_after(&created.audit.updated_at));

        let duplicate = Repository::<Deal>::create(&store, DealDraft::new("DD100", "Again")).await;
        assert!(duplicate.unwrap_err().is_duplicate());
        assert_eq!(Repository::<Deal>::count(&store).await.unwrap(), 1);

        assert!(Repository::<Deal>::delete(&store, &key).await.unwrap());
        assert!(Repository::<Deal>::get(&store, &key).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn reload_returns_equal_records() {
        let dir = tempdir().unwrap();
        let (deal, allocation) = {
            let store = JsonFileStore::open(dir.path()).await.unwrap();
            let deal = Repository::<Deal>::create(
                &store,
                DealDraft::new("DD1", "Persisted").with_client("ABC Corp"),
            )
            .await
            .unwrap();
            let draft = AllocationDraft {
                cusip: Some("912828YK0".to_string()),
                ..AllocationDraft::default()
            };
            let allocation = Repository::<Allocation>::create(&store, draft)
                .await
                .unwrap();
            let patch = AllocationPatch {
                trader: Some(Some("Desk 4".to_string())),
                ..AllocationPatch::default()
            };
            let allocation = Repository::<Allocation>::update(&store, &allocation.id, patch)
                .await
                .unwrap();
            (deal, allocation)
        };

        let reopened = JsonFileStore::open(dir.path()).await.unwrap();
        let deal_again = Repository::<Deal>::get(&reopened, &"DD1".to_string())
            .await
            .unwrap();
        let allocation_again = Repository::<Allocation>::get(&reopened, &allocation.id)
            .await
            .unwrap();
        assert_eq!(deal_again, Some(deal));
        assert_eq!(allocation_again, Some(allocation));
    }

    #[tokio::test]
    async fn concurrent_updates_are_not_lost() {
        let dir = tempdir().unwrap();
        let store: Arc<dyn RecordStore> = Arc::new(JsonFileStore::open(dir.path()).await.unwrap());
        let created = Repository::<Allocation>::create(store.as_ref(), AllocationDraft::default())
            .await
            .unwrap();
        let id = created.id;

        let mut handles = Vec::new();
        for (trader, broker) in [(Some("T"), None), (None, Some("B"))] {
            let store = Arc::clone(&store);
            let patch = AllocationPatch {
                trader: trader.map(|t: &str| Some(t.to_string())),
                broker: broker.map(|b: &str| Some(b.to_string())),
                ..AllocationPatch::default()
            };
            handles.push(tokio::spawn(async move {
                Repository::<Allocation>::update(store.as_ref(), &id, patch).await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let reopened = JsonFileStore::open(dir.path()).await.unwrap();
        let stored = Repository::<Allocation>::get(&reopened, &id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.trader.as_deref(), Some("T"));
        assert_eq!(stored.broker.as_deref(), Some("B"));
    }
}
