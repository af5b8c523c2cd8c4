//! # SQLite Store
//!
//! Relational record store using sqlx with one table per entity kind.
//!
//! Tables are created on connect if missing. Business keys carry a `UNIQUE`
//! constraint as a second line behind the in-transaction existence check.
//! Each mutation runs in its own transaction and mutations are serialized
//! through an in-process write lock, so merge-then-write never interleaves.

pub mod rows;

pub use rows::{SqlRecord, SqlValue};

use crate::domain::entities::{Allocation, Broker, Deal, Portfolio};
use crate::domain::value_objects::Timestamp;
use crate::infrastructure::persistence::traits::{
    NamedBackend, Repository, RepositoryError, RepositoryResult,
};
use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::Row;
use std::str::FromStr;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// SQLite implementation of [`RecordStore`](super::RecordStore).
#[derive(Debug)]
pub struct SqliteStore {
    pool: SqlitePool,
    write_lock: Mutex<()>,
}

impl SqliteStore {
    /// Connects to `url`, creating the database file and tables if needed.
    ///
    /// In-memory databases are held on a single connection that is never
    /// recycled, since each SQLite memory connection is its own database.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Connection` if the database cannot be
    /// opened and `RepositoryError::Query` if the schema cannot be applied.
    pub async fn connect(url: &str, max_connections: u32) -> RepositoryResult<Self> {
        let options = SqliteConnectOptions::from_str(url)
            .map_err(|e| RepositoryError::connection(format!("invalid database url {url}: {e}")))?
            .create_if_missing(true);

        let in_memory = url.contains(":memory:") || url.contains("mode=memory");
        let pool_options = if in_memory {
            SqlitePoolOptions::new()
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new().max_connections(max_connections.max(1))
        };

        let pool = pool_options
            .connect_with(options)
            .await
            .map_err(|e| RepositoryError::connection(e.to_string()))?;

        let store = Self::from_pool(pool);
        store.migrate().await?;
        info!(url, in_memory, "sqlite store connected");
        Ok(store)
    }

    /// Wraps an existing pool without touching the schema.
    #[must_use]
    pub fn from_pool(pool: SqlitePool) -> Self {
        Self {
            pool,
            write_lock: Mutex::new(()),
        }
    }

    /// Returns a reference to the connection pool.
    #[must_use]
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Creates missing tables and stamps rows whose audit columns are NULL.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Query` if a statement fails.
    pub async fn migrate(&self) -> RepositoryResult<()> {
        self.migrate_kind::<Deal>().await?;
        self.migrate_kind::<Broker>().await?;
        self.migrate_kind::<Portfolio>().await?;
        self.migrate_kind::<Allocation>().await?;
        Ok(())
    }

    async fn migrate_kind<R: SqlRecord>(&self) -> RepositoryResult<()> {
        sqlx::query(R::CREATE_TABLE)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        let now = Timestamp::now().to_rfc3339();
        let sql = format!(
            "UPDATE {table} SET created_at = COALESCE(created_at, ?), \
             updated_at = COALESCE(updated_at, ?) \
             WHERE created_at IS NULL OR updated_at IS NULL",
            table = R::KIND.collection()
        );
        let repaired = sqlx::query(&sql)
            .bind(&now)
            .bind(&now)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?
            .rows_affected();
        if repaired > 0 {
            warn!(
                kind = %R::KIND,
                repaired,
                "stamped rows missing audit timestamps"
            );
        }
        Ok(())
    }

    /// Closes the pool.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

impl NamedBackend for SqliteStore {
    const NAME: &'static str = "sqlite";
}

fn map_sqlx_error(err: sqlx::Error) -> RepositoryError {
    match err {
        sqlx::Error::Configuration(_)
        | sqlx::Error::Io(_)
        | sqlx::Error::Tls(_)
        | sqlx::Error::PoolTimedOut
        | sqlx::Error::PoolClosed
        | sqlx::Error::WorkerCrashed => RepositoryError::connection(err.to_string()),
        sqlx::Error::ColumnDecode { .. } | sqlx::Error::Decode(_) => {
            RepositoryError::serialization(err.to_string())
        }
        other => RepositoryError::query(other.to_string()),
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db) => db.is_unique_violation(),
        _ => false,
    }
}

fn select_sql<R: SqlRecord>() -> String {
    format!(
        "SELECT * FROM {table} WHERE {key} = ?",
        table = R::KIND.collection(),
        key = R::KEY_COLUMN
    )
}

#[async_trait]
impl<R: SqlRecord> Repository<R> for SqliteStore {
    async fn list_all(&self) -> RepositoryResult<Vec<R>> {
        let sql = format!("SELECT * FROM {} ORDER BY id", R::KIND.collection());
        let rows = sqlx::query(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx_error)?;
        rows.iter()
            .map(|row| R::from_row(row).map_err(map_sqlx_error))
            .collect()
    }

    async fn get(&self, key: &R::Key) -> RepositoryResult<Option<R>> {
        let sql = select_sql::<R>();
        let row = R::key_value(key)
            .bind(sqlx::query(&sql))
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)?;
        row.map(|row| R::from_row(&row).map_err(map_sqlx_error))
            .transpose()
    }

    async fn create(&self, draft: R::Draft) -> RepositoryResult<R> {
        let _guard = self.write_lock.lock().await;
        let mut tx = self.pool.begin().await.map_err(map_sqlx_error)?;

        let key = R::draft_key(&draft);
        if let Some(key) = &key {
            let sql = format!(
                "SELECT 1 FROM {table} WHERE {column} = ? LIMIT 1",
                table = R::KIND.collection(),
                column = R::KEY_COLUMN
            );
            let taken = R::key_value(key)
                .bind(sqlx::query(&sql))
                .fetch_optional(&mut *tx)
                .await
                .map_err(map_sqlx_error)?;
            if taken.is_some() {
                return Err(RepositoryError::duplicate(R::KIND.label(), key));
            }
        }

        // Placeholder id; the database assigns the real one.
        let mut record = R::create(0, draft, Timestamp::now());
        let columns = R::COLUMNS.join(", ");
        let placeholders = vec!["?"; R::COLUMNS.len() + 2].join(", ");
        let sql = format!(
            "INSERT INTO {table} ({columns}, created_at, updated_at) VALUES ({placeholders})",
            table = R::KIND.collection()
        );
        let mut query = sqlx::query(&sql);
        for value in record.values() {
            query = value.bind(query);
        }
        let audit = *record.audit();
        let result = query
            .bind(audit.created_at.to_rfc3339())
            .bind(audit.updated_at.to_rfc3339())
            .execute(&mut *tx)
            .await
            .map_err(|e| match &key {
                Some(key) if is_unique_violation(&e) => {
                    RepositoryError::duplicate(R::KIND.label(), key)
                }
                _ => map_sqlx_error(e),
            })?;
        record.set_id(result.last_insert_rowid());

        tx.commit().await.map_err(map_sqlx_error)?;
        debug!(kind = %R::KIND, id = record.id(), "record created");
        Ok(record)
    }

    async fn update(&self, key: &R::Key, patch: R::Patch) -> RepositoryResult<R> {
        let _guard = self.write_lock.lock().await;
        let mut tx = self.pool.begin().await.map_err(map_sqlx_error)?;

        let sql = select_sql::<R>();
        let row = R::key_value(key)
            .bind(sqlx::query(&sql))
            .fetch_optional(&mut *tx)
            .await
            .map_err(map_sqlx_error)?
            .ok_or_else(|| RepositoryError::not_found(R::KIND.label(), key))?;
        let mut record = R::from_row(&row).map_err(map_sqlx_error)?;
        record.apply_update(patch);

        let assignments = R::COLUMNS
            .iter()
            .map(|column| format!("{column} = ?"))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!(
            "UPDATE {table} SET {assignments}, updated_at = ? WHERE id = ?",
            table = R::KIND.collection()
        );
        let mut query = sqlx::query(&sql);
        for value in record.values() {
            query = value.bind(query);
        }
        query
            .bind(record.audit().updated_at.to_rfc3339())
            .bind(record.id())
            .execute(&mut *tx)
            .await
            .map_err(map_sqlx_error)?;

        tx.commit().await.map_err(map_sqlx_error)?;
        debug!(kind = %R::KIND, id = record.id(), "record updated");
        Ok(record)
    }

    async fn delete(&self, key: &R::Key) -> RepositoryResult<bool> {
        let _guard = self.write_lock.lock().await;
        let sql = format!(
            "DELETE FROM {table} WHERE {column} = ?",
            table = R::KIND.collection(),
            column = R::KEY_COLUMN
        );
        let result = R::key_value(key)
            .bind(sqlx::query(&sql))
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;
        Ok(result.rows_affected() > 0)
    }

    async fn count(&self) -> RepositoryResult<u64> {
        let sql = format!("SELECT COUNT(*) AS n FROM {}", R::KIND.collection());
        let row = sqlx::query(&sql)
            .fetch_one(&self.pool)
            .await
            .map_err(map_sqlx_error)?;
        let n: i64 = row.try_get("n").map_err(map_sqlx_error)?;
        Ok(u64::try_from(n).unwrap_or(0))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::domain::entities::{
        AllocationDraft, AllocationPatch, BrokerDraft, DealDraft, DealPatch, PortfolioDraft,
        PortfolioPatch,
    };
    use crate::infrastructure::persistence::RecordStore;
    use chrono::NaiveDate;
    use tempfile::tempdir;

    async fn memory_store() -> SqliteStore {
        SqliteStore::connect("sqlite::memory:", 1).await.unwrap()
    }

    #[tokio::test]
    async fn connect_creates_empty_tables() {
        let store = memory_store().await;
        assert_eq!(store.backend_name(), "sqlite");
        assert_eq!(Repository::<Deal>::count(&store).await.unwrap(), 0);
        assert_eq!(Repository::<Broker>::count(&store).await.unwrap(), 0);
        assert_eq!(Repository::<Portfolio>::count(&store).await.unwrap(), 0);
        assert_eq!(Repository::<Allocation>::count(&store).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn deal_scenario() {
        let store = memory_store().await;
        let key = "DD100".to_string();

        let draft = DealDraft::new("DD100", "Test")
            .with_amount(100.0)
            .with_dates(
                NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
                NaiveDate::from_ymd_opt(2024, 12, 31).unwrap(),
            );
        let created = Repository::<Deal>::create(&store, draft).await.unwrap();
        assert_eq!(created.id, 1);

        let fetched = Repository::<Deal>::get(&store, &key).await.unwrap();
        assert_eq!(fetched, Some(created.clone()));

        let patch = DealPatch {
            status: Some(Some("Active".to_string())),
            amount: Some(None),
            ..DealPatch::default()
        };
        let updated = Repository::<Deal>::update(&store, &key, patch)
            .await
            .unwrap();
        assert_eq!(updated.id, created.id);
        assert_eq!(updated.status.as_deref(), Some("Active"));
        assert_eq!(updated.amount, None);
        assert_eq!(updated.start_date, created.start_date);
        assert_eq!(updated.audit.created_at, created.audit.created_at);
        assert!(updated.audit.updated_at.is_after(&created.audit.updated_at));
        assert_eq!(
            Repository::<Deal>::get(&store, &key).await.unwrap(),
            Some(updated)
        );

        let duplicate = Repository::<Deal>::create(&store, DealDraft::new("DD100", "Again")).await;
        assert!(duplicate.unwrap_err().is_duplicate());

        assert!(Repository::<Deal>::delete(&store, &key).await.unwrap());
        assert!(!Repository::<Deal>::delete(&store, &key).await.unwrap());
        assert!(Repository::<Deal>::get(&store, &key).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn update_missing_is_not_found() {
        let store = memory_store().await;
        let err = Repository::<Portfolio>::update(
            &store,
            &"PF404".to_string(),
            PortfolioPatch::default(),
        )
        .await
        .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn ids_are_not_reused_after_delete() {
        let store = memory_store().await;
        let first = Repository::<Broker>::create(&store, BrokerDraft::new("B1", "One", None))
            .await
            .unwrap();
        let second = Repository::<Broker>::create(&store, BrokerDraft::new("B2", "Two", None))
            .await
            .unwrap();
        assert_eq!((first.id, second.id), (1, 2));

        Repository::<Broker>::delete(&store, &"B2".to_string())
            .await
            .unwrap();
        let third = Repository::<Broker>::create(&store, BrokerDraft::new("B3", "Three", None))
            .await
            .unwrap();
        assert_eq!(third.id, 3);
    }

    #[tokio::test]
    async fn list_is_in_insertion_order() {
        let store = memory_store().await;
        for (id, name) in [("PF2", "Second"), ("PF1", "First")] {
            Repository::<Portfolio>::create(&store, PortfolioDraft::new(id, name))
                .await
                .unwrap();
        }
        let keys: Vec<String> = Repository::<Portfolio>::list_all(&store)
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.portfolio_id)
            .collect();
        assert_eq!(keys, vec!["PF2", "PF1"]);
    }

    #[tokio::test]
    async fn allocation_round_trip() {
        let store = memory_store().await;
        let draft = AllocationDraft {
            deal_circle: Some("Circle A".to_string()),
            is_add_on: true,
            deal_allocation: Some(2_500_000.0),
            circle_date: NaiveDate::from_ymd_opt(2024, 3, 1),
            ..AllocationDraft::default()
        };
        let created = Repository::<Allocation>::create(&store, draft)
            .await
            .unwrap();
        let patch = AllocationPatch {
            is_add_on: Some(false),
            execution_notes: Some(Some("filled".to_string())),
            ..AllocationPatch::default()
        };
        let updated = Repository::<Allocation>::update(&store, &created.id, patch)
            .await
            .unwrap();
        let stored = Repository::<Allocation>::get(&store, &created.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored, updated);
        assert!(!stored.is_add_on);
        assert_eq!(stored.deal_allocation, Some(2_500_000.0));
    }

    #[tokio::test]
    async fn null_audit_stamps_are_repaired_on_migrate() {
        let store = memory_store().await;
        sqlx::query("INSERT INTO brokers (broker_id, broker_name) VALUES ('B9', 'Legacy')")
            .execute(store.pool())
            .await
            .unwrap();
        store.migrate().await.unwrap();

        let raw = sqlx::query("SELECT created_at, updated_at FROM brokers WHERE broker_id = 'B9'")
            .fetch_one(store.pool())
            .await
            .unwrap();
        let created: Option<String> = raw.try_get("created_at").unwrap();
        let updated: Option<String> = raw.try_get("updated_at").unwrap();
        assert!(created.is_some());
        assert_eq!(created, updated);
    }

    #[tokio::test]
    async fn file_database_survives_reconnect() {
        let dir = tempdir().unwrap();
        let url = format!("sqlite://{}", dir.path().join("blotter.db").display());

        let created = {
            let store = SqliteStore::connect(&url, 2).await.unwrap();
            let deal = Repository::<Deal>::create(&store, DealDraft::new("DD1", "Durable"))
                .await
                .unwrap();
            store.close().await;
            deal
        };

        let store = SqliteStore::connect(&url, 2).await.unwrap();
        let fetched = Repository::<Deal>::get(&store, &"DD1".to_string())
            .await
            .unwrap();
        assert_eq!(fetched, Some(created));
    }
}
