//! # JSON Collection
//!
//! One record kind held in memory and mirrored to a JSON array file.
//!
//! The write guard is held for the whole read-modify-persist cycle, so two
//! concurrent mutations of the same collection are serialized instead of
//! racing on the file. Mutations are applied to a copy of the records; the
//! copy replaces the in-memory state only after the file has been written,
//! so memory never runs ahead of disk.

use crate::domain::entities::Record;
use crate::domain::value_objects::Timestamp;
use crate::infrastructure::persistence::traits::{RepositoryError, RepositoryResult};
use serde_json::Value;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;
use tracing::{debug, warn};

const AUDIT_FIELDS: [&str; 2] = ["created_at", "updated_at"];

#[derive(Debug)]
struct CollectionState<R> {
    records: Vec<R>,
    next_id: i64,
}

/// A file-backed collection of one record kind.
#[derive(Debug)]
pub struct Collection<R> {
    path: PathBuf,
    state: RwLock<CollectionState<R>>,
}

impl<R: Record> Collection<R> {
    /// Loads the collection from `dir/<collection>.json`.
    ///
    /// A missing file is an empty collection. Audit stamps without a UTC
    /// offset are read as UTC, and missing or unreadable ones are set to the
    /// load time; the repair is kept in memory and reaches disk with the next
    /// mutation.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Io` if the file cannot be read and
    /// `RepositoryError::Serialization` if it is not a JSON array of records.
    pub async fn load(dir: &Path) -> RepositoryResult<Self> {
        let path = dir.join(format!("{}.json", R::KIND.collection()));
        let records = read_records::<R>(&path).await?;
        let next_id = next_id_after(&records);

        debug!(
            kind = %R::KIND,
            path = %path.display(),
            records = records.len(),
            next_id,
            "collection loaded"
        );

        Ok(Self {
            path,
            state: RwLock::new(CollectionState { records, next_id }),
        })
    }

    /// Returns the backing file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the id the next create will receive.
    pub async fn next_id(&self) -> i64 {
        self.state.read().await.next_id
    }

    /// Returns a snapshot of every record, in insertion order.
    pub async fn list(&self) -> Vec<R> {
        self.state.read().await.records.clone()
    }

    /// Returns the first record addressed by `key`.
    pub async fn get(&self, key: &R::Key) -> Option<R> {
        let state = self.state.read().await;
        state.records.iter().find(|r| r.has_key(key)).cloned()
    }

    /// Returns the number of records.
    pub async fn len(&self) -> usize {
        self.state.read().await.records.len()
    }

    /// Appends a new record.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Duplicate` if the business key is taken,
    /// or a persistence error if the file cannot be written.
    pub async fn create(&self, draft: R::Draft) -> RepositoryResult<R> {
        let mut state = self.state.write().await;

        if let Some(key) = R::draft_key(&draft) {
            if state.records.iter().any(|r| r.has_key(&key)) {
                return Err(RepositoryError::duplicate(R::KIND.label(), key));
            }
        }

        let id = state.next_id;
        let record = R::create(id, draft, Timestamp::now());

        let mut records = state.records.clone();
        records.push(record.clone());
        self.persist(&records).await?;

        state.records = records;
        state.next_id = id.saturating_add(1);
        debug!(kind = %R::KIND, key = %record.key(), id, "record created");
        Ok(record)
    }

    /// Merges `patch` into the record addressed by `key`, in place.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no record has that key, or a
    /// persistence error if the file cannot be written.
    pub async fn update(&self, key: &R::Key, patch: R::Patch) -> RepositoryResult<R> {
        let mut state = self.state.write().await;

        let position = state
            .records
            .iter()
            .position(|r| r.has_key(key))
            .ok_or_else(|| RepositoryError::not_found(R::KIND.label(), key))?;

        let mut records = state.records.clone();
        let record = records
            .get_mut(position)
            .ok_or_else(|| RepositoryError::internal("record position out of range"))?;
        record.apply_update(patch);
        let updated = record.clone();

        self.persist(&records).await?;

        state.records = records;
        debug!(kind = %R::KIND, key = %key, id = updated.id(), "record updated");
        Ok(updated)
    }

    /// Removes every record addressed by `key`.
    ///
    /// Returns whether anything was removed. Nothing is written when no
    /// record matched.
    ///
    /// # Errors
    ///
    /// Returns a persistence error if the file cannot be written.
    pub async fn delete(&self, key: &R::Key) -> RepositoryResult<bool> {
        let mut state = self.state.write().await;

        if !state.records.iter().any(|r| r.has_key(key)) {
            return Ok(false);
        }

        let records: Vec<R> = state
            .records
            .iter()
            .filter(|r| !r.has_key(key))
            .cloned()
            .collect();
        self.persist(&records).await?;

        state.records = records;
        debug!(kind = %R::KIND, key = %key, "record deleted");
        Ok(true)
    }

    /// Writes the whole collection to a sibling temp file, then renames it
    /// over the target.
    async fn persist(&self, records: &[R]) -> RepositoryResult<()> {
        let payload = serde_json::to_vec_pretty(records).map_err(|e| {
            RepositoryError::serialization(format!(
                "failed to encode {}: {e}",
                R::KIND.collection()
            ))
        })?;

        let temp_path = self.path.with_extension("json.tmp");
        tokio::fs::write(&temp_path, payload).await.map_err(|e| {
            RepositoryError::io(format!("failed to write {}: {e}", temp_path.display()))
        })?;

        tokio::fs::rename(&temp_path, &self.path)
            .await
            .map_err(|e| {
                RepositoryError::io(format!("failed to replace {}: {e}", self.path.display()))
            })?;

        Ok(())
    }
}

async fn read_records<R: Record>(path: &Path) -> RepositoryResult<Vec<R>> {
    let bytes = match tokio::fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => {
            return Err(RepositoryError::io(format!(
                "failed to read {}: {e}",
                path.display()
            )));
        }
    };

    let mut raw: Vec<Value> = serde_json::from_slice(&bytes).map_err(|e| {
        RepositoryError::serialization(format!("{} is not a JSON array: {e}", path.display()))
    })?;

    let now = Timestamp::now();
    let repaired = raw
        .iter_mut()
        .map(|value| repair_audit_stamps(value, now))
        .filter(|changed| *changed)
        .count();
    if repaired > 0 {
        warn!(
            kind = %R::KIND,
            path = %path.display(),
            repaired,
            "repaired missing or non-UTC audit timestamps"
        );
    }

    raw.into_iter()
        .map(|value| {
            serde_json::from_value(value).map_err(|e| {
                RepositoryError::serialization(format!(
                    "invalid record in {}: {e}",
                    path.display()
                ))
            })
        })
        .collect()
}

/// Normalizes audit stamps to RFC 3339 UTC. Offset-less stamps are read as
/// UTC; missing, null or unreadable ones become `now`. Returns true if
/// anything changed.
fn repair_audit_stamps(value: &mut Value, now: Timestamp) -> bool {
    let Some(object) = value.as_object_mut() else {
        return false;
    };
    let mut changed = false;
    for field in AUDIT_FIELDS {
        let repaired = match object.get(field) {
            Some(Value::String(stamp)) if Timestamp::parse_rfc3339(stamp).is_some() => continue,
            Some(Value::String(stamp)) => Timestamp::parse_lenient(stamp).unwrap_or(now),
            _ => now,
        };
        object.insert(field.to_string(), Value::String(repaired.to_rfc3339()));
        changed = true;
    }
    changed
}

fn next_id_after<R: Record>(records: &[R]) -> i64 {
    records
        .iter()
        .map(Record::id)
        .max()
        .map_or(1, |max| max.saturating_add(1))
}
