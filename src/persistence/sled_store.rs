//! Embedded store backed by `sled`
//!
//! Used when the datastore uri is `sled://<path>`: local runs without a
//! MongoDB container, and the test suite. Each record is one JSON value in a
//! tree named after the configured collection. Keys start with a monotonic id
//! from `Db::generate_id` followed by the insert time in microseconds, so
//! iteration yields insertion order even within one microsecond or across a
//! wall clock step.

use chrono::Utc;
use sled::{Db, Tree};

use super::record::MessageRecord;
use crate::utils::error::StoreError;

#[derive(Clone)]
pub struct SledStore {
    db: Db,
    tree: Tree,
}

impl SledStore {
    /// Open or create a sled database at `path`, using `collection` as tree name.
    pub fn open(path: &str, collection: &str) -> Result<Self, StoreError> {
        let db = sled::open(path)?;
        let tree = db.open_tree(collection)?;
        Ok(Self { db, tree })
    }

    /// Health probe: touches the on-disk files rather than trusting the open handle.
    pub fn ping(&self) -> Result<(), StoreError> {
        self.db.size_on_disk()?;
        Ok(())
    }

    /// Insert a record and flush it to disk. Returns the generated key.
    pub async fn insert(&self, record: &MessageRecord) -> Result<String, StoreError> {
        let serialized = serde_json::to_vec(record)?;
        let key = format!(
            "{:020}_{:020}",
            self.db.generate_id()?,
            Utc::now().timestamp_micros()
        );

        self.tree.insert(key.as_bytes(), serialized)?;
        self.tree.flush_async().await?;

        Ok(key)
    }

    /// Every stored record, oldest first.
    pub fn load_all(&self) -> Result<Vec<MessageRecord>, StoreError> {
        self.tree
            .iter()
            .map(|entry| -> Result<MessageRecord, StoreError> {
                let (_, value) = entry?;
                Ok(serde_json::from_slice(&value)?)
            })
            .collect()
    }
}

impl std::fmt::Debug for SledStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SledStore")
            .field("db", &"sled::Db")
            .field("tree", &String::from_utf8_lossy(&self.tree.name()))
            .finish()
    }
}
