use super::mongo_store::MongoStore;
use super::record::MessageRecord;
use super::sled_store::SledStore;
use crate::utils::error::StoreError;

/// Identifier of a stored document, as reported by the backend.
pub type DocumentId = String;

/// A connected document store. Cheap to clone; clones share the connection.
#[derive(Clone, Debug)]
pub enum Store {
    Mongo(MongoStore),
    Sled(SledStore),
}

impl Store {
    pub async fn ping(&self) -> Result<(), StoreError> {
        match self {
            Store::Mongo(store) => store.ping().await,
            Store::Sled(store) => store.ping(),
        }
    }

    pub async fn insert(&self, record: &MessageRecord) -> Result<DocumentId, StoreError> {
        match self {
            Store::Mongo(store) => store.insert(record).await,
            Store::Sled(store) => store.insert(record).await,
        }
    }

    pub async fn load_all(&self) -> Result<Vec<MessageRecord>, StoreError> {
        match self {
            Store::Mongo(store) => store.load_all().await,
            Store::Sled(store) => store.load_all(),
        }
    }
}

/// Where a datastore uri points.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    Mongo { uri: String },
    Sled { path: String },
}

impl Target {
    pub fn parse(uri: &str) -> Result<Self, StoreError> {
        if uri.starts_with("mongodb://") || uri.starts_with("mongodb+srv://") {
            return Ok(Target::Mongo {
                uri: uri.to_string(),
            });
        }

        match uri.strip_prefix("sled://") {
            Some(path) if !path.is_empty() => Ok(Target::Sled {
                path: path.to_string(),
            }),
            _ => Err(StoreError::UnsupportedUri(uri.to_string())),
        }
    }
}
