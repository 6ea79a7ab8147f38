//! Datastore connector
//!
//! Owns the single store handle of a process. The handle is created lazily on
//! the first `get`, retried with a fixed interval while the store is not up
//! yet (containers starting in parallel), and then reused for every later
//! call without further health checks. A stale connection is therefore only
//! noticed by the write that hits it.

use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::OnceCell;
use tracing::{info, warn};

use super::mongo_store::MongoStore;
use super::sled_store::SledStore;
use super::store::{Store, Target};
use crate::config::DatastoreSettings;
use crate::utils::error::{ConnectError, StoreError};

/// Opens a store handle. One call is one connection attempt.
#[async_trait]
pub trait Dialer: Send + Sync {
    async fn dial(&self) -> Result<Store, StoreError>;

    /// Human readable target for logs.
    fn describe(&self) -> String;
}

pub struct MongoDialer {
    uri: String,
    database: String,
    collection: String,
    timeout: Duration,
}

#[async_trait]
impl Dialer for MongoDialer {
    async fn dial(&self) -> Result<Store, StoreError> {
        let store =
            MongoStore::connect(&self.uri, &self.database, &self.collection, self.timeout).await?;
        Ok(Store::Mongo(store))
    }

    fn describe(&self) -> String {
        format!("mongodb {}/{}", self.database, self.collection)
    }
}

pub struct SledDialer {
    path: String,
    collection: String,
}

impl SledDialer {
    pub fn new(path: impl Into<String>, collection: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            collection: collection.into(),
        }
    }
}

#[async_trait]
impl Dialer for SledDialer {
    async fn dial(&self) -> Result<Store, StoreError> {
        Ok(Store::Sled(SledStore::open(&self.path, &self.collection)?))
    }

    fn describe(&self) -> String {
        format!("sled {}/{}", self.path, self.collection)
    }
}

/// Picks the dialer matching the scheme of `settings.uri`.
pub fn dialer_for(settings: &DatastoreSettings) -> Result<Box<dyn Dialer>, StoreError> {
    let dialer: Box<dyn Dialer> = match Target::parse(&settings.uri)? {
        Target::Mongo { uri } => Box::new(MongoDialer {
            uri,
            database: settings.database.clone(),
            collection: settings.collection.clone(),
            timeout: Duration::from_millis(settings.connect_timeout_ms),
        }),
        Target::Sled { path } => Box::new(SledDialer::new(path, settings.collection.clone())),
    };
    Ok(dialer)
}

#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub interval: Duration,
}

impl RetryPolicy {
    pub fn from_settings(settings: &DatastoreSettings) -> Self {
        Self {
            max_attempts: settings.max_attempts,
            interval: Duration::from_millis(settings.retry_interval_ms),
        }
    }
}

pub struct Connector {
    dialer: Box<dyn Dialer>,
    policy: RetryPolicy,
    store: OnceCell<Store>,
}

impl Connector {
    pub fn new(dialer: Box<dyn Dialer>, policy: RetryPolicy) -> Self {
        Self {
            dialer,
            policy,
            store: OnceCell::new(),
        }
    }

    pub fn from_settings(settings: &DatastoreSettings) -> Result<Self, StoreError> {
        Ok(Self::new(
            dialer_for(settings)?,
            RetryPolicy::from_settings(settings),
        ))
    }

    /// Returns the shared store, establishing it first if needed.
    ///
    /// Concurrent first callers wait on the same bootstrap. After an
    /// `Exhausted` error the cell stays empty and the next call starts a new
    /// round of attempts.
    pub async fn get(&self) -> Result<Store, ConnectError> {
        self.store
            .get_or_try_init(|| self.establish())
            .await
            .cloned()
    }

    pub fn is_connected(&self) -> bool {
        self.store.initialized()
    }

    async fn establish(&self) -> Result<Store, ConnectError> {
        let attempts = self.policy.max_attempts.max(1);
        let datastore = self.dialer.describe();
        let mut attempt = 1;

        loop {
            match self.attempt().await {
                Ok(store) => {
                    info!(%datastore, attempt, "datastore connected");
                    return Ok(store);
                }
                Err(last_error) if attempt >= attempts => {
                    return Err(ConnectError::Exhausted {
                        attempts,
                        last_error,
                    });
                }
                Err(e) => {
                    warn!(%datastore, attempt, max_attempts = attempts, error = %e, "waiting for datastore");
                    tokio::time::sleep(self.policy.interval).await;
                    attempt += 1;
                }
            }
        }
    }

    async fn attempt(&self) -> Result<Store, StoreError> {
        let store = self.dialer.dial().await?;
        store.ping().await?;
        Ok(store)
    }
}

impl std::fmt::Debug for Connector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connector")
            .field("target", &self.dialer.describe())
            .field("policy", &self.policy)
            .field("connected", &self.is_connected())
            .finish()
    }
}
