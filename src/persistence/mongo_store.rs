//! MongoDB backend, the production document store.

use std::time::Duration;

use futures::TryStreamExt;
use mongodb::bson::doc;
use mongodb::options::ClientOptions;
use mongodb::{Client, Collection};

use super::record::MessageRecord;
use crate::utils::error::StoreError;

#[derive(Clone, Debug)]
pub struct MongoStore {
    client: Client,
    collection: Collection<MessageRecord>,
}

impl MongoStore {
    /// Builds a client for `uri`. No network traffic happens until the first
    /// command; `timeout` bounds server selection and socket connect.
    pub async fn connect(
        uri: &str,
        database: &str,
        collection: &str,
        timeout: Duration,
    ) -> Result<Self, StoreError> {
        let mut options = ClientOptions::parse(uri).await?;
        options.server_selection_timeout = Some(timeout);
        options.connect_timeout = Some(timeout);
        options.app_name = Some(env!("CARGO_PKG_NAME").to_string());

        let client = Client::with_options(options)?;
        let collection = client
            .database(database)
            .collection::<MessageRecord>(collection);

        Ok(Self { client, collection })
    }

    pub async fn ping(&self) -> Result<(), StoreError> {
        self.client
            .database("admin")
            .run_command(doc! { "ping": 1 })
            .await?;
        Ok(())
    }

    pub async fn insert(&self, record: &MessageRecord) -> Result<String, StoreError> {
        let result = self.collection.insert_one(record).await?;
        let id = match result.inserted_id.as_object_id() {
            Some(oid) => oid.to_hex(),
            None => result.inserted_id.to_string(),
        };
        Ok(id)
    }

    pub async fn load_all(&self) -> Result<Vec<MessageRecord>, StoreError> {
        let cursor = self.collection.find(doc! {}).sort(doc! { "_id": 1 }).await?;
        let records: Vec<MessageRecord> = cursor.try_collect().await?;
        Ok(records)
    }
}
