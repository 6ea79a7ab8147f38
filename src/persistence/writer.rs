use std::sync::Arc;

use tracing::info;

use super::connector::Connector;
use super::record::MessageRecord;
use super::store::DocumentId;
use crate::utils::error::WriteError;

/// Inserts message records through the shared connector.
///
/// `save` reports failures instead of handling them; delivery over the relay
/// is acknowledged independently of storage, so callers log the error and
/// move on.
#[derive(Clone, Debug)]
pub struct MessageWriter {
    connector: Arc<Connector>,
}

impl MessageWriter {
    pub fn new(connector: Arc<Connector>) -> Self {
        Self { connector }
    }

    pub fn connector(&self) -> Arc<Connector> {
        self.connector.clone()
    }

    pub async fn save(&self, record: &MessageRecord) -> Result<DocumentId, WriteError> {
        let store = self.connector.get().await?;
        let id = store.insert(record).await?;
        info!(%id, username = %record.username, date = %record.date, "message saved");
        Ok(id)
    }
}
