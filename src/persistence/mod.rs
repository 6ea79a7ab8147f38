//! The `persistence` module stores relayed messages in a document store.
//!
//! - `record`: the stored document shape and the receipt clock.
//! - `store`: the backend-neutral store handle (`mongodb://` or `sled://`).
//! - `connector`: lazy, retrying bootstrap of the process-wide handle.
//! - `writer`: best-effort insert of one record per relayed message.

pub mod connector;
pub mod mongo_store;
pub mod record;
pub mod sled_store;
pub mod store;
pub mod writer;

pub use connector::{Connector, Dialer, RetryPolicy};
pub use record::{MessageRecord, ReceiptClock};
pub use store::{DocumentId, Store};
pub use writer::MessageWriter;
