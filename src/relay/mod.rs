//! The `relay` module is the local TCP hop between the HTTP ingress and the
//! document store.
//!
//! Wire protocol: one plaintext write per message, `key1=value1&key2=value2`
//! with form-encoded values, no length prefix and no response. The relay
//! closes the connection after a single read.

pub mod listener;
pub mod payload;

pub use listener::{ConnectionOutcome, RelayListener};
pub use payload::{Submission, parse_payload};
