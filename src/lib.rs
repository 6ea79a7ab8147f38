//! # formrelay
//!
//! `formrelay` collects messages submitted through a web form and stores them
//! in a document store, with a local TCP relay between the two.
//!
//! ```text
//! browser -> ingress (HTTP) -> relay (TCP) -> writer -> connector -> MongoDB | sled
//! ```
//!
//! ## Core Modules
//!
//! - `ingress`: HTTP server; forwards form bodies to the relay and serves the front-end pages.
//! - `relay`: sequential TCP listener decoding `key=value` payloads into message records.
//! - `persistence`: message record, store backends, retrying connector and writer.
//! - `config`: Handles loading settings from file and environment.
//! - `app`: wiring used by the binary to start each service.
//! - `utils`: Error types and logging setup.

pub mod app;
pub mod config;
pub mod ingress;
pub mod persistence;
pub mod relay;
pub mod utils;
