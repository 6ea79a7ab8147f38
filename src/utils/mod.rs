//! The `utils` module provides the error types and the logging setup shared
//! by the ingress, relay and persistence modules.

pub mod error;
pub mod logging;
