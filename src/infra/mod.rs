//! Infrastructure adapters: HTTP transport, credential storage, telemetry.

pub mod error;
pub mod http;
pub mod telemetry;
pub mod token;
