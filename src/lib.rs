//! Recipe-sharing client library.
//!
//! Layers, leaves first: `domain` rules, the `infra` transport and token
//! holders, the `cache` that mediates every read and write against the
//! remote recipe service, and the `application` view state built on top.

pub mod application;
pub mod cache;
pub mod config;
pub mod domain;
pub mod infra;

#[cfg(test)]
pub(crate) mod test_support;
