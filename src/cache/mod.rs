//! Client-side query cache.
//!
//! Query results are stored per [`QueryKey`] and tagged; mutations go through
//! the same [`QueryCache`] and, once the service confirms them, mark every
//! entry covered by their declared tags as stale so the next read refetches.
//!
//! ```toml
//! [cache]
//! keep_unused_seconds = 60
//! ```

mod config;
pub mod invalidation;
mod keys;
pub(crate) mod lock;
pub mod metrics;
mod query;
mod registry;
mod store;

pub use config::CacheConfig;
pub use invalidation::{INVALIDATION_TABLE, MutationKind, Target};
pub use keys::{QueryKey, Tag, TagType};
pub use query::{QueryCache, Subscription};
pub use registry::TagRegistry;
pub use store::{
    EntrySnapshot, QueryData, QueryOptions, QuerySnapshot, QueryStatus, QueryValue,
};
