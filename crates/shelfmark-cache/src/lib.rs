//! # shelfmark-cache
//!
//! Category-partitioned in-memory caching for the Shelfmark ingestion core.
//!
//! Two pieces live here:
//!
//! - [`TtlCache`]: a key/value store with combined sliding + absolute
//!   expiration per entry. An entry is evicted at
//!   `min(last_access + sliding, inserted_at + absolute)`.
//! - [`CacheKeyRegistry`]: central bookkeeping of which cache keys are live
//!   and which category, if any, each belongs to, so invalidation can be
//!   scoped to a category instead of flushing everything. The registry also
//!   carries hit/miss/invalidation statistics.
//!
//! Both are explicitly constructed and dependency-injected; there is no
//! ambient singleton.

mod registry;
mod store;

pub use registry::{CacheKeyRegistry, CacheStatsSnapshot};
pub use store::{CacheConfig, TtlCache};
