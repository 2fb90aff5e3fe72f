//! Client-side result caching

pub mod query_cache;

pub use query_cache::{cache_key, Clock, QueryCache, SystemClock};
