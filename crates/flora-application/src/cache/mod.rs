//! Result cache

pub mod result_cache;

pub use result_cache::{CacheLookup, CacheSource, ResultCache, ResultCacheStats, StampedeConfig};
