//! # Response Cache
//!
//! Context-owned response caching for the media pulse service. A cache is an
//! explicit component with a fixed capacity and a time-to-live, handed to
//! whoever needs it, rather than ambient module-level state.

mod cache;

pub use cache::memory::MemoryCache;
pub use cache::{CacheStats, ResponseCache};
