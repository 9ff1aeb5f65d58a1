//! # erblint_cache
//!
//! Content-addressed result cache for ErbLint.
//!
//! A file's key is a BLAKE3 digest over its path, permission bits, the active
//! rule configuration and its content; any change to one of them is a miss.
//! Each entry is one rkyv-serialized file named after its hex digest.
//!
//! ## Example
//!
//! ```rust
//! use std::path::Path;
//! use erblint_cache::{CacheEntry, CacheKey, ResultCache};
//!
//! let dir = tempfile::tempdir().unwrap();
//! let cache = ResultCache::new(dir.path());
//! let key = CacheKey::digest(Path::new("index.html.erb"), 0o644, "[]", b"<p></p>\n");
//!
//! cache.put(&key, &CacheEntry::new(key.as_hex().unwrap(), Vec::new())).unwrap();
//! assert!(cache.get(&key).is_some());
//! ```

mod entry;
mod error;
mod key;
mod store;

pub use entry::{CacheEntry, CachedOffense};
pub use error::CacheError;
pub use key::{CacheKey, file_mode};
pub use store::{CacheStats, PruneStats, ResultCache};
