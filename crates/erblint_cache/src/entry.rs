//! Cache entry types.

use erblint_rule::{Offense, Severity};

use crate::CacheError;

/// The summary of one offense kept in the cache.
///
/// Ranges are not kept; they are re-derived when a file is linted again.
#[derive(Debug, Clone, PartialEq, Eq, rkyv::Archive, rkyv::Serialize, rkyv::Deserialize)]
pub struct CachedOffense {
    pub message: String,
    pub line: u32,
    pub severity: Severity,
}

impl From<&Offense> for CachedOffense {
    fn from(offense: &Offense) -> Self {
        Self {
            message: offense.message.clone(),
            line: offense.line(),
            severity: offense.severity,
        }
    }
}

/// The cached result of linting one file.
#[derive(Debug, Clone, PartialEq, Eq, rkyv::Archive, rkyv::Serialize, rkyv::Deserialize)]
pub struct CacheEntry {
    /// Hex digest of the key this entry was stored under.
    pub digest: String,
    pub offenses: Vec<CachedOffense>,
}

impl CacheEntry {
    pub fn new(digest: impl Into<String>, offenses: Vec<CachedOffense>) -> Self {
        Self {
            digest: digest.into(),
            offenses,
        }
    }

    /// Summarizes the active offenses of a lint result.
    pub fn from_offenses(digest: impl Into<String>, offenses: &[Offense]) -> Self {
        Self::new(
            digest,
            offenses
                .iter()
                .filter(|o| o.is_active())
                .map(CachedOffense::from)
                .collect(),
        )
    }

    pub(crate) fn to_bytes(&self) -> Result<Vec<u8>, CacheError> {
        rkyv::to_bytes::<rkyv::rancor::Error>(self)
            .map(|bytes| bytes.to_vec())
            .map_err(|e| CacheError::Serialization(e.to_string()))
    }

    pub(crate) fn from_bytes(bytes: &[u8]) -> Result<Self, CacheError> {
        let mut aligned = rkyv::util::AlignedVec::<16>::with_capacity(bytes.len());
        aligned.extend_from_slice(bytes);
        rkyv::from_bytes::<Self, rkyv::rancor::Error>(&aligned)
            .map_err(|e| CacheError::corrupted(e.to_string()))
    }
}
