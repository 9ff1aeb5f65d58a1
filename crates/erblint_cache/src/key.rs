//! Cache keys.

use std::fs;
use std::path::Path;

use tracing::warn;

const KEY_VERSION: &str = concat!("erblint-cache/", env!("CARGO_PKG_VERSION"));

/// The key of one file's cached result.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey {
    /// Hex BLAKE3 digest of path, mode bits, configuration and content.
    Digest(String),
    /// The digest could not be computed; never hits, never stored.
    Uncacheable,
}

impl CacheKey {
    /// Computes the key of a file from its parts.
    ///
    /// Every field is length-prefixed, so moving bytes between fields always
    /// changes the digest.
    pub fn digest(path: &Path, mode: u32, serialized_config: &str, content: &[u8]) -> Self {
        let mut hasher = blake3::Hasher::new();
        for field in [
            KEY_VERSION.as_bytes(),
            path.as_os_str().as_encoded_bytes(),
            &mode.to_le_bytes(),
            serialized_config.as_bytes(),
            content,
        ] {
            hasher.update(&(field.len() as u64).to_le_bytes());
            hasher.update(field);
        }
        Self::Digest(hasher.finalize().to_hex().to_string())
    }

    /// Re-reads a file's metadata and content and computes its key.
    ///
    /// Any I/O failure yields [`CacheKey::Uncacheable`].
    pub fn for_file(path: &Path, serialized_config: &str) -> Self {
        let read = fs::metadata(path).and_then(|metadata| {
            let content = fs::read(path)?;
            Ok((file_mode(&metadata), content))
        });
        match read {
            Ok((mode, content)) => Self::digest(path, mode, serialized_config, &content),
            Err(e) => {
                warn!("Cannot compute cache key for {}: {}", path.display(), e);
                Self::Uncacheable
            }
        }
    }

    /// The hex digest, unless uncacheable.
    pub fn as_hex(&self) -> Option<&str> {
        match self {
            Self::Digest(hex) => Some(hex),
            Self::Uncacheable => None,
        }
    }

    pub fn is_cacheable(&self) -> bool {
        matches!(self, Self::Digest(_))
    }
}

/// Permission bits of a file.
#[cfg(unix)]
pub fn file_mode(metadata: &fs::Metadata) -> u32 {
    use std::os::unix::fs::PermissionsExt;
    metadata.permissions().mode()
}

/// Permission bits of a file; only the read-only flag exists here.
#[cfg(not(unix))]
pub fn file_mode(metadata: &fs::Metadata) -> u32 {
    if metadata.permissions().readonly() {
        0o444
    } else {
        0o644
    }
}

/// True when `name` looks like a digest file name.
pub(crate) fn is_digest_name(name: &str) -> bool {
    name.len() == blake3::OUT_LEN * 2 && name.bytes().all(|b| b.is_ascii_hexdigit())
}

/// True when `name` looks like the temp file of an entry write.
pub(crate) fn is_temp_name(name: &str) -> bool {
    name.strip_prefix('.')
        .and_then(|rest| rest.strip_suffix(".tmp"))
        .and_then(|rest| rest.split('.').next())
        .is_some_and(is_digest_name)
}
