//! Per-parse session tokens.
//!
//! The escape-and-restore parser wraps every ERB tag in a token that must not
//! occur in the template. Tokens come from an injected [`TokenSource`] so tests
//! can pin the exact transformed text.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use tracing::warn;

/// An ASCII-alphanumeric marker unique to one parse.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionToken(String);

impl SessionToken {
    /// Creates a token from `value`.
    ///
    /// Returns `None` unless `value` is non-empty and ASCII alphanumeric.
    pub fn new(value: impl Into<String>) -> Option<Self> {
        let value = value.into();
        if !value.is_empty() && value.bytes().all(|b| b.is_ascii_alphanumeric()) {
            Some(Self(value))
        } else {
            None
        }
    }

    /// Creates a token from raw bytes, hex-encoded.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        let mut hex = String::with_capacity(bytes.len() * 2);
        for b in bytes {
            hex.push_str(&format!("{b:02x}"));
        }
        if hex.is_empty() {
            hex.push('0');
        }
        Self(hex)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SessionToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Supplies one session token per parse.
pub trait TokenSource: Send + Sync {
    fn token(&self) -> SessionToken;
}

/// Draws 128 random bits from the operating system.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsTokenSource;

impl TokenSource for OsTokenSource {
    fn token(&self) -> SessionToken {
        let mut bytes = [0u8; 16];
        if let Err(e) = getrandom::fill(&mut bytes) {
            warn!("OS randomness unavailable, deriving session token: {}", e);
            bytes = fallback_bytes();
        }
        SessionToken::from_bytes(&bytes)
    }
}

fn fallback_bytes() -> [u8; 16] {
    static COUNTER: AtomicU64 = AtomicU64::new(0);

    let mut hasher = blake3::Hasher::new();
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or_default();
    hasher.update(&nanos.to_le_bytes());
    hasher.update(&COUNTER.fetch_add(1, Ordering::Relaxed).to_le_bytes());
    hasher.update(&std::process::id().to_le_bytes());

    let mut out = [0u8; 16];
    out.copy_from_slice(&hasher.finalize().as_bytes()[..16]);
    out
}

/// Always returns the same token.
#[derive(Debug, Clone)]
pub struct FixedToken(SessionToken);

impl FixedToken {
    /// Non-alphanumeric values are hex-encoded.
    pub fn new(value: &str) -> Self {
        Self(SessionToken::new(value).unwrap_or_else(|| SessionToken::from_bytes(value.as_bytes())))
    }
}

impl TokenSource for FixedToken {
    fn token(&self) -> SessionToken {
        self.0.clone()
    }
}
