//! Round-robin credential rotation.

use sha2::{Digest, Sha256};
use std::sync::atomic::{AtomicUsize, Ordering};

/// Cycles through a fixed list of tokens.
///
/// The cursor is shared by every caller. Interleaved requests see a globally
/// fair order, not a per-request one.
#[derive(Debug, Default)]
pub struct TokenRotator {
    tokens: Vec<String>,
    cursor: AtomicUsize,
}

impl TokenRotator {
    /// Create a rotator starting at the first token.
    pub fn new(tokens: Vec<String>) -> Self {
        Self {
            tokens,
            cursor: AtomicUsize::new(0),
        }
    }

    /// Return the token under the cursor and advance it, wrapping at the end.
    ///
    /// Returns `None` when no tokens are configured.
    pub fn next(&self) -> Option<&str> {
        if self.tokens.is_empty() {
            return None;
        }
        let len = self.tokens.len();
        let index = self
            .cursor
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |i| Some((i + 1) % len))
            .unwrap_or(0);
        self.tokens.get(index % len).map(String::as_str)
    }

    /// Number of tokens.
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Whether no tokens are configured.
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

/// Short SHA-256 fingerprint of a token, safe to log.
pub fn token_fingerprint(token: &str) -> String {
    let hash = Sha256::digest(token.as_bytes());
    hex::encode(&hash[..4])
}
