use serde::{Deserialize, Serialize};

/// Tokens handed out within this margin of their expiry are refreshed first.
pub const EXPIRY_BUFFER_MS: i64 = 60_000;

/// A client-credentials token as persisted between requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredToken {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: String,
    /// Epoch milliseconds.
    pub expires_at: i64,
}

impl StoredToken {
    pub fn is_usable_at(&self, now_ms: i64) -> bool {
        now_ms < self.expires_at.saturating_sub(EXPIRY_BUFFER_MS)
    }
}

/// Token endpoint success body.
#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// Lifetime in seconds.
    pub expires_in: i64,
}
