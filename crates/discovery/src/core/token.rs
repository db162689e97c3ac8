use std::time::{Duration, SystemTime};

use crate::core::SecureString;

/// Bearer access token produced by a credential strategy
#[derive(Clone)]
pub struct AccessToken {
    secret: SecureString,
    expires_at: Option<SystemTime>,
}

impl AccessToken {
    /// Create a bearer token with no known expiry
    pub fn bearer(token: impl Into<String>) -> Self {
        Self {
            secret: SecureString::new(token),
            expires_at: None,
        }
    }

    /// Attach a relative expiry
    ///
    /// An `expires_in` large enough to overflow the clock degrades to no
    /// known expiry instead of panicking.
    pub fn with_expires_in(mut self, expires_in: Duration) -> Self {
        self.expires_at = SystemTime::now().checked_add(expires_in);
        self
    }

    /// The raw token value (use with caution)
    pub fn secret(&self) -> &str {
        self.secret.expose()
    }

    /// When the token expires, if the issuer said
    pub fn expires_at(&self) -> Option<SystemTime> {
        self.expires_at
    }

    /// Check if the token is past its expiry
    pub fn is_expired(&self) -> bool {
        self.expires_at.is_some_and(|exp| exp <= SystemTime::now())
    }
}

impl std::fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessToken")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}
