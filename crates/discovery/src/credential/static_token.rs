//! Pre-acquired access token wrapped as a credential

use async_trait::async_trait;

use crate::core::{AccessToken, CredentialError, SecureString};
use crate::credential::{Strategy, TokenCredential};

/// Static bearer-token credential
///
/// Wraps a token the caller already holds. The caller asserts the token is
/// valid and unexpired for the target scope; no refresh is attempted and no
/// expiry bookkeeping is done here.
pub struct StaticTokenCredential {
    token: SecureString,
}

impl StaticTokenCredential {
    /// Wrap an existing token
    pub fn new(token: SecureString) -> Self {
        Self { token }
    }
}

#[async_trait]
impl TokenCredential for StaticTokenCredential {
    async fn token(&self, _scope: &str) -> Result<AccessToken, CredentialError> {
        Ok(AccessToken::bearer(self.token.expose()))
    }

    fn strategy(&self) -> Strategy {
        Strategy::StaticToken
    }
}

impl std::fmt::Debug for StaticTokenCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StaticTokenCredential").finish_non_exhaustive()
    }
}
