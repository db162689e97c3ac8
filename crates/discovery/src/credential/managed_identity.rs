//! Ambient platform identity via the instance-metadata endpoint

use async_trait::async_trait;
use url::Url;

use crate::core::{AccessToken, CredentialError};
use crate::credential::common::TokenResponse;
use crate::credential::{Strategy, TokenCredential};
use crate::util::sanitize_response_for_logging;

/// Default instance-metadata endpoint (link-local, non-routable)
pub const DEFAULT_IMDS_ENDPOINT: &str = "http://169.254.169.254";

const IMDS_TOKEN_PATH: &str = "/metadata/identity/oauth2/token";
const IMDS_API_VERSION: &str = "2018-02-01";

/// Ambient managed-identity credential
///
/// Requests tokens from the hosting platform's instance-metadata service.
/// No explicit secret material is involved; the platform vouches for the
/// workload. The endpoint is overridable so tests can point it at a stub.
pub struct ManagedIdentityCredential {
    http: reqwest::Client,
    endpoint: Url,
}

impl ManagedIdentityCredential {
    /// Create a credential against `endpoint`
    pub fn new(http: reqwest::Client, endpoint: Url) -> Self {
        Self { http, endpoint }
    }
}

#[async_trait]
impl TokenCredential for ManagedIdentityCredential {
    async fn token(&self, scope: &str) -> Result<AccessToken, CredentialError> {
        // The metadata service speaks resources, not scopes
        let resource = scope.strip_suffix("/.default").unwrap_or(scope);

        let mut url = self.endpoint.join(IMDS_TOKEN_PATH).map_err(|e| {
            CredentialError::invalid_input("imds_endpoint", e.to_string())
        })?;
        url.query_pairs_mut()
            .append_pair("api-version", IMDS_API_VERSION)
            .append_pair("resource", resource);

        let response = self
            .http
            .get(url)
            .header("Metadata", "true")
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "failed to reach the instance metadata service");
                CredentialError::NetworkFailed(e.to_string())
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| CredentialError::NetworkFailed(e.to_string()))?;

        if !status.is_success() {
            let sanitized_body = sanitize_response_for_logging(&body);
            tracing::error!(
                status = %status,
                body = %sanitized_body,
                "instance metadata service rejected the token request"
            );
            return Err(CredentialError::AuthenticationFailed {
                reason: format!("HTTP {status}"),
            });
        }

        let token: TokenResponse = serde_json::from_str(&body).map_err(|e| {
            CredentialError::NetworkFailed(format!("failed to parse metadata response: {e}"))
        })?;

        Ok(token.into_access_token())
    }

    fn strategy(&self) -> Strategy {
        Strategy::ManagedIdentity
    }
}

impl std::fmt::Debug for ManagedIdentityCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ManagedIdentityCredential")
            .field("endpoint", &self.endpoint.as_str())
            .finish()
    }
}
