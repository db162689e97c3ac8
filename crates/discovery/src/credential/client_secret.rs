//! Client-secret credential (OAuth2 client-credentials grant)

use async_trait::async_trait;
use url::Url;

use crate::core::{AccessToken, CredentialError, SecureString};
use crate::credential::common::post_token_request;
use crate::credential::{Strategy, TokenCredential};

/// Client-secret credential, the default strategy
///
/// Exchanges a tenant-scoped client id + secret for a bearer token at the
/// authority's token endpoint.
pub struct ClientSecretCredential {
    http: reqwest::Client,
    tenant_id: String,
    client_id: String,
    secret: SecureString,
    authority: Url,
}

impl ClientSecretCredential {
    /// Construct the credential, validating the identity fields
    pub fn new(
        http: reqwest::Client,
        tenant_id: &str,
        client_id: &str,
        secret: SecureString,
        authority: Url,
    ) -> Result<Self, CredentialError> {
        if tenant_id.trim().is_empty() {
            return Err(CredentialError::invalid_input("tenant_id", "blank"));
        }
        if client_id.trim().is_empty() {
            return Err(CredentialError::invalid_input("client_id", "blank"));
        }

        Ok(Self {
            http,
            tenant_id: tenant_id.to_string(),
            client_id: client_id.to_string(),
            secret,
            authority,
        })
    }

    /// The authority host this credential authenticates against
    pub fn authority(&self) -> &Url {
        &self.authority
    }

    pub(crate) fn token_endpoint(
        authority: &Url,
        tenant_id: &str,
    ) -> Result<Url, CredentialError> {
        authority
            .join(&format!("{tenant_id}/oauth2/v2.0/token"))
            .map_err(|e| CredentialError::invalid_input("authority", e.to_string()))
    }
}

#[async_trait]
impl TokenCredential for ClientSecretCredential {
    async fn token(&self, scope: &str) -> Result<AccessToken, CredentialError> {
        let endpoint = Self::token_endpoint(&self.authority, &self.tenant_id)?;
        tracing::debug!(
            client_id = %self.client_id,
            endpoint = %endpoint,
            %scope,
            "requesting token with client secret"
        );

        post_token_request(
            &self.http,
            &endpoint,
            &[
                ("grant_type", "client_credentials"),
                ("client_id", &self.client_id),
                ("client_secret", self.secret.expose()),
                ("scope", scope),
            ],
        )
        .await
    }

    fn strategy(&self) -> Strategy {
        Strategy::ClientSecret
    }
}

impl std::fmt::Debug for ClientSecretCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientSecretCredential")
            .field("tenant_id", &self.tenant_id)
            .field("client_id", &self.client_id)
            .field("authority", &self.authority.as_str())
            .finish_non_exhaustive()
    }
}
