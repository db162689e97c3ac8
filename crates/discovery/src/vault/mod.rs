//! Certificate-custody vault client
//!
//! Read-only REST client for the remote vault. Two operations are consumed:
//! fetch a specific certificate version, and fetch the current version.
//! Both are single-shot; retry policy, if any, belongs to the caller.

use std::sync::Arc;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as B64;
use serde::Deserialize;
use thiserror::Error;
use url::Url;

use crate::core::CredentialError;
use crate::credential::TokenCredential;
use crate::util::sanitize_response_for_logging;

/// Vault REST API version
const API_VERSION: &str = "7.4";

/// A certificate as returned by the vault
#[derive(Debug, Clone)]
pub struct VaultCertificate {
    /// Vault identifier of this certificate version
    pub id: String,
    /// Key-handle identifier for the associated private key, when one exists
    pub key_id: Option<String>,
    /// DER encoding of the public certificate
    pub der: Vec<u8>,
}

/// Vault retrieval failures
#[derive(Debug, Error)]
pub enum VaultError {
    /// The credential could not produce a token for the vault scope
    #[error("failed to authenticate against the vault: {source}")]
    Auth {
        /// Underlying credential error
        #[source]
        source: CredentialError,
    },

    /// The vault rejected the caller's permissions
    #[error("access to certificate '{certificate}' was denied")]
    PermissionDenied {
        /// Requested certificate name
        certificate: String,
    },

    /// The certificate (or requested version) does not exist
    #[error("certificate '{certificate}' was not found in the vault")]
    NotFound {
        /// Requested certificate name
        certificate: String,
    },

    /// Any other non-success response from the vault
    #[error("vault returned HTTP {status}: {detail}")]
    Service {
        /// HTTP status code
        status: u16,
        /// Sanitized response detail
        detail: String,
    },

    /// The request could not be sent or its response read
    #[error("vault request failed: {0}")]
    Transport(String),

    /// The response body did not match the expected shape
    #[error("malformed vault response: {0}")]
    MalformedBody(String),

    /// The returned certificate bytes could not be decoded or parsed
    #[error("invalid certificate material: {0}")]
    InvalidCertificate(String),
}

#[derive(Deserialize)]
struct CertificateResponse {
    id: String,
    #[serde(default)]
    kid: Option<String>,
    cer: String,
}

/// Client bound to one vault endpoint and one credential
pub struct CertificateClient {
    endpoint: Url,
    scope: String,
    credential: Arc<dyn TokenCredential>,
    http: reqwest::Client,
}

impl CertificateClient {
    /// Bind a client to `endpoint`, authenticating with `credential`
    pub fn new(endpoint: Url, credential: Arc<dyn TokenCredential>, http: reqwest::Client) -> Self {
        // Tokens are requested for the vault origin, not the full path
        let scope = format!("{}/.default", endpoint.origin().ascii_serialization());
        Self {
            endpoint,
            scope,
            credential,
            http,
        }
    }

    /// Fetch the current version of `name`
    pub async fn get_certificate(&self, name: &str) -> Result<VaultCertificate, VaultError> {
        self.fetch(name, None).await
    }

    /// Fetch the exact `version` of `name`
    pub async fn get_certificate_version(
        &self,
        name: &str,
        version: &str,
    ) -> Result<VaultCertificate, VaultError> {
        self.fetch(name, Some(version)).await
    }

    fn request_url(&self, name: &str, version: Option<&str>) -> Result<Url, VaultError> {
        let mut url = self.endpoint.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|()| VaultError::Transport("vault URL cannot be a base".into()))?;
            segments.pop_if_empty().push("certificates").push(name);
            if let Some(version) = version {
                segments.push(version);
            }
        }
        url.query_pairs_mut().append_pair("api-version", API_VERSION);
        Ok(url)
    }

    async fn fetch(&self, name: &str, version: Option<&str>) -> Result<VaultCertificate, VaultError> {
        let token = self
            .credential
            .token(&self.scope)
            .await
            .map_err(|source| VaultError::Auth { source })?;

        let url = self.request_url(name, version)?;
        let response = self
            .http
            .get(url)
            .bearer_auth(token.secret())
            .send()
            .await
            .map_err(|e| VaultError::Transport(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| VaultError::Transport(e.to_string()))?;

        if !status.is_success() {
            return Err(match status.as_u16() {
                401 | 403 => VaultError::PermissionDenied {
                    certificate: name.to_string(),
                },
                404 => VaultError::NotFound {
                    certificate: name.to_string(),
                },
                code => VaultError::Service {
                    status: code,
                    detail: sanitize_response_for_logging(&body),
                },
            });
        }

        let parsed: CertificateResponse = serde_json::from_str(&body)
            .map_err(|e| VaultError::MalformedBody(e.to_string()))?;
        let der = B64
            .decode(parsed.cer.as_bytes())
            .map_err(|e| VaultError::InvalidCertificate(format!("cer is not base64: {e}")))?;

        Ok(VaultCertificate {
            id: parsed.id,
            key_id: parsed.kid,
            der,
        })
    }
}

impl std::fmt::Debug for CertificateClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CertificateClient")
            .field("endpoint", &self.endpoint.as_str())
            .field("scope", &self.scope)
            .finish_non_exhaustive()
    }
}
