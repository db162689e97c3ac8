//! Certificate-based client credential (client-assertion grant)
//!
//! Authenticates with a certificate taken from the local trust store: a
//! short-lived RS256 assertion is signed with the store-held private key and
//! exchanged for a bearer token. The assertion header carries the
//! certificate chain (`x5c`) and its SHA-256 thumbprint (`x5t#S256`) so the
//! authority can match the registered certificate.

use std::time::{SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::{STANDARD as B64, URL_SAFE_NO_PAD as B64_URL};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde::Serialize;
use sha2::{Digest, Sha256};
use url::Url;

use crate::core::{AccessToken, CredentialError};
use crate::credential::common::post_token_request;
use crate::credential::{ClientSecretCredential, Strategy, TokenCredential, authority};
use crate::store::StoreCertificate;

const ASSERTION_TYPE: &str = "urn:ietf:params:oauth:client-assertion-type:jwt-bearer";
const ASSERTION_LIFETIME_SECS: u64 = 600;

#[derive(Serialize)]
struct AssertionClaims<'a> {
    aud: &'a str,
    iss: &'a str,
    sub: &'a str,
    jti: String,
    iat: u64,
    nbf: u64,
    exp: u64,
}

/// Certificate-based client credential
pub struct ClientCertificateCredential {
    http: reqwest::Client,
    tenant_id: String,
    client_id: String,
    certificate: StoreCertificate,
    authority: Url,
}

impl ClientCertificateCredential {
    /// Construct the credential from a trust-store certificate
    ///
    /// The store entry must carry private-key material; a certificate alone
    /// cannot sign the client assertion.
    pub fn new(
        http: reqwest::Client,
        tenant_id: &str,
        client_id: &str,
        certificate: StoreCertificate,
    ) -> Result<Self, CredentialError> {
        if tenant_id.trim().is_empty() {
            return Err(CredentialError::invalid_input("tenant_id", "blank"));
        }
        if client_id.trim().is_empty() {
            return Err(CredentialError::invalid_input("client_id", "blank"));
        }
        if certificate.key_pem.is_none() {
            return Err(CredentialError::invalid_input(
                "certificate_thumbprint",
                format!(
                    "trust store entry '{}' has no private key material",
                    certificate.thumbprint
                ),
            ));
        }

        Ok(Self {
            http,
            tenant_id: tenant_id.to_string(),
            client_id: client_id.to_string(),
            certificate,
            authority: authority::default(),
        })
    }

    /// Authenticate against a non-default authority host
    pub fn with_authority(mut self, authority: Url) -> Self {
        self.authority = authority;
        self
    }

    fn build_assertion(&self, audience: &str) -> Result<String, CredentialError> {
        let key_pem = self
            .certificate
            .key_pem
            .as_ref()
            .ok_or_else(|| CredentialError::Assertion("missing private key".into()))?;
        let key = EncodingKey::from_rsa_pem(key_pem.expose().as_bytes())
            .map_err(|e| CredentialError::Assertion(format!("unusable private key: {e}")))?;

        let mut header = Header::new(Algorithm::RS256);
        header.x5c = Some(vec![B64.encode(&self.certificate.der)]);
        header.x5t_s256 = Some(B64_URL.encode(Sha256::digest(&self.certificate.der)));

        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|e| CredentialError::Assertion(e.to_string()))?
            .as_secs();
        let claims = AssertionClaims {
            aud: audience,
            iss: &self.client_id,
            sub: &self.client_id,
            jti: uuid::Uuid::new_v4().to_string(),
            iat: now,
            nbf: now,
            exp: now + ASSERTION_LIFETIME_SECS,
        };

        jsonwebtoken::encode(&header, &claims, &key)
            .map_err(|e| CredentialError::Assertion(e.to_string()))
    }
}

#[async_trait]
impl TokenCredential for ClientCertificateCredential {
    async fn token(&self, scope: &str) -> Result<AccessToken, CredentialError> {
        let endpoint = ClientSecretCredential::token_endpoint(&self.authority, &self.tenant_id)?;
        let assertion = self.build_assertion(endpoint.as_str())?;

        tracing::debug!(
            client_id = %self.client_id,
            thumbprint = %self.certificate.thumbprint,
            endpoint = %endpoint,
            %scope,
            "requesting token with client assertion"
        );

        post_token_request(
            &self.http,
            &endpoint,
            &[
                ("grant_type", "client_credentials"),
                ("client_id", &self.client_id),
                ("scope", scope),
                ("client_assertion_type", ASSERTION_TYPE),
                ("client_assertion", &assertion),
            ],
        )
        .await
    }

    fn strategy(&self) -> Strategy {
        Strategy::ClientCertificate
    }
}

impl std::fmt::Debug for ClientCertificateCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientCertificateCredential")
            .field("tenant_id", &self.tenant_id)
            .field("client_id", &self.client_id)
            .field("thumbprint", &self.certificate.thumbprint)
            .finish_non_exhaustive()
    }
}
