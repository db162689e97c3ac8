//! Shared token-endpoint plumbing for the OAuth2-style strategies

use std::time::Duration;

use serde::{Deserialize, Deserializer};
use url::Url;

use crate::core::{AccessToken, CredentialError};
use crate::util::sanitize_response_for_logging;

/// Token response from an authorization server
#[derive(Debug, Deserialize)]
pub(crate) struct TokenResponse {
    pub access_token: String,
    #[serde(default, deserialize_with = "number_or_string")]
    pub expires_in: Option<u64>,
    #[serde(default)]
    pub token_type: Option<String>,
}

impl TokenResponse {
    pub(crate) fn into_access_token(self) -> AccessToken {
        let token = AccessToken::bearer(self.access_token);
        match self.expires_in {
            Some(secs) => token.with_expires_in(Duration::from_secs(secs)),
            None => token,
        }
    }
}

/// Some issuers (notably instance-metadata endpoints) serialize `expires_in`
/// as a string; accept both shapes.
fn number_or_string<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(u64),
        Text(String),
    }

    match Option::<Raw>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Raw::Number(n)) => Ok(Some(n)),
        Some(Raw::Text(s)) => s.parse().map(Some).map_err(serde::de::Error::custom),
    }
}

/// POST a form to a token endpoint and parse the bearer token out of the
/// response, with sanitized body logging on failure
pub(crate) async fn post_token_request(
    http: &reqwest::Client,
    endpoint: &Url,
    form: &[(&str, &str)],
) -> Result<AccessToken, CredentialError> {
    let response = http
        .post(endpoint.clone())
        .form(form)
        .send()
        .await
        .map_err(|e| {
            tracing::error!(error = %e, endpoint = %endpoint, "failed to send token request");
            CredentialError::NetworkFailed(e.to_string())
        })?;

    let status = response.status();
    let body = response.text().await.map_err(|e| {
        tracing::error!(error = %e, "failed to read token response body");
        CredentialError::NetworkFailed(e.to_string())
    })?;

    if !status.is_success() {
        let sanitized_body = sanitize_response_for_logging(&body);
        tracing::error!(status = %status, body = %sanitized_body, "token request failed");
        return Err(CredentialError::AuthenticationFailed {
            reason: format!("HTTP {status}"),
        });
    }

    let token: TokenResponse = serde_json::from_str(&body).map_err(|e| {
        let sanitized_body = sanitize_response_for_logging(&body);
        tracing::error!(error = %e, body = %sanitized_body, "failed to parse token response");
        CredentialError::NetworkFailed(format!("failed to parse token response: {e}"))
    })?;

    Ok(token.into_access_token())
}
