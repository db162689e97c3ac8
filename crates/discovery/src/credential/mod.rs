//! Token-producing credential strategies
//!
//! Four strategies share one capability: produce a bearer token for a scope.
//! [`select`] picks exactly one via a strict, ordered precedence chain:
//! managed identity, then a pre-acquired access token, then a trust-store
//! certificate thumbprint, then the client secret. First match wins; later
//! conditions are never evaluated. The ordering is a deliberate precedence,
//! not a validation rule: configurations populating several pathways resolve
//! predictably instead of being rejected.

pub mod authority;
mod client_assertion;
mod client_secret;
mod common;
mod managed_identity;
mod static_token;

pub use client_assertion::ClientCertificateCredential;
pub use client_secret::ClientSecretCredential;
pub use managed_identity::{DEFAULT_IMDS_ENDPOINT, ManagedIdentityCredential};
pub use static_token::StaticTokenCredential;

use std::sync::Arc;

use async_trait::async_trait;
use url::Url;

use crate::core::{AccessToken, CredentialError, DiscoveryError, SignConfigurationSet};
use crate::store::TrustStore;
use crate::util::is_blank;

/// Which authentication strategy a credential implements
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Ambient platform identity, no explicit secret material
    ManagedIdentity,
    /// Pre-acquired bearer token wrapped as-is
    StaticToken,
    /// Certificate from the local trust store, client-assertion grant
    ClientCertificate,
    /// Client secret, client-credentials grant
    ClientSecret,
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::ManagedIdentity => "managed_identity",
            Self::StaticToken => "static_token",
            Self::ClientCertificate => "client_certificate",
            Self::ClientSecret => "client_secret",
        };
        f.write_str(name)
    }
}

/// Capability shared by every strategy: produce an auth token
///
/// Implementations are single-shot per call: no caching, no refresh. A
/// caller wanting either wraps the credential externally.
#[async_trait]
pub trait TokenCredential: Send + Sync + std::fmt::Debug {
    /// Produce a bearer token valid for `scope`
    async fn token(&self, scope: &str) -> Result<AccessToken, CredentialError>;

    /// The strategy behind this credential
    fn strategy(&self) -> Strategy;
}

/// Pure precedence decision, separated from credential construction so the
/// ordering is testable on its own
fn choose(config: &SignConfigurationSet) -> Strategy {
    if config.managed_identity {
        Strategy::ManagedIdentity
    } else if config
        .access_token
        .as_ref()
        .is_some_and(|token| !token.is_blank())
    {
        Strategy::StaticToken
    } else if !is_blank(config.certificate_thumbprint.as_deref()) {
        Strategy::ClientCertificate
    } else {
        Strategy::ClientSecret
    }
}

/// Count of simultaneously populated pathways, for the ambiguity diagnostic
fn populated_pathways(config: &SignConfigurationSet) -> usize {
    usize::from(config.managed_identity)
        + usize::from(
            config
                .access_token
                .as_ref()
                .is_some_and(|token| !token.is_blank()),
        )
        + usize::from(!is_blank(config.certificate_thumbprint.as_deref()))
        + usize::from(
            config
                .client_secret
                .as_ref()
                .is_some_and(|secret| !secret.is_blank()),
        )
}

/// Select exactly one authentication strategy and construct its credential
///
/// Strict first-match precedence over the configuration record. The trust
/// store is consulted only when the thumbprint pathway wins; its handle is
/// scoped to the lookup. A thumbprint with zero store matches fails with
/// [`DiscoveryError::ThumbprintNotFound`]; there is no fall-through to the
/// client-secret pathway.
pub fn select(
    config: &SignConfigurationSet,
    store: &dyn TrustStore,
    http: &reqwest::Client,
    imds_endpoint: &Url,
) -> Result<Arc<dyn TokenCredential>, DiscoveryError> {
    let strategy = choose(config);

    if populated_pathways(config) > 1 {
        tracing::warn!(
            winning = %strategy,
            "multiple authentication pathways are populated; precedence picked one"
        );
    }

    match strategy {
        Strategy::ManagedIdentity => {
            tracing::debug!("selected ambient managed identity");
            Ok(Arc::new(ManagedIdentityCredential::new(
                http.clone(),
                imds_endpoint.clone(),
            )))
        }
        Strategy::StaticToken => {
            tracing::debug!("selected pre-acquired access token");
            let token = config
                .access_token
                .as_ref()
                .ok_or_else(|| CredentialError::invalid_input("access_token", "absent"))?;
            Ok(Arc::new(StaticTokenCredential::new(token.clone())))
        }
        Strategy::ClientCertificate => {
            let thumbprint = config
                .certificate_thumbprint
                .as_deref()
                .ok_or_else(|| CredentialError::invalid_input("certificate_thumbprint", "absent"))?;
            tracing::debug!(%thumbprint, "selected trust store certificate");

            let matches = store
                .find_by_thumbprint(thumbprint)
                .map_err(CredentialError::from)?;
            let Some(certificate) = matches.into_iter().next() else {
                return Err(DiscoveryError::ThumbprintNotFound {
                    thumbprint: thumbprint.to_string(),
                });
            };

            let credential = ClientCertificateCredential::new(
                http.clone(),
                &config.tenant_id,
                &config.client_id,
                certificate,
            )?;
            Ok(Arc::new(credential))
        }
        Strategy::ClientSecret => {
            tracing::debug!("selected client secret");
            Ok(Arc::new(build_client_secret(config, http)?))
        }
    }
}

fn build_client_secret(
    config: &SignConfigurationSet,
    http: &reqwest::Client,
) -> Result<ClientSecretCredential, CredentialError> {
    let secret = config
        .client_secret
        .as_ref()
        .filter(|secret| !secret.is_blank())
        .ok_or_else(|| CredentialError::invalid_input("client_secret", "blank"))?;

    let authority = match config.authority.as_deref().filter(|a| !a.trim().is_empty()) {
        Some(identifier) => authority::resolve(identifier)?,
        None => authority::default(),
    };

    ClientSecretCredential::new(
        http.clone(),
        &config.tenant_id,
        &config.client_id,
        secret.clone(),
        authority,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{StaticTrustStore, StoreCertificate};
    use rstest::rstest;

    fn base_config() -> crate::core::SignConfigurationSetBuilder {
        SignConfigurationSet::builder(
            Url::parse("https://vault.example.com").unwrap(),
            "mycert",
        )
        .tenant_id("tenant")
        .client_id("client")
    }

    fn imds() -> Url {
        Url::parse(DEFAULT_IMDS_ENDPOINT).unwrap()
    }

    fn select_with_empty_store(
        config: &SignConfigurationSet,
    ) -> Result<Arc<dyn TokenCredential>, DiscoveryError> {
        let store = StaticTrustStore::new();
        select(config, &store, &reqwest::Client::new(), &imds())
    }

    #[test]
    fn managed_identity_wins_over_everything() {
        let config = base_config()
            .managed_identity(true)
            .access_token("token")
            .certificate_thumbprint("ab12")
            .client_secret("secret")
            .build()
            .unwrap();

        let credential = select_with_empty_store(&config).unwrap();
        assert_eq!(credential.strategy(), Strategy::ManagedIdentity);
    }

    #[test]
    fn access_token_wins_over_thumbprint_and_secret() {
        let config = base_config()
            .access_token("token")
            .certificate_thumbprint("ab12")
            .client_secret("secret")
            .build()
            .unwrap();

        let credential = select_with_empty_store(&config).unwrap();
        assert_eq!(credential.strategy(), Strategy::StaticToken);
    }

    #[rstest]
    #[case("")]
    #[case("   ")]
    fn blank_access_token_falls_through(#[case] token: &str) {
        let config = base_config()
            .access_token(token)
            .client_secret("secret")
            .build()
            .unwrap();

        let credential = select_with_empty_store(&config).unwrap();
        assert_eq!(credential.strategy(), Strategy::ClientSecret);
    }

    #[test]
    fn unmatched_thumbprint_fails_without_fallback() {
        // A client secret is also configured; the thumbprint pathway still
        // terminates the selection.
        let config = base_config()
            .certificate_thumbprint("ab12cd34")
            .client_secret("secret")
            .build()
            .unwrap();

        let err = select_with_empty_store(&config).unwrap_err();
        match err {
            DiscoveryError::ThumbprintNotFound { thumbprint } => {
                assert_eq!(thumbprint, "ab12cd34");
            }
            other => panic!("expected ThumbprintNotFound, got {other:?}"),
        }
    }

    #[test]
    fn matched_thumbprint_builds_certificate_credential() {
        let fixture = std::fs::read_to_string(concat!(
            env!("CARGO_MANIFEST_DIR"),
            "/tests/fixtures/signer.key"
        ))
        .unwrap();
        let store = StaticTrustStore::new().with_certificate(StoreCertificate {
            der: vec![0x30, 0x03, 0x02, 0x01, 0x01],
            thumbprint: "ab12".into(),
            key_pem: Some(crate::core::SecureString::new(fixture)),
        });

        let config = base_config()
            .certificate_thumbprint("AB12")
            .build()
            .unwrap();

        let credential = select(&config, &store, &reqwest::Client::new(), &imds()).unwrap();
        assert_eq!(credential.strategy(), Strategy::ClientCertificate);
    }

    #[test]
    fn default_is_client_secret() {
        let config = base_config().client_secret("secret").build().unwrap();
        let credential = select_with_empty_store(&config).unwrap();
        assert_eq!(credential.strategy(), Strategy::ClientSecret);
    }

    #[test]
    fn missing_client_secret_is_a_configuration_error() {
        let config = base_config().build().unwrap();
        let err = select_with_empty_store(&config).unwrap_err();
        assert!(matches!(err, DiscoveryError::Credential { .. }));
    }

    #[test]
    fn custom_authority_attaches_to_client_secret_credential() {
        let config = base_config()
            .client_secret("secret")
            .authority("china")
            .build()
            .unwrap();

        let credential = build_client_secret(&config, &reqwest::Client::new()).unwrap();
        assert_eq!(
            credential.authority().as_str(),
            authority::resolve("china").unwrap().as_str()
        );
    }

    #[test]
    fn no_authority_uses_platform_default() {
        let config = base_config().client_secret("secret").build().unwrap();
        let credential = build_client_secret(&config, &reqwest::Client::new()).unwrap();
        assert_eq!(credential.authority().as_str(), authority::default().as_str());
    }

    #[test]
    fn unknown_authority_is_a_configuration_error() {
        let config = base_config()
            .client_secret("secret")
            .authority("not-a-cloud")
            .build()
            .unwrap();

        let err = build_client_secret(&config, &reqwest::Client::new()).unwrap_err();
        assert!(matches!(err, CredentialError::InvalidInput { .. }));
    }

    #[test]
    fn pathway_count_drives_the_ambiguity_diagnostic() {
        // The warning fires exactly when more than one pathway is populated;
        // blank values do not count as populated.
        let none = base_config().build().unwrap();
        assert_eq!(populated_pathways(&none), 0);

        let single = base_config().client_secret("secret").build().unwrap();
        assert_eq!(populated_pathways(&single), 1);

        let blank_token = base_config()
            .access_token("   ")
            .client_secret("secret")
            .build()
            .unwrap();
        assert_eq!(populated_pathways(&blank_token), 1);

        let all = base_config()
            .managed_identity(true)
            .access_token("token")
            .certificate_thumbprint("ab12")
            .client_secret("secret")
            .build()
            .unwrap();
        assert_eq!(populated_pathways(&all), 4);
    }

    #[rstest]
    #[case(true, false, false, false, Strategy::ManagedIdentity)]
    #[case(false, true, false, false, Strategy::StaticToken)]
    #[case(false, false, true, false, Strategy::ClientCertificate)]
    #[case(false, false, false, true, Strategy::ClientSecret)]
    #[case(false, false, false, false, Strategy::ClientSecret)]
    fn precedence_table(
        #[case] managed: bool,
        #[case] token: bool,
        #[case] thumbprint: bool,
        #[case] secret: bool,
        #[case] expected: Strategy,
    ) {
        let mut builder = base_config().managed_identity(managed);
        if token {
            builder = builder.access_token("token");
        }
        if thumbprint {
            builder = builder.certificate_thumbprint("ab12");
        }
        if secret {
            builder = builder.client_secret("secret");
        }

        assert_eq!(choose(&builder.build().unwrap()), expected);
    }
}
