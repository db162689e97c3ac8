//! Discovery aggregator
//!
//! Sequences the credential selector and the certificate retriever: stop at
//! the first failure and propagate it unchanged, otherwise assemble the
//! [`MaterializedConfiguration`]. This step introduces no failure modes of
//! its own. Each invocation is independent; no credential is cached across
//! calls.

use std::sync::Arc;

use url::Url;
use x509_cert::Certificate;
use x509_cert::der::Decode;

use crate::core::{DiscoveryError, MaterializedConfiguration, SignConfigurationSet};
use crate::credential::{self, DEFAULT_IMDS_ENDPOINT};
use crate::store::{DirectoryStore, TrustStore};
use crate::vault::{CertificateClient, VaultError};

/// Resolves signing configurations into materialized signing identities
pub struct ConfigurationDiscoverer {
    http: reqwest::Client,
    store: Arc<dyn TrustStore>,
    imds_endpoint: Url,
}

impl ConfigurationDiscoverer {
    /// Start building a discoverer
    pub fn builder() -> ConfigurationDiscovererBuilder {
        ConfigurationDiscovererBuilder {
            store: None,
            imds_endpoint: None,
        }
    }

    /// Resolve `config` into a usable signing identity
    ///
    /// Selects exactly one credential strategy, fetches the configured
    /// certificate from the vault, and returns the certificate together with
    /// its key-handle identifier, or the first failure encountered.
    pub async fn materialize(
        &self,
        config: &SignConfigurationSet,
    ) -> Result<MaterializedConfiguration, DiscoveryError> {
        let credential =
            credential::select(config, self.store.as_ref(), &self.http, &self.imds_endpoint)?;

        let client = CertificateClient::new(
            config.vault_url.clone(),
            Arc::clone(&credential),
            self.http.clone(),
        );

        let name = config.certificate_name.as_str();
        let result = match config
            .certificate_version
            .as_deref()
            .filter(|v| !v.trim().is_empty())
        {
            Some(version) => {
                tracing::trace!(certificate = %name, %version, "retrieving specific certificate version");
                client.get_certificate_version(name, version).await
            }
            None => {
                tracing::trace!(certificate = %name, "retrieving current certificate version");
                client.get_certificate(name).await
            }
        };

        let vault_certificate = result.map_err(|source| {
            tracing::error!(
                certificate = %name,
                error = %source,
                "failed to retrieve certificate from the vault; verify the certificate name and the caller's permissions"
            );
            DiscoveryError::Retrieval {
                certificate: name.to_string(),
                source,
            }
        })?;

        tracing::trace!(id = %vault_certificate.id, "retrieved certificate");

        let parsed = Certificate::from_der(&vault_certificate.der).map_err(|e| {
            tracing::error!(certificate = %name, error = %e, "vault returned unparseable certificate bytes");
            DiscoveryError::Retrieval {
                certificate: name.to_string(),
                source: VaultError::InvalidCertificate(e.to_string()),
            }
        })?;

        // A certificate without a key handle was found but is unusable for
        // remote signing; a distinct, non-retryable configuration failure.
        let key_id = vault_certificate
            .key_id
            .filter(|kid| !kid.trim().is_empty())
            .ok_or_else(|| DiscoveryError::MissingKeyHandle {
                certificate: name.to_string(),
            })?;

        Ok(MaterializedConfiguration::new(
            credential,
            parsed,
            vault_certificate.der,
            key_id,
        ))
    }
}

impl std::fmt::Debug for ConfigurationDiscoverer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigurationDiscoverer")
            .field("imds_endpoint", &self.imds_endpoint.as_str())
            .finish_non_exhaustive()
    }
}

/// Builder for [`ConfigurationDiscoverer`]
#[derive(Default)]
pub struct ConfigurationDiscovererBuilder {
    store: Option<Arc<dyn TrustStore>>,
    imds_endpoint: Option<Url>,
}

impl ConfigurationDiscovererBuilder {
    /// Use a specific trust store instead of the machine-wide default
    pub fn trust_store(mut self, store: Arc<dyn TrustStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Override the instance-metadata endpoint (tests point this at a stub)
    pub fn imds_endpoint(mut self, endpoint: Url) -> Self {
        self.imds_endpoint = Some(endpoint);
        self
    }

    /// Assemble the discoverer
    pub fn build(self) -> ConfigurationDiscoverer {
        ConfigurationDiscoverer {
            http: reqwest::Client::new(),
            store: self
                .store
                .unwrap_or_else(|| Arc::new(DirectoryStore::open_machine())),
            imds_endpoint: self.imds_endpoint.unwrap_or_else(|| {
                // The constant is a valid URL; parsing cannot fail.
                Url::parse(DEFAULT_IMDS_ENDPOINT).unwrap_or_else(|_| unreachable!())
            }),
        }
    }
}

impl std::fmt::Debug for ConfigurationDiscovererBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigurationDiscovererBuilder")
            .field("has_store", &self.store.is_some())
            .field("imds_endpoint", &self.imds_endpoint.as_ref().map(Url::as_str))
            .finish()
    }
}
