//! Error types for discovery operations
//!
//! Three layers:
//! - [`DiscoveryError`]: the single failure type crossing the crate boundary
//! - [`CredentialError`]: failures while constructing or exercising a
//!   credential strategy
//! - [`ConfigError`]: configuration-record validation failures
//!
//! Vault-side failures ([`crate::vault::VaultError`]) and trust-store
//! failures ([`crate::store::StoreError`]) are wrapped, never surfaced bare.

use thiserror::Error;

use crate::store::StoreError;
use crate::vault::VaultError;

/// Terminal failure of a discovery invocation
///
/// Every variant is terminal: nothing is retried internally and no fallback
/// between authentication strategies is attempted once one is selected.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    /// The thumbprint strategy was selected but the local trust store holds
    /// no matching certificate
    #[error("certificate with thumbprint '{thumbprint}' not found in the machine trust store")]
    ThumbprintNotFound {
        /// The thumbprint that was looked up
        thumbprint: String,
    },

    /// The certificate was retrieved but carries no key-handle identifier,
    /// so it cannot drive a remote signing operation
    #[error("certificate '{certificate}' has no associated private key in the vault")]
    MissingKeyHandle {
        /// Name of the certificate that was retrieved
        certificate: String,
    },

    /// The remote vault call failed (network, auth, not-found, permission)
    #[error("failed to retrieve certificate '{certificate}' from the vault: {source}")]
    Retrieval {
        /// Name of the certificate that was requested
        certificate: String,
        /// Underlying vault error
        #[source]
        source: VaultError,
    },

    /// A credential strategy could not be constructed from the configuration
    #[error("credential selection failed: {source}")]
    Credential {
        /// Underlying credential error
        #[source]
        source: CredentialError,
    },
}

impl From<CredentialError> for DiscoveryError {
    fn from(source: CredentialError) -> Self {
        Self::Credential { source }
    }
}

/// Failures while constructing or exercising a credential strategy
#[derive(Debug, Error)]
pub enum CredentialError {
    /// A required configuration field is missing or malformed
    #[error("invalid credential input '{field}': {reason}")]
    InvalidInput {
        /// Field name
        field: String,
        /// Why the value was rejected
        reason: String,
    },

    /// The identity provider rejected the authentication attempt
    #[error("authentication failed: {reason}")]
    AuthenticationFailed {
        /// Provider-side rejection detail
        reason: String,
    },

    /// The token request could not be sent or its response read
    #[error("token request failed: {0}")]
    NetworkFailed(String),

    /// The client-assertion token could not be built or signed
    #[error("failed to build client assertion: {0}")]
    Assertion(String),

    /// The local trust store could not be read
    #[error("trust store lookup failed: {source}")]
    Store {
        /// Underlying store error
        #[source]
        source: StoreError,
    },
}

impl CredentialError {
    /// Shorthand for [`CredentialError::InvalidInput`]
    pub fn invalid_input(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

impl From<StoreError> for CredentialError {
    fn from(source: StoreError) -> Self {
        Self::Store { source }
    }
}

/// Configuration-record validation errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required field is absent
    #[error("missing required field: {field}")]
    MissingRequired {
        /// Field name
        field: String,
    },

    /// A field is present but unusable
    #[error("invalid value for '{field}': {reason}")]
    InvalidValue {
        /// Field name
        field: String,
        /// Why the value was rejected
        reason: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn thumbprint_not_found_carries_thumbprint() {
        let err = DiscoveryError::ThumbprintNotFound {
            thumbprint: "ab12".into(),
        };
        assert!(err.to_string().contains("ab12"));
    }

    #[test]
    fn missing_key_handle_names_certificate() {
        let err = DiscoveryError::MissingKeyHandle {
            certificate: "release-signing".into(),
        };
        assert!(err.to_string().contains("release-signing"));
        assert!(err.to_string().contains("no associated private key"));
    }

    #[test]
    fn retrieval_chains_source() {
        let err = DiscoveryError::Retrieval {
            certificate: "mycert".into(),
            source: VaultError::NotFound {
                certificate: "mycert".into(),
            },
        };
        assert!(err.source().is_some());
        assert!(err.to_string().contains("mycert"));
    }

    #[test]
    fn credential_error_converts() {
        let err: DiscoveryError = CredentialError::invalid_input("tenant_id", "blank").into();
        assert!(matches!(err, DiscoveryError::Credential { .. }));
        assert!(err.to_string().contains("tenant_id"));
    }

    #[test]
    fn store_error_converts_to_credential_error() {
        let err: CredentialError = StoreError::Io {
            path: "/nonexistent".into(),
            source: std::io::Error::other("denied"),
        }
        .into();
        assert!(matches!(err, CredentialError::Store { .. }));
    }
}
