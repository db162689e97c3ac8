//! Signvault discovery core
//!
//! Resolves a declarative signing configuration into a usable signing
//! identity: selects exactly one authentication strategy, uses it to fetch a
//! named certificate from a remote key-custody vault, and returns the public
//! certificate together with the vault's key-handle identifier, or a single
//! typed failure.
//!
//! The crate performs no signing itself. The [`MaterializedConfiguration`] it
//! produces is the input to a downstream signer that drives the remotely-held
//! private key through the vault.
//!
//! # Example
//!
//! ```rust,no_run
//! use signvault_discovery::{ConfigurationDiscoverer, SignConfigurationSet};
//! use url::Url;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = SignConfigurationSet::builder(
//!     Url::parse("https://vault.example.com")?,
//!     "release-signing",
//! )
//! .tenant_id("my-tenant")
//! .client_id("my-client")
//! .client_secret("s3cret")
//! .build()?;
//!
//! let discoverer = ConfigurationDiscoverer::builder().build();
//! let materialized = discoverer.materialize(&config).await?;
//! println!("key handle: {}", materialized.key_id());
//! # Ok(())
//! # }
//! ```

/// Configuration record, secure strings, errors, and output types
pub mod core;
/// Token-producing credential strategies and the selection chain
pub mod credential;
/// The discovery aggregator
pub mod discover;
/// Local trust-store lookup by thumbprint
pub mod store;
mod util;
/// Certificate-custody vault client
pub mod vault;

pub use crate::core::{
    AccessToken, CredentialError, DiscoveryError, MaterializedConfiguration, SecureString,
    SignConfigurationSet, SignConfigurationSetBuilder,
};
pub use crate::credential::{Strategy, TokenCredential};
pub use crate::discover::{ConfigurationDiscoverer, ConfigurationDiscovererBuilder};

/// Commonly used types and traits
pub mod prelude {
    pub use crate::core::{
        AccessToken, CredentialError, DiscoveryError, MaterializedConfiguration, SecureString,
        SignConfigurationSet,
    };
    pub use crate::credential::{Strategy, TokenCredential};
    pub use crate::discover::ConfigurationDiscoverer;
    pub use crate::store::{StoreCertificate, TrustStore};
    pub use crate::vault::{CertificateClient, VaultCertificate, VaultError};
    pub use async_trait::async_trait;
}
