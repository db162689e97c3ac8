//! Core types, errors, and primitives

mod config;
mod error;
mod materialized;
mod secure;
mod token;

pub use config::{SignConfigurationSet, SignConfigurationSetBuilder};
pub use error::{ConfigError, CredentialError, DiscoveryError};
pub use materialized::MaterializedConfiguration;
pub use secure::SecureString;
pub use token::AccessToken;
