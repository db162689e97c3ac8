use serde::{Deserialize, Serialize};
use url::Url;

use crate::core::error::ConfigError;
use crate::core::secure::SecureString;

/// Declarative signing configuration
///
/// Immutable input record for discovery. Several authentication pathways can
/// be populated at once; the record does not enforce mutual exclusivity.
/// A fixed precedence order resolves the ambiguity at selection time
/// (managed identity, then static access token, then thumbprint, then client
/// secret); see [`crate::credential::select`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignConfigurationSet {
    /// Vault endpoint, e.g. `https://vault.example.com`
    pub vault_url: Url,

    /// Name of the certificate to materialize
    pub certificate_name: String,

    /// Specific certificate version; the latest version when absent
    pub certificate_version: Option<String>,

    /// Directory tenant the client application lives in
    pub tenant_id: String,

    /// Client (application) identifier
    pub client_id: String,

    /// Client secret for the default strategy
    pub client_secret: Option<SecureString>,

    /// Authority host identifier (known alias or a verbatim `https://` URL);
    /// the platform default authority when absent
    pub authority: Option<String>,

    /// Pre-acquired access token; the caller asserts it is valid and
    /// unexpired, no refresh is attempted
    pub access_token: Option<SecureString>,

    /// Hex SHA-256 thumbprint of a certificate in the machine trust store
    pub certificate_thumbprint: Option<String>,

    /// Use the ambient platform identity; takes precedence over every other
    /// pathway
    pub managed_identity: bool,
}

impl SignConfigurationSet {
    /// Start building a configuration for `certificate_name` held by the
    /// vault at `vault_url`
    pub fn builder(
        vault_url: Url,
        certificate_name: impl Into<String>,
    ) -> SignConfigurationSetBuilder {
        SignConfigurationSetBuilder {
            vault_url,
            certificate_name: certificate_name.into(),
            certificate_version: None,
            tenant_id: String::new(),
            client_id: String::new(),
            client_secret: None,
            authority: None,
            access_token: None,
            certificate_thumbprint: None,
            managed_identity: false,
        }
    }
}

/// Builder for [`SignConfigurationSet`]
#[derive(Debug)]
pub struct SignConfigurationSetBuilder {
    vault_url: Url,
    certificate_name: String,
    certificate_version: Option<String>,
    tenant_id: String,
    client_id: String,
    client_secret: Option<SecureString>,
    authority: Option<String>,
    access_token: Option<SecureString>,
    certificate_thumbprint: Option<String>,
    managed_identity: bool,
}

impl SignConfigurationSetBuilder {
    /// Pin a specific certificate version
    pub fn certificate_version(mut self, version: impl Into<String>) -> Self {
        self.certificate_version = Some(version.into());
        self
    }

    /// Directory tenant identifier
    pub fn tenant_id(mut self, tenant_id: impl Into<String>) -> Self {
        self.tenant_id = tenant_id.into();
        self
    }

    /// Client (application) identifier
    pub fn client_id(mut self, client_id: impl Into<String>) -> Self {
        self.client_id = client_id.into();
        self
    }

    /// Client secret for the default strategy
    pub fn client_secret(mut self, secret: impl Into<SecureString>) -> Self {
        self.client_secret = Some(secret.into());
        self
    }

    /// Authority host identifier
    pub fn authority(mut self, authority: impl Into<String>) -> Self {
        self.authority = Some(authority.into());
        self
    }

    /// Pre-acquired access token
    pub fn access_token(mut self, token: impl Into<SecureString>) -> Self {
        self.access_token = Some(token.into());
        self
    }

    /// Local trust-store certificate thumbprint (hex SHA-256)
    pub fn certificate_thumbprint(mut self, thumbprint: impl Into<String>) -> Self {
        self.certificate_thumbprint = Some(thumbprint.into());
        self
    }

    /// Use the ambient platform identity
    pub fn managed_identity(mut self, enabled: bool) -> Self {
        self.managed_identity = enabled;
        self
    }

    /// Validate the always-required fields and produce the record
    ///
    /// Only presence and shape of the vault URL and certificate name are
    /// checked here. Strategy fields are deliberately not cross-validated;
    /// precedence resolves them at selection time.
    pub fn build(self) -> Result<SignConfigurationSet, ConfigError> {
        if self.certificate_name.trim().is_empty() {
            return Err(ConfigError::MissingRequired {
                field: "certificate_name".into(),
            });
        }

        if !matches!(self.vault_url.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidValue {
                field: "vault_url".into(),
                reason: "must be an absolute http(s) URL".into(),
            });
        }

        Ok(SignConfigurationSet {
            vault_url: self.vault_url,
            certificate_name: self.certificate_name,
            certificate_version: self.certificate_version,
            tenant_id: self.tenant_id,
            client_id: self.client_id,
            client_secret: self.client_secret,
            authority: self.authority,
            access_token: self.access_token,
            certificate_thumbprint: self.certificate_thumbprint,
            managed_identity: self.managed_identity,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vault_url() -> Url {
        Url::parse("https://vault.example.com").unwrap()
    }

    #[test]
    fn minimal_configuration_builds() {
        let config = SignConfigurationSet::builder(vault_url(), "mycert")
            .build()
            .unwrap();
        assert_eq!(config.certificate_name, "mycert");
        assert!(config.certificate_version.is_none());
        assert!(!config.managed_identity);
    }

    #[test]
    fn blank_certificate_name_is_rejected() {
        let result = SignConfigurationSet::builder(vault_url(), "  ").build();
        assert!(matches!(
            result,
            Err(ConfigError::MissingRequired { field }) if field == "certificate_name"
        ));
    }

    #[test]
    fn non_http_vault_url_is_rejected() {
        let ftp = Url::parse("ftp://vault.example.com").unwrap();
        let result = SignConfigurationSet::builder(ftp, "mycert").build();
        assert!(matches!(
            result,
            Err(ConfigError::InvalidValue { field, .. }) if field == "vault_url"
        ));
    }

    #[test]
    fn strategy_fields_are_not_cross_validated() {
        // Populating every pathway at once is allowed; precedence resolves it.
        let config = SignConfigurationSet::builder(vault_url(), "mycert")
            .managed_identity(true)
            .access_token("token")
            .certificate_thumbprint("ab12")
            .client_secret("secret")
            .build()
            .unwrap();
        assert!(config.managed_identity);
        assert!(config.access_token.is_some());
        assert!(config.certificate_thumbprint.is_some());
    }

    #[test]
    fn serde_round_trip_preserves_fields() {
        let config = SignConfigurationSet::builder(vault_url(), "mycert")
            .certificate_version("abc123")
            .tenant_id("tenant")
            .client_id("client")
            .client_secret("secret")
            .build()
            .unwrap();

        let json = serde_json::to_string(&config).unwrap();
        assert!(!json.contains("\"secret\""));
        let back: SignConfigurationSet = serde_json::from_str(&json).unwrap();
        assert_eq!(back.certificate_version.as_deref(), Some("abc123"));
        assert_eq!(back.client_secret.unwrap().expose(), "secret");
    }
}
