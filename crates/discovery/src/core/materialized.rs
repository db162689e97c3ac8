use std::sync::Arc;

use x509_cert::Certificate;

use crate::credential::TokenCredential;

/// The resolved signing identity
///
/// Produced only when discovery fully succeeds: the selected credential, the
/// parsed public certificate, and the vault's key-handle identifier. The key
/// handle is always present; a certificate without one never materializes
/// (see [`crate::core::DiscoveryError::MissingKeyHandle`]).
#[derive(Clone)]
pub struct MaterializedConfiguration {
    credential: Arc<dyn TokenCredential>,
    certificate: Certificate,
    certificate_der: Vec<u8>,
    key_id: String,
}

impl MaterializedConfiguration {
    pub(crate) fn new(
        credential: Arc<dyn TokenCredential>,
        certificate: Certificate,
        certificate_der: Vec<u8>,
        key_id: String,
    ) -> Self {
        Self {
            credential,
            certificate,
            certificate_der,
            key_id,
        }
    }

    /// The credential the downstream signer authenticates with
    pub fn credential(&self) -> &Arc<dyn TokenCredential> {
        &self.credential
    }

    /// The parsed public certificate
    pub fn certificate(&self) -> &Certificate {
        &self.certificate
    }

    /// The certificate's raw DER encoding
    pub fn certificate_der(&self) -> &[u8] {
        &self.certificate_der
    }

    /// Opaque reference to the remotely-held private key
    pub fn key_id(&self) -> &str {
        &self.key_id
    }
}

impl std::fmt::Debug for MaterializedConfiguration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MaterializedConfiguration")
            .field("strategy", &self.credential.strategy())
            .field("key_id", &self.key_id)
            .field("certificate_der_len", &self.certificate_der.len())
            .finish()
    }
}
