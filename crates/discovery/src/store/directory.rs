//! Directory-backed machine trust store
//!
//! Models the machine-wide store as a directory of `<stem>.crt` certificates
//! (PEM or DER) with an optional `<stem>.key` PEM private key alongside.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use x509_cert::Certificate;
use x509_cert::der::{Decode, DecodePem, Encode};

use crate::core::SecureString;
use crate::store::{StoreCertificate, StoreError, TrustStore, thumbprint};

/// Default machine-wide store location
pub const MACHINE_STORE_ROOT: &str = "/etc/signvault/certs";

/// Read-only trust store over a certificate directory
///
/// The handle is scoped: directory and file handles are held only for the
/// duration of a lookup and released on every exit path, including the
/// zero-match and error paths.
#[derive(Debug, Clone)]
pub struct DirectoryStore {
    root: PathBuf,
}

impl DirectoryStore {
    /// Open a store rooted at `root`
    pub fn open(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Open the machine-wide store at its default location
    pub fn open_machine() -> Self {
        Self::open(MACHINE_STORE_ROOT)
    }

    fn load_entry(&self, path: &Path) -> Result<StoreCertificate, StoreError> {
        let bytes = std::fs::read(path).map_err(|source| StoreError::Io {
            path: path.display().to_string(),
            source,
        })?;

        // PEM first, raw DER as a fallback
        let certificate = Certificate::from_pem(&bytes)
            .or_else(|_| Certificate::from_der(&bytes))
            .map_err(|e| StoreError::MalformedCertificate {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?;

        let der = certificate
            .to_der()
            .map_err(|e| StoreError::MalformedCertificate {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?;

        let key_pem = self.load_sibling_key(path)?;

        Ok(StoreCertificate {
            thumbprint: thumbprint(&der),
            der,
            key_pem,
        })
    }

    fn load_sibling_key(&self, cert_path: &Path) -> Result<Option<SecureString>, StoreError> {
        let key_path = cert_path.with_extension("key");
        match std::fs::read_to_string(&key_path) {
            Ok(pem) => Ok(Some(SecureString::new(pem))),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StoreError::Io {
                path: key_path.display().to_string(),
                source,
            }),
        }
    }
}

impl TrustStore for DirectoryStore {
    fn find_by_thumbprint(&self, thumbprint: &str) -> Result<Vec<StoreCertificate>, StoreError> {
        let entries = match std::fs::read_dir(&self.root) {
            Ok(entries) => entries,
            // A missing store directory means zero matches, not a failure
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => {
                return Err(StoreError::Io {
                    path: self.root.display().to_string(),
                    source,
                });
            }
        };

        let mut matches = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|source| StoreError::Io {
                path: self.root.display().to_string(),
                source,
            })?;
            let path = entry.path();
            if path.extension().is_none_or(|ext| ext != "crt") {
                continue;
            }

            let certificate = self.load_entry(&path)?;
            if certificate.thumbprint.eq_ignore_ascii_case(thumbprint) {
                tracing::trace!(
                    path = %path.display(),
                    thumbprint = %certificate.thumbprint,
                    "matched trust store certificate"
                );
                matches.push(certificate);
            }
        }

        Ok(matches)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIXTURE_CRT: &str =
        concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/signer.crt");
    const FIXTURE_KEY: &str =
        concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/signer.key");

    fn populated_store() -> (tempfile::TempDir, DirectoryStore, String) {
        let dir = tempfile::tempdir().unwrap();
        std::fs::copy(FIXTURE_CRT, dir.path().join("signer.crt")).unwrap();
        std::fs::copy(FIXTURE_KEY, dir.path().join("signer.key")).unwrap();

        // Derive the expected thumbprint from the fixture itself
        let pem = std::fs::read(FIXTURE_CRT).unwrap();
        let der = Certificate::from_pem(&pem).unwrap().to_der().unwrap();
        let print = thumbprint(&der);

        let store = DirectoryStore::open(dir.path());
        (dir, store, print)
    }

    #[test]
    fn finds_certificate_by_thumbprint() {
        let (_dir, store, print) = populated_store();
        let matches = store.find_by_thumbprint(&print).unwrap();
        assert_eq!(matches.len(), 1);
        assert!(matches[0].key_pem.is_some());
    }

    #[test]
    fn thumbprint_comparison_is_case_insensitive() {
        let (_dir, store, print) = populated_store();
        let matches = store.find_by_thumbprint(&print.to_uppercase()).unwrap();
        assert_eq!(matches.len(), 1);
    }

    #[test]
    fn unknown_thumbprint_yields_zero_matches() {
        let (_dir, store, _) = populated_store();
        let matches = store.find_by_thumbprint(&"0".repeat(64)).unwrap();
        assert!(matches.is_empty());
    }

    #[test]
    fn missing_store_directory_yields_zero_matches() {
        let store = DirectoryStore::open("/nonexistent/signvault/certs");
        assert!(store.find_by_thumbprint("ab12").unwrap().is_empty());
    }

    #[test]
    fn certificate_without_key_loads_with_no_key_material() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::copy(FIXTURE_CRT, dir.path().join("lonely.crt")).unwrap();

        let pem = std::fs::read(FIXTURE_CRT).unwrap();
        let der = Certificate::from_pem(&pem).unwrap().to_der().unwrap();

        let store = DirectoryStore::open(dir.path());
        let matches = store.find_by_thumbprint(&thumbprint(&der)).unwrap();
        assert_eq!(matches.len(), 1);
        assert!(matches[0].key_pem.is_none());
    }

    #[test]
    fn non_certificate_files_are_ignored() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("notes.txt"), "not a certificate").unwrap();

        let store = DirectoryStore::open(dir.path());
        assert!(store.find_by_thumbprint("ab12").unwrap().is_empty());
    }
}
