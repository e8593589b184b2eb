//! Keyring-backed credential storage.
//!
//! Uses the `keyring` crate, which maps to the macOS Keychain, the Windows
//! Credential Manager, or the Secret Service API on Linux.

use super::{CredentialError, CredentialManager, CredentialRef, SERVICE_NAME};

/// Credential manager backed by the platform secret store.
pub struct KeyringCredentialManager;

impl KeyringCredentialManager {
    /// Create a new keyring credential manager.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    fn entry(service: &str, account: &str) -> Result<keyring::Entry, CredentialError> {
        keyring::Entry::new(service, account)
            .map_err(|e| CredentialError::StoreAccess(format!("failed to open entry: {e}")))
    }
}

impl Default for KeyringCredentialManager {
    fn default() -> Self {
        Self::new()
    }
}

impl CredentialManager for KeyringCredentialManager {
    fn store(&self, account: &str, value: &str) -> Result<CredentialRef, CredentialError> {
        Self::entry(SERVICE_NAME, account)?
            .set_password(value)
            .map_err(|e| CredentialError::StoreAccess(format!("failed to store credential: {e}")))?;

        Ok(CredentialRef::Keyring {
            service: SERVICE_NAME.to_owned(),
            account: account.to_owned(),
        })
    }

    fn retrieve(&self, cred_ref: &CredentialRef) -> Result<Option<String>, CredentialError> {
        match cred_ref {
            CredentialRef::None => Ok(None),
            CredentialRef::Plaintext(value) => Ok(Some(value.clone())),
            CredentialRef::Keyring { service, account } => {
                match Self::entry(service, account)?.get_password() {
                    Ok(value) => Ok(Some(value)),
                    Err(keyring::Error::NoEntry) => Err(CredentialError::NotFound),
                    Err(e) => Err(CredentialError::StoreAccess(format!(
                        "failed to retrieve credential: {e}"
                    ))),
                }
            }
        }
    }

    fn delete(&self, cred_ref: &CredentialRef) -> Result<(), CredentialError> {
        match cred_ref {
            // Nothing stored in the keyring for these.
            CredentialRef::None | CredentialRef::Plaintext(_) => Ok(()),
            CredentialRef::Keyring { service, account } => {
                match Self::entry(service, account)?.delete_credential() {
                    // Idempotent: already deleted.
                    Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
                    Err(e) => Err(CredentialError::StoreAccess(format!(
                        "failed to delete credential: {e}"
                    ))),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

    use super::*;

    const TEST_ACCOUNT: &str = "aura.test.credential";

    #[test]
    #[ignore] // Requires a platform secret store, run manually
    fn store_retrieve_delete_round_trip() {
        let manager = KeyringCredentialManager::new();
        let cred_ref = manager.store(TEST_ACCOUNT, "test-secret-value").unwrap();

        assert_eq!(
            manager.retrieve(&cred_ref).unwrap(),
            Some("test-secret-value".to_owned())
        );

        manager.delete(&cred_ref).unwrap();
        assert!(matches!(
            manager.retrieve(&cred_ref),
            Err(CredentialError::NotFound)
        ));
    }

    #[test]
    fn retrieve_none_is_none() {
        let manager = KeyringCredentialManager::new();
        assert_eq!(manager.retrieve(&CredentialRef::None).unwrap(), None);
    }

    #[test]
    fn retrieve_plaintext_passes_through() {
        let manager = KeyringCredentialManager::new();
        let result = manager
            .retrieve(&CredentialRef::Plaintext("inline".into()))
            .unwrap();
        assert_eq!(result, Some("inline".to_owned()));
    }

    #[test]
    fn delete_plaintext_is_noop() {
        let manager = KeyringCredentialManager::new();
        manager
            .delete(&CredentialRef::Plaintext("inline".into()))
            .unwrap();
    }
}
