//! Secure credential storage and management.
//!
//! One secret gates the whole system: the completion service token. It lives
//! in the platform secret store (via the `keyring` crate) under a fixed
//! service/account pair, or inline in the config file as a
//! [`CredentialRef::Plaintext`] for setups without a secret store.
//!
//! ## Usage
//!
//! ```no_run
//! use aura::credentials::{self, CredentialManager};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let manager = credentials::create_manager();
//! let cred_ref = manager.store(credentials::COMPLETION_API_KEY_ACCOUNT, "sk-...")?;
//! if let Some(value) = manager.retrieve(&cred_ref)? {
//!     println!("retrieved {} bytes", value.len());
//! }
//! # Ok(())
//! # }
//! ```

mod keyring_store;
mod types;

pub use keyring_store::KeyringCredentialManager;
pub use types::{CredentialError, CredentialRef};

use std::collections::HashMap;
use std::sync::Mutex;

/// Service name under which all aura credentials are stored.
pub const SERVICE_NAME: &str = "dev.aura.assistant";

/// Account identifier for the completion service token.
pub const COMPLETION_API_KEY_ACCOUNT: &str = "completion.api_key";

/// Manages secure storage and retrieval of credentials.
pub trait CredentialManager: Send + Sync {
    /// Store a credential and return a reference to it.
    ///
    /// # Errors
    ///
    /// Returns [`CredentialError::StoreAccess`] if the platform store fails.
    fn store(&self, account: &str, value: &str) -> Result<CredentialRef, CredentialError>;

    /// Retrieve a credential's value.
    ///
    /// `Plaintext` references resolve to their inline value; `None`
    /// references resolve to `Ok(None)`.
    ///
    /// # Errors
    ///
    /// Returns [`CredentialError::NotFound`] if a keyring reference points
    /// at a missing entry, or [`CredentialError::StoreAccess`] on platform
    /// failures.
    fn retrieve(&self, cred_ref: &CredentialRef) -> Result<Option<String>, CredentialError>;

    /// Delete a credential. Deleting a missing entry is not an error.
    ///
    /// # Errors
    ///
    /// Returns [`CredentialError::StoreAccess`] if the platform store fails.
    fn delete(&self, cred_ref: &CredentialRef) -> Result<(), CredentialError>;
}

/// Create the platform credential manager (keyring-backed).
#[must_use]
pub fn create_manager() -> Box<dyn CredentialManager> {
    Box::new(KeyringCredentialManager::new())
}

/// Resolve the completion service token.
///
/// The configured reference wins when set; otherwise the default keyring
/// slot ([`SERVICE_NAME`]/[`COMPLETION_API_KEY_ACCOUNT`]) is consulted.
/// Whitespace-only values count as absent. Both the submission gate and the
/// completion client go through this one lookup rule.
///
/// # Errors
///
/// Returns [`CredentialError::StoreAccess`] on platform store failures; a
/// missing entry is `Ok(None)`, not an error.
pub fn resolve_completion_key(
    manager: &dyn CredentialManager,
    configured: &CredentialRef,
) -> Result<Option<String>, CredentialError> {
    let lookup = if configured.is_set() {
        configured.clone()
    } else {
        CredentialRef::Keyring {
            service: SERVICE_NAME.to_owned(),
            account: COMPLETION_API_KEY_ACCOUNT.to_owned(),
        }
    };

    match manager.retrieve(&lookup) {
        Ok(value) => Ok(value.filter(|v| !v.trim().is_empty())),
        Err(CredentialError::NotFound) => Ok(None),
        Err(e) => Err(e),
    }
}

/// In-memory credential manager for tests and headless environments
/// without a platform secret store.
#[derive(Default)]
pub struct MemoryCredentialManager {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryCredentialManager {
    /// Create an empty in-memory manager.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl CredentialManager for MemoryCredentialManager {
    fn store(&self, account: &str, value: &str) -> Result<CredentialRef, CredentialError> {
        self.lock().insert(account.to_owned(), value.to_owned());
        Ok(CredentialRef::Keyring {
            service: SERVICE_NAME.to_owned(),
            account: account.to_owned(),
        })
    }

    fn retrieve(&self, cred_ref: &CredentialRef) -> Result<Option<String>, CredentialError> {
        match cred_ref {
            CredentialRef::None => Ok(None),
            CredentialRef::Plaintext(value) => Ok(Some(value.clone())),
            CredentialRef::Keyring { account, .. } => self
                .lock()
                .get(account)
                .cloned()
                .map_or(Err(CredentialError::NotFound), |v| Ok(Some(v))),
        }
    }

    fn delete(&self, cred_ref: &CredentialRef) -> Result<(), CredentialError> {
        if let CredentialRef::Keyring { account, .. } = cred_ref {
            self.lock().remove(account);
        }
        Ok(())
    }
}
