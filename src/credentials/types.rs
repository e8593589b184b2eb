//! Core types for credential management.

use serde::de::{self, Deserializer, MapAccess, Visitor};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};

/// Reference to a stored credential.
///
/// - `Keyring`: stored in the platform secret store under a service/account
///   pair.
/// - `Plaintext`: inline value in the config file. Supported so a config can
///   carry a token directly, but the keyring is preferred.
/// - `None`: no credential configured.
///
/// # Serialization
///
/// `Plaintext("value")` serializes as a bare string, `None` as `""`
/// (TOML-safe), and `Keyring { service, account }` as a two-key map. A bare
/// string deserializes back to `Plaintext` (non-empty) or `None` (empty).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CredentialRef {
    /// Credential stored in the platform secret store.
    Keyring {
        /// Service name, e.g. `dev.aura.assistant`.
        service: String,
        /// Account identifier, e.g. `completion.api_key`.
        account: String,
    },
    /// Inline plaintext credential value.
    Plaintext(String),
    /// No credential configured.
    #[default]
    None,
}

impl CredentialRef {
    /// Whether this reference points at an actual credential.
    #[must_use]
    pub fn is_set(&self) -> bool {
        !matches!(self, CredentialRef::None)
    }
}

impl Serialize for CredentialRef {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            CredentialRef::Plaintext(value) => serializer.serialize_str(value),
            CredentialRef::None => serializer.serialize_str(""),
            CredentialRef::Keyring { service, account } => {
                let mut map = serializer.serialize_map(Some(2))?;
                map.serialize_entry("service", service)?;
                map.serialize_entry("account", account)?;
                map.end()
            }
        }
    }
}

impl<'de> Deserialize<'de> for CredentialRef {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct RefVisitor;

        impl<'de> Visitor<'de> for RefVisitor {
            type Value = CredentialRef;

            fn expecting(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                formatter.write_str("a string or a map with 'service' and 'account' keys")
            }

            fn visit_str<E: de::Error>(self, value: &str) -> Result<CredentialRef, E> {
                if value.is_empty() {
                    Ok(CredentialRef::None)
                } else {
                    Ok(CredentialRef::Plaintext(value.to_owned()))
                }
            }

            fn visit_map<M: MapAccess<'de>>(self, mut map: M) -> Result<CredentialRef, M::Error> {
                let mut service: Option<String> = None;
                let mut account: Option<String> = None;

                while let Some(key) = map.next_key::<String>()? {
                    match key.as_str() {
                        "service" => service = Some(map.next_value()?),
                        "account" => account = Some(map.next_value()?),
                        other => {
                            return Err(de::Error::unknown_field(other, &["service", "account"]));
                        }
                    }
                }

                match (service, account) {
                    (Some(service), Some(account)) => {
                        Ok(CredentialRef::Keyring { service, account })
                    }
                    _ => Err(de::Error::missing_field("service or account")),
                }
            }
        }

        deserializer.deserialize_any(RefVisitor)
    }
}

/// Errors from credential storage operations.
#[derive(Debug, thiserror::Error)]
pub enum CredentialError {
    /// Platform secret store access failed.
    #[error("secret store access error: {0}")]
    StoreAccess(String),

    /// The reference points at a credential that does not exist.
    #[error("credential not found")]
    NotFound,

    /// The stored value could not be used (e.g. invalid UTF-8).
    #[error("invalid credential: {0}")]
    Invalid(String),
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

    use super::*;

    #[test]
    fn plaintext_serializes_as_bare_string() {
        let json = serde_json::to_string(&CredentialRef::Plaintext("sk-abc".into())).unwrap();
        assert_eq!(json, "\"sk-abc\"");
    }

    #[test]
    fn none_serializes_as_empty_string() {
        let json = serde_json::to_string(&CredentialRef::None).unwrap();
        assert_eq!(json, "\"\"");
    }

    #[test]
    fn bare_string_deserializes_to_plaintext() {
        let parsed: CredentialRef = serde_json::from_str("\"sk-abc\"").unwrap();
        assert_eq!(parsed, CredentialRef::Plaintext("sk-abc".into()));
    }

    #[test]
    fn empty_string_deserializes_to_none() {
        let parsed: CredentialRef = serde_json::from_str("\"\"").unwrap();
        assert_eq!(parsed, CredentialRef::None);
        assert!(!parsed.is_set());
    }

    #[test]
    fn map_round_trips_to_keyring_ref() {
        let original = CredentialRef::Keyring {
            service: "dev.aura.assistant".into(),
            account: "completion.api_key".into(),
        };
        let json = serde_json::to_string(&original).unwrap();
        let parsed: CredentialRef = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, original);
    }

    #[test]
    fn map_with_unknown_field_is_rejected() {
        let result: Result<CredentialRef, _> =
            serde_json::from_str("{\"service\":\"s\",\"password\":\"x\"}");
        assert!(result.is_err());
    }

    #[test]
    fn keyring_ref_survives_toml() {
        #[derive(Serialize, Deserialize)]
        struct Wrapper {
            api_key: CredentialRef,
        }
        let wrapper = Wrapper {
            api_key: CredentialRef::Keyring {
                service: "dev.aura.assistant".into(),
                account: "completion.api_key".into(),
            },
        };
        let toml_text = toml::to_string(&wrapper).unwrap();
        let parsed: Wrapper = toml::from_str(&toml_text).unwrap();
        assert_eq!(parsed.api_key, wrapper.api_key);
    }
}
