//! Secrets pipeline.
//!
//! Test configurations may carry a `secrets` list of `{name, value}` pairs
//! whose values are Fernet tokens. The key comes from the environment and
//! is read on every invocation.

pub mod fernet;

use std::collections::BTreeMap;
use std::fmt;

use serde::Deserialize;
use zeroize::{Zeroize, ZeroizeOnDrop};

pub use fernet::FernetCipher;

/// Environment variable holding the Fernet key
pub const ENCRYPTION_KEY_ENV: &str = "AMBER_ENCRYPTION_KEY";

const SECRETS_KEY: &str = "secrets";

#[derive(Debug, thiserror::Error)]
pub enum SecretsError {
    #[error("{var} environment variable is not set.")]
    MissingKey { var: String },

    #[error("Encryption key must be 32 url-safe base64-encoded bytes")]
    InvalidKey,

    #[error("Malformed 'secrets' section: {0}")]
    Malformed(#[from] serde_yaml::Error),

    #[error("Cannot decrypt secret {name}: {source}")]
    Decryption {
        name: String,
        #[source]
        source: InvalidToken,
    },

    #[error("Decrypted secret {name} is not valid UTF-8")]
    NotUtf8 { name: String },
}

/// Token failed authentication or could not be decoded
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid token")]
pub struct InvalidToken;

/// Symmetric authenticated decryption
pub trait SecretCipher {
    fn decrypt(&self, token: &[u8]) -> Result<Vec<u8>, InvalidToken>;
}

/// Plaintext that only leaves through [`SecretString::expose_secret`]
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct SecretString(String);

impl SecretString {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn expose_secret(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretString(\"**********\")")
    }
}

impl fmt::Display for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("**********")
    }
}

/// Decrypted secret
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecretModel {
    pub name: String,
    pub value: SecretString,
}

/// Encrypted entry as found in the test configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SecretEntry {
    pub name: String,
    pub value: String,
}

/// Read the Fernet key from `var`; unset and empty are both missing
pub fn encryption_from_env(var: &str) -> Result<FernetCipher, SecretsError> {
    let key = std::env::var(var)
        .ok()
        .filter(|key| !key.is_empty())
        .ok_or_else(|| SecretsError::MissingKey { var: var.to_string() })?;
    FernetCipher::new(&key)
}

/// Decrypt the `secrets` section of a test configuration
pub fn get_secrets(test_config: &serde_yaml::Value) -> Result<BTreeMap<String, SecretModel>, SecretsError> {
    get_secrets_with(test_config, ENCRYPTION_KEY_ENV)
}

/// Same as [`get_secrets`], reading the key from `key_var`
pub fn get_secrets_with(
    test_config: &serde_yaml::Value,
    key_var: &str,
) -> Result<BTreeMap<String, SecretModel>, SecretsError> {
    let Some(section) = test_config.get(SECRETS_KEY) else {
        log::debug!("There is no 'secrets' key in test config file.");
        return Ok(BTreeMap::new());
    };

    let cipher = encryption_from_env(key_var)?;
    let entries: Vec<SecretEntry> = serde_yaml::from_value(section.clone())?;

    log::debug!("Getting secrets");
    decrypt_secrets(&entries, &cipher)
}

/// Decrypt every entry; the first failure aborts the whole set
pub fn decrypt_secrets(
    entries: &[SecretEntry],
    cipher: &dyn SecretCipher,
) -> Result<BTreeMap<String, SecretModel>, SecretsError> {
    entries
        .iter()
        .map(|entry| {
            let plaintext = cipher
                .decrypt(entry.value.as_bytes())
                .map_err(|source| SecretsError::Decryption {
                    name: entry.name.clone(),
                    source,
                })?;
            let value = String::from_utf8(plaintext).map_err(|_| SecretsError::NotUtf8 {
                name: entry.name.clone(),
            })?;
            Ok((
                entry.name.clone(),
                SecretModel {
                    name: entry.name.clone(),
                    value: SecretString::new(value),
                },
            ))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct Capture {
        records: Mutex<Vec<String>>,
    }

    impl log::Log for Capture {
        fn enabled(&self, _: &log::Metadata) -> bool {
            true
        }

        fn log(&self, record: &log::Record) {
            if let Ok(mut records) = self.records.lock() {
                records.push(format!("{} {}", record.level(), record.args()));
            }
        }

        fn flush(&self) {}
    }

    static CAPTURE: Capture = Capture {
        records: Mutex::new(Vec::new()),
    };

    fn captured_logs() -> Vec<String> {
        let _ = log::set_logger(&CAPTURE);
        log::set_max_level(log::LevelFilter::Debug);
        CAPTURE.records.lock().unwrap().clone()
    }

    struct Reverse;

    impl SecretCipher for Reverse {
        fn decrypt(&self, token: &[u8]) -> Result<Vec<u8>, InvalidToken> {
            if token.starts_with(b"bad") {
                return Err(InvalidToken);
            }
            Ok(token.iter().rev().copied().collect())
        }
    }

    fn entry(name: &str, value: &str) -> SecretEntry {
        SecretEntry {
            name: name.to_string(),
            value: value.to_string(),
        }
    }

    #[test]
    fn test_no_secrets_key() {
        let config: serde_yaml::Value = serde_yaml::from_str("hosts: []").unwrap();
        let secrets = get_secrets_with(&config, "TESTBED_SECRETS_TEST_UNUSED").unwrap();
        assert!(secrets.is_empty());
    }

    #[test]
    fn test_missing_key_variable() {
        let config: serde_yaml::Value = serde_yaml::from_str("secrets:\n  - name: s\n    value: abc\n").unwrap();
        let err = get_secrets_with(&config, "TESTBED_SECRETS_TEST_MISSING").unwrap_err();
        assert!(matches!(err, SecretsError::MissingKey { ref var } if var == "TESTBED_SECRETS_TEST_MISSING"));
        assert_eq!(err.to_string(), "TESTBED_SECRETS_TEST_MISSING environment variable is not set.");
    }

    #[test]
    fn test_empty_key_variable() {
        std::env::set_var("TESTBED_SECRETS_TEST_EMPTY", "");
        let config: serde_yaml::Value = serde_yaml::from_str("secrets: []").unwrap();
        assert!(matches!(
            get_secrets_with(&config, "TESTBED_SECRETS_TEST_EMPTY"),
            Err(SecretsError::MissingKey { .. })
        ));
    }

    #[test]
    fn test_get_secrets_from_env() {
        let key = FernetCipher::generate_key();
        let cipher = FernetCipher::new(&key).unwrap();
        let token = cipher.encrypt(b"hunter2").unwrap();
        std::env::set_var("TESTBED_SECRETS_TEST_KEY", &key);

        let yaml = format!("secrets:\n  - name: db\n    value: \"{}\"\n", token);
        let config: serde_yaml::Value = serde_yaml::from_str(&yaml).unwrap();
        let secrets = get_secrets_with(&config, "TESTBED_SECRETS_TEST_KEY").unwrap();

        assert_eq!(secrets["db"].name, "db");
        assert_eq!(secrets["db"].value.expose_secret(), "hunter2");
    }

    #[test]
    fn test_decrypt_secrets() {
        let secrets = decrypt_secrets(&[entry("a", "terces"), entry("b", "drowssap")], &Reverse).unwrap();
        assert_eq!(secrets.len(), 2);
        assert_eq!(secrets["a"].value.expose_secret(), "secret");
        assert_eq!(secrets["b"].value.expose_secret(), "password");
    }

    #[test]
    fn test_decrypt_failure_aborts() {
        let err = decrypt_secrets(&[entry("a", "terces"), entry("b", "bad")], &Reverse).unwrap_err();
        assert!(matches!(err, SecretsError::Decryption { ref name, .. } if name == "b"));
    }

    #[test]
    fn test_secret_is_not_printed() {
        let secret = SecretModel {
            name: "s".to_string(),
            value: SecretString::new("plaintext"),
        };
        assert!(!format!("{:?}", secret).contains("plaintext"));
        assert!(!secret.value.to_string().contains("plaintext"));
        assert_eq!(secret.value, SecretString::new("plaintext"));
    }

    #[test]
    fn test_pipeline_logging() {
        captured_logs();

        let empty: serde_yaml::Value = serde_yaml::from_str("key: value").unwrap();
        get_secrets_with(&empty, "TESTBED_SECRETS_TEST_LOG_UNUSED").unwrap();

        let key = FernetCipher::generate_key();
        let token = FernetCipher::new(&key).unwrap().encrypt(b"logged-plaintext-41").unwrap();
        std::env::set_var("TESTBED_SECRETS_TEST_LOG_KEY", &key);
        let yaml = format!("secrets:\n  - name: logged\n    value: \"{}\"\n", token);
        let config: serde_yaml::Value = serde_yaml::from_str(&yaml).unwrap();
        get_secrets_with(&config, "TESTBED_SECRETS_TEST_LOG_KEY").unwrap();

        let logs = captured_logs();
        assert!(logs.contains(&"DEBUG There is no 'secrets' key in test config file.".to_string()));
        assert!(logs.contains(&"DEBUG Getting secrets".to_string()));
        assert!(logs.iter().all(|line| !line.contains("logged-plaintext-41")));
    }

    #[test]
    fn test_get_secrets_reads_default_variable() {
        let key = FernetCipher::generate_key();
        let token = FernetCipher::new(&key).unwrap().encrypt(b"from-default-env").unwrap();
        std::env::set_var(ENCRYPTION_KEY_ENV, &key);

        let yaml = format!("secrets:\n  - name: s\n    value: \"{}\"\n", token);
        let config: serde_yaml::Value = serde_yaml::from_str(&yaml).unwrap();
        let secrets = get_secrets(&config).unwrap();

        assert_eq!(secrets.len(), 1);
        assert_eq!(
            secrets["s"],
            SecretModel {
                name: "s".to_string(),
                value: SecretString::new("from-default-env"),
            }
        );
    }
}
