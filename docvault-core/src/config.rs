//! Configuration for connecting the vault to its collaborators.

use alloy_primitives::Address;
use secrecy::SecretString;
use serde::{Deserialize, Deserializer};

use crate::{defaults, error::VaultError};

/// Everything needed to reach the ledger and the pinning service.
///
/// Usually loaded from JSON with [`VaultConfig::from_json`]:
///
/// ```rust
/// use docvault_core::VaultConfig;
///
/// let config = VaultConfig::from_json(r#"{
///     "rpc_url": "https://rpc.example.org",
///     "ledger_address": "0x5FbDB2315678afecb367f032d93F642f64180aa3",
///     "pinning": { "api_key": "key", "secret_api_key": "secret" }
/// }"#).unwrap();
/// assert_eq!(config.confirmations, 1);
/// ```
#[derive(Debug, Deserialize)]
pub struct VaultConfig {
    /// JSON-RPC endpoint of the chain hosting the ledger contract.
    pub rpc_url: String,
    /// Address of the authorization contract.
    pub ledger_address: Address,
    /// Receipts awaited before a mutation counts as final.
    #[serde(default = "defaults::confirmations")]
    pub confirmations: u64,
    /// Pinning service settings.
    pub pinning: PinningConfig,
}

/// Settings for the Pinata pinning service and its public gateway.
#[derive(Debug, Deserialize)]
pub struct PinningConfig {
    /// Upload endpoint.
    #[serde(default = "defaults::pinning_endpoint")]
    pub endpoint: String,
    /// Gateway base the content pointer is appended to.
    #[serde(default = "defaults::gateway_base")]
    pub gateway_base: String,
    /// Sent as the `pinata_api_key` header.
    #[serde(deserialize_with = "deserialize_secret")]
    pub api_key: SecretString,
    /// Sent as the `pinata_secret_api_key` header.
    #[serde(deserialize_with = "deserialize_secret")]
    pub secret_api_key: SecretString,
}

impl PinningConfig {
    /// Settings for the default Pinata endpoint and gateway.
    #[must_use]
    pub fn new(api_key: SecretString, secret_api_key: SecretString) -> Self {
        Self {
            endpoint: defaults::pinning_endpoint(),
            gateway_base: defaults::gateway_base(),
            api_key,
            secret_api_key,
        }
    }
}

impl VaultConfig {
    /// Parses a configuration from JSON, applying defaults for omitted optional fields.
    ///
    /// # Errors
    /// Returns `VaultError::Configuration` if the JSON is malformed, a required field is missing or the
    /// ledger address is invalid.
    pub fn from_json(json: &str) -> Result<Self, VaultError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| VaultError::Configuration {
                reason: format!("Invalid config: {e}"),
            })?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), VaultError> {
        if self.rpc_url.trim().is_empty() {
            return Err(VaultError::Configuration {
                reason: "rpc_url must not be empty".to_string(),
            });
        }
        if self.pinning.endpoint.trim().is_empty()
            || self.pinning.gateway_base.trim().is_empty()
        {
            return Err(VaultError::Configuration {
                reason: "pinning endpoint and gateway must not be empty".to_string(),
            });
        }
        Ok(())
    }
}

fn deserialize_secret<'de, D>(deserializer: D) -> Result<SecretString, D::Error>
where
    D: Deserializer<'de>,
{
    String::deserialize(deserializer).map(SecretString::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::address;
    use secrecy::ExposeSecret;

    const MINIMAL: &str = r#"{
        "rpc_url": "https://rpc.example.org",
        "ledger_address": "0x5FbDB2315678afecb367f032d93F642f64180aa3",
        "pinning": { "api_key": "key", "secret_api_key": "secret" }
    }"#;

    #[test]
    fn test_defaults_are_applied() {
        let config = VaultConfig::from_json(MINIMAL).unwrap();
        assert_eq!(
            config.ledger_address,
            address!("0x5FbDB2315678afecb367f032d93F642f64180aa3")
        );
        assert_eq!(config.confirmations, defaults::DEFAULT_CONFIRMATIONS);
        assert_eq!(config.pinning.endpoint, defaults::DEFAULT_PINNING_ENDPOINT);
        assert_eq!(config.pinning.gateway_base, defaults::DEFAULT_GATEWAY_BASE);
        assert_eq!(config.pinning.api_key.expose_secret(), "key");
        assert_eq!(config.pinning.secret_api_key.expose_secret(), "secret");
    }

    #[test]
    fn test_overrides() {
        let config = VaultConfig::from_json(
            r#"{
                "rpc_url": "https://rpc.example.org",
                "ledger_address": "0x5FbDB2315678afecb367f032d93F642f64180aa3",
                "confirmations": 3,
                "pinning": {
                    "endpoint": "https://pin.example.org/upload",
                    "gateway_base": "https://ipfs.example.org/ipfs",
                    "api_key": "key",
                    "secret_api_key": "secret"
                }
            }"#,
        )
        .unwrap();
        assert_eq!(config.confirmations, 3);
        assert_eq!(config.pinning.endpoint, "https://pin.example.org/upload");
    }

    #[test]
    fn test_invalid_address_is_a_configuration_error() {
        let json = MINIMAL.replace("0x5FbDB2315678afecb367f032d93F642f64180aa3", "0x1234");
        assert!(matches!(
            VaultConfig::from_json(&json),
            Err(VaultError::Configuration { .. })
        ));
    }

    #[test]
    fn test_missing_credentials_is_a_configuration_error() {
        let result = VaultConfig::from_json(
            r#"{
                "rpc_url": "https://rpc.example.org",
                "ledger_address": "0x5FbDB2315678afecb367f032d93F642f64180aa3",
                "pinning": {}
            }"#,
        );
        assert!(matches!(result, Err(VaultError::Configuration { .. })));
    }

    #[test]
    fn test_secrets_are_not_debug_printed() {
        let config = VaultConfig::from_json(MINIMAL).unwrap();
        let debug = format!("{config:?}");
        assert!(!debug.contains("secret\""));
        assert!(!debug.contains("\"key\""));
    }
}
