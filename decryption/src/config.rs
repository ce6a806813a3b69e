use serde::{Deserialize, Serialize};

use crate::{eip712::Domain, DecryptionError};

/// Decryption service settings, loadable from JSON.
///
/// ```json
/// { "chain_id": 31337, "verifying_contract": "00..00", "max_duration_days": 365, "max_handles": 16 }
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Chain the attestations are bound to.
    pub chain_id: u64,
    /// Hex-encoded 32-byte identity of the decryption verifier.
    #[serde(with = "hex::serde")]
    pub verifying_contract: [u8; 32],
    /// Longest attestation window accepted.
    pub max_duration_days: u64,
    /// Most `{handle, contract}` pairs per request.
    pub max_handles: usize,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            chain_id: 31337,
            verifying_contract: [0u8; 32],
            max_duration_days: 365,
            max_handles: 16,
        }
    }
}

impl ServiceConfig {
    pub fn from_json(json: &str) -> Result<Self, DecryptionError> {
        serde_json::from_str(json).map_err(|e| DecryptionError::Config(e.to_string()))
    }

    pub fn domain(&self) -> Domain {
        Domain::new(self.chain_id, self.verifying_contract)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_take_defaults() {
        let config = ServiceConfig::from_json(r#"{ "chain_id": 5 }"#).unwrap();
        assert_eq!(config.chain_id, 5);
        assert_eq!(config.max_duration_days, 365);
        assert_eq!(config.max_handles, 16);
    }

    #[test]
    fn verifying_contract_is_hex() {
        let json = format!(r#"{{ "verifying_contract": "{}" }}"#, "ab".repeat(32));
        let config = ServiceConfig::from_json(&json).unwrap();
        assert_eq!(config.verifying_contract, [0xab; 32]);

        let back = serde_json::to_string(&config).unwrap();
        assert_eq!(ServiceConfig::from_json(&back).unwrap(), config);
    }

    #[test]
    fn malformed_json_is_a_config_error() {
        assert!(matches!(
            ServiceConfig::from_json(r#"{ "verifying_contract": "zz" }"#),
            Err(DecryptionError::Config(_))
        ));
    }
}
