//! Typed, domain-separated attestation hashing.
//!
//! Follows the EIP-712 encoding rules:
//!
//! ```text
//! digest     = keccak256(0x19 0x01 || domainSeparator || hashStruct(attestation))
//! hashStruct = keccak256(typeHash || keccak256(publicKey)
//!                        || keccak256(contract_0 || .. || contract_n)
//!                        || uint256(startTimestamp) || uint256(durationDays))
//! ```
//!
//! Identities are 32 bytes wide, so contracts and the verifying contract are
//! encoded as `bytes32`.

use parity_scale_codec::{Decode, Encode};
use sp_core::{crypto::AccountId32, hashing::keccak_256};

pub const DOMAIN_NAME: &str = "Decryption";
pub const DOMAIN_VERSION: &str = "1";

pub const DOMAIN_TYPE: &str =
    "EIP712Domain(string name,string version,uint256 chainId,bytes32 verifyingContract)";

pub const ATTESTATION_TYPE: &str = "UserDecryptRequestVerification(bytes publicKey,bytes32[] contractAddresses,uint256 startTimestamp,uint256 durationDays)";

/// Signing domain; binds attestations to one chain and one verifying contract.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Domain {
    pub name: &'static str,
    pub version: &'static str,
    pub chain_id: u64,
    pub verifying_contract: [u8; 32],
}

impl Domain {
    pub fn new(chain_id: u64, verifying_contract: [u8; 32]) -> Self {
        Self {
            name: DOMAIN_NAME,
            version: DOMAIN_VERSION,
            chain_id,
            verifying_contract,
        }
    }

    pub fn separator(&self) -> [u8; 32] {
        let mut buf = Vec::with_capacity(5 * 32);
        buf.extend_from_slice(&keccak_256(DOMAIN_TYPE.as_bytes()));
        buf.extend_from_slice(&keccak_256(self.name.as_bytes()));
        buf.extend_from_slice(&keccak_256(self.version.as_bytes()));
        buf.extend_from_slice(&uint256(self.chain_id));
        buf.extend_from_slice(&self.verifying_contract);
        keccak_256(&buf)
    }
}

/// The statement a requester signs to authorize re-encryption to `public_key`.
#[derive(Clone, Debug, PartialEq, Eq, Encode, Decode)]
pub struct UserDecryptAttestation {
    /// Ephemeral x25519 public key the response is sealed to.
    pub public_key: [u8; 32],
    /// Contracts whose handles the requester may ask for.
    pub contract_addresses: Vec<AccountId32>,
    /// Unix seconds.
    pub start_timestamp: u64,
    pub duration_days: u64,
}

impl UserDecryptAttestation {
    pub fn hash_struct(&self) -> [u8; 32] {
        let mut contracts = Vec::with_capacity(self.contract_addresses.len() * 32);
        for contract in &self.contract_addresses {
            let raw: &[u8; 32] = contract.as_ref();
            contracts.extend_from_slice(raw);
        }

        let mut buf = Vec::with_capacity(5 * 32);
        buf.extend_from_slice(&keccak_256(ATTESTATION_TYPE.as_bytes()));
        buf.extend_from_slice(&keccak_256(&self.public_key));
        buf.extend_from_slice(&keccak_256(&contracts));
        buf.extend_from_slice(&uint256(self.start_timestamp));
        buf.extend_from_slice(&uint256(self.duration_days));
        keccak_256(&buf)
    }

    /// Digest the requester signs with their long-term key.
    pub fn signing_digest(&self, domain: &Domain) -> [u8; 32] {
        let mut buf = Vec::with_capacity(2 + 64);
        buf.extend_from_slice(&[0x19, 0x01]);
        buf.extend_from_slice(&domain.separator());
        buf.extend_from_slice(&self.hash_struct());
        keccak_256(&buf)
    }
}

fn uint256(value: u64) -> [u8; 32] {
    let mut out = [0u8; 32];
    out[24..].copy_from_slice(&value.to_be_bytes());
    out
}
