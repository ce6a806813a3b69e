//! Requester side of user decryption.

use std::{collections::BTreeMap, time::Duration};

use sp_core::{crypto::AccountId32, sr25519, Pair};

use fundraising_primitives::CiphertextHandle;

use crate::{
    eip712::{Domain, UserDecryptAttestation},
    keys::EphemeralKeypair,
    request::{HandleContractPair, UserDecryptRequest},
    service::Relayer,
    DecryptionError,
};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Build and sign a request for `pairs`, sealed to `keys`.
pub fn build_request(
    domain: &Domain,
    signer: &sr25519::Pair,
    keys: &EphemeralKeypair,
    pairs: Vec<HandleContractPair>,
    contract_addresses: Vec<AccountId32>,
    start_timestamp: u64,
    duration_days: u64,
) -> UserDecryptRequest {
    let attestation = UserDecryptAttestation {
        public_key: keys.public_key(),
        contract_addresses,
        start_timestamp,
        duration_days,
    };
    let signature = signer.sign(&attestation.signing_digest(domain));
    UserDecryptRequest {
        pairs,
        attestation,
        signature,
        user: signer.public().into(),
    }
}

pub struct DecryptionClient<'a, R> {
    relayer: &'a R,
    domain: Domain,
    timeout: Duration,
}

impl<'a, R: Relayer> DecryptionClient<'a, R> {
    pub fn new(relayer: &'a R, domain: Domain) -> Self {
        Self {
            relayer,
            domain,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Decrypt `pairs` as `signer`. A fresh ephemeral keypair is generated for
    /// this call and dropped afterwards.
    pub async fn user_decrypt(
        &self,
        signer: &sr25519::Pair,
        pairs: Vec<HandleContractPair>,
        contract_addresses: Vec<AccountId32>,
        start_timestamp: u64,
        duration_days: u64,
    ) -> Result<BTreeMap<CiphertextHandle, u64>, DecryptionError> {
        let keys = EphemeralKeypair::generate();
        let requested: Vec<CiphertextHandle> = pairs.iter().map(|p| p.handle).collect();
        let request = build_request(
            &self.domain,
            signer,
            &keys,
            pairs,
            contract_addresses,
            start_timestamp,
            duration_days,
        );

        let response = tokio::time::timeout(self.timeout, self.relayer.user_decrypt(request))
            .await
            .map_err(|_| DecryptionError::Timeout)??;

        if response.values.len() != requested.len() {
            return Err(DecryptionError::InvalidResponse);
        }
        let mut out = BTreeMap::new();
        for (handle, sealed) in requested.iter().zip(&response.values) {
            if sealed.handle != *handle {
                return Err(DecryptionError::InvalidResponse);
            }
            out.insert(*handle, keys.open(&response.service_public_key, sealed)?);
        }
        tracing::debug!(handles = out.len(), "user decryption opened");
        Ok(out)
    }

    /// Decrypt a single handle owned by `contract`.
    pub async fn user_decrypt_one(
        &self,
        signer: &sr25519::Pair,
        handle: CiphertextHandle,
        contract: AccountId32,
        start_timestamp: u64,
        duration_days: u64,
    ) -> Result<u64, DecryptionError> {
        let values = self
            .user_decrypt(
                signer,
                vec![HandleContractPair::new(handle, contract.clone())],
                vec![contract],
                start_timestamp,
                duration_days,
            )
            .await?;
        values
            .get(&handle)
            .copied()
            .ok_or(DecryptionError::InvalidResponse)
    }
}
