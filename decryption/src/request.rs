//! Wire types exchanged with the decryption service (SCALE encoded).

use parity_scale_codec::{Decode, Encode};
use sp_core::{crypto::AccountId32, sr25519};

use fundraising_primitives::CiphertextHandle;

use crate::{eip712::UserDecryptAttestation, keys::SealedValue};

/// A handle together with the contract whose state owns it.
#[derive(Clone, Debug, PartialEq, Eq, Encode, Decode)]
pub struct HandleContractPair {
    pub handle: CiphertextHandle,
    pub contract: AccountId32,
}

impl HandleContractPair {
    pub fn new(handle: CiphertextHandle, contract: AccountId32) -> Self {
        Self { handle, contract }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Encode, Decode)]
pub struct UserDecryptRequest {
    pub pairs: Vec<HandleContractPair>,
    pub attestation: UserDecryptAttestation,
    /// sr25519 signature by `user` over the attestation's signing digest.
    pub signature: sr25519::Signature,
    pub user: AccountId32,
}

#[derive(Clone, Debug, PartialEq, Eq, Encode, Decode)]
pub struct UserDecryptResponse {
    /// Per-response service key; the requester combines it with its ephemeral secret.
    pub service_public_key: [u8; 32],
    /// One entry per requested pair, in request order.
    pub values: Vec<SealedValue>,
}
