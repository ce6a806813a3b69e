//! # fhe-coprocessor: reference encrypted-arithmetic backend
//!
//! Stand-in for the external homomorphic-encryption network the fundraising
//! pallets consume through [`EncryptedArithmetic`]. It keeps every ciphertext
//! sealed under a network key and hands out opaque handles; callers only ever
//! see handles.
//!
//! It plays three roles:
//!
//! - **Executor**: evaluates `add`, `sub` and `transferable` on handles and
//!   stores the result under a fresh handle.
//! - **Input gateway**: [`Coprocessor::encrypt_input`] encrypts a client value,
//!   registers it and signs an input attestation binding the handle to a
//!   (token, spender) pair. The signature is the `InputProof` checked on-chain by
//!   [`fundraising_primitives::Ed25519InputVerifier`].
//! - **Key management**: [`Coprocessor::decrypt`] opens a handle. Only the
//!   decryption service calls it, after it has authorized the requester.
//!
//! ## Handle derivation
//!
//! ```text
//! handle = SHA-256("fhe/handle/v1" || op_tag || operands || sequence_le)
//! ```
//!
//! The monotonic sequence makes every output unique, so two business contexts
//! never share a handle.
//!
//! ## Sealed ciphertext layout
//!
//! ```text
//! nonce(12) || ChaCha20-Poly1305(network_key, value_le(8), aad = handle)
//! ```

pub mod local;

use std::collections::HashMap;

use chacha20poly1305::{
    aead::{Aead, KeyInit, Payload},
    ChaCha20Poly1305, Key, Nonce,
};
use parity_scale_codec::Encode;
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha20Rng;
use sha2::{Digest, Sha256};
use sp_core::{ed25519, Pair};
use thiserror::Error;

use fundraising_primitives::{
    input_attestation_message, CiphertextHandle, InputBinding, InputProof,
};

pub use local::{LocalFhe, LocalInputSigner};

const HANDLE_DOMAIN: &[u8] = b"fhe/handle/v1";

mod op {
    pub const TRIVIAL: u8 = 0;
    pub const INPUT: u8 = 1;
    pub const ADD: u8 = 2;
    pub const SUB: u8 = 3;
    pub const TRANSFERABLE: u8 = 4;
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoprocessorError {
    #[error("unknown ciphertext handle")]
    UnknownHandle,
    #[error("sealing failed")]
    Seal,
    #[error("ciphertext failed authentication")]
    Corrupted,
}

/// Client-side encrypted input, ready to submit alongside a contribution.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EncryptedInput {
    pub handle: CiphertextHandle,
    pub proof: InputProof,
}

#[derive(Clone)]
struct Sealed {
    nonce: [u8; 12],
    bytes: Vec<u8>,
}

pub struct Coprocessor {
    cipher: ChaCha20Poly1305,
    input_key: ed25519::Pair,
    store: HashMap<CiphertextHandle, Sealed>,
    sequence: u64,
    rng: ChaCha20Rng,
}

fn derive(label: &[u8], seed: &[u8; 32]) -> [u8; 32] {
    Sha256::new()
        .chain_update(label)
        .chain_update(seed)
        .finalize()
        .into()
}

impl Coprocessor {
    /// Deterministically derive the network key, input key and nonce stream from `seed`.
    pub fn from_seed(seed: [u8; 32]) -> Self {
        let network_key = derive(b"fhe/network-key", &seed);
        Self {
            cipher: ChaCha20Poly1305::new(Key::from_slice(&network_key)),
            input_key: ed25519::Pair::from_seed(&derive(b"fhe/input-key", &seed)),
            store: HashMap::new(),
            sequence: 0,
            rng: ChaCha20Rng::from_seed(derive(b"fhe/nonce", &seed)),
        }
    }

    /// Public key whose signatures make up input proofs.
    pub fn input_signer(&self) -> ed25519::Public {
        self.input_key.public()
    }

    pub fn contains(&self, handle: &CiphertextHandle) -> bool {
        self.store.contains_key(handle)
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    pub fn trivial_encrypt(&mut self, value: u64) -> Result<CiphertextHandle, CoprocessorError> {
        let handle = self.next_handle(op::TRIVIAL, &[&value.to_le_bytes()]);
        self.seal(handle, value)
    }

    pub fn add(
        &mut self,
        lhs: &CiphertextHandle,
        rhs: &CiphertextHandle,
    ) -> Result<CiphertextHandle, CoprocessorError> {
        let value = self.open(lhs)?.wrapping_add(self.open(rhs)?);
        let handle = self.next_handle(op::ADD, &[lhs, rhs]);
        self.seal(handle, value)
    }

    pub fn sub(
        &mut self,
        lhs: &CiphertextHandle,
        rhs: &CiphertextHandle,
    ) -> Result<CiphertextHandle, CoprocessorError> {
        let value = self.open(lhs)?.wrapping_sub(self.open(rhs)?);
        let handle = self.next_handle(op::SUB, &[lhs, rhs]);
        self.seal(handle, value)
    }

    /// `select(amount <= available, amount, 0)`.
    pub fn transferable(
        &mut self,
        amount: &CiphertextHandle,
        available: &CiphertextHandle,
    ) -> Result<CiphertextHandle, CoprocessorError> {
        let amount_v = self.open(amount)?;
        let value = if amount_v <= self.open(available)? {
            amount_v
        } else {
            0
        };
        let handle = self.next_handle(op::TRANSFERABLE, &[amount, available]);
        self.seal(handle, value)
    }

    /// Encrypt `value` for `binding` and attest the binding with the input key.
    pub fn encrypt_input<AccountId: Encode>(
        &mut self,
        value: u64,
        binding: &InputBinding<AccountId>,
    ) -> Result<EncryptedInput, CoprocessorError> {
        let handle = self.next_handle(op::INPUT, &[&binding.encode()]);
        let handle = self.seal(handle, value)?;
        let signature = self
            .input_key
            .sign(&input_attestation_message(&handle, binding));
        let proof = InputProof::try_from(signature.encode()).map_err(|_| CoprocessorError::Seal)?;
        Ok(EncryptedInput { handle, proof })
    }

    /// Open a handle. Reserved for the key-management side of the decryption
    /// service, which authorizes the requester first.
    pub fn decrypt(&self, handle: &CiphertextHandle) -> Result<u64, CoprocessorError> {
        self.open(handle)
    }

    fn next_handle(&mut self, tag: u8, operands: &[&[u8]]) -> CiphertextHandle {
        let mut hasher = Sha256::new();
        hasher.update(HANDLE_DOMAIN);
        hasher.update([tag]);
        for operand in operands {
            hasher.update(operand);
        }
        hasher.update(self.sequence.to_le_bytes());
        self.sequence = self.sequence.wrapping_add(1);
        hasher.finalize().into()
    }

    fn seal(
        &mut self,
        handle: CiphertextHandle,
        value: u64,
    ) -> Result<CiphertextHandle, CoprocessorError> {
        let mut nonce = [0u8; 12];
        self.rng.fill_bytes(&mut nonce);
        let bytes = self
            .cipher
            .encrypt(
                Nonce::from_slice(&nonce),
                Payload {
                    msg: &value.to_le_bytes(),
                    aad: &handle,
                },
            )
            .map_err(|_| CoprocessorError::Seal)?;
        self.store.insert(handle, Sealed { nonce, bytes });
        Ok(handle)
    }

    fn open(&self, handle: &CiphertextHandle) -> Result<u64, CoprocessorError> {
        let sealed = self
            .store
            .get(handle)
            .ok_or(CoprocessorError::UnknownHandle)?;
        let plain = self
            .cipher
            .decrypt(
                Nonce::from_slice(&sealed.nonce),
                Payload {
                    msg: &sealed.bytes,
                    aad: handle,
                },
            )
            .map_err(|_| CoprocessorError::Corrupted)?;
        let raw: [u8; 8] = plain
            .as_slice()
            .try_into()
            .map_err(|_| CoprocessorError::Corrupted)?;
        Ok(u64::from_le_bytes(raw))
    }
}

#[cfg(test)]
mod tests;
