//! Ephemeral request keys and response sealing.
//!
//! ```text
//! Flow:
//! 1. Requester generates an ephemeral x25519 keypair per request
//! 2. Service generates its own ephemeral secret per response
//! 3. Shared secret = ECDH(service_secret, requester_pk)
//! 4. Key = SHA-256("fundraising/user-decrypt/v1" || shared || service_pk || requester_pk)
//! 5. Each value = ChaCha20-Poly1305(key, nonce, value_le, aad = handle)
//! ```

use chacha20poly1305::{
    aead::{Aead, KeyInit, Payload},
    ChaCha20Poly1305, Key, Nonce,
};
use parity_scale_codec::{Decode, Encode};
use rand::{rngs::OsRng, RngCore};
use sha2::{Digest, Sha256};
use x25519_dalek::{EphemeralSecret, PublicKey, StaticSecret};

use fundraising_primitives::CiphertextHandle;

use crate::DecryptionError;

const KDF_DOMAIN: &[u8] = b"fundraising/user-decrypt/v1";

/// One re-encrypted value, readable only by the holder of the request key.
#[derive(Clone, Debug, PartialEq, Eq, Encode, Decode)]
pub struct SealedValue {
    pub handle: CiphertextHandle,
    pub nonce: [u8; 12],
    pub ciphertext: Vec<u8>,
}

/// Request-scoped keypair. Never reuse across requests.
pub struct EphemeralKeypair {
    secret: StaticSecret,
    public: PublicKey,
}

impl EphemeralKeypair {
    pub fn generate() -> Self {
        let secret = StaticSecret::random_from_rng(&mut OsRng);
        let public = PublicKey::from(&secret);
        Self { secret, public }
    }

    pub fn public_key(&self) -> [u8; 32] {
        *self.public.as_bytes()
    }

    /// Open a value sealed by the service whose response key is `service_public`.
    pub fn open(
        &self,
        service_public: &[u8; 32],
        sealed: &SealedValue,
    ) -> Result<u64, DecryptionError> {
        let shared = self.secret.diffie_hellman(&PublicKey::from(*service_public));
        let cipher = cipher(shared.as_bytes(), service_public, self.public.as_bytes());
        let plain = cipher
            .decrypt(
                Nonce::from_slice(&sealed.nonce),
                Payload {
                    msg: &sealed.ciphertext,
                    aad: &sealed.handle,
                },
            )
            .map_err(|_| DecryptionError::InvalidResponse)?;
        let raw: [u8; 8] = plain
            .as_slice()
            .try_into()
            .map_err(|_| DecryptionError::InvalidResponse)?;
        Ok(u64::from_le_bytes(raw))
    }
}

/// Service side of one response: a fresh ECDH secret against the requester key.
pub(crate) struct ResponseSealer {
    cipher: ChaCha20Poly1305,
    public: [u8; 32],
}

impl ResponseSealer {
    pub(crate) fn new(requester_public: &[u8; 32]) -> Self {
        let secret = EphemeralSecret::random_from_rng(&mut OsRng);
        let public = *PublicKey::from(&secret).as_bytes();
        let shared = secret.diffie_hellman(&PublicKey::from(*requester_public));
        Self {
            cipher: cipher(shared.as_bytes(), &public, requester_public),
            public,
        }
    }

    pub(crate) fn public_key(&self) -> [u8; 32] {
        self.public
    }

    pub(crate) fn seal(
        &self,
        handle: CiphertextHandle,
        value: u64,
    ) -> Result<SealedValue, DecryptionError> {
        let mut nonce = [0u8; 12];
        OsRng.fill_bytes(&mut nonce);
        let ciphertext = self
            .cipher
            .encrypt(
                Nonce::from_slice(&nonce),
                Payload {
                    msg: &value.to_le_bytes(),
                    aad: &handle,
                },
            )
            .map_err(|_| DecryptionError::Seal)?;
        Ok(SealedValue {
            handle,
            nonce,
            ciphertext,
        })
    }
}

fn cipher(shared: &[u8; 32], service_public: &[u8; 32], requester_public: &[u8; 32]) -> ChaCha20Poly1305 {
    let key: [u8; 32] = Sha256::new()
        .chain_update(KDF_DOMAIN)
        .chain_update(shared)
        .chain_update(service_public)
        .chain_update(requester_public)
        .finalize()
        .into();
    ChaCha20Poly1305::new(Key::from_slice(&key))
}
