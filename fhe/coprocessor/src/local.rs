//! Process-local coprocessor for mock and test runtimes.
//!
//! Pallets are generic over [`EncryptedArithmetic`]; test runtimes plug in
//! [`LocalFhe`], which forwards to a thread-local [`Coprocessor`] seeded with a
//! fixed development seed. Each test thread gets its own instance, matching how
//! `TestExternalities` isolates storage.

use std::cell::RefCell;

use parity_scale_codec::Encode;
use sp_core::{ed25519, Get};

use fundraising_primitives::{CiphertextHandle, EncryptedArithmetic, InputBinding};

use crate::{Coprocessor, CoprocessorError, EncryptedInput};

pub const DEV_SEED: [u8; 32] = *b"fundraising-dev-coprocessor-seed";

thread_local! {
    static COPROCESSOR: RefCell<Coprocessor> = RefCell::new(Coprocessor::from_seed(DEV_SEED));
}

/// Handle to the thread-local coprocessor.
pub struct LocalFhe;

impl LocalFhe {
    pub fn with<R>(f: impl FnOnce(&mut Coprocessor) -> R) -> R {
        COPROCESSOR.with(|c| f(&mut c.borrow_mut()))
    }

    /// Drop every stored ciphertext and restart the handle sequence.
    pub fn reset() {
        Self::with(|c| *c = Coprocessor::from_seed(DEV_SEED));
    }

    pub fn input_signer() -> ed25519::Public {
        Self::with(|c| c.input_signer())
    }

    pub fn encrypt_input<AccountId: Encode>(
        value: u64,
        binding: &InputBinding<AccountId>,
    ) -> Result<EncryptedInput, CoprocessorError> {
        Self::with(|c| c.encrypt_input(value, binding))
    }

    /// Plaintext of `handle`. Test assertions only; production reads go
    /// through the decryption service.
    pub fn reveal(handle: &CiphertextHandle) -> Result<u64, CoprocessorError> {
        Self::with(|c| c.decrypt(handle))
    }

    fn operand(c: &mut Coprocessor, handle: &CiphertextHandle) -> CiphertextHandle {
        if c.contains(handle) {
            return *handle;
        }
        tracing::warn!(handle = ?handle, "unknown operand, substituting encrypted zero");
        Self::zero(c)
    }

    fn zero(c: &mut Coprocessor) -> CiphertextHandle {
        c.trivial_encrypt(0).unwrap_or_default()
    }

    fn apply(
        lhs: &CiphertextHandle,
        rhs: &CiphertextHandle,
        op: fn(
            &mut Coprocessor,
            &CiphertextHandle,
            &CiphertextHandle,
        ) -> Result<CiphertextHandle, CoprocessorError>,
    ) -> CiphertextHandle {
        Self::with(|c| {
            let lhs = Self::operand(c, lhs);
            let rhs = Self::operand(c, rhs);
            match op(c, &lhs, &rhs) {
                Ok(handle) => handle,
                Err(e) => {
                    tracing::warn!(error = %e, "encrypted operation failed");
                    Self::zero(c)
                }
            }
        })
    }
}

impl EncryptedArithmetic for LocalFhe {
    fn encrypt_plaintext(value: u64) -> CiphertextHandle {
        Self::with(|c| c.trivial_encrypt(value).unwrap_or_default())
    }

    fn add(lhs: &CiphertextHandle, rhs: &CiphertextHandle) -> CiphertextHandle {
        Self::apply(lhs, rhs, Coprocessor::add)
    }

    fn sub(lhs: &CiphertextHandle, rhs: &CiphertextHandle) -> CiphertextHandle {
        Self::apply(lhs, rhs, Coprocessor::sub)
    }

    fn transferable(amount: &CiphertextHandle, available: &CiphertextHandle) -> CiphertextHandle {
        Self::apply(amount, available, Coprocessor::transferable)
    }
}

/// Input key of the thread-local coprocessor, for `Ed25519InputVerifier`.
pub struct LocalInputSigner;

impl Get<ed25519::Public> for LocalInputSigner {
    fn get() -> ed25519::Public {
        LocalFhe::input_signer()
    }
}
