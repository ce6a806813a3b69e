//! Types and traits for confidential fundraising crates
#![cfg_attr(not(feature = "std"), no_std)]

use core::marker::PhantomData;
use frame_support::{pallet_prelude::*, BoundedVec};
use sp_core::ed25519;
use sp_runtime::traits::Verify;
use sp_std::{collections::btree_set::BTreeSet, prelude::*};


/// Opaque reference to an encrypted 64-bit amount.
///
/// Handles are immutable: every homomorphic operation yields a fresh handle and
/// storage replaces the previous one.
pub type CiphertextHandle = [u8; 32];

/// Value read for an account or record that was never written.
/// It resolves to no access context and can never be decrypted.
pub const UNINITIALIZED_HANDLE: CiphertextHandle = [0u8; 32];

/// Proof blob accompanying an externally encrypted input.
pub type MaxProofLen = ConstU32<1024>;
pub type InputProof = BoundedVec<u8, MaxProofLen>;

/// Campaign identifiers are assigned from 1 upwards.
pub type CampaignId = u64;

/// Human-facing amounts use a fixed 6 decimal scale over integer base units.
pub const AMOUNT_DECIMALS: u32 = 6;
pub const AMOUNT_SCALE: u64 = 1_000_000;

/// Domain tag folded into every input attestation so the signature cannot be
/// replayed as any other signed message.
pub const INPUT_ATTESTATION_DOMAIN: &[u8] = b"fundraising/input-attestation/v1";

// Encrypted arithmetic

/// Narrow interface to the external homomorphic-encryption primitive.
///
/// Implementations never expose plaintext to the caller. Inputs are handles
/// already trusted by the ledger (verified inputs or outputs of earlier ops).
pub trait EncryptedArithmetic {
    /// Trivially encrypt a public value.
    fn encrypt_plaintext(value: u64) -> CiphertextHandle;

    /// `lhs + rhs` over the 64-bit domain (wrapping).
    fn add(lhs: &CiphertextHandle, rhs: &CiphertextHandle) -> CiphertextHandle;

    /// `lhs - rhs` over the 64-bit domain. Callers clamp first with [`Self::transferable`].
    fn sub(lhs: &CiphertextHandle, rhs: &CiphertextHandle) -> CiphertextHandle;

    /// `amount` if `amount <= available`, otherwise an encryption of zero.
    /// Evaluated without revealing which branch was taken.
    fn transferable(amount: &CiphertextHandle, available: &CiphertextHandle) -> CiphertextHandle;
}

// Input proofs

/// The (token contract, authorized spender) pair an input was encrypted for.
#[derive(Clone, PartialEq, Eq, Encode, Decode, TypeInfo, MaxEncodedLen, RuntimeDebug)]
pub struct InputBinding<AccountId> {
    pub contract: AccountId,
    pub spender: AccountId,
}

impl<AccountId> InputBinding<AccountId> {
    pub fn new(contract: AccountId, spender: AccountId) -> Self {
        Self { contract, spender }
    }
}

/// Bytes signed by the input verifier key for `handle` under `binding`.
pub fn input_attestation_message<AccountId: Encode>(
    handle: &CiphertextHandle,
    binding: &InputBinding<AccountId>,
) -> Vec<u8> {
    (INPUT_ATTESTATION_DOMAIN, handle, binding).encode()
}

/// Proof or binding mismatch on an externally supplied ciphertext.
#[derive(Clone, Copy, PartialEq, Eq, RuntimeDebug)]
pub struct InvalidCiphertext;

/// Checks that a freshly introduced handle is well formed and bound to the
/// expected (contract, spender) pair before anything trusts it.
pub trait InputVerifier<AccountId> {
    fn verify(
        handle: &CiphertextHandle,
        proof: &InputProof,
        binding: &InputBinding<AccountId>,
    ) -> Result<(), InvalidCiphertext>;
}

/// Rejects every input.
impl<AccountId> InputVerifier<AccountId> for () {
    fn verify(
        _handle: &CiphertextHandle,
        _proof: &InputProof,
        _binding: &InputBinding<AccountId>,
    ) -> Result<(), InvalidCiphertext> {
        Err(InvalidCiphertext)
    }
}

/// Input proofs are ed25519 signatures by the coprocessor's input key over
/// [`input_attestation_message`]. `Signer` supplies that public key.
pub struct Ed25519InputVerifier<Signer>(PhantomData<Signer>);

impl<AccountId, Signer> InputVerifier<AccountId> for Ed25519InputVerifier<Signer>
where
    AccountId: Encode,
    Signer: Get<ed25519::Public>,
{
    fn verify(
        handle: &CiphertextHandle,
        proof: &InputProof,
        binding: &InputBinding<AccountId>,
    ) -> Result<(), InvalidCiphertext> {
        if *handle == UNINITIALIZED_HANDLE {
            return Err(InvalidCiphertext);
        }
        let raw: [u8; 64] = proof.as_slice().try_into().map_err(|_| InvalidCiphertext)?;
        let signature = ed25519::Signature::from_raw(raw);
        let message = input_attestation_message(handle, binding);
        if signature.verify(message.as_slice(), &Signer::get()) {
            Ok(())
        } else {
            Err(InvalidCiphertext)
        }
    }
}

// Operator

pub trait OperatorRegistry<AccountId, Moment> {
    /// Return true if `operator` holds an unexpired grant from `holder` at `now`.
    fn is_operator(holder: &AccountId, operator: &AccountId, now: Moment) -> bool;
}

impl<AccountId, Moment> OperatorRegistry<AccountId, Moment> for () {
    fn is_operator(_holder: &AccountId, _operator: &AccountId, _now: Moment) -> bool {
        false
    }
}

// Ledger

/// Handles produced by a confidential move.
#[derive(Clone, Copy, PartialEq, Eq, Encode, Decode, TypeInfo, MaxEncodedLen, RuntimeDebug)]
pub struct TransferOutcome {
    /// Amount actually moved (the requested amount, or zero if it exceeded the balance).
    pub transferred: CiphertextHandle,
    /// Recipient balance after the move.
    pub to_balance: CiphertextHandle,
}

/// Confidential balance ledger as seen by other pallets.
pub trait ConfidentialLedger<AccountId> {
    /// Contract identity of the token, used in input bindings.
    fn token_account() -> AccountId;

    fn is_operator(owner: &AccountId, operator: &AccountId) -> bool;

    fn confidential_balance_of(who: &AccountId) -> CiphertextHandle;

    /// Operator-gated move of an externally encrypted amount.
    /// The proof must bind `amount` to (token, `operator`).
    fn transfer_from(
        owner: &AccountId,
        operator: &AccountId,
        to: &AccountId,
        amount: CiphertextHandle,
        proof: InputProof,
    ) -> Result<TransferOutcome, DispatchError>;

    /// Move of an internally produced handle; no operator grant or proof involved.
    /// Only callable by pallets acting on their own custodial account.
    fn transfer_trusted(
        from: &AccountId,
        to: &AccountId,
        amount: &CiphertextHandle,
    ) -> Result<TransferOutcome, DispatchError>;
}

// ACL

/// Business context a handle currently belongs to.
#[derive(Clone, PartialEq, Eq, Encode, Decode, TypeInfo, RuntimeDebug)]
pub enum HandleContext<AccountId> {
    /// Running total of a campaign.
    CampaignTotal {
        campaign_id: CampaignId,
        creator: AccountId,
    },
    /// Cumulative contribution of one contributor to one campaign.
    Contribution {
        campaign_id: CampaignId,
        contributor: AccountId,
    },
    /// Personal token balance.
    Balance { owner: AccountId },
}

impl<AccountId: Ord + Clone> HandleContext<AccountId> {
    /// Identities entitled to request the plaintext of a handle in this context.
    pub fn access_set(&self) -> BTreeSet<AccountId> {
        let who = match self {
            Self::CampaignTotal { creator, .. } => creator,
            Self::Contribution { contributor, .. } => contributor,
            Self::Balance { owner } => owner,
        };
        core::iter::once(who.clone()).collect()
    }

    pub fn grants(&self, who: &AccountId) -> bool {
        self.access_set().contains(who)
    }
}
