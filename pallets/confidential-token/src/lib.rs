//! pallet-confidential-token: per-account encrypted balances.
//!
//! Balances are ciphertext handles produced by the runtime's
//! [`EncryptedArithmetic`] backend; the pallet never holds plaintext. Value
//! enters through `mint` and moves only through operator-gated transfers whose
//! amount is an externally encrypted input bound to (this token, operator).
//!
//! A transfer never reveals whether the owner could cover it: the moved amount
//! is `select(amount <= balance, amount, 0)`, evaluated under encryption.

#![cfg_attr(not(feature = "std"), no_std)]

use frame_support::{pallet_prelude::*, traits::UnixTime, PalletId};
use frame_system::pallet_prelude::*;
use sp_runtime::traits::AccountIdConversion;

use fundraising_primitives::{
    CiphertextHandle, ConfidentialLedger, EncryptedArithmetic, HandleContext, InputBinding,
    InputProof, InputVerifier, OperatorRegistry, TransferOutcome, UNINITIALIZED_HANDLE,
};

pub use pallet::*;

#[cfg(test)]
mod mock;

const LOG_TARGET: &str = "runtime::confidential-token";

#[frame_support::pallet]
pub mod pallet {
    use super::*;

    #[pallet::config]
    pub trait Config: frame_system::Config {
        type RuntimeEvent: From<Event<Self>> + IsType<<Self as frame_system::Config>::RuntimeEvent>;

        /// Encrypted arithmetic backend.
        type Fhe: EncryptedArithmetic;

        /// Checks proofs on externally encrypted amounts.
        type InputVerifier: InputVerifier<Self::AccountId>;

        /// Operator grants consulted before any operator-initiated move.
        type Operators: OperatorRegistry<Self::AccountId, u64>;

        type Time: UnixTime;

        /// Who may mint. Runtimes decide; test runtimes allow any signed origin.
        type MintOrigin: EnsureOrigin<Self::RuntimeOrigin>;

        /// Contract identity of the token, bound into every input.
        #[pallet::constant]
        type PalletId: Get<PalletId>;

        type WeightInfo: WeightInfo;
    }

    pub trait WeightInfo {
        fn mint() -> Weight;
        fn confidential_transfer_from() -> Weight;
    }
    impl WeightInfo for () {
        fn mint() -> Weight {
            Weight::from_parts(20_000, 0)
        }
        fn confidential_transfer_from() -> Weight {
            Weight::from_parts(40_000, 0)
        }
    }

    #[pallet::pallet]
    pub struct Pallet<T>(_);

    /// account -> current balance handle
    #[pallet::storage]
    pub type Balances<T: Config> =
        StorageMap<_, Blake2_128Concat, T::AccountId, CiphertextHandle, OptionQuery>;

    /// current balance handle -> account. Superseded handles are removed.
    #[pallet::storage]
    pub type BalanceOwners<T: Config> =
        StorageMap<_, Identity, CiphertextHandle, T::AccountId, OptionQuery>;

    #[pallet::storage]
    pub type TotalSupply<T: Config> = StorageValue<_, CiphertextHandle, OptionQuery>;

    /// External input handles already spent. An input is accepted at most once.
    #[pallet::storage]
    pub type ConsumedInputs<T: Config> = StorageMap<_, Identity, CiphertextHandle, (), OptionQuery>;

    #[pallet::event]
    #[pallet::generate_deposit(pub(super) fn deposit_event)]
    pub enum Event<T: Config> {
        Minted {
            to: T::AccountId,
            balance: CiphertextHandle,
        },
        ConfidentialTransfer {
            from: T::AccountId,
            to: T::AccountId,
            transferred: CiphertextHandle,
        },
    }

    #[pallet::error]
    pub enum Error<T> {
        /// Caller holds no live operator grant from the owner.
        NotAuthorizedOperator,
        /// Input proof does not attest the handle for (token, operator), or the
        /// handle was already consumed.
        InvalidCiphertext,
    }

    #[pallet::call]
    impl<T: Config> Pallet<T> {
        /// Credit `amount` base units to `to` as a fresh encrypted value.
        #[pallet::call_index(0)]
        #[pallet::weight(T::WeightInfo::mint())]
        pub fn mint(origin: OriginFor<T>, to: T::AccountId, amount: u64) -> DispatchResult {
            T::MintOrigin::ensure_origin(origin)?;
            Self::do_mint(&to, amount);
            Ok(())
        }

        /// Move an encrypted amount out of `from`, signed by an operator of `from`.
        #[pallet::call_index(1)]
        #[pallet::weight(T::WeightInfo::confidential_transfer_from())]
        pub fn confidential_transfer_from(
            origin: OriginFor<T>,
            from: T::AccountId,
            to: T::AccountId,
            amount: CiphertextHandle,
            proof: InputProof,
        ) -> DispatchResult {
            let operator = ensure_signed(origin)?;
            Self::do_transfer_from(&from, &operator, &to, amount, &proof)?;
            Ok(())
        }
    }

    impl<T: Config> Pallet<T> {
        pub fn account_id() -> T::AccountId {
            T::PalletId::get().into_account_truncating()
        }

        /// Current balance handle; the zero handle if `who` never held a balance.
        pub fn confidential_balance_of(who: &T::AccountId) -> CiphertextHandle {
            Balances::<T>::get(who).unwrap_or(UNINITIALIZED_HANDLE)
        }

        pub fn confidential_total_supply() -> CiphertextHandle {
            TotalSupply::<T>::get().unwrap_or(UNINITIALIZED_HANDLE)
        }

        pub fn is_operator(owner: &T::AccountId, operator: &T::AccountId) -> bool {
            T::Operators::is_operator(owner, operator, T::Time::now().as_secs())
        }

        /// Business context of `handle`, if it is somebody's current balance.
        pub fn handle_context(handle: &CiphertextHandle) -> Option<HandleContext<T::AccountId>> {
            BalanceOwners::<T>::get(handle).map(|owner| HandleContext::Balance { owner })
        }

        pub fn do_mint(to: &T::AccountId, amount: u64) -> CiphertextHandle {
            let minted = T::Fhe::encrypt_plaintext(amount);
            let balance = T::Fhe::add(&Self::balance_or_zero(to), &minted);
            Self::set_balance(to, balance);

            let supply = TotalSupply::<T>::get()
                .unwrap_or_else(|| T::Fhe::encrypt_plaintext(0));
            TotalSupply::<T>::put(T::Fhe::add(&supply, &minted));

            log::debug!(target: LOG_TARGET, "minted to {:?}", to);
            Self::deposit_event(Event::Minted {
                to: to.clone(),
                balance,
            });
            balance
        }

        pub fn do_transfer_from(
            from: &T::AccountId,
            operator: &T::AccountId,
            to: &T::AccountId,
            amount: CiphertextHandle,
            proof: &InputProof,
        ) -> Result<TransferOutcome, DispatchError> {
            ensure!(
                Self::is_operator(from, operator),
                Error::<T>::NotAuthorizedOperator
            );
            ensure!(
                !ConsumedInputs::<T>::contains_key(amount),
                Error::<T>::InvalidCiphertext
            );
            let binding = InputBinding::new(Self::account_id(), operator.clone());
            T::InputVerifier::verify(&amount, proof, &binding)
                .map_err(|_| Error::<T>::InvalidCiphertext)?;
            ConsumedInputs::<T>::insert(amount, ());

            Ok(Self::move_clamped(from, to, &amount))
        }

        /// Move `min-or-zero(amount)` from `from` to `to`. `amount` must already be trusted.
        fn move_clamped(
            from: &T::AccountId,
            to: &T::AccountId,
            amount: &CiphertextHandle,
        ) -> TransferOutcome {
            let from_balance = Self::balance_or_zero(from);
            let transferred = T::Fhe::transferable(amount, &from_balance);
            Self::set_balance(from, T::Fhe::sub(&from_balance, &transferred));
            // Read after the debit so a self-transfer credits the debited balance.
            let to_balance = T::Fhe::add(&Self::balance_or_zero(to), &transferred);
            Self::set_balance(to, to_balance);

            log::debug!(target: LOG_TARGET, "confidential transfer {:?} -> {:?}", from, to);
            Self::deposit_event(Event::ConfidentialTransfer {
                from: from.clone(),
                to: to.clone(),
                transferred,
            });
            TransferOutcome {
                transferred,
                to_balance,
            }
        }

        fn balance_or_zero(who: &T::AccountId) -> CiphertextHandle {
            Balances::<T>::get(who).unwrap_or_else(|| T::Fhe::encrypt_plaintext(0))
        }

        fn set_balance(who: &T::AccountId, handle: CiphertextHandle) {
            if let Some(old) = Balances::<T>::get(who) {
                BalanceOwners::<T>::remove(old);
            }
            Balances::<T>::insert(who, handle);
            BalanceOwners::<T>::insert(handle, who.clone());
        }
    }

    impl<T: Config> ConfidentialLedger<T::AccountId> for Pallet<T> {
        fn token_account() -> T::AccountId {
            Self::account_id()
        }

        fn is_operator(owner: &T::AccountId, operator: &T::AccountId) -> bool {
            Self::is_operator(owner, operator)
        }

        fn confidential_balance_of(who: &T::AccountId) -> CiphertextHandle {
            Self::confidential_balance_of(who)
        }

        fn transfer_from(
            owner: &T::AccountId,
            operator: &T::AccountId,
            to: &T::AccountId,
            amount: CiphertextHandle,
            proof: InputProof,
        ) -> Result<TransferOutcome, DispatchError> {
            Self::do_transfer_from(owner, operator, to, amount, &proof)
        }

        fn transfer_trusted(
            from: &T::AccountId,
            to: &T::AccountId,
            amount: &CiphertextHandle,
        ) -> Result<TransferOutcome, DispatchError> {
            Ok(Self::move_clamped(from, to, amount))
        }
    }
}
