//! pallet-operators: time-bound delegation of confidential balance moves.
//!
//! A holder grants an operator the right to move their confidential balance
//! until a unix timestamp (seconds). Grants are checked by the ledger through
//! [`OperatorRegistry`]; a grant is live while `now < valid_until`.

#![cfg_attr(not(feature = "std"), no_std)]

use frame_support::{pallet_prelude::*, traits::UnixTime};
use frame_system::pallet_prelude::*;

use fundraising_primitives::OperatorRegistry;

pub use pallet::*;

#[cfg(feature = "runtime-benchmarks")]
mod benchmarking;
#[cfg(test)]
mod mock;
#[cfg(test)]
mod tests;

const LOG_TARGET: &str = "runtime::operators";

#[frame_support::pallet]
pub mod pallet {
    use super::*;

    #[pallet::config]
    pub trait Config: frame_system::Config {
        type RuntimeEvent: From<Event<Self>> + IsType<<Self as frame_system::Config>::RuntimeEvent>;

        /// Wall clock used to judge grant expiry.
        type Time: UnixTime;

        type WeightInfo: WeightInfo;
    }

    pub trait WeightInfo {
        fn set_operator() -> Weight;
        fn revoke_operator() -> Weight;
    }
    impl WeightInfo for () {
        fn set_operator() -> Weight {
            Weight::from_parts(10_000, 0)
        }
        fn revoke_operator() -> Weight {
            Weight::from_parts(10_000, 0)
        }
    }

    #[pallet::pallet]
    pub struct Pallet<T>(_);

    /// (holder, operator) -> valid_until (unix seconds)
    #[pallet::storage]
    pub type Operators<T: Config> = StorageDoubleMap<
        _,
        Blake2_128Concat,
        T::AccountId,
        Blake2_128Concat,
        T::AccountId,
        u64,
        OptionQuery,
    >;

    #[pallet::event]
    #[pallet::generate_deposit(pub(super) fn deposit_event)]
    pub enum Event<T: Config> {
        OperatorSet {
            holder: T::AccountId,
            operator: T::AccountId,
            valid_until: u64,
        },
        OperatorRevoked {
            holder: T::AccountId,
            operator: T::AccountId,
        },
    }

    #[pallet::error]
    pub enum Error<T> {
        /// Expiry is not in the future.
        InvalidExpiry,
        /// No grant exists for this operator.
        NotFound,
    }

    #[pallet::call]
    impl<T: Config> Pallet<T> {
        /// Grant (or replace the grant of) `operator` until `valid_until`.
        #[pallet::call_index(0)]
        #[pallet::weight(T::WeightInfo::set_operator())]
        pub fn set_operator(
            origin: OriginFor<T>,
            operator: T::AccountId,
            valid_until: u64,
        ) -> DispatchResult {
            let holder = ensure_signed(origin)?;
            ensure!(valid_until > Self::now(), Error::<T>::InvalidExpiry);

            Operators::<T>::insert(&holder, &operator, valid_until);
            log::debug!(
                target: LOG_TARGET,
                "operator {:?} granted by {:?} until {}",
                operator,
                holder,
                valid_until
            );
            Self::deposit_event(Event::OperatorSet {
                holder,
                operator,
                valid_until,
            });
            Ok(())
        }

        #[pallet::call_index(1)]
        #[pallet::weight(T::WeightInfo::revoke_operator())]
        pub fn revoke_operator(origin: OriginFor<T>, operator: T::AccountId) -> DispatchResult {
            let holder = ensure_signed(origin)?;
            ensure!(
                Operators::<T>::contains_key(&holder, &operator),
                Error::<T>::NotFound
            );
            Operators::<T>::remove(&holder, &operator);
            Self::deposit_event(Event::OperatorRevoked { holder, operator });
            Ok(())
        }
    }

    impl<T: Config> Pallet<T> {
        pub fn now() -> u64 {
            T::Time::now().as_secs()
        }

        /// Expiry of the grant from `holder` to `operator`, live or not.
        pub fn operator_expiry(holder: &T::AccountId, operator: &T::AccountId) -> Option<u64> {
            Operators::<T>::get(holder, operator)
        }

        pub fn is_operator(holder: &T::AccountId, operator: &T::AccountId) -> bool {
            <Self as OperatorRegistry<T::AccountId, u64>>::is_operator(holder, operator, Self::now())
        }
    }

    impl<T: Config> OperatorRegistry<T::AccountId, u64> for Pallet<T> {
        fn is_operator(holder: &T::AccountId, operator: &T::AccountId, now: u64) -> bool {
            Operators::<T>::get(holder, operator).is_some_and(|until| now < until)
        }
    }
}
