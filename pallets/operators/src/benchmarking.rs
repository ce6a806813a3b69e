//! Benchmarking for `pallet-operators`.

use super::*;
use frame_benchmarking::v2::*;
use frame_system::RawOrigin;

#[benchmarks]
mod benchmarks {
    use super::*;

    #[benchmark]
    fn set_operator() {
        let holder: T::AccountId = whitelisted_caller();
        let operator: T::AccountId = account("operator", 0, 0);

        #[extrinsic_call]
        set_operator(RawOrigin::Signed(holder.clone()), operator.clone(), u64::MAX);

        assert_eq!(Operators::<T>::get(&holder, &operator), Some(u64::MAX));
    }

    #[benchmark]
    fn revoke_operator() {
        let holder: T::AccountId = whitelisted_caller();
        let operator: T::AccountId = account("operator", 0, 0);
        Operators::<T>::insert(&holder, &operator, u64::MAX);

        #[extrinsic_call]
        revoke_operator(RawOrigin::Signed(holder.clone()), operator.clone());

        assert!(!Operators::<T>::contains_key(&holder, &operator));
    }

    impl_benchmark_test_suite!(Pallet, crate::mock::new_test_ext(), crate::mock::Runtime);
}
