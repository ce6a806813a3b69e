//! Benchmarking for `pallet-campaigns`.

use super::*;
use frame_benchmarking::v2::*;
use frame_system::RawOrigin;

#[benchmarks]
mod benchmarks {
    use super::*;

    #[benchmark]
    fn create_campaign() {
        let creator: T::AccountId = whitelisted_caller();
        let name = sp_std::vec![b'n'; T::MaxNameLength::get() as usize];

        #[extrinsic_call]
        create_campaign(RawOrigin::Signed(creator), name, 1_000_000, u64::MAX);

        assert_eq!(CampaignCount::<T>::get(), 1);
    }

    #[benchmark]
    fn close_campaign() -> Result<(), BenchmarkError> {
        let creator: T::AccountId = whitelisted_caller();
        let id = Pallet::<T>::do_create_campaign(creator.clone(), Vec::new(), 0, u64::MAX)?;

        #[extrinsic_call]
        close_campaign(RawOrigin::Signed(creator), id);

        assert!(Campaigns::<T>::get(id).is_some_and(|c| c.closed));
        Ok(())
    }

    // `contribute` needs an input proof signed by the runtime's input key,
    // which a generic benchmark cannot produce. Its weight is bounded by
    // `close_campaign` plus one proof verification in the ledger.

    impl_benchmark_test_suite!(Pallet, crate::mock::new_test_ext(), crate::mock::Runtime);
}
