//! pallet-campaigns: campaign registry and encrypted contribution aggregator.
//!
//! Campaigns move `Open -> Closed` exactly once. While open and before
//! `end_at`, contributors push encrypted amounts through the token's
//! operator-gated transfer into this pallet's escrow account; the pallet adds
//! the moved handle into the contributor's record and the campaign total
//! without ever seeing plaintext. Closing releases the escrowed total to the
//! creator.
//!
//! The escrow account doubles as the pallet's contract identity: contributors
//! grant it operator rights on the token and encrypt their inputs for it.

#![cfg_attr(not(feature = "std"), no_std)]

use frame_support::{
    pallet_prelude::*, storage::with_storage_layer, traits::UnixTime, PalletId,
};
use frame_system::pallet_prelude::*;
use sp_runtime::traits::AccountIdConversion;
use sp_std::prelude::*;

use fundraising_primitives::{
    CampaignId, CiphertextHandle, ConfidentialLedger, EncryptedArithmetic, HandleContext,
    InputProof, UNINITIALIZED_HANDLE,
};

pub use pallet::*;

#[cfg(feature = "runtime-benchmarks")]
mod benchmarking;
#[cfg(test)]
mod mock;

const LOG_TARGET: &str = "runtime::campaigns";

#[frame_support::pallet]
pub mod pallet {
    use super::*;

    #[pallet::config]
    pub trait Config: frame_system::Config {
        type RuntimeEvent: From<Event<Self>> + IsType<<Self as frame_system::Config>::RuntimeEvent>;

        type Fhe: EncryptedArithmetic;

        /// Token the campaigns raise in.
        type Ledger: ConfidentialLedger<Self::AccountId>;

        type Time: UnixTime;

        /// Escrow account and contract identity of the registry.
        #[pallet::constant]
        type PalletId: Get<PalletId>;

        /// Storage bound on campaign names, in bytes. Names are otherwise
        /// unvalidated; runtimes should pick a generous value.
        #[pallet::constant]
        type MaxNameLength: Get<u32>;

        type WeightInfo: WeightInfo;
    }

    pub trait WeightInfo {
        fn create_campaign() -> Weight;
        fn contribute() -> Weight;
        fn close_campaign() -> Weight;
    }
    impl WeightInfo for () {
        fn create_campaign() -> Weight {
            Weight::from_parts(20_000, 0)
        }
        fn contribute() -> Weight {
            Weight::from_parts(80_000, 0)
        }
        fn close_campaign() -> Weight {
            Weight::from_parts(50_000, 0)
        }
    }

    #[derive(
        CloneNoBound,
        PartialEqNoBound,
        EqNoBound,
        RuntimeDebugNoBound,
        Encode,
        Decode,
        TypeInfo,
        MaxEncodedLen,
    )]
    #[scale_info(skip_type_params(T))]
    #[codec(mel_bound())]
    pub struct Campaign<T: Config> {
        pub name: BoundedVec<u8, T::MaxNameLength>,
        pub creator: T::AccountId,
        /// Public goal in base units.
        pub target_amount: u64,
        /// Unix seconds; contributions are accepted while `now < end_at`.
        pub end_at: u64,
        pub closed: bool,
        pub total_raised: CiphertextHandle,
    }

    /// What a handle stored by this pallet currently represents.
    #[derive(Clone, PartialEq, Eq, Encode, Decode, TypeInfo, MaxEncodedLen, RuntimeDebug)]
    pub enum HandleOwner<AccountId> {
        Total(CampaignId),
        Contribution(CampaignId, AccountId),
    }

    #[pallet::pallet]
    pub struct Pallet<T>(_);

    /// Last assigned campaign id; 0 before the first campaign.
    #[pallet::storage]
    pub type CampaignCount<T: Config> = StorageValue<_, CampaignId, ValueQuery>;

    #[pallet::storage]
    pub type Campaigns<T: Config> =
        StorageMap<_, Blake2_128Concat, CampaignId, Campaign<T>, OptionQuery>;

    /// (campaign, contributor) -> cumulative contribution handle
    #[pallet::storage]
    pub type Contributions<T: Config> = StorageDoubleMap<
        _,
        Blake2_128Concat,
        CampaignId,
        Blake2_128Concat,
        T::AccountId,
        CiphertextHandle,
        OptionQuery,
    >;

    /// current handle -> owner record. Superseded handles are removed.
    #[pallet::storage]
    pub type HandleIndex<T: Config> =
        StorageMap<_, Identity, CiphertextHandle, HandleOwner<T::AccountId>, OptionQuery>;

    #[pallet::event]
    #[pallet::generate_deposit(pub(super) fn deposit_event)]
    pub enum Event<T: Config> {
        CampaignCreated {
            campaign_id: CampaignId,
            creator: T::AccountId,
            target_amount: u64,
            end_at: u64,
        },
        ContributionReceived {
            campaign_id: CampaignId,
            contributor: T::AccountId,
            contribution: CiphertextHandle,
            total_raised: CiphertextHandle,
        },
        CampaignClosed {
            campaign_id: CampaignId,
            released: CiphertextHandle,
        },
    }

    #[pallet::error]
    pub enum Error<T> {
        CampaignNotFound,
        /// Campaign is closed or past its end.
        CampaignNotActive,
        /// Contributor has not granted the registry a live operator grant.
        NotAuthorizedOperator,
        NotCreator,
        AlreadyClosed,
        NameTooLong,
        /// Campaign ids are exhausted.
        TooManyCampaigns,
    }

    #[pallet::call]
    impl<T: Config> Pallet<T> {
        /// Register a campaign owned by the caller. `end_at` in the past is
        /// accepted; such a campaign is simply never active.
        #[pallet::call_index(0)]
        #[pallet::weight(T::WeightInfo::create_campaign())]
        pub fn create_campaign(
            origin: OriginFor<T>,
            name: Vec<u8>,
            target_amount: u64,
            end_at: u64,
        ) -> DispatchResult {
            let creator = ensure_signed(origin)?;
            Self::do_create_campaign(creator, name, target_amount, end_at)?;
            Ok(())
        }

        /// Move an encrypted amount from the caller into escrow and credit it
        /// to `campaign_id`. The input must be encrypted for (token, registry).
        #[pallet::call_index(1)]
        #[pallet::weight(T::WeightInfo::contribute())]
        pub fn contribute(
            origin: OriginFor<T>,
            campaign_id: CampaignId,
            amount: CiphertextHandle,
            proof: InputProof,
        ) -> DispatchResult {
            let contributor = ensure_signed(origin)?;
            Self::do_contribute(&contributor, campaign_id, amount, proof)
        }

        #[pallet::call_index(2)]
        #[pallet::weight(T::WeightInfo::close_campaign())]
        pub fn close_campaign(origin: OriginFor<T>, campaign_id: CampaignId) -> DispatchResult {
            let caller = ensure_signed(origin)?;
            Self::do_close_campaign(&caller, campaign_id)
        }
    }

    impl<T: Config> Pallet<T> {
        pub fn account_id() -> T::AccountId {
            T::PalletId::get().into_account_truncating()
        }

        /// Token contract the registry raises in.
        pub fn token() -> T::AccountId {
            T::Ledger::token_account()
        }

        pub fn campaign_count() -> CampaignId {
            CampaignCount::<T>::get()
        }

        pub fn campaign_info(campaign_id: CampaignId) -> Option<Campaign<T>> {
            Campaigns::<T>::get(campaign_id)
        }

        pub fn is_campaign_active(campaign_id: CampaignId) -> bool {
            Campaigns::<T>::get(campaign_id).is_some_and(|c| Self::is_active(&c))
        }

        pub fn contribution_of(campaign_id: CampaignId, who: &T::AccountId) -> CiphertextHandle {
            Contributions::<T>::get(campaign_id, who).unwrap_or(UNINITIALIZED_HANDLE)
        }

        /// Business context of `handle` if it is a current total or contribution.
        pub fn handle_context(handle: &CiphertextHandle) -> Option<HandleContext<T::AccountId>> {
            match HandleIndex::<T>::get(handle)? {
                HandleOwner::Total(campaign_id) => {
                    let creator = Campaigns::<T>::get(campaign_id)?.creator;
                    Some(HandleContext::CampaignTotal {
                        campaign_id,
                        creator,
                    })
                }
                HandleOwner::Contribution(campaign_id, contributor) => {
                    Some(HandleContext::Contribution {
                        campaign_id,
                        contributor,
                    })
                }
            }
        }

        fn now() -> u64 {
            T::Time::now().as_secs()
        }

        fn is_active(campaign: &Campaign<T>) -> bool {
            !campaign.closed && Self::now() < campaign.end_at
        }

        pub fn do_create_campaign(
            creator: T::AccountId,
            name: Vec<u8>,
            target_amount: u64,
            end_at: u64,
        ) -> Result<CampaignId, DispatchError> {
            let name: BoundedVec<u8, T::MaxNameLength> =
                name.try_into().map_err(|_| Error::<T>::NameTooLong)?;

            let campaign_id = CampaignCount::<T>::get()
                .checked_add(1)
                .ok_or(Error::<T>::TooManyCampaigns)?;
            CampaignCount::<T>::put(campaign_id);
            let total_raised = T::Fhe::encrypt_plaintext(0);
            HandleIndex::<T>::insert(total_raised, HandleOwner::Total(campaign_id));
            Campaigns::<T>::insert(
                campaign_id,
                Campaign {
                    name,
                    creator: creator.clone(),
                    target_amount,
                    end_at,
                    closed: false,
                    total_raised,
                },
            );

            log::debug!(target: LOG_TARGET, "campaign {} created by {:?}", campaign_id, creator);
            Self::deposit_event(Event::CampaignCreated {
                campaign_id,
                creator,
                target_amount,
                end_at,
            });
            Ok(campaign_id)
        }

        pub fn do_contribute(
            contributor: &T::AccountId,
            campaign_id: CampaignId,
            amount: CiphertextHandle,
            proof: InputProof,
        ) -> DispatchResult {
            with_storage_layer(|| {
                let mut campaign =
                    Campaigns::<T>::get(campaign_id).ok_or(Error::<T>::CampaignNotActive)?;
                ensure!(Self::is_active(&campaign), Error::<T>::CampaignNotActive);

                let escrow = Self::account_id();
                ensure!(
                    T::Ledger::is_operator(contributor, &escrow),
                    Error::<T>::NotAuthorizedOperator
                );

                let moved = T::Ledger::transfer_from(contributor, &escrow, &escrow, amount, proof)?
                    .transferred;

                let previous = Contributions::<T>::get(campaign_id, contributor);
                let contribution = T::Fhe::add(
                    &previous.unwrap_or_else(|| T::Fhe::encrypt_plaintext(0)),
                    &moved,
                );
                if let Some(old) = previous {
                    HandleIndex::<T>::remove(old);
                }
                Contributions::<T>::insert(campaign_id, contributor, contribution);
                HandleIndex::<T>::insert(
                    contribution,
                    HandleOwner::Contribution(campaign_id, contributor.clone()),
                );

                let total_raised = T::Fhe::add(&campaign.total_raised, &moved);
                HandleIndex::<T>::remove(campaign.total_raised);
                HandleIndex::<T>::insert(total_raised, HandleOwner::Total(campaign_id));
                campaign.total_raised = total_raised;
                Campaigns::<T>::insert(campaign_id, campaign);

                log::debug!(
                    target: LOG_TARGET,
                    "contribution to campaign {} from {:?}",
                    campaign_id,
                    contributor
                );
                Self::deposit_event(Event::ContributionReceived {
                    campaign_id,
                    contributor: contributor.clone(),
                    contribution,
                    total_raised,
                });
                Ok(())
            })
        }

        pub fn do_close_campaign(caller: &T::AccountId, campaign_id: CampaignId) -> DispatchResult {
            with_storage_layer(|| {
                let mut campaign =
                    Campaigns::<T>::get(campaign_id).ok_or(Error::<T>::CampaignNotFound)?;
                ensure!(campaign.creator == *caller, Error::<T>::NotCreator);
                ensure!(!campaign.closed, Error::<T>::AlreadyClosed);

                let released = T::Ledger::transfer_trusted(
                    &Self::account_id(),
                    &campaign.creator,
                    &campaign.total_raised,
                )?
                .transferred;
                campaign.closed = true;
                Campaigns::<T>::insert(campaign_id, campaign);

                log::debug!(target: LOG_TARGET, "campaign {} closed", campaign_id);
                Self::deposit_event(Event::CampaignClosed {
                    campaign_id,
                    released,
                });
                Ok(())
            })
        }
    }
}
