//! Test runtime wiring the fundraising pallets together.

use fhe_coprocessor::{LocalFhe, LocalInputSigner};
use frame_support::{
    construct_runtime, derive_impl, parameter_types,
    traits::{ConstU32, ConstU64},
    PalletId,
};
use frame_system::EnsureSigned;
use fundraising_primitives::Ed25519InputVerifier;
use sp_runtime::{traits::IdentityLookup, AccountId32};

pub type AccountId = AccountId32;

#[derive_impl(frame_system::config_preludes::TestDefaultConfig)]
impl frame_system::Config for Runtime {
    type Block = frame_system::mocking::MockBlock<Runtime>;
    type AccountId = AccountId;
    type Lookup = IdentityLookup<AccountId>;
}

impl pallet_timestamp::Config for Runtime {
    type Moment = u64;
    type OnTimestampSet = ();
    type MinimumPeriod = ConstU64<1>;
    type WeightInfo = ();
}

impl pallet_operators::Config for Runtime {
    type RuntimeEvent = RuntimeEvent;
    type Time = Timestamp;
    type WeightInfo = ();
}

parameter_types! {
    pub const TokenPalletId: PalletId = PalletId(*b"cfd/fETH");
    pub const CampaignsPalletId: PalletId = PalletId(*b"cfd/camp");
}

impl pallet_confidential_token::Config for Runtime {
    type RuntimeEvent = RuntimeEvent;
    type Fhe = LocalFhe;
    type InputVerifier = Ed25519InputVerifier<LocalInputSigner>;
    type Operators = Operators;
    type Time = Timestamp;
    type MintOrigin = EnsureSigned<AccountId>;
    type PalletId = TokenPalletId;
    type WeightInfo = ();
}

impl pallet_campaigns::Config for Runtime {
    type RuntimeEvent = RuntimeEvent;
    type Fhe = LocalFhe;
    type Ledger = Token;
    type Time = Timestamp;
    type PalletId = CampaignsPalletId;
    type MaxNameLength = ConstU32<256>;
    type WeightInfo = ();
}

construct_runtime!(
    pub enum Runtime {
        System: frame_system,
        Timestamp: pallet_timestamp,
        Operators: pallet_operators,
        Token: pallet_confidential_token,
        Campaigns: pallet_campaigns,
    }
);
