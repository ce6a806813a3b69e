use crate::pallet as pallet_campaigns;
use fhe_coprocessor::{EncryptedInput, LocalFhe, LocalInputSigner};
use frame_support::{
    assert_ok, construct_runtime, derive_impl, parameter_types,
    traits::{ConstU32, ConstU64},
    PalletId,
};
use frame_system::EnsureSigned;
use fundraising_primitives::{CiphertextHandle, Ed25519InputVerifier, InputBinding};
use sp_runtime::BuildStorage;

pub type AccountId = u64;
pub const CREATOR: AccountId = 1;
pub const ALICE: AccountId = 2;
pub const BOB: AccountId = 3;
pub const MALLORY: AccountId = 4;

pub const GENESIS: u64 = 1_700_000_000;

#[derive_impl(frame_system::config_preludes::TestDefaultConfig)]
impl frame_system::Config for Runtime {
    type Block = frame_system::mocking::MockBlock<Runtime>;
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
    type MaxNameLength = ConstU32<64>;
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

pub fn new_test_ext() -> sp_io::TestExternalities {
    LocalFhe::reset();
    let t = frame_system::GenesisConfig::<Runtime>::default()
        .build_storage()
        .unwrap();
    let mut ext = sp_io::TestExternalities::new(t);
    ext.execute_with(|| {
        System::set_block_number(1);
        set_now(GENESIS);
    });
    ext
}

pub fn set_now(secs: u64) {
    Timestamp::set_timestamp(secs * 1_000);
}

pub fn now() -> u64 {
    Timestamp::get() / 1_000
}

/// Encrypt `value` for the registry as spender on the token.
pub fn input(value: u64) -> EncryptedInput {
    LocalFhe::encrypt_input(
        value,
        &InputBinding::new(Token::account_id(), Campaigns::account_id()),
    )
    .expect("encrypt input")
}

pub fn reveal(handle: &CiphertextHandle) -> u64 {
    LocalFhe::reveal(handle).expect("known handle")
}

/// Fund `who`, grant the registry operator rights until `until`.
pub fn fund_and_grant(who: AccountId, amount: u64, until: u64) {
    assert_ok!(Token::mint(RuntimeOrigin::signed(who), who, amount));
    assert_ok!(Operators::set_operator(
        RuntimeOrigin::signed(who),
        Campaigns::account_id(),
        until
    ));
}

pub fn create(target: u64, end_at: u64) -> u64 {
    assert_ok!(Campaigns::create_campaign(
        RuntimeOrigin::signed(CREATOR),
        b"Clean water".to_vec(),
        target,
        end_at
    ));
    Campaigns::campaign_count()
}

pub fn contribute(who: AccountId, campaign_id: u64, value: u64) -> frame_support::dispatch::DispatchResult {
    let amount = input(value);
    Campaigns::contribute(RuntimeOrigin::signed(who), campaign_id, amount.handle, amount.proof)
}
