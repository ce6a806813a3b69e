use crate::pallet as pallet_confidential_token;
use fhe_coprocessor::{EncryptedInput, LocalFhe, LocalInputSigner};
use frame_support::{construct_runtime, derive_impl, parameter_types, traits::ConstU64, PalletId};
use frame_system::EnsureSigned;
use fundraising_primitives::{CiphertextHandle, Ed25519InputVerifier, InputBinding};
use sp_runtime::BuildStorage;

pub type AccountId = u64;
pub const ALICE: AccountId = 1;
pub const BOB: AccountId = 2;
pub const CHARLIE: AccountId = 3;

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

construct_runtime!(
    pub enum Runtime {
        System: frame_system,
        Timestamp: pallet_timestamp,
        Operators: pallet_operators,
        Token: pallet_confidential_token,
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

/// Encrypt `value` for `spender` on this token.
pub fn input(value: u64, spender: AccountId) -> EncryptedInput {
    LocalFhe::encrypt_input(value, &InputBinding::new(Token::account_id(), spender))
        .expect("encrypt input")
}

pub fn reveal(handle: &CiphertextHandle) -> u64 {
    LocalFhe::reveal(handle).expect("known handle")
}
