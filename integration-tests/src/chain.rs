//! Chain state shared by the test driver and the decryption service.

use std::cell::RefCell;

use anyhow::{anyhow, Result};
use fhe_coprocessor::{EncryptedInput, LocalFhe};
use fundraising_primitives::{CiphertextHandle, HandleContext, InputBinding};
use sp_runtime::{AccountId32, BuildStorage, DispatchResult};
use user_decryption::{AclSource, Clock};

use crate::runtime::{Campaigns, Runtime, System, Timestamp, Token};

pub struct ChainView {
    ext: RefCell<sp_io::TestExternalities>,
}

impl ChainView {
    /// Fresh genesis state with the wall clock at `now` (unix seconds) and
    /// an empty coprocessor.
    pub fn new(now: u64) -> Result<Self> {
        LocalFhe::reset();
        let storage = frame_system::GenesisConfig::<Runtime>::default()
            .build_storage()
            .map_err(|e| anyhow!("genesis: {e}"))?;
        let mut ext = sp_io::TestExternalities::new(storage);
        ext.execute_with(|| {
            System::set_block_number(1);
            Timestamp::set_timestamp(now * 1_000);
        });
        Ok(Self {
            ext: RefCell::new(ext),
        })
    }

    pub fn execute_with<R>(&self, f: impl FnOnce() -> R) -> R {
        self.ext.borrow_mut().execute_with(f)
    }

    /// Run a dispatchable, mapping its error into `anyhow`.
    pub fn dispatch(&self, f: impl FnOnce() -> DispatchResult) -> Result<()> {
        self.execute_with(f).map_err(|e| anyhow!("dispatch failed: {e:?}"))
    }

    pub fn set_now(&self, now: u64) {
        self.execute_with(|| Timestamp::set_timestamp(now * 1_000));
    }

    pub fn token(&self) -> AccountId32 {
        self.execute_with(Token::account_id)
    }

    pub fn registry(&self) -> AccountId32 {
        self.execute_with(Campaigns::account_id)
    }

    /// Encrypt `value` so the registry can spend it on the token.
    pub fn contribution_input(&self, value: u64) -> Result<EncryptedInput> {
        let binding = InputBinding::new(self.token(), self.registry());
        LocalFhe::encrypt_input(value, &binding).map_err(|e| anyhow!("encrypt input: {e}"))
    }
}

impl Clock for ChainView {
    fn now(&self) -> u64 {
        self.execute_with(|| Timestamp::get() / 1_000)
    }
}

impl AclSource for ChainView {
    fn handle_context(
        &self,
        contract: &AccountId32,
        handle: &CiphertextHandle,
    ) -> Option<HandleContext<AccountId32>> {
        self.execute_with(|| {
            if *contract == Campaigns::account_id() {
                Campaigns::handle_context(handle)
            } else if *contract == Token::account_id() {
                Token::handle_context(handle)
            } else {
                None
            }
        })
    }
}
