//! End-to-end tests for confidential fundraising.
//!
//! Composes the operators, confidential token and campaigns pallets into one
//! runtime over sr25519 `AccountId32` identities, backed by the process-local
//! coprocessor, and serves user decryption from the resulting chain state.
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p integration-tests
//!
//! # Run with logging
//! RUST_LOG=debug cargo test -p integration-tests -- --nocapture
//! ```

pub mod chain;
pub mod runtime;

pub use chain::ChainView;

/// Install a `tracing` subscriber honoring `RUST_LOG`. Safe to call repeatedly.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Test accounts with well-known sr25519 keys.
pub mod test_accounts {
    use sp_keyring::Sr25519Keyring;

    pub const CREATOR: Sr25519Keyring = Sr25519Keyring::Alice;
    pub const CONTRIBUTOR: Sr25519Keyring = Sr25519Keyring::Bob;
    pub const OTHER_CONTRIBUTOR: Sr25519Keyring = Sr25519Keyring::Charlie;
    pub const OUTSIDER: Sr25519Keyring = Sr25519Keyring::Dave;
}
