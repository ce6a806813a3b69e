//! # user-decryption
//!
//! Off-ledger protocol that lets an entitled party read an encrypted amount
//! without any plaintext touching the ledger.
//!
//! 1. The requester generates an [`EphemeralKeypair`] for this request only.
//! 2. It builds a [`UserDecryptAttestation`] naming the ephemeral public key,
//!    the contracts it targets, a start timestamp and a validity in days, and
//!    signs its typed digest ([`eip712`]) with its long-term sr25519 key.
//! 3. The [`DecryptionService`] checks the signature, the time window, the
//!    contract scope, and that the requester is in the access set of every
//!    handle as derived from current ledger state ([`AclSource`]).
//! 4. On success each value is sealed to the ephemeral key; on any failure the
//!    whole request fails with [`DecryptionError::AccessDenied`].
//! 5. The requester opens the values and formats them with [`format_amount`].
//!
//! The service never mutates ledger state, so repeating a still-valid request
//! yields the same plaintexts.

pub mod amount;
pub mod client;
pub mod config;
pub mod eip712;
pub mod keys;
pub mod request;
pub mod service;

use thiserror::Error;

pub use amount::{format_amount, parse_amount, AmountError};
pub use client::{build_request, DecryptionClient};
pub use config::ServiceConfig;
pub use eip712::{Domain, UserDecryptAttestation};
pub use keys::{EphemeralKeypair, SealedValue};
pub use request::{HandleContractPair, UserDecryptRequest, UserDecryptResponse};
pub use service::{AclSource, Clock, DecryptionService, KeyManagement, LocalKms, Relayer, SystemClock};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DecryptionError {
    /// Signature, window, scope or access-set check failed.
    #[error("access denied")]
    AccessDenied,
    #[error("key management unavailable")]
    KeyManagement,
    #[error("failed to seal response")]
    Seal,
    #[error("response could not be opened")]
    InvalidResponse,
    #[error("relayer timed out")]
    Timeout,
    #[error("invalid configuration: {0}")]
    Config(String),
}
