//! Relayer-side decryption service.
//!
//! Authorizes a [`UserDecryptRequest`] against current ledger state and, only
//! if every check passes for every pair, re-encrypts the plaintexts to the
//! requester's ephemeral key. Requesters learn nothing about which check
//! failed; the reason is logged at `debug` inside the service.

use std::{
    future::Future,
    time::{SystemTime, UNIX_EPOCH},
};

use sp_core::{crypto::AccountId32, sr25519, Pair};

use fhe_coprocessor::LocalFhe;
use fundraising_primitives::{CiphertextHandle, HandleContext};

use crate::{
    config::ServiceConfig,
    eip712::Domain,
    keys::ResponseSealer,
    request::{UserDecryptRequest, UserDecryptResponse},
    DecryptionError,
};

const SECONDS_PER_DAY: u64 = 86_400;

/// Unix-seconds wall clock.
pub trait Clock {
    fn now(&self) -> u64;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default()
    }
}

impl<T: Clock + ?Sized> Clock for &T {
    fn now(&self) -> u64 {
        (**self).now()
    }
}

/// Resolves a handle to the business context it currently belongs to under `contract`.
pub trait AclSource {
    fn handle_context(
        &self,
        contract: &AccountId32,
        handle: &CiphertextHandle,
    ) -> Option<HandleContext<AccountId32>>;
}

impl<T: AclSource + ?Sized> AclSource for &T {
    fn handle_context(
        &self,
        contract: &AccountId32,
        handle: &CiphertextHandle,
    ) -> Option<HandleContext<AccountId32>> {
        (**self).handle_context(contract, handle)
    }
}

/// Key-management side: opens handles for an already authorized request.
pub trait KeyManagement {
    fn decrypt(&self, handle: &CiphertextHandle) -> Result<u64, DecryptionError>;
}

/// Key management backed by the process-local coprocessor.
pub struct LocalKms;

impl KeyManagement for LocalKms {
    fn decrypt(&self, handle: &CiphertextHandle) -> Result<u64, DecryptionError> {
        LocalFhe::reveal(handle).map_err(|e| {
            tracing::warn!(error = %e, "key management could not open handle");
            DecryptionError::KeyManagement
        })
    }
}

/// Transport to a decryption service.
pub trait Relayer {
    fn user_decrypt(
        &self,
        request: UserDecryptRequest,
    ) -> impl Future<Output = Result<UserDecryptResponse, DecryptionError>>;
}

/// Why a request was refused. Internal only.
#[derive(Debug, PartialEq, Eq)]
enum Denied {
    EmptyRequest,
    TooManyHandles,
    DurationOutOfBounds,
    BadSignature,
    OutsideWindow,
    ContractNotAttested,
    UnknownHandle,
    NotInAccessSet,
}

pub struct DecryptionService<A, K, C = SystemClock> {
    config: ServiceConfig,
    domain: Domain,
    acl: A,
    kms: K,
    clock: C,
}

impl<A: AclSource, K: KeyManagement, C: Clock> DecryptionService<A, K, C> {
    pub fn new(config: ServiceConfig, acl: A, kms: K, clock: C) -> Self {
        let domain = config.domain();
        Self {
            config,
            domain,
            acl,
            kms,
            clock,
        }
    }

    pub fn domain(&self) -> &Domain {
        &self.domain
    }

    pub fn acl(&self) -> &A {
        &self.acl
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    fn authorize(&self, request: &UserDecryptRequest) -> Result<(), Denied> {
        let attestation = &request.attestation;

        if request.pairs.is_empty() {
            return Err(Denied::EmptyRequest);
        }
        if request.pairs.len() > self.config.max_handles {
            return Err(Denied::TooManyHandles);
        }
        if attestation.duration_days == 0
            || attestation.duration_days > self.config.max_duration_days
        {
            return Err(Denied::DurationOutOfBounds);
        }

        let digest = attestation.signing_digest(&self.domain);
        let signer = sr25519::Public::from_raw(request.user.clone().into());
        if !sr25519::Pair::verify(&request.signature, digest, &signer) {
            return Err(Denied::BadSignature);
        }

        let now = self.clock.now();
        let end = attestation
            .duration_days
            .checked_mul(SECONDS_PER_DAY)
            .and_then(|span| attestation.start_timestamp.checked_add(span))
            .ok_or(Denied::OutsideWindow)?;
        if now < attestation.start_timestamp || now >= end {
            return Err(Denied::OutsideWindow);
        }

        for pair in &request.pairs {
            if !attestation.contract_addresses.contains(&pair.contract) {
                return Err(Denied::ContractNotAttested);
            }
            let context = self
                .acl
                .handle_context(&pair.contract, &pair.handle)
                .ok_or(Denied::UnknownHandle)?;
            if !context.grants(&request.user) {
                return Err(Denied::NotInAccessSet);
            }
        }
        Ok(())
    }

    /// Serve a request: all pairs or nothing.
    pub async fn user_decrypt(
        &self,
        request: UserDecryptRequest,
    ) -> Result<UserDecryptResponse, DecryptionError> {
        if let Err(reason) = self.authorize(&request) {
            tracing::debug!(user = %request.user, ?reason, "user decryption denied");
            return Err(DecryptionError::AccessDenied);
        }

        let sealer = ResponseSealer::new(&request.attestation.public_key);
        let values = request
            .pairs
            .iter()
            .map(|pair| {
                let value = self.kms.decrypt(&pair.handle)?;
                sealer.seal(pair.handle, value)
            })
            .collect::<Result<Vec<_>, _>>()?;

        tracing::info!(user = %request.user, handles = values.len(), "user decryption served");
        Ok(UserDecryptResponse {
            service_public_key: sealer.public_key(),
            values,
        })
    }
}

impl<A: AclSource, K: KeyManagement, C: Clock> Relayer for DecryptionService<A, K, C> {
    async fn user_decrypt(
        &self,
        request: UserDecryptRequest,
    ) -> Result<UserDecryptResponse, DecryptionError> {
        DecryptionService::user_decrypt(self, request).await
    }
}
