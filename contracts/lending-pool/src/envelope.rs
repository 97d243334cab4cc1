//! Request Envelope
//!
//! CBOR encoding of a signed action together with its execution context, so
//! a host can hand raw request bytes straight to the ledger.

use serde::{Deserialize, Serialize};

use lendpool_common::{
    auth::PoolSigner,
    errors::{LendError, LendResult},
    types::{PoolAction, SignatureBytes, StateDigest},
};

use crate::engine::ExecutionContext;

/// A signed action and the context it runs under
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedRequest {
    pub action: PoolAction,
    pub signature: SignatureBytes,
    pub context: ExecutionContext,
}

impl SignedRequest {
    /// Sign `action` against the state with `pre_state_digest`
    pub fn sign(
        signer: &PoolSigner,
        action: PoolAction,
        pre_state_digest: &StateDigest,
        context: ExecutionContext,
    ) -> LendResult<Self> {
        let signature = signer.sign_action(&action, pre_state_digest)?;
        Ok(Self { action, signature, context })
    }

    pub fn to_cbor(&self) -> LendResult<Vec<u8>> {
        let mut bytes = Vec::new();
        ciborium::ser::into_writer(self, &mut bytes)
            .map_err(|_| LendError::InvalidRequest { reason: "request not encodable" })?;
        Ok(bytes)
    }

    /// # Errors
    /// Returns `LendError::InvalidRequest` for bytes that are not a request.
    pub fn from_cbor(bytes: &[u8]) -> LendResult<Self> {
        ciborium::de::from_reader(bytes).map_err(|e| {
            tracing::debug!(error = %e, "undecodable request");
            LendError::InvalidRequest { reason: "malformed cbor" }
        })
    }
}
