//! Effect Commitments
//!
//! A transition's fund movements are collected in order into an
//! [`EffectSet`], serialized with borsh and hashed with double SHA-256.
//! The transition is only accepted when that hash equals the commitment
//! declared by the caller.

use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::errors::{LendError, LendResult};
use crate::math::safe_add;
use crate::types::{Address, Commitment, StateDigest};
use crate::Vec;

/// Double SHA-256
pub fn hash256(bytes: &[u8]) -> [u8; 32] {
    let first = Sha256::digest(bytes);
    Sha256::digest(first).into()
}

/// Change returned to the caller, supplied by the execution context
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub struct ChangeOutput {
    pub recipient: Address,
    pub value: u64,
}

/// One fund movement implied by a transition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub enum FundMovement {
    /// Value kept by the pool, tagged with the digest of the new state
    PoolRetention { value: u64, state_digest: StateDigest },
    /// Value paid to a counterparty
    Payout { recipient: Address, value: u64 },
    /// Change back to the caller
    Change { recipient: Address, value: u64 },
}

impl FundMovement {
    pub fn value(&self) -> u64 {
        match self {
            Self::PoolRetention { value, .. } | Self::Payout { value, .. } | Self::Change { value, .. } => *value,
        }
    }
}

/// Ordered fund movements: retention first, then payouts, then change
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub struct EffectSet {
    movements: Vec<FundMovement>,
}

impl EffectSet {
    /// Start a set with the pool's retained value
    pub fn retain(value: u64, state_digest: StateDigest) -> Self {
        let mut movements = Vec::new();
        movements.push(FundMovement::PoolRetention { value, state_digest });
        Self { movements }
    }

    /// Append a payout
    pub fn pay(mut self, recipient: Address, value: u64) -> Self {
        self.movements.push(FundMovement::Payout { recipient, value });
        self
    }

    /// Append change if the context supplied one
    pub fn with_change(mut self, change: Option<ChangeOutput>) -> Self {
        if let Some(c) = change {
            self.movements.push(FundMovement::Change { recipient: c.recipient, value: c.value });
        }
        self
    }

    pub fn movements(&self) -> &[FundMovement] {
        &self.movements
    }

    /// Value retained by the pool
    pub fn retained(&self) -> u64 {
        self.movements
            .iter()
            .find(|m| matches!(m, FundMovement::PoolRetention { .. }))
            .map_or(0, FundMovement::value)
    }

    /// Sum of payouts to counterparties
    pub fn total_paid_out(&self) -> LendResult<u64> {
        self.movements
            .iter()
            .filter(|m| matches!(m, FundMovement::Payout { .. }))
            .try_fold(0u64, |acc, m| safe_add(acc, m.value()))
    }

    /// Canonical bytes that are hashed
    pub fn to_bytes(&self) -> LendResult<Vec<u8>> {
        borsh::to_vec(self).map_err(|_| LendError::InvalidRequest { reason: "effects not serializable" })
    }

    /// hash256 of the canonical bytes
    pub fn commitment(&self) -> LendResult<Commitment> {
        Ok(Commitment(hash256(&self.to_bytes()?)))
    }

    /// Recompute the commitment and compare it with the declared one
    pub fn verify(&self, declared: &Commitment) -> LendResult<Commitment> {
        let computed = self.commitment()?;
        if computed != *declared {
            return Err(LendError::CommitmentMismatch { declared: *declared, computed });
        }
        Ok(computed)
    }
}
