//! Core Types for LendPool
//!
//! Identities, the three record kinds held by the pool, and the actions
//! that mutate them.

use core::fmt;

use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};

use crate::constants::{credit, time};

/// Ed25519 public key identifying an owner, borrower or depositor
pub type PubKey = [u8; 32];

/// Payout destination (SHA-256 of a public key)
pub type Address = [u8; 32];

/// Digest of a canonical state serialization
pub type StateDigest = [u8; 32];

/// Identity of cleared slots
pub const EMPTY_KEY: PubKey = [0u8; 32];

/// Derive the payout address controlled by a public key
pub fn address_of(key: &PubKey) -> Address {
    Sha256::digest(key).into()
}

/// Returns true for the all-zero identity
pub fn is_empty_key(key: &PubKey) -> bool {
    *key == EMPTY_KEY
}

// ============ Commitment ============

/// Hash over an ordered set of fund movements
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub struct Commitment(pub [u8; 32]);

impl fmt::Debug for Commitment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Commitment(")?;
        for byte in &self.0[..4] {
            write!(f, "{byte:02x}")?;
        }
        write!(f, "..)")
    }
}

// ============ Signature ============

/// Raw 64-byte Ed25519 signature
#[derive(Clone, Copy, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct SignatureBytes(pub [u8; 64]);

impl SignatureBytes {
    pub fn to_bytes(&self) -> [u8; 64] {
        self.0
    }
}

impl fmt::Debug for SignatureBytes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SignatureBytes(")?;
        for byte in &self.0[..4] {
            write!(f, "{byte:02x}")?;
        }
        write!(f, "..)")
    }
}

// serde has no impls for arrays longer than 32, so signatures travel as a byte string
impl Serialize for SignatureBytes {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_bytes(&self.0)
    }
}

impl<'de> Deserialize<'de> for SignatureBytes {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct SignatureVisitor;

        impl<'de> serde::de::Visitor<'de> for SignatureVisitor {
            type Value = SignatureBytes;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "64 signature bytes")
            }

            fn visit_bytes<E: serde::de::Error>(self, v: &[u8]) -> Result<Self::Value, E> {
                let bytes: [u8; 64] = v
                    .try_into()
                    .map_err(|_| E::invalid_length(v.len(), &self))?;
                Ok(SignatureBytes(bytes))
            }

            fn visit_seq<A: serde::de::SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
                let mut bytes = [0u8; 64];
                for (i, slot) in bytes.iter_mut().enumerate() {
                    *slot = seq
                        .next_element()?
                        .ok_or_else(|| serde::de::Error::invalid_length(i, &self))?;
                }
                Ok(SignatureBytes(bytes))
            }
        }

        deserializer.deserialize_bytes(SignatureVisitor)
    }
}

// ============ Loan Records ============

/// A loan slot. `amount == 0` marks the slot empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub struct LoanRecord {
    /// Borrowing identity
    pub borrower: PubKey,
    /// Principal in satoshis
    pub amount: u64,
    /// Posted collateral in satoshis (0 for unsecured loans)
    pub collateral_amount: u64,
    /// Annual interest rate in basis points
    pub interest_rate_bps: u64,
    /// Time the loan was opened
    pub start_time: u64,
    /// Loan duration in seconds
    pub duration: u64,
    /// Backed by collateral
    pub is_secured: bool,
    /// Sum of payments so far
    pub repaid_amount: u64,
    /// Time of the most recent payment
    pub last_payment_time: u64,
}

impl LoanRecord {
    /// Returns true if the slot holds no loan
    pub fn is_empty(&self) -> bool {
        self.amount == 0
    }

    /// Time after which the loan is overdue
    pub fn due_time(&self) -> u64 {
        self.start_time.saturating_add(self.duration)
    }

    /// Returns true once `now` is strictly past the due time
    pub fn is_overdue(&self, now: u64) -> bool {
        now > self.due_time()
    }
}

// ============ Deposit Records ============

/// A deposit slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub struct DepositRecord {
    /// Deposited satoshis
    pub amount: u64,
    /// Time of deposit
    pub deposit_time: u64,
    /// End of the lock-in period
    pub lock_in_end_time: u64,
    /// Yield owed at the end of the lock-in period
    pub expected_interest: u64,
    /// Set once the deposit has been withdrawn
    pub withdrawn: bool,
}

impl DepositRecord {
    /// Returns true if the slot was never written
    pub fn is_empty(&self) -> bool {
        self.amount == 0
    }

    /// Returns true once the lock-in period has elapsed
    pub fn is_matured(&self, now: u64) -> bool {
        !self.is_empty() && now >= self.lock_in_end_time
    }

    /// Lock-in end for a deposit made at `now`
    pub fn lock_in_end(now: u64) -> u64 {
        now.saturating_add(time::LOCK_IN_PERIOD)
    }
}

// ============ Credit Scores ============

/// Per-identity credit history
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub struct CreditScoreEntry {
    /// Identity this entry scores
    pub owner: PubKey,
    /// Score in [0, 1000]
    pub score: u64,
    /// On-time payments since the last late payment or default
    pub consecutive_on_time_payments: u64,
    /// Number of scoring events (repayments and defaults)
    pub total_loans: u64,
    /// Number of defaults
    pub defaulted_loans: u64,
    /// Time of the last score change
    pub last_update_time: u64,
    /// Slot in use
    pub is_active: bool,
}

impl CreditScoreEntry {
    /// Fresh entry for a newly seen identity
    pub fn new(owner: PubKey, now: u64) -> Self {
        Self {
            owner,
            score: credit::INITIAL_SCORE,
            consecutive_on_time_payments: 0,
            total_loans: 0,
            defaulted_loans: 0,
            last_update_time: now,
            is_active: true,
        }
    }
}

// ============ Actions ============

/// A signed request to mutate the pool
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub enum PoolAction {
    /// Lock funds into a deposit slot
    Deposit {
        slot: u64,
        depositor: PubKey,
        amount: u64,
    },
    /// Open a loan in an empty slot
    Borrow {
        slot: u64,
        borrower: PubKey,
        amount: u64,
        duration: u64,
        secured: bool,
        collateral: u64,
    },
    /// Pay toward an open loan
    Repay {
        slot: u64,
        borrower: PubKey,
        payment: u64,
    },
    /// Seize an overdue loan (owner only)
    Liquidate {
        slot: u64,
    },
    /// Pay a repayment reward to a borrower
    DistributeRewards {
        slot: u64,
        borrower: PubKey,
    },
}

impl PoolAction {
    /// Slot index the action targets
    pub fn slot(&self) -> u64 {
        match self {
            Self::Deposit { slot, .. }
            | Self::Borrow { slot, .. }
            | Self::Repay { slot, .. }
            | Self::Liquidate { slot }
            | Self::DistributeRewards { slot, .. } => *slot,
        }
    }

    /// Short operation name for logs
    pub fn name(&self) -> &'static str {
        match self {
            Self::Deposit { .. } => "deposit",
            Self::Borrow { .. } => "borrow",
            Self::Repay { .. } => "repay",
            Self::Liquidate { .. } => "liquidate",
            Self::DistributeRewards { .. } => "distribute_rewards",
        }
    }
}
