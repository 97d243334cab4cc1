//! Error Types for LendPool
//!
//! Every rejection carries enough detail for the caller to correct the
//! request and resubmit. Errors are grouped into a small taxonomy
//! (`ErrorKind`) that clients can branch on without matching every variant.

use core::fmt;

use crate::types::{Commitment, PubKey};

/// Result type alias for LendPool operations
pub type LendResult<T> = Result<T, LendError>;

/// Main error enum for all LendPool errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LendError {
    // ============ Authorization Errors ============
    /// Signature does not verify for the required identity
    InvalidSignature { signer: PubKey },

    /// Required identity is not a valid Ed25519 public key
    InvalidPublicKey { key: PubKey },

    /// Only the pool owner can perform this action
    OwnerOnly,

    /// Loan belongs to a different borrower
    BorrowerMismatch { expected: PubKey, actual: PubKey },

    // ============ Range Errors ============
    /// Slot index outside the fixed capacity
    SlotOutOfRange { slot: u64, capacity: usize },

    /// Zero amount not allowed
    ZeroAmount,

    /// Amount below minimum threshold
    BelowMinimum { amount: u64, minimum: u64 },

    /// Amount exceeds maximum allowed
    ExceedsMaximum { amount: u64, maximum: u64 },

    /// Loan duration shorter than allowed
    DurationTooShort { duration: u64, minimum: u64 },

    /// Loan is not yet past due
    NotPastDue { now: u64, due_time: u64 },

    /// Arithmetic overflow occurred
    Overflow,

    /// Arithmetic underflow occurred
    Underflow,

    /// Invalid configuration parameter
    InvalidConfig { param: &'static str, reason: &'static str },

    // ============ State Conflict Errors ============
    /// Slot must be empty for this operation
    SlotOccupied { slot: u64 },

    /// Slot must hold an active loan for this operation
    SlotEmpty { slot: u64 },

    /// Borrower already holds an active loan elsewhere
    ActiveLoanExists { borrower: PubKey, slot: u64 },

    /// Snapshot version does not follow the current one
    StaleSnapshot { current: u64, supplied: u64 },

    // ============ Eligibility Errors ============
    /// Borrower does not meet unsecured lending requirements
    NotEligibleForUnsecured { borrower: PubKey },

    /// Requested amount above the borrower's unsecured limit
    ExceedsUnsecuredLimit { amount: u64, limit: u64 },

    // ============ Funds Errors ============
    /// Supplied funding below the required amount
    InsufficientFunds { available: u64, required: u64 },

    /// Posted collateral below the required ratio
    InsufficientCollateral { provided: u64, required: u64 },

    /// No open deposit large enough to back the collateral
    NoBackingDeposit { collateral: u64 },

    // ============ Commitment Errors ============
    /// Recomputed effect hash differs from the declared commitment
    CommitmentMismatch { declared: Commitment, computed: Commitment },

    // ============ Envelope Errors ============
    /// Request bytes could not be decoded
    InvalidRequest { reason: &'static str },
}

/// Coarse error taxonomy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Missing or invalid signature for the required identity
    Authorization,
    /// Slot index, amount or time outside bounds
    Range,
    /// Slot occupancy mismatch or duplicate active loan
    StateConflict,
    /// Unsecured borrowing requirements unmet
    Eligibility,
    /// Declared funding or collateral below the required amount
    InsufficientFunds,
    /// Effects differ from the declared commitment
    CommitmentMismatch,
    /// Request could not be decoded at all
    Malformed,
}

impl LendError {
    /// Returns a human-readable error code for logging/debugging
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidSignature { .. } => "E001_INVALID_SIGNATURE",
            Self::InvalidPublicKey { .. } => "E002_INVALID_PUBKEY",
            Self::OwnerOnly => "E003_OWNER_ONLY",
            Self::BorrowerMismatch { .. } => "E004_BORROWER_MISMATCH",
            Self::SlotOutOfRange { .. } => "E010_SLOT_OUT_OF_RANGE",
            Self::ZeroAmount => "E011_ZERO_AMOUNT",
            Self::BelowMinimum { .. } => "E012_BELOW_MINIMUM",
            Self::ExceedsMaximum { .. } => "E013_EXCEEDS_MAXIMUM",
            Self::DurationTooShort { .. } => "E014_DURATION_TOO_SHORT",
            Self::NotPastDue { .. } => "E015_NOT_PAST_DUE",
            Self::Overflow => "E016_OVERFLOW",
            Self::Underflow => "E017_UNDERFLOW",
            Self::InvalidConfig { .. } => "E018_INVALID_CONFIG",
            Self::SlotOccupied { .. } => "E020_SLOT_OCCUPIED",
            Self::SlotEmpty { .. } => "E021_SLOT_EMPTY",
            Self::ActiveLoanExists { .. } => "E022_ACTIVE_LOAN_EXISTS",
            Self::StaleSnapshot { .. } => "E023_STALE_SNAPSHOT",
            Self::NotEligibleForUnsecured { .. } => "E030_NOT_ELIGIBLE",
            Self::ExceedsUnsecuredLimit { .. } => "E031_EXCEEDS_UNSECURED_LIMIT",
            Self::InsufficientFunds { .. } => "E040_INSUFFICIENT_FUNDS",
            Self::InsufficientCollateral { .. } => "E041_INSUFFICIENT_COLLATERAL",
            Self::NoBackingDeposit { .. } => "E042_NO_BACKING_DEPOSIT",
            Self::CommitmentMismatch { .. } => "E050_COMMITMENT_MISMATCH",
            Self::InvalidRequest { .. } => "E060_INVALID_REQUEST",
        }
    }

    /// Taxonomy bucket of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidSignature { .. }
            | Self::InvalidPublicKey { .. }
            | Self::OwnerOnly
            | Self::BorrowerMismatch { .. } => ErrorKind::Authorization,

            Self::SlotOutOfRange { .. }
            | Self::ZeroAmount
            | Self::BelowMinimum { .. }
            | Self::ExceedsMaximum { .. }
            | Self::DurationTooShort { .. }
            | Self::NotPastDue { .. }
            | Self::Overflow
            | Self::Underflow
            | Self::InvalidConfig { .. } => ErrorKind::Range,

            Self::SlotOccupied { .. }
            | Self::SlotEmpty { .. }
            | Self::ActiveLoanExists { .. }
            | Self::StaleSnapshot { .. } => ErrorKind::StateConflict,

            Self::NotEligibleForUnsecured { .. }
            | Self::ExceedsUnsecuredLimit { .. } => ErrorKind::Eligibility,

            Self::InsufficientFunds { .. }
            | Self::InsufficientCollateral { .. }
            | Self::NoBackingDeposit { .. } => ErrorKind::InsufficientFunds,

            Self::CommitmentMismatch { .. } => ErrorKind::CommitmentMismatch,

            Self::InvalidRequest { .. } => ErrorKind::Malformed,
        }
    }

    /// Returns true if the caller can fix the request and resubmit
    /// against the same state
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::CommitmentMismatch { .. } => true, // Recompute the commitment
            Self::InsufficientFunds { .. } => true,  // Attach more funds
            Self::InsufficientCollateral { .. } => true, // Post more collateral
            Self::SlotOccupied { .. } => true,       // Pick another slot
            Self::NotPastDue { .. } => true,         // Wait for due time
            _ => false,
        }
    }
}

impl fmt::Display for LendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: ", self.code())?;
        match self {
            Self::InvalidSignature { .. } => write!(f, "signature does not verify for the required identity"),
            Self::InvalidPublicKey { .. } => write!(f, "identity is not a valid ed25519 key"),
            Self::OwnerOnly => write!(f, "only the pool owner can perform this action"),
            Self::BorrowerMismatch { .. } => write!(f, "loan belongs to a different borrower"),
            Self::SlotOutOfRange { slot, capacity } => write!(f, "slot {slot} outside capacity {capacity}"),
            Self::ZeroAmount => write!(f, "amount must be positive"),
            Self::BelowMinimum { amount, minimum } => write!(f, "amount {amount} below minimum {minimum}"),
            Self::ExceedsMaximum { amount, maximum } => write!(f, "amount {amount} above maximum {maximum}"),
            Self::DurationTooShort { duration, minimum } => {
                write!(f, "duration {duration}s shorter than {minimum}s")
            }
            Self::NotPastDue { now, due_time } => write!(f, "loan due at {due_time}, now is {now}"),
            Self::Overflow => write!(f, "arithmetic overflow"),
            Self::Underflow => write!(f, "arithmetic underflow"),
            Self::InvalidConfig { param, reason } => write!(f, "{param}: {reason}"),
            Self::SlotOccupied { slot } => write!(f, "slot {slot} is not empty"),
            Self::SlotEmpty { slot } => write!(f, "slot {slot} holds no active loan"),
            Self::ActiveLoanExists { slot, .. } => write!(f, "borrower already has an active loan in slot {slot}"),
            Self::StaleSnapshot { current, supplied } => {
                write!(f, "snapshot version {supplied} does not follow {current}")
            }
            Self::NotEligibleForUnsecured { .. } => write!(f, "borrower not eligible for unsecured loan"),
            Self::ExceedsUnsecuredLimit { amount, limit } => {
                write!(f, "amount {amount} above unsecured limit {limit}")
            }
            Self::InsufficientFunds { available, required } => {
                write!(f, "funding {available} below required {required}")
            }
            Self::InsufficientCollateral { provided, required } => {
                write!(f, "collateral {provided} below required {required}")
            }
            Self::NoBackingDeposit { collateral } => {
                write!(f, "no open deposit covers collateral {collateral}")
            }
            Self::CommitmentMismatch { .. } => write!(f, "declared effects do not match recomputed effects"),
            Self::InvalidRequest { reason } => write!(f, "invalid request: {reason}"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for LendError {}
