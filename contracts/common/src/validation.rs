//! Validation Helpers for LendPool
//!
//! Reusable precondition checks shared by every transition.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use lendpool_common::check;
//! use lendpool_common::validation::{require_slot, require_in_range};
//!
//! check!(amount > 0, LendError::ZeroAmount);
//! let index = require_slot(slot, MAX_LOANS)?;
//! ```

use crate::constants::{limits, time};
use crate::errors::{LendError, LendResult};
use crate::math::collateral_required;
use crate::types::{is_empty_key, PubKey};

// ============ Validation Macro ============

/// Check a condition and return an error from the enclosing function if it fails.
///
/// ```rust,ignore
/// check!(
///     collateral >= required,
///     LendError::InsufficientCollateral { provided: collateral, required }
/// );
/// ```
#[macro_export]
macro_rules! check {
    ($condition:expr, $error:expr) => {
        if !($condition) {
            return Err($error);
        }
    };
}

pub use crate::check;

// ============ Slot Checks ============

/// Convert a caller-chosen slot into an index, failing if it is out of range
pub fn require_slot(slot: u64, capacity: usize) -> LendResult<usize> {
    match usize::try_from(slot) {
        Ok(index) if index < capacity => Ok(index),
        _ => Err(LendError::SlotOutOfRange { slot, capacity }),
    }
}

// ============ Amount Checks ============

/// Require a non-zero amount
pub fn require_positive(value: u64) -> LendResult<()> {
    check!(value > 0, LendError::ZeroAmount);
    Ok(())
}

/// Require `min <= value <= max`
pub fn require_in_range(value: u64, min: u64, max: u64) -> LendResult<()> {
    check!(value >= min, LendError::BelowMinimum { amount: value, minimum: min });
    check!(value <= max, LendError::ExceedsMaximum { amount: value, maximum: max });
    Ok(())
}

/// Require supplied funding to cover `required`
pub fn require_sufficient_funds(available: u64, required: u64) -> LendResult<()> {
    check!(available >= required, LendError::InsufficientFunds { available, required });
    Ok(())
}

/// Validate the parameters of a new loan
///
/// Order: principal bounds, duration, then collateral ratio for secured loans.
pub fn require_valid_loan_params(amount: u64, duration: u64, secured: bool, collateral: u64) -> LendResult<()> {
    require_in_range(amount, limits::MIN_LOAN_AMOUNT, limits::MAX_LOAN_AMOUNT)?;
    check!(
        duration >= time::MIN_LOAN_DURATION,
        LendError::DurationTooShort { duration, minimum: time::MIN_LOAN_DURATION }
    );
    if secured {
        let required = collateral_required(amount)?;
        check!(
            collateral >= required,
            LendError::InsufficientCollateral { provided: collateral, required }
        );
    }
    Ok(())
}

// ============ Identity Checks ============

/// Require an identity to not be the empty key
pub fn require_valid_identity(key: &PubKey, param: &'static str) -> LendResult<()> {
    check!(
        !is_empty_key(key),
        LendError::InvalidConfig { param, reason: "identity must not be empty" }
    );
    Ok(())
}
