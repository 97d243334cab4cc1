//! Credit Scoring
//!
//! Score update table applied on every repayment and liquidation, and the
//! eligibility rule for borrowing without collateral.

use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};

use crate::constants::credit;
use crate::types::CreditScoreEntry;

/// Classification of a scoring event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub enum ScoreOutcome {
    /// Loan was liquidated
    Default,
    /// Paid after the due time
    Late,
    /// Paid at or before the half point
    Early,
    /// Paid on time, after the half point
    OnTime,
}

impl ScoreOutcome {
    /// Classify a payment. Checked in order: default, late, early, on time.
    ///
    /// The half point is measured from the entry's last update, not the loan start.
    pub fn classify(is_default: bool, payment_time: u64, due_time: u64, last_update_time: u64) -> Self {
        if is_default {
            return Self::Default;
        }
        if payment_time > due_time {
            return Self::Late;
        }

        let last = last_update_time as i128;
        let half_point = last + (due_time as i128 - last) / 2;
        if (payment_time as i128) <= half_point {
            Self::Early
        } else {
            Self::OnTime
        }
    }

    /// Signed score change for this outcome
    pub fn delta(&self) -> i64 {
        let base = credit::SCORE_CHANGE_BASE;
        match self {
            Self::Default => -(base * credit::DEFAULT_MULTIPLIER / 100),
            Self::Late => -(base * credit::LATE_PAYMENT_MULTIPLIER / 100),
            Self::Early => base * credit::EARLY_PAYMENT_MULTIPLIER / 100,
            Self::OnTime => base,
        }
    }

    /// Returns true if the outcome extends the on-time streak
    pub fn is_on_time(&self) -> bool {
        matches!(self, Self::Early | Self::OnTime)
    }
}

/// Result of applying a score update
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoreChange {
    pub outcome: ScoreOutcome,
    pub old_score: u64,
    pub new_score: u64,
}

/// Apply one scoring event to an entry
pub fn apply_score_update(
    entry: &mut CreditScoreEntry,
    payment_time: u64,
    due_time: u64,
    is_default: bool,
    now: u64,
) -> ScoreChange {
    let outcome = ScoreOutcome::classify(is_default, payment_time, due_time, entry.last_update_time);
    let old_score = entry.score;

    let new_score = (old_score.min(credit::MAX_SCORE) as i64)
        .saturating_add(outcome.delta())
        .clamp(credit::MIN_SCORE as i64, credit::MAX_SCORE as i64) as u64;

    entry.score = new_score;
    if outcome.is_on_time() {
        entry.consecutive_on_time_payments = entry.consecutive_on_time_payments.saturating_add(1);
    } else {
        entry.consecutive_on_time_payments = 0;
    }
    if outcome == ScoreOutcome::Default {
        entry.defaulted_loans = entry.defaulted_loans.saturating_add(1);
    }
    entry.total_loans = entry.total_loans.saturating_add(1);
    entry.last_update_time = now;

    ScoreChange { outcome, old_score, new_score }
}

/// Returns true if the identity may borrow without collateral
pub fn is_eligible_for_unsecured(entry: Option<&CreditScoreEntry>) -> bool {
    match entry {
        Some(e) => {
            e.is_active
                && e.score >= credit::MIN_SCORE_FOR_UNSECURED
                && e.consecutive_on_time_payments >= credit::MIN_PAYMENTS_HISTORY
                && e.total_loans >= credit::MIN_CLEAN_LOANS
                && e.defaulted_loans == 0
        }
        None => false,
    }
}
