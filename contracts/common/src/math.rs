//! Mathematical Utilities for LendPool
//!
//! Interest, penalty, yield, limit and reward arithmetic. Inputs are `u64`,
//! intermediates are widened to `u128`, every division floors.

use crate::constants::{credit, limits, rates, rewards, time};
use crate::errors::{LendError, LendResult};
use crate::types::{CreditScoreEntry, LoanRecord};

/// Yield owed on a deposit at the end of its lock-in period
///
/// expected = amount × APY × lock_weeks / (52 × 100)
pub fn deposit_interest(amount: u64) -> LendResult<u64> {
    let numerator = safe_mul(amount, rates::DEPOSIT_APY_PERCENT)?
        .checked_mul(time::LOCK_IN_WEEKS as u128)
        .ok_or(LendError::Overflow)?;
    let denominator = (time::WEEKS_IN_YEAR * rates::PERCENT_DENOMINATOR) as u128;

    to_u64(numerator / denominator)
}

/// Interest accrued on `principal` between `start_time` and `now`
///
/// interest = principal × rate_bps × elapsed / (365 days × 10_000)
pub fn loan_interest(principal: u64, rate_bps: u64, start_time: u64, now: u64) -> LendResult<u64> {
    let elapsed = now.saturating_sub(start_time);
    let numerator = safe_mul(principal, rate_bps)?
        .checked_mul(elapsed as u128)
        .ok_or(LendError::Overflow)?;
    let denominator =
        (time::DAYS_IN_YEAR * time::SECONDS_IN_DAY) as u128 * rates::BPS_DENOMINATOR as u128;

    to_u64(numerator / denominator)
}

/// Late penalty, charged per whole day past `due_time` up to a cap
pub fn late_penalty(principal: u64, due_time: u64, now: u64) -> LendResult<u64> {
    if now <= due_time {
        return Ok(0);
    }

    let days_late = ((now - due_time) / time::SECONDS_IN_DAY).min(rates::MAX_PENALTY_DAYS);
    let penalty = safe_mul(principal, rates::DAILY_PENALTY_BPS)?
        .checked_mul(days_late as u128)
        .ok_or(LendError::Overflow)?
        / rates::BPS_DENOMINATOR as u128;

    to_u64(penalty)
}

/// Principal plus accrued interest plus any late penalty at `now`
pub fn total_due(loan: &LoanRecord, now: u64) -> LendResult<u64> {
    let interest = loan_interest(loan.amount, loan.interest_rate_bps, loan.start_time, now)?;
    let due = safe_add(loan.amount, interest)?;

    if loan.is_overdue(now) {
        safe_add(due, late_penalty(loan.amount, loan.due_time(), now)?)
    } else {
        Ok(due)
    }
}

/// Collateral needed to secure `amount` (150%)
pub fn collateral_required(amount: u64) -> LendResult<u64> {
    let required = safe_mul(amount, rates::COLLATERAL_RATIO)? / rates::PERCENT_DENOMINATOR as u128;
    to_u64(required)
}

/// Annual rate charged for a new loan
pub fn interest_rate_for(secured: bool) -> u64 {
    if secured {
        rates::SECURED_INTEREST_BPS
    } else {
        rates::UNSECURED_INTEREST_BPS
    }
}

/// Maximum unsecured principal for an identity
///
/// limit = MIN_LOAN × ((score − 550)/100 + 1) × (consecutive/5 + 1), capped at MAX_LOAN
pub fn unsecured_limit(entry: &CreditScoreEntry) -> LendResult<u64> {
    let score_factor =
        entry.score.saturating_sub(credit::MIN_SCORE_FOR_UNSECURED) / credit::SCORE_STEP + 1;
    let history_factor = entry.consecutive_on_time_payments / credit::HISTORY_STEP + 1;

    let limit = safe_mul(limits::MIN_LOAN_AMOUNT, score_factor)?
        .checked_mul(history_factor as u128)
        .ok_or(LendError::Overflow)?;

    Ok(limit.min(limits::MAX_LOAN_AMOUNT as u128) as u64)
}

/// Bonus (percent) for paying ahead of the due time
///
/// Not clamped: loans more than one window from due earn more than 50.
pub fn early_bonus(due_time: u64, now: u64) -> LendResult<u64> {
    if due_time <= now {
        return Ok(0);
    }
    let bonus = safe_mul(due_time - now, rewards::EARLY_BONUS_SCALE)? / rewards::EARLY_BONUS_WINDOW as u128;
    to_u64(bonus)
}

/// Reward paid for a loan
///
/// reward = amount × base_rate × (100 + early + full) / 10_000, capped per payment
pub fn reward(
    loan_amount: u64,
    base_reward_rate: u64,
    due_time: u64,
    now: u64,
    is_full_repayment: bool,
) -> LendResult<u64> {
    let mut bonus = safe_add(rewards::BASE_BONUS, early_bonus(due_time, now)?)?;
    if is_full_repayment {
        bonus = safe_add(bonus, rewards::FULL_REPAYMENT_BONUS)?;
    }

    let reward = safe_mul(loan_amount, base_reward_rate)?
        .checked_mul(bonus as u128)
        .ok_or(LendError::Overflow)?
        / rates::BPS_DENOMINATOR as u128;

    Ok(reward.min(rewards::MAX_REWARD_PER_PAYMENT as u128) as u64)
}

// ============ Safe Math ============

/// Safe addition with overflow check
pub fn safe_add(a: u64, b: u64) -> LendResult<u64> {
    a.checked_add(b).ok_or(LendError::Overflow)
}

/// Safe subtraction with underflow check
pub fn safe_sub(a: u64, b: u64) -> LendResult<u64> {
    a.checked_sub(b).ok_or(LendError::Underflow)
}

/// Widening multiplication
pub fn safe_mul(a: u64, b: u64) -> LendResult<u128> {
    (a as u128).checked_mul(b as u128).ok_or(LendError::Overflow)
}

fn to_u64(value: u128) -> LendResult<u64> {
    u64::try_from(value).map_err(|_| LendError::Overflow)
}

#[cfg(test)]
mod tests {
    use super::*;

    const WEEK: u64 = time::SECONDS_IN_WEEK;
    const DAY: u64 = time::SECONDS_IN_DAY;

    fn loan(amount: u64, rate: u64, start: u64, duration: u64) -> LoanRecord {
        LoanRecord {
            borrower: [1u8; 32],
            amount,
            interest_rate_bps: rate,
            start_time: start,
            duration,
            last_payment_time: start,
            ..Default::default()
        }
    }

    #[test]
    fn test_deposit_interest() {
        // 1,000,000 × 72 / 5200 = 13,846.15
        assert_eq!(deposit_interest(1_000_000).unwrap(), 13_846);
        assert_eq!(deposit_interest(0).unwrap(), 0);
        assert_eq!(deposit_interest(100).unwrap(), 1);
        assert_eq!(
            deposit_interest(limits::MAX_LOAN_AMOUNT).unwrap(),
            (limits::MAX_LOAN_AMOUNT as u128 * 72 / 5200) as u64
        );
    }

    #[test]
    fn test_loan_interest_prorated() {
        // Full year at 10% = 10%
        assert_eq!(loan_interest(1_000_000, 1_000, 0, 365 * DAY).unwrap(), 100_000);
        // One week at 10%
        assert_eq!(loan_interest(1_000_000, 1_000, 0, WEEK).unwrap(), 1_917);
        // Clock behind start accrues nothing
        assert_eq!(loan_interest(1_000_000, 1_500, 500, 100).unwrap(), 0);
    }

    #[test]
    fn test_late_penalty() {
        let due = 10 * DAY;
        assert_eq!(late_penalty(1_000_000, due, due).unwrap(), 0);
        // Partial day does not count
        assert_eq!(late_penalty(1_000_000, due, due + DAY - 1).unwrap(), 0);
        assert_eq!(late_penalty(1_000_000, due, due + 3 * DAY).unwrap(), 30_000);
        // Capped at 7 days
        assert_eq!(late_penalty(1_000_000, due, due + 30 * DAY).unwrap(), 70_000);
    }

    #[test]
    fn test_total_due() {
        let l = loan(1_000_000, 1_000, 0, WEEK);
        assert_eq!(total_due(&l, WEEK).unwrap(), 1_001_917);

        // Two days overdue adds 2% penalty
        let now = WEEK + 2 * DAY;
        let interest = loan_interest(1_000_000, 1_000, 0, now).unwrap();
        assert_eq!(total_due(&l, now).unwrap(), 1_000_000 + interest + 20_000);
    }

    #[test]
    fn test_collateral_and_rates() {
        assert_eq!(collateral_required(1_000_000).unwrap(), 1_500_000);
        assert_eq!(collateral_required(3).unwrap(), 4);
        assert_eq!(interest_rate_for(true), 1_000);
        assert_eq!(interest_rate_for(false), 1_500);
    }

    #[test]
    fn test_unsecured_limit() {
        let mut entry = CreditScoreEntry::new([2u8; 32], 0);
        entry.score = 650;
        entry.consecutive_on_time_payments = 10;
        // 1M × 2 × 3
        assert_eq!(unsecured_limit(&entry).unwrap(), 6_000_000);

        entry.score = 550;
        entry.consecutive_on_time_payments = 5;
        assert_eq!(unsecured_limit(&entry).unwrap(), 2_000_000);

        entry.score = 1_000;
        entry.consecutive_on_time_payments = 200_000;
        assert_eq!(unsecured_limit(&entry).unwrap(), limits::MAX_LOAN_AMOUNT);
    }

    #[test]
    fn test_reward_bonuses() {
        // Due now, partial: base bonus only
        assert_eq!(reward(100, 10, 1_000, 1_000, false).unwrap(), 10);
        // Half a window early and fully repaid: 100 + 25 + 25
        assert_eq!(reward(100, 10, 1_000 + WEEK / 2, 1_000, true).unwrap(), 15);
        // Capped
        assert_eq!(reward(1_000, 100, WEEK, 0, true).unwrap(), rewards::MAX_REWARD_PER_PAYMENT);
        // Past due earns no early bonus
        assert_eq!(early_bonus(100, 200).unwrap(), 0);
        // Two windows ahead is not clamped
        assert_eq!(early_bonus(2 * WEEK, 0).unwrap(), 100);
    }

    #[test]
    fn test_safe_math() {
        assert_eq!(safe_add(1, 2).unwrap(), 3);
        assert_eq!(safe_add(u64::MAX, 1), Err(LendError::Overflow));
        assert_eq!(safe_sub(1, 2), Err(LendError::Underflow));
        assert_eq!(safe_mul(u64::MAX, 2).unwrap(), u64::MAX as u128 * 2);
    }
}
