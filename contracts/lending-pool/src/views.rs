//! Read-only Views
//!
//! Projections of the pool state for display layers. Nothing here mutates
//! state or stands in for the checks a transition runs.

use serde::{Deserialize, Serialize};

use lendpool_common::{
    constants::time,
    errors::LendResult,
    math::{safe_add, total_due, unsecured_limit},
    scoring::is_eligible_for_unsecured,
    types::{CreditScoreEntry, PubKey},
};

use crate::store::PoolState;

/// Lifecycle stage of a loan slot at a point in time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoanStatus {
    /// No loan in the slot
    Empty,
    /// Open and not yet due
    Active,
    /// Past due, liquidatable by the owner
    Overdue { days_late: u64 },
}

/// A loan slot as seen at `now`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanView {
    pub slot: u64,
    pub status: LoanStatus,
    pub borrower: PubKey,
    /// Principal, interest and any penalty owed at `now`
    pub total_due: u64,
    /// Amount still to pay at `now`
    pub outstanding: u64,
}

pub fn loan_view(state: &PoolState, slot: u64, now: u64) -> LendResult<LoanView> {
    let loan = state.loan(slot)?;
    if loan.is_empty() {
        return Ok(LoanView {
            slot,
            status: LoanStatus::Empty,
            borrower: loan.borrower,
            total_due: 0,
            outstanding: 0,
        });
    }

    let due = total_due(loan, now)?;
    let status = if loan.is_overdue(now) {
        LoanStatus::Overdue { days_late: (now - loan.due_time()) / time::SECONDS_IN_DAY }
    } else {
        LoanStatus::Active
    };

    Ok(LoanView {
        slot,
        status,
        borrower: loan.borrower,
        total_due: due,
        outstanding: due.saturating_sub(loan.repaid_amount),
    })
}

/// Views of every occupied loan slot
pub fn open_loans(state: &PoolState, now: u64) -> LendResult<Vec<LoanView>> {
    (0..state.loans.len() as u64)
        .map(|slot| loan_view(state, slot, now))
        .filter(|view| !matches!(view, Ok(LoanView { status: LoanStatus::Empty, .. })))
        .collect()
}

/// Credit entry of an identity, if it has one
pub fn credit_score(state: &PoolState, owner: &PubKey) -> Option<CreditScoreEntry> {
    state.credit_entry(owner).copied()
}

/// What an identity could borrow without collateral
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnsecuredOffer {
    pub eligible: bool,
    /// Zero when not eligible
    pub limit: u64,
}

pub fn unsecured_offer(state: &PoolState, owner: &PubKey) -> LendResult<UnsecuredOffer> {
    let entry = state.credit_entry(owner);
    match entry {
        Some(e) if is_eligible_for_unsecured(entry) => Ok(UnsecuredOffer { eligible: true, limit: unsecured_limit(e)? }),
        _ => Ok(UnsecuredOffer { eligible: false, limit: 0 }),
    }
}

/// A deposit slot as seen at `now`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepositView {
    pub slot: u64,
    pub amount: u64,
    pub expected_interest: u64,
    pub lock_in_end_time: u64,
    pub matured: bool,
    pub withdrawn: bool,
}

pub fn deposit_view(state: &PoolState, slot: u64, now: u64) -> LendResult<DepositView> {
    let deposit = state.deposit(slot)?;
    Ok(DepositView {
        slot,
        amount: deposit.amount,
        expected_interest: deposit.expected_interest,
        lock_in_end_time: deposit.lock_in_end_time,
        matured: deposit.is_matured(now),
        withdrawn: deposit.withdrawn,
    })
}

/// Pool-wide totals
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolSummary {
    pub open_loans: u64,
    pub outstanding_principal: u64,
    pub deposit_slots_used: u64,
    pub total_deposits: u64,
    pub credit_entries: u64,
}

pub fn pool_summary(state: &PoolState) -> LendResult<PoolSummary> {
    let mut summary = PoolSummary::default();

    for loan in state.loans.iter().filter(|l| !l.is_empty()) {
        summary.open_loans += 1;
        summary.outstanding_principal = safe_add(
            summary.outstanding_principal,
            loan.amount.saturating_sub(loan.repaid_amount),
        )?;
    }
    for deposit in state.deposits.iter().filter(|d| !d.is_empty() && !d.withdrawn) {
        summary.deposit_slots_used += 1;
        summary.total_deposits = safe_add(summary.total_deposits, deposit.amount)?;
    }
    summary.credit_entries = state.credit_scores.iter().filter(|e| e.is_active).count() as u64;

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::PoolConfig;
    use lendpool_common::types::{DepositRecord, LoanRecord};

    const WEEK: u64 = time::SECONDS_IN_WEEK;
    const DAY: u64 = time::SECONDS_IN_DAY;

    fn create_test_state() -> PoolState {
        let mut state = PoolState::new(&PoolConfig::new([1u8; 32], [2u8; 32], 100).unwrap());
        state.loans[4] = LoanRecord {
            borrower: [5u8; 32],
            amount: 1_000_000,
            collateral_amount: 1_500_000,
            interest_rate_bps: 1_000,
            start_time: 0,
            duration: WEEK,
            is_secured: true,
            repaid_amount: 200_000,
            last_payment_time: 0,
        };
        state.deposits[1] = DepositRecord {
            amount: 3_000_000,
            deposit_time: 0,
            lock_in_end_time: DepositRecord::lock_in_end(0),
            expected_interest: 41_538,
            withdrawn: false,
        };
        state
    }

    #[test]
    fn test_loan_status_over_time() {
        let state = create_test_state();

        assert_eq!(loan_view(&state, 0, 0).unwrap().status, LoanStatus::Empty);

        let active = loan_view(&state, 4, WEEK).unwrap();
        assert_eq!(active.status, LoanStatus::Active);
        assert_eq!(active.total_due, 1_001_917);
        assert_eq!(active.outstanding, 801_917);

        let late = loan_view(&state, 4, WEEK + 2 * DAY).unwrap();
        assert_eq!(late.status, LoanStatus::Overdue { days_late: 2 });

        assert!(loan_view(&state, 10, 0).is_err());
    }

    #[test]
    fn test_open_loans() {
        let state = create_test_state();
        let views = open_loans(&state, 0).unwrap();
        assert_eq!(views.len(), 1);
        assert_eq!(views[0].slot, 4);
    }

    #[test]
    fn test_unsecured_offer() {
        let mut state = create_test_state();
        let who = [8u8; 32];
        assert_eq!(unsecured_offer(&state, &who).unwrap(), UnsecuredOffer { eligible: false, limit: 0 });

        state.ensure_credit_entry(&who, 0);
        let entry = state.credit_entry_mut(&who).unwrap();
        entry.score = 760;
        entry.consecutive_on_time_payments = 12;
        entry.total_loans = 12;

        // 1M × 3 × 3
        assert_eq!(unsecured_offer(&state, &who).unwrap(), UnsecuredOffer { eligible: true, limit: 9_000_000 });
        assert_eq!(credit_score(&state, &who).unwrap().score, 760);
    }

    #[test]
    fn test_deposit_maturity_view() {
        let state = create_test_state();
        assert!(!deposit_view(&state, 1, WEEK).unwrap().matured);
        assert!(deposit_view(&state, 1, 8 * WEEK).unwrap().matured);
        assert!(!deposit_view(&state, 0, 8 * WEEK).unwrap().matured);
    }

    #[test]
    fn test_pool_summary() {
        let state = create_test_state();
        let summary = pool_summary(&state).unwrap();
        assert_eq!(summary.open_loans, 1);
        assert_eq!(summary.outstanding_principal, 800_000);
        assert_eq!(summary.deposit_slots_used, 1);
        assert_eq!(summary.total_deposits, 3_000_000);
        assert_eq!(summary.credit_entries, 0);
    }
}
