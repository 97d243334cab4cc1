//! Transition Engine
//!
//! Each operation runs against a working copy of the pool state, checks its
//! preconditions in order (authorization, slot range, business rules),
//! writes the new records and reports what the pool keeps and pays out.
//! [`propose`] turns that into an [`EffectSet`] tagged with the new state
//! digest. Nothing here touches the live state: committing a proposal is the
//! ledger's job, and only after the declared commitment matches.

use serde::{Deserialize, Serialize};

use lendpool_common::{
    auth::AuthToken,
    check,
    commitment::{ChangeOutput, EffectSet},
    constants::{capacity::MAX_DEPOSITS, limits},
    errors::{LendError, LendResult},
    events::{EventLog, LendEvent},
    math::{
        deposit_interest, interest_rate_for, reward, safe_add, safe_sub,
        total_due, unsecured_limit,
    },
    scoring::{apply_score_update, is_eligible_for_unsecured},
    types::{address_of, Address, Commitment, DepositRecord, LoanRecord, PoolAction, PubKey, StateDigest},
    validation::{require_positive, require_slot, require_sufficient_funds, require_valid_loan_params},
};

use crate::store::PoolState;

// ============ Execution Context ============

/// Inputs supplied by the host for one transition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionContext {
    /// Current time, trusted as given
    pub now: u64,
    /// Value held by the pool for this transition, including attached funding
    pub pool_value: u64,
    /// Change output, appended last when present
    pub change: Option<ChangeOutput>,
    /// Commitment the caller declares over the resulting effects
    pub declared_commitment: Commitment,
}

impl ExecutionContext {
    pub fn new(now: u64, pool_value: u64) -> Self {
        Self {
            now,
            pool_value,
            change: None,
            declared_commitment: Commitment::default(),
        }
    }

    pub fn with_change(mut self, recipient: Address, value: u64) -> Self {
        self.change = Some(ChangeOutput { recipient, value });
        self
    }

    pub fn with_commitment(mut self, commitment: Commitment) -> Self {
        self.declared_commitment = commitment;
        self
    }
}

// ============ Proposal ============

/// Fund movements an operation settles with, before change is appended
#[derive(Debug, Clone, PartialEq, Eq)]
struct Settlement {
    retained: u64,
    payout: Option<(Address, u64)>,
}

impl Settlement {
    fn retain(retained: u64) -> Self {
        Self { retained, payout: None }
    }

    fn pay(retained: u64, recipient: &PubKey, value: u64) -> Self {
        Self { retained, payout: Some((address_of(recipient), value)) }
    }
}

/// A computed transition that has not been committed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Proposal {
    /// State after the transition
    pub state: PoolState,
    /// Digest of `state`
    pub state_digest: StateDigest,
    /// Ordered fund movements
    pub effects: EffectSet,
    /// hash256 of `effects`
    pub commitment: Commitment,
    /// Events the transition emits
    pub events: EventLog,
}

/// Identity whose signature authorizes `action` against `state`
pub fn required_signer(state: &PoolState, action: &PoolAction) -> PubKey {
    match action {
        PoolAction::Deposit { depositor, .. } => *depositor,
        PoolAction::Borrow { borrower, .. }
        | PoolAction::Repay { borrower, .. }
        | PoolAction::DistributeRewards { borrower, .. } => *borrower,
        PoolAction::Liquidate { .. } => state.owner,
    }
}

/// Compute the transition `action` would make, without committing it
pub fn propose(
    state: &PoolState,
    action: &PoolAction,
    token: &AuthToken,
    ctx: &ExecutionContext,
) -> LendResult<Proposal> {
    let mut next = state.clone();
    let mut events = EventLog::new();

    let settlement = match action {
        PoolAction::Deposit { slot, depositor, amount } => {
            deposit(&mut next, &mut events, token, ctx, *slot, depositor, *amount)
        }
        PoolAction::Borrow { slot, borrower, amount, duration, secured, collateral } => borrow(
            &mut next,
            &mut events,
            token,
            ctx,
            BorrowRequest {
                slot: *slot,
                borrower: *borrower,
                amount: *amount,
                duration: *duration,
                secured: *secured,
                collateral: *collateral,
            },
        ),
        PoolAction::Repay { slot, borrower, payment } => {
            repay(&mut next, &mut events, token, ctx, *slot, borrower, *payment)
        }
        PoolAction::Liquidate { slot } => liquidate(&mut next, &mut events, token, ctx, *slot),
        PoolAction::DistributeRewards { slot, borrower } => {
            distribute_rewards(&mut next, &mut events, token, ctx, *slot, borrower)
        }
    }?;

    let state_digest = next.digest()?;
    let mut effects = EffectSet::retain(settlement.retained, state_digest);
    if let Some((recipient, value)) = settlement.payout {
        effects = effects.pay(recipient, value);
    }
    let effects = effects.with_change(ctx.change);
    let commitment = effects.commitment()?;

    Ok(Proposal { state: next, state_digest, effects, commitment, events })
}

// ============ Operations ============

fn require_signed_by(token: &AuthToken, identity: &PubKey) -> LendResult<()> {
    check!(token.is_for(identity), LendError::InvalidSignature { signer: *identity });
    Ok(())
}

/// Lock funds into a deposit slot
fn deposit(
    state: &mut PoolState,
    events: &mut EventLog,
    token: &AuthToken,
    ctx: &ExecutionContext,
    slot: u64,
    depositor: &PubKey,
    amount: u64,
) -> LendResult<Settlement> {
    // 1. Authorization and slot
    require_signed_by(token, depositor)?;
    require_slot(slot, MAX_DEPOSITS)?;

    // 2. Amount bounds and funding
    require_positive(amount)?;
    check!(
        amount <= limits::MAX_LOAN_AMOUNT,
        LendError::ExceedsMaximum { amount, maximum: limits::MAX_LOAN_AMOUNT }
    );
    require_sufficient_funds(ctx.pool_value, amount)?;

    // 3. Credit entry on first touch
    if let Some(index) = state.ensure_credit_entry(depositor, ctx.now) {
        events.emit(LendEvent::CreditEntryCreated { owner: *depositor, index, timestamp: ctx.now });
    }

    // 4. Write the deposit (overwrites whatever the slot held)
    let record = DepositRecord {
        amount,
        deposit_time: ctx.now,
        lock_in_end_time: DepositRecord::lock_in_end(ctx.now),
        expected_interest: deposit_interest(amount)?,
        withdrawn: false,
    };
    *state.deposit_mut(slot)? = record;

    events.emit(LendEvent::DepositMade {
        slot,
        depositor: *depositor,
        amount,
        expected_interest: record.expected_interest,
        lock_in_end_time: record.lock_in_end_time,
        timestamp: ctx.now,
    });

    Ok(Settlement::retain(ctx.pool_value))
}

struct BorrowRequest {
    slot: u64,
    borrower: PubKey,
    amount: u64,
    duration: u64,
    secured: bool,
    collateral: u64,
}

/// Open a loan in an empty slot
fn borrow(
    state: &mut PoolState,
    events: &mut EventLog,
    token: &AuthToken,
    ctx: &ExecutionContext,
    req: BorrowRequest,
) -> LendResult<Settlement> {
    let BorrowRequest { slot, borrower, amount, duration, secured, collateral } = req;

    // 1. Authorization and slot
    require_signed_by(token, &borrower)?;
    check!(state.loan(slot)?.is_empty(), LendError::SlotOccupied { slot });

    // 2. Unsecured loans need a clean credit history and stay under the limit
    if !secured {
        let entry = state.credit_entry(&borrower);
        check!(is_eligible_for_unsecured(entry), LendError::NotEligibleForUnsecured { borrower });
        if let Some(entry) = entry {
            let limit = unsecured_limit(entry)?;
            check!(amount <= limit, LendError::ExceedsUnsecuredLimit { amount, limit });
        }
    }

    // 3. Principal, duration and collateral ratio
    require_valid_loan_params(amount, duration, secured, collateral)?;

    // 4. One active loan per borrower
    if let Some(existing) = state.active_loan_slot_of(&borrower) {
        return Err(LendError::ActiveLoanExists { borrower, slot: existing });
    }

    // 5. Secured loans need some open deposit covering the collateral
    if secured {
        check!(state.has_collateral_deposit(collateral), LendError::NoBackingDeposit { collateral });
    }

    // 6. Pool must hold the principal it pays out
    require_sufficient_funds(ctx.pool_value, amount)?;

    if let Some(index) = state.ensure_credit_entry(&borrower, ctx.now) {
        events.emit(LendEvent::CreditEntryCreated { owner: borrower, index, timestamp: ctx.now });
    }

    // 7. Write the loan
    let interest_rate_bps = interest_rate_for(secured);
    *state.loan_mut(slot)? = LoanRecord {
        borrower,
        amount,
        collateral_amount: collateral,
        interest_rate_bps,
        start_time: ctx.now,
        duration,
        is_secured: secured,
        repaid_amount: 0,
        last_payment_time: ctx.now,
    };

    events.emit(LendEvent::LoanOpened {
        slot,
        borrower,
        amount,
        collateral,
        interest_rate_bps,
        duration,
        secured,
        timestamp: ctx.now,
    });

    Ok(Settlement::pay(safe_sub(ctx.pool_value, amount)?, &borrower, amount))
}

/// Pay toward a loan
///
/// The slot is read without an occupancy check and the signer is scored and
/// refunded, whether or not it recorded the loan.
fn repay(
    state: &mut PoolState,
    events: &mut EventLog,
    token: &AuthToken,
    ctx: &ExecutionContext,
    slot: u64,
    borrower: &PubKey,
    payment: u64,
) -> LendResult<Settlement> {
    // 1. Authorization and slot
    require_signed_by(token, borrower)?;
    let loan = *state.loan(slot)?;
    require_positive(payment)?;

    // 2. Amount owed now
    let due = total_due(&loan, ctx.now)?;
    let new_repaid = safe_add(loan.repaid_amount, payment)?;

    // 3. Score the payment
    update_score(state, events, borrower, ctx.now, loan.due_time(), false, ctx.now);

    events.emit(LendEvent::Repayment {
        slot,
        payer: *borrower,
        payment,
        repaid_amount: new_repaid,
        total_due: due,
        timestamp: ctx.now,
    });

    // 4. Partial payment keeps the loan open
    if new_repaid < due {
        let record = state.loan_mut(slot)?;
        record.repaid_amount = new_repaid;
        record.last_payment_time = ctx.now;
        return Ok(Settlement::retain(ctx.pool_value));
    }

    // 5. Full payment closes the slot and releases collateral
    *state.loan_mut(slot)? = LoanRecord::default();

    let collateral_returned = if loan.is_secured { loan.collateral_amount } else { 0 };
    events.emit(LendEvent::LoanClosed {
        slot,
        borrower: loan.borrower,
        collateral_returned,
        timestamp: ctx.now,
    });

    if loan.is_secured {
        require_sufficient_funds(ctx.pool_value, collateral_returned)?;
        Ok(Settlement::pay(ctx.pool_value - collateral_returned, borrower, collateral_returned))
    } else {
        Ok(Settlement::retain(ctx.pool_value))
    }
}

/// Seize an overdue loan
///
/// Ignores how much has been repaid so far.
fn liquidate(
    state: &mut PoolState,
    events: &mut EventLog,
    token: &AuthToken,
    ctx: &ExecutionContext,
    slot: u64,
) -> LendResult<Settlement> {
    // 1. Owner only
    let owner = state.owner;
    if !token.is_for(&owner) {
        return Err(LendError::OwnerOnly);
    }

    // 2. Slot must hold a loan past its due time
    let loan = *state.loan(slot)?;
    check!(!loan.is_empty(), LendError::SlotEmpty { slot });
    check!(
        loan.is_overdue(ctx.now),
        LendError::NotPastDue { now: ctx.now, due_time: loan.due_time() }
    );

    // 3. Record the default
    update_score(state, events, &loan.borrower, ctx.now, loan.due_time(), true, ctx.now);

    // 4. Clear the slot
    *state.loan_mut(slot)? = LoanRecord::default();

    let (collateral_seized, unrecovered_principal) = if loan.is_secured {
        (loan.collateral_amount, 0)
    } else {
        (0, loan.amount.saturating_sub(loan.repaid_amount))
    };

    events.emit(LendEvent::LoanLiquidated {
        slot,
        borrower: loan.borrower,
        collateral_seized,
        unrecovered_principal,
        timestamp: ctx.now,
    });

    if loan.is_secured {
        require_sufficient_funds(ctx.pool_value, collateral_seized)?;
        Ok(Settlement::pay(ctx.pool_value - collateral_seized, &owner, collateral_seized))
    } else {
        Ok(Settlement::retain(ctx.pool_value))
    }
}

/// Pay a repayment reward to the loan's borrower
///
/// Nothing marks the reward as claimed.
fn distribute_rewards(
    state: &mut PoolState,
    events: &mut EventLog,
    token: &AuthToken,
    ctx: &ExecutionContext,
    slot: u64,
    borrower: &PubKey,
) -> LendResult<Settlement> {
    // 1. Authorization and slot
    require_signed_by(token, borrower)?;
    let loan = *state.loan(slot)?;

    // 2. Active loan of this borrower
    check!(!loan.is_empty(), LendError::SlotEmpty { slot });
    check!(
        loan.borrower == *borrower,
        LendError::BorrowerMismatch { expected: loan.borrower, actual: *borrower }
    );

    // 3. Reward
    let is_full = loan.repaid_amount >= total_due(&loan, ctx.now)?;
    let amount = reward(loan.amount, state.base_reward_rate, loan.due_time(), ctx.now, is_full)?;
    require_sufficient_funds(ctx.pool_value, amount)?;

    events.emit(LendEvent::RewardDistributed {
        slot,
        borrower: *borrower,
        reward: amount,
        timestamp: ctx.now,
    });

    Ok(Settlement::pay(ctx.pool_value - amount, borrower, amount))
}

/// Apply a scoring event if the identity has an entry
fn update_score(
    state: &mut PoolState,
    events: &mut EventLog,
    owner: &PubKey,
    payment_time: u64,
    due_time: u64,
    is_default: bool,
    now: u64,
) {
    let Some(entry) = state.credit_entry_mut(owner) else {
        tracing::debug!("no credit entry to score");
        return;
    };

    let change = apply_score_update(entry, payment_time, due_time, is_default, now);
    events.emit(LendEvent::CreditScoreUpdated {
        owner: *owner,
        outcome: change.outcome,
        old_score: change.old_score,
        new_score: change.new_score,
        timestamp: now,
    });
}
