//! Protocol Constants
//!
//! All magic numbers of the LendPool ledger. Amounts are in satoshis,
//! times in seconds, rates in basis points unless noted otherwise.

/// Record store capacities
pub mod capacity {
    /// Number of loan slots
    pub const MAX_LOANS: usize = 10;

    /// Number of deposit slots
    pub const MAX_DEPOSITS: usize = 10;

    /// Number of credit score entries (one per identity)
    pub const MAX_CREDIT_ENTRIES: usize = 10;
}

/// Time-related constants
pub mod time {
    /// Seconds in one day
    pub const SECONDS_IN_DAY: u64 = 86_400;

    /// Days in one week
    pub const DAYS_IN_WEEK: u64 = 7;

    /// Seconds in one week
    pub const SECONDS_IN_WEEK: u64 = SECONDS_IN_DAY * DAYS_IN_WEEK;

    /// Weeks in a year (used for deposit yield proration)
    pub const WEEKS_IN_YEAR: u64 = 52;

    /// Days in a year (used for loan interest proration)
    pub const DAYS_IN_YEAR: u64 = 365;

    /// Shortest loan duration, in weeks
    pub const MIN_DURATION_WEEKS: u64 = 1;

    /// Shortest loan duration, in seconds
    pub const MIN_LOAN_DURATION: u64 = MIN_DURATION_WEEKS * SECONDS_IN_WEEK;

    /// Deposit lock-in period, in weeks
    pub const LOCK_IN_WEEKS: u64 = 8;

    /// Deposit lock-in period, in seconds
    pub const LOCK_IN_PERIOD: u64 = LOCK_IN_WEEKS * SECONDS_IN_WEEK;
}

/// Interest, yield and penalty rates
pub mod rates {
    /// Basis points denominator
    pub const BPS_DENOMINATOR: u64 = 10_000;

    /// Percentage denominator
    pub const PERCENT_DENOMINATOR: u64 = 100;

    /// Annual interest on secured loans (10%)
    pub const SECURED_INTEREST_BPS: u64 = 1_000;

    /// Annual interest on unsecured loans (15%)
    pub const UNSECURED_INTEREST_BPS: u64 = 1_500;

    /// Deposit APY in whole percent (9%)
    pub const DEPOSIT_APY_PERCENT: u64 = 9;

    /// Late penalty per day overdue (1%)
    pub const DAILY_PENALTY_BPS: u64 = 100;

    /// Penalty stops accruing after this many days
    pub const MAX_PENALTY_DAYS: u64 = 7;

    /// Required collateral, in percent of principal (150%)
    pub const COLLATERAL_RATIO: u64 = 150;
}

/// Amount limits
pub mod limits {
    /// Smallest loan (0.01 BTC)
    pub const MIN_LOAN_AMOUNT: u64 = 1_000_000;

    /// Largest loan or deposit (1000 BTC)
    pub const MAX_LOAN_AMOUNT: u64 = 100_000_000_000;
}

/// Credit scoring parameters
pub mod credit {
    /// Score assigned when an identity is first seen
    pub const INITIAL_SCORE: u64 = 400;

    /// Lowest possible score
    pub const MIN_SCORE: u64 = 0;

    /// Highest possible score
    pub const MAX_SCORE: u64 = 1_000;

    /// Base score change per scoring event
    pub const SCORE_CHANGE_BASE: i64 = 10;

    /// Multiplier (percent) for early payments
    pub const EARLY_PAYMENT_MULTIPLIER: i64 = 130;

    /// Multiplier (percent) for late payments
    pub const LATE_PAYMENT_MULTIPLIER: i64 = 120;

    /// Multiplier (percent) for defaults
    pub const DEFAULT_MULTIPLIER: i64 = 130;

    /// Minimum score to borrow without collateral
    pub const MIN_SCORE_FOR_UNSECURED: u64 = 550;

    /// Minimum consecutive on-time payments to borrow without collateral
    pub const MIN_PAYMENTS_HISTORY: u64 = 5;

    /// Minimum scored loans to borrow without collateral
    pub const MIN_CLEAN_LOANS: u64 = 3;

    /// Score points per limit step above the unsecured threshold
    pub const SCORE_STEP: u64 = 100;

    /// On-time payments per limit step
    pub const HISTORY_STEP: u64 = 5;
}

/// Reward parameters
pub mod rewards {
    /// Maximum reward paid by one distribution
    pub const MAX_REWARD_PER_PAYMENT: u64 = 1_000;

    /// Bonus (percent) every reward starts from
    pub const BASE_BONUS: u64 = 100;

    /// Early-payment bonus scale (percent per full window remaining)
    pub const EARLY_BONUS_SCALE: u64 = 50;

    /// Window the early bonus is measured against (7 days)
    pub const EARLY_BONUS_WINDOW: u64 = 7 * 24 * 3_600;

    /// Bonus (percent) when the loan is fully repaid
    pub const FULL_REPAYMENT_BONUS: u64 = 25;

    /// Upper bound accepted for the configured base reward rate
    pub const MAX_BASE_REWARD_RATE: u64 = 10_000;
}

/// Domain separation tags for hashing and signing
pub mod domain {
    /// Prefix for action signing digests
    pub const ACTION_TAG: &[u8] = b"lendpool/v1/action";
}
