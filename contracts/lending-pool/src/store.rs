//! Record Store
//!
//! Fixed-capacity, explicitly indexed arrays of loans, deposits and credit
//! entries together with the pool's configuration. Slots are chosen by the
//! caller; nothing here grows, compacts or reuses slots on its own.

use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};

use lendpool_common::{
    commitment::hash256,
    constants::{
        capacity::{MAX_CREDIT_ENTRIES, MAX_DEPOSITS, MAX_LOANS},
        credit, rewards,
    },
    check,
    errors::{LendError, LendResult},
    types::{CreditScoreEntry, DepositRecord, LoanRecord, PubKey, StateDigest},
    validation::{require_slot, require_valid_identity},
};

// ============ Configuration ============

/// Runtime parameters fixed when the pool is created
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub struct PoolConfig {
    /// Identity allowed to liquidate
    pub owner: PubKey,
    /// Identity recorded as the reward source
    pub reward_pool: PubKey,
    /// Reward rate applied to loan principal
    pub base_reward_rate: u64,
}

impl PoolConfig {
    /// Creates a validated configuration
    ///
    /// # Errors
    /// Returns `LendError::InvalidConfig` for an empty identity or a reward
    /// rate above `MAX_BASE_REWARD_RATE`.
    pub fn new(owner: PubKey, reward_pool: PubKey, base_reward_rate: u64) -> LendResult<Self> {
        let config = Self { owner, reward_pool, base_reward_rate };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> LendResult<()> {
        require_valid_identity(&self.owner, "owner")?;
        require_valid_identity(&self.reward_pool, "reward_pool")?;
        if self.base_reward_rate > rewards::MAX_BASE_REWARD_RATE {
            return Err(LendError::InvalidConfig {
                param: "base_reward_rate",
                reason: "above maximum",
            });
        }
        Ok(())
    }
}

// ============ Pool State ============

/// Persisted pool state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub struct PoolState {
    pub loans: [LoanRecord; MAX_LOANS],
    pub deposits: [DepositRecord; MAX_DEPOSITS],
    pub credit_scores: [CreditScoreEntry; MAX_CREDIT_ENTRIES],
    pub owner: PubKey,
    pub reward_pool: PubKey,
    pub base_reward_rate: u64,
}

impl PoolState {
    /// Empty pool for a configuration
    pub fn new(config: &PoolConfig) -> Self {
        Self {
            loans: Default::default(),
            deposits: Default::default(),
            credit_scores: Default::default(),
            owner: config.owner,
            reward_pool: config.reward_pool,
            base_reward_rate: config.base_reward_rate,
        }
    }

    /// Check a loaded state: configuration and credit scores in range
    ///
    /// # Errors
    /// Returns `LendError::InvalidConfig` for a bad configuration or a
    /// score above the maximum.
    pub fn validate(&self) -> LendResult<()> {
        self.config().validate()?;
        for entry in self.credit_scores.iter().filter(|e| e.is_active) {
            check!(
                entry.score <= credit::MAX_SCORE,
                LendError::InvalidConfig { param: "credit_scores", reason: "score above maximum" }
            );
        }
        Ok(())
    }

    pub fn config(&self) -> PoolConfig {
        PoolConfig {
            owner: self.owner,
            reward_pool: self.reward_pool,
            base_reward_rate: self.base_reward_rate,
        }
    }

    /// Canonical bytes of the state
    pub fn to_bytes(&self) -> LendResult<Vec<u8>> {
        borsh::to_vec(self).map_err(|_| LendError::InvalidRequest { reason: "state not serializable" })
    }

    /// hash256 of the canonical bytes
    pub fn digest(&self) -> LendResult<StateDigest> {
        Ok(hash256(&self.to_bytes()?))
    }

    // ============ Indexed Access ============

    pub fn loan(&self, slot: u64) -> LendResult<&LoanRecord> {
        Ok(&self.loans[require_slot(slot, MAX_LOANS)?])
    }

    pub fn loan_mut(&mut self, slot: u64) -> LendResult<&mut LoanRecord> {
        Ok(&mut self.loans[require_slot(slot, MAX_LOANS)?])
    }

    pub fn deposit(&self, slot: u64) -> LendResult<&DepositRecord> {
        Ok(&self.deposits[require_slot(slot, MAX_DEPOSITS)?])
    }

    pub fn deposit_mut(&mut self, slot: u64) -> LendResult<&mut DepositRecord> {
        Ok(&mut self.deposits[require_slot(slot, MAX_DEPOSITS)?])
    }

    // ============ Lookups ============

    /// Active credit entry of an identity
    pub fn credit_entry(&self, owner: &PubKey) -> Option<&CreditScoreEntry> {
        self.credit_scores
            .iter()
            .find(|e| e.is_active && e.owner == *owner)
    }

    pub fn credit_entry_mut(&mut self, owner: &PubKey) -> Option<&mut CreditScoreEntry> {
        self.credit_scores
            .iter_mut()
            .find(|e| e.is_active && e.owner == *owner)
    }

    /// Create an entry for `owner` in the first free slot if it has none.
    ///
    /// Returns the index of a newly created entry. Returns `None` if one
    /// existed or every slot is taken; an identity without an entry is
    /// never scored and never eligible for unsecured credit.
    pub fn ensure_credit_entry(&mut self, owner: &PubKey, now: u64) -> Option<u64> {
        if self.credit_entry(owner).is_some() {
            return None;
        }

        let Some((index, slot)) = self
            .credit_scores
            .iter_mut()
            .enumerate()
            .find(|(_, e)| !e.is_active)
        else {
            tracing::debug!(capacity = MAX_CREDIT_ENTRIES, "credit registry full, identity left unscored");
            return None;
        };

        *slot = CreditScoreEntry::new(*owner, now);
        Some(index as u64)
    }

    /// Slot of the identity's non-empty loan, scanning the whole table
    pub fn active_loan_slot_of(&self, borrower: &PubKey) -> Option<u64> {
        self.loans
            .iter()
            .position(|l| !l.is_empty() && l.borrower == *borrower)
            .map(|i| i as u64)
    }

    /// Returns true if some open deposit is at least `collateral`
    pub fn has_collateral_deposit(&self, collateral: u64) -> bool {
        self.deposits
            .iter()
            .any(|d| !d.withdrawn && d.amount >= collateral)
    }

    /// Number of non-empty loan slots
    pub fn open_loan_count(&self) -> usize {
        self.loans.iter().filter(|l| !l.is_empty()).count()
    }
}

// ============ Snapshots ============

/// Versioned pool state, the unit of persistence
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub struct StateSnapshot {
    /// Number of accepted transitions
    pub version: u64,
    pub state: PoolState,
}

impl StateSnapshot {
    /// Version zero for a new pool
    pub fn genesis(config: &PoolConfig) -> Self {
        Self { version: 0, state: PoolState::new(config) }
    }

    pub fn digest(&self) -> LendResult<StateDigest> {
        self.state.digest()
    }
}
