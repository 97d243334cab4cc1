//! Pool Events for LendPool
//!
//! Events are emitted by every accepted transition and can be indexed
//! off-ledger for loan history, credit score history and dashboards.
//! A rejected transition emits nothing.

use crate::scoring::ScoreOutcome;
use crate::types::PubKey;
use crate::Vec;
use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};

/// Event types for indexing and filtering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
#[borsh(use_discriminant = true)]
#[repr(u8)]
pub enum EventType {
    // Deposit Events (0x01 - 0x1F)
    DepositMade = 0x01,

    // Loan Events (0x20 - 0x3F)
    LoanOpened = 0x20,
    Repayment = 0x21,
    LoanClosed = 0x22,
    LoanLiquidated = 0x23,
    RewardDistributed = 0x24,

    // Credit Events (0x40 - 0x5F)
    CreditScoreUpdated = 0x40,
    CreditEntryCreated = 0x41,
}

/// Main event enum containing all pool events
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub enum LendEvent {
    // ============ Deposit Events ============

    /// Emitted when a deposit slot is written
    DepositMade {
        slot: u64,
        depositor: PubKey,
        amount: u64,
        expected_interest: u64,
        lock_in_end_time: u64,
        timestamp: u64,
    },

    // ============ Loan Events ============

    /// Emitted when a loan is opened
    LoanOpened {
        slot: u64,
        borrower: PubKey,
        amount: u64,
        collateral: u64,
        interest_rate_bps: u64,
        duration: u64,
        secured: bool,
        timestamp: u64,
    },

    /// Emitted for every accepted payment
    Repayment {
        slot: u64,
        payer: PubKey,
        payment: u64,
        repaid_amount: u64,
        total_due: u64,
        timestamp: u64,
    },

    /// Emitted when a payment settles the loan in full
    LoanClosed {
        slot: u64,
        borrower: PubKey,
        collateral_returned: u64,
        timestamp: u64,
    },

    /// Emitted when the owner liquidates an overdue loan
    LoanLiquidated {
        slot: u64,
        borrower: PubKey,
        collateral_seized: u64,
        unrecovered_principal: u64,
        timestamp: u64,
    },

    /// Emitted when a reward is paid out
    RewardDistributed {
        slot: u64,
        borrower: PubKey,
        reward: u64,
        timestamp: u64,
    },

    // ============ Credit Events ============

    /// Emitted on every score change
    CreditScoreUpdated {
        owner: PubKey,
        outcome: ScoreOutcome,
        old_score: u64,
        new_score: u64,
        timestamp: u64,
    },

    /// Emitted when an identity gets its first credit entry
    CreditEntryCreated {
        owner: PubKey,
        index: u64,
        timestamp: u64,
    },
}

impl LendEvent {
    /// Get the event type for filtering
    pub fn event_type(&self) -> EventType {
        match self {
            Self::DepositMade { .. } => EventType::DepositMade,
            Self::LoanOpened { .. } => EventType::LoanOpened,
            Self::Repayment { .. } => EventType::Repayment,
            Self::LoanClosed { .. } => EventType::LoanClosed,
            Self::LoanLiquidated { .. } => EventType::LoanLiquidated,
            Self::RewardDistributed { .. } => EventType::RewardDistributed,
            Self::CreditScoreUpdated { .. } => EventType::CreditScoreUpdated,
            Self::CreditEntryCreated { .. } => EventType::CreditEntryCreated,
        }
    }

    /// Time the transition carried
    pub fn timestamp(&self) -> u64 {
        match self {
            Self::DepositMade { timestamp, .. }
            | Self::LoanOpened { timestamp, .. }
            | Self::Repayment { timestamp, .. }
            | Self::LoanClosed { timestamp, .. }
            | Self::LoanLiquidated { timestamp, .. }
            | Self::RewardDistributed { timestamp, .. }
            | Self::CreditScoreUpdated { timestamp, .. }
            | Self::CreditEntryCreated { timestamp, .. } => *timestamp,
        }
    }

    /// Serialize event to bytes for storage/transmission
    pub fn to_bytes(&self) -> Vec<u8> {
        borsh::to_vec(self).unwrap_or_default()
    }

    /// Deserialize event from bytes
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        borsh::from_slice(bytes).ok()
    }
}

/// Event log for collecting events during execution
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventLog {
    events: Vec<LendEvent>,
}

impl EventLog {
    /// Create a new empty event log
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    /// Emit an event (add to log)
    pub fn emit(&mut self, event: LendEvent) {
        self.events.push(event);
    }

    /// Append all events of another log
    pub fn extend(&mut self, other: EventLog) {
        self.events.extend(other.events);
    }

    /// Get all events
    pub fn events(&self) -> &[LendEvent] {
        &self.events
    }

    /// Take ownership of all events
    pub fn into_events(self) -> Vec<LendEvent> {
        self.events
    }

    /// Filter events by type
    pub fn filter_by_type(&self, event_type: EventType) -> Vec<&LendEvent> {
        self.events
            .iter()
            .filter(|e| e.event_type() == event_type)
            .collect()
    }

    /// Score history of one identity, oldest first
    pub fn score_history(&self, owner: &PubKey) -> Vec<(u64, u64)> {
        self.events
            .iter()
            .filter_map(|e| match e {
                LendEvent::CreditScoreUpdated { owner: o, new_score, timestamp, .. } if o == owner => {
                    Some((*timestamp, *new_score))
                }
                _ => None,
            })
            .collect()
    }

    /// Check if any events were emitted
    pub fn has_events(&self) -> bool {
        !self.events.is_empty()
    }

    /// Get number of events
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Returns true if no events were emitted
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Clear all events
    pub fn clear(&mut self) {
        self.events.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_type() {
        let event = LendEvent::LoanOpened {
            slot: 2,
            borrower: [1u8; 32],
            amount: 1_000_000,
            collateral: 1_500_000,
            interest_rate_bps: 1_000,
            duration: 604_800,
            secured: true,
            timestamp: 100,
        };

        assert_eq!(event.event_type(), EventType::LoanOpened);
        assert_eq!(event.timestamp(), 100);
    }

    #[test]
    fn test_event_serialization() {
        let event = LendEvent::CreditScoreUpdated {
            owner: [4u8; 32],
            outcome: ScoreOutcome::Late,
            old_score: 400,
            new_score: 388,
            timestamp: 200,
        };

        let bytes = event.to_bytes();
        let restored = LendEvent::from_bytes(&bytes).unwrap();

        assert_eq!(event, restored);
    }

    #[test]
    fn test_event_log() {
        let mut log = EventLog::new();
        assert!(!log.has_events());

        log.emit(LendEvent::CreditEntryCreated { owner: [1u8; 32], index: 0, timestamp: 1 });
        log.emit(LendEvent::CreditScoreUpdated {
            owner: [1u8; 32],
            outcome: ScoreOutcome::Early,
            old_score: 400,
            new_score: 413,
            timestamp: 5,
        });
        log.emit(LendEvent::CreditScoreUpdated {
            owner: [2u8; 32],
            outcome: ScoreOutcome::Default,
            old_score: 400,
            new_score: 387,
            timestamp: 6,
        });

        assert_eq!(log.len(), 3);
        assert_eq!(log.filter_by_type(EventType::CreditScoreUpdated).len(), 2);
        assert_eq!(log.score_history(&[1u8; 32]), vec![(5, 413)]);

        log.clear();
        assert!(log.is_empty());
    }
}
