//! Lending Pool - Deterministic Lending Ledger for LendPool
//!
//! Deposits, secured and unsecured loans and per-identity credit scores,
//! held in fixed-capacity slot tables and mutated only by signed,
//! all-or-nothing transitions.
//!
//! ## Core Operations
//!
//! - **Deposit**: Lock funds for eight weeks at a fixed yield
//! - **Borrow**: Open a loan, collateralized or backed by credit history
//! - **Repay**: Pay toward a loan; full payment closes it and releases collateral
//! - **Liquidate**: Owner seizes an overdue loan and records a default
//! - **DistributeRewards**: Pay a borrower a reward scaled by promptness
//!
//! ## Transition Model
//!
//! 1. The caller signs the action against the current state digest
//! 2. The ledger checks the signature of the controlling identity
//! 3. The engine validates the action and computes the new state on a copy
//! 4. The resulting fund movements are hashed and compared with the
//!    commitment declared in the execution context
//! 5. Only on a match is the new state swapped in and the version bumped
//!
//! ```rust,ignore
//! let mut ledger = Ledger::new(PoolConfig::new(owner, reward_pool, 100)?)?;
//! let sig = signer.sign_action(&action, &ledger.state_digest()?)?;
//! let ctx = ExecutionContext::new(now, pool_value);
//! let commitment = ledger.preview(&action, &sig, &ctx)?.commitment;
//! ledger.submit(&action, &sig, &ctx.with_commitment(commitment))?;
//! ```

pub mod store;
pub mod engine;
pub mod ledger;
pub mod envelope;
pub mod views;

pub use engine::{propose, required_signer, ExecutionContext, Proposal};
pub use envelope::SignedRequest;
pub use ledger::{InMemorySource, Ledger, SnapshotSource, StateUpdate};
pub use store::{PoolConfig, PoolState, StateSnapshot};
pub use views::{LoanStatus, LoanView, PoolSummary, UnsecuredOffer};
