//! Ledger
//!
//! Owns the live snapshot. A submission is authorized against the current
//! state digest, proposed by the engine on a working copy, checked against
//! the declared commitment and only then swapped in with the version bumped.
//! Any failure leaves the snapshot and the event log exactly as they were.

use lendpool_common::{
    auth::{authorize, signing_digest, AuthToken},
    commitment::EffectSet,
    errors::{LendError, LendResult},
    events::{EventLog, LendEvent},
    types::{Commitment, PoolAction, PubKey, SignatureBytes, StateDigest},
};

use crate::engine::{propose, required_signer, ExecutionContext, Proposal};
use crate::envelope::SignedRequest;
use crate::store::{PoolConfig, PoolState, StateSnapshot};

// ============ Snapshot Sources ============

/// Read-only source of the authoritative snapshot
pub trait SnapshotSource {
    fn load(&self) -> LendResult<StateSnapshot>;
}

/// Snapshot source held in memory
#[derive(Debug, Clone)]
pub struct InMemorySource {
    snapshot: StateSnapshot,
}

impl InMemorySource {
    pub fn new(snapshot: StateSnapshot) -> Self {
        Self { snapshot }
    }

    /// Replace the stored snapshot with its direct successor
    ///
    /// # Errors
    /// Returns `LendError::StaleSnapshot` unless `snapshot.version` is one
    /// above the stored version.
    pub fn record(&mut self, snapshot: StateSnapshot) -> LendResult<()> {
        let current = self.snapshot.version;
        if current.checked_add(1) != Some(snapshot.version) {
            return Err(LendError::StaleSnapshot { current, supplied: snapshot.version });
        }
        self.snapshot = snapshot;
        Ok(())
    }
}

impl SnapshotSource for InMemorySource {
    fn load(&self) -> LendResult<StateSnapshot> {
        Ok(self.snapshot.clone())
    }
}

// ============ State Update ============

/// Outcome of an accepted transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateUpdate {
    /// Version after the transition
    pub version: u64,
    /// Digest of the new state
    pub state_digest: StateDigest,
    /// Fund movements the transition committed to
    pub effects: EffectSet,
    /// Commitment that matched
    pub commitment: Commitment,
    /// Events emitted by the transition
    pub events: Vec<LendEvent>,
}

// ============ Ledger ============

/// The live pool state and the events of every accepted transition
#[derive(Debug, Clone)]
pub struct Ledger {
    snapshot: StateSnapshot,
    events: EventLog,
}

impl Ledger {
    /// New pool at version zero
    pub fn new(config: PoolConfig) -> LendResult<Self> {
        config.validate()?;
        Ok(Self { snapshot: StateSnapshot::genesis(&config), events: EventLog::new() })
    }

    /// Resume from the snapshot a source holds
    pub fn from_source<S: SnapshotSource + ?Sized>(source: &S) -> LendResult<Self> {
        let snapshot = source.load()?;
        snapshot.state.validate()?;
        tracing::debug!(version = snapshot.version, "ledger loaded");
        Ok(Self { snapshot, events: EventLog::new() })
    }

    pub fn snapshot(&self) -> &StateSnapshot {
        &self.snapshot
    }

    pub fn state(&self) -> &PoolState {
        &self.snapshot.state
    }

    pub fn version(&self) -> u64 {
        self.snapshot.version
    }

    /// Digest every signature must bind to
    pub fn state_digest(&self) -> LendResult<StateDigest> {
        self.snapshot.digest()
    }

    /// Events of all accepted transitions, oldest first
    pub fn events(&self) -> &EventLog {
        &self.events
    }

    /// Hand the accumulated events to the caller and start a fresh log
    pub fn take_events(&mut self) -> EventLog {
        core::mem::take(&mut self.events)
    }

    /// Check the signature of the identity `action` requires
    pub fn authorize(&self, action: &PoolAction, signature: &SignatureBytes) -> LendResult<AuthToken> {
        let digest = signing_digest(action, &self.state_digest()?)?;
        let required = required_signer(self.state(), action);
        authorize(&required, &digest, signature)
    }

    /// Run the full pipeline except the commitment check
    ///
    /// Lets a caller learn the commitment it must declare.
    pub fn preview(
        &self,
        action: &PoolAction,
        signature: &SignatureBytes,
        ctx: &ExecutionContext,
    ) -> LendResult<Proposal> {
        let token = self.authorize(action, signature)?;
        propose(self.state(), action, &token, ctx)
    }

    /// Apply `action` if it is authorized, valid and its effects match the
    /// declared commitment
    #[tracing::instrument(skip_all, fields(op = action.name(), slot = action.slot(), version = self.snapshot.version))]
    pub fn submit(
        &mut self,
        action: &PoolAction,
        signature: &SignatureBytes,
        ctx: &ExecutionContext,
    ) -> LendResult<StateUpdate> {
        match self.try_submit(action, signature, ctx) {
            Ok(update) => {
                tracing::debug!(
                    version = update.version,
                    events = update.events.len(),
                    "transition accepted"
                );
                Ok(update)
            }
            Err(e) => {
                tracing::warn!(
                    code = e.code(),
                    recoverable = e.is_recoverable(),
                    error = %e,
                    "transition rejected"
                );
                Err(e)
            }
        }
    }

    fn try_submit(
        &mut self,
        action: &PoolAction,
        signature: &SignatureBytes,
        ctx: &ExecutionContext,
    ) -> LendResult<StateUpdate> {
        // 1. Authorize against the current digest
        let token = self.authorize(action, signature)?;

        // 2. Compute the transition on a copy
        let proposal = propose(self.state(), action, &token, ctx)?;

        // 3. Effects must match what the caller declared
        let commitment = proposal.effects.verify(&ctx.declared_commitment)?;

        // 4. Commit
        let version = self
            .snapshot
            .version
            .checked_add(1)
            .ok_or(LendError::Overflow)?;

        let Proposal { state, state_digest, effects, events, .. } = proposal;
        self.snapshot = StateSnapshot { version, state };
        self.events.extend(events.clone());

        Ok(StateUpdate {
            version,
            state_digest,
            effects,
            commitment,
            events: events.into_events(),
        })
    }

    /// Decode and submit a CBOR request
    pub fn submit_cbor(&mut self, bytes: &[u8]) -> LendResult<StateUpdate> {
        let request = SignedRequest::from_cbor(bytes)?;
        self.submit_request(&request)
    }

    pub fn submit_request(&mut self, request: &SignedRequest) -> LendResult<StateUpdate> {
        self.submit(&request.action, &request.signature, &request.context)
    }

    // ============ Operation Surface ============

    pub fn deposit(
        &mut self,
        slot: u64,
        depositor: PubKey,
        amount: u64,
        signature: &SignatureBytes,
        ctx: &ExecutionContext,
    ) -> LendResult<StateUpdate> {
        self.submit(&PoolAction::Deposit { slot, depositor, amount }, signature, ctx)
    }

    #[allow(clippy::too_many_arguments)]
    pub fn borrow(
        &mut self,
        slot: u64,
        borrower: PubKey,
        amount: u64,
        duration: u64,
        secured: bool,
        collateral: u64,
        signature: &SignatureBytes,
        ctx: &ExecutionContext,
    ) -> LendResult<StateUpdate> {
        let action = PoolAction::Borrow { slot, borrower, amount, duration, secured, collateral };
        self.submit(&action, signature, ctx)
    }

    pub fn repay(
        &mut self,
        slot: u64,
        borrower: PubKey,
        payment: u64,
        signature: &SignatureBytes,
        ctx: &ExecutionContext,
    ) -> LendResult<StateUpdate> {
        self.submit(&PoolAction::Repay { slot, borrower, payment }, signature, ctx)
    }

    pub fn liquidate(
        &mut self,
        slot: u64,
        signature: &SignatureBytes,
        ctx: &ExecutionContext,
    ) -> LendResult<StateUpdate> {
        self.submit(&PoolAction::Liquidate { slot }, signature, ctx)
    }

    pub fn distribute_rewards(
        &mut self,
        slot: u64,
        borrower: PubKey,
        signature: &SignatureBytes,
        ctx: &ExecutionContext,
    ) -> LendResult<StateUpdate> {
        self.submit(&PoolAction::DistributeRewards { slot, borrower }, signature, ctx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lendpool_common::auth::PoolSigner;

    const POOL_VALUE: u64 = 10_000_000;

    fn create_test_ledger() -> (Ledger, PoolSigner, PoolSigner) {
        let owner = PoolSigner::from_seed(&[1u8; 32]);
        let alice = PoolSigner::from_seed(&[2u8; 32]);
        let config = PoolConfig::new(owner.public_key(), [9u8; 32], 100).unwrap();
        (Ledger::new(config).unwrap(), owner, alice)
    }

    fn signed_ctx(ledger: &Ledger, signer: &PoolSigner, action: &PoolAction, now: u64) -> (SignatureBytes, ExecutionContext) {
        let sig = signer.sign_action(action, &ledger.state_digest().unwrap()).unwrap();
        let ctx = ExecutionContext::new(now, POOL_VALUE);
        let commitment = ledger.preview(action, &sig, &ctx).unwrap().commitment;
        (sig, ctx.with_commitment(commitment))
    }

    #[test]
    fn test_submit_bumps_version() {
        let (mut ledger, _, alice) = create_test_ledger();
        let action = PoolAction::Deposit { slot: 0, depositor: alice.public_key(), amount: 1_000_000 };
        let (sig, ctx) = signed_ctx(&ledger, &alice, &action, 0);

        let update = ledger.submit(&action, &sig, &ctx).unwrap();

        assert_eq!(update.version, 1);
        assert_eq!(ledger.version(), 1);
        assert_eq!(update.state_digest, ledger.state_digest().unwrap());
        assert_eq!(update.commitment, ctx.declared_commitment);
        assert_eq!(ledger.events().len(), update.events.len());
    }

    #[test]
    fn test_mismatch_leaves_ledger_untouched() {
        let (mut ledger, _, alice) = create_test_ledger();
        let action = PoolAction::Deposit { slot: 0, depositor: alice.public_key(), amount: 1_000_000 };
        let (sig, ctx) = signed_ctx(&ledger, &alice, &action, 0);
        let before = ledger.snapshot().clone();

        let wrong = ctx.clone().with_commitment(Commitment([0xAB; 32]));
        let result = ledger.submit(&action, &sig, &wrong);

        assert!(matches!(result, Err(LendError::CommitmentMismatch { .. })));
        assert_eq!(ledger.snapshot(), &before);
        assert!(ledger.events().is_empty());

        // The honest commitment still goes through
        assert!(ledger.submit(&action, &sig, &ctx).is_ok());
    }

    #[test]
    fn test_signature_is_single_use() {
        let (mut ledger, _, alice) = create_test_ledger();
        let action = PoolAction::Deposit { slot: 0, depositor: alice.public_key(), amount: 1_000_000 };
        let (sig, ctx) = signed_ctx(&ledger, &alice, &action, 0);
        ledger.submit(&action, &sig, &ctx).unwrap();

        // Replaying against version 1 fails
        let replay = ledger.submit(&action, &sig, &ctx);
        assert!(matches!(replay, Err(LendError::InvalidSignature { .. })));
        assert_eq!(ledger.version(), 1);
    }

    #[test]
    fn test_liquidate_requires_owner_signature() {
        let (ledger, owner, alice) = create_test_ledger();
        let action = PoolAction::Liquidate { slot: 0 };
        let sig = alice.sign_action(&action, &ledger.state_digest().unwrap()).unwrap();

        let result = ledger.authorize(&action, &sig);
        assert!(matches!(result, Err(LendError::InvalidSignature { signer }) if signer == owner.public_key()));
    }

    #[test]
    fn test_from_source_round_trip() {
        let (mut ledger, _, alice) = create_test_ledger();
        let mut source = InMemorySource::new(ledger.snapshot().clone());

        let action = PoolAction::Deposit { slot: 2, depositor: alice.public_key(), amount: 3_000_000 };
        let (sig, ctx) = signed_ctx(&ledger, &alice, &action, 50);
        ledger.submit(&action, &sig, &ctx).unwrap();
        source.record(ledger.snapshot().clone()).unwrap();

        let resumed = Ledger::from_source(&source).unwrap();
        assert_eq!(resumed.version(), 1);
        assert_eq!(resumed.state(), ledger.state());

        // Recording the same version again is stale
        let stale = source.record(ledger.snapshot().clone());
        assert!(matches!(stale, Err(LendError::StaleSnapshot { current: 1, supplied: 1 })));
    }

    #[test]
    fn test_take_events_drains_log() {
        let (mut ledger, _, alice) = create_test_ledger();
        let action = PoolAction::Deposit { slot: 0, depositor: alice.public_key(), amount: 1_000_000 };
        let (sig, ctx) = signed_ctx(&ledger, &alice, &action, 0);
        let update = ledger.submit(&action, &sig, &ctx).unwrap();

        let drained = ledger.take_events();
        assert_eq!(drained.events(), update.events.as_slice());
        assert!(ledger.events().is_empty());

        // Later transitions start a new log
        let action = PoolAction::Deposit { slot: 1, depositor: alice.public_key(), amount: 2_000_000 };
        let (sig, ctx) = signed_ctx(&ledger, &alice, &action, 10);
        ledger.submit(&action, &sig, &ctx).unwrap();
        assert_eq!(ledger.events().len(), 1);
        assert_eq!(ledger.version(), 2);
    }

    #[test]
    fn test_from_source_rejects_out_of_range_score() {
        let (mut ledger, _, alice) = create_test_ledger();
        let action = PoolAction::Deposit { slot: 0, depositor: alice.public_key(), amount: 1_000_000 };
        let (sig, ctx) = signed_ctx(&ledger, &alice, &action, 0);
        ledger.submit(&action, &sig, &ctx).unwrap();

        let mut snapshot = ledger.snapshot().clone();
        snapshot.state.credit_scores[0].score = 1_001;

        let result = Ledger::from_source(&InMemorySource::new(snapshot));
        assert!(matches!(result, Err(LendError::InvalidConfig { param: "credit_scores", .. })));
    }

    #[test]
    fn test_new_rejects_bad_config() {
        let config = PoolConfig { owner: [0u8; 32], reward_pool: [1u8; 32], base_reward_rate: 1 };
        assert!(Ledger::new(config).is_err());
    }
}
