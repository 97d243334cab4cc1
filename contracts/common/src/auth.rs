//! Authorization Guard
//!
//! Every mutation must carry an Ed25519 signature from the identity that
//! controls it. The signed message binds the action to the digest of the
//! state it was built against, so a signature is only good for one state
//! version.
//!
//! A successful check yields an [`AuthToken`], the only way for the engine
//! to learn who authorized a transition.

use ed25519_dalek::{Signature, Signer as DalekSigner, SigningKey, Verifier, VerifyingKey};
use sha2::{Digest, Sha256};

use crate::constants::domain;
use crate::errors::{LendError, LendResult};
use crate::types::{PoolAction, PubKey, SignatureBytes, StateDigest};

/// Message digest signed for an action against a given pre-state
///
/// digest = SHA-256(ACTION_TAG ‖ borsh(action) ‖ pre_state_digest)
pub fn signing_digest(action: &PoolAction, pre_state_digest: &StateDigest) -> LendResult<[u8; 32]> {
    let action_bytes = borsh::to_vec(action)
        .map_err(|_| LendError::InvalidRequest { reason: "action not serializable" })?;

    let mut hasher = Sha256::new();
    hasher.update(domain::ACTION_TAG);
    hasher.update(&action_bytes);
    hasher.update(pre_state_digest);
    Ok(hasher.finalize().into())
}

/// Proof that `signer` authorized the transition with message `digest`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthToken {
    signer: PubKey,
    digest: [u8; 32],
}

impl AuthToken {
    /// Message that was signed
    pub fn digest(&self) -> &[u8; 32] {
        &self.digest
    }

    /// Returns true if this token was issued for `identity`
    pub fn is_for(&self, identity: &PubKey) -> bool {
        self.signer == *identity
    }
}

/// Verify `signature` by `required` over `digest`
pub fn authorize(required: &PubKey, digest: &[u8; 32], signature: &SignatureBytes) -> LendResult<AuthToken> {
    let verifying_key = VerifyingKey::from_bytes(required)
        .map_err(|_| LendError::InvalidPublicKey { key: *required })?;

    let signature = Signature::from_bytes(&signature.0);

    verifying_key
        .verify(digest, &signature)
        .map_err(|_| LendError::InvalidSignature { signer: *required })?;

    Ok(AuthToken { signer: *required, digest: *digest })
}

/// Signs pool actions with an Ed25519 key
pub struct PoolSigner {
    signing_key: SigningKey,
}

impl PoolSigner {
    /// Create from a 32-byte secret seed
    pub fn from_seed(seed: &[u8; 32]) -> Self {
        Self { signing_key: SigningKey::from_bytes(seed) }
    }

    /// Identity of this signer
    pub fn public_key(&self) -> PubKey {
        self.signing_key.verifying_key().to_bytes()
    }

    /// Sign a raw digest
    pub fn sign_digest(&self, digest: &[u8; 32]) -> SignatureBytes {
        SignatureBytes(self.signing_key.sign(digest).to_bytes())
    }

    /// Sign an action built against the state with `pre_state_digest`
    pub fn sign_action(&self, action: &PoolAction, pre_state_digest: &StateDigest) -> LendResult<SignatureBytes> {
        let digest = signing_digest(action, pre_state_digest)?;
        Ok(self.sign_digest(&digest))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn deposit_action(depositor: PubKey) -> PoolAction {
        PoolAction::Deposit { slot: 0, depositor, amount: 1_000_000 }
    }

    #[test]
    fn test_sign_and_authorize() {
        let signer = PoolSigner::from_seed(&[1u8; 32]);
        let action = deposit_action(signer.public_key());
        let state = [4u8; 32];

        let sig = signer.sign_action(&action, &state).unwrap();
        let digest = signing_digest(&action, &state).unwrap();
        let token = authorize(&signer.public_key(), &digest, &sig).unwrap();

        assert!(token.is_for(&signer.public_key()));
        assert_eq!(token.digest(), &digest);
    }

    #[test]
    fn test_wrong_signer_rejected() {
        let alice = PoolSigner::from_seed(&[1u8; 32]);
        let mallory = PoolSigner::from_seed(&[2u8; 32]);
        let action = deposit_action(alice.public_key());
        let state = [0u8; 32];

        let sig = mallory.sign_action(&action, &state).unwrap();
        let digest = signing_digest(&action, &state).unwrap();
        let result = authorize(&alice.public_key(), &digest, &sig);

        assert!(matches!(result, Err(LendError::InvalidSignature { .. })));
    }

    #[test]
    fn test_digest_binds_pre_state() {
        let action = deposit_action([9u8; 32]);
        let a = signing_digest(&action, &[0u8; 32]).unwrap();
        let b = signing_digest(&action, &[1u8; 32]).unwrap();
        assert_ne!(a, b);

        let other = PoolAction::Deposit { slot: 1, depositor: [9u8; 32], amount: 1_000_000 };
        assert_ne!(a, signing_digest(&other, &[0u8; 32]).unwrap());
    }

    #[test]
    fn test_signature_for_other_state_rejected() {
        let signer = PoolSigner::from_seed(&[3u8; 32]);
        let action = deposit_action(signer.public_key());

        let sig = signer.sign_action(&action, &[0u8; 32]).unwrap();
        let digest = signing_digest(&action, &[1u8; 32]).unwrap();

        assert!(authorize(&signer.public_key(), &digest, &sig).is_err());
    }
}
