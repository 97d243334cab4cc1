//! LendPool Common Library
//!
//! Shared types, constants, and utilities for the LendPool ledger.
//!
//! ## State Machine Model
//!
//! LendPool is a deterministic state machine. Every mutation is a
//! transition that any party can re-execute:
//! - **Fixed-capacity records**: deposits, loans and credit entries live in
//!   explicitly indexed arrays chosen by the caller
//! - **Authorized transitions**: each operation is signed by the identity
//!   that controls it (owner, borrower or depositor)
//! - **Committed effects**: the fund movements implied by a transition are
//!   hashed and must match the commitment declared by the caller
//! - **All-or-nothing**: a rejected transition leaves no trace
//!
//! ## Modules
//!
//! - **constants**: Protocol parameters (capacities, rates, limits)
//! - **errors**: Typed error taxonomy with stable codes
//! - **types**: Records, identities, actions
//! - **math**: Interest, penalty, yield, limit and reward arithmetic
//! - **scoring**: Credit score update table and unsecured eligibility
//! - **auth**: Signature digests and the authorization guard
//! - **commitment**: Fund movements and their canonical hash
//! - **events**: Typed event log for indexers and display layers
//! - **validation**: `check!` macro and `require_*` helpers
//!
//! This crate is `no_std` compatible when built without the `std` feature.

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(not(feature = "std"))]
extern crate alloc;

// Re-export Vec for submodules based on feature
#[cfg(not(feature = "std"))]
pub use alloc::vec::Vec;
#[cfg(feature = "std")]
pub use std::vec::Vec;

pub mod constants;
pub mod errors;
pub mod types;
pub mod math;
pub mod scoring;
pub mod auth;
pub mod commitment;
pub mod events;
pub mod validation;

// Re-exports for convenience
pub use constants::*;
pub use errors::*;
pub use types::*;
pub use math::*;
pub use scoring::*;
pub use auth::*;
pub use commitment::*;
pub use events::*;
