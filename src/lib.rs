// HEAT burn-claim core
// Mints HEAT only against source-chain burn proofs, each consumable once,
// and splits collected fees across burn / treasury / distribution.

pub mod constants;
pub mod error;
pub mod utils;
pub mod access;
pub mod ledger;
pub mod nullifier;
pub mod verifier;
pub mod events;
pub mod state;
pub mod claim;
pub mod fees;
pub mod engine;
pub mod config;

// Re-export commonly used types
pub use constants::*;
pub use error::{ErrorKind, HeatError};
pub use access::{Role, RoleTable, SystemStatus};
pub use claim::{Claim, MintReceipt, PublicInputs, Tier};
pub use engine::HeatEngine;
pub use fees::FeeSplit;
pub use nullifier::MarkOutcome;
pub use state::{Counters, HeatState};
pub use verifier::{AttestedProofVerifier, ProofVerifier, VerifierError};
