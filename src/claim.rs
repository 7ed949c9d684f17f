// Claim authorization
//
// A claim presents a burn proof plus its four public inputs. Minting happens
// only after every gate passes, in this order:
//   1. recipient is not the zero address
//   2. exactly four public inputs
//   3. nullifier not yet consumed
//   4. recipient hash binds the proof to the recipient
//   5. network id names the accepted source chain
//   6. the external verifier accepts the proof
// The nullifier is consumed before the mint is attempted. A mint that fails
// afterwards (e.g. supply ceiling) does not give the nullifier back.

use alloy_primitives::{Address, Bytes, B256, U256};
use serde::{Deserialize, Serialize};

use crate::constants::{
    network_id_word, LARGE_BURN_AMOUNT, LARGE_MINT_AMOUNT, PUBLIC_INPUT_COUNT,
    STANDARD_BURN_AMOUNT, STANDARD_MINT_AMOUNT,
};
use crate::error::{HeatError, Result};
use crate::events::{Event, EventKind};
use crate::nullifier::{MarkOutcome, NullifierStore};
use crate::state::HeatState;
use crate::utils::keccak::{claim_hash, recipient_hash};
use crate::verifier::{verify_untrusted, ProofVerifier};

/// One of the two fixed (burn amount, mint amount) pairings.
/// On the wire a tier is the boolean "large" flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "bool", into = "bool")]
pub enum Tier {
    Standard,
    Large,
}

impl Tier {
    /// `true` selects the large tier
    pub fn from_flag(large: bool) -> Self {
        if large {
            Tier::Large
        } else {
            Tier::Standard
        }
    }

    pub fn is_large(self) -> bool {
        matches!(self, Tier::Large)
    }

    /// HEAT minted for a claim of this tier
    pub fn mint_amount(self) -> U256 {
        match self {
            Tier::Standard => U256::from(STANDARD_MINT_AMOUNT),
            Tier::Large => U256::from(LARGE_MINT_AMOUNT),
        }
    }

    /// Source-chain amount that must have been burned for this tier
    pub fn burn_amount(self) -> U256 {
        match self {
            Tier::Standard => U256::from(STANDARD_BURN_AMOUNT),
            Tier::Large => U256::from(LARGE_BURN_AMOUNT),
        }
    }
}

impl From<bool> for Tier {
    fn from(large: bool) -> Self {
        Tier::from_flag(large)
    }
}

impl From<Tier> for bool {
    fn from(tier: Tier) -> Self {
        tier.is_large()
    }
}

/// A request to mint HEAT against a burn proof. Never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claim {
    /// Source-chain secret; only feeds the claim hash of the emitted record
    pub secret: B256,

    /// Opaque proof bytes handed to the verifier
    pub proof: Bytes,

    /// nullifier, commitment, recipient hash, network id
    pub public_inputs: Vec<B256>,

    /// Account credited with the minted HEAT
    pub recipient: Address,

    pub tier: Tier,
}

/// The public inputs of a burn proof, in wire order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicInputs {
    pub nullifier: B256,
    pub commitment: B256,
    pub recipient_hash: B256,
    pub network_id: B256,
}

impl PublicInputs {
    /// Public inputs that bind a proof to `recipient` on the accepted network
    pub fn for_recipient(nullifier: B256, commitment: B256, recipient: &Address) -> Self {
        Self {
            nullifier,
            commitment,
            recipient_hash: recipient_hash(recipient),
            network_id: network_id_word(),
        }
    }

    pub fn from_slice(inputs: &[B256]) -> Result<Self> {
        match inputs {
            [nullifier, commitment, recipient_hash, network_id] => Ok(Self {
                nullifier: *nullifier,
                commitment: *commitment,
                recipient_hash: *recipient_hash,
                network_id: *network_id,
            }),
            _ => Err(HeatError::InvalidPublicInputCount {
                expected: PUBLIC_INPUT_COUNT,
                provided: inputs.len(),
            }),
        }
    }

    pub fn to_array(&self) -> [B256; PUBLIC_INPUT_COUNT] {
        [self.nullifier, self.commitment, self.recipient_hash, self.network_id]
    }
}

impl Claim {
    pub fn new(
        secret: B256,
        proof: impl Into<Bytes>,
        public_inputs: PublicInputs,
        recipient: Address,
        tier: Tier,
    ) -> Self {
        Self {
            secret,
            proof: proof.into(),
            public_inputs: public_inputs.to_array().to_vec(),
            recipient,
            tier,
        }
    }
}

/// What a successful claim produced
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MintReceipt {
    pub claim_hash: B256,
    pub recipient: Address,
    pub mint_amount: U256,
    pub nullifier: B256,
    pub tier: Tier,
}

/// Stateless claim gates; the engine supplies state and serialization
pub struct ClaimProcessor;

impl ClaimProcessor {
    /// Gates 1-5. Reads state only.
    pub fn precheck(claim: &Claim, nullifiers: &NullifierStore) -> Result<PublicInputs> {
        if claim.recipient.is_zero() {
            return Err(HeatError::InvalidRecipient);
        }

        let inputs = PublicInputs::from_slice(&claim.public_inputs)?;

        if nullifiers.is_used(&inputs.nullifier) {
            return Err(HeatError::NullifierReused { nullifier: inputs.nullifier });
        }

        if inputs.recipient_hash != recipient_hash(&claim.recipient) {
            return Err(HeatError::RecipientMismatch {
                recipient: claim.recipient,
                provided: inputs.recipient_hash,
            });
        }

        let expected = network_id_word();
        if inputs.network_id != expected {
            return Err(HeatError::WrongNetwork {
                expected,
                provided: inputs.network_id,
            });
        }

        log::debug!("claim for nullifier {} passed input gates", inputs.nullifier);
        Ok(inputs)
    }

    /// Gate 6
    pub fn verify_proof(
        verifier: &dyn ProofVerifier,
        claim: &Claim,
        inputs: &PublicInputs,
    ) -> Result<()> {
        if verify_untrusted(verifier, &claim.proof, &inputs.to_array()) {
            Ok(())
        } else {
            log::warn!("proof rejected for nullifier {}", inputs.nullifier);
            Err(HeatError::InvalidProof)
        }
    }

    /// Consume the nullifier, then mint the tier amount and record the claim.
    /// Must run in the same serialized operation as the gates above.
    pub fn commit(state: &mut HeatState, claim: &Claim, inputs: &PublicInputs) -> Result<MintReceipt> {
        if state.nullifiers.check_and_mark(inputs.nullifier) == MarkOutcome::AlreadyUsed {
            return Err(HeatError::NullifierReused { nullifier: inputs.nullifier });
        }

        let mint_amount = claim.tier.mint_amount();
        if let Err(e) = state.ledger.mint(claim.recipient, mint_amount) {
            log::warn!(
                "mint failed after consuming nullifier {}: {}",
                inputs.nullifier,
                e
            );
            return Err(e);
        }

        let counters = &mut state.counters;
        counters.total_claims += 1;
        counters.total_proofs_verified += 1;
        counters.total_minted = counters.total_minted.saturating_add(mint_amount);

        let receipt = MintReceipt {
            claim_hash: claim_hash(&claim.secret, &inputs.commitment),
            recipient: claim.recipient,
            mint_amount,
            nullifier: inputs.nullifier,
            tier: claim.tier,
        };

        state.events.push(Event::now(EventKind::ClaimAuthorized {
            claim_hash: receipt.claim_hash,
            recipient: receipt.recipient,
            mint_amount,
            nullifier: receipt.nullifier,
        }));
        state.events.push(Event::now(EventKind::Minted {
            account: receipt.recipient,
            amount: mint_amount,
        }));

        log::info!(
            "claim {} authorized: {} HEAT units to {}",
            receipt.claim_hash,
            mint_amount,
            receipt.recipient
        );
        Ok(receipt)
    }
}
