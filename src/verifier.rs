// Proof verifier boundary
//
// STARK verification is performed by an external verifier. The core only sees
// a synchronous yes/no answer and treats every failure mode as a rejection.

use std::collections::BTreeSet;
use std::panic::{catch_unwind, AssertUnwindSafe};

use alloy_primitives::B256;
use serde::{Deserialize, Serialize};

use crate::constants::PUBLIC_INPUT_COUNT;
use crate::utils::keccak::keccak256_concat;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VerifierError {
    #[error("Malformed proof: {reason}")]
    MalformedProof { reason: String },

    #[error("Malformed verifier response: {reason}")]
    MalformedResponse { reason: String },

    #[error("Verifier unavailable: {reason}")]
    Unavailable { reason: String },
}

/// External STARK proof verifier
pub trait ProofVerifier: Send + Sync {
    /// Check `proof` against its public inputs
    /// (nullifier, commitment, recipient hash, network id)
    fn verify(
        &self,
        proof: &[u8],
        public_inputs: &[B256; PUBLIC_INPUT_COUNT],
    ) -> Result<bool, VerifierError>;
}

impl<F> ProofVerifier for F
where
    F: Fn(&[u8], &[B256; PUBLIC_INPUT_COUNT]) -> Result<bool, VerifierError> + Send + Sync,
{
    fn verify(
        &self,
        proof: &[u8],
        public_inputs: &[B256; PUBLIC_INPUT_COUNT],
    ) -> Result<bool, VerifierError> {
        self(proof, public_inputs)
    }
}

/// Call an untrusted verifier. Returns `true` only for an explicit acceptance;
/// errors and panics inside the verifier count as rejection.
pub fn verify_untrusted(
    verifier: &dyn ProofVerifier,
    proof: &[u8],
    public_inputs: &[B256; PUBLIC_INPUT_COUNT],
) -> bool {
    match catch_unwind(AssertUnwindSafe(|| verifier.verify(proof, public_inputs))) {
        Ok(Ok(accepted)) => accepted,
        Ok(Err(e)) => {
            log::warn!("verifier error treated as rejection: {}", e);
            false
        }
        Err(_) => {
            log::warn!("verifier panicked; treating proof as rejected");
            false
        }
    }
}

/// Digest identifying a (proof, public inputs) pair
pub fn proof_digest(proof: &[u8], public_inputs: &[B256; PUBLIC_INPUT_COUNT]) -> B256 {
    let mut parts: Vec<&[u8]> = Vec::with_capacity(PUBLIC_INPUT_COUNT + 1);
    parts.push(proof);
    parts.extend(public_inputs.iter().map(|input| input.as_slice()));
    keccak256_concat(&parts)
}

/// Accepts exactly the proofs whose [`proof_digest`] has been attested by an
/// off-line STARK verification run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AttestedProofVerifier {
    attested: BTreeSet<B256>,
}

impl AttestedProofVerifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attest(&mut self, proof: &[u8], public_inputs: &[B256; PUBLIC_INPUT_COUNT]) -> B256 {
        let digest = proof_digest(proof, public_inputs);
        self.attested.insert(digest);
        digest
    }

    pub fn len(&self) -> usize {
        self.attested.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attested.is_empty()
    }
}

impl ProofVerifier for AttestedProofVerifier {
    fn verify(
        &self,
        proof: &[u8],
        public_inputs: &[B256; PUBLIC_INPUT_COUNT],
    ) -> Result<bool, VerifierError> {
        if proof.is_empty() {
            return Err(VerifierError::MalformedProof {
                reason: "empty proof".to_string(),
            });
        }
        Ok(self.attested.contains(&proof_digest(proof, public_inputs)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inputs() -> [B256; PUBLIC_INPUT_COUNT] {
        [
            B256::repeat_byte(1),
            B256::repeat_byte(2),
            B256::repeat_byte(3),
            B256::repeat_byte(4),
        ]
    }

    #[test]
    fn test_closure_verifier() {
        let accept_all = |_: &[u8], _: &[B256; PUBLIC_INPUT_COUNT]| -> Result<bool, VerifierError> { Ok(true) };
        assert!(verify_untrusted(&accept_all, b"proof", &inputs()));
    }

    #[test]
    fn test_error_counts_as_rejection() {
        let failing = |_: &[u8], _: &[B256; PUBLIC_INPUT_COUNT]| -> Result<bool, VerifierError> {
            Err(VerifierError::Unavailable { reason: "timeout".to_string() })
        };
        assert!(!verify_untrusted(&failing, b"proof", &inputs()));
    }

    #[test]
    fn test_panic_counts_as_rejection() {
        let panicking = |_: &[u8], _: &[B256; PUBLIC_INPUT_COUNT]| -> Result<bool, VerifierError> {
            panic!("verifier blew up")
        };
        assert!(!verify_untrusted(&panicking, b"proof", &inputs()));
    }

    #[test]
    fn test_attested_verifier() {
        let mut verifier = AttestedProofVerifier::new();
        verifier.attest(b"good proof", &inputs());

        assert_eq!(verifier.verify(b"good proof", &inputs()), Ok(true));
        assert_eq!(verifier.verify(b"other proof", &inputs()), Ok(false));

        let mut tampered = inputs();
        tampered[1] = B256::repeat_byte(9);
        assert_eq!(verifier.verify(b"good proof", &tampered), Ok(false));

        assert!(verifier.verify(b"", &inputs()).is_err());
    }

    #[test]
    fn test_digest_binds_every_input() {
        let base = proof_digest(b"p", &inputs());
        for i in 0..PUBLIC_INPUT_COUNT {
            let mut changed = inputs();
            changed[i] = B256::ZERO;
            assert_ne!(proof_digest(b"p", &changed), base);
        }
    }
}
