// Keccak256 helpers for recipient binding and claim records

use alloy_primitives::{Address, B256};
use sha3::{Digest, Keccak256};

/// Ethereum Keccak256 of `input`
pub fn keccak256(input: &[u8]) -> [u8; 32] {
    let mut hasher = Keccak256::new();
    hasher.update(input);
    hasher.finalize().into()
}

/// Compute Keccak256 over several byte slices as if they were concatenated
pub fn keccak256_concat(parts: &[&[u8]]) -> B256 {
    let mut hasher = Keccak256::new();
    for part in parts {
        hasher.update(part);
    }
    B256::from(<[u8; 32]>::from(hasher.finalize()))
}

/// Hash binding a proof to its recipient: keccak256 of the 20 address bytes
pub fn recipient_hash(recipient: &Address) -> B256 {
    B256::from(keccak256(recipient.as_slice()))
}

/// Key of a claim's authorization record: keccak256(secret || commitment)
pub fn claim_hash(secret: &B256, commitment: &B256) -> B256 {
    keccak256_concat(&[secret.as_slice(), commitment.as_slice()])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_input_vector() {
        let hash = keccak256(b"");
        let expected = hex::decode("c5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470")
            .unwrap();
        assert_eq!(hash.as_slice(), expected.as_slice());
    }

    #[test]
    fn test_concat_matches_single_buffer() {
        let joined = keccak256(b"helloworld");
        let parts = keccak256_concat(&[b"hello".as_slice(), b"world".as_slice()]);
        assert_eq!(parts.as_slice(), joined.as_slice());
    }

    #[test]
    fn test_recipient_hash_is_address_keccak() {
        let recipient = Address::repeat_byte(0x11);
        let expected = keccak256(&[0x11; 20]);
        assert_eq!(recipient_hash(&recipient).as_slice(), expected.as_slice());
    }

    #[test]
    fn test_claim_hash_depends_on_both_halves() {
        let secret = B256::repeat_byte(1);
        let commitment = B256::repeat_byte(2);

        let base = claim_hash(&secret, &commitment);
        assert_ne!(base, claim_hash(&B256::repeat_byte(3), &commitment));
        assert_ne!(base, claim_hash(&secret, &B256::repeat_byte(3)));
        assert_eq!(base, claim_hash(&secret, &commitment));
    }
}
