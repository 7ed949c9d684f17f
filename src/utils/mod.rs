// Hashing helpers shared by claim validation and proof attestation

pub mod keccak;
