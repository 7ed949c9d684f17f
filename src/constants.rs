// Fixed constants for HEAT claims and fee collection
// These are part of the wire contract: any reimplementation must match them exactly.

use alloy_primitives::{B256, U256};

/// Decimals of the source-chain burn unit (wei-style)
pub const BURN_UNIT_DECIMALS: u8 = 18;

/// Decimals of HEAT
pub const HEAT_DECIMALS: u8 = 18;

/// HEAT base units minted per burned source-chain base unit.
/// Shared by both tiers, so every tier mints at the same rate.
pub const HEAT_PER_BURN_UNIT: u128 = 100_000;

/// Standard tier: 0.01 source units burned
pub const STANDARD_BURN_AMOUNT: u128 = 10_000_000_000_000_000;

/// Standard tier: 1,000 HEAT minted
pub const STANDARD_MINT_AMOUNT: u128 = 1_000_000_000_000_000_000_000;

/// Large tier: 0.1 source units burned
pub const LARGE_BURN_AMOUNT: u128 = 100_000_000_000_000_000;

/// Large tier: 10,000 HEAT minted
pub const LARGE_MINT_AMOUNT: u128 = 10_000_000_000_000_000_000_000;

/// Backstop ceiling on total supply: 1,000,000,000 HEAT
pub const MAX_SUPPLY: u128 = 1_000_000_000_000_000_000_000_000_000;

/// Identifier of the source chain whose burns are accepted
pub const NETWORK_ID: u64 = 1;

/// Number of public inputs a burn proof commits to:
/// nullifier, commitment, recipient hash, network id
pub const PUBLIC_INPUT_COUNT: usize = 4;

/// Fee split parameters (percent of the collected amount)
pub mod fee_params {
    /// Share burned on collection
    pub const BURN_PERCENT: u128 = 8;

    /// Share sent to the treasury
    pub const TREASURY_PERCENT: u128 = 2;

    /// Share left for the external distribution process (absorbs rounding)
    pub const DISTRIBUTION_PERCENT: u128 = 90;

    pub const PERCENT_DENOMINATOR: u128 = 100;
}

/// The network id as it appears in a proof's public inputs
/// (big-endian, left-padded to a 32-byte word)
pub fn network_id_word() -> B256 {
    B256::left_padding_from(&NETWORK_ID.to_be_bytes())
}

/// Supply ceiling as a ledger amount
pub fn max_supply() -> U256 {
    U256::from(MAX_SUPPLY)
}
