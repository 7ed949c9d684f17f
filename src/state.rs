// Persistent core state: everything a claim or collection can touch

use alloy_primitives::U256;
use serde::{Deserialize, Serialize};

use crate::access::{RoleTable, SystemStatus};
use crate::events::Event;
use crate::ledger::Ledger;
use crate::nullifier::NullifierStore;

/// Running totals exposed through the query surface
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Counters {
    pub total_claims: u64,
    pub total_proofs_verified: u64,
    pub total_minted: U256,
    /// Every unit removed from supply, by any path
    pub total_burned: U256,
    pub total_collected_for_fees: U256,
    pub total_burned_for_fees: U256,
    pub total_burned_by_treasury: U256,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeatState {
    pub ledger: Ledger,
    pub nullifiers: NullifierStore,
    pub roles: RoleTable,
    pub status: SystemStatus,
    pub counters: Counters,
    /// Events not yet drained by the embedder
    #[serde(default)]
    pub events: Vec<Event>,
}

impl HeatState {
    pub fn new(roles: RoleTable) -> Self {
        Self {
            roles,
            ..Self::default()
        }
    }

    /// Cross-check ledger and counters: balances sum to supply, minted minus
    /// burned equals supply, and every claim consumed a nullifier (a failed
    /// mint can consume one without counting as a claim).
    pub fn is_consistent(&self) -> bool {
        let net_minted = self
            .counters
            .total_minted
            .checked_sub(self.counters.total_burned);

        self.ledger.audit()
            && net_minted == Some(self.ledger.total_supply())
            && self.counters.total_claims <= self.nullifiers.len() as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::{Address, B256};

    #[test]
    fn test_fresh_state_is_consistent() {
        let state = HeatState::new(RoleTable::default());
        assert!(state.is_consistent());
        assert_eq!(state.status, SystemStatus::Active);
    }

    #[test]
    fn test_unrecorded_mint_is_inconsistent() {
        let mut state = HeatState::default();
        state.ledger.mint(Address::repeat_byte(1), U256::from(5)).unwrap();
        assert!(!state.is_consistent());

        state.counters.total_minted = U256::from(5);
        assert!(state.is_consistent());
    }

    #[test]
    fn test_snapshot_json_roundtrip() {
        let mut state = HeatState::new(RoleTable::new(
            Address::repeat_byte(1),
            Address::repeat_byte(2),
            Address::repeat_byte(3),
        ));
        state.ledger.mint(Address::repeat_byte(4), U256::from(77)).unwrap();
        state.counters.total_minted = U256::from(77);
        state.counters.total_claims = 1;
        state.nullifiers.check_and_mark(B256::repeat_byte(9));

        let json = serde_json::to_string_pretty(&state).unwrap();
        let restored: HeatState = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, state);
        assert!(restored.is_consistent());
    }
}
