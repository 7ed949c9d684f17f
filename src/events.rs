// Authorization record stream
// One event per successful claim, per supply/balance movement and per role change.

use std::time::{SystemTime, UNIX_EPOCH};

use alloy_primitives::{Address, B256, U256};
use serde::{Deserialize, Serialize};

use crate::access::{Role, SystemStatus};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EventKind {
    /// A burn proof was accepted and HEAT minted for it
    ClaimAuthorized {
        claim_hash: B256,
        recipient: Address,
        mint_amount: U256,
        nullifier: B256,
    },
    Minted {
        account: Address,
        amount: U256,
    },
    Burned {
        account: Address,
        amount: U256,
    },
    Transfer {
        from: Address,
        to: Address,
        amount: U256,
    },
    Approval {
        owner: Address,
        spender: Address,
        amount: U256,
    },
    FeesCollected {
        account: Address,
        treasury: Address,
        total: U256,
        burned: U256,
        to_treasury: U256,
        for_distribution: U256,
    },
    TreasuryBurned {
        treasury: Address,
        amount: U256,
    },
    RoleChanged {
        role: Role,
        old: Option<Address>,
        new: Option<Address>,
    },
    StatusChanged {
        status: SystemStatus,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// Unix seconds at emission
    pub timestamp: u64,
    #[serde(flatten)]
    pub kind: EventKind,
}

impl Event {
    pub fn now(kind: EventKind) -> Self {
        Self { timestamp: unix_now(), kind }
    }
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_json_is_tagged() {
        let event = Event {
            timestamp: 7,
            kind: EventKind::TreasuryBurned {
                treasury: Address::repeat_byte(3),
                amount: U256::from(5),
            },
        };

        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["type"], "treasury_burned");
        assert_eq!(value["timestamp"], 7);

        let back: Event = serde_json::from_value(value).unwrap();
        assert_eq!(back, event);
    }

    #[test]
    fn test_now_is_after_epoch() {
        let event = Event::now(EventKind::StatusChanged { status: SystemStatus::Halted });
        assert!(event.timestamp > 0);
    }
}
