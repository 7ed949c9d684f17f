// Access control: privileged role holders and the system-wide halt switch

use std::collections::BTreeMap;
use std::fmt;

use alloy_primitives::Address;
use serde::{Deserialize, Serialize};

use crate::error::{HeatError, Result};

/// Privileged roles checked at the entry points that need them
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Assigns roles and halts/resumes the system
    Owner,
    /// Allowed to run fee collection
    FeeCollector,
    /// Receives the treasury share and may burn its own balance
    Treasury,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Owner, Role::FeeCollector, Role::Treasury];
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Role::Owner => "owner",
            Role::FeeCollector => "fee_collector",
            Role::Treasury => "treasury",
        };
        f.write_str(name)
    }
}

/// Whether mutating operations are accepted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SystemStatus {
    #[default]
    Active,
    Halted,
}

/// Capability table: one holder per role.
/// An unassigned role is held by nobody.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleTable {
    holders: BTreeMap<Role, Address>,
}

impl RoleTable {
    pub fn new(owner: Address, fee_collector: Address, treasury: Address) -> Self {
        let mut table = Self::default();
        table.assign(Role::Owner, owner);
        table.assign(Role::FeeCollector, fee_collector);
        table.assign(Role::Treasury, treasury);
        table
    }

    /// Current holder of `role`, if any
    pub fn holder(&self, role: Role) -> Option<Address> {
        self.holders.get(&role).copied()
    }

    /// Fails with `Unauthorized` unless `caller` holds `role`
    pub fn require(&self, role: Role, caller: Address) -> Result<()> {
        match self.holder(role) {
            Some(holder) if holder == caller => Ok(()),
            _ => Err(HeatError::Unauthorized { role, caller }),
        }
    }

    /// Replace the holder of `role`, returning the previous one.
    /// Assigning the zero address clears the role.
    pub fn assign(&mut self, role: Role, new_holder: Address) -> Option<Address> {
        if new_holder.is_zero() {
            self.holders.remove(&role)
        } else {
            self.holders.insert(role, new_holder)
        }
    }
}
