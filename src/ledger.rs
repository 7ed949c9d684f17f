// Fungible HEAT ledger: balances, allowances, total supply and its ceiling
//
// Every operation validates before it writes, so a failed call leaves
// the ledger untouched and total supply always equals the sum of balances.

use std::collections::BTreeMap;

use alloy_primitives::{Address, U256};
use serde::{Deserialize, Serialize};

use crate::constants::max_supply;
use crate::error::{HeatError, Result};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ledger {
    balances: BTreeMap<Address, U256>,
    allowances: BTreeMap<Address, BTreeMap<Address, U256>>,
    total_supply: U256,
    /// Fixed at `MAX_SUPPLY`; never read from a snapshot
    #[serde(skip, default = "max_supply")]
    ceiling: U256,
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new()
    }
}

impl Ledger {
    /// Empty ledger capped at `MAX_SUPPLY`
    pub fn new() -> Self {
        Self {
            balances: BTreeMap::new(),
            allowances: BTreeMap::new(),
            total_supply: U256::ZERO,
            ceiling: max_supply(),
        }
    }

    pub fn balance_of(&self, account: &Address) -> U256 {
        self.balances.get(account).copied().unwrap_or_default()
    }

    pub fn allowance(&self, owner: &Address, spender: &Address) -> U256 {
        self.allowances
            .get(owner)
            .and_then(|spenders| spenders.get(spender))
            .copied()
            .unwrap_or_default()
    }

    pub fn total_supply(&self) -> U256 {
        self.total_supply
    }

    pub fn max_supply(&self) -> U256 {
        self.ceiling
    }

    /// Units that can still be minted before hitting the ceiling
    pub fn headroom(&self) -> U256 {
        self.ceiling.saturating_sub(self.total_supply)
    }

    /// Credit `amount` to `account`, growing total supply by the same amount
    pub fn mint(&mut self, account: Address, amount: U256) -> Result<()> {
        if amount.is_zero() {
            return Err(HeatError::ZeroAmount);
        }
        if account.is_zero() {
            return Err(HeatError::InvalidAccount);
        }

        let new_supply = self
            .total_supply
            .checked_add(amount)
            .filter(|supply| *supply <= self.ceiling)
            .ok_or(HeatError::SupplyCeilingExceeded {
                supply: self.total_supply,
                amount,
                ceiling: self.ceiling,
            })?;

        // Cannot overflow: the balance is bounded by the new supply
        let balance = self.balance_of(&account) + amount;
        self.balances.insert(account, balance);
        self.total_supply = new_supply;
        Ok(())
    }

    /// Debit `amount` from `account`, shrinking total supply by the same amount.
    /// Burning zero is a no-op.
    pub fn burn(&mut self, account: Address, amount: U256) -> Result<()> {
        let balance = self.require_balance(&account, amount)?;
        if amount.is_zero() {
            return Ok(());
        }

        self.set_balance(account, balance - amount);
        self.total_supply -= amount;
        Ok(())
    }

    /// Move `amount` between accounts without touching supply
    pub fn transfer_internal(&mut self, from: Address, to: Address, amount: U256) -> Result<()> {
        if to.is_zero() {
            return Err(HeatError::InvalidAccount);
        }
        let from_balance = self.require_balance(&from, amount)?;
        if amount.is_zero() || from == to {
            return Ok(());
        }

        self.set_balance(from, from_balance - amount);
        let to_balance = self.balance_of(&to) + amount;
        self.set_balance(to, to_balance);
        Ok(())
    }

    /// Set the allowance `owner` grants `spender`
    pub fn approve(&mut self, owner: Address, spender: Address, amount: U256) -> Result<()> {
        if owner.is_zero() || spender.is_zero() {
            return Err(HeatError::InvalidAccount);
        }

        let spenders = self.allowances.entry(owner).or_default();
        if amount.is_zero() {
            spenders.remove(&spender);
            if spenders.is_empty() {
                self.allowances.remove(&owner);
            }
        } else {
            spenders.insert(spender, amount);
        }
        Ok(())
    }

    /// Check that `spender` may move `amount` of `owner`'s balance and consume it.
    /// An allowance of `U256::MAX` is treated as unlimited and never decreases.
    pub fn spend_allowance(&mut self, owner: Address, spender: Address, amount: U256) -> Result<()> {
        let allowance = self.allowance(&owner, &spender);
        if allowance < amount {
            return Err(HeatError::InsufficientAllowance {
                owner,
                spender,
                allowance,
                required: amount,
            });
        }
        if allowance != U256::MAX && !amount.is_zero() {
            self.approve(owner, spender, allowance - amount)?;
        }
        Ok(())
    }

    /// Recompute the sum of balances and compare it with total supply
    pub fn audit(&self) -> bool {
        let mut sum = U256::ZERO;
        for balance in self.balances.values() {
            match sum.checked_add(*balance) {
                Some(next) => sum = next,
                None => return false,
            }
        }
        sum == self.total_supply && self.total_supply <= self.ceiling
    }

    /// Number of accounts with a non-zero balance
    pub fn holder_count(&self) -> usize {
        self.balances.len()
    }

    fn require_balance(&self, account: &Address, amount: U256) -> Result<U256> {
        let balance = self.balance_of(account);
        if balance < amount {
            return Err(HeatError::InsufficientBalance {
                account: *account,
                balance,
                required: amount,
            });
        }
        Ok(balance)
    }

    fn set_balance(&mut self, account: Address, balance: U256) {
        if balance.is_zero() {
            self.balances.remove(&account);
        } else {
            self.balances.insert(account, balance);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alice() -> Address {
        Address::repeat_byte(0xA1)
    }

    fn bob() -> Address {
        Address::repeat_byte(0xB0)
    }

    #[test]
    fn test_mint_increases_balance_and_supply() {
        let mut ledger = Ledger::new();
        ledger.mint(alice(), U256::from(500)).unwrap();
        ledger.mint(alice(), U256::from(250)).unwrap();

        assert_eq!(ledger.balance_of(&alice()), U256::from(750));
        assert_eq!(ledger.total_supply(), U256::from(750));
        assert!(ledger.audit());
    }

    #[test]
    fn test_mint_rejects_zero_amount_and_zero_account() {
        let mut ledger = Ledger::new();
        assert_eq!(ledger.mint(alice(), U256::ZERO), Err(HeatError::ZeroAmount));
        assert_eq!(
            ledger.mint(Address::ZERO, U256::from(1)),
            Err(HeatError::InvalidAccount)
        );
        assert_eq!(ledger.total_supply(), U256::ZERO);
    }

    #[test]
    fn test_mint_up_to_ceiling_then_reject() {
        let mut ledger = Ledger::new();
        let ceiling = ledger.max_supply();

        ledger.mint(alice(), ceiling - U256::from(1)).unwrap();
        ledger.mint(bob(), U256::from(1)).unwrap();
        assert_eq!(ledger.total_supply(), ceiling);
        assert_eq!(ledger.headroom(), U256::ZERO);

        let err = ledger.mint(bob(), U256::from(1)).unwrap_err();
        assert!(matches!(err, HeatError::SupplyCeilingExceeded { .. }));
        assert_eq!(ledger.total_supply(), ceiling);
        assert_eq!(ledger.balance_of(&bob()), U256::from(1));
    }

    #[test]
    fn test_mint_overflowing_u256_reports_ceiling() {
        let mut ledger = Ledger::new();
        ledger.mint(alice(), U256::from(10)).unwrap();

        let err = ledger.mint(alice(), U256::MAX).unwrap_err();
        assert!(matches!(err, HeatError::SupplyCeilingExceeded { .. }));
        assert_eq!(ledger.total_supply(), U256::from(10));
    }

    #[test]
    fn test_burn_decreases_balance_and_supply() {
        let mut ledger = Ledger::new();
        ledger.mint(alice(), U256::from(100)).unwrap();
        ledger.burn(alice(), U256::from(40)).unwrap();

        assert_eq!(ledger.balance_of(&alice()), U256::from(60));
        assert_eq!(ledger.total_supply(), U256::from(60));
        assert!(ledger.audit());
    }

    #[test]
    fn test_burn_insufficient_balance_leaves_state() {
        let mut ledger = Ledger::new();
        ledger.mint(alice(), U256::from(10)).unwrap();
        let before = ledger.clone();

        let err = ledger.burn(alice(), U256::from(11)).unwrap_err();
        assert_eq!(
            err,
            HeatError::InsufficientBalance {
                account: alice(),
                balance: U256::from(10),
                required: U256::from(11),
            }
        );
        assert_eq!(ledger, before);
    }

    #[test]
    fn test_transfer_internal_keeps_supply() {
        let mut ledger = Ledger::new();
        ledger.mint(alice(), U256::from(100)).unwrap();
        ledger.transfer_internal(alice(), bob(), U256::from(100)).unwrap();

        assert_eq!(ledger.balance_of(&alice()), U256::ZERO);
        assert_eq!(ledger.balance_of(&bob()), U256::from(100));
        assert_eq!(ledger.total_supply(), U256::from(100));
        assert_eq!(ledger.holder_count(), 1);
        assert!(ledger.audit());
    }

    #[test]
    fn test_transfer_internal_to_self_is_noop() {
        let mut ledger = Ledger::new();
        ledger.mint(alice(), U256::from(5)).unwrap();
        ledger.transfer_internal(alice(), alice(), U256::from(5)).unwrap();
        assert_eq!(ledger.balance_of(&alice()), U256::from(5));
    }

    #[test]
    fn test_transfer_internal_insufficient() {
        let mut ledger = Ledger::new();
        ledger.mint(alice(), U256::from(5)).unwrap();
        assert!(matches!(
            ledger.transfer_internal(alice(), bob(), U256::from(6)),
            Err(HeatError::InsufficientBalance { .. })
        ));
        assert_eq!(
            ledger.transfer_internal(alice(), Address::ZERO, U256::from(1)),
            Err(HeatError::InvalidAccount)
        );
    }

    #[test]
    fn test_allowance_spend() {
        let mut ledger = Ledger::new();
        ledger.approve(alice(), bob(), U256::from(30)).unwrap();
        ledger.spend_allowance(alice(), bob(), U256::from(20)).unwrap();
        assert_eq!(ledger.allowance(&alice(), &bob()), U256::from(10));

        let err = ledger.spend_allowance(alice(), bob(), U256::from(11)).unwrap_err();
        assert!(matches!(err, HeatError::InsufficientAllowance { .. }));
        assert_eq!(ledger.allowance(&alice(), &bob()), U256::from(10));

        ledger.spend_allowance(alice(), bob(), U256::from(10)).unwrap();
        assert_eq!(ledger.allowance(&alice(), &bob()), U256::ZERO);
    }

    #[test]
    fn test_unlimited_allowance_is_not_consumed() {
        let mut ledger = Ledger::new();
        ledger.approve(alice(), bob(), U256::MAX).unwrap();
        ledger.spend_allowance(alice(), bob(), U256::from(1_000)).unwrap();
        assert_eq!(ledger.allowance(&alice(), &bob()), U256::MAX);
    }
}
