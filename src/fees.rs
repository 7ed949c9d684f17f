// Fee collection: split a collected amount into burn / treasury / distribution
//
// burn         = floor(total * 8 / 100)
// treasury     = floor(total * 2 / 100)
// distribution = total - burn - treasury   (absorbs the rounding)

use alloy_primitives::{Address, U256};
use serde::{Deserialize, Serialize};

use crate::access::Role;
use crate::constants::fee_params::{BURN_PERCENT, PERCENT_DENOMINATOR, TREASURY_PERCENT};
use crate::error::{HeatError, Result};
use crate::events::{Event, EventKind};
use crate::state::HeatState;

/// The three shares of a collected amount. Always sums to `total`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeSplit {
    pub total: U256,
    pub burn: U256,
    pub treasury: U256,
    pub distribution: U256,
}

impl FeeSplit {
    pub fn compute(total: U256) -> Self {
        let burn = percent_of(total, BURN_PERCENT);
        let treasury = percent_of(total, TREASURY_PERCENT);
        // burn + treasury <= 10% of total, so this cannot underflow
        let distribution = total - burn - treasury;

        Self {
            total,
            burn,
            treasury,
            distribution,
        }
    }
}

/// floor(amount * percent / 100) without overflowing for any U256 amount
fn percent_of(amount: U256, percent: u128) -> U256 {
    let denominator = U256::from(PERCENT_DENOMINATOR);
    let percent = U256::from(percent);
    let whole = amount / denominator;
    let rest = amount % denominator;
    whole * percent + rest * percent / denominator
}

/// Applies fee splits and treasury burns to the ledger
pub struct FeeSplitter;

impl FeeSplitter {
    /// Burn the burn share of `total` from `account` and move the treasury
    /// share to the treasury. The distribution share stays in `account`,
    /// earmarked for the external distribution process.
    pub fn collect(
        state: &mut HeatState,
        caller: Address,
        account: Address,
        total: U256,
    ) -> Result<FeeSplit> {
        let treasury = Self::authorize(state, caller, account, total)?;
        Self::apply(state, account, treasury, total)
    }

    /// Like [`FeeSplitter::collect`], but first consumes `spender`'s
    /// allowance over `account` for the full `total`
    pub fn collect_from(
        state: &mut HeatState,
        caller: Address,
        account: Address,
        spender: Address,
        total: U256,
    ) -> Result<FeeSplit> {
        let treasury = Self::authorize(state, caller, account, total)?;
        state.ledger.spend_allowance(account, spender, total)?;
        Self::apply(state, account, treasury, total)
    }

    /// Treasury burns `amount` of its own balance
    pub fn burn_from_treasury(state: &mut HeatState, caller: Address, amount: U256) -> Result<()> {
        state.roles.require(Role::Treasury, caller)?;
        if amount.is_zero() {
            return Err(HeatError::ZeroAmount);
        }

        state.ledger.burn(caller, amount)?;

        let counters = &mut state.counters;
        counters.total_burned = counters.total_burned.saturating_add(amount);
        counters.total_burned_by_treasury = counters.total_burned_by_treasury.saturating_add(amount);

        state.events.push(Event::now(EventKind::Burned { account: caller, amount }));
        state.events.push(Event::now(EventKind::TreasuryBurned { treasury: caller, amount }));
        log::info!("treasury {} burned {}", caller, amount);
        Ok(())
    }

    /// Checks shared by both collection paths; returns the treasury holder
    fn authorize(state: &HeatState, caller: Address, account: Address, total: U256) -> Result<Address> {
        state.roles.require(Role::FeeCollector, caller)?;
        if account.is_zero() {
            return Err(HeatError::InvalidAccount);
        }
        let treasury = state
            .roles
            .holder(Role::Treasury)
            .ok_or(HeatError::InvalidAccount)?;

        let balance = state.ledger.balance_of(&account);
        if balance < total {
            return Err(HeatError::InsufficientBalance {
                account,
                balance,
                required: total,
            });
        }
        Ok(treasury)
    }

    /// Cannot fail once `authorize` has passed: the balance covers
    /// burn + treasury and the treasury address is non-zero
    fn apply(state: &mut HeatState, account: Address, treasury: Address, total: U256) -> Result<FeeSplit> {
        let split = FeeSplit::compute(total);

        if !split.burn.is_zero() {
            state.ledger.burn(account, split.burn)?;
            state.events.push(Event::now(EventKind::Burned { account, amount: split.burn }));
        }
        if !split.treasury.is_zero() {
            state.ledger.transfer_internal(account, treasury, split.treasury)?;
            state.events.push(Event::now(EventKind::Transfer {
                from: account,
                to: treasury,
                amount: split.treasury,
            }));
        }

        let counters = &mut state.counters;
        counters.total_collected_for_fees = counters.total_collected_for_fees.saturating_add(total);
        counters.total_burned_for_fees = counters.total_burned_for_fees.saturating_add(split.burn);
        counters.total_burned = counters.total_burned.saturating_add(split.burn);

        state.events.push(Event::now(EventKind::FeesCollected {
            account,
            treasury,
            total,
            burned: split.burn,
            to_treasury: split.treasury,
            for_distribution: split.distribution,
        }));

        log::info!(
            "collected {} from {}: burn {}, treasury {}, distribution {}",
            total,
            account,
            split.burn,
            split.treasury,
            split.distribution
        );
        Ok(split)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn split(total: u64) -> (u64, u64, u64) {
        let s = FeeSplit::compute(U256::from(total));
        (s.burn.to::<u64>(), s.treasury.to::<u64>(), s.distribution.to::<u64>())
    }

    #[test]
    fn test_even_split() {
        assert_eq!(split(1000), (80, 20, 900));
    }

    #[test]
    fn test_remainder_goes_to_distribution() {
        assert_eq!(split(1001), (80, 20, 901));
        assert_eq!(split(99), (7, 1, 91));
        assert_eq!(split(12), (0, 0, 12));
    }

    #[test]
    fn test_zero() {
        assert_eq!(split(0), (0, 0, 0));
    }

    #[test]
    fn test_max_u256_does_not_overflow() {
        let s = FeeSplit::compute(U256::MAX);
        assert_eq!(s.burn + s.treasury + s.distribution, U256::MAX);
        assert_eq!(s.burn, U256::MAX / U256::from(100) * U256::from(8) + U256::from(35 * 8 / 100));
    }

    #[test]
    fn test_percent_of_matches_naive_formula() {
        for amount in [0u64, 1, 13, 99, 100, 101, 12_345, 987_654_321] {
            let naive = U256::from(amount) * U256::from(8) / U256::from(100);
            assert_eq!(percent_of(U256::from(amount), 8), naive);
        }
    }
}
