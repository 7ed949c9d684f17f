// Fee Split Tests
// Arithmetic properties of the burn / treasury / distribution split

use alloy_primitives::U256;
use heat_burn_claims::FeeSplit;
use proptest::prelude::*;

fn split(total: u128) -> (u128, u128, u128) {
    let s = FeeSplit::compute(U256::from(total));
    (s.burn.to::<u128>(), s.treasury.to::<u128>(), s.distribution.to::<u128>())
}

#[cfg(test)]
mod fee_split_scenario_tests {
    use super::*;

    #[test]
    fn test_thousand() {
        assert_eq!(split(1000), (80, 20, 900));
    }

    #[test]
    fn test_thousand_and_one() {
        assert_eq!(split(1001), (80, 20, 901));
    }

    #[test]
    fn test_small_amounts_go_to_distribution() {
        for total in 0..13u128 {
            assert_eq!(split(total), (0, 0, total));
        }
        assert_eq!(split(99), (7, 1, 91));
    }

    #[test]
    fn test_hundred_is_exact() {
        assert_eq!(split(100), (8, 2, 90));
        assert_eq!(split(100_000_000), (8_000_000, 2_000_000, 90_000_000));
    }

    #[test]
    fn test_full_mint_amount() {
        let total = heat_burn_claims::STANDARD_MINT_AMOUNT;
        let (burn, treasury, distribution) = split(total);
        assert_eq!(burn, total / 100 * 8);
        assert_eq!(treasury, total / 100 * 2);
        assert_eq!(distribution, total / 100 * 90);
    }
}

proptest! {
    #[test]
    fn prop_shares_sum_to_total(total in any::<u128>()) {
        let s = FeeSplit::compute(U256::from(total));
        prop_assert_eq!(s.burn + s.treasury + s.distribution, U256::from(total));
        prop_assert_eq!(s.total, U256::from(total));
    }

    #[test]
    fn prop_shares_are_floors(total in any::<u64>()) {
        let (burn, treasury, _) = split(total as u128);
        prop_assert_eq!(burn, total as u128 * 8 / 100);
        prop_assert_eq!(treasury, total as u128 * 2 / 100);
    }

    #[test]
    fn prop_distribution_at_least_ninety_percent(total in any::<u64>()) {
        let (_, _, distribution) = split(total as u128);
        prop_assert!(distribution * 100 >= total as u128 * 90);
    }

    #[test]
    fn prop_full_width_never_overflows(limbs in any::<[u64; 4]>()) {
        let total = U256::from_limbs(limbs);
        let s = FeeSplit::compute(total);
        prop_assert_eq!(s.burn + s.treasury + s.distribution, total);
        prop_assert!(s.burn >= s.treasury);
    }
}
