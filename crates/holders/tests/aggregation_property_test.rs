// Property tests for token account aggregation

use holders::aggregate;
use proptest::prelude::*;
use solana_sdk::pubkey::Pubkey;

fn account_data(owner: &Pubkey, amount: u64) -> Vec<u8> {
    let mut data = vec![0u8; 165];
    data[32..64].copy_from_slice(owner.as_ref());
    data[64..72].copy_from_slice(&amount.to_le_bytes());
    data
}

/// Records drawn from a small owner pool so owners repeat
fn records_strategy() -> impl Strategy<Value = Vec<(u8, u64)>> {
    prop::collection::vec((0u8..8, prop_oneof![Just(0u64), any::<u64>(), 1u64..1_000]), 0..64)
}

fn owner(seed: u8) -> Pubkey {
    Pubkey::new_from_array([seed.wrapping_add(1); 32])
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Any permutation of the input yields the same mapping
    #[test]
    fn prop_order_independent(records in records_strategy(), seed in any::<u64>()) {
        let forward: Vec<Vec<u8>> = records.iter().map(|(o, a)| account_data(&owner(*o), *a)).collect();

        let mut shuffled = forward.clone();
        // Deterministic rotation plus reversal as the permutation
        let len = shuffled.len().max(1);
        shuffled.rotate_left((seed as usize) % len);
        shuffled.reverse();

        prop_assert_eq!(aggregate(&forward).unwrap(), aggregate(&shuffled).unwrap());
    }

    /// The aggregate total equals the sum of every positive amount
    #[test]
    fn prop_conserves_supply(records in records_strategy()) {
        let data: Vec<Vec<u8>> = records.iter().map(|(o, a)| account_data(&owner(*o), *a)).collect();
        let expected: u128 = records.iter().map(|(_, a)| u128::from(*a)).sum();

        let balances = aggregate(&data).unwrap();

        prop_assert_eq!(balances.total_supply(), expected);
    }

    /// Owners with only zero-amount accounts never appear, and no stored value is zero
    #[test]
    fn prop_zero_amounts_add_no_keys(records in records_strategy()) {
        let data: Vec<Vec<u8>> = records.iter().map(|(o, a)| account_data(&owner(*o), *a)).collect();
        let balances = aggregate(&data).unwrap();

        for (seed, _) in &records {
            let has_positive = records.iter().any(|(o, a)| o == seed && *a > 0);
            prop_assert_eq!(balances.contains(&owner(*seed)), has_positive);
        }
        prop_assert!(balances.iter().all(|(_, b)| b > 0));
    }

    /// Aggregating shards then merging matches a single pass
    #[test]
    fn prop_sharded_merge_matches(records in records_strategy(), split in 0usize..64) {
        let data: Vec<Vec<u8>> = records.iter().map(|(o, a)| account_data(&owner(*o), *a)).collect();
        let split = split.min(data.len());

        let mut left = aggregate(&data[..split]).unwrap();
        let right = aggregate(&data[split..]).unwrap();
        left.merge(right);

        prop_assert_eq!(left, aggregate(&data).unwrap());
    }
}
