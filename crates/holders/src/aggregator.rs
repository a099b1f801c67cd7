use shared::Result;
use solana_sdk::pubkey::Pubkey;
use std::collections::btree_map::{self, BTreeMap};
use tracing::debug;

use crate::record::TokenAccountRecord;

/// Aggregate balance per owner, in base units.
///
/// Owners with a zero total are never present. Balances are `u128` so summing
/// many `u64` token accounts cannot overflow; iteration is ordered by owner.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HolderBalances {
    balances: BTreeMap<Pubkey, u128>,
}

impl HolderBalances {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `amount` to `owner`'s balance. Zero amounts are ignored.
    pub fn credit(&mut self, owner: Pubkey, amount: u128) {
        if amount == 0 {
            return;
        }
        *self.balances.entry(owner).or_insert(0) += amount;
    }

    /// Fold another partial aggregation into this one.
    pub fn merge(&mut self, other: HolderBalances) {
        for (owner, amount) in other.balances {
            self.credit(owner, amount);
        }
    }

    pub fn get(&self, owner: &Pubkey) -> Option<u128> {
        self.balances.get(owner).copied()
    }

    pub fn contains(&self, owner: &Pubkey) -> bool {
        self.balances.contains_key(owner)
    }

    pub fn len(&self) -> usize {
        self.balances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.balances.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Pubkey, u128)> + '_ {
        self.balances.iter().map(|(owner, amount)| (owner, *amount))
    }

    pub fn owners(&self) -> impl Iterator<Item = &Pubkey> + '_ {
        self.balances.keys()
    }

    /// Sum of every balance
    pub fn total_supply(&self) -> u128 {
        self.balances.values().sum()
    }
}

impl FromIterator<(Pubkey, u128)> for HolderBalances {
    fn from_iter<I: IntoIterator<Item = (Pubkey, u128)>>(iter: I) -> Self {
        let mut balances = HolderBalances::new();
        for (owner, amount) in iter {
            balances.credit(owner, amount);
        }
        balances
    }
}

impl IntoIterator for HolderBalances {
    type Item = (Pubkey, u128);
    type IntoIter = btree_map::IntoIter<Pubkey, u128>;

    fn into_iter(self) -> Self::IntoIter {
        self.balances.into_iter()
    }
}

/// Merge raw token account data into per-owner balances.
///
/// Records are expected to be pre-filtered to the target mint and full account
/// size. A record too short to decode aborts the whole aggregation with
/// [`shared::Error::MalformedRecord`] naming its position.
pub fn aggregate<I, R>(records: I) -> Result<HolderBalances>
where
    I: IntoIterator<Item = R>,
    R: AsRef<[u8]>,
{
    let mut balances = HolderBalances::new();
    let mut accounts = 0usize;
    let mut empty_accounts = 0usize;

    for (index, record) in records.into_iter().enumerate() {
        let decoded = TokenAccountRecord::decode_at(index, record.as_ref())?;
        accounts += 1;

        if decoded.amount == 0 {
            empty_accounts += 1;
            continue;
        }
        balances.credit(decoded.owner, u128::from(decoded.amount));
    }

    debug!(
        "Aggregated {} token accounts ({} empty) into {} holders",
        accounts,
        empty_accounts,
        balances.len()
    );

    Ok(balances)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::encode_for_test;
    use shared::Error;

    #[test]
    fn test_sums_accounts_by_owner() {
        let mint = Pubkey::new_unique();
        let alice = Pubkey::new_unique();
        let bob = Pubkey::new_unique();

        let records = vec![
            encode_for_test(&mint, &alice, 100),
            encode_for_test(&mint, &bob, 5),
            encode_for_test(&mint, &alice, 250),
        ];

        let balances = aggregate(&records).unwrap();

        assert_eq!(balances.len(), 2);
        assert_eq!(balances.get(&alice), Some(350));
        assert_eq!(balances.get(&bob), Some(5));
    }

    #[test]
    fn test_zero_amount_accounts_never_add_owner() {
        let mint = Pubkey::new_unique();
        let empty_owner = Pubkey::new_unique();
        let holder = Pubkey::new_unique();

        let records = vec![
            encode_for_test(&mint, &empty_owner, 0),
            encode_for_test(&mint, &empty_owner, 0),
            encode_for_test(&mint, &holder, 1),
        ];

        let balances = aggregate(&records).unwrap();

        assert!(!balances.contains(&empty_owner));
        assert_eq!(balances.get(&holder), Some(1));
    }

    #[test]
    fn test_sum_exceeding_u64_does_not_overflow() {
        let mint = Pubkey::new_unique();
        let owner = Pubkey::new_unique();
        let records = vec![
            encode_for_test(&mint, &owner, u64::MAX),
            encode_for_test(&mint, &owner, u64::MAX),
        ];

        let balances = aggregate(&records).unwrap();

        assert_eq!(balances.get(&owner), Some(u128::from(u64::MAX) * 2));
    }

    #[test]
    fn test_malformed_record_aborts_with_index() {
        let mint = Pubkey::new_unique();
        let records = vec![
            encode_for_test(&mint, &Pubkey::new_unique(), 10),
            vec![0u8; 40],
        ];

        match aggregate(&records) {
            Err(Error::MalformedRecord { index, actual, .. }) => {
                assert_eq!(index, 1);
                assert_eq!(actual, 40);
            }
            other => panic!("Expected MalformedRecord, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_input_yields_empty_map() {
        let balances = aggregate(Vec::<Vec<u8>>::new()).unwrap();

        assert!(balances.is_empty());
        assert_eq!(balances.total_supply(), 0);
    }

    #[test]
    fn test_merge_matches_single_pass() {
        let a = Pubkey::new_unique();
        let b = Pubkey::new_unique();

        let mut left: HolderBalances = vec![(a, 10), (b, 3)].into_iter().collect();
        let right: HolderBalances = vec![(a, 5), (b, 0)].into_iter().collect();
        left.merge(right);

        assert_eq!(left.get(&a), Some(15));
        assert_eq!(left.get(&b), Some(3));
        assert_eq!(left.total_supply(), 18);
    }
}
