use solana_sdk::pubkey::Pubkey;
use std::fmt;

/// Wallets belonging to programs, pools and fee collectors rather than holders
pub const KNOWN_SERVICE_WALLETS: &[&str] = &[
    // pump.fun
    "6EF8rrecthR5Dkzon8Nwu78hRvfCKubJ14M5uBEwF6P",  // program
    "Ce6TQqeHC9p8KetsN6JsjHK7UTZk7nasjjnr7XxXp9F1", // bonding curve
    "CebN5WGQ4jvEPvsVU4EoHEpgzq1VV7AbicfhtW4xC9iM", // fee receiver
    // Raydium
    "5Q544fKrFoe6tsEbD7S8EmxGTJYAKtTVhAW5Q5pge4j1", // authority V4
    "EhhTKczWMGQt46ynNeRX1WfeagwwJd7ufHvCDjRxjo5Q", // LP
    "675kPX9MHTjS2zt1qfr1NYHuzeLXfQM9H24wFSUt1Mp8", // AMM
    // Jupiter
    "JUP6LkbZbjS1jKKwapdHNy74zcZ3tLUZoi5QNyVTaV4",
    "JUP4Fb2cqiRUcaTHdrPC8h2gNsA2ETXiPDD33WcGuJB",
    // Orca
    "whirLbMiicVdio4qvUfM5KAg6Ct8VwpYzGff3uctyCc",
];

/// Structural detector for service addresses.
///
/// Patterns are consulted after the explicit service set; the first match wins.
pub trait ServicePattern: Send + Sync {
    /// Stable identifier, used to remove a pattern from a policy
    fn name(&self) -> &str;

    fn matches(&self, address: &Pubkey) -> bool;
}

impl fmt::Debug for dyn ServicePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ServicePattern").field(&self.name()).finish()
    }
}

/// Matches addresses whose base58 form ends in a long run of the null-address
/// character, which is how program and sysvar ids typically look.
#[derive(Debug, Clone)]
pub struct SentinelSuffixPattern {
    pub sentinel: char,
    pub min_run: usize,
}

impl SentinelSuffixPattern {
    pub const NAME: &'static str = "program_account";
}

impl Default for SentinelSuffixPattern {
    fn default() -> Self {
        Self {
            sentinel: '1',
            min_run: 28,
        }
    }
}

impl ServicePattern for SentinelSuffixPattern {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn matches(&self, address: &Pubkey) -> bool {
        let encoded = address.to_string();
        encoded.chars().rev().take_while(|c| *c == self.sentinel).count() >= self.min_run
    }
}

/// A named closure usable as a [`ServicePattern`]
pub struct FnPattern<F> {
    name: String,
    predicate: F,
}

impl<F> FnPattern<F>
where
    F: Fn(&Pubkey) -> bool + Send + Sync,
{
    pub fn new(name: impl Into<String>, predicate: F) -> Self {
        Self {
            name: name.into(),
            predicate,
        }
    }
}

impl<F> ServicePattern for FnPattern<F>
where
    F: Fn(&Pubkey) -> bool + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn matches(&self, address: &Pubkey) -> bool {
        (self.predicate)(address)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_known_service_wallets_parse() {
        for address in KNOWN_SERVICE_WALLETS {
            assert!(Pubkey::from_str(address).is_ok(), "{} should be a valid address", address);
        }
    }

    #[test]
    fn test_sentinel_suffix_matches_program_ids() {
        let pattern = SentinelSuffixPattern::default();

        // System program: 32 ones
        assert!(pattern.matches(&Pubkey::default()));
        assert!(pattern.matches(&Pubkey::from_str("ComputeBudget111111111111111111111111111111").unwrap()));
        assert!(!pattern.matches(&Pubkey::from_str("JUP6LkbZbjS1jKKwapdHNy74zcZ3tLUZoi5QNyVTaV4").unwrap()));
    }

    #[test]
    fn test_sentinel_run_length_is_configurable() {
        let vote = Pubkey::from_str("Vote111111111111111111111111111111111111111").unwrap();

        assert!(SentinelSuffixPattern::default().matches(&vote));
        assert!(!SentinelSuffixPattern {
            sentinel: '1',
            min_run: 40,
        }
        .matches(&vote));
    }

    #[test]
    fn test_fn_pattern_delegates_to_closure() {
        let target = Pubkey::new_unique();
        let pattern = FnPattern::new("exchange", move |address: &Pubkey| *address == target);

        assert_eq!(pattern.name(), "exchange");
        assert!(pattern.matches(&target));
        assert!(!pattern.matches(&Pubkey::new_unique()));
    }
}
