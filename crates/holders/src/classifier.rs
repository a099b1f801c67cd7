use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shared::{Error, FilterConfig, Result};
use solana_sdk::pubkey::Pubkey;
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::aggregator::HolderBalances;
use crate::patterns::{SentinelSuffixPattern, ServicePattern, KNOWN_SERVICE_WALLETS};

const ONE_HUNDRED: Decimal = Decimal::ONE_HUNDRED;

/// Rules for splitting holders into kept, service, whale and dust.
///
/// Built once per run and handed to [`HolderClassifier::new`].
#[derive(Clone)]
pub struct ClassificationPolicy {
    pub exclude_services: bool,
    pub exclude_whales: bool,
    /// Strictly above this share of the total, in percent, a holder is a whale
    pub whale_threshold_percent: Decimal,
    /// Strictly below this balance a holder is dust; 0 disables the check
    pub min_balance_to_include: u128,
    pub service_addresses: HashSet<Pubkey>,
    /// Structural detectors, consulted in order after `service_addresses`
    pub patterns: Vec<Arc<dyn ServicePattern>>,
}

impl Default for ClassificationPolicy {
    fn default() -> Self {
        let defaults = FilterConfig::default();

        Self {
            exclude_services: defaults.exclude_services,
            exclude_whales: defaults.exclude_whales,
            whale_threshold_percent: defaults.whale_threshold_percent,
            min_balance_to_include: defaults.min_balance_to_include,
            service_addresses: known_service_addresses(),
            patterns: vec![Arc::new(SentinelSuffixPattern::default())],
        }
    }
}

impl fmt::Debug for ClassificationPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassificationPolicy")
            .field("exclude_services", &self.exclude_services)
            .field("exclude_whales", &self.exclude_whales)
            .field("whale_threshold_percent", &self.whale_threshold_percent)
            .field("min_balance_to_include", &self.min_balance_to_include)
            .field("service_addresses", &self.service_addresses.len())
            .field("patterns", &self.pattern_names())
            .finish()
    }
}

fn known_service_addresses() -> HashSet<Pubkey> {
    KNOWN_SERVICE_WALLETS
        .iter()
        .filter_map(|address| match Pubkey::from_str(address) {
            Ok(pubkey) => Some(pubkey),
            Err(e) => {
                warn!("Skipping unparsable service wallet {}: {}", address, e);
                None
            }
        })
        .collect()
}

impl ClassificationPolicy {
    /// Policy from configuration: built-in service wallets plus the custom ones.
    pub fn from_filter_config(config: &FilterConfig) -> Result<Self> {
        if config.whale_threshold_percent.is_sign_negative() {
            return Err(Error::Validation(format!(
                "Whale threshold must not be negative, got {}",
                config.whale_threshold_percent
            )));
        }

        let mut policy = Self {
            exclude_services: config.exclude_services,
            exclude_whales: config.exclude_whales,
            whale_threshold_percent: config.whale_threshold_percent,
            min_balance_to_include: config.min_balance_to_include,
            ..Self::default()
        };

        for address in &config.custom_service_wallets {
            let pubkey = Pubkey::from_str(address).map_err(|e| {
                Error::InvalidWalletAddress(format!("Custom service wallet {}: {}", address, e))
            })?;
            policy.service_addresses.insert(pubkey);
        }

        debug!("Built classification policy: {:?}", policy);
        Ok(policy)
    }

    pub fn with_service_address(mut self, address: Pubkey) -> Self {
        self.service_addresses.insert(address);
        self
    }

    pub fn with_pattern<P>(mut self, pattern: P) -> Self
    where
        P: ServicePattern + 'static,
    {
        self.patterns.push(Arc::new(pattern));
        self
    }

    /// Drop every pattern registered under `name`
    pub fn without_pattern(mut self, name: &str) -> Self {
        self.patterns.retain(|p| p.name() != name);
        self
    }

    pub fn pattern_names(&self) -> Vec<&str> {
        self.patterns.iter().map(|p| p.name()).collect()
    }

    /// Explicit set first, then patterns in order; stops at the first hit.
    pub fn is_service(&self, address: &Pubkey) -> bool {
        self.service_addresses.contains(address) || self.patterns.iter().any(|p| p.matches(address))
    }

    /// The settings recorded alongside a report
    pub fn settings(&self) -> FilterConfig {
        let known = known_service_addresses();
        let mut custom_service_wallets: Vec<String> = self
            .service_addresses
            .difference(&known)
            .map(|address| address.to_string())
            .collect();
        custom_service_wallets.sort();

        FilterConfig {
            exclude_services: self.exclude_services,
            exclude_whales: self.exclude_whales,
            whale_threshold_percent: self.whale_threshold_percent,
            min_balance_to_include: self.min_balance_to_include,
            custom_service_wallets,
        }
    }
}

/// Where a single holder ends up
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HolderCategory {
    Service,
    /// Carries the display percentage, rounded to two places
    Whale { percentage: f64 },
    Dust,
    Kept,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExcludedHolder {
    pub address: Pubkey,
    pub balance: u128,
    pub percentage_of_supply: Option<f64>,
}

/// Exclusion lists, each in classification order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExcludedHolders {
    pub services: Vec<ExcludedHolder>,
    pub whales: Vec<ExcludedHolder>,
    pub dust: Vec<ExcludedHolder>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterCounters {
    pub total_holders: usize,
    pub services_filtered: usize,
    pub whales_filtered: usize,
    pub dust_filtered: usize,
    pub remaining_holders: usize,
}

impl FilterCounters {
    pub fn excluded(&self) -> usize {
        self.services_filtered + self.whales_filtered + self.dust_filtered
    }
}

#[derive(Debug, Clone)]
pub struct ClassificationResult {
    pub kept: HolderBalances,
    pub excluded: ExcludedHolders,
    pub counters: FilterCounters,
    /// Sum of every input balance, taken before any exclusion
    pub total_supply: u128,
    pub whale_threshold_percent: Decimal,
}

impl ClassificationResult {
    pub fn summary(&self) -> String {
        format!(
            "=== Filter Summary ===\n\
             Total Holders: {}\n\
             Services Filtered: {}\n\
             Whales Filtered: {} (>{}% of supply)\n\
             Dust Filtered: {}\n\
             Remaining Holders: {}",
            self.counters.total_holders,
            self.counters.services_filtered,
            self.counters.whales_filtered,
            self.whale_threshold_percent,
            self.counters.dust_filtered,
            self.counters.remaining_holders,
        )
    }
}

/// Percentage of `total` held by `balance`, for display only
pub fn supply_percentage(balance: u128, total: u128) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let percentage = balance as f64 / total as f64 * 100.0;
    (percentage * 100.0).round() / 100.0
}

/// `balance / total * 100 > threshold`, decided without floating point
fn exceeds_threshold(balance: u128, total: u128, threshold: Decimal) -> bool {
    if total == 0 {
        return false;
    }

    let lhs = Decimal::from_u128(balance).and_then(|b| b.checked_mul(ONE_HUNDRED));
    let rhs = Decimal::from_u128(total).and_then(|t| t.checked_mul(threshold));

    match (lhs, rhs) {
        (Some(lhs), Some(rhs)) => lhs > rhs,
        // Beyond Decimal's 96-bit range
        _ => balance as f64 / total as f64 * 100.0 > threshold.to_f64().unwrap_or(f64::MAX),
    }
}

/// Splits aggregated holders according to a [`ClassificationPolicy`].
///
/// Stateless between calls; every [`classify`](Self::classify) starts from zeroed counters.
#[derive(Debug, Clone, Default)]
pub struct HolderClassifier {
    policy: ClassificationPolicy,
}

impl HolderClassifier {
    pub fn new(policy: ClassificationPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &ClassificationPolicy {
        &self.policy
    }

    /// Category of one holder given the precomputed total. Precedence is
    /// service, whale, dust, then kept.
    pub fn categorize(&self, address: &Pubkey, balance: u128, total_supply: u128) -> HolderCategory {
        let policy = &self.policy;

        if policy.exclude_services && policy.is_service(address) {
            HolderCategory::Service
        } else if policy.exclude_whales && exceeds_threshold(balance, total_supply, policy.whale_threshold_percent) {
            HolderCategory::Whale {
                percentage: supply_percentage(balance, total_supply),
            }
        } else if balance < policy.min_balance_to_include {
            HolderCategory::Dust
        } else {
            HolderCategory::Kept
        }
    }

    pub fn classify(&self, balances: &HolderBalances) -> ClassificationResult {
        let total_supply = balances.total_supply();
        let mut kept = HolderBalances::new();
        let mut excluded = ExcludedHolders::default();
        let mut counters = FilterCounters {
            total_holders: balances.len(),
            ..FilterCounters::default()
        };

        for (address, balance) in balances.iter() {
            match self.categorize(address, balance, total_supply) {
                HolderCategory::Service => {
                    counters.services_filtered += 1;
                    excluded.services.push(ExcludedHolder {
                        address: *address,
                        balance,
                        percentage_of_supply: None,
                    });
                }
                HolderCategory::Whale { percentage } => {
                    counters.whales_filtered += 1;
                    excluded.whales.push(ExcludedHolder {
                        address: *address,
                        balance,
                        percentage_of_supply: Some(percentage),
                    });
                }
                HolderCategory::Dust => {
                    counters.dust_filtered += 1;
                    excluded.dust.push(ExcludedHolder {
                        address: *address,
                        balance,
                        percentage_of_supply: None,
                    });
                }
                HolderCategory::Kept => kept.credit(*address, balance),
            }
        }

        counters.remaining_holders = kept.len();

        info!(
            "Classified {} holders: {} services, {} whales, {} dust, {} kept",
            counters.total_holders,
            counters.services_filtered,
            counters.whales_filtered,
            counters.dust_filtered,
            counters.remaining_holders
        );

        ClassificationResult {
            kept,
            excluded,
            counters,
            total_supply,
            whale_threshold_percent: self.policy.whale_threshold_percent,
        }
    }
}

/// One-shot classification with the given policy
pub fn classify(balances: &HolderBalances, policy: &ClassificationPolicy) -> ClassificationResult {
    HolderClassifier::new(policy.clone()).classify(balances)
}
