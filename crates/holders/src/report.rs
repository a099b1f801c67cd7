use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared::FilterConfig;
use std::cmp::Ordering;

use crate::aggregator::HolderBalances;
use crate::classifier::{ClassificationResult, ExcludedHolder, ExcludedHolders, FilterCounters};

/// Dust entries kept in the excluded report
pub const DUST_PREVIEW_LIMIT: usize = 100;

/// Render a base-unit amount with `decimals` fractional digits, e.g. `1500000` at 6 → `1.500000`
pub fn format_balance(raw: u128, decimals: u8) -> String {
    if decimals == 0 {
        return raw.to_string();
    }

    let width = decimals as usize;
    match 10u128.checked_pow(u32::from(decimals)) {
        Some(divisor) => format!("{}.{:0width$}", raw / divisor, raw % divisor, width = width),
        None => format!("0.{:0>width$}", raw, width = width),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HolderRow {
    pub address: String,
    pub balance: String,
    pub balance_formatted: String,
}

/// Kept holders, largest first; ties ordered by address
pub fn ranked_rows(balances: &HolderBalances, decimals: u8) -> Vec<HolderRow> {
    let mut ranked: Vec<(String, u128)> = balances
        .iter()
        .map(|(address, balance)| (address.to_string(), balance))
        .collect();

    ranked.sort_by(|a, b| match b.1.cmp(&a.1) {
        Ordering::Equal => a.0.cmp(&b.0),
        other => other,
    });

    ranked
        .into_iter()
        .map(|(address, balance)| HolderRow {
            address,
            balance: balance.to_string(),
            balance_formatted: format_balance(balance, decimals),
        })
        .collect()
}

/// The filtered holder document
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HoldersReport {
    pub token_mint: String,
    pub timestamp: DateTime<Utc>,
    pub filter_settings: FilterConfig,
    /// Holders before filtering
    pub total_holders: usize,
    pub filtered_holders: usize,
    pub saved_holders: usize,
    pub filter_stats: FilterCounters,
    pub holders: Vec<HolderRow>,
}

impl HoldersReport {
    pub fn build(
        token_mint: &str,
        timestamp: DateTime<Utc>,
        filter_settings: FilterConfig,
        result: &ClassificationResult,
        decimals: u8,
        max_rows: Option<usize>,
    ) -> Self {
        let mut holders = ranked_rows(&result.kept, decimals);
        if let Some(limit) = max_rows {
            holders.truncate(limit);
        }

        Self {
            token_mint: token_mint.to_string(),
            timestamp,
            filter_settings,
            total_holders: result.counters.total_holders,
            filtered_holders: result.kept.len(),
            saved_holders: holders.len(),
            filter_stats: result.counters,
            holders,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExcludedRow {
    pub address: String,
    pub balance: String,
    pub balance_formatted: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub percentage: Option<String>,
}

impl ExcludedRow {
    fn from_holder(holder: &ExcludedHolder, decimals: u8) -> Self {
        Self {
            address: holder.address.to_string(),
            balance: holder.balance.to_string(),
            balance_formatted: format_balance(holder.balance, decimals),
            percentage: holder.percentage_of_supply.map(|p| format!("{:.2}", p)),
        }
    }
}

/// Audit document listing what was filtered out
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExcludedReport {
    pub timestamp: DateTime<Utc>,
    pub services: Vec<ExcludedRow>,
    pub whales: Vec<ExcludedRow>,
    /// First [`DUST_PREVIEW_LIMIT`] dust holders only
    pub dust: Vec<ExcludedRow>,
}

impl ExcludedReport {
    pub fn build(timestamp: DateTime<Utc>, excluded: &ExcludedHolders, decimals: u8) -> Self {
        let rows = |holders: &[ExcludedHolder]| -> Vec<ExcludedRow> {
            holders.iter().map(|h| ExcludedRow::from_holder(h, decimals)).collect()
        };

        let dust_preview = &excluded.dust[..excluded.dust.len().min(DUST_PREVIEW_LIMIT)];

        Self {
            timestamp,
            services: rows(excluded.services.as_slice()),
            whales: rows(excluded.whales.as_slice()),
            dust: rows(dust_preview),
        }
    }

    /// Whether the report is worth persisting: dust alone is not
    pub fn has_notable_exclusions(&self) -> bool {
        !self.services.is_empty() || !self.whales.is_empty()
    }
}

/// Distribution of the unfiltered holder set
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HolderStatistics {
    pub total_holders: usize,
    pub total_supply_held: String,
    pub total_supply_held_formatted: String,
    pub average_balance: String,
    pub average_balance_formatted: String,
    pub largest_holder: String,
    pub largest_holder_formatted: String,
    pub smallest_holder: String,
    pub smallest_holder_formatted: String,
}

impl HolderStatistics {
    /// All figures are zero for an empty holder set
    pub fn compute(balances: &HolderBalances, decimals: u8) -> Self {
        let total = balances.total_supply();
        let count = balances.len();
        let average = if count == 0 { 0 } else { total / count as u128 };
        let largest = balances.iter().map(|(_, b)| b).max().unwrap_or(0);
        let smallest = balances.iter().map(|(_, b)| b).min().unwrap_or(0);

        Self {
            total_holders: count,
            total_supply_held: total.to_string(),
            total_supply_held_formatted: format_balance(total, decimals),
            average_balance: average.to_string(),
            average_balance_formatted: format_balance(average, decimals),
            largest_holder: largest.to_string(),
            largest_holder_formatted: format_balance(largest, decimals),
            smallest_holder: smallest.to_string(),
            smallest_holder_formatted: format_balance(smallest, decimals),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::{ClassificationPolicy, HolderClassifier};
    use chrono::TimeZone;
    use solana_sdk::pubkey::Pubkey;

    fn fixed_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_format_balance() {
        assert_eq!(format_balance(1_500_000, 6), "1.500000");
        assert_eq!(format_balance(42, 6), "0.000042");
        assert_eq!(format_balance(0, 6), "0.000000");
        assert_eq!(format_balance(123, 0), "123");
        assert_eq!(format_balance(u128::from(u64::MAX), 9), "18446744073.709551615");
    }

    #[test]
    fn test_ranked_rows_sort_desc_with_address_tiebreak() {
        let a = Pubkey::new_unique();
        let b = Pubkey::new_unique();
        let c = Pubkey::new_unique();
        let balances: HolderBalances = vec![(a, 5), (b, 9), (c, 5)].into_iter().collect();

        let rows = ranked_rows(&balances, 0);

        assert_eq!(rows[0].address, b.to_string());
        let (first_tie, second_tie) = if a.to_string() < c.to_string() { (a, c) } else { (c, a) };
        assert_eq!(rows[1].address, first_tie.to_string());
        assert_eq!(rows[2].address, second_tie.to_string());
    }

    #[test]
    fn test_holders_report_truncates_and_counts() {
        let balances: HolderBalances = (1..=5u128)
            .map(|i| (Pubkey::new_unique(), i * 1_000_000))
            .collect();
        let policy = ClassificationPolicy {
            exclude_whales: false,
            ..ClassificationPolicy::default()
        };
        let result = HolderClassifier::new(policy.clone()).classify(&balances);

        let report = HoldersReport::build("mint", fixed_time(), policy.settings(), &result, 6, Some(2));

        assert_eq!(report.total_holders, 5);
        assert_eq!(report.filtered_holders, 5);
        assert_eq!(report.saved_holders, 2);
        assert_eq!(report.holders[0].balance, "5000000");
        assert_eq!(report.holders[0].balance_formatted, "5.000000");

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["tokenMint"], "mint");
        assert_eq!(json["filterStats"]["remainingHolders"], 5);
        assert_eq!(json["holders"][1]["balanceFormatted"], "4.000000");
    }

    #[test]
    fn test_excluded_report_caps_dust() {
        let excluded = ExcludedHolders {
            services: vec![],
            whales: vec![ExcludedHolder {
                address: Pubkey::new_unique(),
                balance: 10_000_000,
                percentage_of_supply: Some(83.33),
            }],
            dust: (0..150)
                .map(|i| ExcludedHolder {
                    address: Pubkey::new_unique(),
                    balance: i,
                    percentage_of_supply: None,
                })
                .collect(),
        };

        let report = ExcludedReport::build(fixed_time(), &excluded, 6);

        assert_eq!(report.dust.len(), DUST_PREVIEW_LIMIT);
        assert_eq!(report.dust[0].balance, "0");
        assert_eq!(report.whales[0].percentage.as_deref(), Some("83.33"));
        assert!(report.has_notable_exclusions());

        let json = serde_json::to_value(&report).unwrap();
        assert!(json["dust"][0].get("percentage").is_none());
    }

    #[test]
    fn test_statistics_for_empty_set_are_zero() {
        let stats = HolderStatistics::compute(&HolderBalances::new(), 6);

        assert_eq!(stats.total_holders, 0);
        assert_eq!(stats.average_balance, "0");
        assert_eq!(stats.largest_holder, "0");
        assert_eq!(stats.smallest_holder_formatted, "0.000000");
    }

    #[test]
    fn test_statistics_extremes_and_average() {
        let balances: HolderBalances = vec![
            (Pubkey::new_unique(), 1_000_000),
            (Pubkey::new_unique(), 2_000_000),
            (Pubkey::new_unique(), 6_000_000),
        ]
        .into_iter()
        .collect();

        let stats = HolderStatistics::compute(&balances, 6);

        assert_eq!(stats.total_supply_held, "9000000");
        assert_eq!(stats.average_balance_formatted, "3.000000");
        assert_eq!(stats.largest_holder, "6000000");
        assert_eq!(stats.smallest_holder, "1000000");
    }
}
