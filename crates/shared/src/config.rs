use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::env;

/// Default token tracked when `TOKEN_MINT_ADDRESS` is unset
pub const DEFAULT_TOKEN_MINT: &str = "CzLSujWBLFsSjncfkh59rUFqvafWcY5tzedWJSuypump";
pub const DEFAULT_RPC_ENDPOINT: &str = "https://api.mainnet-beta.solana.com";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub tracker: TrackerConfig,
    pub filter: FilterConfig,
    pub retry: RetrySettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TrackerConfig {
    pub token_mint: String,
    pub rpc_url: String,
    pub rpc_fallback_url: Option<String>,
    /// Cap on rows written to the holders report (default: unlimited)
    pub max_holders_to_save: Option<usize>,
    pub data_dir: String,
    /// Decimal places used for `balanceFormatted` (default: 6)
    pub token_decimals: u8,
    /// `LOG_FORMAT=json` selects structured JSON logs
    pub json_logs: bool,
}

/// Holder filtering options, serialized verbatim into the report's `filterSettings`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FilterConfig {
    /// Drop known service / program wallets (default: true)
    pub exclude_services: bool,
    /// Drop holders above the whale threshold (default: true)
    pub exclude_whales: bool,
    /// Percentage of total held supply above which a holder is a whale (default: 1.0)
    pub whale_threshold_percent: Decimal,
    /// Balances strictly below this, in base units, are dust (default: 1_000_000)
    pub min_balance_to_include: u128,
    /// Extra service wallets on top of the built-in list
    #[serde(skip_serializing, default)]
    pub custom_service_wallets: Vec<String>,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            exclude_services: true,
            exclude_whales: true,
            whale_threshold_percent: Decimal::ONE,
            min_balance_to_include: 1_000_000,
            custom_service_wallets: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RetrySettings {
    pub max_attempts: u32,
    pub initial_delay_ms: u64,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenv::dotenv().ok();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());
        // Anything other than the literal "false" keeps the filter on
        let flag = |key: &str| lookup(key).map(|v| v.trim() != "false").unwrap_or(true);

        let max_holders_to_save = match lookup("MAX_HOLDERS_TO_SAVE") {
            Some(raw) if !raw.trim().is_empty() => Some(raw.trim().parse()?),
            _ => None,
        };

        let custom_service_wallets = lookup("CUSTOM_SERVICE_WALLETS")
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        let whale_threshold_percent: Decimal = var("WHALE_THRESHOLD_PERCENT", "1").trim().parse()?;
        if whale_threshold_percent.is_sign_negative() {
            anyhow::bail!(
                "WHALE_THRESHOLD_PERCENT must not be negative, got {}",
                whale_threshold_percent
            );
        }

        Ok(Config {
            tracker: TrackerConfig {
                token_mint: var("TOKEN_MINT_ADDRESS", DEFAULT_TOKEN_MINT),
                rpc_url: var("RPC_ENDPOINT", DEFAULT_RPC_ENDPOINT),
                rpc_fallback_url: lookup("RPC_FALLBACK_ENDPOINT").filter(|s| !s.trim().is_empty()),
                max_holders_to_save,
                data_dir: var("DATA_DIR", "data"),
                token_decimals: var("TOKEN_DECIMALS", "6").trim().parse()?,
                json_logs: var("LOG_FORMAT", "pretty").trim().eq_ignore_ascii_case("json"),
            },
            filter: FilterConfig {
                exclude_services: flag("EXCLUDE_SERVICES"),
                exclude_whales: flag("EXCLUDE_WHALES"),
                whale_threshold_percent,
                min_balance_to_include: var("MIN_BALANCE_TO_INCLUDE", "1000000").trim().parse()?,
                custom_service_wallets,
            },
            retry: RetrySettings {
                max_attempts: var("RPC_MAX_ATTEMPTS", "3").trim().parse()?,
                initial_delay_ms: var("RPC_INITIAL_DELAY_MS", "500").trim().parse()?,
            },
        })
    }
}
