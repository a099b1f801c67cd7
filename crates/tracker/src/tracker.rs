use blockchain::{RetryConfig, SolanaClient};
use chrono::{DateTime, Utc};
use holders::{
    aggregate, ClassificationPolicy, ClassificationResult, ExcludedReport, HolderClassifier, HolderStatistics,
    HoldersReport,
};
use shared::{Config, Result, TrackerConfig};
use tracing::{info, warn};

use crate::storage::{ReportStore, SavedReports};

/// Everything derived from one scan
#[derive(Debug, Clone)]
pub struct Analysis {
    /// Distribution before any filtering
    pub statistics: HolderStatistics,
    pub result: ClassificationResult,
    pub holders_report: HoldersReport,
    pub excluded_report: ExcludedReport,
}

/// Aggregate raw token accounts, classify the holders and build both reports.
pub fn analyze<I, R>(
    records: I,
    classifier: &HolderClassifier,
    config: &TrackerConfig,
    timestamp: DateTime<Utc>,
) -> Result<Analysis>
where
    I: IntoIterator<Item = R>,
    R: AsRef<[u8]>,
{
    let balances = aggregate(records)?;
    info!("Total unique holders: {}", balances.len());

    let statistics = HolderStatistics::compute(&balances, config.token_decimals);
    info!(
        total_holders = statistics.total_holders,
        total_supply_held = %statistics.total_supply_held_formatted,
        average_balance = %statistics.average_balance_formatted,
        largest_holder = %statistics.largest_holder_formatted,
        smallest_holder = %statistics.smallest_holder_formatted,
        "Token holder statistics (before filtering)"
    );

    let result = classifier.classify(&balances);
    info!("\n{}", result.summary());

    let holders_report = HoldersReport::build(
        &config.token_mint,
        timestamp,
        classifier.policy().settings(),
        &result,
        config.token_decimals,
        config.max_holders_to_save,
    );
    let excluded_report = ExcludedReport::build(timestamp, &result.excluded, config.token_decimals);

    Ok(Analysis {
        statistics,
        result,
        holders_report,
        excluded_report,
    })
}

/// Scans one mint and writes the filtered holder reports
pub struct HolderTracker {
    config: TrackerConfig,
    client: SolanaClient,
    classifier: HolderClassifier,
    store: ReportStore,
}

impl HolderTracker {
    pub fn new(config: Config) -> Result<Self> {
        let policy = ClassificationPolicy::from_filter_config(&config.filter)?;
        let client = SolanaClient::new_with_config(
            config.tracker.rpc_url.clone(),
            config.tracker.rpc_fallback_url.clone(),
            RetryConfig::from(&config.retry),
        );
        let store = ReportStore::new(&config.tracker.data_dir);

        Ok(Self {
            config: config.tracker,
            client,
            classifier: HolderClassifier::new(policy),
            store,
        })
    }

    pub async fn run(&self) -> Result<SavedReports> {
        let policy = self.classifier.policy();
        info!("=== Solana Token Holder Tracker ===");
        info!("Token: {}", self.config.token_mint);
        info!(
            "Filters: Services={}, Whales={} (>{}%), MinBalance={}",
            policy.exclude_services,
            policy.exclude_whales,
            policy.whale_threshold_percent,
            policy.min_balance_to_include
        );

        self.store.init().await?;

        if let Err(e) = self.client.health_check().await {
            warn!("Primary RPC health check failed, continuing with scan: {}", e);
        }

        let accounts = self.client.get_mint_token_accounts(&self.config.token_mint).await?;
        let analysis = analyze(&accounts, &self.classifier, &self.config, Utc::now())?;

        let saved = self
            .store
            .save(&analysis.holders_report, &analysis.excluded_report)
            .await?;

        info!("Process completed successfully");
        Ok(saved)
    }
}
