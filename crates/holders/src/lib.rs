//! Token holder aggregation and classification.
//!
//! Raw SPL token accounts are folded into per-owner balances by
//! [`aggregate`], then split into kept holders and the service / whale / dust
//! exclusion lists by [`classify`].

pub mod aggregator;
pub mod classifier;
pub mod patterns;
pub mod record;
pub mod report;

pub use aggregator::{aggregate, HolderBalances};
pub use classifier::{
    classify, ClassificationPolicy, ClassificationResult, ExcludedHolder, ExcludedHolders, FilterCounters,
    HolderClassifier,
};
pub use patterns::{FnPattern, SentinelSuffixPattern, ServicePattern, KNOWN_SERVICE_WALLETS};
pub use record::TokenAccountRecord;
pub use report::{format_balance, ExcludedReport, HolderRow, HolderStatistics, HoldersReport};
