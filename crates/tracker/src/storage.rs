use chrono::{DateTime, SecondsFormat, Utc};
use holders::{ExcludedReport, HoldersReport};
use serde::Serialize;
use shared::Result;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};

pub const LATEST_FILTERED_FILE: &str = "latest_filtered.json";

/// Paths written by one [`ReportStore::save`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedReports {
    pub holders: PathBuf,
    pub latest: PathBuf,
    /// Only written when services or whales were excluded
    pub excluded: Option<PathBuf>,
}

/// `2024-05-01T12:00:00.000Z` becomes `2024-05-01T12-00-00-000Z`
pub fn file_timestamp(timestamp: &DateTime<Utc>) -> String {
    timestamp
        .to_rfc3339_opts(SecondsFormat::Millis, true)
        .replace([':', '.'], "-")
}

/// JSON report files under a data directory
#[derive(Debug, Clone)]
pub struct ReportStore {
    data_dir: PathBuf,
}

impl ReportStore {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Create the data directory if it is missing
    pub async fn init(&self) -> Result<()> {
        fs::create_dir_all(&self.data_dir).await?;
        debug!("Data directory ready: {}", self.data_dir.display());
        Ok(())
    }

    pub async fn save(&self, holders: &HoldersReport, excluded: &ExcludedReport) -> Result<SavedReports> {
        self.init().await?;
        let stamp = file_timestamp(&holders.timestamp);

        let holders_path = self.data_dir.join(format!("holders_filtered_{}.json", stamp));
        write_json(&holders_path, holders).await?;
        info!("Filtered holders saved to: {}", holders_path.display());

        let latest_path = self.data_dir.join(LATEST_FILTERED_FILE);
        write_json(&latest_path, holders).await?;
        info!("Latest filtered data saved to: {}", latest_path.display());

        let excluded_path = if excluded.has_notable_exclusions() {
            let path = self.data_dir.join(format!("excluded_{}.json", stamp));
            write_json(&path, excluded).await?;
            info!("Excluded wallets saved to: {}", path.display());
            Some(path)
        } else {
            debug!("No service or whale exclusions, skipping excluded report");
            None
        };

        Ok(SavedReports {
            holders: holders_path,
            latest: latest_path,
            excluded: excluded_path,
        })
    }
}

async fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let body = serde_json::to_string_pretty(value)?;
    fs::write(path, body).await?;
    Ok(())
}
