pub mod logging;
pub mod storage;
pub mod tracker;

pub use storage::{ReportStore, SavedReports};
pub use tracker::{analyze, Analysis, HolderTracker};
