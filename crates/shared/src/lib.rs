pub mod config;
pub mod error;

pub use config::{Config, FilterConfig, RetrySettings, TrackerConfig};
pub use error::{Error, Result};
