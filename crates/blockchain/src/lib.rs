pub mod client;
pub mod retry;
pub mod types;

pub use client::SolanaClient;
pub use retry::{retry_with_backoff, RetryConfig};
pub use types::*;
