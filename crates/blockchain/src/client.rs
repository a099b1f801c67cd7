use shared::{Error, Result};
use solana_account_decoder::UiAccountEncoding;
use solana_client::{
    rpc_client::RpcClient,
    rpc_config::{RpcAccountInfoConfig, RpcProgramAccountsConfig},
    rpc_filter::{Memcmp, MemcmpEncodedBytes, RpcFilterType},
};
use solana_sdk::{commitment_config::CommitmentConfig, pubkey::Pubkey};
use std::str::FromStr;
use tracing::{debug, error, info, warn};

use crate::retry::{retry_with_backoff, RetryConfig};
use crate::types::{RawTokenAccount, MINT_FILTER_OFFSET, TOKEN_ACCOUNT_SIZE};

/// Build the `getProgramAccounts` config selecting every token account of `mint`
fn mint_scan_config(mint: &Pubkey) -> RpcProgramAccountsConfig {
    RpcProgramAccountsConfig {
        filters: Some(vec![
            RpcFilterType::DataSize(TOKEN_ACCOUNT_SIZE),
            RpcFilterType::Memcmp(Memcmp::new(
                MINT_FILTER_OFFSET,
                MemcmpEncodedBytes::Base58(mint.to_string()),
            )),
        ]),
        account_config: RpcAccountInfoConfig {
            encoding: Some(UiAccountEncoding::Base64),
            commitment: Some(CommitmentConfig::confirmed()),
            ..Default::default()
        },
        ..Default::default()
    }
}

/// Solana client wrapper for the token account scan
pub struct SolanaClient {
    primary_client: RpcClient,
    fallback_client: Option<RpcClient>,
    retry_config: RetryConfig,
}

impl SolanaClient {
    /// Create a new Solana client with primary and optional fallback RPC endpoints
    pub fn new(rpc_url: String, fallback_url: Option<String>) -> Self {
        Self::new_with_config(rpc_url, fallback_url, RetryConfig::default())
    }

    pub fn new_with_config(rpc_url: String, fallback_url: Option<String>, retry_config: RetryConfig) -> Self {
        info!("Initializing Solana client with primary RPC: {}", rpc_url);

        let primary_client = RpcClient::new_with_commitment(rpc_url, CommitmentConfig::confirmed());

        let fallback_client = fallback_url.map(|url| {
            info!("Configuring fallback RPC: {}", url);
            RpcClient::new_with_commitment(url, CommitmentConfig::confirmed())
        });

        Self {
            primary_client,
            fallback_client,
            retry_config,
        }
    }

    /// Validate a Solana address format
    pub fn validate_address(&self, address: &str) -> Result<Pubkey> {
        Pubkey::from_str(address).map_err(|e| {
            warn!("Invalid address format: {} - {}", address, e);
            Error::InvalidWalletAddress(format!("Invalid Solana address format: {}", e))
        })
    }

    /// Fetch every SPL token account holding `mint`.
    ///
    /// The node applies the size and mint filters, so each returned record is a
    /// full 165-byte token account of the requested mint.
    pub async fn get_mint_token_accounts(&self, mint: &str) -> Result<Vec<RawTokenAccount>> {
        let mint = self.validate_address(mint)?;

        info!("Scanning token accounts for mint {}", mint);

        let accounts = match self.scan_with(&self.primary_client, "scan_token_accounts_primary", &mint).await {
            Ok(accounts) => accounts,
            Err(e) => {
                warn!("Primary RPC failed for token account scan: {}", e);

                match &self.fallback_client {
                    Some(fallback) => {
                        debug!("Attempting fallback RPC for token account scan");
                        self.scan_with(fallback, "scan_token_accounts_fallback", &mint)
                            .await
                            .map_err(|fallback_err| {
                                error!("Both primary and fallback RPC failed: {}", fallback_err);
                                fallback_err
                            })?
                    }
                    None => return Err(e),
                }
            }
        };

        info!("Found {} token accounts for mint {}", accounts.len(), mint);
        Ok(accounts)
    }

    async fn scan_with(&self, client: &RpcClient, operation_name: &str, mint: &Pubkey) -> Result<Vec<RawTokenAccount>> {
        let token_program = spl_token::id();

        retry_with_backoff(operation_name, &self.retry_config, move || async move {
            client
                .get_program_accounts_with_config(&token_program, mint_scan_config(mint))
                .map(|accounts| {
                    accounts
                        .into_iter()
                        .map(|(address, account)| RawTokenAccount {
                            address,
                            data: account.data,
                        })
                        .collect::<Vec<_>>()
                })
                .map_err(|e| Error::SolanaRpc(format!("{} failed: {}", operation_name, e)))
        })
        .await
    }

    /// Health check for Solana RPC connectivity
    pub async fn health_check(&self) -> Result<()> {
        retry_with_backoff("health_check", &self.retry_config, || {
            let client = &self.primary_client;
            async move {
                client
                    .get_latest_blockhash()
                    .map_err(|e| Error::SolanaRpc(format!("Health check failed: {}", e)))
            }
        })
        .await?;

        Ok(())
    }
}
