use serde::{Deserialize, Serialize};
use solana_sdk::pubkey::Pubkey;

/// Size in bytes of an SPL token account
pub const TOKEN_ACCOUNT_SIZE: u64 = 165;

/// Offset of the mint field inside SPL token account data
pub const MINT_FILTER_OFFSET: usize = 0;

/// A token account as returned by the program account scan, data still undecoded
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawTokenAccount {
    pub address: Pubkey,
    pub data: Vec<u8>,
}

impl AsRef<[u8]> for RawTokenAccount {
    fn as_ref(&self) -> &[u8] {
        &self.data
    }
}
