use shared::{Error, Result};
use solana_sdk::pubkey::Pubkey;

/// Full size of an SPL token account
pub const TOKEN_ACCOUNT_LEN: usize = 165;

pub const MINT_OFFSET: usize = 0;
pub const OWNER_OFFSET: usize = 32;
pub const AMOUNT_OFFSET: usize = 64;

/// Bytes that must be present to decode mint, owner and amount
pub const DECODE_WINDOW: usize = AMOUNT_OFFSET + 8;

/// The leading fields of an SPL token account
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenAccountRecord {
    pub mint: Pubkey,
    pub owner: Pubkey,
    /// Balance in the token's base units
    pub amount: u64,
}

impl TokenAccountRecord {
    /// Decode the first 72 bytes of token account data.
    ///
    /// Anything past the decode window (delegate, state, close authority...) is ignored.
    pub fn decode(data: &[u8]) -> Result<Self> {
        Self::decode_at(0, data)
    }

    /// Like [`decode`](Self::decode) but reports `index` in the error.
    pub(crate) fn decode_at(index: usize, data: &[u8]) -> Result<Self> {
        if data.len() < DECODE_WINDOW {
            return Err(Error::MalformedRecord {
                index,
                expected: DECODE_WINDOW,
                actual: data.len(),
            });
        }

        Ok(Self {
            mint: Pubkey::new_from_array(read_array(data, MINT_OFFSET)),
            owner: Pubkey::new_from_array(read_array(data, OWNER_OFFSET)),
            amount: u64::from_le_bytes(read_array(data, AMOUNT_OFFSET)),
        })
    }
}

// Callers check the length first
fn read_array<const N: usize>(data: &[u8], offset: usize) -> [u8; N] {
    let mut out = [0u8; N];
    out.copy_from_slice(&data[offset..offset + N]);
    out
}

#[cfg(test)]
pub(crate) fn encode_for_test(mint: &Pubkey, owner: &Pubkey, amount: u64) -> Vec<u8> {
    let mut data = vec![0u8; TOKEN_ACCOUNT_LEN];
    data[MINT_OFFSET..OWNER_OFFSET].copy_from_slice(mint.as_ref());
    data[OWNER_OFFSET..AMOUNT_OFFSET].copy_from_slice(owner.as_ref());
    data[AMOUNT_OFFSET..DECODE_WINDOW].copy_from_slice(&amount.to_le_bytes());
    data
}
