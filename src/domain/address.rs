//! Wallet and mint addresses
//!
//! Base58-encoded 32-byte public keys. Validity is decided by decoding.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Length of a decoded Solana public key
pub const PUBKEY_LEN: usize = 32;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddressError {
    #[error("Address is empty")]
    Empty,
    #[error("Invalid base58 encoding: {0}")]
    InvalidEncoding(String),
    #[error("Invalid key length: expected 32 bytes, got {0}")]
    InvalidLength(usize),
}

/// A parsed ledger account address
///
/// Keeps the original base58 text so it round-trips exactly into API calls.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct WalletAddress {
    encoded: String,
    bytes: [u8; PUBKEY_LEN],
}

impl WalletAddress {
    /// Parse a base58 address, rejecting anything that does not decode to 32 bytes
    pub fn parse(input: &str) -> Result<Self, AddressError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(AddressError::Empty);
        }

        let decoded = bs58::decode(trimmed)
            .into_vec()
            .map_err(|e| AddressError::InvalidEncoding(e.to_string()))?;

        let bytes: [u8; PUBKEY_LEN] = decoded
            .as_slice()
            .try_into()
            .map_err(|_| AddressError::InvalidLength(decoded.len()))?;

        Ok(Self {
            encoded: trimmed.to_string(),
            bytes,
        })
    }

    /// Base58 text form
    pub fn as_str(&self) -> &str {
        &self.encoded
    }

    /// Raw key bytes
    pub fn to_bytes(&self) -> [u8; PUBKEY_LEN] {
        self.bytes
    }

    /// Convert to a solana-sdk public key
    pub fn to_pubkey(&self) -> solana_sdk::pubkey::Pubkey {
        solana_sdk::pubkey::Pubkey::new_from_array(self.bytes)
    }

    pub fn from_pubkey(pubkey: &solana_sdk::pubkey::Pubkey) -> Self {
        Self {
            encoded: pubkey.to_string(),
            bytes: pubkey.to_bytes(),
        }
    }

    /// Associated token account of this owner for `mint`
    pub fn associated_token_account(&self, mint: &WalletAddress) -> WalletAddress {
        Self::from_pubkey(&spl_associated_token_account::get_associated_token_address(
            &self.to_pubkey(),
            &mint.to_pubkey(),
        ))
    }
}

impl FromStr for WalletAddress {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for WalletAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encoded)
    }
}

impl AsRef<str> for WalletAddress {
    fn as_ref(&self) -> &str {
        &self.encoded
    }
}

impl Serialize for WalletAddress {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.encoded)
    }
}

impl<'de> Deserialize<'de> for WalletAddress {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}
