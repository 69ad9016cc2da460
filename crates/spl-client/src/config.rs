//! Client configuration.

use serde::{Deserialize, Serialize};

use crate::error::{ClientError, Result};

/// How durable a submitted transaction must be before submission returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Commitment {
    Processed,
    #[default]
    Confirmed,
    Finalized,
}

impl std::fmt::Display for Commitment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Processed => "processed",
            Self::Confirmed => "confirmed",
            Self::Finalized => "finalized",
        };
        f.write_str(s)
    }
}

/// Settings carried by the [`Wallet`](crate::Wallet) and
/// [`Mint`](crate::Mint) facades.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Durability requested for every submission.
    pub commitment: Commitment,
    /// Remember a mint's decimals after the first lookup. Decimals are
    /// fixed at mint creation, so the cached value never goes stale.
    pub cache_mint_decimals: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            commitment: Commitment::Confirmed,
            cache_mint_decimals: true,
        }
    }
}

impl ClientConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| ClientError::Config(e.to_string()))
    }

    pub fn with_commitment(mut self, commitment: Commitment) -> Self {
        self.commitment = commitment;
        self
    }
}
