use crate::core::error::QuoteError;
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;

/// Category of a holding. Decides which upstream provider prices it and how
/// long its quote stays cached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetClass {
    Equity,
    Fund,
    Crypto,
    Commodity,
}

impl AssetClass {
    pub const ALL: [AssetClass; 4] = [
        AssetClass::Equity,
        AssetClass::Fund,
        AssetClass::Crypto,
        AssetClass::Commodity,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AssetClass::Equity => "equity",
            AssetClass::Fund => "fund",
            AssetClass::Crypto => "crypto",
            AssetClass::Commodity => "commodity",
        }
    }
}

impl Display for AssetClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for AssetClass {
    type Err = QuoteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "equity" => Ok(AssetClass::Equity),
            "fund" => Ok(AssetClass::Fund),
            "crypto" => Ok(AssetClass::Crypto),
            "commodity" => Ok(AssetClass::Commodity),
            _ => Err(QuoteError::UnsupportedAssetType(s.to_string())),
        }
    }
}
