//! Failure taxonomy for quote resolution.

use thiserror::Error;

/// Errors produced while turning a symbol into a [`Quote`](crate::core::Quote).
///
/// Inside a portfolio enrichment every variant is recovered into the row's
/// `error` field. Single-symbol lookups surface them directly.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum QuoteError {
    /// The upstream answered but carried no usable (positive) price.
    #[error("{provider}: price not found for {symbol}")]
    PriceNotFound {
        provider: &'static str,
        symbol: String,
    },

    /// The symbol is not on the provider's allow-list. No request was made.
    #[error("unsupported symbol: {0}")]
    UnsupportedSymbol(String),

    /// The asset class tag is not one of the recognised classes.
    #[error("unsupported asset type: {0}")]
    UnsupportedAssetType(String),

    /// Transport failure, non-2xx status or an unparseable body.
    #[error("{provider}: {message}")]
    Provider {
        provider: &'static str,
        message: String,
    },

    /// A required provider credential is missing.
    #[error("{provider}: configuration error: {message}")]
    Configuration {
        provider: &'static str,
        message: String,
    },
}

impl QuoteError {
    pub fn provider(provider: &'static str, message: impl Into<String>) -> Self {
        QuoteError::Provider {
            provider,
            message: message.into(),
        }
    }

    pub fn price_not_found(provider: &'static str, symbol: &str) -> Self {
        QuoteError::PriceNotFound {
            provider,
            symbol: symbol.to_string(),
        }
    }

    pub fn is_configuration(&self) -> bool {
        matches!(self, QuoteError::Configuration { .. })
    }
}
