//! Pricing abstractions and core types

use crate::core::error::QuoteError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A normalized price observation, whatever upstream produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub symbol: String,
    pub price: f64,
    pub currency: String,
    pub source: String,
}

impl Quote {
    /// Builds a quote, rejecting missing, non-finite and non-positive prices.
    pub fn new(
        provider: &'static str,
        symbol: &str,
        price: Option<f64>,
        currency: &str,
    ) -> Result<Self, QuoteError> {
        match price {
            Some(price) if price.is_finite() && price > 0.0 => Ok(Quote {
                symbol: symbol.to_string(),
                price,
                currency: currency.to_uppercase(),
                source: provider.to_string(),
            }),
            _ => Err(QuoteError::price_not_found(provider, symbol)),
        }
    }
}

/// Capability shared by every upstream adapter.
#[async_trait]
pub trait QuoteProvider: Send + Sync {
    fn name(&self) -> &'static str;

    async fn fetch_quote(&self, symbol: &str) -> Result<Quote, QuoteError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positive_price_is_accepted() {
        let quote = Quote::new("yahoo", "AAPL", Some(150.5), "usd").unwrap();
        assert_eq!(quote.price, 150.5);
        assert_eq!(quote.currency, "USD");
        assert_eq!(quote.source, "yahoo");
    }

    #[test]
    fn test_missing_zero_or_negative_price_is_rejected() {
        for price in [None, Some(0.0), Some(-1.0), Some(f64::NAN)] {
            let err = Quote::new("yahoo", "AAPL", price, "USD").unwrap_err();
            assert_eq!(err, QuoteError::price_not_found("yahoo", "AAPL"));
        }
    }
}
