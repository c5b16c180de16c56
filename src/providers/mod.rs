pub mod coingecko;
pub mod finnhub;
pub mod util;
pub mod yahoo_finance;

use crate::core::QuoteProvider;
use crate::core::config::{AppConfig, EquityProviderKind};
use anyhow::Result;
use std::sync::Arc;

/// Builds the configured equity/fund adapter.
pub fn equity_provider(config: &AppConfig) -> Result<Arc<dyn QuoteProvider>> {
    let equity = &config.providers.equity;
    let provider: Arc<dyn QuoteProvider> = match equity.kind {
        EquityProviderKind::Yahoo => Arc::new(yahoo_finance::YahooFinanceProvider::new(
            equity.base_url(),
            &config.currency,
        )?),
        EquityProviderKind::Finnhub => Arc::new(finnhub::FinnhubProvider::new(
            equity.base_url(),
            equity.api_key.as_deref(),
            &config.currency,
        )?),
    };
    Ok(provider)
}

pub fn crypto_provider(config: &AppConfig) -> Result<Arc<dyn QuoteProvider>> {
    let crypto = &config.providers.crypto;
    Ok(Arc::new(coingecko::CoinGeckoProvider::new(
        crypto.base_url(),
        crypto.api_key.as_deref(),
        &config.currency,
    )?))
}
