//! Attaches live valuation to holdings and aggregates the portfolio summary.
use crate::core::AssetClass;
use crate::core::error::QuoteError;
use crate::core::holding::Holding;
use crate::core::quote::Quote;
use crate::core::quote_cache::QuoteCache;
use crate::core::resolver::QuoteResolver;
use serde::Serialize;
use tracing::{debug, warn};
use uuid::Uuid;

/// A holding together with its valuation, or the reason it could not be valued.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrichedHolding {
    pub id: Uuid,
    pub symbol: String,
    pub asset_class: AssetClass,
    pub quantity: f64,
    pub buy_price: f64,
    pub current_price: Option<f64>,
    pub currency: String,
    pub current_value: Option<f64>,
    pub invested: f64,
    pub pnl: Option<f64>,
    pub pnl_pct: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl EnrichedHolding {
    pub fn valued(holding: &Holding, quote: &Quote) -> Self {
        let current_value = quote.price * holding.quantity;
        let invested = holding.invested();
        let pnl = current_value - invested;
        Self {
            id: holding.id,
            symbol: holding.symbol.clone(),
            asset_class: holding.asset_class,
            quantity: holding.quantity,
            buy_price: holding.buy_price,
            current_price: Some(quote.price),
            currency: quote.currency.clone(),
            current_value: Some(current_value),
            invested,
            pnl: Some(pnl),
            pnl_pct: Some(percentage(pnl, invested)),
            error: None,
        }
    }

    pub fn failed(holding: &Holding, error: &QuoteError, currency: &str) -> Self {
        Self {
            id: holding.id,
            symbol: holding.symbol.clone(),
            asset_class: holding.asset_class,
            quantity: holding.quantity,
            buy_price: holding.buy_price,
            current_price: None,
            currency: currency.to_string(),
            current_value: None,
            invested: holding.invested(),
            pnl: None,
            pnl_pct: None,
            error: Some(error.to_string()),
        }
    }

    pub fn is_valued(&self) -> bool {
        self.error.is_none()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioSummary {
    pub total_invested: f64,
    pub total_current_value: f64,
    #[serde(rename = "netPnL")]
    pub net_pnl: f64,
    #[serde(rename = "netPnLPct")]
    pub net_pnl_pct: f64,
}

/// Everything a portfolio view returns.
#[derive(Debug, Clone, Serialize)]
pub struct PortfolioView {
    pub currency: String,
    pub assets: Vec<EnrichedHolding>,
    pub summary: PortfolioSummary,
}

/// Sums every row's `invested`, and `currentValue` of the valued rows only.
pub fn summarize(assets: &[EnrichedHolding]) -> PortfolioSummary {
    let total_invested: f64 = assets.iter().map(|a| a.invested).sum();
    let total_current_value: f64 = assets.iter().filter_map(|a| a.current_value).sum();
    let net_pnl = total_current_value - total_invested;
    PortfolioSummary {
        total_invested,
        total_current_value,
        net_pnl,
        net_pnl_pct: percentage(net_pnl, total_invested),
    }
}

fn percentage(pnl: f64, invested: f64) -> f64 {
    if invested > 0.0 {
        pnl / invested * 100.0
    } else {
        0.0
    }
}

/// Values holdings through the quote cache, falling back to the resolver.
#[derive(Clone)]
pub struct Enricher {
    cache: QuoteCache,
    resolver: QuoteResolver,
    currency: String,
}

impl Enricher {
    pub fn new(cache: QuoteCache, resolver: QuoteResolver, currency: &str) -> Self {
        Self {
            cache,
            resolver,
            currency: currency.to_uppercase(),
        }
    }

    pub fn currency(&self) -> &str {
        &self.currency
    }

    /// Cached quote for the symbol, resolving and caching it on a miss.
    /// Failures are never cached.
    pub async fn quote_for(
        &self,
        symbol: &str,
        asset_class: AssetClass,
    ) -> Result<Quote, QuoteError> {
        if let Some(quote) = self.cache.get(asset_class, symbol).await {
            return Ok(quote);
        }
        let quote = self.resolver.resolve(symbol, asset_class).await?;
        self.cache.put(asset_class, symbol, quote.clone()).await;
        Ok(quote)
    }

    /// Values each holding in order, one at a time.
    ///
    /// Output is one-to-one with `holdings`. A holding whose quote cannot be
    /// resolved yields a row with its `error` set and no valuation; the rest
    /// of the batch carries on.
    pub async fn enrich(
        &self,
        holdings: &[Holding],
        progress: &(dyn Fn() + Sync),
    ) -> Vec<EnrichedHolding> {
        let mut enriched = Vec::with_capacity(holdings.len());
        for holding in holdings {
            let row = match self.quote_for(&holding.symbol, holding.asset_class).await {
                Ok(quote) => EnrichedHolding::valued(holding, &quote),
                Err(e) => {
                    warn!(
                        symbol = %holding.symbol,
                        asset_class = %holding.asset_class,
                        error = %e,
                        "Quote resolution failed"
                    );
                    EnrichedHolding::failed(holding, &e, &self.currency)
                }
            };
            enriched.push(row);
            progress();
        }
        debug!(
            total = enriched.len(),
            failed = enriched.iter().filter(|e| !e.is_valued()).count(),
            "Enrichment complete"
        );
        enriched
    }

    pub async fn view(
        &self,
        holdings: &[Holding],
        progress: &(dyn Fn() + Sync),
    ) -> PortfolioView {
        let assets = self.enrich(holdings, progress).await;
        let summary = summarize(&assets);
        PortfolioView {
            currency: self.currency.clone(),
            assets,
            summary,
        }
    }
}
