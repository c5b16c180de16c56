use crate::core::AssetClass;
use crate::core::error::QuoteError;
use crate::core::quote::{Quote, QuoteProvider};
use std::sync::Arc;
use tracing::debug;

/// Routes a symbol to the adapter responsible for its asset class.
///
/// Holds no state beyond the two adapters and never caches.
#[derive(Clone)]
pub struct QuoteResolver {
    equity: Arc<dyn QuoteProvider>,
    crypto: Arc<dyn QuoteProvider>,
}

impl QuoteResolver {
    pub fn new(equity: Arc<dyn QuoteProvider>, crypto: Arc<dyn QuoteProvider>) -> Self {
        Self { equity, crypto }
    }

    pub fn provider_for(&self, asset_class: AssetClass) -> &dyn QuoteProvider {
        match asset_class {
            AssetClass::Crypto => self.crypto.as_ref(),
            AssetClass::Equity | AssetClass::Fund | AssetClass::Commodity => self.equity.as_ref(),
        }
    }

    pub async fn resolve(
        &self,
        symbol: &str,
        asset_class: AssetClass,
    ) -> Result<Quote, QuoteError> {
        let provider = self.provider_for(asset_class);
        debug!(symbol, %asset_class, provider = provider.name(), "Resolving quote");
        provider.fetch_quote(symbol).await
    }

    /// Like [`resolve`](Self::resolve) for an untyped asset class tag.
    pub async fn resolve_tag(
        &self,
        symbol: &str,
        asset_class: &str,
    ) -> Result<Quote, QuoteError> {
        let asset_class: AssetClass = asset_class.parse()?;
        self.resolve(symbol, asset_class).await
    }
}
