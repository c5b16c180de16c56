use crate::core::AssetClass;
use crate::core::cache::Cache;
use crate::core::quote::Quote;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Lifetime of a cached quote, per asset class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheTtl {
    #[serde(default = "CacheTtl::default_crypto_secs")]
    pub crypto_ttl_secs: u64,
    #[serde(default = "CacheTtl::default_other_secs")]
    pub default_ttl_secs: u64,
}

impl CacheTtl {
    fn default_crypto_secs() -> u64 {
        60
    }

    fn default_other_secs() -> u64 {
        900
    }

    pub fn ttl(&self, asset_class: AssetClass) -> Duration {
        match asset_class {
            AssetClass::Crypto => Duration::from_secs(self.crypto_ttl_secs),
            AssetClass::Equity | AssetClass::Fund | AssetClass::Commodity => {
                Duration::from_secs(self.default_ttl_secs)
            }
        }
    }
}

impl Default for CacheTtl {
    fn default() -> Self {
        CacheTtl {
            crypto_ttl_secs: Self::default_crypto_secs(),
            default_ttl_secs: Self::default_other_secs(),
        }
    }
}

/// Quote cache keyed by `(asset class, symbol)`.
///
/// Cloning shares the underlying store.
#[derive(Clone)]
pub struct QuoteCache {
    store: Arc<dyn Cache<String, Quote>>,
    crypto_ttl: Duration,
    default_ttl: Duration,
}

impl QuoteCache {
    pub fn new(store: Arc<dyn Cache<String, Quote>>, ttl: CacheTtl) -> Self {
        Self::with_ttls(
            store,
            ttl.ttl(AssetClass::Crypto),
            ttl.ttl(AssetClass::Equity),
        )
    }

    pub fn with_ttls(
        store: Arc<dyn Cache<String, Quote>>,
        crypto_ttl: Duration,
        default_ttl: Duration,
    ) -> Self {
        Self {
            store,
            crypto_ttl,
            default_ttl,
        }
    }

    pub fn key(asset_class: AssetClass, symbol: &str) -> String {
        format!("{}:{}", asset_class.as_str(), symbol.trim()).to_uppercase()
    }

    pub fn ttl(&self, asset_class: AssetClass) -> Duration {
        match asset_class {
            AssetClass::Crypto => self.crypto_ttl,
            _ => self.default_ttl,
        }
    }

    pub async fn get(&self, asset_class: AssetClass, symbol: &str) -> Option<Quote> {
        self.store.get(&Self::key(asset_class, symbol)).await
    }

    pub async fn put(&self, asset_class: AssetClass, symbol: &str, quote: Quote) {
        let ttl = self.ttl(asset_class);
        debug!(%asset_class, symbol, ?ttl, "Caching quote");
        self.store
            .put(Self::key(asset_class, symbol), quote, Some(ttl))
            .await;
    }
}
