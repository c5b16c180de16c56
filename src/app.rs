//! Process-wide wiring: one cache, one resolver, one holdings store.
use crate::core::cache::Cache;
use crate::core::config::AppConfig;
use crate::core::{Enricher, Holding, PortfolioView, Quote, QuoteCache, QuoteResolver};
use crate::providers;
use crate::store::HoldingStore;
use crate::store::disk::{self, DiskCache, DiskHoldingStore, QUOTES_PARTITION};
use crate::store::memory::MemoryCache;
use anyhow::{Context, Result};
use fjall::Keyspace;
use std::sync::Arc;
use tracing::debug;

pub struct App {
    pub config: AppConfig,
    pub store: Arc<dyn HoldingStore>,
    keyspace: Option<Keyspace>,
    resolver: QuoteResolver,
    enricher: Enricher,
}

impl App {
    /// Opens the on-disk holdings store and quote cache under the configured
    /// data path. Cached quotes are shared by every run until they expire.
    pub fn open(config: AppConfig) -> Result<Self> {
        let data_path = config.default_data_path()?;
        let keyspace = disk::open_keyspace(&data_path)
            .with_context(|| format!("Failed to open data at {}", data_path.display()))?;
        let store = Arc::new(DiskHoldingStore::new(&keyspace)?);
        let quotes = Arc::new(DiskCache::<Quote>::new(&keyspace, QUOTES_PARTITION)?);
        let mut app = Self::with_cache(config, store, quotes)?;
        app.keyspace = Some(keyspace);
        Ok(app)
    }

    /// In-memory quote cache; nothing outlives the process except `store`.
    pub fn with_store(config: AppConfig, store: Arc<dyn HoldingStore>) -> Result<Self> {
        Self::with_cache(config, store, Arc::new(MemoryCache::<String, Quote>::new()))
    }

    fn with_cache(
        config: AppConfig,
        store: Arc<dyn HoldingStore>,
        quotes: Arc<dyn Cache<String, Quote>>,
    ) -> Result<Self> {
        let resolver = QuoteResolver::new(
            providers::equity_provider(&config)?,
            providers::crypto_provider(&config)?,
        );
        let cache = QuoteCache::new(quotes, config.cache);
        let enricher = Enricher::new(cache, resolver.clone(), &config.currency);
        debug!(owner = %config.owner, currency = %config.currency, "Application ready");
        Ok(Self {
            config,
            store,
            keyspace: None,
            resolver,
            enricher,
        })
    }

    pub fn owner(&self) -> &str {
        &self.config.owner
    }

    /// The owner's holdings, newest first.
    pub async fn holdings(&self) -> Result<Vec<Holding>> {
        self.store.list(self.owner()).await
    }

    /// `holdings` valued at current prices.
    pub async fn portfolio_view(
        &self,
        holdings: &[Holding],
        progress: &(dyn Fn() + Sync),
    ) -> PortfolioView {
        self.enricher.view(holdings, progress).await
    }

    /// Uncached single-symbol lookup. Any resolution failure is an error.
    pub async fn quote(&self, symbol: &str, asset_class: &str) -> Result<Quote> {
        Ok(self.resolver.resolve_tag(symbol, asset_class).await?)
    }

    /// Makes holdings and cached quotes durable when backed by disk.
    pub fn flush(&self) -> Result<()> {
        match &self.keyspace {
            Some(keyspace) => disk::persist(keyspace),
            None => Ok(()),
        }
    }
}
