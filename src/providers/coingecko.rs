use async_trait::async_trait;
use reqwest::{Client, Url};
use std::collections::HashMap;
use tracing::{debug, instrument};

use crate::core::{Quote, QuoteError, QuoteProvider};
use crate::providers::util::{fetch_json, http_client};

const PROVIDER: &str = "coingecko";

/// Ticker symbols this adapter prices, and their CoinGecko coin ids.
pub const SUPPORTED_COINS: &[(&str, &str)] = &[
    ("BTC", "bitcoin"),
    ("ETH", "ethereum"),
    ("SOL", "solana"),
    ("ADA", "cardano"),
    ("XRP", "ripple"),
    ("DOGE", "dogecoin"),
    ("DOT", "polkadot"),
    ("MATIC", "matic-network"),
    ("LTC", "litecoin"),
    ("BNB", "binancecoin"),
    ("USDT", "tether"),
    ("USDC", "usd-coin"),
    ("AVAX", "avalanche-2"),
    ("LINK", "chainlink"),
    ("TRX", "tron"),
];

pub fn coin_id(symbol: &str) -> Option<&'static str> {
    let symbol = symbol.trim().to_uppercase();
    SUPPORTED_COINS
        .iter()
        .find(|(ticker, _)| *ticker == symbol)
        .map(|(_, id)| *id)
}

/// Crypto quotes from the CoinGecko simple-price endpoint.
pub struct CoinGeckoProvider {
    base_url: String,
    api_key: Option<String>,
    vs_currency: String,
    client: Client,
}

impl CoinGeckoProvider {
    /// Prices are requested in `vs_currency`.
    pub fn new(
        base_url: &str,
        api_key: Option<&str>,
        vs_currency: &str,
    ) -> Result<Self, QuoteError> {
        Ok(CoinGeckoProvider {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key
                .map(str::trim)
                .filter(|k| !k.is_empty())
                .map(str::to_string),
            vs_currency: vs_currency.to_lowercase(),
            client: http_client(PROVIDER)?,
        })
    }
}

/// `{"bitcoin": {"usd": 30000.0}}`
type SimplePriceResponse = HashMap<String, HashMap<String, Option<f64>>>;

#[async_trait]
impl QuoteProvider for CoinGeckoProvider {
    fn name(&self) -> &'static str {
        PROVIDER
    }

    #[instrument(
        name = "CoinGeckoQuoteFetch",
        skip(self),
        fields(symbol = %symbol)
    )]
    async fn fetch_quote(&self, symbol: &str) -> Result<Quote, QuoteError> {
        let id =
            coin_id(symbol).ok_or_else(|| QuoteError::UnsupportedSymbol(symbol.to_string()))?;

        let url = Url::parse_with_params(
            &format!("{}/api/v3/simple/price", self.base_url),
            &[("ids", id), ("vs_currencies", self.vs_currency.as_str())],
        )
        .map_err(|e| QuoteError::provider(PROVIDER, format!("Invalid URL for {symbol}: {e}")))?;
        debug!("Requesting quote from {}", url);

        let mut request = self.client.get(url);
        if let Some(api_key) = &self.api_key {
            request = request.header("x-cg-demo-api-key", api_key);
        }
        let mut data: SimplePriceResponse = fetch_json(PROVIDER, symbol, request).await?;

        let price = data
            .remove(id)
            .and_then(|prices| prices.get(&self.vs_currency).copied().flatten());

        Quote::new(PROVIDER, symbol, price, &self.vs_currency)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn create_mock_server(id: &str, status: u16, body: &str) -> MockServer {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v3/simple/price"))
            .and(query_param("ids", id))
            .and(query_param("vs_currencies", "usd"))
            .respond_with(ResponseTemplate::new(status).set_body_string(body))
            .expect(1)
            .mount(&mock_server)
            .await;
        mock_server
    }

    #[test]
    fn test_coin_id_lookup() {
        assert_eq!(coin_id("BTC"), Some("bitcoin"));
        assert_eq!(coin_id(" eth "), Some("ethereum"));
        assert_eq!(coin_id("FOO"), None);
    }

    #[tokio::test]
    async fn test_successful_quote_fetch() {
        let mock_server =
            create_mock_server("bitcoin", 200, r#"{"bitcoin": {"usd": 30000}}"#).await;
        let provider = CoinGeckoProvider::new(&mock_server.uri(), None, "USD").unwrap();

        let quote = provider.fetch_quote("btc").await.unwrap();
        assert_eq!(quote.symbol, "btc");
        assert_eq!(quote.price, 30000.0);
        assert_eq!(quote.currency, "USD");
        assert_eq!(quote.source, "coingecko");
    }

    #[tokio::test]
    async fn test_unsupported_symbol_makes_no_request() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&mock_server)
            .await;
        let provider = CoinGeckoProvider::new(&mock_server.uri(), None, "USD").unwrap();

        let err = provider.fetch_quote("FOO").await.unwrap_err();
        assert_eq!(err, QuoteError::UnsupportedSymbol("FOO".to_string()));
        assert_eq!(err.to_string(), "unsupported symbol: FOO");
    }

    #[tokio::test]
    async fn test_missing_price_field() {
        for body in [r#"{}"#, r#"{"ethereum": {}}"#, r#"{"ethereum": {"usd": null}}"#] {
            let mock_server = create_mock_server("ethereum", 200, body).await;
            let provider = CoinGeckoProvider::new(&mock_server.uri(), None, "USD").unwrap();

            let err = provider.fetch_quote("ETH").await.unwrap_err();
            assert_eq!(err, QuoteError::price_not_found("coingecko", "ETH"));
        }
    }

    #[tokio::test]
    async fn test_rate_limited_status() {
        let mock_server = create_mock_server("solana", 429, "").await;
        let provider = CoinGeckoProvider::new(&mock_server.uri(), None, "USD").unwrap();

        let err = provider.fetch_quote("SOL").await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "coingecko: HTTP error: 429 Too Many Requests for SOL"
        );
    }

    #[tokio::test]
    async fn test_api_key_sent_as_header() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v3/simple/price"))
            .and(header("x-cg-demo-api-key", "demo"))
            .respond_with(
                ResponseTemplate::new(200).set_body_string(r#"{"bitcoin": {"usd": 1.5}}"#),
            )
            .expect(1)
            .mount(&mock_server)
            .await;
        let provider = CoinGeckoProvider::new(&mock_server.uri(), Some("demo"), "USD").unwrap();

        let quote = provider.fetch_quote("BTC").await.unwrap();
        assert_eq!(quote.price, 1.5);
    }
}
