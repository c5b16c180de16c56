use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::Deserialize;
use tracing::{debug, instrument};

use crate::core::{Quote, QuoteError, QuoteProvider};
use crate::providers::util::{fetch_json, http_client};

const PROVIDER: &str = "finnhub";

/// Equity, fund and commodity quotes from the Finnhub quote API.
///
/// Finnhub needs an API key. Without one every call fails with a
/// configuration error before anything is sent.
pub struct FinnhubProvider {
    base_url: String,
    api_key: Option<String>,
    currency: String,
    client: Client,
}

impl FinnhubProvider {
    /// The quote endpoint reports no currency, so `currency` is applied to
    /// every quote.
    pub fn new(base_url: &str, api_key: Option<&str>, currency: &str) -> Result<Self, QuoteError> {
        Ok(FinnhubProvider {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key
                .map(str::trim)
                .filter(|k| !k.is_empty())
                .map(str::to_string),
            currency: currency.to_uppercase(),
            client: http_client(PROVIDER)?,
        })
    }
}

#[derive(Deserialize, Debug)]
struct FinnhubQuoteResponse {
    /// Current price
    c: Option<f64>,
}

#[async_trait]
impl QuoteProvider for FinnhubProvider {
    fn name(&self) -> &'static str {
        PROVIDER
    }

    #[instrument(
        name = "FinnhubQuoteFetch",
        skip(self),
        fields(symbol = %symbol)
    )]
    async fn fetch_quote(&self, symbol: &str) -> Result<Quote, QuoteError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| QuoteError::Configuration {
                provider: PROVIDER,
                message: "missing API key".to_string(),
            })?;

        let url = Url::parse_with_params(
            &format!("{}/api/v1/quote", self.base_url),
            &[("symbol", symbol.trim())],
        )
        .map_err(|e| QuoteError::provider(PROVIDER, format!("Invalid URL for {symbol}: {e}")))?;
        debug!("Requesting quote from {}", url);

        let request = self.client.get(url).header("X-Finnhub-Token", api_key);
        let data: FinnhubQuoteResponse = fetch_json(PROVIDER, symbol, request).await?;

        Quote::new(PROVIDER, symbol, data.c, &self.currency)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn create_mock_server(symbol: &str, status: u16, body: &str) -> MockServer {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/quote"))
            .and(query_param("symbol", symbol))
            .and(header("X-Finnhub-Token", "test-key"))
            .respond_with(ResponseTemplate::new(status).set_body_string(body))
            .mount(&mock_server)
            .await;
        mock_server
    }

    #[tokio::test]
    async fn test_successful_quote_fetch() {
        let body = r#"{"c": 261.74, "d": 1.2, "dp": 0.46, "h": 263.1, "l": 260.0, "o": 261.0, "pc": 260.54, "t": 1700000000}"#;
        let mock_server = create_mock_server("AAPL", 200, body).await;
        let provider = FinnhubProvider::new(&mock_server.uri(), Some("test-key"), "usd").unwrap();

        let quote = provider.fetch_quote("AAPL").await.unwrap();
        assert_eq!(quote.price, 261.74);
        assert_eq!(quote.currency, "USD");
        assert_eq!(quote.source, "finnhub");
    }

    #[tokio::test]
    async fn test_unknown_symbol_reports_zero_price() {
        let body = r#"{"c": 0, "d": null, "dp": null, "h": 0, "l": 0, "o": 0, "pc": 0, "t": 0}"#;
        let mock_server = create_mock_server("NOPE", 200, body).await;
        let provider = FinnhubProvider::new(&mock_server.uri(), Some("test-key"), "USD").unwrap();

        let err = provider.fetch_quote("NOPE").await.unwrap_err();
        assert_eq!(err, QuoteError::price_not_found("finnhub", "NOPE"));
    }

    #[tokio::test]
    async fn test_missing_api_key_makes_no_request() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&mock_server)
            .await;

        for key in [None, Some("  ")] {
            let provider = FinnhubProvider::new(&mock_server.uri(), key, "USD").unwrap();
            let err = provider.fetch_quote("AAPL").await.unwrap_err();
            assert!(err.is_configuration());
            assert_eq!(
                err.to_string(),
                "finnhub: configuration error: missing API key"
            );
        }
    }

    #[tokio::test]
    async fn test_unauthorized_status() {
        let mock_server = create_mock_server("AAPL", 401, r#"{"error": "Invalid API key"}"#).await;
        let provider = FinnhubProvider::new(&mock_server.uri(), Some("test-key"), "USD").unwrap();

        let err = provider.fetch_quote("AAPL").await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "finnhub: HTTP error: 401 Unauthorized for AAPL"
        );
    }
}
