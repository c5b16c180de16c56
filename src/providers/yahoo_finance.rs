use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::Deserialize;
use tracing::{debug, instrument};

use crate::core::{Quote, QuoteError, QuoteProvider};
use crate::providers::util::{fetch_json, http_client};

const PROVIDER: &str = "yahoo";

/// Equity, fund and commodity quotes from the Yahoo Finance chart API.
pub struct YahooFinanceProvider {
    base_url: String,
    fallback_currency: String,
    client: Client,
}

impl YahooFinanceProvider {
    /// `fallback_currency` is used when the response carries no currency.
    pub fn new(base_url: &str, fallback_currency: &str) -> Result<Self, QuoteError> {
        Ok(YahooFinanceProvider {
            base_url: base_url.trim_end_matches('/').to_string(),
            fallback_currency: fallback_currency.to_uppercase(),
            client: http_client(PROVIDER)?,
        })
    }
}

#[derive(Deserialize, Debug)]
struct YahooPriceResponse {
    chart: PriceChartResult,
}

#[derive(Deserialize, Debug)]
struct PriceChartResult {
    result: Option<Vec<PriceChartItem>>,
}

#[derive(Deserialize, Debug)]
struct PriceChartItem {
    meta: PriceChartMeta,
}

#[derive(Deserialize, Debug)]
struct PriceChartMeta {
    #[serde(alias = "regularMarketPrice")]
    regular_market_price: Option<f64>,
    currency: Option<String>,
}

#[async_trait]
impl QuoteProvider for YahooFinanceProvider {
    fn name(&self) -> &'static str {
        PROVIDER
    }

    #[instrument(
        name = "YahooQuoteFetch",
        skip(self),
        fields(symbol = %symbol)
    )]
    async fn fetch_quote(&self, symbol: &str) -> Result<Quote, QuoteError> {
        let invalid_url =
            |e: String| QuoteError::provider(PROVIDER, format!("Invalid URL for {symbol}: {e}"));
        let mut url = Url::parse_with_params(
            &format!("{}/v8/finance/chart", self.base_url),
            &[("interval", "1d"), ("range", "1d")],
        )
        .map_err(|e| invalid_url(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| invalid_url("base URL cannot have a path".to_string()))?
            .push(symbol.trim());
        debug!("Requesting quote from {}", url);

        let data: YahooPriceResponse = fetch_json(PROVIDER, symbol, self.client.get(url)).await?;
        let meta = data
            .chart
            .result
            .and_then(|items| items.into_iter().next())
            .map(|item| item.meta)
            .ok_or_else(|| QuoteError::price_not_found(PROVIDER, symbol))?;

        let currency = meta
            .currency
            .filter(|c| !c.trim().is_empty())
            .unwrap_or_else(|| self.fallback_currency.clone());

        Quote::new(PROVIDER, symbol, meta.regular_market_price, &currency)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    pub async fn create_mock_server(symbol: &str, status: u16, mock_response: &str) -> MockServer {
        let mock_server = MockServer::start().await;
        let request_path = format!("/v8/finance/chart/{symbol}");

        Mock::given(method("GET"))
            .and(path(request_path))
            .and(query_param("range", "1d"))
            .respond_with(ResponseTemplate::new(status).set_body_string(mock_response))
            .expect(1)
            .mount(&mock_server)
            .await;

        mock_server
    }

    #[tokio::test]
    async fn test_successful_quote_fetch() {
        let mock_response = r#"{
            "chart": {
                "result": [{
                    "meta": {
                        "regularMarketPrice": 150.65,
                        "currency": "USD"
                    }
                }]
            }
        }"#;

        let mock_server = create_mock_server("AAPL", 200, mock_response).await;
        let provider = YahooFinanceProvider::new(&mock_server.uri(), "USD").unwrap();

        let quote = provider.fetch_quote("AAPL").await.unwrap();
        assert_eq!(quote.symbol, "AAPL");
        assert_eq!(quote.price, 150.65);
        assert_eq!(quote.currency, "USD");
        assert_eq!(quote.source, "yahoo");
    }

    #[tokio::test]
    async fn test_missing_currency_falls_back() {
        let mock_response = r#"{"chart": {"result": [{"meta": {"regularMarketPrice": 101.2}}]}}"#;
        let mock_server = create_mock_server("VFIAX", 200, mock_response).await;
        let provider = YahooFinanceProvider::new(&mock_server.uri(), "eur").unwrap();

        let quote = provider.fetch_quote("VFIAX").await.unwrap();
        assert_eq!(quote.currency, "EUR");
    }

    #[tokio::test]
    async fn test_missing_price_is_price_not_found() {
        let mock_response = r#"{"chart": {"result": [{"meta": {"currency": "USD"}}]}}"#;
        let mock_server = create_mock_server("AAPL", 200, mock_response).await;
        let provider = YahooFinanceProvider::new(&mock_server.uri(), "USD").unwrap();

        let err = provider.fetch_quote("AAPL").await.unwrap_err();
        assert_eq!(err, QuoteError::price_not_found("yahoo", "AAPL"));
    }

    #[tokio::test]
    async fn test_zero_price_is_price_not_found() {
        let mock_response =
            r#"{"chart": {"result": [{"meta": {"regularMarketPrice": 0, "currency": "USD"}}]}}"#;
        let mock_server = create_mock_server("AAPL", 200, mock_response).await;
        let provider = YahooFinanceProvider::new(&mock_server.uri(), "USD").unwrap();

        let err = provider.fetch_quote("AAPL").await.unwrap_err();
        assert_eq!(err.to_string(), "yahoo: price not found for AAPL");
    }

    #[tokio::test]
    async fn test_no_price_result_data() {
        for body in [
            r#"{"chart": {"result": []}}"#,
            r#"{"chart": {"result": null}}"#,
        ] {
            let mock_server = create_mock_server("INVALID", 200, body).await;
            let provider = YahooFinanceProvider::new(&mock_server.uri(), "USD").unwrap();

            let err = provider.fetch_quote("INVALID").await.unwrap_err();
            assert_eq!(err, QuoteError::price_not_found("yahoo", "INVALID"));
        }
    }

    #[tokio::test]
    async fn test_not_found_status() {
        let mock_response = r#"{"chart": {"result": null, "error": {"code": "Not Found"}}}"#;
        let mock_server = create_mock_server("NOPE", 404, mock_response).await;
        let provider = YahooFinanceProvider::new(&mock_server.uri(), "USD").unwrap();

        let err = provider.fetch_quote("NOPE").await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "yahoo: HTTP error: 404 Not Found for NOPE"
        );
    }

    #[tokio::test]
    async fn test_malformed_response() {
        let mock_response = r#"{"chart": "unavailable"}"#;
        let mock_server = create_mock_server("AAPL", 200, mock_response).await;
        let provider = YahooFinanceProvider::new(&mock_server.uri(), "USD").unwrap();

        let err = provider.fetch_quote("AAPL").await.unwrap_err();
        assert!(
            err.to_string()
                .contains("Failed to parse JSON response for AAPL")
        );
    }

    #[tokio::test]
    async fn test_symbol_is_encoded_as_one_path_segment() {
        let mock_response =
            r#"{"chart": {"result": [{"meta": {"regularMarketPrice": 412.3, "currency": "USD"}}]}}"#;
        let mock_server = create_mock_server("BRK%2FB", 200, mock_response).await;
        let provider = YahooFinanceProvider::new(&mock_server.uri(), "USD").unwrap();

        let quote = provider.fetch_quote("BRK/B").await.unwrap();
        assert_eq!(quote.price, 412.3);
        assert_eq!(quote.symbol, "BRK/B");
    }
}
