use crate::core::QuoteError;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use tracing::debug;

const USER_AGENT: &str = concat!("portwatch/", env!("CARGO_PKG_VERSION"));

/// Builds the HTTP client an adapter keeps for its lifetime.
pub fn http_client(provider: &'static str) -> Result<Client, QuoteError> {
    Client::builder()
        .user_agent(USER_AGENT)
        .build()
        .map_err(|e| QuoteError::provider(provider, format!("Failed to build HTTP client: {e}")))
}

/// Sends a single GET and decodes its JSON body.
///
/// Transport failures, non-2xx statuses and undecodable bodies all come back
/// as [`QuoteError::Provider`] naming `provider` and `symbol`.
pub async fn fetch_json<T: DeserializeOwned>(
    provider: &'static str,
    symbol: &str,
    request: RequestBuilder,
) -> Result<T, QuoteError> {
    let response = request
        .send()
        .await
        .map_err(|e| QuoteError::provider(provider, format!("Request error for {symbol}: {e}")))?;

    debug!(status = %response.status(), "Received {provider} response");

    if !response.status().is_success() {
        return Err(QuoteError::provider(
            provider,
            format!("HTTP error: {} for {symbol}", response.status()),
        ));
    }

    let text = response.text().await.map_err(|e| {
        QuoteError::provider(provider, format!("Failed to read response for {symbol}: {e}"))
    })?;

    serde_json::from_str(&text).map_err(|e| {
        QuoteError::provider(
            provider,
            format!("Failed to parse JSON response for {symbol}: {e}"),
        )
    })
}
