//! Finnhub REST client implementing [`MarketDataProvider`].
//!
//! Endpoints used:
//! - `GET /quote?symbol=` for the latest quote
//! - `GET /search?q=` for symbol lookup
//!
//! The API key travels in the `X-Finnhub-Token` header. Upstream throttling
//! is reported as an error, never retried.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::ProviderError;
use crate::services::market_data::{MarketDataProvider, RawMatch, RawQuote};

pub const PROVIDER_NAME: &str = "finnhub";

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    result: Vec<Value>,
}

pub struct FinnhubClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl FinnhubClient {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, ProviderError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(base_url, api_key, client))
    }

    pub fn with_client(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        client: Client,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        }
    }

    /// Build a client from config, or `None` when no API key is configured.
    pub fn from_config(config: &Config) -> Result<Option<Self>, ProviderError> {
        let Some(api_key) = config.finnhub_api_key.as_deref() else {
            return Ok(None);
        };
        Self::new(
            config.finnhub_base_url.clone(),
            api_key,
            Duration::from_secs(config.api_timeout_secs),
        )
        .map(Some)
    }

    async fn fetch(&self, endpoint: &str, params: &[(&str, &str)]) -> Result<String, ProviderError> {
        let url = format!("{}{}", self.base_url, endpoint);
        let start = Instant::now();

        let response = self
            .client
            .get(&url)
            .header("X-Finnhub-Token", &self.api_key)
            .query(params)
            .send()
            .await?;

        let status = response.status();
        debug!(
            endpoint = endpoint,
            status = status.as_u16(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Finnhub response"
        );

        match status {
            StatusCode::UNAUTHORIZED => return Err(ProviderError::Unauthorized),
            // Finnhub answers 403 once the plan quota is exhausted
            StatusCode::TOO_MANY_REQUESTS | StatusCode::FORBIDDEN => {
                return Err(ProviderError::RateLimited)
            }
            s if !s.is_success() => {
                let body = response.text().await.unwrap_or_default();
                let message = serde_json::from_str::<ErrorResponse>(&body)
                    .ok()
                    .and_then(|e| e.error)
                    .unwrap_or(body);
                return Err(ProviderError::Http {
                    status: s.as_u16(),
                    message,
                });
            }
            _ => {}
        }

        Ok(response.text().await?)
    }
}

#[async_trait]
impl MarketDataProvider for FinnhubClient {
    async fn quote(&self, symbol: &str) -> Result<RawQuote, ProviderError> {
        info!(symbol = %symbol, "finnhub.get_quote");
        let start = Instant::now();

        let text = self.fetch("/quote", &[("symbol", symbol)]).await?;
        let quote: Option<RawQuote> =
            serde_json::from_str(&text).map_err(|e| ProviderError::Decode {
                what: "quote",
                message: e.to_string(),
            })?;

        info!(
            symbol = %symbol,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "finnhub.quote_complete"
        );
        Ok(quote.unwrap_or_default())
    }

    async fn symbol_lookup(&self, query: &str) -> Result<Vec<RawMatch>, ProviderError> {
        info!(query = %query, "finnhub.search_companies");
        let start = Instant::now();

        let text = self.fetch("/search", &[("q", query)]).await?;
        let response: Option<SearchResponse> =
            serde_json::from_str(&text).map_err(|e| ProviderError::Decode {
                what: "search",
                message: e.to_string(),
            })?;
        let entries = response.unwrap_or_default().result;
        let total = entries.len();

        // Bad records are skipped, not fatal
        let matches: Vec<RawMatch> = entries
            .into_iter()
            .filter_map(|entry| match serde_json::from_value::<RawMatch>(entry.clone()) {
                Ok(m) => Some(m),
                Err(e) => {
                    warn!(error = %e, data = %entry, "finnhub.invalid_company_data");
                    None
                }
            })
            .collect();

        info!(
            query = %query,
            count = matches.len(),
            skipped = total - matches.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "finnhub.search_complete"
        );
        Ok(matches)
    }
}
