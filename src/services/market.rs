//! Entry points consumed by the transport layer.
//!
//! [`MarketService`] is built once at startup and shared through the HTTP
//! state. Without a provider credential every operation reports
//! `ServiceUnavailable`.

use std::sync::Arc;
use std::time::Instant;

use serde::Deserialize;
use tracing::{error, info};

use crate::config::Config;
use crate::error::{MarketError, ProviderError};
use crate::metrics::Metrics;
use crate::models::{
    BatchResult, CompanyMatch, HealthState, ProviderHealth, Quote, QuoteResponse,
};
use crate::services::aggregator::{Identifier, QuoteAggregator};
use crate::services::finnhub::{FinnhubClient, PROVIDER_NAME};
use crate::services::market_data::MarketDataProvider;
use crate::services::resolver::SymbolResolver;
use crate::services::search::CompanySearch;

/// Symbol probed by the health check.
pub const HEALTH_CHECK_SYMBOL: &str = "AAPL";

/// Any combination of identifiers a quote request may carry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct QuoteQuery {
    #[serde(default)]
    pub symbol: Option<String>,
    #[serde(default)]
    pub company_name: Option<String>,
    #[serde(default)]
    pub symbols: Vec<String>,
    #[serde(default)]
    pub company_names: Vec<String>,
}

impl QuoteQuery {
    pub fn symbol(symbol: impl Into<String>) -> Self {
        Self {
            symbol: Some(symbol.into()),
            ..Self::default()
        }
    }

    pub fn company_name(company_name: impl Into<String>) -> Self {
        Self {
            company_name: Some(company_name.into()),
            ..Self::default()
        }
    }
}

struct Components {
    provider: Arc<dyn MarketDataProvider>,
    search: CompanySearch,
    resolver: SymbolResolver,
    aggregator: QuoteAggregator,
    metrics: Option<Arc<Metrics>>,
}

pub struct MarketService {
    components: Option<Components>,
}

impl MarketService {
    pub fn new(
        provider: Option<Arc<dyn MarketDataProvider>>,
        metrics: Option<Arc<Metrics>>,
        batch_concurrency: usize,
    ) -> Self {
        let components = provider.map(|provider| {
            let search = CompanySearch::new(provider.clone(), metrics.clone());
            let resolver = SymbolResolver::new(search.clone());
            let aggregator = QuoteAggregator::new(
                provider.clone(),
                resolver.clone(),
                metrics.clone(),
                batch_concurrency,
            );
            Components {
                provider,
                search,
                resolver,
                aggregator,
                metrics,
            }
        });
        Self { components }
    }

    /// Build the service from config. A missing API key yields an unavailable
    /// service; a client that cannot be constructed is an error.
    pub fn from_config(
        config: &Config,
        metrics: Option<Arc<Metrics>>,
    ) -> Result<Self, ProviderError> {
        let provider = FinnhubClient::from_config(config)?
            .map(|client| Arc::new(client) as Arc<dyn MarketDataProvider>);
        Ok(Self::new(provider, metrics, config.batch_concurrency))
    }

    pub fn unavailable() -> Self {
        Self { components: None }
    }

    pub fn is_available(&self) -> bool {
        self.components.is_some()
    }

    fn components(&self) -> Result<&Components, MarketError> {
        self.components
            .as_ref()
            .ok_or_else(|| MarketError::ServiceUnavailable {
                service: PROVIDER_NAME.to_string(),
            })
    }

    /// Quote whatever identifiers the query carries.
    ///
    /// Precedence: several company names, one company name, several symbols,
    /// one symbol, then the `symbol` / `company_name` pair.
    pub async fn resolve_and_quote(&self, query: &QuoteQuery) -> Result<QuoteResponse, MarketError> {
        let c = self.components()?;

        if query.company_names.len() > 1 {
            let identifiers = query
                .company_names
                .iter()
                .cloned()
                .map(Identifier::CompanyName)
                .collect();
            return Ok(QuoteResponse::Batch(c.aggregator.get_many(identifiers).await));
        }
        if let [name] = query.company_names.as_slice() {
            let identifier = Identifier::CompanyName(name.clone());
            return Ok(QuoteResponse::Single(c.aggregator.quote_identifier(&identifier).await));
        }
        if query.symbols.len() > 1 {
            let identifiers = query.symbols.iter().cloned().map(Identifier::Symbol).collect();
            return Ok(QuoteResponse::Batch(c.aggregator.get_many(identifiers).await));
        }
        if let [symbol] = query.symbols.as_slice() {
            return Ok(QuoteResponse::Single(c.aggregator.get_quote(symbol).await));
        }

        let company_name = query.company_name.as_deref();
        let resolved = match c.resolver.resolve(query.symbol.as_deref(), company_name).await {
            Ok(resolved) => resolved,
            Err(MarketError::MissingIdentifier) => return Err(MarketError::MissingIdentifier),
            Err(e) => {
                let fallback = company_name.unwrap_or_default().trim().to_uppercase();
                return Ok(QuoteResponse::Single(c.aggregator.failed_quote(fallback, &e)));
            }
        };

        let quote = c.aggregator.get_quote(&resolved.symbol).await;
        Ok(QuoteResponse::Single(quote.with_company_name(resolved.company_name)))
    }

    pub async fn get_quote(&self, symbol: &str) -> Result<Quote, MarketError> {
        Ok(self.components()?.aggregator.get_quote(symbol).await)
    }

    pub async fn get_quote_by_company_name(&self, company_name: &str) -> Result<Quote, MarketError> {
        self.components()?
            .aggregator
            .get_quote_by_company_name(company_name)
            .await
    }

    pub async fn get_many(&self, identifiers: Vec<Identifier>) -> Result<BatchResult, MarketError> {
        Ok(self.components()?.aggregator.get_many(identifiers).await)
    }

    /// Search companies; provider failures read as "no matches".
    pub async fn search_companies(&self, query: &str) -> Result<Vec<CompanyMatch>, MarketError> {
        Ok(self.components()?.search.search(query).await)
    }

    /// Search companies, reporting provider failures as errors.
    pub async fn try_search_companies(&self, query: &str) -> Result<Vec<CompanyMatch>, MarketError> {
        Ok(self.components()?.search.try_search(query).await?)
    }

    /// Probe the provider with one cheap quote call.
    pub async fn health_check(&self) -> ProviderHealth {
        let Some(c) = &self.components else {
            return ProviderHealth {
                name: PROVIDER_NAME,
                status: HealthState::Unhealthy,
                message: "Service not initialized".to_string(),
                response_time_ms: None,
            };
        };

        let start = Instant::now();
        let result = c.provider.quote(HEALTH_CHECK_SYMBOL).await;
        if let Some(metrics) = &c.metrics {
            metrics.record_provider_call("quote", result.is_ok());
        }
        match result {
            Ok(_) => {
                let elapsed_ms = (start.elapsed().as_secs_f64() * 100_000.0).round() / 100.0;
                info!(elapsed_ms = elapsed_ms, "Provider health check passed");
                ProviderHealth {
                    name: PROVIDER_NAME,
                    status: HealthState::Healthy,
                    message: "Connected".to_string(),
                    response_time_ms: Some(elapsed_ms),
                }
            }
            Err(e) => {
                error!(error = %e, "finnhub.health_check_failed");
                ProviderHealth {
                    name: PROVIDER_NAME,
                    status: HealthState::Unhealthy,
                    message: format!("Health check failed: {}", e),
                    response_time_ms: None,
                }
            }
        }
    }
}
