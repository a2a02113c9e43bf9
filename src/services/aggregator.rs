//! Single and batch quote retrieval.
//!
//! Every identifier yields exactly one [`Quote`]. Failures are folded into
//! the quote (`price = None`, `error` and `failure` set) so one bad
//! identifier never aborts a batch.

use std::sync::Arc;

use futures_util::stream::{self, StreamExt};
use tracing::{info, warn};

use crate::error::MarketError;
use crate::metrics::Metrics;
use crate::models::{BatchResult, Quote};
use crate::services::market_data::{MarketDataProvider, RawQuote};
use crate::services::resolver::{normalize_symbol, SymbolResolver};

/// Something a caller can ask a quote for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Identifier {
    Symbol(String),
    CompanyName(String),
}

impl Identifier {
    /// Symbol reported on a failure-shaped quote for this identifier.
    fn fallback_symbol(&self) -> String {
        match self {
            Self::Symbol(raw) | Self::CompanyName(raw) => raw.trim().to_uppercase(),
        }
    }
}

#[derive(Clone)]
pub struct QuoteAggregator {
    provider: Arc<dyn MarketDataProvider>,
    resolver: SymbolResolver,
    metrics: Option<Arc<Metrics>>,
    concurrency: usize,
}

impl QuoteAggregator {
    pub fn new(
        provider: Arc<dyn MarketDataProvider>,
        resolver: SymbolResolver,
        metrics: Option<Arc<Metrics>>,
        concurrency: usize,
    ) -> Self {
        Self {
            provider,
            resolver,
            metrics,
            concurrency: concurrency.max(1),
        }
    }

    /// Fetch a quote, keeping "no price" and transport failures distinct.
    pub async fn fetch_quote(&self, symbol: &str) -> Result<Quote, MarketError> {
        let symbol = normalize_symbol(symbol).ok_or(MarketError::MissingIdentifier)?;

        let result = self.provider.quote(&symbol).await;
        if let Some(metrics) = &self.metrics {
            metrics.record_provider_call("quote", result.is_ok());
        }

        let raw = result.map_err(|e| {
            warn!(symbol = %symbol, error = %e, "finnhub.quote_error");
            MarketError::from(e)
        })?;

        priced_quote(symbol, raw)
    }

    /// Fetch a quote, folding any failure into the returned shape.
    pub async fn get_quote(&self, symbol: &str) -> Quote {
        match self.fetch_quote(symbol).await {
            Ok(quote) => quote,
            Err(e) => self.failed_quote(symbol.trim().to_uppercase(), &e),
        }
    }

    /// Resolve a company name via search and quote its best match.
    pub async fn get_quote_by_company_name(&self, company_name: &str) -> Result<Quote, MarketError> {
        let resolved = self.resolver.resolve_company(company_name).await?;
        Ok(self
            .get_quote(&resolved.symbol)
            .await
            .with_company_name(resolved.company_name))
    }

    /// Quote one identifier; never fails.
    pub async fn quote_identifier(&self, identifier: &Identifier) -> Quote {
        let result = match identifier {
            Identifier::Symbol(symbol) => return self.get_quote(symbol).await,
            Identifier::CompanyName(name) => self.get_quote_by_company_name(name).await,
        };
        result.unwrap_or_else(|e| self.failed_quote(identifier.fallback_symbol(), &e))
    }

    /// Quote every identifier, preserving input order in the result.
    pub async fn get_many(&self, identifiers: Vec<Identifier>) -> BatchResult {
        let total = identifiers.len();
        let items: Vec<Quote> = stream::iter(identifiers)
            .map(move |identifier| async move { self.quote_identifier(&identifier).await })
            .buffered(self.concurrency)
            .collect()
            .await;

        let batch = BatchResult::from_items(items);
        info!(
            total = total,
            successful = batch.successful,
            failed = batch.failed,
            "Batch quote complete"
        );
        batch
    }

    pub(crate) fn failed_quote(&self, symbol: String, error: &MarketError) -> Quote {
        let quote = Quote::from_error(symbol, error);
        if let (Some(metrics), Some(failure)) = (&self.metrics, quote.failure) {
            metrics.record_quote_failure(failure.as_str());
        }
        quote
    }
}

/// Build a priced quote from the raw payload, copying fields as-is.
pub fn priced_quote(symbol: String, raw: RawQuote) -> Result<Quote, MarketError> {
    let Some(price) = raw.c else {
        return Err(MarketError::SymbolHasNoData { symbol });
    };

    Ok(Quote {
        symbol,
        price: Some(price),
        high: raw.h,
        low: raw.l,
        open: raw.o,
        previous_close: raw.pc,
        timestamp: raw.t,
        ..Quote::default()
    })
}
