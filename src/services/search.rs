//! Company search over the provider's symbol lookup.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::error::ProviderError;
use crate::metrics::Metrics;
use crate::models::CompanyMatch;
use crate::services::market_data::{MarketDataProvider, RawMatch};

#[derive(Clone)]
pub struct CompanySearch {
    provider: Arc<dyn MarketDataProvider>,
    metrics: Option<Arc<Metrics>>,
}

impl CompanySearch {
    pub fn new(provider: Arc<dyn MarketDataProvider>, metrics: Option<Arc<Metrics>>) -> Self {
        Self { provider, metrics }
    }

    /// Search, treating provider failure as "no matches".
    pub async fn search(&self, query: &str) -> Vec<CompanyMatch> {
        match self.try_search(query).await {
            Ok(matches) => matches,
            Err(e) => {
                warn!(query = %query, error = %e, "Company search failed, returning no matches");
                Vec::new()
            }
        }
    }

    /// Search, surfacing provider failures to the caller.
    ///
    /// Blank queries return no matches without calling the provider.
    pub async fn try_search(&self, query: &str) -> Result<Vec<CompanyMatch>, ProviderError> {
        if query.trim().is_empty() {
            debug!("Blank search query, skipping provider call");
            return Ok(Vec::new());
        }

        let result = self.provider.symbol_lookup(query).await;
        if let Some(metrics) = &self.metrics {
            metrics.record_provider_call("symbol_lookup", result.is_ok());
        }

        Ok(result?.into_iter().filter_map(to_company_match).collect())
    }
}

/// Map a raw lookup entry, dropping entries without a usable symbol.
pub fn to_company_match(raw: RawMatch) -> Option<CompanyMatch> {
    let symbol = raw
        .symbol
        .as_deref()
        .map(|s| s.trim().to_uppercase())
        .filter(|s| !s.is_empty());

    let Some(symbol) = symbol else {
        warn!(description = ?raw.description, "Skipping search match without a symbol");
        return None;
    };

    Some(CompanyMatch {
        symbol,
        description: raw.description,
        security_type: raw.security_type,
        display_symbol: raw.display_symbol,
    })
}
