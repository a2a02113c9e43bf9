//! Turns a symbol or a company name into a canonical ticker.

use tracing::debug;

use crate::error::MarketError;
use crate::services::search::CompanySearch;

/// Canonical ticker plus the company description it was resolved from, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedSymbol {
    pub symbol: String,
    pub company_name: Option<String>,
}

/// Trim and upper-case a ticker. `None` for blank input.
pub fn normalize_symbol(raw: &str) -> Option<String> {
    let symbol = raw.trim().to_uppercase();
    (!symbol.is_empty()).then_some(symbol)
}

#[derive(Clone)]
pub struct SymbolResolver {
    search: CompanySearch,
}

impl SymbolResolver {
    pub fn new(search: CompanySearch) -> Self {
        Self { search }
    }

    /// Resolve from a symbol (no provider call) or else a company name (one search).
    ///
    /// The first search match wins; there is no ranking beyond provider order.
    pub async fn resolve(
        &self,
        symbol: Option<&str>,
        company_name: Option<&str>,
    ) -> Result<ResolvedSymbol, MarketError> {
        if let Some(symbol) = symbol.and_then(normalize_symbol) {
            return Ok(ResolvedSymbol {
                symbol,
                company_name: None,
            });
        }

        match company_name.filter(|name| !name.trim().is_empty()) {
            Some(name) => self.resolve_company(name).await,
            None => Err(MarketError::MissingIdentifier),
        }
    }

    pub async fn resolve_company(&self, company_name: &str) -> Result<ResolvedSymbol, MarketError> {
        let best = self
            .search
            .search(company_name)
            .await
            .into_iter()
            .next()
            .ok_or_else(|| MarketError::CompanyNotFound {
                query: company_name.to_string(),
            })?;

        debug!(
            company_name = %company_name,
            symbol = %best.symbol,
            "Resolved company name to symbol"
        );

        Ok(ResolvedSymbol {
            symbol: best.symbol,
            company_name: best.description,
        })
    }
}
