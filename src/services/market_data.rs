//! Market data provider interface.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ProviderError;

/// Quote payload as the provider returns it.
///
/// `c` is the current price; its absence means the provider has no usable
/// price for the symbol.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawQuote {
    pub c: Option<f64>,
    pub h: Option<f64>,
    pub l: Option<f64>,
    pub o: Option<f64>,
    pub pc: Option<f64>,
    pub t: Option<i64>,
}

/// One symbol-lookup entry as the provider returns it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawMatch {
    pub symbol: Option<String>,
    pub description: Option<String>,
    pub display_symbol: Option<String>,
    #[serde(rename = "type")]
    pub security_type: Option<String>,
}

#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Fetch the latest quote for an already-normalized symbol.
    async fn quote(&self, symbol: &str) -> Result<RawQuote, ProviderError>;

    /// Look up symbols matching a free-text query.
    async fn symbol_lookup(&self, query: &str) -> Result<Vec<RawMatch>, ProviderError>;
}
