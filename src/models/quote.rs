//! Quote snapshots and batch aggregates

use serde::ser::{Serialize, SerializeStruct, Serializer};
use serde::Deserialize;

use crate::error::MarketError;

/// Only one currency is supported.
pub const CURRENCY: &str = "USD";
pub const SOURCE: &str = "finnhub";

/// Why a quote came back without a price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QuoteFailure {
    InvalidIdentifier,
    CompanyNotFound,
    NoData,
    Transport,
}

impl QuoteFailure {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::InvalidIdentifier => "invalid_identifier",
            Self::CompanyNotFound => "company_not_found",
            Self::NoData => "no_data",
            Self::Transport => "transport",
        }
    }

    pub fn from_error(error: &MarketError) -> Self {
        match error {
            MarketError::MissingIdentifier | MarketError::Validation { .. } => {
                Self::InvalidIdentifier
            }
            MarketError::CompanyNotFound { .. } => Self::CompanyNotFound,
            MarketError::SymbolHasNoData { .. } => Self::NoData,
            _ => Self::Transport,
        }
    }
}

/// One point-in-time price snapshot for one ticker.
///
/// `change`, `change_percent` and `day_range` are derived on demand and
/// included when serialized.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Quote {
    pub symbol: String,
    pub price: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub open: Option<f64>,
    pub previous_close: Option<f64>,
    /// Seconds since epoch as reported by the provider.
    pub timestamp: Option<i64>,
    /// Set only when the symbol was resolved from a company name.
    pub company_name: Option<String>,
    pub error: Option<String>,
    pub failure: Option<QuoteFailure>,
}

impl Quote {
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            ..Self::default()
        }
    }

    /// Failure-shaped quote: no price, error text and failure kind set.
    pub fn from_error(symbol: impl Into<String>, error: &MarketError) -> Self {
        Self {
            symbol: symbol.into(),
            error: Some(error.to_string()),
            failure: Some(QuoteFailure::from_error(error)),
            ..Self::default()
        }
    }

    pub fn with_company_name(mut self, company_name: Option<String>) -> Self {
        self.company_name = company_name;
        self
    }

    pub fn is_success(&self) -> bool {
        self.price.is_some()
    }

    pub fn change(&self) -> Option<f64> {
        Some(self.price? - self.previous_close?)
    }

    pub fn change_percent(&self) -> Option<f64> {
        let previous_close = self.previous_close?;
        if previous_close == 0.0 {
            return None;
        }
        Some(self.change()? / previous_close * 100.0)
    }

    /// Intraday high-low spread.
    pub fn day_range(&self) -> Option<f64> {
        Some(self.high? - self.low?)
    }
}

impl Serialize for Quote {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("Quote", 15)?;
        s.serialize_field("symbol", &self.symbol)?;
        s.serialize_field("price", &self.price)?;
        s.serialize_field("currency", CURRENCY)?;
        s.serialize_field("timestamp", &self.timestamp)?;
        s.serialize_field("company_name", &self.company_name)?;
        s.serialize_field("high", &self.high)?;
        s.serialize_field("low", &self.low)?;
        s.serialize_field("open", &self.open)?;
        s.serialize_field("previous_close", &self.previous_close)?;
        s.serialize_field("change", &self.change())?;
        s.serialize_field("change_percent", &self.change_percent())?;
        s.serialize_field("day_range", &self.day_range())?;
        s.serialize_field("source", SOURCE)?;
        s.serialize_field("error", &self.error)?;
        s.serialize_field("error_code", &self.failure)?;
        s.end()
    }
}

/// Ordered per-identifier outcomes with success accounting.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct BatchResult {
    #[serde(rename = "stocks")]
    pub items: Vec<Quote>,
    pub source: &'static str,
    pub count: usize,
    pub successful: usize,
    pub failed: usize,
}

impl BatchResult {
    /// Counts are derived from the items: a quote succeeded iff it has a price.
    pub fn from_items(items: Vec<Quote>) -> Self {
        let count = items.len();
        let successful = items.iter().filter(|q| q.is_success()).count();
        Self {
            items,
            source: SOURCE,
            count,
            successful,
            failed: count - successful,
        }
    }
}

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
#[serde(untagged)]
pub enum QuoteResponse {
    Single(Quote),
    Batch(BatchResult),
}

impl QuoteResponse {
    pub fn as_single(&self) -> Option<&Quote> {
        match self {
            Self::Single(quote) => Some(quote),
            Self::Batch(_) => None,
        }
    }

    pub fn as_batch(&self) -> Option<&BatchResult> {
        match self {
            Self::Batch(batch) => Some(batch),
            Self::Single(_) => None,
        }
    }
}
