//! Error types for provider access and request handling

use axum::http::StatusCode;
use chrono::{SecondsFormat, Utc};
use serde_json::{json, Value};
use thiserror::Error;

/// Failure talking to the upstream market-data provider.
///
/// Every variant is a transport-level failure from the caller's point of view;
/// the split only exists for logs and metrics.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ProviderError {
    #[error("request timed out")]
    Timeout,

    #[error("network error: {0}")]
    Network(String),

    #[error("invalid or missing API key")]
    Unauthorized,

    #[error("rate limited by provider")]
    RateLimited,

    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    #[error("failed to decode {what} response: {message}")]
    Decode { what: &'static str, message: String },
}

impl ProviderError {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Timeout => "timeout",
            Self::Network(_) => "network",
            Self::Unauthorized => "unauthorized",
            Self::RateLimited => "rate_limited",
            Self::Http { .. } => "http",
            Self::Decode { .. } => "decode",
        }
    }
}

impl From<reqwest::Error> for ProviderError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::Timeout
        } else if e.is_decode() {
            Self::Decode {
                what: "provider",
                message: e.to_string(),
            }
        } else {
            Self::Network(e.to_string())
        }
    }
}

/// Errors surfaced by the market service and the request layer.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum MarketError {
    #[error("either a symbol or a company name is required")]
    MissingIdentifier,

    #[error("Company '{query}' not found")]
    CompanyNotFound { query: String },

    #[error("Stock Symbol '{symbol}' has no price data available")]
    SymbolHasNoData { symbol: String },

    #[error("provider request failed: {source}")]
    ProviderTransport {
        #[source]
        source: ProviderError,
    },

    #[error("{service} service is unavailable")]
    ServiceUnavailable { service: String },

    #[error("Validation error: {field}: {message}")]
    Validation { field: String, message: String },

    #[error("Invalid arguments for {target}: {message}")]
    InvalidArguments { target: String, message: String },

    #[error("{kind} '{name}' not found")]
    NotFound { kind: &'static str, name: String },

    #[error("internal error: {message}")]
    Internal { message: String },
}

impl MarketError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::MissingIdentifier => "MISSING_IDENTIFIER",
            Self::CompanyNotFound { .. } => "COMPANY_NOT_FOUND",
            Self::SymbolHasNoData { .. } => "SYMBOL_HAS_NO_DATA",
            Self::ProviderTransport { .. } => "PROVIDER_TRANSPORT_FAILURE",
            Self::ServiceUnavailable { .. } => "SERVICE_UNAVAILABLE",
            Self::Validation { .. } => "VALIDATION_ERROR",
            Self::InvalidArguments { .. } => "INVALID_ARGUMENTS",
            Self::NotFound { .. } => "RESOURCE_NOT_FOUND",
            Self::Internal { .. } => "INTERNAL_ERROR",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::MissingIdentifier | Self::InvalidArguments { .. } => StatusCode::BAD_REQUEST,
            Self::Validation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            Self::CompanyNotFound { .. } | Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::SymbolHasNoData { .. } => StatusCode::NOT_FOUND,
            Self::ProviderTransport { .. } => StatusCode::BAD_GATEWAY,
            Self::ServiceUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
            Self::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn details(&self) -> Value {
        match self {
            Self::MissingIdentifier => json!({ "fields": ["symbol", "company_name"] }),
            Self::CompanyNotFound { query } => {
                json!({ "resource_type": "Company", "resource_id": query })
            }
            Self::SymbolHasNoData { symbol } => json!({
                "resource_type": "Stock Symbol",
                "resource_id": symbol,
                "reason": "No price data available",
            }),
            Self::ProviderTransport { source } => {
                json!({ "service": "finnhub", "kind": source.label() })
            }
            Self::ServiceUnavailable { service } => json!({ "service": service }),
            Self::Validation { field, .. } => json!({ "field": field }),
            Self::InvalidArguments { target, .. } => json!({ "target": target }),
            Self::NotFound { kind, name } => json!({ "resource_type": kind, "resource_id": name }),
            Self::Internal { .. } => json!({}),
        }
    }

    /// JSON error body: `{error, error_code, details, timestamp}`.
    pub fn to_body(&self) -> Value {
        json!({
            "error": self.to_string(),
            "error_code": self.code(),
            "details": self.details(),
            "timestamp": Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
        })
    }

    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn invalid_arguments(target: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidArguments {
            target: target.into(),
            message: message.into(),
        }
    }
}

impl From<ProviderError> for MarketError {
    fn from(source: ProviderError) -> Self {
        Self::ProviderTransport { source }
    }
}
