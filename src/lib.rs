//! Market data gateway
//!
//! Quote lookup and company search over the Finnhub API, exposed both as a
//! tool/resource/prompt catalog and as plain REST routes.

pub mod config;
pub mod core;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod models;
pub mod services;

pub use config::Config;
pub use error::{MarketError, ProviderError};
pub use services::market::MarketService;
