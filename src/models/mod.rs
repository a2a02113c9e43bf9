//! Request-scoped data shapes returned by the market service.

pub mod company;
pub mod health;
pub mod quote;

pub use company::{CompanyMatch, CompanySearchResponse};
pub use health::{HealthState, ProviderHealth};
pub use quote::{BatchResult, Quote, QuoteFailure, QuoteResponse, CURRENCY, SOURCE};
