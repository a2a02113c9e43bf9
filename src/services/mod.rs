//! Provider access and the quote/search logic built on top of it.

pub mod aggregator;
pub mod finnhub;
pub mod market;
pub mod market_data;
pub mod resolver;
pub mod search;
