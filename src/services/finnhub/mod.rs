//! Finnhub REST client

mod client;

pub use client::{FinnhubClient, PROVIDER_NAME};
