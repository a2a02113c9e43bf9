//! Test utilities for API server integration tests

use std::sync::Arc;

use axum_test::TestServer;
use market_mcp::config::Config;
use market_mcp::core::http::{create_router, AppState};
use market_mcp::metrics::Metrics;
use market_mcp::services::market::MarketService;
use market_mcp::services::market_data::MarketDataProvider;

use crate::stub_provider::{aapl_quote, msft_quote, raw_match, StubProvider};

/// Test helper for API server integration tests
#[allow(dead_code)]
pub struct TestApiServer {
    pub server: TestServer,
    pub metrics: Arc<Metrics>,
    pub provider: Option<Arc<StubProvider>>,
}

impl TestApiServer {
    /// Server backed by a stub that knows AAPL and MSFT.
    pub async fn new() -> Self {
        let stub = StubProvider::new()
            .with_quote("AAPL", aapl_quote())
            .with_quote("MSFT", msft_quote())
            .with_matches("Apple", vec![raw_match("AAPL", "APPLE INC")]);
        Self::with_provider(stub).await
    }

    pub async fn with_provider(stub: StubProvider) -> Self {
        let provider = Arc::new(stub);
        let dynamic: Arc<dyn MarketDataProvider> = provider.clone();
        let metrics = Arc::new(Metrics::new().expect("metrics initialization"));
        let market = MarketService::new(Some(dynamic), Some(metrics.clone()), 4);
        Self::build(market, metrics, Some(provider))
    }

    /// Server with no provider configured.
    pub async fn unavailable() -> Self {
        let metrics = Arc::new(Metrics::new().expect("metrics initialization"));
        Self::build(MarketService::unavailable(), metrics, None)
    }

    fn build(market: MarketService, metrics: Arc<Metrics>, provider: Option<Arc<StubProvider>>) -> Self {
        let state = AppState::new(&Config::default(), Arc::new(market), metrics.clone());
        let app = create_router(state);
        let server = TestServer::new(app).expect("start test server");

        Self {
            server,
            metrics,
            provider,
        }
    }
}
