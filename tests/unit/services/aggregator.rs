//! Unit tests for single and batch quote retrieval

use std::sync::Arc;
use std::time::Duration;

use market_mcp::error::{MarketError, ProviderError};
use market_mcp::metrics::Metrics;
use market_mcp::models::QuoteFailure;
use market_mcp::services::aggregator::{priced_quote, Identifier, QuoteAggregator};
use market_mcp::services::market_data::RawQuote;
use market_mcp::services::resolver::SymbolResolver;
use market_mcp::services::search::CompanySearch;

use crate::stub_provider::{aapl_quote, msft_quote, raw_match, StubProvider};

fn aggregator_over(
    stub: StubProvider,
    metrics: Option<Arc<Metrics>>,
    concurrency: usize,
) -> (QuoteAggregator, Arc<StubProvider>) {
    let provider = Arc::new(stub);
    let search = CompanySearch::new(provider.clone(), metrics.clone());
    let resolver = SymbolResolver::new(search);
    let aggregator = QuoteAggregator::new(provider.clone(), resolver, metrics, concurrency);
    (aggregator, provider)
}

fn symbols(raw: &[&str]) -> Vec<Identifier> {
    raw.iter().map(|s| Identifier::Symbol(s.to_string())).collect()
}

#[tokio::test]
async fn quote_is_normalized_and_copied_verbatim() {
    let (aggregator, provider) =
        aggregator_over(StubProvider::new().with_quote("AAPL", aapl_quote()), None, 4);

    let quote = aggregator.get_quote("aapl ").await;
    assert_eq!(quote.symbol, "AAPL");
    assert_eq!(quote.price, Some(255.79));
    assert_eq!(quote.high, Some(262.23));
    assert_eq!(quote.low, Some(255.45));
    assert_eq!(quote.open, Some(262.02));
    assert_eq!(quote.previous_close, Some(261.73));
    assert_eq!(quote.timestamp, Some(1_771_016_400));
    assert!((quote.change().unwrap() + 5.94).abs() < 0.005);
    assert!((quote.change_percent().unwrap() + 2.27).abs() < 0.005);
    assert_eq!(provider.quoted(), ["AAPL"]);
}

#[tokio::test]
async fn missing_price_is_no_data_not_transport() {
    let (aggregator, _) = aggregator_over(StubProvider::new(), None, 4);

    assert_eq!(
        aggregator.fetch_quote("BAD1").await,
        Err(MarketError::SymbolHasNoData {
            symbol: "BAD1".to_string()
        })
    );

    let quote = aggregator.get_quote("BAD1").await;
    assert_eq!(quote.price, None);
    assert_eq!(quote.failure, Some(QuoteFailure::NoData));
    assert!(quote.error.is_some());
}

#[tokio::test]
async fn transport_failure_is_folded_into_the_quote() {
    let stub = StubProvider::new().with_quote_error("AAPL", ProviderError::RateLimited);
    let (aggregator, _) = aggregator_over(stub, None, 4);

    let quote = aggregator.get_quote("AAPL").await;
    assert_eq!(quote.price, None);
    assert_eq!(quote.failure, Some(QuoteFailure::Transport));
}

#[tokio::test]
async fn zero_price_is_passed_through() {
    let stub = StubProvider::new().with_quote(
        "ZERO",
        RawQuote {
            c: Some(0.0),
            ..RawQuote::default()
        },
    );
    let (aggregator, _) = aggregator_over(stub, None, 4);

    let quote = aggregator.get_quote("ZERO").await;
    assert_eq!(quote.price, Some(0.0));
    assert!(quote.is_success());
}

#[tokio::test]
async fn repeated_quotes_are_identical() {
    let (aggregator, _) =
        aggregator_over(StubProvider::new().with_quote("AAPL", aapl_quote()), None, 4);

    let first = aggregator.get_quote("AAPL").await;
    let second = aggregator.get_quote("AAPL").await;
    assert_eq!(first, second);
}

#[tokio::test]
async fn batch_keeps_failures_in_place() {
    let stub = StubProvider::new()
        .with_quote("AAPL", aapl_quote())
        .with_quote("MSFT", msft_quote());
    let (aggregator, _) = aggregator_over(stub, None, 4);

    let batch = aggregator.get_many(symbols(&["AAPL", "BAD1", "MSFT"])).await;
    assert_eq!(batch.count, 3);
    assert_eq!(batch.successful, 2);
    assert_eq!(batch.failed, 1);
    assert!(batch.items[0].price.is_some());
    assert!(batch.items[1].error.is_some());
    assert!(batch.items[2].price.is_some());
}

#[tokio::test]
async fn batch_preserves_input_order_under_concurrency() {
    let stub = StubProvider::new()
        .with_quote("AAPL", aapl_quote())
        .with_quote("MSFT", msft_quote())
        .with_delay("AAPL", Duration::from_millis(50));
    let (aggregator, provider) = aggregator_over(stub, None, 4);

    let batch = aggregator
        .get_many(symbols(&["AAPL", "msft", "GOOG", "AAPL"]))
        .await;
    let order: Vec<&str> = batch.items.iter().map(|q| q.symbol.as_str()).collect();
    assert_eq!(order, ["AAPL", "MSFT", "GOOG", "AAPL"]);
    assert_eq!(batch.successful + batch.failed, batch.count);
    assert_eq!(provider.quote_calls(), 4);
}

#[tokio::test]
async fn batch_resolves_company_names() {
    let stub = StubProvider::new()
        .with_quote("AAPL", aapl_quote())
        .with_matches("Apple", vec![raw_match("AAPL", "APPLE INC")]);
    let (aggregator, _) = aggregator_over(stub, None, 1);

    let batch = aggregator
        .get_many(vec![
            Identifier::CompanyName("Apple".to_string()),
            Identifier::CompanyName("Nowhere Corp".to_string()),
        ])
        .await;
    assert_eq!(batch.items[0].symbol, "AAPL");
    assert_eq!(batch.items[0].company_name.as_deref(), Some("APPLE INC"));
    assert_eq!(batch.items[1].symbol, "NOWHERE CORP");
    assert_eq!(batch.items[1].failure, Some(QuoteFailure::CompanyNotFound));
    assert_eq!(batch.failed, 1);
}

#[tokio::test]
async fn empty_batch_is_empty() {
    let (aggregator, provider) = aggregator_over(StubProvider::new(), None, 4);

    let batch = aggregator.get_many(Vec::new()).await;
    assert_eq!(batch.count, 0);
    assert_eq!(batch.successful, 0);
    assert_eq!(batch.failed, 0);
    assert_eq!(provider.quote_calls(), 0);
}

#[tokio::test]
async fn unknown_company_is_company_not_found() {
    let (aggregator, provider) = aggregator_over(StubProvider::new(), None, 4);

    let err = aggregator.get_quote_by_company_name("Apple").await.unwrap_err();
    assert_eq!(
        err,
        MarketError::CompanyNotFound {
            query: "Apple".to_string()
        }
    );
    assert_eq!(provider.quote_calls(), 0);
}

#[tokio::test]
async fn failures_are_counted_by_kind() {
    let metrics = Arc::new(Metrics::new().unwrap());
    let (aggregator, _) = aggregator_over(StubProvider::new(), Some(metrics.clone()), 4);

    aggregator.get_quote("BAD1").await;

    let exported = metrics.export().unwrap();
    assert!(exported.contains("quote_failures_total{kind=\"no_data\"} 1"));
    assert!(exported.contains("provider_requests_total{operation=\"quote\",outcome=\"ok\"} 1"));
}

#[test]
fn priced_quote_requires_current_price() {
    assert!(priced_quote("X".to_string(), RawQuote::default()).is_err());
    let quote = priced_quote("AAPL".to_string(), aapl_quote()).unwrap();
    assert_eq!(quote.price, Some(255.79));
}
