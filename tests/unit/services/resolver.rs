//! Unit tests for symbol resolution

use std::sync::Arc;

use market_mcp::error::MarketError;
use market_mcp::services::resolver::{normalize_symbol, SymbolResolver};
use market_mcp::services::search::CompanySearch;

use crate::stub_provider::{raw_match, StubProvider};

fn resolver_over(stub: StubProvider) -> (SymbolResolver, Arc<StubProvider>) {
    let provider = Arc::new(stub);
    let search = CompanySearch::new(provider.clone(), None);
    (SymbolResolver::new(search), provider)
}

#[test]
fn normalize_trims_and_uppercases() {
    assert_eq!(normalize_symbol(" aapl ").as_deref(), Some("AAPL"));
    assert_eq!(normalize_symbol("MsFt").as_deref(), Some("MSFT"));
    assert_eq!(normalize_symbol(" \t "), None);
}

#[tokio::test]
async fn symbol_wins_without_a_search() {
    let (resolver, provider) = resolver_over(StubProvider::new());

    let resolved = resolver.resolve(Some(" aapl"), Some("Microsoft")).await.unwrap();
    assert_eq!(resolved.symbol, "AAPL");
    assert_eq!(resolved.company_name, None);
    assert_eq!(provider.lookup_calls(), 0);
}

#[tokio::test]
async fn company_name_takes_first_match() {
    let stub = StubProvider::new().with_matches(
        "Apple",
        vec![raw_match("AAPL", "APPLE INC"), raw_match("APLE", "APPLE HOSPITALITY")],
    );
    let (resolver, provider) = resolver_over(stub);

    let resolved = resolver.resolve(None, Some("Apple")).await.unwrap();
    assert_eq!(resolved.symbol, "AAPL");
    assert_eq!(resolved.company_name.as_deref(), Some("APPLE INC"));
    assert_eq!(provider.lookup_calls(), 1);
}

#[tokio::test]
async fn blank_symbol_falls_through_to_company_name() {
    let stub = StubProvider::new().with_matches("Tesla", vec![raw_match("TSLA", "TESLA INC")]);
    let (resolver, _) = resolver_over(stub);

    let resolved = resolver.resolve(Some("  "), Some("Tesla")).await.unwrap();
    assert_eq!(resolved.symbol, "TSLA");
}

#[tokio::test]
async fn nothing_to_resolve_is_missing_identifier() {
    let (resolver, provider) = resolver_over(StubProvider::new());

    assert_eq!(
        resolver.resolve(None, None).await,
        Err(MarketError::MissingIdentifier)
    );
    assert_eq!(
        resolver.resolve(Some(""), Some("  ")).await,
        Err(MarketError::MissingIdentifier)
    );
    assert_eq!(provider.lookup_calls(), 0);
}

#[tokio::test]
async fn unknown_company_carries_the_query() {
    let (resolver, _) = resolver_over(StubProvider::new());

    let err = resolver.resolve(None, Some("Apple")).await.unwrap_err();
    assert_eq!(
        err,
        MarketError::CompanyNotFound {
            query: "Apple".to_string()
        }
    );
}
