//! Unit tests for the tool/resource/prompt catalog

use market_mcp::core::catalog::{
    call_tool, get_prompt, list_prompts, list_resources, list_tools, read_resource,
    render_analysis, PROMPTS, TOOLS,
};
use market_mcp::error::MarketError;
use market_mcp::models::Quote;
use serde_json::json;

use crate::stub_provider::{aapl_quote, msft_quote, raw_match, StubProvider};

fn stocked() -> StubProvider {
    StubProvider::new()
        .with_quote("AAPL", aapl_quote())
        .with_quote("MSFT", msft_quote())
        .with_matches("Apple", vec![raw_match("AAPL", "APPLE INC")])
}

#[test]
fn listings_cover_the_static_tables() {
    let tools = list_tools();
    assert_eq!(tools.len(), TOOLS.len());
    let names: Vec<&str> = tools.iter().filter_map(|t| t["name"].as_str()).collect();
    assert_eq!(
        names,
        [
            "get_stock_price",
            "get_stock_price_by_company",
            "get_multiple_stock_prices",
            "search_company"
        ]
    );
    assert_eq!(tools[2]["parameters"]["required"], json!(["symbols"]));

    let resources = list_resources();
    assert_eq!(resources[0]["uri"], "market://popular-stocks");
    assert_eq!(resources[1]["mimeType"], "application/json");

    let prompts = list_prompts();
    assert_eq!(prompts.len(), PROMPTS.len());
    assert_eq!(prompts[1]["parameters"]["symbols"]["type"], "array");
}

#[test]
fn resources_accept_bare_names() {
    let stocks = read_resource("market://popular-stocks").unwrap();
    assert_eq!(stocks.as_array().unwrap().len(), 10);
    assert_eq!(stocks[0]["symbol"], "AAPL");

    let indices = read_resource("indices").unwrap();
    assert_eq!(indices.as_array().unwrap().len(), 4);
    assert_eq!(indices[0]["symbol"], "^GSPC");

    let err = read_resource("market://crypto").unwrap_err();
    assert_eq!(err.code(), "RESOURCE_NOT_FOUND");
}

#[tokio::test]
async fn unknown_tool_is_not_found() {
    let (service, _) = stocked().into_service();

    let err = call_tool(&service, "get_weather", json!({})).await.unwrap_err();
    assert!(matches!(err, MarketError::NotFound { kind: "Tool", .. }));
}

#[tokio::test]
async fn get_stock_price_quotes_a_symbol() {
    let (service, _) = stocked().into_service();

    let result = call_tool(&service, "get_stock_price", json!({ "symbol": "aapl" }))
        .await
        .unwrap();
    assert_eq!(result["symbol"], "AAPL");
    assert_eq!(result["price"], 255.79);
}

#[tokio::test]
async fn get_stock_price_without_identifier_is_rejected() {
    let (service, _) = stocked().into_service();

    let err = call_tool(&service, "get_stock_price", json!(null)).await.unwrap_err();
    assert_eq!(err, MarketError::MissingIdentifier);
}

#[tokio::test]
async fn argument_shape_errors_are_invalid_arguments() {
    let (service, _) = stocked().into_service();

    let err = call_tool(&service, "get_stock_price_by_company", json!({}))
        .await
        .unwrap_err();
    assert_eq!(err.code(), "INVALID_ARGUMENTS");

    let err = call_tool(&service, "get_stock_price", json!({ "ticker": "AAPL" }))
        .await
        .unwrap_err();
    assert_eq!(err.code(), "INVALID_ARGUMENTS");

    let err = call_tool(&service, "get_multiple_stock_prices", json!({ "symbols": "AAPL" }))
        .await
        .unwrap_err();
    assert_eq!(err.code(), "INVALID_ARGUMENTS");
}

#[tokio::test]
async fn range_violations_are_validation_errors() {
    let (service, provider) = stocked().into_service();

    let err = call_tool(&service, "get_stock_price", json!({ "symbol": "ABCDEFGHIJK" }))
        .await
        .unwrap_err();
    assert_eq!(err.code(), "VALIDATION_ERROR");

    let err = call_tool(&service, "search_company", json!({ "company_name": "A" }))
        .await
        .unwrap_err();
    assert_eq!(err.code(), "VALIDATION_ERROR");

    let too_many: Vec<String> = (0..21).map(|i| format!("S{}", i)).collect();
    let err = call_tool(&service, "get_multiple_stock_prices", json!({ "symbols": too_many }))
        .await
        .unwrap_err();
    assert_eq!(err.code(), "VALIDATION_ERROR");

    let err = call_tool(&service, "get_multiple_stock_prices", json!({ "symbols": [] }))
        .await
        .unwrap_err();
    assert_eq!(err.code(), "VALIDATION_ERROR");

    assert_eq!(provider.quote_calls() + provider.lookup_calls(), 0);
}

#[tokio::test]
async fn multiple_prices_report_counts() {
    let (service, _) = stocked().into_service();

    let result = call_tool(
        &service,
        "get_multiple_stock_prices",
        json!({ "symbols": ["AAPL", "BAD1", "MSFT"] }),
    )
    .await
    .unwrap();
    assert_eq!(result["count"], 3);
    assert_eq!(result["successful"], 2);
    assert_eq!(result["failed"], 1);
    assert_eq!(result["stocks"][1]["error_code"], "NO_DATA");
}

#[tokio::test]
async fn search_company_wraps_matches() {
    let (service, _) = stocked().into_service();

    let result = call_tool(&service, "search_company", json!({ "company_name": "Apple" }))
        .await
        .unwrap();
    assert_eq!(result["query"], "Apple");
    assert_eq!(result["count"], 1);
    assert_eq!(result["results"][0]["symbol"], "AAPL");
    assert_eq!(result["results"][0]["type"], "Common Stock");
}

#[tokio::test]
async fn analysis_prompt_renders_live_values() {
    let (service, _) = stocked().into_service();

    let text = get_prompt(&service, "analyze_stock_performance", json!({ "symbol": "AAPL" }))
        .await
        .unwrap();
    assert!(text.contains("Current Price: $255.79"));
    assert!(text.contains("Previous Close: $261.73"));
    assert!(text.contains("Change: $-5.94 (-2.27%)"));
}

#[test]
fn analysis_of_failed_quote_says_so() {
    let quote = Quote::from_error(
        "BAD1",
        &MarketError::SymbolHasNoData {
            symbol: "BAD1".to_string(),
        },
    );
    let text = render_analysis("BAD1", &quote);
    assert!(text.starts_with("Unable to analyze BAD1:"));
}

#[tokio::test]
async fn compare_prompt_needs_two_symbols() {
    let (service, _) = stocked().into_service();

    let err = get_prompt(&service, "compare_stocks", json!({ "symbols": ["AAPL"] }))
        .await
        .unwrap_err();
    assert_eq!(err.code(), "VALIDATION_ERROR");

    let text = get_prompt(&service, "compare_stocks", json!({ "symbols": ["AAPL", "BAD1"] }))
        .await
        .unwrap();
    assert!(text.contains("AAPL | $255.79 | -2.27%"));
    assert!(text.contains("BAD1 | N/A | +0.00%"));
}

#[tokio::test]
async fn compare_prompt_has_no_upper_symbol_limit() {
    let (service, provider) = stocked().into_service();
    let mut symbols = vec!["AAPL".to_string(), "MSFT".to_string()];
    symbols.extend((1..=23).map(|i| format!("SYM{}", i)));

    let text = get_prompt(&service, "compare_stocks", json!({ "symbols": symbols }))
        .await
        .unwrap();
    assert!(text.contains("AAPL | $255.79 | -2.27%"));
    assert!(text.contains("SYM23 | N/A | +0.00%"));
    assert_eq!(provider.quote_calls(), 25);
}

#[tokio::test]
async fn analysis_prompt_accepts_long_symbols() {
    let (service, _) = stocked().into_service();

    let text = get_prompt(
        &service,
        "analyze_stock_performance",
        json!({ "symbol": "BERKSHIREHATHAWAY" }),
    )
    .await
    .unwrap();
    assert!(text.starts_with("Unable to analyze BERKSHIREHATHAWAY:"));
}

#[tokio::test]
async fn unknown_prompt_is_not_found() {
    let (service, _) = stocked().into_service();

    let err = get_prompt(&service, "summarize", json!({})).await.unwrap_err();
    assert!(matches!(err, MarketError::NotFound { kind: "Prompt", .. }));
}
