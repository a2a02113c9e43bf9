use serde::Deserialize;
use serde_json::{json, Map, Value};
use tracing::{info, warn};

use super::{parse_arguments, validate_min_count};
use crate::error::MarketError;
use crate::models::Quote;
use crate::services::aggregator::Identifier;
use crate::services::market::MarketService;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptKind {
    AnalyzeStockPerformance,
    CompareStocks,
}

pub struct PromptArgument {
    pub name: &'static str,
    /// JSON-schema type name.
    pub type_name: &'static str,
    pub description: &'static str,
    pub required: bool,
}

pub struct PromptDescriptor {
    pub kind: PromptKind,
    pub name: &'static str,
    pub description: &'static str,
    pub arguments: &'static [PromptArgument],
}

pub static PROMPTS: &[PromptDescriptor] = &[
    PromptDescriptor {
        kind: PromptKind::AnalyzeStockPerformance,
        name: "analyze_stock_performance",
        description: "Generate analysis prompt for stock performance.",
        arguments: &[PromptArgument {
            name: "symbol",
            type_name: "string",
            description: "Stock symbol to analyze",
            required: true,
        }],
    },
    PromptDescriptor {
        kind: PromptKind::CompareStocks,
        name: "compare_stocks",
        description: "Generate comparison prompt for multiple stocks.",
        arguments: &[PromptArgument {
            name: "symbols",
            type_name: "array",
            description: "Stock symbols to compare (at least 2)",
            required: true,
        }],
    },
];

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct AnalyzeArgs {
    symbol: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct CompareArgs {
    symbols: Vec<String>,
}

pub fn list_prompts() -> Vec<Value> {
    PROMPTS
        .iter()
        .map(|prompt| {
            let parameters: Map<String, Value> = prompt
                .arguments
                .iter()
                .map(|arg| {
                    let schema = json!({
                        "type": arg.type_name,
                        "description": arg.description,
                        "required": arg.required,
                    });
                    (arg.name.to_string(), schema)
                })
                .collect();
            json!({
                "name": prompt.name,
                "description": prompt.description,
                "parameters": parameters,
            })
        })
        .collect()
}

/// Render the named prompt from live quotes.
pub async fn get_prompt(
    service: &MarketService,
    name: &str,
    arguments: Value,
) -> Result<String, MarketError> {
    let prompt = PROMPTS
        .iter()
        .find(|prompt| prompt.name == name)
        .ok_or_else(|| MarketError::NotFound {
            kind: "Prompt",
            name: name.to_string(),
        })?;
    info!(prompt = %prompt.name, "Rendering prompt");

    match prompt.kind {
        PromptKind::AnalyzeStockPerformance => {
            let args: AnalyzeArgs = parse_arguments(prompt.name, arguments)?;
            let quote = service.get_quote(&args.symbol).await?;
            Ok(render_analysis(&args.symbol, &quote))
        }
        PromptKind::CompareStocks => {
            let args: CompareArgs = parse_arguments(prompt.name, arguments)?;
            validate_min_count("symbols", &args.symbols, 2)?;
            let identifiers = args.symbols.into_iter().map(Identifier::Symbol).collect();
            let batch = service.get_many(identifiers).await?;
            Ok(render_comparison(&batch.items))
        }
    }
}

pub fn render_analysis(symbol: &str, quote: &Quote) -> String {
    if let Some(error) = &quote.error {
        warn!(symbol = %symbol, error = %error, "Quote unavailable for analysis prompt");
        return format!("Unable to analyze {}: {}", symbol, error);
    }

    format!(
        "Analyze the stock performance for {symbol}:

Current Price: ${price:.2}
Previous Close: ${previous_close:.2}
Change: ${change:.2} ({change_pct:+.2}%)
Day High: ${high:.2}
Day Low: ${low:.2}

Based on this data:
1. Is the stock trending up or down today?
2. What is the volatility range (high - low)?
3. Should an investor be concerned or optimistic?
4. What additional information would help make an investment decision?

Provide a brief analysis with key insights.",
        symbol = symbol,
        price = quote.price.unwrap_or_default(),
        previous_close = quote.previous_close.unwrap_or_default(),
        change = quote.change().unwrap_or_default(),
        change_pct = quote.change_percent().unwrap_or_default(),
        high = quote.high.unwrap_or_default(),
        low = quote.low.unwrap_or_default(),
    )
}

pub fn render_comparison(quotes: &[Quote]) -> String {
    let mut table = String::from("Symbol | Price | Change %\n-------|-------|----------\n");
    for quote in quotes {
        let price = quote
            .price
            .map(|p| format!("${:.2}", p))
            .unwrap_or_else(|| "N/A".to_string());
        let change_pct = quote.change_percent().unwrap_or_default();
        table.push_str(&format!("{} | {} | {:+.2}%\n", quote.symbol, price, change_pct));
    }

    format!(
        "Compare the following stocks:

{}

Analysis Questions:
1. Which stock has the best performance today?
2. Which stock is most volatile?
3. What are the key differences between these companies?
4. Which would you recommend for a long-term investment and why?

Provide a comparative analysis with recommendations.",
        table
    )
}
