use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

use super::{
    parse_arguments, to_json, validate_company_name, validate_count, validate_symbol,
    validate_symbols, COMPANY_NAME_MAX_LEN, COMPANY_NAME_MIN_LEN, MAX_BATCH_SYMBOLS,
    SYMBOL_MAX_LEN,
};
use crate::error::MarketError;
use crate::models::CompanySearchResponse;
use crate::services::aggregator::Identifier;
use crate::services::market::{MarketService, QuoteQuery};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolKind {
    GetStockPrice,
    GetStockPriceByCompany,
    GetMultipleStockPrices,
    SearchCompany,
}

pub struct ToolDescriptor {
    pub kind: ToolKind,
    pub name: &'static str,
    pub description: &'static str,
    pub parameters: fn() -> Value,
}

pub static TOOLS: &[ToolDescriptor] = &[
    ToolDescriptor {
        kind: ToolKind::GetStockPrice,
        name: "get_stock_price",
        description: "Get the current price for a stock by symbol or company name, \
                      or for several at once via `symbols` / `company_names`.",
        parameters: get_stock_price_schema,
    },
    ToolDescriptor {
        kind: ToolKind::GetStockPriceByCompany,
        name: "get_stock_price_by_company",
        description: "Get the current stock price for a company by name.",
        parameters: company_name_schema,
    },
    ToolDescriptor {
        kind: ToolKind::GetMultipleStockPrices,
        name: "get_multiple_stock_prices",
        description: "Get current prices for several stock symbols in one call.",
        parameters: symbols_schema,
    },
    ToolDescriptor {
        kind: ToolKind::SearchCompany,
        name: "search_company",
        description: "Search for companies by name and return matching symbols.",
        parameters: company_name_schema,
    },
];

fn symbol_property() -> Value {
    json!({
        "type": "string",
        "description": "Stock ticker symbol (e.g. AAPL)",
        "minLength": 1,
        "maxLength": SYMBOL_MAX_LEN,
    })
}

fn company_name_property() -> Value {
    json!({
        "type": "string",
        "description": "Company name (e.g. Apple)",
        "minLength": COMPANY_NAME_MIN_LEN,
        "maxLength": COMPANY_NAME_MAX_LEN,
    })
}

fn get_stock_price_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "symbol": symbol_property(),
            "company_name": company_name_property(),
            "symbols": { "type": "array", "items": symbol_property(), "maxItems": MAX_BATCH_SYMBOLS },
            "company_names": {
                "type": "array",
                "items": company_name_property(),
                "maxItems": MAX_BATCH_SYMBOLS,
            },
        },
    })
}

fn company_name_schema() -> Value {
    json!({
        "type": "object",
        "properties": { "company_name": company_name_property() },
        "required": ["company_name"],
    })
}

fn symbols_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "symbols": {
                "type": "array",
                "items": symbol_property(),
                "minItems": 1,
                "maxItems": MAX_BATCH_SYMBOLS,
            },
        },
        "required": ["symbols"],
    })
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct StockPriceArgs {
    #[serde(default)]
    symbol: Option<String>,
    #[serde(default)]
    company_name: Option<String>,
    #[serde(default)]
    symbols: Option<Vec<String>>,
    #[serde(default)]
    company_names: Option<Vec<String>>,
}

impl StockPriceArgs {
    fn validate(&self) -> Result<(), MarketError> {
        if let Some(symbol) = &self.symbol {
            validate_symbol("symbol", symbol)?;
        }
        if let Some(company_name) = &self.company_name {
            validate_company_name("company_name", company_name)?;
        }
        if let Some(symbols) = &self.symbols {
            validate_symbols("symbols", symbols, 0)?;
        }
        if let Some(company_names) = &self.company_names {
            validate_count("company_names", company_names, 0)?;
            for name in company_names {
                validate_company_name("company_names", name)?;
            }
        }
        Ok(())
    }

    fn into_query(self) -> QuoteQuery {
        QuoteQuery {
            symbol: self.symbol,
            company_name: self.company_name,
            symbols: self.symbols.unwrap_or_default(),
            company_names: self.company_names.unwrap_or_default(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct CompanyNameArgs {
    company_name: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SymbolsArgs {
    symbols: Vec<String>,
}

pub fn list_tools() -> Vec<Value> {
    TOOLS
        .iter()
        .map(|tool| {
            json!({
                "name": tool.name,
                "description": tool.description,
                "parameters": (tool.parameters)(),
            })
        })
        .collect()
}

fn find_tool(name: &str) -> Result<&'static ToolDescriptor, MarketError> {
    TOOLS
        .iter()
        .find(|tool| tool.name == name)
        .ok_or_else(|| MarketError::NotFound {
            kind: "Tool",
            name: name.to_string(),
        })
}

/// Validate `arguments` against the named tool and run it.
pub async fn call_tool(
    service: &MarketService,
    name: &str,
    arguments: Value,
) -> Result<Value, MarketError> {
    let tool = find_tool(name)?;
    info!(tool = %tool.name, "Executing tool");

    match tool.kind {
        ToolKind::GetStockPrice => {
            let args: StockPriceArgs = parse_arguments(tool.name, arguments)?;
            args.validate()?;
            let response = service.resolve_and_quote(&args.into_query()).await?;
            to_json(&response)
        }
        ToolKind::GetStockPriceByCompany => {
            let args: CompanyNameArgs = parse_arguments(tool.name, arguments)?;
            validate_company_name("company_name", &args.company_name)?;
            let response = service
                .resolve_and_quote(&QuoteQuery::company_name(args.company_name))
                .await?;
            to_json(&response)
        }
        ToolKind::GetMultipleStockPrices => {
            let args: SymbolsArgs = parse_arguments(tool.name, arguments)?;
            validate_symbols("symbols", &args.symbols, 1)?;
            let identifiers = args.symbols.into_iter().map(Identifier::Symbol).collect();
            to_json(&service.get_many(identifiers).await?)
        }
        ToolKind::SearchCompany => {
            let args: CompanyNameArgs = parse_arguments(tool.name, arguments)?;
            validate_company_name("company_name", &args.company_name)?;
            let results = service.search_companies(&args.company_name).await?;
            to_json(&CompanySearchResponse::new(args.company_name, results))
        }
    }
}
