//! Tool, resource and prompt catalog exposed over `/mcp`.
//!
//! Every entry is declared in a static table; listing and dispatch both read
//! from the same table so the two can never drift apart.

mod prompts;
mod resources;
mod tools;

pub use prompts::{
    get_prompt, list_prompts, render_analysis, render_comparison, PromptArgument, PromptDescriptor,
    PromptKind, PROMPTS,
};
pub use resources::{
    list_resources, read_resource, MarketIndex, PopularStock, ResourceDescriptor, MARKET_INDICES,
    POPULAR_STOCKS, RESOURCES, RESOURCE_SCHEME,
};
pub use tools::{call_tool, list_tools, ToolDescriptor, ToolKind, TOOLS};

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::MarketError;

pub const SYMBOL_MAX_LEN: usize = 10;
pub const COMPANY_NAME_MIN_LEN: usize = 2;
pub const COMPANY_NAME_MAX_LEN: usize = 100;
pub const MAX_BATCH_SYMBOLS: usize = 20;

/// Decode call arguments into `T`. A missing or `null` payload reads as `{}`.
pub(crate) fn parse_arguments<T: DeserializeOwned>(target: &str, arguments: Value) -> Result<T, MarketError> {
    let arguments = match arguments {
        Value::Null => Value::Object(Map::new()),
        other => other,
    };
    serde_json::from_value(arguments).map_err(|e| MarketError::invalid_arguments(target, e.to_string()))
}

pub(crate) fn to_json<T: Serialize>(value: &T) -> Result<Value, MarketError> {
    serde_json::to_value(value).map_err(|e| MarketError::Internal {
        message: e.to_string(),
    })
}

fn check_len(field: &str, value: &str, min: usize, max: usize) -> Result<(), MarketError> {
    let len = value.chars().count();
    if (min..=max).contains(&len) {
        Ok(())
    } else {
        Err(MarketError::validation(
            field,
            format!("length must be between {} and {} characters, got {}", min, max, len),
        ))
    }
}

pub fn validate_symbol(field: &str, symbol: &str) -> Result<(), MarketError> {
    check_len(field, symbol, 1, SYMBOL_MAX_LEN)
}

pub fn validate_company_name(field: &str, company_name: &str) -> Result<(), MarketError> {
    check_len(field, company_name, COMPANY_NAME_MIN_LEN, COMPANY_NAME_MAX_LEN)
}

/// Item count within `min..=MAX_BATCH_SYMBOLS`.
pub fn validate_count<T>(field: &str, items: &[T], min: usize) -> Result<(), MarketError> {
    if (min..=MAX_BATCH_SYMBOLS).contains(&items.len()) {
        Ok(())
    } else {
        Err(MarketError::validation(
            field,
            format!(
                "must contain between {} and {} items, got {}",
                min,
                MAX_BATCH_SYMBOLS,
                items.len()
            ),
        ))
    }
}

/// At least `min` items, no upper bound.
pub fn validate_min_count<T>(field: &str, items: &[T], min: usize) -> Result<(), MarketError> {
    if items.len() >= min {
        Ok(())
    } else {
        Err(MarketError::validation(
            field,
            format!("must contain at least {} items, got {}", min, items.len()),
        ))
    }
}

pub fn validate_symbols(field: &str, symbols: &[String], min: usize) -> Result<(), MarketError> {
    validate_count(field, symbols, min)?;
    symbols.iter().try_for_each(|s| validate_symbol(field, s))
}
