use serde::Serialize;
use serde_json::{json, Value};
use tracing::info;

use super::to_json;
use crate::error::MarketError;

pub const RESOURCE_SCHEME: &str = "market://";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PopularStock {
    pub symbol: &'static str,
    pub name: &'static str,
    pub sector: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MarketIndex {
    pub symbol: &'static str,
    pub name: &'static str,
    pub description: &'static str,
}

pub struct ResourceDescriptor {
    pub uri: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub mime_type: &'static str,
}

pub static RESOURCES: &[ResourceDescriptor] = &[
    ResourceDescriptor {
        uri: "market://popular-stocks",
        name: "popular-stocks",
        description: "List of popular stock symbols.",
        mime_type: "application/json",
    },
    ResourceDescriptor {
        uri: "market://indices",
        name: "indices",
        description: "Major market indices symbols.",
        mime_type: "application/json",
    },
];

pub static POPULAR_STOCKS: [PopularStock; 10] = [
    PopularStock { symbol: "AAPL", name: "Apple Inc.", sector: "Technology" },
    PopularStock { symbol: "MSFT", name: "Microsoft Corporation", sector: "Technology" },
    PopularStock { symbol: "GOOGL", name: "Alphabet Inc.", sector: "Technology" },
    PopularStock { symbol: "AMZN", name: "Amazon.com Inc.", sector: "Consumer Cyclical" },
    PopularStock { symbol: "TSLA", name: "Tesla Inc.", sector: "Automotive" },
    PopularStock { symbol: "META", name: "Meta Platforms Inc.", sector: "Technology" },
    PopularStock { symbol: "NVDA", name: "NVIDIA Corporation", sector: "Technology" },
    PopularStock { symbol: "JPM", name: "JPMorgan Chase & Co.", sector: "Financial" },
    PopularStock { symbol: "V", name: "Visa Inc.", sector: "Financial" },
    PopularStock { symbol: "WMT", name: "Walmart Inc.", sector: "Consumer Defensive" },
];

pub static MARKET_INDICES: [MarketIndex; 4] = [
    MarketIndex { symbol: "^GSPC", name: "S&P 500", description: "US large-cap index" },
    MarketIndex {
        symbol: "^DJI",
        name: "Dow Jones Industrial Average",
        description: "US 30 major companies",
    },
    MarketIndex { symbol: "^IXIC", name: "NASDAQ Composite", description: "US tech-heavy index" },
    MarketIndex { symbol: "^RUT", name: "Russell 2000", description: "US small-cap index" },
];

pub fn list_resources() -> Vec<Value> {
    RESOURCES
        .iter()
        .map(|resource| {
            json!({
                "uri": resource.uri,
                "name": resource.name,
                "description": resource.description,
                "mimeType": resource.mime_type,
            })
        })
        .collect()
}

/// Read a resource by URI; the `market://` prefix is optional.
pub fn read_resource(uri: &str) -> Result<Value, MarketError> {
    let name = uri.strip_prefix(RESOURCE_SCHEME).unwrap_or(uri);
    let data = match name {
        "popular-stocks" => to_json(&POPULAR_STOCKS)?,
        "indices" => to_json(&MARKET_INDICES)?,
        _ => {
            return Err(MarketError::NotFound {
                kind: "Resource",
                name: uri.to_string(),
            })
        }
    };
    info!(resource = %name, "Read resource");
    Ok(data)
}
