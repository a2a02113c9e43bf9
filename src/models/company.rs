use serde::{Deserialize, Serialize};

/// One candidate from a company-name search, in provider order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyMatch {
    pub symbol: String,
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub security_type: Option<String>,
    pub display_symbol: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompanySearchResponse {
    pub results: Vec<CompanyMatch>,
    pub query: String,
    pub count: usize,
}

impl CompanySearchResponse {
    pub fn new(query: impl Into<String>, results: Vec<CompanyMatch>) -> Self {
        Self {
            count: results.len(),
            results,
            query: query.into(),
        }
    }
}
