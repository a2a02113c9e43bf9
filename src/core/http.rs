//! HTTP endpoint server using Axum

use std::convert::Infallible;
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use axum::{
    body::Body,
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, Request, State,
    },
    http::HeaderName,
    middleware::Next,
    response::{
        sse::{Event, Sse},
        IntoResponse, Json, Response,
    },
    routing::{get, post},
    Router,
};
use chrono::{SecondsFormat, Utc};
use futures_util::stream::{self, Stream};
use serde::Deserialize;
use serde_json::{json, Value};
use tower::ServiceBuilder;
use tower_http::{
    cors::CorsLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::{error, info, warn, Level};

use crate::config::Config;
use crate::core::catalog::{self, validate_company_name, validate_count, validate_symbol};
use crate::error::MarketError;
use crate::metrics::Metrics;
use crate::models::{CompanySearchResponse, HealthState};
use crate::services::market::{MarketService, QuoteQuery};

const REQUEST_ID_HEADER: &str = "x-request-id";

#[derive(Clone)]
pub struct AppState {
    pub market: Arc<MarketService>,
    pub metrics: Arc<Metrics>,
    pub start_time: Arc<Instant>,
    pub app_name: Arc<str>,
    pub app_version: Arc<str>,
}

impl AppState {
    pub fn new(config: &Config, market: Arc<MarketService>, metrics: Arc<Metrics>) -> Self {
        Self {
            market,
            metrics,
            start_time: Arc::new(Instant::now()),
            app_name: Arc::from(config.app_name.as_str()),
            app_version: Arc::from(config.app_version.as_str()),
        }
    }
}

impl IntoResponse for MarketError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error_code = self.code(), error = %self, "Request failed");
        } else {
            warn!(error_code = self.code(), error = %self, "Request rejected");
        }
        (status, Json(self.to_body())).into_response()
    }
}

async fn root(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "name": &*state.app_name,
        "version": &*state.app_version,
        "description": "HTTP REST API for stock market data",
        "endpoints": {
            "tools": "/mcp/tools",
            "resources": "/mcp/resources",
            "prompts": "/mcp/prompts",
            "quote": "/api/quote",
            "quotes": "/api/quotes",
            "search": "/api/search",
            "health": "/health",
            "metrics": "/metrics",
        },
    }))
}

/// Always 200; a failing provider only degrades the overall status.
pub async fn health_check(State(state): State<AppState>) -> Json<Value> {
    let finnhub = state.market.health_check().await;
    let status = if finnhub.is_healthy() {
        HealthState::Healthy
    } else {
        HealthState::Degraded
    };

    Json(json!({
        "status": status,
        "version": &*state.app_version,
        "uptime_seconds": state.start_time.elapsed().as_secs(),
        "timestamp": Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
        "services": { "finnhub": finnhub },
    }))
}

pub async fn metrics_handler(State(state): State<AppState>) -> Result<String, MarketError> {
    state.metrics.export().map_err(|e| MarketError::Internal {
        message: e.to_string(),
    })
}

/// Middleware to track HTTP request metrics
async fn metrics_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let start = Instant::now();
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    state.metrics.http_requests_in_flight.inc();
    let response = next.run(request).await;
    let status = response.status();
    let duration = start.elapsed();
    state.metrics.http_requests_in_flight.dec();

    state.metrics.http_requests_total.inc();
    state
        .metrics
        .http_request_duration_seconds
        .observe(duration.as_secs_f64());

    if status.is_server_error() {
        error!(
            method = %method,
            path = %path,
            status = %status,
            duration_ms = duration.as_millis(),
            "HTTP request error"
        );
    }

    response
}

#[derive(Debug, Deserialize)]
struct ToolCallRequest {
    tool: String,
    #[serde(default)]
    arguments: Value,
}

#[derive(Debug, Deserialize)]
struct PromptGetRequest {
    prompt: String,
    #[serde(default)]
    arguments: Value,
}

impl From<JsonRejection> for MarketError {
    fn from(rejection: JsonRejection) -> Self {
        MarketError::validation("body", rejection.body_text())
    }
}

impl From<QueryRejection> for MarketError {
    fn from(rejection: QueryRejection) -> Self {
        MarketError::validation("query", rejection.body_text())
    }
}

/// Trimmed catalog name; blank names are a validation failure.
fn required_name(field: &str, name: &str) -> Result<String, MarketError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(MarketError::validation(field, format!("{} name cannot be empty", field)));
    }
    Ok(name.to_string())
}

async fn list_tools() -> Json<Value> {
    let tools = catalog::list_tools();
    info!(count = tools.len(), "Listing tools");
    Json(json!({ "tools": tools }))
}

async fn call_tool(
    State(state): State<AppState>,
    payload: Result<Json<ToolCallRequest>, JsonRejection>,
) -> Result<Json<Value>, MarketError> {
    let Json(request) = payload?;
    let tool = required_name("tool", &request.tool)?;
    let result = catalog::call_tool(&state.market, &tool, request.arguments).await?;
    Ok(Json(json!({ "result": result })))
}

/// Runs the tool to completion, then replays `start`, `result`|`error`, `done`.
async fn call_tool_stream(
    State(state): State<AppState>,
    payload: Result<Json<ToolCallRequest>, JsonRejection>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, MarketError> {
    let Json(request) = payload?;
    let tool = required_name("tool", &request.tool)?;
    let outcome = catalog::call_tool(&state.market, &tool, request.arguments).await;

    let marker = json!({ "tool": tool }).to_string();
    let middle = match outcome {
        Ok(result) => Event::default()
            .event("result")
            .data(json!({ "result": result }).to_string()),
        Err(e) => {
            warn!(tool = %tool, error = %e, "Streamed tool call failed");
            Event::default().event("error").data(e.to_body().to_string())
        }
    };

    let events: Vec<Result<Event, Infallible>> = vec![
        Ok(Event::default().event("start").data(marker.clone())),
        Ok(middle),
        Ok(Event::default().event("done").data(marker)),
    ];
    Ok(Sse::new(stream::iter(events)))
}

async fn list_resources() -> Json<Value> {
    let resources = catalog::list_resources();
    info!(count = resources.len(), "Listing resources");
    Json(json!({ "resources": resources }))
}

async fn get_resource(Path(uri): Path<String>) -> Result<Json<Value>, MarketError> {
    let data = catalog::read_resource(&uri)?;
    Ok(Json(json!({ "data": data })))
}

async fn list_prompts() -> Json<Value> {
    let prompts = catalog::list_prompts();
    info!(count = prompts.len(), "Listing prompts");
    Json(json!({ "prompts": prompts }))
}

async fn get_prompt(
    State(state): State<AppState>,
    payload: Result<Json<PromptGetRequest>, JsonRejection>,
) -> Result<Json<Value>, MarketError> {
    let Json(request) = payload?;
    let prompt = required_name("prompt", &request.prompt)?;
    let text = catalog::get_prompt(&state.market, &prompt, request.arguments).await?;
    Ok(Json(json!({ "prompt": text })))
}

#[derive(Debug, Deserialize)]
struct QuoteParams {
    symbol: Option<String>,
    company_name: Option<String>,
}

async fn get_quote(
    State(state): State<AppState>,
    params: Result<Query<QuoteParams>, QueryRejection>,
) -> Result<Json<Value>, MarketError> {
    let Query(params) = params?;
    if let Some(symbol) = &params.symbol {
        validate_symbol("symbol", symbol)?;
    }
    if let Some(company_name) = &params.company_name {
        validate_company_name("company_name", company_name)?;
    }

    let query = QuoteQuery {
        symbol: params.symbol,
        company_name: params.company_name,
        ..QuoteQuery::default()
    };
    let response = state.market.resolve_and_quote(&query).await?;
    Ok(Json(catalog::to_json(&response)?))
}

#[derive(Debug, Deserialize)]
struct QuotesParams {
    symbols: Option<String>,
    company_names: Option<String>,
}

/// Split a comma-separated query value, dropping blank entries.
fn split_list(raw: Option<&str>) -> Vec<String> {
    raw.map(|raw| {
        raw.split(',')
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .map(str::to_string)
            .collect()
    })
    .unwrap_or_default()
}

async fn get_quotes(
    State(state): State<AppState>,
    params: Result<Query<QuotesParams>, QueryRejection>,
) -> Result<Json<Value>, MarketError> {
    let Query(params) = params?;
    let symbols = split_list(params.symbols.as_deref());
    let company_names = split_list(params.company_names.as_deref());

    validate_count("symbols", &symbols, 0)?;
    validate_count("company_names", &company_names, 0)?;
    symbols.iter().try_for_each(|s| validate_symbol("symbols", s))?;
    company_names
        .iter()
        .try_for_each(|name| validate_company_name("company_names", name))?;

    let query = QuoteQuery {
        symbols,
        company_names,
        ..QuoteQuery::default()
    };
    let response = state.market.resolve_and_quote(&query).await?;
    Ok(Json(catalog::to_json(&response)?))
}

#[derive(Debug, Deserialize)]
struct SearchParams {
    q: String,
}

async fn search(
    State(state): State<AppState>,
    params: Result<Query<SearchParams>, QueryRejection>,
) -> Result<Json<CompanySearchResponse>, MarketError> {
    let Query(params) = params?;
    validate_company_name("q", &params.q)?;
    let results = state.market.search_companies(&params.q).await?;
    Ok(Json(CompanySearchResponse::new(params.q, results)))
}

pub fn create_router(state: AppState) -> Router {
    let request_id = HeaderName::from_static(REQUEST_ID_HEADER);

    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .route("/metrics", get(metrics_handler))
        .route("/mcp/tools", get(list_tools))
        .route("/mcp/tools/call", post(call_tool))
        .route("/mcp/tools/call/stream", post(call_tool_stream))
        .route("/mcp/resources", get(list_resources))
        .route("/mcp/resources/{*uri}", get(get_resource))
        .route("/mcp/prompts", get(list_prompts))
        .route("/mcp/prompts/get", post(get_prompt))
        .route("/api/quote", get(get_quote))
        .route("/api/quotes", get(get_quotes))
        .route("/api/search", get(search))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(request_id.clone(), MakeRequestUuid))
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(|request: &Request<Body>| {
                            let request_id = request
                                .headers()
                                .get(REQUEST_ID_HEADER)
                                .and_then(|v| v.to_str().ok())
                                .unwrap_or("-");
                            tracing::debug_span!(
                                "http_request",
                                method = %request.method(),
                                uri = %request.uri(),
                                request_id = %request_id,
                            )
                        })
                        .on_request(DefaultOnRequest::new().level(Level::DEBUG))
                        .on_response(DefaultOnResponse::new().level(Level::DEBUG)),
                )
                .layer(PropagateRequestIdLayer::new(request_id))
                .layer(axum::middleware::from_fn_with_state(
                    state.clone(),
                    metrics_middleware,
                ))
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

/// Build the service from `config` and serve until `shutdown` resolves.
pub async fn start_server<F>(config: &Config, shutdown: F) -> Result<(), Box<dyn std::error::Error>>
where
    F: Future<Output = ()> + Send + 'static,
{
    let metrics = Arc::new(Metrics::new()?);
    let market = MarketService::from_config(config, Some(metrics.clone()))?;
    if !market.is_available() {
        warn!("FINNHUB_API_KEY is not set - quote and search endpoints will report the service as unavailable");
    }

    let state = AppState::new(config, Arc::new(market), metrics);
    let app = create_router(state);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.port)).await?;

    info!(port = config.port, "HTTP server listening on port {}", config.port);
    info!(
        "Metrics endpoint available at http://0.0.0.0:{}/metrics",
        config.port
    );
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    Ok(())
}
