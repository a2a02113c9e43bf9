//! Prometheus metrics for the HTTP layer and provider traffic

use prometheus::{
    Encoder, Gauge, Histogram, HistogramOpts, IntCounter, IntCounterVec, Opts, Registry,
    TextEncoder,
};

pub struct Metrics {
    registry: Registry,
    pub http_requests_total: IntCounter,
    pub http_request_duration_seconds: Histogram,
    pub http_requests_in_flight: Gauge,
    pub provider_requests_total: IntCounterVec,
    pub quote_failures_total: IntCounterVec,
}

impl Metrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let http_requests_total =
            IntCounter::new("http_requests_total", "Total number of HTTP requests")?;
        let http_request_duration_seconds = Histogram::with_opts(HistogramOpts::new(
            "http_request_duration_seconds",
            "HTTP request latency in seconds",
        ))?;
        let http_requests_in_flight = Gauge::new(
            "http_requests_in_flight",
            "Number of HTTP requests currently being served",
        )?;
        let provider_requests_total = IntCounterVec::new(
            Opts::new(
                "provider_requests_total",
                "Calls made to the market-data provider",
            ),
            &["operation", "outcome"],
        )?;
        let quote_failures_total = IntCounterVec::new(
            Opts::new(
                "quote_failures_total",
                "Quotes returned without a price, by failure kind",
            ),
            &["kind"],
        )?;

        registry.register(Box::new(http_requests_total.clone()))?;
        registry.register(Box::new(http_request_duration_seconds.clone()))?;
        registry.register(Box::new(http_requests_in_flight.clone()))?;
        registry.register(Box::new(provider_requests_total.clone()))?;
        registry.register(Box::new(quote_failures_total.clone()))?;

        Ok(Self {
            registry,
            http_requests_total,
            http_request_duration_seconds,
            http_requests_in_flight,
            provider_requests_total,
            quote_failures_total,
        })
    }

    pub fn record_provider_call(&self, operation: &str, ok: bool) {
        let outcome = if ok { "ok" } else { "error" };
        self.provider_requests_total
            .with_label_values(&[operation, outcome])
            .inc();
    }

    pub fn record_quote_failure(&self, kind: &str) {
        self.quote_failures_total.with_label_values(&[kind]).inc();
    }

    /// Render all registered metrics in the Prometheus text format.
    pub fn export(&self) -> Result<String, prometheus::Error> {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        encoder.encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}
