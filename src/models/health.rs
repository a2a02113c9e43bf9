use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthState {
    Healthy,
    Degraded,
    Unhealthy,
}

/// Result of probing the upstream provider.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProviderHealth {
    pub name: &'static str,
    pub status: HealthState,
    pub message: String,
    pub response_time_ms: Option<f64>,
}

impl ProviderHealth {
    pub fn is_healthy(&self) -> bool {
        self.status == HealthState::Healthy
    }
}
