use serde::ser::{ SerializeMap, Serializer };
use serde::Serialize;

use crate::llm::LlmType;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceStatus {
    Healthy,
    Degraded,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UpstreamState {
    Connected,
    Unreachable,
    Unconfigured,
}

#[derive(Clone, Debug, Serialize)]
pub struct UpstreamHealth {
    pub status: UpstreamState,
    pub model: String,
}

/// Composite health report. The upstream block is keyed by provider name,
/// e.g. `{"status": "healthy", "openrouter": {"status": "connected", ...}}`.
#[derive(Clone, Debug)]
pub struct HealthStatus {
    pub status: ServiceStatus,
    pub provider: LlmType,
    pub upstream: UpstreamHealth,
    pub message: Option<String>,
}

impl HealthStatus {
    pub fn is_healthy(&self) -> bool {
        self.status == ServiceStatus::Healthy
    }
}

impl Serialize for HealthStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let len = if self.message.is_some() { 3 } else { 2 };
        let mut map = serializer.serialize_map(Some(len))?;
        map.serialize_entry("status", &self.status)?;
        map.serialize_entry(self.provider.as_str(), &self.upstream)?;
        if let Some(message) = &self.message {
            map.serialize_entry("message", message)?;
        }
        map.end()
    }
}
