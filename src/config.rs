use crate::error::ConfigError;
use crate::render::{Layout, MonospaceMetrics, WidthPolicy};
use serde::{Deserialize, Serialize};
use std::fs;
use std::sync::Arc;
use std::time::Duration;

/// Endpoints, timeouts and layout bounds. Every field has a default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormConfig {
    pub base_url: String,
    pub template_endpoint: String,
    pub submit_endpoint: String,
    pub request_timeout_secs: u64,
    pub panel_width: f32,
    pub width_cap: f32,
    pub char_width: f32,
}

impl Default for FormConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            template_endpoint: "/api/template".to_string(),
            submit_endpoint: "/api/form".to_string(),
            request_timeout_secs: 30,
            panel_width: 800.0,
            width_cap: 400.0,
            char_width: 8.0,
        }
    }
}

impl FormConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_string(),
            source,
        })?;
        Self::from_json(&content).map_err(|source| ConfigError::Json {
            path: path.to_string(),
            source,
        })
    }

    pub fn from_json(content: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(content)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Monospace metrics with the configured panel bounds.
    pub fn layout(&self) -> Layout {
        Layout::new(
            Arc::new(MonospaceMetrics {
                char_width: self.char_width,
            }),
            WidthPolicy {
                panel_width: self.panel_width,
                cap: self.width_cap,
                ..WidthPolicy::default()
            },
        )
    }
}
