//! Recorder configuration

use std::time::Duration;

use serde::Deserialize;

use crate::error::{RecorderError, RecorderResult};

/// Recorder tuning knobs
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RecorderConfig {
    /// Period of the upload timer
    pub poll_interval_ms: u64,
    /// The timer uploads once this long has passed since the last upload
    pub idle_threshold_ms: u64,
    /// Element properties diffed at each check point
    pub watched_properties: Vec<String>,
    /// Namespace left out of serialized elements and attributes
    pub default_namespace: String,
    /// Skip the initial snapshot and subscription for `about:blank`
    pub skip_blank_documents: bool,
}

impl Default for RecorderConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 500,
            idle_threshold_ms: 1000,
            watched_properties: vec!["value".into(), "selected".into(), "checked".into()],
            default_namespace: "http://www.w3.org/1999/xhtml".into(),
            skip_blank_documents: true,
        }
    }
}

impl RecorderConfig {
    /// Parse a JSON object; missing keys keep their defaults
    pub fn from_json(json: &str) -> RecorderResult<Self> {
        serde_json::from_str(json).map_err(RecorderError::Config)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn idle_threshold(&self) -> Duration {
        Duration::from_millis(self.idle_threshold_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = RecorderConfig::default();
        assert_eq!(config.poll_interval(), Duration::from_millis(500));
        assert_eq!(config.idle_threshold(), Duration::from_secs(1));
        assert_eq!(config.watched_properties, ["value", "selected", "checked"]);
        assert!(config.skip_blank_documents);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = RecorderConfig::from_json(r#"{ "idleThresholdMs": 250 }"#).unwrap();
        assert_eq!(config.idle_threshold_ms, 250);
        assert_eq!(config.poll_interval_ms, 500);
        assert_eq!(config.default_namespace, "http://www.w3.org/1999/xhtml");
    }

    #[test]
    fn test_invalid_json() {
        let err = RecorderConfig::from_json("{ \"pollIntervalMs\": \"soon\" }").unwrap_err();
        assert!(matches!(err, RecorderError::Config(_)));
    }
}
