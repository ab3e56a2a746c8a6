use serde::Deserialize;

/// Root application configuration. Loaded from environment variables
/// with the prefix `CAMPAIGN_EXPRESS__`.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_node_id")]
    pub node_id: String,
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub metrics: MetricsConfig,
    #[serde(default)]
    pub attribution: AttributionConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_http_port")]
    pub http_port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MetricsConfig {
    #[serde(default = "default_metrics_port")]
    pub port: u16,
}

// Default functions
fn default_node_id() -> String {
    "node-01".to_string()
}
fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_http_port() -> u16 {
    8080
}
fn default_metrics_port() -> u16 {
    9091
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            http_port: default_http_port(),
        }
    }
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            port: default_metrics_port(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            node_id: default_node_id(),
            api: ApiConfig::default(),
            metrics: MetricsConfig::default(),
            attribution: AttributionConfig::default(),
        }
    }
}

// ─── Attribution Config ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct AttributionConfig {
    /// Half-life, in days, of the time-decay weighting curve.
    #[serde(default = "default_half_life_days")]
    pub half_life_days: f64,
    /// Map unknown model identifiers to LINEAR instead of rejecting them.
    #[serde(default)]
    pub lenient_model_fallback: bool,
}

fn default_half_life_days() -> f64 {
    7.0
}

impl Default for AttributionConfig {
    fn default() -> Self {
        Self {
            half_life_days: default_half_life_days(),
            lenient_model_fallback: false,
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, config::ConfigError> {
        let builder = config::Config::builder().add_source(
            config::Environment::with_prefix("CAMPAIGN_EXPRESS")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        let app: AppConfig = config.try_deserialize()?;
        app.validate()?;
        Ok(app)
    }

    /// Reject values the attribution engine cannot work with.
    pub fn validate(&self) -> Result<(), config::ConfigError> {
        let half_life = self.attribution.half_life_days;
        if !(half_life.is_finite() && half_life > 0.0) {
            return Err(config::ConfigError::Message(format!(
                "attribution.half_life_days must be a positive number, got {half_life}"
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.node_id, "node-01");
        assert_eq!(config.api.http_port, 8080);
        assert_eq!(config.metrics.port, 9091);
        assert_eq!(config.attribution.half_life_days, 7.0);
        assert!(!config.attribution.lenient_model_fallback);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_section_uses_field_defaults() {
        let config: AppConfig =
            serde_json::from_str(r#"{"attribution": {"lenient_model_fallback": true}}"#).unwrap();
        assert!(config.attribution.lenient_model_fallback);
        assert_eq!(config.attribution.half_life_days, 7.0);
        assert_eq!(config.api.host, "0.0.0.0");
    }

    #[test]
    fn test_load_reads_string_and_scalar_env_fields() {
        // Only test in this crate that touches CAMPAIGN_EXPRESS__* variables.
        let vars = [
            ("CAMPAIGN_EXPRESS__NODE_ID", "node-07"),
            ("CAMPAIGN_EXPRESS__API__HOST", "127.0.0.1"),
            ("CAMPAIGN_EXPRESS__API__HTTP_PORT", "8181"),
            ("CAMPAIGN_EXPRESS__ATTRIBUTION__HALF_LIFE_DAYS", "3.5"),
            ("CAMPAIGN_EXPRESS__ATTRIBUTION__LENIENT_MODEL_FALLBACK", "true"),
        ];
        for (key, value) in vars {
            std::env::set_var(key, value);
        }

        let loaded = AppConfig::load();
        for (key, _) in vars {
            std::env::remove_var(key);
        }

        let config = loaded.unwrap();
        assert_eq!(config.node_id, "node-07");
        assert_eq!(config.api.host, "127.0.0.1");
        assert_eq!(config.api.http_port, 8181);
        assert_eq!(config.attribution.half_life_days, 3.5);
        assert!(config.attribution.lenient_model_fallback);
        assert_eq!(config.metrics.port, 9091);
    }

    #[test]
    fn test_rejects_non_positive_half_life() {
        let mut config = AppConfig::default();
        config.attribution.half_life_days = 0.0;
        assert!(config.validate().is_err());
        config.attribution.half_life_days = f64::NAN;
        assert!(config.validate().is_err());
    }
}
