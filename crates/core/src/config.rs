use serde::Deserialize;

/// Root application configuration. Loaded from environment variables
/// with the prefix `CAMPAIGN_PLANNER__`.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_node_id")]
    pub node_id: String,
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub metrics: MetricsConfig,
    #[serde(default)]
    pub planner: PlannerConfig,
    #[serde(default)]
    pub insights: InsightsConfig,
    #[serde(default)]
    pub export: ExportConfig,
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
    #[serde(default = "default_metrics_enabled")]
    pub enabled: bool,
    #[serde(default = "default_metrics_port")]
    pub port: u16,
}

// ─── Planner Config ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct PlannerConfig {
    /// Pause before each progress stage of a run.
    #[serde(default = "default_stage_delay_ms")]
    pub stage_delay_ms: u64,
    /// Audience universe used for population-relative figures.
    #[serde(default = "default_total_population")]
    pub total_population: u64,
    /// Fixed RNG seed. Unset means a fresh entropy seed per run.
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default = "default_customers")]
    pub customers: Vec<String>,
}

fn default_stage_delay_ms() -> u64 {
    1500
}
fn default_total_population() -> u64 {
    5_000_000
}
fn default_customers() -> Vec<String> {
    [
        "All Customers",
        "123planten",
        "Art & Craft",
        "BENU",
        "Ben",
        "Blink",
        "Delta",
        "TechTrendz Inc.",
        "Springbok Agency",
        "Global Mart",
        "Eco Solutions",
        "Future Dynamics",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            stage_delay_ms: default_stage_delay_ms(),
            total_population: default_total_population(),
            seed: None,
            customers: default_customers(),
        }
    }
}

// ─── Insights Config ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct InsightsConfig {
    #[serde(default = "default_insights_enabled")]
    pub enabled: bool,
    #[serde(default = "default_insights_base_url")]
    pub base_url: String,
    #[serde(default = "default_insights_model")]
    pub model: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_top_p")]
    pub top_p: f32,
}

fn default_insights_enabled() -> bool {
    true
}
fn default_insights_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}
fn default_insights_model() -> String {
    "gemini-3-flash-preview".to_string()
}
fn default_temperature() -> f32 {
    0.7
}
fn default_top_p() -> f32 {
    0.95
}

impl Default for InsightsConfig {
    fn default() -> Self {
        Self {
            enabled: default_insights_enabled(),
            base_url: default_insights_base_url(),
            model: default_insights_model(),
            api_key: String::new(),
            temperature: default_temperature(),
            top_p: default_top_p(),
        }
    }
}

// ─── Export Config ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct ExportConfig {
    #[serde(default = "default_file_prefix")]
    pub file_prefix: String,
}

fn default_file_prefix() -> String {
    "Advantiv_Export".to_string()
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            file_prefix: default_file_prefix(),
        }
    }
}

// Default functions
fn default_node_id() -> String {
    "planner-01".to_string()
}
fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_http_port() -> u16 {
    8080
}
fn default_metrics_enabled() -> bool {
    true
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
            enabled: default_metrics_enabled(),
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
            planner: PlannerConfig::default(),
            insights: InsightsConfig::default(),
            export: ExportConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, config::ConfigError> {
        let builder = config::Config::builder().add_source(
            config::Environment::with_prefix("CAMPAIGN_PLANNER")
                .separator("__")
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("planner.customers"),
        );

        let config = builder.build()?;
        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.planner.stage_delay_ms, 1500);
        assert_eq!(config.planner.total_population, 5_000_000);
        assert_eq!(config.planner.customers[0], "All Customers");
        assert_eq!(config.insights.model, "gemini-3-flash-preview");
        assert!((config.insights.temperature - 0.7).abs() < f32::EPSILON);
        assert_eq!(config.export.file_prefix, "Advantiv_Export");
    }

    #[test]
    fn test_empty_sections_fall_back_to_defaults() {
        let config: AppConfig = serde_json::from_str(r#"{"planner": {"seed": 7}}"#).unwrap();
        assert_eq!(config.planner.seed, Some(7));
        assert_eq!(config.planner.stage_delay_ms, 1500);
        assert_eq!(config.api.http_port, 8080);
    }
}
