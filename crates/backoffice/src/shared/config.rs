use serde::Deserialize;
use std::path::Path;

use crate::domain::a002_batch::composer::{CategoryPolicy, CompositionPolicy, OriginPolicy};

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub api: ApiConfig,
    #[serde(default)]
    pub tariff: TariffConfig,
    #[serde(default)]
    pub batch: BatchConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ApiConfig {
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Bearer token; obtaining it is outside this tool
    #[serde(default)]
    pub access_token: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct TariffConfig {
    /// Width of a newly appended weight range, kg
    #[serde(default = "default_weight_range_step")]
    pub weight_range_step: f64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct BatchConfig {
    #[serde(default = "default_orders_page_size")]
    pub orders_page_size: u32,
    #[serde(default = "default_branches_page_size")]
    pub branches_page_size: u32,
    #[serde(default = "default_vehicle_types_limit")]
    pub vehicle_types_limit: u32,
    #[serde(default)]
    pub category_policy: CategoryPolicy,
    #[serde(default)]
    pub origin_policy: OriginPolicy,
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_weight_range_step() -> f64 {
    5.0
}

fn default_orders_page_size() -> u32 {
    100
}

fn default_branches_page_size() -> u32 {
    50
}

fn default_vehicle_types_limit() -> u32 {
    1000
}

impl Default for TariffConfig {
    fn default() -> Self {
        Self {
            weight_range_step: default_weight_range_step(),
        }
    }
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            orders_page_size: default_orders_page_size(),
            branches_page_size: default_branches_page_size(),
            vehicle_types_limit: default_vehicle_types_limit(),
            category_policy: CategoryPolicy::default(),
            origin_policy: OriginPolicy::default(),
        }
    }
}

impl BatchConfig {
    pub fn composition_policy(&self) -> CompositionPolicy {
        CompositionPolicy {
            category: self.category_policy,
            origin: self.origin_policy,
        }
    }
}

/// Default configuration embedded in the binary
const DEFAULT_CONFIG: &str = r#"
[api]
base_url = "http://127.0.0.1:4000/api/v1"
timeout_secs = 30

[tariff]
weight_range_step = 5

[batch]
orders_page_size = 100
branches_page_size = 50
vehicle_types_limit = 1000
category_policy = "first_order"
origin_policy = "fallback_to_destination"
"#;

/// Load configuration from config.toml file
///
/// Search order:
/// 1. Next to the executable (for production)
/// 2. Falls back to embedded default config
pub fn load_config() -> anyhow::Result<Config> {
    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            let config_path = exe_dir.join("config.toml");

            if config_path.exists() {
                return load_config_from(&config_path);
            } else {
                tracing::warn!("config.toml not found at: {}", config_path.display());
            }
        }
    }

    tracing::info!("Using default embedded configuration");
    let config: Config = toml::from_str(DEFAULT_CONFIG)?;
    Ok(config)
}

/// Load configuration from an explicit path
pub fn load_config_from(path: &Path) -> anyhow::Result<Config> {
    tracing::info!("Loading config from: {}", path.display());
    let contents = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("failed to read {}: {}", path.display(), e))?;
    let config: Config = toml::from_str(&contents)?;
    let step = config.tariff.weight_range_step;
    if step.is_nan() || step <= 0.0 {
        anyhow::bail!("tariff.weight_range_step must be positive");
    }
    Ok(config)
}
