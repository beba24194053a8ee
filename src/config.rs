use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::optimizer::Strategy;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub optimizer: OptimizerConfig,
    #[serde(default)]
    pub annealing: AnnealingConfig,
    #[serde(default)]
    pub window: WindowConfig,
    #[serde(default)]
    pub weights: WeightsConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptimizerConfig {
    #[serde(default = "default_strategy")]
    pub strategy: Strategy,
    #[serde(default = "default_max_packages")]
    pub max_packages: usize,
    #[serde(default = "default_true")]
    pub require_live: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnnealingConfig {
    #[serde(default = "default_initial_temp")]
    pub initial_temp: f64,
    #[serde(default = "default_cooling_rate")]
    pub cooling_rate: f64,
    #[serde(default = "default_min_temp")]
    pub min_temp: f64,
    #[serde(default = "default_max_iterations")]
    pub max_iterations: u64,
    #[serde(default = "default_time_limit_secs")]
    pub time_limit_secs: f64,
    #[serde(default)]
    pub seed: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WindowConfig {
    #[serde(default = "default_min_horizon_days")]
    pub min_horizon_days: i64,
    #[serde(default = "default_lookahead_days")]
    pub lookahead_days: i64,
    #[serde(default = "default_pause_factor")]
    pub pause_factor: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeightsConfig {
    #[serde(default = "default_baseline_weight")]
    pub baseline_weight: f64,
    #[serde(default)]
    pub phase_enabled: bool,
    #[serde(default)]
    pub importance_enabled: bool,
    #[serde(default)]
    pub tournament_overrides: BTreeMap<String, f64>,
    #[serde(default)]
    pub derbies: Vec<[String; 2]>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub strategy: Option<Strategy>,
    pub max_packages: Option<usize>,
    pub allow_highlights: bool,
    pub seed: Option<u64>,
    pub time_limit_secs: Option<f64>,
}

impl Config {
    pub fn default_path() -> PathBuf {
        let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        home.join(".config/subscription-oracle/config.toml")
    }

    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = path
            .map(|p| p.to_path_buf())
            .unwrap_or_else(Self::default_path);
        if !path.exists() {
            return Ok(Self::default());
        }
        let data = fs::read_to_string(&path)
            .with_context(|| format!("failed reading config: {}", path.display()))?;
        let parsed: Self = toml::from_str(&data)
            .with_context(|| format!("failed parsing TOML config: {}", path.display()))?;
        Ok(parsed)
    }

    pub fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(strategy) = overrides.strategy {
            self.optimizer.strategy = strategy;
        }
        if let Some(max_packages) = overrides.max_packages {
            self.optimizer.max_packages = max_packages;
        }
        if overrides.allow_highlights {
            self.optimizer.require_live = false;
        }
        if let Some(seed) = overrides.seed {
            self.annealing.seed = Some(seed);
        }
        if let Some(limit) = overrides.time_limit_secs {
            self.annealing.time_limit_secs = limit;
        }
    }

    pub fn write_template(path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("failed creating config directory: {}", parent.display())
            })?;
        }
        fs::write(path, Self::default_template())
            .with_context(|| format!("failed writing config template: {}", path.display()))
    }

    pub fn default_template() -> String {
        let template = r#"[optimizer]
# greedy | annealing
strategy = "annealing"
max_packages = 3
require_live = true

[annealing]
initial_temp = 100.0
cooling_rate = 0.98
min_temp = 0.01
max_iterations = 100000
time_limit_secs = 10.0
# seed = 42

[window]
min_horizon_days = 90
lookahead_days = 180
pause_factor = 2.0

[weights]
baseline_weight = 0.4
phase_enabled = false
importance_enabled = false
derbies = [["Borussia Dortmund", "Schalke 04"]]

[weights.tournament_overrides]
# "Bundesliga" = 2.0

[server]
host = "127.0.0.1"
port = 3001
"#;
        template.to_string()
    }
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            strategy: default_strategy(),
            max_packages: default_max_packages(),
            require_live: true,
        }
    }
}

impl Default for AnnealingConfig {
    fn default() -> Self {
        Self {
            initial_temp: default_initial_temp(),
            cooling_rate: default_cooling_rate(),
            min_temp: default_min_temp(),
            max_iterations: default_max_iterations(),
            time_limit_secs: default_time_limit_secs(),
            seed: None,
        }
    }
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            min_horizon_days: default_min_horizon_days(),
            lookahead_days: default_lookahead_days(),
            pause_factor: default_pause_factor(),
        }
    }
}

impl Default for WeightsConfig {
    fn default() -> Self {
        Self {
            baseline_weight: default_baseline_weight(),
            phase_enabled: false,
            importance_enabled: false,
            tournament_overrides: BTreeMap::new(),
            derbies: Vec::new(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_strategy() -> Strategy {
    Strategy::Annealing
}

fn default_max_packages() -> usize {
    3
}

fn default_initial_temp() -> f64 {
    100.0
}

fn default_cooling_rate() -> f64 {
    0.98
}

fn default_min_temp() -> f64 {
    0.01
}

fn default_max_iterations() -> u64 {
    100_000
}

fn default_time_limit_secs() -> f64 {
    10.0
}

fn default_min_horizon_days() -> i64 {
    90
}

fn default_lookahead_days() -> i64 {
    180
}

fn default_pause_factor() -> f64 {
    2.0
}

fn default_baseline_weight() -> f64 {
    0.4
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3001
}

fn default_true() -> bool {
    true
}
