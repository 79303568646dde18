//! TOML run configuration.
//!
//! ```toml
//! [inputs]
//! events = "output_events.csv"
//! routes = "routes.csv"            # optional
//!
//! [network]
//! nodes        = "nodes.csv"
//! links        = "links.csv"
//! centroids    = "centroids.csv"
//! temperatures = "temperatures.csv"
//! max_profile_distance = 5000.0    # optional, metres
//!
//! [engine]                         # optional, see hx_core::EngineConfig
//! start_time = 0
//! [engine.cabin_temperatures]
//! car = 22.0
//!
//! [export]                         # optional
//! backend    = "sqlite"            # or "csv"
//! path       = "exposure.db"
//! batch_rows = 10000
//! ```
//!
//! Relative paths are resolved against the directory of the config file.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use hx_core::EngineConfig;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    pub inputs:  Inputs,
    pub network: NetworkPaths,
    #[serde(default)]
    pub engine:  EngineConfig,
    #[serde(default)]
    pub export:  ExportConfig,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Inputs {
    pub events: PathBuf,
    #[serde(default)]
    pub routes: Option<PathBuf>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NetworkPaths {
    pub nodes:        PathBuf,
    pub links:        PathBuf,
    pub centroids:    PathBuf,
    pub temperatures: PathBuf,
    /// Links farther than this from every centroid are an error.
    #[serde(default)]
    pub max_profile_distance: Option<f64>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    Sqlite,
    Csv,
}

#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExportConfig {
    pub backend:    Backend,
    /// Database file (`sqlite`) or output directory (`csv`).
    pub path:       PathBuf,
    /// Rows buffered before each write to staging.
    pub batch_rows: u64,
    /// Population size; when set, the agent row count must match it.
    pub expected_agents: Option<u64>,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            backend:         Backend::Sqlite,
            path:            PathBuf::from("exposure.db"),
            batch_rows:      10_000,
            expected_agents: None,
        }
    }
}

impl AppConfig {
    /// Read, parse and validate the config file at `path`.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("cannot read config file {}", path.display()))?;
        let base = path.parent().unwrap_or_else(|| Path::new("."));
        Self::parse(&text, base).with_context(|| format!("invalid config file {}", path.display()))
    }

    /// Parse config text; relative paths are taken relative to `base`.
    pub fn parse(text: &str, base: &Path) -> Result<Self> {
        let mut config: AppConfig = toml::from_str(text)?;
        config.engine.validate()?;
        config.resolve(base);
        Ok(config)
    }

    fn resolve(&mut self, base: &Path) {
        let fix = |p: &mut PathBuf| {
            if p.is_relative() {
                *p = base.join(&*p);
            }
        };
        fix(&mut self.inputs.events);
        if let Some(routes) = self.inputs.routes.as_mut() {
            fix(routes);
        }
        fix(&mut self.network.nodes);
        fix(&mut self.network.links);
        fix(&mut self.network.centroids);
        fix(&mut self.network.temperatures);
        fix(&mut self.export.path);
    }
}
