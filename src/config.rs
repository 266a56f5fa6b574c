use std::path::Path;

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use crate::cluster::ClusterStrategy;
use crate::error::ConfigError;
use crate::graph::BuilderConfig;
use crate::interaction::ZoomConfig;
use crate::layout::LayoutParams;

const ENV_PREFIX: &str = "DOCGRAPH";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub layout: LayoutParams,
    pub zoom: ZoomConfig,
    pub builder: BuilderConfig,
    pub clusters: ClusterStrategy,
    /// Artificial delay applied by the local detail source, in milliseconds.
    pub detail_latency_ms: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            layout: LayoutParams::default(),
            zoom: ZoomConfig::default(),
            builder: BuilderConfig::default(),
            clusters: ClusterStrategy::default(),
            detail_latency_ms: 120,
        }
    }
}

impl EngineConfig {
    /// Layers defaults, an optional TOML/JSON file and `DOCGRAPH__*`
    /// environment variables, in that order.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(File::from(path).required(true));
        }
        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .try_parsing(true),
        );

        let config: Self = builder.build()?.try_deserialize()?;
        tracing::debug!(?config, "configuration loaded");
        Ok(config)
    }
}
