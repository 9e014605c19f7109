// ================================
// src/config.rs - node parameters loaded from TOML
// ================================
use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::{
    env, fs, io,
    path::{Path, PathBuf},
};

pub const DEFAULT_CONFIG_PATH: &str = "./goal_param.toml";

/// How notifications travel from the subscription to the gate.
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum Delivery {
    /// Evaluate inside the subscription callback.
    #[default]
    Callback,
    /// Queue into an unbounded channel drained by an async consumer task.
    Channel,
}

/// Goal node parameters. Every field falls back to its default when absent.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct GateParams {
    pub node_name: String,
    // Topic names
    pub notification_topic: String,
    pub command_topic: String,
    // Substring that triggers a stop
    pub trigger: String,
    pub delivery: Delivery,
}

impl Default for GateParams {
    fn default() -> Self {
        Self {
            node_name: "goal_node".to_string(),
            notification_topic: "/object_counts".to_string(),
            command_topic: "/cmd_vel".to_string(),
            trigger: "goal".to_string(),
            delivery: Delivery::Callback,
        }
    }
}

impl GateParams {
    /// Load from `CONFIG_PATH`, or `./goal_param.toml` when unset.
    pub fn load() -> Result<Self> {
        let config_path = env::var("CONFIG_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH));
        Self::load_from(&config_path)
    }

    /// A missing file yields the defaults; anything else that goes wrong is an error.
    pub fn load_from(path: &Path) -> Result<Self> {
        let config_str = match fs::read_to_string(path) {
            Ok(config_str) => config_str,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::info!(
                    path = %path.display(),
                    "no parameter file found, using defaults"
                );
                return Ok(Self::default());
            }
            Err(e) => {
                return Err(e).with_context(|| format!("failed to read {}", path.display()))
            }
        };
        let params = Self::from_toml_str(&config_str)
            .with_context(|| format!("invalid parameter file {}", path.display()))?;

        tracing::info!(path = %path.display(), "parameters loaded");
        Ok(params)
    }

    pub fn from_toml_str(config_str: &str) -> Result<Self> {
        let params: Self = toml::from_str(config_str)?;
        params.validate()?;
        Ok(params)
    }

    pub fn validate(&self) -> Result<()> {
        // An empty trigger is a substring of every notification.
        if self.trigger.is_empty() {
            bail!("trigger must not be empty");
        }
        if self.notification_topic.is_empty() || self.command_topic.is_empty() {
            bail!("topic names must not be empty");
        }
        if self.node_name.is_empty() {
            bail!("node_name must not be empty");
        }
        Ok(())
    }
}
