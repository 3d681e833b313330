//! Layered CLI configuration: defaults, then the TOML file, then `INTAKE_*`
//! environment variables, then command-line flags.

use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use intake_form::config::EngineConfig;
use serde::{Deserialize, Serialize};

use crate::logging::LogFormat;

pub const DEFAULT_CONFIG_FILE: &str = "intake.toml";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    pub log_level: String,
    pub log_format: LogFormat,
    /// Credential checked by `submit`. Absent or blank means logged out.
    pub token: Option<String>,
    pub engine: EngineConfig,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            log_level: "warn".into(),
            log_format: LogFormat::default(),
            token: None,
            engine: EngineConfig::default(),
        }
    }
}

impl CliConfig {
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.token.as_deref().is_some_and(|t| !t.trim().is_empty())
    }
}

/// Flag values that override every other layer when present.
#[derive(Debug, Default, Serialize)]
pub struct Overrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_level: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_format: Option<LogFormat>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

/// Load the configuration. An explicit `path` must exist; the default file
/// is optional.
pub fn load(path: Option<&Path>, overrides: Overrides) -> anyhow::Result<CliConfig> {
    let file = match path {
        Some(path) if !path.exists() => bail!("config file {} not found", path.display()),
        Some(path) => path.to_path_buf(),
        None => PathBuf::from(DEFAULT_CONFIG_FILE),
    };

    let config: CliConfig = Figment::from(Serialized::defaults(CliConfig::default()))
        .merge(Toml::file(&file))
        .merge(Env::prefixed("INTAKE_").split("__").ignore(&["config"]))
        .merge(Serialized::defaults(overrides))
        .extract()
        .with_context(|| format!("failed to load configuration from {}", file.display()))?;

    config
        .engine
        .validate()
        .context("invalid engine configuration")?;
    tracing::debug!(file = %file.display(), "configuration loaded");
    Ok(config)
}
