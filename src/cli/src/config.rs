//! CLI configuration loading and validation

use anyhow::{Context, Result};
use orderdesk_shield::{Seed, ShieldConfig};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Complete CLI configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct CliConfig {
    #[serde(default)]
    pub logging: LoggingSection,

    #[serde(default)]
    pub shield: ShieldConfig,

    /// Seed file (TOML, or JSON by extension); the built-in seed when absent
    #[serde(default)]
    pub seed_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingSection {
    #[serde(default = "default_level")]
    pub level: String,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: default_level(),
        }
    }
}

fn default_level() -> String { "info".to_string() }

const LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

impl CliConfig {
    /// Load configuration from TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read configuration file {:?}", path))?;
        let mut config: CliConfig = toml::from_str(&contents)
            .context("Failed to parse configuration file")?;

        // Seed paths are relative to the config file
        if let (Some(seed), Some(dir)) = (config.seed_path.as_mut(), path.parent()) {
            if seed.is_relative() {
                *seed = dir.join(&*seed);
            }
        }

        Ok(config)
    }

    /// Load from `path` if given, otherwise use defaults
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if !LEVELS.contains(&self.logging.level.as_str()) {
            anyhow::bail!(
                "Log level must be one of {}, got '{}'",
                LEVELS.join(", "),
                self.logging.level
            );
        }

        self.shield.validate().context("Invalid [shield] section")?;

        Ok(())
    }

    /// Seed named by `seed_path`, or the built-in one
    pub fn seed(&self) -> Result<Seed> {
        let Some(path) = &self.seed_path else {
            return Ok(Seed::standard());
        };

        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read seed file {:?}", path))?;

        let seed = match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Seed::from_json_str(&contents),
            _ => Seed::from_toml_str(&contents),
        }
        .with_context(|| format!("Failed to parse seed file {:?}", path))?;

        Ok(seed)
    }
}
