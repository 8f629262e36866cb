// ABOUTME: Configuration file loading, validation, and hierarchical merging for bgfade
// ABOUTME: Supplies the host capability flags and output preferences from TOML files

use crate::constants::{config as files, env as vars};
use anyhow::{Context, Result};
use bgfade::Environment;
use serde::{Deserialize, Deserializer};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Deserialize, Default)]
pub struct Config {
    /// Host can present and load images at all
    #[serde(default)]
    pub has_surface: Option<bool>,
    /// Host offers a multi-source picture construct
    #[serde(default)]
    pub supports_picture: Option<bool>,
    #[serde(default, deserialize_with = "validate_format")]
    pub preferred_format: Option<String>,
    #[serde(default)]
    pub color: Option<bool>,
}

impl Config {
    /// Load the standard locations, then `explicit` on top when given
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let paths = Self::get_config_paths();
        let mut config =
            Self::load_from_paths(&paths.iter().map(|p| p.as_str()).collect::<Vec<_>>())?;

        if let Some(path) = explicit {
            config = config.merge(Self::load_from_file(path)?);
        }

        Ok(config)
    }

    /// Load configuration from file paths in increasing precedence, skipping missing files
    pub fn load_from_paths(paths: &[&str]) -> Result<Self> {
        let mut config = Config::default();

        for path in paths {
            if !Path::new(path).is_file() {
                log::trace!("No config file at {}", path);
                continue;
            }
            log::debug!("Loading config file {}", path);
            config = config.merge(Self::load_from_file(path)?);
        }

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a single file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Config = toml::from_str(&content).with_context(|| {
            format!(
                "Failed to parse TOML config file: {}",
                path.as_ref().display()
            )
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Standard config file paths, lowest precedence first
    pub fn get_config_paths() -> Vec<String> {
        let mut paths = Vec::new();

        if let Some(home_dir) = dirs::home_dir() {
            let path = home_dir
                .join(".config")
                .join(files::APP_DIR)
                .join(files::CONFIG_FILE);
            paths.push(path.to_string_lossy().to_string());
        }

        if let Some(config_home) = std::env::var_os("XDG_CONFIG_HOME") {
            let path = PathBuf::from(config_home)
                .join(files::APP_DIR)
                .join(files::CONFIG_FILE);
            paths.push(path.to_string_lossy().to_string());
        }

        if let Ok(current_dir) = std::env::current_dir() {
            paths.push(
                current_dir
                    .join(files::PROJECT_FILE)
                    .to_string_lossy()
                    .to_string(),
            );
        }

        paths
    }

    /// Merge this config with another, giving precedence to the other config
    pub fn merge(self, other: Config) -> Config {
        Config {
            has_surface: other.has_surface.or(self.has_surface),
            supports_picture: other.supports_picture.or(self.supports_picture),
            preferred_format: other.preferred_format.or(self.preferred_format),
            color: other.color.or(self.color),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.has_surface == Some(false) && self.supports_picture == Some(true) {
            log::warn!("supports_picture has no effect without a presentation surface");
        }
        Ok(())
    }

    /// Host capabilities: the forced profile if set, else configured flags over browser defaults
    pub fn environment(&self) -> Environment {
        if let Ok(forced) = std::env::var(vars::FORCE_ENVIRONMENT) {
            match forced_environment(&forced) {
                Some(env) => return env,
                None => log::warn!(
                    "Unknown environment '{}' in {}. Valid values: browser, legacy, server",
                    forced,
                    vars::FORCE_ENVIRONMENT
                ),
            }
        }

        let defaults = Environment::browser();
        Environment {
            has_surface: self.has_surface.unwrap_or(defaults.has_surface),
            supports_picture: self.supports_picture.unwrap_or(defaults.supports_picture),
        }
    }
}

fn forced_environment(name: &str) -> Option<Environment> {
    match name.to_lowercase().as_str() {
        "browser" => Some(Environment::browser()),
        "legacy" => Some(Environment::legacy()),
        "server" | "none" => Some(Environment::server()),
        _ => None,
    }
}

fn validate_format<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    let value: Option<String> = Option::deserialize(deserializer)?;

    match value.as_deref() {
        None | Some("text") | Some("json") => Ok(value),
        Some(format) => Err(D::Error::custom(format!(
            "Invalid format '{}'. Must be one of: text, json",
            format
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.has_surface.is_none());
        assert!(config.preferred_format.is_none());
    }

    #[test]
    fn test_merge_configs() {
        let base = Config {
            has_surface: Some(true),
            preferred_format: Some("text".to_string()),
            ..Default::default()
        };

        let override_config = Config {
            preferred_format: Some("json".to_string()),
            color: Some(false),
            ..Default::default()
        };

        let merged = base.merge(override_config);
        assert_eq!(merged.has_surface, Some(true));
        assert_eq!(merged.preferred_format, Some("json".to_string()));
        assert_eq!(merged.color, Some(false));
    }

    #[test]
    fn test_forced_environment_names() {
        assert_eq!(forced_environment("Legacy"), Some(Environment::legacy()));
        assert_eq!(forced_environment("server"), Some(Environment::server()));
        assert_eq!(forced_environment("kitty"), None);
    }

    #[test]
    #[serial]
    fn test_environment_from_flags() {
        std::env::remove_var(vars::FORCE_ENVIRONMENT);

        let config = Config {
            supports_picture: Some(false),
            ..Default::default()
        };
        assert_eq!(config.environment(), Environment::legacy());
        assert_eq!(Config::default().environment(), Environment::browser());
    }

    #[test]
    #[serial]
    fn test_forced_environment_overrides_flags() {
        std::env::set_var(vars::FORCE_ENVIRONMENT, "server");
        let config = Config {
            has_surface: Some(true),
            ..Default::default()
        };
        assert_eq!(config.environment(), Environment::server());

        std::env::set_var(vars::FORCE_ENVIRONMENT, "bogus");
        assert_eq!(config.environment(), Environment::browser());

        std::env::remove_var(vars::FORCE_ENVIRONMENT);
    }
}
