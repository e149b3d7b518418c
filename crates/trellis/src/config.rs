// File: src/config.rs
// Purpose: Configuration parsing from trellis.toml

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub project: ProjectConfig,

    #[serde(default)]
    pub routing: RoutingConfig,

    #[serde(default)]
    pub render: RenderConfig,

    #[serde(default)]
    pub metadata: MetadataConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Project metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectConfig {
    #[serde(default = "default_name")]
    pub name: String,

    #[serde(default = "default_version")]
    pub version: String,
}

/// Routing configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoutingConfig {
    /// Directory prefix stripped from route file ids (default: "app")
    #[serde(default = "default_app_dir")]
    pub app_dir: String,

    /// Whether static segments ignore ASCII case (default: false)
    #[serde(default = "default_false")]
    pub case_insensitive: bool,
}

/// Built-in fallback content
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderConfig {
    /// Shown when content fails and no error fallback is declared
    #[serde(default = "default_error_message")]
    pub generic_error_message: String,

    /// Shown when nothing matches and no not-found fallback is declared
    #[serde(default = "default_not_found_message")]
    pub not_found_message: String,
}

/// Metadata every route starts from
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct MetadataConfig {
    #[serde(default)]
    pub title: Option<String>,

    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Filter used when `RUST_LOG` is unset (default: "info")
    #[serde(default = "default_level")]
    pub level: String,
}

// Default values
fn default_name() -> String {
    "trellis-app".to_string()
}

fn default_version() -> String {
    "0.1.0".to_string()
}

fn default_app_dir() -> String {
    "app".to_string()
}

fn default_error_message() -> String {
    "An error occurred".to_string()
}

fn default_not_found_message() -> String {
    "This page could not be found.".to_string()
}

fn default_level() -> String {
    "info".to_string()
}

fn default_false() -> bool {
    false
}

// Default implementations
impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            version: default_version(),
        }
    }
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            app_dir: default_app_dir(),
            case_insensitive: false,
        }
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            generic_error_message: default_error_message(),
            not_found_message: default_not_found_message(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
        }
    }
}

impl Config {
    /// Load configuration from trellis.toml
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        // Missing file means defaults
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;

        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path))?;

        Ok(config)
    }

    /// Load configuration from default path (./trellis.toml)
    pub fn load_default() -> Result<Self> {
        Self::load("trellis.toml")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.routing.app_dir, "app");
        assert!(!config.routing.case_insensitive);
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.render.generic_error_message, "An error occurred");
        assert_eq!(config.metadata.title, None);
    }

    #[test]
    fn test_empty_config() {
        let config = toml::from_str::<Config>("").unwrap_or_default();
        assert_eq!(config.routing.app_dir, "app");
        assert_eq!(config.project.name, "trellis-app");
    }

    #[test]
    fn test_partial_sections() {
        let toml = r#"
            [routing]
            case_insensitive = true

            [metadata]
            title = "Acme"
        "#;
        let config: Config = toml::from_str(toml).unwrap();
        assert!(config.routing.case_insensitive);
        assert_eq!(config.routing.app_dir, "app");
        assert_eq!(config.metadata.title.as_deref(), Some("Acme"));
        assert_eq!(config.metadata.description, None);
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let config = Config::load("does/not/exist/trellis.toml").unwrap();
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_invalid_file_is_an_error() {
        let path = std::env::temp_dir().join(format!("trellis-{}.toml", uuid::Uuid::new_v4()));
        fs::write(&path, "[routing\napp_dir = 3").unwrap();

        let err = Config::load(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));

        fs::remove_file(&path).unwrap();
    }
}
