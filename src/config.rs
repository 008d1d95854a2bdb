//! Wizard Configuration
//!
//! Parses wizard.toml files describing the wizard shown to the user.

use serde::Deserialize;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// File name looked up by [`WizardConfig::discover`]
pub const CONFIG_FILE: &str = "wizard.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse wizard configuration")]
    Parse(#[from] toml::de::Error),

    #[error("invalid wizard configuration: {0}")]
    Invalid(String),
}

/// Layout of wizard.toml
#[derive(Debug, Deserialize, Default)]
struct ConfigFile {
    #[serde(default)]
    wizard: WizardConfig,
}

/// Wizard metadata
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct WizardConfig {
    /// Name shown in the title and on the welcome page
    #[serde(default = "default_name")]
    pub name: String,

    /// Dot-separated numeric version
    #[serde(default = "default_version")]
    pub version: String,

    /// One-line description, appended to the title
    #[serde(default)]
    pub short_description: String,

    /// Paragraph shown on the welcome page
    #[serde(default)]
    pub long_description: String,
}

impl Default for WizardConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            version: default_version(),
            short_description: String::new(),
            long_description: String::new(),
        }
    }
}

fn default_name() -> String {
    "Wizard".to_string()
}

fn default_version() -> String {
    "1.0.0".to_string()
}

impl WizardConfig {
    /// Load configuration from a file path
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        Self::from_str(&contents)
    }

    /// Parse configuration from a TOML string
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(toml_str: &str) -> Result<Self, ConfigError> {
        let file: ConfigFile = toml::from_str(toml_str)?;
        Ok(file.wizard)
    }

    /// Load the first wizard.toml found, or defaults
    ///
    /// Looks in the current directory, then in the user config directory.
    pub fn discover() -> Result<Self, ConfigError> {
        for path in Self::search_paths() {
            if path.is_file() {
                tracing::info!("loading wizard config from {}", path.display());
                return Self::from_file(&path);
            }
        }

        tracing::debug!("no {} found, using defaults", CONFIG_FILE);
        Ok(Self::default())
    }

    /// Candidate locations for wizard.toml, in lookup order
    pub fn search_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from(CONFIG_FILE)];
        if let Some(dir) = dirs::config_dir() {
            paths.push(dir.join("stepwise").join(CONFIG_FILE));
        }
        paths
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.name.trim().is_empty() {
            return Err(ConfigError::Invalid("wizard name must not be empty".into()));
        }

        let numeric = |part: &str| !part.is_empty() && part.bytes().all(|b| b.is_ascii_digit());
        if !self.version.split('.').all(numeric) {
            return Err(ConfigError::Invalid(format!(
                "version should be dot-separated numbers (e.g. '1.0.0'), got: {}",
                self.version
            )));
        }

        Ok(())
    }

    /// "name - short description", or just the name
    pub fn window_title(&self) -> String {
        if self.short_description.is_empty() {
            self.name.clone()
        } else {
            format!("{} - {}", self.name, self.short_description)
        }
    }
}

/// Generate a template wizard.toml file
pub fn generate_template(name: &str) -> String {
    format!(
        r#"# Stepwise wizard configuration

[wizard]
name = "{name}"
version = "1.0.0"

# Optional: shown after the name in the title
short_description = "Setup"

# Optional: shown on the welcome page
# long_description = "This wizard will guide you through the setup."
"#
    )
}
