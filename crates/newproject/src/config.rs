//! Configuration loading for newproject
//!
//! Config file: ~/.config/plugkit/newproject.toml. Every key is optional;
//! a missing file means built-in defaults.

use anyhow::{bail, Context, Result};
use plugkit_core::Paths;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::materialize::{Materializer, DEFAULT_MAIN_SOURCE_PREFIX, DEFAULT_TEMPLATE};
use crate::substitution::Placeholders;

/// newproject configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Template directory to copy
    #[serde(default = "default_template")]
    pub template: PathBuf,

    /// Prefix of the template's main source file name
    #[serde(default = "default_main_source_prefix")]
    pub main_source_prefix: String,

    /// Literal tokens in the template
    #[serde(default)]
    pub placeholders: Placeholders,

    /// Suggested prompt answers
    #[serde(default)]
    pub defaults: PromptDefaults,
}

fn default_template() -> PathBuf {
    PathBuf::from(DEFAULT_TEMPLATE)
}

fn default_main_source_prefix() -> String {
    DEFAULT_MAIN_SOURCE_PREFIX.to_string()
}

/// Answers offered when the user just presses enter
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PromptDefaults {
    pub vendor_name: Option<String>,
    pub vendor_id: Option<String>,
    pub bundle_id: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            template: default_template(),
            main_source_prefix: default_main_source_prefix(),
            placeholders: Placeholders::default(),
            defaults: PromptDefaults::default(),
        }
    }
}

impl Config {
    /// Load configuration
    ///
    /// An explicit path must exist. The default path falls back to built-in
    /// defaults when absent.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => {
                if !path.exists() {
                    bail!("Config file not found: {}", path.display());
                }
                Self::from_file(path)
            }
            None => {
                let config_path = Self::config_path();
                if config_path.exists() {
                    Self::from_file(&config_path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    /// Get the config file path
    pub fn config_path() -> PathBuf {
        Paths::new().config_file("newproject")
    }

    fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {:?}", path))?;

        Self::parse(&content).with_context(|| format!("Failed to parse config from {:?}", path))
    }

    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Materializer for this configuration, writing into `output`
    ///
    /// `template` overrides the configured template directory.
    pub fn materializer(&self, template: Option<&Path>, output: &Path) -> Materializer {
        let template = template.unwrap_or(self.template.as_path());
        Materializer::new(template, output)
            .with_placeholders(self.placeholders.clone())
            .with_main_source_prefix(&self.main_source_prefix)
    }
}
