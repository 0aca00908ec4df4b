//! Standard paths used by plugkit tools

use std::path::PathBuf;

/// Standard plugkit paths
pub struct Paths {
    /// Config directory (~/.config/plugkit)
    pub config: PathBuf,
}

impl Default for Paths {
    fn default() -> Self {
        Self::new()
    }
}

impl Paths {
    pub fn new() -> Self {
        let config = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("~/.config"))
            .join("plugkit");

        Self { config }
    }

    /// Get the config file path for a tool
    pub fn config_file(&self, tool: &str) -> PathBuf {
        self.config.join(format!("{}.toml", tool))
    }
}
