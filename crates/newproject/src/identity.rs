//! Identifiers chosen for the new plugin

use anyhow::{bail, Result};
use serde::Serialize;
use tracing::warn;

use crate::error::MaterializeError;

/// One of the rewritable identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    VendorName,
    VendorId,
    PluginName,
    PluginId,
    BundleId,
}

impl Field {
    /// Every field, in replacement order
    pub const ALL: [Field; 5] = [
        Field::VendorName,
        Field::VendorId,
        Field::PluginName,
        Field::PluginId,
        Field::BundleId,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Self::VendorName => "vendor name",
            Self::VendorId => "vendor id",
            Self::PluginName => "plugin name",
            Self::PluginId => "plugin id",
            Self::BundleId => "bundle identifier",
        }
    }
}

/// User-supplied identity of the plugin being created
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PluginIdentity {
    pub vendor_name: String,
    pub vendor_id: String,
    pub plugin_name: String,
    pub plugin_id: String,
    pub bundle_id: String,
    pub is_synth: bool,
    pub receives_midi: bool,
}

impl PluginIdentity {
    /// Value supplied for a field
    pub fn value(&self, field: Field) -> &str {
        match field {
            Field::VendorName => &self.vendor_name,
            Field::VendorId => &self.vendor_id,
            Field::PluginName => &self.plugin_name,
            Field::PluginId => &self.plugin_id,
            Field::BundleId => &self.bundle_id,
        }
    }

    /// Copy with surrounding whitespace removed from every value
    pub fn trimmed(&self) -> Self {
        Self {
            vendor_name: self.vendor_name.trim().to_string(),
            vendor_id: self.vendor_id.trim().to_string(),
            plugin_name: self.plugin_name.trim().to_string(),
            plugin_id: self.plugin_id.trim().to_string(),
            bundle_id: self.bundle_id.trim().to_string(),
            ..*self
        }
    }

    /// Directory name for the new project: the plugin name with spaces as underscores
    pub fn destination_name(&self) -> String {
        self.plugin_name.replace(' ', "_")
    }

    /// Reject names that cannot become a single directory
    ///
    /// Four-character codes are what Dplug expects for vendor and plugin ids,
    /// but other lengths are only warned about.
    pub fn validate(&self) -> Result<()> {
        let name = self.destination_name();

        if name.is_empty() {
            bail!(MaterializeError::InvalidPluginName(
                "name cannot be empty".to_string()
            ));
        }
        if name.contains('/') || name.contains('\\') {
            bail!(MaterializeError::InvalidPluginName(format!(
                "'{}' contains a path separator",
                self.plugin_name
            )));
        }
        if name == "." || name == ".." {
            bail!(MaterializeError::InvalidPluginName(format!(
                "'{}' is not a usable directory name",
                self.plugin_name
            )));
        }

        for field in [Field::VendorId, Field::PluginId] {
            let value = self.value(field);
            if value.len() != 4 || !value.is_ascii() {
                warn!(
                    "{} '{}' is not a four-character code",
                    field.label(),
                    value
                );
            }
        }

        Ok(())
    }
}
