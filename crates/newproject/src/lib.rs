//! newproject - Start a Dplug plugin from the example template
//!
//! Copies the example plugin directory under a new name, renames its main
//! source file and swaps the example's vendor and plugin identifiers for
//! your own in the source, `plugin.json` and `dub.json`.

pub mod config;
pub mod error;
pub mod identity;
pub mod materialize;
pub mod substitution;

pub use config::Config;
pub use error::MaterializeError;
pub use identity::{Field, PluginIdentity};
pub use materialize::{MaterializeReport, Materializer, Plan};
pub use substitution::{Placeholders, Substitutions};
