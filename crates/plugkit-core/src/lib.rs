//! plugkit core - Shared functionality for the plugkit tools
//!
//! Tools for starting and maintaining Dplug audio-plugin projects.

pub mod paths;
pub mod prompt;

pub use paths::Paths;
pub use prompt::Prompter;
