//! Parsing and validation of `strata.toml` rebasing configuration.
//!
//! Every setting has a default, so a missing file section is never an error;
//! only malformed TOML or out-of-range values are rejected.

#![warn(missing_docs)]

pub mod error;
pub mod loader;
pub mod types;

pub use error::ConfigError;
pub use loader::{load_config, load_config_from_str, CONFIG_FILE_NAME};
pub use types::*;
