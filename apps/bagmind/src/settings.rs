//! # Settings
//!
//! TOML configuration files for the reasoner. Keys use the camelCase option
//! names; anything left out takes its default:
//!
//! ```toml
//! conceptCapacity = 256
//! randomSeed = 42
//!
//! [forgetDurations]
//! concept = 3.0
//! ```

use bagmind_core::{MindError, ReasonerConfig};
use std::path::Path;

/// Maximum config file size (1 MB).
const MAX_CONFIG_FILE_SIZE: u64 = 1024 * 1024;

/// Load and validate a configuration file.
pub fn load_config(path: &Path) -> Result<ReasonerConfig, MindError> {
    let metadata = std::fs::metadata(path)
        .map_err(|e| MindError::Io(format!("cannot read '{}': {e}", path.display())))?;
    if metadata.len() > MAX_CONFIG_FILE_SIZE {
        return Err(MindError::Io(format!(
            "config file too large: {} bytes (max {MAX_CONFIG_FILE_SIZE})",
            metadata.len()
        )));
    }

    let text = std::fs::read_to_string(path)
        .map_err(|e| MindError::Io(format!("cannot read '{}': {e}", path.display())))?;
    parse_config(&text)
}

/// Parse and validate configuration text.
pub fn parse_config(text: &str) -> Result<ReasonerConfig, MindError> {
    let config: ReasonerConfig =
        toml::from_str(text).map_err(|e| MindError::Config(e.to_string()))?;
    config.validate()?;
    Ok(config)
}

/// Render a configuration as TOML.
pub fn to_toml(config: &ReasonerConfig) -> Result<String, MindError> {
    toml::to_string(config).map_err(|e| MindError::Serialization(e.to_string()))
}

/// The configuration a command runs with.
///
/// Starts from `path` if given, else from the default or micro preset,
/// then applies a seed override.
pub fn effective_config(
    path: Option<&Path>,
    micro: bool,
    seed: Option<u64>,
) -> Result<ReasonerConfig, MindError> {
    let mut config = match path {
        Some(p) => load_config(p)?,
        None if micro => ReasonerConfig::micro(),
        None => ReasonerConfig::default(),
    };
    if let Some(seed) = seed {
        config.random_seed = seed;
    }
    Ok(config)
}
