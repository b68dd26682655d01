use crate::config::types::{Config, FileConfig, RawConfig};
use crate::config::validation::validate;
use crate::ConfigResult;
use sha2::{Digest, Sha256};
use std::path::Path;

/// Loads and parses a configuration file from the given path
///
/// The file may leave any setting out; validation happens once every source
/// has been merged, see [`resolve_config`].
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Returns
///
/// * `Ok(FileConfig)` - Successfully parsed configuration file
/// * `Err(ConfigError)` - Failed to read or parse the file
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use shelob::config::load_config;
///
/// let file = load_config(Path::new("shelob.toml")).unwrap();
/// println!("Workers: {:?}", file.crawler.workers);
/// ```
pub fn load_config(path: &Path) -> ConfigResult<FileConfig> {
    let content = std::fs::read_to_string(path)?;
    let config: FileConfig = toml::from_str(&content)?;
    Ok(config)
}

/// Computes a SHA-256 hash of the configuration file content
///
/// Logged at startup so runs made with different settings can be told apart.
///
/// # Returns
///
/// * `Ok(String)` - Hex-encoded SHA-256 hash of the file content
/// * `Err(ConfigError)` - Failed to read the file
pub fn compute_config_hash(path: &Path) -> ConfigResult<String> {
    let content = std::fs::read_to_string(path)?;
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    let result = hasher.finalize();
    Ok(hex::encode(result))
}

/// Loads a configuration file and returns both its content and its hash
pub fn load_config_with_hash(path: &Path) -> ConfigResult<(FileConfig, String)> {
    let config = load_config(path)?;
    let hash = compute_config_hash(path)?;
    Ok((config, hash))
}

/// Merges an optional configuration file with overrides and validates the result
///
/// Values in `overrides` (command line and environment) take precedence over
/// the file, which takes precedence over built-in defaults.
pub fn resolve_config(file: Option<FileConfig>, overrides: RawConfig) -> ConfigResult<Config> {
    let base = file.map(RawConfig::from).unwrap_or_default();
    validate(base.overlay(overrides))
}
