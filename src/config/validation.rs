use crate::config::types::{
    Config, RawConfig, DEFAULT_DOWNLOAD_PATH, DEFAULT_WORKERS, MAX_WORKERS,
};
use crate::{ConfigError, ConfigResult};
use url::Url;

/// Validates merged settings and fills in defaults
pub fn validate(raw: RawConfig) -> ConfigResult<Config> {
    let workers = validate_workers(raw.workers.unwrap_or(DEFAULT_WORKERS))?;

    let base_url = match raw.base_url.as_deref() {
        Some(url) if !url.trim().is_empty() => validate_base_url(url.trim())?,
        _ => return Err(ConfigError::Missing("base URL")),
    };

    let download_path = validate_download_path(
        raw.download_path
            .unwrap_or_else(|| DEFAULT_DOWNLOAD_PATH.to_string()),
    )?;

    Ok(Config {
        workers,
        base_url,
        resume: raw.resume.unwrap_or(false),
        download_path,
        debug: raw.debug.unwrap_or(false),
    })
}

/// Validates the worker count
fn validate_workers(workers: usize) -> ConfigResult<usize> {
    if !(1..=MAX_WORKERS).contains(&workers) {
        return Err(ConfigError::Validation(format!(
            "workers must be between 1 and {}, got {}",
            MAX_WORKERS, workers
        )));
    }

    Ok(workers)
}

/// Validates the base URL: absolute, http(s), with a host
fn validate_base_url(raw: &str) -> ConfigResult<Url> {
    let url = Url::parse(raw)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid base URL '{}': {}", raw, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "Base URL '{}' must use http or https scheme",
            raw
        )));
    }

    if url.host_str().is_none() {
        return Err(ConfigError::InvalidUrl(format!(
            "Base URL '{}' has no host",
            raw
        )));
    }

    Ok(url)
}

/// Validates the download path and normalizes its trailing separator
fn validate_download_path(path: String) -> ConfigResult<String> {
    if path.is_empty() {
        return Err(ConfigError::Missing("download path"));
    }

    if path.ends_with('/') {
        Ok(path)
    } else {
        Ok(format!("{}/", path))
    }
}
