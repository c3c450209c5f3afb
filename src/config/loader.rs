//! Configuration loading from disk and the environment.

use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::config::schema::GatewayConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Infura mainnet endpoint, completed with `INFURA_PROJECT_ID`.
const INFURA_MAINNET: &str = "https://mainnet.infura.io/v3/";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid environment variable {name}: {reason}")]
    Env { name: &'static str, reason: String },

    #[error("Validation failed: {}", join(.0))]
    Validation(Vec<ValidationError>),
}

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load configuration: file (if any), then environment overrides, then validation.
pub fn load_config(path: Option<&Path>) -> Result<GatewayConfig, ConfigError> {
    load_config_with(path, |name| std::env::var(name).ok())
}

/// [`load_config`] with an explicit environment lookup.
pub fn load_config_with<F>(path: Option<&Path>, lookup: F) -> Result<GatewayConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = match path {
        Some(path) => {
            let content = fs::read_to_string(path)?;
            toml::from_str(&content)?
        }
        None => GatewayConfig::default(),
    };

    apply_env_overrides(&mut config, lookup)?;
    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Overlay environment variables onto `config`.
///
/// `lookup` is injected so tests do not have to mutate the process environment.
pub fn apply_env_overrides<F>(config: &mut GatewayConfig, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

    if let Some(port) = get("PORT") {
        let port: u16 = port.trim().parse().map_err(|_| ConfigError::Env {
            name: "PORT",
            reason: format!("'{}' is not a port number", port),
        })?;
        let host = config
            .listener
            .bind_address
            .rsplit_once(':')
            .map(|(host, _)| host.to_string())
            .unwrap_or_else(|| "0.0.0.0".to_string());
        config.listener.bind_address = format!("{}:{}", host, port);
    }

    if let Some(urls) = get("RPC_URLS") {
        config.blockchain.rpc_urls = urls
            .split(',')
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .map(str::to_string)
            .collect();
    }

    if let Some(project_id) = get("INFURA_PROJECT_ID") {
        let url = format!("{}{}", INFURA_MAINNET, project_id.trim());
        if !config.blockchain.rpc_urls.contains(&url) {
            config.blockchain.rpc_urls.insert(0, url);
        }
    }

    if let Some(chain_id) = get("CHAIN_ID") {
        config.blockchain.chain_id = chain_id.trim().parse().map_err(|_| ConfigError::Env {
            name: "CHAIN_ID",
            reason: format!("'{}' is not an integer", chain_id),
        })?;
    }

    if let Some(address) = get("CONTRACT_ADDRESS") {
        config.contract.address = address.trim().to_string();
    }

    if let Some(level) = get("LOG_LEVEL") {
        config.observability.log_level = level;
    }

    Ok(())
}
