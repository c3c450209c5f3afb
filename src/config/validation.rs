//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, gas settings sane)
//! - Check every RPC candidate and the contract address parse
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GatewayConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;
use thiserror::Error;

use crate::blockchain::transaction::{parse_address, TRANSFER_GAS};
use crate::config::schema::GatewayConfig;

/// RPC calls a withdrawal makes before it starts waiting: nonce, gas price,
/// head block, broadcast.
const PRE_CONFIRMATION_RPC_CALLS: u64 = 4;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("listener.bind_address '{0}' is not a socket address")]
    BindAddress(String),

    #[error("blockchain.rpc_urls is empty")]
    NoEndpoints,

    #[error("blockchain.rpc_urls[{index}] is not an http(s) URL")]
    EndpointUrl { index: usize },

    #[error("blockchain.chain_id must be positive")]
    ChainId,

    #[error("{0} must be greater than zero")]
    Zero(&'static str),

    #[error("blockchain.gas_limit {0} is below the 21000 needed for a transfer")]
    GasLimit(u64),

    #[error("blockchain.gas_price_multiplier {0} is outside (0, 10]")]
    GasMultiplier(f64),

    /// The withdrawal path makes up to four RPC calls before the
    /// confirmation wait starts, each bounded by the RPC timeout.
    #[error("timeouts.request_secs must exceed {required} (confirmation_timeout_secs + 4 * rpc_timeout_secs)")]
    RequestShorterThanConfirmation { required: u64 },

    #[error("{field} '{value}' is not an address")]
    Address { field: &'static str, value: String },
}

/// Validate a loaded configuration, collecting every problem.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();
    let chain = &config.blockchain;

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::BindAddress(config.listener.bind_address.clone()));
    }

    if chain.rpc_urls.is_empty() {
        errors.push(ValidationError::NoEndpoints);
    }
    for (index, raw) in chain.rpc_urls.iter().enumerate() {
        let ok = url::Url::parse(raw)
            .map(|u| matches!(u.scheme(), "http" | "https") && u.has_host())
            .unwrap_or(false);
        if !ok {
            // The URL itself may embed an API key, so only the index is reported.
            errors.push(ValidationError::EndpointUrl { index });
        }
    }

    if chain.chain_id == 0 {
        errors.push(ValidationError::ChainId);
    }

    for (name, value) in [
        ("blockchain.rpc_timeout_secs", chain.rpc_timeout_secs),
        ("blockchain.confirmation_timeout_secs", chain.confirmation_timeout_secs),
        ("blockchain.poll_interval_ms", chain.poll_interval_ms),
        ("blockchain.max_gas_price_gwei", chain.max_gas_price_gwei),
        ("timeouts.request_secs", config.timeouts.request_secs),
    ] {
        if value == 0 {
            errors.push(ValidationError::Zero(name));
        }
    }

    if chain.gas_limit < TRANSFER_GAS {
        errors.push(ValidationError::GasLimit(chain.gas_limit));
    }

    let multiplier = chain.gas_price_multiplier;
    if !(multiplier > 0.0 && multiplier <= 10.0) {
        errors.push(ValidationError::GasMultiplier(multiplier));
    }

    let required = chain
        .confirmation_timeout_secs
        .saturating_add(chain.rpc_timeout_secs.saturating_mul(PRE_CONFIRMATION_RPC_CALLS));
    if config.timeouts.request_secs <= required {
        errors.push(ValidationError::RequestShorterThanConfirmation { required });
    }

    if parse_address(&config.contract.address).is_none() {
        errors.push(ValidationError::Address {
            field: "contract.address",
            value: config.contract.address.clone(),
        });
    }
    if let Some(expected) = &config.contract.expected_wallet {
        if parse_address(expected).is_none() {
            errors.push(ValidationError::Address {
                field: "contract.expected_wallet",
                value: expected.clone(),
            });
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert_eq!(validate_config(&GatewayConfig::default()), Ok(()));
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = GatewayConfig::default();
        config.listener.bind_address = "nowhere".into();
        config.blockchain.rpc_urls = vec!["https://ok.example".into(), "mailto:x@y".into()];
        config.blockchain.gas_limit = 20_000;
        config.blockchain.gas_price_multiplier = f64::NAN;
        config.contract.address = "0x1234".into();

        let errors = validate_config(&config).unwrap_err();
        assert!(errors.contains(&ValidationError::BindAddress("nowhere".into())));
        assert!(errors.contains(&ValidationError::EndpointUrl { index: 1 }));
        assert!(errors.contains(&ValidationError::GasLimit(20_000)));
        assert!(errors.iter().any(|e| matches!(e, ValidationError::GasMultiplier(_))));
        assert!(errors.iter().any(|e| matches!(e, ValidationError::Address { .. })));
        assert_eq!(errors.len(), 5);
    }

    #[test]
    fn test_empty_endpoint_list() {
        let mut config = GatewayConfig::default();
        config.blockchain.rpc_urls.clear();
        assert_eq!(validate_config(&config), Err(vec![ValidationError::NoEndpoints]));
    }

    #[test]
    fn test_request_timeout_must_cover_confirmation() {
        let mut config = GatewayConfig::default();
        config.timeouts.request_secs = 60;
        assert_eq!(
            validate_config(&config),
            Err(vec![ValidationError::RequestShorterThanConfirmation { required: 220 }])
        );
    }

    #[test]
    fn test_request_timeout_needs_rpc_headroom() {
        let mut config = GatewayConfig::default();
        config.timeouts.request_secs = 181;
        assert_eq!(
            validate_config(&config),
            Err(vec![ValidationError::RequestShorterThanConfirmation { required: 220 }])
        );

        config.timeouts.request_secs = 221;
        assert_eq!(validate_config(&config), Ok(()));
    }

    #[test]
    fn test_endpoint_error_hides_url() {
        let err = ValidationError::EndpointUrl { index: 0 };
        assert_eq!(err.to_string(), "blockchain.rpc_urls[0] is not an http(s) URL");
    }
}
