//! Startup orchestration.
//!
//! # Responsibilities
//! - Load the signing key from the environment
//! - Select the RPC endpoint for the process lifetime
//! - Assemble the `WalletService` handed to the HTTP layer
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - The key is checked before the network so a misconfigured deployment
//!   fails without touching any provider

use std::sync::Arc;
use std::time::Duration;

use crate::blockchain::prober::{probe_endpoints, Connector, EndpointCandidate, HttpConnector};
use crate::blockchain::transaction::{parse_address, ExecutorSettings, TxExecutor};
use crate::blockchain::wallet::{Wallet, PRIVATE_KEY_ENV_VAR};
use crate::config::loader::ConfigError;
use crate::config::validation::ValidationError;
use crate::config::GatewayConfig;
use crate::error::StartupError;
use crate::service::WalletService;
use crate::strategies::StrategyCatalogue;

/// Build the service from `config` and `BACKEND_PRIVATE_KEY`, probing the
/// configured endpoints over HTTP.
pub async fn bootstrap(config: &GatewayConfig) -> Result<Arc<WalletService>, StartupError> {
    let key = std::env::var(PRIVATE_KEY_ENV_VAR).ok();
    let wallet = load_wallet(key.as_deref(), config.blockchain.chain_id)?;

    let connector = HttpConnector {
        rpc_timeout: Duration::from_secs(config.blockchain.rpc_timeout_secs),
    };
    bootstrap_with(config, wallet, &connector).await
}

/// Turn the raw key setting into a wallet. Unset and blank are both missing.
pub fn load_wallet(key: Option<&str>, chain_id: u64) -> Result<Wallet, StartupError> {
    Wallet::from_optional_key(key, chain_id)
        .map_err(StartupError::InvalidKey)?
        .ok_or(StartupError::MissingKey)
}

/// Build the service with an already loaded wallet and a given connector.
pub async fn bootstrap_with(
    config: &GatewayConfig,
    wallet: Wallet,
    connector: &dyn Connector,
) -> Result<Arc<WalletService>, StartupError> {
    let contract = parse_address(&config.contract.address).ok_or_else(|| {
        StartupError::Config(ConfigError::Validation(vec![ValidationError::Address {
            field: "contract.address",
            value: config.contract.address.clone(),
        }]))
    })?;

    let address = wallet.address();
    tracing::info!(wallet = %address, contract = %contract, "Wallet loaded");

    if let Some(expected) = config.contract.expected_wallet.as_deref() {
        if parse_address(expected) != Some(address) {
            tracing::warn!(
                wallet = %address,
                expected = %expected,
                "Signing key does not match contract.expected_wallet"
            );
        }
    }

    let candidates: Vec<EndpointCandidate> = config
        .blockchain
        .rpc_urls
        .iter()
        .map(|url| EndpointCandidate::new(url.clone(), config.blockchain.chain_id))
        .collect();

    let connection = probe_endpoints(
        &candidates,
        connector,
        Duration::from_secs(config.blockchain.rpc_timeout_secs),
    )
    .await
    .map_err(StartupError::NoReachableEndpoint)?;

    let executor = TxExecutor::new(
        connection.rpc().clone(),
        wallet,
        ExecutorSettings::from(&config.blockchain),
    );
    let catalogue = StrategyCatalogue::from_config(&config.strategies);

    tracing::info!(
        endpoint = %connection.endpoint(),
        block = connection.block_at_selection(),
        strategies = catalogue.total(),
        "Gateway ready"
    );

    Ok(Arc::new(WalletService::ready(connection, executor, contract, catalogue)))
}
