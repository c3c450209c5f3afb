//! Static strategy catalogue.
//!
//! Display-only data: entries are listed by the API and never executed.

use serde::{Deserialize, Serialize};

/// One catalogue entry.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Strategy {
    pub name: String,
    /// Advertised APY in whole percent.
    pub apy: u32,
    pub protocol: String,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

/// Response body for `GET /strategies`.
#[derive(Debug, Clone, Serialize)]
pub struct StrategyListing {
    pub total: usize,
    pub active: usize,
    pub strategies: Vec<Strategy>,
}

/// Immutable catalogue shared by all requests.
#[derive(Debug, Clone)]
pub struct StrategyCatalogue {
    entries: Vec<Strategy>,
}

impl StrategyCatalogue {
    pub fn new(entries: Vec<Strategy>) -> Self {
        Self { entries }
    }

    /// Use `configured` if non-empty, else the built-in list.
    pub fn from_config(configured: &[Strategy]) -> Self {
        if configured.is_empty() {
            Self::default()
        } else {
            Self::new(configured.to_vec())
        }
    }

    pub fn total(&self) -> usize {
        self.entries.len()
    }

    pub fn active_count(&self) -> usize {
        self.entries.iter().filter(|s| s.active).count()
    }

    pub fn listing(&self) -> StrategyListing {
        StrategyListing {
            total: self.total(),
            active: self.active_count(),
            strategies: self.entries.clone(),
        }
    }
}

impl Default for StrategyCatalogue {
    fn default() -> Self {
        let entry = |name: &str, apy, protocol: &str| Strategy {
            name: name.to_string(),
            apy,
            protocol: protocol.to_string(),
            active: true,
        };

        Self::new(vec![
            entry("Uniswap V3 WETH/USDC", 245, "Uniswap"),
            entry("Aave V3 ETH Supply", 189, "Aave"),
            entry("Curve TriCrypto", 312, "Curve"),
        ])
    }
}
