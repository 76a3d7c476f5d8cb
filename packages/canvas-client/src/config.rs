//! Client configuration.
//!
//! Loaded from an optional `canvas-client.toml` plus `CANVAS_*` environment
//! overrides (nested fields via `__`, e.g. `CANVAS_PINNING__GATEWAY`).

use crate::error::Error;
use canvas_types::U128;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct ClientConfig {
    #[serde(default = "defaults::rpc_url")]
    pub rpc_url: String,

    #[serde(default = "defaults::fallback_rpc_url")]
    pub fallback_rpc_url: String,

    /// Marketplace contract: listings, buys, cancels, relists.
    #[serde(default = "defaults::marketplace_contract")]
    pub marketplace_contract: String,

    /// NFT contract: mint and approval.
    #[serde(default = "defaults::nft_contract")]
    pub nft_contract: String,

    #[serde(default = "defaults::keys_path")]
    pub keys_path: String,

    #[serde(default = "defaults::gas_tgas")]
    pub gas_tgas: u64,

    /// Storage deposit attached to `mint`.
    #[serde(default = "defaults::mint_deposit")]
    pub mint_deposit: U128,

    /// Storage deposit attached to `approve`.
    #[serde(default = "defaults::approval_deposit")]
    pub approval_deposit: U128,

    /// Deposit attached to `list_for_sale` and `relist`.
    #[serde(default = "defaults::listing_deposit")]
    pub listing_deposit: U128,

    #[serde(default)]
    pub pinning: PinningConfig,

    #[serde(default)]
    pub settle: SettleConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PinningConfig {
    /// Base URL of the pinning proxy (signed upload URLs, JSON pinning,
    /// deletes). The JWT stays server-side behind this proxy.
    #[serde(default = "defaults::pinning_api_base")]
    pub api_base: String,

    /// Primary public gateway for resolving CIDs.
    #[serde(default = "defaults::pinning_gateway")]
    pub gateway: String,

    /// Secondary gateway used for the fallback image URI.
    #[serde(default = "defaults::pinning_fallback_gateway")]
    pub fallback_gateway: String,
}

/// Read-after-write consistency policy. The external indexing layer lags
/// writes by an unspecified bound; these knobs replace hard-coded waits.
#[derive(Debug, Clone, Deserialize)]
pub struct SettleConfig {
    /// Upper bound on tolerated indexing lag per refetch round (ms).
    #[serde(default = "defaults::settle_delay_ms")]
    pub settle_delay_ms: u64,

    /// Base delay for exponential backoff between refetches (ms).
    #[serde(default = "defaults::base_delay_ms")]
    pub base_delay_ms: u64,

    /// Refetch attempts after the initial read.
    #[serde(default = "defaults::max_retries")]
    pub max_retries: u32,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            rpc_url: defaults::rpc_url(),
            fallback_rpc_url: defaults::fallback_rpc_url(),
            marketplace_contract: defaults::marketplace_contract(),
            nft_contract: defaults::nft_contract(),
            keys_path: defaults::keys_path(),
            gas_tgas: defaults::gas_tgas(),
            mint_deposit: defaults::mint_deposit(),
            approval_deposit: defaults::approval_deposit(),
            listing_deposit: defaults::listing_deposit(),
            pinning: PinningConfig::default(),
            settle: SettleConfig::default(),
        }
    }
}

impl Default for PinningConfig {
    fn default() -> Self {
        Self {
            api_base: defaults::pinning_api_base(),
            gateway: defaults::pinning_gateway(),
            fallback_gateway: defaults::pinning_fallback_gateway(),
        }
    }
}

impl Default for SettleConfig {
    fn default() -> Self {
        Self {
            settle_delay_ms: defaults::settle_delay_ms(),
            base_delay_ms: defaults::base_delay_ms(),
            max_retries: defaults::max_retries(),
        }
    }
}

impl ClientConfig {
    /// Load from `canvas-client.toml` (optional) and `CANVAS_*` env vars.
    pub fn load() -> Result<Self, Error> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name("canvas-client").required(false))
            .add_source(config::Environment::with_prefix("CANVAS").separator("__"))
            .build()
            .map_err(|e| Error::Config(format!("failed to read configuration: {e}")))?;
        settings
            .try_deserialize()
            .map_err(|e| Error::Config(format!("invalid configuration: {e}")))
    }
}

mod defaults {
    use canvas_types::U128;

    fn network() -> String {
        std::env::var("CANVAS_NETWORK")
            .or_else(|_| std::env::var("NEAR_NETWORK"))
            .unwrap_or_else(|_| "testnet".into())
    }

    pub fn rpc_url() -> String {
        if let Ok(url) = std::env::var("CANVAS_RPC_URL") {
            if !url.is_empty() {
                return url;
            }
        }
        if network().contains("mainnet") {
            "https://near.lava.build".into()
        } else {
            "https://neart.lava.build".into()
        }
    }

    pub fn fallback_rpc_url() -> String {
        if network().contains("mainnet") {
            "https://free.rpc.fastnear.com".into()
        } else {
            "https://test.rpc.fastnear.com".into()
        }
    }

    pub fn marketplace_contract() -> String {
        "market.cryptocanvas.testnet".into()
    }

    pub fn nft_contract() -> String {
        "nft.cryptocanvas.testnet".into()
    }

    pub fn keys_path() -> String {
        "./account_keys/cryptocanvas.testnet.json".into()
    }

    pub fn gas_tgas() -> u64 {
        100
    }

    // 0.01 display units: covers token + metadata storage on mint.
    pub fn mint_deposit() -> U128 {
        U128(10_000_000_000_000_000_000_000)
    }

    // Approval storage per NEP-178.
    pub fn approval_deposit() -> U128 {
        U128(800_000_000_000_000_000_000)
    }

    // Listings require at least one yocto attached.
    pub fn listing_deposit() -> U128 {
        U128(1)
    }

    pub fn pinning_api_base() -> String {
        "https://pin.cryptocanvas.app/api".into()
    }

    pub fn pinning_gateway() -> String {
        "https://ipfs.io".into()
    }

    pub fn pinning_fallback_gateway() -> String {
        "https://gateway.pinata.cloud".into()
    }

    pub fn settle_delay_ms() -> u64 {
        3_000
    }

    pub fn base_delay_ms() -> u64 {
        200
    }

    pub fn max_retries() -> u32 {
        3
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_complete() {
        let config = ClientConfig::default();
        assert!(config.rpc_url.starts_with("https://"));
        assert_ne!(config.rpc_url, config.fallback_rpc_url);
        assert_eq!(config.settle.settle_delay_ms, 3_000);
        assert_eq!(config.listing_deposit, U128(1));
    }

    #[test]
    fn partial_toml_fills_in_defaults() {
        let config: ClientConfig = serde_json::from_value(serde_json::json!({
            "marketplace_contract": "market.cryptocanvas.near",
            "settle": { "max_retries": 5 },
        }))
        .unwrap();
        assert_eq!(config.marketplace_contract, "market.cryptocanvas.near");
        assert_eq!(config.settle.max_retries, 5);
        assert_eq!(config.settle.base_delay_ms, 200);
        assert_eq!(config.nft_contract, defaults::nft_contract());
    }
}
