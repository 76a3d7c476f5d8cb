//! Top-level client assembly.

use crate::actions::Marketplace;
use crate::config::ClientConfig;
use crate::consistency::SettlePolicy;
use crate::gateway::NearGateway;
use crate::metadata::{HttpMetadataSource, MetadataCache};
use crate::pinning::PinningClient;
use crate::queries::ListingQueries;
use crate::rpc::RpcClient;
use crate::wallet::Wallet;
use crate::wizard::Wizard;
use near_primitives::types::AccountId;
use std::sync::Arc;
use tracing::info;

/// One fully wired client: RPC with failover, wallet, both contract
/// gateways, pinning, queries, and the metadata cache.
pub struct CanvasClient {
    config: ClientConfig,
    rpc: Arc<RpcClient>,
    wallet: Arc<Wallet>,
    nft_gateway: Arc<NearGateway>,
    market_gateway: Arc<NearGateway>,
    pinning: Arc<PinningClient>,
    marketplace: Marketplace<NearGateway>,
    metadata: MetadataCache<HttpMetadataSource>,
}

impl CanvasClient {
    pub fn new(config: ClientConfig) -> Result<Self, crate::Error> {
        let rpc = Arc::new(RpcClient::new(&config.rpc_url, &config.fallback_rpc_url));
        let wallet = Arc::new(Wallet::load(&config.keys_path)?);

        let marketplace_id: AccountId = config
            .marketplace_contract
            .parse()
            .map_err(|e| crate::Error::Config(format!("invalid marketplace contract: {e}")))?;
        let nft_id: AccountId = config
            .nft_contract
            .parse()
            .map_err(|e| crate::Error::Config(format!("invalid nft contract: {e}")))?;

        let nft_gateway = Arc::new(NearGateway::new(
            Arc::clone(&rpc),
            Arc::clone(&wallet),
            nft_id,
            config.gas_tgas,
        ));
        let market_gateway = Arc::new(NearGateway::new(
            Arc::clone(&rpc),
            Arc::clone(&wallet),
            marketplace_id,
            config.gas_tgas,
        ));

        let queries = ListingQueries::new(Arc::clone(&market_gateway));
        let marketplace = Marketplace::new(
            Arc::clone(&market_gateway),
            queries,
            wallet.account_id().to_string(),
            config.listing_deposit.0,
            SettlePolicy::from_config(&config.settle),
        );

        let pinning = Arc::new(PinningClient::new(&config.pinning));
        let metadata = MetadataCache::new(HttpMetadataSource::new());

        info!(
            account = %wallet.account_id(),
            marketplace = %config.marketplace_contract,
            nft = %config.nft_contract,
            "Canvas client ready"
        );

        Ok(Self {
            config,
            rpc,
            wallet,
            nft_gateway,
            market_gateway,
            pinning,
            marketplace,
            metadata,
        })
    }

    /// A fresh creation wizard with an empty draft. The wizard owns its
    /// draft; drop it to abandon the session.
    pub fn wizard(&self) -> Wizard<NearGateway, PinningClient> {
        Wizard::new(
            Arc::clone(&self.nft_gateway),
            Arc::clone(&self.market_gateway),
            Arc::clone(&self.pinning),
            &self.config,
        )
    }

    pub fn marketplace(&self) -> &Marketplace<NearGateway> {
        &self.marketplace
    }

    pub fn queries(&self) -> &ListingQueries<NearGateway> {
        self.marketplace.queries()
    }

    pub fn metadata(&self) -> &MetadataCache<HttpMetadataSource> {
        &self.metadata
    }

    pub fn pinning(&self) -> &PinningClient {
        &self.pinning
    }

    pub fn account_id(&self) -> String {
        self.wallet.account_id().to_string()
    }

    /// RPC reachability: "ok", "degraded", or an error.
    pub async fn health(&self) -> Result<&'static str, crate::Error> {
        self.rpc.health_check().await
    }
}
