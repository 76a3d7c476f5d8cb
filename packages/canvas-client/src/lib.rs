//! # CryptoCanvas Client
//!
//! Headless client for the CryptoCanvas marketplace: the creation wizard
//! (upload → mint → approve → list), the listing query layer, and the
//! token-metadata cache. All state-transition logic lives in the external
//! contract; this crate orchestrates calls and mirrors reads.
//!
//! ## Quick Start
//! ```no_run
//! # async fn run() -> Result<(), canvas_client::Error> {
//! let config = canvas_client::ClientConfig::load()?;
//! let client = canvas_client::CanvasClient::new(config)?;
//! let listings = client.marketplace().queries().all_listings().await?;
//! # Ok(()) }
//! ```

pub mod actions;
pub mod client;
pub mod config;
pub mod consistency;
mod error;
pub mod gateway;
pub mod metadata;
pub mod metrics;
pub mod pinning;
pub mod queries;
pub mod rpc;
pub mod wallet;
pub mod wizard;

pub use actions::Marketplace;
pub use client::CanvasClient;
pub use config::{ClientConfig, PinningConfig, SettleConfig};
pub use consistency::SettlePolicy;
pub use error::Error;
pub use gateway::{ContractGateway, NearGateway, TxOutcome};
pub use metadata::{HttpMetadataSource, MetadataCache, MetadataSource};
pub use pinning::{PinningClient, PinningGateway, UploadedFile};
pub use queries::ListingQueries;
pub use wizard::{ListingReceipt, MintReceipt, Wizard, WizardStep};

/// Install a tracing subscriber honoring `RUST_LOG`. Call once per process.
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .try_init();
}
