//! The creation wizard: Create → Approve → List.
//!
//! Three strictly sequential steps, each gated on the confirmed success of
//! the previous one. The wizard owns the draft for its whole lifetime and
//! is dropped with it; nothing here persists across sessions.
//!
//! Failure semantics: any rejected upload or contract call leaves the step
//! unchanged, releases the in-flight latch, and returns the error — retry
//! re-runs the same step. A mint whose receipt carries no decodable mint
//! event is the one non-retryable case: the token exists on-chain but its
//! id is unknown, surfaced as `Error::MintNotRecovered`.

use crate::config::ClientConfig;
use crate::gateway::ContractGateway;
use crate::pinning::{PinningGateway, UploadedFile};
use canvas_types::{mint_token_id, Draft, U128};
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WizardStep {
    Create,
    Approve,
    List,
}

/// Confirmed mint: the pinned metadata and the recovered token id.
#[derive(Debug, Clone)]
pub struct MintReceipt {
    pub token_id: u64,
    pub tx_hash: String,
    pub metadata_cid: String,
    pub token_uri: String,
}

/// Confirmed listing. Terminal for the wizard.
#[derive(Debug, Clone)]
pub struct ListingReceipt {
    pub tx_hash: String,
    pub token_id: u64,
    pub price: U128,
}

pub struct Wizard<G, P> {
    draft: Draft,
    step: WizardStep,
    in_flight: bool,
    completed: bool,
    nft: Arc<G>,
    market: Arc<G>,
    pinning: Arc<P>,
    marketplace_id: String,
    mint_deposit: u128,
    approval_deposit: u128,
    listing_deposit: u128,
}

impl<G: ContractGateway, P: PinningGateway> Wizard<G, P> {
    pub fn new(nft: Arc<G>, market: Arc<G>, pinning: Arc<P>, config: &ClientConfig) -> Self {
        Self {
            draft: Draft::new(),
            step: WizardStep::Create,
            in_flight: false,
            completed: false,
            nft,
            market,
            pinning,
            marketplace_id: config.marketplace_contract.clone(),
            mint_deposit: config.mint_deposit.0,
            approval_deposit: config.approval_deposit.0,
            listing_deposit: config.listing_deposit.0,
        }
    }

    pub fn step(&self) -> WizardStep {
        self.step
    }

    pub fn is_complete(&self) -> bool {
        self.completed
    }

    pub fn draft(&self) -> &Draft {
        &self.draft
    }

    pub fn draft_mut(&mut self) -> &mut Draft {
        &mut self.draft
    }

    /// Point the draft's image at a freshly pinned file: primary gateway
    /// for the image URI, secondary for the fallback.
    pub fn set_image_from_upload(&mut self, file: &UploadedFile) {
        let image = self.pinning.gateway_url(&file.cid);
        let fallback = self.pinning.fallback_gateway_url(&file.cid);
        self.draft.set_image(image);
        self.draft.set_fallback_image(fallback);
    }

    /// Create step: validate, pin metadata, mint, recover the token id
    /// from the receipt. Advances to Approve on success.
    pub async fn submit_create(&mut self) -> Result<MintReceipt, crate::Error> {
        self.ensure_ready(WizardStep::Create)?;

        let missing = self.draft.missing_required();
        if !missing.is_empty() {
            return Err(crate::Error::Validation(format!(
                "missing required fields: {}",
                missing.join(", ")
            )));
        }
        let details = self.draft.full_details();

        self.in_flight = true;
        let result = async {
            let cid = self.pinning.upload_json(&details).await?;
            let token_uri = self.pinning.gateway_url(&cid);

            let outcome = self
                .nft
                .write(
                    "mint",
                    serde_json::json!({ "token_uri": token_uri }),
                    self.mint_deposit,
                )
                .await?;
            if let Some(reason) = &outcome.failure {
                return Err(crate::Error::TxFailed(reason.clone()));
            }

            let token_id = mint_token_id(&outcome.logs).ok_or_else(|| {
                crate::Error::MintNotRecovered(format!(
                    "receipt {} carried no decodable mint event",
                    outcome.tx_hash
                ))
            })?;

            Ok(MintReceipt {
                token_id,
                tx_hash: outcome.tx_hash,
                metadata_cid: cid,
                token_uri,
            })
        }
        .await;
        self.in_flight = false;

        match result {
            Ok(receipt) => {
                self.draft.set_token_id(receipt.token_id);
                self.step = WizardStep::Approve;
                info!(token_id = receipt.token_id, tx_hash = %receipt.tx_hash, "Mint confirmed");
                Ok(receipt)
            }
            Err(e) => {
                warn!(error = %e, "Create step failed");
                Err(e)
            }
        }
    }

    /// Approve step: grant the marketplace transfer rights over the minted
    /// token. Advances to List on success.
    pub async fn submit_approve(&mut self) -> Result<String, crate::Error> {
        self.ensure_ready(WizardStep::Approve)?;
        let token_id = self.token_id()?;

        self.in_flight = true;
        let result = async {
            let outcome = self
                .nft
                .write(
                    "approve",
                    serde_json::json!({
                        "token_id": token_id,
                        "account_id": self.marketplace_id,
                    }),
                    self.approval_deposit,
                )
                .await?;
            if let Some(reason) = &outcome.failure {
                return Err(crate::Error::TxFailed(reason.clone()));
            }
            Ok(outcome.tx_hash)
        }
        .await;
        self.in_flight = false;

        match result {
            Ok(tx_hash) => {
                self.step = WizardStep::List;
                info!(token_id, tx_hash = %tx_hash, "Marketplace approved as spender");
                Ok(tx_hash)
            }
            Err(e) => {
                warn!(error = %e, "Approve step failed");
                Err(e)
            }
        }
    }

    /// List step: put the token up for sale. Terminal — the confirmation
    /// is reported but the wizard does not advance further.
    pub async fn submit_list(&mut self, price: U128) -> Result<ListingReceipt, crate::Error> {
        self.ensure_ready(WizardStep::List)?;
        let token_id = self.token_id()?;
        if price.0 == 0 {
            return Err(crate::Error::Validation(
                "price must be greater than 0".into(),
            ));
        }

        self.in_flight = true;
        let result = async {
            let outcome = self
                .market
                .write(
                    "list_for_sale",
                    serde_json::json!({ "token_id": token_id, "price": price }),
                    self.listing_deposit,
                )
                .await?;
            if let Some(reason) = &outcome.failure {
                return Err(crate::Error::TxFailed(reason.clone()));
            }
            Ok(outcome.tx_hash)
        }
        .await;
        self.in_flight = false;

        match result {
            Ok(tx_hash) => {
                self.completed = true;
                info!(token_id, tx_hash = %tx_hash, price = %price, "Listing confirmed");
                Ok(ListingReceipt {
                    tx_hash,
                    token_id,
                    price,
                })
            }
            Err(e) => {
                warn!(error = %e, "List step failed");
                Err(e)
            }
        }
    }

    fn ensure_ready(&self, expected: WizardStep) -> Result<(), crate::Error> {
        if self.in_flight {
            return Err(crate::Error::Validation(
                "another submission is in flight".into(),
            ));
        }
        if self.completed {
            return Err(crate::Error::Validation(
                "wizard already completed".into(),
            ));
        }
        if self.step != expected {
            return Err(crate::Error::Validation(format!(
                "step out of order: expected {:?}, wizard is at {:?}",
                expected, self.step
            )));
        }
        Ok(())
    }

    fn token_id(&self) -> Result<u64, crate::Error> {
        self.draft
            .token_id()
            .ok_or_else(|| crate::Error::Validation("no minted token id in draft".into()))
    }
}
