//! Marketplace mutating flows: buy, cancel, relist.
//!
//! Every flow follows the same read-after-write contract: send the write,
//! wait for its receipt (the gateway does), invalidate the affected query
//! collections, then refetch through the settle policy until the expected
//! post-state shows up in the views.

use crate::consistency::{refetch_settled, SettlePolicy};
use crate::gateway::{ContractGateway, TxOutcome};
use crate::queries::{
    ListingQueries, GET_ALL_LISTINGS, GET_LISTING, GET_SELLER_ACTIVE_LISTINGS,
    GET_SELLER_INACTIVE_LISTINGS, GET_USER_PURCHASES,
};
use canvas_types::U128;
use std::sync::Arc;
use tracing::info;

pub struct Marketplace<G> {
    gateway: Arc<G>,
    queries: ListingQueries<G>,
    /// The signing account, used for seller/buyer-scoped settle checks.
    account_id: String,
    listing_deposit: u128,
    settle: SettlePolicy,
}

impl<G: ContractGateway> Marketplace<G> {
    pub fn new(
        gateway: Arc<G>,
        queries: ListingQueries<G>,
        account_id: String,
        listing_deposit: u128,
        settle: SettlePolicy,
    ) -> Self {
        Self {
            gateway,
            queries,
            account_id,
            listing_deposit,
            settle,
        }
    }

    pub fn queries(&self) -> &ListingQueries<G> {
        &self.queries
    }

    /// Buy a listing, attaching its price as the deposit. Settles when the
    /// purchase appears in the buyer's purchase history.
    pub async fn buy(&self, listing_id: u64, price: U128) -> Result<TxOutcome, crate::Error> {
        let outcome = self
            .write_checked("buy", serde_json::json!({ "listing_id": listing_id }), price.0)
            .await?;

        self.invalidate_after_mutation();
        let queries = self.queries.clone();
        let account = self.account_id.clone();
        refetch_settled(
            &self.settle,
            move || {
                queries.invalidate(GET_USER_PURCHASES);
                let queries = queries.clone();
                let account = account.clone();
                async move { queries.user_purchases(&account).await }
            },
            |purchases| purchases.iter().any(|l| l.listing_id == listing_id),
        )
        .await?;
        info!(listing_id, "Purchase settled");
        Ok(outcome)
    }

    /// Cancel an active listing. Settles when the listing id no longer
    /// appears in the active collection.
    pub async fn cancel_listing(&self, listing_id: u64) -> Result<TxOutcome, crate::Error> {
        let outcome = self
            .write_checked(
                "cancel_listing",
                serde_json::json!({ "listing_id": listing_id }),
                1,
            )
            .await?;

        self.invalidate_after_mutation();
        let queries = self.queries.clone();
        refetch_settled(
            &self.settle,
            move || {
                queries.invalidate(GET_ALL_LISTINGS);
                let queries = queries.clone();
                async move { queries.all_listings().await }
            },
            |listings| !listings.iter().any(|l| l.listing_id == listing_id),
        )
        .await?;
        info!(listing_id, "Cancellation settled");
        Ok(outcome)
    }

    /// Relist a previously purchased NFT at a new price. Settles when an
    /// active listing at that price appears under the seller.
    pub async fn relist(&self, listing_id: u64, price: U128) -> Result<TxOutcome, crate::Error> {
        let outcome = self
            .write_checked(
                "relist",
                serde_json::json!({ "listing_id": listing_id, "price": price }),
                self.listing_deposit,
            )
            .await?;

        self.invalidate_after_mutation();
        let queries = self.queries.clone();
        let account = self.account_id.clone();
        refetch_settled(
            &self.settle,
            move || {
                queries.invalidate(GET_SELLER_ACTIVE_LISTINGS);
                let queries = queries.clone();
                let account = account.clone();
                async move { queries.seller_active_listings(&account).await }
            },
            |listings| listings.iter().any(|l| l.price == price && l.active),
        )
        .await?;
        info!(listing_id, "Relist settled");
        Ok(outcome)
    }

    async fn write_checked(
        &self,
        method: &str,
        args: serde_json::Value,
        deposit: u128,
    ) -> Result<TxOutcome, crate::Error> {
        let outcome = self.gateway.write(method, args, deposit).await?;
        if let Some(reason) = &outcome.failure {
            return Err(crate::Error::TxFailed(reason.clone()));
        }
        Ok(outcome)
    }

    /// Drop every collection a marketplace mutation can touch.
    fn invalidate_after_mutation(&self) {
        for method in [
            GET_ALL_LISTINGS,
            GET_SELLER_ACTIVE_LISTINGS,
            GET_SELLER_INACTIVE_LISTINGS,
            GET_USER_PURCHASES,
            GET_LISTING,
        ] {
            self.queries.invalidate(method);
        }
    }
}
