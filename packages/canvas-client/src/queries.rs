//! Listing query layer.
//!
//! Read-only, idempotent views over the marketplace contract, memoized per
//! (method, args). The contract cannot push invalidations, so every
//! mutating flow must call `invalidate` for the collections it touched and
//! refetch — see `actions.rs` for the write side of that contract.

use crate::gateway::ContractGateway;
use crate::metrics::METRICS;
use canvas_types::Listing;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::sync::atomic::Ordering;
use std::sync::{Arc, Mutex};
use tracing::debug;

pub const GET_ALL_LISTINGS: &str = "get_all_listings";
pub const GET_SELLER_ACTIVE_LISTINGS: &str = "get_seller_active_listings";
pub const GET_SELLER_INACTIVE_LISTINGS: &str = "get_seller_inactive_listings";
pub const GET_USER_PURCHASES: &str = "get_user_purchases";
pub const GET_LISTING: &str = "get_listing";

pub struct ListingQueries<G> {
    gateway: Arc<G>,
    cache: Arc<Mutex<HashMap<String, serde_json::Value>>>,
}

impl<G> Clone for ListingQueries<G> {
    fn clone(&self) -> Self {
        Self {
            gateway: Arc::clone(&self.gateway),
            cache: Arc::clone(&self.cache),
        }
    }
}

impl<G: ContractGateway> ListingQueries<G> {
    pub fn new(gateway: Arc<G>) -> Self {
        Self {
            gateway,
            cache: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub async fn all_listings(&self) -> Result<Vec<Listing>, crate::Error> {
        self.cached_read(GET_ALL_LISTINGS, serde_json::json!({}))
            .await
    }

    pub async fn seller_active_listings(
        &self,
        seller: &str,
    ) -> Result<Vec<Listing>, crate::Error> {
        self.cached_read(
            GET_SELLER_ACTIVE_LISTINGS,
            serde_json::json!({ "seller": seller }),
        )
        .await
    }

    pub async fn seller_inactive_listings(
        &self,
        seller: &str,
    ) -> Result<Vec<Listing>, crate::Error> {
        self.cached_read(
            GET_SELLER_INACTIVE_LISTINGS,
            serde_json::json!({ "seller": seller }),
        )
        .await
    }

    pub async fn user_purchases(&self, user: &str) -> Result<Vec<Listing>, crate::Error> {
        self.cached_read(GET_USER_PURCHASES, serde_json::json!({ "user": user }))
            .await
    }

    pub async fn listing(&self, listing_id: u64) -> Result<Option<Listing>, crate::Error> {
        self.cached_read(GET_LISTING, serde_json::json!({ "listing_id": listing_id }))
            .await
    }

    /// Drop every cached result of one view method, all argument variants.
    pub fn invalidate(&self, method: &str) {
        let mut cache = self.cache.lock().unwrap_or_else(|e| e.into_inner());
        let prefix = format!("{method}:");
        cache.retain(|key, _| !key.starts_with(&prefix));
        debug!(method, "Query cache invalidated");
    }

    pub fn invalidate_all(&self) {
        let mut cache = self.cache.lock().unwrap_or_else(|e| e.into_inner());
        cache.clear();
    }

    async fn cached_read<T: DeserializeOwned>(
        &self,
        method: &str,
        args: serde_json::Value,
    ) -> Result<T, crate::Error> {
        METRICS.query_total.fetch_add(1, Ordering::Relaxed);
        let key = format!("{method}:{args}");

        let cached = {
            let cache = self.cache.lock().unwrap_or_else(|e| e.into_inner());
            cache.get(&key).cloned()
        };
        let raw = match cached {
            Some(value) => {
                METRICS.query_cache_hits.fetch_add(1, Ordering::Relaxed);
                value
            }
            None => {
                let value = self.gateway.read(method, args).await?;
                let mut cache = self.cache.lock().unwrap_or_else(|e| e.into_inner());
                cache.insert(key, value.clone());
                value
            }
        };

        serde_json::from_value(raw)
            .map_err(|e| crate::Error::Rpc(format!("{method} returned unexpected shape: {e}")))
    }
}
