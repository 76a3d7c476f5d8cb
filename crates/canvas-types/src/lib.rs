//! Shared types and pure-logic utilities for the CryptoCanvas marketplace.
//! Zero network dependency — usable by any front-end over the same contract.

mod draft;
mod events;
mod market;
mod types;

pub use draft::Draft;
pub use events::{EventEnvelope, MintEvent, decode_events, mint_token_id, EVENT_JSON_PREFIX};
pub use market::{
    CollectionStats, PriceBucket, SortOrder, collection_stats, filter_by_bucket, search_listings,
    sort_listings, ONE_CANVAS,
};
pub use types::{Attribute, Listing, NftMetadata, U128};
