//! Pure listing-collection logic: price buckets, sorting, search, stats.
//!
//! All amount arithmetic stays in u128 base units. Converting to the
//! human-readable decimal form and back through binary floating point
//! loses precision once collections grow, so it never happens here.

use crate::types::{Listing, U128};

/// One whole display unit in base units (24 decimals).
pub const ONE_CANVAS: u128 = 1_000_000_000_000_000_000_000_000;

const HUNDREDTH: u128 = ONE_CANVAS / 100;
const TENTH: u128 = ONE_CANVAS / 10;

/// Price range of a listing, in display units. Boundaries are closed-open
/// except the last bucket, so every price lands in exactly one bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PriceBucket {
    /// [0, 0.01)
    UnderOneHundredth,
    /// [0.01, 0.1)
    HundredthToTenth,
    /// [0.1, 1)
    TenthToOne,
    /// [1, ∞)
    OneOrMore,
}

impl PriceBucket {
    pub const ALL: [PriceBucket; 4] = [
        PriceBucket::UnderOneHundredth,
        PriceBucket::HundredthToTenth,
        PriceBucket::TenthToOne,
        PriceBucket::OneOrMore,
    ];

    /// Filter key as shown in the explore UI.
    pub fn label(self) -> &'static str {
        match self {
            PriceBucket::UnderOneHundredth => "under-0.01",
            PriceBucket::HundredthToTenth => "0.01-0.1",
            PriceBucket::TenthToOne => "0.1-1",
            PriceBucket::OneOrMore => "above-1",
        }
    }

    /// Classify a price in base units. Total: every price has a bucket.
    pub fn classify(price: U128) -> PriceBucket {
        match price.0 {
            p if p < HUNDREDTH => PriceBucket::UnderOneHundredth,
            p if p < TENTH => PriceBucket::HundredthToTenth,
            p if p < ONE_CANVAS => PriceBucket::TenthToOne,
            _ => PriceBucket::OneOrMore,
        }
    }

    pub fn contains(self, price: U128) -> bool {
        Self::classify(price) == self
    }
}

/// Sort orders offered by the explore page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Newest,
    Oldest,
    PriceLowHigh,
    PriceHighLow,
    ListingId,
}

/// Stable in-place sort. Newest and Oldest are exact reverses when
/// timestamps are distinct.
pub fn sort_listings(listings: &mut [Listing], order: SortOrder) {
    match order {
        SortOrder::Newest => listings.sort_by(|a, b| b.listed_at.cmp(&a.listed_at)),
        SortOrder::Oldest => listings.sort_by(|a, b| a.listed_at.cmp(&b.listed_at)),
        SortOrder::PriceLowHigh => listings.sort_by(|a, b| a.price.cmp(&b.price)),
        SortOrder::PriceHighLow => listings.sort_by(|a, b| b.price.cmp(&a.price)),
        SortOrder::ListingId => listings.sort_by(|a, b| a.listing_id.cmp(&b.listing_id)),
    }
}

/// Keep listings whose price falls in `bucket`.
pub fn filter_by_bucket(listings: &[Listing], bucket: PriceBucket) -> Vec<Listing> {
    listings
        .iter()
        .filter(|l| bucket.contains(l.price))
        .cloned()
        .collect()
}

/// Substring search over listing id, token id, and seller.
pub fn search_listings(listings: &[Listing], query: &str) -> Vec<Listing> {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return listings.to_vec();
    }
    listings
        .iter()
        .filter(|l| {
            l.listing_id.to_string().contains(&query)
                || l.token_id.to_string().contains(&query)
                || l.seller.to_lowercase().contains(&query)
        })
        .cloned()
        .collect()
}

/// Aggregates for the explore page header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollectionStats {
    pub count: usize,
    pub total_value: U128,
    /// Truncating integer mean; zero for an empty collection.
    pub avg_price: U128,
}

pub fn collection_stats(listings: &[Listing]) -> CollectionStats {
    let count = listings.len();
    let total: u128 = listings.iter().map(|l| l.price.0).sum();
    let avg = if count == 0 { 0 } else { total / count as u128 };
    CollectionStats {
        count,
        total_value: U128(total),
        avg_price: U128(avg),
    }
}
