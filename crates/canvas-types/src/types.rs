//! Wire types shared between the contract, the pinning service, and clients.

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Amount in base currency units, JSON-encoded as a decimal string.
///
/// u128 does not survive JSON number encoding, so amounts travel as strings
/// on the wire, the same convention the contract uses in its event fields.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct U128(pub u128);

impl From<u128> for U128 {
    fn from(v: u128) -> Self {
        Self(v)
    }
}

impl fmt::Display for U128 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for U128 {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0.to_string())
    }
}

impl<'de> Deserialize<'de> for U128 {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct U128Visitor;

        impl Visitor<'_> for U128Visitor {
            type Value = U128;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a u128 as a decimal string or integer")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<U128, E> {
                v.parse::<u128>().map(U128).map_err(de::Error::custom)
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<U128, E> {
                Ok(U128(v as u128))
            }
        }

        deserializer.deserialize_any(U128Visitor)
    }
}

/// One display attribute of a token. Order is display order; duplicate
/// trait types are allowed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribute {
    pub trait_type: String,
    pub value: String,
}

/// Off-chain token metadata, pinned as JSON and referenced by the token URI.
///
/// Field names mirror the pinned JSON produced at mint time, so a document
/// round-trips byte-compatible through any client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NftMetadata {
    pub name: String,
    pub description: String,
    pub image: String,
    #[serde(rename = "fallbackImage", default)]
    pub fallback_image: String,
    #[serde(default)]
    pub attributes: Vec<Attribute>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_link: Option<String>,
}

/// A marketplace listing as returned by the contract's view methods.
///
/// Read-only mirror of contract state: clients never mutate a listing
/// locally, they send write calls and refetch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Listing {
    pub listing_id: u64,
    pub seller: String,
    /// Absent until the listing is sold.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub buyer: Option<String>,
    pub nft_contract: String,
    pub token_id: u64,
    pub price: U128,
    pub active: bool,
    /// Seconds since epoch.
    pub listed_at: u64,
    pub token_uri: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn u128_round_trips_as_string() {
        let amount = U128(1_000_000_000_000_000_000_000_000);
        let json = serde_json::to_string(&amount).unwrap();
        assert_eq!(json, "\"1000000000000000000000000\"");
        let back: U128 = serde_json::from_str(&json).unwrap();
        assert_eq!(back, amount);
    }

    #[test]
    fn u128_accepts_plain_integers() {
        let v: U128 = serde_json::from_str("42").unwrap();
        assert_eq!(v, U128(42));
    }

    #[test]
    fn listing_decodes_without_buyer() {
        let json = serde_json::json!({
            "listing_id": 3,
            "seller": "alice.canvas.testnet",
            "nft_contract": "nft.canvas.testnet",
            "token_id": 7,
            "price": "5000000000000000000000000",
            "active": true,
            "listed_at": 1700000000u64,
            "token_uri": "https://ipfs.io/ipfs/QmExample",
        });
        let listing: Listing = serde_json::from_value(json).unwrap();
        assert_eq!(listing.buyer, None);
        assert_eq!(listing.price, U128(5_000_000_000_000_000_000_000_000));
    }

    #[test]
    fn metadata_keeps_attribute_order_and_duplicates() {
        let json = serde_json::json!({
            "name": "Dusk",
            "description": "Generative dusk study",
            "image": "https://ipfs.io/ipfs/QmImg",
            "fallbackImage": "https://gateway.example/ipfs/QmImg",
            "attributes": [
                {"trait_type": "palette", "value": "warm"},
                {"trait_type": "palette", "value": "cool"},
            ],
        });
        let meta: NftMetadata = serde_json::from_value(json).unwrap();
        assert_eq!(meta.attributes.len(), 2);
        assert_eq!(meta.attributes[0].value, "warm");
        assert_eq!(meta.attributes[1].value, "cool");
        assert_eq!(meta.external_link, None);
    }
}
