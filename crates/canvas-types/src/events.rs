//! Contract event log decoding.
//!
//! The contract emits NEP-297 style events: a log line prefixed with
//! `EVENT_JSON:` carrying a JSON envelope. Receipt logs may also contain
//! plain-text lines or events from other standards; those are skipped.

use serde::{Deserialize, Serialize};

pub const EVENT_JSON_PREFIX: &str = "EVENT_JSON:";

/// Event name emitted by the NFT contract when a token is minted.
const MINT_EVENT: &str = "nft_mint";

/// The NEP-297 envelope around every structured event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventEnvelope {
    pub standard: String,
    pub version: String,
    pub event: String,
    #[serde(default)]
    pub data: Vec<serde_json::Value>,
}

/// Payload of one `nft_mint` data entry.
///
/// Token ids travel as decimal strings, the same convention as amounts.
#[derive(Debug, Clone, Deserialize)]
pub struct MintEvent {
    #[serde(default)]
    pub owner_id: Option<String>,
    pub token_ids: Vec<String>,
    #[serde(default)]
    pub token_uri: Option<String>,
}

/// Decode every structured event out of a receipt's log lines.
/// Undecodable lines are skipped, not errors.
pub fn decode_events(logs: &[String]) -> Vec<EventEnvelope> {
    logs.iter()
        .filter_map(|line| line.strip_prefix(EVENT_JSON_PREFIX))
        .filter_map(|json| serde_json::from_str(json).ok())
        .collect()
}

/// Recover the minted token id from receipt logs.
///
/// Decodes all logs against the envelope schema, filters to the mint event,
/// and takes the first entry whose payload parses. Returns `None` when no
/// log matches — the caller must treat that as its own failure class, since
/// the mint itself already happened on-chain.
pub fn mint_token_id(logs: &[String]) -> Option<u64> {
    decode_events(logs)
        .into_iter()
        .filter(|envelope| envelope.event == MINT_EVENT)
        .find_map(|envelope| {
            envelope.data.into_iter().find_map(|entry| {
                let mint: MintEvent = serde_json::from_value(entry).ok()?;
                mint.token_ids.first()?.parse::<u64>().ok()
            })
        })
}
