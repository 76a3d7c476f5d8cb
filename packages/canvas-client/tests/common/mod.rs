//! Scripted test doubles for the contract and pinning gateways.
#![allow(dead_code)]

use canvas_client::{ContractGateway, Error, PinningGateway, TxOutcome};
use canvas_types::{Listing, NftMetadata, U128, EVENT_JSON_PREFIX};
use serde_json::Value;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

/// Scripted contract gateway. Reads pop queued responses per method and
/// stick on the last one; writes pop queued results and fail the test's
/// flow when nothing is scripted.
#[derive(Default)]
pub struct MockGateway {
    reads: Mutex<HashMap<String, VecDeque<Value>>>,
    read_log: Mutex<Vec<(String, Value)>>,
    writes: Mutex<HashMap<String, VecDeque<Result<TxOutcome, Error>>>>,
    write_log: Mutex<Vec<(String, Value, u128)>>,
}

impl MockGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn queue_read(&self, method: &str, value: Value) {
        self.reads
            .lock()
            .unwrap()
            .entry(method.to_string())
            .or_default()
            .push_back(value);
    }

    pub fn queue_write(&self, method: &str, result: Result<TxOutcome, Error>) {
        self.writes
            .lock()
            .unwrap()
            .entry(method.to_string())
            .or_default()
            .push_back(result);
    }

    pub fn read_count(&self, method: &str) -> usize {
        self.read_log
            .lock()
            .unwrap()
            .iter()
            .filter(|(m, _)| m == method)
            .count()
    }

    pub fn write_count(&self, method: &str) -> usize {
        self.write_log
            .lock()
            .unwrap()
            .iter()
            .filter(|(m, _, _)| m == method)
            .count()
    }

    pub fn total_writes(&self) -> usize {
        self.write_log.lock().unwrap().len()
    }

    pub fn writes_for(&self, method: &str) -> Vec<(Value, u128)> {
        self.write_log
            .lock()
            .unwrap()
            .iter()
            .filter(|(m, _, _)| m == method)
            .map(|(_, args, deposit)| (args.clone(), *deposit))
            .collect()
    }
}

impl ContractGateway for MockGateway {
    async fn read(&self, method: &str, args: Value) -> Result<Value, Error> {
        self.read_log
            .lock()
            .unwrap()
            .push((method.to_string(), args));
        let mut reads = self.reads.lock().unwrap();
        let queue = reads
            .get_mut(method)
            .filter(|q| !q.is_empty())
            .ok_or_else(|| Error::Rpc(format!("no scripted read for {method}")))?;
        if queue.len() > 1 {
            Ok(queue.pop_front().unwrap())
        } else {
            Ok(queue.front().cloned().unwrap())
        }
    }

    async fn write(&self, method: &str, args: Value, deposit: u128) -> Result<TxOutcome, Error> {
        self.write_log
            .lock()
            .unwrap()
            .push((method.to_string(), args, deposit));
        let mut writes = self.writes.lock().unwrap();
        writes
            .get_mut(method)
            .and_then(|q| q.pop_front())
            .unwrap_or_else(|| Err(Error::TxRejected(format!("no scripted write for {method}"))))
    }
}

/// Scripted pinning gateway recording every JSON upload.
pub struct MockPinning {
    results: Mutex<VecDeque<Result<String, Error>>>,
    pub upload_log: Mutex<Vec<NftMetadata>>,
}

impl MockPinning {
    pub fn new() -> Self {
        Self {
            results: Mutex::new(VecDeque::new()),
            upload_log: Mutex::new(Vec::new()),
        }
    }

    pub fn queue_json_upload(&self, result: Result<String, Error>) {
        self.results.lock().unwrap().push_back(result);
    }

    pub fn upload_count(&self) -> usize {
        self.upload_log.lock().unwrap().len()
    }
}

impl PinningGateway for MockPinning {
    async fn upload_json(&self, metadata: &NftMetadata) -> Result<String, Error> {
        self.upload_log.lock().unwrap().push(metadata.clone());
        self.results
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(Error::Pinning("no scripted upload".into())))
    }

    fn gateway_url(&self, cid: &str) -> String {
        format!("https://ipfs.io/ipfs/{cid}")
    }

    fn fallback_gateway_url(&self, cid: &str) -> String {
        format!("https://gateway.pinata.cloud/ipfs/{cid}")
    }
}

pub fn success_outcome(tx_hash: &str, logs: Vec<String>) -> TxOutcome {
    TxOutcome {
        tx_hash: tx_hash.to_string(),
        logs,
        failure: None,
    }
}

pub fn failed_outcome(tx_hash: &str, reason: &str) -> TxOutcome {
    TxOutcome {
        tx_hash: tx_hash.to_string(),
        logs: Vec::new(),
        failure: Some(reason.to_string()),
    }
}

pub fn mint_event_log(token_id: u64) -> String {
    format!(
        "{EVENT_JSON_PREFIX}{}",
        serde_json::json!({
            "standard": "nep171",
            "version": "1.2.0",
            "event": "nft_mint",
            "data": [{
                "owner_id": "alice.canvas.testnet",
                "token_ids": [token_id.to_string()],
            }],
        })
    )
}

pub fn listing(listing_id: u64, seller: &str, price: u128) -> Listing {
    Listing {
        listing_id,
        seller: seller.to_string(),
        buyer: None,
        nft_contract: "nft.cryptocanvas.testnet".to_string(),
        token_id: listing_id + 100,
        price: U128(price),
        active: true,
        listed_at: 1_700_000_000 + listing_id,
        token_uri: format!("https://ipfs.io/ipfs/Qm{listing_id}"),
    }
}

pub fn listings_json(listings: &[Listing]) -> Value {
    serde_json::to_value(listings).unwrap()
}
