//! Local wallet: one signing key, chain-synced nonce, TransactionV0 signing.

use crate::rpc::RpcClient;
use near_crypto::{PublicKey, SecretKey};
use near_primitives::hash::CryptoHash;
use near_primitives::transaction::{Action, SignedTransaction, Transaction, TransactionV0};
use near_primitives::types::AccountId;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::info;

/// The signing identity behind every write call.
///
/// Nonce handling: fetched from the access key on first use, then
/// incremented locally per transaction. One wallet, one writer — the
/// wizard and marketplace actions are sequential, so no per-key lock.
pub struct Wallet {
    signer: near_crypto::Signer,
    nonce: AtomicU64,
}

impl Wallet {
    /// Load a key from `CANVAS_KEYS_JSON` if set, else from the key file.
    pub fn load(keys_path: &str) -> Result<Self, crate::Error> {
        let signer = if let Ok(keys_json) = std::env::var("CANVAS_KEYS_JSON") {
            parse_keys_json(&keys_json)?
        } else {
            let raw = std::fs::read_to_string(keys_path)
                .map_err(|e| crate::Error::Config(format!("Failed to read key file: {e}")))?;
            parse_keys_json(&raw)?
        };
        info!(account = %signer.get_account_id(), "Loaded wallet key");
        Ok(Self {
            signer,
            nonce: AtomicU64::new(0),
        })
    }

    pub fn from_signer(signer: near_crypto::Signer) -> Self {
        Self {
            signer,
            nonce: AtomicU64::new(0),
        }
    }

    pub fn account_id(&self) -> AccountId {
        self.signer.get_account_id().clone()
    }

    pub fn public_key(&self) -> PublicKey {
        self.signer.public_key()
    }

    /// Next transaction nonce, syncing from chain on first use.
    pub async fn next_nonce(&self, rpc: &RpcClient) -> Result<u64, crate::Error> {
        if self.nonce.load(Ordering::SeqCst) == 0 {
            let ak = rpc
                .query_access_key(&self.account_id(), &self.public_key())
                .await?;
            self.nonce.store(ak.nonce, Ordering::SeqCst);
            info!(nonce = ak.nonce, "Nonce synced from chain");
        }
        Ok(self.nonce.fetch_add(1, Ordering::SeqCst) + 1)
    }

    /// Re-sync the nonce from chain after an InvalidNonce rejection.
    pub async fn resync_nonce(&self, rpc: &RpcClient) -> Result<(), crate::Error> {
        let ak = rpc
            .query_access_key(&self.account_id(), &self.public_key())
            .await?;
        self.nonce.store(ak.nonce, Ordering::SeqCst);
        Ok(())
    }

    pub fn sign_transaction(
        &self,
        nonce: u64,
        receiver_id: &AccountId,
        block_hash: CryptoHash,
        actions: Vec<Action>,
    ) -> SignedTransaction {
        Transaction::V0(TransactionV0 {
            signer_id: self.signer.get_account_id().clone(),
            public_key: self.signer.public_key(),
            nonce,
            receiver_id: receiver_id.clone(),
            block_hash,
            actions,
        })
        .sign(&self.signer)
    }
}

/// Parse a key in the near-cli format:
/// `{"account_id": "...", "public_key": "...", "private_key": "..."}`
/// (single object or one-element array).
fn parse_keys_json(json: &str) -> Result<near_crypto::Signer, crate::Error> {
    #[derive(serde::Deserialize)]
    struct KeyFile {
        account_id: String,
        #[serde(alias = "private_key")]
        secret_key: String,
    }

    let key: KeyFile = if json.trim().starts_with('[') {
        let keys: Vec<KeyFile> = serde_json::from_str(json)
            .map_err(|e| crate::Error::Config(format!("Invalid key JSON: {e}")))?;
        keys.into_iter()
            .next()
            .ok_or_else(|| crate::Error::Config("Empty key array".to_string()))?
    } else {
        serde_json::from_str(json)
            .map_err(|e| crate::Error::Config(format!("Invalid key JSON: {e}")))?
    };

    let secret_key = SecretKey::from_str(&key.secret_key)
        .map_err(|e| crate::Error::Config(format!("Invalid secret key: {e}")))?;

    Ok(near_crypto::InMemorySigner::from_secret_key(
        key.account_id
            .parse()
            .map_err(|e| crate::Error::Config(format!("Invalid account: {e}")))?,
        secret_key,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use near_crypto::KeyType;

    #[test]
    fn parses_near_cli_key_formats() {
        let sk = SecretKey::from_random(KeyType::ED25519);
        let object = format!(
            r#"{{"account_id": "alice.testnet", "private_key": "{sk}"}}"#
        );
        let signer = parse_keys_json(&object).unwrap();
        assert_eq!(signer.get_account_id().as_str(), "alice.testnet");

        let array = format!(
            r#"[{{"account_id": "bob.testnet", "secret_key": "{sk}"}}]"#
        );
        let signer = parse_keys_json(&array).unwrap();
        assert_eq!(signer.get_account_id().as_str(), "bob.testnet");
    }

    #[test]
    fn rejects_empty_key_array() {
        assert!(parse_keys_json("[]").is_err());
    }
}
