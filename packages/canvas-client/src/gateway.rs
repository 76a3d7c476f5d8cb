//! Contract call gateway: the one seam between the client and the chain.
//!
//! Orchestration code (wizard, queries, marketplace actions) talks to the
//! `ContractGateway` trait and never to the RPC layer directly, so state
//! transitions are plain functions of call results and test without a
//! network.

use crate::metrics::METRICS;
use crate::rpc::RpcClient;
use crate::wallet::Wallet;
use near_gas::NearGas;
use near_primitives::transaction::{Action, FunctionCallAction};
use near_primitives::types::AccountId;
use near_primitives::views::{FinalExecutionOutcomeView, FinalExecutionStatus};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

/// Settled result of a write call: the receipt distilled to what the
/// orchestration layer needs.
#[derive(Debug, Clone)]
pub struct TxOutcome {
    pub tx_hash: String,
    /// Log lines from the transaction and every receipt, in order.
    pub logs: Vec<String>,
    /// Execution failure message; `None` means the write succeeded.
    pub failure: Option<String>,
}

impl TxOutcome {
    pub fn is_success(&self) -> bool {
        self.failure.is_none()
    }
}

/// Read/write access to one contract at a fixed address.
pub trait ContractGateway {
    /// Invoke a read-only view method and decode its JSON result.
    fn read(
        &self,
        method: &str,
        args: serde_json::Value,
    ) -> impl std::future::Future<Output = Result<serde_json::Value, crate::Error>> + Send;

    /// Invoke a state-mutating method, attach `deposit`, and wait for the
    /// confirmation receipt before returning.
    fn write(
        &self,
        method: &str,
        args: serde_json::Value,
        deposit: u128,
    ) -> impl std::future::Future<Output = Result<TxOutcome, crate::Error>> + Send;
}

/// Gateway to one NEAR contract, signing with the shared wallet.
pub struct NearGateway {
    rpc: Arc<RpcClient>,
    wallet: Arc<Wallet>,
    contract_id: AccountId,
    gas: NearGas,
}

impl NearGateway {
    pub fn new(
        rpc: Arc<RpcClient>,
        wallet: Arc<Wallet>,
        contract_id: AccountId,
        gas_tgas: u64,
    ) -> Self {
        Self {
            rpc,
            wallet,
            contract_id,
            gas: NearGas::from_tgas(gas_tgas),
        }
    }

    pub fn contract_id(&self) -> &AccountId {
        &self.contract_id
    }

    fn build_actions(&self, method: &str, args: &serde_json::Value, deposit: u128) -> Vec<Action> {
        let args = serde_json::to_vec(args).unwrap_or_default();
        vec![Action::FunctionCall(Box::new(FunctionCallAction {
            method_name: method.to_string(),
            args,
            gas: self.gas.as_gas(),
            deposit,
        }))]
    }

    async fn sign_and_send(
        &self,
        method: &str,
        args: &serde_json::Value,
        deposit: u128,
    ) -> Result<FinalExecutionOutcomeView, crate::Error> {
        let nonce = self.wallet.next_nonce(&self.rpc).await?;
        let block_hash = self.rpc.latest_block_hash().await?;
        let actions = self.build_actions(method, args, deposit);
        let signed_tx = self
            .wallet
            .sign_transaction(nonce, &self.contract_id, block_hash, actions);
        self.rpc.send_tx(signed_tx).await
    }
}

impl ContractGateway for NearGateway {
    async fn read(
        &self,
        method: &str,
        args: serde_json::Value,
    ) -> Result<serde_json::Value, crate::Error> {
        self.rpc.view_call(&self.contract_id, method, &args).await
    }

    async fn write(
        &self,
        method: &str,
        args: serde_json::Value,
        deposit: u128,
    ) -> Result<TxOutcome, crate::Error> {
        let start = Instant::now();
        METRICS.tx_total.fetch_add(1, Ordering::Relaxed);

        let outcome = match self.sign_and_send(method, &args, deposit).await {
            Ok(outcome) => outcome,
            Err(e) => {
                let err_str = format!("{e}");
                // Nonce error — re-sync nonce, re-sign, and retry once
                if err_str.contains("InvalidNonce") || err_str.contains("nonce") {
                    warn!(method, "Nonce error on send, re-syncing and retrying");
                    self.wallet.resync_nonce(&self.rpc).await?;
                    match self.sign_and_send(method, &args, deposit).await {
                        Ok(outcome) => outcome,
                        Err(e2) => {
                            METRICS.tx_error.fetch_add(1, Ordering::Relaxed);
                            return Err(crate::Error::TxRejected(format!("{e2}")));
                        }
                    }
                } else {
                    METRICS.tx_error.fetch_add(1, Ordering::Relaxed);
                    return Err(crate::Error::TxRejected(err_str));
                }
            }
        };

        let tx_hash = outcome.transaction_outcome.id.to_string();
        let mut logs: Vec<String> = outcome.transaction_outcome.outcome.logs.clone();
        for receipt in &outcome.receipts_outcome {
            logs.extend(receipt.outcome.logs.iter().cloned());
        }

        let failure = match &outcome.status {
            FinalExecutionStatus::SuccessValue(_) => None,
            FinalExecutionStatus::Failure(e) => Some(format!("{e:?}")),
            FinalExecutionStatus::Started | FinalExecutionStatus::NotStarted => {
                Some("transaction not finalized".to_string())
            }
        };

        METRICS.record_tx_duration(start);
        match &failure {
            None => {
                METRICS.tx_success.fetch_add(1, Ordering::Relaxed);
                info!(method, tx_hash = %tx_hash, "Write confirmed");
            }
            Some(reason) => {
                METRICS.tx_error.fetch_add(1, Ordering::Relaxed);
                warn!(method, tx_hash = %tx_hash, reason, "Write failed on-chain");
            }
        }

        Ok(TxOutcome {
            tx_hash,
            logs,
            failure,
        })
    }
}
