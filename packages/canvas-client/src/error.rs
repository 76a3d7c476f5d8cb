//! Error types for the client.
//!
//! One variant per failure class. Remote failures are converted at the
//! call site into user-presentable messages; nothing here aborts the
//! process, and every class except `MintNotRecovered` is retryable from
//! the step that produced it.

use std::fmt;

#[derive(Debug, Clone)]
pub enum Error {
    /// Configuration error.
    Config(String),
    /// A required field is missing or a call arrived out of order.
    /// Blocked locally — no network call was made.
    Validation(String),
    /// Pinning service upload/delete failure.
    Pinning(String),
    /// RPC communication error on a read path.
    Rpc(String),
    /// A write was rejected before execution (signing failed, node
    /// refused the transaction).
    TxRejected(String),
    /// A write executed on-chain and failed there.
    TxFailed(String),
    /// The mint executed on-chain but its receipt carried no decodable
    /// mint event, so the token id could not be recovered. Neither a
    /// full failure nor a full success.
    MintNotRecovered(String),
    /// Token metadata fetch or parse failure.
    Metadata(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Config(msg) => write!(f, "config error: {msg}"),
            Error::Validation(msg) => write!(f, "validation error: {msg}"),
            Error::Pinning(msg) => write!(f, "pinning error: {msg}"),
            Error::Rpc(msg) => write!(f, "rpc error: {msg}"),
            Error::TxRejected(msg) => write!(f, "transaction rejected: {msg}"),
            Error::TxFailed(msg) => write!(f, "transaction failed: {msg}"),
            Error::MintNotRecovered(msg) => {
                write!(f, "minted but token id not recovered: {msg}")
            }
            Error::Metadata(msg) => write!(f, "metadata error: {msg}"),
        }
    }
}

impl std::error::Error for Error {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_keeps_the_underlying_message() {
        let err = Error::TxRejected("user declined signing".into());
        assert_eq!(
            err.to_string(),
            "transaction rejected: user declined signing"
        );
    }
}
