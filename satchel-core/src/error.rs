//! Errors that can occur while minting, transferring and aggregating
//! tokens.
//!
//! Everything fatal aborts the current operation and names the step that
//! failed; nothing in this crate retries on its own. Soft failures (the
//! acceptance-network announcement) are logged where they occur and never
//! surface here.

use thiserror::Error;

use crate::types::Outpoint;

/// Malformed caller input, rejected before any external call is made.
#[derive(Debug, Error, PartialEq, Eq, Clone)]
#[error("invalid {what}: {reason}")]
pub struct ValidationError {
    pub what: &'static str,
    pub reason: String,
}

impl ValidationError {
    pub fn new(what: &'static str, reason: impl Into<String>) -> Self {
        ValidationError {
            what,
            reason: reason.into(),
        }
    }
}

/// Errors that can occur when encoding a token record into output data
/// fields.
#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum EncodeError {
    /// The asset identifier is the empty string.
    #[error("asset identifier must not be empty")]
    EmptyAssetId,
}

/// Errors that can occur when decoding the data fields of an output.
///
/// During balance aggregation these are non-fatal and only mark the
/// offending output as skipped. For the one output selected by a
/// transfer, they are fatal.
#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum DecodeError {
    /// The record does not carry exactly two data fields.
    #[error("expected 2 data fields, found {0}")]
    WrongFieldCount(usize),
    /// Field 0 is not valid UTF-8.
    #[error("asset identifier field is not valid UTF-8")]
    BadAssetId,
    /// Field 1 is empty or truncates mid-varint.
    #[error("amount field is not a well-formed varint")]
    BadVarint,
    /// Field 1 contains bytes after the end of the varint.
    #[error("amount field has {0} trailing byte(s) after the varint")]
    TrailingBytes(usize),
}

/// A call to one of the external collaborators (wallet, broadcast
/// network, notification relay) failed.
///
/// Safe to retry the whole operation from scratch: no partial state is
/// persisted before the failing call succeeds.
#[derive(Debug, Error)]
#[error("{call} failed")]
pub struct TransportError {
    /// The collaborator call that failed, e.g. `"wallet_createAction"`.
    pub call: String,
    #[source]
    pub source: Box<dyn std::error::Error + Send + Sync>,
}

impl TransportError {
    pub fn new(
        call: impl Into<String>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        TransportError {
            call: call.into(),
            source: source.into(),
        }
    }
}

/// The unlock-metadata store failed to read or write a record.
#[derive(Debug, Error)]
#[error("unlock store {op} failed")]
pub struct StoreError {
    pub op: &'static str,
    #[source]
    pub source: Box<dyn std::error::Error + Send + Sync>,
}

impl StoreError {
    pub fn new(
        op: &'static str,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        StoreError {
            op,
            source: source.into(),
        }
    }
}

/// The top-level error type returned by the mint, transfer, balance and
/// receive engines.
#[derive(Debug, Error)]
pub enum TokenError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Encode(#[from] EncodeError),

    /// The output selected for a transfer carries malformed token data.
    #[error("selected output {outpoint} carries malformed token data")]
    SelectedOutputUndecodable {
        outpoint: Outpoint,
        #[source]
        source: DecodeError,
    },

    /// The requested send exceeds the amount held by the selected input.
    /// The transaction is never constructed.
    #[error("insufficient balance: tried to send {requested} but the selected output holds {available}")]
    InsufficientBalance { requested: u64, available: u64 },

    /// No candidate output was offered to spend.
    #[error("no spendable token output available")]
    NoEligibleOutput,

    /// A spendable output has no stored unlock metadata, so it can never
    /// be selected for a transfer.
    #[error("no unlock metadata stored for output {0}")]
    MissingUnlockMetadata(Outpoint),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Store(#[from] StoreError),
}
