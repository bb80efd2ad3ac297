//! The broadcast-network contract.
//!
//! Two very different delivery guarantees share this seam: `broadcast`
//! submits a signed transaction to the ledger and is fatal on failure,
//! while `announce` offers the transaction to an acceptance network that
//! indexes this token's output shape. The acceptance network may simply
//! not exist yet, so the engines treat announce failures as soft: logged
//! and swallowed.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::TransportError;

/// Receipt for a successful ledger submission.
#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone)]
pub struct BroadcastReceipt {
    pub txid: String,
}

#[async_trait]
pub trait Broadcast {
    /// Submit a signed transaction to the ledger. Fatal on failure.
    async fn broadcast(&self, txid: &str, tx: &[u8]) -> Result<BroadcastReceipt, TransportError>;

    /// Offer a finalized transaction to the acceptance network.
    /// Best-effort; callers log failures and carry on.
    async fn announce(&self, txid: &str, tx: &[u8]) -> Result<(), TransportError>;
}
