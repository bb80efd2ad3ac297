//! The notification-relay contract.
//!
//! An at-least-once, pull-based delivery channel carrying token notices
//! from sender to recipient off-ledger. The sender pushes once; the
//! recipient polls and acknowledges only after the output has been
//! internalized into its own holdings, so an unacknowledged notice is
//! redelivered. Inbox order is delivery order, not logical order.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::TransportError;
use crate::types::UnlockMetadata;

/// Everything a recipient needs to claim a payment output: the
/// transaction that created it, which output it is, and the unlock
/// coordinates that make it spendable.
#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone)]
#[serde(rename_all = "camelCase")]
pub struct TokenNotice {
    pub txid: String,
    pub output_index: u32,
    #[serde(with = "hex::serde")]
    pub tx: Vec<u8>,
    pub unlock: UnlockMetadata,
}

/// A notice waiting in the recipient's inbox.
#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone)]
#[serde(rename_all = "camelCase")]
pub struct PendingMessage {
    pub message_id: String,
    /// Identity key of whoever sent the notice.
    pub sender: String,
    pub notice: TokenNotice,
}

/// Whether the relay delivered the notice immediately or queued it.
#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryStatus {
    Delivered,
    Queued,
}

#[async_trait]
pub trait NotificationRelay {
    /// Push a notice to a recipient's inbox.
    async fn send(
        &self,
        recipient: &str,
        notice: &TokenNotice,
    ) -> Result<DeliveryStatus, TransportError>;

    /// All notices currently waiting in our inbox, in delivery order.
    async fn poll(&self) -> Result<Vec<PendingMessage>, TransportError>;

    /// Confirm a notice has been fully processed so it is not redelivered.
    async fn acknowledge(&self, message_id: &str) -> Result<(), TransportError>;
}
