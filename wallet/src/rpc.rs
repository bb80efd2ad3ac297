//! jsonrpsee-backed implementations of the three external contracts:
//! the wallet service, the broadcast / acceptance network, and the
//! notification relay.
//!
//! Each helper maps its wire failure into a [`TransportError`] naming
//! the RPC method, which is all the engines need to report a retryable
//! failure.

use std::collections::BTreeMap;

use async_trait::async_trait;
use jsonrpsee::{
    core::client::ClientT,
    http_client::{HttpClient, HttpClientBuilder},
    rpc_params,
};

use satchel_core::broadcast::{Broadcast, BroadcastReceipt};
use satchel_core::error::TransportError;
use satchel_core::relay::{DeliveryStatus, NotificationRelay, PendingMessage, TokenNotice};
use satchel_core::types::{OutputRecord, UnlockMetadata};
use satchel_core::wallet::{
    ActionRequest, ActionResult, InternalizeRequest, SignedAction, Wallet,
};

/// The wallet service, reached over HTTP JSON-RPC.
pub struct RpcWallet {
    client: HttpClient,
}

impl RpcWallet {
    pub fn new(endpoint: &str) -> anyhow::Result<Self> {
        Ok(RpcWallet {
            client: HttpClientBuilder::default().build(endpoint)?,
        })
    }
}

#[async_trait]
impl Wallet for RpcWallet {
    async fn list_outputs(&self, basket: &str) -> Result<Vec<OutputRecord>, TransportError> {
        let params = rpc_params![basket];
        self.client
            .request("wallet_listOutputs", params)
            .await
            .map_err(|e| TransportError::new("wallet_listOutputs", e))
    }

    async fn create_action(&self, request: ActionRequest) -> Result<ActionResult, TransportError> {
        let params = rpc_params![request];
        self.client
            .request("wallet_createAction", params)
            .await
            .map_err(|e| TransportError::new("wallet_createAction", e))
    }

    async fn sign_action(
        &self,
        reference: &str,
        proofs: BTreeMap<u32, UnlockMetadata>,
    ) -> Result<SignedAction, TransportError> {
        let params = rpc_params![reference, proofs];
        self.client
            .request("wallet_signAction", params)
            .await
            .map_err(|e| TransportError::new("wallet_signAction", e))
    }

    async fn internalize_action(&self, request: InternalizeRequest) -> Result<(), TransportError> {
        let params = rpc_params![request];
        let _ack: bool = self
            .client
            .request("wallet_internalizeAction", params)
            .await
            .map_err(|e| TransportError::new("wallet_internalizeAction", e))?;
        Ok(())
    }

    async fn identity_key(&self) -> Result<String, TransportError> {
        let params = rpc_params![true];
        self.client
            .request("wallet_getPublicKey", params)
            .await
            .map_err(|e| TransportError::new("wallet_getPublicKey", e))
    }
}

/// The broadcast network. Ledger submission and acceptance-network
/// announcement share an endpoint but not a failure mode: the engines
/// treat the latter as best-effort.
pub struct RpcBroadcast {
    client: HttpClient,
}

impl RpcBroadcast {
    pub fn new(endpoint: &str) -> anyhow::Result<Self> {
        Ok(RpcBroadcast {
            client: HttpClientBuilder::default().build(endpoint)?,
        })
    }
}

#[async_trait]
impl Broadcast for RpcBroadcast {
    async fn broadcast(&self, txid: &str, tx: &[u8]) -> Result<BroadcastReceipt, TransportError> {
        let params = rpc_params![txid, hex::encode(tx)];
        self.client
            .request("network_broadcast", params)
            .await
            .map_err(|e| TransportError::new("network_broadcast", e))
    }

    async fn announce(&self, txid: &str, tx: &[u8]) -> Result<(), TransportError> {
        let params = rpc_params![txid, hex::encode(tx)];
        let _response: serde_json::Value = self
            .client
            .request("overlay_submit", params)
            .await
            .map_err(|e| TransportError::new("overlay_submit", e))?;
        Ok(())
    }
}

/// The notification relay, scoped to one named inbox.
pub struct RpcRelay {
    client: HttpClient,
    inbox: String,
}

impl RpcRelay {
    pub fn new(endpoint: &str, inbox: &str) -> anyhow::Result<Self> {
        Ok(RpcRelay {
            client: HttpClientBuilder::default().build(endpoint)?,
            inbox: inbox.to_string(),
        })
    }
}

#[async_trait]
impl NotificationRelay for RpcRelay {
    async fn send(
        &self,
        recipient: &str,
        notice: &TokenNotice,
    ) -> Result<DeliveryStatus, TransportError> {
        let params = rpc_params![recipient, &self.inbox, notice];
        self.client
            .request("relay_send", params)
            .await
            .map_err(|e| TransportError::new("relay_send", e))
    }

    async fn poll(&self) -> Result<Vec<PendingMessage>, TransportError> {
        let params = rpc_params![&self.inbox];
        self.client
            .request("relay_listMessages", params)
            .await
            .map_err(|e| TransportError::new("relay_listMessages", e))
    }

    async fn acknowledge(&self, message_id: &str) -> Result<(), TransportError> {
        let params = rpc_params![message_id];
        let _ack: bool = self
            .client
            .request("relay_acknowledge", params)
            .await
            .map_err(|e| TransportError::new("relay_acknowledge", e))?;
        Ok(())
    }
}
