//! In-memory doubles for the external collaborators, used by this
//! crate's own tests and available to downstream integration tests.

use std::collections::{BTreeMap, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::broadcast::{Broadcast, BroadcastReceipt};
use crate::error::{StoreError, TransportError};
use crate::relay::{DeliveryStatus, NotificationRelay, PendingMessage, TokenNotice};
use crate::store::UnlockStore;
use crate::types::{Outpoint, OutputRecord, UnlockMetadata};
use crate::wallet::{
    ActionRequest, ActionResult, InternalizeRequest, SignedAction, UnsignedAction, Wallet,
};

/// A deterministic, hex-shaped fake transaction id.
pub fn fake_txid(n: u64) -> String {
    format!("{n:064x}")
}

#[derive(Default)]
struct MockWalletState {
    outputs: Vec<OutputRecord>,
    created: Vec<ActionRequest>,
    signed: Vec<(String, BTreeMap<u32, UnlockMetadata>)>,
    internalized: Vec<InternalizeRequest>,
    pending: BTreeMap<String, String>,
    next_tx: u64,
}

/// An in-memory wallet collaborator.
///
/// Unsigned transactions get `funding_inputs` synthetic inputs
/// *prepended* before the requested ones, imitating a wallet that adds
/// fee-funding inputs of its own: the consumed token input deliberately
/// does not sit at position 0.
pub struct MockWallet {
    pub identity: String,
    pub funding_inputs: u32,
    pub fail_internalize: bool,
    state: Mutex<MockWalletState>,
}

impl Default for MockWallet {
    fn default() -> Self {
        MockWallet {
            identity: format!("02{}", "11".repeat(32)),
            funding_inputs: 0,
            fail_internalize: false,
            state: Mutex::new(MockWalletState::default()),
        }
    }
}

impl MockWallet {
    pub fn with_outputs(outputs: Vec<OutputRecord>) -> Self {
        let wallet = Self::default();
        wallet.state.lock().unwrap().outputs = outputs;
        wallet
    }

    /// Prepend `n` synthetic funding inputs to every unsigned action.
    pub fn with_funding_inputs(mut self, n: u32) -> Self {
        self.funding_inputs = n;
        self
    }

    /// Make `internalize_action` refuse every request.
    pub fn failing_internalize(mut self) -> Self {
        self.fail_internalize = true;
        self
    }

    /// Every `create_action` request seen so far.
    pub fn created(&self) -> Vec<ActionRequest> {
        self.state.lock().unwrap().created.clone()
    }

    /// Every `(reference, proofs)` pair handed to `sign_action`.
    pub fn signed(&self) -> Vec<(String, BTreeMap<u32, UnlockMetadata>)> {
        self.state.lock().unwrap().signed.clone()
    }

    pub fn internalized(&self) -> Vec<InternalizeRequest> {
        self.state.lock().unwrap().internalized.clone()
    }
}

#[async_trait]
impl Wallet for MockWallet {
    async fn list_outputs(&self, _basket: &str) -> Result<Vec<OutputRecord>, TransportError> {
        Ok(self.state.lock().unwrap().outputs.clone())
    }

    async fn create_action(&self, request: ActionRequest) -> Result<ActionResult, TransportError> {
        let mut state = self.state.lock().unwrap();
        state.next_tx += 1;
        let txid = fake_txid(state.next_tx);
        state.created.push(request.clone());

        if !request.unsigned {
            return Ok(ActionResult::Finalized(SignedAction {
                tx: txid.clone().into_bytes(),
                txid,
            }));
        }

        let reference = format!("ref-{}", state.next_tx);
        state.pending.insert(reference.clone(), txid.clone());

        let mut inputs: Vec<Outpoint> = (0..self.funding_inputs)
            .map(|i| Outpoint {
                txid: fake_txid(0xf00d + u64::from(i)),
                vout: i,
            })
            .collect();
        inputs.extend(request.inputs.iter().map(|input| input.outpoint.clone()));

        Ok(ActionResult::Unsigned(UnsignedAction {
            reference,
            tx: txid.into_bytes(),
            inputs,
        }))
    }

    async fn sign_action(
        &self,
        reference: &str,
        proofs: BTreeMap<u32, UnlockMetadata>,
    ) -> Result<SignedAction, TransportError> {
        let mut state = self.state.lock().unwrap();
        let txid = state
            .pending
            .remove(reference)
            .ok_or_else(|| TransportError::new("wallet_signAction", "unknown reference"))?;
        state.signed.push((reference.to_string(), proofs));
        Ok(SignedAction {
            tx: txid.clone().into_bytes(),
            txid,
        })
    }

    async fn internalize_action(&self, request: InternalizeRequest) -> Result<(), TransportError> {
        if self.fail_internalize {
            return Err(TransportError::new(
                "wallet_internalizeAction",
                "wallet refused the output",
            ));
        }
        self.state.lock().unwrap().internalized.push(request);
        Ok(())
    }

    async fn identity_key(&self) -> Result<String, TransportError> {
        Ok(self.identity.clone())
    }
}

/// An in-memory broadcast network.
#[derive(Default)]
pub struct MockBroadcast {
    pub fail_broadcast: bool,
    pub fail_announce: bool,
    pub broadcasted: Mutex<Vec<String>>,
    pub announced: Mutex<Vec<String>>,
}

#[async_trait]
impl Broadcast for MockBroadcast {
    async fn broadcast(&self, txid: &str, _tx: &[u8]) -> Result<BroadcastReceipt, TransportError> {
        if self.fail_broadcast {
            return Err(TransportError::new("tx_broadcast", "ledger unreachable"));
        }
        self.broadcasted.lock().unwrap().push(txid.to_string());
        Ok(BroadcastReceipt {
            txid: txid.to_string(),
        })
    }

    async fn announce(&self, txid: &str, _tx: &[u8]) -> Result<(), TransportError> {
        if self.fail_announce {
            return Err(TransportError::new(
                "overlay_submit",
                "no such acceptance network",
            ));
        }
        self.announced.lock().unwrap().push(txid.to_string());
        Ok(())
    }
}

/// An in-memory notification relay with a pre-loadable inbox.
#[derive(Default)]
pub struct MockRelay {
    pub inbox: Mutex<VecDeque<PendingMessage>>,
    pub sent: Mutex<Vec<(String, TokenNotice)>>,
    pub acknowledged: Mutex<Vec<String>>,
}

impl MockRelay {
    pub fn with_inbox(messages: Vec<PendingMessage>) -> Self {
        MockRelay {
            inbox: Mutex::new(messages.into()),
            ..Default::default()
        }
    }
}

#[async_trait]
impl NotificationRelay for MockRelay {
    async fn send(
        &self,
        recipient: &str,
        notice: &TokenNotice,
    ) -> Result<DeliveryStatus, TransportError> {
        self.sent
            .lock()
            .unwrap()
            .push((recipient.to_string(), notice.clone()));
        Ok(DeliveryStatus::Delivered)
    }

    async fn poll(&self) -> Result<Vec<PendingMessage>, TransportError> {
        Ok(self.inbox.lock().unwrap().iter().cloned().collect())
    }

    async fn acknowledge(&self, message_id: &str) -> Result<(), TransportError> {
        self.inbox
            .lock()
            .unwrap()
            .retain(|m| m.message_id != message_id);
        self.acknowledged
            .lock()
            .unwrap()
            .push(message_id.to_string());
        Ok(())
    }
}

/// An in-memory unlock-metadata store.
#[derive(Default)]
pub struct MemoryUnlockStore {
    records: Mutex<BTreeMap<String, UnlockMetadata>>,
}

impl UnlockStore for MemoryUnlockStore {
    fn put(&self, outpoint: &Outpoint, unlock: &UnlockMetadata) -> Result<(), StoreError> {
        self.records
            .lock()
            .unwrap()
            .insert(outpoint.to_string(), unlock.clone());
        Ok(())
    }

    fn get(&self, outpoint: &Outpoint) -> Result<Option<UnlockMetadata>, StoreError> {
        Ok(self.records.lock().unwrap().get(&outpoint.to_string()).cloned())
    }

    fn remove(&self, outpoint: &Outpoint) -> Result<Option<UnlockMetadata>, StoreError> {
        Ok(self.records.lock().unwrap().remove(&outpoint.to_string()))
    }
}
