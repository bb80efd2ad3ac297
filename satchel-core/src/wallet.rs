//! The narrow contract for the wallet collaborator.
//!
//! The wallet owns key custody, transaction construction, signing and
//! submission to the ledger. This crate only describes which outputs to
//! consume and create, and drives the two-phase flow for transactions
//! that spend a token output: phase 1 returns the transaction *unsigned*
//! so a custom unlock proof can be attached to the consumed input, phase
//! 2 finalizes and submits it.

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::TransportError;
use crate::types::{hex_fields, Outpoint, OutputRecord, UnlockMetadata};

/// One output the wallet is asked to create.
#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone)]
#[serde(rename_all = "camelCase")]
pub struct NewOutput {
    pub satoshis: u64,
    /// The data fields to embed in the locking condition.
    #[serde(with = "hex_fields")]
    pub fields: Vec<Vec<u8>>,
    /// The derivation coordinates of the key this output is locked to.
    pub lock: UnlockMetadata,
    pub description: String,
    /// Basket the new output is filed under, if any. A payment to
    /// someone else carries no basket; the recipient internalizes it
    /// into their own.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub basket: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// One existing output the wallet is asked to consume.
#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone)]
pub struct NewInput {
    pub outpoint: Outpoint,
    pub description: String,
}

/// A request for the wallet to construct a transaction.
#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ActionRequest {
    pub description: String,
    #[serde(default)]
    pub inputs: Vec<NewInput>,
    pub outputs: Vec<NewOutput>,
    /// When true the wallet returns the transaction unsigned so a custom
    /// unlock proof can be attached before finalization.
    #[serde(default)]
    pub unsigned: bool,
}

/// What `create_action` produced.
///
/// Outputs always appear in request order. Inputs may be reordered by
/// the wallet (it is free to add funding inputs of its own), which is
/// why consumed outputs are located by outpoint, never by position.
#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone)]
#[serde(rename_all = "camelCase")]
pub enum ActionResult {
    /// The wallet signed and submitted the transaction itself.
    Finalized(SignedAction),
    /// The unsigned transaction, awaiting a custom unlock proof.
    Unsigned(UnsignedAction),
}

/// Phase-1 state: an unsigned transaction held by the wallet under
/// `reference`, with its final input order exposed.
#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone)]
#[serde(rename_all = "camelCase")]
pub struct UnsignedAction {
    /// Opaque handle the wallet uses to resume this transaction.
    pub reference: String,
    /// The serialized unsigned transaction.
    #[serde(with = "hex::serde")]
    pub tx: Vec<u8>,
    /// The outpoints consumed by the transaction, in final input order.
    pub inputs: Vec<Outpoint>,
}

impl UnsignedAction {
    /// Locate a consumed outpoint in the final input list.
    pub fn position_of(&self, outpoint: &Outpoint) -> Option<u32> {
        self.inputs
            .iter()
            .position(|input| input == outpoint)
            .map(|vin| vin as u32)
    }

    /// Move on with no custom proofs attached. Only sensible when the
    /// transaction consumes no token input.
    pub fn authorize_nothing(self) -> PartiallyAuthorized {
        PartiallyAuthorized {
            reference: self.reference,
            proofs: BTreeMap::new(),
        }
    }

    /// Attach the unlock coordinates for one input, moving to the
    /// partially-authorized state.
    pub fn authorize(self, vin: u32, unlock: UnlockMetadata) -> PartiallyAuthorized {
        let mut proofs = BTreeMap::new();
        proofs.insert(vin, unlock);
        PartiallyAuthorized {
            reference: self.reference,
            proofs,
        }
    }
}

/// Intermediate state: custom unlock proofs attached, not yet signed.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct PartiallyAuthorized {
    pub reference: String,
    pub proofs: BTreeMap<u32, UnlockMetadata>,
}

impl PartiallyAuthorized {
    /// Hand the proofs back to the wallet for final signing.
    pub async fn finalize<W: Wallet + ?Sized>(
        self,
        wallet: &W,
    ) -> Result<SignedAction, TransportError> {
        wallet.sign_action(&self.reference, self.proofs).await
    }
}

/// Terminal state: a fully signed transaction, ready for (or already
/// submitted to) the ledger.
#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone)]
pub struct SignedAction {
    pub txid: String,
    #[serde(with = "hex::serde")]
    pub tx: Vec<u8>,
}

/// A request to claim an incoming output into one of our baskets.
#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone)]
#[serde(rename_all = "camelCase")]
pub struct InternalizeRequest {
    /// The serialized transaction that created the output.
    #[serde(with = "hex::serde")]
    pub tx: Vec<u8>,
    pub output_index: u32,
    pub basket: String,
    pub unlock: UnlockMetadata,
    pub description: String,
}

/// The wallet collaborator's interface, as consumed by the engines.
#[async_trait]
pub trait Wallet {
    /// All spendable outputs in a basket, with their embedded data fields.
    async fn list_outputs(&self, basket: &str) -> Result<Vec<OutputRecord>, TransportError>;

    /// Ask the wallet to construct (and, unless `unsigned`, sign and
    /// submit) a transaction.
    async fn create_action(&self, request: ActionRequest) -> Result<ActionResult, TransportError>;

    /// Finalize a previously created unsigned transaction, deriving the
    /// spending keys named by `proofs` (keyed by input position).
    async fn sign_action(
        &self,
        reference: &str,
        proofs: BTreeMap<u32, UnlockMetadata>,
    ) -> Result<SignedAction, TransportError>;

    /// Claim an output created by someone else's transaction into one of
    /// our baskets.
    async fn internalize_action(&self, request: InternalizeRequest) -> Result<(), TransportError>;

    /// This wallet's identity public key.
    async fn identity_key(&self) -> Result<String, TransportError>;
}
