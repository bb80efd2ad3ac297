//! Transferring tokens: spend one token output, emit a payment output to
//! the recipient and a change output back to ourselves.
//!
//! Conservation holds by construction: payment + change always equals
//! the amount carried by the consumed input, and an over-spend is
//! rejected before any transaction is constructed.

use uuid::Uuid;

use crate::broadcast::Broadcast;
use crate::codec;
use crate::config::TokenConfig;
use crate::error::TokenError;
use crate::relay::{NotificationRelay, TokenNotice};
use crate::store::UnlockStore;
use crate::types::{AssetId, Counterparty, Outpoint, OutputRecord, TokenRecord, UnlockMetadata};
use crate::wallet::{ActionRequest, ActionResult, NewInput, NewOutput, Wallet};

/// Position of the payment output in every transfer transaction.
pub const PAYMENT_VOUT: u32 = 0;
/// Position of the change output in every transfer transaction.
pub const CHANGE_VOUT: u32 = 1;

/// The outcome of a successful transfer.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct TransferResult {
    pub txid: String,
    pub payment_vout: u32,
    pub change_vout: u32,
    /// The stable asset identifier both new outputs carry.
    pub asset_id: AssetId,
    pub change_amount: u64,
}

/// Send `amount` token units to `recipient`, spending the first of
/// `candidates` and keeping the change.
///
/// The candidate's asset identifier is resolved on first spend: a mint
/// sentinel becomes the candidate's own outpoint, anything else is kept
/// unchanged. Both new outputs carry the resolved identifier.
pub async fn transfer<W, B, R, S>(
    config: &TokenConfig,
    wallet: &W,
    network: &B,
    relay: &R,
    store: &S,
    recipient: &str,
    amount: u64,
    candidates: &[OutputRecord],
) -> Result<TransferResult, TokenError>
where
    W: Wallet,
    B: Broadcast,
    R: NotificationRelay,
    S: UnlockStore,
{
    // Selection policy: first candidate in the list. Concurrent spends of
    // the same output are arbitrated by the wallet's double-spend
    // rejection, not here.
    let candidate = candidates.first().ok_or(TokenError::NoEligibleOutput)?;

    let record = codec::decode(&candidate.fields).map_err(|source| {
        TokenError::SelectedOutputUndecodable {
            outpoint: candidate.outpoint.clone(),
            source,
        }
    })?;

    // First-spend lineage resolution.
    let asset_id = if record.asset_id.is_mint() {
        AssetId::from_outpoint(&candidate.outpoint)
    } else {
        record.asset_id
    };

    let change_amount =
        record
            .amount
            .checked_sub(amount)
            .ok_or(TokenError::InsufficientBalance {
                requested: amount,
                available: record.amount,
            })?;

    // The consumed input must have its unlock record before we go near
    // the network.
    let input_unlock = store
        .get(&candidate.outpoint)?
        .ok_or_else(|| TokenError::MissingUnlockMetadata(candidate.outpoint.clone()))?;

    let sender_identity = wallet.identity_key().await?;

    // A fresh derivation path per transfer; the payment and change locks
    // still differ by counterparty.
    let fresh_key_id = Uuid::now_v7().to_string();

    let payment_lock = UnlockMetadata {
        protocol_id: config.protocol_id.clone(),
        key_id: fresh_key_id.clone(),
        counterparty: Counterparty::Key(recipient.to_string()),
    };
    // What the recipient stores: same coordinates, seen from their side,
    // where the counterparty is us.
    let payment_unlock_for_recipient = UnlockMetadata {
        protocol_id: config.protocol_id.clone(),
        key_id: fresh_key_id.clone(),
        counterparty: Counterparty::Key(sender_identity),
    };
    let change_lock = UnlockMetadata {
        protocol_id: config.protocol_id.clone(),
        key_id: fresh_key_id,
        counterparty: Counterparty::SelfKey,
    };

    let payment_fields = codec::encode(&TokenRecord::new(asset_id.clone(), amount))?;
    let change_fields = codec::encode(&TokenRecord::new(asset_id.clone(), change_amount))?;

    let result = wallet
        .create_action(ActionRequest {
            description: format!("send {amount} token units, keep the change"),
            inputs: vec![NewInput {
                outpoint: candidate.outpoint.clone(),
                description: "spend existing token".to_string(),
            }],
            outputs: vec![
                NewOutput {
                    satoshis: config.token_satoshis,
                    fields: payment_fields,
                    lock: payment_lock,
                    description: "transferred token".to_string(),
                    basket: None,
                    tags: vec!["token".to_string(), "payment".to_string()],
                },
                NewOutput {
                    satoshis: config.token_satoshis,
                    fields: change_fields,
                    lock: change_lock.clone(),
                    description: "token change".to_string(),
                    basket: Some(config.basket.clone()),
                    tags: vec!["token".to_string(), "change".to_string()],
                },
            ],
            unsigned: true,
        })
        .await?;

    let unsigned = match result {
        ActionResult::Unsigned(unsigned) => unsigned,
        ActionResult::Finalized(signed) => {
            // The wallet must not sign a token spend on its own; the
            // consumed input needs our unlock proof.
            return Err(crate::error::TransportError::new(
                "wallet_createAction",
                format!("wallet finalized tx {} without our unlock proof", signed.txid),
            )
            .into());
        }
    };

    // The wallet may add funding inputs and reorder, so find our input
    // by outpoint, never by position.
    let vin = unsigned.position_of(&candidate.outpoint).ok_or_else(|| {
        crate::error::TransportError::new(
            "wallet_createAction",
            format!(
                "unsigned tx does not consume the requested outpoint {}",
                candidate.outpoint
            ),
        )
    })?;

    let signed = unsigned.authorize(vin, input_unlock).finalize(wallet).await?;

    network.broadcast(&signed.txid, &signed.tx).await?;

    // The spent record is useless now; the change record takes its place.
    store.put(
        &Outpoint {
            txid: signed.txid.clone(),
            vout: CHANGE_VOUT,
        },
        &change_lock,
    )?;
    store.remove(&candidate.outpoint)?;

    relay
        .send(
            recipient,
            &TokenNotice {
                txid: signed.txid.clone(),
                output_index: PAYMENT_VOUT,
                tx: signed.tx,
                unlock: payment_unlock_for_recipient,
            },
        )
        .await?;

    log::info!(
        "sent {amount} units of {asset_id} to {recipient} in tx {} (change {change_amount})",
        signed.txid
    );

    Ok(TransferResult {
        txid: signed.txid,
        payment_vout: PAYMENT_VOUT,
        change_vout: CHANGE_VOUT,
        asset_id,
        change_amount,
    })
}
