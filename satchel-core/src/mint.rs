//! Minting brand-new tokens.

use crate::broadcast::Broadcast;
use crate::codec;
use crate::config::TokenConfig;
use crate::error::{TokenError, ValidationError};
use crate::store::UnlockStore;
use crate::types::{AssetId, Counterparty, Outpoint, TokenRecord, UnlockMetadata};
use crate::wallet::{ActionRequest, ActionResult, NewOutput, Wallet};

/// The outcome of a successful mint.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct MintResult {
    pub txid: String,
    /// The minting outpoint, always output 0 of the minting transaction.
    pub outpoint: Outpoint,
    /// The effective stable asset identifier, `"<txid>.0"`. The mint
    /// sentinel never outlives the minting transaction.
    pub asset_id: AssetId,
}

/// Mint `quantity` new token units into the configured basket.
///
/// The new output carries the mint sentinel as its asset identifier; the
/// sentinel is reinterpreted as `"<txid>.0"` once the wallet returns the
/// finalized transaction id. Every mint locks to the same configured key
/// id, so an acceptance network can verify all of an issuer's mints come
/// from one authority.
pub async fn mint<W, B, S>(
    config: &TokenConfig,
    wallet: &W,
    network: &B,
    store: &S,
    quantity: u64,
) -> Result<MintResult, TokenError>
where
    W: Wallet,
    B: Broadcast,
    S: UnlockStore,
{
    if quantity == 0 {
        return Err(ValidationError::new("quantity", "cannot mint zero token units").into());
    }

    let fields = codec::encode(&TokenRecord::new(AssetId::mint(), quantity))?;

    // The same lock coordinates every time we mint.
    let unlock = UnlockMetadata {
        protocol_id: config.protocol_id.clone(),
        key_id: config.mint_key_id.clone(),
        counterparty: Counterparty::SelfKey,
    };

    let result = wallet
        .create_action(ActionRequest {
            description: format!("mint {quantity} token units"),
            inputs: Vec::new(),
            outputs: vec![NewOutput {
                satoshis: config.token_satoshis,
                fields,
                lock: unlock.clone(),
                description: "minted token".to_string(),
                basket: Some(config.basket.clone()),
                tags: vec!["token".to_string(), "mint".to_string()],
            }],
            unsigned: false,
        })
        .await?;

    // Minting consumes no token input, so the wallet signs on its own.
    let signed = match result {
        ActionResult::Finalized(signed) => signed,
        ActionResult::Unsigned(action) => action.authorize_nothing().finalize(wallet).await?,
    };

    let outpoint = Outpoint {
        txid: signed.txid.clone(),
        vout: 0,
    };
    store.put(&outpoint, &unlock)?;

    // Best effort. The acceptance network for this token shape may not
    // exist yet, which is expected rather than an error.
    if let Err(e) = network.announce(&signed.txid, &signed.tx).await {
        log::warn!("could not announce mint {} to the acceptance network: {e}", signed.txid);
    }

    let asset_id = AssetId::from_outpoint(&outpoint);
    log::info!("minted {quantity} units of {asset_id} in tx {}", signed.txid);

    Ok(MintResult {
        txid: signed.txid,
        outpoint,
        asset_id,
    })
}
