//! Claiming incoming token payments from the notification relay.

use crate::config::TokenConfig;
use crate::error::TokenError;
use crate::relay::NotificationRelay;
use crate::store::UnlockStore;
use crate::types::Outpoint;
use crate::wallet::{InternalizeRequest, Wallet};

/// One payment output claimed into our basket.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct ClaimedOutput {
    pub outpoint: Outpoint,
    /// Identity key of whoever sent it.
    pub sender: String,
}

/// Poll the relay and claim every pending token notice.
///
/// Each notice is internalized into the configured basket, its unlock
/// metadata persisted under the payment outpoint, and only then
/// acknowledged: a crash mid-claim leaves the notice queued for
/// redelivery rather than stranding the output. An empty inbox is not an
/// error.
pub async fn receive<W, R, S>(
    config: &TokenConfig,
    wallet: &W,
    relay: &R,
    store: &S,
) -> Result<Vec<ClaimedOutput>, TokenError>
where
    W: Wallet,
    R: NotificationRelay,
    S: UnlockStore,
{
    let pending = relay.poll().await?;
    let mut claimed = Vec::with_capacity(pending.len());

    for message in pending {
        let notice = message.notice;
        let outpoint = Outpoint {
            txid: notice.txid.clone(),
            vout: notice.output_index,
        };

        wallet
            .internalize_action(InternalizeRequest {
                tx: notice.tx,
                output_index: notice.output_index,
                basket: config.basket.clone(),
                unlock: notice.unlock.clone(),
                description: "received token".to_string(),
            })
            .await?;

        store.put(&outpoint, &notice.unlock)?;
        relay.acknowledge(&message.message_id).await?;

        log::info!("claimed token output {outpoint} from {}", message.sender);
        claimed.push(ClaimedOutput {
            outpoint,
            sender: message.sender,
        });
    }

    Ok(claimed)
}
