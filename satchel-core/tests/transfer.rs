//! Transfer scenarios: conservation, lineage resolution, rejection and
//! the two-phase signing flow.

use satchel_core::codec;
use satchel_core::error::TokenError;
use satchel_core::store::UnlockStore;
use satchel_core::testing::{fake_txid, MemoryUnlockStore, MockBroadcast, MockRelay, MockWallet};
use satchel_core::transfer::{transfer, CHANGE_VOUT, PAYMENT_VOUT};
use satchel_core::types::{
    AssetId, Counterparty, Outpoint, OutputRecord, ProtocolId, SecurityLevel, TokenRecord,
    UnlockMetadata,
};
use satchel_core::TokenConfig;

fn recipient() -> String {
    format!("03{}", "22".repeat(32))
}

fn unlock_for(config: &TokenConfig) -> UnlockMetadata {
    UnlockMetadata {
        protocol_id: config.protocol_id.clone(),
        key_id: config.mint_key_id.clone(),
        counterparty: Counterparty::SelfKey,
    }
}

/// A candidate output holding `amount` units under `asset`, with its
/// unlock metadata already in `store`.
fn candidate(asset: AssetId, amount: u64, store: &MemoryUnlockStore) -> OutputRecord {
    let outpoint = Outpoint {
        txid: fake_txid(0xabc),
        vout: 0,
    };
    store
        .put(&outpoint, &unlock_for(&TokenConfig::default()))
        .unwrap();
    OutputRecord {
        outpoint,
        satoshis: 1,
        fields: codec::encode(&TokenRecord::new(asset, amount)).unwrap(),
        tags: vec!["token".to_string()],
    }
}

#[tokio::test]
async fn payment_and_change_conserve_the_input_amount() {
    let config = TokenConfig::default();
    let wallet = MockWallet::default();
    let network = MockBroadcast::default();
    let relay = MockRelay::default();
    let store = MemoryUnlockStore::default();
    let candidates = vec![candidate(AssetId::mint(), 1000, &store)];

    let result = transfer(
        &config, &wallet, &network, &relay, &store, &recipient(), 300, &candidates,
    )
    .await
    .unwrap();

    let request = &wallet.created()[0];
    let payment = codec::decode(&request.outputs[PAYMENT_VOUT as usize].fields).unwrap();
    let change = codec::decode(&request.outputs[CHANGE_VOUT as usize].fields).unwrap();
    assert_eq!(payment.amount, 300);
    assert_eq!(change.amount, 700);
    assert_eq!(payment.amount + change.amount, 1000);
    assert_eq!(payment.asset_id, change.asset_id);
    assert_eq!(result.change_amount, 700);
}

#[tokio::test]
async fn conservation_holds_at_both_boundaries() {
    for (send, expected_change) in [(0u64, 1000u64), (1000, 0)] {
        let config = TokenConfig::default();
        let wallet = MockWallet::default();
        let network = MockBroadcast::default();
        let relay = MockRelay::default();
        let store = MemoryUnlockStore::default();
        let candidates = vec![candidate(AssetId::mint(), 1000, &store)];

        let result = transfer(
            &config, &wallet, &network, &relay, &store, &recipient(), send, &candidates,
        )
        .await
        .unwrap();
        assert_eq!(result.change_amount, expected_change);
    }
}

#[tokio::test]
async fn mint_sentinel_resolves_to_the_spent_outpoint() {
    let config = TokenConfig::default();
    let wallet = MockWallet::default();
    let network = MockBroadcast::default();
    let relay = MockRelay::default();
    let store = MemoryUnlockStore::default();
    let candidates = vec![candidate(AssetId::mint(), 1000, &store)];

    let result = transfer(
        &config, &wallet, &network, &relay, &store, &recipient(), 300, &candidates,
    )
    .await
    .unwrap();

    let expected = AssetId::from_outpoint(&candidates[0].outpoint);
    assert_eq!(result.asset_id, expected);

    // Neither new output ever carries the literal sentinel.
    let request = &wallet.created()[0];
    for output in &request.outputs {
        let record = codec::decode(&output.fields).unwrap();
        assert_eq!(record.asset_id, expected);
        assert!(!record.asset_id.is_mint());
    }
}

#[tokio::test]
async fn an_already_stable_asset_id_is_kept_unchanged() {
    let config = TokenConfig::default();
    let wallet = MockWallet::default();
    let network = MockBroadcast::default();
    let relay = MockRelay::default();
    let store = MemoryUnlockStore::default();
    let origin = AssetId::new(format!("{}.0", fake_txid(0x111)));
    let candidates = vec![candidate(origin.clone(), 500, &store)];

    let result = transfer(
        &config, &wallet, &network, &relay, &store, &recipient(), 200, &candidates,
    )
    .await
    .unwrap();
    assert_eq!(result.asset_id, origin);
}

#[tokio::test]
async fn overspending_is_rejected_and_no_transaction_is_constructed() {
    let config = TokenConfig::default();
    let wallet = MockWallet::default();
    let network = MockBroadcast::default();
    let relay = MockRelay::default();
    let store = MemoryUnlockStore::default();
    let candidates = vec![candidate(AssetId::mint(), 100, &store)];

    let result = transfer(
        &config, &wallet, &network, &relay, &store, &recipient(), 101, &candidates,
    )
    .await;

    assert!(matches!(
        result,
        Err(TokenError::InsufficientBalance {
            requested: 101,
            available: 100,
        })
    ));
    assert!(wallet.created().is_empty());
    assert!(network.broadcasted.lock().unwrap().is_empty());
}

#[tokio::test]
async fn no_candidates_means_nothing_to_spend() {
    let config = TokenConfig::default();
    let wallet = MockWallet::default();
    let network = MockBroadcast::default();
    let relay = MockRelay::default();
    let store = MemoryUnlockStore::default();

    let result = transfer(
        &config, &wallet, &network, &relay, &store, &recipient(), 1, &[],
    )
    .await;
    assert!(matches!(result, Err(TokenError::NoEligibleOutput)));
}

#[tokio::test]
async fn undecodable_selected_output_is_fatal() {
    let config = TokenConfig::default();
    let wallet = MockWallet::default();
    let network = MockBroadcast::default();
    let relay = MockRelay::default();
    let store = MemoryUnlockStore::default();
    let mut bad = candidate(AssetId::mint(), 100, &store);
    bad.fields.pop();

    let result = transfer(
        &config, &wallet, &network, &relay, &store, &recipient(), 1, &[bad],
    )
    .await;
    assert!(matches!(
        result,
        Err(TokenError::SelectedOutputUndecodable { .. })
    ));
    assert!(wallet.created().is_empty());
}

#[tokio::test]
async fn missing_unlock_metadata_blocks_the_transfer() {
    let config = TokenConfig::default();
    let wallet = MockWallet::default();
    let network = MockBroadcast::default();
    let relay = MockRelay::default();
    let store = MemoryUnlockStore::default();
    let candidates = vec![candidate(AssetId::mint(), 100, &store)];
    store.remove(&candidates[0].outpoint).unwrap();

    let result = transfer(
        &config, &wallet, &network, &relay, &store, &recipient(), 10, &candidates,
    )
    .await;
    assert!(matches!(
        result,
        Err(TokenError::MissingUnlockMetadata(_))
    ));
    assert!(wallet.created().is_empty());
}

#[tokio::test]
async fn unlock_proof_lands_on_the_right_input_even_when_reordered() {
    let config = TokenConfig::default();
    // The wallet prepends two funding inputs, pushing ours to vin 2.
    let wallet = MockWallet::default().with_funding_inputs(2);
    let network = MockBroadcast::default();
    let relay = MockRelay::default();
    let store = MemoryUnlockStore::default();
    let candidates = vec![candidate(AssetId::mint(), 1000, &store)];
    let input_unlock = store.get(&candidates[0].outpoint).unwrap().unwrap();

    transfer(
        &config, &wallet, &network, &relay, &store, &recipient(), 300, &candidates,
    )
    .await
    .unwrap();

    let signed = wallet.signed();
    assert_eq!(signed.len(), 1);
    let proofs = &signed[0].1;
    assert_eq!(proofs.len(), 1);
    assert_eq!(proofs.get(&2), Some(&input_unlock));
}

#[tokio::test]
async fn transfer_notifies_the_recipient_and_rotates_stored_metadata() {
    let config = TokenConfig::default();
    let wallet = MockWallet::default();
    let network = MockBroadcast::default();
    let relay = MockRelay::default();
    let store = MemoryUnlockStore::default();
    let candidates = vec![candidate(AssetId::mint(), 1000, &store)];
    let to = recipient();

    let result = transfer(
        &config, &wallet, &network, &relay, &store, &to, 300, &candidates,
    )
    .await
    .unwrap();

    // The signed transaction reached the ledger.
    assert_eq!(*network.broadcasted.lock().unwrap(), vec![result.txid.clone()]);

    // The recipient got the payment notice, with the sender named as the
    // counterparty of the recipient-side unlock record.
    let sent = relay.sent.lock().unwrap();
    assert_eq!(sent.len(), 1);
    let (sent_to, notice) = &sent[0];
    assert_eq!(sent_to, &to);
    assert_eq!(notice.txid, result.txid);
    assert_eq!(notice.output_index, PAYMENT_VOUT);
    assert_eq!(
        notice.unlock.counterparty,
        Counterparty::Key(wallet.identity.clone())
    );

    // Change metadata stored, spent metadata gone.
    let change_outpoint = Outpoint {
        txid: result.txid.clone(),
        vout: CHANGE_VOUT,
    };
    let change_unlock = store.get(&change_outpoint).unwrap().unwrap();
    assert_eq!(change_unlock.counterparty, Counterparty::SelfKey);
    assert_eq!(change_unlock.key_id, notice.unlock.key_id);
    assert!(store.get(&candidates[0].outpoint).unwrap().is_none());
}

#[tokio::test]
async fn each_transfer_derives_a_fresh_key_id() {
    let config = TokenConfig::default();
    let network = MockBroadcast::default();
    let relay = MockRelay::default();

    let mut seen = Vec::new();
    for _ in 0..2 {
        let wallet = MockWallet::default();
        let store = MemoryUnlockStore::default();
        let candidates = vec![candidate(AssetId::mint(), 1000, &store)];
        transfer(
            &config, &wallet, &network, &relay, &store, &recipient(), 1, &candidates,
        )
        .await
        .unwrap();
        let key_id = wallet.created()[0].outputs[0].lock.key_id.clone();
        assert_ne!(key_id, config.mint_key_id);
        seen.push(key_id);
    }
    assert_ne!(seen[0], seen[1]);
}

#[tokio::test]
async fn failed_broadcast_aborts_before_any_notice_is_sent() {
    let config = TokenConfig::default();
    let wallet = MockWallet::default();
    let network = MockBroadcast {
        fail_broadcast: true,
        ..Default::default()
    };
    let relay = MockRelay::default();
    let store = MemoryUnlockStore::default();
    let candidates = vec![candidate(AssetId::mint(), 1000, &store)];

    let result = transfer(
        &config, &wallet, &network, &relay, &store, &recipient(), 300, &candidates,
    )
    .await;

    assert!(matches!(result, Err(TokenError::Transport(_))));
    assert!(relay.sent.lock().unwrap().is_empty());
    // The consumed output's record survives for the retry from scratch.
    assert!(store.get(&candidates[0].outpoint).unwrap().is_some());
}

#[tokio::test]
async fn mint_then_transfer_anchors_the_asset_to_the_mint_outpoint() {
    let config = TokenConfig::default();
    let wallet = MockWallet::default();
    let network = MockBroadcast::default();
    let relay = MockRelay::default();
    let store = MemoryUnlockStore::default();

    let minted = satchel_core::mint::mint(&config, &wallet, &network, &store, 1000)
        .await
        .unwrap();

    // The freshly minted output, as the wallet would later list it.
    let minted_candidate = OutputRecord {
        outpoint: minted.outpoint.clone(),
        satoshis: 1,
        fields: wallet.created()[0].outputs[0].fields.clone(),
        tags: vec!["token".to_string(), "mint".to_string()],
    };

    let result = transfer(
        &config,
        &wallet,
        &network,
        &relay,
        &store,
        &recipient(),
        300,
        &[minted_candidate],
    )
    .await
    .unwrap();

    assert_eq!(result.asset_id, minted.asset_id);
    assert_eq!(result.asset_id, AssetId::from_outpoint(&minted.outpoint));
}

#[tokio::test]
async fn unlock_metadata_wire_shape_is_stable() {
    // The recipient-side record must deserialize from the exact JSON the
    // relay carries.
    let unlock = UnlockMetadata {
        protocol_id: ProtocolId {
            security_level: SecurityLevel::Silent,
            protocol: "satcheltokens".to_string(),
        },
        key_id: "0190b44e-1111-7222-8333-444455556666".to_string(),
        counterparty: Counterparty::Key(recipient()),
    };
    let json = serde_json::to_string(&unlock).unwrap();
    let back: UnlockMetadata = serde_json::from_str(&json).unwrap();
    assert_eq!(back, unlock);
}
