//! Minting scenarios against the in-memory collaborators.

use satchel_core::codec;
use satchel_core::error::TokenError;
use satchel_core::mint::mint;
use satchel_core::store::UnlockStore;
use satchel_core::testing::{MemoryUnlockStore, MockBroadcast, MockWallet};
use satchel_core::types::{AssetId, Counterparty, Outpoint};
use satchel_core::TokenConfig;

#[tokio::test]
async fn mint_carries_sentinel_then_resolves_to_outpoint() {
    let config = TokenConfig::default();
    let wallet = MockWallet::default();
    let network = MockBroadcast::default();
    let store = MemoryUnlockStore::default();

    let result = mint(&config, &wallet, &network, &store, 1000)
        .await
        .unwrap();

    // The output requested from the wallet still carries the sentinel.
    let created = wallet.created();
    assert_eq!(created.len(), 1);
    assert!(created[0].inputs.is_empty());
    assert_eq!(created[0].outputs.len(), 1);
    let requested = &created[0].outputs[0];
    let record = codec::decode(&requested.fields).unwrap();
    assert!(record.asset_id.is_mint());
    assert_eq!(record.amount, 1000);
    assert_eq!(requested.satoshis, 1);
    assert_eq!(requested.basket.as_deref(), Some(config.basket.as_str()));
    assert_eq!(requested.tags, vec!["token", "mint"]);

    // The effective asset id is the minting outpoint, never the sentinel.
    assert_eq!(
        result.outpoint,
        Outpoint {
            txid: result.txid.clone(),
            vout: 0,
        }
    );
    assert_eq!(result.asset_id, AssetId::from_outpoint(&result.outpoint));
    assert!(!result.asset_id.is_mint());
}

#[tokio::test]
async fn mint_persists_unlock_metadata_under_the_minting_outpoint() {
    let config = TokenConfig::default();
    let wallet = MockWallet::default();
    let network = MockBroadcast::default();
    let store = MemoryUnlockStore::default();

    let result = mint(&config, &wallet, &network, &store, 42).await.unwrap();

    let unlock = store.get(&result.outpoint).unwrap().unwrap();
    assert_eq!(unlock.key_id, config.mint_key_id);
    assert_eq!(unlock.counterparty, Counterparty::SelfKey);
    assert_eq!(unlock.protocol_id, config.protocol_id);
}

#[tokio::test]
async fn every_mint_locks_to_the_same_issuer_key() {
    let config = TokenConfig::default();
    let wallet = MockWallet::default();
    let network = MockBroadcast::default();
    let store = MemoryUnlockStore::default();

    mint(&config, &wallet, &network, &store, 10).await.unwrap();
    mint(&config, &wallet, &network, &store, 20).await.unwrap();

    for request in wallet.created() {
        assert_eq!(request.outputs[0].lock.key_id, config.mint_key_id);
    }
}

#[tokio::test]
async fn mint_announces_to_the_acceptance_network() {
    let config = TokenConfig::default();
    let wallet = MockWallet::default();
    let network = MockBroadcast::default();
    let store = MemoryUnlockStore::default();

    let result = mint(&config, &wallet, &network, &store, 5).await.unwrap();
    assert_eq!(*network.announced.lock().unwrap(), vec![result.txid]);
}

#[tokio::test]
async fn announce_failure_does_not_fail_the_mint() {
    let config = TokenConfig::default();
    let wallet = MockWallet::default();
    let network = MockBroadcast {
        fail_announce: true,
        ..Default::default()
    };
    let store = MemoryUnlockStore::default();

    let result = mint(&config, &wallet, &network, &store, 5).await;
    assert!(result.is_ok());
}

#[tokio::test]
async fn minting_zero_units_is_rejected_before_any_call() {
    let config = TokenConfig::default();
    let wallet = MockWallet::default();
    let network = MockBroadcast::default();
    let store = MemoryUnlockStore::default();

    let result = mint(&config, &wallet, &network, &store, 0).await;
    assert!(matches!(result, Err(TokenError::Validation(_))));
    assert!(wallet.created().is_empty());
}
