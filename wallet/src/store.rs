//! The wallet's local database of unlock-metadata records, one per owned
//! token output, keyed by outpoint.
//!
//! Records are flushed on every write: losing one permanently strands
//! the output it unlocks.

use std::path::Path;

use satchel_core::error::StoreError;
use satchel_core::store::UnlockStore;
use satchel_core::types::{Outpoint, UnlockMetadata};

pub struct SledUnlockStore {
    tree: sled::Tree,
}

impl SledUnlockStore {
    pub fn open(path: &Path) -> anyhow::Result<Self> {
        let db = sled::open(path)?;
        let tree = db.open_tree("unlock_metadata")?;
        Ok(SledUnlockStore { tree })
    }
}

impl UnlockStore for SledUnlockStore {
    fn put(&self, outpoint: &Outpoint, unlock: &UnlockMetadata) -> Result<(), StoreError> {
        let value = serde_json::to_vec(unlock).map_err(|e| StoreError::new("put", e))?;
        self.tree
            .insert(outpoint.to_string().as_bytes(), value)
            .map_err(|e| StoreError::new("put", e))?;
        self.tree.flush().map_err(|e| StoreError::new("put", e))?;
        Ok(())
    }

    fn get(&self, outpoint: &Outpoint) -> Result<Option<UnlockMetadata>, StoreError> {
        self.tree
            .get(outpoint.to_string().as_bytes())
            .map_err(|e| StoreError::new("get", e))?
            .map(|bytes| serde_json::from_slice(&bytes).map_err(|e| StoreError::new("get", e)))
            .transpose()
    }

    fn remove(&self, outpoint: &Outpoint) -> Result<Option<UnlockMetadata>, StoreError> {
        let removed = self
            .tree
            .remove(outpoint.to_string().as_bytes())
            .map_err(|e| StoreError::new("remove", e))?
            .map(|bytes| serde_json::from_slice(&bytes).map_err(|e| StoreError::new("remove", e)))
            .transpose()?;
        self.tree.flush().map_err(|e| StoreError::new("remove", e))?;
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use satchel_core::types::{Counterparty, ProtocolId, SecurityLevel};

    fn temporary_store() -> SledUnlockStore {
        let db = sled::Config::new().temporary(true).open().unwrap();
        SledUnlockStore {
            tree: db.open_tree("unlock_metadata").unwrap(),
        }
    }

    fn sample_unlock() -> UnlockMetadata {
        UnlockMetadata {
            protocol_id: ProtocolId {
                security_level: SecurityLevel::Silent,
                protocol: "satcheltokens".to_string(),
            },
            key_id: "mint_albatross".to_string(),
            counterparty: Counterparty::SelfKey,
        }
    }

    #[test]
    fn put_get_remove_round_trip() {
        let store = temporary_store();
        let outpoint = Outpoint {
            txid: "ab".repeat(32),
            vout: 0,
        };

        assert_eq!(store.get(&outpoint).unwrap(), None);
        store.put(&outpoint, &sample_unlock()).unwrap();
        assert_eq!(store.get(&outpoint).unwrap(), Some(sample_unlock()));
        assert_eq!(store.remove(&outpoint).unwrap(), Some(sample_unlock()));
        assert_eq!(store.get(&outpoint).unwrap(), None);
    }

    #[test]
    fn records_are_keyed_per_outpoint() {
        let store = temporary_store();
        let first = Outpoint {
            txid: "ab".repeat(32),
            vout: 0,
        };
        let second = Outpoint {
            txid: "ab".repeat(32),
            vout: 1,
        };

        store.put(&first, &sample_unlock()).unwrap();
        assert!(store.get(&second).unwrap().is_none());
    }
}
