//! The unlock-metadata store contract.
//!
//! Every spendable token output has exactly one [`UnlockMetadata`]
//! record, persisted out-of-band and keyed by outpoint. An output whose
//! record is missing can never be selected for a transfer; losing a
//! record permanently strands the value it guards. That risk boundary is
//! accepted by the protocol and is not a bug here.

use crate::error::StoreError;
use crate::types::{Outpoint, UnlockMetadata};

pub trait UnlockStore {
    /// Persist the unlock record for a newly created output.
    fn put(&self, outpoint: &Outpoint, unlock: &UnlockMetadata) -> Result<(), StoreError>;

    /// Retrieve the unlock record for an output, if one is stored.
    fn get(&self, outpoint: &Outpoint) -> Result<Option<UnlockMetadata>, StoreError>;

    /// Drop the record for a spent output, returning it if it existed.
    fn remove(&self, outpoint: &Outpoint) -> Result<Option<UnlockMetadata>, StoreError>;
}
