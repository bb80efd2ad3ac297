//! This crate is the core of the Satchel token protocol.
//!
//! Value is represented as a two-field data record embedded in spendable
//! UTXO outputs. Minting creates a fresh token output under a sentinel
//! asset identifier, transferring spends one token output into a payment
//! and a change output that conserve the input amount, and balances are
//! aggregated by decoding every output in a basket.
//!
//! Key custody, transaction construction and signing, ledger broadcast,
//! and message relay are all external collaborators reached through the
//! narrow contracts in [`wallet`], [`broadcast`] and [`relay`].

pub mod balance;
pub mod broadcast;
pub mod codec;
pub mod config;
pub mod error;
pub mod mint;
pub mod receive;
pub mod relay;
pub mod store;
pub mod testing;
pub mod transfer;
pub mod types;
pub mod wallet;

pub use config::TokenConfig;
pub use error::{DecodeError, EncodeError, StoreError, TokenError, TransportError};
pub use types::{AssetId, Outpoint, OutputRecord, TokenRecord, UnlockMetadata};
