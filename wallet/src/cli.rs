//! Satchel wallet's command line interface.
//!
//! Built with clap's derive macros.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::{
    pubkey_from_string, DEFAULT_NETWORK_ENDPOINT, DEFAULT_RELAY_ENDPOINT, DEFAULT_WALLET_ENDPOINT,
};

/// The wallet's main CLI struct
#[derive(Debug, Parser)]
#[command(about, version)]
pub struct Cli {
    #[arg(long, short, default_value_t = DEFAULT_WALLET_ENDPOINT.to_string())]
    /// RPC endpoint of the wallet service this client will connect to
    pub endpoint: String,

    #[arg(long, short, default_value_t = DEFAULT_NETWORK_ENDPOINT.to_string())]
    /// RPC endpoint of the broadcast / acceptance network
    pub network_endpoint: String,

    #[arg(long, short, default_value_t = DEFAULT_RELAY_ENDPOINT.to_string())]
    /// RPC endpoint of the notification relay
    pub relay_endpoint: String,

    #[arg(long, short)]
    /// Path where the wallet data is stored. Currently this is just the
    /// unlock-metadata database.
    ///
    /// Default value is platform specific.
    pub data_path: Option<PathBuf>,

    #[arg(long, short)]
    /// Basket that groups this account's token outputs. Defaults to the
    /// protocol's standard basket name.
    pub basket: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

/// The tasks supported by the wallet
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Mint new token units under a brand-new asset identifier.
    Mint {
        /// How many token units to create. Must be positive.
        #[arg(value_parser = clap::value_parser!(u64).range(1..))]
        quantity: u64,
    },

    /// Send token units to a recipient. Change comes back to this wallet.
    Send(SendArgs),

    /// Show holdings in the token basket, per asset.
    Balance,

    /// Claim token payments waiting in the relay inbox.
    Receive,

    /// Print this wallet's identity public key.
    Identity,
}

#[derive(Debug, Args)]
pub struct SendArgs {
    /// Compressed public key of the recipient: 66 hex characters
    /// starting with 02 or 03.
    #[arg(value_parser = pubkey_from_string)]
    pub recipient: String,

    /// Amount of token units to send. Must be positive.
    #[arg(value_parser = clap::value_parser!(u64).range(1..))]
    pub amount: u64,
}
