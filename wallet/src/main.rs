//! A simple CLI wallet for Satchel tokens: mint, send, receive and check
//! balances. Key custody, transaction construction and signing live in
//! an external wallet service; this binary only drives the token
//! protocol and keeps the local unlock-metadata database.

use std::path::PathBuf;

use clap::Parser;

use satchel_core::balance;
use satchel_core::mint::mint;
use satchel_core::receive::receive;
use satchel_core::transfer::transfer;
use satchel_core::wallet::Wallet;
use satchel_core::TokenConfig;

mod cli;
mod rpc;
mod store;

use cli::{Cli, Command};

/// The default RPC endpoint of the wallet service
const DEFAULT_WALLET_ENDPOINT: &str = "http://localhost:3321";
/// The default RPC endpoint of the broadcast / acceptance network
const DEFAULT_NETWORK_ENDPOINT: &str = "http://localhost:9090";
/// The default RPC endpoint of the notification relay
const DEFAULT_RELAY_ENDPOINT: &str = "http://localhost:8080";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();

    // Parse command line args
    let cli = Cli::parse();

    let mut config = TokenConfig::default();
    if let Some(basket) = cli.basket {
        config.basket = basket;
    }

    // Setup the data path and open the local database.
    let data_path = cli.data_path.unwrap_or_else(default_data_path);
    let db_path = data_path.join("unlock_metadata");
    let store = store::SledUnlockStore::open(&db_path)?;

    // The three external collaborators.
    let wallet = rpc::RpcWallet::new(&cli.endpoint)?;
    let network = rpc::RpcBroadcast::new(&cli.network_endpoint)?;
    let relay = rpc::RpcRelay::new(&cli.relay_endpoint, &config.inbox)?;

    // Dispatch to proper subcommand
    match cli.command {
        Command::Mint { quantity } => {
            let minted = mint(&config, &wallet, &network, &store, quantity).await?;
            println!(
                "Minted {} token units of new asset {} in tx {}",
                quantity, minted.asset_id, minted.txid
            );
            Ok(())
        }
        Command::Send(args) => {
            let candidates = wallet.list_outputs(&config.basket).await?;
            let sent = transfer(
                &config,
                &wallet,
                &network,
                &relay,
                &store,
                &args.recipient,
                args.amount,
                &candidates,
            )
            .await?;
            println!(
                "Sent {} units of {} to {} in tx {} (change: {} units at output {})",
                args.amount,
                sent.asset_id,
                args.recipient,
                sent.txid,
                sent.change_amount,
                sent.change_vout
            );
            Ok(())
        }
        Command::Balance => {
            let outputs = wallet.list_outputs(&config.basket).await?;
            let report = balance::aggregate(&outputs);
            println!("Holdings in basket \"{}\":", config.basket);
            for (asset_id, amount) in &report.per_asset {
                println!("  {asset_id}: {amount}");
            }
            println!("Total across all assets: {}", report.total);
            if !report.skipped.is_empty() {
                println!(
                    "Skipped {} output(s) that did not decode as tokens",
                    report.skipped.len()
                );
            }
            Ok(())
        }
        Command::Receive => {
            let claimed = receive(&config, &wallet, &relay, &store).await?;
            if claimed.is_empty() {
                println!("No pending token payments.");
            }
            for output in claimed {
                println!("Claimed token output {} from {}", output.outpoint, output.sender);
            }
            Ok(())
        }
        Command::Identity => {
            println!("{}", wallet.identity_key().await?);
            Ok(())
        }
    }
}

/// Parse and validate a compressed public key: 66 hex characters with a
/// 02 or 03 prefix. Rejection happens here, before any network call.
pub(crate) fn pubkey_from_string(s: &str) -> Result<String, clap::Error> {
    if s.len() != 66
        || !(s.starts_with("02") || s.starts_with("03"))
        || !s.bytes().all(|b| b.is_ascii_hexdigit())
    {
        return Err(clap::Error::new(clap::error::ErrorKind::ValueValidation));
    }
    Ok(s.to_string())
}

/// Generate the platform-specific default data path for the wallet
fn default_data_path() -> PathBuf {
    // Application developers may want to put actual qualifiers or organization here
    let qualifier = "";
    let organization = "";
    let application = env!("CARGO_PKG_NAME");

    directories::ProjectDirs::from(qualifier, organization, application)
        .expect("app directories exist on all supported platforms; qed")
        .data_dir()
        .into()
}
