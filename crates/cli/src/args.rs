use std::path::PathBuf;

use alloy::primitives::Address;
use clap::{Parser, Subcommand};
use launchpad_sdk::{config::DEFAULT_MAX_LISTINGS, types::SaleIndex};

pub(crate) const DEFAULT_RPC_PROVIDER: &str = "http://127.0.0.1:8545";

#[derive(Parser, Debug)]
#[command(name = "launchpad-cli", version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// RPC endpoint to connect to
    #[arg(long, global = true, env = "LAUNCHPAD_RPC", default_value_t = DEFAULT_RPC_PROVIDER.to_string())]
    pub rpc: String,

    /// RPC throttling (req/sec) [default: none]
    #[arg(long, global = true, env = "LAUNCHPAD_RPC_THROTTLE")]
    pub rpc_throttle: Option<u32>,

    /// Deployment config mapping chain IDs to factory addresses
    #[arg(long, global = true, env = "LAUNCHPAD_CONFIG", default_value = "config.json")]
    pub config: PathBuf,

    /// Image table matched to sales by creation index
    #[arg(long, global = true, env = "LAUNCHPAD_IMAGES", default_value = "images.json")]
    pub images: PathBuf,

    /// Maximum number of listings to show, newest first
    #[arg(long, global = true, env = "LAUNCHPAD_MAX_LISTINGS", default_value_t = DEFAULT_MAX_LISTINGS)]
    pub max_listings: usize,

    /// Connected account [default: none, listings are hidden until
    /// connected]
    #[arg(long, global = true, env = "LAUNCHPAD_ACCOUNT")]
    pub account: Option<Address>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Synchronize once and print the listings
    Listings,
    /// Keep re-synchronizing and redraw the listings until terminated by
    /// (Ctrl+C)
    Watch {
        /// Seconds between refreshes
        #[arg(long, default_value_t = 10)]
        interval: u64,

        /// Number of refreshes to run [default: unlimited]
        #[arg(long)]
        num_refreshes: Option<u64>,
    },
    /// Show the sale created at the given index
    Token {
        /// Creation index of the sale
        index: SaleIndex,
    },
}
