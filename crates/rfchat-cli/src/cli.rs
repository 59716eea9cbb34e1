//! Command-line interface definitions and parsing

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Suppress all logging
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// How long each pump waits on input or the link before re-checking the disconnect signal
    #[arg(long, global = true, value_name = "MS")]
    pub poll_timeout_ms: Option<u64>,

    /// Pause between failed connection attempts
    #[arg(long, global = true, value_name = "MS")]
    pub retry_delay_ms: Option<u64>,

    /// Do not make the adapter discoverable before advertising
    #[arg(long, global = true)]
    pub no_discoverable: bool,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Find the service on a remote host and chat with it
    Client {
        /// Service name to look for
        name: String,
        /// Service UUID to look for
        uuid: String,
        /// Bluetooth address of the remote host
        address: String,
        /// Connect straight to this RFCOMM channel instead of resolving it
        #[arg(long)]
        channel: Option<u8>,
    },
    /// Advertise the service and chat with whoever connects
    Server {
        /// Service name to advertise
        name: String,
        /// Service UUID to advertise
        uuid: String,
        /// RFCOMM channel to listen on (any free channel when omitted)
        #[arg(long)]
        channel: Option<u8>,
    },
}
