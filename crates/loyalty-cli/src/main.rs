//! Demo driver for the loyalty-points protocol.
//!
//! Wires one in-process [`loyalty_server::Server`] and a handful of
//! [`loyalty_client::Client`]s through registration, a full transaction,
//! and settlement, logging each step. This is a manual-inspection tool,
//! not a benchmark harness: every run uses a fixed number of demo users
//! and a single scripted transaction.

use clap::{Parser, Subcommand};

use loyalty_types::ProtocolConfig;

mod commands;

/// Loyalty-points protocol demo.
#[derive(Parser)]
#[command(name = "loyalty-demo")]
#[command(about = "Demo driver for the privacy-preserving loyalty-points protocol")]
#[command(version)]
struct Cli {
    /// Brute-force decryption window for settlement.
    #[arg(long, default_value = "100000")]
    m_max: u32,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Register `count` demo users and print the registry root.
    Register {
        /// Number of users to register.
        #[arg(long, default_value = "3")]
        count: u32,
    },

    /// Run a full transaction between two freshly registered users and
    /// print both balances afterward.
    Transfer {
        /// Points to move from the sender to the (randomly selected)
        /// barcode owner.
        #[arg(long, default_value = "10")]
        points: i64,

        /// Number of users registered before the transfer (must be >= 2).
        #[arg(long, default_value = "3")]
        users: u32,
    },

    /// Run a transaction, then have both parties settle their balance.
    Settle {
        #[arg(long, default_value = "10")]
        points: i64,

        #[arg(long, default_value = "3")]
        users: u32,
    },
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();
    let config = ProtocolConfig {
        m_max: cli.m_max,
        ..ProtocolConfig::default()
    };

    match cli.command {
        Commands::Register { count } => commands::register(config, count),
        Commands::Transfer { points, users } => commands::transfer(config, users, points),
        Commands::Settle { points, users } => commands::settle(config, users, points),
    }
}
