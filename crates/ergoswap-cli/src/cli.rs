use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// ErgoSwap - Swap form quotes against a configured market
#[derive(Parser)]
#[command(name = "ergoswap")]
#[command(about = "Swap form driver and market utilities")]
#[command(version)]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write a sample market configuration
    Init {
        /// Output path for configuration file
        #[arg(short, long, default_value = "market.json")]
        output: PathBuf,
    },

    /// Fill in one side of a swap and print the resolved form
    Quote {
        /// Path to configuration file
        #[arg(short, long, default_value = "market.json")]
        config: PathBuf,

        /// Asset to give (name or hex id)
        #[arg(long, default_value = "ERG")]
        from: String,

        /// Amount to give
        #[arg(long, conflicts_with = "to_amount")]
        amount: Option<String>,

        /// Asset to receive (name or hex id)
        #[arg(long)]
        to: String,

        /// Amount to receive
        #[arg(long)]
        to_amount: Option<String>,

        /// Submit the form after quoting
        #[arg(long)]
        submit: bool,
    },

    /// Apply a JSON script of edits, printing the form after each step
    Replay {
        /// Path to configuration file
        #[arg(short, long, default_value = "market.json")]
        config: PathBuf,

        /// Edit script (JSON array of steps)
        #[arg(short, long)]
        script: PathBuf,
    },

    /// List known assets
    Assets {
        /// Path to configuration file
        #[arg(short, long, default_value = "market.json")]
        config: PathBuf,

        /// Only assets sharing a pool with this one
        #[arg(long)]
        paired_with: Option<String>,
    },
}
