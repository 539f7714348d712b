use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use ergoswap_sources::{AssetCatalog, MemoryMarket};
use ergoswap_sync::{FieldValue, FormValues, Side};
use serde::Serialize;
use tracing::{error, info, warn, Level};
use tracing_subscriber::FmtSubscriber;

mod cli;
mod config;
mod driver;
mod replay;

use cli::{Cli, Commands};
use config::{generate_sample_config, SwapConfig};
use driver::FormDriver;
use replay::{load_script, Step};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging; stdout is reserved for reports
    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Init { output } => {
            init_config(output)?;
        }
        Commands::Quote {
            config,
            from,
            amount,
            to,
            to_amount,
            submit,
        } => {
            quote(config, &from, amount, &to, to_amount, submit).await?;
        }
        Commands::Replay { config, script } => {
            run_replay(config, script).await?;
        }
        Commands::Assets {
            config,
            paired_with,
        } => {
            list_assets(config, paired_with).await?;
        }
    }

    Ok(())
}

fn load_config(path: &PathBuf) -> Result<SwapConfig> {
    if !path.exists() {
        error!(
            "Configuration file not found: {:?}. Run 'ergoswap init' to create one.",
            path
        );
        return Err(anyhow::anyhow!("Configuration file not found"));
    }
    info!("Loading configuration from {:?}", path);
    SwapConfig::load(path)
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Initialize a new market configuration file
fn init_config(output: PathBuf) -> Result<()> {
    info!("Generating sample market");

    let config = generate_sample_config()?;
    config.save(&output)?;

    info!("Configuration saved to {:?}", output);
    Ok(())
}

/// Quote one side of a swap, optionally submitting it
async fn quote(
    config_path: PathBuf,
    from: &str,
    amount: Option<String>,
    to: &str,
    to_amount: Option<String>,
    submit: bool,
) -> Result<()> {
    let config = load_config(&config_path)?;
    let initial = FormValues {
        from: FieldValue::new(Some(config.asset(from)?), None),
        to: FieldValue::new(Some(config.asset(to)?), None),
    };

    let mut driver = FormDriver::start(config, initial)?;
    driver.settle().await?;

    match (amount, to_amount) {
        (Some(amount), _) => driver.edit(Side::From, None, Some(&amount))?,
        (None, Some(amount)) => driver.edit(Side::To, None, Some(&amount))?,
        (None, None) => {}
    }
    print_json(&driver.settle().await?)?;

    if submit {
        match driver.submit().await {
            Ok(submission) => print_json(&submission)?,
            Err(e) => warn!("Submit rejected: {}", e),
        }
    }

    driver.shutdown().await
}

/// Apply an edit script step by step
async fn run_replay(config_path: PathBuf, script_path: PathBuf) -> Result<()> {
    let config = load_config(&config_path)?;
    let steps = load_script(&script_path)?;
    info!("Replaying {} steps", steps.len());

    let mut driver = FormDriver::start(config, FormValues::initial())?;
    print_json(&driver.settle().await?)?;

    for (i, step) in steps.into_iter().enumerate() {
        info!("Step {}: {:?}", i + 1, step);
        match step {
            Step::Edit {
                side,
                asset,
                amount,
            } => {
                driver.edit(side, asset.as_deref(), amount.as_deref())?;
                print_json(&driver.settle().await?)?;
            }
            Step::Submit => match driver.submit().await {
                Ok(submission) => print_json(&submission)?,
                Err(e) => warn!("Submit rejected: {}", e),
            },
        }
    }

    driver.shutdown().await
}

/// Print known assets, or those sharing a pool with `paired_with`
async fn list_assets(config_path: PathBuf, paired_with: Option<String>) -> Result<()> {
    let config = load_config(&config_path)?;
    let market = MemoryMarket::from_config(&config.market)?;

    let assets = match paired_with {
        Some(key) => market.list_paired_assets(config.asset(&key)?.id).await?,
        None => market.list_assets().await?,
    };

    for asset in assets {
        println!("{:<10} {:>2}  {}", asset.name, asset.decimals, asset.id);
    }
    Ok(())
}
