//! floe: a standalone tool for provisioning a Redshift warehouse and loading
//! the Sparkify dimensional schema from S3.
//!
//! Each subcommand is one pipeline step; nothing chains automatically. The
//! usual sequence is create-stack, init-schema, load, transform, and
//! eventually delete-stack.

use clap::{Parser, Subcommand};
use snafu::prelude::*;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

use floe::config::Config;
use floe::error::{ConfigSnafu, EtlError, StackSnafu, WarehouseSnafu};
use floe::stack::StackController;
use floe::warehouse::Warehouse;
use floe::{load, schema, transform};

/// Warehouse provisioning and dimensional ETL tool.
#[derive(Parser, Debug)]
#[command(name = "floe")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the configuration file.
    #[arg(short, long)]
    config: PathBuf,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create the warehouse infrastructure stack and wait for it to come up.
    CreateStack,
    /// Delete the warehouse infrastructure stack and wait for it to be gone.
    DeleteStack,
    /// Drop and recreate the staging, dimension, and fact tables.
    InitSchema,
    /// Bulk-load raw event and song data from S3 into the staging tables.
    Load,
    /// Derive the dimension and fact tables from the staging tables.
    Transform,
}

#[snafu::report]
#[tokio::main]
async fn main() -> Result<(), EtlError> {
    let args = Args::parse();

    // Initialize logging
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let config = Config::from_file(&args.config).context(ConfigSnafu)?;

    match args.command {
        Command::CreateStack => {
            let controller = StackController::new(&config).await;
            controller.create().await.context(StackSnafu)?;
            info!("warehouse stack created");
        }
        Command::DeleteStack => {
            let controller = StackController::new(&config).await;
            controller.delete().await.context(StackSnafu)?;
            info!("warehouse stack deleted");
        }
        Command::InitSchema => {
            let warehouse = Warehouse::connect(&config.warehouse)
                .await
                .context(WarehouseSnafu)?;
            let result = schema::initialize(&warehouse).await;
            warehouse.close().await;
            result.context(WarehouseSnafu)?;
            info!("warehouse schema initialized");
        }
        Command::Load => {
            let warehouse = Warehouse::connect(&config.warehouse)
                .await
                .context(WarehouseSnafu)?;
            let result = load::run(&warehouse, &config).await;
            warehouse.close().await;
            result.context(WarehouseSnafu)?;
            info!("staging tables loaded");
        }
        Command::Transform => {
            let warehouse = Warehouse::connect(&config.warehouse)
                .await
                .context(WarehouseSnafu)?;
            let result = transform::run(&warehouse).await;
            warehouse.close().await;
            result.context(WarehouseSnafu)?;
            info!("dimensional schema populated");
        }
    }

    Ok(())
}
