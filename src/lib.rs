//! floe: provisions a cloud data warehouse and loads a dimensional schema.
//!
//! This library provides the pieces behind the `floe` CLI: a CloudFormation
//! stack controller for the warehouse cluster, a schema manager, a bulk
//! loader from S3 into staging tables, and the transform stage deriving the
//! dimension and fact tables.
//!
//! # Example
//!
//! ```ignore
//! use floe::{Config, Warehouse, schema, load, transform};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), floe::error::EtlError> {
//!     let config = Config::from_file("floe.yaml")?;
//!     let warehouse = Warehouse::connect(&config.warehouse).await?;
//!     schema::initialize(&warehouse).await?;
//!     load::run(&warehouse, &config).await?;
//!     transform::run(&warehouse).await?;
//!     warehouse.close().await;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod load;
pub mod schema;
pub mod sql;
pub mod stack;
pub mod transform;
pub mod warehouse;

// Re-export main types
pub use config::Config;
pub use stack::StackController;
pub use warehouse::{Statement, Warehouse};
