//! Warehouse connection handle.
//!
//! Wraps a `tokio_postgres` client plus its spawned connection task. The
//! handle is constructed at the start of an operation group and closed
//! unconditionally at the end of that scope; statements run outside any
//! explicit transaction, so each one commits independently.

use snafu::prelude::*;
use tokio::task::JoinHandle;
use tokio_postgres::NoTls;
use tracing::{debug, info, warn};

use crate::config::WarehouseConfig;
use crate::error::{ConnectSnafu, StatementSnafu, WarehouseError};

/// A labeled SQL statement in an execution plan.
#[derive(Debug, Clone)]
pub struct Statement {
    /// Progress line logged before the statement runs.
    pub label: String,
    pub sql: String,
}

impl Statement {
    pub fn new(label: impl Into<String>, sql: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            sql: sql.into(),
        }
    }
}

/// Handle to the warehouse, owning the client and its connection task.
pub struct Warehouse {
    client: tokio_postgres::Client,
    connection: JoinHandle<()>,
}

impl Warehouse {
    /// Connect to the warehouse described by the configuration.
    pub async fn connect(config: &WarehouseConfig) -> Result<Self, WarehouseError> {
        let mut pg = tokio_postgres::Config::new();
        pg.host(&config.host)
            .port(config.port)
            .dbname(&config.database)
            .user(&config.master_username)
            .password(&config.master_password);

        let (client, connection) = pg.connect(NoTls).await.context(ConnectSnafu)?;

        let connection = tokio::spawn(async move {
            if let Err(e) = connection.await {
                warn!("warehouse connection error: {e}");
            }
        });

        debug!(
            host = %config.host,
            port = config.port,
            database = %config.database,
            "connected to warehouse"
        );

        Ok(Self { client, connection })
    }

    /// Execute each statement of the plan in order, logging its label first.
    ///
    /// A failing statement aborts the remainder of the plan and surfaces the
    /// driver error; earlier statements stay committed.
    pub async fn execute_all(&self, plan: &[Statement]) -> Result<(), WarehouseError> {
        for statement in plan {
            info!("{}", statement.label);
            self.client
                .batch_execute(&statement.sql)
                .await
                .with_context(|_| StatementSnafu {
                    label: statement.label.clone(),
                })?;
        }
        Ok(())
    }

    /// Close the handle: drop the client and join the connection task.
    pub async fn close(self) {
        drop(self.client);
        let _ = self.connection.await;
    }
}
