//! Schema manager: drops and recreates the warehouse tables.
//!
//! Every run destroys and rebuilds all seven tables, so staging data is
//! truncate-and-reload and the derived tables always start empty.

use crate::error::WarehouseError;
use crate::sql;
use crate::warehouse::{Statement, Warehouse};

/// The managed tables paired with their DDL, in creation dependency order:
/// staging first, then the dimensions (artists before songs, which
/// references it), then the fact table last.
const TABLES: [(&str, &str); 7] = [
    ("staging_events", sql::STAGING_EVENTS_CREATE),
    ("staging_songs", sql::STAGING_SONGS_CREATE),
    ("users", sql::USERS_CREATE),
    ("artists", sql::ARTISTS_CREATE),
    ("songs", sql::SONGS_CREATE),
    ("time", sql::TIME_CREATE),
    ("songplays", sql::SONGPLAYS_CREATE),
];

/// Build the drop+create plan for all tables.
pub fn statements() -> Vec<Statement> {
    let mut plan = Vec::with_capacity(TABLES.len() * 2);
    for (table, create) in TABLES {
        plan.push(Statement::new(
            format!("dropping table '{table}'"),
            sql::drop_table(table),
        ));
        plan.push(Statement::new(format!("creating table '{table}'"), create));
    }
    plan
}

/// Drop and recreate all tables in dependency order.
pub async fn initialize(warehouse: &Warehouse) -> Result<(), WarehouseError> {
    warehouse.execute_all(&statements()).await
}
