//! Transform stage: derives the dimensional schema from the staging tables.
//!
//! The dimension inserts must run before songplays so its foreign-key
//! targets exist; that ordering is a hard precondition, not style.

use crate::error::WarehouseError;
use crate::sql;
use crate::warehouse::{Statement, Warehouse};

/// The five derivations in execution order.
const TRANSFORMS: [(&str, &str); 5] = [
    ("users", sql::USERS_INSERT),
    ("songs", sql::SONGS_INSERT),
    ("artists", sql::ARTISTS_INSERT),
    ("time", sql::TIME_INSERT),
    ("songplays", sql::SONGPLAYS_INSERT),
];

/// Build the transform plan.
pub fn statements() -> Vec<Statement> {
    TRANSFORMS
        .into_iter()
        .map(|(table, insert)| {
            Statement::new(format!("inserting records into '{table}'"), insert)
        })
        .collect()
}

/// Run all five derivations against freshly loaded staging tables.
pub async fn run(warehouse: &Warehouse) -> Result<(), WarehouseError> {
    warehouse.execute_all(&statements()).await
}
