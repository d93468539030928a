//! Bulk loader: copies raw JSON from object storage into the staging tables.
//!
//! One COPY covers the event logs; the song catalog is sharded by
//! leading-letter prefix in the bucket, so it loads as 26 independent
//! batches. A failing batch does not roll back the ones before it, and no
//! batch is retried.

use crate::config::Config;
use crate::error::WarehouseError;
use crate::sql;
use crate::warehouse::{Statement, Warehouse};

/// Build the staging load plan: the events COPY followed by one song COPY
/// per letter prefix.
pub fn statements(config: &Config) -> Vec<Statement> {
    let role_arn = &config.iam.role_arn;
    let region = &config.aws.region;

    let mut plan = Vec::with_capacity(1 + sql::SONG_PREFIXES.len());
    plan.push(Statement::new(
        "copying events into 'staging_events'",
        sql::copy_staging_events(
            &config.s3.log_data,
            &config.s3.log_json_path,
            role_arn,
            region,
        ),
    ));
    for prefix in sql::SONG_PREFIXES.chars() {
        plan.push(Statement::new(
            format!("copying songs into 'staging_songs', batch {prefix}"),
            sql::copy_staging_songs_batch(&config.s3.song_data, prefix, role_arn, region),
        ));
    }
    plan
}

/// Load both staging tables from object storage.
pub async fn run(warehouse: &Warehouse, config: &Config) -> Result<(), WarehouseError> {
    warehouse.execute_all(&statements(config)).await
}
