//!
//! src/load.rs  Andrew Belles  Oct 5th, 2025
//!
//! Appends a normalized table to the configured bigquery table. Creates
//! the table from the data's schema on first use; never deduplicates
//!

use serde_json::{json, Value};
use tracing::{debug, info};

use crate::errors::LoaderError;
use crate::fetch::{send_json, BigQueryClient};
use crate::table::Table;

/// Turns insertErrors from an insertAll response into a Warehouse error
fn check_insert_errors(response: &Value) -> Result<(), LoaderError> {
    match response.get("insertErrors").and_then(Value::as_array) {
        Some(errors) if !errors.is_empty() => Err(LoaderError::Warehouse(
            format!("{} rows rejected: {}", errors.len(), Value::from(errors.clone()))
        )),
        _ => Ok(())
    }
}

///
/// Streams table into the destination in batches of insert_batch_rows.
/// Rows from earlier batches stay loaded if a later batch fails
///
pub async fn append(client: &BigQueryClient, table: &Table) -> Result<usize, LoaderError> {
    let destination = &client.cfg.table;
    if table.is_empty() {
        info!(table = %destination, "load.skip.empty");
        return Ok(0);
    }

    let bearer = client.auth.token().await?;

    if !client.table_exists(destination, &bearer).await? {
        info!(table = %destination, project = %client.cfg.project_id, "load.create_table");
        client.create_table(destination, table, &bearer).await?;
    }

    let batch_rows = client.cfg.insert_batch_rows.max(1);
    let mut loaded = 0_usize;
    for (batch, rows) in table.json_rows().chunks(batch_rows).enumerate() {
        let rows: Vec<Value> = rows.iter()
            .map(|row| json!({
                "insertId": uuid::Uuid::new_v4().to_string(),
                "json": row
            }))
            .collect();
        let body = json!({
            "kind": "bigquery#tableDataInsertAllRequest",
            "skipInvalidRows": false,
            "ignoreUnknownValues": false,
            "rows": rows
        });

        let response = send_json(client.insert_all(destination, &body, &bearer)?)
            .await
            .map_err(|e| LoaderError::Warehouse(format!("insertAll {destination}: {e}")))?;
        check_insert_errors(&response)?;

        loaded += rows.len();
        debug!(batch, rows = rows.len(), loaded, "load.batch");
    }

    info!(table = %destination, rows = loaded, "load.done");
    Ok(loaded)
}
