//! Shadow-table emulation of `ALTER COLUMN` and `DROP COLUMN`.
//!
//! SQLite cannot change a column's type or nullability in place, so the
//! table is rebuilt:
//!
//! 1. create `_strata_shadow_<table>` with the target shape
//! 2. copy every row, converting columns as the changes require
//! 3. drop the original and rename the shadow into place
//! 4. recreate the target's indexes
//!
//! All steps run in one transaction on a dedicated connection with foreign
//! key enforcement switched off. If any step fails the transaction is rolled
//! back, which leaves the original table untouched and removes the shadow.

use sqlx::sqlite::{Sqlite, SqliteConnection};
use sqlx::{Connection, Row as _, SqlitePool, Transaction};
use strata_core::schema::{ColumnChange, ColumnInfo, TableShape};
use strata_core::{AdapterError, AdapterErrorKind, Dialect};

use crate::ddl;
use crate::error::classify;

/// Prefix of the temporary table a rebuild copies into.
pub const SHADOW_PREFIX: &str = "_strata_shadow_";

/// Rebuilds `target.name` into the shape `target`.
pub(crate) async fn recreate_with_shape(
    pool: &SqlitePool,
    target: &TableShape,
    changes: &[ColumnChange],
) -> Result<(), AdapterError> {
    let mut conn = pool.acquire().await.map_err(classify)?;

    let current = describe(&mut *conn, &target.name).await?;
    if current.is_empty() {
        return Err(AdapterError::new(
            Dialect::Sqlite,
            AdapterErrorKind::Database,
            format!("cannot rebuild missing table '{}'", target.name),
        ));
    }
    if matches_shape(&current, target) {
        log::debug!("Table {} already has the target shape", target.name);
        return Ok(());
    }

    let foreign_keys: i64 = sqlx::query_scalar("PRAGMA foreign_keys")
        .fetch_one(&mut *conn)
        .await
        .map_err(classify)?;
    if foreign_keys != 0 {
        sqlx::query("PRAGMA foreign_keys = OFF")
            .execute(&mut *conn)
            .await
            .map_err(classify)?;
    }

    let result = rebuild(&mut *conn, target, changes, &current).await;

    if foreign_keys != 0 {
        if let Err(e) = sqlx::query("PRAGMA foreign_keys = ON")
            .execute(&mut *conn)
            .await
        {
            log::warn!("Failed to re-enable foreign keys after rebuilding {}: {}", target.name, e);
        }
    }

    result
}

async fn rebuild(
    conn: &mut SqliteConnection,
    target: &TableShape,
    changes: &[ColumnChange],
    current: &[ColumnInfo],
) -> Result<(), AdapterError> {
    let mut tx = conn.begin().await.map_err(classify)?;

    match copy_and_swap(&mut tx, target, changes, current).await {
        Ok(()) => {
            tx.commit().await.map_err(classify)?;
            log::info!("Rebuilt table {} with its new shape", target.name);
            Ok(())
        }
        Err(e) => {
            log::error!("Rebuilding table {} failed, rolling back: {}", target.name, e);
            if let Err(rollback) = tx.rollback().await {
                log::warn!("Rollback of {} rebuild failed: {}", target.name, rollback);
            }
            Err(e)
        }
    }
}

async fn copy_and_swap(
    tx: &mut Transaction<'_, Sqlite>,
    target: &TableShape,
    changes: &[ColumnChange],
    current: &[ColumnInfo],
) -> Result<(), AdapterError> {
    let shadow = format!("{SHADOW_PREFIX}{}", target.name);

    let mut statements = vec![
        format!("DROP TABLE IF EXISTS {}", ddl::ident(&shadow)),
        ddl::create_table_sql(target, &shadow),
        copy_sql(target, changes, current, &shadow),
        format!("DROP TABLE {}", ddl::ident(&target.name)),
        format!(
            "ALTER TABLE {} RENAME TO {}",
            ddl::ident(&shadow),
            ddl::ident(&target.name)
        ),
    ];
    statements.extend(target.indexes.iter().map(ddl::create_index_sql));

    for statement in &statements {
        sqlx::query(statement)
            .execute(&mut **tx)
            .await
            .map_err(classify)?;
    }
    Ok(())
}

/// Renders the `INSERT ... SELECT` that fills the shadow table.
///
/// Target columns missing from the current table are left to their
/// defaults; current columns missing from the target are dropped.
pub(crate) fn copy_sql(
    target: &TableShape,
    changes: &[ColumnChange],
    current: &[ColumnInfo],
    shadow: &str,
) -> String {
    let mut columns = Vec::new();
    let mut selects = Vec::new();

    for column in &target.columns {
        if !current.iter().any(|c| c.name == column.name) {
            continue;
        }
        let source = ddl::ident(&column.name);
        let mut expr = source.clone();

        for change in changes {
            match change {
                ColumnChange::ChangeType { column: name, ty } if *name == column.name => {
                    expr = format!("CAST({expr} AS {})", ddl::cast_target(*ty));
                }
                ColumnChange::SetNotNull {
                    column: name,
                    backfill: Some(value),
                } if *name == column.name => {
                    expr = format!("COALESCE({expr}, {})", ddl::literal(value));
                }
                _ => {}
            }
        }

        columns.push(source);
        selects.push(expr);
    }

    format!(
        "INSERT INTO {} ({}) SELECT {} FROM {}",
        ddl::ident(shadow),
        columns.join(", "),
        selects.join(", "),
        ddl::ident(&target.name)
    )
}

/// True when the table already has the target's columns, in order, with
/// matching declared types and nullability.
pub(crate) fn matches_shape(current: &[ColumnInfo], target: &TableShape) -> bool {
    current.len() == target.columns.len()
        && current.iter().zip(&target.columns).all(|(have, want)| {
            have.name == want.name
                && have.data_type.eq_ignore_ascii_case(ddl::type_name(want.ty))
                && have.nullable == (want.nullable && !want.is_primary_key())
        })
}

/// Reads a table's columns from the catalog.
pub(crate) async fn describe(
    conn: &mut SqliteConnection,
    table: &str,
) -> Result<Vec<ColumnInfo>, AdapterError> {
    let rows = sqlx::query(
        r#"SELECT name, type, "notnull", dflt_value, pk FROM pragma_table_info($1) ORDER BY cid"#,
    )
    .bind(table)
    .fetch_all(&mut *conn)
    .await
    .map_err(classify)?;

    rows.iter()
        .map(|row| {
            let notnull: i64 = row.try_get("notnull").map_err(classify)?;
            let pk: i64 = row.try_get("pk").map_err(classify)?;
            let data_type: String = row.try_get("type").map_err(classify)?;
            Ok(ColumnInfo {
                name: row.try_get("name").map_err(classify)?,
                data_type: data_type.to_ascii_lowercase(),
                nullable: notnull == 0 && pk == 0,
                default: row.try_get("dflt_value").map_err(classify)?,
            })
        })
        .collect()
}
