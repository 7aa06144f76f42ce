//! In-place column alterations.
//!
//! The server dialect supports every [`ColumnChange`] natively, so a change
//! set becomes a list of `ALTER TABLE` statements run in one transaction.
//! Each statement tolerates being re-run against a table that already has
//! the target shape.

use sqlx::{Connection, PgPool};
use strata_core::schema::{ColumnChange, TableShape};
use strata_core::{AdapterError, AdapterErrorKind, Dialect};

use crate::ddl;
use crate::error::classify;

/// Renders the statements that bring `target.name` to `target`.
///
/// Target columns that do not exist yet are added first (the primary key
/// is assumed present). Declared changes follow in order and the target's
/// indexes come last.
pub(crate) fn alter_statements(target: &TableShape, changes: &[ColumnChange]) -> Vec<String> {
    let table = ddl::ident(&target.name);
    let mut statements: Vec<String> = target
        .columns
        .iter()
        .filter(|column| !column.is_primary_key())
        .map(|column| ddl::add_column_sql(&target.name, column))
        .collect();

    for change in changes {
        match change {
            ColumnChange::Drop { column } => {
                statements.push(format!(
                    "ALTER TABLE {table} DROP COLUMN IF EXISTS {}",
                    ddl::ident(column)
                ));
            }
            ColumnChange::SetNotNull { column, backfill } => {
                let column = ddl::ident(column);
                if let Some(value) = backfill {
                    statements.push(format!(
                        "UPDATE {table} SET {column} = {} WHERE {column} IS NULL",
                        ddl::literal(value)
                    ));
                }
                statements.push(format!("ALTER TABLE {table} ALTER COLUMN {column} SET NOT NULL"));
            }
            ColumnChange::DropNotNull { column } => {
                statements.push(format!(
                    "ALTER TABLE {table} ALTER COLUMN {} DROP NOT NULL",
                    ddl::ident(column)
                ));
            }
            ColumnChange::ChangeType { column, ty } => {
                let column = ddl::ident(column);
                let ty = ddl::type_name(*ty);
                statements.push(format!(
                    "ALTER TABLE {table} ALTER COLUMN {column} TYPE {ty} USING {column}::{ty}"
                ));
            }
        }
    }

    statements.extend(target.indexes.iter().map(ddl::create_index_sql));
    statements
}

/// Applies `changes` to `target.name` atomically.
pub(crate) async fn alter_in_place(
    pool: &PgPool,
    target: &TableShape,
    changes: &[ColumnChange],
) -> Result<(), AdapterError> {
    let mut conn = pool.acquire().await.map_err(classify)?;

    let exists: bool = sqlx::query_scalar(
        "SELECT EXISTS (SELECT 1 FROM information_schema.tables \
         WHERE table_schema = current_schema() AND table_name = $1)",
    )
    .bind(&target.name)
    .fetch_one(&mut *conn)
    .await
    .map_err(classify)?;
    if !exists {
        return Err(AdapterError::new(
            Dialect::Postgres,
            AdapterErrorKind::Database,
            format!("cannot alter missing table '{}'", target.name),
        ));
    }

    let mut tx = conn.begin().await.map_err(classify)?;
    for statement in alter_statements(target, changes) {
        log::debug!("Altering {}: {}", target.name, statement);
        if let Err(e) = sqlx::query(&statement).execute(&mut *tx).await {
            let err = classify(e);
            log::error!("Altering table {} failed, rolling back: {}", target.name, err);
            if let Err(rollback) = tx.rollback().await {
                log::warn!("Rollback of {} alteration failed: {}", target.name, rollback);
            }
            return Err(err);
        }
    }
    tx.commit().await.map_err(classify)?;

    log::info!("Altered table {}", target.name);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_core::Value;
    use strata_core::schema::{ColumnDef, ColumnType};

    #[test]
    fn set_not_null_backfills_before_constraining() {
        let target = TableShape::new("users")
            .column(ColumnDef::id())
            .column(ColumnDef::new("email", ColumnType::Text).not_null());
        let changes = [ColumnChange::SetNotNull {
            column: "email".into(),
            backfill: Some(Value::Text("unknown@localhost".into())),
        }];

        let statements = alter_statements(&target, &changes);
        assert_eq!(
            &statements[1..],
            &[
                "UPDATE \"users\" SET \"email\" = 'unknown@localhost' WHERE \"email\" IS NULL"
                    .to_string(),
                "ALTER TABLE \"users\" ALTER COLUMN \"email\" SET NOT NULL".to_string(),
            ]
        );
    }

    #[test]
    fn type_changes_cast_existing_values() {
        let target = TableShape::new("settings").column(ColumnDef::new("value", ColumnType::Integer));
        let changes = [ColumnChange::ChangeType {
            column: "value".into(),
            ty: ColumnType::Integer,
        }];

        let statements = alter_statements(&target, &changes);
        assert_eq!(
            statements.last().map(String::as_str),
            Some("ALTER TABLE \"settings\" ALTER COLUMN \"value\" TYPE BIGINT USING \"value\"::BIGINT")
        );
    }

    #[test]
    fn drops_tolerate_missing_columns() {
        let target = TableShape::new("users").column(ColumnDef::id());
        let changes = [ColumnChange::Drop {
            column: "legacy_token".into(),
        }];
        let statements = alter_statements(&target, &changes);
        assert!(statements.contains(
            &"ALTER TABLE \"users\" DROP COLUMN IF EXISTS \"legacy_token\"".to_string()
        ));
    }
}
