use async_trait::async_trait;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use std::time::Duration;
use strata_core::schema::{ColumnChange, ColumnDef, ColumnInfo, IndexDef, TableShape};
use strata_core::{AdapterError, Dialect, DialectAdapter, Row, Value};

use crate::alter;
use crate::ddl;
use crate::error::classify;
use crate::row::{bind_all, decode_row};

/// Dialect adapter for PostgreSQL.
///
/// Tables are looked up in the connection's `current_schema()`.
#[derive(Debug, Clone)]
pub struct PgAdapter {
    pool: PgPool,
}

impl PgAdapter {
    /// Creates an adapter over an existing pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Opens a pool for `url`.
    pub async fn connect(url: &str, max_connections: u32) -> Result<Self, AdapterError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections.max(1))
            .acquire_timeout(Duration::from_secs(30))
            .connect(url)
            .await
            .map_err(classify)?;
        log::debug!("Connected to postgres with up to {} connections", max_connections);
        Ok(Self::new(pool))
    }

    /// The underlying pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl DialectAdapter for PgAdapter {
    fn dialect(&self) -> Dialect {
        Dialect::Postgres
    }

    async fn execute(&self, sql: &str, params: &[Value]) -> Result<u64, AdapterError> {
        let result = bind_all(sqlx::query(sql), params)
            .execute(&self.pool)
            .await
            .map_err(classify)?;
        Ok(result.rows_affected())
    }

    async fn fetch_all(&self, sql: &str, params: &[Value]) -> Result<Vec<Row>, AdapterError> {
        let rows = bind_all(sqlx::query(sql), params)
            .fetch_all(&self.pool)
            .await
            .map_err(classify)?;
        rows.iter().map(decode_row).collect()
    }

    async fn table_exists(&self, table: &str) -> Result<bool, AdapterError> {
        sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM information_schema.tables \
             WHERE table_schema = current_schema() AND table_name = $1)",
        )
        .bind(table)
        .fetch_one(&self.pool)
        .await
        .map_err(classify)
    }

    async fn describe_table(&self, table: &str) -> Result<Vec<ColumnInfo>, AdapterError> {
        let rows: Vec<(String, String, String, Option<String>)> = sqlx::query_as(
            r#"
            SELECT column_name::text, data_type::text, is_nullable::text, column_default::text
            FROM information_schema.columns
            WHERE table_schema = current_schema() AND table_name = $1
            ORDER BY ordinal_position
            "#,
        )
        .bind(table)
        .fetch_all(&self.pool)
        .await
        .map_err(classify)?;

        Ok(rows
            .into_iter()
            .map(|(name, data_type, is_nullable, default)| ColumnInfo {
                name,
                data_type: data_type.to_ascii_lowercase(),
                nullable: is_nullable == "YES",
                default,
            })
            .collect())
    }

    async fn create_table(&self, shape: &TableShape) -> Result<(), AdapterError> {
        sqlx::query(&ddl::create_table_sql(shape))
            .execute(&self.pool)
            .await
            .map_err(classify)?;
        for index in &shape.indexes {
            self.create_index(index).await?;
        }
        Ok(())
    }

    async fn create_index(&self, index: &IndexDef) -> Result<(), AdapterError> {
        sqlx::query(&ddl::create_index_sql(index))
            .execute(&self.pool)
            .await
            .map_err(classify)?;
        Ok(())
    }

    async fn drop_table(&self, table: &str) -> Result<(), AdapterError> {
        sqlx::query(&format!("DROP TABLE IF EXISTS {} CASCADE", ddl::ident(table)))
            .execute(&self.pool)
            .await
            .map_err(classify)?;
        Ok(())
    }

    async fn add_column(&self, table: &str, column: &ColumnDef) -> Result<(), AdapterError> {
        sqlx::query(&ddl::add_column_sql(table, column))
            .execute(&self.pool)
            .await
            .map_err(classify)?;
        Ok(())
    }

    async fn drop_column(&self, table: &str, column: &str) -> Result<(), AdapterError> {
        sqlx::query(&format!(
            "ALTER TABLE {} DROP COLUMN IF EXISTS {}",
            ddl::ident(table),
            ddl::ident(column)
        ))
        .execute(&self.pool)
        .await
        .map_err(classify)?;
        Ok(())
    }

    async fn alter_table(
        &self,
        target: &TableShape,
        changes: &[ColumnChange],
    ) -> Result<(), AdapterError> {
        alter::alter_in_place(&self.pool, target, changes).await
    }
}
