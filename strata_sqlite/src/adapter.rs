use async_trait::async_trait;
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::str::FromStr;
use strata_core::schema::{ColumnChange, ColumnDef, ColumnInfo, IndexDef, TableShape};
use strata_core::{AdapterError, Dialect, DialectAdapter, Row, Value};

use crate::ddl;
use crate::error::{classify, is_duplicate_column};
use crate::rebuild;
use crate::row::{bind_all, decode_row};

/// Dialect adapter for the embedded SQLite engine.
#[derive(Debug, Clone)]
pub struct SqliteAdapter {
    pool: SqlitePool,
}

impl SqliteAdapter {
    /// Creates an adapter over an existing pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Opens a pool for `url`, creating the database file if missing.
    ///
    /// In-memory databases live only as long as their connection, so they
    /// get a single connection that is never recycled.
    pub async fn connect(url: &str, max_connections: u32) -> Result<Self, AdapterError> {
        let options = SqliteConnectOptions::from_str(url)
            .map_err(classify)?
            .create_if_missing(true)
            .foreign_keys(true);

        let pool_options = if is_memory_url(url) {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new().max_connections(max_connections.max(1))
        };

        let pool = pool_options.connect_with(options).await.map_err(classify)?;
        log::debug!("Connected to sqlite database {}", url);
        Ok(Self::new(pool))
    }

    /// Opens a private in-memory database.
    pub async fn in_memory() -> Result<Self, AdapterError> {
        Self::connect("sqlite::memory:", 1).await
    }

    /// The underlying pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

fn is_memory_url(url: &str) -> bool {
    url.contains(":memory:") || url.contains("mode=memory")
}

#[async_trait]
impl DialectAdapter for SqliteAdapter {
    fn dialect(&self) -> Dialect {
        Dialect::Sqlite
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
        let found: Option<String> =
            sqlx::query_scalar("SELECT name FROM sqlite_master WHERE type = 'table' AND name = $1")
                .bind(table)
                .fetch_optional(&self.pool)
                .await
                .map_err(classify)?;
        Ok(found.is_some())
    }

    async fn describe_table(&self, table: &str) -> Result<Vec<ColumnInfo>, AdapterError> {
        let mut conn = self.pool.acquire().await.map_err(classify)?;
        rebuild::describe(&mut conn, table).await
    }

    async fn create_table(&self, shape: &TableShape) -> Result<(), AdapterError> {
        sqlx::query(&ddl::create_table_sql(shape, &shape.name))
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
        sqlx::query(&format!("DROP TABLE IF EXISTS {}", ddl::ident(table)))
            .execute(&self.pool)
            .await
            .map_err(classify)?;
        Ok(())
    }

    async fn add_column(&self, table: &str, column: &ColumnDef) -> Result<(), AdapterError> {
        let sql = format!(
            "ALTER TABLE {} ADD COLUMN {}",
            ddl::ident(table),
            ddl::column_sql(column, false)
        );

        match sqlx::query(&sql).execute(&self.pool).await {
            Ok(_) => {}
            Err(e) if is_duplicate_column(&e) => {
                log::debug!("Column {}.{} already exists", table, column.name);
            }
            Err(e) => return Err(classify(e)),
        }

        // ADD COLUMN cannot carry UNIQUE, so uniqueness becomes an index.
        if column.unique {
            let index = IndexDef::new(
                format!("ux_{}_{}", table, column.name),
                table,
                &[column.name.as_str()],
            )
            .unique();
            self.create_index(&index).await?;
        }
        Ok(())
    }

    async fn drop_column(&self, table: &str, column: &str) -> Result<(), AdapterError> {
        Err(AdapterError::unsupported(
            Dialect::Sqlite,
            format!("drop column {table}.{column}"),
        ))
    }

    async fn alter_table(
        &self,
        target: &TableShape,
        changes: &[ColumnChange],
    ) -> Result<(), AdapterError> {
        rebuild::recreate_with_shape(&self.pool, target, changes).await
    }
}
