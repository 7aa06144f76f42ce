use strata_core::DialectAdapter;
use strata_core::schema::{ColumnDef, ColumnType, TableShape};
use strata_sqlite::SqliteAdapter;

pub async fn memory_adapter() -> SqliteAdapter {
    let _ = env_logger::builder().is_test(true).try_init();
    SqliteAdapter::in_memory()
        .await
        .expect("Failed to open in-memory sqlite database")
}

pub fn users_shape() -> TableShape {
    TableShape::new("users")
        .column(ColumnDef::id())
        .column(ColumnDef::new("username", ColumnType::Text).not_null().unique())
        .column(ColumnDef::new("email", ColumnType::Text))
        .column(ColumnDef::new("legacy_token", ColumnType::Text))
        .index("idx_users_email", &["email"], false)
}

pub async fn create_users(adapter: &SqliteAdapter) {
    adapter
        .create_table(&users_shape())
        .await
        .expect("Failed to create users table");
}
