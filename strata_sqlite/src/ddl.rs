//! DDL rendering for the embedded dialect.

use strata_core::Value;
use strata_core::schema::{ColumnDef, ColumnDefault, ColumnType, IndexDef, TableShape};

/// Quotes an identifier.
pub(crate) fn ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Quotes a string literal.
pub(crate) fn string_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

/// The declared type of a column, as `PRAGMA table_info` reports it back.
pub(crate) fn type_name(ty: ColumnType) -> &'static str {
    match ty {
        ColumnType::Serial | ColumnType::Integer => "INTEGER",
        ColumnType::Real => "REAL",
        ColumnType::Text => "TEXT",
        ColumnType::Boolean => "BOOLEAN",
        ColumnType::Timestamp => "TIMESTAMP",
    }
}

/// Storage class used when converting a column's values with `CAST`.
pub(crate) fn cast_target(ty: ColumnType) -> &'static str {
    match ty {
        ColumnType::Serial | ColumnType::Integer | ColumnType::Boolean => "INTEGER",
        ColumnType::Real => "REAL",
        ColumnType::Text | ColumnType::Timestamp => "TEXT",
    }
}

fn default_sql(default: &ColumnDefault) -> String {
    match default {
        ColumnDefault::CurrentTimestamp => "CURRENT_TIMESTAMP".to_string(),
        ColumnDefault::Integer(v) => v.to_string(),
        ColumnDefault::Text(v) => string_literal(v),
        ColumnDefault::Boolean(v) => i64::from(*v).to_string(),
    }
}

/// Renders a value as a SQL literal.
pub(crate) fn literal(value: &Value) -> String {
    match value {
        Value::Null => "NULL".to_string(),
        Value::Integer(v) => v.to_string(),
        Value::Real(v) => v.to_string(),
        Value::Text(v) => string_literal(v),
        Value::Bool(v) => i64::from(*v).to_string(),
        Value::Timestamp(v) => string_literal(&v.format("%Y-%m-%d %H:%M:%S").to_string()),
        Value::Bytes(v) => format!("X'{}'", hex(v)),
    }
}

fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

/// Renders one column definition.
///
/// `inline_unique` is false when the column is being added to an existing
/// table, where the embedded engine refuses UNIQUE constraints.
pub(crate) fn column_sql(column: &ColumnDef, inline_unique: bool) -> String {
    let mut sql = format!("{} {}", ident(&column.name), type_name(column.ty));

    if column.is_primary_key() {
        sql.push_str(" PRIMARY KEY AUTOINCREMENT");
        return sql;
    }
    if !column.nullable {
        sql.push_str(" NOT NULL");
    }
    if column.unique && inline_unique {
        sql.push_str(" UNIQUE");
    }
    if let Some(default) = &column.default {
        sql.push_str(" DEFAULT ");
        sql.push_str(&default_sql(default));
    }
    if let Some(fk) = &column.references {
        sql.push_str(&format!(" REFERENCES {}({})", ident(&fk.table), ident(&fk.column)));
        if fk.on_delete_cascade {
            sql.push_str(" ON DELETE CASCADE");
        }
    }
    sql
}

/// Renders `CREATE TABLE IF NOT EXISTS` for `shape`, under `name`.
///
/// The name is separate so the same shape can be created as a shadow table.
pub(crate) fn create_table_sql(shape: &TableShape, name: &str) -> String {
    let mut parts: Vec<String> = shape.columns.iter().map(|c| column_sql(c, true)).collect();
    for columns in &shape.unique_together {
        let columns: Vec<String> = columns.iter().map(|c| ident(c)).collect();
        parts.push(format!("UNIQUE ({})", columns.join(", ")));
    }
    format!(
        "CREATE TABLE IF NOT EXISTS {} (\n    {}\n)",
        ident(name),
        parts.join(",\n    ")
    )
}

/// Renders `CREATE INDEX IF NOT EXISTS`.
pub(crate) fn create_index_sql(index: &IndexDef) -> String {
    let columns: Vec<String> = index.columns.iter().map(|c| ident(c)).collect();
    format!(
        "CREATE {}INDEX IF NOT EXISTS {} ON {} ({})",
        if index.unique { "UNIQUE " } else { "" },
        ident(&index.name),
        ident(&index.table),
        columns.join(", ")
    )
}
