//! DDL rendering for the server dialect.

use strata_core::Value;
use strata_core::schema::{ColumnDef, ColumnDefault, ColumnType, IndexDef, TableShape};

/// Quotes an identifier.
pub(crate) fn ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

pub(crate) fn string_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

/// Column type as written in DDL. `Serial` maps to its storage type here;
/// the primary key form is rendered by [`column_sql`].
pub(crate) fn type_name(ty: ColumnType) -> &'static str {
    match ty {
        ColumnType::Serial | ColumnType::Integer => "BIGINT",
        ColumnType::Real => "DOUBLE PRECISION",
        ColumnType::Text => "TEXT",
        ColumnType::Boolean => "BOOLEAN",
        ColumnType::Timestamp => "TIMESTAMPTZ",
    }
}

fn default_sql(default: &ColumnDefault) -> String {
    match default {
        ColumnDefault::CurrentTimestamp => "NOW()".to_string(),
        ColumnDefault::Integer(v) => v.to_string(),
        ColumnDefault::Text(v) => string_literal(v),
        ColumnDefault::Boolean(v) => if *v { "TRUE" } else { "FALSE" }.to_string(),
    }
}

/// Renders a value as a SQL literal.
pub(crate) fn literal(value: &Value) -> String {
    match value {
        Value::Null => "NULL".to_string(),
        Value::Integer(v) => v.to_string(),
        Value::Real(v) => v.to_string(),
        Value::Text(v) => string_literal(v),
        Value::Bool(v) => if *v { "TRUE" } else { "FALSE" }.to_string(),
        Value::Timestamp(v) => format!("{}::timestamptz", string_literal(&v.to_rfc3339())),
        Value::Bytes(v) => format!("'\\x{}'::bytea", hex(v)),
    }
}

fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

/// Renders one column definition.
pub(crate) fn column_sql(column: &ColumnDef) -> String {
    if column.is_primary_key() {
        return format!("{} BIGSERIAL PRIMARY KEY", ident(&column.name));
    }

    let mut sql = format!("{} {}", ident(&column.name), type_name(column.ty));
    if !column.nullable {
        sql.push_str(" NOT NULL");
    }
    if column.unique {
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

pub(crate) fn create_table_sql(shape: &TableShape) -> String {
    let mut parts: Vec<String> = shape.columns.iter().map(column_sql).collect();
    for columns in &shape.unique_together {
        let columns: Vec<String> = columns.iter().map(|c| ident(c)).collect();
        parts.push(format!("UNIQUE ({})", columns.join(", ")));
    }
    format!(
        "CREATE TABLE IF NOT EXISTS {} (\n    {}\n)",
        ident(&shape.name),
        parts.join(",\n    ")
    )
}

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

pub(crate) fn add_column_sql(table: &str, column: &ColumnDef) -> String {
    format!(
        "ALTER TABLE {} ADD COLUMN IF NOT EXISTS {}",
        ident(table),
        column_sql(column)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serial_columns_become_bigserial_keys() {
        assert_eq!(column_sql(&ColumnDef::id()), "\"id\" BIGSERIAL PRIMARY KEY");
    }

    #[test]
    fn timestamps_default_to_now() {
        let column = ColumnDef::new("created_at", ColumnType::Timestamp)
            .not_null()
            .default(ColumnDefault::CurrentTimestamp);
        assert_eq!(
            column_sql(&column),
            "\"created_at\" TIMESTAMPTZ NOT NULL DEFAULT NOW()"
        );
    }

    #[test]
    fn added_columns_keep_unique_inline() {
        let column = ColumnDef::new("handle", ColumnType::Text).unique();
        assert_eq!(
            add_column_sql("users", &column),
            "ALTER TABLE \"users\" ADD COLUMN IF NOT EXISTS \"handle\" TEXT UNIQUE"
        );
    }

    #[test]
    fn binary_literals_are_hex_escaped() {
        assert_eq!(literal(&Value::Bytes(vec![0x00, 0xab])), "'\\x00ab'::bytea");
    }

    #[test]
    fn boolean_literals_are_keywords() {
        assert_eq!(literal(&Value::Bool(true)), "TRUE");
        assert_eq!(
            default_sql(&ColumnDefault::Boolean(false)),
            "FALSE"
        );
    }

    #[test]
    fn create_table_renders_foreign_keys() {
        let shape = TableShape::new("user_roles")
            .column(ColumnDef::new("user_id", ColumnType::Integer).not_null().references("users", "id"))
            .unique_together(&["user_id"]);
        let sql = create_table_sql(&shape);
        assert!(sql.contains(
            "\"user_id\" BIGINT NOT NULL REFERENCES \"users\"(\"id\") ON DELETE CASCADE"
        ));
        assert!(sql.contains("UNIQUE (\"user_id\")"));
    }
}
