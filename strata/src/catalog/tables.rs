//! Table shapes of the application schema.
//!
//! `users` changes shape over time, so it has one function per revision.

use strata_core::schema::{ColumnDef, ColumnDefault, ColumnType, TableShape};

fn created_at() -> ColumnDef {
    ColumnDef::new("created_at", ColumnType::Timestamp)
        .not_null()
        .default(ColumnDefault::CurrentTimestamp)
}

/// `permissions`
pub fn permissions() -> TableShape {
    TableShape::new("permissions")
        .column(ColumnDef::id())
        .column(ColumnDef::new("name", ColumnType::Text).not_null().unique())
        .column(ColumnDef::new("description", ColumnType::Text))
}

/// `roles`
pub fn roles() -> TableShape {
    TableShape::new("roles")
        .column(ColumnDef::id())
        .column(ColumnDef::new("name", ColumnType::Text).not_null().unique())
        .column(ColumnDef::new("description", ColumnType::Text))
        .column(
            ColumnDef::new("is_system", ColumnType::Boolean)
                .not_null()
                .default(ColumnDefault::Boolean(false)),
        )
}

/// `role_permissions`, linking roles to the permissions they grant.
pub fn role_permissions() -> TableShape {
    TableShape::new("role_permissions")
        .column(ColumnDef::id())
        .column(
            ColumnDef::new("role_id", ColumnType::Integer)
                .not_null()
                .references("roles", "id"),
        )
        .column(
            ColumnDef::new("permission_id", ColumnType::Integer)
                .not_null()
                .references("permissions", "id"),
        )
        .unique_together(&["role_id", "permission_id"])
        .index("idx_role_permissions_role", &["role_id"], false)
}

/// `users` as created by the baseline.
pub fn users_v1_0() -> TableShape {
    TableShape::new("users")
        .column(ColumnDef::id())
        .column(ColumnDef::new("username", ColumnType::Text).not_null().unique())
        .column(ColumnDef::new("email", ColumnType::Text))
        .column(ColumnDef::new("legacy_token", ColumnType::Text))
        .column(
            ColumnDef::new("is_active", ColumnType::Boolean)
                .not_null()
                .default(ColumnDefault::Boolean(true)),
        )
        .column(created_at())
        .index("idx_users_email", &["email"], false)
}

/// `users` once email is mandatory. `display_name` was appended in 1.1.0.
pub fn users_v1_4() -> TableShape {
    let mut shape = users_v1_0().column(ColumnDef::new("display_name", ColumnType::Text));
    if let Some(email) = shape.columns.iter_mut().find(|c| c.name == "email") {
        email.nullable = false;
    }
    shape
}

/// `users` without the legacy token.
pub fn users_v1_4_1() -> TableShape {
    let mut shape = users_v1_4();
    shape.columns.retain(|c| c.name != "legacy_token");
    shape
}

/// `user_roles`
pub fn user_roles() -> TableShape {
    TableShape::new("user_roles")
        .column(ColumnDef::id())
        .column(
            ColumnDef::new("user_id", ColumnType::Integer)
                .not_null()
                .references("users", "id"),
        )
        .column(
            ColumnDef::new("role_id", ColumnType::Integer)
                .not_null()
                .references("roles", "id"),
        )
        .unique_together(&["user_id", "role_id"])
}

/// `settings`, a key/value store for instance-wide options.
pub fn settings() -> TableShape {
    TableShape::new("settings")
        .column(ColumnDef::id())
        .column(ColumnDef::new("key", ColumnType::Text).not_null().unique())
        .column(ColumnDef::new("value", ColumnType::Text))
        .column(
            ColumnDef::new("updated_at", ColumnType::Timestamp)
                .not_null()
                .default(ColumnDefault::CurrentTimestamp),
        )
}

/// `audit_log`, added in 1.2.0.
pub fn audit_log() -> TableShape {
    TableShape::new("audit_log")
        .column(ColumnDef::id())
        .column(ColumnDef::new("user_id", ColumnType::Integer).references("users", "id"))
        .column(ColumnDef::new("action", ColumnType::Text).not_null())
        .column(ColumnDef::new("detail", ColumnType::Text))
        .column(created_at())
        .index("idx_audit_log_user", &["user_id"], false)
}

/// Baseline tables, referenced tables first.
pub fn baseline() -> Vec<TableShape> {
    vec![
        permissions(),
        roles(),
        role_permissions(),
        users_v1_0(),
        user_roles(),
        settings(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn baseline_creates_referenced_tables_first() {
        let tables = baseline();
        let position = |name: &str| tables.iter().position(|t| t.name == name).unwrap();

        for table in &tables {
            for column in &table.columns {
                if let Some(fk) = &column.references {
                    assert!(
                        position(&fk.table) < position(&table.name),
                        "{} references {} before it exists",
                        table.name,
                        fk.table
                    );
                }
            }
        }
    }

    #[test]
    fn users_revisions_keep_column_order() {
        let names = |shape: TableShape| -> Vec<String> {
            shape.columns.into_iter().map(|c| c.name).collect()
        };
        assert_eq!(
            names(users_v1_4_1()),
            vec!["id", "username", "email", "is_active", "created_at", "display_name"]
        );
        assert!(!users_v1_4().get_column("email").unwrap().nullable);
        assert!(users_v1_0().get_column("email").unwrap().nullable);
    }
}
