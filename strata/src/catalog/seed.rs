use async_trait::async_trait;
use std::collections::HashMap;
use strata_core::{AdapterError, DialectAdapter, Row, Seeder, Value};

/// Permissions every install has: `(name, description)`.
pub const PERMISSIONS: &[(&str, &str)] = &[
    ("users.read", "View user accounts"),
    ("users.write", "Create and edit user accounts"),
    ("roles.read", "View roles"),
    ("roles.write", "Create and edit roles"),
    ("settings.read", "View settings"),
    ("settings.write", "Change settings"),
    ("audit.read", "View the audit log"),
];

/// System roles: `(name, description, granted permissions)`.
pub const ROLES: &[(&str, &str, &[&str])] = &[
    (
        "admin",
        "Full access",
        &[
            "users.read",
            "users.write",
            "roles.read",
            "roles.write",
            "settings.read",
            "settings.write",
            "audit.read",
        ],
    ),
    (
        "editor",
        "Manages users and reads settings",
        &["users.read", "users.write", "roles.read", "settings.read"],
    ),
    (
        "viewer",
        "Read-only access",
        &["users.read", "roles.read", "settings.read"],
    ),
    (
        "auditor",
        "Reads the audit log",
        &["users.read", "audit.read"],
    ),
];

/// Seeds [`PERMISSIONS`] and [`ROLES`].
///
/// Inserts use `ON CONFLICT DO NOTHING`, so re-running returns the ids of
/// the rows already present.
#[derive(Debug, Clone, Copy, Default)]
pub struct AccessSeeder;

fn ids_by_name(rows: &[Row], table: &str) -> Result<HashMap<String, i64>, AdapterError> {
    rows.iter()
        .map(|row| match (row.get_str("name"), row.get_i64("id")) {
            (Some(name), Some(id)) => Ok((name.to_string(), id)),
            _ => Err(AdapterError::decode(format!("{table} row without name or id"))),
        })
        .collect()
}

#[async_trait]
impl Seeder for AccessSeeder {
    async fn seed_permissions(
        &self,
        adapter: &dyn DialectAdapter,
    ) -> Result<HashMap<String, i64>, AdapterError> {
        for (name, description) in PERMISSIONS {
            adapter
                .execute(
                    "INSERT INTO permissions (name, description) VALUES ($1, $2) \
                     ON CONFLICT (name) DO NOTHING",
                    &[Value::from(*name), Value::from(*description)],
                )
                .await?;
        }

        let rows = adapter
            .fetch_all("SELECT id, name FROM permissions ORDER BY id", &[])
            .await?;
        ids_by_name(&rows, "permissions")
    }

    async fn seed_roles(
        &self,
        adapter: &dyn DialectAdapter,
        permission_ids: &HashMap<String, i64>,
    ) -> Result<HashMap<String, i64>, AdapterError> {
        for (name, description, _) in ROLES {
            adapter
                .execute(
                    "INSERT INTO roles (name, description, is_system) VALUES ($1, $2, $3) \
                     ON CONFLICT (name) DO NOTHING",
                    &[Value::from(*name), Value::from(*description), Value::Bool(true)],
                )
                .await?;
        }

        let rows = adapter
            .fetch_all("SELECT id, name FROM roles ORDER BY id", &[])
            .await?;
        let role_ids = ids_by_name(&rows, "roles")?;

        for (role, _, granted) in ROLES {
            let role_id = role_ids
                .get(*role)
                .copied()
                .ok_or_else(|| AdapterError::other(format!("role '{role}' was not seeded")))?;

            for permission in *granted {
                let permission_id = permission_ids.get(*permission).copied().ok_or_else(|| {
                    AdapterError::other(format!("permission '{permission}' was not seeded"))
                })?;
                adapter
                    .execute(
                        "INSERT INTO role_permissions (role_id, permission_id) VALUES ($1, $2) \
                         ON CONFLICT (role_id, permission_id) DO NOTHING",
                        &[Value::Integer(role_id), Value::Integer(permission_id)],
                    )
                    .await?;
            }
        }

        log::debug!("Seeded {} roles", ROLES.len());
        Ok(role_ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_granted_permission_is_declared() {
        for (role, _, granted) in ROLES {
            for permission in *granted {
                assert!(
                    PERMISSIONS.iter().any(|(name, _)| name == permission),
                    "{role} grants undeclared permission {permission}"
                );
            }
        }
    }

    #[test]
    fn admin_holds_every_permission() {
        let (_, _, granted) = ROLES.iter().find(|(name, _, _)| *name == "admin").unwrap();
        assert_eq!(granted.len(), PERMISSIONS.len());
    }
}
