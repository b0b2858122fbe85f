//! Grant store operations on group to platform role bindings.
use std::collections::BTreeSet;
use std::str::FromStr;

use anyhow::Result;
use tokio_rusqlite::Connection;

use kubegate_context::Context;
use kubegate_models::GroupBinding;
use kubegate_models::Role;
use kubegate_store::query::GroupRoles;

const ROLES_SQL: &str = r#"
SELECT DISTINCT role
FROM grants_group_binding
"#;

const PERSIST_SQL: &str = r#"
INSERT INTO grants_group_binding (group_name, role)
VALUES (?1, ?2)
ON CONFLICT (group_name, role) DO NOTHING;
"#;

/// Distinct platform roles bound to any of the given group names.
///
/// Stored role names the control plane does not understand are skipped and
/// logged rather than failing the lookup.
pub async fn roles(
    context: &Context,
    connection: &Connection,
    groups: GroupRoles,
) -> Result<BTreeSet<Role>> {
    if groups.0.is_empty() {
        return Ok(BTreeSet::new());
    }

    let (err_count, _timer) = crate::telemetry::observe_op("group-binding.roles");
    let logger = context.logger.clone();
    let result = connection
        .call(move |connection| {
            let placeholders: Vec<String> =
                (1..=groups.0.len()).map(|n| format!("?{}", n)).collect();
            let sql = format!(
                "{}WHERE group_name IN ({});",
                ROLES_SQL,
                placeholders.join(", "),
            );
            let mut statement = connection.prepare(&sql)?;
            let mut rows = statement.query(rusqlite::params_from_iter(groups.0.iter()))?;
            let mut roles = BTreeSet::new();
            while let Some(row) = rows.next()? {
                let role: String = row.get("role")?;
                match Role::from_str(&role) {
                    Ok(role) => {
                        roles.insert(role);
                    }
                    Err(error) => {
                        slog::warn!(logger, "Skipping unknown group binding role"; "error" => %error);
                    }
                }
            }
            Ok(roles)
        })
        .await;
    if result.is_err() {
        err_count.inc();
    }
    result.map_err(crate::statements::unpack_error)
}

/// Persist a group to platform role binding, ignoring existing bindings.
pub async fn persist(_: &Context, connection: &Connection, binding: GroupBinding) -> Result<()> {
    let (err_count, _timer) = crate::telemetry::observe_op("group-binding.persist");
    let result = connection
        .call(move |connection| {
            connection.execute(
                PERSIST_SQL,
                rusqlite::params![binding.group, binding.role.as_str()],
            )?;
            Ok(())
        })
        .await;
    if result.is_err() {
        err_count.inc();
    }
    result.map_err(crate::statements::unpack_error)
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use kubegate_models::GroupBinding;
    use kubegate_models::Role;
    use kubegate_store::query::GroupRoles;

    #[tokio::test]
    async fn operations() {
        let context = kubegate_context::Context::fixture();
        let store = crate::statements::tests::store().await;

        // Check lookup without bindings.
        let roles = store
            .query(&context, GroupRoles::new(["sre"]))
            .await
            .expect("group roles query to pass");
        assert!(roles.is_empty());

        // Check persisting (and looking up) bindings.
        let bindings = vec![
            GroupBinding {
                group: "sre".to_string(),
                role: Role::PlatformAdmin,
            },
            GroupBinding {
                group: "devs".to_string(),
                role: Role::Guest,
            },
        ];
        for binding in bindings {
            store.persist(&context, binding).await.unwrap();
        }
        let roles = store
            .query(&context, GroupRoles::new(["sre", "devs"]))
            .await
            .unwrap();
        let expected: BTreeSet<Role> = [Role::PlatformAdmin, Role::Guest].into();
        assert_eq!(roles, expected);

        // Check duplicate bindings are ignored.
        let binding = GroupBinding {
            group: "sre".to_string(),
            role: Role::PlatformAdmin,
        };
        store.persist(&context, binding).await.unwrap();
        let roles = store
            .query(&context, GroupRoles::new(["sre"]))
            .await
            .unwrap();
        let expected: BTreeSet<Role> = [Role::PlatformAdmin].into();
        assert_eq!(roles, expected);
    }
}
