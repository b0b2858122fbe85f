//! Resolved authorization state for one principal at one instant.
use std::collections::BTreeMap;
use std::collections::BTreeSet;

use serde::Deserialize;
use serde::Serialize;

use super::GrantRecord;
use super::Role;

/// The merged result of all grants applicable to one principal.
///
/// Snapshots are ephemeral: they are recomputed on every login or credential
/// refresh and are never persisted directly, only their projection inside a
/// signed credential outlives the resolution call.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct AuthorizationSnapshot {
    /// Username the snapshot was resolved for.
    pub username: String,

    /// Platform roles held at resolution time (claims plus group bindings).
    pub roles: BTreeSet<Role>,

    /// Effective roles per cluster, folded from the grant list.
    pub cluster_roles: BTreeMap<String, BTreeSet<Role>>,

    /// Grants backing the snapshot, in resolution order.
    pub grants: Vec<GrantRecord>,
}

impl AuthorizationSnapshot {
    /// Assemble a snapshot from resolved roles and grants.
    pub fn new<S>(username: S, roles: BTreeSet<Role>, grants: Vec<GrantRecord>) -> Self
    where
        S: Into<String>,
    {
        let mut cluster_roles: BTreeMap<String, BTreeSet<Role>> = BTreeMap::new();
        for grant in &grants {
            cluster_roles
                .entry(grant.cluster.clone())
                .or_default()
                .insert(grant.role);
        }
        AuthorizationSnapshot {
            username: username.into(),
            roles,
            cluster_roles,
            grants,
        }
    }

    /// Distinct names of the clusters the snapshot covers, sorted.
    pub fn cluster_names(&self) -> Vec<String> {
        let names: BTreeSet<&str> = self.grants.iter().map(|grant| grant.cluster.as_str()).collect();
        names.into_iter().map(String::from).collect()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::AuthorizationSnapshot;
    use crate::GrantRecord;
    use crate::GrantSubject;
    use crate::Role;

    #[test]
    fn folds_cluster_roles_from_grants() {
        let grants = vec![
            GrantRecord::new("prod", Role::ClusterAdmin, GrantSubject::User, "alice"),
            GrantRecord::new("prod", Role::ClusterReadonly, GrantSubject::Group, "team-a"),
            GrantRecord::new("staging", Role::ClusterReadonly, GrantSubject::User, "alice"),
        ];
        let snapshot = AuthorizationSnapshot::new("alice", BTreeSet::new(), grants);

        let prod = snapshot.cluster_roles.get("prod").unwrap();
        assert!(prod.contains(&Role::ClusterAdmin));
        assert!(prod.contains(&Role::ClusterReadonly));
        assert_eq!(snapshot.cluster_names(), vec!["prod", "staging"]);
    }
}
