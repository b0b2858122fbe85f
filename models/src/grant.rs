//! Grant records binding subjects to roles on clusters.
use std::collections::BTreeSet;
use std::fmt;

use serde::Deserialize;
use serde::Serialize;
use uuid::Uuid;

use super::Role;

/// The kind of subject a grant applies to.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GrantSubject {
    /// The grant applies to a single user, matched by username.
    User,

    /// The grant applies to every member of a group, matched by group name.
    Group,
}

impl GrantSubject {
    /// The canonical string form of the subject kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            GrantSubject::User => "user",
            GrantSubject::Group => "group",
        }
    }
}

impl fmt::Display for GrantSubject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single persisted authorization entry.
///
/// `(cluster, role, subject, subject_name)` is the natural deduplication key
/// but no uniqueness is enforced at write time: stores may contain duplicate
/// entries and resolvers must tolerate them.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct GrantRecord {
    /// Identifier of the record, assigned at creation.
    pub id: Uuid,

    /// Cluster the grant applies to.
    pub cluster: String,

    /// Role granted on the cluster.
    pub role: Role,

    /// Whether the grant binds a user or a group.
    pub subject: GrantSubject,

    /// Username or group name, depending on `subject`.
    pub subject_name: String,

    /// Namespaces the grant is restricted to; empty means all namespaces.
    #[serde(default)]
    pub namespaces: BTreeSet<String>,

    /// Disabled grants are kept for administrators but excluded from resolution.
    #[serde(default = "GrantRecord::default_enabled")]
    pub enabled: bool,
}

impl GrantRecord {
    /// Create an unrestricted, enabled grant with a fresh identifier.
    pub fn new<S1, S2>(cluster: S1, role: Role, subject: GrantSubject, subject_name: S2) -> Self
    where
        S1: Into<String>,
        S2: Into<String>,
    {
        GrantRecord {
            id: Uuid::new_v4(),
            cluster: cluster.into(),
            role,
            subject,
            subject_name: subject_name.into(),
            namespaces: BTreeSet::new(),
            enabled: true,
        }
    }

    /// Check if the grant covers operations on the given namespace.
    ///
    /// An empty namespace set means the grant is unrestricted.
    pub fn allows_namespace(&self, namespace: &str) -> bool {
        self.namespaces.is_empty() || self.namespaces.contains(namespace)
    }

    /// The natural deduplication key for grant records.
    pub fn dedup_key(&self) -> (&str, Role, GrantSubject, &str) {
        (&self.cluster, self.role, self.subject, &self.subject_name)
    }

    fn default_enabled() -> bool {
        true
    }
}

/// Maps a group to a platform role.
///
/// Group bindings only feed platform-admin detection during login, they never
/// grant cluster access by themselves.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct GroupBinding {
    /// Name of the group the binding applies to.
    pub group: String,

    /// Platform role held by members of the group.
    pub role: Role,
}

/// A stored grant record could not be decoded into a [`GrantRecord`].
#[derive(Debug, thiserror::Error)]
#[error("stored grant record '{id}' could not be decoded: {reason}")]
pub struct MalformedGrant {
    /// Identifier of the offending record, as stored.
    pub id: String,

    /// Human readable decode failure.
    pub reason: String,
}

#[cfg(test)]
mod tests {
    use super::GrantRecord;
    use super::GrantSubject;
    use super::Role;

    #[test]
    fn empty_namespaces_allow_everything() {
        let grant = GrantRecord::new("prod", Role::ClusterAdmin, GrantSubject::User, "alice");
        assert!(grant.allows_namespace("default"));
        assert!(grant.allows_namespace("kube-system"));
    }

    #[test]
    fn scoped_namespaces_restrict() {
        let mut grant = GrantRecord::new("prod", Role::ClusterAdmin, GrantSubject::User, "alice");
        grant.namespaces.insert("team-a".to_string());
        assert!(grant.allows_namespace("team-a"));
        assert!(!grant.allows_namespace("default"));
    }

    #[test]
    fn decode_defaults_for_optional_fields() {
        let grant: GrantRecord = serde_json::from_value(serde_json::json!({
            "id": "a5452cbc-3a7c-4f23-a7ca-2dd72f30c1f1",
            "cluster": "prod",
            "role": "cluster_readonly",
            "subject": "group",
            "subject_name": "team-a",
        }))
        .unwrap();
        assert!(grant.namespaces.is_empty());
        assert!(grant.enabled);
    }
}
