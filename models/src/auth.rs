//! Principals, roles and the role satisfaction lattice.
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::Deserialize;
use serde::Serialize;

/// Closed set of roles understood by the control plane.
///
/// Two of these are cluster roles granted through [`GrantRecord`]s
/// (`ClusterAdmin` and `ClusterReadonly`), `PlatformAdmin` is the
/// platform-wide maximum privilege and `Guest` is the no-privilege platform
/// role assigned to group bindings that carry no administrative rights.
///
/// [`GrantRecord`]: crate::GrantRecord
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Platform-wide administrator, bypasses all per-cluster grant checks.
    PlatformAdmin,

    /// Full access to a cluster the role was granted on.
    ClusterAdmin,

    /// Read-only access to a cluster the role was granted on.
    ClusterReadonly,

    /// No privileges; the default platform role for group bindings.
    Guest,
}

impl Role {
    /// Position of the role in the privilege lattice, higher is stronger.
    fn rank(&self) -> u8 {
        match self {
            Role::PlatformAdmin => 3,
            Role::ClusterAdmin => 2,
            Role::ClusterReadonly => 1,
            Role::Guest => 0,
        }
    }

    /// Check if this role meets a required role.
    ///
    /// The lattice is a fixed total order:
    /// `platform-admin > cluster-admin > cluster-readonly > guest`.
    /// In particular a read-only role never satisfies a write requirement.
    pub fn satisfies(&self, required: Role) -> bool {
        self.rank() >= required.rank()
    }

    /// Parse a delimited role-claim list, ignoring unknown or empty entries.
    ///
    /// The identity layer attaches role claims as a comma-separated string;
    /// values this control plane does not understand are skipped rather than
    /// rejected so that upstream providers can attach extra claims.
    pub fn parse_list(raw: &str) -> BTreeSet<Role> {
        raw.split(',')
            .filter_map(|entry| entry.trim().parse().ok())
            .collect()
    }

    /// Project a set of roles onto the delimited wire format.
    pub fn join_list<'a, I>(roles: I) -> String
    where
        I: IntoIterator<Item = &'a Role>,
    {
        let roles: Vec<&str> = roles.into_iter().map(Role::as_str).collect();
        roles.join(",")
    }

    /// The canonical string form of the role.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::PlatformAdmin => "platform_admin",
            Role::ClusterAdmin => "cluster_admin",
            Role::ClusterReadonly => "cluster_readonly",
            Role::Guest => "guest",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = RoleParseError;

    fn from_str(value: &str) -> Result<Role, RoleParseError> {
        match value {
            "platform_admin" => Ok(Role::PlatformAdmin),
            "cluster_admin" => Ok(Role::ClusterAdmin),
            "cluster_readonly" => Ok(Role::ClusterReadonly),
            "guest" => Ok(Role::Guest),
            _ => Err(RoleParseError(value.to_string())),
        }
    }
}

/// The given string does not name a role known to the control plane.
#[derive(Debug, thiserror::Error)]
#[error("the string '{0}' does not name a role known to the control plane")]
pub struct RoleParseError(pub String);

/// The authenticated caller making a request.
///
/// Produced by the identity layer and immutable for the duration of a request.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Principal {
    /// Username asserted by the identity layer.
    pub username: String,

    /// Groups the principal belongs to, in the order the identity layer lists them.
    #[serde(default)]
    pub groups: Vec<String>,
}

impl Principal {
    /// A principal with no group memberships.
    pub fn new<S: Into<String>>(username: S) -> Principal {
        Principal {
            username: username.into(),
            groups: Vec::new(),
        }
    }
}

/// Result of the authentication process for the current request.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct AuthContext {
    /// The authenticated principal.
    pub principal: Principal,

    /// Platform roles the principal holds, as decoded from its credential.
    pub roles: BTreeSet<Role>,
}

impl AuthContext {
    /// Check if the authenticated principal is a platform administrator.
    pub fn is_platform_admin(&self) -> bool {
        self.roles.contains(&Role::PlatformAdmin)
    }
}
