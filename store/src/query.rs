//! KubeGate persistent store operations to query grant records.
use std::cmp::Ordering;
use std::collections::BTreeSet;

use kubegate_models::GrantRecord;
use kubegate_models::GrantSubject;
use kubegate_models::Role;

use self::seal::SealQueryOp;

/// Internal trait to enable query operations on the persistent store.
pub trait QueryOp: Into<QueryOps> + SealQueryOp {
    /// Type returned by the matching query operation.
    type Response: From<QueryResponses>;
}

/// List of all query operations the persistent store must implement.
pub enum QueryOps {
    /// Search grant records matching a filter.
    Grants(SearchGrants),

    /// Distinct platform roles bound to any of the given groups.
    GroupRoles(GroupRoles),
}

/// List of all responses from query operations.
pub enum QueryResponses {
    /// Return the grant records matching a search.
    Grants(Vec<GrantRecord>),

    /// Return a set of distinct roles.
    Roles(BTreeSet<Role>),
}

// --- High level query operations --- //
/// Search grant records matching every filter that is set.
///
/// Results are returned in listing order: subject kind descending (user
/// entries before group entries), subject name ascending, record id as the
/// final tiebreak. The ordering is stable and reproducible for identical
/// store contents.
///
/// A search matching nothing returns an empty list, never an error.
#[derive(Clone, Debug, Default)]
pub struct SearchGrants {
    /// Only return grants for this cluster.
    pub cluster: Option<String>,

    /// Only return grants for this role.
    pub role: Option<Role>,

    /// Only return grants bound to this kind of subject.
    pub subject: Option<GrantSubject>,

    /// Only return grants whose subject name is in this list.
    pub subject_names: Option<Vec<String>>,
}

impl SearchGrants {
    /// Search every grant in the store.
    pub fn all() -> SearchGrants {
        SearchGrants::default()
    }

    /// Search grants attached directly to the given user.
    pub fn for_user<S: Into<String>>(username: S) -> SearchGrants {
        SearchGrants {
            subject: Some(GrantSubject::User),
            subject_names: Some(vec![username.into()]),
            ..SearchGrants::default()
        }
    }

    /// Search grants attached to any of the given groups.
    pub fn for_groups<I, S>(groups: I) -> SearchGrants
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let groups: Vec<String> = groups.into_iter().map(Into::into).collect();
        SearchGrants {
            subject: Some(GrantSubject::Group),
            subject_names: Some(groups),
            ..SearchGrants::default()
        }
    }

    /// Restrict the search to one cluster.
    pub fn with_cluster<S: Into<String>>(mut self, cluster: S) -> SearchGrants {
        self.cluster = Some(cluster.into());
        self
    }

    /// Restrict the search to one role.
    pub fn with_role(mut self, role: Role) -> SearchGrants {
        self.role = Some(role);
        self
    }

    /// Check a record against every filter that is set.
    pub fn matches(&self, grant: &GrantRecord) -> bool {
        if let Some(cluster) = &self.cluster {
            if grant.cluster != *cluster {
                return false;
            }
        }
        if let Some(role) = self.role {
            if grant.role != role {
                return false;
            }
        }
        if let Some(subject) = self.subject {
            if grant.subject != subject {
                return false;
            }
        }
        if let Some(names) = &self.subject_names {
            if !names.iter().any(|name| grant.subject_name == *name) {
                return false;
            }
        }
        true
    }
}

/// Listing order for grant search results.
///
/// Subject kind descending puts user entries ahead of group entries, names
/// then sort alphabetically with the record id as a stable tiebreak.
pub fn listing_order(a: &GrantRecord, b: &GrantRecord) -> Ordering {
    b.subject
        .as_str()
        .cmp(a.subject.as_str())
        .then_with(|| a.subject_name.cmp(&b.subject_name))
        .then_with(|| a.id.cmp(&b.id))
}

/// Distinct platform roles bound to any of the given group names.
///
/// Only used to detect platform-admin membership via group during login,
/// never during per-request cluster authorization.
#[derive(Clone, Debug)]
pub struct GroupRoles(pub Vec<String>);

impl GroupRoles {
    /// Look up the platform roles for a set of group names.
    pub fn new<I, S>(groups: I) -> GroupRoles
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        GroupRoles(groups.into_iter().map(Into::into).collect())
    }
}

// --- Internal implementation details follow --- //
/// Private module to seal implementation details.
mod seal {
    /// Super-trait to seal the [`QueryOp`](super::QueryOp) trait.
    pub trait SealQueryOp {}
}

// --- Implement QueryOp and super traits on types for transparent operations --- //
impl SealQueryOp for SearchGrants {}
impl QueryOp for SearchGrants {
    type Response = Vec<GrantRecord>;
}
impl From<SearchGrants> for QueryOps {
    fn from(value: SearchGrants) -> Self {
        QueryOps::Grants(value)
    }
}

impl SealQueryOp for GroupRoles {}
impl QueryOp for GroupRoles {
    type Response = BTreeSet<Role>;
}
impl From<GroupRoles> for QueryOps {
    fn from(value: GroupRoles) -> Self {
        QueryOps::GroupRoles(value)
    }
}

// --- Implement QueryResponses conversions on return types for transparent operations --- //
impl From<QueryResponses> for Vec<GrantRecord> {
    fn from(value: QueryResponses) -> Self {
        match value {
            QueryResponses::Grants(grants) => grants,
            _ => panic!("unexpected result type for the given query operation"),
        }
    }
}
impl From<QueryResponses> for BTreeSet<Role> {
    fn from(value: QueryResponses) -> Self {
        match value {
            QueryResponses::Roles(roles) => roles,
            _ => panic!("unexpected result type for the given query operation"),
        }
    }
}
