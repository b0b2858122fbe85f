//! Resolve the clusters, roles and namespace scopes a principal holds.
use std::collections::BTreeSet;

use anyhow::Result;

use kubegate_context::Context;
use kubegate_models::AuthorizationSnapshot;
use kubegate_models::GrantRecord;
use kubegate_models::Principal;
use kubegate_models::Role;
use kubegate_store::query::GroupRoles;
use kubegate_store::query::SearchGrants;
use kubegate_store::GrantStore;

/// Compute the effective access of a principal from persisted grants.
///
/// Resolution is a pure function of the store's current contents and the
/// request's principal: concurrent resolutions need no coordination.
#[derive(Clone)]
pub struct Resolver {
    store: GrantStore,
}

impl Resolver {
    /// Initialise a resolver reading from the given store.
    pub fn new(store: GrantStore) -> Resolver {
        Resolver { store }
    }

    /// Effective roles held by a principal on one cluster.
    ///
    /// `raw_claims` is the comma-separated role-claim list attached by the
    /// identity layer. If it carries the platform-admin role that role is
    /// returned immediately without touching the store.
    ///
    /// Otherwise the result is the deduplicated union of the roles granted
    /// to the principal directly and through any of its groups. No matching
    /// grant resolves to an empty set: callers read that as "no access", a
    /// deny, not a fault.
    pub async fn cluster_roles(
        &self,
        context: &Context,
        cluster: &str,
        principal: &Principal,
        raw_claims: &str,
    ) -> Result<BTreeSet<Role>> {
        let claimed = Role::parse_list(raw_claims);
        if claimed.contains(&Role::PlatformAdmin) {
            return Ok([Role::PlatformAdmin].into());
        }

        let mut roles = BTreeSet::new();
        let search = SearchGrants::for_user(&principal.username).with_cluster(cluster);
        for grant in self.store.query(context, search).await? {
            if grant.enabled {
                roles.insert(grant.role);
            }
        }
        if !principal.groups.is_empty() {
            let search =
                SearchGrants::for_groups(principal.groups.iter().cloned()).with_cluster(cluster);
            for grant in self.store.query(context, search).await? {
                if grant.enabled {
                    roles.insert(grant.role);
                }
            }
        }
        Ok(roles)
    }

    /// All enabled grants covering a principal, across every cluster.
    ///
    /// Grants attached directly to the user come first, grants reaching the
    /// principal through group membership follow. The two paths are
    /// concatenated as-is: a `(cluster, role)` pair reachable both directly
    /// and through a group appears twice. Receivers that need set semantics
    /// must deduplicate themselves.
    pub async fn clusters(
        &self,
        context: &Context,
        principal: &Principal,
    ) -> Result<Vec<GrantRecord>> {
        let search = SearchGrants::for_user(&principal.username);
        let mut grants = self.store.query(context, search).await?;
        if !principal.groups.is_empty() {
            let search = SearchGrants::for_groups(principal.groups.iter().cloned());
            let group_grants = self.store.query(context, search).await?;
            grants.extend(group_grants);
        }
        grants.retain(|grant| grant.enabled);
        Ok(grants)
    }

    /// Distinct platform roles bound to any of the principal's groups.
    ///
    /// Only used to detect platform-admin membership via group during login,
    /// never during per-request cluster authorization.
    pub async fn group_platform_roles(
        &self,
        context: &Context,
        groups: &[String],
    ) -> Result<BTreeSet<Role>> {
        if groups.is_empty() {
            return Ok(BTreeSet::new());
        }
        let query = GroupRoles::new(groups.iter().cloned());
        self.store.query(context, query).await
    }

    /// Resolve the full authorization state of a principal at this instant.
    ///
    /// The snapshot merges the identity layer's role claims with the
    /// platform roles of the principal's groups and every enabled grant that
    /// covers the principal. It is the input to credential issuance on login
    /// and refresh.
    pub async fn snapshot(
        &self,
        context: &Context,
        principal: &Principal,
        raw_claims: &str,
    ) -> Result<AuthorizationSnapshot> {
        let mut roles = Role::parse_list(raw_claims);
        let group_roles = self.group_platform_roles(context, &principal.groups).await?;
        roles.extend(group_roles);
        let grants = self.clusters(context, principal).await?;
        Ok(AuthorizationSnapshot::new(
            principal.username.clone(),
            roles,
            grants,
        ))
    }
}
