//! Unit tests for grant resolution and administration.
use std::collections::BTreeSet;
use std::time::Duration;

use kubegate_context::Context;
use kubegate_events::emit::Events;
use kubegate_events::emit::EventsFixture;
use kubegate_models::AuthContext;
use kubegate_models::GrantRecord;
use kubegate_models::GrantSubject;
use kubegate_models::GroupBinding;
use kubegate_models::Principal;
use kubegate_models::Role;
use kubegate_store::persist::CreateGrant;
use kubegate_store::query::SearchGrants;
use kubegate_store::GrantStore;

use super::AuditOutcome;
use super::ForbiddenMutation;
use super::GrantAdmin;
use super::GrantAudit;
use super::Resolver;
use super::AUDIT_GRANT_ADMIN;

const ONE_SEC: Duration = Duration::from_secs(1);

fn authenticated(username: &str, roles: &[Role]) -> Context {
    let auth = AuthContext {
        principal: Principal::new(username),
        roles: roles.iter().copied().collect(),
    };
    Context::fixture_authenticated(auth)
}

async fn seed(store: &GrantStore, grants: &[GrantRecord]) {
    let context = Context::fixture();
    for grant in grants {
        store
            .persist(&context, CreateGrant(grant.clone()))
            .await
            .expect("seeding grant to be ok");
    }
}

#[tokio::test]
async fn platform_admin_claim_short_circuits_the_store() {
    let context = Context::fixture();
    let resolver = Resolver::new(GrantStore::fixture());
    let principal = Principal::new("root");

    // No grants exist at all, even for this cluster name.
    let roles = resolver
        .cluster_roles(&context, "never-granted", &principal, "platform_admin,extra")
        .await
        .unwrap();
    let expected: BTreeSet<Role> = [Role::PlatformAdmin].into();
    assert_eq!(roles, expected);
}

#[tokio::test]
async fn no_grants_resolve_to_empty_not_error() {
    let context = Context::fixture();
    let resolver = Resolver::new(GrantStore::fixture());
    let principal = Principal {
        username: "alice".to_string(),
        groups: vec!["team-a".to_string()],
    };

    let roles = resolver
        .cluster_roles(&context, "prod", &principal, "")
        .await
        .unwrap();
    assert!(roles.is_empty());

    let grants = resolver.clusters(&context, &principal).await.unwrap();
    assert!(grants.is_empty());
}

#[tokio::test]
async fn direct_user_grant_resolves() {
    let context = Context::fixture();
    let store = GrantStore::fixture();
    seed(
        &store,
        &[GrantRecord::new(
            "prod",
            Role::ClusterReadonly,
            GrantSubject::User,
            "alice",
        )],
    )
    .await;
    let resolver = Resolver::new(store);
    let alice = Principal::new("alice");

    let roles = resolver
        .cluster_roles(&context, "prod", &alice, "")
        .await
        .unwrap();
    let expected: BTreeSet<Role> = [Role::ClusterReadonly].into();
    assert_eq!(roles, expected);

    // No grant covers staging.
    let roles = resolver
        .cluster_roles(&context, "staging", &alice, "")
        .await
        .unwrap();
    assert!(roles.is_empty());
}

#[tokio::test]
async fn group_grant_reaches_group_members() {
    let context = Context::fixture();
    let store = GrantStore::fixture();
    seed(
        &store,
        &[GrantRecord::new(
            "prod",
            Role::ClusterAdmin,
            GrantSubject::Group,
            "team-a",
        )],
    )
    .await;
    let resolver = Resolver::new(store);
    let principal = Principal {
        username: "bob".to_string(),
        groups: vec!["team-a".to_string()],
    };

    // No user-subject grant exists for bob, only the group grant applies.
    let roles = resolver
        .cluster_roles(&context, "prod", &principal, "")
        .await
        .unwrap();
    let expected: BTreeSet<Role> = [Role::ClusterAdmin].into();
    assert_eq!(roles, expected);

    let grants = resolver.clusters(&context, &principal).await.unwrap();
    assert_eq!(grants.len(), 1);
    assert_eq!(grants[0].cluster, "prod");
    assert_eq!(grants[0].role, Role::ClusterAdmin);
}

#[tokio::test]
async fn duplicate_pairs_from_both_paths_are_preserved() {
    let context = Context::fixture();
    let store = GrantStore::fixture();
    seed(
        &store,
        &[
            GrantRecord::new("prod", Role::ClusterAdmin, GrantSubject::User, "alice"),
            GrantRecord::new("prod", Role::ClusterAdmin, GrantSubject::Group, "team-a"),
        ],
    )
    .await;
    let resolver = Resolver::new(store);
    let principal = Principal {
        username: "alice".to_string(),
        groups: vec!["team-a".to_string()],
    };

    let grants = resolver.clusters(&context, &principal).await.unwrap();
    assert_eq!(grants.len(), 2);
    // User grants come first, group grants are appended.
    assert_eq!(grants[0].subject, GrantSubject::User);
    assert_eq!(grants[1].subject, GrantSubject::Group);
}

#[tokio::test]
async fn disabled_grants_are_excluded_from_resolution() {
    let context = Context::fixture();
    let store = GrantStore::fixture();
    let mut grant = GrantRecord::new("prod", Role::ClusterAdmin, GrantSubject::User, "alice");
    grant.enabled = false;
    seed(&store, &[grant]).await;
    let resolver = Resolver::new(store.clone());
    let alice = Principal::new("alice");

    let roles = resolver
        .cluster_roles(&context, "prod", &alice, "")
        .await
        .unwrap();
    assert!(roles.is_empty());

    // Administrative listings still see the record.
    let listed = store
        .query(&context, SearchGrants::for_user("alice"))
        .await
        .unwrap();
    assert_eq!(listed.len(), 1);
}

#[tokio::test]
async fn snapshot_merges_claims_groups_and_grants() {
    let context = Context::fixture();
    let store = GrantStore::fixture();
    seed(
        &store,
        &[
            GrantRecord::new("prod", Role::ClusterAdmin, GrantSubject::User, "alice"),
            GrantRecord::new("staging", Role::ClusterReadonly, GrantSubject::Group, "team-a"),
        ],
    )
    .await;
    store
        .persist(
            &context,
            GroupBinding {
                group: "sre".to_string(),
                role: Role::PlatformAdmin,
            },
        )
        .await
        .unwrap();
    let resolver = Resolver::new(store);
    let principal = Principal {
        username: "alice".to_string(),
        groups: vec!["team-a".to_string(), "sre".to_string()],
    };

    let snapshot = resolver.snapshot(&context, &principal, "guest").await.unwrap();
    assert_eq!(snapshot.username, "alice");
    // Platform admin reached through the sre group binding.
    assert!(snapshot.roles.contains(&Role::PlatformAdmin));
    assert!(snapshot.roles.contains(&Role::Guest));
    assert_eq!(snapshot.cluster_names(), vec!["prod", "staging"]);
    let prod: BTreeSet<Role> = [Role::ClusterAdmin].into();
    assert_eq!(snapshot.cluster_roles.get("prod"), Some(&prod));
}

#[tokio::test]
async fn update_namespaces_by_non_admin_is_denied_and_audited_once() {
    let mut events = EventsFixture::new();
    let store = GrantStore::fixture();
    let grant = GrantRecord::new("prod", Role::ClusterReadonly, GrantSubject::User, "bob");
    seed(&store, &[grant.clone()]).await;
    let admin = GrantAdmin::new(store.clone(), Events::from(events.backend()));
    let context = authenticated("mallory", &[Role::ClusterAdmin]);

    let namespaces: BTreeSet<String> = ["team-a".to_string()].into();
    let error = admin
        .update_namespaces(&context, grant.id, namespaces)
        .await
        .expect_err("mutation to be denied");
    assert!(error.is::<ForbiddenMutation>());

    // Exactly one audit entry, with a denied outcome.
    let audit = events.pop_audit_timeout(ONE_SEC).await.unwrap();
    assert_eq!(audit.code, AUDIT_GRANT_ADMIN);
    let payload: GrantAudit = audit.decode().unwrap();
    assert_eq!(payload.actor, "mallory");
    assert_eq!(payload.action, "grant.update-namespaces");
    assert_eq!(payload.outcome, AuditOutcome::Denied);
    assert!(events.pop_audit_timeout(ONE_SEC).await.is_err());

    // The target record is unchanged.
    let context = Context::fixture();
    let listed = store
        .query(&context, SearchGrants::for_user("bob"))
        .await
        .unwrap();
    assert!(listed[0].namespaces.is_empty());
}

#[tokio::test]
async fn update_namespaces_by_admin_is_applied_and_audited() {
    let mut events = EventsFixture::new();
    let store = GrantStore::fixture();
    let grant = GrantRecord::new("prod", Role::ClusterReadonly, GrantSubject::User, "bob");
    seed(&store, &[grant.clone()]).await;
    let admin = GrantAdmin::new(store.clone(), Events::from(events.backend()));
    let context = authenticated("root", &[Role::PlatformAdmin]);

    let namespaces: BTreeSet<String> = ["team-a".to_string()].into();
    let updated = admin
        .update_namespaces(&context, grant.id, namespaces.clone())
        .await
        .expect("mutation to be applied");
    assert_eq!(updated.namespaces, namespaces);

    let audit = events.pop_audit_timeout(ONE_SEC).await.unwrap();
    let payload: GrantAudit = audit.decode().unwrap();
    assert_eq!(payload.outcome, AuditOutcome::Success);
    assert_eq!(payload.cluster, "prod");

    let change = events.pop_change_timeout(ONE_SEC).await.unwrap();
    assert_eq!(change.code, super::CHANGE_GRANT_NAMESPACES);
}

#[tokio::test]
async fn update_namespaces_missing_grant_is_an_error_outcome() {
    let mut events = EventsFixture::new();
    let store = GrantStore::fixture();
    let admin = GrantAdmin::new(store, Events::from(events.backend()));
    let context = authenticated("root", &[Role::PlatformAdmin]);

    let error = admin
        .update_namespaces(&context, uuid::Uuid::new_v4(), BTreeSet::new())
        .await
        .expect_err("mutation to fail");
    assert!(error.is::<kubegate_store::GrantNotFound>());

    let audit = events.pop_audit_timeout(ONE_SEC).await.unwrap();
    let payload: GrantAudit = audit.decode().unwrap();
    assert_eq!(payload.outcome, AuditOutcome::Error);
}

#[tokio::test]
async fn create_grant_is_gated_and_audited() {
    let mut events = EventsFixture::new();
    let store = GrantStore::fixture();
    let admin = GrantAdmin::new(store.clone(), Events::from(events.backend()));
    let grant = GrantRecord::new("prod", Role::ClusterAdmin, GrantSubject::User, "alice");

    // Denied for a non-admin actor.
    let context = authenticated("mallory", &[]);
    let error = admin
        .create_grant(&context, grant.clone())
        .await
        .expect_err("creation to be denied");
    assert!(error.is::<ForbiddenMutation>());
    let audit = events.pop_audit_timeout(ONE_SEC).await.unwrap();
    let payload: GrantAudit = audit.decode().unwrap();
    assert_eq!(payload.outcome, AuditOutcome::Denied);

    // Applied for a platform admin.
    let context = authenticated("root", &[Role::PlatformAdmin]);
    admin
        .create_grant(&context, grant.clone())
        .await
        .expect("creation to be applied");
    let audit = events.pop_audit_timeout(ONE_SEC).await.unwrap();
    let payload: GrantAudit = audit.decode().unwrap();
    assert_eq!(payload.outcome, AuditOutcome::Success);
    assert_eq!(payload.cluster, "prod");
    let change = events.pop_change_timeout(ONE_SEC).await.unwrap();
    assert_eq!(change.code, super::CHANGE_GRANT_CREATED);

    let listed = store
        .query(&Context::fixture(), SearchGrants::for_user("alice"))
        .await
        .unwrap();
    assert_eq!(listed.len(), 1);
}

#[tokio::test]
async fn delete_grants_is_gated_and_audited() {
    let mut events = EventsFixture::new();
    let store = GrantStore::fixture();
    let grant = GrantRecord::new("prod", Role::ClusterAdmin, GrantSubject::User, "alice");
    seed(&store, &[grant.clone()]).await;
    let admin = GrantAdmin::new(store.clone(), Events::from(events.backend()));

    let context = authenticated("root", &[Role::PlatformAdmin]);
    admin
        .delete_grants(&context, vec![grant.id])
        .await
        .expect("deletion to be applied");

    let audit = events.pop_audit_timeout(ONE_SEC).await.unwrap();
    let payload: GrantAudit = audit.decode().unwrap();
    assert_eq!(payload.action, "grant.delete");
    assert_eq!(payload.outcome, AuditOutcome::Success);

    let listed = store
        .query(&Context::fixture(), SearchGrants::for_user("alice"))
        .await
        .unwrap();
    assert!(listed.is_empty());
}

#[tokio::test]
#[should_panic(expected = "cannot administer grants without an auth context")]
async fn admin_panics_without_auth_context() {
    let events = EventsFixture::new();
    let admin = GrantAdmin::new(GrantStore::fixture(), Events::from(events.backend()));
    let context = Context::fixture();
    let _ = admin.delete_grants(&context, Vec::new()).await;
}
