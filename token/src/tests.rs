//! Unit tests for credential issuance, validation and authorization.
use std::collections::BTreeSet;
use std::collections::HashMap;
use std::time::Duration;

use anyhow::Result;
use jsonwebtoken::Algorithm;
use jsonwebtoken::EncodingKey;
use jsonwebtoken::Header;
use time::OffsetDateTime;

use kubegate_models::GrantRecord;
use kubegate_models::GrantSubject;
use kubegate_models::Role;

use crate::bearer_credential;
use crate::AuthorizationDecision;
use crate::CredentialClaims;
use crate::CredentialError;
use crate::CredentialIssuer;
use crate::CredentialReader;
use crate::CredentialValidator;
use crate::RequestAuthorizer;

const SECRET: &[u8] = b"unit-test-signing-secret";
const ONE_HOUR: Duration = Duration::from_secs(3600);

fn readonly_prod_grants() -> Vec<GrantRecord> {
    vec![GrantRecord::new(
        "prod",
        Role::ClusterReadonly,
        GrantSubject::User,
        "alice",
    )]
}

/// Encode a claim set directly, bypassing the issuer's timestamp handling.
fn encode_raw(claims: &CredentialClaims) -> String {
    let key = EncodingKey::from_secret(SECRET);
    jsonwebtoken::encode(&Header::new(Algorithm::HS256), claims, &key).unwrap()
}

fn expired_claims(role: &str) -> CredentialClaims {
    let now = OffsetDateTime::now_utc().unix_timestamp();
    CredentialClaims {
        username: "alice".to_string(),
        role: role.to_string(),
        clusters: "prod".to_string(),
        cluster_grants: readonly_prod_grants(),
        iat: now - 7200,
        exp: now - 120,
    }
}

#[test]
fn issue_then_validate_round_trip() {
    let roles: BTreeSet<Role> = [Role::Guest].into();
    let grants = readonly_prod_grants();
    let issuer = CredentialIssuer::new(SECRET);
    let credential = issuer.issue("alice", &roles, &grants, ONE_HOUR).unwrap();

    let validator = CredentialValidator::new(SECRET);
    let claims = validator.validate(&credential).unwrap();
    assert_eq!(claims.username, "alice");
    assert_eq!(claims.role, "guest");
    assert_eq!(claims.clusters, "prod");
    assert_eq!(claims.cluster_grants, grants);
    assert!(claims.exp > claims.iat);
}

#[test]
fn validate_rejects_tampered_signature() {
    let issuer = CredentialIssuer::new(SECRET);
    let credential = issuer
        .issue("alice", &BTreeSet::new(), &readonly_prod_grants(), ONE_HOUR)
        .unwrap();

    // Flip the last character of the signature segment.
    let mut tampered = credential.clone();
    let last = tampered.pop().unwrap();
    tampered.push(if last == 'A' { 'B' } else { 'A' });

    let validator = CredentialValidator::new(SECRET);
    let error = validator.validate(&tampered).unwrap_err();
    assert!(matches!(error, CredentialError::Invalid));
}

#[test]
fn validate_rejects_wrong_secret() {
    let issuer = CredentialIssuer::new(b"a different secret");
    let credential = issuer
        .issue("alice", &BTreeSet::new(), &readonly_prod_grants(), ONE_HOUR)
        .unwrap();

    let validator = CredentialValidator::new(SECRET);
    let error = validator.validate(&credential).unwrap_err();
    assert!(matches!(error, CredentialError::Invalid));
}

#[test]
fn validate_rejects_garbage() {
    let validator = CredentialValidator::new(SECRET);
    let error = validator.validate("not-a-credential").unwrap_err();
    assert!(matches!(error, CredentialError::Invalid));
}

#[test]
fn validate_rejects_expired() {
    let credential = encode_raw(&expired_claims("cluster_readonly"));
    let validator = CredentialValidator::new(SECRET);
    let error = validator.validate(&credential).unwrap_err();
    assert!(matches!(error, CredentialError::Expired));
}

#[test]
fn expired_wins_regardless_of_claim_contents() {
    // Even a platform admin credential is rejected once past expiry.
    let credential = encode_raw(&expired_claims("platform_admin"));
    let authorizer = RequestAuthorizer::new(SECRET);
    let error = authorizer
        .authorize(&credential, "prod", Role::ClusterReadonly, None)
        .unwrap_err();
    assert!(matches!(error, CredentialError::Expired));
}

#[test]
fn authorize_at_or_below_granted_role() {
    let grants = vec![GrantRecord::new(
        "prod",
        Role::ClusterAdmin,
        GrantSubject::User,
        "alice",
    )];
    let issuer = CredentialIssuer::new(SECRET);
    let credential = issuer.issue("alice", &BTreeSet::new(), &grants, ONE_HOUR).unwrap();

    let authorizer = RequestAuthorizer::new(SECRET);
    for required in [Role::ClusterAdmin, Role::ClusterReadonly] {
        let decision = authorizer.authorize(&credential, "prod", required, None).unwrap();
        assert!(decision.is_authorized());
    }
}

#[test]
fn readonly_never_satisfies_a_write_requirement() {
    let issuer = CredentialIssuer::new(SECRET);
    let credential = issuer
        .issue("alice", &BTreeSet::new(), &readonly_prod_grants(), ONE_HOUR)
        .unwrap();

    let authorizer = RequestAuthorizer::new(SECRET);
    let decision = authorizer
        .authorize(&credential, "prod", Role::ClusterAdmin, None)
        .unwrap();
    assert_eq!(decision, AuthorizationDecision::NotAuthorized);
}

#[test]
fn no_grant_for_the_target_cluster_denies() {
    let issuer = CredentialIssuer::new(SECRET);
    let credential = issuer
        .issue("alice", &BTreeSet::new(), &readonly_prod_grants(), ONE_HOUR)
        .unwrap();

    let authorizer = RequestAuthorizer::new(SECRET);
    let decision = authorizer
        .authorize(&credential, "staging", Role::ClusterReadonly, None)
        .unwrap();
    assert_eq!(decision, AuthorizationDecision::NotAuthorized);
}

#[test]
fn platform_admin_authorizes_any_cluster() {
    let roles: BTreeSet<Role> = [Role::PlatformAdmin].into();
    let issuer = CredentialIssuer::new(SECRET);
    let credential = issuer.issue("root", &roles, &[], ONE_HOUR).unwrap();

    let authorizer = RequestAuthorizer::new(SECRET);
    let decision = authorizer
        .authorize(&credential, "never-granted", Role::ClusterAdmin, Some("any"))
        .unwrap();
    assert_eq!(
        decision,
        AuthorizationDecision::Authorized {
            namespaces: BTreeSet::new(),
        },
    );
}

#[test]
fn namespace_scope_is_enforced() {
    let mut grant = GrantRecord::new("prod", Role::ClusterAdmin, GrantSubject::User, "alice");
    grant.namespaces.insert("team-a".to_string());
    let issuer = CredentialIssuer::new(SECRET);
    let credential = issuer
        .issue("alice", &BTreeSet::new(), &[grant.clone()], ONE_HOUR)
        .unwrap();

    let authorizer = RequestAuthorizer::new(SECRET);
    let decision = authorizer
        .authorize(&credential, "prod", Role::ClusterAdmin, Some("team-a"))
        .unwrap();
    assert_eq!(
        decision,
        AuthorizationDecision::Authorized {
            namespaces: grant.namespaces.clone(),
        },
    );

    let decision = authorizer
        .authorize(&credential, "prod", Role::ClusterAdmin, Some("team-b"))
        .unwrap();
    assert_eq!(decision, AuthorizationDecision::NotAuthorized);
}

#[test]
fn empty_namespace_set_is_unrestricted() {
    let issuer = CredentialIssuer::new(SECRET);
    let credential = issuer
        .issue("alice", &BTreeSet::new(), &readonly_prod_grants(), ONE_HOUR)
        .unwrap();

    let authorizer = RequestAuthorizer::new(SECRET);
    let decision = authorizer
        .authorize(&credential, "prod", Role::ClusterReadonly, Some("kube-system"))
        .unwrap();
    assert!(decision.is_authorized());
}

#[test]
fn disabled_grants_are_ignored() {
    let mut grant = GrantRecord::new("prod", Role::ClusterAdmin, GrantSubject::User, "alice");
    grant.enabled = false;
    let issuer = CredentialIssuer::new(SECRET);
    let credential = issuer.issue("alice", &BTreeSet::new(), &[grant], ONE_HOUR).unwrap();

    let authorizer = RequestAuthorizer::new(SECRET);
    let decision = authorizer
        .authorize(&credential, "prod", Role::ClusterReadonly, None)
        .unwrap();
    assert_eq!(decision, AuthorizationDecision::NotAuthorized);
}

struct MapReader(HashMap<&'static str, &'static str>);

impl CredentialReader for MapReader {
    fn metadata(&self, name: &str) -> Result<Option<&str>> {
        Ok(self.0.get(name).copied())
    }
}

#[test]
fn bearer_credential_extraction() {
    let reader = MapReader([("Authorization", "Bearer token-value")].into());
    assert_eq!(bearer_credential(&reader).unwrap(), Some("token-value"));

    let reader = MapReader(HashMap::new());
    assert_eq!(bearer_credential(&reader).unwrap(), None);

    let reader = MapReader([("Authorization", "Basic dXNlcjpwdw==")].into());
    assert_eq!(bearer_credential(&reader).unwrap(), None);
}
