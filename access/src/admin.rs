//! Administrative mutations of grant records.
use std::collections::BTreeSet;

use anyhow::Result;
use serde_json::Value as Json;
use uuid::Uuid;

use kubegate_context::Context;
use kubegate_events::emit::Events;
use kubegate_events::Event;
use kubegate_models::GrantRecord;
use kubegate_store::delete::DeleteGrants;
use kubegate_store::persist::CreateGrant;
use kubegate_store::persist::UpdateGrantNamespaces;
use kubegate_store::GrantStore;

use super::AuditOutcome;
use super::GrantAudit;

/// Event code for grant creation change events.
pub const CHANGE_GRANT_CREATED: &str = "GRANT_CREATED";

/// Event code for grant deletion change events.
pub const CHANGE_GRANT_DELETED: &str = "GRANT_DELETED";

/// Event code for namespace scope change events.
pub const CHANGE_GRANT_NAMESPACES: &str = "GRANT_NAMESPACES_UPDATED";

/// Apply administrative mutations to grant records.
///
/// Every operation is restricted to platform administrators and audited on
/// every invocation, whether it succeeds, is denied or fails.
///
/// ## Panics
///
/// All operations expect [`Context::auth`] to be `Some` and panic if it is
/// not: an unauthenticated caller reaching an administrative operation is a
/// wiring bug, not a policy decision, and must be identified quickly.
#[derive(Clone)]
pub struct GrantAdmin {
    events: Events,
    store: GrantStore,
}

impl GrantAdmin {
    /// Initialise a grant administrator over the given store.
    pub fn new(store: GrantStore, events: Events) -> GrantAdmin {
        GrantAdmin { events, store }
    }

    /// Persist a new grant record.
    ///
    /// Creation is idempotent on the record's deduplication key: saving an
    /// already granted `(cluster, role, subject, subject_name)` is a no-op.
    pub async fn create_grant(&self, context: &Context, grant: GrantRecord) -> Result<()> {
        let action = "grant.create";
        let cluster = grant.cluster.clone();
        let detail = serde_json::json!({ "grant": &grant });

        let result = match self.check_platform_admin(context, action) {
            Err(error) => Err(anyhow::Error::new(error)),
            Ok(()) => self.store.persist(context, CreateGrant(grant.clone())).await,
        };
        self.audit(context, action, &cluster, AuditOutcome::of(&result), detail)
            .await;
        if result.is_ok() {
            self.change(context, CHANGE_GRANT_CREATED, &grant).await;
        }
        result
    }

    /// Delete the grant records with the given ids.
    pub async fn delete_grants(&self, context: &Context, ids: Vec<Uuid>) -> Result<()> {
        let action = "grant.delete";
        let detail = serde_json::json!({ "ids": &ids });

        let result = match self.check_platform_admin(context, action) {
            Err(error) => Err(anyhow::Error::new(error)),
            Ok(()) => self.store.delete(context, DeleteGrants(ids.clone())).await,
        };
        self.audit(context, action, "", AuditOutcome::of(&result), detail)
            .await;
        if result.is_ok() {
            self.change(context, CHANGE_GRANT_DELETED, &ids).await;
        }
        result
    }

    /// Replace the namespace scope of exactly one grant record.
    ///
    /// The update is atomic at the store level. Concurrent edits of the same
    /// grant are last-writer-wins: there is no optimistic concurrency control
    /// on namespace scopes.
    pub async fn update_namespaces(
        &self,
        context: &Context,
        id: Uuid,
        namespaces: BTreeSet<String>,
    ) -> Result<GrantRecord> {
        let action = "grant.update-namespaces";
        let detail = serde_json::json!({ "id": id, "namespaces": &namespaces });

        let result = match self.check_platform_admin(context, action) {
            Err(error) => Err(anyhow::Error::new(error)),
            Ok(()) => {
                let update = UpdateGrantNamespaces { id, namespaces };
                self.store.persist(context, update).await
            }
        };
        let cluster = result
            .as_ref()
            .map(|grant| grant.cluster.clone())
            .unwrap_or_default();
        self.audit(context, action, &cluster, AuditOutcome::of(&result), detail)
            .await;
        if let Ok(grant) = &result {
            self.change(context, CHANGE_GRANT_NAMESPACES, grant).await;
        }
        result
    }

    /// Require the current caller to be a platform administrator.
    fn check_platform_admin(
        &self,
        context: &Context,
        action: &str,
    ) -> Result<(), ForbiddenMutation> {
        let auth = context
            .auth
            .as_ref()
            .expect("cannot administer grants without an auth context");
        if auth.is_platform_admin() {
            Ok(())
        } else {
            Err(ForbiddenMutation {
                actor: auth.principal.username.clone(),
                action: action.to_string(),
            })
        }
    }

    /// Generate a grant administration audit event and emit it.
    ///
    /// Errors during audit are ignored to preserve availability in case of
    /// upstream issues or misconfiguration.
    ///
    /// NOTE:
    ///   Only auditing errors are ignored, authorisation errors still deny
    ///   the mutation. This is done to ensure service and data protection
    ///   over availability.
    async fn audit(
        &self,
        context: &Context,
        action: &str,
        cluster: &str,
        outcome: AuditOutcome,
        detail: Json,
    ) {
        let actor = context
            .auth
            .as_ref()
            .expect("Context::auth must be set")
            .principal
            .username
            .clone();
        let event = match GrantAudit::event(actor, action, cluster, outcome, detail) {
            Ok(event) => event,
            Err(error) => {
                slog::error!(
                    context.logger,
                    "Failed to JSON serialise grant audit event payload";
                    "audit" => true,
                    "error" => %error,
                );
                return;
            }
        };
        if let Err(error) = self.events.audit(context, event).await {
            slog::error!(
                context.logger,
                "Failed to emit grant audit event";
                "audit" => true,
                "error" => %error,
            );
        }
    }

    /// Emit a change event for an applied mutation, logging emit failures.
    async fn change<P>(&self, context: &Context, code: &str, payload: &P)
    where
        P: serde::Serialize,
    {
        let event = match Event::new_with_payload(code, payload) {
            Ok(event) => event,
            Err(error) => {
                slog::error!(
                    context.logger,
                    "Failed to JSON serialise grant change event payload";
                    "event" => code.to_string(),
                    "error" => %error,
                );
                return;
            }
        };
        if let Err(error) = self.events.change(context, event).await {
            slog::error!(
                context.logger,
                "Failed to emit grant change event";
                "event" => code.to_string(),
                "error" => %error,
            );
        }
    }
}

/// An actor is not allowed to mutate grant records.
#[derive(Debug, thiserror::Error)]
#[error("actor \"{actor}\" is not a platform administrator and cannot perform \"{action}\"")]
pub struct ForbiddenMutation {
    /// Username of the denied actor.
    pub actor: String,

    /// Administrative action that was denied.
    pub action: String,
}
