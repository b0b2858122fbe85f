//! Information attached to grant administration audit events.
use anyhow::Result;
use opentelemetry_api::trace::TraceContextExt;
use opentelemetry_api::trace::TraceId;
use opentelemetry_api::Context as OTelContext;
use serde::Deserialize;
use serde::Serialize;
use serde_json::Value as Json;

use kubegate_events::Event;

use super::ForbiddenMutation;

/// Event code for grant administration audit events.
pub const AUDIT_GRANT_ADMIN: &str = "AUDIT_GRANT_ADMIN";

/// Payload for grant administration audit events.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct GrantAudit {
    /// Username of the actor performing the mutation.
    pub actor: String,

    /// Administrative action being performed.
    pub action: String,

    /// Cluster targeted by the mutation, empty when not known.
    pub cluster: String,

    /// Outcome of the mutation attempt.
    pub outcome: AuditOutcome,

    /// Action specific request details.
    pub detail: Json,

    /// Tracing ID to link this audit event to a larger context, if tracing is available.
    pub trace_id: Option<String>,
}

impl GrantAudit {
    /// Compose a grant administration audit event.
    pub fn event<S1, S2, S3>(
        actor: S1,
        action: S2,
        cluster: S3,
        outcome: AuditOutcome,
        detail: Json,
    ) -> Result<Event>
    where
        S1: Into<String>,
        S2: Into<String>,
        S3: Into<String>,
    {
        let trace_id = OTelContext::current().span().span_context().trace_id();
        let trace_id = if trace_id == TraceId::INVALID {
            None
        } else {
            Some(trace_id.to_string())
        };
        let payload = GrantAudit {
            actor: actor.into(),
            action: action.into(),
            cluster: cluster.into(),
            outcome,
            detail,
            trace_id,
        };
        Event::new_with_payload(AUDIT_GRANT_ADMIN, payload)
    }
}

/// Outcome of a grant mutation reported in a [`GrantAudit`] event.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuditOutcome {
    /// The mutation was applied.
    Success,

    /// The actor was not allowed to perform the mutation.
    Denied,

    /// The mutation was allowed but failed to apply.
    Error,
}

impl AuditOutcome {
    /// Derive the audit outcome from an operation result.
    pub fn of<T>(result: &Result<T>) -> AuditOutcome {
        match result {
            Ok(_) => AuditOutcome::Success,
            Err(error) if error.is::<ForbiddenMutation>() => AuditOutcome::Denied,
            Err(_) => AuditOutcome::Error,
        }
    }
}
