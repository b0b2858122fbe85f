//! Grant resolution and administration for the KubeGate control plane.
//!
//! This crate answers two questions:
//!
//! - Resolution: which clusters can a principal act on, with what role and
//!   namespace scope? ([`Resolver`])
//! - Administration: who may change the grants themselves, and how are those
//!   changes recorded? ([`GrantAdmin`])
//!
//! ## Platform admin short-circuit
//!
//! The platform administrator role is the maximum privilege: a principal
//! whose role claims carry it is resolved to that single role without ever
//! touching the store, and per-cluster grants can never narrow it.
//! Every other principal is a regular user whose access comes exclusively
//! from persisted grants, directly by username or through group membership.
//!
//! ## Auditing
//!
//! Grant mutations are a security boundary: every invocation of an
//! administrative operation appends an audit event recording the actor, the
//! action, the target cluster and the outcome, whether the mutation was
//! applied, denied or failed. Audit delivery problems never block an
//! authorized operation but are surfaced to the logs for operational
//! monitoring.
mod admin;
mod audit;
mod resolve;

#[cfg(test)]
mod tests;

pub use self::admin::ForbiddenMutation;
pub use self::admin::GrantAdmin;
pub use self::admin::CHANGE_GRANT_CREATED;
pub use self::admin::CHANGE_GRANT_DELETED;
pub use self::admin::CHANGE_GRANT_NAMESPACES;
pub use self::audit::AuditOutcome;
pub use self::audit::GrantAudit;
pub use self::audit::AUDIT_GRANT_ADMIN;
pub use self::resolve::Resolver;
