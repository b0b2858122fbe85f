//! KubeGate persistent store operations to persist grant records.
use std::collections::BTreeSet;

use uuid::Uuid;

use kubegate_models::GrantRecord;
use kubegate_models::GroupBinding;

use self::seal::SealPersistOp;

/// Internal trait to enable persist operations on the persistent store.
pub trait PersistOp: Into<PersistOps> + SealPersistOp {
    /// Type returned by the matching persist operation.
    type Response: From<PersistResponses>;
}

/// List of all persist operations the persistent store must implement.
pub enum PersistOps {
    /// Persist a new grant record.
    Grant(CreateGrant),

    /// Replace the namespace scope of exactly one grant record.
    GrantNamespaces(UpdateGrantNamespaces),

    /// Persist a group to platform role binding.
    GroupBinding(GroupBinding),
}

/// List of all responses from persist operations.
pub enum PersistResponses {
    /// Return the grant record as updated by the operation.
    Grant(GrantRecord),

    /// The operation completed successfully and does not return data.
    Success,
}

// --- High level persist operations --- //
/// Persist a new grant record.
///
/// Creation is idempotent on the record's natural deduplication key: a record
/// with the same `(cluster, role, subject, subject_name)` already in the
/// store turns the operation into a no-op.
pub struct CreateGrant(pub GrantRecord);

impl From<GrantRecord> for CreateGrant {
    fn from(value: GrantRecord) -> Self {
        CreateGrant(value)
    }
}

/// Replace the namespace scope of exactly one grant record.
///
/// The update is applied atomically to the single targeted record and returns
/// the record with its new scope. Targeting a missing record fails with a
/// [`GrantNotFound`](crate::GrantNotFound) error.
#[derive(Clone, Debug)]
pub struct UpdateGrantNamespaces {
    /// Identifier of the record to update.
    pub id: Uuid,

    /// The new namespace scope; empty means unrestricted.
    pub namespaces: BTreeSet<String>,
}

// --- Internal implementation details follow --- //
/// Private module to seal implementation details.
mod seal {
    /// Super-trait to seal the [`PersistOp`](super::PersistOp) trait.
    pub trait SealPersistOp {}
}

// --- Implement PersistOp and super traits on types for transparent operations --- //
impl SealPersistOp for CreateGrant {}
impl PersistOp for CreateGrant {
    type Response = ();
}
impl From<CreateGrant> for PersistOps {
    fn from(value: CreateGrant) -> Self {
        PersistOps::Grant(value)
    }
}

impl SealPersistOp for UpdateGrantNamespaces {}
impl PersistOp for UpdateGrantNamespaces {
    type Response = GrantRecord;
}
impl From<UpdateGrantNamespaces> for PersistOps {
    fn from(value: UpdateGrantNamespaces) -> Self {
        PersistOps::GrantNamespaces(value)
    }
}

impl SealPersistOp for GroupBinding {}
impl PersistOp for GroupBinding {
    type Response = ();
}
impl From<GroupBinding> for PersistOps {
    fn from(value: GroupBinding) -> Self {
        PersistOps::GroupBinding(value)
    }
}

// --- Implement PersistResponses conversions on return types for transparent operations --- //
impl From<PersistResponses> for () {
    fn from(value: PersistResponses) -> Self {
        match value {
            PersistResponses::Success => (),
            _ => panic!("unexpected result type for the given persist operation"),
        }
    }
}
impl From<PersistResponses> for GrantRecord {
    fn from(value: PersistResponses) -> Self {
        match value {
            PersistResponses::Grant(grant) => grant,
            _ => panic!("unexpected result type for the given persist operation"),
        }
    }
}
