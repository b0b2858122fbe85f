//! KubeGate persistent store operations to delete grant records.
use uuid::Uuid;

use kubegate_models::GrantRecord;

use self::seal::SealDeleteOp;

/// Internal trait to enable delete operations on the persistent store.
pub trait DeleteOp: Into<DeleteOps> + SealDeleteOp {
    /// Type returned by the matching delete operation.
    type Response: From<DeleteResponses>;
}

/// List of all delete operations the persistent store must implement.
pub enum DeleteOps {
    /// Delete grant records by id.
    Grants(DeleteGrants),
}

/// List of all responses from delete operations.
pub enum DeleteResponses {
    /// The operation completed successfully and does not return data.
    Success,
}

// --- High level delete operations --- //
/// Request deletion of the grant records with the given ids.
///
/// Ids with no matching record are ignored.
pub struct DeleteGrants(pub Vec<Uuid>);

impl From<Uuid> for DeleteGrants {
    fn from(value: Uuid) -> Self {
        DeleteGrants(vec![value])
    }
}
impl From<Vec<Uuid>> for DeleteGrants {
    fn from(value: Vec<Uuid>) -> Self {
        DeleteGrants(value)
    }
}
impl From<&GrantRecord> for DeleteGrants {
    fn from(value: &GrantRecord) -> Self {
        DeleteGrants(vec![value.id])
    }
}

// --- Internal implementation details follow --- //
/// Private module to seal implementation details.
mod seal {
    /// Super-trait to seal the [`DeleteOp`](super::DeleteOp) trait.
    pub trait SealDeleteOp {}
}

// --- Implement DeleteOp and super traits on types for transparent operations --- //
impl SealDeleteOp for DeleteGrants {}
impl DeleteOp for DeleteGrants {
    type Response = ();
}
impl From<DeleteGrants> for DeleteOps {
    fn from(value: DeleteGrants) -> Self {
        DeleteOps::Grants(value)
    }
}

impl SealDeleteOp for &GrantRecord {}
impl DeleteOp for &GrantRecord {
    type Response = ();
}
impl From<&GrantRecord> for DeleteOps {
    fn from(value: &GrantRecord) -> Self {
        let value = DeleteGrants::from(value);
        DeleteOps::Grants(value)
    }
}

// --- Implement DeleteResponses conversions on return types for transparent operations --- //
impl From<DeleteResponses> for () {
    fn from(value: DeleteResponses) -> Self {
        match value {
            DeleteResponses::Success => (),
        }
    }
}
