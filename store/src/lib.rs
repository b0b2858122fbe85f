//! Persistent grant storage interface for the KubeGate control plane.
//!
//! ## An ergonomic interface
//!
//! The objective of the [`GrantStore`] API is to provide a small high level
//! interface while preserving the ability of [`GrantStoreBackend`]s to pick
//! the most efficient implementation they can create.
//!
//! To achieve this:
//!
//! - The [`GrantStore`] interface focuses on high level operations.
//! - Operations are grouped into a small set of methods that accept different
//!   data and return different data.
//! - This is implemented with a combination of internal (sealed) `trait`s and enums.
//!
//! For example to search grants:
//!
//! ```ignore
//! use kubegate_store::query::SearchGrants;
//!
//! // All grants attached directly to a user.
//! let search = SearchGrants::for_user("alice");
//! let grants = store.query(context, search).await?;
//!
//! // Grants for a user on one cluster only.
//! let search = SearchGrants::for_user("alice").with_cluster("prod");
//! let grants = store.query(context, search).await?;
//! ```
//!
//! ### Backend implementations
//!
//! Backend implementations receive a wrapping `enum` type for the operation
//! group to implement. This makes adding new operations simpler, with fewer
//! files needing to change.
//!
//! The cost of this approach is that backend implementations need to deal with
//! these type enums and ensure the returned type matches what the requested
//! operation expects. If you fail to properly do this the [`GrantStore`]
//! interface will panic while converting types.
use std::sync::Arc;

use anyhow::Result;
use serde_json::Value as Json;
use uuid::Uuid;

use kubegate_context::Context;

pub mod delete;
pub mod persist;
pub mod query;

#[cfg(any(test, feature = "test-fixture"))]
mod fixture;
#[cfg(any(test, feature = "test-fixture"))]
pub use self::fixture::StoreFixture;


use self::delete::DeleteOp;
use self::delete::DeleteOps;
use self::delete::DeleteResponses;
use self::persist::PersistOp;
use self::persist::PersistOps;
use self::persist::PersistResponses;
use self::query::QueryOp;
use self::query::QueryOps;
use self::query::QueryResponses;

/// Query, persist and manipulate grant records with a database.
#[derive(Clone)]
pub struct GrantStore {
    /// Runtime configured implementation of the persistent store.
    inner: Arc<dyn GrantStoreBackend>,
}

impl GrantStore {
    /// Delete individual records from the persistent store.
    pub async fn delete<O>(&self, context: &Context, op: O) -> Result<O::Response>
    where
        O: DeleteOp,
    {
        let op: DeleteOps = op.into();
        let response = self.inner.delete(context, op).await;
        response.map(O::Response::from)
    }

    /// Query records from the persistent store.
    pub async fn query<O>(&self, context: &Context, op: O) -> Result<O::Response>
    where
        O: QueryOp,
    {
        let op: QueryOps = op.into();
        let response = self.inner.query(context, op).await;
        response.map(O::Response::from)
    }

    /// Persist records into the persistent store.
    pub async fn persist<O>(&self, context: &Context, op: O) -> Result<O::Response>
    where
        O: PersistOp,
    {
        let op: PersistOps = op.into();
        let response = self.inner.persist(context, op).await;
        response.map(O::Response::from)
    }
}

impl<T> From<T> for GrantStore
where
    T: GrantStoreBackend + 'static,
{
    fn from(value: T) -> Self {
        GrantStore {
            inner: Arc::new(value),
        }
    }
}

#[cfg(any(test, feature = "test-fixture"))]
impl GrantStore {
    /// Initialise a new store backend fixture for unit tests.
    pub fn fixture() -> Self {
        let inner = StoreFixture::default();
        Self::from(inner)
    }
}

/// Operations implemented by persistent grant stores supported by KubeGate.
#[async_trait::async_trait]
pub trait GrantStoreBackend: Send + Sync {
    /// Delete individual records from the persistent store.
    async fn delete(&self, context: &Context, op: DeleteOps) -> Result<DeleteResponses>;

    /// Query records from the persistent store.
    async fn query(&self, context: &Context, op: QueryOps) -> Result<QueryResponses>;

    /// Persist records into the persistent store.
    async fn persist(&self, context: &Context, op: PersistOps) -> Result<PersistResponses>;
}

/// Initialisation logic for the persistent store and the client to access it.
#[async_trait::async_trait]
pub trait GrantStoreFactory: Send + Sync {
    /// Validate the user provided configuration for the backend.
    fn conf_check(&self, context: &Context, conf: &Json) -> Result<()>;

    /// Register backend specific metrics.
    fn register_metrics(&self, registry: &prometheus::Registry) -> Result<()>;

    /// Instantiate a [`GrantStore`] object to access persistent state.
    async fn store<'a>(&self, args: GrantStoreFactoryArgs<'a>) -> Result<GrantStore>;

    /// Synchronise (initialise or migrate) the persistent store to handle [`GrantStore`] operations.
    async fn sync<'a>(&self, args: GrantStoreFactorySyncArgs<'a>) -> Result<()>;
}

/// Arguments passed to the [`GrantStoreFactory`] client initialisation method.
pub struct GrantStoreFactoryArgs<'a> {
    /// The configuration block for the backend to initialise.
    pub conf: &'a Json,

    /// Container for operation scoped values.
    pub context: &'a Context,
}

/// Arguments passed to the [`GrantStoreFactory`] client synchronisation method.
pub struct GrantStoreFactorySyncArgs<'a> {
    /// The configuration block for the backend to synchronise.
    pub conf: &'a Json,

    /// Container for operation scoped values.
    pub context: &'a Context,
}

/// No grant record with the given id exists in the store.
#[derive(Debug, thiserror::Error)]
#[error("no grant record with id '{id}' exists in the store")]
pub struct GrantNotFound {
    /// Identifier of the missing record.
    pub id: Uuid,
}

impl GrantNotFound {
    /// No grant record with the given id exists in the store.
    pub fn new(id: Uuid) -> Self {
        Self { id }
    }
}
