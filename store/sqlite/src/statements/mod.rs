//! SQL statements to implement the [`GrantStoreBackend`] with SQLite.
use anyhow::Result;
use tokio_rusqlite::Connection;

use kubegate_context::Context;
use kubegate_store::delete::DeleteOps;
use kubegate_store::delete::DeleteResponses;
use kubegate_store::persist::PersistOps;
use kubegate_store::persist::PersistResponses;
use kubegate_store::query::QueryOps;
use kubegate_store::query::QueryResponses;
use kubegate_store::GrantStoreBackend;

mod grant;
mod group_binding;

/// Implementation of the [`GrantStoreBackend`] interface using SQLite.
pub struct SQLiteStore {
    /// Connection to the SQLite DB persisting data.
    connection: Connection,
}

impl SQLiteStore {
    /// Initialise a new SQLite backed [`GrantStoreBackend`].
    pub fn new(connection: Connection) -> Self {
        SQLiteStore { connection }
    }
}

#[async_trait::async_trait]
impl GrantStoreBackend for SQLiteStore {
    async fn delete(&self, context: &Context, op: DeleteOps) -> Result<DeleteResponses> {
        match op {
            DeleteOps::Grants(ids) => self::grant::delete(context, &self.connection, ids)
                .await
                .map(|_| DeleteResponses::Success),
        }
    }

    async fn query(&self, context: &Context, op: QueryOps) -> Result<QueryResponses> {
        match op {
            QueryOps::Grants(search) => {
                let grants = self::grant::search(context, &self.connection, search).await?;
                Ok(QueryResponses::Grants(grants))
            }
            QueryOps::GroupRoles(groups) => {
                let roles = self::group_binding::roles(context, &self.connection, groups).await?;
                Ok(QueryResponses::Roles(roles))
            }
        }
    }

    async fn persist(&self, context: &Context, op: PersistOps) -> Result<PersistResponses> {
        match op {
            PersistOps::Grant(create) => self::grant::create(context, &self.connection, create)
                .await
                .map(|_| PersistResponses::Success),
            PersistOps::GrantNamespaces(update) => {
                let grant =
                    self::grant::update_namespaces(context, &self.connection, update).await?;
                Ok(PersistResponses::Grant(grant))
            }
            PersistOps::GroupBinding(binding) => {
                self::group_binding::persist(context, &self.connection, binding)
                    .await
                    .map(|_| PersistResponses::Success)
            }
        }
    }
}

/// Restore typed errors smuggled through the SQLite client boundary.
pub(crate) fn unpack_error(error: tokio_rusqlite::Error) -> anyhow::Error {
    match error {
        tokio_rusqlite::Error::Other(inner) => {
            let inner = match inner.downcast::<kubegate_store::GrantNotFound>() {
                Ok(not_found) => return anyhow::Error::new(*not_found),
                Err(inner) => inner,
            };
            let inner = match inner.downcast::<kubegate_models::MalformedGrant>() {
                Ok(malformed) => return anyhow::Error::new(*malformed),
                Err(inner) => inner,
            };
            anyhow::anyhow!(inner.to_string())
        }
        error => anyhow::Error::new(error),
    }
}
