//! Inefficient in-memory implementation of [`GrantStore`](super::GrantStore) for unit tests.
use std::collections::BTreeSet;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;

use anyhow::Result;
use uuid::Uuid;

use kubegate_context::Context;
use kubegate_models::GrantRecord;
use kubegate_models::GroupBinding;
use kubegate_models::Role;

use super::DeleteOps;
use super::DeleteResponses;
use super::GrantNotFound;
use super::GrantStoreBackend;
use super::PersistOps;
use super::PersistResponses;
use super::QueryOps;
use super::QueryResponses;

/// In-memory implementation of a mock [`GrantStore`](super::GrantStore) for unit tests.
#[derive(Clone)]
pub struct StoreFixture {
    /// Shared in-memory state to mock the DB with.
    inner: Arc<Mutex<StoreFixtureState>>,
}

impl StoreFixture {
    /// Lock and access the shared inner store.
    fn access(&self) -> MutexGuard<StoreFixtureState> {
        self.inner
            .lock()
            .expect("StoreFixture::inner state lock poisoned")
    }
}

impl Default for StoreFixture {
    fn default() -> Self {
        let inner = StoreFixtureState::default();
        let inner = Mutex::new(inner);
        let inner = Arc::new(inner);
        StoreFixture { inner }
    }
}

#[async_trait::async_trait]
impl GrantStoreBackend for StoreFixture {
    async fn delete(&self, _: &Context, op: DeleteOps) -> Result<DeleteResponses> {
        let mut store = self.access();
        match op {
            DeleteOps::Grants(ids) => {
                for id in ids.0 {
                    store.grants.remove(&id);
                }
            }
        };
        Ok(DeleteResponses::Success)
    }

    async fn query(&self, _: &Context, op: QueryOps) -> Result<QueryResponses> {
        let store = self.access();
        match op {
            QueryOps::Grants(search) => {
                let mut grants: Vec<GrantRecord> = store
                    .grants
                    .values()
                    .filter(|grant| search.matches(grant))
                    .cloned()
                    .collect();
                grants.sort_by(crate::query::listing_order);
                Ok(QueryResponses::Grants(grants))
            }
            QueryOps::GroupRoles(groups) => {
                let roles: BTreeSet<Role> = store
                    .bindings
                    .iter()
                    .filter(|binding| groups.0.contains(&binding.group))
                    .map(|binding| binding.role)
                    .collect();
                Ok(QueryResponses::Roles(roles))
            }
        }
    }

    async fn persist(&self, _: &Context, op: PersistOps) -> Result<PersistResponses> {
        let mut store = self.access();
        match op {
            PersistOps::Grant(create) => {
                let grant = create.0;
                let duplicate = store
                    .grants
                    .values()
                    .any(|existing| existing.dedup_key() == grant.dedup_key());
                if !duplicate {
                    store.grants.insert(grant.id, grant);
                }
                Ok(PersistResponses::Success)
            }
            PersistOps::GrantNamespaces(update) => {
                let grant = store
                    .grants
                    .get_mut(&update.id)
                    .ok_or_else(|| GrantNotFound::new(update.id))?;
                grant.namespaces = update.namespaces;
                Ok(PersistResponses::Grant(grant.clone()))
            }
            PersistOps::GroupBinding(binding) => {
                let duplicate = store
                    .bindings
                    .iter()
                    .any(|existing| existing.group == binding.group && existing.role == binding.role);
                if !duplicate {
                    store.bindings.push(binding);
                }
                Ok(PersistResponses::Success)
            }
        }
    }
}

/// Container for the shared state.
#[derive(Default)]
struct StoreFixtureState {
    bindings: Vec<GroupBinding>,
    grants: HashMap<Uuid, GrantRecord>,
}
