//! Initialise the SQLite grant store.
use anyhow::Context as AnyContext;
use anyhow::Result;
use serde_json::Value as Json;
use tokio_rusqlite::Connection;

use kubegate_context::Context;
use kubegate_store::GrantStore;
use kubegate_store::GrantStoreFactory;
use kubegate_store::GrantStoreFactoryArgs;
use kubegate_store::GrantStoreFactorySyncArgs;

use crate::Conf;
use crate::ConfError;

/// Special path requesting the use of an in-memory store.
pub const MEMORY_PATH: &str = ":memory:";

/// Name of the table to store refinery migration metadata into.
pub const REFINERY_SCHEMA_TABLE_NAME: &str = "refinery_schema_history__grants";

/// Initialise the SQLite grant store.
pub struct SQLiteFactory;

#[async_trait::async_trait]
impl GrantStoreFactory for SQLiteFactory {
    fn conf_check(&self, _: &Context, conf: &Json) -> Result<()> {
        serde_json::from_value::<Conf>(conf.clone()).context(ConfError)?;
        Ok(())
    }

    fn register_metrics(&self, registry: &prometheus::Registry) -> Result<()> {
        crate::telemetry::register_metrics(registry)
    }

    async fn store<'a>(&self, args: GrantStoreFactoryArgs<'a>) -> Result<GrantStore> {
        let conf: Conf = serde_json::from_value(args.conf.clone()).context(ConfError)?;
        let client = create_client(args.context, &conf.path).await?;
        let store = crate::statements::SQLiteStore::new(client);
        Ok(GrantStore::from(store))
    }

    async fn sync<'a>(&self, args: GrantStoreFactorySyncArgs<'a>) -> Result<()> {
        // Create the SQLite client.
        let conf: Conf = serde_json::from_value(args.conf.clone()).context(ConfError)?;
        let client = create_client(args.context, &conf.path).await?;

        // Run migrations to ensure the DB is ready for use.
        client
            .call(|connection| {
                crate::schema::migrations::runner()
                    .set_migration_table_name(REFINERY_SCHEMA_TABLE_NAME)
                    .run(connection)
                    .map_err(|error| {
                        let error = Box::new(error);
                        tokio_rusqlite::Error::Other(error)
                    })
            })
            .await?;
        Ok(())
    }
}

/// Create a SQLite DB [`Connection`] to the grant store.
///
/// The special [`MEMORY_PATH`] constant can be specified to create an in-memory store.
///
/// NOTE:
///   The use of an in-memory store is only intended for tests and experimentation
///   as all data will be lost as soon as the process terminates.
pub(crate) async fn create_client(context: &Context, path: &str) -> Result<Connection> {
    // Open or create the SQLite DB.
    let connection = if path == MEMORY_PATH {
        slog::warn!(
            context.logger,
            "Using in-memory store means data will be lost once the process terminates"
        );
        Connection::open_in_memory().await
    } else {
        Connection::open(path).await
    };
    let connection = connection?;
    Ok(connection)
}
