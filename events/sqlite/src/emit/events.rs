//! Emit events to the SQLite store.
use anyhow::Result;
use time::format_description::well_known::Rfc3339;
use tokio_rusqlite::Connection;

use kubegate_context::Context;
use kubegate_events::emit::EventsBackend;
use kubegate_events::Event;

use crate::Conf;

const EMIT_AUDIT_SQL: &str = r#"
INSERT INTO events_audit (event, time)
VALUES (?1, ?2);
"#;

const EMIT_CHANGE_SQL: &str = r#"
INSERT INTO events_change (event, time)
VALUES (?1, ?2);
"#;

/// SQLite backed events implementation.
pub struct SQLiteEvents {
    connection: Connection,
}

impl SQLiteEvents {
    /// Initialise the SQLite events backend.
    pub async fn new(context: &Context, conf: &Conf) -> Result<Self> {
        let connection = crate::client::create(context, &conf.path).await?;
        Ok(SQLiteEvents { connection })
    }

    async fn emit(&self, op: &str, sql: &'static str, event: Event) -> Result<()> {
        // Serialise the event.
        let serialised = serde_json::to_string(&event)?;
        let time = event.time.format(&Rfc3339)?;

        // Insert it into the DB.
        let (err_count, _timer) = crate::telemetry::observe_op(op);
        let result = self
            .connection
            .call(move |connection| {
                connection.execute(sql, rusqlite::params![serialised, time])?;
                Ok(())
            })
            .await;
        if result.is_err() {
            err_count.inc();
        }
        result.map_err(anyhow::Error::new)
    }
}

#[async_trait::async_trait]
impl EventsBackend for SQLiteEvents {
    async fn audit(&self, _: &Context, event: Event) -> Result<()> {
        self.emit("emit.audit", EMIT_AUDIT_SQL, event).await
    }

    async fn change(&self, _: &Context, event: Event) -> Result<()> {
        self.emit("emit.change", EMIT_CHANGE_SQL, event).await
    }
}

#[cfg(test)]
mod tests {
    use kubegate_events::emit::Events;
    use kubegate_events::Event;

    use super::SQLiteEvents;

    async fn events() -> Events {
        let context = kubegate_context::Context::fixture();
        let connection = crate::client::create(&context, crate::client::MEMORY_PATH)
            .await
            .unwrap();
        connection
            .call(move |connection| {
                crate::schema::migrations::runner()
                    .set_migration_table_name(crate::client::REFINERY_SCHEMA_TABLE_NAME)
                    .run(connection)
                    .unwrap();
                Ok(())
            })
            .await
            .unwrap();
        Events::from(SQLiteEvents { connection })
    }

    #[tokio::test]
    async fn emit_events() {
        let context = kubegate_context::Context::fixture();
        let events = events().await;
        let event = Event::new_with_payload("TEST_AUDIT", serde_json::json!({"k": "v"})).unwrap();
        events
            .audit(&context, event)
            .await
            .expect("audit event to be emitted");
        let event = Event::new_with_payload("TEST_CHANGE", serde_json::json!(42)).unwrap();
        events
            .change(&context, event)
            .await
            .expect("change event to be emitted");
    }
}
