//! Grant store operations on grant records.
use anyhow::Result;
use rusqlite::OptionalExtension;
use tokio_rusqlite::Connection;

use kubegate_context::Context;
use kubegate_models::GrantRecord;
use kubegate_models::MalformedGrant;
use kubegate_store::delete::DeleteGrants;
use kubegate_store::persist::CreateGrant;
use kubegate_store::persist::UpdateGrantNamespaces;
use kubegate_store::query::SearchGrants;
use kubegate_store::GrantNotFound;

const SEARCH_SQL: &str = r#"
SELECT id, record
FROM grants_record
"#;

const SEARCH_ORDER_SQL: &str = "\nORDER BY subject DESC, subject_name ASC, id ASC;";

const CREATE_CHECK_SQL: &str = r#"
SELECT id
FROM grants_record
WHERE cluster = ?1 AND role = ?2 AND subject = ?3 AND subject_name = ?4
LIMIT 1;
"#;

const CREATE_SQL: &str = r#"
INSERT INTO grants_record (id, cluster, role, subject, subject_name, record)
VALUES (?1, ?2, ?3, ?4, ?5, ?6);
"#;

const LOOKUP_SQL: &str = r#"
SELECT record
FROM grants_record
WHERE id = ?1;
"#;

const UPDATE_RECORD_SQL: &str = r#"
UPDATE grants_record
SET record = ?2
WHERE id = ?1;
"#;

/// Search grant records matching every filter that is set.
///
/// Records that fail to decode are skipped and logged so one bad row cannot
/// fail a whole resolution.
pub async fn search(
    context: &Context,
    connection: &Connection,
    search: SearchGrants,
) -> Result<Vec<GrantRecord>> {
    // An empty subject name list can match nothing.
    if let Some(names) = &search.subject_names {
        if names.is_empty() {
            return Ok(Vec::new());
        }
    }

    let (err_count, _timer) = crate::telemetry::observe_op("grant.search");
    let logger = context.logger.clone();
    let result = connection
        .call(move |connection| {
            let mut sql = String::from(SEARCH_SQL);
            let mut clauses: Vec<String> = Vec::new();
            let mut params: Vec<String> = Vec::new();
            if let Some(cluster) = &search.cluster {
                params.push(cluster.clone());
                clauses.push(format!("cluster = ?{}", params.len()));
            }
            if let Some(role) = search.role {
                params.push(role.to_string());
                clauses.push(format!("role = ?{}", params.len()));
            }
            if let Some(subject) = search.subject {
                params.push(subject.to_string());
                clauses.push(format!("subject = ?{}", params.len()));
            }
            if let Some(names) = &search.subject_names {
                let mut placeholders: Vec<String> = Vec::new();
                for name in names {
                    params.push(name.clone());
                    placeholders.push(format!("?{}", params.len()));
                }
                clauses.push(format!("subject_name IN ({})", placeholders.join(", ")));
            }
            if !clauses.is_empty() {
                sql.push_str("WHERE ");
                sql.push_str(&clauses.join(" AND "));
            }
            sql.push_str(SEARCH_ORDER_SQL);

            let mut statement = connection.prepare(&sql)?;
            let mut rows = statement.query(rusqlite::params_from_iter(params.iter()))?;
            let mut grants = Vec::new();
            while let Some(row) = rows.next()? {
                let id: String = row.get("id")?;
                let record: String = row.get("record")?;
                match serde_json::from_str::<GrantRecord>(&record) {
                    Ok(grant) => grants.push(grant),
                    Err(error) => {
                        let error = MalformedGrant {
                            id,
                            reason: error.to_string(),
                        };
                        slog::warn!(logger, "Skipping malformed grant record"; "error" => %error);
                    }
                }
            }
            Ok(grants)
        })
        .await;
    if result.is_err() {
        err_count.inc();
    }
    result.map_err(crate::statements::unpack_error)
}

/// Persist a new grant record, skipping records already granted.
pub async fn create(_: &Context, connection: &Connection, create: CreateGrant) -> Result<()> {
    let grant = create.0;
    let record = serde_json::to_string(&grant)?;
    let (err_count, _timer) = crate::telemetry::observe_op("grant.create");
    let result = connection
        .call(move |connection| {
            let tx = connection.transaction()?;
            let existing: Option<String> = tx
                .query_row(
                    CREATE_CHECK_SQL,
                    rusqlite::params![
                        grant.cluster,
                        grant.role.as_str(),
                        grant.subject.as_str(),
                        grant.subject_name,
                    ],
                    |row| row.get(0),
                )
                .optional()?;
            if existing.is_none() {
                tx.execute(
                    CREATE_SQL,
                    rusqlite::params![
                        grant.id.to_string(),
                        grant.cluster,
                        grant.role.as_str(),
                        grant.subject.as_str(),
                        grant.subject_name,
                        record,
                    ],
                )?;
            }
            tx.commit()?;
            Ok(())
        })
        .await;
    if result.is_err() {
        err_count.inc();
    }
    result.map_err(crate::statements::unpack_error)
}

/// Replace the namespace scope of exactly one grant record.
pub async fn update_namespaces(
    _: &Context,
    connection: &Connection,
    update: UpdateGrantNamespaces,
) -> Result<GrantRecord> {
    let (err_count, _timer) = crate::telemetry::observe_op("grant.update-namespaces");
    let result = connection
        .call(move |connection| {
            let tx = connection.transaction()?;
            let id = update.id.to_string();
            let record: Option<String> = tx
                .query_row(LOOKUP_SQL, rusqlite::params![id], |row| row.get(0))
                .optional()?;
            let record = match record {
                None => {
                    let error = GrantNotFound::new(update.id);
                    return Err(tokio_rusqlite::Error::Other(Box::new(error)));
                }
                Some(record) => record,
            };
            let mut grant: GrantRecord = serde_json::from_str(&record).map_err(|error| {
                let error = MalformedGrant {
                    id: id.clone(),
                    reason: error.to_string(),
                };
                tokio_rusqlite::Error::Other(Box::new(error))
            })?;
            grant.namespaces = update.namespaces;
            let encoded = serde_json::to_string(&grant)
                .map_err(|error| tokio_rusqlite::Error::Other(Box::new(error)))?;
            tx.execute(UPDATE_RECORD_SQL, rusqlite::params![id, encoded])?;
            tx.commit()?;
            Ok(grant)
        })
        .await;
    if result.is_err() {
        err_count.inc();
    }
    result.map_err(crate::statements::unpack_error)
}

/// Delete grant records by id, ignoring missing records.
pub async fn delete(_: &Context, connection: &Connection, ids: DeleteGrants) -> Result<()> {
    if ids.0.is_empty() {
        return Ok(());
    }
    let (err_count, _timer) = crate::telemetry::observe_op("grant.delete");
    let result = connection
        .call(move |connection| {
            let params: Vec<String> = ids.0.iter().map(|id| id.to_string()).collect();
            let placeholders: Vec<String> = (1..=params.len()).map(|n| format!("?{}", n)).collect();
            let sql = format!(
                "DELETE FROM grants_record WHERE id IN ({});",
                placeholders.join(", "),
            );
            connection.execute(&sql, rusqlite::params_from_iter(params.iter()))?;
            Ok(())
        })
        .await;
    if result.is_err() {
        err_count.inc();
    }
    result.map_err(crate::statements::unpack_error)
}
