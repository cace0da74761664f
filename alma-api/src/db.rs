//! Database Connection Pool Module
//!
//! PostgreSQL connection pooling using deadpool-postgres, and the
//! `CalendarStore` / `VolunteerDirectory` implementation on top of it.
//!
//! Multi-statement writes run in one transaction. Writes that touch an
//! instance's children lock the instance row first (`SELECT ... FOR UPDATE`),
//! and the `UNIQUE (instance_id, role)` constraint backs the role-slot rule.

use crate::error::{ApiError, ApiResult};
use alma_core::{
    AlmaError, AlmaResult, AssignmentId, AssignmentRole, AssignmentUpdate, AttendanceStatus,
    BulkScope, CalendarAssignment, CalendarEventParticipant, CalendarInstance, CalendarSource,
    EntityType, EnumParseError, InstanceFilter, InstanceId, InstanceKind, InstanceStatus,
    InstanceUpdate, NewAssignment, NewInstance, NewParticipant, Page, ParticipantUpdate,
    RosterEntryId, StorageError, VolunteerId, VolunteerRef,
};
use alma_storage::{CalendarStore, VolunteerDirectory};
use async_trait::async_trait;
use chrono::NaiveDate;
use deadpool_postgres::{Config, ManagerConfig, Pool, PoolError, RecyclingMethod, Runtime};
use std::collections::HashMap;
use std::time::Duration;
use tokio_postgres::error::SqlState;
use tokio_postgres::{GenericClient, NoTls, Row};

/// Bundled DDL for the calendar tables.
pub const SCHEMA_SQL: &str = include_str!("schema.sql");

const INSTANCE_COLUMNS: &str =
    "id, type, source_id, date, start_time, end_time, notes, status, created_at, updated_at";
const ASSIGNMENT_COLUMNS: &str = "id, instance_id, volunteer_id, role, created_at, updated_at";
const ROSTER_COLUMNS: &str = "id, event_id, participant_id, status, created_at, updated_at";

// ============================================================================
// CONNECTION POOL CONFIGURATION
// ============================================================================

/// Database connection pool configuration.
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// PostgreSQL host
    pub host: String,
    /// PostgreSQL port
    pub port: u16,
    /// Database name
    pub dbname: String,
    /// Database user
    pub user: String,
    /// Database password
    pub password: String,
    /// Maximum pool size
    pub max_size: usize,
    /// Wait timeout when acquiring a connection
    pub timeout: Duration,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 5432,
            dbname: "alma_platform".to_string(),
            user: "alma_app".to_string(),
            password: "".to_string(),
            max_size: 16,
            timeout: Duration::from_secs(30),
        }
    }
}

impl DbConfig {
    /// Create a new database configuration from environment variables.
    pub fn from_env() -> Self {
        Self {
            host: std::env::var("ALMA_DB_HOST").unwrap_or_else(|_| "localhost".to_string()),
            port: std::env::var("ALMA_DB_PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(5432),
            dbname: std::env::var("ALMA_DB_NAME").unwrap_or_else(|_| "alma_platform".to_string()),
            user: std::env::var("ALMA_DB_USER").unwrap_or_else(|_| "alma_app".to_string()),
            password: std::env::var("ALMA_DB_PASSWORD").unwrap_or_default(),
            max_size: std::env::var("ALMA_DB_POOL_SIZE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(16),
            timeout: Duration::from_secs(
                std::env::var("ALMA_DB_TIMEOUT")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(30),
            ),
        }
    }

    /// Create a connection pool from this configuration.
    pub fn create_pool(&self) -> ApiResult<Pool> {
        let mut cfg = Config::new();
        cfg.host = Some(self.host.clone());
        cfg.port = Some(self.port);
        cfg.dbname = Some(self.dbname.clone());
        cfg.user = Some(self.user.clone());
        cfg.password = Some(self.password.clone());

        cfg.manager = Some(ManagerConfig {
            recycling_method: RecyclingMethod::Fast,
        });

        let mut pool_cfg = deadpool_postgres::PoolConfig::new(self.max_size);
        pool_cfg.timeouts.wait = Some(self.timeout);
        cfg.pool = Some(pool_cfg);

        let pool = cfg
            .create_pool(Some(Runtime::Tokio1), NoTls)
            .map_err(|e| ApiError::database_error(format!("Failed to create pool: {}", e)))?;

        Ok(pool)
    }
}

// ============================================================================
// ERROR TRANSLATION
// ============================================================================

/// Map a constraint failure onto the storage taxonomy.
///
/// PostgreSQL raises `FOREIGN_KEY_VIOLATION` both for a write naming a missing
/// row and for a delete blocked by `ON DELETE RESTRICT`. The detail text tells
/// them apart: only the blocked delete says the key "is still referenced".
fn constraint_error(code: &SqlState, constraint: &str, detail: &str) -> Option<StorageError> {
    if code == &SqlState::UNIQUE_VIOLATION {
        let (entity_type, reason) = if constraint.starts_with("calendar_event_participants") {
            (EntityType::RosterEntry, "participant is already on this instance")
        } else {
            (EntityType::Assignment, "role slot is already filled for this instance")
        };
        return Some(StorageError::conflict(entity_type, reason));
    }
    if code == &SqlState::FOREIGN_KEY_VIOLATION {
        let entity_type = if constraint.contains("volunteer") {
            EntityType::Volunteer
        } else if constraint.contains("participant_fkey") {
            EntityType::Participant
        } else {
            EntityType::Instance
        };
        if detail.contains("is still referenced") {
            return Some(StorageError::conflict(entity_type, detail));
        }
        return Some(StorageError::missing_reference(entity_type, detail));
    }
    None
}

/// Translate a driver error into the storage taxonomy using its SQLSTATE.
fn pg_error(err: tokio_postgres::Error) -> AlmaError {
    if let Some(db_error) = err.as_db_error() {
        let constraint = db_error.constraint().unwrap_or_default();
        let detail = db_error.detail().unwrap_or(db_error.message());
        if let Some(mapped) = constraint_error(db_error.code(), constraint, detail) {
            return mapped.into();
        }
    }
    tracing::error!("Database error: {:?}", err);
    StorageError::Backend {
        reason: err.to_string(),
    }
    .into()
}

fn pool_error(err: PoolError) -> AlmaError {
    tracing::error!("Connection pool error: {:?}", err);
    match err {
        PoolError::Timeout(_) => StorageError::Unavailable {
            reason: "connection pool exhausted".to_string(),
        },
        PoolError::Closed => StorageError::Unavailable {
            reason: "connection pool is closed".to_string(),
        },
        other => StorageError::Backend {
            reason: other.to_string(),
        },
    }
    .into()
}

fn decode<T>(parsed: Result<T, EnumParseError>) -> AlmaResult<T> {
    parsed.map_err(|e| {
        StorageError::Backend {
            reason: format!("unreadable column value: {e}"),
        }
        .into()
    })
}

// ============================================================================
// ROW MAPPING
// ============================================================================

fn instance_from_row(row: &Row) -> AlmaResult<CalendarInstance> {
    let kind: String = row.try_get("type").map_err(pg_error)?;
    let status: String = row.try_get("status").map_err(pg_error)?;
    Ok(CalendarInstance {
        id: row.try_get("id").map_err(pg_error)?,
        source: CalendarSource::from_parts(
            decode(InstanceKind::from_db_str(&kind))?,
            row.try_get("source_id").map_err(pg_error)?,
        ),
        date: row.try_get("date").map_err(pg_error)?,
        start_time: row.try_get("start_time").map_err(pg_error)?,
        end_time: row.try_get("end_time").map_err(pg_error)?,
        notes: row.try_get("notes").map_err(pg_error)?,
        status: decode(InstanceStatus::from_db_str(&status))?,
        created_at: row.try_get("created_at").map_err(pg_error)?,
        updated_at: row.try_get("updated_at").map_err(pg_error)?,
    })
}

fn assignment_from_row(row: &Row) -> AlmaResult<CalendarAssignment> {
    let role: String = row.try_get("role").map_err(pg_error)?;
    Ok(CalendarAssignment {
        id: row.try_get("id").map_err(pg_error)?,
        instance_id: row.try_get("instance_id").map_err(pg_error)?,
        volunteer_id: row.try_get("volunteer_id").map_err(pg_error)?,
        role: decode(AssignmentRole::from_db_str(&role))?,
        created_at: row.try_get("created_at").map_err(pg_error)?,
        updated_at: row.try_get("updated_at").map_err(pg_error)?,
    })
}

fn roster_from_row(row: &Row) -> AlmaResult<CalendarEventParticipant> {
    let status: String = row.try_get("status").map_err(pg_error)?;
    Ok(CalendarEventParticipant {
        id: row.try_get("id").map_err(pg_error)?,
        event_id: row.try_get("event_id").map_err(pg_error)?,
        participant_id: row.try_get("participant_id").map_err(pg_error)?,
        status: decode(AttendanceStatus::from_db_str(&status))?,
        created_at: row.try_get("created_at").map_err(pg_error)?,
        updated_at: row.try_get("updated_at").map_err(pg_error)?,
    })
}

// ============================================================================
// DYNAMIC PREDICATES
// ============================================================================

/// Typed parameter for dynamically built statements.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlParam {
    Long(i64),
    Text(&'static str),
    Date(NaiveDate),
}

impl SqlParam {
    pub fn as_to_sql(&self) -> &(dyn tokio_postgres::types::ToSql + Sync) {
        match self {
            SqlParam::Long(v) => v,
            SqlParam::Text(v) => v,
            SqlParam::Date(v) => v,
        }
    }
}

/// `WHERE` clause under construction with its numbered parameters.
#[derive(Debug, Default)]
pub struct SqlFilter {
    clauses: Vec<String>,
    params: Vec<SqlParam>,
}

impl SqlFilter {
    /// Add `column op $n` bound to `param`.
    fn bind(&mut self, column: &str, op: &str, param: SqlParam) {
        self.params.push(param);
        self.clauses
            .push(format!("{} {} ${}", column, op, self.params.len()));
    }

    fn raw(&mut self, clause: &str) {
        self.clauses.push(clause.to_string());
    }

    /// Translate a listing filter.
    pub fn for_instances(filter: &InstanceFilter) -> Self {
        let mut f = Self::default();
        if let Some(kind) = filter.kind {
            f.bind("type", "=", SqlParam::Text(kind.as_db_str()));
        }
        if let Some(status) = filter.status {
            f.bind("status", "=", SqlParam::Text(status.as_db_str()));
        }
        if let Some(from) = filter.date_from {
            f.bind("date", ">=", SqlParam::Date(from));
        }
        if let Some(to) = filter.date_to {
            f.bind("date", "<=", SqlParam::Date(to));
        }
        if let Some(source_id) = filter.source_id {
            f.bind("source_id", "=", SqlParam::Long(source_id));
        }
        f
    }

    /// Translate a bulk scope. Used by both bulk count and bulk delete.
    pub fn for_bulk(scope: &BulkScope) -> AlmaResult<Self> {
        let mut f = Self::default();
        match *scope {
            BulkScope::Month { .. } => {
                if let Some((first, next)) = scope.month_bounds()? {
                    f.bind("date", ">=", SqlParam::Date(first));
                    f.bind("date", "<", SqlParam::Date(next));
                }
            }
            BulkScope::Kind { kind } => f.bind("type", "=", SqlParam::Text(kind.as_db_str())),
            BulkScope::Series { kind, source_id } => {
                f.bind("type", "=", SqlParam::Text(kind.as_db_str()));
                match source_id {
                    Some(id) => f.bind("source_id", "=", SqlParam::Long(id)),
                    None => f.raw("source_id IS NULL"),
                }
            }
            BulkScope::All => {}
        }
        Ok(f)
    }

    /// ` WHERE a AND b`, or empty when unconstrained.
    pub fn where_clause(&self) -> String {
        if self.clauses.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", self.clauses.join(" AND "))
        }
    }

    pub fn next_placeholder(&self) -> usize {
        self.params.len() + 1
    }

    pub fn params(&self) -> &[SqlParam] {
        &self.params
    }

    fn sql_params(&self) -> Vec<&(dyn tokio_postgres::types::ToSql + Sync)> {
        self.params.iter().map(SqlParam::as_to_sql).collect()
    }
}

// ============================================================================
// DATABASE CLIENT WRAPPER
// ============================================================================

/// Calendar storage backed by a PostgreSQL connection pool.
#[derive(Clone)]
pub struct DbClient {
    pool: Pool,
}

impl DbClient {
    /// Create a new database client with the given pool.
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }

    /// Create a new database client from configuration.
    pub fn from_config(config: &DbConfig) -> ApiResult<Self> {
        let pool = config.create_pool()?;
        Ok(Self::new(pool))
    }

    /// Get the current pool size for observability.
    pub fn pool_size(&self) -> usize {
        self.pool.status().size
    }

    /// Get a connection from the pool.
    async fn get_conn(&self) -> AlmaResult<deadpool_postgres::Object> {
        self.pool.get().await.map_err(pool_error)
    }

    /// Create the calendar tables if they do not exist.
    pub async fn apply_schema(&self) -> AlmaResult<()> {
        let conn = self.get_conn().await?;
        conn.batch_execute(SCHEMA_SQL).await.map_err(pg_error)?;
        tracing::info!("Calendar schema applied");
        Ok(())
    }

    /// Lock an instance row for the rest of the transaction.
    async fn lock_instance<C: GenericClient + Sync>(client: &C, id: InstanceId) -> AlmaResult<()> {
        client
            .query_opt(
                "SELECT id FROM calendar_instances WHERE id = $1 FOR UPDATE",
                &[&id],
            )
            .await
            .map_err(pg_error)?
            .map(|_| ())
            .ok_or_else(|| StorageError::not_found(EntityType::Instance, id).into())
    }

    async fn insert_instance<C: GenericClient + Sync>(
        client: &C,
        new: &NewInstance,
    ) -> AlmaResult<CalendarInstance> {
        let sql = format!(
            "INSERT INTO calendar_instances (type, source_id, date, start_time, end_time, notes, status) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING {INSTANCE_COLUMNS}"
        );
        let row = client
            .query_one(
                &sql,
                &[
                    &new.source.kind().as_db_str(),
                    &new.source.source_id(),
                    &new.date,
                    &new.start_time,
                    &new.end_time,
                    &new.notes,
                    &new.status.as_db_str(),
                ],
            )
            .await
            .map_err(pg_error)?;
        instance_from_row(&row)
    }
}

#[async_trait]
impl CalendarStore for DbClient {
    // ========================================================================
    // INSTANCE OPERATIONS
    // ========================================================================

    async fn instance_list(
        &self,
        filter: &InstanceFilter,
        page: Option<Page>,
    ) -> AlmaResult<Vec<CalendarInstance>> {
        let conn = self.get_conn().await?;
        let f = SqlFilter::for_instances(filter);
        let mut sql = format!(
            "SELECT {INSTANCE_COLUMNS} FROM calendar_instances{} ORDER BY date, start_time, id",
            f.where_clause()
        );
        let bounds = page.map(|p| (i64::from(p.skip), i64::from(p.limit)));
        let mut params = f.sql_params();
        if let Some((offset, limit)) = &bounds {
            let n = f.next_placeholder();
            sql.push_str(&format!(" OFFSET ${} LIMIT ${}", n, n + 1));
            params.push(offset);
            params.push(limit);
        }
        let rows = conn.query(&sql, &params[..]).await.map_err(pg_error)?;
        rows.iter().map(instance_from_row).collect()
    }

    async fn instance_get(&self, id: InstanceId) -> AlmaResult<CalendarInstance> {
        let conn = self.get_conn().await?;
        let sql = format!("SELECT {INSTANCE_COLUMNS} FROM calendar_instances WHERE id = $1");
        let row = conn
            .query_opt(&sql, &[&id])
            .await
            .map_err(pg_error)?
            .ok_or_else(|| StorageError::not_found(EntityType::Instance, id))?;
        instance_from_row(&row)
    }

    async fn instance_insert(&self, new: &NewInstance) -> AlmaResult<CalendarInstance> {
        let conn = self.get_conn().await?;
        Self::insert_instance(&**conn, new).await
    }

    async fn instance_insert_batch(
        &self,
        batch: &[NewInstance],
    ) -> AlmaResult<Vec<CalendarInstance>> {
        let mut conn = self.get_conn().await?;
        let tx = conn.transaction().await.map_err(pg_error)?;
        let mut created = Vec::with_capacity(batch.len());
        for new in batch {
            created.push(Self::insert_instance(&*tx, new).await?);
        }
        tx.commit().await.map_err(pg_error)?;
        Ok(created)
    }

    async fn instance_update(
        &self,
        id: InstanceId,
        update: &InstanceUpdate,
    ) -> AlmaResult<CalendarInstance> {
        let mut conn = self.get_conn().await?;
        let tx = conn.transaction().await.map_err(pg_error)?;

        let select = format!("SELECT {INSTANCE_COLUMNS} FROM calendar_instances WHERE id = $1 FOR UPDATE");
        let row = tx
            .query_opt(&select, &[&id])
            .await
            .map_err(pg_error)?
            .ok_or_else(|| StorageError::not_found(EntityType::Instance, id))?;
        let mut instance = instance_from_row(&row)?;
        update.apply(&mut instance, alma_core::now());

        let sql = format!(
            "UPDATE calendar_instances SET type = $2, source_id = $3, date = $4, start_time = $5, \
             end_time = $6, notes = $7, status = $8, updated_at = $9 \
             WHERE id = $1 RETURNING {INSTANCE_COLUMNS}"
        );
        let row = tx
            .query_one(
                &sql,
                &[
                    &id,
                    &instance.kind().as_db_str(),
                    &instance.source_id(),
                    &instance.date,
                    &instance.start_time,
                    &instance.end_time,
                    &instance.notes,
                    &instance.status.as_db_str(),
                    &instance.updated_at,
                ],
            )
            .await
            .map_err(pg_error)?;
        let updated = instance_from_row(&row)?;
        tx.commit().await.map_err(pg_error)?;
        Ok(updated)
    }

    async fn instance_delete(&self, id: InstanceId) -> AlmaResult<()> {
        let conn = self.get_conn().await?;
        let deleted = conn
            .execute("DELETE FROM calendar_instances WHERE id = $1", &[&id])
            .await
            .map_err(pg_error)?;
        if deleted == 0 {
            return Err(StorageError::not_found(EntityType::Instance, id).into());
        }
        Ok(())
    }

    async fn instance_count_matching(&self, scope: &BulkScope) -> AlmaResult<u64> {
        let conn = self.get_conn().await?;
        let f = SqlFilter::for_bulk(scope)?;
        let sql = format!("SELECT COUNT(*) FROM calendar_instances{}", f.where_clause());
        let row = conn
            .query_one(&sql, &f.sql_params()[..])
            .await
            .map_err(pg_error)?;
        let count: i64 = row.try_get(0).map_err(pg_error)?;
        Ok(count.unsigned_abs())
    }

    async fn instance_delete_matching(&self, scope: &BulkScope) -> AlmaResult<u64> {
        let conn = self.get_conn().await?;
        let f = SqlFilter::for_bulk(scope)?;
        let sql = format!("DELETE FROM calendar_instances{}", f.where_clause());
        conn.execute(&sql, &f.sql_params()[..])
            .await
            .map_err(pg_error)
    }

    // ========================================================================
    // ASSIGNMENT OPERATIONS
    // ========================================================================

    async fn assignment_list_for_instance(
        &self,
        instance_id: InstanceId,
    ) -> AlmaResult<Vec<CalendarAssignment>> {
        self.assignment_list_for_instances(&[instance_id]).await
    }

    async fn assignment_list_for_instances(
        &self,
        instance_ids: &[InstanceId],
    ) -> AlmaResult<Vec<CalendarAssignment>> {
        if instance_ids.is_empty() {
            return Ok(Vec::new());
        }
        let conn = self.get_conn().await?;
        let sql = format!(
            "SELECT {ASSIGNMENT_COLUMNS} FROM calendar_assignments WHERE instance_id = ANY($1) \
             ORDER BY instance_id, role <> 'coordinator', id"
        );
        let ids = instance_ids.to_vec();
        let rows = conn.query(&sql, &[&ids]).await.map_err(pg_error)?;
        rows.iter().map(assignment_from_row).collect()
    }

    async fn assignment_insert(&self, new: &NewAssignment) -> AlmaResult<CalendarAssignment> {
        let mut conn = self.get_conn().await?;
        let tx = conn.transaction().await.map_err(pg_error)?;
        Self::lock_instance(&*tx, new.instance_id).await?;

        let sql = format!(
            "INSERT INTO calendar_assignments (instance_id, volunteer_id, role) \
             VALUES ($1, $2, $3) RETURNING {ASSIGNMENT_COLUMNS}"
        );
        let row = tx
            .query_one(
                &sql,
                &[&new.instance_id, &new.volunteer_id, &new.role.as_db_str()],
            )
            .await
            .map_err(pg_error)?;
        let assignment = assignment_from_row(&row)?;
        tx.commit().await.map_err(pg_error)?;
        Ok(assignment)
    }

    async fn assignment_upsert_by_role(
        &self,
        instance_id: InstanceId,
        role: AssignmentRole,
        volunteer_id: VolunteerId,
    ) -> AlmaResult<CalendarAssignment> {
        let mut conn = self.get_conn().await?;
        let tx = conn.transaction().await.map_err(pg_error)?;
        Self::lock_instance(&*tx, instance_id).await?;

        let sql = format!(
            "INSERT INTO calendar_assignments (instance_id, volunteer_id, role) \
             VALUES ($1, $2, $3) \
             ON CONFLICT (instance_id, role) \
             DO UPDATE SET volunteer_id = EXCLUDED.volunteer_id, updated_at = now() \
             RETURNING {ASSIGNMENT_COLUMNS}"
        );
        let row = tx
            .query_one(&sql, &[&instance_id, &volunteer_id, &role.as_db_str()])
            .await
            .map_err(pg_error)?;
        let assignment = assignment_from_row(&row)?;
        tx.commit().await.map_err(pg_error)?;
        Ok(assignment)
    }

    async fn assignment_update(
        &self,
        id: AssignmentId,
        update: &AssignmentUpdate,
    ) -> AlmaResult<CalendarAssignment> {
        let mut conn = self.get_conn().await?;
        let tx = conn.transaction().await.map_err(pg_error)?;

        let select = format!("SELECT {ASSIGNMENT_COLUMNS} FROM calendar_assignments WHERE id = $1 FOR UPDATE");
        let row = tx
            .query_opt(&select, &[&id])
            .await
            .map_err(pg_error)?
            .ok_or_else(|| StorageError::not_found(EntityType::Assignment, id))?;
        let mut assignment = assignment_from_row(&row)?;
        update.apply(&mut assignment, alma_core::now());

        let sql = format!(
            "UPDATE calendar_assignments SET volunteer_id = $2, role = $3, updated_at = $4 \
             WHERE id = $1 RETURNING {ASSIGNMENT_COLUMNS}"
        );
        let row = tx
            .query_one(
                &sql,
                &[
                    &id,
                    &assignment.volunteer_id,
                    &assignment.role.as_db_str(),
                    &assignment.updated_at,
                ],
            )
            .await
            .map_err(pg_error)?;
        let updated = assignment_from_row(&row)?;
        tx.commit().await.map_err(pg_error)?;
        Ok(updated)
    }

    async fn assignment_delete(&self, id: AssignmentId) -> AlmaResult<()> {
        let conn = self.get_conn().await?;
        let deleted = conn
            .execute("DELETE FROM calendar_assignments WHERE id = $1", &[&id])
            .await
            .map_err(pg_error)?;
        if deleted == 0 {
            return Err(StorageError::not_found(EntityType::Assignment, id).into());
        }
        Ok(())
    }

    async fn assignment_delete_by_role(
        &self,
        instance_id: InstanceId,
        role: AssignmentRole,
    ) -> AlmaResult<()> {
        let conn = self.get_conn().await?;
        let deleted = conn
            .execute(
                "DELETE FROM calendar_assignments WHERE instance_id = $1 AND role = $2",
                &[&instance_id, &role.as_db_str()],
            )
            .await
            .map_err(pg_error)?;
        if deleted == 0 {
            return Err(StorageError::missing_reference(
                EntityType::Assignment,
                format!("instance {instance_id} has no {role}"),
            )
            .into());
        }
        Ok(())
    }

    // ========================================================================
    // ROSTER OPERATIONS
    // ========================================================================

    async fn participant_list_for_event(
        &self,
        event_id: InstanceId,
    ) -> AlmaResult<Vec<CalendarEventParticipant>> {
        let conn = self.get_conn().await?;
        let sql = format!(
            "SELECT {ROSTER_COLUMNS} FROM calendar_event_participants WHERE event_id = $1 ORDER BY id"
        );
        let rows = conn.query(&sql, &[&event_id]).await.map_err(pg_error)?;
        rows.iter().map(roster_from_row).collect()
    }

    async fn participant_add(&self, new: &NewParticipant) -> AlmaResult<CalendarEventParticipant> {
        let mut conn = self.get_conn().await?;
        let tx = conn.transaction().await.map_err(pg_error)?;
        Self::lock_instance(&*tx, new.event_id).await?;

        let sql = format!(
            "INSERT INTO calendar_event_participants (event_id, participant_id, status) \
             VALUES ($1, $2, $3) RETURNING {ROSTER_COLUMNS}"
        );
        let row = tx
            .query_one(
                &sql,
                &[&new.event_id, &new.participant_id, &new.status.as_db_str()],
            )
            .await
            .map_err(pg_error)?;
        let entry = roster_from_row(&row)?;
        tx.commit().await.map_err(pg_error)?;
        Ok(entry)
    }

    async fn participant_update(
        &self,
        id: RosterEntryId,
        update: &ParticipantUpdate,
    ) -> AlmaResult<CalendarEventParticipant> {
        let conn = self.get_conn().await?;
        let sql = format!(
            "UPDATE calendar_event_participants \
             SET status = COALESCE($2, status), updated_at = now() \
             WHERE id = $1 RETURNING {ROSTER_COLUMNS}"
        );
        let status = update.status.map(|s| s.as_db_str());
        let row = conn
            .query_opt(&sql, &[&id, &status])
            .await
            .map_err(pg_error)?
            .ok_or_else(|| StorageError::not_found(EntityType::RosterEntry, id))?;
        roster_from_row(&row)
    }

    async fn participant_delete(&self, id: RosterEntryId) -> AlmaResult<()> {
        let conn = self.get_conn().await?;
        let deleted = conn
            .execute("DELETE FROM calendar_event_participants WHERE id = $1", &[&id])
            .await
            .map_err(pg_error)?;
        if deleted == 0 {
            return Err(StorageError::not_found(EntityType::RosterEntry, id).into());
        }
        Ok(())
    }

    async fn health_check(&self) -> AlmaResult<()> {
        let conn = self.get_conn().await?;
        conn.query_one("SELECT 1", &[]).await.map_err(pg_error)?;
        Ok(())
    }
}

#[async_trait]
impl VolunteerDirectory for DbClient {
    async fn volunteer_lookup(
        &self,
        ids: &[VolunteerId],
    ) -> AlmaResult<HashMap<VolunteerId, VolunteerRef>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        let conn = self.get_conn().await?;
        let ids = ids.to_vec();
        let rows = conn
            .query(
                "SELECT id, name, last_name FROM voluntarios WHERE id = ANY($1)",
                &[&ids],
            )
            .await
            .map_err(pg_error)?;
        rows.iter()
            .map(|row| -> AlmaResult<(VolunteerId, VolunteerRef)> {
                let volunteer = VolunteerRef::new(
                    row.try_get("id").map_err(pg_error)?,
                    row.try_get::<_, String>("name").map_err(pg_error)?,
                    row.try_get("last_name").map_err(pg_error)?,
                );
                Ok((volunteer.id, volunteer))
            })
            .collect()
    }
}
