//! Reference location (geofence) repository
//!
//! The only mutable table this service owns. Create and update validate
//! domain invariants before touching the database; the unique name constraint
//! is enforced by PostgreSQL and surfaces as `DbError::Conflict`.

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::Row;
use tracing::instrument;

use tracklog_core::{NewReferenceLocation, ReferenceLocation, ReferenceLocationPatch};

use crate::error::{DbError, DbResult};
use crate::executor::{Executor, SqlArg, Statement};
use crate::query::SetClause;

const COLUMNS: &str = "id, name, latitude, longitude, radius_meters, description, \
     created_at, updated_at";

const LIST: Statement = Statement::fixed(
    "reference.list",
    "SELECT id, name, latitude, longitude, radius_meters, description, \
     created_at, updated_at \
     FROM public.reference_locations ORDER BY name ASC",
);

const GET_BY_ID: Statement = Statement::fixed(
    "reference.get",
    "SELECT id, name, latitude, longitude, radius_meters, description, \
     created_at, updated_at \
     FROM public.reference_locations WHERE id = $1",
);

const INSERT: Statement = Statement::fixed(
    "reference.create",
    "INSERT INTO public.reference_locations \
     (name, latitude, longitude, radius_meters, description) \
     VALUES ($1, $2, $3, $4, $5) \
     RETURNING id, name, latitude, longitude, radius_meters, description, \
     created_at, updated_at",
);

const DELETE: Statement = Statement::fixed(
    "reference.delete",
    "DELETE FROM public.reference_locations WHERE id = $1",
);

fn from_row(row: &PgRow) -> DbResult<ReferenceLocation> {
    Ok(ReferenceLocation {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        latitude: row.try_get("latitude")?,
        longitude: row.try_get("longitude")?,
        radius_meters: row.try_get("radius_meters")?,
        description: row.try_get("description")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

/// Compile a partial update into a SET clause plus the trailing id placeholder
fn compile_patch(patch: &ReferenceLocationPatch) -> (SetClause, usize) {
    let mut set = SetClause::new();
    if let Some(name) = &patch.name {
        set.set("name", SqlArg::Text(name.clone()));
    }
    if let Some(lat) = patch.latitude {
        set.set("latitude", SqlArg::Float(lat));
    }
    if let Some(lon) = patch.longitude {
        set.set("longitude", SqlArg::Float(lon));
    }
    if let Some(radius) = patch.radius_meters {
        set.set("radius_meters", SqlArg::Float(radius));
    }
    if let Some(description) = &patch.description {
        set.set("description", SqlArg::Text(description.clone()));
    }
    set.raw("updated_at = NOW()");
    let id_placeholder = set.args_len() + 1;
    (set, id_placeholder)
}

/// CRUD access to stored geofences
#[async_trait]
pub trait ReferenceRepository: Send + Sync {
    /// All reference locations, ordered by name
    async fn list(&self) -> DbResult<Vec<ReferenceLocation>>;

    /// A single reference location
    async fn get(&self, id: i64) -> DbResult<Option<ReferenceLocation>>;

    /// Insert a new reference location; duplicate name is a `Conflict`
    async fn create(&self, new: NewReferenceLocation) -> DbResult<ReferenceLocation>;

    /// Apply a partial update; `NotFound` when the row does not exist
    async fn update(
        &self,
        id: i64,
        patch: ReferenceLocationPatch,
    ) -> DbResult<ReferenceLocation>;

    /// Delete a reference location; `NotFound` when the row does not exist
    async fn delete(&self, id: i64) -> DbResult<()>;
}

/// PostgreSQL-backed reference location repository
#[derive(Debug, Clone)]
pub struct PgReferenceRepository {
    executor: Executor,
}

impl PgReferenceRepository {
    pub fn new(executor: Executor) -> Self {
        Self { executor }
    }
}

#[async_trait]
impl ReferenceRepository for PgReferenceRepository {
    #[instrument(skip(self))]
    async fn list(&self) -> DbResult<Vec<ReferenceLocation>> {
        let rows = self.executor.fetch_all(&LIST, &[]).await?;
        rows.iter().map(from_row).collect()
    }

    #[instrument(skip(self))]
    async fn get(&self, id: i64) -> DbResult<Option<ReferenceLocation>> {
        let row = self
            .executor
            .fetch_one(&GET_BY_ID, &[SqlArg::Int(id)])
            .await?;
        row.as_ref().map(from_row).transpose()
    }

    #[instrument(skip(self, new), fields(name = %new.name))]
    async fn create(&self, new: NewReferenceLocation) -> DbResult<ReferenceLocation> {
        new.validate()?;

        let args = vec![
            SqlArg::Text(new.name),
            SqlArg::Float(new.latitude),
            SqlArg::Float(new.longitude),
            SqlArg::Float(new.radius_meters),
            match new.description {
                Some(d) => SqlArg::Text(d),
                None => SqlArg::NullText,
            },
        ];

        let row = self
            .executor
            .fetch_one(&INSERT, &args)
            .await?
            .ok_or_else(|| DbError::Mapping("insert returned no row".to_string()))?;
        from_row(&row)
    }

    #[instrument(skip(self, patch))]
    async fn update(
        &self,
        id: i64,
        patch: ReferenceLocationPatch,
    ) -> DbResult<ReferenceLocation> {
        if patch.is_empty() {
            return Err(DbError::Validation(
                "update patch contains no fields".to_string(),
            ));
        }
        patch.validate()?;

        let (set, id_placeholder) = compile_patch(&patch);
        let stmt = Statement::compiled(
            "reference.update",
            format!(
                "UPDATE public.reference_locations {} \
                 WHERE id = ${id_placeholder} RETURNING {COLUMNS}",
                set.render()
            ),
        );

        let mut args = set.into_args();
        args.push(SqlArg::Int(id));

        let row = self
            .executor
            .fetch_one(&stmt, &args)
            .await?
            .ok_or_else(|| DbError::NotFound(format!("reference location {id}")))?;
        from_row(&row)
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: i64) -> DbResult<()> {
        let affected = self.executor.execute(&DELETE, &[SqlArg::Int(id)]).await?;
        if affected == 0 {
            return Err(DbError::NotFound(format!("reference location {id}")));
        }
        Ok(())
    }
}
