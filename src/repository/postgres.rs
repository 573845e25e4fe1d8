//! PostgreSQL backend. An entity's serde representation is its row.

use super::{AmenityLinks, Repository, RepositoryError};
use crate::models::{Amenity, Entity, Place, Review, User};
use crate::sql::{self, Column, QueryBuf, Table};
use async_trait::async_trait;
use serde_json::Value;
use sqlx::postgres::PgRow;
use sqlx::{PgConnection, PgPool};
use std::marker::PhantomData;
use uuid::Uuid;

/// Entity stored in a table described by `TABLE`.
pub trait PgEntity: Entity {
    const TABLE: Table;
}

const fn col(name: &'static str, pg_type: &'static str) -> Column {
    Column { name, pg_type }
}

impl PgEntity for User {
    const TABLE: Table = Table {
        name: "users",
        columns: &[
            col("id", "uuid"),
            col("first_name", "text"),
            col("last_name", "text"),
            col("email", "text"),
            col("password_hash", "text"),
            col("is_admin", "boolean"),
            col("created_at", "timestamptz"),
            col("updated_at", "timestamptz"),
        ],
    };
}

impl PgEntity for Place {
    const TABLE: Table = Table {
        name: "places",
        columns: &[
            col("id", "uuid"),
            col("title", "text"),
            col("description", "text"),
            col("price", "double precision"),
            col("latitude", "double precision"),
            col("longitude", "double precision"),
            col("owner_id", "uuid"),
            col("created_at", "timestamptz"),
            col("updated_at", "timestamptz"),
        ],
    };
}

impl PgEntity for Review {
    const TABLE: Table = Table {
        name: "reviews",
        columns: &[
            col("id", "uuid"),
            col("text", "text"),
            col("rating", "integer"),
            col("place_id", "uuid"),
            col("user_id", "uuid"),
            col("created_at", "timestamptz"),
            col("updated_at", "timestamptz"),
        ],
    };
}

impl PgEntity for Amenity {
    const TABLE: Table = Table {
        name: "amenities",
        columns: &[
            col("id", "uuid"),
            col("name", "text"),
            col("created_at", "timestamptz"),
            col("updated_at", "timestamptz"),
        ],
    };
}

/// SQLSTATE 23505 becomes `DuplicateKey`; everything else stays a database error.
fn map_db_error(kind: &'static str, err: sqlx::Error) -> RepositoryError {
    if let Some(db) = err.as_database_error() {
        if db.code().as_deref() == Some("23505") {
            return RepositoryError::DuplicateKey {
                kind,
                detail: db.constraint().unwrap_or("unique constraint").to_string(),
            };
        }
    }
    RepositoryError::Db(err)
}

fn bind_all(q: &QueryBuf) -> sqlx::query::Query<'_, sqlx::Postgres, sqlx::postgres::PgArguments> {
    tracing::debug!(sql = %q.sql, params = ?q.params, "query");
    let mut query = sqlx::query(&q.sql);
    for p in &q.params {
        query = query.bind(p.clone());
    }
    query
}

fn to_row<E: Entity>(entity: &E) -> Result<serde_json::Map<String, Value>, RepositoryError> {
    match serde_json::to_value(entity)? {
        Value::Object(map) => Ok(map),
        _ => Err(RepositoryError::Encoding(<serde_json::Error as serde::ser::Error>::custom(
            "entity did not serialize to an object",
        ))),
    }
}

fn from_row<E: Entity>(row: &PgRow) -> Result<E, RepositoryError> {
    Ok(serde_json::from_value(row_to_json(row))?)
}

pub struct PgRepository<E> {
    pool: PgPool,
    schema: String,
    _entity: PhantomData<fn() -> E>,
}

impl<E: PgEntity> PgRepository<E> {
    pub fn new(pool: PgPool, schema: &str) -> Self {
        PgRepository {
            pool,
            schema: schema.to_string(),
            _entity: PhantomData,
        }
    }

    async fn fetch_where(&self, name: &str, value: &Value, limit: Option<u32>) -> Result<Vec<E>, RepositoryError> {
        if value.is_null() {
            return Ok(Vec::new());
        }
        let Some(q) = sql::select_where(&self.schema, &E::TABLE, name, value.clone(), limit) else {
            return Ok(Vec::new());
        };
        let rows = bind_all(&q)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_db_error(E::KIND, e))?;
        rows.iter().map(from_row).collect()
    }

    async fn update_in(&self, tx: &mut PgConnection, id: Uuid, patch: E::Patch) -> Result<Option<E>, RepositoryError> {
        let q = sql::select_by_id_for_update(&self.schema, &E::TABLE, Value::String(id.to_string()));
        let Some(row) = bind_all(&q).fetch_optional(&mut *tx).await? else {
            return Ok(None);
        };
        let mut entity: E = from_row(&row)?;
        entity.apply(patch)?;
        let q = sql::update(&self.schema, &E::TABLE, &to_row(&entity)?);
        bind_all(&q)
            .execute(&mut *tx)
            .await
            .map_err(|e| map_db_error(E::KIND, e))?;
        Ok(Some(entity))
    }
}

#[async_trait]
impl<E: PgEntity> Repository<E> for PgRepository<E> {
    async fn add(&self, entity: &E) -> Result<(), RepositoryError> {
        let q = sql::insert(&self.schema, &E::TABLE, &to_row(entity)?);
        bind_all(&q)
            .execute(&self.pool)
            .await
            .map_err(|e| map_db_error(E::KIND, e))?;
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Option<E>, RepositoryError> {
        let q = sql::select_by_id(&self.schema, &E::TABLE, Value::String(id.to_string()));
        let row = bind_all(&q).fetch_optional(&self.pool).await?;
        row.as_ref().map(from_row).transpose()
    }

    async fn get_all(&self) -> Result<Vec<E>, RepositoryError> {
        let q = sql::select_all(&self.schema, &E::TABLE);
        let rows = bind_all(&q).fetch_all(&self.pool).await?;
        rows.iter().map(from_row).collect()
    }

    async fn get_by_attribute(&self, name: &str, value: &Value) -> Result<Option<E>, RepositoryError> {
        Ok(self.fetch_where(name, value, Some(1)).await?.pop())
    }

    async fn find_by(&self, name: &str, value: &Value) -> Result<Vec<E>, RepositoryError> {
        self.fetch_where(name, value, None).await
    }

    async fn update(&self, id: Uuid, patch: E::Patch) -> Result<Option<E>, RepositoryError> {
        let mut tx = self.pool.begin().await?;
        let updated = self.update_in(&mut tx, id, patch).await?;
        tx.commit().await?;
        Ok(updated)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, RepositoryError> {
        let q = sql::delete(&self.schema, &E::TABLE, Value::String(id.to_string()));
        let done = bind_all(&q).execute(&self.pool).await?;
        Ok(done.rows_affected() > 0)
    }
}

pub struct PgAmenityLinks {
    pool: PgPool,
    table: String,
}

impl PgAmenityLinks {
    pub fn new(pool: PgPool, schema: &str) -> Self {
        PgAmenityLinks {
            pool,
            table: sql::qualified_table(schema, "place_amenity"),
        }
    }

    async fn delete_where(&self, column: &str, id: Uuid) -> Result<u64, RepositoryError> {
        let stmt = format!("DELETE FROM {} WHERE \"{}\" = $1", self.table, column);
        tracing::debug!(sql = %stmt, id = %id, "query");
        let done = sqlx::query(&stmt).bind(id).execute(&self.pool).await?;
        Ok(done.rows_affected())
    }
}

#[async_trait]
impl AmenityLinks for PgAmenityLinks {
    async fn link(&self, place_id: Uuid, amenity_id: Uuid) -> Result<(), RepositoryError> {
        let stmt = format!(
            "INSERT INTO {} (\"place_id\", \"amenity_id\") VALUES ($1, $2) ON CONFLICT DO NOTHING",
            self.table
        );
        tracing::debug!(sql = %stmt, place_id = %place_id, amenity_id = %amenity_id, "query");
        sqlx::query(&stmt)
            .bind(place_id)
            .bind(amenity_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn unlink(&self, place_id: Uuid, amenity_id: Uuid) -> Result<bool, RepositoryError> {
        let stmt = format!(
            "DELETE FROM {} WHERE \"place_id\" = $1 AND \"amenity_id\" = $2",
            self.table
        );
        tracing::debug!(sql = %stmt, place_id = %place_id, amenity_id = %amenity_id, "query");
        let done = sqlx::query(&stmt)
            .bind(place_id)
            .bind(amenity_id)
            .execute(&self.pool)
            .await?;
        Ok(done.rows_affected() > 0)
    }

    async fn amenities_of(&self, place_id: Uuid) -> Result<Vec<Uuid>, RepositoryError> {
        let stmt = format!(
            "SELECT \"amenity_id\" FROM {} WHERE \"place_id\" = $1 ORDER BY \"linked_at\", \"amenity_id\"",
            self.table
        );
        tracing::debug!(sql = %stmt, place_id = %place_id, "query");
        let ids: Vec<(Uuid,)> = sqlx::query_as(&stmt).bind(place_id).fetch_all(&self.pool).await?;
        Ok(ids.into_iter().map(|(id,)| id).collect())
    }

    async fn unlink_place(&self, place_id: Uuid) -> Result<(), RepositoryError> {
        self.delete_where("place_id", place_id).await.map(drop)
    }

    async fn unlink_amenity(&self, amenity_id: Uuid) -> Result<(), RepositoryError> {
        self.delete_where("amenity_id", amenity_id).await.map(drop)
    }
}

fn row_to_json(row: &PgRow) -> Value {
    use sqlx::Column;
    use sqlx::Row;
    let mut map = serde_json::Map::new();
    for col in row.columns() {
        let name = col.name();
        map.insert(name.to_string(), cell_to_value(row, name));
    }
    Value::Object(map)
}

fn cell_to_value(row: &PgRow, name: &str) -> Value {
    use sqlx::Row;
    if let Ok(Some(n)) = row.try_get::<Option<i32>, _>(name) {
        return Value::Number(n.into());
    }
    if let Ok(Some(n)) = row.try_get::<Option<i64>, _>(name) {
        return Value::Number(n.into());
    }
    if let Ok(Some(n)) = row.try_get::<Option<f64>, _>(name) {
        if let Some(n) = serde_json::Number::from_f64(n) {
            return Value::Number(n);
        }
    }
    if let Ok(Some(b)) = row.try_get::<Option<bool>, _>(name) {
        return Value::Bool(b);
    }
    if let Ok(Some(u)) = row.try_get::<Option<Uuid>, _>(name) {
        return Value::String(u.to_string());
    }
    if let Ok(Some(d)) = row.try_get::<Option<chrono::DateTime<chrono::Utc>>, _>(name) {
        return Value::String(d.to_rfc3339());
    }
    if let Ok(Some(s)) = row.try_get::<Option<String>, _>(name) {
        return Value::String(s);
    }
    if let Ok(Some(j)) = row.try_get::<Option<Value>, _>(name) {
        return j;
    }
    Value::Null
}
