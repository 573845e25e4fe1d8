//! Database bootstrap: create the database, the schema and the HBnB tables.

use crate::error::{AppError, ConfigError};
use crate::sql::qualified_table;
use sqlx::ConnectOptions;
use sqlx::PgPool;
use std::str::FromStr;

/// Create `schema` if not exists, then every table idempotently.
/// Constraints mirror the model validation so both backends reject the same rows.
pub async fn ensure_tables(pool: &PgPool, schema: &str) -> Result<(), AppError> {
    sqlx::query(&format!("CREATE SCHEMA IF NOT EXISTS {}", quote_ident(schema)))
        .execute(pool)
        .await?;

    let users = qualified_table(schema, "users");
    let places = qualified_table(schema, "places");
    let reviews = qualified_table(schema, "reviews");
    let amenities = qualified_table(schema, "amenities");
    let links = qualified_table(schema, "place_amenity");

    let ddl = [
        format!(
            r#"
            CREATE TABLE IF NOT EXISTS {users} (
                id UUID PRIMARY KEY,
                first_name VARCHAR(50) NOT NULL CHECK (first_name <> ''),
                last_name VARCHAR(50) NOT NULL CHECK (last_name <> ''),
                email VARCHAR(120) NOT NULL UNIQUE,
                password_hash TEXT NOT NULL,
                is_admin BOOLEAN NOT NULL DEFAULT FALSE,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
            "#
        ),
        format!(
            r#"
            CREATE TABLE IF NOT EXISTS {places} (
                id UUID PRIMARY KEY,
                title VARCHAR(100) NOT NULL CHECK (title <> ''),
                description TEXT,
                price DOUBLE PRECISION NOT NULL CHECK (price >= 0),
                latitude DOUBLE PRECISION NOT NULL CHECK (latitude > -90 AND latitude < 90),
                longitude DOUBLE PRECISION NOT NULL CHECK (longitude > -180 AND longitude < 180),
                owner_id UUID NOT NULL REFERENCES {users} (id) ON DELETE CASCADE,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
            "#
        ),
        format!(
            r#"
            CREATE TABLE IF NOT EXISTS {reviews} (
                id UUID PRIMARY KEY,
                text TEXT NOT NULL CHECK (btrim(text) <> ''),
                rating INTEGER NOT NULL CHECK (rating BETWEEN 1 AND 5),
                place_id UUID NOT NULL REFERENCES {places} (id) ON DELETE CASCADE,
                user_id UUID NOT NULL REFERENCES {users} (id) ON DELETE CASCADE,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                UNIQUE (user_id, place_id)
            )
            "#
        ),
        format!(
            r#"
            CREATE TABLE IF NOT EXISTS {amenities} (
                id UUID PRIMARY KEY,
                name VARCHAR(50) NOT NULL UNIQUE CHECK (name <> ''),
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
            "#
        ),
        format!(
            r#"
            CREATE TABLE IF NOT EXISTS {links} (
                place_id UUID NOT NULL REFERENCES {places} (id) ON DELETE CASCADE,
                amenity_id UUID NOT NULL REFERENCES {amenities} (id) ON DELETE CASCADE,
                linked_at TIMESTAMPTZ NOT NULL DEFAULT clock_timestamp(),
                PRIMARY KEY (place_id, amenity_id)
            )
            "#
        ),
    ];
    for stmt in &ddl {
        tracing::debug!(sql = %stmt, "ddl");
        sqlx::query(stmt).execute(pool).await?;
    }
    tracing::info!(schema = %schema, "tables ready");
    Ok(())
}

/// Ensure the database in `database_url` exists; create it if not. Connects to the
/// default `postgres` database to run CREATE DATABASE. Call before creating the main pool.
pub async fn ensure_database_exists(database_url: &str) -> Result<(), AppError> {
    let (admin_url, db_name) = parse_db_name_from_url(database_url)?;
    if db_name.is_empty() || db_name == "postgres" {
        return Ok(());
    }
    let opts = sqlx::postgres::PgConnectOptions::from_str(&admin_url).map_err(|_| invalid_url(database_url))?;
    let mut conn: sqlx::PgConnection = opts.connect().await?;
    let exists: (bool,) = sqlx::query_as("SELECT EXISTS(SELECT 1 FROM pg_database WHERE datname = $1)")
        .bind(&db_name)
        .fetch_one(&mut conn)
        .await?;
    if !exists.0 {
        sqlx::query(&format!("CREATE DATABASE {}", quote_ident(&db_name)))
            .execute(&mut conn)
            .await?;
        tracing::info!(database = %db_name, "created database");
    }
    Ok(())
}

fn invalid_url(url: &str) -> AppError {
    AppError::Config(ConfigError::Invalid {
        key: "DATABASE_URL",
        value: url.to_string(),
    })
}

fn parse_db_name_from_url(url: &str) -> Result<(String, String), AppError> {
    let path_start = url.rfind('/').ok_or_else(|| invalid_url(url))? + 1;
    let path_and_query = url.get(path_start..).unwrap_or("");
    let db_name = path_and_query.split('?').next().unwrap_or("").trim();
    let base = url.get(..path_start).unwrap_or(url);
    Ok((format!("{}postgres", base), db_name.to_string()))
}

fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn database_name_is_split_from_url() {
        let (admin, db) = parse_db_name_from_url("postgres://u:p@localhost:5432/hbnb_dev?sslmode=disable").unwrap();
        assert_eq!(admin, "postgres://u:p@localhost:5432/postgres");
        assert_eq!(db, "hbnb_dev");
    }

    #[test]
    fn url_without_path_is_a_config_error() {
        assert!(matches!(
            parse_db_name_from_url("localhost"),
            Err(AppError::Config(ConfigError::Invalid { key: "DATABASE_URL", .. }))
        ));
    }
}
