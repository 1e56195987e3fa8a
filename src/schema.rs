//! Database schema management for `weather-station-api`.
//!
//! Ensures required tables and indexes exist before serving requests.
//! Applied once on startup from `main.rs`. Rows are loaded by a separate
//! ingestion job; this service only reads them.

use anyhow::Result;
use sqlx::PgPool;

// ---

/// Create the database schema if missing (idempotent).
///
/// Observation ids sort bytewise (`COLLATE "C"`) so their order, and the
/// indexes covering it, match pagination order on any cluster locale.
///
/// Sensor readings are `TEXT` because ingestion copies station exports
/// verbatim, blank cells included; the API parses them on the way out.
///
/// Errors are propagated if any SQL execution fails.
pub async fn create_schema(pool: &PgPool) -> Result<()> {
    // ---
    let mut tx = pool.begin().await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS stations (
            id        INTEGER PRIMARY KEY,
            name      TEXT             NOT NULL,
            latitude  DOUBLE PRECISION NOT NULL,
            longitude DOUBLE PRECISION NOT NULL
        );
        "#,
    )
    .execute(&mut *tx)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS observations (
            id                     TEXT        COLLATE "C" PRIMARY KEY,
            station_id             INTEGER     NOT NULL REFERENCES stations (id),
            observation_time       TIMESTAMPTZ NOT NULL,
            temperature_average    TEXT,
            temperature_high       TEXT,
            temperature_low        TEXT,
            humidity_average       TEXT,
            barometric_pressure    TEXT,
            wind_speed_average     TEXT,
            wind_speed_high        TEXT,
            wind_direction_high    TEXT,
            wind_direction_average TEXT,
            radiation_average      TEXT,
            radiation_high         TEXT,
            rain                   TEXT,
            rain_last_hour         TEXT,
            temperature_soil_2     TEXT,
            temperature_soil_5     TEXT,
            temperature_soil_10    TEXT,
            temperature_soil_15    TEXT,
            moisture_soil_2        TEXT,
            moisture_soil_5        TEXT,
            moisture_soil_10       TEXT,
            moisture_soil_15       TEXT
        );
        "#,
    )
    .execute(&mut *tx)
    .await?;

    // Station-scoped pages walk (station_id, id); dated pages walk
    // (observation_time, id).
    sqlx::query(
        r#"
        CREATE INDEX IF NOT EXISTS idx_observations_station_id
            ON observations (station_id, id);
        "#,
    )
    .execute(&mut *tx)
    .await?;

    sqlx::query(
        r#"
        CREATE INDEX IF NOT EXISTS idx_observations_time
            ON observations (observation_time, id);
        "#,
    )
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(())
}
