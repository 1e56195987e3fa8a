//! Storage access for stations and observations.
//!
//! Handlers talk to an `Arc<dyn WeatherStore>`; [`PgWeatherStore`] is the
//! PostgreSQL implementation. Each call checks one connection out of the pool,
//! runs a single query on it, and hands it back when the guard drops.

use async_trait::async_trait;
use sqlx::{PgPool, Row};
use tracing::debug;

use crate::filter::ObservationFilter;
use crate::models::{RawObservation, Station};

// ---

#[async_trait]
pub trait WeatherStore: Send + Sync {
    // ---
    /// Observation rows matching `filter`, in pagination order.
    async fn observations(&self, filter: &ObservationFilter) -> Result<Vec<RawObservation>, sqlx::Error>;

    /// All stations, ordered by id.
    async fn stations(&self) -> Result<Vec<Station>, sqlx::Error>;

    async fn station(&self, id: i32) -> Result<Option<Station>, sqlx::Error>;

    /// Round-trip to the store, used by the health check.
    async fn ping(&self) -> Result<(), sqlx::Error>;
}

pub struct PgWeatherStore {
    pool: PgPool,
}

impl PgWeatherStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl WeatherStore for PgWeatherStore {
    // ---
    #[tracing::instrument(skip(self), fields(shape = ?filter.shape()))]
    async fn observations(&self, filter: &ObservationFilter) -> Result<Vec<RawObservation>, sqlx::Error> {
        // ---
        let mut query = filter.to_query();
        debug!("Observation query: {}", query.sql());

        let mut conn = self.pool.acquire().await?;
        let rows = query
            .build_query_as::<RawObservation>()
            .fetch_all(&mut *conn)
            .await?;

        debug!("Fetched {} observation rows", rows.len());
        Ok(rows)
    }

    #[tracing::instrument(skip(self))]
    async fn stations(&self) -> Result<Vec<Station>, sqlx::Error> {
        // ---
        let mut conn = self.pool.acquire().await?;
        sqlx::query_as::<_, Station>(
            "SELECT id, name, latitude, longitude FROM stations ORDER BY id",
        )
        .fetch_all(&mut *conn)
        .await
    }

    #[tracing::instrument(skip(self))]
    async fn station(&self, id: i32) -> Result<Option<Station>, sqlx::Error> {
        // ---
        let mut conn = self.pool.acquire().await?;
        sqlx::query_as::<_, Station>(
            "SELECT id, name, latitude, longitude FROM stations WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&mut *conn)
        .await
    }

    async fn ping(&self) -> Result<(), sqlx::Error> {
        // ---
        let row = sqlx::query("SELECT 1 AS alive").fetch_one(&self.pool).await?;
        let _: i32 = row.try_get("alive")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    // ---
    use std::str::FromStr;

    use chrono::{NaiveDate, TimeZone, Utc};
    use sqlx::postgres::{PgConnectOptions, PgPoolOptions};

    use super::*;
    use crate::filter::Limit;
    use crate::schema::create_schema;

    /// Mixed-case ids whose byte order is their insertion order.
    const IDS: [&str; 4] = ["obs_1NqB", "obs_1NqZ", "obs_1Nqa", "obs_1Nqb"];

    /// Pool whose `search_path` points at a fresh, seeded schema.
    async fn seeded_pool(schema: &str) -> anyhow::Result<(PgPool, PgPool)> {
        // ---
        let url = std::env::var("DATABASE_URL")?;
        let admin = PgPool::connect(&url).await?;
        sqlx::query(&format!("DROP SCHEMA IF EXISTS {schema} CASCADE"))
            .execute(&admin)
            .await?;
        sqlx::query(&format!("CREATE SCHEMA {schema}"))
            .execute(&admin)
            .await?;

        let options = PgConnectOptions::from_str(&url)?.options([("search_path", schema)]);
        let pool = PgPoolOptions::new()
            .max_connections(2)
            .connect_with(options)
            .await?;
        create_schema(&pool).await?;

        sqlx::query("INSERT INTO stations (id, name, latitude, longitude) VALUES (1, 'Hillside', 47.6, -122.3), (2, 'Riverbank', 45.5, -122.7)")
            .execute(&pool)
            .await?;

        // Insert out of order; the store has to sort them.
        let base = Utc.with_ymd_and_hms(2019, 7, 11, 0, 0, 0).unwrap();
        for (hour, id) in IDS.iter().enumerate().rev() {
            sqlx::query("INSERT INTO observations (id, station_id, observation_time, rain) VALUES ($1, 1, $2, '')")
                .bind(*id)
                .bind(base + chrono::Duration::hours(hour as i64 + 1))
                .execute(&pool)
                .await?;
        }

        Ok((admin, pool))
    }

    fn filter(created: Option<NaiveDate>, cursor: Option<&str>) -> ObservationFilter {
        ObservationFilter {
            station_id: None,
            created,
            starting_after: cursor.map(String::from),
            limit: Limit::DEFAULT,
        }
    }

    fn ids(rows: &[RawObservation]) -> Vec<&str> {
        rows.iter().map(|r| r.id.as_str()).collect()
    }

    #[tokio::test]
    #[ignore = "requires DATABASE_URL pointing at a disposable Postgres"]
    async fn test_pg_pages_mixed_case_ids_in_byte_order() -> anyhow::Result<()> {
        // ---
        let schema = format!("store_test_{}", std::process::id());
        let (admin, pool) = seeded_pool(&schema).await?;
        let store = PgWeatherStore::new(pool.clone());
        let day = NaiveDate::from_ymd_opt(2019, 7, 11);

        let all = store.observations(&filter(None, None)).await?;
        assert_eq!(ids(&all), IDS);

        let after = store.observations(&filter(None, Some("obs_1NqB"))).await?;
        assert_eq!(ids(&after), IDS[1..]);

        let dated_after = store.observations(&filter(day, Some("obs_1NqZ"))).await?;
        assert_eq!(ids(&dated_after), IDS[2..]);

        let scoped = ObservationFilter {
            station_id: Some(2),
            ..filter(None, None)
        };
        assert!(store.observations(&scoped).await?.is_empty());

        let limited = ObservationFilter {
            limit: Limit::try_from(2)?,
            ..filter(None, Some("obs_1NqB"))
        };
        assert_eq!(ids(&store.observations(&limited).await?), IDS[1..3]);

        assert_eq!(store.station(1).await?.map(|s| s.name), Some("Hillside".to_string()));
        assert!(store.station(999).await?.is_none());
        assert_eq!(store.stations().await?.len(), 2);
        store.ping().await?;

        pool.close().await;
        sqlx::query(&format!("DROP SCHEMA {schema} CASCADE"))
            .execute(&admin)
            .await?;
        Ok(())
    }
}
