//! In-memory store and request helpers for router tests.

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
};
use chrono::{Duration, TimeZone, Utc};
use tower::ServiceExt;

use crate::filter::{day_bounds, ObservationFilter};
use crate::models::{tests::blank_row, RawObservation, Station};
use crate::WeatherStore;

// ---

/// Store that applies the same scope → date → cursor → limit pipeline over
/// vectors.
pub(crate) struct MemoryStore {
    pub stations: Vec<Station>,
    pub observations: Vec<RawObservation>,
    pub fail: bool,
}

impl MemoryStore {
    /// Two stations and 25 observations `obs_01..=obs_25`.
    ///
    /// Odd ids belong to station 1, even ids to station 2. `obs_01..=obs_12`
    /// fall on 2019-07-11, the rest on 2019-07-12.
    pub fn fixture() -> Self {
        // ---
        let stations = vec![
            Station {
                id: 1,
                name: "Hillside".to_string(),
                latitude: 47.6062,
                longitude: -122.3321,
            },
            Station {
                id: 2,
                name: "Riverbank".to_string(),
                latitude: 45.5152,
                longitude: -122.6784,
            },
        ];

        let day_one = Utc.with_ymd_and_hms(2019, 7, 11, 0, 0, 0).unwrap();
        let day_two = Utc.with_ymd_and_hms(2019, 7, 12, 0, 0, 0).unwrap();
        let observations = (1..=25i64)
            .map(|i| {
                let station_id = if i % 2 == 1 { 1 } else { 2 };
                let time = if i <= 12 {
                    day_one + Duration::hours(i)
                } else {
                    day_two + Duration::hours(i - 12)
                };
                let mut row = blank_row(&format!("obs_{:02}", i), station_id, time);
                row.temperature_average = Some((60 + i).to_string());
                row
            })
            .collect();

        Self {
            stations,
            observations,
            fail: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::fixture()
        }
    }

    fn check(&self) -> Result<(), sqlx::Error> {
        if self.fail {
            return Err(sqlx::Error::PoolTimedOut);
        }
        Ok(())
    }
}

#[async_trait]
impl WeatherStore for MemoryStore {
    // ---
    async fn observations(&self, filter: &ObservationFilter) -> Result<Vec<RawObservation>, sqlx::Error> {
        // ---
        self.check()?;

        let mut rows: Vec<&RawObservation> = self
            .observations
            .iter()
            .filter(|o| filter.station_id.map_or(true, |id| o.station_id == id))
            .filter(|o| {
                filter.created.map_or(true, |day| {
                    let (start, end) = day_bounds(day);
                    o.observation_time >= start && o.observation_time < end
                })
            })
            .collect();

        if filter.created.is_some() {
            rows.sort_by(|a, b| (a.observation_time, &a.id).cmp(&(b.observation_time, &b.id)));
        } else {
            rows.sort_by(|a, b| a.id.cmp(&b.id));
        }

        if let Some(cursor) = &filter.starting_after {
            match rows.iter().position(|o| &o.id == cursor) {
                Some(pos) => rows = rows.split_off(pos + 1),
                None => rows.clear(),
            }
        }

        rows.truncate(filter.limit.get() as usize);
        Ok(rows.into_iter().cloned().collect())
    }

    async fn stations(&self) -> Result<Vec<Station>, sqlx::Error> {
        self.check()?;
        Ok(self.stations.clone())
    }

    async fn station(&self, id: i32) -> Result<Option<Station>, sqlx::Error> {
        self.check()?;
        Ok(self.stations.iter().find(|s| s.id == id).cloned())
    }

    async fn ping(&self) -> Result<(), sqlx::Error> {
        self.check()
    }
}

/// Send `GET uri` through a fresh router and decode the JSON body.
pub(crate) async fn get_json(store: MemoryStore, uri: &str) -> (StatusCode, serde_json::Value) {
    // ---
    let app = super::router(Arc::new(store));
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();

    let response = app.oneshot(request).await.expect("Failed to execute request.");
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

/// Ids of a JSON array of observations.
pub(crate) fn ids(body: &serde_json::Value) -> Vec<String> {
    body.as_array()
        .expect("expected a JSON array")
        .iter()
        .map(|o| o["id"].as_str().unwrap().to_string())
        .collect()
}
