//! Observation query parameters: validation and query composition.
//!
//! Filters always compose in the same order: station scope, then the
//! `created` date, then the `starting_after` cursor, then `limit`. The
//! [`ObservationFilter::to_query`] builder emits one SQL statement for each of
//! the eight (scoped × dated × cursored) combinations, with every predicate
//! pushed into the query.

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use serde::Deserialize;
use sqlx::{Postgres, QueryBuilder};

use crate::error::ApiError;

/// Columns selected for every observation query, in `RawObservation` order.
pub const OBSERVATION_COLUMNS: &str = "\
    o.id, o.station_id, o.observation_time, \
    o.temperature_average, o.temperature_high, o.temperature_low, \
    o.humidity_average, o.barometric_pressure, \
    o.wind_speed_average, o.wind_speed_high, \
    o.wind_direction_high, o.wind_direction_average, \
    o.radiation_average, o.radiation_high, \
    o.rain, o.rain_last_hour, \
    o.temperature_soil_2, o.temperature_soil_5, o.temperature_soil_10, o.temperature_soil_15, \
    o.moisture_soil_2, o.moisture_soil_5, o.moisture_soil_10, o.moisture_soil_15";

// ---

/// Result-count bound, always within `1..=100`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limit(u8);

impl Limit {
    pub const MIN: i64 = 1;
    pub const MAX: i64 = 100;
    pub const DEFAULT: Limit = Limit(10);

    pub fn get(self) -> i64 {
        i64::from(self.0)
    }
}

impl Default for Limit {
    fn default() -> Self {
        Limit::DEFAULT
    }
}

impl TryFrom<i64> for Limit {
    type Error = ApiError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match u8::try_from(value) {
            Ok(limit) if (Limit::MIN..=Limit::MAX).contains(&i64::from(limit)) => Ok(Limit(limit)),
            _ => Err(ApiError::InvalidParameter(format!(
                "limit {} outside [{}, {}]",
                value,
                Limit::MIN,
                Limit::MAX
            ))),
        }
    }
}

/// Raw query string of the observation endpoints.
///
/// Everything is taken as text so that malformed values surface as
/// `InvalidParameter` rather than an extractor rejection.
#[derive(Debug, Default, Deserialize)]
pub struct WeatherParams {
    pub starting_after: Option<String>,
    pub created: Option<String>,
    pub limit: Option<String>,
}

impl WeatherParams {
    /// Validate the parameters into an unscoped filter.
    ///
    /// `limit` is checked first so an out-of-range limit is rejected no matter
    /// what else was sent. Callers add the station scope afterwards.
    pub fn validate(self) -> Result<ObservationFilter, ApiError> {
        // ---
        let limit = match non_empty(self.limit) {
            None => Limit::default(),
            Some(text) => {
                let value = text.trim().parse::<i64>().map_err(|_| {
                    ApiError::InvalidParameter(format!("limit {:?} is not an integer", text))
                })?;
                Limit::try_from(value)?
            }
        };

        let created = non_empty(self.created)
            .map(|text| {
                NaiveDate::parse_from_str(text.trim(), "%Y-%m-%d").map_err(|_| {
                    ApiError::InvalidParameter(format!("created {:?} is not YYYY-MM-DD", text))
                })
            })
            .transpose()?;

        Ok(ObservationFilter {
            station_id: None,
            created,
            starting_after: non_empty(self.starting_after),
            limit,
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Which of the four filter combinations a request uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryShape {
    All,
    StartingAfter,
    Created,
    CreatedStartingAfter,
}

/// A validated observation query.
#[derive(Debug, Clone, PartialEq)]
pub struct ObservationFilter {
    pub station_id: Option<i32>,
    pub created: Option<NaiveDate>,
    pub starting_after: Option<String>,
    pub limit: Limit,
}

impl ObservationFilter {
    // ---
    pub fn shape(&self) -> QueryShape {
        match (self.created.is_some(), self.starting_after.is_some()) {
            (false, false) => QueryShape::All,
            (false, true) => QueryShape::StartingAfter,
            (true, false) => QueryShape::Created,
            (true, true) => QueryShape::CreatedStartingAfter,
        }
    }

    /// Ordering key for the given table alias.
    ///
    /// Date-filtered queries order by time first, then id; the cursor
    /// comparison uses the same key so "strictly after" matches the order.
    /// Ids compare bytewise whatever the database's default collation is.
    fn order_key(&self, alias: &str) -> String {
        match self.created {
            Some(_) => format!("{alias}.observation_time, {alias}.id COLLATE \"C\""),
            None => format!("{alias}.id COLLATE \"C\""),
        }
    }

    /// Station and date predicates against `alias`.
    fn push_restrictions(&self, qb: &mut QueryBuilder<'static, Postgres>, alias: &str) {
        // ---
        if let Some(station_id) = self.station_id {
            qb.push(format!(" AND {alias}.station_id = "))
                .push_bind(station_id);
        }
        if let Some(day) = self.created {
            let (start, end) = day_bounds(day);
            qb.push(format!(" AND {alias}.observation_time >= "))
                .push_bind(start);
            qb.push(format!(" AND {alias}.observation_time < "))
                .push_bind(end);
        }
    }

    /// Build the single SELECT for this filter.
    ///
    /// The cursor row is looked up under the same station and date
    /// restrictions, so a cursor outside the restricted set (or one that does
    /// not exist) matches nothing and the query returns no rows.
    pub fn to_query(&self) -> QueryBuilder<'static, Postgres> {
        // ---
        let mut qb = QueryBuilder::new("SELECT ");
        qb.push(OBSERVATION_COLUMNS);
        qb.push(" FROM observations o WHERE TRUE");

        self.push_restrictions(&mut qb, "o");

        if let Some(cursor) = &self.starting_after {
            qb.push(format!(" AND ({}) > (SELECT {}", self.order_key("o"), self.order_key("c")));
            qb.push(" FROM observations c WHERE c.id = ")
                .push_bind(cursor.clone());
            self.push_restrictions(&mut qb, "c");
            qb.push(")");
        }

        qb.push(format!(" ORDER BY {}", self.order_key("o")));
        qb.push(" LIMIT ").push_bind(self.limit.get());
        qb
    }
}

/// Half-open UTC range covering one calendar day.
pub fn day_bounds(day: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = Utc.from_utc_datetime(&day.and_time(NaiveTime::MIN));
    (start, start + Duration::days(1))
}
