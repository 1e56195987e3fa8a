//! Station and observation models, and the row-to-entity materializer.
//!
//! Observation sensor readings are stored as text exactly as ingested, so a
//! missing reading shows up as `''`. [`RawObservation::to_observation`] turns
//! those into `None` and parses everything else into the declared numeric
//! type. Columns are mapped by name through `sqlx::FromRow`.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;

// ---

/// A weather station.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Station {
    // ---
    pub id: i32,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
}

/// Observation row as stored, sensor readings still in text form.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct RawObservation {
    // ---
    pub id: String,
    pub station_id: i32,
    pub observation_time: DateTime<Utc>,
    pub temperature_average: Option<String>,
    pub temperature_high: Option<String>,
    pub temperature_low: Option<String>,
    pub humidity_average: Option<String>,
    pub barometric_pressure: Option<String>,
    pub wind_speed_average: Option<String>,
    pub wind_speed_high: Option<String>,
    pub wind_direction_high: Option<String>,
    pub wind_direction_average: Option<String>,
    pub radiation_average: Option<String>,
    pub radiation_high: Option<String>,
    pub rain: Option<String>,
    pub rain_last_hour: Option<String>,
    pub temperature_soil_2: Option<String>,
    pub temperature_soil_5: Option<String>,
    pub temperature_soil_10: Option<String>,
    pub temperature_soil_15: Option<String>,
    pub moisture_soil_2: Option<String>,
    pub moisture_soil_5: Option<String>,
    pub moisture_soil_10: Option<String>,
    pub moisture_soil_15: Option<String>,
}

/// Observation returned by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    // ---
    pub id: String,
    pub station_id: i32,
    pub observation_time: DateTime<Utc>,
    pub temperature_average: Option<i64>,
    pub temperature_high: Option<i64>,
    pub temperature_low: Option<i64>,
    pub humidity_average: Option<i64>,
    pub barometric_pressure: Option<f64>,
    pub wind_speed_average: Option<i64>,
    pub wind_speed_high: Option<i64>,
    pub wind_direction_high: Option<f64>,
    pub wind_direction_average: Option<f64>,
    pub radiation_average: Option<i64>,
    pub radiation_high: Option<i64>,
    pub rain: Option<i64>,
    pub rain_last_hour: Option<i64>,
    pub temperature_soil_2: Option<i64>,
    pub temperature_soil_5: Option<i64>,
    pub temperature_soil_10: Option<i64>,
    pub temperature_soil_15: Option<i64>,
    pub moisture_soil_2: Option<i64>,
    pub moisture_soil_5: Option<i64>,
    pub moisture_soil_10: Option<i64>,
    pub moisture_soil_15: Option<i64>,
}

/// A stored sensor reading that is neither blank nor a valid number.
#[derive(Debug, thiserror::Error)]
#[error("observation {observation_id}: column {column} holds non-numeric value {value:?}")]
pub struct CorruptField {
    pub observation_id: String,
    pub column: &'static str,
    pub value: String,
}

impl RawObservation {
    // ---
    pub fn to_observation(&self) -> Result<Observation, CorruptField> {
        // ---
        let read = |column: &'static str, value: &Option<String>| {
            parse_reading::<i64>(&self.id, column, value)
        };
        let read_f = |column: &'static str, value: &Option<String>| {
            parse_reading::<f64>(&self.id, column, value)
        };

        Ok(Observation {
            id: self.id.clone(),
            station_id: self.station_id,
            observation_time: self.observation_time,
            temperature_average: read("temperature_average", &self.temperature_average)?,
            temperature_high: read("temperature_high", &self.temperature_high)?,
            temperature_low: read("temperature_low", &self.temperature_low)?,
            humidity_average: read("humidity_average", &self.humidity_average)?,
            barometric_pressure: read_f("barometric_pressure", &self.barometric_pressure)?,
            wind_speed_average: read("wind_speed_average", &self.wind_speed_average)?,
            wind_speed_high: read("wind_speed_high", &self.wind_speed_high)?,
            wind_direction_high: read_f("wind_direction_high", &self.wind_direction_high)?,
            wind_direction_average: read_f("wind_direction_average", &self.wind_direction_average)?,
            radiation_average: read("radiation_average", &self.radiation_average)?,
            radiation_high: read("radiation_high", &self.radiation_high)?,
            rain: read("rain", &self.rain)?,
            rain_last_hour: read("rain_last_hour", &self.rain_last_hour)?,
            temperature_soil_2: read("temperature_soil_2", &self.temperature_soil_2)?,
            temperature_soil_5: read("temperature_soil_5", &self.temperature_soil_5)?,
            temperature_soil_10: read("temperature_soil_10", &self.temperature_soil_10)?,
            temperature_soil_15: read("temperature_soil_15", &self.temperature_soil_15)?,
            moisture_soil_2: read("moisture_soil_2", &self.moisture_soil_2)?,
            moisture_soil_5: read("moisture_soil_5", &self.moisture_soil_5)?,
            moisture_soil_10: read("moisture_soil_10", &self.moisture_soil_10)?,
            moisture_soil_15: read("moisture_soil_15", &self.moisture_soil_15)?,
        })
    }
}

/// Blank or missing means no reading; anything else must parse as `T`.
fn parse_reading<T: FromStr>(
    observation_id: &str,
    column: &'static str,
    value: &Option<String>,
) -> Result<Option<T>, CorruptField> {
    // ---
    let text = match value.as_deref().map(str::trim) {
        None | Some("") => return Ok(None),
        Some(text) => text,
    };
    text.parse::<T>().map(Some).map_err(|_| CorruptField {
        observation_id: observation_id.to_string(),
        column,
        value: text.to_string(),
    })
}

/// Materialize observation rows, preserving storage order.
///
/// An empty row set is `NotFound`: a filter that matches nothing, including a
/// cursor that does not resolve, is reported the same way.
pub fn materialize_observations(rows: Vec<RawObservation>) -> Result<Vec<Observation>, ApiError> {
    // ---
    if rows.is_empty() {
        return Err(ApiError::NotFound);
    }
    rows.iter()
        .map(|row| row.to_observation().map_err(ApiError::from))
        .collect()
}

/// Empty station list is `NotFound`, same as observations.
pub fn materialize_stations(rows: Vec<Station>) -> Result<Vec<Station>, ApiError> {
    if rows.is_empty() {
        return Err(ApiError::NotFound);
    }
    Ok(rows)
}

pub fn materialize_station(row: Option<Station>) -> Result<Station, ApiError> {
    row.ok_or(ApiError::NotFound)
}
