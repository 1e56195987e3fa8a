use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use tracing::info;

use super::SharedStore;
use crate::models::{materialize_station, materialize_stations};
use crate::{ApiError, Station};

// ---

pub fn router() -> Router<SharedStore> {
    // ---
    Router::new()
        .route("/stations", get(list_stations))
        .route("/stations/{id}", get(get_station))
}

/// Station ids in paths must be integers.
///
/// An integer too large for the `stations.id` column names no station, so it
/// is `NotFound` rather than a bad parameter.
pub(super) fn parse_station_id(raw: &str) -> Result<i32, ApiError> {
    let id = raw
        .parse::<i64>()
        .map_err(|_| ApiError::InvalidParameter(format!("station id {:?} is not an integer", raw)))?;
    i32::try_from(id).map_err(|_| ApiError::NotFound)
}

/// Handle `GET /stations`.
async fn list_stations(State(store): State<SharedStore>) -> Result<Json<Vec<Station>>, ApiError> {
    // ---
    info!("GET /stations");
    let stations = materialize_stations(store.stations().await?)?;
    info!("Returning {} stations", stations.len());
    Ok(Json(stations))
}

/// Handle `GET /stations/{id}`.
async fn get_station(
    Path(id): Path<String>,
    State(store): State<SharedStore>,
) -> Result<Json<Station>, ApiError> {
    // ---
    info!("GET /stations/{}", id);
    let id = parse_station_id(&id)?;
    let station = materialize_station(store.station(id).await?)?;
    Ok(Json(station))
}
