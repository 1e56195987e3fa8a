use axum::{
    extract::{rejection::QueryRejection, Path, Query, State},
    routing::get,
    Json, Router,
};
use tracing::info;

use super::{stations::parse_station_id, SharedStore};
use crate::models::materialize_observations;
use crate::{ApiError, Observation, WeatherParams};

// ---

pub fn router() -> Router<SharedStore> {
    // ---
    Router::new()
        .route("/weather", get(list_weather))
        .route("/stations/{id}/weather", get(list_station_weather))
}

/// Handle `GET /weather`.
async fn list_weather(
    params: Result<Query<WeatherParams>, QueryRejection>,
    State(store): State<SharedStore>,
) -> Result<Json<Vec<Observation>>, ApiError> {
    // ---
    info!("GET /weather");
    observations(store, params, None).await
}

/// Handle `GET /stations/{id}/weather`.
async fn list_station_weather(
    Path(id): Path<String>,
    params: Result<Query<WeatherParams>, QueryRejection>,
    State(store): State<SharedStore>,
) -> Result<Json<Vec<Observation>>, ApiError> {
    // ---
    info!("GET /stations/{}/weather", id);
    observations(store, params, Some(&id)).await
}

/// Validate, query, and materialize one page of observations.
async fn observations(
    store: SharedStore,
    params: Result<Query<WeatherParams>, QueryRejection>,
    station: Option<&str>,
) -> Result<Json<Vec<Observation>>, ApiError> {
    // ---
    let Query(params) = params.map_err(|e| ApiError::InvalidParameter(e.body_text()))?;
    let mut filter = params.validate()?;

    // After validation: a bad query parameter outranks an unknown station.
    if let Some(raw) = station {
        filter.station_id = Some(parse_station_id(raw)?);
    }

    let rows = store.observations(&filter).await?;
    let observations = materialize_observations(rows)?;

    info!(
        "Returning {} observations ({:?}, limit {})",
        observations.len(),
        filter.shape(),
        filter.limit.get()
    );
    Ok(Json(observations))
}
