use std::sync::Arc;

use axum::Router;

use crate::WeatherStore;

mod health;
mod stations;
mod weather;

#[cfg(test)]
pub(crate) mod test_support;

/// Store handle shared by every route.
pub type SharedStore = Arc<dyn WeatherStore>;

// ---

pub fn router(store: SharedStore) -> Router {
    // ---
    Router::new()
        .merge(weather::router())
        .merge(stations::router())
        .merge(health::router())
        .with_state(store)
}
