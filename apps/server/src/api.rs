use std::sync::Arc;

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use stockdice_core::{DiceRoll, Weighting};
use tower_http::trace::TraceLayer;

use crate::{
    error::{ApiError, ApiResult},
    main_lib::AppState,
};

#[derive(Debug, Deserialize)]
struct RollQuery {
    n: Option<i64>,
    weighting: Option<String>,
}

/// Roll the dice over the stored universe.
async fn roll(
    State(state): State<Arc<AppState>>,
    Query(query): Query<RollQuery>,
) -> ApiResult<Json<Vec<DiceRoll>>> {
    let weighting = match query.weighting.as_deref() {
        Some(raw) => raw
            .parse::<Weighting>()
            .map_err(|e| ApiError::BadRequest(e.to_string()))?,
        None => Weighting::default(),
    };
    let n = query.n.unwrap_or(1);

    let rolls = state
        .dice_service
        .roll_with(n, weighting, &mut rand::thread_rng())?;
    Ok(Json(rolls))
}

async fn healthz() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

pub fn app_router(state: Arc<AppState>) -> Router {
    let api = Router::new()
        .route("/roll", get(roll))
        .route("/healthz", get(healthz));

    Router::new()
        .nest("/api/v1", api)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
