use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use chrono::{Local, NaiveTime};
use hari_penting::ObservanceStore;
use hari_penting::pipeline::Pipeline;
use hari_penting::schedule::DailySchedule;
use hari_penting::scraper::PageSource;
use hari_penting::types::Observance;
use hari_penting::utils::{MonthStats, ObservanceFilter};
use tower_http::cors::CorsLayer;

pub type SharedStore = Arc<dyn ObservanceStore>;

#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(message) => (StatusCode::BAD_REQUEST, message),
            ApiError::Internal(message) => (StatusCode::INTERNAL_SERVER_ERROR, message),
        };
        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

async fn load_all(store: SharedStore) -> Result<Vec<Observance>, ApiError> {
    tokio::task::spawn_blocking(move || store.all())
        .await
        .map_err(|e| ApiError::Internal(format!("Store task failed: {e}")))?
        .inspect_err(|e| log::error!("Failed to read store: {e:?}"))
        .map_err(|e| ApiError::Internal(format!("Failed to read store: {e}")))
}

async fn list_observances(
    State(store): State<SharedStore>,
    Query(filter): Query<ObservanceFilter>,
) -> Result<Json<Vec<Observance>>, ApiError> {
    let filter = filter
        .validate()
        .inspect_err(|e| log::warn!("Invalid params: {e}"))
        .map_err(ApiError::BadRequest)?;

    let observances = load_all(store).await?;
    Ok(Json(filter.apply(observances)))
}

async fn month_stats(State(store): State<SharedStore>) -> Result<Json<MonthStats>, ApiError> {
    let observances = load_all(store).await?;
    Ok(Json(MonthStats::from_observances(&observances)))
}

pub fn router(store: SharedStore) -> Router {
    Router::new()
        .route("/api/observances", get(list_observances))
        .route("/api/stats", get(month_stats))
        .layer(CorsLayer::permissive())
        .with_state(store)
}

/// Spawns the daily scrape loop as its own task. It shares nothing with the
/// HTTP side except the store inside `pipeline`. With `run_now` one cycle runs
/// first, inside the task, so the caller can start serving right away.
pub fn spawn_scheduler<C, E, S>(
    pipeline: Pipeline<C, E, S>,
    daily_at: NaiveTime,
    run_now: bool,
) -> tokio::task::JoinHandle<()>
where
    C: PageSource + Send + Sync + 'static,
    E: PageSource + Send + Sync + 'static,
    S: ObservanceStore + ?Sized + 'static,
{
    let pipeline = Arc::new(pipeline);

    tokio::spawn(async move {
        if run_now {
            pipeline.run().await;
        }

        let schedule = DailySchedule::new(daily_at, Local::now().naive_local());
        schedule
            .run(move || {
                let pipeline = pipeline.clone();
                async move {
                    pipeline.run().await;
                }
            })
            .await
    })
}
