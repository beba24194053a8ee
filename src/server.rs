use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

use crate::analysis::{
    plan_analysis_window, run_analysis, weigh_request, AnalysisReport, AnalysisRequest,
    InputError, WindowPlan,
};
use crate::config::Config;
use crate::types::Game;

#[derive(Clone)]
struct ApiState {
    config: Arc<Config>,
}

#[derive(Debug, Serialize)]
struct ApiResponse<T: Serialize> {
    ok: bool,
    data: T,
}

#[derive(Debug, Serialize)]
struct ApiErrorBody {
    ok: bool,
    error: String,
}

#[derive(Debug)]
struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn internal(error: impl std::fmt::Display) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: error.to_string(),
        }
    }
}

impl From<InputError> for ApiError {
    fn from(error: InputError) -> Self {
        Self {
            status: StatusCode::UNPROCESSABLE_ENTITY,
            message: error.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(ApiErrorBody {
            ok: false,
            error: self.message,
        });
        (self.status, body).into_response()
    }
}

type ApiResult<T> = std::result::Result<Json<ApiResponse<T>>, ApiError>;

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

#[derive(Debug, Serialize)]
struct WeightsResponse {
    games: Vec<Game>,
    total_weight: f64,
}

fn router(config: Config) -> Router {
    let state = ApiState {
        config: Arc::new(config),
    };
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/v1/config", get(show_config))
        .route("/v1/optimize", post(optimize))
        .route("/v1/pauses", post(pauses))
        .route("/v1/weights", post(weights))
        .layer(cors)
        .with_state(state)
}

pub async fn run_server(config: Config, bind: SocketAddr) -> Result<()> {
    let app = router(config);
    let listener = tokio::net::TcpListener::bind(bind).await?;
    info!("REST API listening on http://{bind}");
    axum::serve(listener, app).await?;
    Ok(())
}

async fn health() -> Json<ApiResponse<HealthResponse>> {
    ok(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

async fn show_config(State(state): State<ApiState>) -> Json<ApiResponse<Config>> {
    ok(state.config.as_ref().clone())
}

async fn optimize(
    State(state): State<ApiState>,
    Json(request): Json<AnalysisRequest>,
) -> ApiResult<AnalysisReport> {
    let config = Arc::clone(&state.config);
    // The annealer is CPU-bound for up to its time limit.
    let report = tokio::task::spawn_blocking(move || run_analysis(&request, &config))
        .await
        .map_err(ApiError::internal)??;
    Ok(ok(report))
}

async fn pauses(
    State(state): State<ApiState>,
    Json(request): Json<AnalysisRequest>,
) -> ApiResult<WindowPlan> {
    Ok(ok(plan_analysis_window(&request, &state.config)?))
}

async fn weights(
    State(state): State<ApiState>,
    Json(request): Json<AnalysisRequest>,
) -> ApiResult<WeightsResponse> {
    let games = weigh_request(&request, &state.config)?;
    let total_weight = games.iter().map(Game::total_weight).sum();
    Ok(ok(WeightsResponse {
        games,
        total_weight,
    }))
}

fn ok<T: Serialize>(data: T) -> Json<ApiResponse<T>> {
    Json(ApiResponse { ok: true, data })
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone, Utc};

    use super::*;
    use crate::optimizer::Strategy;
    use crate::types::{Offer, Package};
    use crate::weights::MatchContext;

    fn state() -> ApiState {
        ApiState {
            config: Arc::new(Config::default()),
        }
    }

    fn request(teams: Vec<String>) -> AnalysisRequest {
        let start = Utc
            .with_ymd_and_hms(2024, 8, 24, 15, 30, 0)
            .single()
            .expect("valid date");
        let games = (0..4)
            .map(|week| {
                Game::new(
                    week + 1,
                    "Leverkusen",
                    "Opponent",
                    "Bundesliga 24/25",
                    start + Duration::days(7 * week as i64),
                )
            })
            .collect();
        AnalysisRequest {
            teams,
            start_date: start,
            games,
            packages: vec![Package::new(1, "DAZN").with_monthly(3499)],
            offers: (1..=4).map(|id| Offer::live(id, 1)).collect(),
            context: MatchContext::default(),
            max_packages: None,
            require_live: None,
            strategy: Some(Strategy::Greedy),
        }
    }

    #[test]
    fn health_reports_ok() {
        let Json(response) = tokio_test::block_on(health());
        assert!(response.ok);
        assert_eq!(response.data.status, "ok");
    }

    #[test]
    fn optimize_returns_report() {
        let result = tokio_test::block_on(async {
            optimize(State(state()), Json(request(vec!["Leverkusen".to_string()]))).await
        });
        let Json(response) = result.expect("optimize succeeds");
        assert!(response.ok);
        assert_eq!(response.data.result.selected_packages.len(), 1);
        assert!((response.data.result.coverage_ratio - 1.0).abs() < 1e-9);
    }

    #[test]
    fn invalid_input_maps_to_unprocessable() {
        let result = tokio_test::block_on(pauses(State(state()), Json(request(Vec::new()))));
        let err = result.err().expect("empty team list is rejected");
        assert_eq!(err.status, StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn weights_sum_tournament_tiers() {
        let result = tokio_test::block_on(weights(
            State(state()),
            Json(request(vec!["Leverkusen".to_string()])),
        ));
        let Json(response) = result.expect("weights succeed");
        assert_eq!(response.data.games.len(), 4);
        assert!((response.data.total_weight - 6.0).abs() < 1e-9);
    }
}
