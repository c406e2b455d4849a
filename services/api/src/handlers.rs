//! Axum Handlers for the REST API
//!
//! This module contains the logic for handling HTTP requests for scenario
//! authoring, instructor authentication and result review. It uses `utoipa`
//! doc comments to generate OpenAPI documentation.
//!
//! Authoring and review endpoints require a live instructor session, proven
//! by the `x-instructor-token` header. Scenario reads are open: learners
//! browse and play scenarios without logging in.

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
};
use tracing::error;
use uuid::Uuid;
use wardsim_core::result::StoredResult;
use wardsim_core::scenario::Scenario;

use crate::{
    models::{ErrorResponse, LoginPayload, LoginResponse, ScenarioPayload, UpdatePinPayload},
    state::AppState,
};

pub enum ApiError {
    BadRequest(String),
    Unauthorized,
    NotFound(String),
    InternalServerError(anyhow::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::BadRequest(message) => {
                (StatusCode::BAD_REQUEST, Json(ErrorResponse { message })).into_response()
            }
            ApiError::Unauthorized => {
                let message = "A valid instructor session is required.".to_string();
                (StatusCode::UNAUTHORIZED, Json(ErrorResponse { message })).into_response()
            }
            ApiError::NotFound(message) => {
                (StatusCode::NOT_FOUND, Json(ErrorResponse { message })).into_response()
            }
            ApiError::InternalServerError(err) => {
                error!("Internal Server Error: {:?}", err);
                let message = "An internal server error occurred.".to_string();
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ErrorResponse { message }),
                )
                    .into_response()
            }
        }
    }
}

impl<E> From<E> for ApiError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self::InternalServerError(err.into())
    }
}

/// Extracts and verifies the instructor session token from the headers.
async fn require_instructor(state: &AppState, headers: &HeaderMap) -> Result<(), ApiError> {
    let token = headers
        .get("x-instructor-token")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| Uuid::parse_str(v).ok())
        .ok_or(ApiError::Unauthorized)?;

    if state.auth.is_authenticated(token).await {
        Ok(())
    } else {
        Err(ApiError::Unauthorized)
    }
}

/// Log in as instructor with the access PIN.
#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginPayload,
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 401, description = "Wrong PIN", body = ErrorResponse)
    )
)]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginPayload>,
) -> Result<Json<LoginResponse>, ApiError> {
    let (token, expires_at) = state
        .auth
        .login(&payload.pin, payload.remember_me)
        .await
        .ok_or(ApiError::Unauthorized)?;

    Ok(Json(LoginResponse { token, expires_at }))
}

/// End the current instructor session.
#[utoipa::path(
    post,
    path = "/auth/logout",
    responses(
        (status = 204, description = "Session ended")
    ),
    params(
        ("x-instructor-token" = String, Header, description = "Instructor session token")
    )
)]
pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> StatusCode {
    if let Some(token) = headers
        .get("x-instructor-token")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| Uuid::parse_str(v).ok())
    {
        state.auth.logout(token).await;
    }
    StatusCode::NO_CONTENT
}

/// Change the instructor PIN.
#[utoipa::path(
    patch,
    path = "/auth/pin",
    request_body = UpdatePinPayload,
    responses(
        (status = 204, description = "PIN updated"),
        (status = 400, description = "Malformed PIN", body = ErrorResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse)
    ),
    params(
        ("x-instructor-token" = String, Header, description = "Instructor session token")
    )
)]
pub async fn update_pin(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<UpdatePinPayload>,
) -> Result<StatusCode, ApiError> {
    require_instructor(&state, &headers).await?;

    state
        .auth
        .update_pin(&payload.pin)
        .await
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;

    Ok(StatusCode::NO_CONTENT)
}

/// List all scenarios.
#[utoipa::path(
    get,
    path = "/scenarios",
    responses(
        (status = 200, description = "List of scenarios", body = [Scenario])
    )
)]
pub async fn list_scenarios(State(state): State<AppState>) -> Json<Vec<Scenario>> {
    Json(state.store.list_scenarios().await)
}

/// Get a specific scenario by its ID.
#[utoipa::path(
    get,
    path = "/scenarios/{id}",
    responses(
        (status = 200, description = "Scenario details", body = Scenario),
        (status = 404, description = "Scenario not found", body = ErrorResponse)
    ),
    params(
        ("id" = String, Path, description = "Scenario ID")
    )
)]
pub async fn get_scenario(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Scenario>, ApiError> {
    let scenario = state
        .store
        .get_scenario(&id)
        .await
        .ok_or_else(|| ApiError::NotFound(format!("Scenario with id '{}' not found", id)))?;

    Ok(Json(scenario))
}

/// Create a new scenario.
#[utoipa::path(
    post,
    path = "/scenarios",
    request_body = ScenarioPayload,
    responses(
        (status = 201, description = "Scenario created", body = Scenario),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    params(
        ("x-instructor-token" = String, Header, description = "Instructor session token")
    )
)]
pub async fn create_scenario(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<ScenarioPayload>,
) -> Result<impl IntoResponse, ApiError> {
    require_instructor(&state, &headers).await?;

    let scenario = state.store.create_scenario(payload).await?;
    Ok((StatusCode::CREATED, Json(scenario)))
}

/// Replace a scenario's definition.
#[utoipa::path(
    put,
    path = "/scenarios/{id}",
    request_body = ScenarioPayload,
    responses(
        (status = 200, description = "Scenario updated", body = Scenario),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 404, description = "Scenario not found", body = ErrorResponse)
    ),
    params(
        ("id" = String, Path, description = "Scenario ID"),
        ("x-instructor-token" = String, Header, description = "Instructor session token")
    )
)]
pub async fn update_scenario(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(payload): Json<ScenarioPayload>,
) -> Result<Json<Scenario>, ApiError> {
    require_instructor(&state, &headers).await?;

    let scenario = state
        .store
        .update_scenario(&id, payload)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Scenario with id '{}' not found", id)))?;

    Ok(Json(scenario))
}

/// Delete a scenario.
#[utoipa::path(
    delete,
    path = "/scenarios/{id}",
    responses(
        (status = 204, description = "Scenario deleted"),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 404, description = "Scenario not found", body = ErrorResponse)
    ),
    params(
        ("id" = String, Path, description = "Scenario ID"),
        ("x-instructor-token" = String, Header, description = "Instructor session token")
    )
)]
pub async fn delete_scenario(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    require_instructor(&state, &headers).await?;

    if state.store.delete_scenario(&id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound(format!(
            "Scenario with id '{}' not found",
            id
        )))
    }
}

/// Replace the whole scenario collection from an exported file.
#[utoipa::path(
    post,
    path = "/scenarios/import",
    request_body = [Scenario],
    responses(
        (status = 204, description = "Scenarios imported"),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    params(
        ("x-instructor-token" = String, Header, description = "Instructor session token")
    )
)]
pub async fn import_scenarios(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(scenarios): Json<Vec<Scenario>>,
) -> Result<StatusCode, ApiError> {
    require_instructor(&state, &headers).await?;

    state.store.replace_scenarios(scenarios).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// List all recorded session results.
#[utoipa::path(
    get,
    path = "/results",
    responses(
        (status = 200, description = "List of results", body = [StoredResult]),
        (status = 401, description = "Not authenticated", body = ErrorResponse)
    ),
    params(
        ("x-instructor-token" = String, Header, description = "Instructor session token")
    )
)]
pub async fn list_results(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<StoredResult>>, ApiError> {
    require_instructor(&state, &headers).await?;

    Ok(Json(state.store.list_results().await))
}

/// List the recorded results for one scenario.
#[utoipa::path(
    get,
    path = "/scenarios/{id}/results",
    responses(
        (status = 200, description = "Results for the scenario", body = [StoredResult]),
        (status = 401, description = "Not authenticated", body = ErrorResponse)
    ),
    params(
        ("id" = String, Path, description = "Scenario ID"),
        ("x-instructor-token" = String, Header, description = "Instructor session token")
    )
)]
pub async fn scenario_results(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<Vec<StoredResult>>, ApiError> {
    require_instructor(&state, &headers).await?;

    Ok(Json(state.store.results_for(&id).await))
}
