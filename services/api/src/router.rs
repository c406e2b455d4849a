//! Axum Router Configuration
//!
//! This module defines the complete HTTP routing for the application,
//! including the REST API, WebSocket endpoint, and OpenAPI documentation.

use crate::{
    handlers,
    models::{ErrorResponse, LoginPayload, LoginResponse, ScenarioPayload, UpdatePinPayload},
    state::AppState,
    ws::ws_handler,
};

use axum::{
    Router,
    routing::{get, patch, post},
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;
use wardsim_core::result::{ResponseRecord, ResultStatus, SimulationResult, StoredResult};
use wardsim_core::scenario::{HospitalSetting, Interaction, Scenario};

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::login,
        handlers::logout,
        handlers::update_pin,
        handlers::list_scenarios,
        handlers::get_scenario,
        handlers::create_scenario,
        handlers::update_scenario,
        handlers::delete_scenario,
        handlers::import_scenarios,
        handlers::list_results,
        handlers::scenario_results,
    ),
    components(
        schemas(
            Scenario,
            Interaction,
            HospitalSetting,
            StoredResult,
            SimulationResult,
            ResponseRecord,
            ResultStatus,
            ScenarioPayload,
            LoginPayload,
            LoginResponse,
            UpdatePinPayload,
            ErrorResponse
        )
    ),
    tags(
        (name = "Wardsim API", description = "Scenario authoring and simulation playback for nurse training")
    )
)]
pub struct ApiDoc;

/// Creates the main Axum router for the application.
pub fn create_router(app_state: AppState) -> Router {
    // Group all routes that require AppState into their own router.
    let api_router = Router::new()
        .route("/auth/login", post(handlers::login))
        .route("/auth/logout", post(handlers::logout))
        .route("/auth/pin", patch(handlers::update_pin))
        .route(
            "/scenarios",
            get(handlers::list_scenarios).post(handlers::create_scenario),
        )
        .route("/scenarios/import", post(handlers::import_scenarios))
        .route(
            "/scenarios/{id}",
            get(handlers::get_scenario)
                .put(handlers::update_scenario)
                .delete(handlers::delete_scenario),
        )
        .route("/scenarios/{id}/results", get(handlers::scenario_results))
        .route("/results", get(handlers::list_results))
        .route("/ws", get(ws_handler))
        // Apply the state ONLY to this group of routes.
        .with_state(app_state);

    // Create the final router that merges the stateful routes
    // with the stateless routes (like Swagger UI).
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(api_router)
}
