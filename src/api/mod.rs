//! REST API layer: route handlers, DTOs, and router composition.
//!
//! All staking endpoints are mounted under `/api/v1`.

pub mod dto;
pub mod handlers;

use std::time::Duration;

use axum::Router;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

use crate::app_state::AppState;

/// OpenAPI document covering every REST endpoint.
#[derive(Debug, OpenApi)]
#[openapi(
    info(
        title = "sse-staking-gateway",
        description = "Reward accrual and transaction building for the SSE staking programs."
    ),
    paths(
        handlers::staking::get_user_info,
        handlers::staking::unstake,
        handlers::staking::execute_migration,
        handlers::staking::preview_migration,
        handlers::staking::get_pool,
        handlers::system::health_handler,
    ),
    components(schemas(
        dto::UserInfoResponse,
        dto::EarningRatesDto,
        dto::UnstakeRequest,
        dto::UnstakeResponse,
        dto::MigrationRequest,
        dto::MigrationResponse,
        dto::MigrationPreviewResponse,
        dto::RewardBreakdownDto,
        dto::PoolInfoResponse,
        handlers::system::HealthResponse,
        crate::error::ErrorResponse,
        crate::error::ErrorBody,
    )),
    tags(
        (name = "Staking", description = "User accrual, unstake, and pool state"),
        (name = "Migration", description = "Legacy to sustainable migration"),
        (name = "System", description = "Service health"),
    )
)]
pub struct ApiDoc;

/// Builds the complete API router with all REST endpoints.
pub fn build_router() -> Router<AppState> {
    Router::new()
        .nest("/api/v1", handlers::routes())
        .merge(handlers::system::routes())
}

/// Builds the full application: REST routes, Swagger UI (with the
/// `swagger-ui` feature), request tracing, CORS, and a per-request timeout.
pub fn build_app(state: AppState, request_timeout: Duration) -> Router {
    let router = build_router();

    #[cfg(feature = "swagger-ui")]
    let router = router.merge(
        utoipa_swagger_ui::SwaggerUi::new("/swagger-ui")
            .url("/api-docs/openapi.json", ApiDoc::openapi()),
    );

    router
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive())
                .layer(TimeoutLayer::new(request_timeout)),
        )
        .with_state(state)
}
