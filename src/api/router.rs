//! HTTP router for the intake service.
//!
//! Returns a composable `Router` with every route nested under `/api/`.
//!
//! Middleware stack (outermost → innermost):
//! 1. CORS → 2. Rate limiter → 3. Access logger

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::http::Method;
use axum::routing::{get, post, put};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};

use crate::api::endpoints;
use crate::api::middleware;
use crate::api::types::ApiContext;
use crate::core_state::CoreState;

/// Relayed recorder chunks are small; the recording as a whole is capped
/// by `voice::MAX_CLIP_BYTES`.
const MAX_CHUNK_BODY: usize = 1024 * 1024;

/// Build the API router.
///
/// Middleware uses `Extension<ApiContext>` (injected as the outermost layer).
/// Endpoint handlers use `State<ApiContext>` (provided via `with_state`).
pub fn api_router(core: Arc<CoreState>) -> Router {
    build_router(ApiContext::new(core))
}

/// Build router from a pre-constructed `ApiContext` (custom rate limits).
pub fn api_router_with_ctx(ctx: ApiContext) -> Router {
    build_router(ctx)
}

fn build_router(ctx: ApiContext) -> Router {
    // Photos arrive as data URLs, slightly larger than the raw limit.
    let body_limit = ctx.core.config.max_image_bytes.saturating_add(64 * 1024);

    // NOTE: Path params use `:param` syntax (matchit 0.7 / axum 0.7).
    let api = Router::new()
        .route("/health", get(endpoints::health::check))
        .route("/catalog", get(endpoints::catalog::search))
        .route("/intake", post(endpoints::intake::create))
        .route(
            "/intake/:id",
            get(endpoints::intake::show).delete(endpoints::intake::remove),
        )
        .route("/intake/:id/query", put(endpoints::intake::set_query))
        .route(
            "/intake/:id/categories/toggle",
            post(endpoints::intake::toggle_category),
        )
        .route(
            "/intake/:id/symptoms",
            axum::routing::delete(endpoints::intake::clear_symptoms),
        )
        .route(
            "/intake/:id/symptoms/:symptom_id",
            axum::routing::delete(endpoints::intake::remove_symptom),
        )
        .route(
            "/intake/:id/symptoms/:symptom_id/toggle",
            post(endpoints::intake::toggle_symptom),
        )
        .route("/intake/:id/detail", put(endpoints::intake::set_detail))
        .route(
            "/intake/:id/detail/confirm",
            post(endpoints::intake::confirm_detail),
        )
        .route(
            "/intake/:id/detail/cancel",
            post(endpoints::intake::cancel_detail),
        )
        .route("/intake/:id/review", post(endpoints::intake::review))
        .route("/intake/:id/back", post(endpoints::intake::back))
        .route("/intake/:id/submit", post(endpoints::intake::submit))
        .route(
            "/intake/:id/notice",
            axum::routing::delete(endpoints::intake::dismiss_notice),
        )
        .route("/intake/:id/voice/start", post(endpoints::voice::start))
        .route(
            "/intake/:id/voice/chunk",
            post(endpoints::voice::chunk).layer(DefaultBodyLimit::max(MAX_CHUNK_BODY)),
        )
        .route("/intake/:id/voice/stop", post(endpoints::voice::stop))
        .route(
            "/intake/:id/voice/error",
            post(endpoints::voice::report_error).delete(endpoints::voice::dismiss_error),
        )
        .route(
            "/intake/:id/theme",
            get(endpoints::theme::current).post(endpoints::theme::toggle),
        )
        .route("/medicine/lookup", post(endpoints::medicine::lookup))
        .with_state(ctx.clone())
        // Middleware stack (innermost first, outermost last):
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(axum::middleware::from_fn(middleware::audit::log_access))
        .layer(axum::middleware::from_fn(middleware::rate::limit))
        // Extension must be outermost so middleware can extract ApiContext
        .layer(axum::Extension(ctx));

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers(Any);

    Router::new().nest("/api", api).layer(cors)
}
