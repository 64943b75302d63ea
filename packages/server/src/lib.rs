pub mod config;
pub mod database;
pub mod entity;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod ingest;
pub mod models;
pub mod principal;
pub mod routes;
pub mod seed;
pub mod services;
pub mod state;
pub mod utils;

use std::time::Duration;

use axum::Router;
use axum::extract::Request;
use axum::http::{HeaderValue, StatusCode, header};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_axum::router::OpenApiRouter;
use utoipa_scalar::{Scalar, Servable as ScalarServable};
use utoipa_swagger_ui::SwaggerUi;

use crate::config::CorsConfig;
use crate::entity::photo;
use crate::models::photo::UPLOADS_PREFIX;
use crate::state::AppState;

/// Browser cache lifetime for files under `/uploads` (30 days).
const UPLOADS_CACHE_CONTROL: &str = "public, max-age=2592000";

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Photo Cabinet API",
        version = "1.0.0",
        description = "Photo storage with EXIF extraction, derived thumbnails and moderated user accounts"
    ),
    tags(
        (name = "Auth", description = "Admin and user authentication"),
        (name = "Users", description = "User moderation (admin only)"),
        (name = "Photos", description = "Photo upload, listing and deletion"),
        (name = "Health", description = "Liveness"),
    ),
    modifiers(&SecurityAddon),
)]
struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_default();
        components.add_security_scheme(
            "jwt",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

/// CORS from the configured allow-list; a `*` entry allows any origin.
fn cors_layer(cors: &CorsConfig) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods(Any)
        .allow_headers(Any)
        .max_age(Duration::from_secs(cors.max_age));

    if cors.allow_origins.iter().any(|o| o.trim() == "*") {
        return layer.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = cors
        .allow_origins
        .iter()
        .filter_map(|origin| match origin.trim().parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin '{}'", origin);
                None
            }
        })
        .collect();
    layer.allow_origin(AllowOrigin::list(origins))
}

/// True when any segment of `path` starts with `.`, plain or percent-encoded.
///
/// The uploads root also holds the store's `.tmp` staging directory.
fn is_hidden_path(path: &str) -> bool {
    path.split('/').any(|segment| {
        segment.starts_with('.')
            || segment
                .get(..3)
                .is_some_and(|prefix| prefix.eq_ignore_ascii_case("%2e"))
    })
}

/// Derived variants are JPEG even when named after a PNG or WebP original.
async fn derived_variants_as_jpeg(req: Request, next: Next) -> Response {
    let is_variant = req
        .uri()
        .path()
        .rsplit('/')
        .next()
        .is_some_and(photo::is_derived_name);
    let mut response = next.run(req).await;
    if is_variant && response.status().is_success() {
        response.headers_mut().insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("image/jpeg"),
        );
    }
    response
}

async fn hide_dot_paths(req: Request, next: Next) -> Response {
    if is_hidden_path(req.uri().path()) {
        return StatusCode::NOT_FOUND.into_response();
    }
    next.run(req).await
}

/// Build the application router.
pub fn build_router(state: AppState) -> Router {
    let (router, api) = OpenApiRouter::with_openapi(ApiDoc::openapi())
        .nest("/api", routes::api_routes(&state.config))
        .split_for_parts();

    let uploads = Router::new()
        .fallback_service(ServeDir::new(state.assets.root()))
        .layer(SetResponseHeaderLayer::overriding(
            header::CACHE_CONTROL,
            HeaderValue::from_static(UPLOADS_CACHE_CONTROL),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(middleware::from_fn(derived_variants_as_jpeg))
        .layer(middleware::from_fn(hide_dot_paths));
    let cors = cors_layer(&state.config.server.cors);

    router
        .route("/health", get(handlers::health::health))
        .with_state(state)
        .nest_service(UPLOADS_PREFIX, uploads)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", api.clone()))
        .merge(Scalar::with_url("/scalar", api))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
