use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::config::AppConfig;
use crate::handlers;
use crate::state::AppState;

pub fn api_routes(config: &AppConfig) -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .nest("/auth", auth_routes())
        .nest("/photos", photo_routes(config))
        .routes(routes!(handlers::health::health))
}

fn auth_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(handlers::auth::admin_login))
        .routes(routes!(handlers::auth::register))
        .routes(routes!(handlers::auth::user_login))
        .routes(routes!(handlers::users::list_users))
        .routes(routes!(handlers::users::list_pending_users))
        .routes(routes!(handlers::users::approve_user))
        .routes(routes!(handlers::users::reject_user))
}

fn photo_routes(config: &AppConfig) -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(
            handlers::photos::list_photos,
            handlers::photos::upload_photo
        ))
        .routes(routes!(
            handlers::photos::get_photo,
            handlers::photos::delete_photo
        ))
        .layer(handlers::photos::upload_body_limit(
            config.storage.max_upload_size,
        ))
}
