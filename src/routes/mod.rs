use axum::http::HeaderValue;
use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};
use tower_http::cors::{AllowOrigin, CorsLayer};

use crate::{auth::AuthenticatedUser, state::AppState};

pub mod analytics;
pub mod auth;
pub mod clients;
pub mod health;
pub mod job_files;
pub mod users;

pub fn create_router(state: AppState) -> Router<()> {
    let cors = if let Some(origins) = state.config.cors_allowed_origin.as_ref() {
        let headers: Vec<HeaderValue> = origins
            .split(',')
            .filter_map(|value| {
                let trimmed = value.trim();
                (!trimmed.is_empty()).then(|| {
                    trimmed
                        .parse::<HeaderValue>()
                        .expect("invalid CORS allowed origin")
                })
            })
            .collect();

        let allow_origin = AllowOrigin::list(headers);

        CorsLayer::new()
            .allow_origin(allow_origin)
            .allow_methods(tower_http::cors::AllowMethods::mirror_request())
            .allow_headers(tower_http::cors::AllowHeaders::mirror_request())
            .allow_credentials(true)
    } else {
        CorsLayer::new()
            .allow_origin(AllowOrigin::mirror_request())
            .allow_methods(tower_http::cors::AllowMethods::mirror_request())
            .allow_headers(tower_http::cors::AllowHeaders::mirror_request())
            .allow_credentials(true)
    };

    let auth_routes = Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/me", get(auth::me));

    let job_files_routes = Router::new()
        .route(
            "/",
            get(job_files::list_job_files).post(job_files::create_job_file),
        )
        .route(
            "/:job_file_no",
            get(job_files::get_job_file)
                .put(job_files::update_job_file)
                .delete(job_files::delete_job_file),
        )
        .route("/:job_file_no/check", post(job_files::check_job_file))
        .route("/:job_file_no/approve", post(job_files::approve_job_file))
        .route("/:job_file_no/reject", post(job_files::reject_job_file));

    let users_routes = Router::new().route(
        "/",
        get(users::list_users).put(users::batch_update_users),
    );

    let clients_routes = Router::new()
        .route("/", get(clients::list_clients).post(clients::create_client))
        .route(
            "/:id",
            put(clients::update_client).delete(clients::delete_client),
        );

    let analytics_routes = Router::new().route("/", get(analytics::get_analytics));

    let protected_state = state.clone();
    let protected_routes = Router::new()
        .nest("/api/job-files", job_files_routes)
        .nest("/api/users", users_routes)
        .nest("/api/clients", clients_routes)
        .nest("/api/analytics", analytics_routes)
        .layer(middleware::from_extractor_with_state::<AuthenticatedUser, _>(protected_state));

    Router::new()
        .merge(protected_routes)
        .nest("/api/auth", auth_routes)
        .route("/api/health", get(health::health_check))
        .with_state(state)
        .layer(cors)
}
