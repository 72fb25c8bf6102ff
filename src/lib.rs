pub mod api;
pub mod config;
pub mod entities;
pub mod infrastructure;
pub mod models;
pub mod services;
pub mod utils;

use crate::config::DropConfig;
use crate::services::drop_service::DropService;
use axum::{
    Router,
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post},
};
use std::sync::Arc;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    paths(
        api::handlers::files::upload_file,
        api::handlers::files::list_files,
        api::handlers::files::download_file,
        api::handlers::health::health_check,
    ),
    components(
        schemas(
            api::handlers::files::UploadResponse,
            api::handlers::files::FileListItem,
            api::handlers::health::HealthResponse,
        )
    ),
    tags(
        (name = "files", description = "Upload, list and download short-lived files"),
        (name = "system", description = "Service status")
    )
)]
pub struct ApiDoc;

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<DropService>,
    pub config: DropConfig,
}

pub fn create_app(state: AppState) -> Router {
    let body_limit = state.config.max_file_size + 1024 * 1024; // multipart overhead

    let files = Router::new()
        .route("/files", get(api::handlers::files::list_files))
        .route("/files/:id", get(api::handlers::files::download_file))
        .route("/upload", post(api::handlers::files::upload_file))
        .layer(from_fn_with_state(
            state.clone(),
            api::middleware::credential::credential_middleware,
        ));

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/health", get(api::handlers::health::health_check))
        .merge(files)
        .layer(from_fn(api::middleware::request_id::request_id_middleware))
        .layer(axum::extract::DefaultBodyLimit::max(body_limit))
        .with_state(state)
}
