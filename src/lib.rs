// src/lib.rs

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{delete, get, post},
};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

pub mod backend;
pub mod composer;
pub mod config;
pub mod errors;
pub mod file_handler;
pub mod form_handlers;
pub mod form_state;
pub mod list_editor;
pub mod models;
pub mod state;
pub mod validation;
pub mod views;

use crate::form_handlers::*;
use crate::state::AppState;

pub fn app(app_state: AppState) -> Router {
    let body_limit = app_state.config.max_upload_bytes;

    Router::new()
        .route("/", get(new_product_page))
        .route("/admin/products/new", get(new_product_page))
        .route("/admin/products/{id}/edit", get(edit_product_page))
        .route("/htmx/product-form/validate", post(validate_form_handler))
        .route("/htmx/product-form/sizes/add", post(add_size_row_handler))
        .route(
            "/htmx/product-form/sizes/remove/{index}",
            post(remove_size_row_handler),
        )
        .route("/htmx/product-form/keywords/add", post(add_keyword_handler))
        .route(
            "/htmx/product-form/keywords/remove/{index}",
            post(remove_keyword_handler),
        )
        .route(
            "/htmx/product-form/{session_id}/files/{slot}",
            post(select_files_handler),
        )
        .route(
            "/htmx/product-form/{session_id}/files/{slot}/{image_id}",
            delete(remove_image_handler),
        )
        .route(
            "/uploads/{session_id}/{image_id}",
            get(serve_upload_handler),
        )
        .route("/htmx/product-form/submit", post(submit_product_handler))
        .nest_service("/static", ServeDir::new("static"))
        .layer(TraceLayer::new_for_http())
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(app_state)
}
