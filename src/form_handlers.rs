// src/form_handlers.rs

use axum::{
    Form,
    body::Bytes,
    extract::{Multipart, Path, State},
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use chrono::Utc;
use maud::Markup;
use serde_json::json;
use std::str::FromStr;
use uuid::Uuid;

use crate::composer::compose_payload;
use crate::errors::{AppError, MISSING_THUMBNAIL_MESSAGE};
use crate::file_handler::FileSession;
use crate::form_state::FormSubmission;
use crate::models::{ImageSlot, PendingFile, ProductFormValues};
use crate::state::AppState;
use crate::validation::{FormErrors, validate_product_form};
use crate::views::{FormView, render_image_section, render_page, render_product_form};

type FormPairs = Form<Vec<(String, String)>>;

/// Renderuje formularz pokazując tylko błędy pól, których już dotknięto.
fn render_form_state(
    submission: &FormSubmission,
    session_id: Uuid,
    files: &FileSession,
) -> Markup {
    let touched: Vec<String> = submission.touched.iter().cloned().collect();
    let errors = match validate_product_form(&submission.values) {
        Ok(()) => FormErrors::default(),
        Err(errors) => errors.retain_touched(&submission.touched),
    };
    let view = FormView::from_submission(submission, &touched, &errors, files, session_id);
    render_product_form(&view)
}

/// Każda interakcja z formularzem musi nieść identyfikator sesji plików.
async fn load_session(
    app_state: &AppState,
    submission: &FormSubmission,
) -> Result<(Uuid, FileSession), AppError> {
    let session_id = submission.session_id.ok_or_else(|| {
        tracing::warn!("Żądanie formularza bez session_id");
        AppError::BadRequest("Missing form session.".to_string())
    })?;
    let files = app_state.file_handler.session(session_id).await?;
    Ok((session_id, files))
}

fn hx_trigger(headers: &mut HeaderMap, payload: serde_json::Value) {
    if let Ok(val) = HeaderValue::from_str(&payload.to_string()) {
        headers.insert("HX-Trigger", val);
    }
}

pub async fn new_product_page(State(app_state): State<AppState>) -> Result<Markup, AppError> {
    tracing::info!("Obsłużono zapytanie GET /admin/products/new");
    let (session_id, files) = app_state.file_handler.open_session(None).await;
    let submission = FormSubmission {
        values: ProductFormValues::initial(None),
        session_id: Some(session_id),
        product_id: None,
        new_keyword: None,
        touched: Default::default(),
    };
    Ok(render_page(
        "Add New Product",
        render_form_state(&submission, session_id, &files),
    ))
}

pub async fn edit_product_page(
    State(app_state): State<AppState>,
    Path(product_id): Path<Uuid>,
) -> Result<Markup, AppError> {
    tracing::info!("Obsłużono zapytanie GET /admin/products/{}/edit", product_id);
    let product = app_state
        .backend
        .fetch(product_id)
        .await?
        .ok_or_else(|| {
            tracing::warn!("Nie znaleziono produktu o ID: {}", product_id);
            AppError::NotFound
        })?;

    let (session_id, files) = app_state.file_handler.open_session(Some(&product)).await;
    let submission = FormSubmission {
        values: ProductFormValues::initial(Some(&product)),
        session_id: Some(session_id),
        product_id: Some(product_id),
        new_keyword: None,
        touched: Default::default(),
    };
    Ok(render_page(
        "Edit Product",
        render_form_state(&submission, session_id, &files),
    ))
}

/// Walidacja przy zmianie pola. Nazwę kontrolki podaje HTMX w `HX-Trigger-Name`.
pub async fn validate_form_handler(
    State(app_state): State<AppState>,
    headers: HeaderMap,
    Form(pairs): FormPairs,
) -> Result<Markup, AppError> {
    let mut submission = FormSubmission::from_pairs(&pairs);
    if let Some(input_name) = headers
        .get("HX-Trigger-Name")
        .and_then(|value| value.to_str().ok())
    {
        tracing::debug!("Zmiana pola formularza: {}", input_name);
        submission.touch_input(input_name);
    }
    let (session_id, files) = load_session(&app_state, &submission).await?;
    Ok(render_form_state(&submission, session_id, &files))
}

pub async fn add_size_row_handler(
    State(app_state): State<AppState>,
    Form(pairs): FormPairs,
) -> Result<Markup, AppError> {
    let mut submission = FormSubmission::from_pairs(&pairs);
    let row_id = submission.values.add_size_row();
    tracing::debug!("Dodano wiersz rozmiaru {}", row_id);
    let (session_id, files) = load_session(&app_state, &submission).await?;
    Ok(render_form_state(&submission, session_id, &files))
}

pub async fn remove_size_row_handler(
    State(app_state): State<AppState>,
    Path(index): Path<usize>,
    Form(pairs): FormPairs,
) -> Result<Markup, AppError> {
    let mut submission = FormSubmission::from_pairs(&pairs);
    submission.values.remove_size_row(index);
    submission.touch("sizes_with_prices");
    let (session_id, files) = load_session(&app_state, &submission).await?;
    Ok(render_form_state(&submission, session_id, &files))
}

pub async fn add_keyword_handler(
    State(app_state): State<AppState>,
    Form(pairs): FormPairs,
) -> Result<Markup, AppError> {
    let mut submission = FormSubmission::from_pairs(&pairs);
    if let Some(keyword) = submission.new_keyword.take() {
        submission.values.add_keyword(&keyword);
    }
    submission.touch("keywords");
    let (session_id, files) = load_session(&app_state, &submission).await?;
    Ok(render_form_state(&submission, session_id, &files))
}

pub async fn remove_keyword_handler(
    State(app_state): State<AppState>,
    Path(index): Path<usize>,
    Form(pairs): FormPairs,
) -> Result<Markup, AppError> {
    let mut submission = FormSubmission::from_pairs(&pairs);
    submission.values.remove_keyword(index);
    submission.touch("keywords");
    let (session_id, files) = load_session(&app_state, &submission).await?;
    Ok(render_form_state(&submission, session_id, &files))
}

pub async fn select_files_handler(
    State(app_state): State<AppState>,
    Path((session_id, slot)): Path<(Uuid, String)>,
    mut multipart: Multipart,
) -> Result<Markup, AppError> {
    let slot = ImageSlot::from_str(&slot)
        .map_err(|_| AppError::BadRequest(format!("Unknown image slot '{}'", slot)))?;
    tracing::info!(
        "Obsłużono zapytanie POST /htmx/product-form/{}/files/{}",
        session_id,
        slot
    );

    let mut files: Vec<PendingFile> = Vec::new();
    while let Some(field) = multipart.next_field().await? {
        let Some(file_name) = field.file_name().map(|s| s.to_string()) else {
            tracing::warn!("Odebrano pole multipart bez nazwy pliku, pomijam");
            continue;
        };
        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let bytes = field.bytes().await?;
        tracing::debug!(
            "Odebrano plik {} ({}), rozmiar: {} bajtów",
            file_name,
            content_type,
            bytes.len()
        );
        files.push(PendingFile {
            file_name,
            content_type,
            bytes,
        });
    }

    let session = app_state
        .file_handler
        .on_file_change(session_id, slot, files)
        .await?;
    Ok(render_image_section(session_id, &session))
}

pub async fn remove_image_handler(
    State(app_state): State<AppState>,
    Path((session_id, slot, image_id)): Path<(Uuid, String, String)>,
) -> Result<Markup, AppError> {
    let slot = ImageSlot::from_str(&slot)
        .map_err(|_| AppError::BadRequest(format!("Unknown image slot '{}'", slot)))?;
    let session = app_state
        .file_handler
        .remove_image(session_id, slot, &image_id)
        .await?;
    Ok(render_image_section(session_id, &session))
}

/// Podgląd pliku, który nie został jeszcze zapisany w backendzie.
pub async fn serve_upload_handler(
    State(app_state): State<AppState>,
    Path((session_id, image_id)): Path<(Uuid, String)>,
) -> Result<Response, AppError> {
    let file = app_state
        .file_handler
        .pending_file(session_id, &image_id)
        .await
        .ok_or(AppError::NotFound)?;
    let body: Bytes = file.bytes;
    Ok(([(header::CONTENT_TYPE, file.content_type)], body).into_response())
}

pub async fn submit_product_handler(
    State(app_state): State<AppState>,
    Form(pairs): FormPairs,
) -> Result<Response, AppError> {
    let mut submission = FormSubmission::from_pairs(&pairs);
    submission.touch_all();
    let (session_id, files) = load_session(&app_state, &submission).await?;
    tracing::info!(
        "Obsłużono zapytanie POST /htmx/product-form/submit (edycja: {:?})",
        submission.product_id
    );

    let payload = match compose_payload(&submission.values, &files, Utc::now()) {
        Ok(payload) => payload,
        Err(AppError::InvalidForm(errors)) => {
            tracing::warn!("Formularz produktu zawiera {} błędnych pól", errors.len());
            let markup = render_form_state(&submission, session_id, &files);
            return Ok((StatusCode::UNPROCESSABLE_ENTITY, markup).into_response());
        }
        Err(AppError::MissingThumbnail) => {
            let mut headers = HeaderMap::new();
            hx_trigger(
                &mut headers,
                json!({ "showAlert": { "message": MISSING_THUMBNAIL_MESSAGE } }),
            );
            let markup = render_form_state(&submission, session_id, &files);
            return Ok((StatusCode::UNPROCESSABLE_ENTITY, headers, markup).into_response());
        }
        Err(e) => return Err(e),
    };

    app_state
        .backend
        .submit(submission.product_id, payload)
        .await?;

    let mut headers = HeaderMap::new();
    hx_trigger(
        &mut headers,
        json!({
            "showMessage": {
                "message": "Product saved.",
                "type": "success"
            }
        }),
    );

    // Po zapisie nowego produktu pokazujemy pusty formularz z nową sesją plików.
    let (status, markup) = match submission.product_id {
        None => {
            app_state.file_handler.close_session(session_id).await;
            let (new_session_id, new_files) = app_state.file_handler.open_session(None).await;
            let fresh = FormSubmission {
                values: ProductFormValues::initial(None),
                session_id: Some(new_session_id),
                product_id: None,
                new_keyword: None,
                touched: Default::default(),
            };
            (
                StatusCode::CREATED,
                render_form_state(&fresh, new_session_id, &new_files),
            )
        }
        Some(_) => (
            StatusCode::OK,
            render_form_state(&submission, session_id, &files),
        ),
    };
    Ok((status, headers, markup).into_response())
}
